//! Parent/child scenes: lamp posts, cameras and teardown

use std::f32::consts::FRAC_PI_2;

use approx::assert_relative_eq;

use crate::backend::headless::{HeadlessLights, HeadlessPhysics, HeadlessRenderer};
use crate::backend::{LightDesc, ShapeType};
use crate::core::config::EngineConfig;
use crate::ecs::components::{LightComponent, LightType, PhysicsComponent, TransformComponent};
use crate::ecs::factory::LightParams;
use crate::ecs::world::TransformComposition;
use crate::ecs::GameObjectId;
use crate::engine::{Engine, SystemKind};
use crate::foundation::math::{Quat, Vec3};

const DT: f32 = 1.0 / 30.0;

fn ready_engine(config: EngineConfig) -> Engine {
    let mut engine = Engine::headless(config).unwrap();
    assert!(engine.initialise());
    engine
}

/// Post at `base` with a lamp head three units up carrying a spot light
fn lamp_post(engine: &mut Engine, base: Vec3) -> (GameObjectId, GameObjectId) {
    let post = engine
        .spawn_shape("post", ShapeType::Cylinder, TransformComponent::from_position(base))
        .unwrap();
    let lamp = engine
        .spawn_shape(
            "lamp",
            ShapeType::Sphere,
            TransformComponent::from_position(Vec3::new(0.0, 3.0, 0.0)),
        )
        .unwrap();
    let light = engine
        .services_mut()
        .lights
        .create_light(&LightDesc {
            name: "lamp light".into(),
            light_type: LightType::Spot,
            position: Vec3::zeros(),
            direction: Vec3::new(0.0, -1.0, 0.0),
            colour: Vec3::new(1.0, 0.9, 0.7),
            intensity: 2.0,
        })
        .unwrap();
    engine
        .add_component(lamp, LightComponent::new(light, LightType::Spot))
        .unwrap();
    engine.add_child(post, lamp).unwrap();
    (post, lamp)
}

#[test]
fn test_lamp_post_links_render_hierarchy_and_light() {
    let mut engine = ready_engine(EngineConfig::default());
    let (post, lamp) = lamp_post(&mut engine, Vec3::new(5.0, 0.0, 0.0));

    engine.tick(DT);

    let post_mesh = engine.world().get(post).unwrap().mesh().unwrap().mesh();
    let lamp_object = engine.world().get(lamp).unwrap();
    let lamp_mesh = lamp_object.mesh().unwrap().mesh();
    let light = lamp_object.light().unwrap().light();

    let renderer = engine.services().renderer_as::<HeadlessRenderer>().unwrap();
    assert_eq!(renderer.mesh(lamp_mesh).unwrap().parent, Some(post_mesh));
    assert_relative_eq!(renderer.mesh(lamp_mesh).unwrap().pose.position, Vec3::new(5.0, 3.0, 0.0));

    let record = engine.services().lights_as::<HeadlessLights>().unwrap().light(light).unwrap();
    assert_eq!(record.parent, Some(lamp_mesh));
    assert!(record.enabled);

    // Only the lamp's light gets a generator; both meshes receive shadows
    assert!(engine.lighting_system().shadow_generator(light).is_some());
    assert_eq!(engine.lighting_system().caster_meshes().count(), 2);
}

#[test]
fn test_moving_the_post_moves_the_lamp() {
    let mut engine = ready_engine(EngineConfig::default());
    let (post, lamp) = lamp_post(&mut engine, Vec3::zeros());
    engine.tick(DT);

    engine
        .world_mut()
        .get_mut(post)
        .unwrap()
        .transform_mut()
        .set_position(Vec3::new(0.0, 0.0, -10.0));
    engine.tick(DT);

    let lamp_mesh = engine.world().get(lamp).unwrap().mesh().unwrap().mesh();
    let renderer = engine.services().renderer_as::<HeadlessRenderer>().unwrap();
    assert_relative_eq!(renderer.mesh(lamp_mesh).unwrap().pose.position, Vec3::new(0.0, 3.0, -10.0));
}

#[test]
fn test_hierarchical_composition_rotates_children_about_parent() {
    let config = EngineConfig::new().with_transform_composition(TransformComposition::Hierarchical);
    let mut engine = ready_engine(config);
    let arm = engine
        .spawn_shape(
            "arm",
            ShapeType::Box,
            TransformComponent::identity()
                .with_rotation(Quat::from_axis_angle(&Vec3::y_axis(), FRAC_PI_2))
                .with_uniform_scale(2.0),
        )
        .unwrap();
    let hand = engine
        .spawn_shape(
            "hand",
            ShapeType::Sphere,
            TransformComponent::from_position(Vec3::new(1.0, 0.0, 0.0)),
        )
        .unwrap();
    engine.add_child(arm, hand).unwrap();

    engine.tick(DT);

    let hand_mesh = engine.world().get(hand).unwrap().mesh().unwrap().mesh();
    let pose = engine
        .services()
        .renderer_as::<HeadlessRenderer>()
        .unwrap()
        .mesh(hand_mesh)
        .unwrap()
        .pose;
    assert_relative_eq!(pose.position, Vec3::new(0.0, 0.0, -2.0), epsilon = 1e-5);
    assert_relative_eq!(pose.scale, Vec3::new(2.0, 2.0, 2.0));
}

#[test]
fn test_free_light_and_camera_follow_their_transforms() {
    let mut engine = ready_engine(EngineConfig::default());
    let sun = engine
        .spawn_light(
            &LightParams::new("sun", LightType::Directional),
            TransformComponent::from_position(Vec3::new(0.0, 50.0, 0.0)),
        )
        .unwrap();
    let camera = engine
        .spawn_camera("eye", TransformComponent::from_position(Vec3::new(0.0, 2.0, -8.0)))
        .unwrap();

    {
        let transform = engine.world_mut().get_mut(sun).unwrap().transform_mut();
        transform.set_position(Vec3::new(10.0, 40.0, 0.0));
        transform.set_rotation(Quat::from_axis_angle(&Vec3::x_axis(), FRAC_PI_2));
    }
    engine
        .world_mut()
        .get_mut(camera)
        .unwrap()
        .transform_mut()
        .set_position(Vec3::new(1.0, 1.0, 1.0));
    engine.tick(DT);

    let light = engine.world().get(sun).unwrap().light().unwrap().light();
    let record = engine.services().lights_as::<HeadlessLights>().unwrap().light(light).unwrap();
    assert_relative_eq!(record.position, Vec3::new(10.0, 40.0, 0.0));
    // +Z rotated a quarter turn about +X points down
    assert_relative_eq!(record.direction, Vec3::new(0.0, -1.0, 0.0), epsilon = 1e-5);

    let handle = engine.world().get(camera).unwrap().camera().unwrap().camera();
    let renderer = engine.services().renderer_as::<HeadlessRenderer>().unwrap();
    assert_relative_eq!(renderer.camera_position(handle).unwrap(), Vec3::new(1.0, 1.0, 1.0));
}

#[test]
fn test_removing_post_releases_whole_lamp() {
    let mut engine = ready_engine(EngineConfig::default());
    let (post, lamp) = lamp_post(&mut engine, Vec3::zeros());
    engine.add_component(post, PhysicsComponent::new()).unwrap();
    engine.tick(DT);
    assert_eq!(engine.services().physics_as::<HeadlessPhysics>().unwrap().body_count(), 1);

    let destroyed = engine.remove_game_object(post);

    assert_eq!(destroyed, vec![post, lamp]);
    assert!(engine.world().is_empty());
    assert_eq!(engine.services().renderer_as::<HeadlessRenderer>().unwrap().mesh_count(), 0);
    assert_eq!(engine.services().lights_as::<HeadlessLights>().unwrap().light_count(), 0);
    assert_eq!(engine.services().physics_as::<HeadlessPhysics>().unwrap().body_count(), 0);
    assert_eq!(engine.lighting_system().shadow_generator_count(), 0);
    for kind in SystemKind::ALL {
        assert!(!engine.system(kind).core().contains(post));
        assert!(!engine.system(kind).core().contains(lamp));
    }

    // Ticking after teardown is harmless
    engine.run(2, DT);
}

#[test]
fn test_relit_lamp_keeps_one_shadow_generator() {
    let mut engine = ready_engine(EngineConfig::default());
    let (_, lamp) = lamp_post(&mut engine, Vec3::zeros());
    engine.tick(DT);
    let light = engine.world().get(lamp).unwrap().light().unwrap().light();
    let first = engine.lighting_system().shadow_generator(light).unwrap();

    assert!(engine.unregister_from(SystemKind::Lighting, lamp).unwrap().is_empty());
    assert!(engine.services().lights_as::<HeadlessLights>().unwrap().shadow_generator(first).is_none());
    assert!(engine.register_with(SystemKind::Lighting, lamp).unwrap());
    engine.tick(DT);

    assert_eq!(engine.lighting_system().shadow_generator_count(), 1);
    assert_eq!(engine.services().lights_as::<HeadlessLights>().unwrap().shadow_generator_count(), 1);
}

#[test]
fn test_removed_floor_leaves_no_shadow_caster_behind() {
    let mut engine = ready_engine(EngineConfig::default());
    let sun = engine
        .spawn_light(
            &LightParams::new("sun", LightType::Directional),
            TransformComponent::from_position(Vec3::new(0.0, 20.0, 0.0)),
        )
        .unwrap();
    let floor = engine
        .spawn_shape("floor", ShapeType::Box, TransformComponent::identity())
        .unwrap();
    engine.tick(DT);

    let light = engine.world().get(sun).unwrap().light().unwrap().light();
    let generator = engine.lighting_system().shadow_generator(light).unwrap();
    let floor_mesh = engine.world().get(floor).unwrap().mesh().unwrap().mesh();
    let casters = |engine: &Engine| {
        engine
            .services()
            .lights_as::<HeadlessLights>()
            .unwrap()
            .shadow_generator(generator)
            .unwrap()
            .casters
            .clone()
    };
    assert_eq!(casters(&engine), vec![floor_mesh]);

    engine.remove_game_object(floor);
    engine.tick(DT);

    assert!(casters(&engine).is_empty());
    assert_eq!(engine.lighting_system().caster_meshes().count(), 0);
}
