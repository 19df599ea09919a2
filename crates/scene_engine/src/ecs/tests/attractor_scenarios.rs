//! Attractor fields driving bodies through the full tick

use approx::assert_relative_eq;

use crate::backend::headless::HeadlessPhysics;
use crate::backend::{MotionType, ShapeType};
use crate::core::config::{EngineConfig, PhysicsConfig};
use crate::ecs::components::{PhysicsAttractor, PhysicsComponent, TransformComponent};
use crate::ecs::GameObjectId;
use crate::engine::Engine;
use crate::foundation::math::Vec3;
use crate::spatial::SpatialIndexKind;

const DT: f32 = 0.1;

fn ready_engine(config: EngineConfig) -> Engine {
    let mut engine = Engine::headless(config).unwrap();
    assert!(engine.initialise());
    engine
}

fn spawn_ball(engine: &mut Engine, position: Vec3) -> GameObjectId {
    let id = engine
        .spawn_shape("ball", ShapeType::Sphere, TransformComponent::from_position(position))
        .unwrap();
    engine.add_component(id, PhysicsComponent::new()).unwrap();
    id
}

fn spawn_attractor(engine: &mut Engine, strength: f32, radius: f32) -> GameObjectId {
    let id = spawn_ball(engine, Vec3::zeros());
    engine
        .add_component(id, PhysicsAttractor::new(strength, radius))
        .unwrap();
    id
}

fn x_of(engine: &Engine, id: GameObjectId) -> f32 {
    engine.world().get(id).unwrap().transform().position().x
}

fn forces_on(engine: &Engine, id: GameObjectId) -> Vec<Vec3> {
    let body = engine.world().get(id).unwrap().physics().unwrap().body().unwrap();
    engine
        .services()
        .physics_as::<HeadlessPhysics>()
        .unwrap()
        .applied_forces()
        .iter()
        .filter(|applied| applied.body == body)
        .map(|applied| applied.force)
        .collect()
}

#[test]
fn test_attractor_pulls_near_ball_and_ignores_far_ball() {
    let mut engine = ready_engine(EngineConfig::default());
    let source = spawn_attractor(&mut engine, 10.0, 5.0);
    let near = spawn_ball(&mut engine, Vec3::new(3.0, 0.0, 0.0));
    let far = spawn_ball(&mut engine, Vec3::new(20.0, 0.0, 0.0));

    engine.tick(DT);

    let on_near = forces_on(&engine, near);
    assert_eq!(on_near.len(), 1);
    assert_relative_eq!(on_near[0], Vec3::new(-10.0, 0.0, 0.0), epsilon = 1e-5);
    assert!(forces_on(&engine, far).is_empty());
    assert!(forces_on(&engine, source).is_empty());

    engine.run(3, DT);
    assert!(x_of(&engine, near) < 3.0);
    assert_relative_eq!(x_of(&engine, far), 20.0);
}

#[test]
fn test_flipping_mid_run_reverses_the_pull() {
    let mut engine = ready_engine(EngineConfig::default());
    let source = spawn_attractor(&mut engine, 4.0, 8.0);
    let target = spawn_ball(&mut engine, Vec3::new(0.0, 0.0, 2.0));

    engine.tick(DT);
    assert!(forces_on(&engine, target)[0].z < 0.0);

    engine
        .world_mut()
        .get_mut(source)
        .unwrap()
        .attractor_mut()
        .unwrap()
        .flip();
    engine
        .services_mut()
        .physics_as_mut::<HeadlessPhysics>()
        .unwrap()
        .clear_records();
    engine.tick(DT);

    let after = forces_on(&engine, target);
    assert_eq!(after.len(), 1);
    assert_relative_eq!(after[0], Vec3::new(0.0, 0.0, 4.0), epsilon = 1e-5);
}

#[test]
fn test_body_entering_radius_is_picked_up_next_tick() {
    let mut engine = ready_engine(EngineConfig::default());
    spawn_attractor(&mut engine, 1.0, 5.0);
    let wanderer = spawn_ball(&mut engine, Vec3::new(12.0, 0.0, 0.0));

    engine.tick(DT);
    assert!(forces_on(&engine, wanderer).is_empty());

    engine
        .world_mut()
        .get_mut(wanderer)
        .unwrap()
        .transform_mut()
        .set_position(Vec3::new(0.0, 4.0, 0.0));
    // The dirty tick moves the body; the index sees it from then on
    engine.tick(DT);
    engine.tick(DT);

    assert!(!forces_on(&engine, wanderer).is_empty());
}

#[test]
fn test_static_targets_feel_nothing() {
    let mut engine = ready_engine(EngineConfig::default());
    spawn_attractor(&mut engine, 10.0, 5.0);
    let anchor = engine
        .spawn_shape("anchor", ShapeType::Box, TransformComponent::from_position(Vec3::new(1.0, 1.0, 0.0)))
        .unwrap();
    engine
        .add_component(anchor, PhysicsComponent::new().with_motion(MotionType::Static))
        .unwrap();

    engine.run(5, DT);

    assert!(forces_on(&engine, anchor).is_empty());
    assert_relative_eq!(x_of(&engine, anchor), 1.0);
}

#[test]
fn test_linear_index_matches_octree() {
    let positions = [
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(-2.0, 3.0, 1.0),
        Vec3::new(4.9, 4.9, 4.9),
        Vec3::new(6.0, 0.0, 0.0),
    ];
    let mut hits = Vec::new();
    for kind in [SpatialIndexKind::Octree, SpatialIndexKind::Linear] {
        let config = EngineConfig::new().with_physics(PhysicsConfig::default().with_spatial_index(kind));
        let mut engine = ready_engine(config);
        spawn_attractor(&mut engine, 2.0, 5.0);
        let balls: Vec<GameObjectId> = positions.iter().map(|&p| spawn_ball(&mut engine, p)).collect();
        engine.tick(DT);
        hits.push(
            balls
                .iter()
                .map(|&id| !forces_on(&engine, id).is_empty())
                .collect::<Vec<bool>>(),
        );
    }

    // The corner of the cube is inside the query box; 6 units out is not
    assert_eq!(hits[0], vec![true, true, true, false]);
    assert_eq!(hits[0], hits[1]);
}
