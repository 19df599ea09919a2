//! Game object factory
//!
//! Creates the backend resource for a common object kind and wraps it in a
//! fresh game object. Registration with systems is left to the caller.

use crate::backend::{EngineServices, LightDesc, MeshDesc, ShapeType};
use crate::ecs::components::{CameraComponent, LightComponent, LightType, MeshComponent, TransformComponent};
use crate::ecs::entity::GameObjectId;
use crate::ecs::world::World;
use crate::engine::EngineError;
use crate::foundation::math::Vec3;

/// Parameters for a light object
#[derive(Debug, Clone, PartialEq)]
pub struct LightParams {
    /// Display name
    pub name: String,
    /// Kind of light
    pub light_type: LightType,
    /// RGB colour
    pub colour: Vec3,
    /// Brightness multiplier
    pub intensity: f32,
}

impl LightParams {
    /// White light of `light_type` at intensity 1
    pub fn new(name: impl Into<String>, light_type: LightType) -> Self {
        Self {
            name: name.into(),
            light_type,
            colour: Vec3::new(1.0, 1.0, 1.0),
            intensity: 1.0,
        }
    }

    /// Builder pattern: Set colour
    pub fn with_colour(mut self, colour: Vec3) -> Self {
        self.colour = colour;
        self
    }

    /// Builder pattern: Set intensity
    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.intensity = intensity;
        self
    }
}

/// Factory for common game object configurations
pub struct GameObjectFactory;

impl GameObjectFactory {
    /// Object with a primitive mesh sized and posed from `transform`
    pub fn create_shape_game_object(
        world: &mut World,
        services: &mut EngineServices,
        name: &str,
        shape: ShapeType,
        transform: TransformComponent,
    ) -> Result<GameObjectId, EngineError> {
        let mesh = services.renderer.create_mesh(&MeshDesc {
            name: name.to_string(),
            shape,
            size: transform.size(),
            pose: transform.to_math_transform(),
        })?;
        let id = world.create_game_object(name, transform);
        world.add_component(id, MeshComponent::new(mesh), services)?;
        log::debug!("GameObjectFactory: created {:?} '{}'", shape, name);
        Ok(id)
    }

    /// Object with a light placed at the transform and pointing along its
    /// forward axis
    pub fn create_light_game_object(
        world: &mut World,
        services: &mut EngineServices,
        params: &LightParams,
        transform: TransformComponent,
    ) -> Result<GameObjectId, EngineError> {
        let light = services.lights.create_light(&LightDesc {
            name: params.name.clone(),
            light_type: params.light_type,
            position: transform.position(),
            direction: transform.forward(),
            colour: params.colour,
            intensity: params.intensity,
        })?;
        let id = world.create_game_object(params.name.as_str(), transform);
        world.add_component(id, LightComponent::new(light, params.light_type), services)?;
        log::debug!("GameObjectFactory: created {:?} light '{}'", params.light_type, params.name);
        Ok(id)
    }

    /// Object with a camera at the transform's position
    pub fn create_camera_game_object(
        world: &mut World,
        services: &mut EngineServices,
        name: &str,
        transform: TransformComponent,
    ) -> Result<GameObjectId, EngineError> {
        let camera = services.renderer.create_camera(name, transform.position())?;
        let id = world.create_game_object(name, transform);
        world.add_component(id, CameraComponent::new(camera), services)?;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::headless::{HeadlessLights, HeadlessRenderer};
    use crate::backend::BackendError;
    use approx::assert_relative_eq;

    #[test]
    fn test_shape_object_mesh_matches_transform() {
        let mut world = World::new();
        let mut services = EngineServices::headless();
        let transform = TransformComponent::from_position(Vec3::new(1.0, 2.0, 3.0)).with_uniform_scale(2.0);

        let id = GameObjectFactory::create_shape_game_object(
            &mut world,
            &mut services,
            "ball",
            ShapeType::Sphere,
            transform.clone(),
        )
        .unwrap();

        let mesh = world.get(id).unwrap().mesh().unwrap().mesh();
        let record = services.renderer_as::<HeadlessRenderer>().unwrap().mesh(mesh).unwrap();
        assert_eq!(record.shape, ShapeType::Sphere);
        assert_eq!(record.pose, transform.to_math_transform());
        assert_eq!(world.get(id).unwrap().name(), "ball");
    }

    #[test]
    fn test_light_object_points_along_forward() {
        let mut world = World::new();
        let mut services = EngineServices::headless();
        let params = LightParams::new("lamp", LightType::Spot).with_intensity(3.0);
        let transform = crate::ecs::components::TransformFactory::facing(
            Vec3::new(0.0, 5.0, 0.0),
            Vec3::new(0.0, -1.0, 0.0),
        );

        let id = GameObjectFactory::create_light_game_object(&mut world, &mut services, &params, transform).unwrap();

        let light = world.get(id).unwrap().light().unwrap().light();
        let record = services.lights_as::<HeadlessLights>().unwrap().light(light).unwrap();
        assert_relative_eq!(record.direction, Vec3::new(0.0, -1.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(record.desc.intensity, 3.0);
    }

    #[test]
    fn test_mesh_failure_creates_no_object() {
        let mut world = World::new();
        let mut services = EngineServices::new(
            Box::new(HeadlessRenderer::new().with_failing_meshes()),
            Box::new(HeadlessLights::new()),
        );

        let result = GameObjectFactory::create_shape_game_object(
            &mut world,
            &mut services,
            "box",
            ShapeType::Box,
            TransformComponent::identity(),
        );

        assert!(matches!(result, Err(EngineError::Backend(BackendError::ResourceCreation(_)))));
        assert!(world.is_empty());
    }
}
