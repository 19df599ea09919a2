//! Built-in components
//!
//! The transform is owned directly by every game object; the others are
//! variants of [`Component`](crate::ecs::Component).

pub mod attractor;
pub mod camera;
pub mod debug_transform;
pub mod lighting;
pub mod mesh;
pub mod physics;
pub mod transform;

pub use attractor::PhysicsAttractor;
pub use camera::CameraComponent;
pub use debug_transform::{DebugAxes, DebugTransform};
pub use lighting::{LightComponent, LightType};
pub use mesh::MeshComponent;
pub use physics::PhysicsComponent;
pub use transform::{TransformComponent, TransformFactory, MIN_SCALE};
