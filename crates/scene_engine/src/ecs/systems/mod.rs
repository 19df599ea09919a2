//! ECS Systems module
//!
//! The four systems the engine runs each tick, in order: game objects
//! (pose reconciliation and component updates), physics, lighting, then
//! rendering.

pub mod game_object_system;
pub mod lighting;
pub mod physics_system;
pub mod rendering_system;

pub use game_object_system::GameObjectSystem;
pub use lighting::LightingSystem;
pub use physics_system::{BindReport, PhysicsSystem, PhysicsTickStats};
pub use rendering_system::RenderingSystem;
