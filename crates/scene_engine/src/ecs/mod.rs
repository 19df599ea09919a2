//! Game object composition layer
//!
//! Game objects own a transform and a set of components, one per kind, and
//! sit in a parent/child hierarchy inside a [`World`]. Systems hold
//! registrations of game objects and run once per tick.

pub mod commands;
pub mod component;
pub mod components;
pub mod entity;
pub mod factory;
pub mod game_object;
pub mod system;
pub mod systems;
pub mod world;

#[cfg(test)]
mod tests;

pub use commands::{Command, CommandQueue};
pub use component::{Component, ComponentKind, ComponentMask, ComponentVariant, CustomComponent, UpdateContext};
pub use entity::GameObjectId;
pub use factory::{GameObjectFactory, LightParams};
pub use game_object::{GameObject, GameObjectError};
pub use system::{System, SystemCore, SystemState};
pub use world::{TransformComposition, World};
