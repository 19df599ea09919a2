//! # Scene Engine
//!
//! A game-object composition layer over external render, light and physics
//! backends.
//!
//! ## Features
//!
//! - **Game Objects**: a transform plus at most one component per kind, in a
//!   parent/child hierarchy with additive or hierarchical transform composition
//! - **Systems**: pose reconciliation, physics with attractor fields over a
//!   per-tick octree, shadow generators, glow layer
//! - **Backends**: narrow traits with in-memory headless implementations
//! - **Async Bring-Up**: the physics backend comes up as a future the tick
//!   loop polls without blocking
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_engine::prelude::*;
//!
//! fn main() -> Result<(), EngineError> {
//!     let mut engine = Engine::headless(EngineConfig::default())?;
//!     futures::executor::block_on(engine.wait_until_ready())?;
//!
//!     let ball = engine.spawn_shape("ball", ShapeType::Sphere, TransformComponent::identity())?;
//!     engine.add_component(ball, PhysicsComponent::new())?;
//!     engine.add_component(ball, PhysicsAttractor::new(5.0, 10.0))?;
//!
//!     engine.run(60, 1.0 / 60.0);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Core engine modules
pub mod backend;
pub mod config;
pub mod core;
pub mod ecs;
pub mod events;
pub mod foundation;
pub mod spatial;

mod engine;

pub use engine::{Engine, EngineError, SystemKind};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        backend::{EngineServices, LightDesc, MeshDesc, MotionType, PhysicsShape, ShapeType},
        core::config::{Config, EngineConfig, PhysicsConfig},
        ecs::components::{
            CameraComponent, DebugTransform, LightComponent, LightType, MeshComponent, PhysicsAttractor,
            PhysicsComponent, TransformComponent, TransformFactory,
        },
        ecs::{Component, GameObject, GameObjectId, LightParams, System, TransformComposition, World},
        foundation::math::{Quat, Transform, Vec3},
        Engine, EngineError, SystemKind,
    };
}
