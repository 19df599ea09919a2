//! Physics backend abstraction
//!
//! The simulation itself is external. The core creates bodies, toggles
//! them, pushes forces and poses in, reads poses back, and steps the world
//! once per tick.

use std::any::Any;

use futures::future::LocalBoxFuture;

use super::{BackendResult, BodyHandle};
use crate::foundation::math::{Transform, Vec3};

/// How a body participates in the simulation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MotionType {
    /// Moved by forces and collisions
    #[default]
    Dynamic,
    /// Never moves; ignores forces and impulses
    Static,
    /// Moved explicitly, not by forces
    Kinematic,
}

/// Collision shape of a body
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PhysicsShape {
    /// Sphere fitted to the mesh
    Sphere,
    /// Box fitted to the mesh
    Box,
    /// Capsule fitted to the mesh
    Capsule,
    /// Cylinder fitted to the mesh
    Cylinder,
    /// Convex hull of the mesh vertices
    ConvexHull,
    /// Exact triangle mesh
    #[default]
    Mesh,
}

/// Request to create a rigid body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDesc {
    /// Collision shape
    pub shape: PhysicsShape,
    /// Motion type
    pub motion: MotionType,
    /// Mass in kilograms
    pub mass: f32,
    /// Bounciness, 0..=1
    pub restitution: f32,
}

/// Future resolving to a ready physics backend
pub type BackendFuture = LocalBoxFuture<'static, BackendResult<Box<dyn PhysicsBackend>>>;

/// Produces a fresh bring-up future each time the physics system initialises
pub type PhysicsLoader = Box<dyn FnMut() -> BackendFuture>;

/// Rigid-body operations
pub trait PhysicsBackend {
    /// Create a body at `pose`
    fn create_body(&mut self, desc: &BodyDesc, pose: &Transform) -> BackendResult<BodyHandle>;

    /// Remove a body from the world
    fn destroy_body(&mut self, body: BodyHandle);

    /// Enable or disable simulation of a body
    fn set_body_enabled(&mut self, body: BodyHandle, enabled: bool);

    /// Apply a continuous force at a world-space point for the next step
    fn apply_force(&mut self, body: BodyHandle, force: Vec3, point: Vec3);

    /// Apply an instantaneous impulse at a world-space point
    fn apply_impulse(&mut self, body: BodyHandle, impulse: Vec3, point: Vec3);

    /// Current pose of a body
    fn body_pose(&self, body: BodyHandle) -> Option<Transform>;

    /// Teleport a body
    fn set_body_pose(&mut self, body: BodyHandle, pose: &Transform);

    /// World gravity
    fn set_gravity(&mut self, gravity: Vec3);

    /// Advance the simulation by `dt` seconds
    fn step(&mut self, dt: f32);

    /// Downcast to Any for type-specific access
    fn as_any(&self) -> &dyn Any;

    /// Downcast to Any for mutable type-specific access
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
