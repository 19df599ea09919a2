//! Physics component: rigid-body parameters and the bound body handle
//!
//! The body itself is created lazily by the physics system once the backend
//! is up and the owner has a mesh to fit the shape to. Until then the
//! component only carries the parameters.

use crate::backend::{BodyDesc, BodyHandle, EngineServices, MotionType, PhysicsBackend, PhysicsShape};
use crate::ecs::entity::OwnerRef;
use crate::foundation::math::Vec3;

/// Rigid body attached to a game object
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicsComponent {
    pub(crate) owner: OwnerRef,
    body: Option<BodyHandle>,
    /// Collision shape
    pub shape: PhysicsShape,
    /// Motion type
    pub motion: MotionType,
    /// Mass in kilograms
    pub mass: f32,
    /// Bounciness, 0..=1
    pub restitution: f32,
}

impl Default for PhysicsComponent {
    fn default() -> Self {
        Self {
            owner: OwnerRef::default(),
            body: None,
            shape: PhysicsShape::Mesh,
            motion: MotionType::Dynamic,
            mass: 1.0,
            restitution: 1.0,
        }
    }
}

impl PhysicsComponent {
    /// Dynamic mesh-shaped body, mass 1, restitution 1
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: Set shape
    pub fn with_shape(mut self, shape: PhysicsShape) -> Self {
        self.shape = shape;
        self
    }

    /// Builder pattern: Set motion type
    pub fn with_motion(mut self, motion: MotionType) -> Self {
        self.motion = motion;
        self
    }

    /// Builder pattern: Set mass
    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    /// Builder pattern: Set restitution
    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    /// Creation request for the backend
    pub fn body_desc(&self) -> BodyDesc {
        BodyDesc {
            shape: self.shape,
            motion: self.motion,
            mass: self.mass,
            restitution: self.restitution,
        }
    }

    /// Bound body, if the physics system has created one
    pub const fn body(&self) -> Option<BodyHandle> {
        self.body
    }

    /// Static bodies never respond to forces or impulses
    pub fn is_static(&self) -> bool {
        self.motion == MotionType::Static
    }

    pub(crate) fn bind_body(&mut self, body: BodyHandle) {
        self.body = Some(body);
    }

    /// Forget the bound body without touching the backend; used when the
    /// backend that owned it has been replaced.
    pub(crate) fn unbind_body(&mut self) -> Option<BodyHandle> {
        self.body.take()
    }

    /// Apply a force at a world-space point. Returns false if nothing was
    /// applied (static or unbound body).
    pub fn apply_force(&self, backend: &mut dyn PhysicsBackend, force: Vec3, point: Vec3) -> bool {
        match self.body {
            Some(body) if !self.is_static() => {
                backend.apply_force(body, force, point);
                true
            }
            _ => false,
        }
    }

    /// Apply an impulse at a world-space point. Returns false if nothing was
    /// applied (static or unbound body).
    pub fn apply_impulse(&self, backend: &mut dyn PhysicsBackend, impulse: Vec3, point: Vec3) -> bool {
        match self.body {
            Some(body) if !self.is_static() => {
                backend.apply_impulse(body, impulse, point);
                true
            }
            _ => false,
        }
    }

    /// Resume simulation of the bound body
    pub fn enable(&self, backend: &mut dyn PhysicsBackend) {
        if let Some(body) = self.body {
            backend.set_body_enabled(body, true);
        }
    }

    /// Suspend simulation of the bound body
    pub fn disable(&self, backend: &mut dyn PhysicsBackend) {
        if let Some(body) = self.body {
            backend.set_body_enabled(body, false);
        }
    }

    pub(crate) fn release(&mut self, services: &mut EngineServices) {
        if let (Some(body), Some(physics)) = (self.body.take(), services.physics_mut()) {
            physics.destroy_body(body);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::headless::HeadlessPhysics;
    use crate::foundation::math::Transform;

    #[test]
    fn test_defaults() {
        let physics = PhysicsComponent::new();
        assert_eq!(physics.motion, MotionType::Dynamic);
        assert_eq!(physics.shape, PhysicsShape::Mesh);
        assert_eq!(physics.mass, 1.0);
        assert_eq!(physics.restitution, 1.0);
        assert!(physics.body().is_none());
    }

    #[test]
    fn test_static_bodies_ignore_forces() {
        let mut backend = HeadlessPhysics::new();
        let mut fixed = PhysicsComponent::new().with_motion(MotionType::Static);
        let body = backend.create_body(&fixed.body_desc(), &Transform::identity()).unwrap();
        fixed.bind_body(body);

        assert!(!fixed.apply_force(&mut backend, Vec3::new(1.0, 0.0, 0.0), Vec3::zeros()));
        assert!(!fixed.apply_impulse(&mut backend, Vec3::new(1.0, 0.0, 0.0), Vec3::zeros()));
        assert!(backend.applied_forces().is_empty());
        assert!(backend.applied_impulses().is_empty());
    }

    #[test]
    fn test_unbound_body_is_a_no_op() {
        let mut backend = HeadlessPhysics::new();
        let physics = PhysicsComponent::new();
        assert!(!physics.apply_force(&mut backend, Vec3::new(1.0, 0.0, 0.0), Vec3::zeros()));
        physics.disable(&mut backend);
    }

    #[test]
    fn test_enable_disable_round_trip_on_backend() {
        let mut backend = HeadlessPhysics::new();
        let mut physics = PhysicsComponent::new().with_mass(10.0);
        let body = backend.create_body(&physics.body_desc(), &Transform::identity()).unwrap();
        physics.bind_body(body);

        physics.disable(&mut backend);
        assert!(!backend.body(body).unwrap().enabled);
        physics.enable(&mut backend);
        assert!(backend.body(body).unwrap().enabled);
    }
}
