//! Attractor component
//!
//! Pulls (positive strength) or pushes (negative strength) every other
//! physics body whose position falls inside the axis-aligned box around the
//! attractor's sphere of influence.

use crate::ecs::entity::OwnerRef;

/// Attractor/repeller field
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhysicsAttractor {
    pub(crate) owner: OwnerRef,
    /// Force magnitude; positive attracts, negative repels
    pub strength: f32,
    /// Radius of influence
    pub radius: f32,
}

impl PhysicsAttractor {
    /// Create an attractor
    pub fn new(strength: f32, radius: f32) -> Self {
        Self {
            owner: OwnerRef::default(),
            strength,
            radius,
        }
    }

    /// A zero radius or zero strength attractor does nothing
    pub fn is_active(&self) -> bool {
        self.radius != 0.0 && self.strength != 0.0
    }

    /// Swap attraction and repulsion
    pub fn flip(&mut self) {
        self.strength = -self.strength;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_inactive() {
        assert!(!PhysicsAttractor::default().is_active());
        assert!(!PhysicsAttractor::new(5.0, 0.0).is_active());
        assert!(!PhysicsAttractor::new(0.0, 10.0).is_active());
        assert!(PhysicsAttractor::new(-5.0, 10.0).is_active());
    }

    #[test]
    fn test_flip() {
        let mut attractor = PhysicsAttractor::new(5.0, 10.0);
        attractor.flip();
        assert_eq!(attractor.strength, -5.0);
    }
}
