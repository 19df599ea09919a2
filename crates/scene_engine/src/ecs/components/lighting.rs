//! Light component: a light owned by the light backend

use crate::backend::{EngineServices, LightHandle};
use crate::ecs::entity::OwnerRef;

/// Types of lights supported by the light backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightType {
    /// Directional light (like sunlight) with parallel rays
    Directional,
    /// Point light that radiates in all directions from a position
    Point,
    /// Spot light that creates a cone of light from a position
    Spot,
    /// Sky/ground ambient light
    Hemispheric,
}

impl LightType {
    /// Whether lights of this type can drive a shadow generator
    pub const fn casts_shadows(self) -> bool {
        matches!(self, Self::Directional | Self::Point | Self::Spot)
    }
}

/// Light attached to a game object
#[derive(Debug, Clone, PartialEq)]
pub struct LightComponent {
    pub(crate) owner: OwnerRef,
    light: LightHandle,
    light_type: LightType,
    /// Whether a shadow generator should be created for this light
    pub cast_shadows: bool,
}

impl LightComponent {
    /// Wrap an existing light
    pub fn new(light: LightHandle, light_type: LightType) -> Self {
        Self {
            owner: OwnerRef::default(),
            light,
            light_type,
            cast_shadows: light_type.casts_shadows(),
        }
    }

    /// Backend light handle
    pub const fn light(&self) -> LightHandle {
        self.light
    }

    /// Kind of light
    pub const fn light_type(&self) -> LightType {
        self.light_type
    }

    /// Whether the lighting system should build a shadow generator for it
    pub const fn wants_shadow_generator(&self) -> bool {
        self.cast_shadows && self.light_type.casts_shadows()
    }

    pub(crate) fn release(&mut self, services: &mut EngineServices) {
        services.lights.destroy_light(self.light);
    }
}
