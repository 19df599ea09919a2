//! Light backend abstraction

use std::any::Any;

use serde::{Deserialize, Serialize};

use super::{BackendResult, LightHandle, MeshHandle, ShadowGeneratorHandle};
use crate::ecs::components::LightType;
use crate::foundation::math::Vec3;

/// Request to create a light
#[derive(Debug, Clone, PartialEq)]
pub struct LightDesc {
    /// Display name
    pub name: String,
    /// Kind of light
    pub light_type: LightType,
    /// Initial position
    pub position: Vec3,
    /// Initial direction (ignored by point lights)
    pub direction: Vec3,
    /// RGB colour
    pub colour: Vec3,
    /// Intensity multiplier
    pub intensity: f32,
}

/// Shadow generator parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowSettings {
    /// Shadow map resolution in texels
    pub map_size: u32,
    /// 0 = fully dark shadows, 1 = no shadows
    pub darkness: f32,
    /// Use exponential shadow maps with blur
    pub blur_exponential: bool,
    /// Blur scale
    pub blur_scale: f32,
    /// Box-blur offset
    pub blur_box_offset: u32,
    /// Use a kernel blur
    pub kernel_blur: bool,
    /// Kernel blur size
    pub blur_kernel: u32,
    /// Depth bias
    pub bias: f32,
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            map_size: 1024,
            darkness: 0.2,
            blur_exponential: true,
            blur_scale: 2.0,
            blur_box_offset: 1,
            kernel_blur: true,
            blur_kernel: 64,
            bias: 0.0,
        }
    }
}

/// Light and shadow operations
pub trait LightBackend {
    /// Create a light
    fn create_light(&mut self, desc: &LightDesc) -> BackendResult<LightHandle>;

    /// Destroy a light and any shadow generators built on it
    fn destroy_light(&mut self, light: LightHandle);

    /// Move a light
    fn set_light_position(&mut self, light: LightHandle, position: Vec3);

    /// Aim a light
    fn set_light_direction(&mut self, light: LightHandle, direction: Vec3);

    /// Attach a light to a mesh (`None` detaches)
    fn set_light_parent(&mut self, light: LightHandle, parent: Option<MeshHandle>);

    /// Switch a light on or off
    fn set_light_enabled(&mut self, light: LightHandle, enabled: bool);

    /// Create a shadow generator for a shadow-capable light
    fn create_shadow_generator(
        &mut self,
        light: LightHandle,
        settings: &ShadowSettings,
    ) -> BackendResult<ShadowGeneratorHandle>;

    /// Destroy a shadow generator and its caster list
    fn destroy_shadow_generator(&mut self, generator: ShadowGeneratorHandle);

    /// Register `mesh` as a shadow caster of `generator`
    fn add_shadow_caster(&mut self, generator: ShadowGeneratorHandle, mesh: MeshHandle);

    /// Stop `mesh` casting shadows for `generator`
    fn remove_shadow_caster(&mut self, generator: ShadowGeneratorHandle, mesh: MeshHandle);

    /// Downcast to Any for type-specific access
    fn as_any(&self) -> &dyn Any;

    /// Downcast to Any for mutable type-specific access
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
