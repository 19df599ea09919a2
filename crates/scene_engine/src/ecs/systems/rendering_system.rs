//! # Rendering System
//!
//! Owns the frame boundary and the glow post-process toggle. The glow layer
//! is created disabled on initialise; hosts switch it on and off at runtime.

use crate::backend::EngineServices;
use crate::ecs::commands::CommandQueue;
use crate::ecs::system::{System, SystemCore, SystemState};
use crate::ecs::world::World;

/// Ends each frame on the render backend and manages the glow layer
#[derive(Debug, Default)]
pub struct RenderingSystem {
    core: SystemCore,
    glow_enabled: bool,
}

impl RenderingSystem {
    /// Create an uninitialised rendering system
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the glow layer is on
    pub const fn is_glow_enabled(&self) -> bool {
        self.glow_enabled
    }

    /// Switch the glow layer on
    pub fn enable_glow_layer(&mut self, services: &mut EngineServices) {
        self.set_glow(true, services);
    }

    /// Switch the glow layer off
    pub fn disable_glow_layer(&mut self, services: &mut EngineServices) {
        self.set_glow(false, services);
    }

    fn set_glow(&mut self, enabled: bool, services: &mut EngineServices) {
        if !self.is_ready() {
            log::warn!("RenderingSystem: glow layer toggled before initialise");
            return;
        }
        self.glow_enabled = enabled;
        services.renderer.set_glow_enabled(enabled);
    }
}

impl System for RenderingSystem {
    fn name(&self) -> &'static str {
        "RenderingSystem"
    }

    fn core(&self) -> &SystemCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SystemCore {
        &mut self.core
    }

    fn initialise(&mut self, reinitialise: bool, services: &mut EngineServices) -> bool {
        if !self.core.can_initialise(reinitialise) {
            return false;
        }
        self.glow_enabled = false;
        services.renderer.set_glow_enabled(false);
        self.core.set_state(SystemState::Initialised);
        true
    }

    fn update(&mut self, _world: &mut World, services: &mut EngineServices, _commands: &mut CommandQueue, _dt: f32) {
        if self.is_ready() {
            services.renderer.end_frame();
        }
    }
}
