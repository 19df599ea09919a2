//! Lighting system: shadow generators for shadow-capable lights
//!
//! Every registered mesh that receives shadows is collected; every
//! registered light whose type can cast shadows gets one shadow generator
//! through the light backend. Each generator then casts every collected
//! mesh. Registration is re-synced every tick, so components attached by
//! deferred commands are picked up on the next update.

use std::collections::HashSet;

use crate::backend::{EngineServices, LightHandle, MeshHandle, ShadowGeneratorHandle, ShadowSettings};
use crate::ecs::commands::CommandQueue;
use crate::ecs::entity::GameObjectId;
use crate::ecs::system::{System, SystemCore, SystemState};
use crate::ecs::world::World;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ShadowCaster {
    owner: GameObjectId,
    mesh: MeshHandle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ShadowLight {
    owner: GameObjectId,
    light: LightHandle,
    generator: ShadowGeneratorHandle,
}

/// Creates shadow generators and keeps their caster lists in sync
#[derive(Debug, Default)]
pub struct LightingSystem {
    core: SystemCore,
    settings: ShadowSettings,
    casters: Vec<ShadowCaster>,
    lights: Vec<ShadowLight>,
    linked: HashSet<(ShadowGeneratorHandle, MeshHandle)>,
    failed_lights: HashSet<LightHandle>,
}

impl LightingSystem {
    /// Create a system whose generators use `settings`
    pub fn new(settings: ShadowSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Parameters new generators are created with
    pub const fn settings(&self) -> &ShadowSettings {
        &self.settings
    }

    /// Meshes registered as shadow casters
    pub fn caster_meshes(&self) -> impl Iterator<Item = MeshHandle> + '_ {
        self.casters.iter().map(|c| c.mesh)
    }

    /// Generator created for `light`, if any
    pub fn shadow_generator(&self, light: LightHandle) -> Option<ShadowGeneratorHandle> {
        self.lights.iter().find(|l| l.light == light).map(|l| l.generator)
    }

    /// Number of live shadow generators
    pub fn shadow_generator_count(&self) -> usize {
        self.lights.len()
    }

    fn process_game_object(&mut self, world: &World, services: &mut EngineServices, id: GameObjectId) {
        let Some(object) = world.get(id) else {
            return;
        };

        if let Some(mesh) = object.mesh() {
            let known = self.casters.iter().any(|c| c.owner == id && c.mesh == mesh.mesh());
            if mesh.receive_shadows && !known {
                self.casters.retain(|c| c.owner != id);
                self.casters.push(ShadowCaster { owner: id, mesh: mesh.mesh() });
            }
        }

        if let Some(light) = object.light() {
            let handle = light.light();
            let known = self.lights.iter().any(|l| l.light == handle) || self.failed_lights.contains(&handle);
            if light.wants_shadow_generator() && !known {
                match services.lights.create_shadow_generator(handle, &self.settings) {
                    Ok(generator) => {
                        log::debug!("LightingSystem: shadow generator {} for '{}'", generator, object.name());
                        self.lights.push(ShadowLight {
                            owner: id,
                            light: handle,
                            generator,
                        });
                    }
                    Err(e) => {
                        log::error!("LightingSystem: no shadow generator for '{}': {}", object.name(), e);
                        self.failed_lights.insert(handle);
                    }
                }
            }
        }
    }

    fn update_shadow_map(&mut self, services: &mut EngineServices) {
        for light in &self.lights {
            for caster in &self.casters {
                if self.linked.insert((light.generator, caster.mesh)) {
                    services.lights.add_shadow_caster(light.generator, caster.mesh);
                }
            }
        }
    }
}

impl System for LightingSystem {
    fn name(&self) -> &'static str {
        "LightingSystem"
    }

    fn core(&self) -> &SystemCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SystemCore {
        &mut self.core
    }

    fn initialise(&mut self, reinitialise: bool, _services: &mut EngineServices) -> bool {
        if !self.core.can_initialise(reinitialise) {
            return false;
        }
        self.core.set_state(SystemState::Initialised);
        log::debug!("LightingSystem: initialised with {:?}", self.settings);
        true
    }

    fn update(&mut self, world: &mut World, services: &mut EngineServices, _commands: &mut CommandQueue, _dt: f32) {
        if !self.is_ready() {
            return;
        }
        let ids = self.core.ids().to_vec();
        for id in ids {
            self.process_game_object(world, services, id);
        }
        self.update_shadow_map(services);
    }

    fn add_game_object(&mut self, world: &World, services: &mut EngineServices, id: GameObjectId) -> bool {
        if !self.core.register(id) {
            return false;
        }
        self.process_game_object(world, services, id);
        self.update_shadow_map(services);
        true
    }

    fn remove_game_object(&mut self, services: &mut EngineServices, id: GameObjectId) -> bool {
        if !self.core.unregister(id) {
            return false;
        }
        let removed_meshes: Vec<MeshHandle> = self
            .casters
            .iter()
            .filter(|c| c.owner == id)
            .map(|c| c.mesh)
            .collect();
        let removed_generators: Vec<ShadowGeneratorHandle> = self
            .lights
            .iter()
            .filter(|l| l.owner == id)
            .map(|l| l.generator)
            .collect();
        self.casters.retain(|c| c.owner != id);
        self.lights.retain(|l| l.owner != id);

        // Links into a dying generator go with it; links from a surviving
        // generator to a removed mesh are unregistered one by one
        self.linked.retain(|&(generator, mesh)| {
            if removed_generators.contains(&generator) {
                return false;
            }
            if removed_meshes.contains(&mesh) {
                services.lights.remove_shadow_caster(generator, mesh);
                return false;
            }
            true
        });
        for generator in removed_generators {
            log::debug!("LightingSystem: destroying shadow generator {}", generator);
            services.lights.destroy_shadow_generator(generator);
        }
        true
    }
}
