//! Per-tick reconciliation of local transforms with backend poses
//!
//! For every registered object the system decides which side owns the pose
//! this tick:
//!
//! - mesh without physics: the transform drives the mesh
//! - mesh with physics and a dirty transform: the transform is teleported
//!   into both mesh and body, with the body disabled while it moves
//! - mesh with physics and a clean transform: the body is ground truth and
//!   its pose is copied back into the transform
//!
//! Free-standing lights and cameras follow their object's world transform.
//! Components are updated afterwards, in attachment order.

use std::collections::HashSet;

use crate::backend::EngineServices;
use crate::ecs::commands::CommandQueue;
use crate::ecs::entity::GameObjectId;
use crate::ecs::system::{System, SystemCore, SystemState};
use crate::ecs::world::World;
use crate::foundation::math::{Transform, Vec3};

const FORWARD: Vec3 = Vec3::new(0.0, 0.0, 1.0);

/// Reconciles transforms with render, light and physics backends
#[derive(Debug, Default)]
pub struct GameObjectSystem {
    core: SystemCore,
    warned: HashSet<GameObjectId>,
}

impl GameObjectSystem {
    /// Create an uninitialised system
    pub fn new() -> Self {
        Self::default()
    }

    fn reconcile(&mut self, world: &mut World, services: &mut EngineServices, id: GameObjectId, pose: &Transform) {
        let Some(object) = world.get_mut(id) else {
            return;
        };
        let mesh = object.mesh().map(|m| m.mesh());
        let body = object.physics().map(|p| p.body());

        match (mesh, body) {
            (Some(mesh), None) => services.renderer.set_mesh_pose(mesh, pose),
            (Some(mesh), Some(body)) => {
                let dirty = object.transform().is_dirty();
                match (body, services.physics.as_deref_mut()) {
                    (Some(body), Some(physics)) if dirty => {
                        log::trace!("GameObjectSystem: teleporting '{}'", object.name());
                        if let Some(component) = object.physics() {
                            component.disable(physics);
                            services.renderer.set_mesh_pose(mesh, pose);
                            physics.set_body_pose(body, pose);
                            component.enable(physics);
                        }
                    }
                    (Some(body), Some(physics)) => match physics.body_pose(body) {
                        Some(simulated) => {
                            object.transform_mut().sync_from_simulation(&simulated);
                            let shown = Transform {
                                scale: pose.scale,
                                ..simulated
                            };
                            services.renderer.set_mesh_pose(mesh, &shown);
                        }
                        None => {
                            log::warn!("GameObjectSystem: body {} of '{}' is unknown to the backend", body, object.name());
                            services.renderer.set_mesh_pose(mesh, pose);
                        }
                    },
                    // No body yet: the transform keeps driving the mesh
                    _ => services.renderer.set_mesh_pose(mesh, pose),
                }
            }
            (None, Some(_)) => {
                if self.warned.insert(id) {
                    log::warn!("GameObjectSystem: '{}' has physics but no mesh; pose not reconciled", object.name());
                }
            }
            (None, None) => {}
        }

        if mesh.is_none() {
            if let Some(light) = object.light() {
                services.lights.set_light_position(light.light(), pose.position);
                services
                    .lights
                    .set_light_direction(light.light(), pose.rotate_direction(FORWARD, FORWARD));
            }
        }
        if let Some(camera) = object.camera() {
            services.renderer.set_camera_position(camera.camera(), pose.position);
        }
    }
}

impl System for GameObjectSystem {
    fn name(&self) -> &'static str {
        "GameObjectSystem"
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
        log::debug!("GameObjectSystem: initialised");
        true
    }

    fn update(&mut self, world: &mut World, services: &mut EngineServices, commands: &mut CommandQueue, dt: f32) {
        if !self.is_ready() {
            return;
        }

        let ids = self.core.ids().to_vec();
        for id in ids {
            let Some(pose) = world.world_transform(id) else {
                log::warn!("GameObjectSystem: registered object {:?} no longer exists", id);
                continue;
            };
            self.reconcile(world, services, id, &pose);

            // Reconciliation may have pulled a simulated pose into the transform
            let Some(pose) = world.world_transform(id) else {
                continue;
            };
            if let Some(object) = world.get_mut(id) {
                object.update_components(pose, services, commands, dt);
            }
        }
    }

    fn remove_game_object(&mut self, _services: &mut EngineServices, id: GameObjectId) -> bool {
        self.warned.remove(&id);
        self.core.unregister(id)
    }
}
