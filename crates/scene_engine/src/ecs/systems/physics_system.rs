//! Physics system: asynchronous backend bring-up, lazy body creation and
//! attractor forces over a per-tick spatial index
//!
//! Bring-up is a future produced by the configured [`PhysicsLoader`]. It is
//! polled once from `initialise` and then once per tick until it resolves,
//! so the tick loop never blocks. Hosts that want to wait can drive
//! [`PhysicsSystem::poll_bring_up`] from their own executor. A failed or
//! panicking bring-up leaves the system not ready; physics is suppressed and
//! `initialise` may be called again.

use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::task::{Context, Poll};

use futures::future::LocalBoxFuture;
use futures::task::noop_waker_ref;
use futures::FutureExt;

use crate::backend::{BackendError, BackendResult, EngineServices, PhysicsBackend, PhysicsLoader};
use crate::core::config::PhysicsConfig;
use crate::ecs::commands::CommandQueue;
use crate::ecs::component::ComponentKind;
use crate::ecs::entity::GameObjectId;
use crate::ecs::system::{System, SystemCore, SystemState};
use crate::ecs::world::World;
use crate::events::Event;
use crate::foundation::math::{self, Vec3};
use crate::spatial::{build_index, SpatialIndex, AABB};

type PanicPayload = Box<dyn std::any::Any + Send>;
type BringUp = LocalBoxFuture<'static, Result<BackendResult<Box<dyn PhysicsBackend>>, PanicPayload>>;

/// Outcome of one lazy body-creation batch
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BindReport {
    /// Objects that received a body
    pub bound: Vec<GameObjectId>,
    /// Objects whose body creation failed, with the backend's reason
    pub failed: Vec<(GameObjectId, BackendError)>,
}

impl BindReport {
    /// True if the batch touched nothing
    pub fn is_empty(&self) -> bool {
        self.bound.is_empty() && self.failed.is_empty()
    }
}

/// Counters from the most recent tick
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PhysicsTickStats {
    /// Objects inserted into the spatial index
    pub indexed: usize,
    /// Attractors that queried the index
    pub active_attractors: usize,
    /// Forces handed to the backend
    pub forces_applied: usize,
}

/// Drives the physics backend and applies attractor forces
pub struct PhysicsSystem {
    core: SystemCore,
    config: PhysicsConfig,
    loader: PhysicsLoader,
    pending: Option<BringUp>,
    rebind_all: bool,
    index: Box<dyn SpatialIndex>,
    warned: HashSet<GameObjectId>,
    rejected: HashSet<GameObjectId>,
    last_stats: PhysicsTickStats,
    /// Fired once each time bring-up completes successfully
    pub on_initialised: Event<()>,
    /// Fired after every tick that created (or failed to create) bodies
    pub on_bodies_bound: Event<BindReport>,
}

impl PhysicsSystem {
    /// Create an uninitialised system that will bring its backend up with
    /// `loader`
    pub fn new(config: PhysicsConfig, loader: PhysicsLoader) -> Self {
        let index = build_index(config.spatial_index, config.octree.clone(), config.bounds_padding);
        Self {
            core: SystemCore::new(),
            config,
            loader,
            pending: None,
            rebind_all: false,
            index,
            warned: HashSet::new(),
            rejected: HashSet::new(),
            last_stats: PhysicsTickStats::default(),
            on_initialised: Event::new(),
            on_bodies_bound: Event::new(),
        }
    }

    /// Configuration in use
    pub const fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Spatial index as rebuilt by the last tick
    pub fn index(&self) -> &dyn SpatialIndex {
        self.index.as_ref()
    }

    /// Counters from the last tick that ran
    pub const fn last_stats(&self) -> PhysicsTickStats {
        self.last_stats
    }

    /// True while a bring-up future is outstanding
    pub fn is_bringing_up(&self) -> bool {
        self.pending.is_some()
    }

    /// Poll the outstanding bring-up.
    ///
    /// Resolves to whether the system is ready. With nothing outstanding it
    /// resolves immediately.
    pub fn poll_bring_up(&mut self, cx: &mut Context<'_>, services: &mut EngineServices) -> Poll<bool> {
        let Some(pending) = self.pending.as_mut() else {
            return Poll::Ready(self.is_ready());
        };
        let outcome = futures::ready!(pending.poll_unpin(cx));
        self.pending = None;

        match outcome {
            Ok(Ok(mut backend)) => {
                backend.set_gravity(self.config.gravity);
                if services.physics.replace(backend).is_some() {
                    log::info!("PhysicsSystem: backend replaced; bodies will be recreated");
                    self.rebind_all = true;
                }
                self.rejected.clear();
                self.core.set_state(SystemState::Initialised);
                log::info!("PhysicsSystem: backend ready");
                self.on_initialised.trigger(&());
                Poll::Ready(true)
            }
            Ok(Err(e)) => {
                self.fail(&e.to_string());
                Poll::Ready(false)
            }
            Err(panic) => {
                self.fail(&panic_message(&*panic));
                Poll::Ready(false)
            }
        }
    }

    fn poll_once(&mut self, services: &mut EngineServices) -> bool {
        let mut cx = Context::from_waker(noop_waker_ref());
        matches!(self.poll_bring_up(&mut cx, services), Poll::Ready(true))
    }

    fn fail(&mut self, reason: &str) {
        log::error!("PhysicsSystem: backend bring-up failed: {}", reason);
        self.core.set_state(SystemState::Failed);
    }

    /// Create bodies for registered objects that have a physics component
    /// and a mesh but no body yet
    fn bind_bodies(&mut self, world: &mut World, physics: &mut dyn PhysicsBackend) {
        let mut report = BindReport::default();

        for &id in self.core.ids() {
            if self.rejected.contains(&id) {
                continue;
            }
            let Some(pose) = world.world_transform(id) else {
                continue;
            };
            let Some(object) = world.get_mut(id) else {
                continue;
            };
            if self.rebind_all {
                if let Some(component) = object.physics_mut() {
                    component.unbind_body();
                }
            }
            let Some(component) = object.physics() else {
                continue;
            };
            if component.body().is_some() {
                continue;
            }
            if !object.has(ComponentKind::Mesh) {
                if self.warned.insert(id) {
                    log::warn!("PhysicsSystem: '{}' has physics but no mesh; skipped", object.name());
                }
                continue;
            }

            match physics.create_body(&component.body_desc(), &pose) {
                Ok(body) => {
                    if let Some(component) = object.physics_mut() {
                        component.bind_body(body);
                    }
                    log::trace!("PhysicsSystem: bound {} to '{}'", body, object.name());
                    report.bound.push(id);
                }
                Err(e) => {
                    log::error!("PhysicsSystem: body creation failed for '{}': {}", object.name(), e);
                    self.rejected.insert(id);
                    report.failed.push((id, e));
                }
            }
        }
        self.rebind_all = false;

        if !report.is_empty() {
            self.on_bodies_bound.trigger(&report);
        }
    }

    fn rebuild_index(&mut self, world: &World) -> usize {
        let points: Vec<(GameObjectId, Vec3)> = self
            .core
            .ids()
            .iter()
            .filter_map(|&id| world.world_transform(id).map(|pose| (id, pose.position)))
            .collect();
        self.index.rebuild(&points);
        points.len()
    }

    /// Apply every active attractor's force to the bodies inside its query
    /// region. Returns (active attractors, forces applied).
    fn apply_attractors(&self, world: &World, physics: &mut dyn PhysicsBackend) -> (usize, usize) {
        let mut active = 0;
        let mut applied = 0;

        for &source in self.core.ids() {
            let Some(object) = world.get(source) else {
                continue;
            };
            let (Some(attractor), true, true) = (
                object.attractor(),
                object.has(ComponentKind::Physics),
                object.has(ComponentKind::Mesh),
            ) else {
                continue;
            };
            if !attractor.is_active() {
                continue;
            }
            let Some(origin) = world.world_transform(source).map(|pose| pose.position) else {
                continue;
            };
            active += 1;

            let region = AABB::from_sphere(origin, attractor.radius);
            for target in self.index.query_aabb(&region) {
                if target == source {
                    continue;
                }
                let (Some(body), Some(position)) = (
                    world.get(target).and_then(|t| t.physics()),
                    world.world_transform(target).map(|pose| pose.position),
                ) else {
                    continue;
                };
                let Some(direction) = (origin - position).try_normalize(math::NORMALIZE_EPSILON) else {
                    continue;
                };
                if body.apply_force(physics, direction * attractor.strength, position) {
                    applied += 1;
                }
            }
        }
        (active, applied)
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panicked: {}", message)
    } else {
        "panicked".to_string()
    }
}

impl System for PhysicsSystem {
    fn name(&self) -> &'static str {
        "PhysicsSystem"
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
        self.core.set_state(SystemState::Initialising);
        log::debug!("PhysicsSystem: bringing up backend");

        let loader = &mut self.loader;
        match std::panic::catch_unwind(AssertUnwindSafe(|| loader())) {
            Ok(future) => self.pending = Some(AssertUnwindSafe(future).catch_unwind().boxed_local()),
            Err(panic) => {
                self.fail(&panic_message(&*panic));
                return false;
            }
        }
        self.poll_once(services)
    }

    fn update(&mut self, world: &mut World, services: &mut EngineServices, _commands: &mut CommandQueue, dt: f32) {
        if self.pending.is_some() {
            self.poll_once(services);
        }
        if !self.is_ready() {
            return;
        }
        let Some(physics) = services.physics.as_deref_mut() else {
            log::warn!("PhysicsSystem: ready but no backend attached");
            return;
        };

        self.bind_bodies(world, physics);
        let indexed = self.rebuild_index(world);
        let (active_attractors, forces_applied) = self.apply_attractors(world, physics);
        physics.step(dt);

        self.last_stats = PhysicsTickStats {
            indexed,
            active_attractors,
            forces_applied,
        };
        log::trace!("PhysicsSystem: {:?}", self.last_stats);
    }

    fn remove_game_object(&mut self, _services: &mut EngineServices, id: GameObjectId) -> bool {
        self.warned.remove(&id);
        self.rejected.remove(&id);
        self.core.unregister(id)
    }
}

impl std::fmt::Debug for PhysicsSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhysicsSystem")
            .field("state", &self.core.state())
            .field("registered", &self.core.len())
            .field("bringing_up", &self.pending.is_some())
            .field("config", &self.config)
            .field("last_stats", &self.last_stats)
            .finish_non_exhaustive()
    }
}
