//! Core engine implementation
//!
//! The engine owns the world, the backends and the four systems, and runs
//! them in a fixed order every tick:
//!
//! 1. [`GameObjectSystem`]: reconcile poses, update components
//! 2. [`PhysicsSystem`]: bind bodies, rebuild the index, apply attractors, step
//! 3. [`LightingSystem`]: keep shadow generators in sync
//! 4. [`RenderingSystem`]: end the frame
//!
//! Structural changes queued during the tick are applied last.

use thiserror::Error;

use crate::backend::headless::HeadlessPhysics;
use crate::backend::{BackendError, EngineServices, PhysicsLoader, ShapeType};
use crate::config::ConfigError;
use crate::core::config::EngineConfig;
use crate::ecs::components::TransformComponent;
use crate::ecs::systems::{GameObjectSystem, LightingSystem, PhysicsSystem, RenderingSystem};
use crate::ecs::{CommandQueue, GameObjectError, GameObjectFactory, GameObjectId, LightParams, System, World};
use crate::foundation::time::{Stopwatch, TickStats};

/// Engine errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Hierarchy or component error
    #[error("Game object error: {0}")]
    GameObject(#[from] GameObjectError),

    /// Backend resource error
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A system did not become ready
    #[error("Engine not ready: {0}")]
    NotReady(String),
}

/// Selects one of the engine's systems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemKind {
    /// Pose reconciliation and component updates
    GameObjects,
    /// Bodies and attractors
    Physics,
    /// Shadow generators
    Lighting,
    /// Frame boundary and glow layer
    Rendering,
}

impl SystemKind {
    /// Systems [`Engine::add_game_object`] registers with
    pub const DEFAULT_REGISTRATION: [Self; 3] = [Self::GameObjects, Self::Lighting, Self::Physics];

    /// Every system, in tick order
    pub const ALL: [Self; 4] = [Self::GameObjects, Self::Physics, Self::Lighting, Self::Rendering];
}

/// Main engine struct
///
/// Coordinates the world, the backends and the systems, and drives the
/// fixed-order tick.
#[derive(Debug)]
pub struct Engine {
    world: World,
    services: EngineServices,
    game_objects: GameObjectSystem,
    physics: PhysicsSystem,
    lighting: LightingSystem,
    rendering: RenderingSystem,
    commands: CommandQueue,
    config: EngineConfig,
    stats: TickStats,
}

impl Engine {
    /// Create an engine over `services`, bringing physics up with `loader`.
    ///
    /// Systems are created uninitialised; call [`initialise`](Self::initialise).
    pub fn new(config: EngineConfig, services: EngineServices, loader: PhysicsLoader) -> Result<Self, EngineError> {
        config.validate()?;
        log::info!("Initializing engine...");

        Ok(Self {
            world: World::with_composition(config.transform_composition),
            services,
            game_objects: GameObjectSystem::new(),
            physics: PhysicsSystem::new(config.physics.clone(), loader),
            lighting: LightingSystem::new(config.lighting.clone()),
            rendering: RenderingSystem::new(),
            commands: CommandQueue::new(),
            config,
            stats: TickStats::default(),
        })
    }

    /// Engine over in-memory backends whose physics comes up on first poll
    pub fn headless(config: EngineConfig) -> Result<Self, EngineError> {
        Self::new(config, EngineServices::headless(), HeadlessPhysics::loader())
    }

    /// Initialise every system. Returns true if all of them are ready;
    /// physics may still be coming up asynchronously.
    pub fn initialise(&mut self) -> bool {
        for kind in SystemKind::ALL {
            let Self {
                services,
                game_objects,
                physics,
                lighting,
                rendering,
                ..
            } = self;
            let system: &mut dyn System = match kind {
                SystemKind::GameObjects => game_objects,
                SystemKind::Physics => physics,
                SystemKind::Lighting => lighting,
                SystemKind::Rendering => rendering,
            };
            if !system.initialise(false, services) && !system.is_ready() {
                log::debug!("Engine: {} not ready after initialise", system.name());
            }
        }
        self.is_ready()
    }

    /// True once every system has initialised
    pub fn is_ready(&self) -> bool {
        self.game_objects.is_ready() && self.physics.is_ready() && self.lighting.is_ready() && self.rendering.is_ready()
    }

    /// Resolve once every system is ready, driving physics bring-up on the
    /// caller's executor.
    ///
    /// Starts initialisation if it has not been started. Fails if bring-up
    /// fails.
    pub async fn wait_until_ready(&mut self) -> Result<(), EngineError> {
        if !self.is_ready() && !self.physics.is_bringing_up() {
            self.initialise();
        }

        let Self { physics, services, .. } = self;
        futures::future::poll_fn(|cx| physics.poll_bring_up(cx, services)).await;

        if self.is_ready() {
            log::info!("Engine: all systems ready");
            Ok(())
        } else {
            let pending: Vec<&str> = SystemKind::ALL
                .into_iter()
                .filter(|&kind| !self.system(kind).is_ready())
                .map(|kind| self.system(kind).name())
                .collect();
            Err(EngineError::NotReady(pending.join(", ")))
        }
    }

    /// The world
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// The world, mutably
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Live backends
    pub const fn services(&self) -> &EngineServices {
        &self.services
    }

    /// Live backends, mutably
    pub fn services_mut(&mut self) -> &mut EngineServices {
        &mut self.services
    }

    /// Queue for structural changes applied at the end of the next tick
    pub fn commands_mut(&mut self) -> &mut CommandQueue {
        &mut self.commands
    }

    /// Configuration the engine was built with
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Tick timing
    pub const fn stats(&self) -> &TickStats {
        &self.stats
    }

    /// The physics system
    pub const fn physics_system(&self) -> &PhysicsSystem {
        &self.physics
    }

    /// The physics system, mutably (for event subscriptions)
    pub fn physics_system_mut(&mut self) -> &mut PhysicsSystem {
        &mut self.physics
    }

    /// The lighting system
    pub const fn lighting_system(&self) -> &LightingSystem {
        &self.lighting
    }

    /// The rendering system
    pub const fn rendering_system(&self) -> &RenderingSystem {
        &self.rendering
    }

    /// Switch the glow layer on or off
    pub fn set_glow_enabled(&mut self, enabled: bool) {
        if enabled {
            self.rendering.enable_glow_layer(&mut self.services);
        } else {
            self.rendering.disable_glow_layer(&mut self.services);
        }
    }

    /// One system as a trait object
    pub fn system(&self, kind: SystemKind) -> &dyn System {
        match kind {
            SystemKind::GameObjects => &self.game_objects,
            SystemKind::Physics => &self.physics,
            SystemKind::Lighting => &self.lighting,
            SystemKind::Rendering => &self.rendering,
        }
    }

    /// Create an object with no components. It is not registered anywhere.
    pub fn create_game_object(&mut self, name: impl Into<String>, transform: TransformComponent) -> GameObjectId {
        self.world.create_game_object(name, transform)
    }

    /// Create a primitive-mesh object and register it
    pub fn spawn_shape(
        &mut self,
        name: &str,
        shape: ShapeType,
        transform: TransformComponent,
    ) -> Result<GameObjectId, EngineError> {
        let id = GameObjectFactory::create_shape_game_object(&mut self.world, &mut self.services, name, shape, transform)?;
        self.add_game_object(id)?;
        Ok(id)
    }

    /// Create a light object and register it
    pub fn spawn_light(&mut self, params: &LightParams, transform: TransformComponent) -> Result<GameObjectId, EngineError> {
        let id = GameObjectFactory::create_light_game_object(&mut self.world, &mut self.services, params, transform)?;
        self.add_game_object(id)?;
        Ok(id)
    }

    /// Create a camera object and register it
    pub fn spawn_camera(&mut self, name: &str, transform: TransformComponent) -> Result<GameObjectId, EngineError> {
        let id = GameObjectFactory::create_camera_game_object(&mut self.world, &mut self.services, name, transform)?;
        self.add_game_object(id)?;
        Ok(id)
    }

    /// Attach a component now (outside a tick)
    pub fn add_component(
        &mut self,
        id: GameObjectId,
        component: impl Into<crate::ecs::Component>,
    ) -> Result<(), EngineError> {
        Ok(self.world.add_component(id, component, &mut self.services)?)
    }

    /// Parent `child` under `parent` now (outside a tick)
    pub fn add_child(&mut self, parent: GameObjectId, child: GameObjectId) -> Result<(), EngineError> {
        Ok(self.world.add_child(parent, child, &mut self.services)?)
    }

    /// Register with the game object, lighting and physics systems.
    ///
    /// Returns false if it was already registered with all of them.
    pub fn add_game_object(&mut self, id: GameObjectId) -> Result<bool, EngineError> {
        let mut added = false;
        for kind in SystemKind::DEFAULT_REGISTRATION {
            added |= self.register_with(kind, id)?;
        }
        Ok(added)
    }

    /// Register with one system. Returns false if already registered there.
    pub fn register_with(&mut self, kind: SystemKind, id: GameObjectId) -> Result<bool, EngineError> {
        if !self.world.contains(id) {
            return Err(GameObjectError::UnknownObject(id).into());
        }
        let Self {
            world,
            services,
            game_objects,
            physics,
            lighting,
            rendering,
            ..
        } = self;
        let system: &mut dyn System = match kind {
            SystemKind::GameObjects => game_objects,
            SystemKind::Physics => physics,
            SystemKind::Lighting => lighting,
            SystemKind::Rendering => rendering,
        };
        if !system.add_game_object(world, services, id) {
            return Ok(false);
        }
        if let Some(object) = world.get_mut(id) {
            object.retain();
        }
        Ok(true)
    }

    /// Unregister from one system. When that was the object's last
    /// registration, the object and its descendants are destroyed.
    ///
    /// Returns the destroyed ids.
    pub fn unregister_from(&mut self, kind: SystemKind, id: GameObjectId) -> Result<Vec<GameObjectId>, EngineError> {
        if !self.world.contains(id) {
            return Err(GameObjectError::UnknownObject(id).into());
        }
        if !self.remove_from(kind, id) {
            return Ok(Vec::new());
        }
        let remaining = self.world.get_mut(id).map_or(0, |object| object.release());
        if remaining == 0 {
            Ok(self.remove_game_object(id))
        } else {
            Ok(Vec::new())
        }
    }

    /// Unregister `id` and its descendants from every system and destroy
    /// them, releasing their backend resources. Returns the destroyed ids.
    pub fn remove_game_object(&mut self, id: GameObjectId) -> Vec<GameObjectId> {
        for doomed in self.world.subtree(id) {
            for kind in SystemKind::ALL {
                self.remove_from(kind, doomed);
            }
        }
        self.world.destroy(id, &mut self.services)
    }

    fn remove_from(&mut self, kind: SystemKind, id: GameObjectId) -> bool {
        let Self {
            services,
            game_objects,
            physics,
            lighting,
            rendering,
            ..
        } = self;
        let system: &mut dyn System = match kind {
            SystemKind::GameObjects => game_objects,
            SystemKind::Physics => physics,
            SystemKind::Lighting => lighting,
            SystemKind::Rendering => rendering,
        };
        system.remove_game_object(services, id)
    }

    /// Advance one tick of `dt` seconds. Returns how many deferred commands
    /// were applied.
    pub fn tick(&mut self, dt: f32) -> usize {
        let mut stopwatch = Stopwatch::start_new();

        let Self {
            world,
            services,
            game_objects,
            physics,
            lighting,
            rendering,
            commands,
            ..
        } = self;
        game_objects.update(world, services, commands, dt);
        physics.update(world, services, commands, dt);
        lighting.update(world, services, commands, dt);
        rendering.update(world, services, commands, dt);
        let applied = world.apply_commands(commands, services);

        self.stats.record(stopwatch.stop(), dt);
        log::trace!("Engine: tick {} applied {} deferred commands", self.stats.ticks(), applied);
        applied
    }

    /// Advance `ticks` fixed steps of `dt` seconds
    pub fn run(&mut self, ticks: u32, dt: f32) {
        for _ in 0..ticks {
            self.tick(dt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::headless::HeadlessRenderer;
    use crate::backend::BackendFuture;

    #[test]
    fn test_headless_engine_initialises_synchronously() {
        let mut engine = Engine::headless(EngineConfig::default()).unwrap();
        assert!(!engine.is_ready());
        assert!(engine.initialise());
        assert!(engine.services().physics.is_some());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let result = Engine::headless(EngineConfig::new().with_log_level("shouty"));
        assert!(matches!(result, Err(EngineError::Config(ConfigError::Invalid(_)))));
    }

    #[test]
    fn test_wait_until_ready_drives_deferred_bring_up() {
        let mut engine = Engine::new(
            EngineConfig::default(),
            EngineServices::headless(),
            HeadlessPhysics::deferred_loader(3),
        )
        .unwrap();

        futures::executor::block_on(engine.wait_until_ready()).unwrap();
        assert!(engine.is_ready());
    }

    #[test]
    fn test_wait_until_ready_reports_failure() {
        let mut engine = Engine::new(
            EngineConfig::default(),
            EngineServices::headless(),
            HeadlessPhysics::failing_loader("no device"),
        )
        .unwrap();

        let result = futures::executor::block_on(engine.wait_until_ready());
        match result {
            Err(EngineError::NotReady(pending)) => assert_eq!(pending, "PhysicsSystem"),
            other => panic!("expected NotReady, got {:?}", other),
        }
    }

    #[test]
    fn test_registration_counts_and_release() {
        let mut engine = Engine::headless(EngineConfig::default()).unwrap();
        engine.initialise();
        let id = engine
            .spawn_shape("box", ShapeType::Box, TransformComponent::identity())
            .unwrap();
        assert_eq!(engine.world().get(id).unwrap().registrations(), 3);
        assert!(!engine.add_game_object(id).unwrap());

        assert!(engine.unregister_from(SystemKind::Lighting, id).unwrap().is_empty());
        assert!(engine.unregister_from(SystemKind::Physics, id).unwrap().is_empty());
        assert_eq!(engine.unregister_from(SystemKind::GameObjects, id).unwrap(), vec![id]);

        assert!(!engine.world().contains(id));
        assert_eq!(engine.services().renderer_as::<HeadlessRenderer>().unwrap().mesh_count(), 0);
    }

    #[test]
    fn test_unknown_object_registration_fails() {
        let mut engine = Engine::headless(EngineConfig::default()).unwrap();
        let id = engine.create_game_object("temp", TransformComponent::identity());
        engine.remove_game_object(id);

        assert!(matches!(
            engine.register_with(SystemKind::Physics, id),
            Err(EngineError::GameObject(GameObjectError::UnknownObject(_)))
        ));
    }

    #[test]
    fn test_tick_records_stats() {
        let loader: PhysicsLoader = Box::new(|| -> BackendFuture { HeadlessPhysics::deferred(0, HeadlessPhysics::new()) });
        let mut engine = Engine::new(EngineConfig::default(), EngineServices::headless(), loader).unwrap();
        engine.initialise();

        engine.run(5, 0.02);

        assert_eq!(engine.stats().ticks(), 5);
        assert!((engine.stats().simulated_secs() - 0.1).abs() < 1e-6);
        assert_eq!(engine.services().renderer_as::<HeadlessRenderer>().unwrap().frames(), 5);
    }
}
