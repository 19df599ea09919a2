//! System trait and shared registration state
//!
//! A system owns a registry of game objects, initialises once (possibly
//! asynchronously) and then runs once per tick. [`SystemCore`] holds the
//! state every system shares so implementations only add their own logic.

use std::collections::HashSet;

use super::commands::CommandQueue;
use super::entity::GameObjectId;
use super::world::World;
use crate::backend::EngineServices;

/// Lifecycle state of a system
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SystemState {
    /// Not yet initialised
    #[default]
    Uninitialised,
    /// Initialisation started but has not completed
    Initialising,
    /// Ready to update
    Initialised,
    /// Initialisation failed; may be retried
    Failed,
}

/// Registration list and lifecycle state shared by every system
#[derive(Debug, Default)]
pub struct SystemCore {
    state: SystemState,
    registry: Vec<GameObjectId>,
    index: HashSet<GameObjectId>,
}

impl SystemCore {
    /// Create an uninitialised core with an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an initialise call should proceed.
    ///
    /// Without `reinitialise`, a system that is initialised or mid-way
    /// through initialising is left alone.
    pub fn can_initialise(&self, reinitialise: bool) -> bool {
        reinitialise || !matches!(self.state, SystemState::Initialised | SystemState::Initialising)
    }

    /// Current state
    pub const fn state(&self) -> SystemState {
        self.state
    }

    /// Transition to `state`
    pub fn set_state(&mut self, state: SystemState) {
        self.state = state;
    }

    /// True once initialisation has completed
    pub fn is_ready(&self) -> bool {
        self.state == SystemState::Initialised
    }

    /// Register an object. Returns false if it was already registered.
    pub fn register(&mut self, id: GameObjectId) -> bool {
        if self.index.insert(id) {
            self.registry.push(id);
            true
        } else {
            false
        }
    }

    /// Unregister an object. Returns false if it was not registered.
    pub fn unregister(&mut self, id: GameObjectId) -> bool {
        if self.index.remove(&id) {
            self.registry.retain(|&registered| registered != id);
            true
        } else {
            false
        }
    }

    /// Whether `id` is registered
    pub fn contains(&self, id: GameObjectId) -> bool {
        self.index.contains(&id)
    }

    /// Number of registered objects
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// True if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Registered objects in registration order
    pub fn ids(&self) -> &[GameObjectId] {
        &self.registry
    }

    /// Drop every registration
    pub fn clear(&mut self) {
        self.registry.clear();
        self.index.clear();
    }
}

/// A unit of per-tick behaviour over a set of registered game objects
pub trait System {
    /// Name used in log output
    fn name(&self) -> &'static str;

    /// Shared state
    fn core(&self) -> &SystemCore;

    /// Mutable shared state
    fn core_mut(&mut self) -> &mut SystemCore;

    /// Start initialisation. Returns true if the system is ready when the
    /// call returns; asynchronous systems complete later.
    fn initialise(&mut self, reinitialise: bool, services: &mut EngineServices) -> bool;

    /// Per-tick work
    fn update(&mut self, world: &mut World, services: &mut EngineServices, commands: &mut CommandQueue, dt: f32);

    /// Register an object. Returns false if it was already registered.
    fn add_game_object(&mut self, _world: &World, _services: &mut EngineServices, id: GameObjectId) -> bool {
        self.core_mut().register(id)
    }

    /// Unregister an object, releasing any backend state the system created
    /// for it. Returns false if it was not registered.
    fn remove_game_object(&mut self, _services: &mut EngineServices, id: GameObjectId) -> bool {
        self.core_mut().unregister(id)
    }

    /// True once initialisation has completed
    fn is_ready(&self) -> bool {
        self.core().is_ready()
    }
}
