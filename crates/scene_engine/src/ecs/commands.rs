//! Deferred structural mutations
//!
//! Component and child lists must not change while an update pass walks
//! them. Components queue their requests here instead; the engine applies
//! the queue once every system has finished the tick.

use super::component::Component;
use super::entity::GameObjectId;
use crate::foundation::math::{Quat, Vec3};

/// A queued mutation
#[derive(Debug)]
pub enum Command {
    /// Attach a component
    AddComponent {
        /// Receiving object
        target: GameObjectId,
        /// Component to attach
        component: Component,
    },
    /// Parent `child` under `parent`
    AddChild {
        /// New parent
        parent: GameObjectId,
        /// New child
        child: GameObjectId,
    },
    /// Move an object
    SetPosition {
        /// Object to move
        target: GameObjectId,
        /// New local position
        position: Vec3,
    },
    /// Rotate an object
    SetRotation {
        /// Object to rotate
        target: GameObjectId,
        /// New local rotation
        rotation: Quat,
    },
    /// Rescale an object
    SetScale {
        /// Object to rescale
        target: GameObjectId,
        /// New local scale
        scale: Vec3,
    },
}

/// FIFO of deferred mutations
#[derive(Debug, Default)]
pub struct CommandQueue {
    pending: Vec<Command>,
}

impl CommandQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a command
    pub fn push(&mut self, command: Command) {
        self.pending.push(command);
    }

    /// Queue a component attachment
    pub fn add_component(&mut self, target: GameObjectId, component: impl Into<Component>) {
        self.push(Command::AddComponent {
            target,
            component: component.into(),
        });
    }

    /// Queue a parenting
    pub fn add_child(&mut self, parent: GameObjectId, child: GameObjectId) {
        self.push(Command::AddChild { parent, child });
    }

    /// Queue a move
    pub fn set_position(&mut self, target: GameObjectId, position: Vec3) {
        self.push(Command::SetPosition { target, position });
    }

    /// Queue a rotation
    pub fn set_rotation(&mut self, target: GameObjectId, rotation: Quat) {
        self.push(Command::SetRotation { target, rotation });
    }

    /// Queue a rescale
    pub fn set_scale(&mut self, target: GameObjectId, scale: Vec3) {
        self.push(Command::SetScale { target, scale });
    }

    /// Number of queued commands
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// True if nothing is queued
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub(crate) fn take(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.pending)
    }
}
