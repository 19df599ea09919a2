//! Game objects: a transform plus an ordered set of components
//!
//! At most one component per [`ComponentKind`] is allowed, so lookup goes
//! through a kind → slot index instead of scanning. Adding a component
//! re-derives the cross-component links (a light is attached to the
//! object's mesh whenever both are present).

use std::collections::HashMap;

use super::commands::CommandQueue;
use super::component::{Component, ComponentKind, ComponentMask, ComponentVariant, CustomComponent, UpdateContext};
use super::components::{
    CameraComponent, LightComponent, MeshComponent, PhysicsAttractor, PhysicsComponent,
    TransformComponent,
};
use super::entity::GameObjectId;
use crate::backend::EngineServices;
use crate::foundation::math::Transform;

/// Errors from game object and hierarchy operations
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GameObjectError {
    /// The id does not name a live object
    #[error("Unknown game object {0:?}")]
    UnknownObject(GameObjectId),

    /// The object already has a component of this kind
    #[error("{object:?} already has a {kind:?} component")]
    DuplicateComponent {
        /// Receiving object
        object: GameObjectId,
        /// Rejected kind
        kind: ComponentKind,
    },

    /// The component is already owned by another object
    #[error("{kind:?} component is already attached to {owner:?}")]
    ComponentAlreadyAttached {
        /// Kind of the component
        kind: ComponentKind,
        /// Its existing owner
        owner: GameObjectId,
    },

    /// An object cannot be its own child
    #[error("{0:?} cannot be parented to itself")]
    SelfParenting(GameObjectId),

    /// The child is an ancestor of the parent
    #[error("Parenting {child:?} under {parent:?} would create a cycle")]
    CyclicHierarchy {
        /// Requested parent
        parent: GameObjectId,
        /// Requested child
        child: GameObjectId,
    },

    /// The child already has a parent
    #[error("{child:?} is already a child of {parent:?}")]
    AlreadyParented {
        /// Requested child
        child: GameObjectId,
        /// Its current parent
        parent: GameObjectId,
    },
}

/// An entity in the scene
#[derive(Debug)]
pub struct GameObject {
    id: GameObjectId,
    name: String,
    transform: TransformComponent,
    components: Vec<Component>,
    index: HashMap<ComponentKind, usize>,
    mask: ComponentMask,
    pub(crate) parent: Option<GameObjectId>,
    pub(crate) children: Vec<GameObjectId>,
    registrations: u32,
}

impl GameObject {
    pub(crate) fn new(id: GameObjectId, name: String, transform: TransformComponent) -> Self {
        Self {
            id,
            name,
            transform,
            components: Vec::new(),
            index: HashMap::new(),
            mask: ComponentMask::empty(),
            parent: None,
            children: Vec::new(),
            registrations: 0,
        }
    }

    /// Stable identifier
    pub const fn id(&self) -> GameObjectId {
        self.id
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Local transform
    pub const fn transform(&self) -> &TransformComponent {
        &self.transform
    }

    /// Mutable local transform; setters mark it dirty
    pub fn transform_mut(&mut self) -> &mut TransformComponent {
        &mut self.transform
    }

    /// Parent object, if any
    pub const fn parent(&self) -> Option<GameObjectId> {
        self.parent
    }

    /// Children in insertion order
    pub fn children(&self) -> &[GameObjectId] {
        &self.children
    }

    /// Components in attachment order
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Kinds present
    pub const fn mask(&self) -> ComponentMask {
        self.mask
    }

    /// Whether a component of `kind` is attached
    pub fn has(&self, kind: ComponentKind) -> bool {
        self.index.contains_key(&kind)
    }

    /// Look up a built-in component by type; absence is a normal outcome
    pub fn get_component<T: ComponentVariant>(&self) -> Option<&T> {
        self.index
            .get(&T::KIND)
            .and_then(|&slot| T::from_component(&self.components[slot]))
    }

    /// Mutable lookup of a built-in component by type
    pub fn get_component_mut<T: ComponentVariant>(&mut self) -> Option<&mut T> {
        let slot = *self.index.get(&T::KIND)?;
        T::from_component_mut(&mut self.components[slot])
    }

    /// Look up a custom component by concrete type
    pub fn get_custom<T: CustomComponent>(&self) -> Option<&T> {
        self.components.iter().find_map(|c| match c {
            Component::Custom { behaviour, .. } => behaviour.as_any().downcast_ref::<T>(),
            _ => None,
        })
    }

    /// Mutable lookup of a custom component by concrete type
    pub fn get_custom_mut<T: CustomComponent>(&mut self) -> Option<&mut T> {
        self.components.iter_mut().find_map(|c| match c {
            Component::Custom { behaviour, .. } => behaviour.as_any_mut().downcast_mut::<T>(),
            _ => None,
        })
    }

    /// Mesh component, if any
    pub fn mesh(&self) -> Option<&MeshComponent> {
        self.get_component()
    }

    /// Light component, if any
    pub fn light(&self) -> Option<&LightComponent> {
        self.get_component()
    }

    /// Physics component, if any
    pub fn physics(&self) -> Option<&PhysicsComponent> {
        self.get_component()
    }

    /// Mutable physics component, if any
    pub fn physics_mut(&mut self) -> Option<&mut PhysicsComponent> {
        self.get_component_mut()
    }

    /// Attractor, if any
    pub fn attractor(&self) -> Option<&PhysicsAttractor> {
        self.get_component()
    }

    /// Mutable attractor, if any
    pub fn attractor_mut(&mut self) -> Option<&mut PhysicsAttractor> {
        self.get_component_mut()
    }

    /// Camera, if any
    pub fn camera(&self) -> Option<&CameraComponent> {
        self.get_component()
    }

    /// Attach a component.
    ///
    /// Binds the component's owner, appends it, then re-derives the
    /// cross-component links. A second component of the same kind is
    /// rejected and dropped without touching the object.
    pub fn add_component(
        &mut self,
        component: impl Into<Component>,
        services: &mut EngineServices,
    ) -> Result<(), GameObjectError> {
        let mut component = component.into();
        let kind = component.kind();

        if self.index.contains_key(&kind) {
            return Err(GameObjectError::DuplicateComponent { object: self.id, kind });
        }
        if let Some(owner) = component.owner() {
            return Err(GameObjectError::ComponentAlreadyAttached { kind, owner });
        }

        component.bind_owner(self.id);
        self.index.insert(kind, self.components.len());
        self.mask |= kind.mask();
        self.components.push(component);

        self.update_parent_relationships(services);
        Ok(())
    }

    /// Detach and release the component of `kind`. Returns false if absent.
    pub fn remove_component(&mut self, kind: ComponentKind, services: &mut EngineServices) -> bool {
        let Some(slot) = self.index.remove(&kind) else {
            return false;
        };
        let mut removed = self.components.remove(slot);
        removed.release(services);

        self.index.clear();
        self.mask = ComponentMask::empty();
        for (slot, component) in self.components.iter().enumerate() {
            let kind = component.kind();
            self.index.insert(kind, slot);
            self.mask |= kind.mask();
        }

        self.update_parent_relationships(services);
        true
    }

    fn update_parent_relationships(&self, services: &mut EngineServices) {
        if let (Some(light), Some(mesh)) = (self.light(), self.mesh()) {
            services.lights.set_light_parent(light.light(), Some(mesh.mesh()));
        }
    }

    /// Run every component's update in attachment order, then clear the
    /// transform's dirty flag.
    pub(crate) fn update_components(
        &mut self,
        world: Transform,
        services: &mut EngineServices,
        commands: &mut CommandQueue,
        dt: f32,
    ) {
        let mut ctx = UpdateContext {
            owner: self.id,
            transform: &self.transform,
            world,
            services,
            commands,
        };
        for component in &mut self.components {
            component.update(&mut ctx, dt);
        }
        self.transform.update(dt);
    }

    /// Release every component's backend resources
    pub(crate) fn release_resources(&mut self, services: &mut EngineServices) {
        for component in &mut self.components {
            component.release(services);
        }
        self.components.clear();
        self.index.clear();
        self.mask = ComponentMask::empty();
    }

    /// Systems this object is registered with
    pub const fn registrations(&self) -> u32 {
        self.registrations
    }

    pub(crate) fn retain(&mut self) {
        self.registrations += 1;
    }

    /// Drop one registration, returning how many remain
    pub(crate) fn release(&mut self) -> u32 {
        self.registrations = self.registrations.saturating_sub(1);
        self.registrations
    }
}
