//! Component variants and lookup
//!
//! Components form a closed enum keyed by [`ComponentKind`], so a game
//! object can hold at most one of each kind and look any of them up in O(1).
//! Behaviour that is not built in plugs in through [`CustomComponent`].

use std::any::Any;
use std::fmt;

use bitflags::bitflags;

use super::commands::CommandQueue;
use super::components::{
    CameraComponent, LightComponent, MeshComponent, PhysicsAttractor, PhysicsComponent,
    TransformComponent,
};
use super::entity::{GameObjectId, OwnerRef};
use crate::backend::EngineServices;
use crate::foundation::math::Transform;

/// Discriminant of a [`Component`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// Renderable mesh
    Mesh,
    /// Light source
    Light,
    /// Rigid body
    Physics,
    /// Attractor/repeller field
    Attractor,
    /// Camera
    Camera,
    /// User component, keyed by its kind name
    Custom(&'static str),
}

bitflags! {
    /// Set of component kinds present on a game object
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ComponentMask: u8 {
        /// Has a mesh
        const MESH = 1;
        /// Has a light
        const LIGHT = 1 << 1;
        /// Has a rigid body component
        const PHYSICS = 1 << 2;
        /// Has an attractor
        const ATTRACTOR = 1 << 3;
        /// Has a camera
        const CAMERA = 1 << 4;
        /// Has at least one custom component
        const CUSTOM = 1 << 5;
    }
}

impl ComponentKind {
    /// Mask bit for this kind
    pub const fn mask(self) -> ComponentMask {
        match self {
            Self::Mesh => ComponentMask::MESH,
            Self::Light => ComponentMask::LIGHT,
            Self::Physics => ComponentMask::PHYSICS,
            Self::Attractor => ComponentMask::ATTRACTOR,
            Self::Camera => ComponentMask::CAMERA,
            Self::Custom(_) => ComponentMask::CUSTOM,
        }
    }
}

/// What a component sees during its per-tick update.
///
/// The owner's transform is read-only here. Structural changes (new
/// components, new children, moving the owner) go through `commands` and
/// are applied once the tick has finished.
pub struct UpdateContext<'a> {
    /// Object being updated
    pub owner: GameObjectId,
    /// Its local transform
    pub transform: &'a TransformComponent,
    /// Its resolved world transform, after reconciliation
    pub world: Transform,
    /// Live backends
    pub services: &'a mut EngineServices,
    /// Deferred mutations
    pub commands: &'a mut CommandQueue,
}

/// User-defined component behaviour
pub trait CustomComponent: fmt::Debug + 'static {
    /// Unique kind name; one component per name per object
    fn kind_name(&self) -> &'static str;

    /// Per-tick update, after the owner's poses have been reconciled
    fn update(&mut self, _ctx: &mut UpdateContext<'_>, _dt: f32) {}

    /// Release any backend resources; called when the owner is destroyed
    fn release(&mut self, _services: &mut EngineServices) {}

    /// Downcast to Any for type-specific access
    fn as_any(&self) -> &dyn Any;

    /// Downcast to Any for mutable type-specific access
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A capability attached to exactly one game object
#[derive(Debug)]
pub enum Component {
    /// Renderable mesh
    Mesh(MeshComponent),
    /// Light source
    Light(LightComponent),
    /// Rigid body
    Physics(PhysicsComponent),
    /// Attractor/repeller field
    Attractor(PhysicsAttractor),
    /// Camera
    Camera(CameraComponent),
    /// User component
    Custom {
        /// Owning object
        owner: OwnerRef,
        /// Behaviour
        behaviour: Box<dyn CustomComponent>,
    },
}

impl Component {
    /// Wrap a custom behaviour
    pub fn custom(behaviour: impl CustomComponent) -> Self {
        Self::Custom {
            owner: OwnerRef::default(),
            behaviour: Box::new(behaviour),
        }
    }

    /// Discriminant
    pub fn kind(&self) -> ComponentKind {
        match self {
            Self::Mesh(_) => ComponentKind::Mesh,
            Self::Light(_) => ComponentKind::Light,
            Self::Physics(_) => ComponentKind::Physics,
            Self::Attractor(_) => ComponentKind::Attractor,
            Self::Camera(_) => ComponentKind::Camera,
            Self::Custom { behaviour, .. } => ComponentKind::Custom(behaviour.kind_name()),
        }
    }

    fn owner_ref(&self) -> &OwnerRef {
        match self {
            Self::Mesh(c) => &c.owner,
            Self::Light(c) => &c.owner,
            Self::Physics(c) => &c.owner,
            Self::Attractor(c) => &c.owner,
            Self::Camera(c) => &c.owner,
            Self::Custom { owner, .. } => owner,
        }
    }

    /// Object this component is attached to
    pub fn owner(&self) -> Option<GameObjectId> {
        self.owner_ref().get()
    }

    pub(crate) fn bind_owner(&mut self, id: GameObjectId) -> bool {
        match self {
            Self::Mesh(c) => c.owner.bind(id),
            Self::Light(c) => c.owner.bind(id),
            Self::Physics(c) => c.owner.bind(id),
            Self::Attractor(c) => c.owner.bind(id),
            Self::Camera(c) => c.owner.bind(id),
            Self::Custom { owner, .. } => owner.bind(id),
        }
    }

    pub(crate) fn update(&mut self, ctx: &mut UpdateContext<'_>, dt: f32) {
        if let Self::Custom { behaviour, .. } = self {
            behaviour.update(ctx, dt);
        }
    }

    pub(crate) fn release(&mut self, services: &mut EngineServices) {
        match self {
            Self::Mesh(c) => c.release(services),
            Self::Light(c) => c.release(services),
            Self::Physics(c) => c.release(services),
            Self::Attractor(_) | Self::Camera(_) => {}
            Self::Custom { behaviour, .. } => behaviour.release(services),
        }
    }
}

/// Built-in component types that can be looked up by type
pub trait ComponentVariant: Sized + 'static {
    /// Kind this type is stored under
    const KIND: ComponentKind;

    /// Borrow from a component of the matching variant
    fn from_component(component: &Component) -> Option<&Self>;

    /// Mutably borrow from a component of the matching variant
    fn from_component_mut(component: &mut Component) -> Option<&mut Self>;
}

macro_rules! component_variant {
    ($ty:ty, $variant:ident) => {
        impl ComponentVariant for $ty {
            const KIND: ComponentKind = ComponentKind::$variant;

            fn from_component(component: &Component) -> Option<&Self> {
                match component {
                    Component::$variant(c) => Some(c),
                    _ => None,
                }
            }

            fn from_component_mut(component: &mut Component) -> Option<&mut Self> {
                match component {
                    Component::$variant(c) => Some(c),
                    _ => None,
                }
            }
        }

        impl From<$ty> for Component {
            fn from(component: $ty) -> Self {
                Component::$variant(component)
            }
        }
    };
}

component_variant!(MeshComponent, Mesh);
component_variant!(LightComponent, Light);
component_variant!(PhysicsComponent, Physics);
component_variant!(PhysicsAttractor, Attractor);
component_variant!(CameraComponent, Camera);
