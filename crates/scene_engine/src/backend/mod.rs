//! # Backend Module
//!
//! Narrow traits over the external services the composition layer drives:
//! rendering (mesh poses, parenting, debug lines), lighting (light poses,
//! shadow generators) and physics (bodies, forces, stepping). The core only
//! ever holds opaque handles; everything behind the traits is swappable.
//!
//! [`EngineServices`] bundles the live backends and is passed explicitly to
//! every operation that needs them. There is no global scene.
//!
//! - **Render**: [`RenderBackend`]
//! - **Light**: [`LightBackend`]
//! - **Physics**: [`PhysicsBackend`], brought up asynchronously
//! - **Headless**: in-memory implementations of all three

pub mod headless;
pub mod light;
pub mod physics;
pub mod render;

use std::fmt;

pub use light::{LightBackend, LightDesc, ShadowSettings};
pub use physics::{
    BackendFuture, BodyDesc, MotionType, PhysicsBackend, PhysicsLoader, PhysicsShape,
};
pub use render::{MeshDesc, RenderBackend, ShapeType};

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Errors reported by backends
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// A mesh, light, body or shadow generator could not be created
    #[error("Resource creation failed: {0}")]
    ResourceCreation(String),

    /// A handle did not refer to a live resource
    #[error("Unknown handle: {0}")]
    UnknownHandle(String),

    /// Asynchronous bring-up failed or panicked
    #[error("Backend bring-up failed: {0}")]
    BringUpFailed(String),
}

macro_rules! backend_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}#{}", stringify!($name), self.0)
            }
        }
    };
}

backend_handle!(
    /// Opaque render-backend mesh
    MeshHandle
);
backend_handle!(
    /// Opaque light-backend light
    LightHandle
);
backend_handle!(
    /// Opaque render-backend camera
    CameraHandle
);
backend_handle!(
    /// Opaque light-backend shadow generator
    ShadowGeneratorHandle
);
backend_handle!(
    /// Opaque physics-backend rigid body
    BodyHandle
);

/// Live backends, passed explicitly to every operation that needs them
pub struct EngineServices {
    /// Render backend
    pub renderer: Box<dyn RenderBackend>,
    /// Light backend
    pub lights: Box<dyn LightBackend>,
    /// Physics backend; `None` until asynchronous bring-up completes
    pub physics: Option<Box<dyn PhysicsBackend>>,
}

impl EngineServices {
    /// Bundle a renderer and light backend. Physics is attached later by
    /// the physics system once its bring-up resolves.
    pub fn new(renderer: Box<dyn RenderBackend>, lights: Box<dyn LightBackend>) -> Self {
        Self {
            renderer,
            lights,
            physics: None,
        }
    }

    /// In-memory renderer and lights
    pub fn headless() -> Self {
        Self::new(
            Box::new(headless::HeadlessRenderer::new()),
            Box::new(headless::HeadlessLights::new()),
        )
    }

    /// The physics backend, if it has been brought up
    pub fn physics_mut(&mut self) -> Option<&mut (dyn PhysicsBackend + 'static)> {
        self.physics.as_deref_mut()
    }

    /// Downcast the renderer
    pub fn renderer_as<T: 'static>(&self) -> Option<&T> {
        self.renderer.as_any().downcast_ref::<T>()
    }

    /// Downcast the light backend
    pub fn lights_as<T: 'static>(&self) -> Option<&T> {
        self.lights.as_any().downcast_ref::<T>()
    }

    /// Downcast the physics backend
    pub fn physics_as<T: 'static>(&self) -> Option<&T> {
        self.physics.as_ref().and_then(|p| p.as_any().downcast_ref::<T>())
    }

    /// Mutably downcast the physics backend
    pub fn physics_as_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.physics.as_mut().and_then(|p| p.as_any_mut().downcast_mut::<T>())
    }
}

impl fmt::Debug for EngineServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineServices")
            .field("physics_ready", &self.physics.is_some())
            .finish_non_exhaustive()
    }
}
