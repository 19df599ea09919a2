//! Mesh component: a renderable owned by the render backend

use crate::backend::{EngineServices, MeshHandle};
use crate::ecs::entity::OwnerRef;

/// Renderable mesh attached to a game object
#[derive(Debug, Clone, PartialEq)]
pub struct MeshComponent {
    pub(crate) owner: OwnerRef,
    mesh: MeshHandle,
    /// Whether lighting systems should register this mesh as a shadow receiver
    pub receive_shadows: bool,
}

impl MeshComponent {
    /// Wrap an existing mesh
    pub fn new(mesh: MeshHandle) -> Self {
        Self {
            owner: OwnerRef::default(),
            mesh,
            receive_shadows: true,
        }
    }

    /// Builder pattern: opt out of shadow receiving
    pub fn without_shadows(mut self) -> Self {
        self.receive_shadows = false;
        self
    }

    /// Backend mesh handle
    pub const fn mesh(&self) -> MeshHandle {
        self.mesh
    }

    /// Replace the mesh, destroying the previous one
    pub fn set_mesh(&mut self, mesh: MeshHandle, services: &mut EngineServices) {
        if mesh != self.mesh {
            services.renderer.destroy_mesh(self.mesh);
            self.mesh = mesh;
        }
    }

    pub(crate) fn release(&mut self, services: &mut EngineServices) {
        services.renderer.destroy_mesh(self.mesh);
    }
}
