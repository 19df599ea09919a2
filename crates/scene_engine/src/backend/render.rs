//! # Render Backend Abstraction
//!
//! The composition layer never draws anything itself. It pushes poses into
//! opaque meshes, links mesh parents, positions cameras and submits debug
//! lines; the backend owns everything else.

use std::any::Any;

use super::{BackendResult, CameraHandle, MeshHandle};
use crate::foundation::math::{Transform, Vec3};

/// Primitive shapes the factories can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeType {
    /// Unit cube
    Box,
    /// Sphere
    Sphere,
    /// Flat square
    Plane,
    /// Capsule
    Capsule,
    /// Cylinder
    Cylinder,
    /// Ground plane
    Ground,
}

/// Request to create a mesh
#[derive(Debug, Clone, PartialEq)]
pub struct MeshDesc {
    /// Display name
    pub name: String,
    /// Primitive shape
    pub shape: ShapeType,
    /// Characteristic size (diameter, edge length)
    pub size: f32,
    /// Initial pose
    pub pose: Transform,
}

/// # Render Backend Trait
///
/// Mesh, camera and debug-line operations used by the systems.
///
/// ## Implementation Notes
///
/// Unknown handles must be ignored (or logged), never panic: a mesh may be
/// destroyed while a stale handle is still queued somewhere.
pub trait RenderBackend {
    /// Create a mesh
    ///
    /// # Returns
    /// Handle to the new mesh or a resource-creation error
    fn create_mesh(&mut self, desc: &MeshDesc) -> BackendResult<MeshHandle>;

    /// Destroy a mesh and release its resources
    fn destroy_mesh(&mut self, mesh: MeshHandle);

    /// Overwrite a mesh's position, rotation and scale
    fn set_mesh_pose(&mut self, mesh: MeshHandle, pose: &Transform);

    /// Read a mesh's current pose
    fn mesh_pose(&self, mesh: MeshHandle) -> Option<Transform>;

    /// Link `mesh` under `parent` in the render hierarchy (`None` detaches)
    fn set_mesh_parent(&mut self, mesh: MeshHandle, parent: Option<MeshHandle>);

    /// Create a camera
    fn create_camera(&mut self, name: &str, position: Vec3) -> BackendResult<CameraHandle>;

    /// Move a camera
    fn set_camera_position(&mut self, camera: CameraHandle, position: Vec3);

    /// Toggle the glow post-process layer
    fn set_glow_enabled(&mut self, enabled: bool);

    /// Queue a debug line segment for the current frame
    ///
    /// # Arguments
    /// * `from`, `to` - World-space endpoints
    /// * `colour` - RGB in range [0.0, 1.0]
    fn submit_debug_line(&mut self, from: Vec3, to: Vec3, colour: Vec3);

    /// Finish the frame; queued debug lines are consumed
    fn end_frame(&mut self);

    /// Downcast to Any for type-specific access
    fn as_any(&self) -> &dyn Any;

    /// Downcast to Any for mutable type-specific access
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
