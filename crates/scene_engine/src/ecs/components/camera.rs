//! Camera component

use crate::backend::CameraHandle;
use crate::ecs::entity::OwnerRef;

/// Camera attached to a game object; follows the object's world position
#[derive(Debug, Clone, PartialEq)]
pub struct CameraComponent {
    pub(crate) owner: OwnerRef,
    camera: CameraHandle,
}

impl CameraComponent {
    /// Wrap an existing camera
    pub fn new(camera: CameraHandle) -> Self {
        Self {
            owner: OwnerRef::default(),
            camera,
        }
    }

    /// Backend camera handle
    pub const fn camera(&self) -> CameraHandle {
        self.camera
    }
}
