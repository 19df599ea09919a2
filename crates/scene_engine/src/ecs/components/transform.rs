//! Transform component
//!
//! Local position, rotation and scale of a game object plus the dirty flag
//! the reconciliation pass keys on. Every setter marks the transform dirty;
//! [`TransformComponent::update`] clears it once per tick after the systems
//! have consumed it. Constructors and builders produce a clean transform.
//!
//! Axis conventions: Y-up, right-handed, forward is +Z.

use crate::foundation::math::{self, Mat4, Quat, Transform as MathTransform, Vec3};

/// Smallest absolute scale component; zero scales are clamped to this.
pub const MIN_SCALE: f32 = 1e-4;

const UP: Vec3 = Vec3::new(0.0, 1.0, 0.0);
const FORWARD: Vec3 = Vec3::new(0.0, 0.0, 1.0);
const RIGHT: Vec3 = Vec3::new(1.0, 0.0, 0.0);

/// Local transform of a game object
#[derive(Debug, Clone, PartialEq)]
pub struct TransformComponent {
    position: Vec3,
    rotation: Quat,
    scale: Vec3,
    is_dirty: bool,
}

impl Default for TransformComponent {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
            is_dirty: false,
        }
    }
}

fn guarded(scale: Vec3) -> Vec3 {
    let (scale, clamped) = math::guard_scale(scale, MIN_SCALE);
    if clamped {
        log::warn!("TransformComponent: zero scale component clamped to {:?}", scale);
    }
    scale
}

impl TransformComponent {
    /// Create identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create from position only
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create from position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    /// Create from a pose value
    pub fn from_math_transform(transform: &MathTransform) -> Self {
        Self {
            position: transform.position,
            rotation: transform.rotation,
            scale: guarded(transform.scale),
            is_dirty: false,
        }
    }

    /// Builder pattern: Set position
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Builder pattern: Set rotation from quaternion
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Builder pattern: Set rotation from Euler angles (radians)
    pub fn with_rotation_euler(mut self, euler: Vec3) -> Self {
        self.rotation = math::quat_from_yaw_pitch_roll(euler);
        self
    }

    /// Builder pattern: Set scale (uniform)
    pub fn with_uniform_scale(mut self, scale: f32) -> Self {
        self.scale = guarded(Vec3::new(scale, scale, scale));
        self
    }

    /// Builder pattern: Set scale (non-uniform)
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = guarded(scale);
        self
    }

    /// Local position
    pub const fn position(&self) -> Vec3 {
        self.position
    }

    /// Local rotation
    pub const fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Local scale
    pub const fn scale(&self) -> Vec3 {
        self.scale
    }

    /// True if a setter ran since the last [`update`](Self::update)
    pub const fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    /// Move the object
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.is_dirty = true;
    }

    /// Rotate the object
    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
        self.is_dirty = true;
    }

    /// Rotate from Euler angles in radians (roll, then pitch, then yaw)
    pub fn set_rotation_euler(&mut self, euler: Vec3) {
        self.set_rotation(math::quat_from_yaw_pitch_roll(euler));
    }

    /// Rescale the object; zero components are clamped to [`MIN_SCALE`]
    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = guarded(scale);
        self.is_dirty = true;
    }

    /// Uniform rescale
    pub fn set_size(&mut self, size: f32) {
        self.set_scale(Vec3::new(size, size, size));
    }

    /// Mean of the three scale components
    pub fn size(&self) -> f32 {
        (self.scale.x + self.scale.y + self.scale.z) / 3.0
    }

    /// Unit up vector (local +Y rotated)
    pub fn up(&self) -> Vec3 {
        math::safe_normalize(self.rotation * UP, UP)
    }

    /// Unit forward vector (local +Z rotated)
    pub fn forward(&self) -> Vec3 {
        math::safe_normalize(self.rotation * FORWARD, FORWARD)
    }

    /// Unit right vector (local +X rotated)
    pub fn right(&self) -> Vec3 {
        math::safe_normalize(self.rotation * RIGHT, RIGHT)
    }

    /// Composed scale, rotate, translate matrix
    pub fn matrix(&self) -> Mat4 {
        self.to_math_transform().to_matrix()
    }

    /// Pose value of this transform
    pub fn to_math_transform(&self) -> MathTransform {
        MathTransform {
            position: self.position,
            rotation: self.rotation,
            scale: self.scale,
        }
    }

    /// End-of-tick update: clears the dirty flag unconditionally
    pub fn update(&mut self, _dt: f32) {
        self.is_dirty = false;
    }

    /// Adopt a simulated pose (position and rotation) without leaving the
    /// transform dirty
    pub(crate) fn sync_from_simulation(&mut self, pose: &MathTransform) {
        self.position = pose.position;
        self.rotation = pose.rotation;
        self.is_dirty = false;
    }
}

/// Transform factory for creating common transform configurations
pub struct TransformFactory;

impl TransformFactory {
    /// Transform at `position` whose forward (+Z) points along `direction`.
    ///
    /// A degenerate direction yields the identity rotation.
    pub fn facing(position: Vec3, direction: Vec3) -> TransformComponent {
        Self::look_at(position, position + direction, UP)
    }

    /// Transform at `position` whose forward (+Z) points at `target`.
    ///
    /// When `target - position` is parallel to `up`, +X is used as the
    /// secondary axis instead.
    pub fn look_at(position: Vec3, target: Vec3, up: Vec3) -> TransformComponent {
        let Some(direction) = (target - position).try_normalize(math::NORMALIZE_EPSILON) else {
            return TransformComponent::from_position(position);
        };
        let up = if direction.cross(&up).magnitude_squared() < math::NORMALIZE_EPSILON {
            RIGHT
        } else {
            up
        };
        TransformComponent::from_position_rotation(position, Quat::face_towards(&direction, &up))
    }
}
