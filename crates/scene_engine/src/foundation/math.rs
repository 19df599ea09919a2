//! Math utilities and types
//!
//! Thin aliases over `nalgebra` plus the pose value type shared by the
//! component layer and the backend traits. Every helper here returns a
//! defined fallback instead of producing NaN for degenerate input.

pub use nalgebra::{Matrix3, Matrix4, Quaternion, Unit, Vector3, Vector4};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Smallest magnitude treated as non-zero by the normalisation helpers.
pub const NORMALIZE_EPSILON: f32 = 1e-6;

/// Position, rotation and scale of an object.
///
/// This is the value type handed across the backend traits (mesh poses,
/// body poses) and returned by world-transform resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Position in 3D space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform with position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    /// Composed matrix: scale first, then rotate, then translate.
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// Hierarchical composition: `self` is the parent, `child` is expressed
    /// in the parent's local space.
    pub fn combine(&self, child: &Transform) -> Transform {
        Transform {
            position: self.position + self.rotation * self.scale.component_mul(&child.position),
            rotation: self.rotation * child.rotation,
            scale: self.scale.component_mul(&child.scale),
        }
    }

    /// Rotate a local direction by this transform's rotation and normalise it,
    /// falling back to `fallback` when the result is degenerate.
    pub fn rotate_direction(&self, local: Vec3, fallback: Vec3) -> Vec3 {
        safe_normalize(self.rotation * local, fallback)
    }
}

/// Normalise `v`, or return `fallback` when `v` is too short to normalise.
pub fn safe_normalize(v: Vec3, fallback: Vec3) -> Vec3 {
    v.try_normalize(NORMALIZE_EPSILON).unwrap_or(fallback)
}

/// Renormalise a raw quaternion, falling back to identity when it collapses
/// (for example the component-wise sum of two opposite rotations).
pub fn normalize_quaternion(q: Quaternion<f32>) -> Quat {
    Unit::try_new(q, NORMALIZE_EPSILON).unwrap_or_else(Quat::identity)
}

/// Replace zero scale components with `±min`, keeping their sign.
///
/// Returns the guarded scale and whether any component was clamped.
pub fn guard_scale(scale: Vec3, min: f32) -> (Vec3, bool) {
    let mut clamped = false;
    let guarded = scale.map(|c| {
        if c.abs() < min {
            clamped = true;
            if c.is_sign_negative() {
                -min
            } else {
                min
            }
        } else {
            c
        }
    });
    (guarded, clamped)
}

/// Rotation built from Euler angles in radians, applied roll (Z), then
/// pitch (X), then yaw (Y).
pub fn quat_from_yaw_pitch_roll(euler: Vec3) -> Quat {
    Quat::from_axis_angle(&Vec3::y_axis(), euler.y)
        * Quat::from_axis_angle(&Vec3::x_axis(), euler.x)
        * Quat::from_axis_angle(&Vec3::z_axis(), euler.z)
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Pi / 2
    pub const HALF_PI: f32 = PI * 0.5;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;
}
