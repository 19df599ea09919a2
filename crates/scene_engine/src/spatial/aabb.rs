//! Axis-aligned bounding boxes

use crate::foundation::math::Vec3;

/// Axis-Aligned Bounding Box for spatial queries
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl AABB {
    /// Create a new AABB from min and max points
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB centered at a point with given half-extents
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Box enclosing a sphere
    pub fn from_sphere(center: Vec3, radius: f32) -> Self {
        let r = radius.abs();
        Self::from_center_extents(center, Vec3::new(r, r, r))
    }

    /// Smallest box enclosing every point, or `None` for an empty iterator
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        points.into_iter().fold(None, |acc: Option<Self>, p| {
            Some(match acc {
                None => Self::new(p, p),
                Some(b) => Self::new(b.min.inf(&p), b.max.sup(&p)),
            })
        })
    }

    /// Grow every face outward by `amount`
    pub fn padded(&self, amount: f32) -> Self {
        let pad = Vec3::new(amount, amount, amount);
        Self::new(self.min - pad, self.max + pad)
    }

    /// Cube sharing this box's center whose side is the box's longest side
    pub fn to_cube(&self) -> Self {
        let half = self.extents().max();
        Self::from_center_extents(self.center(), Vec3::new(half, half, half))
    }

    /// Smallest box enclosing both boxes
    pub fn union(&self, other: &AABB) -> Self {
        Self::new(self.min.inf(&other.min), self.max.sup(&other.max))
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the extents (half-size) of the AABB
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Check if this AABB contains a point, faces included
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x &&
        point.y >= self.min.y && point.y <= self.max.y &&
        point.z >= self.min.z && point.z <= self.max.z
    }

    /// Half-open containment: `min <= p < max` on every axis
    pub fn contains_point_half_open(&self, point: Vec3) -> bool {
        point.x >= self.min.x && point.x < self.max.x &&
        point.y >= self.min.y && point.y < self.max.y &&
        point.z >= self.min.z && point.z < self.max.z
    }

    /// Check if this AABB intersects another AABB
    pub fn intersects(&self, other: &AABB) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x &&
        self.min.y <= other.max.y && self.max.y >= other.min.y &&
        self.min.z <= other.max.z && self.max.z >= other.min.z
    }
}
