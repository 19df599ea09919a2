//! Octree spatial partitioning structure
//!
//! Divides 3D space into hierarchical regions. Each leaf subdivides into
//! 8 octants once it holds more than `max_entities_per_node` points, until
//! the depth or node-size limit is reached.

use serde::{Deserialize, Serialize};

use super::AABB;
use crate::ecs::GameObjectId;
use crate::foundation::math::Vec3;

/// Configuration for octree behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OctreeConfig {
    /// Maximum entities per node before subdivision
    pub max_entities_per_node: usize,

    /// Maximum subdivision depth
    pub max_depth: u32,

    /// Minimum node half-size (prevents excessive subdivision)
    pub min_node_size: f32,
}

impl Default for OctreeConfig {
    fn default() -> Self {
        Self {
            max_entities_per_node: 8,
            max_depth: 8,
            min_node_size: 1.0,
        }
    }
}

/// Point stored in the octree
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OctreeEntry {
    /// Object the point belongs to
    pub id: GameObjectId,
    /// World position
    pub position: Vec3,
}

/// Single node in the octree hierarchy
#[derive(Debug, Clone)]
pub struct OctreeNode {
    /// World-space bounds of this node
    pub bounds: AABB,

    /// Entries held by this node (leaves only)
    pub entries: Vec<OctreeEntry>,

    /// Child nodes (8 octants), None if this is a leaf
    pub children: Option<Box<[OctreeNode; 8]>>,

    /// Depth in the tree (0 = root)
    pub depth: u32,
}

impl OctreeNode {
    /// Create a new leaf node
    pub fn new(bounds: AABB, depth: u32) -> Self {
        Self {
            bounds,
            entries: Vec::new(),
            children: None,
            depth,
        }
    }

    /// Check if this node is a leaf (has no children)
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    // Octant layout: bit 0 = +X, bit 1 = +Y, bit 2 = +Z
    fn octant_index(&self, position: Vec3) -> usize {
        let center = self.bounds.center();
        let x_bit = usize::from(position.x >= center.x);
        let y_bit = usize::from(position.y >= center.y);
        let z_bit = usize::from(position.z >= center.z);
        (z_bit << 2) | (y_bit << 1) | x_bit
    }

    fn subdivide(&mut self) {
        if self.children.is_some() {
            return;
        }

        let AABB { min, max } = self.bounds;
        let center = self.bounds.center();
        let depth = self.depth + 1;

        // Child faces are copied from the parent's faces and center so the
        // octants tile the parent exactly
        let children: [OctreeNode; 8] = std::array::from_fn(|octant| {
            let pick = |bit: usize, axis: usize| {
                if octant & bit != 0 {
                    (center[axis], max[axis])
                } else {
                    (min[axis], center[axis])
                }
            };
            let (x, y, z) = (pick(1, 0), pick(2, 1), pick(4, 2));
            let bounds = AABB::new(Vec3::new(x.0, y.0, z.0), Vec3::new(x.1, y.1, z.1));
            OctreeNode::new(bounds, depth)
        });
        self.children = Some(Box::new(children));

        for entry in std::mem::take(&mut self.entries) {
            let octant = self.octant_index(entry.position);
            if let Some(children) = self.children.as_mut() {
                children[octant].entries.push(entry);
            }
        }
    }

    /// Insert an entry into this node. Returns false if it lies outside the bounds.
    pub fn insert(&mut self, entry: OctreeEntry, config: &OctreeConfig) -> bool {
        if !self.bounds.contains_point(entry.position) {
            return false;
        }
        self.insert_routed(entry, config);
        true
    }

    // The point is already known to lie in this node; it is routed by
    // octant alone so rounding at a child face can never drop it
    fn insert_routed(&mut self, entry: OctreeEntry, config: &OctreeConfig) {
        if self.is_leaf() {
            let should_subdivide = self.entries.len() >= config.max_entities_per_node
                && self.depth < config.max_depth
                && self.bounds.extents().x > config.min_node_size;

            if !should_subdivide {
                self.entries.push(entry);
                return;
            }
            self.subdivide();
        }

        let octant = self.octant_index(entry.position);
        match self.children.as_mut() {
            Some(children) => children[octant].insert_routed(entry, config),
            None => self.entries.push(entry),
        }
    }

    /// Collect entries inside `region` using half-open containment
    pub fn query_aabb(&self, region: &AABB, results: &mut Vec<GameObjectId>) {
        let overlaps = self.bounds.min.x < region.max.x && self.bounds.max.x >= region.min.x
            && self.bounds.min.y < region.max.y && self.bounds.max.y >= region.min.y
            && self.bounds.min.z < region.max.z && self.bounds.max.z >= region.min.z;
        if !overlaps {
            return;
        }

        results.extend(
            self.entries
                .iter()
                .filter(|e| region.contains_point_half_open(e.position))
                .map(|e| e.id),
        );

        if let Some(children) = self.children.as_ref() {
            for child in children.iter() {
                child.query_aabb(region, results);
            }
        }
    }

    /// Collect entries within `radius` of `center`
    pub fn query_radius(&self, center: Vec3, radius: f32, results: &mut Vec<GameObjectId>) {
        let closest_point = Vec3::new(
            center.x.clamp(self.bounds.min.x, self.bounds.max.x),
            center.y.clamp(self.bounds.min.y, self.bounds.max.y),
            center.z.clamp(self.bounds.min.z, self.bounds.max.z),
        );
        if (closest_point - center).magnitude_squared() > radius * radius {
            return;
        }

        results.extend(
            self.entries
                .iter()
                .filter(|e| (e.position - center).magnitude_squared() <= radius * radius)
                .map(|e| e.id),
        );

        if let Some(children) = self.children.as_ref() {
            for child in children.iter() {
                child.query_radius(center, radius, results);
            }
        }
    }

    /// Count total entries in this node and all children
    pub fn count_entries(&self) -> usize {
        self.entries.len()
            + self
                .children
                .as_ref()
                .map_or(0, |children| children.iter().map(Self::count_entries).sum())
    }
}

/// Octree over object positions
#[derive(Debug, Clone)]
pub struct Octree {
    /// Root node containing the entire indexed space
    pub root: OctreeNode,

    config: OctreeConfig,
}

impl Octree {
    /// Create a new octree with given world bounds
    pub fn new(world_bounds: AABB, config: OctreeConfig) -> Self {
        Self {
            root: OctreeNode::new(world_bounds, 0),
            config,
        }
    }

    /// Insert a point. Returns false if it lies outside the root bounds.
    pub fn insert(&mut self, id: GameObjectId, position: Vec3) -> bool {
        self.root.insert(OctreeEntry { id, position }, &self.config)
    }

    /// Ids whose position satisfies `region.min <= p < region.max`
    pub fn query_aabb(&self, region: &AABB) -> Vec<GameObjectId> {
        let mut results = Vec::new();
        self.root.query_aabb(region, &mut results);
        results
    }

    /// Ids within `radius` of `center`
    pub fn query_radius(&self, center: Vec3, radius: f32) -> Vec<GameObjectId> {
        let mut results = Vec::new();
        self.root.query_radius(center, radius, &mut results);
        results
    }

    /// Get total entry count
    pub fn entry_count(&self) -> usize {
        self.root.count_entries()
    }

    /// Clear the octree, keeping its bounds
    pub fn clear(&mut self) {
        self.root = OctreeNode::new(self.root.bounds, 0);
    }
}
