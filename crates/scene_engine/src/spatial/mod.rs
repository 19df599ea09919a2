//! Spatial partitioning data structures
//!
//! Point indexing for the attractor broad phase.

mod aabb;
mod octree;
mod spatial_index;

pub use aabb::AABB;
pub use octree::{Octree, OctreeConfig, OctreeEntry, OctreeNode};
pub use spatial_index::{build_index, LinearIndex, OctreeIndex, SpatialIndex, SpatialIndexKind};
