//! Swappable spatial index used by the physics broad phase
//!
//! The index is rebuilt from scratch every tick over the positions of the
//! registered objects, so implementations only need a bulk `rebuild` and
//! read-only queries.

use std::any::Any;

use serde::{Deserialize, Serialize};

use super::{Octree, OctreeConfig, AABB};
use crate::ecs::GameObjectId;
use crate::foundation::math::Vec3;

/// Which [`SpatialIndex`] implementation to build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpatialIndexKind {
    /// Hierarchical octree
    #[default]
    Octree,
    /// Flat list scanned on every query
    Linear,
}

/// Point index over object positions
pub trait SpatialIndex {
    /// Replace the indexed set with `items`
    fn rebuild(&mut self, items: &[(GameObjectId, Vec3)]);

    /// Ids whose position satisfies `region.min <= p < region.max`
    fn query_aabb(&self, region: &AABB) -> Vec<GameObjectId>;

    /// Ids within `radius` of `center`
    fn query_sphere(&self, center: Vec3, radius: f32) -> Vec<GameObjectId>;

    /// Number of indexed points
    fn len(&self) -> usize;

    /// True if nothing is indexed
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Downcast to Any for type-specific access
    fn as_any(&self) -> &dyn Any;
}

/// Build the index selected by `kind`
pub fn build_index(kind: SpatialIndexKind, octree: OctreeConfig, padding: f32) -> Box<dyn SpatialIndex> {
    match kind {
        SpatialIndexKind::Octree => Box::new(OctreeIndex::new(octree, padding)),
        SpatialIndexKind::Linear => Box::new(LinearIndex::default()),
    }
}

/// Octree-backed index whose root bounds are fitted to each rebuild's points
#[derive(Debug)]
pub struct OctreeIndex {
    octree: Option<Octree>,
    config: OctreeConfig,
    padding: f32,
    len: usize,
}

impl OctreeIndex {
    /// Create an empty index
    pub fn new(config: OctreeConfig, padding: f32) -> Self {
        Self {
            octree: None,
            config,
            padding: padding.max(0.0),
            len: 0,
        }
    }

    /// The octree built by the last rebuild, if any points were indexed
    pub fn octree(&self) -> Option<&Octree> {
        self.octree.as_ref()
    }
}

impl SpatialIndex for OctreeIndex {
    fn rebuild(&mut self, items: &[(GameObjectId, Vec3)]) {
        self.len = 0;
        let Some(bounds) = AABB::from_points(items.iter().map(|(_, p)| *p)) else {
            self.octree = None;
            return;
        };

        // Re-centring into a cube can round the faces inward, so the fitted
        // box is folded back in
        let fitted = bounds.padded(self.padding);
        let mut octree = Octree::new(fitted.to_cube().union(&fitted), self.config.clone());
        for (id, position) in items {
            if octree.insert(*id, *position) {
                self.len += 1;
            } else {
                log::warn!("OctreeIndex: {:?} at {:?} fell outside the fitted bounds", id, position);
            }
        }
        self.octree = Some(octree);
    }

    fn query_aabb(&self, region: &AABB) -> Vec<GameObjectId> {
        self.octree.as_ref().map_or_else(Vec::new, |o| o.query_aabb(region))
    }

    fn query_sphere(&self, center: Vec3, radius: f32) -> Vec<GameObjectId> {
        self.octree.as_ref().map_or_else(Vec::new, |o| o.query_radius(center, radius))
    }

    fn len(&self) -> usize {
        self.len
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// List-based index; every query is a linear scan
#[derive(Debug, Default)]
pub struct LinearIndex {
    items: Vec<(GameObjectId, Vec3)>,
}

impl SpatialIndex for LinearIndex {
    fn rebuild(&mut self, items: &[(GameObjectId, Vec3)]) {
        self.items.clear();
        self.items.extend_from_slice(items);
    }

    fn query_aabb(&self, region: &AABB) -> Vec<GameObjectId> {
        self.items
            .iter()
            .filter(|(_, p)| region.contains_point_half_open(*p))
            .map(|(id, _)| *id)
            .collect()
    }

    fn query_sphere(&self, center: Vec3, radius: f32) -> Vec<GameObjectId> {
        self.items
            .iter()
            .filter(|(_, p)| (p - center).magnitude_squared() <= radius * radius)
            .map(|(id, _)| *id)
            .collect()
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn scattered() -> Vec<(GameObjectId, Vec3)> {
        let mut keys = SlotMap::<GameObjectId, ()>::with_key();
        (0..64)
            .map(|i| {
                let t = i as f32;
                (keys.insert(()), Vec3::new((t * 7.0) % 23.0 - 11.0, (t * 3.0) % 17.0 - 8.0, (t * 5.0) % 13.0 - 6.0))
            })
            .collect()
    }

    #[test]
    fn test_octree_and_linear_agree() {
        let items = scattered();
        let config = OctreeConfig { max_entities_per_node: 3, ..OctreeConfig::default() };
        let mut octree = build_index(SpatialIndexKind::Octree, config, 1.0);
        let mut linear = build_index(SpatialIndexKind::Linear, OctreeConfig::default(), 0.0);
        octree.rebuild(&items);
        linear.rebuild(&items);

        assert_eq!(octree.len(), 64);
        assert_eq!(linear.len(), 64);

        for (center, radius) in [(Vec3::zeros(), 5.0), (Vec3::new(4.0, -2.0, 1.0), 3.5), (Vec3::new(-20.0, 0.0, 0.0), 2.0)] {
            let region = AABB::from_sphere(center, radius);
            let mut a = octree.query_aabb(&region);
            let mut b = linear.query_aabb(&region);
            a.sort();
            b.sort();
            assert_eq!(a, b);

            let mut a = octree.query_sphere(center, radius);
            let mut b = linear.query_sphere(center, radius);
            a.sort();
            b.sort();
            assert_eq!(a, b);
        }
    }

    // Deterministic scatter over [-10, 10) with values that do not land on
    // tidy binary fractions
    fn unpadded_cloud(seed: u32, count: usize) -> Vec<(GameObjectId, Vec3)> {
        let mut keys = SlotMap::<GameObjectId, ()>::with_key();
        let mut state = seed;
        let mut next = move || {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            (state >> 8) as f32 / (1u32 << 24) as f32 * 20.0 - 10.0
        };
        (0..count)
            .map(|_| (keys.insert(()), Vec3::new(next(), next(), next())))
            .collect()
    }

    #[test]
    fn test_unpadded_octree_keeps_every_point() {
        let config = OctreeConfig { max_entities_per_node: 2, min_node_size: 0.01, ..OctreeConfig::default() };
        for seed in 0..200 {
            let items = unpadded_cloud(seed, 60);
            let mut octree = build_index(SpatialIndexKind::Octree, config.clone(), 0.0);
            let mut linear = build_index(SpatialIndexKind::Linear, OctreeConfig::default(), 0.0);
            octree.rebuild(&items);
            linear.rebuild(&items);

            assert_eq!(octree.len(), items.len(), "seed {}", seed);
            for (_, center) in items.iter().step_by(7) {
                let region = AABB::from_sphere(*center, 4.0);
                let mut a = octree.query_aabb(&region);
                let mut b = linear.query_aabb(&region);
                a.sort();
                b.sort();
                assert_eq!(a, b, "seed {}", seed);
            }
        }
    }

    #[test]
    fn test_rebuild_replaces_previous_contents() {
        let items = scattered();
        let mut index = OctreeIndex::new(OctreeConfig::default(), 0.0);
        index.rebuild(&items);
        assert!(index.octree().is_some());

        index.rebuild(&items[..4]);
        assert_eq!(index.len(), 4);

        index.rebuild(&[]);
        assert!(index.is_empty());
        assert!(index.octree().is_none());
        assert!(index.query_aabb(&AABB::from_sphere(Vec3::zeros(), 100.0)).is_empty());
    }
}
