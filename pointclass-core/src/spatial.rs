//! Spatial index over the coordinates of a point set

use crate::point::Point3f;
use crate::traits::NearestNeighborSearch;
use rstar::primitives::GeomWithData;
use rstar::RTree;
use std::fmt;

type IndexedPoint = GeomWithData<[f32; 3], usize>;

/// Immutable R*-tree over a fixed slice of points.
///
/// Each entry carries the position of its point in the source slice, so query
/// results can be mapped straight back to the owning columns.
pub struct SpatialIndex {
    tree: RTree<IndexedPoint>,
    len: usize,
}

impl SpatialIndex {
    /// Bulk-load an index over `points`
    pub fn build(points: &[Point3f]) -> Self {
        let entries: Vec<IndexedPoint> = points
            .iter()
            .enumerate()
            .map(|(idx, p)| GeomWithData::new([p.x, p.y, p.z], idx))
            .collect();

        Self {
            tree: RTree::bulk_load(entries),
            len: points.len(),
        }
    }
}

impl NearestNeighborSearch for SpatialIndex {
    fn find_k_nearest_squared(&self, query: &Point3f, k: usize) -> Vec<(usize, f32)> {
        if k == 0 {
            return Vec::new();
        }

        self.tree
            .nearest_neighbor_iter_with_distance_2(&[query.x, query.y, query.z])
            .take(k)
            .map(|(entry, dist_2)| (entry.data, dist_2))
            .collect()
    }

    fn len(&self) -> usize {
        self.len
    }
}

impl fmt::Debug for SpatialIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpatialIndex").field("len", &self.len).finish()
    }
}
