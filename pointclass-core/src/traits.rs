//! Core traits for pointclass

use crate::point::Point3f;

/// Trait for nearest neighbor search functionality
///
/// Implementations are built once over a fixed set of points and only read
/// afterwards, so they must be shareable across threads.
pub trait NearestNeighborSearch: Send + Sync {
    /// Find the `k` nearest neighbors to `query`.
    ///
    /// Returns `(index, squared_distance)` pairs sorted by ascending distance.
    /// A query that coincides with an indexed point returns that point first
    /// at distance zero. Fewer than `k` pairs are returned when the index
    /// holds fewer than `k` points.
    fn find_k_nearest_squared(&self, query: &Point3f, k: usize) -> Vec<(usize, f32)>;

    /// Number of points held by the index
    fn len(&self) -> usize;

    /// Check if the index holds no points
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
