//! Exhaustive neighbor search used as a reference for [`SpatialIndex`] in
//! tests. Compiled for tests only.
//!
//! [`SpatialIndex`]: pointclass_core::SpatialIndex

use pointclass_core::{NearestNeighborSearch, Point3f};

/// Scans every point for each query
pub struct BruteForceSearch {
    points: Vec<Point3f>,
}

impl BruteForceSearch {
    pub fn new(points: &[Point3f]) -> Self {
        Self {
            points: points.to_vec(),
        }
    }
}

impl NearestNeighborSearch for BruteForceSearch {
    fn find_k_nearest_squared(&self, query: &Point3f, k: usize) -> Vec<(usize, f32)> {
        let mut ranked: Vec<(usize, f32)> = self
            .points
            .iter()
            .map(|point| (point - query).norm_squared())
            .enumerate()
            .collect();
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
        ranked.truncate(k);
        ranked
    }

    fn len(&self) -> usize {
        self.points.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pointclass_core::SpatialIndex;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn squared_distances(
        search: &dyn NearestNeighborSearch,
        query: &Point3f,
        k: usize,
    ) -> Vec<f32> {
        search
            .find_k_nearest_squared(query, k)
            .into_iter()
            .map(|(_, dist_2)| dist_2)
            .collect()
    }

    #[test]
    fn test_brute_force_order() {
        let points = vec![
            Point3f::new(2.0, 0.0, 0.0),
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(1.0, 0.0, 0.0),
        ];
        let search = BruteForceSearch::new(&points);
        let result = search.find_k_nearest_squared(&Point3f::origin(), 2);
        assert_eq!(result, vec![(1, 0.0), (2, 1.0)]);
        assert_eq!(search.len(), 3);
    }

    #[test]
    fn test_matches_spatial_index() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut coord = || rng.gen_range(-5.0..5.0);
        let points: Vec<Point3f> = (0..500)
            .map(|_| Point3f::new(coord(), coord(), coord()))
            .collect();
        let brute = BruteForceSearch::new(&points);
        let tree = SpatialIndex::build(&points);

        for query in points.iter().step_by(25) {
            let expected = squared_distances(&brute, query, 6);
            let actual = squared_distances(&tree, query, 6);
            assert_eq!(expected.len(), actual.len());
            for (e, a) in expected.iter().zip(&actual) {
                assert_relative_eq!(e, a, epsilon = 1e-5);
            }
        }
    }
}
