//! Point spacing estimation
//!
//! Estimates the most common nearest-neighbor distance of a point set. A
//! random sample of points is queried against a spatial index; for each
//! sample the mean distance to its nearest neighbors is bucketed into
//! centimeter bins, and the most populated bin gives the spacing.

use log::{debug, info};
use pointclass_core::{Error, NearestNeighborSearch, Point3f, PointSet, Result};
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_K_NEIGHBORS: usize = 3;
pub const DEFAULT_MAX_SAMPLES: usize = 10_000;

/// Lower bound of any spacing estimate
pub const MIN_SPACING: f64 = 0.01;

/// Histogram bins per unit of distance
const BUCKETS_PER_UNIT: f32 = 100.0;

/// Spacing estimation parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpacingOptions {
    /// Neighbors requested per sample, not counting the sample itself
    pub k_neighbors: usize,
    /// Upper bound on the number of sampled points
    pub max_samples: usize,
}

impl Default for SpacingOptions {
    fn default() -> Self {
        Self {
            k_neighbors: DEFAULT_K_NEIGHBORS,
            max_samples: DEFAULT_MAX_SAMPLES,
        }
    }
}

impl SpacingOptions {
    pub fn with_k_neighbors(mut self, k: usize) -> Self {
        self.k_neighbors = k;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.k_neighbors == 0 {
            return Err(Error::InvalidParameter(
                "k_neighbors must be at least 1".to_string(),
            ));
        }
        if self.max_samples == 0 {
            return Err(Error::InvalidParameter(
                "max_samples must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Estimate the spacing of `points` using `index` for neighbor queries.
///
/// Samples `min(N, max_samples)` indices uniformly with replacement from
/// `rng`. For each sample the distances to neighbor ranks `1..k` (rank 0 is
/// the sample itself) are summed and divided by `k`; that mean is scaled to
/// centimeters and rounded up to form the histogram key. The most frequent
/// key wins, the smallest key on ties. The result is at least
/// [`MIN_SPACING`].
pub fn estimate_spacing<S, R>(
    points: &[Point3f],
    index: &S,
    options: &SpacingOptions,
    rng: &mut R,
) -> Result<f64>
where
    S: NearestNeighborSearch + ?Sized,
    R: Rng + ?Sized,
{
    options.validate()?;
    if points.is_empty() {
        return Err(Error::EmptyDataset);
    }

    let k = options.k_neighbors;
    let sample_count = points.len().min(options.max_samples);
    let samples: Vec<usize> = (0..sample_count)
        .map(|_| rng.gen_range(0..points.len()))
        .collect();

    let keys: Vec<u64> = samples
        .par_iter()
        .map(|&idx| bucket_key(&index.find_k_nearest_squared(&points[idx], k + 1), k))
        .collect();

    let mut histogram: BTreeMap<u64, usize> = BTreeMap::new();
    for key in keys {
        *histogram.entry(key).or_insert(0) += 1;
    }
    debug!("Spacing histogram over {} samples: {:?}", sample_count, histogram);

    let key = select_bucket(&histogram);
    Ok((key as f64 / BUCKETS_PER_UNIT as f64).max(MIN_SPACING))
}

/// Histogram key for one sample, given its neighbors sorted by distance with
/// the sample itself first
fn bucket_key(neighbors: &[(usize, f32)], k: usize) -> u64 {
    let sum: f32 = neighbors
        .iter()
        .take(k)
        .skip(1)
        .map(|(_, dist_2)| dist_2.sqrt())
        .sum();
    let mean = sum / k as f32;
    (mean * BUCKETS_PER_UNIT).ceil() as u64
}

/// The most frequent key; ties go to the smallest key
fn select_bucket(histogram: &BTreeMap<u64, usize>) -> u64 {
    let mut best_key = 0;
    let mut best_count = 0;
    for (&key, &count) in histogram {
        if count > best_count {
            best_key = key;
            best_count = count;
        }
    }
    best_key
}

/// Cached spacing estimation on a [`PointSet`]
pub trait SpacingEstimation {
    /// Spacing of the set, sampled with the thread-local generator
    fn spacing(&mut self, options: &SpacingOptions) -> Result<f64> {
        self.spacing_with_rng(options, &mut rand::thread_rng())
    }

    /// Spacing of the set, sampled with `rng`.
    ///
    /// The first successful estimate is cached on the set and returned by
    /// every later call until the coordinates change, whatever `options`
    /// are passed.
    fn spacing_with_rng<R: Rng + ?Sized>(
        &mut self,
        options: &SpacingOptions,
        rng: &mut R,
    ) -> Result<f64>;
}

impl SpacingEstimation for PointSet {
    fn spacing_with_rng<R: Rng + ?Sized>(
        &mut self,
        options: &SpacingOptions,
        rng: &mut R,
    ) -> Result<f64> {
        if let Some(spacing) = self.cached_spacing() {
            return Ok(spacing);
        }
        options.validate()?;
        if self.is_empty() {
            return Err(Error::EmptyDataset);
        }

        let spacing = estimate_spacing(self.points(), self.spatial_index(), options, rng)?;
        info!("Estimated spacing {} over {} points", spacing, self.len());
        self.set_cached_spacing(spacing);
        Ok(spacing)
    }
}
