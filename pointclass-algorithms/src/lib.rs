//! # pointclass algorithms
//!
//! Algorithms that run on a loaded [`pointclass_core::PointSet`]: currently
//! the sampled nearest-neighbor spacing estimate.

pub mod spacing;

#[cfg(test)]
mod nearest_neighbor;

// Re-export commonly used items
pub use spacing::*;
