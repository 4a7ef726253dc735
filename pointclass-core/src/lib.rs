//! Core data structures and traits for pointclass
//!
//! This crate provides the columnar [`PointSet`] that the codec, the label
//! remapper and the spacing estimator operate on, the spatial index it owns,
//! and the shared error type.

pub mod point;
pub mod point_set;
pub mod spatial;
pub mod traits;
pub mod error;

pub use point::*;
pub use point_set::*;
pub use spatial::*;
pub use traits::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3};

/// Common result type for pointclass operations
pub type Result<T> = std::result::Result<T, Error>;
