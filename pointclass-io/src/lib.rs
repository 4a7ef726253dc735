//! I/O operations for point sets
//!
//! This crate reads and writes [`PointSet`]s. PLY is handled natively; LAS and
//! LAZ are available through the optional `pasture` feature. Loading a point
//! set that carries classification labels rewrites them into training codes
//! (see [`labels`]) unless disabled through [`ReadOptions`].

pub mod labels;
pub mod mappings;
pub mod options;
pub mod pasture;
pub mod ply;
pub mod registry;
pub mod schema;

pub use labels::{remap_labels, TrainingCodes, UNASSIGNED};
pub use mappings::ClassMapping;
pub use options::{MappingSource, ReadOptions};
pub use ply::{PlyEncoding, PlyHeader, PlyReader, PlyWriter};
pub use registry::{FormatRegistry, PlyFormat, PointSetFormat};
pub use schema::{AttributeSchema, Channel, ColorLayout, ScalarType, SchemaBuilder};

use log::debug;
use pointclass_core::{PointSet, Result};
use std::path::Path;

/// Read a point set, remapping its labels with the mapping found next to it
pub fn read_point_set<P: AsRef<Path>>(path: P) -> Result<PointSet> {
    read_point_set_with(path, &ReadOptions::default())
}

/// Read a point set with explicit options
pub fn read_point_set_with<P: AsRef<Path>>(path: P, options: &ReadOptions) -> Result<PointSet> {
    let path = path.as_ref();
    let mut set = FormatRegistry::with_defaults().load(path)?;

    if set.has_labels() && options.remap_labels {
        let mapping = match &options.mapping {
            MappingSource::Sidecar => ClassMapping::for_input(path)?,
            MappingSource::Explicit(mapping) => mapping.clone(),
            MappingSource::Fallback => ClassMapping::default(),
        };
        remap_labels(&mut set, &mapping, &options.training_codes);
    } else if set.has_labels() {
        debug!("Keeping stored labels of {}", path.display());
    }

    Ok(set)
}

/// Write a point set; the container is chosen by file extension
pub fn write_point_set<P: AsRef<Path>>(set: &PointSet, path: P) -> Result<()> {
    FormatRegistry::with_defaults().save(set, path.as_ref())
}
