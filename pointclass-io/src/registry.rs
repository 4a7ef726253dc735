//! Format registry for extension-based reading and writing
//!
//! Each supported container registers a [`PointSetFormat`] under its file
//! extensions. Callers go through [`FormatRegistry`] and never need to know
//! which implementation handles a path.

use crate::ply::{PlyReader, PlyWriter};
use pointclass_core::{Error, PointSet, Result};
use std::collections::HashMap;
use std::path::Path;

/// A point set container format
pub trait PointSetFormat: Send + Sync {
    /// Read a point set from the given path
    fn load(&self, path: &Path) -> Result<PointSet>;

    /// Write a point set to the given path
    fn save(&self, set: &PointSet, path: &Path) -> Result<()>;

    /// Get the format name this handler implements
    fn format_name(&self) -> &'static str;
}

/// Native PLY container
pub struct PlyFormat;

impl PointSetFormat for PlyFormat {
    fn load(&self, path: &Path) -> Result<PointSet> {
        PlyReader::read_point_set(path)
    }

    fn save(&self, set: &PointSet, path: &Path) -> Result<()> {
        PlyWriter::write_point_set(set, path)
    }

    fn format_name(&self) -> &'static str {
        "ply"
    }
}

/// Extension -> format handler table
pub struct FormatRegistry {
    formats: HashMap<String, Box<dyn PointSetFormat>>,
}

impl FormatRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            formats: HashMap::new(),
        }
    }

    /// Registry with every format built into this crate
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("ply", Box::new(PlyFormat));

        #[cfg(feature = "pasture")]
        {
            registry.register("las", Box::new(crate::pasture::PastureFormat));
            registry.register("laz", Box::new(crate::pasture::PastureFormat));
        }

        registry
    }

    /// Register a handler for a file extension (case-insensitive)
    pub fn register(&mut self, extension: &str, format: Box<dyn PointSetFormat>) {
        self.formats.insert(extension.to_lowercase(), format);
    }

    /// The handler responsible for `path`
    pub fn format_for(&self, path: &Path) -> Result<&dyn PointSetFormat> {
        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        self.formats
            .get(&extension)
            .map(|format| format.as_ref())
            .ok_or_else(|| {
                Error::UnsupportedFormat(format!(
                    "no point set format registered for {}",
                    path.display()
                ))
            })
    }

    pub fn load(&self, path: &Path) -> Result<PointSet> {
        self.format_for(path)?.load(path)
    }

    pub fn save(&self, set: &PointSet, path: &Path) -> Result<()> {
        self.format_for(path)?.save(set, path)
    }

    /// Check if an extension has a registered handler
    pub fn supports(&self, extension: &str) -> bool {
        self.formats.contains_key(&extension.to_lowercase())
    }

    /// Registered extensions, sorted
    pub fn extensions(&self) -> Vec<String> {
        let mut extensions: Vec<String> = self.formats.keys().cloned().collect();
        extensions.sort();
        extensions
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
