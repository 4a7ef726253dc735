//! Columnar point set and its lazily built derived state

use crate::point::*;
use crate::spatial::SpatialIndex;
use crate::{Error, Result};
use std::sync::OnceLock;

/// A columnar point cloud.
///
/// `points` is the single source of truth for the point count `N`. Every
/// optional column (normals, colors, views, labels) is either empty or holds
/// exactly `N` entries; the mutating API rejects anything else.
///
/// The spatial index and the spacing estimate are derived from `points`. Both
/// are computed at most once and are dropped whenever the point count or the
/// coordinates change.
#[derive(Debug, Default)]
pub struct PointSet {
    points: Vec<Point3f>,
    normals: Vec<Vector3f>,
    colors: Vec<Color>,
    views: Vec<u8>,
    labels: Vec<u8>,
    source_indices: Vec<usize>,
    spacing: Option<f64>,
    index: OnceLock<SpatialIndex>,
}

fn check_column(name: &str, len: usize, expected: usize) -> Result<()> {
    if len == 0 || len == expected {
        Ok(())
    } else {
        Err(Error::InvalidData(format!(
            "{} column has {} entries, expected 0 or {}",
            name, len, expected
        )))
    }
}

impl PointSet {
    /// Create a new empty point set
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a point set from coordinates only
    pub fn from_points(points: Vec<Point3f>) -> Self {
        Self {
            points,
            ..Self::default()
        }
    }

    /// Attach a normal column
    pub fn with_normals(mut self, normals: Vec<Vector3f>) -> Result<Self> {
        self.set_normals(normals)?;
        Ok(self)
    }

    /// Attach a color column
    pub fn with_colors(mut self, colors: Vec<Color>) -> Result<Self> {
        self.set_colors(colors)?;
        Ok(self)
    }

    /// Attach a view column
    pub fn with_views(mut self, views: Vec<u8>) -> Result<Self> {
        self.set_views(views)?;
        Ok(self)
    }

    /// Attach a label column
    pub fn with_labels(mut self, labels: Vec<u8>) -> Result<Self> {
        self.set_labels(labels)?;
        Ok(self)
    }

    /// Get the number of points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the point set is empty
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point3f] {
        &self.points
    }

    pub fn normals(&self) -> &[Vector3f] {
        &self.normals
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn views(&self) -> &[u8] {
        &self.views
    }

    pub fn labels(&self) -> &[u8] {
        &self.labels
    }

    pub fn has_normals(&self) -> bool {
        !self.normals.is_empty()
    }

    pub fn has_colors(&self) -> bool {
        !self.colors.is_empty()
    }

    pub fn has_views(&self) -> bool {
        !self.views.is_empty()
    }

    pub fn has_labels(&self) -> bool {
        !self.labels.is_empty()
    }

    /// Mutable access to the coordinates.
    ///
    /// Drops the spatial index and the cached spacing, since both depend on
    /// the coordinates.
    pub fn points_mut(&mut self) -> &mut [Point3f] {
        self.invalidate();
        &mut self.points
    }

    pub fn normals_mut(&mut self) -> &mut [Vector3f] {
        &mut self.normals
    }

    pub fn colors_mut(&mut self) -> &mut [Color] {
        &mut self.colors
    }

    pub fn views_mut(&mut self) -> &mut [u8] {
        &mut self.views
    }

    pub fn labels_mut(&mut self) -> &mut [u8] {
        &mut self.labels
    }

    pub fn set_normals(&mut self, normals: Vec<Vector3f>) -> Result<()> {
        check_column("normals", normals.len(), self.len())?;
        self.normals = normals;
        Ok(())
    }

    pub fn set_colors(&mut self, colors: Vec<Color>) -> Result<()> {
        check_column("colors", colors.len(), self.len())?;
        self.colors = colors;
        Ok(())
    }

    pub fn set_views(&mut self, views: Vec<u8>) -> Result<()> {
        check_column("views", views.len(), self.len())?;
        self.views = views;
        Ok(())
    }

    pub fn set_labels(&mut self, labels: Vec<u8>) -> Result<()> {
        check_column("labels", labels.len(), self.len())?;
        self.labels = labels;
        Ok(())
    }

    /// Indices into the source point set this set was derived from.
    ///
    /// Empty unless the set was built with [`PointSet::subset`] or
    /// [`PointSet::append_from`].
    pub fn source_indices(&self) -> &[usize] {
        &self.source_indices
    }

    /// Whether this set tracks points of another set
    pub fn is_derived(&self) -> bool {
        !self.source_indices.is_empty()
    }

    /// Append point `idx` of `src`, copying every channel `src` carries and
    /// recording `idx` as the source index of the new point.
    ///
    /// The first appended point fixes the channel set; afterwards `src` must
    /// carry the same channels as `self`. `self` must be empty or derived, so
    /// that `source_indices` stays parallel to the points.
    pub fn append_from(&mut self, src: &PointSet, idx: usize) -> Result<()> {
        if idx >= src.len() {
            return Err(Error::InvalidParameter(format!(
                "point index {} out of range for a set of {} points",
                idx,
                src.len()
            )));
        }
        if !self.is_empty() && self.source_indices.len() != self.len() {
            return Err(Error::InvalidData(
                "cannot append a source point to a set that does not track source indices"
                    .to_string(),
            ));
        }
        if !self.is_empty() && !self.same_channels(src) {
            return Err(Error::InvalidData(
                "cannot append a point with a different channel set".to_string(),
            ));
        }

        self.points.push(src.points[idx]);
        if src.has_normals() {
            self.normals.push(src.normals[idx]);
        }
        if src.has_colors() {
            self.colors.push(src.colors[idx]);
        }
        if src.has_views() {
            self.views.push(src.views[idx]);
        }
        if src.has_labels() {
            self.labels.push(src.labels[idx]);
        }
        self.source_indices.push(idx);
        self.invalidate();
        Ok(())
    }

    /// Build a derived set holding the points of `self` at `indices`, in order
    pub fn subset(&self, indices: &[usize]) -> Result<PointSet> {
        let mut out = PointSet::new();
        out.points.reserve(indices.len());
        out.source_indices.reserve(indices.len());
        for &idx in indices {
            out.append_from(self, idx)?;
        }
        Ok(out)
    }

    /// The spatial index over the coordinates, built on first access
    pub fn spatial_index(&self) -> &SpatialIndex {
        self.index.get_or_init(|| SpatialIndex::build(&self.points))
    }

    /// Whether the spatial index has been built
    pub fn has_spatial_index(&self) -> bool {
        self.index.get().is_some()
    }

    /// The cached spacing estimate, if one has been computed
    pub fn cached_spacing(&self) -> Option<f64> {
        self.spacing
    }

    /// Store a spacing estimate computed for the current coordinates
    pub fn set_cached_spacing(&mut self, spacing: f64) {
        self.spacing = Some(spacing);
    }

    fn same_channels(&self, other: &PointSet) -> bool {
        self.has_normals() == other.has_normals()
            && self.has_colors() == other.has_colors()
            && self.has_views() == other.has_views()
            && self.has_labels() == other.has_labels()
    }

    fn invalidate(&mut self) {
        self.spacing = None;
        self.index = OnceLock::new();
    }
}

impl Clone for PointSet {
    fn clone(&self) -> Self {
        Self {
            points: self.points.clone(),
            normals: self.normals.clone(),
            colors: self.colors.clone(),
            views: self.views.clone(),
            labels: self.labels.clone(),
            source_indices: self.source_indices.clone(),
            spacing: self.spacing,
            index: OnceLock::new(),
        }
    }
}

/// Two point sets are equal when their columns are equal; derived state is
/// not compared.
impl PartialEq for PointSet {
    fn eq(&self, other: &Self) -> bool {
        self.points == other.points
            && self.normals == other.normals
            && self.colors == other.colors
            && self.views == other.views
            && self.labels == other.labels
    }
}

impl FromIterator<Point3f> for PointSet {
    fn from_iter<I: IntoIterator<Item = Point3f>>(iter: I) -> Self {
        Self::from_points(Vec::from_iter(iter))
    }
}
