//! Classification label remapping
//!
//! Rewrites the label column of a freshly loaded point set into the training
//! code space. Source codes are translated either through a per-dataset
//! [`ClassMapping`] (source code -> semantic class name -> training code) or,
//! when no mapping is available, through a built-in table keyed by ASPRS LAS
//! classification codes.

use crate::mappings::ClassMapping;
use log::{debug, warn};
use pointclass_core::{Error, PointSet, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Reserved semantic name every unmapped label collapses to
pub const UNASSIGNED: &str = "unassigned";

/// Semantic class names and their training codes
const DEFAULT_TRAINING_CODES: [(&str, u8); 13] = [
    (UNASSIGNED, 0),
    ("ground", 1),
    ("low_vegetation", 2),
    ("medium_vegetation", 3),
    ("high_vegetation", 4),
    ("building", 5),
    ("water", 6),
    ("road_surface", 7),
    ("rail", 8),
    ("wire", 9),
    ("transmission_tower", 10),
    ("bridge", 11),
    ("noise", 12),
];

/// ASPRS classification code -> semantic class name.
///
/// Codes missing from this table are treated as [`UNASSIGNED`].
const ASPRS_CLASSES: [(u8, &str); 18] = [
    (0, UNASSIGNED),
    (1, UNASSIGNED),
    (2, "ground"),
    (3, "low_vegetation"),
    (4, "medium_vegetation"),
    (5, "high_vegetation"),
    (6, "building"),
    (7, "noise"),
    (9, "water"),
    (10, "rail"),
    (11, "road_surface"),
    (13, "wire"),
    (14, "wire"),
    (15, "transmission_tower"),
    (16, "wire"),
    (17, "bridge"),
    (18, "noise"),
    (64, UNASSIGNED),
];

/// Semantic class name -> training code dictionary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, u8>", into = "BTreeMap<String, u8>")]
pub struct TrainingCodes(BTreeMap<String, u8>);

impl TrainingCodes {
    /// Build a dictionary; it must define [`UNASSIGNED`]
    pub fn new(codes: BTreeMap<String, u8>) -> Result<Self> {
        if !codes.contains_key(UNASSIGNED) {
            return Err(Error::InvalidParameter(format!(
                "training codes must define '{}'",
                UNASSIGNED
            )));
        }
        Ok(Self(codes))
    }

    pub fn get(&self, name: &str) -> Option<u8> {
        self.0.get(name).copied()
    }

    /// Training code of [`UNASSIGNED`]
    pub fn unassigned(&self) -> u8 {
        self.get(UNASSIGNED).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u8)> {
        self.0.iter().map(|(name, code)| (name.as_str(), *code))
    }

    /// Training code for a semantic name, falling back to [`UNASSIGNED`]
    fn resolve(&self, name: &str) -> u8 {
        match self.get(name) {
            Some(code) => code,
            None => {
                warn!("No training code for class '{}', using '{}'", name, UNASSIGNED);
                self.unassigned()
            }
        }
    }
}

impl Default for TrainingCodes {
    fn default() -> Self {
        Self(
            DEFAULT_TRAINING_CODES
                .iter()
                .map(|(name, code)| (name.to_string(), *code))
                .collect(),
        )
    }
}

impl TryFrom<BTreeMap<String, u8>> for TrainingCodes {
    type Error = Error;

    fn try_from(codes: BTreeMap<String, u8>) -> Result<Self> {
        Self::new(codes)
    }
}

impl From<TrainingCodes> for BTreeMap<String, u8> {
    fn from(codes: TrainingCodes) -> Self {
        codes.0
    }
}

/// Lookup table used when no class mapping is available.
///
/// Every source code resolves to a training code; codes outside the ASPRS
/// table resolve to the training code of [`UNASSIGNED`].
pub fn fallback_table(codes: &TrainingCodes) -> [u8; 256] {
    let mut table = [codes.unassigned(); 256];
    for (source, name) in ASPRS_CLASSES {
        table[source as usize] = codes.resolve(name);
    }
    table
}

/// Lookup table for an explicit class mapping.
///
/// Source codes absent from `mapping` resolve to [`UNASSIGNED`].
pub fn mapping_table(mapping: &ClassMapping, codes: &TrainingCodes) -> [u8; 256] {
    let mut table = [codes.unassigned(); 256];
    for (source, name) in mapping.iter() {
        table[source as usize] = codes.resolve(name);
    }
    table
}

/// Rewrite every label of `set` through `mapping`, or through the fallback
/// table when `mapping` is empty. Sets without a label column are left as is.
pub fn remap_labels(set: &mut PointSet, mapping: &ClassMapping, codes: &TrainingCodes) {
    if !set.has_labels() {
        return;
    }

    let table = if mapping.is_empty() {
        debug!("No class mapping, applying ASPRS fallback table");
        fallback_table(codes)
    } else {
        debug!("Remapping labels with {} class mapping entries", mapping.len());
        mapping_table(mapping, codes)
    };
    apply_table(set.labels_mut(), &table);
}

fn apply_table(labels: &mut [u8], table: &[u8; 256]) {
    labels.par_iter_mut().for_each(|label| {
        *label = table[*label as usize];
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use pointclass_core::Point3f;

    fn labeled(labels: Vec<u8>) -> PointSet {
        PointSet::from_points(vec![Point3f::origin(); labels.len()])
            .with_labels(labels)
            .unwrap()
    }

    fn codes(entries: &[(&str, u8)]) -> TrainingCodes {
        TrainingCodes::new(entries.iter().map(|(n, c)| (n.to_string(), *c)).collect()).unwrap()
    }

    #[test]
    fn test_explicit_mapping() {
        let mut set = labeled(vec![5, 7, 5]);
        let mapping = ClassMapping::from_iter([(5u8, "ground".to_string())]);
        let codes = codes(&[("ground", 2), (UNASSIGNED, 0)]);

        remap_labels(&mut set, &mapping, &codes);
        assert_eq!(set.labels(), &[2, 0, 2]);
    }

    #[test]
    fn test_mapping_to_unknown_class_is_unassigned() {
        let mut set = labeled(vec![1, 2]);
        let mapping = ClassMapping::from_iter([
            (1u8, "ground".to_string()),
            (2u8, "spaceship".to_string()),
        ]);
        let codes = codes(&[("ground", 4), (UNASSIGNED, 9)]);

        remap_labels(&mut set, &mapping, &codes);
        assert_eq!(set.labels(), &[4, 9]);
    }

    #[test]
    fn test_fallback_table() {
        let mut set = labeled(vec![2, 6, 9, 18, 1, 200]);
        remap_labels(&mut set, &ClassMapping::default(), &TrainingCodes::default());
        assert_eq!(set.labels(), &[1, 5, 6, 12, 0, 0]);
    }

    #[test]
    fn test_fallback_covers_every_code() {
        let codes = TrainingCodes::default();
        let table = fallback_table(&codes);
        let max = codes.iter().map(|(_, c)| c).max().unwrap();
        assert!(table.iter().all(|code| *code <= max));
        assert_eq!(table[255], codes.unassigned());
    }

    #[test]
    fn test_unlabeled_set_untouched() {
        let mut set = PointSet::from_points(vec![Point3f::origin()]);
        remap_labels(&mut set, &ClassMapping::default(), &TrainingCodes::default());
        assert!(!set.has_labels());
    }

    #[test]
    fn test_training_codes_require_unassigned() {
        let missing: BTreeMap<String, u8> = [("ground".to_string(), 1)].into_iter().collect();
        assert!(matches!(
            TrainingCodes::new(missing),
            Err(Error::InvalidParameter(_))
        ));
        assert!(serde_json::from_str::<TrainingCodes>(r#"{"ground": 1}"#).is_err());

        let parsed: TrainingCodes =
            serde_json::from_str(r#"{"unassigned": 3, "ground": 1}"#).unwrap();
        assert_eq!(parsed.unassigned(), 3);
        assert_eq!(parsed.get("ground"), Some(1));
    }
}
