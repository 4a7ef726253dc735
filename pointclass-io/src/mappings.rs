//! Classification mapping files
//!
//! A mapping file is a JSON object whose `"classification"` key maps source
//! label codes (as decimal strings) to semantic class names:
//!
//! ```json
//! { "classification": { "2": "ground", "6": "building" } }
//! ```
//!
//! For an input `scan.ply` the mapping is looked up as `scan.json`, then (for
//! `scan_eval.ply`) as `scan.json` with the `_eval` suffix removed, and
//! finally as a shared `mappings.json` in the same directory.

use log::{debug, warn};
use pointclass_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the directory-wide mapping file
pub const SHARED_MAPPING_FILE: &str = "mappings.json";

const EVAL_SUFFIX: &str = "_eval";

/// Source label code -> semantic class name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassMapping(BTreeMap<u8, String>);

#[derive(Deserialize)]
struct MappingFile {
    classification: Option<BTreeMap<String, String>>,
}

impl ClassMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, code: u8, class: impl Into<String>) {
        self.0.insert(code, class.into());
    }

    pub fn get(&self, code: u8) -> Option<&str> {
        self.0.get(&code).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, &str)> {
        self.0.iter().map(|(code, class)| (*code, class.as_str()))
    }

    /// Parse the contents of a mapping file.
    ///
    /// A document without a `"classification"` key yields an empty mapping.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: MappingFile = serde_json::from_str(json)
            .map_err(|e| Error::InvalidData(format!("invalid class mapping: {}", e)))?;

        let Some(classification) = file.classification else {
            warn!("Class mapping has no 'classification' key");
            return Ok(Self::default());
        };

        let mut mapping = Self::default();
        for (key, class) in classification {
            let code: i64 = key.trim().parse().map_err(|_| {
                Error::InvalidData(format!("invalid source label code '{}'", key))
            })?;
            // Labels are 8-bit, so such an entry can never match
            match u8::try_from(code) {
                Ok(code) => mapping.insert(code, class),
                Err(_) => warn!(
                    "Skipping class mapping entry {} -> '{}': not a label code",
                    code, class
                ),
            }
        }
        Ok(mapping)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Find the mapping file that applies to `input`, if any
    pub fn locate<P: AsRef<Path>>(input: P) -> Option<PathBuf> {
        let input = input.as_ref();
        let dir = input.parent().unwrap_or_else(|| Path::new(""));
        let stem = input.file_stem()?.to_string_lossy();

        let mut candidates = vec![dir.join(format!("{}.json", stem))];
        if let Some(base) = stem.strip_suffix(EVAL_SUFFIX) {
            candidates.push(dir.join(format!("{}.json", base)));
        }
        candidates.push(dir.join(SHARED_MAPPING_FILE));

        candidates.into_iter().find(|candidate| candidate.is_file())
    }

    /// Load the mapping that applies to `input`.
    ///
    /// A missing mapping file is not an error and yields an empty mapping.
    pub fn for_input<P: AsRef<Path>>(input: P) -> Result<Self> {
        match Self::locate(input.as_ref()) {
            Some(path) => {
                debug!("Using class mapping {}", path.display());
                Self::from_json_file(path)
            }
            None => {
                debug!("No class mapping found for {}", input.as_ref().display());
                Ok(Self::default())
            }
        }
    }
}

impl FromIterator<(u8, String)> for ClassMapping {
    fn from_iter<I: IntoIterator<Item = (u8, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
