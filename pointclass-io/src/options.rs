//! Options controlling how point sets are loaded

use crate::labels::TrainingCodes;
use crate::mappings::ClassMapping;
use serde::{Deserialize, Serialize};

/// Where the class mapping for label remapping comes from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingSource {
    /// Look for a mapping file next to the input
    #[default]
    Sidecar,
    /// Use this mapping; an empty one selects the fallback table
    Explicit(ClassMapping),
    /// Skip the lookup and apply the fallback table
    Fallback,
}

/// Load options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadOptions {
    /// Rewrite labels into training codes after loading
    pub remap_labels: bool,
    pub mapping: MappingSource,
    pub training_codes: TrainingCodes,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            remap_labels: true,
            mapping: MappingSource::Sidecar,
            training_codes: TrainingCodes::default(),
        }
    }
}

impl ReadOptions {
    /// Options that keep labels exactly as stored in the file
    pub fn raw() -> Self {
        Self {
            remap_labels: false,
            ..Self::default()
        }
    }

    pub fn with_mapping(mut self, mapping: MappingSource) -> Self {
        self.mapping = mapping;
        self
    }

    pub fn with_training_codes(mut self, codes: TrainingCodes) -> Self {
        self.training_codes = codes;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_partial_json() {
        let options: ReadOptions = serde_json::from_str(r#"{"mapping": "fallback"}"#).unwrap();
        assert!(options.remap_labels);
        assert_eq!(options.mapping, MappingSource::Fallback);
        assert_eq!(options.training_codes, TrainingCodes::default());
    }

    #[test]
    fn test_raw_disables_remap() {
        assert!(!ReadOptions::raw().remap_labels);
        assert!(ReadOptions::default().remap_labels);
    }
}
