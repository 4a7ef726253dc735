//! Error types for pointclass

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for pointclass operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid PLY header in {}: {message}", path.display())]
    InvalidHeader { path: PathBuf, message: String },

    #[error("Malformed schema: {0}")]
    MalformedSchema(String),

    #[error("Truncated record {index}: input ended before {expected} records were read")]
    TruncatedRecord { index: usize, expected: usize },

    #[error("Invalid record {index}: {message}")]
    InvalidRecord { index: usize, message: String },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Point set is empty")]
    EmptyDataset,

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl Error {
    /// Shorthand for an [`Error::InvalidHeader`] raised while reading `path`
    pub fn invalid_header(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::InvalidHeader {
            path: path.into(),
            message: message.into(),
        }
    }
}
