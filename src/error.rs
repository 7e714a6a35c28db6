// src/error.rs

use std::path::PathBuf;

/// Errors that abort a lineage run
#[derive(Debug, thiserror::Error)]
pub enum LineageError {
    /// A version string without a parseable leading integer segment
    #[error("malformed version: '{version}'")]
    MalformedVersion { version: String },

    /// A coordinate line with fewer than three colon-delimited fields
    #[error("invalid coordinate on line {line_number}: '{line}'")]
    InvalidCoordinateLine { line_number: usize, line: String },

    /// The method store could not be opened
    #[error("method store unavailable at {}: {source}", path.display())]
    StoreUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A store record that does not decode
    #[error("bad store record on line {line_number}: {source}")]
    StoreRecord {
        line_number: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, LineageError>;
