//! Error types for the scoring engine and its collaborators

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// A single field of a source row that could not be coerced to its type.
///
/// Recovered by the caller (skip the row or default the field), never by
/// the engine.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("line {line}: cannot read {field} from {value:?}: {reason}")]
pub struct InputError {
    /// 1-based data line in the source (header excluded)
    pub line: u64,
    /// Column name
    pub field: &'static str,
    /// Raw cell content
    pub value: String,
    /// Why coercion failed
    pub reason: String,
}

/// The bulk source could not be parsed at all; no batch is produced.
#[derive(Error, Debug)]
pub enum SourceReadError {
    #[error("cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("source has no header row")]
    MissingHeader,

    #[error("malformed CSV: {0}")]
    Malformed(#[from] csv::Error),
}

/// Invalid configuration values, raised at load time.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be {expected}, got {value}")]
    OutOfRange {
        field: &'static str,
        expected: &'static str,
        value: f64,
    },

    #[error("rule {label:?}: {reason}")]
    InvalidRule { label: String, reason: String },
}

/// Result alias for reading bulk sources
pub type SourceResult<T> = std::result::Result<T, SourceReadError>;
