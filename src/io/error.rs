//! Boundary error types for loaders and exporters.

use std::path::PathBuf;

/// Result type for io operations
pub type IoResult<T> = Result<T, IoError>;

/// Error raised by file loaders and exporters.
///
/// Row-level failures carry the 1-based line number of the offending data
/// row (line 1 is the header).
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed CSV in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Missing required column '{column}' in {path}")]
    MissingColumn { path: PathBuf, column: String },

    #[error("Error on line {line} of {path}: {message}")]
    InvalidField {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Duplicate shift type id '{id}' on line {line} of {path}")]
    DuplicateShiftType {
        path: PathBuf,
        line: usize,
        id: String,
    },

    #[error("Malformed JSON in {path} at {pointer}: {message}")]
    Json {
        path: PathBuf,
        pointer: String,
        message: String,
    },
}
