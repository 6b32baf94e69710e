//! Export-specific error types
//!
//! Rule-file problems abort the whole export action (there is nothing
//! to run); a write failure is scoped to its rule and carried in that
//! rule's outcome so the rest of the batch still runs.

use std::path::PathBuf;
use thiserror::Error;

/// Failures while loading export rules or writing one rule's output
#[derive(Debug, Error)]
pub enum ExportError {
    /// No rule file exists for the folder
    #[error("Export rule file not found: {0}")]
    RulesNotFound(PathBuf),

    /// Rule file exists but could not be read
    #[error("Cannot read export rule file {path}: {source}")]
    RulesRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Rule file contents are not a JSON object
    #[error("Malformed export rule file {path}: {source}")]
    RulesParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A rule's query value is not a JSON string
    #[error("Export rule {key:?} in {path} is not a string query")]
    RuleNotAString { path: PathBuf, key: String },

    /// One rule's output file could not be written
    #[error("Cannot write export file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
