//! Cache-specific error types
//!
//! The cache is an optimization layer, so most failure modes are
//! tolerated and logged at the call site rather than raised. These
//! types cover the cases a caller may still want to branch on: the
//! backing file cannot be written, its contents cannot be serialized,
//! or no per-user configuration directory exists at all.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from the metadata cache's backing file
#[derive(Debug, Error)]
pub enum CacheError {
    /// Cache file could not be read or written
    #[error("I/O error on cache file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Cache contents could not be serialized or parsed
    #[error("Malformed cache data for {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The per-user configuration directory could not be determined
    #[error("Could not determine config directory")]
    NoConfigDir,
}
