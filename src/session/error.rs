//! Session-specific error types
//!
//! These cover the filesystem failures a listing operation surfaces to
//! its caller. Metadata-utility failures never appear here: they
//! degrade to empty tags or failed writes inside the operation, scoped
//! to the single file involved.

use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced from folder-scoped operations
#[derive(Debug, Error)]
pub enum SessionError {
    /// Folder passed to an operation does not exist
    #[error("Folder not found: {0}")]
    FolderNotFound(PathBuf),

    /// Path exists but is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Folder could not be read
    #[error("Cannot read folder {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Export rule file missing or unusable
    #[error(transparent)]
    Export(#[from] crate::export::ExportError),
}
