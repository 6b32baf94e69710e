//! Testing utilities for phototag
//!
//! This module provides a mock metadata backend and small filesystem
//! fixtures for exercising the session pipeline without a real
//! exiftool installation.
//!
//! Only available when compiled with `cfg(test)`.

use crate::metadata::{FormatTable, MetadataIo};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// In-memory [`MetadataIo`] that counts external reads and writes
///
/// Tag text is held in a map keyed by path, standing in for the
/// metadata embedded in real files. Counters expose how often the
/// "external utility" was invoked, so tests can assert that the cache
/// actually short-circuits reads.
pub struct MockMetadata {
    formats: FormatTable,
    store: RefCell<HashMap<PathBuf, String>>,
    pub reads: Cell<usize>,
    pub writes: Cell<usize>,
    /// When set, every write reports failure
    pub fail_writes: bool,
}

impl MockMetadata {
    #[must_use]
    pub fn new() -> Self {
        Self {
            formats: FormatTable::builtin(),
            store: RefCell::new(HashMap::new()),
            reads: Cell::new(0),
            writes: Cell::new(0),
            fail_writes: false,
        }
    }

    /// Pre-set the tag text the backend will report for `path`
    pub fn seed(&self, path: impl AsRef<Path>, tags: &str) {
        self.store
            .borrow_mut()
            .insert(path.as_ref().to_path_buf(), tags.to_string());
    }
}

impl Default for MockMetadata {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataIo for MockMetadata {
    fn formats(&self) -> &FormatTable {
        &self.formats
    }

    fn read_tags(&self, path: &Path) -> String {
        self.reads.set(self.reads.get() + 1);
        self.store.borrow().get(path).cloned().unwrap_or_default()
    }

    fn write_tags(&self, path: &Path, tags: &str) -> bool {
        self.writes.set(self.writes.get() + 1);
        if self.fail_writes {
            return false;
        }
        self.store
            .borrow_mut()
            .insert(path.to_path_buf(), tags.to_string());
        true
    }
}

/// Create an empty file at `path`, creating parent directories as
/// needed
///
/// # Panics
///
/// Panics if the file cannot be created; tests have no use for a
/// half-built fixture.
pub fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create fixture directory");
    }
    fs::write(path, b"x").expect("Failed to create fixture file");
}
