//! Freshness-checked metadata cache
//!
//! Maps canonical image paths to the tag string read at a known
//! modification time. An entry is served only while the file's live
//! mtime matches the recorded one within [`MTIME_TOLERANCE`]; anything
//! staler sends the caller back to the external metadata utility. The
//! whole map persists as one human-inspectable JSON file under the
//! per-user config directory, rewritten in full on each save.
//!
//! The cache is never a source of truth: a missing or corrupt file
//! loads as an empty map, and a failed save leaves the in-memory map
//! usable for the rest of the session.

pub mod error;

pub use error::CacheError;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use tracing::{debug, warn};

/// Allowed drift between a cached mtime and the live filesystem mtime,
/// in seconds
pub const MTIME_TOLERANCE: f64 = 0.1;

/// Tag text recorded for one file at a known modification time
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CacheEntry {
    /// Modification time at the last read, fractional seconds since
    /// the Unix epoch
    pub mtime: f64,
    /// Raw tag string at that time
    pub tags: String,
}

/// Persistent path -> [`CacheEntry`] map with a single backing file
///
/// Not safe for concurrent mutation; a front-end serving simultaneous
/// requests must serialize access around read-modify-write sequences.
#[derive(Debug)]
pub struct MetadataCache {
    file: PathBuf,
    entries: BTreeMap<PathBuf, CacheEntry>,
}

/// Current modification time of `path` as fractional seconds since the
/// Unix epoch, `None` when the file cannot be stat'ed
#[must_use]
pub fn file_mtime(path: &Path) -> Option<f64> {
    let modified = fs::metadata(path).and_then(|meta| meta.modified()).ok()?;
    modified
        .duration_since(UNIX_EPOCH)
        .ok()
        .map(|since| since.as_secs_f64())
}

impl MetadataCache {
    /// Default cache file location under the per-user config directory
    ///
    /// # Errors
    ///
    /// Returns `CacheError::NoConfigDir` if the system config directory
    /// cannot be determined.
    pub fn default_file() -> Result<PathBuf, CacheError> {
        let config_dir = dirs::config_dir().ok_or(CacheError::NoConfigDir)?;
        Ok(config_dir.join("phototag").join("cache.json"))
    }

    /// Load the cache from `file`, starting empty when the file is
    /// missing or corrupt
    ///
    /// Never fails: broken cache contents are logged and discarded,
    /// then re-derived from the metadata utility on demand.
    #[must_use]
    pub fn load(file: PathBuf) -> Self {
        let entries = match fs::read_to_string(&file) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("malformed cache file {}: {e}", file.display());
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no cache file at {}", file.display());
                BTreeMap::new()
            }
            Err(e) => {
                warn!("cannot read cache file {}: {e}", file.display());
                BTreeMap::new()
            }
        };
        Self { file, entries }
    }

    /// Write the full map back to the backing file as pretty JSON,
    /// creating parent directories as needed
    ///
    /// # Errors
    ///
    /// Returns `CacheError` if the directory cannot be created or the
    /// file cannot be written. Callers treat this as non-fatal.
    pub fn save(&self) -> Result<(), CacheError> {
        if let Some(parent) = self.file.parent() {
            fs::create_dir_all(parent).map_err(|source| CacheError::Io {
                path: self.file.clone(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(&self.entries).map_err(|source| {
            CacheError::Malformed { path: self.file.clone(), source }
        })?;
        fs::write(&self.file, json).map_err(|source| CacheError::Io {
            path: self.file.clone(),
            source,
        })
    }

    /// Cached tag text for `path`, only while the entry is fresh
    ///
    /// An entry is fresh iff its recorded mtime is within
    /// [`MTIME_TOLERANCE`] of the file's current mtime. Never consults
    /// the external metadata utility; a stat failure reads as stale.
    #[must_use]
    pub fn get_fresh(&self, path: &Path) -> Option<&str> {
        let entry = self.entries.get(path)?;
        let live = file_mtime(path)?;
        if (entry.mtime - live).abs() <= MTIME_TOLERANCE {
            Some(&entry.tags)
        } else {
            debug!("file modified since cache: {}", path.display());
            None
        }
    }

    /// Record `tags` for `path`, stamped with the file's current mtime
    ///
    /// Called after every successful external read or write so the
    /// entry's timestamp matches the file state that produced the tags.
    /// If the file cannot be stat'ed the entry is left untouched.
    pub fn update(&mut self, path: &Path, tags: &str) {
        match file_mtime(path) {
            Some(mtime) => {
                self.entries.insert(
                    path.to_path_buf(),
                    CacheEntry { mtime, tags: tags.to_string() },
                );
            }
            None => warn!("cannot stat {}, cache entry not updated", path.display()),
        }
    }

    /// Drop the entry for `path`, returning whether one existed
    pub fn remove(&mut self, path: &Path) -> bool {
        self.entries.remove(path).is_some()
    }

    /// Drop entries whose path no longer exists on disk, returning the
    /// number removed
    ///
    /// Cost scales with cache size, so callers run this opportunistically
    /// after a folder load rather than per operation.
    pub fn sweep_missing(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|path, _| path.exists());
        let removed = before - self.entries.len();
        if removed > 0 {
            debug!("removed {removed} missing file(s) from cache");
        }
        removed
    }

    /// Cached paths whose parent directory is exactly `dir` (not
    /// recursive)
    #[must_use]
    pub fn entries_under(&self, dir: &Path) -> Vec<PathBuf> {
        self.entries
            .keys()
            .filter(|path| path.parent() == Some(dir))
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Path of the backing file
    #[must_use]
    pub fn file(&self) -> &Path {
        &self.file
    }
}
