//! Request-scoped gallery session
//!
//! A `Session` owns the pieces every front-end shares: configuration,
//! the metadata cache, and the external metadata backend. Front-ends
//! construct one per process (or hold one behind a mutex) instead of
//! reaching for module-level globals. The session itself performs no
//! locking and must not be mutated from two threads at once; a web
//! adapter serving concurrent requests has to serialize access.
//!
//! Every operation is synchronous and runs to completion; there is no
//! cancellation. Long scans report incremental progress through a
//! callback invoked every [`PROGRESS_INTERVAL`] processed files so an
//! interactive caller can pump its event loop.

pub mod error;

pub use error::SessionError;

use crate::ImageRecord;
use crate::cache::{self, MetadataCache};
use crate::config::AppConfig;
use crate::export::{self, RuleOutcome};
use crate::metadata::{ExifTool, MetadataIo};
use crate::query::TagQuery;
use crate::sort::{self, SortBy};
use crate::tags::TagSet;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// How often the progress callback fires during tag resolution
pub const PROGRESS_INTERVAL: usize = 5;

/// Callback reporting (processed, total) during long scans
pub type ProgressFn<'a> = &'a mut dyn FnMut(usize, usize);

/// Options for a single listing request
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Descend into subdirectories
    pub recursive: bool,
    /// Raw tag query; empty means no filtering
    pub filter: String,
    /// Sort criterion; `None` keeps enumeration order
    pub sort: Option<SortBy>,
    /// Reverse the sort direction
    pub descending: bool,
}

/// Per-file outcome of a tag write batch
#[derive(Debug, Clone, PartialEq)]
pub struct WriteOutcome {
    pub path: PathBuf,
    pub written: bool,
    /// Tag text actually sent to the metadata utility
    pub tags: String,
}

/// Counts reported by a cache refresh pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    pub refreshed: usize,
    pub skipped: usize,
}

/// Shared core consumed by each front-end's thin adapter layer
pub struct Session<M: MetadataIo> {
    config: AppConfig,
    cache: MetadataCache,
    metadata: M,
}

impl Session<ExifTool> {
    /// Session with the exiftool backend and the default cache file
    ///
    /// # Errors
    ///
    /// Returns `CacheError` if the per-user config directory cannot be
    /// determined. A missing or corrupt cache file is not an error.
    pub fn open(config: AppConfig) -> Result<Self, cache::CacheError> {
        let cache = MetadataCache::load(MetadataCache::default_file()?);
        let metadata = ExifTool::new(config.format_table());
        Ok(Self { config, cache, metadata })
    }
}

impl<M: MetadataIo> Session<M> {
    /// Session over an explicit cache and metadata backend
    #[must_use]
    pub fn with_backend(config: AppConfig, cache: MetadataCache, metadata: M) -> Self {
        Self { config, cache, metadata }
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[must_use]
    pub fn cache(&self) -> &MetadataCache {
        &self.cache
    }

    #[must_use]
    pub fn metadata(&self) -> &M {
        &self.metadata
    }

    /// Enumerate supported image files under `folder` in deterministic
    /// name order, flat or recursive
    ///
    /// Files whose extension is absent from the format table are
    /// silently excluded. Unreadable entries below the root are logged
    /// and skipped.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if `folder` is missing, not a directory,
    /// or cannot be resolved.
    pub fn enumerate_images(
        &self,
        folder: &Path,
        recursive: bool,
    ) -> Result<Vec<PathBuf>, SessionError> {
        let root = self.canonical_folder(folder)?;

        let mut walker = WalkDir::new(&root).sort_by_file_name();
        if !recursive {
            walker = walker.max_depth(1);
        }

        let mut images = Vec::new();
        for entry in walker {
            match entry {
                Ok(entry) if entry.file_type().is_file() => {
                    if self.metadata.formats().is_supported(entry.path()) {
                        images.push(entry.into_path());
                    }
                }
                Ok(_) => {}
                Err(e) => warn!("skipping unreadable entry under {}: {e}", root.display()),
            }
        }
        Ok(images)
    }

    /// Tag text for `path`: the fresh cache entry when one exists,
    /// otherwise one external read followed by a cache update
    pub fn resolve_tags(&mut self, path: &Path) -> String {
        if let Some(tags) = self.cache.get_fresh(path) {
            return tags.to_string();
        }
        let tags = self.metadata.read_tags(path);
        self.cache.update(path, &tags);
        tags
    }

    /// List images under `folder`: enumerate, resolve tags, filter,
    /// then sort; the three steps are never reordered
    ///
    /// Missing cache entries are swept after the folder load and the
    /// cache is saved before returning (both non-fatal on failure).
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the folder cannot be enumerated.
    pub fn list_images(
        &mut self,
        folder: &Path,
        options: &ListOptions,
        mut progress: Option<ProgressFn<'_>>,
    ) -> Result<Vec<ImageRecord>, SessionError> {
        let paths = self.enumerate_images(folder, options.recursive)?;
        let total = paths.len();

        let mut records = Vec::with_capacity(total);
        for (i, path) in paths.into_iter().enumerate() {
            let tags = self.resolve_tags(&path);
            let modified = cache::file_mtime(&path).unwrap_or(0.0);
            records.push(ImageRecord::new(path, tags, modified));

            let done = i + 1;
            if done % PROGRESS_INTERVAL == 0
                && let Some(report) = progress.as_mut()
            {
                report(done, total);
            }
        }

        let query = TagQuery::parse(&options.filter);
        let mut records = query.filter(records);

        if let Some(by) = options.sort {
            sort::sort_images(&mut records, by, options.descending);
        }

        let swept = self.cache.sweep_missing();
        if swept > 0 {
            debug!("swept {swept} missing cache entr(ies) after folder load");
        }
        self.save_cache();

        Ok(records)
    }

    /// Write tag text to each path's metadata
    ///
    /// With `replace` false the text is appended to the file's current
    /// tag string. The cache entry is updated only after the external
    /// write reports success; a failed write leaves it untouched.
    pub fn write_tags(&mut self, paths: &[PathBuf], text: &str, replace: bool) -> Vec<WriteOutcome> {
        let mut outcomes = Vec::with_capacity(paths.len());
        for path in paths {
            let new_tags = if replace {
                text.to_string()
            } else {
                let current = self.resolve_tags(path);
                if current.is_empty() {
                    text.to_string()
                } else {
                    format!("{current}, {text}")
                }
            };

            let written = self.metadata.write_tags(path, &new_tags);
            if written {
                self.cache.update(path, &new_tags);
            }
            outcomes.push(WriteOutcome { path: path.clone(), written, tags: new_tags });
        }
        self.save_cache();
        outcomes
    }

    /// Re-read metadata for files whose cache entry is stale or absent;
    /// `full` re-reads every file regardless of freshness
    ///
    /// Cached entries for the folder itself whose file has vanished are
    /// dropped, using the exact-parent index rather than a whole-cache
    /// sweep.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the folder cannot be enumerated.
    pub fn refresh_folder(
        &mut self,
        folder: &Path,
        recursive: bool,
        full: bool,
        mut progress: Option<ProgressFn<'_>>,
    ) -> Result<RefreshSummary, SessionError> {
        let paths = self.enumerate_images(folder, recursive)?;
        let total = paths.len();
        let mut summary = RefreshSummary::default();

        for (i, path) in paths.iter().enumerate() {
            if !full && self.cache.get_fresh(path).is_some() {
                summary.skipped += 1;
            } else {
                let tags = self.metadata.read_tags(path);
                self.cache.update(path, &tags);
                summary.refreshed += 1;
            }

            let done = i + 1;
            if done % PROGRESS_INTERVAL == 0
                && let Some(report) = progress.as_mut()
            {
                report(done, total);
            }
        }

        let dir = self.canonical_folder(folder)?;
        for cached in self.cache.entries_under(&dir) {
            if !cached.exists() {
                self.cache.remove(&cached);
            }
        }

        self.save_cache();
        info!(
            "refreshed {} file(s), skipped {} up-to-date",
            summary.refreshed, summary.skipped
        );
        Ok(summary)
    }

    /// Run the folder's export rules over its images
    ///
    /// Images are taken in natural file order (the enumeration order),
    /// never a user-selected sort. Individual rule failures are
    /// reported per rule; the batch always runs to completion.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the folder cannot be enumerated or the
    /// rule file is missing or malformed.
    pub fn export_folder(
        &mut self,
        folder: &Path,
        recursive: bool,
    ) -> Result<Vec<RuleOutcome>, SessionError> {
        let rules_path = folder.join(&self.config.export_rules_filename);
        let rules = export::load_rules(&rules_path)?;

        let paths = self.enumerate_images(folder, recursive)?;
        let mut records = Vec::with_capacity(paths.len());
        for path in paths {
            let tags = self.resolve_tags(&path);
            let modified = cache::file_mtime(&path).unwrap_or(0.0);
            records.push(ImageRecord::new(path, tags, modified));
        }

        let outcomes = export::run(&records, &rules, &self.config.export);
        self.save_cache();
        Ok(outcomes)
    }

    /// Distinct normalized tags used under `folder` with usage counts,
    /// in alphabetical order
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the folder cannot be enumerated.
    pub fn tag_stats(
        &mut self,
        folder: &Path,
        recursive: bool,
    ) -> Result<Vec<(String, usize)>, SessionError> {
        let paths = self.enumerate_images(folder, recursive)?;
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for path in paths {
            let tags = self.resolve_tags(&path);
            for tag in TagSet::parse(&tags).iter() {
                *counts.entry(tag.to_string()).or_insert(0) += 1;
            }
        }
        self.save_cache();
        Ok(counts.into_iter().collect())
    }

    /// Persist the cache, logging failure; the in-memory map stays
    /// usable for the rest of the session
    pub fn save_cache(&self) {
        if let Err(e) = self.cache.save() {
            warn!("failed to save cache: {e}");
        }
    }

    fn canonical_folder(&self, folder: &Path) -> Result<PathBuf, SessionError> {
        if !folder.exists() {
            return Err(SessionError::FolderNotFound(folder.to_path_buf()));
        }
        if !folder.is_dir() {
            return Err(SessionError::NotADirectory(folder.to_path_buf()));
        }
        folder.canonicalize().map_err(|source| SessionError::Io {
            path: folder.to_path_buf(),
            source,
        })
    }
}
