//! Phototag - a tag-based image gallery core
//!
//! This library provides the shared machinery behind image-tagging
//! front-ends: a freshness-checked metadata cache, a boolean tag query
//! engine, a deterministic sorter, and a template-driven list exporter.
//! Tags live inside each image file's own metadata and are read and
//! written through an external utility (exiftool); the cache only
//! exists to avoid re-invoking it for unchanged files.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

pub mod cache;
pub mod cli;
pub mod config;
pub mod export;
pub mod metadata;
pub mod output;
pub mod query;
pub mod session;
pub mod sort;
pub mod tags;

#[cfg(test)]
pub mod testing;

/// Error enum, contains all failure states of the program
#[derive(Debug, Error)]
pub enum PhototagError {
    /// Cache file error
    #[error("Cache error: {0}")]
    Cache(#[from] cache::CacheError),
    /// Listing or filesystem error
    #[error("Session error: {0}")]
    Session(#[from] session::SessionError),
    /// Export rule error
    #[error("Export error: {0}")]
    Export(#[from] export::ExportError),
    /// Represents a configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),
    /// Represents an I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// One image in a listing: canonical path, base name, the raw tag
/// string read from its metadata, and its modification time in
/// fractional seconds since the Unix epoch.
///
/// Records are transient: rebuilt per listing request, never persisted
/// as a unit.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ImageRecord {
    pub path: PathBuf,
    pub name: String,
    pub tags: String,
    pub modified: f64,
}

impl ImageRecord {
    #[must_use]
    pub fn new(path: PathBuf, tags: String, modified: f64) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { path, name, tags, modified }
    }

    /// Normalized tag set for this record
    #[must_use]
    pub fn tag_set(&self) -> tags::TagSet {
        tags::TagSet::parse(&self.tags)
    }

    /// True when the record carries no tag text at all
    #[must_use]
    pub fn is_untagged(&self) -> bool {
        self.tags.is_empty()
    }
}
