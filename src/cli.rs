//! Command-line interface definitions and parsing
//!
//! This module defines the CLI structure for phototag using the `clap`
//! crate. The CLI is one of the thin adapter layers over the shared
//! core; it holds no gallery logic of its own.
//!
//! # Commands
//!
//! - **list**: list images in a folder with their tags, with optional
//!   tag filtering and sorting
//! - **tag**: write tag text to one or more images
//! - **refresh**: re-read metadata for stale files and update the cache
//! - **export**: run a folder's export rules
//! - **tags**: list the distinct tags used in a folder
//! - **config**: manage application settings
//!
//! A global `--quiet` flag trims output down to bare results for
//! scripting.

use crate::sort::SortBy;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Browse, tag, and export image folders through file metadata
#[derive(Parser, Debug)]
#[command(name = "phototag", version, about)]
pub struct Cli {
    /// Suppress informational output (useful for scripting)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List images in a folder with their tags
    #[command(visible_alias = "ls")]
    List {
        /// Folder to list (defaults to the configured folder)
        folder: Option<PathBuf>,

        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,

        /// Tag query: "cats,dogs" (AND), "| cats,dogs" (OR)
        #[arg(short, long, value_name = "QUERY", default_value = "")]
        search: String,

        /// Sort criterion (enumeration order when omitted)
        #[arg(long, value_enum)]
        sort: Option<SortBy>,

        /// Reverse the sort direction
        #[arg(short, long)]
        descending: bool,
    },

    /// Write tag text to one or more images
    #[command(visible_alias = "t")]
    Tag {
        /// Images to tag
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Tag text to write (comma-separated)
        #[arg(short, long, value_name = "TEXT")]
        tags: String,

        /// Replace the existing tag string instead of appending
        #[arg(long)]
        replace: bool,
    },

    /// Re-read metadata for modified files and update the cache
    Refresh {
        /// Folder to refresh (defaults to the configured folder)
        folder: Option<PathBuf>,

        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,

        /// Re-read every file regardless of freshness
        #[arg(long)]
        full: bool,
    },

    /// Run a folder's export rules
    #[command(visible_alias = "x")]
    Export {
        /// Folder whose rules to run (defaults to the configured folder)
        folder: Option<PathBuf>,

        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,
    },

    /// List the distinct tags used in a folder
    Tags {
        /// Folder to scan (defaults to the configured folder)
        folder: Option<PathBuf>,

        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,
    },

    /// Manage application settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Configuration management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Set a configuration value
    Set {
        /// Configuration key=value (e.g. quiet=true)
        #[arg(value_name = "KEY=VALUE")]
        setting: String,
    },

    /// Get a configuration value
    Get {
        /// Configuration key to retrieve (quiet, default_folder)
        #[arg(value_name = "KEY")]
        key: String,
    },
}

impl Cli {
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
