//! Output formatting for CLI display
//!
//! This module provides utilities for formatting output in the CLI,
//! including image lines, tag usage counts, and export outcomes.

use crate::ImageRecord;
use crate::export::RuleOutcome;
use chrono::{DateTime, Local};
use colored::Colorize;

/// Format a modification timestamp for display
#[must_use]
pub fn format_modified(modified: f64) -> String {
    DateTime::from_timestamp(modified as i64, 0)
        .map(|utc| utc.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Format an image with its modification time and tags for display
#[must_use]
pub fn image_line(record: &ImageRecord, quiet: bool) -> String {
    if quiet {
        record.path.display().to_string()
    } else if record.is_untagged() {
        format!(
            "  {}  {}  {}",
            format_modified(record.modified),
            record.path.display(),
            "(no tags)".dimmed()
        )
    } else {
        format!(
            "  {}  {}  [{}]",
            format_modified(record.modified),
            record.path.display(),
            record.tags
        )
    }
}

/// Format a tag with usage count
#[must_use]
pub fn tag_with_count(tag: &str, count: usize, quiet: bool) -> String {
    if quiet {
        tag.to_string()
    } else {
        format!("  {tag} (used by {count} file(s))")
    }
}

/// Format one export rule's outcome, colored by success
#[must_use]
pub fn rule_line(outcome: &RuleOutcome) -> String {
    match &outcome.result {
        Ok(count) => format!(
            "  {} ({count} image(s))",
            outcome.output.display().to_string().green()
        ),
        Err(e) => format!("  {}: {e}", outcome.output.display().to_string().red()),
    }
}
