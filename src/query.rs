//! Tag query parsing and evaluation
//!
//! A search expression is a comma-separated tag list with an optional
//! leading mode prefix: `|` selects OR mode, `&` selects AND mode, and
//! no prefix defaults to AND. An expression with no terms left after
//! parsing matches every record.
//!
//! # Examples
//!
//! ```
//! use phototag::query::TagQuery;
//! use phototag::tags::TagSet;
//!
//! let query = TagQuery::parse("cats, dogs");
//! assert!(query.matches(&TagSet::parse("dogs, cats, beach")));
//! assert!(!query.matches(&TagSet::parse("cats")));
//!
//! let query = TagQuery::parse("| cats, dogs");
//! assert!(query.matches(&TagSet::parse("cats")));
//! ```

use crate::ImageRecord;
use crate::tags::TagSet;

/// How multiple query terms combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryMode {
    /// Match records carrying ALL terms (AND logic, the default)
    #[default]
    All,
    /// Match records carrying ANY term (OR logic)
    Any,
}

/// A parsed search expression: a combination mode plus required terms
#[derive(Debug, Clone, PartialEq)]
pub struct TagQuery {
    mode: QueryMode,
    terms: TagSet,
}

impl TagQuery {
    /// Parse a raw search expression
    ///
    /// The input is trimmed, the first character is inspected for a
    /// `|`/`&` mode prefix (and stripped if present), and the rest is
    /// normalized into a [`TagSet`].
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let mut rest = raw.trim();
        let mode = if let Some(stripped) = rest.strip_prefix('|') {
            rest = stripped;
            QueryMode::Any
        } else if let Some(stripped) = rest.strip_prefix('&') {
            rest = stripped;
            QueryMode::All
        } else {
            QueryMode::All
        };
        Self { mode, terms: TagSet::parse(rest) }
    }

    /// True when this query matches every record (no terms survived
    /// parsing)
    #[must_use]
    pub fn matches_all(&self) -> bool {
        self.terms.is_empty()
    }

    #[must_use]
    pub const fn mode(&self) -> QueryMode {
        self.mode
    }

    #[must_use]
    pub const fn terms(&self) -> &TagSet {
        &self.terms
    }

    /// Evaluate this query against one image's normalized tag set
    #[must_use]
    pub fn matches(&self, tags: &TagSet) -> bool {
        match self.mode {
            QueryMode::All => self.terms.iter().all(|term| tags.contains(term)),
            QueryMode::Any => self.terms.iter().any(|term| tags.contains(term)),
        }
    }

    /// Filter records by this query, preserving input order
    ///
    /// The empty-query guard sits at the top so an inactive filter
    /// never forces per-record tag normalization.
    #[must_use]
    pub fn filter(&self, images: Vec<ImageRecord>) -> Vec<ImageRecord> {
        if self.matches_all() {
            return images;
        }
        images
            .into_iter()
            .filter(|image| self.matches(&image.tag_set()))
            .collect()
    }
}
