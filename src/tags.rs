//! Tag string normalization
//!
//! Tags are stored in image metadata as one comma-joined string. A
//! `TagSet` is the canonical form of that string: lowercase, trimmed,
//! non-empty tokens with duplicates collapsed. Normalization happens
//! once here, at build time, so comparisons elsewhere are plain set
//! lookups.

use std::collections::HashSet;

/// Canonical set of tags parsed from a raw comma-separated string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet(HashSet<String>);

impl TagSet {
    /// Parse a raw tag string into a canonical set
    ///
    /// Tokens are split on commas, trimmed, and lowercased; tokens that
    /// are empty after trimming are dropped, never matched against.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let set = raw
            .split(',')
            .map(|token| token.trim().to_lowercase())
            .filter(|token| !token.is_empty())
            .collect();
        Self(set)
    }

    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Tags in alphabetical order, for display and for joining back
    /// into a stored tag string
    #[must_use]
    pub fn to_sorted_vec(&self) -> Vec<String> {
        let mut tags: Vec<String> = self.0.iter().cloned().collect();
        tags.sort();
        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_lowercases_and_trims() {
        let tags = TagSet::parse("cats, Dogs ");
        assert_eq!(tags.len(), 2);
        assert!(tags.contains("cats"));
        assert!(tags.contains("dogs"));
    }

    #[test]
    fn parse_collapses_duplicates() {
        let tags = TagSet::parse("beach, Beach, BEACH");
        assert_eq!(tags.len(), 1);
        assert!(tags.contains("beach"));
    }

    #[test]
    fn parse_drops_empty_tokens() {
        let tags = TagSet::parse("a,, ,b,");
        assert_eq!(tags.len(), 2);
        assert!(tags.contains("a"));
        assert!(tags.contains("b"));
    }

    #[test]
    fn parse_empty_string_is_empty() {
        assert!(TagSet::parse("").is_empty());
        assert!(TagSet::parse("   ").is_empty());
    }

    #[test]
    fn sorted_vec_is_alphabetical() {
        let tags = TagSet::parse("zebra, apple, mango");
        assert_eq!(tags.to_sorted_vec(), vec!["apple", "mango", "zebra"]);
    }
}
