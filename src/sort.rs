//! Deterministic ordering of image listings
//!
//! Three criteria: natural filename order (embedded digit runs compare
//! as numbers, so `img2` sorts before `img10`), raw filesystem
//! modification time, and tag text. Tag ordering partitions untagged
//! records after all tagged ones in both directions; there is no
//! "untagged first" mode. All sorts are stable.

use crate::ImageRecord;
use clap::ValueEnum;
use std::cmp::Ordering;

/// Sort criterion for image listings
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    /// Natural filename order
    Name,
    /// Filesystem modification time
    Modified,
    /// Tag text, untagged records last
    Tags,
}

/// One run of a natural sort key
///
/// Filenames split into alternating text and digit runs; two keys built
/// from the same split always compare runs of matching kind position by
/// position. The cross-kind arms only decide ties between keys of
/// different shapes, and order digits first for determinism.
#[derive(Debug, Clone, PartialEq, Eq)]
enum NaturalPart {
    Text(String),
    Digits(String),
}

impl Ord for NaturalPart {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Digits(a), Self::Digits(b)) => cmp_digit_runs(a, b),
            (Self::Digits(_), Self::Text(_)) => Ordering::Less,
            (Self::Text(_), Self::Digits(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for NaturalPart {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Compare two digit runs by numeric value without parsing
///
/// Leading zeros are stripped, so `"007"` and `"7"` compare equal; a
/// longer remaining run is always the larger number.
fn cmp_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn split_runs(name: &str) -> Vec<NaturalPart> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_digits = false;

    for ch in name.chars() {
        let is_digit = ch.is_ascii_digit();
        if !current.is_empty() && is_digit != in_digits {
            parts.push(take_run(&mut current, in_digits));
        }
        in_digits = is_digit;
        current.push(ch);
    }
    if !current.is_empty() {
        parts.push(take_run(&mut current, in_digits));
    }
    parts
}

fn take_run(current: &mut String, in_digits: bool) -> NaturalPart {
    let run = std::mem::take(current);
    if in_digits {
        NaturalPart::Digits(run)
    } else {
        // Text runs compare case-insensitively; fold once at build time
        NaturalPart::Text(run.to_lowercase())
    }
}

/// Natural comparison of two filenames
#[must_use]
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    split_runs(a).cmp(&split_runs(b))
}

/// Sort `images` in place by the given criterion
///
/// `descending` reverses the comparison for names, timestamps, and the
/// tagged partition of a tag sort, but never relocates the untagged
/// partition: untagged records stay at the end either way.
pub fn sort_images(images: &mut Vec<ImageRecord>, by: SortBy, descending: bool) {
    let dir = |ord: Ordering| if descending { ord.reverse() } else { ord };

    match by {
        SortBy::Name => {
            images.sort_by(|a, b| dir(natural_cmp(&a.name, &b.name)));
        }
        SortBy::Modified => {
            images.sort_by(|a, b| dir(a.modified.total_cmp(&b.modified)));
        }
        SortBy::Tags => {
            let mut tagged = Vec::with_capacity(images.len());
            let mut untagged = Vec::new();
            for image in images.drain(..) {
                if image.is_untagged() {
                    untagged.push(image);
                } else {
                    tagged.push(image);
                }
            }
            tagged.sort_by(|a, b| dir(a.tags.to_lowercase().cmp(&b.tags.to_lowercase())));
            images.extend(tagged);
            images.extend(untagged);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn record(name: &str, tags: &str, modified: f64) -> ImageRecord {
        ImageRecord::new(PathBuf::from(format!("/pics/{name}")), tags.to_string(), modified)
    }

    fn names(images: &[ImageRecord]) -> Vec<&str> {
        images.iter().map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn natural_sort_orders_digit_runs_numerically() {
        let mut images = vec![
            record("img10.jpg", "", 0.0),
            record("img2.jpg", "", 0.0),
            record("img1.jpg", "", 0.0),
        ];
        sort_images(&mut images, SortBy::Name, false);
        assert_eq!(names(&images), vec!["img1.jpg", "img2.jpg", "img10.jpg"]);
    }

    #[test]
    fn natural_sort_descending_reverses() {
        let mut images = vec![
            record("img1.jpg", "", 0.0),
            record("img10.jpg", "", 0.0),
            record("img2.jpg", "", 0.0),
        ];
        sort_images(&mut images, SortBy::Name, true);
        assert_eq!(names(&images), vec!["img10.jpg", "img2.jpg", "img1.jpg"]);
    }

    #[test]
    fn natural_cmp_is_case_insensitive() {
        assert_eq!(natural_cmp("Photo5.PNG", "photo5.png"), Ordering::Equal);
        assert_eq!(natural_cmp("ABC.jpg", "abd.jpg"), Ordering::Less);
    }

    #[test]
    fn natural_cmp_ignores_leading_zeros() {
        assert_eq!(natural_cmp("img007.jpg", "img7.jpg"), Ordering::Equal);
        assert_eq!(natural_cmp("img08.jpg", "img9.jpg"), Ordering::Less);
        assert_eq!(natural_cmp("img10.jpg", "img09.jpg"), Ordering::Greater);
    }

    #[test]
    fn modified_sort_uses_raw_timestamps() {
        let mut images = vec![
            record("b.jpg", "", 30.0),
            record("a.jpg", "", 10.0),
            record("c.jpg", "", 20.0),
        ];
        sort_images(&mut images, SortBy::Modified, false);
        assert_eq!(names(&images), vec!["a.jpg", "c.jpg", "b.jpg"]);

        sort_images(&mut images, SortBy::Modified, true);
        assert_eq!(names(&images), vec!["b.jpg", "c.jpg", "a.jpg"]);
    }

    #[test]
    fn tag_sort_places_untagged_last_both_directions() {
        let build = || {
            vec![
                record("u1.jpg", "", 0.0),
                record("z.jpg", "zebra", 0.0),
                record("a.jpg", "apple", 0.0),
                record("u2.jpg", "", 0.0),
            ]
        };

        let mut ascending = build();
        sort_images(&mut ascending, SortBy::Tags, false);
        assert_eq!(names(&ascending), vec!["a.jpg", "z.jpg", "u1.jpg", "u2.jpg"]);

        let mut descending = build();
        sort_images(&mut descending, SortBy::Tags, true);
        assert_eq!(names(&descending), vec!["z.jpg", "a.jpg", "u1.jpg", "u2.jpg"]);
    }

    #[test]
    fn tag_sort_compares_case_insensitively() {
        let mut images = vec![
            record("b.jpg", "Zebra", 0.0),
            record("a.jpg", "apple", 0.0),
        ];
        sort_images(&mut images, SortBy::Tags, false);
        assert_eq!(names(&images), vec!["a.jpg", "b.jpg"]);
    }

    #[test]
    fn sorts_are_stable_for_equal_keys() {
        let mut images = vec![
            record("first.jpg", "same", 5.0),
            record("second.jpg", "same", 5.0),
        ];
        sort_images(&mut images, SortBy::Modified, false);
        assert_eq!(names(&images), vec!["first.jpg", "second.jpg"]);

        sort_images(&mut images, SortBy::Tags, false);
        assert_eq!(names(&images), vec!["first.jpg", "second.jpg"]);
    }
}
