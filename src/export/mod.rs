//! Template-driven export of filtered image lists
//!
//! An export rule pairs an output file with a tag query. Running a rule
//! filters the folder's images by the query (in their enumeration
//! order, never a user-selected sort), renders one templated item per
//! match, and writes the assembled text file, overwriting any previous
//! one. Item templates substitute four placeholders:
//!
//! - `$fn` - filename without extension
//! - `$fe` - extension without the dot
//! - `$fp` - the image's folder relative to the output file's folder
//!   (`.` for the same directory, otherwise `./...` with forward
//!   slashes; the absolute folder when no relative path exists)
//! - `$ffp` - the image's absolute folder
//!
//! Rules come from a per-folder JSON file: an ordered mapping of output
//! path to raw query string. Order decides which rules run first; one
//! rule's failure never aborts the rest of the batch.

pub mod error;

pub use error::ExportError;

use crate::ImageRecord;
use crate::query::TagQuery;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Rendering settings shared by every export rule
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct ExportTemplate {
    /// First line of every generated file
    pub heading: String,
    /// Item template rendered once per matched image
    pub item_format: String,
    /// Insert a blank line after every N matched images; 0 disables
    pub group_by: usize,
}

impl Default for ExportTemplate {
    fn default() -> Self {
        Self {
            heading: String::new(),
            item_format: "![$fn]($fp/$fn.$fe)\n".to_string(),
            group_by: 0,
        }
    }
}

/// One output file and the query selecting its images
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportRule {
    pub output: PathBuf,
    pub query: String,
}

/// Outcome of a single rule in an export batch
#[derive(Debug)]
pub struct RuleOutcome {
    pub output: PathBuf,
    /// Number of images written, or why the rule failed
    pub result: Result<usize, ExportError>,
}

/// Load the ordered rule mapping (output path -> query) from `path`
///
/// # Errors
///
/// Returns `ExportError` if the file is missing, unreadable, not a
/// JSON object, or maps a key to a non-string query.
pub fn load_rules(path: &Path) -> Result<Vec<ExportRule>, ExportError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ExportError::RulesNotFound(path.to_path_buf()));
        }
        Err(source) => {
            return Err(ExportError::RulesRead { path: path.to_path_buf(), source });
        }
    };

    let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&text)
        .map_err(|source| ExportError::RulesParse { path: path.to_path_buf(), source })?;

    let mut rules = Vec::with_capacity(map.len());
    for (output, query) in map {
        let Some(query) = query.as_str() else {
            return Err(ExportError::RuleNotAString {
                path: path.to_path_buf(),
                key: output,
            });
        };
        rules.push(ExportRule {
            output: PathBuf::from(output),
            query: query.to_string(),
        });
    }
    Ok(rules)
}

/// Run every rule over `images`, writing one output file per rule
///
/// Rules run in mapping order. A failing rule is reported in its own
/// outcome and never aborts the remaining rules.
#[must_use]
pub fn run(
    images: &[ImageRecord],
    rules: &[ExportRule],
    template: &ExportTemplate,
) -> Vec<RuleOutcome> {
    rules
        .iter()
        .map(|rule| {
            let result = run_rule(images, rule, template);
            if let Err(e) = &result {
                warn!("export to {} failed: {e}", rule.output.display());
            }
            RuleOutcome { output: rule.output.clone(), result }
        })
        .collect()
}

fn run_rule(
    images: &[ImageRecord],
    rule: &ExportRule,
    template: &ExportTemplate,
) -> Result<usize, ExportError> {
    let query = TagQuery::parse(&rule.query);
    let matched: Vec<&ImageRecord> = if query.matches_all() {
        images.iter().collect()
    } else {
        images
            .iter()
            .filter(|image| query.matches(&image.tag_set()))
            .collect()
    };

    let output = absolutize(&rule.output);
    let export_dir = output
        .parent()
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);

    let mut content = format!("{}\n", template.heading);
    for (i, image) in matched.iter().enumerate() {
        content.push_str(&render_item(&template.item_format, image, &export_dir));

        let rendered = i + 1;
        if template.group_by > 0 && rendered % template.group_by == 0 && rendered < matched.len() {
            content.push('\n');
        }
    }

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)
            .map_err(|source| ExportError::Write { path: output.clone(), source })?;
    }
    fs::write(&output, content)
        .map_err(|source| ExportError::Write { path: output.clone(), source })?;

    info!("exported {} image(s) to {}", matched.len(), output.display());
    Ok(matched.len())
}

fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    }
}

/// Render the item template for one image relative to `export_dir`
fn render_item(item_format: &str, image: &ImageRecord, export_dir: &Path) -> String {
    let stem = image
        .path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = image
        .path
        .extension()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let image_dir = image.path.parent().unwrap_or_else(|| Path::new(""));

    item_format
        .replace("$fn", &stem)
        .replace("$fe", &ext)
        .replace("$fp", &relative_folder(image_dir, export_dir))
        .replace("$ffp", &image_dir.display().to_string())
}

/// Express `image_dir` relative to `export_dir`
///
/// `.` for the same directory, otherwise `./...` joined with forward
/// slashes regardless of platform. When no relative path can be
/// computed (different roots), falls back to the absolute folder.
fn relative_folder(image_dir: &Path, export_dir: &Path) -> String {
    match pathdiff::diff_paths(image_dir, export_dir) {
        Some(rel) if rel.as_os_str().is_empty() => ".".to_string(),
        Some(rel) => {
            let joined = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");
            format!("./{joined}")
        }
        None => image_dir.display().to_string(),
    }
}
