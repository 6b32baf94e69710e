//! External metadata I/O boundary
//!
//! Tags live inside each image file's own metadata and are read and
//! written by exiftool, one process per file. This module owns the
//! static extension -> metadata-field table and the process plumbing;
//! nothing here interprets image bytes or validates formats. Failures
//! degrade to "no tags" on read and `false` on write, logged and never
//! fatal to the listing or export that triggered them. No retries are
//! performed; a failed read is only corrected by a later refresh.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Command;
use tracing::warn;

/// One metadata field and the extensions it serves
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct FormatEntry {
    /// exiftool field argument, e.g. `-Exif:ImageDescription`
    pub field: String,
    /// Extensions served by this field, lowercase with leading dot
    pub extensions: Vec<String>,
}

/// Static extension -> metadata field table
///
/// Files whose extension is absent from the table are unsupported:
/// they read as having no tags, writes are skipped, and enumeration
/// excludes them silently.
#[derive(Clone, Debug, Default)]
pub struct FormatTable(Vec<FormatEntry>);

impl FormatTable {
    #[must_use]
    pub fn new(entries: Vec<FormatEntry>) -> Self {
        Self(entries)
    }

    /// Built-in table: JPEG description in EXIF, PNG and WebP in XMP
    #[must_use]
    pub fn builtin() -> Self {
        Self(vec![
            FormatEntry {
                field: "-Exif:ImageDescription".into(),
                extensions: vec![".jpg".into(), ".jpeg".into()],
            },
            FormatEntry {
                field: "-XMP:Description".into(),
                extensions: vec![".png".into()],
            },
            FormatEntry {
                field: "-XMP:Description".into(),
                extensions: vec![".webp".into()],
            },
        ])
    }

    #[must_use]
    pub fn into_entries(self) -> Vec<FormatEntry> {
        self.0
    }

    fn extension_of(path: &Path) -> Option<String> {
        path.extension()
            .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
    }

    /// Metadata field for `path`, `None` for unsupported extensions
    #[must_use]
    pub fn field_for(&self, path: &Path) -> Option<&str> {
        let ext = Self::extension_of(path)?;
        self.0
            .iter()
            .find(|entry| entry.extensions.iter().any(|e| *e == ext))
            .map(|entry| entry.field.as_str())
    }

    /// Whether `path` carries an extension present in the table
    #[must_use]
    pub fn is_supported(&self, path: &Path) -> bool {
        self.field_for(path).is_some()
    }
}

/// Read/write access to the tag text stored in file metadata
///
/// This is the seam front-ends and tests plug into. The contract:
/// `read_tags` returns an empty string for untagged, unsupported, or
/// unreadable files; `write_tags` reports whether the write succeeded.
/// Implementations log their own failures.
pub trait MetadataIo {
    /// The extension table driving enumeration and field selection
    fn formats(&self) -> &FormatTable;

    /// Current raw tag string for `path`, empty on no-tags or failure
    fn read_tags(&self, path: &Path) -> String;

    /// Write `tags` as the new tag string for `path`
    fn write_tags(&self, path: &Path, tags: &str) -> bool;
}

/// [`MetadataIo`] backed by one exiftool process per operation
pub struct ExifTool {
    formats: FormatTable,
}

impl ExifTool {
    #[must_use]
    pub fn new(formats: FormatTable) -> Self {
        Self { formats }
    }

    /// Probe for the exiftool binary on PATH
    #[must_use]
    pub fn is_available() -> bool {
        Command::new("exiftool")
            .arg("-ver")
            .output()
            .map(|out| out.status.success())
            .unwrap_or(false)
    }
}

impl MetadataIo for ExifTool {
    fn formats(&self) -> &FormatTable {
        &self.formats
    }

    fn read_tags(&self, path: &Path) -> String {
        let Some(field) = self.formats.field_for(path) else {
            warn!("unsupported file format: {}", path.display());
            return String::new();
        };

        match Command::new("exiftool").arg(field).arg("-b").arg(path).output() {
            Ok(out) if out.status.success() => {
                String::from_utf8_lossy(&out.stdout).trim().to_string()
            }
            Ok(out) => {
                warn!(
                    "exiftool error for {}: {}",
                    path.display(),
                    String::from_utf8_lossy(&out.stderr).trim()
                );
                String::new()
            }
            Err(e) => {
                warn!("failed to run exiftool for {}: {e}", path.display());
                String::new()
            }
        }
    }

    fn write_tags(&self, path: &Path, tags: &str) -> bool {
        let Some(field) = self.formats.field_for(path) else {
            warn!("unsupported file format: {}", path.display());
            return false;
        };

        let assignment = format!("{field}={tags}");
        match Command::new("exiftool")
            .arg(assignment)
            .arg("-overwrite_original")
            .arg(path)
            .output()
        {
            Ok(out) if out.status.success() => true,
            Ok(out) => {
                warn!(
                    "exiftool error for {}: {}",
                    path.display(),
                    String::from_utf8_lossy(&out.stderr).trim()
                );
                false
            }
            Err(e) => {
                warn!("failed to run exiftool for {}: {e}", path.display());
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn builtin_table_maps_jpeg_to_exif_description() {
        let table = FormatTable::builtin();
        assert_eq!(
            table.field_for(&PathBuf::from("/pics/photo.jpg")),
            Some("-Exif:ImageDescription")
        );
        assert_eq!(
            table.field_for(&PathBuf::from("/pics/photo.JPEG")),
            Some("-Exif:ImageDescription")
        );
    }

    #[test]
    fn builtin_table_maps_png_and_webp_to_xmp() {
        let table = FormatTable::builtin();
        assert_eq!(
            table.field_for(&PathBuf::from("shot.png")),
            Some("-XMP:Description")
        );
        assert_eq!(
            table.field_for(&PathBuf::from("shot.webp")),
            Some("-XMP:Description")
        );
    }

    #[test]
    fn unsupported_extensions_have_no_field() {
        let table = FormatTable::builtin();
        assert_eq!(table.field_for(&PathBuf::from("notes.txt")), None);
        assert_eq!(table.field_for(&PathBuf::from("raw.cr2")), None);
        assert_eq!(table.field_for(&PathBuf::from("no_extension")), None);
        assert!(!table.is_supported(&PathBuf::from("video.mp4")));
    }

    #[test]
    fn extension_matching_is_case_insensitive() {
        let table = FormatTable::builtin();
        assert!(table.is_supported(&PathBuf::from("UPPER.PNG")));
        assert!(table.is_supported(&PathBuf::from("Mixed.Jpg")));
    }

    #[test]
    fn custom_table_overrides_builtin() {
        let table = FormatTable::new(vec![FormatEntry {
            field: "-XMP:Subject".into(),
            extensions: vec![".tif".into(), ".tiff".into()],
        }]);
        assert_eq!(table.field_for(&PathBuf::from("scan.tiff")), Some("-XMP:Subject"));
        assert!(!table.is_supported(&PathBuf::from("photo.jpg")));
    }
}
