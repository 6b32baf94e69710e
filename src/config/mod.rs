//! Configuration module for phototag
//!
//! Manages application configuration: the default folder, export
//! rendering settings, and the extension -> metadata field table.
//! Configuration is stored as TOML in the user's config directory and
//! created with defaults on first load.

use crate::export::ExportTemplate;
use crate::metadata::{FormatEntry, FormatTable};
use config::{Config, ConfigError, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Default name of the per-folder export rule file
pub const DEFAULT_RULES_FILENAME: &str = ".gallery_export.json";

/// Application configuration structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    /// Folder opened when an operation is given none
    #[serde(default)]
    pub default_folder: Option<PathBuf>,

    /// Suppress informational output by default
    #[serde(default)]
    pub quiet: bool,

    /// Rendering settings shared by every export rule
    #[serde(default)]
    pub export: ExportTemplate,

    /// Name of the per-folder export rule file
    #[serde(default = "default_rules_filename")]
    pub export_rules_filename: String,

    /// Extension -> metadata field table
    #[serde(default = "default_formats")]
    pub formats: Vec<FormatEntry>,
}

fn default_rules_filename() -> String {
    DEFAULT_RULES_FILENAME.to_string()
}

fn default_formats() -> Vec<FormatEntry> {
    FormatTable::builtin().into_entries()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_folder: None,
            quiet: false,
            export: ExportTemplate::default(),
            export_rules_filename: default_rules_filename(),
            formats: default_formats(),
        }
    }
}

impl AppConfig {
    /// Get the path to the config file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the system config directory cannot be
    /// determined.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            ConfigError::Message("Could not determine config directory".to_string())
        })?;

        Ok(config_dir.join("phototag").join("config.toml"))
    }

    /// Load configuration from file, creating default if it doesn't exist
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config file cannot be read, parsed,
    /// or created.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            let default_config = Self::default();
            default_config.save()?;
            return Ok(default_config);
        }

        let settings = Config::builder()
            .add_source(File::from(config_path).format(FileFormat::Toml))
            .build()?;

        settings.try_deserialize()
    }

    /// Save configuration to file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config directory cannot be created,
    /// the configuration cannot be serialized to TOML, or the file
    /// cannot be written.
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ConfigError::Message(format!("Failed to create config directory: {e}"))
            })?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Message(format!("Failed to serialize config: {e}")))?;

        fs::write(&config_path, toml_string)
            .map_err(|e| ConfigError::Message(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// The extension table as consumed by the metadata backend
    #[must_use]
    pub fn format_table(&self) -> FormatTable {
        FormatTable::new(self.formats.clone())
    }
}
