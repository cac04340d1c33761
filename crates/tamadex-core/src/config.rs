//! Configuration management for Tamadex.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use crate::types::SearchPolicy;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration.
///
/// This is loaded from `~/.config/tamadex/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Dataset and image source locations
    pub data: DataConfig,
    /// Favorites storage settings
    pub storage: StorageConfig,
    /// Search behavior per screen
    pub search: SearchConfig,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from a specific file, falling back to defaults if
    /// it does not exist.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            tracing::debug!("Loading config from {}", path.display());
            let contents = fs::read_to_string(path)?;
            let config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Apply environment variable overrides to an already loaded config.
    ///
    /// Supports the following environment variables:
    /// - `TAMADEX_DATASET`: Override the dataset path
    /// - `TAMADEX_DATABASE`: Override the favorites database path
    /// - `TAMADEX_ITEM_SEARCH_MIN_CHARS`: Override the item search minimum
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("TAMADEX_DATASET") {
            tracing::debug!("Override data.dataset_path from env: {}", val);
            self.data.dataset_path = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var("TAMADEX_DATABASE") {
            tracing::debug!("Override storage.database_path from env: {}", val);
            self.storage.database_path = Some(PathBuf::from(val));
        }

        if let Ok(val) = std::env::var("TAMADEX_ITEM_SEARCH_MIN_CHARS") {
            if let Ok(min_chars) = val.parse() {
                self.search.items.min_chars = min_chars;
                tracing::debug!("Override search.items.min_chars from env: {}", min_chars);
            }
        }
    }

    /// Save configuration to a specific file.
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        let config_dir = path.parent().ok_or_else(|| ConfigError::InvalidValue {
            field: "config_path".to_string(),
            reason: "no parent directory".to_string(),
        })?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Resolve the favorites database path, defaulting to the data directory.
    pub fn database_path(&self) -> ConfigResult<PathBuf> {
        match &self.storage.database_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::data_dir()?.join("favorites.db")),
        }
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/tamadex/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// Get the data directory path.
    ///
    /// Uses XDG base directories: `~/.local/share/tamadex`
    pub fn data_dir() -> ConfigResult<PathBuf> {
        Ok(project_dirs()?.data_dir().to_path_buf())
    }
}

fn project_dirs() -> ConfigResult<ProjectDirs> {
    ProjectDirs::from("com", "tamadex", "tamadex").ok_or(ConfigError::NoConfigDir)
}

/// Dataset and image source locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Primary dataset document (required)
    pub dataset_path: PathBuf,
    /// Character name -> image URL mapping (optional)
    pub image_map_path: Option<PathBuf>,
    /// Embedded images loaded at start-up (optional)
    pub embedded_core_path: Option<PathBuf>,
    /// Embedded images loaded on first miss (optional)
    pub embedded_extra_path: Option<PathBuf>,
    /// Mirror used to build image URLs from bare file names
    pub image_mirror_base: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("data/tamadex.json"),
            image_map_path: None,
            embedded_core_path: None,
            embedded_extra_path: None,
            image_mirror_base: "https://static.wikia.nocookie.net/tamagotchi/images".to_string(),
        }
    }
}

/// Favorites storage settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database path; `None` uses the XDG data directory
    pub database_path: Option<PathBuf>,
}

/// Search behavior per screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Item search screen
    pub items: SearchPolicy,
    /// Character list filter
    pub characters: SearchPolicy,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            items: SearchPolicy::strict(2),
            characters: SearchPolicy::browse(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BelowMinimum;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.data.dataset_path, PathBuf::from("data/tamadex.json"));
        assert!(config.data.image_map_path.is_none());
        assert_eq!(config.search.items, SearchPolicy::strict(2));
        assert_eq!(config.search.characters, SearchPolicy::browse());
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("[data]"));
        assert!(toml_str.contains("[search.items]"));

        let parsed: AppConfig = toml::from_str(&toml_str).expect("parse serialized config");
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_config_save_load() {
        let tmp = TempDir::new().expect("create temp dir");
        let config_path = tmp.path().join("nested").join("config.toml");

        let mut config = AppConfig::default();
        config.data.dataset_path = PathBuf::from("/srv/tamadex/data.json");
        config.storage.database_path = Some(tmp.path().join("fav.db"));

        config.save_to(&config_path).expect("save config");
        let loaded = AppConfig::load_from(&config_path).expect("load config");

        assert_eq!(loaded, config);
        assert_eq!(
            loaded.database_path().expect("database path"),
            tmp.path().join("fav.db")
        );
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let tmp = TempDir::new().expect("create temp dir");
        let loaded = AppConfig::load_from(&tmp.path().join("absent.toml")).expect("load config");
        assert_eq!(loaded, AppConfig::default());
    }

    #[test]
    fn test_env_overrides() {
        std::env::set_var("TAMADEX_DATASET", "/tmp/override.json");
        std::env::set_var("TAMADEX_ITEM_SEARCH_MIN_CHARS", "3");

        let mut config = AppConfig::default();
        config.apply_env_overrides();
        assert_eq!(config.data.dataset_path, PathBuf::from("/tmp/override.json"));
        assert_eq!(config.search.items.min_chars, 3);

        std::env::remove_var("TAMADEX_DATASET");
        std::env::remove_var("TAMADEX_ITEM_SEARCH_MIN_CHARS");
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[data]
dataset_path = "custom.json"

[search.characters]
min_chars = 3
below_min = "return_none"
"#;

        let config: AppConfig = toml::from_str(toml_str).expect("parse partial config");
        assert_eq!(config.data.dataset_path, PathBuf::from("custom.json"));
        assert_eq!(config.search.characters.below_min, BelowMinimum::ReturnNone);
        // These should be defaults
        assert_eq!(config.search.items, SearchPolicy::strict(2));
        assert_eq!(
            config.data.image_mirror_base,
            "https://static.wikia.nocookie.net/tamagotchi/images"
        );
    }
}
