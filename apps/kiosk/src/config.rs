//! # Kiosk Configuration
//!
//! ## Load Order (later overrides earlier)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Defaults                                                            │
//! │  2. kiosk.toml                                                          │
//! │       --config <path>, or the platform config dir:                     │
//! │       ~/.config/fitbell/kiosk.toml (Linux)                             │
//! │       ~/Library/Application Support/app.fitbell.fitbell/kiosk.toml     │
//! │  3. Environment                                                         │
//! │       FITBELL_DB_PATH, FITBELL_SUCCESS_DISPLAY_MS,                     │
//! │       FITBELL_PUBLIC_BASE_URL                                          │
//! │  4. Command-line flags (--db)                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example Config File
//! ```toml
//! [database]
//! path = "/var/lib/fitbell/fitbell.db"
//!
//! [widget]
//! success_display_ms = 4000
//!
//! [public]
//! base_url = "https://fitbell.app"
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use fitbell_core::widget::WidgetSettings;
use fitbell_core::DEFAULT_SUCCESS_DISPLAY_MS;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

const CONFIG_FILE: &str = "kiosk.toml";
const DATABASE_FILE: &str = "fitbell.db";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Could not determine a data directory; pass --db")]
    NoDataDir,
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseSection {
    /// SQLite file. Defaults to `fitbell.db` in the platform data dir.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WidgetSection {
    #[serde(default = "default_success_display_ms")]
    pub success_display_ms: u64,
}

impl Default for WidgetSection {
    fn default() -> Self {
        WidgetSection {
            success_display_ms: default_success_display_ms(),
        }
    }
}

fn default_success_display_ms() -> u64 {
    DEFAULT_SUCCESS_DISPLAY_MS
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicSection {
    /// Prefix of shareable widget links.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for PublicSection {
    fn default() -> Self {
        PublicSection {
            base_url: default_base_url(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:5173".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KioskConfig {
    #[serde(default)]
    pub database: DatabaseSection,

    #[serde(default)]
    pub widget: WidgetSection,

    #[serde(default)]
    pub public: PublicSection,
}

impl KioskConfig {
    /// Loads defaults, then the config file, then the environment.
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = match config_path.or_else(Self::default_config_path) {
            Some(path) if path.exists() => {
                info!(?path, "Loading kiosk config from file");
                Self::from_file(&path)?
            }
            Some(path) => {
                debug!(?path, "Config file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.widget_settings()
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("widget.success_display_ms: {e}")))?;
        if self.public.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("public.base_url must not be empty".into()));
        }
        Ok(())
    }

    pub fn widget_settings(&self) -> WidgetSettings {
        WidgetSettings {
            success_display_ms: self.widget.success_display_ms,
        }
    }

    /// Configured database path, or the platform default. Creates the
    /// parent directory of the default path.
    pub fn database_path(&self) -> ConfigResult<PathBuf> {
        if let Some(path) = &self.database.path {
            return Ok(path.clone());
        }

        let dirs = Self::project_dirs().ok_or(ConfigError::NoDataDir)?;
        let data_dir = dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;
        Ok(data_dir.join(DATABASE_FILE))
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("FITBELL_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = Some(PathBuf::from(path));
        }

        if let Ok(ms) = std::env::var("FITBELL_SUCCESS_DISPLAY_MS") {
            match ms.parse::<u64>() {
                Ok(ms) => self.widget.success_display_ms = ms,
                Err(_) => warn!(value = %ms, "Ignoring invalid FITBELL_SUCCESS_DISPLAY_MS"),
            }
        }

        if let Ok(url) = std::env::var("FITBELL_PUBLIC_BASE_URL") {
            self.public.base_url = url;
        }
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("app", "fitbell", "fitbell")
    }

    fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = KioskConfig::default();

        assert_eq!(config.widget.success_display_ms, 4000);
        assert!(config.database.path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = KioskConfig::from_toml(
            r#"
            [database]
            path = "/tmp/fitbell.db"
            "#,
        )
        .unwrap();

        assert_eq!(config.database.path, Some(PathBuf::from("/tmp/fitbell.db")));
        assert_eq!(config.widget_settings(), WidgetSettings::default());
        assert_eq!(config.public.base_url, "http://localhost:5173");
    }

    #[test]
    fn test_zero_display_rejected() {
        let config = KioskConfig::from_toml("[widget]\nsuccess_display_ms = 0\n").unwrap();

        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_display_above_one_hour_rejected() {
        for value in ["3600001", "9223372036854775807"] {
            let toml_str = format!("[widget]\nsuccess_display_ms = {value}\n");
            let config = KioskConfig::from_toml(&toml_str).unwrap();

            assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        }

        let config = KioskConfig::from_toml("[widget]\nsuccess_display_ms = 3600000\n").unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_malformed_file() {
        assert!(matches!(
            KioskConfig::from_toml("[widget\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_toml_serialization() {
        let toml_str = toml::to_string_pretty(&KioskConfig::default()).unwrap();

        assert!(toml_str.contains("[widget]"));
        assert!(toml_str.contains("[public]"));
    }
}
