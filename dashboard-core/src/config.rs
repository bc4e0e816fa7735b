use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::{PlaceQuery, provider::openweather::DEFAULT_BASE_URL};

/// Environment variable that overrides the stored API key.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// default_place = "London"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// OpenWeatherMap access credential.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Place loaded when the dashboard starts.
    #[serde(default = "default_place")]
    pub default_place: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_place() -> String {
    "London".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            default_place: default_place(),
        }
    }
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist
    /// yet, then apply the `OPENWEATHER_API_KEY` override.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        let mut cfg = Self::load_from(&path)?;

        if let Ok(key) = std::env::var(API_KEY_ENV) {
            cfg.override_api_key(&key);
        }

        Ok(cfg)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-dashboard", "weather-dashboard")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Returns the API key, if one is set and non-blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key.trim().to_string());
    }

    /// Replace the key with `value` unless it is blank.
    pub fn override_api_key(&mut self, value: &str) {
        if !value.trim().is_empty() {
            self.set_api_key(value.to_string());
        }
    }

    pub fn default_place(&self) -> Result<PlaceQuery> {
        PlaceQuery::try_from(self.default_place.as_str())
            .context("Configured default_place is empty")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("weather-dashboard-test-{}-{name}", std::process::id()))
            .join("config.toml")
    }

    #[test]
    fn defaults() {
        let cfg = Config::default();

        assert_eq!(cfg.api_key(), None);
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.default_place().expect("default place").as_str(), "London");
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg: Config = toml::from_str("api_key = \"KEY\"").expect("valid toml");

        assert_eq!(cfg.api_key(), Some("KEY"));
        assert_eq!(cfg.default_place, "London");
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let mut cfg = Config::default();
        cfg.set_api_key("   ".into());
        assert_eq!(cfg.api_key(), None);
    }

    #[test]
    fn override_ignores_blank_values() {
        let mut cfg = Config::default();
        cfg.set_api_key("FILE_KEY".into());

        cfg.override_api_key("  ");
        assert_eq!(cfg.api_key(), Some("FILE_KEY"));

        cfg.override_api_key("ENV_KEY");
        assert_eq!(cfg.api_key(), Some("ENV_KEY"));
    }

    #[test]
    fn empty_default_place_is_an_error() {
        let cfg = Config {
            default_place: " ".into(),
            ..Config::default()
        };
        assert!(cfg.default_place().is_err());
    }

    #[test]
    fn missing_file_loads_defaults() {
        let cfg = Config::load_from(&temp_path("missing")).expect("defaults");
        assert_eq!(cfg.default_place, "London");
    }

    #[test]
    fn save_then_load() {
        let path = temp_path("save");
        let mut cfg = Config::default();
        cfg.set_api_key("SAVED".into());
        cfg.default_place = "Paris".into();

        cfg.save_to(&path).expect("save");
        let loaded = Config::load_from(&path).expect("load");

        assert_eq!(loaded.api_key(), Some("SAVED"));
        assert_eq!(loaded.default_place, "Paris");

        let _ = fs::remove_dir_all(path.parent().expect("parent dir"));
    }
}
