use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::units::Units;

/// Display label used when the host does not provide one.
pub const DEFAULT_NAME: &str = "Xweather";

/// Polling interval in minutes used when the host does not provide one.
pub const DEFAULT_UPDATE_INTERVAL: u64 = 60;

pub const API_BASE: &str = "https://data.api.xweather.com";

/// Host configuration for one coordinator instance, stored on disk as TOML.
///
/// Example:
/// ```toml
/// client_id = "..."
/// client_secret = "..."
/// latitude = 52.52
/// longitude = 13.41
/// update_interval = 30
/// units = "imperial"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub client_id: String,
    pub client_secret: String,
    pub latitude: f64,
    pub longitude: f64,

    /// Display label for entities derived from this instance.
    #[serde(default = "default_name")]
    pub name: String,

    /// Polling interval in minutes.
    #[serde(default = "default_update_interval")]
    pub update_interval: u64,

    /// Measurement system for query-time field selection.
    #[serde(default)]
    pub units: Units,

    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_name() -> String {
    DEFAULT_NAME.to_string()
}

const fn default_update_interval() -> u64 {
    DEFAULT_UPDATE_INTERVAL
}

fn default_base_url() -> String {
    API_BASE.to_string()
}

impl Config {
    pub fn new(client_id: String, client_secret: String, latitude: f64, longitude: f64) -> Self {
        Self {
            client_id,
            client_secret,
            latitude,
            longitude,
            name: default_name(),
            update_interval: default_update_interval(),
            units: Units::default(),
            base_url: default_base_url(),
        }
    }

    /// Load config from disk. Credentials are required, so a missing file is
    /// an error rather than an empty default.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Err(anyhow!(
                "No configuration found at {}.\n\
                 Hint: run `xweather configure` first.",
                path.display()
            ));
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "xweather", "xweather-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_toml_applies_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            client_id = "a"
            client_secret = "b"
            latitude = 10.0
            longitude = 20.0
            "#,
        )
        .expect("minimal config should parse");

        assert_eq!(cfg.name, DEFAULT_NAME);
        assert_eq!(cfg.update_interval, 60);
        assert_eq!(cfg.units, Units::Metric);
        assert_eq!(cfg.base_url, API_BASE);
    }

    #[test]
    fn explicit_values_override_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            client_id = "a"
            client_secret = "b"
            latitude = 10.0
            longitude = 20.0
            name = "Backyard"
            update_interval = 30
            units = "imperial"
            "#,
        )
        .expect("config should parse");

        assert_eq!(cfg.name, "Backyard");
        assert_eq!(cfg.update_interval, 30);
        assert_eq!(cfg.units, Units::Imperial);
    }

    #[test]
    fn toml_roundtrip() {
        let mut cfg = Config::new("a".into(), "b".into(), 10.0, 20.0);
        cfg.update_interval = 15;
        cfg.units = Units::Imperial;

        let serialized = toml::to_string_pretty(&cfg).expect("config should serialize");
        let parsed: Config = toml::from_str(&serialized).expect("config should reparse");

        assert_eq!(parsed.client_id, "a");
        assert_eq!(parsed.latitude, 10.0);
        assert_eq!(parsed.update_interval, 15);
        assert_eq!(parsed.units, Units::Imperial);
    }

    #[test]
    fn missing_credentials_fail_to_parse() {
        let result: std::result::Result<Config, _> = toml::from_str(
            r#"
            latitude = 10.0
            longitude = 20.0
            "#,
        );
        assert!(result.is_err());
    }
}
