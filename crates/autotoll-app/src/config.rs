//! Configuration management for autotoll
//!
//! Config stored at: ~/.config/autotoll/config.json

use autotoll_domain::TollTable;
use autotoll_types::{ConfigError, OutputFormat, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backend base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-vehicle-type toll rates
    #[serde(default)]
    pub toll_rates: TollTable,

    /// Default output format (json, table)
    #[serde(default = "default_output_format")]
    pub output_format: OutputFormat,

    /// History and summary poll period, seconds
    #[serde(default = "default_history_poll")]
    pub history_poll_secs: u64,

    /// Analytics poll period, seconds
    #[serde(default = "default_analytics_poll")]
    pub analytics_poll_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_output_format() -> OutputFormat {
    OutputFormat::Table
}

fn default_history_poll() -> u64 {
    5
}

fn default_analytics_poll() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            toll_rates: TollTable::default(),
            output_format: default_output_format(),
            history_poll_secs: default_history_poll(),
            analytics_poll_secs: default_analytics_poll(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NotFound)?
            .join("autotoll");
        Ok(config_dir)
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load config from an explicit path
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        self.save_to(&path)
    }

    /// Save config to an explicit path
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ConfigError::SaveError(e.to_string()))?;
        Ok(())
    }
}

impl std::fmt::Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "AutoToll Configuration")?;
        writeln!(f, "======================")?;
        writeln!(f)?;
        writeln!(f, "Backend URL:     {}", self.base_url)?;
        writeln!(f, "Output format:   {}", self.output_format)?;
        writeln!(f, "History poll:    {}s", self.history_poll_secs)?;
        writeln!(f, "Analytics poll:  {}s", self.analytics_poll_secs)?;
        writeln!(f)?;
        writeln!(f, "Toll rates:")?;
        for (vehicle_type, rate) in self.toll_rates.iter() {
            writeln!(f, "  {:<12} {:.2}", vehicle_type.label(), rate)?;
        }

        if let Ok(path) = Self::config_path() {
            writeln!(f)?;
            writeln!(f, "Config file:     {}", path.display())?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autotoll_types::VehicleType;

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = Config::default();
        config.base_url = "http://10.0.0.5:8000".to_string();
        config.toll_rates.set(VehicleType::Car, 7.25);
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.base_url, "http://10.0.0.5:8000");
        assert_eq!(loaded.toll_rates.rate(VehicleType::Car), 7.25);
        assert_eq!(loaded.history_poll_secs, 5);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"base_url": "http://gate:8000"}"#).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.base_url, "http://gate:8000");
        assert_eq!(loaded.analytics_poll_secs, 30);
        assert_eq!(loaded.toll_rates.rate(VehicleType::Truck), 12.50);
    }

    #[test]
    fn garbage_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(Config::load_from(&path).is_err());
    }
}
