//! # Configuration Management
//!
//! This module handles loading and parsing configuration from the
//! tide-config.toml file. It provides a centralized way to configure the HTTP
//! listener, the NOAA endpoint, the freshness cache and the default location.
//!
//! Every section and field has a default, so a partial file (or no file at
//! all) still yields a complete configuration.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::noaa::NOAA_BASE_URL;
use crate::stations::DEFAULT_LOCATION;

/// Default configuration file name, looked up in the working directory
pub const CONFIG_FILE: &str = "tide-config.toml";

/// Application configuration loaded from tide-config.toml
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// HTTP listener configuration
    pub server: ServerConfig,
    /// Upstream NOAA API configuration
    pub noaa: NoaaConfig,
    /// Freshness cache configuration
    pub cache: CacheConfig,
    /// View model defaults
    pub forecast: ForecastConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to bind, e.g. "0.0.0.0:8080"
    pub bind: String,
}

/// Upstream NOAA API configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct NoaaConfig {
    /// Datagetter endpoint; point at a local stub for testing
    pub base_url: String,
    /// Per-request timeout in seconds. Unset keeps the HTTP client default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

/// Freshness cache configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache TTL in minutes
    pub ttl_minutes: u64,
    /// Maximum number of locations kept in memory
    pub max_entries: usize,
}

/// View model defaults
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Location served when a request names none
    pub default_location: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

impl Default for NoaaConfig {
    fn default() -> Self {
        NoaaConfig {
            base_url: NOAA_BASE_URL.to_string(),
            timeout_secs: None,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            ttl_minutes: 30,
            max_entries: 256,
        }
    }
}

impl Default for ForecastConfig {
    fn default() -> Self {
        ForecastConfig {
            default_location: DEFAULT_LOCATION.to_string(),
        }
    }
}

impl NoaaConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_minutes * 60)
    }
}

impl Config {
    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(config) => {
                    info!("Loaded configuration from {}", path.display());
                    config
                }
                Err(e) => {
                    warn!("Invalid config file format in {}: {}", path.display(), e);
                    warn!("Using default configuration");
                    Self::default()
                }
            },
            Err(_) => {
                info!(
                    "No config file found at {}, using default configuration",
                    path.display()
                );
                Self::default()
            }
        }
    }

    /// Write this configuration to a new file at `path`
    ///
    /// Fails without touching the file if `path` already exists.
    pub fn create_at_path<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path = path.as_ref();
        let contents = toml::to_string_pretty(self).context("serialize configuration")?;
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .with_context(|| format!("create {}", path.display()))?;
        file.write_all(contents.as_bytes())
            .with_context(|| format!("write {}", path.display()))?;
        info!("Configuration written to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.noaa.base_url, NOAA_BASE_URL);
        assert_eq!(config.noaa.timeout(), None);
        assert_eq!(config.cache.ttl_minutes, 30);
        assert_eq!(config.cache.ttl(), Duration::from_secs(1800));
        assert_eq!(config.forecast.default_location, "San Francisco Bay");
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.noaa.timeout_secs = Some(15);
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let parsed: Config = toml::from_str(
            r#"
            [noaa]
            base_url = "http://127.0.0.1:9000/datagetter"

            [cache]
            ttl_minutes = 5
            "#,
        )
        .unwrap();
        assert_eq!(parsed.noaa.base_url, "http://127.0.0.1:9000/datagetter");
        assert_eq!(parsed.cache.ttl(), Duration::from_secs(300));
        assert_eq!(parsed.cache.max_entries, 256);
        assert_eq!(parsed.server, ServerConfig::default());
        assert_eq!(parsed.forecast, ForecastConfig::default());
    }

    #[test]
    fn test_load_nonexistent_file() {
        let config = Config::load_from_path("/nonexistent/path");
        // Should fallback to default
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_invalid_file_falls_back() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), "[cache]\nttl_minutes = \"soon\"\n").unwrap();
        assert_eq!(Config::load_from_path(file.path()), Config::default());
    }

    #[test]
    fn test_create_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let mut config = Config::default();
        config.forecast.default_location = "Boston".to_string();
        config.server.bind = "127.0.0.1:3000".to_string();

        config.create_at_path(&path).unwrap();
        assert_eq!(Config::load_from_path(&path), config);
    }

    #[test]
    fn test_create_keeps_existing_file() {
        let file = NamedTempFile::new().unwrap();
        let broken = "[cache]\nttl_minutes = \"soon\"\n";
        fs::write(file.path(), broken).unwrap();

        assert!(Config::default().create_at_path(file.path()).is_err());
        assert_eq!(fs::read_to_string(file.path()).unwrap(), broken);
    }
}
