//! Configuration management for XP Track.
//!
//! Loads settings from /etc/xptrack/config.toml (overridable through the
//! XPTRACK_CONFIG environment variable) or falls back to defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

/// Config file path
pub const CONFIG_PATH: &str = "/etc/xptrack/config.toml";

/// Environment variable overriding the config file path
pub const CONFIG_ENV: &str = "XPTRACK_CONFIG";

/// Highscores fetching configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Base URL of the TibiaData API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Highest highscores page to scan before giving up on a character
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// UTC hour of day at which the daily collection cycle runs
    #[serde(default = "default_fetch_hour")]
    pub hour_utc: u32,
}

fn default_base_url() -> String {
    "https://dev.tibiadata.com/v4".to_string()
}

fn default_page_limit() -> u32 {
    20
}

fn default_timeout_secs() -> u64 {
    8
}

fn default_fetch_hour() -> u32 {
    8
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            page_limit: default_page_limit(),
            timeout_secs: default_timeout_secs(),
            hour_utc: default_fetch_hour(),
        }
    }
}

/// Top-level daemon configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XpTrackConfig {
    /// Path to the SQLite database
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Address the HTTP API binds to
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    #[serde(default)]
    pub fetch: FetchConfig,
}

fn default_db_path() -> String {
    "/var/lib/xptrack/xptrack.db".to_string()
}

fn default_listen_addr() -> String {
    // Localhost only; the CLI is the intended consumer.
    "127.0.0.1:7870".to_string()
}

impl Default for XpTrackConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            listen_addr: default_listen_addr(),
            fetch: FetchConfig::default(),
        }
    }
}

impl XpTrackConfig {
    /// Load configuration from the default location.
    ///
    /// A missing or unreadable file is not an error: defaults apply and a
    /// warning is logged, so a fresh install runs without any setup.
    pub fn load() -> Self {
        let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| CONFIG_PATH.to_string());
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Config not loaded from {} ({}), using defaults", path, e);
                Self::default()
            }
        }
    }

    /// Load configuration from a specific path.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: Self =
            toml::from_str(&content).with_context(|| "Failed to parse config TOML")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config: XpTrackConfig = toml::from_str("").unwrap();
        assert_eq!(config.listen_addr, "127.0.0.1:7870");
        assert_eq!(config.fetch.page_limit, 20);
        assert_eq!(config.fetch.timeout_secs, 8);
    }

    #[test]
    fn partial_file_fills_missing_fields() {
        let config: XpTrackConfig = toml::from_str(
            r#"
            db_path = "/tmp/test.db"

            [fetch]
            page_limit = 4
            "#,
        )
        .unwrap();
        assert_eq!(config.db_path, "/tmp/test.db");
        assert_eq!(config.fetch.page_limit, 4);
        assert_eq!(config.fetch.base_url, "https://dev.tibiadata.com/v4");
    }

    #[test]
    fn load_from_missing_file_is_an_error() {
        assert!(XpTrackConfig::load_from("/nonexistent/xptrack.toml").is_err());
    }
}
