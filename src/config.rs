/*!
 * Configuration types for starstat
 */

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::CacheStore;
use crate::client::DEFAULT_BASE_URL;
use crate::error::{Error, Result};
use crate::fetch::DEFAULT_RETRY_LIMIT;

/// Main configuration for catalog queries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Cache directory (one compressed file per chunk or system)
    #[serde(default = "CacheStore::default_dir")]
    pub cache_dir: PathBuf,

    /// Catalog base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Floor of the shared inter-call delay, in milliseconds. The delay
    /// doubles under throttling and shrinks back toward this value.
    #[serde(default = "default_delay_ms")]
    pub base_delay_ms: u64,

    /// Back-off retries before declaring the catalog locked
    #[serde(default = "default_retry_limit")]
    pub retry_limit: u32,

    /// Log level for diagnostic output
    #[serde(default)]
    pub log_level: LogLevel,

    /// Log file path (None = stdout)
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Enable verbose logging (shorthand for log_level = debug)
    #[serde(default)]
    pub verbose: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            cache_dir: CacheStore::default_dir(),
            base_url: default_base_url(),
            base_delay_ms: default_delay_ms(),
            retry_limit: default_retry_limit(),
            log_level: LogLevel::Info,
            log_file: None,
            verbose: false,
        }
    }
}

impl FetchConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("failed to parse {}: {}", path.display(), e)))
    }

    /// The inter-call delay floor as a [`Duration`]
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(Error::Config("base_url must not be empty".to_string()));
        }
        if self.base_delay_ms == 0 {
            return Err(Error::Config(
                "base_delay_ms must be positive; pacing is mandatory for this catalog".to_string(),
            ));
        }
        Ok(())
    }
}

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Only errors
    Error,

    /// Warnings and errors
    Warn,

    /// Info, warnings, and errors
    #[default]
    Info,

    /// Debug and above
    Debug,

    /// All messages including traces
    Trace,
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

// Default value functions for serde
fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_delay_ms() -> u64 {
    2000
}

fn default_retry_limit() -> u32 {
    DEFAULT_RETRY_LIMIT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = FetchConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.base_delay(), Duration::from_millis(2000));
        assert_eq!(config.retry_limit, DEFAULT_RETRY_LIMIT);
    }

    #[test]
    fn test_zero_delay_rejected() {
        let config = FetchConfig {
            base_delay_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_base_url_rejected() {
        let config = FetchConfig {
            base_url: "  ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_toml() {
        let toml = r#"
            base_url = "http://localhost:9000"
            base_delay_ms = 50
            retry_limit = 2
            log_level = "debug"
        "#;
        let config: FetchConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.base_url, "http://localhost:9000");
        assert_eq!(config.base_delay_ms, 50);
        assert_eq!(config.retry_limit, 2);
        assert_eq!(config.log_level, LogLevel::Debug);
    }

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(LogLevel::Error.to_tracing_level(), tracing::Level::ERROR);
        assert_eq!(LogLevel::Trace.to_tracing_level(), tracing::Level::TRACE);
    }
}
