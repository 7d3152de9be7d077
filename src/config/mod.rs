//! Configuration management for triplectl
//!
//! This module handles loading, parsing, and managing configuration from various sources:
//! - Configuration file (TOML format)
//! - Environment variables (`TRIPLECTL_*`)
//! - Command-line arguments
//!
//! Configuration precedence (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file
//! 4. Default values

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::Level;

use crate::error::{ConfigError, Result};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server connection configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host, e.g. `rdf.example.com:12110`
    #[serde(default)]
    pub host: String,

    /// Transport scheme (http or https)
    #[serde(default = "default_scheme")]
    pub scheme: String,

    /// Role used to authenticate against the server
    #[serde(default)]
    pub role: String,

    /// Password for the role
    #[serde(default)]
    pub password: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// Enable timestamps in logs
    #[serde(default = "default_log_timestamps")]
    pub timestamps: bool,
}

/// Log level options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Map to the corresponding `tracing` level
    pub fn to_tracing_level(self) -> Level {
        match self {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(ConfigError::InvalidValue {
                field: "log level".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

// Default value functions
fn default_scheme() -> String {
    "https".to_string()
}

fn default_timeout() -> u64 {
    300
}

fn default_log_level() -> LogLevel {
    LogLevel::Info
}

fn default_log_timestamps() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            scheme: default_scheme(),
            role: String::new(),
            password: String::new(),
            timeout: default_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            timestamps: default_log_timestamps(),
        }
    }
}

impl Config {
    /// Default configuration file path: `~/.triplectl.toml`
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".triplectl.toml")
    }

    /// Load configuration from a file, then apply environment overrides.
    ///
    /// When `path` is `None` the default path is used; a missing default
    /// file yields the built-in defaults, while a missing explicit path is
    /// an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (Self::default_path(), false),
        };

        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            toml::from_str(&contents)
                .map_err(|e| ConfigError::InvalidFormat(e.to_string()))?
        } else if explicit {
            return Err(ConfigError::InvalidFormat(format!(
                "config file not found: {}",
                path.display()
            ))
            .into());
        } else {
            Config::default()
        };

        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply `TRIPLECTL_*` environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(host) = std::env::var("TRIPLECTL_SERVER") {
            self.server.host = host;
        }
        if let Ok(scheme) = std::env::var("TRIPLECTL_SCHEME") {
            self.server.scheme = scheme;
        }
        if let Ok(role) = std::env::var("TRIPLECTL_ROLE") {
            self.server.role = role;
        }
        if let Ok(password) = std::env::var("TRIPLECTL_PASSWORD") {
            self.server.password = password;
        }
        if let Ok(level) = std::env::var("TRIPLECTL_LOG_LEVEL") {
            self.logging.level = level.parse()?;
        }

        Ok(())
    }

    /// Write the configuration to `path` as TOML.
    ///
    /// Refuses to replace an existing file unless `overwrite` is set.
    pub fn save(&self, path: &Path, overwrite: bool) -> Result<()> {
        if path.exists() && !overwrite {
            return Err(ConfigError::AlreadyExists(path.display().to_string()).into());
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;
        std::fs::write(path, contents)?;

        Ok(())
    }

    /// Render the configuration as TOML for display
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::InvalidFormat(e.to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.scheme, "https");
        assert_eq!(config.server.timeout, 300);
        assert_eq!(config.logging.level, LogLevel::Info);
        assert!(config.logging.timestamps);
        assert!(config.server.host.is_empty());
    }

    #[test]
    fn test_parse_partial_file() {
        let config: Config = toml::from_str(
            r#"
            [server]
            host = "rdf.example.com:12110"
            role = "admin"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.host, "rdf.example.com:12110");
        assert_eq!(config.server.role, "admin");
        // unset fields fall back to defaults
        assert_eq!(config.server.scheme, "https");
        assert_eq!(config.logging.level, LogLevel::Info);
    }

    #[test]
    fn test_log_level_from_str() {
        assert_eq!("debug".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!("WARN".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("verbose".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_save_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = Config::default();
        config.save(&path, false).unwrap();
        assert!(config.save(&path, false).is_err());
        config.save(&path, true).unwrap();
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.server.host = "localhost:12110".to_string();
        config.server.scheme = "http".to_string();
        config.logging.level = LogLevel::Debug;
        config.save(&path, false).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded.server.host, "localhost:12110");
        assert_eq!(loaded.server.scheme, "http");
        assert_eq!(loaded.logging.level, LogLevel::Debug);
    }
}
