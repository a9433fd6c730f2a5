//! Configuration module
//!
//! Supports loading cache settings from a TOML file. Everything has a
//! default, so a config file is optional and may be partial:
//!
//! ```toml
//! [cache]
//! backend = "file"
//! path = "./.a11y_contrast_cache"
//! ttl_secs = 86400
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cache::memory::DEFAULT_LIMIT;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Cache backend selection and sizing
    pub cache: CacheSettings,
}

/// Cache backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Backend name: "memory", "file", or "null"
    pub backend: String,

    /// Entry limit for the memory backend
    pub limit: usize,

    /// Root directory for the file backend
    pub path: PathBuf,

    /// Default TTL in seconds for file-backend entries (unset = never expire)
    pub ttl_secs: Option<u64>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            backend: "memory".to_string(),
            limit: DEFAULT_LIMIT,
            path: PathBuf::from("./.a11y_contrast_cache"),
            ttl_secs: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.to_path_buf(), e.to_string()))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))?;

        Ok(config)
    }

    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./a11y-contrast.toml (current directory)
    /// 2. ./config.toml (current directory)
    ///
    /// If no config file is found, returns default configuration.
    pub fn load_default() -> Result<Self, ConfigError> {
        let local_paths = [
            PathBuf::from("./a11y-contrast.toml"),
            PathBuf::from("./config.toml"),
        ];

        for path in &local_paths {
            if path.exists() {
                return Self::load(path);
            }
        }

        Ok(Self::default())
    }

    /// Save configuration to a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        fs::write(path.as_ref(), content)
            .map_err(|e| ConfigError::WriteError(path.as_ref().to_path_buf(), e.to_string()))?;

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug)]
pub enum ConfigError {
    /// Configuration file was not found at the specified path
    FileNotFound(PathBuf),
    /// Failed to read the configuration file
    ReadError(PathBuf, String),
    /// Failed to parse the configuration file (invalid TOML)
    ParseError(PathBuf, String),
    /// Failed to serialize configuration to TOML
    SerializeError(String),
    /// Failed to write configuration file
    WriteError(PathBuf, String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => {
                write!(f, "Configuration file not found: {}", path.display())
            }
            ConfigError::ReadError(path, err) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), err)
            }
            ConfigError::ParseError(path, err) => {
                write!(
                    f,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    err
                )
            }
            ConfigError::SerializeError(err) => {
                write!(f, "Failed to serialize configuration: {}", err)
            }
            ConfigError::WriteError(path, err) => {
                write!(
                    f,
                    "Failed to write config file '{}': {}",
                    path.display(),
                    err
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}
