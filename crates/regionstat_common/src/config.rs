//! Configuration management for regionstatd.
//!
//! Loads settings from /etc/regionstat/config.toml (or the file named by
//! `REGIONSTAT_CONFIG`) or uses defaults, then applies environment overrides.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Config file path
pub const CONFIG_PATH: &str = "/etc/regionstat/config.toml";

/// Environment variable naming an alternative config file
pub const CONFIG_PATH_ENV: &str = "REGIONSTAT_CONFIG";

/// Environment variable holding the remote telemetry CSV URL
pub const REMOTE_URL_ENV: &str = "TELEMETRY_URL";

/// Environment variable overriding the listen address
pub const BIND_ENV: &str = "REGIONSTAT_BIND";

/// Conventional local data file, relative to the deployment directory
pub const DEFAULT_DATA_PATH: &str = "telemetry.csv";

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Request bodies above this size are rejected
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_max_body_bytes() -> usize {
    64 * 1024
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            max_body_bytes: default_max_body_bytes(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Telemetry data source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Remote CSV URL; takes precedence over the local file when set
    #[serde(default)]
    pub remote_url: Option<String>,

    #[serde(default = "default_local_path")]
    pub local_path: PathBuf,

    /// Remote fetch timeout in seconds
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
}

fn default_local_path() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_PATH)
}

fn default_fetch_timeout() -> u64 {
    10
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            remote_url: None,
            local_path: default_local_path(),
            fetch_timeout_secs: default_fetch_timeout(),
        }
    }
}

impl DataConfig {
    /// The remote URL, ignoring blank values.
    pub fn remote_url(&self) -> Option<&str> {
        self.remote_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

/// Full daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub data: DataConfig,
}

impl Config {
    /// Load config from file or defaults, then apply environment overrides
    pub fn load() -> Self {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| CONFIG_PATH.to_string());
        let mut config = Self::load_from_path(&path).unwrap_or_else(|e| {
            warn!("Config not loaded from {}, using defaults: {}", path, e);
            Config::default()
        });
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Load config from specific path
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Apply overrides from `lookup` (the process environment in `load`).
    /// Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_empty(REMOTE_URL_ENV) {
            self.data.remote_url = Some(url);
        }
        if let Some(addr) = non_empty(BIND_ENV) {
            self.server.bind_addr = addr;
        }
    }
}
