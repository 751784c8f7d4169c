//! Error types for regionstat.

use thiserror::Error;

/// Failures while sourcing the telemetry table.
///
/// These never reach an HTTP caller: the store logs them and records the
/// outcome as "no data".
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Remote source returned status {0}")]
    Status(u16),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl StoreError {
    /// Short label used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::Io(_) => "io",
            StoreError::Csv(_) => "csv",
            StoreError::Http(e) if e.is_timeout() => "timeout",
            StoreError::Http(_) => "http",
            StoreError::Status(_) => "status",
        }
    }
}
