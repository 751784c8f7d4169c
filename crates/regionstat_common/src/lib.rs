//! regionstat common - telemetry data model, store and aggregation.
//!
//! The daemon loads a flat telemetry CSV once per process and answers
//! per-region latency and uptime statistics from it.

pub mod aggregator;
pub mod api;
pub mod config;
pub mod error;
pub mod record;
pub mod store;

pub use aggregator::{compute, RegionReport, RegionStats, DEFAULT_THRESHOLD_MS};
pub use api::{MetricsRequest, StatusResponse};
pub use config::{Config, DataConfig, ServerConfig};
pub use error::{ConfigError, StoreError};
pub use record::{TelemetryRecord, TelemetryTable};
pub use store::{DataSource, LoadOutcome, TelemetryStore};
