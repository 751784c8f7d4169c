//! Telemetry store: the process-wide, load-once telemetry table.
//!
//! The first `load` picks a source (remote URL, then the local file, then
//! nothing), performs the I/O and caches the outcome. Failed loads are cached
//! as "no data" and never retried; only a restart reloads the data.

use crate::config::DataConfig;
use crate::error::StoreError;
use crate::record::TelemetryTable;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{info, warn};

/// Where the table comes from, decided on first load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// CSV fetched over HTTP(S), bounded by `timeout`
    Remote { url: String, timeout: Duration },
    /// CSV file on local disk
    Local(PathBuf),
    /// Nothing configured and no local file
    Unavailable,
}

impl DataSource {
    /// Resolve by precedence: remote URL, then an existing local file.
    pub fn resolve(config: &DataConfig) -> Self {
        if let Some(url) = config.remote_url() {
            return DataSource::Remote {
                url: url.to_string(),
                timeout: config.fetch_timeout(),
            };
        }

        if config.local_path.is_file() {
            return DataSource::Local(config.local_path.clone());
        }

        DataSource::Unavailable
    }

    fn describe(&self) -> String {
        match self {
            DataSource::Remote { url, .. } => format!("remote {}", url),
            DataSource::Local(path) => format!("file {}", path.display()),
            DataSource::Unavailable => "none".to_string(),
        }
    }
}

/// Cached result of the one load this process performs.
#[derive(Debug, Clone)]
pub enum LoadOutcome {
    Loaded(Arc<TelemetryTable>),
    Unavailable,
}

impl LoadOutcome {
    pub fn table(&self) -> Option<Arc<TelemetryTable>> {
        match self {
            LoadOutcome::Loaded(table) => Some(Arc::clone(table)),
            LoadOutcome::Unavailable => None,
        }
    }
}

struct LoadedState {
    source: DataSource,
    outcome: LoadOutcome,
}

/// Lazily loaded telemetry table, shared by all requests.
pub struct TelemetryStore {
    config: DataConfig,
    state: OnceCell<LoadedState>,
    load_attempts: AtomicUsize,
}

impl TelemetryStore {
    pub fn new(config: DataConfig) -> Self {
        Self {
            config,
            state: OnceCell::new(),
            load_attempts: AtomicUsize::new(0),
        }
    }

    /// Return the table, loading it on first use.
    ///
    /// Concurrent first callers wait on a single load. `None` means no data
    /// is available for the rest of the process lifetime.
    pub async fn load(&self) -> Option<Arc<TelemetryTable>> {
        let state = self
            .state
            .get_or_init(|| async {
                self.load_attempts.fetch_add(1, Ordering::SeqCst);
                let source = DataSource::resolve(&self.config);
                let outcome = load_from(&source).await;
                LoadedState { source, outcome }
            })
            .await;

        state.outcome.table()
    }

    /// Times the underlying I/O has run. At most 1.
    pub fn load_attempts(&self) -> usize {
        self.load_attempts.load(Ordering::SeqCst)
    }

    pub fn is_loaded(&self) -> bool {
        self.state.initialized()
    }

    /// The source chosen by the first load, if it has happened.
    pub fn source(&self) -> Option<&DataSource> {
        self.state.get().map(|s| &s.source)
    }
}

async fn load_from(source: &DataSource) -> LoadOutcome {
    let result = match source {
        DataSource::Remote { url, timeout } => fetch_remote(url, *timeout).await,
        DataSource::Local(path) => read_local(path).await,
        DataSource::Unavailable => {
            warn!("No telemetry source configured and no local file; serving empty results");
            return LoadOutcome::Unavailable;
        }
    };

    match result {
        Ok(table) => {
            info!("Loaded {} telemetry records from {}", table.len(), source.describe());
            LoadOutcome::Loaded(Arc::new(table))
        }
        Err(e) => {
            warn!(
                "Telemetry load from {} failed ({}): {}. No data for this process",
                source.describe(),
                e.kind(),
                e
            );
            LoadOutcome::Unavailable
        }
    }
}

async fn fetch_remote(url: &str, timeout: Duration) -> Result<TelemetryTable, StoreError> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    let response = client.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(StoreError::Status(status.as_u16()));
    }

    let body = response.text().await?;
    TelemetryTable::from_csv_str(&body)
}

async fn read_local(path: &std::path::Path) -> Result<TelemetryTable, StoreError> {
    let text = tokio::fs::read_to_string(path).await?;
    TelemetryTable::from_csv_str(&text)
}
