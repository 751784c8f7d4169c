//! regionstat daemon - per-region latency and uptime statistics over HTTP.

use anyhow::Result;
use regionstat_common::Config;
use regionstatd::server::{self, AppState};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("regionstatd v{} starting", env!("CARGO_PKG_VERSION"));

    let config = Config::load();
    let state = AppState::from_config(&config);

    server::run(config, state).await
}
