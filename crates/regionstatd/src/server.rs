//! HTTP server for regionstatd

use crate::routes;
use anyhow::{Context, Result};
use axum::http::Method;
use axum::Router;
use regionstat_common::{Config, ServerConfig, TelemetryStore};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Application state shared across handlers
pub struct AppState {
    pub store: TelemetryStore,
}

impl AppState {
    pub fn new(store: TelemetryStore) -> Self {
        Self { store }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(TelemetryStore::new(config.data.clone()))
    }
}

/// Any origin, GET/POST/OPTIONS, any header
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

/// Build the full router with middleware
pub fn router(state: Arc<AppState>, server: &ServerConfig) -> Router {
    Router::new()
        .merge(routes::metrics_routes())
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(server.max_body_bytes))
        .layer(TimeoutLayer::new(server.request_timeout()))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

/// Run the HTTP server until ctrl-c
pub async fn run(config: Config, state: AppState) -> Result<()> {
    let app = router(Arc::new(state), &config.server);

    let addr = config.server.bind_addr.as_str();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("  Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
}
