//! API routes for regionstatd
//!
//! Every documented path answers 200. Missing data, unknown regions and
//! malformed bodies all surface as an empty statistics object.

use crate::server::AppState;
use axum::{body::Bytes, extract::State, routing::get, Json, Router};
use regionstat_common::{compute, MetricsRequest, RegionReport, StatusResponse};
use std::sync::Arc;
use tracing::{debug, info};

type AppStateArc = Arc<AppState>;

pub fn metrics_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/", get(status).post(region_metrics))
        .route("/favicon.ico", get(favicon))
}

async fn status() -> Json<StatusResponse> {
    Json(StatusResponse::ok())
}

async fn favicon() -> &'static str {
    ""
}

/// Body is taken raw so that invalid JSON is coerced instead of rejected
async fn region_metrics(State(state): State<AppStateArc>, body: Bytes) -> Json<RegionReport> {
    let table = state.store.load().await;
    let req = MetricsRequest::from_json_bytes(&body);
    debug!(
        "  Metrics request: {} regions, threshold {} ms",
        req.regions.len(),
        req.threshold_ms
    );

    let report = compute(table.as_deref(), &req.regions, req.threshold_ms);
    info!(
        "  Reported {}/{} regions (data loaded: {})",
        report.len(),
        req.regions.len(),
        table.is_some()
    );

    Json(report)
}
