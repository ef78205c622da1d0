//! Health check endpoints for the Autopilot Control Plane API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use crate::telemetry::LoadOutcome;

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Health status ("ok")
    pub status: String,
}

/// Detailed health check response for the API.
#[derive(Debug, Serialize)]
pub struct ApiHealthResponse {
    /// Overall health status
    pub status: String,

    /// Server name
    pub server: String,

    /// Telemetry store status ("ok" or "degraded")
    pub telemetry: String,

    /// What the store found at startup
    pub telemetry_load: LoadOutcome,

    /// Records currently held
    pub telemetry_records: usize,

    /// Workflow runner status
    pub runner: String,

    /// Workflow definition service status
    pub definitions: String,

    /// Server uptime in seconds
    pub uptime_seconds: u64,

    /// Server version
    pub version: String,
}

fn configured(flag: bool) -> String {
    if flag { "configured" } else { "not_configured" }.to_string()
}

/// Basic health check endpoint.
///
/// `GET /health`
///
/// Returns a simple health status. This endpoint is suitable for
/// load balancer health checks as it returns quickly.
pub async fn health_check() -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "ok".to_string(),
    })
}

/// Detailed API health check endpoint.
///
/// `GET /api/health`
///
/// Always `200 OK`: telemetry durability is best-effort, so a store that
/// discarded an unreadable log at startup reports `"telemetry": "degraded"`
/// without failing the check.
pub async fn api_health(State(state): State<AppState>) -> Json<ApiHealthResponse> {
    let store = state.store();

    Json(ApiHealthResponse {
        status: "ok".to_string(),
        server: state.config.server_name.clone(),
        telemetry: if store.is_degraded() { "degraded" } else { "ok" }.to_string(),
        telemetry_load: store.load_outcome().clone(),
        telemetry_records: store.len().await,
        runner: configured(state.has_runner()),
        definitions: configured(state.has_definitions()),
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
