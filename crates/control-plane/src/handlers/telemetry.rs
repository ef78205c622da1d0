//! Execution telemetry endpoint.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use crate::telemetry::ExecutionRecord;

/// Default number of records returned.
const DEFAULT_LIMIT: usize = 100;

/// Query parameters for listing records.
#[derive(Debug, Default, Deserialize)]
pub struct TelemetryQuery {
    /// Only records for this workflow.
    pub workflow_id: Option<String>,
    /// Maximum records returned (default 100).
    pub limit: Option<usize>,
}

/// Recent execution records.
#[derive(Debug, Serialize, Deserialize)]
pub struct TelemetryResponse {
    pub records: Vec<ExecutionRecord>,
    /// Records held by the store, before filtering.
    pub total: usize,
}

/// List recent execution records, oldest first.
///
/// `GET /api/telemetry?workflow_id=wf1&limit=50`
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<TelemetryQuery>,
) -> Json<TelemetryResponse> {
    let snapshot = state.facade.snapshot().await;
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LIMIT)
        .min(state.store().max_records());

    Json(TelemetryResponse {
        records: snapshot.recent(query.workflow_id.as_deref(), limit),
        total: snapshot.len(),
    })
}
