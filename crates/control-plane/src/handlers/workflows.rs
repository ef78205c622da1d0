//! Workflow API handlers.
//!
//! Definition storage is delegated to the external definition service;
//! runs go through the orchestration façade.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::definitions::WorkflowDefinition;
use crate::error::AppResult;
use crate::facade::RunOutcome;
use crate::graph::{self, WorkflowGraph};
use crate::state::AppState;

/// Request to run a workflow.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunRequest {
    /// Execution context forwarded to the runner.
    #[serde(default)]
    pub context: serde_json::Value,
    /// Graph to check before running, when the caller has it at hand.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph: Option<WorkflowGraph>,
}

/// Response for graph validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateResponse {
    pub valid: bool,
    /// False for an empty graph.
    pub executable: bool,
}

/// Create or replace a workflow definition.
///
/// `POST /api/workflows`
///
/// The definition's graph is validated first; a structural violation is
/// answered with `422` and the offending node or edge id, and nothing is
/// forwarded.
///
/// # Request Body
///
/// ```json
/// {
///   "id": "seo-audit",
///   "name": "Nightly SEO audit",
///   "graph": {"nodes": [...], "edges": [...]}
/// }
/// ```
pub async fn create(
    State(state): State<AppState>,
    Json(definition): Json<WorkflowDefinition>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    graph::validate(&definition.graph)?;

    debug!(workflow_id = %definition.id, "Forwarding workflow definition");
    let body = state.definitions.save(&definition).await?;
    Ok((StatusCode::OK, Json(body)))
}

/// List workflow definitions.
///
/// `GET /api/workflows`
///
/// Relays the definition service's response unchanged.
pub async fn list(State(state): State<AppState>) -> AppResult<Json<serde_json::Value>> {
    Ok(Json(state.definitions.list().await?))
}

/// Validate a workflow graph.
///
/// `POST /api/workflows/validate`
///
/// # Response
///
/// - `200 OK` with `{"valid": true, "executable": bool}`
/// - `422 Unprocessable Entity` with `{"error", "status", "offending_id"}`
pub async fn validate(Json(graph): Json<WorkflowGraph>) -> AppResult<Json<ValidateResponse>> {
    graph::validate(&graph)?;
    Ok(Json(ValidateResponse {
        valid: true,
        executable: graph.is_executable(),
    }))
}

/// Run a workflow.
///
/// `POST /api/workflows/{workflow_id}/run`
///
/// The body is optional. A failed run still answers `200 OK`, with
/// `"ok": false` and the failure detail in `result`.
///
/// # Response
///
/// ```json
/// {
///   "run_id": "6f1c...",
///   "workflow_id": "seo-audit",
///   "ok": true,
///   "result": {...},
///   "duration_ms": 1834
/// }
/// ```
pub async fn run(
    State(state): State<AppState>,
    Path(workflow_id): Path<String>,
    request: Option<Json<RunRequest>>,
) -> AppResult<Json<RunOutcome>> {
    let RunRequest { context, graph } = request.map(|Json(r)| r).unwrap_or_default();

    if let Some(graph) = &graph {
        graph::validate_for_execution(graph)?;
    }

    let outcome = state.facade.trigger_run(&workflow_id, context).await?;
    info!(
        run_id = %outcome.run_id,
        workflow_id = %outcome.workflow_id,
        ok = outcome.ok,
        "Run request completed"
    );
    Ok(Json(outcome))
}
