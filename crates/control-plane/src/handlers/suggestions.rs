//! Automation suggestion endpoint.

use axum::{extract::State, Json};

use crate::recommender::AutomationSuggestion;
use crate::state::AppState;

/// List automation suggestions.
///
/// `GET /api/suggestions`
///
/// Uses the default threshold (3 runs) and window (24h). Never fails; an
/// empty list means nothing qualifies.
///
/// # Response
///
/// ```json
/// [
///   {"workflowId": "wf1", "score": 3, "reason": "ran 3 times in last 24h"}
/// ]
/// ```
pub async fn list(State(state): State<AppState>) -> Json<Vec<AutomationSuggestion>> {
    Json(state.facade.list_suggestions().await)
}
