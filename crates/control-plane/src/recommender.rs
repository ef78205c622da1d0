//! Automation recommender.
//!
//! Derives automation suggestions from recent execution telemetry: a
//! workflow that succeeded at least `min_runs` times inside the trailing
//! window is a candidate for scheduled execution. Failures never count.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::telemetry::ExecutionRecord;

/// Default minimum number of successful runs.
pub const DEFAULT_MIN_RUNS: u32 = 3;

/// Default trailing window, in hours.
pub const DEFAULT_WINDOW_HOURS: u32 = 24;

/// Recommendation to promote a workflow to automatic execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationSuggestion {
    pub workflow_id: String,
    /// Qualifying successful runs inside the window.
    pub score: u32,
    pub reason: String,
}

/// Threshold and window for [`suggest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuggestParams {
    pub min_runs: u32,
    pub window_hours: u32,
}

impl Default for SuggestParams {
    fn default() -> Self {
        Self {
            min_runs: DEFAULT_MIN_RUNS,
            window_hours: DEFAULT_WINDOW_HOURS,
        }
    }
}

/// Derive suggestions from `records` as of `now`.
///
/// Only successful records with `timestamp >= now - window_hours` count.
/// Output is ordered by score descending, then workflow id ascending.
pub fn suggest(
    records: &[ExecutionRecord],
    now: DateTime<Utc>,
    params: SuggestParams,
) -> Vec<AutomationSuggestion> {
    // A window reaching past the earliest representable instant counts everything.
    let cutoff = now
        .checked_sub_signed(Duration::hours(i64::from(params.window_hours)))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);

    let mut counts: BTreeMap<&str, u32> = BTreeMap::new();
    for record in records
        .iter()
        .filter(|r| r.success && r.timestamp >= cutoff)
    {
        *counts.entry(record.workflow_id.as_str()).or_default() += 1;
    }

    let mut suggestions: Vec<AutomationSuggestion> = counts
        .into_iter()
        .filter(|&(_, count)| count >= params.min_runs)
        .map(|(workflow_id, count)| AutomationSuggestion {
            workflow_id: workflow_id.to_string(),
            score: count,
            reason: format!("ran {} times in last {}h", count, params.window_hours),
        })
        .collect();

    // Stable sort keeps the BTreeMap's ascending id order among equal scores.
    suggestions.sort_by(|a, b| b.score.cmp(&a.score));
    suggestions
}
