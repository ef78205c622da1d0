//! External workflow runner.
//!
//! Step execution is not done here. The façade hands each run to a
//! [`WorkflowRunner`] and only observes its outcome.

pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use http::HttpWorkflowRunner;

/// Outcome reported by a runner for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerResponse {
    pub ok: bool,
    #[serde(default)]
    pub result: serde_json::Value,
}

impl RunnerResponse {
    pub fn ok(result: serde_json::Value) -> Self {
        Self { ok: true, result }
    }

    pub fn failed(result: serde_json::Value) -> Self {
        Self { ok: false, result }
    }
}

/// Errors raised while delegating a run.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("workflow runner is not configured")]
    NotConfigured,

    #[error("invalid runner URL: {0}")]
    InvalidUrl(String),

    #[error("runner request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("runner returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("run was cancelled")]
    Cancelled,

    #[error("{0}")]
    Execution(String),
}

/// Executes workflows on behalf of the façade.
#[async_trait]
pub trait WorkflowRunner: Send + Sync {
    async fn execute(
        &self,
        workflow_id: &str,
        context: serde_json::Value,
    ) -> Result<RunnerResponse, RunnerError>;
}

/// Runner used when no runner URL is configured; every run fails.
#[derive(Debug, Clone, Default)]
pub struct UnconfiguredRunner;

#[async_trait]
impl WorkflowRunner for UnconfiguredRunner {
    async fn execute(
        &self,
        _workflow_id: &str,
        _context: serde_json::Value,
    ) -> Result<RunnerResponse, RunnerError> {
        Err(RunnerError::NotConfigured)
    }
}
