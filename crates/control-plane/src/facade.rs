//! Workflow orchestration façade.
//!
//! Single entry point that ties the external runner, the telemetry store
//! and the recommender together:
//!
//! - [`WorkflowFacade::trigger_run`] delegates a run, times it, and records
//!   the outcome whether it succeeded or not
//! - [`WorkflowFacade::list_suggestions`] runs the recommender over a
//!   snapshot of the store with default parameters

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::task::JoinError;
use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::recommender::{suggest, AutomationSuggestion, SuggestParams};
use crate::result_ext::AppendResultExt;
use crate::runner::{RunnerError, RunnerResponse, WorkflowRunner};
use crate::telemetry::{ExecutionRecord, TelemetrySnapshot, TelemetryStore};

/// Default upper bound on a single run.
pub const DEFAULT_RUN_TIMEOUT: Duration = Duration::from_secs(300);

/// What the caller of `trigger_run` gets back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub run_id: Uuid,
    pub workflow_id: String,
    pub ok: bool,
    /// Runner result on success; runner result or error detail on failure.
    pub result: serde_json::Value,
    pub duration_ms: u64,
}

/// How a delegated run ended, before it is recorded.
struct Observed {
    ok: bool,
    result: serde_json::Value,
    meta: Option<serde_json::Value>,
}

impl Observed {
    fn from_runner(response: RunnerResponse) -> Self {
        Self {
            ok: response.ok,
            result: response.result,
            meta: None,
        }
    }

    fn failed(detail: String, mut meta: serde_json::Value) -> Self {
        meta["error"] = json!(detail.clone());
        Self {
            ok: false,
            result: json!(detail),
            meta: Some(meta),
        }
    }

    fn from_error(error: RunnerError) -> Self {
        match error {
            RunnerError::Cancelled => Self::failed(error.to_string(), json!({"cancelled": true})),
            other => Self::failed(other.to_string(), json!({})),
        }
    }

    fn timed_out(timeout: Duration) -> Self {
        Self::failed(
            format!("run timed out after {}s", timeout.as_secs()),
            json!({"timed_out": true}),
        )
    }

    fn from_join_error(error: JoinError) -> Self {
        if error.is_cancelled() {
            Self::failed("run was cancelled".to_string(), json!({"cancelled": true}))
        } else {
            Self::failed(format!("workflow runner panicked: {}", error), json!({}))
        }
    }
}

/// Coordinates the runner, the telemetry store and the recommender.
#[derive(Clone)]
pub struct WorkflowFacade {
    store: Arc<TelemetryStore>,
    runner: Arc<dyn WorkflowRunner>,
    run_timeout: Duration,
}

impl WorkflowFacade {
    /// Create a façade owning `store` and delegating runs to `runner`.
    pub fn new(store: Arc<TelemetryStore>, runner: Arc<dyn WorkflowRunner>) -> Self {
        Self {
            store,
            runner,
            run_timeout: DEFAULT_RUN_TIMEOUT,
        }
    }

    pub fn with_run_timeout(mut self, run_timeout: Duration) -> Self {
        self.run_timeout = run_timeout;
        self
    }

    pub fn store(&self) -> &Arc<TelemetryStore> {
        &self.store
    }

    /// Run a workflow through the external runner and record the outcome.
    ///
    /// The record is appended after the run resolves, whatever the outcome.
    /// Runner failures come back as `ok: false` rather than `Err`; `Err` is
    /// reserved for requests that never reached the runner. The run and its
    /// recording continue on a separate task if this future is dropped.
    pub async fn trigger_run(
        &self,
        workflow_id: &str,
        context: serde_json::Value,
    ) -> AppResult<RunOutcome> {
        if workflow_id.trim().is_empty() {
            return Err(AppError::Validation(
                "workflow_id must not be empty".to_string(),
            ));
        }

        let run_id = Uuid::new_v4();
        let workflow_id = workflow_id.to_string();
        let store = Arc::clone(&self.store);
        let runner = Arc::clone(&self.runner);
        let run_timeout = self.run_timeout;

        info!(run_id = %run_id, workflow_id = %workflow_id, "Triggering workflow run");

        let task = tokio::spawn(async move {
            let started = Instant::now();

            let execution = {
                let workflow_id = workflow_id.clone();
                tokio::spawn(async move {
                    tokio::time::timeout(run_timeout, runner.execute(&workflow_id, context)).await
                })
            };

            let observed = match execution.await {
                Ok(Ok(Ok(response))) => Observed::from_runner(response),
                Ok(Ok(Err(e))) => Observed::from_error(e),
                Ok(Err(_elapsed)) => Observed::timed_out(run_timeout),
                Err(e) => Observed::from_join_error(e),
            };
            let elapsed = started.elapsed();

            let mut record =
                ExecutionRecord::observed(workflow_id.clone(), observed.ok).with_duration(elapsed);
            if let Some(meta) = observed.meta {
                record = record.with_meta(meta);
            }
            let duration_ms = record.duration_ms.unwrap_or_default();

            // Telemetry is best-effort; its failures never change the outcome.
            store.append(record).await.log_append(run_id, &workflow_id);

            info!(
                run_id = %run_id,
                workflow_id = %workflow_id,
                ok = observed.ok,
                duration_ms,
                "Workflow run finished"
            );

            RunOutcome {
                run_id,
                workflow_id,
                ok: observed.ok,
                result: observed.result,
                duration_ms,
            }
        });

        task.await
            .map_err(|e| AppError::Internal(format!("Run task failed: {}", e)))
    }

    /// Suggestions from the current telemetry with default parameters.
    pub async fn list_suggestions(&self) -> Vec<AutomationSuggestion> {
        let snapshot = self.store.snapshot().await;
        suggest(&snapshot, Utc::now(), SuggestParams::default())
    }

    pub async fn snapshot(&self) -> TelemetrySnapshot {
        self.store.snapshot().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tempfile::TempDir;

    struct StaticRunner(Result<RunnerResponse, &'static str>);

    #[async_trait]
    impl WorkflowRunner for StaticRunner {
        async fn execute(
            &self,
            _workflow_id: &str,
            _context: serde_json::Value,
        ) -> Result<RunnerResponse, RunnerError> {
            self.0
                .clone()
                .map_err(|e| RunnerError::Execution(e.to_string()))
        }
    }

    struct PanickingRunner;

    #[async_trait]
    impl WorkflowRunner for PanickingRunner {
        async fn execute(
            &self,
            _workflow_id: &str,
            _context: serde_json::Value,
        ) -> Result<RunnerResponse, RunnerError> {
            panic!("step exploded");
        }
    }

    struct SlowRunner;

    #[async_trait]
    impl WorkflowRunner for SlowRunner {
        async fn execute(
            &self,
            _workflow_id: &str,
            _context: serde_json::Value,
        ) -> Result<RunnerResponse, RunnerError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(RunnerResponse::ok(serde_json::Value::Null))
        }
    }

    struct CancellingRunner;

    #[async_trait]
    impl WorkflowRunner for CancellingRunner {
        async fn execute(
            &self,
            _workflow_id: &str,
            _context: serde_json::Value,
        ) -> Result<RunnerResponse, RunnerError> {
            Err(RunnerError::Cancelled)
        }
    }

    struct EchoRunner;

    #[async_trait]
    impl WorkflowRunner for EchoRunner {
        async fn execute(
            &self,
            workflow_id: &str,
            context: serde_json::Value,
        ) -> Result<RunnerResponse, RunnerError> {
            Ok(RunnerResponse::ok(json!({"workflow": workflow_id, "context": context})))
        }
    }

    async fn facade(temp_dir: &TempDir, runner: impl WorkflowRunner + 'static) -> WorkflowFacade {
        let store = TelemetryStore::open(temp_dir.path().join("executions.json")).await;
        WorkflowFacade::new(Arc::new(store), Arc::new(runner))
    }

    #[tokio::test]
    async fn successful_run_is_recorded() {
        let temp_dir = TempDir::new().unwrap();
        let facade = facade(&temp_dir, EchoRunner).await;

        let outcome = facade
            .trigger_run("wf1", json!({"page": "/pricing"}))
            .await
            .unwrap();
        assert!(outcome.ok);
        assert_eq!(outcome.result["context"]["page"], "/pricing");

        let snapshot = facade.snapshot().await;
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].workflow_id, "wf1");
        assert!(snapshot[0].success);
        assert!(snapshot[0].duration_ms.is_some());
        assert!(snapshot[0].meta.is_none());
    }

    #[tokio::test]
    async fn runner_reported_failure_is_recorded() {
        let temp_dir = TempDir::new().unwrap();
        let facade = facade(
            &temp_dir,
            StaticRunner(Ok(RunnerResponse::failed(json!("quota exceeded")))),
        )
        .await;

        let outcome = facade.trigger_run("wf1", json!({})).await.unwrap();
        assert!(!outcome.ok);
        assert_eq!(outcome.result, json!("quota exceeded"));
        assert!(!facade.snapshot().await[0].success);
    }

    #[tokio::test]
    async fn runner_error_surfaces_verbatim_and_is_recorded() {
        let temp_dir = TempDir::new().unwrap();
        let facade = facade(&temp_dir, StaticRunner(Err("connection refused"))).await;

        let outcome = facade.trigger_run("wf1", json!({})).await.unwrap();
        assert!(!outcome.ok);
        assert_eq!(outcome.result, json!("connection refused"));

        let snapshot = facade.snapshot().await;
        assert!(!snapshot[0].success);
        assert_eq!(snapshot[0].meta.as_ref().unwrap()["error"], "connection refused");
    }

    #[tokio::test]
    async fn failing_runner_is_never_suggested() {
        let temp_dir = TempDir::new().unwrap();
        let facade = facade(&temp_dir, PanickingRunner).await;

        for _ in 0..3 {
            let outcome = facade.trigger_run("flaky", json!({})).await.unwrap();
            assert!(!outcome.ok);
        }

        let snapshot = facade.snapshot().await;
        assert_eq!(snapshot.len(), 3);
        assert!(snapshot.iter().all(|r| !r.success));
        assert!(facade.list_suggestions().await.is_empty());
    }

    #[tokio::test]
    async fn timeout_is_recorded_as_failure() {
        let temp_dir = TempDir::new().unwrap();
        let facade = facade(&temp_dir, SlowRunner)
            .await
            .with_run_timeout(Duration::from_millis(20));

        let outcome = facade.trigger_run("slow", json!({})).await.unwrap();
        assert!(!outcome.ok);

        let snapshot = facade.snapshot().await;
        assert_eq!(snapshot[0].meta.as_ref().unwrap()["timed_out"], true);
    }

    #[tokio::test]
    async fn cancelled_run_is_recorded() {
        let temp_dir = TempDir::new().unwrap();
        let facade = facade(&temp_dir, CancellingRunner).await;

        let outcome = facade.trigger_run("wf1", json!({})).await.unwrap();
        assert!(!outcome.ok);

        let snapshot = facade.snapshot().await;
        assert_eq!(snapshot[0].meta.as_ref().unwrap()["cancelled"], true);
    }

    #[tokio::test]
    async fn empty_workflow_id_is_rejected_without_record() {
        let temp_dir = TempDir::new().unwrap();
        let facade = facade(&temp_dir, EchoRunner).await;

        let result = facade.trigger_run("  ", json!({})).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(facade.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn persist_failure_does_not_fail_run() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, b"file").unwrap();
        let store = TelemetryStore::open(blocker.join("executions.json")).await;
        let facade = WorkflowFacade::new(Arc::new(store), Arc::new(EchoRunner));

        let outcome = facade.trigger_run("wf1", json!({})).await.unwrap();
        assert!(outcome.ok);
        assert_eq!(facade.snapshot().await.len(), 1);
    }

    #[tokio::test]
    async fn suggestions_follow_successful_runs() {
        let temp_dir = TempDir::new().unwrap();
        let facade = facade(&temp_dir, EchoRunner).await;

        for _ in 0..3 {
            facade.trigger_run("wf1", json!({})).await.unwrap();
        }
        facade.trigger_run("wf2", json!({})).await.unwrap();

        let suggestions = facade.list_suggestions().await;
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].workflow_id, "wf1");
        assert_eq!(suggestions[0].reason, "ran 3 times in last 24h");
    }
}
