//! HTTP API tests driven through the router with `oneshot`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio_test::assert_ok;
use tower::ServiceExt;

use autopilot_control_plane::{
    config::AppConfig,
    definitions::UnconfiguredDefinitions,
    facade::WorkflowFacade,
    handlers,
    runner::{RunnerError, RunnerResponse, WorkflowRunner},
    state::AppState,
    telemetry::TelemetryStore,
};

/// Succeeds for every workflow except `broken`.
#[derive(Default)]
struct ScriptedRunner {
    calls: AtomicUsize,
}

#[async_trait]
impl WorkflowRunner for ScriptedRunner {
    async fn execute(&self, workflow_id: &str, context: Value) -> Result<RunnerResponse, RunnerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if workflow_id == "broken" {
            return Ok(RunnerResponse::failed(json!("step 2 exploded")));
        }
        Ok(RunnerResponse::ok(json!({ "echo": context })))
    }
}

struct TestApp {
    router: Router,
    runner: Arc<ScriptedRunner>,
    store: Arc<TelemetryStore>,
    _dir: TempDir,
}

async fn test_app() -> TestApp {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(TelemetryStore::open(dir.path().join("executions.json")).await);
    let runner = Arc::new(ScriptedRunner::default());
    let facade = WorkflowFacade::new(Arc::clone(&store), runner.clone() as Arc<dyn WorkflowRunner>);
    let state = AppState::new(facade, Arc::new(UnconfiguredDefinitions), AppConfig::default());

    TestApp {
        router: handlers::router(state),
        runner,
        store,
        _dir: dir,
    }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_empty(uri: &str) -> Request<Body> {
    Request::builder().method("POST").uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn health_reports_fresh_store() {
    let app = test_app().await;

    let (status, body) = send(&app.router, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send(&app.router, get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["telemetry"], "ok");
    assert_eq!(body["telemetry_load"]["state"], "fresh");
    assert_eq!(body["telemetry_records"], 0);
    assert_eq!(body["runner"], "not_configured");
}

#[tokio::test]
async fn validate_accepts_well_formed_graph() {
    let app = test_app().await;
    let graph = json!({
        "nodes": [
            {"id": "n1", "type": "trigger"},
            {"id": "n2", "type": "decision", "label": "Changed?"},
            {"id": "n3", "type": "action"}
        ],
        "edges": [
            {"id": "e1", "source": "n1", "target": "n2"},
            {"id": "e2", "source": "n2", "target": "n2"},
            {"id": "e3", "source": "n2", "target": "n3"}
        ]
    });

    let (status, body) = send(&app.router, post_json("/api/workflows/validate", graph)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"valid": true, "executable": true}));
}

#[tokio::test]
async fn validate_reports_offending_edge() {
    let app = test_app().await;
    let graph = json!({
        "nodes": [{"id": "n1", "type": "trigger"}],
        "edges": [{"id": "e9", "source": "n1", "target": "n2"}]
    });

    let (status, body) = send(&app.router, post_json("/api/workflows/validate", graph)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["offending_id"], "e9");
    assert_eq!(body["status"], 422);
}

#[tokio::test]
async fn run_records_telemetry_and_echoes_context() {
    let app = test_app().await;

    let (status, body) = send(
        &app.router,
        post_json("/api/workflows/seo-audit/run", json!({"context": {"site": "example.com"}})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["workflow_id"], "seo-audit");
    assert_eq!(body["ok"], true);
    assert_eq!(body["result"]["echo"]["site"], "example.com");
    assert_eq!(app.store.len().await, 1);
    assert_eq!(app.runner.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn run_without_body_is_accepted() {
    let app = test_app().await;

    let (status, body) = send(&app.router, post_empty("/api/workflows/seo-audit/run")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert!(body["result"]["echo"].is_null());
}

#[tokio::test]
async fn failed_run_answers_ok_status_with_failure_detail() {
    let app = test_app().await;

    let (status, body) = send(&app.router, post_empty("/api/workflows/broken/run")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], false);
    assert_eq!(body["result"], "step 2 exploded");

    let (_, telemetry) = send(&app.router, get("/api/telemetry?workflow_id=broken")).await;
    assert_eq!(telemetry["records"][0]["success"], false);
}

#[tokio::test]
async fn run_with_empty_graph_is_rejected_before_the_runner() {
    let app = test_app().await;

    let (status, body) = send(
        &app.router,
        post_json("/api/workflows/seo-audit/run", json!({"graph": {"nodes": [], "edges": []}})),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("no nodes"));
    assert_eq!(app.runner.calls.load(Ordering::SeqCst), 0);
    assert!(app.store.is_empty().await);
}

#[tokio::test]
async fn suggestions_follow_successful_runs() {
    let app = test_app().await;

    for _ in 0..3 {
        let (status, _) = send(&app.router, post_empty("/api/workflows/wf-daily/run")).await;
        assert_eq!(status, StatusCode::OK);
    }
    for _ in 0..5 {
        send(&app.router, post_empty("/api/workflows/broken/run")).await;
    }

    let (status, body) = send(&app.router, get("/api/suggestions")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([{"workflowId": "wf-daily", "score": 3, "reason": "ran 3 times in last 24h"}])
    );
}

#[tokio::test]
async fn telemetry_filters_and_limits() {
    let app = test_app().await;

    for id in ["a", "b", "a", "a"] {
        send(&app.router, post_empty(&format!("/api/workflows/{}/run", id))).await;
    }

    let (status, body) = send(&app.router, get("/api/telemetry?workflow_id=a&limit=2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 4);
    let records = body["records"].as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r["workflowId"] == "a"));
}

#[tokio::test]
async fn definitions_unavailable_when_not_configured() {
    let app = test_app().await;

    let (status, body) = send(&app.router, get("/api/workflows")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], 503);

    let definition = json!({
        "id": "seo-audit",
        "graph": {"nodes": [{"id": "n1", "type": "trigger"}], "edges": []}
    });
    let (status, _) = send(&app.router, post_json("/api/workflows", definition)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn invalid_definition_is_rejected_before_forwarding() {
    let app = test_app().await;
    let definition = json!({
        "id": "seo-audit",
        "graph": {
            "nodes": [{"id": "n1", "type": "trigger"}, {"id": "n1", "type": "action"}],
            "edges": []
        }
    });

    let (status, body) = send(&app.router, post_json("/api/workflows", definition)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["offending_id"], "n1");
}

#[tokio::test]
async fn telemetry_survives_restart() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("executions.json");

    {
        let store = Arc::new(TelemetryStore::open(&path).await);
        let facade = WorkflowFacade::new(Arc::clone(&store), Arc::new(ScriptedRunner::default()));
        for _ in 0..3 {
            assert_ok!(facade.trigger_run("wf-nightly", Value::Null).await);
        }
        assert_ok!(store.close().await);
    }

    let store = Arc::new(TelemetryStore::open(&path).await);
    let facade = WorkflowFacade::new(store, Arc::new(ScriptedRunner::default()));
    let suggestions = facade.list_suggestions().await;
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0].workflow_id, "wf-nightly");
}
