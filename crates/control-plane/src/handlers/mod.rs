//! HTTP handlers for the Autopilot Control Plane API.
//!
//! This module contains all route handlers organized by domain, and
//! [`router`] which wires them together.

pub mod health;
pub mod suggestions;
pub mod telemetry;
pub mod workflows;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub use health::{api_health, health_check};

/// Build the application router with all routes.
pub fn router(state: AppState) -> Router {
    // CORS configuration - the builder UI is served from another origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Health check routes
    let health_routes = Router::new()
        .route("/health", get(health_check))
        .route("/api/health", get(api_health));

    // Workflow definition and run routes
    let workflow_routes = Router::new()
        .route(
            "/api/workflows",
            post(workflows::create).get(workflows::list),
        )
        .route("/api/workflows/validate", post(workflows::validate))
        .route("/api/workflows/{workflow_id}/run", post(workflows::run));

    // Telemetry and suggestion routes
    let telemetry_routes = Router::new()
        .route("/api/suggestions", get(suggestions::list))
        .route("/api/telemetry", get(telemetry::list));

    Router::new()
        .merge(health_routes)
        .merge(workflow_routes)
        .merge(telemetry_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
