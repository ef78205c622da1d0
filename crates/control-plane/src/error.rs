//! Error types for the Autopilot Control Plane server.
//!
//! This module provides custom error types that implement `IntoResponse`
//! for seamless integration with Axum handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::definitions::DefinitionError;
use crate::graph::GraphError;

/// Application-level errors for the control plane.
#[derive(Error, Debug)]
pub enum AppError {
    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Workflow graph failed structural validation
    #[error("Invalid workflow graph: {0}")]
    Graph(#[from] GraphError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// External service error
    #[error("External service error: {0}")]
    ExternalService(String),

    /// External collaborator not configured or unreachable
    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            AppError::Graph(e) => {
                let body = Json(json!({
                    "error": e.to_string(),
                    "status": StatusCode::UNPROCESSABLE_ENTITY.as_u16(),
                    "offending_id": e.offending_id(),
                }));
                return (StatusCode::UNPROCESSABLE_ENTITY, body).into_response();
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
            AppError::ExternalService(msg) => {
                tracing::warn!(error = %msg, "External service error");
                (StatusCode::BAD_GATEWAY, msg.clone())
            }
            AppError::Unavailable(msg) => {
                tracing::warn!(error = %msg, "Service unavailable");
                (StatusCode::SERVICE_UNAVAILABLE, msg.clone())
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

/// Result type alias using AppError.
pub type AppResult<T> = Result<T, AppError>;

impl From<DefinitionError> for AppError {
    fn from(err: DefinitionError) -> Self {
        match err {
            DefinitionError::NotConfigured => AppError::Unavailable(err.to_string()),
            other => AppError::ExternalService(other.to_string()),
        }
    }
}
