//! Workflow definition service.
//!
//! Definitions are stored elsewhere. This crate only checks a definition's
//! graph before forwarding it and relays listings unchanged.

pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::graph::WorkflowGraph;

pub use http::HttpDefinitionService;

/// A workflow definition as submitted by the builder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkflowDefinition {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub graph: WorkflowGraph,
}

/// Errors raised while talking to the definition service.
#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("workflow definition service is not configured")]
    NotConfigured,

    #[error("definition service request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("definition service returned {status}: {body}")]
    Status { status: u16, body: String },
}

/// Source of truth for workflow definitions.
#[async_trait]
pub trait WorkflowDefinitionService: Send + Sync {
    /// Create or replace a definition; returns the service's response body.
    async fn save(
        &self,
        definition: &WorkflowDefinition,
    ) -> Result<serde_json::Value, DefinitionError>;

    /// List definitions; returns the service's response body.
    async fn list(&self) -> Result<serde_json::Value, DefinitionError>;
}

/// Used when no definition service URL is configured.
#[derive(Debug, Clone, Default)]
pub struct UnconfiguredDefinitions;

#[async_trait]
impl WorkflowDefinitionService for UnconfiguredDefinitions {
    async fn save(
        &self,
        _definition: &WorkflowDefinition,
    ) -> Result<serde_json::Value, DefinitionError> {
        Err(DefinitionError::NotConfigured)
    }

    async fn list(&self) -> Result<serde_json::Value, DefinitionError> {
        Err(DefinitionError::NotConfigured)
    }
}
