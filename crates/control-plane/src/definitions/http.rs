//! HTTP client for the workflow definition service.

use std::time::Duration;

use async_trait::async_trait;

use super::{DefinitionError, WorkflowDefinition, WorkflowDefinitionService};

/// Definition service reached over HTTP at `{base_url}/workflows`.
#[derive(Clone)]
pub struct HttpDefinitionService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDefinitionService {
    /// Create a new definition service client.
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn workflows_url(&self) -> String {
        format!("{}/workflows", self.base_url)
    }

    async fn read_body(
        response: reqwest::Response,
    ) -> Result<serde_json::Value, DefinitionError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DefinitionError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl WorkflowDefinitionService for HttpDefinitionService {
    async fn save(
        &self,
        definition: &WorkflowDefinition,
    ) -> Result<serde_json::Value, DefinitionError> {
        let response = self
            .client
            .post(self.workflows_url())
            .json(definition)
            .send()
            .await?;
        Self::read_body(response).await
    }

    async fn list(&self) -> Result<serde_json::Value, DefinitionError> {
        let response = self.client.get(self.workflows_url()).send().await?;
        Self::read_body(response).await
    }
}
