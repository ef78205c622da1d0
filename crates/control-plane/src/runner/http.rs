//! HTTP client for an external workflow runner.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use tracing::debug;

use super::{RunnerError, RunnerResponse, WorkflowRunner};

/// Runner reached over HTTP.
///
/// `POST {base_url}/workflows/{workflow_id}/execute` with the run context as
/// the JSON body; the runner answers `{"ok": bool, "result": ...}`.
///
/// The workflow id is sent as a single percent-encoded path segment.
#[derive(Clone)]
pub struct HttpWorkflowRunner {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpWorkflowRunner {
    /// Create a new runner client; fails if `base_url` cannot carry a path.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RunnerError> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| RunnerError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(RunnerError::InvalidUrl(base_url.to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        Ok(Self { client, base_url })
    }

    fn execute_url(&self, workflow_id: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["workflows", workflow_id, "execute"]);
        }
        url
    }
}

#[async_trait]
impl WorkflowRunner for HttpWorkflowRunner {
    async fn execute(
        &self,
        workflow_id: &str,
        context: serde_json::Value,
    ) -> Result<RunnerResponse, RunnerError> {
        let url = self.execute_url(workflow_id);
        debug!(url = %url, "Delegating run to workflow runner");

        let response = self.client.post(url).json(&context).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RunnerError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<RunnerResponse>().await?)
    }
}
