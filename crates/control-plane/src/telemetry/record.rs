//! Execution record type.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::{Result, StoreError};

/// One observed outcome of a workflow run.
///
/// Records are immutable once appended to the store. The wire and on-disk
/// format uses camelCase keys:
///
/// ```json
/// {"workflowId": "wf1", "timestamp": "2025-01-01T00:00:00Z", "durationMs": 120, "success": true}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRecord {
    /// Identifier of the workflow definition that ran.
    pub workflow_id: String,

    /// When the run was observed.
    pub timestamp: DateTime<Utc>,

    /// Wall-clock duration, if it was measured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,

    /// Whether the run succeeded.
    pub success: bool,

    /// Free-form payload for downstream consumers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

impl ExecutionRecord {
    /// Create a record observed now.
    pub fn observed(workflow_id: impl Into<String>, success: bool) -> Self {
        Self::observed_at(workflow_id, success, Utc::now())
    }

    /// Create a record observed at the given instant.
    pub fn observed_at(
        workflow_id: impl Into<String>,
        success: bool,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            workflow_id: workflow_id.into(),
            timestamp,
            duration_ms: None,
            success,
            meta: None,
        }
    }

    /// Attach a measured duration.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration_ms = Some(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// Attach a meta payload.
    pub fn with_meta(mut self, meta: serde_json::Value) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Check the record can enter the log.
    pub fn validate(&self) -> Result<()> {
        if self.workflow_id.trim().is_empty() {
            return Err(StoreError::InvalidRecord(
                "workflowId must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serializes_camel_case() {
        let timestamp = DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let record = ExecutionRecord::observed_at("wf1", true, timestamp)
            .with_duration(Duration::from_millis(120));

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["workflowId"], "wf1");
        assert_eq!(value["durationMs"], 120);
        assert_eq!(value["success"], true);
        assert!(value.get("meta").is_none());
    }

    #[test]
    fn test_meta_preserved_verbatim() {
        let meta = json!({"source": "ui", "nested": {"tags": ["a", "b"]}});
        let record = ExecutionRecord::observed("wf1", false).with_meta(meta.clone());

        let text = serde_json::to_string(&record).unwrap();
        let parsed: ExecutionRecord = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.meta, Some(meta));
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_success_is_required() {
        let text = r#"{"workflowId": "wf1", "timestamp": "2025-01-01T00:00:00Z"}"#;
        assert!(serde_json::from_str::<ExecutionRecord>(text).is_err());
    }

    #[test]
    fn test_validate_rejects_empty_workflow_id() {
        assert!(ExecutionRecord::observed("", true).validate().is_err());
        assert!(ExecutionRecord::observed("   ", true).validate().is_err());
        assert!(ExecutionRecord::observed("wf1", true).validate().is_ok());
    }
}
