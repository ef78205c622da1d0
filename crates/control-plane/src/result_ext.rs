//! Logging for telemetry append results.
//!
//! Recording a run is best-effort: the façade must never fail a run because
//! its record could not be stored. [`AppendResultExt::log_append`] reports
//! every way an append can fall short, tagged with the run it belongs to,
//! and hands back the receipt when the record made it into the log.

use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::telemetry::{AppendReceipt, PersistStatus, StoreError};

/// Extension for the result of [`TelemetryStore::append`](crate::telemetry::TelemetryStore::append).
pub trait AppendResultExt {
    /// Log a rejected record, a failed persist or an eviction for `run_id`.
    ///
    /// Returns the receipt if the record is held in memory, whether or not it
    /// reached the backing file.
    fn log_append(self, run_id: Uuid, workflow_id: &str) -> Option<AppendReceipt>;
}

impl AppendResultExt for Result<AppendReceipt, StoreError> {
    #[track_caller]
    fn log_append(self, run_id: Uuid, workflow_id: &str) -> Option<AppendReceipt> {
        let caller = std::panic::Location::caller();
        match self {
            Ok(receipt) => {
                if let PersistStatus::Failed(reason) = &receipt.persist {
                    warn!(
                        run_id = %run_id,
                        workflow_id = %workflow_id,
                        reason = %reason,
                        file = %format!("{}:{}", caller.file(), caller.line()),
                        "Execution recorded in memory only"
                    );
                }
                if receipt.evicted > 0 {
                    debug!(
                        run_id = %run_id,
                        evicted = receipt.evicted,
                        len = receipt.len,
                        "Evicted oldest execution records"
                    );
                }
                Some(receipt)
            }
            Err(e) => {
                error!(
                    run_id = %run_id,
                    workflow_id = %workflow_id,
                    error = %e,
                    file = %format!("{}:{}", caller.file(), caller.line()),
                    "Execution record rejected"
                );
                None
            }
        }
    }
}
