//! Execution telemetry.
//!
//! - [`ExecutionRecord`]: one observed outcome of a workflow run
//! - [`TelemetryStore`]: bounded, append-only, write-through log of records
//! - [`TelemetrySnapshot`]: read-only view handed to consumers

pub mod error;
pub mod record;
pub mod store;

pub use error::StoreError;
pub use record::ExecutionRecord;
pub use store::{AppendReceipt, LoadOutcome, PersistStatus, TelemetrySnapshot, TelemetryStore};

/// Default bound on the number of retained execution records.
pub const MAX_RECORDS: usize = 5000;
