//! Bounded, write-through telemetry log.
//!
//! The whole log lives in memory and is rewritten to a single JSON file
//! (an array of [`ExecutionRecord`]) after every append. Writes go to
//! `{path}.tmp` first and are renamed over the final path, so a crash never
//! leaves a half-written log behind.

use std::ffi::OsString;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::error::{Result, StoreError};
use super::record::ExecutionRecord;
use super::MAX_RECORDS;

/// What `load` found in the backing file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LoadOutcome {
    /// No backing file; the log starts empty.
    Fresh,
    /// Records were read from the backing file.
    Loaded { records: usize },
    /// Backing file was unreadable or corrupt; the log starts empty.
    Recovered { reason: String },
}

/// Result of the persist step that follows an append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistStatus {
    Persisted,
    Failed(String),
}

impl PersistStatus {
    pub fn is_persisted(&self) -> bool {
        matches!(self, PersistStatus::Persisted)
    }
}

/// Outcome of a successful in-memory append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendReceipt {
    /// Log length after the append.
    pub len: usize,
    /// Number of oldest records evicted to stay within bounds.
    pub evicted: usize,
    /// Whether the rewritten log reached the backing file.
    pub persist: PersistStatus,
}

/// Immutable view of the log at the moment it was taken.
///
/// Cloning the store's `Arc` makes snapshots cheap; a later append copies
/// the log before modifying it, so a snapshot never changes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TelemetrySnapshot {
    records: Arc<Vec<ExecutionRecord>>,
}

impl TelemetrySnapshot {
    pub fn records(&self) -> &[ExecutionRecord] {
        &self.records
    }

    /// Most recent records, oldest first, optionally for one workflow.
    pub fn recent(&self, workflow_id: Option<&str>, limit: usize) -> Vec<ExecutionRecord> {
        let mut matched: Vec<&ExecutionRecord> = self
            .records
            .iter()
            .rev()
            .filter(|r| workflow_id.map_or(true, |id| r.workflow_id == id))
            .take(limit)
            .collect();
        matched.reverse();
        matched.into_iter().cloned().collect()
    }
}

impl Deref for TelemetrySnapshot {
    type Target = [ExecutionRecord];

    fn deref(&self) -> &Self::Target {
        &self.records
    }
}

struct LogState {
    records: Arc<Vec<ExecutionRecord>>,
    /// Set when the last persist failed and the file lags behind memory.
    dirty: bool,
}

/// Append-only, size-bounded log of execution records.
///
/// Append and persist run under one write lock so concurrent appends never
/// interleave their file rewrites. Snapshots take the read lock.
pub struct TelemetryStore {
    path: PathBuf,
    max_records: usize,
    state: RwLock<LogState>,
    load_outcome: LoadOutcome,
}

impl TelemetryStore {
    /// Load the log from `path` with the default bound.
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        Self::load(path, MAX_RECORDS).await
    }

    /// Load the log from `path`, keeping at most `max_records` records.
    ///
    /// Never fails: a missing file starts an empty log, and an unreadable or
    /// corrupt file is moved aside to `{path}.corrupt` and also starts an
    /// empty log. The difference is reported by [`TelemetryStore::load_outcome`].
    pub async fn load(path: impl Into<PathBuf>, max_records: usize) -> Self {
        let path = path.into();
        let max_records = max_records.max(1);

        let (records, load_outcome) = match read_log(&path).await {
            Ok(None) => {
                info!(path = %path.display(), "No telemetry log found, starting empty");
                (Vec::new(), LoadOutcome::Fresh)
            }
            Ok(Some(mut records)) => {
                let before = records.len();
                records.retain(|r| r.validate().is_ok());
                if records.len() < before {
                    warn!(
                        path = %path.display(),
                        dropped = before - records.len(),
                        "Dropped invalid execution records from telemetry log"
                    );
                }
                let excess = records.len().saturating_sub(max_records);
                if excess > 0 {
                    records.drain(..excess);
                    debug!(path = %path.display(), evicted = excess, "Trimmed loaded telemetry log");
                }
                info!(path = %path.display(), records = records.len(), "Telemetry log loaded");
                let count = records.len();
                (records, LoadOutcome::Loaded { records: count })
            }
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "Telemetry log unreadable, starting with an empty log"
                );
                quarantine(&path).await;
                (
                    Vec::new(),
                    LoadOutcome::Recovered {
                        reason: e.to_string(),
                    },
                )
            }
        };

        Self {
            path,
            max_records,
            state: RwLock::new(LogState {
                records: Arc::new(records),
                dirty: false,
            }),
            load_outcome,
        }
    }

    /// Append a record, evict the oldest beyond the bound, then persist.
    ///
    /// Returns `Err` only when the record is rejected. A failed persist is
    /// logged and reported in the receipt; the in-memory append stands.
    pub async fn append(&self, record: ExecutionRecord) -> Result<AppendReceipt> {
        record.validate()?;

        let mut state = self.state.write().await;

        let records = Arc::make_mut(&mut state.records);
        records.push(record);
        let evicted = records.len().saturating_sub(self.max_records);
        if evicted > 0 {
            records.drain(..evicted);
        }
        let len = records.len();

        let persist = match write_log(&self.path, &state.records).await {
            Ok(()) => {
                state.dirty = false;
                PersistStatus::Persisted
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to persist telemetry log");
                state.dirty = true;
                PersistStatus::Failed(e.to_string())
            }
        };

        Ok(AppendReceipt {
            len,
            evicted,
            persist,
        })
    }

    /// Take a read-only view of the current log.
    pub async fn snapshot(&self) -> TelemetrySnapshot {
        let state = self.state.read().await;
        TelemetrySnapshot {
            records: Arc::clone(&state.records),
        }
    }

    /// Current number of records.
    pub async fn len(&self) -> usize {
        self.state.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Flush the log if the last persist failed.
    pub async fn close(&self) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.dirty {
            return Ok(());
        }
        write_log(&self.path, &state.records).await?;
        state.dirty = false;
        info!(path = %self.path.display(), "Telemetry log flushed on close");
        Ok(())
    }

    pub fn load_outcome(&self) -> &LoadOutcome {
        &self.load_outcome
    }

    /// True when startup discarded an unreadable log.
    pub fn is_degraded(&self) -> bool {
        matches!(self.load_outcome, LoadOutcome::Recovered { .. })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn max_records(&self) -> usize {
        self.max_records
    }
}

/// Read the log file, `Ok(None)` if it does not exist.
async fn read_log(path: &Path) -> Result<Option<Vec<ExecutionRecord>>> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StoreError::io(path, e)),
    };

    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|source| StoreError::Corrupt {
            path: path.to_path_buf(),
            source,
        })
}

/// Rewrite the whole log via temp file + rename.
async fn write_log(path: &Path, records: &[ExecutionRecord]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| StoreError::io(parent, e))?;
    }

    let bytes = serde_json::to_vec(records)?;
    let temp_path = sibling(path, ".tmp");

    let mut file = fs::File::create(&temp_path)
        .await
        .map_err(|e| StoreError::io(&temp_path, e))?;
    file.write_all(&bytes)
        .await
        .map_err(|e| StoreError::io(&temp_path, e))?;
    file.sync_all()
        .await
        .map_err(|e| StoreError::io(&temp_path, e))?;
    drop(file);

    fs::rename(&temp_path, path)
        .await
        .map_err(|e| StoreError::io(path, e))?;

    Ok(())
}

/// Move an unreadable log out of the way before the next persist replaces it.
async fn quarantine(path: &Path) {
    if fs::metadata(path).await.is_err() {
        return;
    }
    let target = sibling(path, ".corrupt");
    match fs::rename(path, &target).await {
        Ok(()) => warn!(from = %path.display(), to = %target.display(), "Moved corrupt telemetry log aside"),
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to move corrupt telemetry log aside"),
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}
