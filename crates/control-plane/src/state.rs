//! Application state for the Autopilot Control Plane server.
//!
//! This module defines the shared application state that is
//! passed to all handlers via Axum's state management.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::definitions::WorkflowDefinitionService;
use crate::facade::WorkflowFacade;
use crate::telemetry::TelemetryStore;

/// Shared application state.
///
/// Cheap to clone; every field is shared behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Orchestration façade owning the telemetry store
    pub facade: WorkflowFacade,

    /// External workflow definition service
    pub definitions: Arc<dyn WorkflowDefinitionService>,

    /// Application configuration
    pub config: Arc<AppConfig>,

    /// Server start time for uptime calculation
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        facade: WorkflowFacade,
        definitions: Arc<dyn WorkflowDefinitionService>,
        config: AppConfig,
    ) -> Self {
        Self {
            facade,
            definitions,
            config: Arc::new(config),
            start_time: std::time::Instant::now(),
        }
    }

    /// Telemetry store owned by the façade.
    pub fn store(&self) -> &Arc<TelemetryStore> {
        self.facade.store()
    }

    /// Get the server uptime in seconds.
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub fn has_runner(&self) -> bool {
        self.config.runner_url.is_some()
    }

    pub fn has_definitions(&self) -> bool {
        self.config.definitions_url.is_some()
    }
}
