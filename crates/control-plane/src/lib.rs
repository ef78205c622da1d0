//! Autopilot Control Plane Library
//!
//! This crate records the outcome of every workflow run and turns recurring
//! successes into automation suggestions:
//!
//! - **Execution Telemetry**: Bounded, write-through log of execution records
//! - **Automation Recommender**: Time-window + frequency-threshold suggestions
//! - **Workflow Graphs**: Structural validation of builder-produced graphs
//! - **Orchestration Façade**: Delegates runs to an external runner and
//!   records their outcome
//!
//! ## Architecture
//!
//! Step execution and definition storage live in external services reached
//! over HTTP. The only state owned here is the telemetry log, a single JSON
//! file rewritten atomically after every append.
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading from environment variables
//! - [`telemetry`]: Execution records and the telemetry store
//! - [`recommender`]: Automation suggestions
//! - [`graph`]: Workflow graph model and validator
//! - [`runner`]: External workflow runner clients
//! - [`definitions`]: External workflow definition service clients
//! - [`facade`]: Orchestration façade
//! - [`error`]: Custom error types with Axum integration
//! - [`handlers`]: HTTP route handlers
//! - [`state`]: Shared application state
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use autopilot_control_plane::{
//!     config::AppConfig,
//!     definitions::UnconfiguredDefinitions,
//!     facade::WorkflowFacade,
//!     runner::HttpWorkflowRunner,
//!     state::AppState,
//!     telemetry::TelemetryStore,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AppConfig::from_env()?;
//!     let store = TelemetryStore::load(&config.telemetry_path, config.max_records).await;
//!     let runner = HttpWorkflowRunner::new("http://runner:7000", config.runner_timeout())?;
//!     let facade = WorkflowFacade::new(Arc::new(store), Arc::new(runner));
//!     let state = AppState::new(facade, Arc::new(UnconfiguredDefinitions), config);
//!     let app = autopilot_control_plane::handlers::router(state);
//!     // ... bind and serve
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod definitions;
pub mod error;
pub mod facade;
pub mod graph;
pub mod handlers;
pub mod recommender;
pub mod result_ext;
pub mod runner;
pub mod state;
pub mod telemetry;

pub use error::{AppError, AppResult};
pub use result_ext::AppendResultExt;
