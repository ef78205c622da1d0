//! Autopilot Control Plane Server
//!
//! An async Rust server that records workflow execution telemetry and
//! serves automation suggestions derived from it.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use autopilot_control_plane::{
    config::AppConfig,
    definitions::{HttpDefinitionService, UnconfiguredDefinitions, WorkflowDefinitionService},
    facade::WorkflowFacade,
    handlers,
    runner::{HttpWorkflowRunner, UnconfiguredRunner, WorkflowRunner},
    state::AppState,
    telemetry::TelemetryStore,
};

/// Initialize tracing/logging.
fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,autopilot_control_plane=debug,tower_http=debug".into());

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// Pick the workflow runner from configuration.
fn build_runner(config: &AppConfig) -> anyhow::Result<Arc<dyn WorkflowRunner>> {
    match config.runner_url.as_deref() {
        Some(url) => {
            tracing::info!(url = %url, "Using HTTP workflow runner");
            let runner: Arc<dyn WorkflowRunner> =
                Arc::new(HttpWorkflowRunner::new(url, config.runner_timeout())?);
            Ok(runner)
        }
        None => {
            tracing::warn!("AUTOPILOT_RUNNER_URL not set, every run will be recorded as failed");
            Ok(Arc::new(UnconfiguredRunner))
        }
    }
}

/// Pick the workflow definition service from configuration.
fn build_definitions(config: &AppConfig) -> Arc<dyn WorkflowDefinitionService> {
    match config.definitions_url.as_deref() {
        Some(url) => {
            tracing::info!(url = %url, "Using HTTP workflow definition service");
            Arc::new(HttpDefinitionService::new(url))
        }
        None => {
            tracing::info!("Workflow definition service not configured");
            Arc::new(UnconfiguredDefinitions)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    // Configuration is read before tracing so the log format can follow it
    let config_result = AppConfig::from_env();
    let log_json = config_result.as_ref().map(|c| c.log_json).unwrap_or(false);
    init_tracing(log_json);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting Autopilot Control Plane"
    );

    let app_config = config_result.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load app config, using defaults");
        AppConfig::default()
    });

    tracing::info!(
        host = %app_config.host,
        port = app_config.port,
        debug = app_config.debug,
        telemetry_path = %app_config.telemetry_path.display(),
        max_records = app_config.max_records,
        "Configuration loaded"
    );

    // Load the telemetry log; never fails startup
    let store = Arc::new(
        TelemetryStore::load(&app_config.telemetry_path, app_config.max_records).await,
    );
    if store.is_degraded() {
        tracing::warn!(outcome = ?store.load_outcome(), "Telemetry store running degraded");
    }

    let facade = WorkflowFacade::new(Arc::clone(&store), build_runner(&app_config)?)
        .with_run_timeout(app_config.runner_timeout());
    let definitions = build_definitions(&app_config);

    // Bind to address
    let addr: SocketAddr = app_config.bind_address().parse()?;
    let state = AppState::new(facade, definitions, app_config);
    let app = handlers::router(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(address = %addr, "Server listening");

    // Run the server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Err(e) = store.close().await {
        tracing::error!(error = %e, "Failed to flush telemetry log on shutdown");
    }

    tracing::info!("Server shutdown complete");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
