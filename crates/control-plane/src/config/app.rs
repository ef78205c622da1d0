//! Application configuration for the Autopilot Control Plane server.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::telemetry::MAX_RECORDS;

/// Application configuration loaded from environment variables.
///
/// Environment variables are prefixed with `AUTOPILOT_`:
/// - `AUTOPILOT_HOST`: Server bind address (default: "0.0.0.0")
/// - `AUTOPILOT_PORT`: Server port (default: 8082)
/// - `AUTOPILOT_DEBUG`: Enable debug mode (default: false)
/// - `AUTOPILOT_SERVER_NAME`: Server name for identification
/// - `AUTOPILOT_TELEMETRY_PATH`: Telemetry log file (default: "data/executions.json")
/// - `AUTOPILOT_MAX_RECORDS`: Telemetry log bound (default: 5000)
/// - `AUTOPILOT_RUNNER_URL`: External workflow runner base URL (optional)
/// - `AUTOPILOT_RUNNER_TIMEOUT_SECS`: Per-run timeout (default: 300)
/// - `AUTOPILOT_DEFINITIONS_URL`: Workflow definition service base URL (optional)
/// - `AUTOPILOT_LOG_JSON`: Emit JSON formatted logs (default: false)
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server bind address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Enable debug mode
    #[serde(default)]
    pub debug: bool,

    /// Server name for identification
    #[serde(default = "default_server_name")]
    pub server_name: String,

    /// Backing file of the telemetry log, relative to the working directory
    #[serde(default = "default_telemetry_path")]
    pub telemetry_path: PathBuf,

    /// Maximum number of execution records retained
    #[serde(default = "default_max_records")]
    pub max_records: usize,

    /// External workflow runner base URL (optional)
    #[serde(default)]
    pub runner_url: Option<String>,

    /// Per-run timeout in seconds
    #[serde(default = "default_runner_timeout")]
    pub runner_timeout_secs: u64,

    /// Workflow definition service base URL (optional)
    #[serde(default)]
    pub definitions_url: Option<String>,

    /// JSON log output
    #[serde(default)]
    pub log_json: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8082
}

fn default_server_name() -> String {
    "autopilot-control-plane".to_string()
}

fn default_telemetry_path() -> PathBuf {
    PathBuf::from("data/executions.json")
}

fn default_max_records() -> usize {
    MAX_RECORDS
}

fn default_runner_timeout() -> u64 {
    300
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables are prefixed with `AUTOPILOT_`.
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::prefixed("AUTOPILOT_").from_env::<AppConfig>()
    }

    /// Get the server bind address as a string suitable for `TcpListener::bind`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Runner timeout as a `Duration`.
    pub fn runner_timeout(&self) -> Duration {
        Duration::from_secs(self.runner_timeout_secs)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            debug: false,
            server_name: default_server_name(),
            telemetry_path: default_telemetry_path(),
            max_records: default_max_records(),
            runner_url: None,
            runner_timeout_secs: default_runner_timeout(),
            definitions_url: None,
            log_json: false,
        }
    }
}
