use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use autopilot_control_plane::graph::{self, WorkflowGraph};
use autopilot_control_plane::recommender::{
    suggest, AutomationSuggestion, SuggestParams, DEFAULT_MIN_RUNS, DEFAULT_WINDOW_HOURS,
};
use autopilot_control_plane::telemetry::ExecutionRecord;
use clap::{Parser, Subcommand};
use reqwest::{Client, Url};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "autopilotctl")]
#[command(version, about = "Autopilot Command Line Tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Control plane URL
    #[arg(long, global = true, default_value = "http://localhost:8082")]
    server_url: String,

    /// Emit only JSON output
    #[arg(short, long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a workflow graph file without contacting the server
    ///
    /// The file holds either a bare graph ({"nodes": [...], "edges": [...]})
    /// or a workflow definition with a "graph" field.
    #[command(verbatim_doc_comment)]
    Validate {
        /// Path to the graph JSON file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// List automation suggestions
    ///
    /// Reads a telemetry log directly when --telemetry-file is given,
    /// otherwise asks the server (which always uses the default thresholds).
    ///
    /// Examples:
    ///     autopilotctl suggest
    ///     autopilotctl suggest --telemetry-file data/executions.json --min-runs 5
    #[command(verbatim_doc_comment)]
    Suggest {
        /// Telemetry log to analyse offline
        #[arg(long, value_name = "PATH")]
        telemetry_file: Option<PathBuf>,

        /// Successful runs required for a suggestion (offline only)
        #[arg(long, default_value_t = DEFAULT_MIN_RUNS)]
        min_runs: u32,

        /// Look-back window in hours (offline only)
        #[arg(long, default_value_t = DEFAULT_WINDOW_HOURS)]
        window_hours: u32,
    },

    /// Run a workflow through the control plane
    Run {
        /// Workflow id
        #[arg(value_name = "WORKFLOW_ID")]
        workflow_id: String,

        /// Execution context as a JSON string
        #[arg(long, value_name = "JSON")]
        context: Option<String>,
    },

    /// Show recent execution records
    Telemetry {
        /// Only records for this workflow
        #[arg(short = 'w', long)]
        workflow_id: Option<String>,

        /// Maximum number of records
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let base_url = cli.server_url.trim_end_matches('/').to_string();
    let client = Client::new();

    match cli.command {
        Commands::Validate { file } => validate_file(&file, cli.json),
        Commands::Suggest {
            telemetry_file,
            min_runs,
            window_hours,
        } => match telemetry_file {
            Some(path) => {
                let params = SuggestParams {
                    min_runs,
                    window_hours,
                };
                suggest_offline(&path, params, cli.json)
            }
            None => suggest_remote(&client, &base_url, cli.json).await,
        },
        Commands::Run {
            workflow_id,
            context,
        } => run_workflow(&client, &base_url, &workflow_id, context.as_deref(), cli.json).await,
        Commands::Telemetry { workflow_id, limit } => {
            list_telemetry(&client, &base_url, workflow_id.as_deref(), limit, cli.json).await
        }
    }
}

/// Read a graph, accepting a definition wrapper.
fn read_graph(path: &Path) -> Result<WorkflowGraph> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let mut value: Value = serde_json::from_str(&content)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;

    if let Some(graph) = value.get_mut("graph") {
        value = graph.take();
    }
    serde_json::from_value(value)
        .with_context(|| format!("{} does not contain a workflow graph", path.display()))
}

fn validate_file(path: &Path, json_only: bool) -> Result<()> {
    let graph = read_graph(path)?;

    match graph::validate(&graph) {
        Ok(()) => {
            if json_only {
                let body = serde_json::json!({"valid": true, "executable": graph.is_executable()});
                println!("{}", serde_json::to_string(&body)?);
            } else {
                println!(
                    "{}: valid ({} nodes, {} edges)",
                    path.display(),
                    graph.nodes.len(),
                    graph.edges.len()
                );
                if !graph.is_executable() {
                    println!("  Note: graph has no nodes and cannot be run");
                }
            }
            Ok(())
        }
        Err(e) => {
            if json_only {
                let body = serde_json::json!({
                    "valid": false,
                    "error": e.to_string(),
                    "offending_id": e.offending_id(),
                });
                println!("{}", serde_json::to_string(&body)?);
            } else {
                eprintln!("{}: invalid", path.display());
                eprintln!("  {}", e);
            }
            std::process::exit(1);
        }
    }
}

fn load_records(path: &Path) -> Result<Vec<ExecutionRecord>> {
    let content =
        fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_slice(&content)
        .with_context(|| format!("{} is not a telemetry log", path.display()))
}

fn suggest_offline(path: &Path, params: SuggestParams, json_only: bool) -> Result<()> {
    let records = load_records(path)?;
    let suggestions = suggest(&records, chrono::Utc::now(), params);
    print_suggestions(&suggestions, json_only)
}

async fn suggest_remote(client: &Client, base_url: &str, json_only: bool) -> Result<()> {
    let url = format!("{}/api/suggestions", base_url);
    let response = client
        .get(&url)
        .send()
        .await
        .context("Failed to send suggestions request")?;

    if response.status().is_success() {
        let suggestions: Vec<AutomationSuggestion> = response.json().await?;
        print_suggestions(&suggestions, json_only)
    } else {
        let status = response.status();
        let text = response.text().await?;
        eprintln!("Failed to get suggestions: {} - {}", status, text);
        std::process::exit(1);
    }
}

fn print_suggestions(suggestions: &[AutomationSuggestion], json_only: bool) -> Result<()> {
    if json_only {
        println!("{}", serde_json::to_string(suggestions)?);
        return Ok(());
    }

    if suggestions.is_empty() {
        println!("No automation suggestions.");
        return Ok(());
    }

    let width = suggestions
        .iter()
        .map(|s| s.workflow_id.len())
        .max()
        .unwrap_or(0)
        .max("WORKFLOW".len());
    println!("{:<width$}  {:>5}  REASON", "WORKFLOW", "SCORE", width = width);
    for s in suggestions {
        println!(
            "{:<width$}  {:>5}  {}",
            s.workflow_id,
            s.score,
            s.reason,
            width = width
        );
    }
    Ok(())
}

/// `{base_url}/api/workflows/{workflow_id}/run` with the id as one encoded segment.
fn run_url(base_url: &str, workflow_id: &str) -> Result<Url> {
    let mut url =
        Url::parse(base_url).with_context(|| format!("Invalid server URL '{}'", base_url))?;
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("Server URL '{}' cannot carry a path", base_url))?
        .pop_if_empty()
        .extend(["api", "workflows", workflow_id, "run"]);
    Ok(url)
}

fn parse_context(raw: Option<&str>) -> Result<Value> {
    match raw {
        Some(raw) => serde_json::from_str(raw).context("Invalid JSON context"),
        None => Ok(Value::Null),
    }
}

async fn run_workflow(
    client: &Client,
    base_url: &str,
    workflow_id: &str,
    context: Option<&str>,
    json_only: bool,
) -> Result<()> {
    let context = parse_context(context)?;
    let url = run_url(base_url, workflow_id)?;

    if !json_only {
        println!("Running workflow '{}' via {}", workflow_id, base_url);
    }

    let response = client
        .post(url)
        .json(&serde_json::json!({ "context": context }))
        .send()
        .await
        .context("Failed to send run request")?;

    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await?;
        eprintln!("Failed to run workflow: {} - {}", status, text);
        std::process::exit(1);
    }

    let outcome: Value = response.json().await?;
    if json_only {
        println!("{}", serde_json::to_string(&outcome)?);
    } else {
        let ok = outcome["ok"].as_bool().unwrap_or(false);
        println!(
            "\nRun {} {} in {}ms",
            outcome["run_id"].as_str().unwrap_or("?"),
            if ok { "succeeded" } else { "failed" },
            outcome["duration_ms"]
        );
        println!("{}", serde_json::to_string_pretty(&outcome["result"])?);
    }

    if outcome["ok"].as_bool() != Some(true) {
        std::process::exit(2);
    }
    Ok(())
}

async fn list_telemetry(
    client: &Client,
    base_url: &str,
    workflow_id: Option<&str>,
    limit: Option<usize>,
    json_only: bool,
) -> Result<()> {
    let url = format!("{}/api/telemetry", base_url);
    let mut query: Vec<(&str, String)> = Vec::new();
    if let Some(id) = workflow_id {
        query.push(("workflow_id", id.to_string()));
    }
    if let Some(limit) = limit {
        query.push(("limit", limit.to_string()));
    }

    let response = client
        .get(&url)
        .query(&query)
        .send()
        .await
        .context("Failed to send telemetry request")?;

    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await?;
        eprintln!("Failed to get telemetry: {} - {}", status, text);
        std::process::exit(1);
    }

    let body: Value = response.json().await?;
    if json_only {
        println!("{}", serde_json::to_string(&body)?);
        return Ok(());
    }

    let records: Vec<ExecutionRecord> =
        serde_json::from_value(body["records"].clone()).context("Unexpected telemetry response")?;
    println!("Telemetry ({} of {} records):", records.len(), body["total"]);
    for r in &records {
        let duration = r
            .duration_ms
            .map(|ms| format!("{}ms", ms))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {}  {:<7}  {:>8}  {}",
            r.timestamp.to_rfc3339(),
            if r.success { "ok" } else { "failed" },
            duration,
            r.workflow_id
        );
    }
    Ok(())
}
