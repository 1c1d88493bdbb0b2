// crates/trailcli/src/main.rs

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use trailcore::{ExecutionEvent, ExecutionStatus, MessageLevel, Value, Workflow, WorkflowGraph};
use trailnodes::LookupConfig;
use trailruntime::{validate_graph, FlowRuntime, NodeRegistry, RuntimeConfig};

#[derive(Parser)]
#[command(name = "trail")]
#[command(about = "Workflow graph runner", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a workflow file
    Run {
        /// Path to workflow JSON file
        #[arg(short, long)]
        file: PathBuf,

        /// Initial variables as a JSON object
        #[arg(short, long)]
        input: Option<String>,

        /// Temperature threshold for condition nodes
        #[arg(short, long)]
        threshold: Option<f64>,

        /// Comparison operator for condition nodes (e.g. greater_than)
        #[arg(short, long)]
        operator: Option<String>,

        /// Show verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Validate a workflow file
    Validate {
        /// Path to workflow JSON file
        file: PathBuf,
    },

    /// List available node types
    Nodes,

    /// Write the weather alert sample workflow
    Init {
        /// Output file path
        #[arg(short, long, default_value = "workflow.json")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            file,
            input,
            threshold,
            operator,
            verbose,
        } => {
            let default_level = if verbose { "debug" } else { "info" };
            let filter = EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_level));
            tracing_subscriber::fmt().with_env_filter(filter).init();

            let inputs = parse_inputs(input.as_deref(), threshold, operator)?;
            run_workflow(&file, inputs).await?;
        }

        Commands::Validate { file } => {
            validate_workflow(&file)?;
        }

        Commands::Nodes => {
            list_nodes()?;
        }

        Commands::Init { output } => {
            create_example_workflow(&output)?;
        }
    }

    Ok(())
}

fn build_registry() -> Result<NodeRegistry> {
    let config = lookup_config(|key| std::env::var(key).ok())?;
    debug!(
        "Lookup endpoint {} with a {:?} timeout",
        config.base_url,
        config.effective_timeout()
    );

    let mut registry = NodeRegistry::new();
    trailnodes::register_open_meteo(&mut registry, config)?;
    Ok(registry)
}

/// Lookup settings from `TRAIL_LOOKUP_URL` and `TRAIL_LOOKUP_TIMEOUT_SECS`
fn lookup_config(var: impl Fn(&str) -> Option<String>) -> Result<LookupConfig> {
    let mut config = LookupConfig::default();
    if let Some(url) = var("TRAIL_LOOKUP_URL") {
        config = config.with_base_url(url);
    }
    if let Some(secs) = var("TRAIL_LOOKUP_TIMEOUT_SECS") {
        let secs: u64 = secs
            .trim()
            .parse()
            .with_context(|| format!("TRAIL_LOOKUP_TIMEOUT_SECS is not a number: {}", secs))?;
        config = config.with_timeout(Duration::from_secs(secs));
    }
    Ok(config)
}

/// Accepts a stored workflow record or a bare graph document
fn load_workflow(file: &Path) -> Result<Workflow> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;

    if let Ok(workflow) = serde_json::from_str::<Workflow>(&json) {
        return Ok(workflow);
    }

    let graph: WorkflowGraph = serde_json::from_str(&json)
        .with_context(|| format!("{} is not a workflow document", file.display()))?;
    let name = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(Workflow::new(graph.id.clone(), name, graph))
}

fn parse_inputs(
    input: Option<&str>,
    threshold: Option<f64>,
    operator: Option<String>,
) -> Result<HashMap<String, Value>> {
    let mut inputs: HashMap<String, Value> = match input {
        Some(raw) => match serde_json::from_str::<serde_json::Value>(raw)? {
            serde_json::Value::Object(obj) => obj
                .into_iter()
                .map(|(k, v)| (k, Value::from(v)))
                .collect(),
            _ => bail!("Input must be a JSON object"),
        },
        None => HashMap::new(),
    };

    if let Some(threshold) = threshold {
        inputs.insert("threshold".to_string(), Value::from(threshold));
    }
    if let Some(operator) = operator {
        inputs.insert("operator".to_string(), Value::from(operator));
    }

    Ok(inputs)
}

async fn run_workflow(file: &Path, inputs: HashMap<String, Value>) -> Result<()> {
    println!("🚀 Loading workflow from: {}", file.display());

    let workflow = load_workflow(file)?;
    validate_graph(&workflow.definition)?;

    println!("📋 Workflow: {}", workflow.name);
    println!("   Nodes: {}", workflow.definition.nodes.len());
    println!("   Edges: {}", workflow.definition.edges.len());
    println!();

    let runtime = FlowRuntime::with_registry(Arc::new(build_registry()?), RuntimeConfig::default());

    let mut events = runtime.subscribe_events();

    let event_task = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            print_event(&event);
            if event.is_final() {
                break;
            }
        }
    });

    let result = runtime.execute(&workflow.definition, inputs).await;

    // a lagged or closed channel ends the printer early; the summary covers it
    drop(runtime);
    let _ = event_task.await;

    println!();
    println!("📊 Execution Summary:");
    println!("   Status: {:?}", result.status);
    println!("   Steps: {}", result.steps.len());

    for step in &result.steps {
        println!();
        println!("   {} [{}] {:?}", step.node_id, step.node_type, step.status);
        if let Some(error) = &step.error {
            println!("     error: {}", error);
        }
        if let Some(output) = &step.output {
            let mut keys: Vec<_> = output.keys().collect();
            keys.sort();
            for key in keys {
                println!("     {}: {}", key, serde_json::to_string(&output[key])?);
            }
        }
    }

    if !result.is_success() {
        bail!("workflow {} failed", workflow.id);
    }

    Ok(())
}

fn print_event(event: &ExecutionEvent) {
    match event {
        ExecutionEvent::WalkStarted {
            start_node: Some(start),
            variables,
            ..
        } => {
            println!("▶️  Workflow started at {} with {} variables", start, variables);
        }
        ExecutionEvent::WalkStarted { start_node: None, .. } => {
            println!("▶️  Workflow started without a start node");
        }
        ExecutionEvent::StepStarted {
            node_id, node_type, ..
        } => {
            println!("  ⚡ Starting node: {} ({})", node_id, node_type);
        }
        ExecutionEvent::StepFinished {
            step, duration_ms, ..
        } => match &step.error {
            None => println!("  ✅ Node {} completed in {}ms", step.node_id, duration_ms),
            Some(error) => println!("  ❌ Node {} failed: {}", step.node_id, error),
        },
        ExecutionEvent::EdgeTaken {
            source,
            target,
            branch,
            ..
        } => match branch {
            Some(branch) => println!("  ↪  {} -[{}]-> {}", source, branch, target),
            None => println!("  ↪  {} -> {}", source, target),
        },
        ExecutionEvent::NodeMessage {
            node_id,
            level,
            message,
            ..
        } => match level {
            MessageLevel::Info => println!("     ℹ️  [{}] {}", node_id, message),
            MessageLevel::Warning => println!("     ⚠️  [{}] {}", node_id, message),
        },
        ExecutionEvent::WalkFinished {
            status,
            end,
            duration_ms,
            ..
        } => match status {
            ExecutionStatus::Completed => {
                println!("✨ Workflow completed in {}ms ({})", duration_ms, end);
            }
            ExecutionStatus::Failed => {
                println!("💥 Workflow failed after {}ms ({})", duration_ms, end);
            }
        },
    }
}

fn validate_workflow(file: &Path) -> Result<()> {
    println!("🔍 Validating workflow: {}", file.display());

    let workflow = load_workflow(file)?;
    validate_graph(&workflow.definition)?;

    let registry = build_registry()?;
    let unknown: Vec<&str> = workflow
        .definition
        .nodes
        .iter()
        .filter(|n| !registry.contains(n.kind.as_str()))
        .map(|n| n.id.as_str())
        .collect();

    println!("✅ Workflow is valid:");
    println!("   Name: {}", workflow.name);
    println!("   Nodes: {}", workflow.definition.nodes.len());
    println!("   Edges: {}", workflow.definition.edges.len());

    if !unknown.is_empty() {
        println!("   ⚠️  Nodes with unknown types: {}", unknown.join(", "));
    }

    Ok(())
}

fn list_nodes() -> Result<()> {
    println!("📦 Available Node Types:");
    println!();

    let registry = build_registry()?;

    for node_type in registry.list_node_types() {
        if let Some(descriptor) = registry.get_descriptor(&node_type) {
            println!("  • {} ({})", node_type, descriptor.category);
            println!("    {}", descriptor.description);
            if !descriptor.reads.is_empty() {
                println!("    reads: {}", descriptor.reads.join(", "));
            }
            if !descriptor.writes.is_empty() {
                println!("    writes: {}", descriptor.writes.join(", "));
            }
        } else {
            println!("  • {}", node_type);
        }
    }

    Ok(())
}

fn create_example_workflow(output: &Path) -> Result<()> {
    let workflow = trailnodes::sample::weather_alert_workflow();

    let json = serde_json::to_string_pretty(&workflow)?;
    std::fs::write(output, json)?;

    println!("✨ Created example workflow: {}", output.display());
    println!();
    println!("Run it with:");
    println!(
        "  trail run --file {} --input '{{\"name\": \"Jo\", \"email\": \"jo@example.com\", \"city\": \"Sydney\"}}' --threshold 25",
        output.display()
    );

    Ok(())
}
