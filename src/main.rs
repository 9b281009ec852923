//! Agnoflow CLI - validate, compile and run flow graphs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use colored::Colorize;
use futures::StreamExt;

use agnoflow::config::AgnoflowConfig;
use agnoflow::dag::{FlowValidator, TopologicalSorter};
use agnoflow::error::{FixSuggestion, FlowError};
use agnoflow::event::{EventLog, EventType, ExecutionEvent, TraceWriter};
use agnoflow::provider::{create_provider, InMemoryRetriever, ProviderRegistry};
use agnoflow::{ExecutionEngine, FlowCompiler, GraphDefinition};

#[derive(Parser)]
#[command(name = "agnoflow")]
#[command(about = "Agnoflow - compile and run agent flow graphs")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a flow's structure without compiling node configs
    Validate {
        /// Path to a flow file (.json, .yaml, .yml)
        file: PathBuf,
    },

    /// Compile a flow and print the execution plan as JSON
    Compile {
        file: PathBuf,
    },

    /// Compile and run a flow, streaming events
    Run {
        file: PathBuf,

        /// Runtime input for input nodes
        #[arg(short, long, default_value = "")]
        input: String,

        /// Send every provider call to this backend (openai, anthropic, mock)
        #[arg(short, long)]
        provider: Option<String>,

        /// Write every event to this NDJSON file
        #[arg(long)]
        trace: Option<PathBuf>,

        /// Print events as JSON lines instead of coloured text
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (ignore if not present)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { file } => validate_flow(&file).await,
        Commands::Compile { file } => compile_flow(&file).await,
        Commands::Run {
            file,
            input,
            provider,
            trace,
            json,
        } => run_flow(&file, input, provider, trace, json).await,
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        if let Some(suggestion) = e.fix_suggestion() {
            eprintln!("  {} {}", "Fix:".yellow(), suggestion);
        }
        std::process::exit(1);
    }
}

fn load_config() -> Result<AgnoflowConfig, FlowError> {
    Ok(AgnoflowConfig::load()?.with_env())
}

async fn validate_flow(file: &Path) -> Result<(), FlowError> {
    let graph = GraphDefinition::load(file).await?;

    let errors = FlowValidator::validate(&graph);
    if !errors.is_empty() {
        return Err(FlowError::ValidationFailed { errors });
    }
    let order = TopologicalSorter::sort(&graph)?;

    println!("{} Flow '{}' is valid", "✓".green(), graph.name);
    println!("  Nodes: {}", graph.nodes.len());
    println!("  Edges: {}", graph.edges.len());
    println!("  Order: {}", order.join(" → "));
    Ok(())
}

async fn compile_flow(file: &Path) -> Result<(), FlowError> {
    let graph = GraphDefinition::load(file).await?;
    let config = load_config()?;

    let plan = FlowCompiler::with_defaults(&config).compile(&graph)?;
    println!("{}", plan.to_json_pretty()?);
    Ok(())
}

async fn run_flow(
    file: &Path,
    input: String,
    provider_override: Option<String>,
    trace: Option<PathBuf>,
    json: bool,
) -> Result<(), FlowError> {
    let graph = GraphDefinition::load(file).await?;
    let config = load_config()?;

    let plan = Arc::new(FlowCompiler::with_defaults(&config).compile(&graph)?);

    let mut engine = ExecutionEngine::new(ProviderRegistry::from_config(&config)?)
        .with_settings(config.engine.clone())
        .with_retriever("in_memory", Arc::new(InMemoryRetriever::new()));

    if let Some(name) = &provider_override {
        let provider = create_provider(name, &config).map_err(|e| match e.downcast::<FlowError>() {
            Ok(flow_error) => flow_error,
            Err(other) => FlowError::Provider(other.to_string()),
        })?;
        if !json {
            println!("{} Using provider: {}", "→".cyan(), name.cyan().bold());
        }
        engine = engine.with_provider_override(provider);
    }

    let writer = trace.as_ref().map(TraceWriter::create).transpose()?;
    let log = EventLog::new();

    let mut events = engine.execute(plan, input);
    while let Some(event) = events.next().await {
        if let Some(writer) = &writer {
            writer.write_event(&event)?;
        }
        if json {
            println!("{}", serde_json::to_string(&event)?);
        } else {
            print_event(&event);
        }
        log.record(event);
    }

    if let Some(writer) = &writer {
        writer.close()?;
    }

    match log.last_of(EventType::Error) {
        Some(failed) => Err(FlowError::NodeExecution {
            node_id: failed.node_id.unwrap_or_default(),
            reason: failed.message,
        }),
        None => Ok(()),
    }
}

fn print_event(event: &ExecutionEvent) {
    let node = event.node_id.as_deref().unwrap_or("-");
    match event.event_type {
        EventType::FlowStart => println!("{} {}", "▶".cyan(), event.message.bold()),
        EventType::NodeStart => {
            println!("  {} {} {}", "→".cyan(), node.bold(), event.message.dimmed())
        }
        EventType::NodeSkipped => {
            println!("  {} {} {}", "⊘".yellow(), node, event.message.dimmed())
        }
        EventType::NodeOutput => {
            if let Some(text) = event.data_text() {
                for line in text.lines() {
                    println!("    {}", line);
                }
            }
        }
        EventType::NodeComplete => println!("  {} {}", "✓".green(), node),
        EventType::Error => println!("  {} {}: {}", "✗".red(), node.bold(), event.message.red()),
        EventType::FlowComplete => {
            println!("{} {}", "✓".green(), event.message.bold());
            if let Some(output) = event.data_text().filter(|s| !s.is_empty()) {
                println!("{}", "Output:".cyan().bold());
                println!("{}", output);
            }
        }
    }
}
