//! SAM agent graph demo CLI.
//!
//! Usage:
//!   cargo run -p demo -- invoke "Hello, world!"
//!   cargo run -p demo -- invoke "Hello" --memory --conversation-id c1 --trace
//!   cargo run -p demo -- invoke "Hello" --backend timeout
//!   cargo run -p demo -- invoke "Hello" --policy crates/sam-ref/policies/default.toml
//!   cargo run -p demo -- scenarios

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use sam_contracts::error::{AgentError, AgentResult};
use sam_policy::TomlMemoryPolicy;
use sam_ref::{
    backend_by_name,
    runtime::{DEFAULT_POLICY, NO_MEMORY_POLICY},
    scenarios, ReferenceRuntime, BACKEND_NAMES,
};

// ── CLI definition ────────────────────────────────────────────────────────────

/// SAM: a deterministic, single-authority agent graph.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "SAM agent graph demo",
    long_about = "Runs one request through the SAM agent graph, or the bundled reference\n\
                  scenarios showing memory continuity, typed fallbacks and media routing."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Process one request and print the response as JSON.
    Invoke {
        /// The raw user input (text, a data: URI, or a media path/URL).
        text: String,

        #[arg(long)]
        conversation_id: Option<String>,

        #[arg(long)]
        trace_id: Option<String>,

        /// Memory policy file. Overrides --memory.
        #[arg(long)]
        policy: Option<PathBuf>,

        /// Enable memory under the bundled default policy.
        #[arg(long)]
        memory: bool,

        /// Model backend: stub, timeout, unavailable, untyped, empty.
        #[arg(long, default_value = "stub")]
        backend: String,

        /// Also print the recorded spans and events.
        #[arg(long)]
        trace: bool,
    },
    /// Run all reference scenarios.
    Scenarios,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Set RUST_LOG=debug for per-node output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Invoke { text, conversation_id, trace_id, policy, memory, backend, trace } => {
            run_invoke(text, conversation_id, trace_id, policy, memory, &backend, trace)
        }
        Command::Scenarios => scenarios::run_all(),
    };

    if let Err(e) = result {
        eprintln!("Demo error: {}", e);
        std::process::exit(1);
    }
}

// ── Invoke ────────────────────────────────────────────────────────────────────

fn run_invoke(
    text: String,
    conversation_id: Option<String>,
    trace_id: Option<String>,
    policy: Option<PathBuf>,
    memory: bool,
    backend: &str,
    trace: bool,
) -> AgentResult<()> {
    let model = backend_by_name(backend).ok_or_else(|| AgentError::ConfigError {
        reason: format!("unknown backend '{}' (expected one of: {})", backend, BACKEND_NAMES.join(", ")),
    })?;

    let policy = match policy {
        Some(path) => TomlMemoryPolicy::from_file(&path)?,
        None if memory => TomlMemoryPolicy::from_toml_str(DEFAULT_POLICY)?,
        None => TomlMemoryPolicy::from_toml_str(NO_MEMORY_POLICY)?,
    };
    debug!(backend, rules = policy.rules().len(), "demo configured");

    let runtime = ReferenceRuntime::new(model, policy);
    let response = runtime.orchestrator.invoke(text, conversation_id, trace_id)?;

    println!("{}", to_pretty(&serde_json::to_value(&response).unwrap_or_default()));
    if trace {
        println!("{}", to_pretty(&runtime.tracer.export_json()));
    }
    Ok(())
}

fn to_pretty(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
