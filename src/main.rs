use anyhow::Result;
use clap::{Parser, Subcommand};
use rag_deadlock::adapters::simulation::SimulationConfig;
use rag_deadlock::app::engine::DeadlockEngine;
use rag_deadlock::app::monitor::{LiveMonitor, MonitorConfig};
use rag_deadlock::cli;
use rag_deadlock::server::{http, mcp::RagMcpServer};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Deadlock detection over resource allocation graphs
#[derive(Parser, Debug)]
#[command(name = "ragtool")]
#[command(version)]
#[command(
    about = "Detect deadlock cycles, score deadlock risk and suggest resolutions for resource allocation graphs"
)]
struct Cli {
    /// JSON file with risk weights (missing fields use defaults)
    #[arg(long, global = true)]
    weights: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Full analysis: cycles, risk, severity and suggestions
    Analyze {
        /// Edges as text, e.g. "P1->R1, R1->P2" (stdin when omitted)
        edges: Option<String>,

        /// Read edges from a file, one `A->B` per line or comma separated
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Print the result as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// List every elementary cycle
    Cycles {
        edges: Option<String>,

        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Rotate each cycle to its lexicographically smallest form
        #[arg(long, default_value_t = false)]
        canonical: bool,
    },

    /// Remove edges until the graph is acyclic and print the remaining edge list
    Fix {
        edges: Option<String>,

        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Run the simulated live monitor and analyze each snapshot
    Monitor {
        /// Refresh interval in milliseconds
        #[arg(long, default_value_t = 2000)]
        interval_ms: u64,

        /// Number of snapshots to analyze before stopping
        #[arg(long, default_value_t = 3)]
        ticks: u32,

        /// Seed for a reproducible simulation
        #[arg(long)]
        seed: Option<u64>,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Serve the JSON HTTP API
    Serve {
        #[arg(long, default_value = "127.0.0.1:8080")]
        addr: SocketAddr,

        /// Live monitor refresh interval in milliseconds
        #[arg(long, default_value_t = 2000)]
        interval_ms: u64,
    },

    /// Serve MCP tools over stdio
    Mcp,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args = Cli::parse();
    let weights = cli::load_weights(args.weights.as_deref())?;
    let engine = DeadlockEngine::new(weights);

    match args.command {
        Commands::Analyze { edges, file, json } => {
            let edges = cli::resolve_edges(edges.as_deref(), file.as_deref())?;
            cli::analyze_and_display(&engine, &edges, json)
        }
        Commands::Cycles {
            edges,
            file,
            canonical,
        } => {
            let edges = cli::resolve_edges(edges.as_deref(), file.as_deref())?;
            cli::display_cycles(&edges, canonical)
        }
        Commands::Fix { edges, file } => {
            let edges = cli::resolve_edges(edges.as_deref(), file.as_deref())?;
            cli::fix_and_display(&edges)
        }
        Commands::Monitor {
            interval_ms,
            ticks,
            seed,
            json,
        } => {
            let config = MonitorConfig {
                interval_ms,
                simulation: SimulationConfig {
                    seed,
                    ..SimulationConfig::default()
                },
            };
            tokio::task::spawn_blocking(move || cli::run_monitor(&engine, config, ticks, json))
                .await?
        }
        Commands::Serve { addr, interval_ms } => {
            let monitor = Arc::new(LiveMonitor::new(MonitorConfig {
                interval_ms,
                ..MonitorConfig::default()
            }));
            http::serve(engine, monitor, addr).await
        }
        Commands::Mcp => RagMcpServer::new(engine).serve_stdio().await,
    }
}

/// Initialize tracing subscriber with environment filter, logging to stderr.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
