//! CLI argument parsing and command dispatch

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};

use hammer_core::account::Operator;
use hammer_core::config::{FileConfig, RunConfig, TxKind};
use hammer_core::directory::Directory;
use hammer_core::orchestrator::OrchestratorBuilder;
use hammer_ledger::GatewayClient;

#[derive(Parser)]
#[command(name = "hammer")]
#[command(author, version, about = "Transaction load generation tool", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a load-generation session
    Run {
        /// Path to the network configuration file
        #[arg(short, long)]
        config: PathBuf,
        /// Comma-separated node names to target
        #[arg(short, long, default_value = "node1,node2,node3")]
        nodes: String,
        /// Number of concurrent workers
        #[arg(short, long, default_value_t = 1)]
        workers: usize,
        /// Transactions per second, per worker
        #[arg(short, long, default_value_t = 10)]
        tps: u32,
        /// How long to run, e.g. 60s, 5m
        #[arg(short, long, default_value = "60s", value_parser = humantime::parse_duration)]
        duration: Duration,
        /// Transaction type to generate
        #[arg(long, default_value = "crypto")]
        tx_type: TxKind,
        /// Mirror node name to resolve, if any
        #[arg(long)]
        mirror_node: Option<String>,
    },
    /// Validate a configuration file without sending anything
    Validate {
        /// Path to the network configuration file
        #[arg(short, long)]
        config: PathBuf,
        /// Comma-separated node names the run would target
        #[arg(short, long)]
        nodes: Option<String>,
    },
}

fn parse_node_list(nodes: &str) -> Vec<String> {
    nodes
        .split(',')
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .collect()
}

fn load_network(path: &PathBuf) -> anyhow::Result<(FileConfig, Arc<Directory>, Operator)> {
    let file = FileConfig::load(path)
        .with_context(|| format!("loading config {}", path.display()))?;
    let directory = Arc::new(Directory::from_config(&file)?);
    let operator = file.operator()?;
    Ok((file, directory, operator))
}

/// Dispatch the parsed command. Returns an error for any failed run;
/// the caller turns that into a non-zero exit code.
pub async fn execute(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Run {
            config,
            nodes,
            workers,
            tps,
            duration,
            tx_type,
            mirror_node,
        } => {
            let (_, directory, operator) = load_network(&config)?;

            if let Some(name) = &mirror_node {
                let mirror = directory
                    .resolve_mirror(name)
                    .with_context(|| format!("mirror node {name} not found in config"))?;
                tracing::info!(name = %mirror.name, address = %mirror.address, "Using mirror node");
            }

            let run_config = RunConfig::new(parse_node_list(&nodes))
                .with_workers(workers)
                .with_rate(tps)
                .with_duration(duration)
                .with_tx_kind(tx_type);

            let ledger = Arc::new(GatewayClient::new("hammer", &operator)?);

            let orchestrator = OrchestratorBuilder::new(run_config)
                .directory(directory)
                .operator(operator.account)
                .ledger(ledger)
                .build()?;

            let result = orchestrator.run_with_signal_handling().await?;

            tracing::info!(
                total_tx = result.total_items,
                tps = result.throughput,
                "Run finished"
            );

            if let Some(failure) = result.into_aggregate_error() {
                return Err(failure.into());
            }
            Ok(())
        }
        Commands::Validate { config, nodes } => {
            let (file, directory, operator) = load_network(&config)?;

            if let Some(nodes) = nodes {
                let run_config = RunConfig::new(parse_node_list(&nodes));
                run_config.validate()?;
                for name in &run_config.nodes {
                    directory
                        .resolve(name)
                        .with_context(|| format!("node {name} not found in config"))?;
                }
            }

            tracing::info!(
                consensus_nodes = directory.len(),
                mirror_nodes = file.mirror_nodes.len(),
                operator = %operator.account,
                "Configuration is valid"
            );
            Ok(())
        }
    }
}
