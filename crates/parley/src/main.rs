//! Parley - a conversational assistant with bounded memory
//!
//! Main entry point for the Parley CLI.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::warn;

mod commands;
mod responder;

use commands::{
    ask, benchmark, chat, clear, config, export, health, history, sort, stats, understand,
};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Parley - a conversational assistant with bounded memory
#[derive(Parser)]
#[command(name = "parley")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Config directory (default: platform config dir)
    #[arg(long, global = true, env = "PARLEY_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Send one message and print the reply
    Ask(ask::AskArgs),

    /// Enter interactive chat mode (REPL)
    Chat(chat::ChatArgs),

    /// Show recent conversation history
    History(history::HistoryArgs),

    /// Show memory statistics
    Stats,

    /// Export all remembered conversations as JSON
    Export(export::ExportArgs),

    /// Forget every conversation and delete the snapshot
    Clear(clear::ClearArgs),

    /// Show memory store health
    Health,

    /// Sort numbers with the adaptive sorter
    Sort(sort::SortArgs),

    /// Time the sort algorithms on random data
    Benchmark(benchmark::BenchmarkArgs),

    /// Show how a message is understood, without remembering it
    Understand(understand::UnderstandArgs),

    /// Configuration inspection
    Config(config::ConfigArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = parley_config::load_layered_from(None, cli.config_dir.as_deref());

    // Initialize tracing: console (human-readable) + rotating JSON file
    let filter = if cli.verbose {
        "parley=debug,parley_memory=debug,parley_nlu=debug,parley_sort=debug,parley_config=debug,info"
    } else {
        "parley=info,parley_memory=info,parley_nlu=info,parley_sort=info,parley_config=info,warn"
    };

    let log_dir = loaded
        .config
        .logging
        .clone()
        .unwrap_or_default()
        .effective_directory(loaded.config_dir.as_deref())
        .unwrap_or_else(|| PathBuf::from("logs"));
    let file_appender = tracing_appender::rolling::daily(&log_dir, "parley.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "parley=trace,parley_memory=trace,parley_nlu=trace,parley_sort=trace,parley_config=trace,info",
                )),
        )
        .init();

    for warning in &loaded.warnings {
        warn!("{}", warning);
    }

    // Create context for commands
    let ctx = commands::Context {
        json_output: cli.json,
        verbose: cli.verbose,
        loaded,
    };

    // Dispatch to command handlers
    match cli.command {
        Commands::Ask(args) => ask::run(args, &ctx),
        Commands::Chat(args) => chat::run(args, &ctx),
        Commands::History(args) => history::run(args, &ctx),
        Commands::Stats => stats::run(&ctx),
        Commands::Export(args) => export::run(args, &ctx),
        Commands::Clear(args) => clear::run(args, &ctx),
        Commands::Health => health::run(&ctx),
        Commands::Sort(args) => sort::run(args, &ctx),
        Commands::Benchmark(args) => benchmark::run(args, &ctx),
        Commands::Understand(args) => understand::run(args, &ctx),
        Commands::Config(args) => config::run(args, &ctx),
    }
}
