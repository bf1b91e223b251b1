use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;
mod flags;
mod input;

use commands::{CleanArgs, EgoArgs, ExtractArgs, GraphArgs, LayoutArgs, MetricsArgs};
use config::AppConfig;

#[derive(Parser)]
#[command(name = "biograph")]
#[command(about = "Entity extraction and correspondence graphs for biographies", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for output)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Config file (default: ./biograph.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add detected people, places and organizations to letters
    Extract(ExtractArgs),

    /// Build the four-tier correspondence graph and export it
    Graph(GraphArgs),

    /// Print degree, betweenness and parallel-edge weights
    Metrics(MetricsArgs),

    /// Export the subgraph within N hops of a node
    Ego(EgoArgs),

    /// Compute node positions for a layout mode
    Layout(LayoutArgs),

    /// Collapse name fragments into their fullest form
    Clean(CleanArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    // ort logs every session step at info
    if !cli.verbose {
        builder.filter_module("ort", log::LevelFilter::Off);
    }
    builder.target(env_logger::Target::Stderr).init();

    let config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Extract(args) => commands::run_extract(args, &config).await?,
        Commands::Graph(args) => commands::run_graph(args, &config)?,
        Commands::Metrics(args) => commands::run_metrics(args, &config)?,
        Commands::Ego(args) => commands::run_ego(args, &config)?,
        Commands::Layout(args) => commands::run_layout(args, &config)?,
        Commands::Clean(args) => commands::run_clean(args)?,
    }

    Ok(())
}
