//! Taskbridge CLI - resolve task references across issue trackers

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

#[tokio::main]
async fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("taskbridge=debug")
    } else {
        EnvFilter::new("taskbridge=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    let use_color = !cli.no_color;

    // Execute command
    match cli.command {
        Commands::Providers(args) => commands::providers::execute(args),
        Commands::Resolve(args) => commands::resolve::execute(args, use_color).await,
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
