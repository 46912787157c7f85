mod cli;
mod commands;
mod config;

use clap::Parser;
use cli::{Cli, Commands};
use config::EngineTarget;

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so search output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(tracing::Level::INFO.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let target = EngineTarget::resolve(&cli.target)?;

    match cli.command {
        Commands::Build { sources, workers } => commands::build::run(&target, &sources, workers),
        Commands::Search { query, json } => commands::search::run(&target, &query, json),
        Commands::Migrate { status } => commands::migrate::run(&target, status),
        Commands::Stats => commands::stats::run(&target),
    }
}
