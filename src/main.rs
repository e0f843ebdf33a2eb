// src/main.rs

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { db_path } => commands::init(&db_path),
        Commands::Activate {
            db_path,
            tenant,
            network,
        } => commands::activate(&db_path, tenant, network),
        Commands::Deactivate {
            db_path,
            tenant,
            network,
        } => commands::deactivate(&db_path, tenant, network),
        Commands::Uninstall { db_path } => commands::uninstall(&db_path),
        Commands::Status { db_path, tenant } => commands::status(&db_path, tenant),
    }
}
