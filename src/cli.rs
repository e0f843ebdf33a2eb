// src/cli.rs
//! CLI definitions for the recipe-private state tool
//!
//! This module contains all command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.

use clap::{Parser, Subcommand};

pub const DEFAULT_DB_PATH: &str = "/var/lib/recipe-private/state.db";

#[derive(Parser)]
#[command(name = "recipe-private")]
#[command(version)]
#[command(
    about = "Manage the embed-only recipes add-on: activation state, deployment tenants, and the pending rewrite flush",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the state database
    Init {
        /// Path to the database file
        #[arg(short, long, default_value = DEFAULT_DB_PATH)]
        db_path: String,
    },

    /// Activate the add-on
    Activate {
        /// Path to the database file
        #[arg(short, long, default_value = DEFAULT_DB_PATH)]
        db_path: String,

        /// Tenant to activate on
        #[arg(short, long, default_value_t = 1)]
        tenant: u64,

        /// Activate on every active tenant in the deployment
        #[arg(long)]
        network: bool,
    },

    /// Deactivate the add-on (flushes rewrites, keeps state)
    Deactivate {
        /// Path to the database file
        #[arg(short, long, default_value = DEFAULT_DB_PATH)]
        db_path: String,

        /// Tenant to deactivate on
        #[arg(short, long, default_value_t = 1)]
        tenant: u64,

        /// Deactivate on every active tenant in the deployment
        #[arg(long)]
        network: bool,
    },

    /// Remove all add-on state, network-wide
    Uninstall {
        /// Path to the database file
        #[arg(short, long, default_value = DEFAULT_DB_PATH)]
        db_path: String,
    },

    /// Show a tenant's install state
    Status {
        /// Path to the database file
        #[arg(short, long, default_value = DEFAULT_DB_PATH)]
        db_path: String,

        /// Tenant to inspect
        #[arg(short, long, default_value_t = 1)]
        tenant: u64,
    },
}
