// src/commands.rs
//! Command handlers for the recipe-private CLI

use anyhow::Result;
use recipe_private::host::{AllowAll, LogFlusher};
use recipe_private::lifecycle::{InstallState, Lifecycle, Scope};
use recipe_private::options::OptionsGateway;
use recipe_private::plugin::VERSION;
use recipe_private::store::{self, SqliteDirectory, SqliteStore};
use recipe_private::tenant::TenantId;
use semver::Version;
use std::sync::{Arc, Mutex};
use tracing::info;

/// Build a lifecycle coordinator over the SQLite state database
fn open_lifecycle(db_path: &str) -> Result<Lifecycle> {
    let store = SqliteStore::open(db_path)?;
    let directory = SqliteDirectory::open(db_path)?;
    let options = Arc::new(Mutex::new(OptionsGateway::new(Box::new(store))));

    Ok(Lifecycle::new(
        options,
        Box::new(directory),
        Box::new(AllowAll),
        Arc::new(Mutex::new(LogFlusher)),
        Version::parse(VERSION)?,
    ))
}

fn scope_for(tenant: u64, network: bool) -> Scope {
    if network {
        Scope::Network
    } else {
        Scope::Tenant(TenantId(tenant))
    }
}

pub fn init(db_path: &str) -> Result<()> {
    info!("Initializing state database at: {}", db_path);
    store::init(db_path)?;
    println!("State database initialized at: {}", db_path);
    Ok(())
}

pub fn activate(db_path: &str, tenant: u64, network: bool) -> Result<()> {
    let mut lifecycle = open_lifecycle(db_path)?;
    lifecycle.activate(scope_for(tenant, network))?;
    if network {
        println!("Activated {} network-wide", VERSION);
    } else {
        println!("Activated {} on tenant {}", VERSION, tenant);
    }
    Ok(())
}

pub fn deactivate(db_path: &str, tenant: u64, network: bool) -> Result<()> {
    let mut lifecycle = open_lifecycle(db_path)?;
    lifecycle.deactivate(scope_for(tenant, network))?;
    println!("Deactivated; rewrite flush requested");
    Ok(())
}

pub fn uninstall(db_path: &str) -> Result<()> {
    let mut lifecycle = open_lifecycle(db_path)?;
    lifecycle.uninstall()?;
    println!("Uninstalled network-wide; all state removed");
    Ok(())
}

pub fn status(db_path: &str, tenant: u64) -> Result<()> {
    let lifecycle = open_lifecycle(db_path)?;
    match lifecycle.status(TenantId(tenant))? {
        InstallState::Uninstalled => {
            println!("tenant {}: not installed", tenant);
        }
        InstallState::Installed { rewrites_flushed } => {
            println!(
                "tenant {}: installed (rewrite flush {})",
                tenant,
                if rewrites_flushed { "done" } else { "pending" }
            );
        }
    }
    Ok(())
}
