// build.rs

use clap::{Arg, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Common argument: database path
fn db_path_arg() -> Arg {
    Arg::new("db_path")
        .short('d')
        .long("db-path")
        .value_name("PATH")
        .default_value("/var/lib/recipe-private/state.db")
        .help("State database path")
}

/// Common argument: tenant id
fn tenant_arg() -> Arg {
    Arg::new("tenant")
        .short('t')
        .long("tenant")
        .default_value("1")
        .help("Tenant to operate on")
}

/// Common argument: network-wide flag
fn network_arg() -> Arg {
    Arg::new("network")
        .long("network")
        .action(clap::ArgAction::SetTrue)
        .help("Apply to every active tenant in the deployment")
}

fn build_cli() -> Command {
    Command::new("recipe-private")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Manage the embed-only recipes add-on state")
        .subcommand_required(true)
        .subcommand(
            Command::new("init")
                .about("Initialize the state database")
                .arg(db_path_arg()),
        )
        .subcommand(
            Command::new("activate")
                .about("Activate the add-on")
                .arg(db_path_arg())
                .arg(tenant_arg())
                .arg(network_arg()),
        )
        .subcommand(
            Command::new("deactivate")
                .about("Deactivate the add-on (flushes rewrites, keeps state)")
                .arg(db_path_arg())
                .arg(tenant_arg())
                .arg(network_arg()),
        )
        .subcommand(
            Command::new("uninstall")
                .about("Remove all add-on state, network-wide")
                .arg(db_path_arg()),
        )
        .subcommand(
            Command::new("status")
                .about("Show a tenant's install state")
                .arg(db_path_arg())
                .arg(tenant_arg()),
        )
}

fn main() -> std::io::Result<()> {
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR not set"));
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir)?;

    let cmd = build_cli();
    let man = Man::new(cmd.clone());
    let mut buffer = Vec::new();
    man.render(&mut buffer)?;
    fs::write(man_dir.join("recipe-private.1"), buffer)?;

    for sub in cmd.get_subcommands() {
        let name = format!("recipe-private-{}", sub.get_name());
        let man = Man::new(sub.clone().name(name.clone()));
        let mut buffer = Vec::new();
        man.render(&mut buffer)?;
        fs::write(man_dir.join(format!("{name}.1")), buffer)?;
    }

    println!("cargo:rerun-if-changed=build.rs");
    Ok(())
}
