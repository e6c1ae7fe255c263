//! RentX CLI - headless front end for the offline-first rental client
//!
//! Browses the local replica, edits the profile offline and drives sync.

mod cli;
mod commands;
mod error;

#[cfg(test)]
mod tests;

use clap::Parser;
use tracing_subscriber::filter::{Directive, LevelFilter};

use crate::cli::{Cli, Commands};
use crate::commands::cars::{run_car, run_cars};
use crate::commands::common::{resolve_config_path, GlobalOptions, Session};
use crate::commands::config::run_config;
use crate::commands::profile::run_profile;
use crate::commands::rent::run_rent;
use crate::commands::status::run_status;
use crate::commands::sync::{run_sync, run_watch};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let default_directive = "rentx=info"
        .parse::<Directive>()
        .unwrap_or_else(|_| LevelFilter::INFO.into());
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_directive),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let options = GlobalOptions {
        db_path: cli.db_path,
        config_path: cli.config,
    };

    // Config commands must work even when the replica cannot be opened
    let command = match cli.command {
        Commands::Config { command } => {
            return run_config(command, &resolve_config_path(options.config_path));
        }
        command => command,
    };

    let session = Session::open(&options)?;
    match command {
        Commands::Cars { limit, json } => run_cars(&session, limit, json).await?,
        Commands::Car { id, json } => run_car(&session, &id, json).await?,
        Commands::Profile { command } => run_profile(&session, command).await?,
        Commands::Sync => {
            run_sync(&session).await?;
        }
        Commands::Watch => run_watch(&session).await?,
        Commands::Rent {
            car_id,
            user,
            dates,
        } => {
            run_rent(&session, &car_id, &user, &dates).await?;
        }
        Commands::Status { json } => run_status(&session, json).await?,
        Commands::Config { .. } => {} // handled above
    }

    Ok(())
}
