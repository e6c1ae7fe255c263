use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "rentx")]
#[command(about = "Browse and rent cars from an offline-first local replica")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to the local replica database
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// Optional path to the client config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List cars from the local replica
    Cars {
        /// Number of cars to show
        #[arg(short, long)]
        limit: Option<usize>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one car, refreshing its detail when online
    Car {
        /// Car ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show or edit the cached user profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
    /// Run one sync round against the server
    Sync,
    /// Keep syncing on reconnects until interrupted
    Watch,
    /// Rent a car for the given dates (requires a connection)
    Rent {
        /// Car ID
        car_id: String,
        /// User ID of the renter
        #[arg(long, value_name = "ID")]
        user: String,
        /// Rental dates (YYYY-MM-DD), repeatable
        #[arg(long = "date", value_name = "DATE", required = true)]
        dates: Vec<NaiveDate>,
    },
    /// Show replica and connectivity status
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Inspect or update the client config
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Show cached profiles
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Edit a profile locally; the edit is pushed on the next sync
    Edit {
        /// User ID
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, value_name = "NUMBER")]
        driver_license: Option<String>,
        #[arg(long, value_name = "URL")]
        avatar: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective config
    Show,
    /// Update config values and save
    Set {
        /// API base URL (e.g. <https://api.rentx.dev>)
        #[arg(long, value_name = "URL")]
        api_url: Option<String>,
        /// Request timeout in seconds
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,
        /// Reachability probe interval in seconds
        #[arg(long, value_name = "SECS")]
        probe_interval: Option<u64>,
        /// Sync when `watch` starts while online
        #[arg(long, value_name = "BOOL")]
        sync_on_start: Option<bool>,
        /// Bearer token for authenticated requests
        #[arg(long, value_name = "TOKEN")]
        access_token: Option<String>,
    },
}
