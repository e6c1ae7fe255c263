use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] rentx_core::Error),
    #[error(transparent)]
    Gateway(#[from] rentx_core::GatewayError),
    #[error(transparent)]
    Sync(#[from] rentx_core::SyncError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Car not found: {0}")]
    CarNotFound(String),
    #[error("Profile edit needs at least one of --name, --driver-license or --avatar")]
    EmptyProfileEdit,
    #[error("{0} requires a network connection")]
    Offline(&'static str),
}
