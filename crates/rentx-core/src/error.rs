//! Error types for rentx-core

use thiserror::Error;

/// Result type alias using rentx-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in local store operations
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// `SQLite` error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Record not found
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Checkpoint would move backwards
    #[error("Checkpoint regression: server version {incoming} is behind local version {current}")]
    CheckpointRegression { current: i64, incoming: i64 },
}
