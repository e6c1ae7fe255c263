//! Remote gateway: stateless transport to the authoritative backend.

mod http;

use std::future::Future;
use std::sync::Arc;

use thiserror::Error;

use crate::models::{Car, Checkpoint, PullResponse, TableChanges, User};

pub use http::HttpGateway;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Invalid gateway configuration: {0}")]
    InvalidConfiguration(String),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Server error: {message} ({status})")]
    Status { status: u16, message: String },
    #[error("Invalid response payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Calls the sync core makes against the backend
pub trait RemoteGateway: Send + Sync + 'static {
    /// `GET /cars/sync/pull?lastPulledVersion={checkpoint}`
    fn pull(
        &self,
        checkpoint: Checkpoint,
    ) -> impl Future<Output = GatewayResult<PullResponse>> + Send;

    /// `POST /users/sync` with the users table changes
    fn push(&self, users: &TableChanges<User>) -> impl Future<Output = GatewayResult<()>> + Send;

    /// `GET /cars/{id}`; a side read, never part of a sync round
    fn fetch_detail(&self, car_id: &str) -> impl Future<Output = GatewayResult<Car>> + Send;
}

impl<G: RemoteGateway> RemoteGateway for Arc<G> {
    fn pull(
        &self,
        checkpoint: Checkpoint,
    ) -> impl Future<Output = GatewayResult<PullResponse>> + Send {
        (**self).pull(checkpoint)
    }

    fn push(&self, users: &TableChanges<User>) -> impl Future<Output = GatewayResult<()>> + Send {
        (**self).push(users)
    }

    fn fetch_detail(&self, car_id: &str) -> impl Future<Output = GatewayResult<Car>> + Send {
        (**self).fetch_detail(car_id)
    }
}
