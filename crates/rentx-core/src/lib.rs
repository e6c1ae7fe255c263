//! rentx-core - Core library for RentX
//!
//! Offline-first data layer of the rental client: the on-device replica,
//! the remote gateway, connectivity tracking and the sync engine that keeps
//! the replica convergent with the server.

pub mod config;
pub mod connectivity;
pub mod db;
pub mod detail;
pub mod error;
pub mod models;
pub mod remote;
pub mod state;
pub mod store;
pub mod sync;
pub mod util;

pub use config::ClientConfig;
pub use connectivity::{Connectivity, ConnectivityMonitor, ReachabilityProbe};
pub use detail::{CarDetail, DetailRefresher, DetailSource};
pub use error::{Error, Result};
pub use models::{Car, ChangeSet, Checkpoint, ProfileEdit, User};
pub use remote::{GatewayError, HttpGateway, RemoteGateway};
pub use state::SyncState;
pub use store::LocalStore;
pub use sync::{
    RoundReport, RoundSummary, SkipReason, SyncCoordinator, SyncError, SyncTrigger,
    TriggerHandle, TriggerPolicy,
};
