//! Offline-first synchronization: one coordinator running bounded
//! pull → apply → push rounds, and a trigger deciding when they run.

mod coordinator;
mod trigger;

#[cfg(test)]
pub(crate) mod testing;

use std::fmt;

use thiserror::Error;

use crate::models::Checkpoint;
use crate::remote::GatewayError;
use crate::store::ApplyStats;

pub use coordinator::{RoundCounters, SyncCoordinator};
pub use trigger::{SyncTrigger, TriggerHandle, TriggerPolicy};

/// Failures surfaced by a sync round
#[derive(Debug, Error)]
pub enum SyncError {
    /// Pull failed or timed out; nothing changed locally
    #[error("Remote unavailable: {0}")]
    RemoteUnavailable(#[source] GatewayError),
    /// Local write fault; the checkpoint did not move
    #[error("Applying changes failed: {0}")]
    ApplyFailed(#[source] crate::Error),
    /// Local edits could not be delivered; they stay queued
    #[error("Push failed: {0}")]
    PushFailed(String),
}

impl SyncError {
    /// Whether a later round can be expected to succeed without intervention
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        !matches!(self, Self::ApplyFailed(_))
    }
}

/// Lifecycle of a single round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    Created,
    Pulling,
    Applying,
    Pushing,
    Completed,
    Failed,
}

impl fmt::Display for RoundPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Created => "created",
            Self::Pulling => "pulling",
            Self::Applying => "applying",
            Self::Pushing => "pushing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        })
    }
}

/// Why a requested round did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Another round holds the in-flight flag
    InFlight,
    /// Connectivity is not known to be up; no network call was made
    Offline,
}

/// What a completed round did
#[derive(Debug)]
pub struct RoundSummary {
    pub from: Checkpoint,
    pub to: Checkpoint,
    pub applied: ApplyStats,
    /// Local edits acknowledged by the server
    pub pushed: usize,
    /// Swallowed push failure, if any
    pub push_error: Option<SyncError>,
}

#[derive(Debug)]
pub enum RoundReport {
    Skipped(SkipReason),
    Completed(RoundSummary),
}

impl RoundReport {
    #[must_use]
    pub const fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }

    #[must_use]
    pub const fn summary(&self) -> Option<&RoundSummary> {
        match self {
            Self::Completed(summary) => Some(summary),
            Self::Skipped(_) => None,
        }
    }
}
