//! Sync coordinator: bounded pull → apply → push rounds, one at a time.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Instant;

use tokio::sync::watch;

use super::{RoundPhase, RoundReport, RoundSummary, SkipReason, SyncError};
use crate::connectivity::ConnectivityMonitor;
use crate::models::{Checkpoint, TableChanges, User};
use crate::remote::RemoteGateway;
use crate::state::SyncState;
use crate::store::LocalStore;

/// How many rounds were requested and what became of them
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundCounters {
    pub started: usize,
    pub skipped_in_flight: usize,
    pub skipped_offline: usize,
    pub failed: usize,
}

#[derive(Default)]
struct Counters {
    started: AtomicUsize,
    skipped_in_flight: AtomicUsize,
    skipped_offline: AtomicUsize,
    failed: AtomicUsize,
}

/// Owns the in-flight flag and runs sync rounds against one store
///
/// Share it behind an `Arc`; concurrent `run_round` calls are safe and all
/// but one of them return [`SkipReason::InFlight`].
pub struct SyncCoordinator<G> {
    store: LocalStore,
    gateway: G,
    connectivity: ConnectivityMonitor,
    in_flight: AtomicBool,
    state: watch::Sender<SyncState>,
    counters: Counters,
}

/// Clears the in-flight flag when the round ends, whatever the outcome
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Execution context of a single round
struct SyncRound {
    phase: RoundPhase,
    started_at: Instant,
}

impl SyncRound {
    fn new() -> Self {
        Self {
            phase: RoundPhase::Created,
            started_at: Instant::now(),
        }
    }

    fn advance(&mut self, next: RoundPhase) {
        tracing::debug!("Sync round {} -> {}", self.phase, next);
        self.phase = next;
    }
}

impl<G: RemoteGateway> SyncCoordinator<G> {
    pub fn new(store: LocalStore, gateway: G, connectivity: ConnectivityMonitor) -> Self {
        let initial = if connectivity.is_connected() {
            SyncState::Synced
        } else {
            SyncState::Offline
        };
        let (state, _rx) = watch::channel(initial);

        Self {
            store,
            gateway,
            connectivity,
            in_flight: AtomicBool::new(false),
            state,
            counters: Counters::default(),
        }
    }

    pub const fn store(&self) -> &LocalStore {
        &self.store
    }

    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    pub const fn connectivity(&self) -> &ConnectivityMonitor {
        &self.connectivity
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn state(&self) -> SyncState {
        *self.state.borrow()
    }

    /// Receiver notified whenever the sync status changes
    pub fn subscribe_state(&self) -> watch::Receiver<SyncState> {
        self.state.subscribe()
    }

    pub fn counters(&self) -> RoundCounters {
        RoundCounters {
            started: self.counters.started.load(Ordering::Acquire),
            skipped_in_flight: self.counters.skipped_in_flight.load(Ordering::Acquire),
            skipped_offline: self.counters.skipped_offline.load(Ordering::Acquire),
            failed: self.counters.failed.load(Ordering::Acquire),
        }
    }

    /// Run one sync round
    ///
    /// Returns `Ok(Skipped)` without touching the network when a round is
    /// already running or the device is not known to be online. A failed
    /// push is reported inside the summary; the edits stay queued for the
    /// next round.
    pub async fn run_round(&self) -> Result<RoundReport, SyncError> {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            tracing::debug!("Sync round already in flight; skipping");
            self.counters.skipped_in_flight.fetch_add(1, Ordering::AcqRel);
            return Ok(RoundReport::Skipped(SkipReason::InFlight));
        };

        if !self.connectivity.is_connected() {
            tracing::debug!("Connectivity is {}; skipping sync round", self.connectivity.current());
            self.counters.skipped_offline.fetch_add(1, Ordering::AcqRel);
            self.publish(SyncState::Offline);
            return Ok(RoundReport::Skipped(SkipReason::Offline));
        }

        self.counters.started.fetch_add(1, Ordering::AcqRel);
        self.publish(SyncState::Syncing);

        let mut round = SyncRound::new();
        match self.execute(&mut round).await {
            Ok(summary) => {
                round.advance(RoundPhase::Completed);
                tracing::info!(
                    "Sync round completed in {:?}: checkpoint {} -> {}, {} changes applied, {} edits pushed",
                    round.started_at.elapsed(),
                    summary.from,
                    summary.to,
                    summary.applied.total(),
                    summary.pushed
                );
                self.publish(SyncState::Synced);
                Ok(RoundReport::Completed(summary))
            }
            Err(error) => {
                round.advance(RoundPhase::Failed);
                self.counters.failed.fetch_add(1, Ordering::AcqRel);
                if error.is_transient() {
                    tracing::warn!("Sync round failed: {}", error);
                } else {
                    tracing::error!("Sync round failed: {}", error);
                }
                self.publish(SyncState::Error);
                Err(error)
            }
        }
    }

    async fn execute(&self, round: &mut SyncRound) -> Result<RoundSummary, SyncError> {
        let from = self.store.checkpoint().await.map_err(SyncError::ApplyFailed)?;

        round.advance(RoundPhase::Pulling);
        let response = self
            .gateway
            .pull(from)
            .await
            .map_err(SyncError::RemoteUnavailable)?;
        let to = response.checkpoint();

        round.advance(RoundPhase::Applying);
        let applied = self
            .store
            .apply_changes(&response.changes, to)
            .await
            .map_err(SyncError::ApplyFailed)?;

        round.advance(RoundPhase::Pushing);
        let (pushed, push_error) = match self.push_pending().await {
            Ok(pushed) => (pushed, None),
            Err(error) => {
                tracing::warn!("{}; local edits stay queued", error);
                (0, Some(error))
            }
        };

        Ok(RoundSummary {
            from,
            to,
            applied,
            pushed,
            push_error,
        })
    }

    /// Push queued edits; acknowledged ones leave the queue
    async fn push_pending(&self) -> Result<usize, SyncError> {
        let pending = self
            .store
            .pending_mutations()
            .await
            .map_err(|error| SyncError::PushFailed(error.to_string()))?;
        if pending.is_empty() {
            return Ok(0);
        }

        let users = TableChanges::<User> {
            updated: pending.iter().map(|mutation| mutation.payload.clone()).collect(),
            ..TableChanges::default()
        };
        tracing::debug!("Pushing {} local edits", users.len());

        self.gateway
            .push(&users)
            .await
            .map_err(|error| SyncError::PushFailed(error.to_string()))?;

        self.store
            .acknowledge(&pending)
            .await
            .map_err(|error| SyncError::PushFailed(error.to_string()))
    }

    /// Checkpoint the next round will pull from
    pub async fn checkpoint(&self) -> crate::Result<Checkpoint> {
        self.store.checkpoint().await
    }

    fn publish(&self, next: SyncState) {
        self.state.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}
