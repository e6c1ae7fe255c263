//! Sync trigger: decides when rounds run.
//!
//! Rounds start on launch, when the app comes back to the foreground and on
//! every transition into connectivity. Each round is spawned, so a trigger
//! that fires while one is running is dropped by the coordinator's
//! single-flight check instead of queueing behind it.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::{RoundReport, SyncCoordinator};
use crate::connectivity::{Connectivity, ConnectivityMonitor};
use crate::remote::RemoteGateway;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerPolicy {
    /// Run a round at startup when already connected
    pub sync_on_start: bool,
}

impl Default for TriggerPolicy {
    fn default() -> Self {
        Self {
            sync_on_start: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TriggerReason {
    Startup,
    Reconnected,
    Resumed,
}

impl TriggerReason {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Startup => "startup",
            Self::Reconnected => "reconnected",
            Self::Resumed => "app resumed",
        }
    }
}

#[derive(Debug)]
enum AppEvent {
    Resumed,
}

/// Listens for connectivity and lifecycle events and fires rounds
pub struct SyncTrigger;

impl SyncTrigger {
    /// Subscribe to `monitor` and start firing rounds on `coordinator`
    ///
    /// The subscription lives until the returned handle is shut down or
    /// dropped. Rounds already running are left to finish.
    pub fn start<G: RemoteGateway>(
        coordinator: Arc<SyncCoordinator<G>>,
        monitor: &ConnectivityMonitor,
        policy: TriggerPolicy,
    ) -> TriggerHandle {
        let (events, events_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(listen(coordinator, monitor.clone(), events_rx, policy));
        TriggerHandle { task, events }
    }
}

/// Owns the trigger subscription
pub struct TriggerHandle {
    task: JoinHandle<()>,
    events: mpsc::UnboundedSender<AppEvent>,
}

impl TriggerHandle {
    /// Report that the app returned to the foreground
    pub fn app_resumed(&self) {
        if self.events.send(AppEvent::Resumed).is_err() {
            tracing::debug!("Sync trigger already stopped; ignoring resume");
        }
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stop listening; in-flight rounds still run to completion
    pub fn shutdown(self) {
        drop(self);
    }
}

impl Drop for TriggerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn listen<G: RemoteGateway>(
    coordinator: Arc<SyncCoordinator<G>>,
    monitor: ConnectivityMonitor,
    mut events: mpsc::UnboundedReceiver<AppEvent>,
    policy: TriggerPolicy,
) {
    let mut connectivity = monitor.subscribe();
    let subscribed_epoch = monitor.connected_epoch();
    let initial = *connectivity.borrow_and_update();
    // A reconnect landing between the two reads was consumed by the borrow
    let mut seen_epoch = monitor.connected_epoch();
    let missed_reconnect = seen_epoch != subscribed_epoch;
    if let Some(reason) = initial_reason(policy, initial, missed_reconnect) {
        fire(&coordinator, reason);
    }

    loop {
        tokio::select! {
            changed = connectivity.changed() => {
                if changed.is_err() {
                    tracing::debug!("Connectivity monitor closed; stopping sync trigger");
                    break;
                }
                let current = *connectivity.borrow_and_update();
                let epoch = monitor.connected_epoch();
                if epoch != seen_epoch {
                    seen_epoch = epoch;
                    if current.is_connected() {
                        fire(&coordinator, TriggerReason::Reconnected);
                    }
                }
            }
            event = events.recv() => {
                match event {
                    Some(AppEvent::Resumed) => {
                        if monitor.is_connected() {
                            fire(&coordinator, TriggerReason::Resumed);
                        } else {
                            tracing::debug!(
                                "App resumed while {}; waiting for connectivity",
                                monitor.current()
                            );
                        }
                    }
                    None => break,
                }
            }
        }
    }
}

/// What, if anything, fires before the listen loop starts
fn initial_reason(
    policy: TriggerPolicy,
    initial: Connectivity,
    missed_reconnect: bool,
) -> Option<TriggerReason> {
    if !initial.is_connected() {
        return None;
    }
    if policy.sync_on_start {
        Some(TriggerReason::Startup)
    } else if missed_reconnect {
        Some(TriggerReason::Reconnected)
    } else {
        None
    }
}

fn fire<G: RemoteGateway>(coordinator: &Arc<SyncCoordinator<G>>, reason: TriggerReason) {
    tracing::debug!("Sync triggered: {}", reason.as_str());
    let coordinator = Arc::clone(coordinator);

    tokio::spawn(async move {
        match coordinator.run_round().await {
            Ok(RoundReport::Completed(summary)) => {
                if let Some(error) = summary.push_error {
                    tracing::warn!("Sync after {} left edits queued: {}", reason.as_str(), error);
                }
            }
            Ok(RoundReport::Skipped(skip)) => {
                tracing::debug!("Sync after {} skipped: {:?}", reason.as_str(), skip);
            }
            // Already logged by the coordinator; the next trigger retries
            Err(_) => {}
        }
    });
}
