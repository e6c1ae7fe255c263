//! Connectivity monitor: the device's view of network reachability.

mod probe;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;

pub use probe::{check_reachability, probe_once, ReachabilityProbe};

/// Reachability tri-state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Connectivity {
    Connected,
    Disconnected,
    /// Nothing observed yet
    #[default]
    Unknown,
}

impl Connectivity {
    /// Only a positive observation counts as connected
    #[must_use]
    pub const fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl fmt::Display for Connectivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
            Self::Unknown => "unknown",
        })
    }
}

/// Publishes connectivity transitions to subscribers
#[derive(Clone, Debug)]
pub struct ConnectivityMonitor {
    tx: Arc<watch::Sender<Connectivity>>,
    /// Bumped on every transition into `Connected`; survives watch coalescing
    epoch: Arc<AtomicU64>,
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new(Connectivity::Unknown)
    }
}

impl ConnectivityMonitor {
    pub fn new(initial: Connectivity) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self {
            tx: Arc::new(tx),
            epoch: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Record an observation; returns whether it was a transition
    pub fn report(&self, state: Connectivity) -> bool {
        self.tx.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                tracing::debug!("Connectivity {} -> {}", current, state);
                *current = state;
                if state.is_connected() {
                    self.epoch.fetch_add(1, Ordering::SeqCst);
                }
                true
            }
        })
    }

    pub fn current(&self) -> Connectivity {
        *self.tx.borrow()
    }

    pub fn is_connected(&self) -> bool {
        self.current().is_connected()
    }

    /// Number of transitions into `Connected` so far
    pub fn connected_epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    /// Receiver notified on every transition
    pub fn subscribe(&self) -> watch::Receiver<Connectivity> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_is_not_connected() {
        let monitor = ConnectivityMonitor::default();
        assert_eq!(monitor.current(), Connectivity::Unknown);
        assert!(!monitor.is_connected());
    }

    #[test]
    fn report_ignores_repeated_state() {
        let monitor = ConnectivityMonitor::default();
        assert!(monitor.report(Connectivity::Connected));
        assert!(!monitor.report(Connectivity::Connected));
        assert!(monitor.report(Connectivity::Disconnected));
        assert_eq!(monitor.current(), Connectivity::Disconnected);
    }

    #[test]
    fn epoch_counts_transitions_into_connected() {
        let monitor = ConnectivityMonitor::default();
        assert_eq!(monitor.connected_epoch(), 0);

        monitor.report(Connectivity::Connected);
        monitor.report(Connectivity::Connected);
        monitor.report(Connectivity::Disconnected);
        monitor.report(Connectivity::Connected);

        assert_eq!(monitor.connected_epoch(), 2);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn subscribers_see_transitions() {
        let monitor = ConnectivityMonitor::default();
        let mut rx = monitor.subscribe();

        monitor.report(Connectivity::Connected);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), Connectivity::Connected);
    }
}
