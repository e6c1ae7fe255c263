//! Reachability probe feeding the connectivity monitor.

use std::time::Duration;

use reqwest::Client;
use tokio::task::JoinHandle;

use super::{Connectivity, ConnectivityMonitor};

/// Background task that probes the API host and reports reachability
///
/// Dropping the probe stops it.
pub struct ReachabilityProbe {
    task: JoinHandle<()>,
}

impl ReachabilityProbe {
    pub fn spawn(
        monitor: ConnectivityMonitor,
        url: impl Into<String>,
        interval: Duration,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let url = url.into();
        let client = Client::builder().timeout(timeout).build()?;

        let task = tokio::spawn(async move {
            loop {
                let state = probe_once(&client, &url).await;
                if monitor.report(state) {
                    tracing::info!("Network is now {}", state);
                }
                tokio::time::sleep(interval).await;
            }
        });

        Ok(Self { task })
    }

    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for ReachabilityProbe {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Any HTTP answer proves reachability; transport failures do not
pub async fn probe_once(client: &Client, url: &str) -> Connectivity {
    match client.head(url).send().await {
        Ok(_) => Connectivity::Connected,
        Err(error) => {
            tracing::debug!("Reachability probe failed: {}", error);
            Connectivity::Disconnected
        }
    }
}

/// One-shot probe for short-lived callers without a running monitor
pub async fn check_reachability(url: &str, timeout: Duration) -> Connectivity {
    match Client::builder().timeout(timeout).build() {
        Ok(client) => probe_once(&client, url).await,
        Err(error) => {
            tracing::warn!("Failed to build reachability client: {}", error);
            Connectivity::Unknown
        }
    }
}
