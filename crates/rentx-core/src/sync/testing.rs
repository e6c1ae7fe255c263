//! Scriptable gateway for sync tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;

use crate::models::{Car, ChangeSet, Checkpoint, PullResponse, TableChanges, User};
use crate::remote::{GatewayError, GatewayResult, RemoteGateway};

/// Gateway returning queued pull results and recording pushes
///
/// With no pull queued it answers with an empty change set at the
/// requested checkpoint.
#[derive(Default)]
pub struct FakeGateway {
    pulls: Mutex<VecDeque<GatewayResult<PullResponse>>>,
    seen_checkpoints: Mutex<Vec<Checkpoint>>,
    pushed: Mutex<Vec<TableChanges<User>>>,
    failing_pushes: AtomicUsize,
    push_calls: AtomicUsize,
    details: Mutex<Vec<Car>>,
    detail_calls: AtomicUsize,
    gate: Option<PullGate>,
}

/// Holds pulls until released
#[derive(Clone, Default)]
pub struct PullGate {
    pub entered: Arc<Notify>,
    pub release: Arc<Notify>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gated(gate: PullGate) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    pub fn queue_pull(&self, changes: ChangeSet, latest_version: i64) {
        self.pulls.lock().unwrap().push_back(Ok(PullResponse {
            changes,
            latest_version,
        }));
    }

    pub fn queue_pull_timeout(&self) {
        self.pulls.lock().unwrap().push_back(Err(GatewayError::Status {
            status: 504,
            message: "Gateway Timeout".to_string(),
        }));
    }

    pub fn fail_next_pushes(&self, count: usize) {
        self.failing_pushes.store(count, Ordering::SeqCst);
    }

    pub fn add_detail(&self, car: Car) {
        self.details.lock().unwrap().push(car);
    }

    pub fn pull_calls(&self) -> usize {
        self.seen_checkpoints.lock().unwrap().len()
    }

    pub fn seen_checkpoints(&self) -> Vec<Checkpoint> {
        self.seen_checkpoints.lock().unwrap().clone()
    }

    pub fn push_calls(&self) -> usize {
        self.push_calls.load(Ordering::SeqCst)
    }

    pub fn pushed(&self) -> Vec<TableChanges<User>> {
        self.pushed.lock().unwrap().clone()
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }
}

impl RemoteGateway for FakeGateway {
    async fn pull(&self, checkpoint: Checkpoint) -> GatewayResult<PullResponse> {
        self.seen_checkpoints.lock().unwrap().push(checkpoint);

        if let Some(gate) = &self.gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }

        let next = self.pulls.lock().unwrap().pop_front();
        next.unwrap_or_else(|| {
            Ok(PullResponse {
                changes: ChangeSet::default(),
                latest_version: checkpoint.version(),
            })
        })
    }

    async fn push(&self, users: &TableChanges<User>) -> GatewayResult<()> {
        self.push_calls.fetch_add(1, Ordering::SeqCst);

        let failing = self.failing_pushes.load(Ordering::SeqCst);
        if failing > 0 {
            self.failing_pushes.store(failing - 1, Ordering::SeqCst);
            return Err(GatewayError::Status {
                status: 503,
                message: "Service Unavailable".to_string(),
            });
        }

        self.pushed.lock().unwrap().push(users.clone());
        Ok(())
    }

    async fn fetch_detail(&self, car_id: &str) -> GatewayResult<Car> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);

        let found = self
            .details
            .lock()
            .unwrap()
            .iter()
            .find(|car| car.id == car_id)
            .cloned();
        found.ok_or_else(|| GatewayError::Status {
            status: 404,
            message: format!("Car {car_id} not found"),
        })
    }
}
