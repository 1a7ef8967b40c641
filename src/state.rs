//! Observable state published by the service layer.
//!
//! `StateHub` holds one versioned [`Snapshot`]. Every publish bumps the
//! version and wakes all subscribers; a subscriber that falls behind only
//! ever sees the latest snapshot.

use std::sync::Arc;

use tokio::sync::watch;

use crate::task::{pending, Task};

/// What observers see: loading flag, last-known task list and a one-shot
/// status message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub version: u64,
    pub loading: bool,
    pub tasks: Arc<Vec<Task>>,
    pub status_message: Option<String>,
}

impl Snapshot {
    pub fn pending(&self) -> Vec<&Task> {
        pending(&self.tasks)
    }
}

#[derive(Debug, Clone)]
pub struct StateHub {
    tx: Arc<watch::Sender<Snapshot>>,
}

impl Default for StateHub {
    fn default() -> Self {
        Self::new()
    }
}

impl StateHub {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Snapshot::default());
        StateHub { tx: Arc::new(tx) }
    }

    /// Current state.
    pub fn snapshot(&self) -> Snapshot {
        self.tx.borrow().clone()
    }

    /// Apply `f` to the state and notify subscribers. Returns the new version.
    pub fn publish(&self, f: impl FnOnce(&mut Snapshot)) -> u64 {
        let mut version = 0;
        self.tx.send_modify(|state| {
            f(state);
            state.version += 1;
            version = state.version;
        });
        version
    }

    /// Clear the status message without notifying anyone; returns what was there.
    pub fn take_status_message(&self) -> Option<String> {
        let mut taken = None;
        self.tx.send_if_modified(|state| {
            taken = state.status_message.take();
            false
        });
        taken
    }

    pub fn subscribe(&self) -> Subscription {
        Subscription {
            rx: self.tx.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// A live view of the hub. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    rx: watch::Receiver<Snapshot>,
}

impl Subscription {
    /// Wait for a publish newer than the last one seen, then return it.
    ///
    /// Returns `None` once the hub is gone.
    pub async fn changed(&mut self) -> Option<Snapshot> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Latest snapshot, marking it as seen.
    pub fn latest(&mut self) -> Snapshot {
        self.rx.borrow_and_update().clone()
    }

    pub fn unsubscribe(self) {}
}
