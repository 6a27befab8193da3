//! Relay-wide mutual exclusion.

use tokio::sync::{Mutex, MutexGuard};

/// Serializes every registry mutation together with the broadcast it causes.
///
/// Holding the guard across "mutate, then fan out" gives every connection the
/// same total order of emitted events, and keeps live-set changes from
/// interleaving with an in-progress broadcast.
#[derive(Debug, Default)]
pub struct EventSequencer {
    lock: Mutex<()>,
}

impl EventSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn enter(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().await
    }
}
