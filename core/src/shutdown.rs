//! Cooperative shutdown coordination
//!
//! One scope is shared by the orchestrator, every worker, the signal
//! task, and the timeout task. Triggering is idempotent; receivers
//! must be subscribed before the pool is spawned so a trigger can
//! never race past them.

use tokio::sync::broadcast;

/// Handle to the shared cancellation scope.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    /// Create a fresh scope.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Trigger cancellation. Safe to call any number of times, from
    /// any task; later calls are no-ops as far as observers are
    /// concerned.
    pub fn trigger(&self) {
        // Send fails only when there are no subscribers, which just
        // means everyone already stopped.
        let _ = self.tx.send(());
    }

    /// Subscribe to the scope. Only signals sent after subscription
    /// are observed, so subscribe before handing work to a task.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
