//! Worker execution loop

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};

use crate::error::{WorkerError, WorkerErrorKind};
use crate::metrics::CompletionEvent;
use crate::shutdown::Shutdown;
use crate::traits::LedgerClient;

use super::producer::WorkItemProducer;
use super::stats::{StopReason, WorkerStats};
use super::ticker::RateTicker;

/// A worker drives one rate-limited stream of work items:
/// tick -> produce -> transfer -> report, until its duration expires,
/// the shared scope is cancelled, or a transfer fails.
///
/// Workers own their counters exclusively and share only the shutdown
/// scope, the completion channel, and the error channel with the rest
/// of the run. At most one item is in flight at a time: the ledger
/// call is awaited inside the tick arm, never raced against the next
/// tick.
pub struct Worker {
    id: usize,
    producer: WorkItemProducer,
    ledger: Arc<dyn LedgerClient>,
    events_tx: mpsc::Sender<CompletionEvent>,
    errors_tx: mpsc::Sender<WorkerError>,
    shutdown: Shutdown,
    rate: NonZeroU32,
    duration: Duration,
    fail_fast: bool,
}

impl Worker {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: usize,
        producer: WorkItemProducer,
        ledger: Arc<dyn LedgerClient>,
        events_tx: mpsc::Sender<CompletionEvent>,
        errors_tx: mpsc::Sender<WorkerError>,
        shutdown: Shutdown,
        rate: NonZeroU32,
        duration: Duration,
        fail_fast: bool,
    ) -> Self {
        Self {
            id,
            producer,
            ledger,
            events_tx,
            errors_tx,
            shutdown,
            rate,
            duration,
            fail_fast,
        }
    }

    /// Get the worker id.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Run the worker loop until a terminal transition fires.
    ///
    /// Every wait simultaneously observes cancellation, duration
    /// expiry, and the next tick, so the worker never blocks past the
    /// smaller of its remaining duration and cancellation delivery.
    pub async fn run(self, mut shutdown_rx: broadcast::Receiver<()>) -> WorkerStats {
        let mut stats = WorkerStats::new(self.id);
        stats.start();

        let mut ticker = RateTicker::new(self.rate);
        let deadline = tokio::time::sleep(self.duration);
        tokio::pin!(deadline);

        tracing::debug!(
            worker_id = self.id,
            rate = self.rate.get(),
            interval = %humanized(ticker.period()),
            duration = ?self.duration,
            "Worker started"
        );

        let reason = loop {
            tokio::select! {
                biased;

                _ = shutdown_rx.recv() => {
                    tracing::debug!(worker_id = self.id, "Worker observed cancellation");
                    break StopReason::Cancelled;
                }

                _ = &mut deadline => {
                    tracing::debug!(worker_id = self.id, "Worker duration elapsed");
                    break StopReason::DurationElapsed;
                }

                _ = ticker.tick() => {
                    match self.execute_one(&mut stats).await {
                        Ok(true) => {}
                        // Completion channel closed: the run is tearing
                        // down, treat like cancellation.
                        Ok(false) => break StopReason::Cancelled,
                        Err(kind) => {
                            stats.record_error();
                            self.report_failure(kind);
                            break StopReason::Failed;
                        }
                    }
                }
            }
        };

        stats.finish(reason);
        tracing::debug!(
            worker_id = self.id,
            completed = stats.completed,
            errors = stats.errors,
            reason = ?reason,
            "Worker finished"
        );
        stats
    }

    /// Execute one work item. Returns `Ok(false)` when the completion
    /// channel has closed.
    async fn execute_one(&self, stats: &mut WorkerStats) -> Result<bool, WorkerErrorKind> {
        let request = self.producer.next_request(self.id)?;

        tracing::debug!(
            worker_id = self.id,
            node = %request.node_name,
            from = %request.from,
            to = %request.to,
            amount = request.amount,
            tx_total = stats.completed,
            trace_id = %request.trace_id,
            "Submitting crypto transfer"
        );

        let receipt = self
            .ledger
            .transfer(&request)
            .await
            .map_err(WorkerErrorKind::Transfer)?;

        stats.record_success();
        tracing::debug!(
            worker_id = self.id,
            transaction_id = %receipt.transaction_id,
            status = %receipt.status,
            trace_id = %request.trace_id,
            "Transfer receipt received"
        );

        // Fire and forget: the send is never re-checked after a
        // cancellation, and a closed channel is handled by the caller.
        Ok(self.events_tx.send(CompletionEvent::single()).await.is_ok())
    }

    fn report_failure(&self, kind: WorkerErrorKind) {
        tracing::error!(worker_id = self.id, error = %kind, "Worker failed");
        // Capacity equals the worker count and each worker reports at
        // most once, so this cannot block or drop.
        let _ = self.errors_tx.try_send(WorkerError::new(self.id, kind));
        if self.fail_fast {
            self.shutdown.trigger();
        }
    }
}

fn humanized(period: Duration) -> String {
    format!("{}ms", period.as_millis())
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("id", &self.id)
            .field("network", &self.ledger.network_name())
            .field("rate", &self.rate)
            .field("duration", &self.duration)
            .field("fail_fast", &self.fail_fast)
            .finish()
    }
}
