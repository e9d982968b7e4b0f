//! Metrics aggregation task and run finalization

use std::time::Duration;

use tokio::sync::mpsc;

use crate::error::WorkerError;
use crate::metrics::{CompletionEvent, RunResult, ThroughputTracker};
use crate::worker::WorkerStats;

/// Final totals reported by the aggregator task.
#[derive(Debug, Clone, Copy)]
pub struct ThroughputReport {
    /// Total completed items across all workers.
    pub total_items: u64,
    /// Time from aggregator start until the completion channel closed.
    pub elapsed: Duration,
    /// Rounded items per second over that window.
    pub throughput: f64,
}

/// Consumes completion events and keeps the run's running totals.
///
/// Sole owner and sole mutator of the totals. The loop drains the
/// channel until it closes; since every worker observes the shared
/// cancellation scope and drops its sender on exit, closure is
/// equivalent to "all workers joined" and no event is ever dropped or
/// double-counted, cancelled runs included.
#[derive(Debug)]
pub struct MetricsAggregator {
    events_rx: mpsc::Receiver<CompletionEvent>,
}

impl MetricsAggregator {
    /// Create an aggregator over the completion channel.
    pub fn new(events_rx: mpsc::Receiver<CompletionEvent>) -> Self {
        Self { events_rx }
    }

    /// Run until the completion channel closes, then report.
    pub async fn run(mut self) -> ThroughputReport {
        let mut tracker = ThroughputTracker::new();

        while let Some(event) = self.events_rx.recv().await {
            tracker.record(&event);
            tracing::debug!(
                total_tx = tracker.total(),
                total_time_sec = tracker.elapsed().as_secs_f64(),
                tps = tracker.throughput(),
                "Received a transaction receipt"
            );
        }

        ThroughputReport {
            total_items: tracker.total(),
            elapsed: tracker.elapsed(),
            throughput: tracker.throughput(),
        }
    }
}

/// Assemble the final result from the aggregator report, the joined
/// worker stats, and the drained error list.
pub(crate) fn finalize(
    report: ThroughputReport,
    mut workers: Vec<WorkerStats>,
    mut errors: Vec<WorkerError>,
) -> RunResult {
    workers.sort_by_key(|s| s.worker_id);
    errors.sort_by_key(|e| e.worker_id);
    RunResult {
        total_items: report.total_items,
        total_elapsed: report.elapsed,
        throughput: report.throughput,
        workers,
        errors,
    }
}

#[cfg(test)]
mod aggregator_tests {
    use super::*;

    #[tokio::test]
    async fn aggregator_counts_until_channel_closes() {
        let (tx, rx) = mpsc::channel(8);
        let handle = tokio::spawn(MetricsAggregator::new(rx).run());

        for _ in 0..5 {
            tx.send(CompletionEvent::single()).await.unwrap();
        }
        drop(tx);

        let report = handle.await.unwrap();
        assert_eq!(report.total_items, 5);
    }

    #[tokio::test]
    async fn aggregator_drains_buffered_events_after_senders_drop() {
        let (tx, rx) = mpsc::channel(16);
        for _ in 0..10 {
            tx.send(CompletionEvent::single()).await.unwrap();
        }
        drop(tx);

        // Events buffered before the aggregator even starts still count.
        let report = MetricsAggregator::new(rx).run().await;
        assert_eq!(report.total_items, 10);
    }
}
