//! Completion events, running throughput, and the final run result

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::Instant;

use crate::error::{AggregateRunError, WorkerError};
use crate::worker::WorkerStats;

/// Emitted by a worker for every successfully executed work item and
/// consumed only by the metrics aggregator. Lives for a single
/// channel hop.
#[derive(Debug, Clone)]
pub struct CompletionEvent {
    /// Number of items this event accounts for, normally 1.
    pub amount: u64,
    /// When the item completed.
    pub timestamp: DateTime<Utc>,
}

impl CompletionEvent {
    /// An event accounting for exactly one item, stamped now.
    pub fn single() -> Self {
        Self {
            amount: 1,
            timestamp: Utc::now(),
        }
    }
}

/// Running totals for one run. Sole owner and sole mutator is the
/// metrics aggregator task.
#[derive(Debug)]
pub struct ThroughputTracker {
    started: Instant,
    total: u64,
}

impl ThroughputTracker {
    /// Start tracking from now.
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            total: 0,
        }
    }

    /// Fold one completion event into the totals.
    pub fn record(&mut self, event: &CompletionEvent) {
        self.total += event.amount;
    }

    /// Total completed items so far. Monotonically non-decreasing.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Time since tracking started.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Current throughput, rounded to whole items per second.
    pub fn throughput(&self) -> f64 {
        Self::rate(self.total, self.elapsed())
    }

    /// Rounded items-per-second for a given total and elapsed time.
    pub fn rate(total: u64, elapsed: Duration) -> f64 {
        let secs = elapsed.as_secs_f64();
        if secs > 0.0 {
            (total as f64 / secs).round()
        } else {
            0.0
        }
    }
}

impl Default for ThroughputTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// The aggregate outcome of one run. Starts zeroed, built
/// incrementally, finalized exactly once after all workers join.
#[derive(Debug)]
pub struct RunResult {
    /// Total completed items across all workers.
    pub total_items: u64,
    /// Wall time covered by the run.
    pub total_elapsed: Duration,
    /// Rounded items per second over the whole run.
    pub throughput: f64,
    /// Per-worker statistics, ordered by worker id.
    pub workers: Vec<WorkerStats>,
    /// Worker failures, ordered by worker id. Empty on a clean run.
    pub errors: Vec<WorkerError>,
}

impl RunResult {
    /// Whether every worker completed without error.
    pub fn succeeded(&self) -> bool {
        self.errors.is_empty()
    }

    /// Convert the failure list into an aggregate error, if any.
    pub fn into_aggregate_error(self) -> Option<AggregateRunError> {
        if self.errors.is_empty() {
            None
        } else {
            Some(AggregateRunError {
                errors: self.errors,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_event_accounts_for_one_item() {
        let event = CompletionEvent::single();
        assert_eq!(event.amount, 1);
    }

    #[test]
    fn tracker_sums_event_amounts() {
        let mut tracker = ThroughputTracker::new();
        tracker.record(&CompletionEvent::single());
        tracker.record(&CompletionEvent::single());
        tracker.record(&CompletionEvent {
            amount: 3,
            timestamp: Utc::now(),
        });
        assert_eq!(tracker.total(), 5);
    }

    #[test]
    fn rate_rounds_to_whole_items() {
        assert_eq!(ThroughputTracker::rate(10, Duration::from_secs(4)), 3.0);
        assert_eq!(ThroughputTracker::rate(9, Duration::from_secs(4)), 2.0);
        assert_eq!(ThroughputTracker::rate(0, Duration::from_secs(1)), 0.0);
    }

    #[test]
    fn rate_with_zero_elapsed_is_zero() {
        assert_eq!(ThroughputTracker::rate(100, Duration::ZERO), 0.0);
    }

    #[test]
    fn clean_result_has_no_aggregate_error() {
        let result = RunResult {
            total_items: 10,
            total_elapsed: Duration::from_secs(1),
            throughput: 10.0,
            workers: Vec::new(),
            errors: Vec::new(),
        };
        assert!(result.succeeded());
        assert!(result.into_aggregate_error().is_none());
    }
}
