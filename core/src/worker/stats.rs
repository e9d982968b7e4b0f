//! Per-worker statistics

use std::time::{Duration, Instant};

/// Why a worker's loop returned. All variants are terminal; exactly
/// one fires per worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The per-worker duration timer expired.
    DurationElapsed,
    /// The shared cancellation scope fired.
    Cancelled,
    /// The worker hit a fatal error (already reported separately).
    Failed,
}

/// State owned exclusively by one worker; never mutated externally.
#[derive(Debug, Clone)]
pub struct WorkerStats {
    /// Worker identifier, 0..worker_count.
    pub worker_id: usize,
    /// Successfully completed items. Monotonically increasing.
    pub completed: u64,
    /// Failed items (at most 1, failures are fatal).
    pub errors: u64,
    /// When the loop started.
    pub started_at: Option<Instant>,
    /// When the loop returned.
    pub ended_at: Option<Instant>,
    /// Terminal state, set exactly once.
    pub stop_reason: Option<StopReason>,
}

impl WorkerStats {
    /// Fresh stats for a worker.
    pub fn new(worker_id: usize) -> Self {
        Self {
            worker_id,
            completed: 0,
            errors: 0,
            started_at: None,
            ended_at: None,
            stop_reason: None,
        }
    }

    /// Record the loop start.
    pub fn start(&mut self) {
        self.started_at = Some(Instant::now());
    }

    /// Record the terminal transition.
    pub fn finish(&mut self, reason: StopReason) {
        self.ended_at = Some(Instant::now());
        self.stop_reason = Some(reason);
    }

    /// Count one completed item.
    pub fn record_success(&mut self) {
        self.completed += 1;
    }

    /// Count one failed item.
    pub fn record_error(&mut self) {
        self.errors += 1;
    }

    /// Time the loop has been (or was) running.
    pub fn elapsed(&self) -> Option<Duration> {
        self.started_at.map(|start| {
            self.ended_at
                .map(|end| end.duration_since(start))
                .unwrap_or_else(|| start.elapsed())
        })
    }

    /// Completed items per second over the worker's lifetime.
    pub fn items_per_second(&self) -> f64 {
        match self.elapsed() {
            Some(elapsed) if elapsed.as_secs_f64() > 0.0 => {
                self.completed as f64 / elapsed.as_secs_f64()
            }
            _ => 0.0,
        }
    }
}
