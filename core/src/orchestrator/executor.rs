//! Orchestrator execution logic

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::account::AccountId;
use crate::channel::ChannelConfig;
use crate::config::RunConfig;
use crate::directory::Directory;
use crate::error::{Error, Result, WorkerError, WorkerErrorKind};
use crate::metrics::{CompletionEvent, RunResult};
use crate::shutdown::Shutdown;
use crate::traits::LedgerClient;
use crate::worker::{WorkerBuilder, WorkerStats};

use super::aggregator::{finalize, MetricsAggregator};

/// Runs one load-generation run: spawns the worker pool, the metrics
/// aggregator, waits for every worker to join, and finalizes the
/// result exactly once.
///
/// The ledger client and directory are constructed before the pool and
/// shared read-only; all cross-task communication flows through the
/// completion and error channels.
pub struct Orchestrator {
    pub(crate) config: RunConfig,
    pub(crate) directory: Arc<Directory>,
    pub(crate) operator: AccountId,
    pub(crate) ledger: Arc<dyn LedgerClient>,
    pub(crate) channels: ChannelConfig,
    pub(crate) shutdown: Shutdown,
    pub(crate) fail_fast: bool,
}

impl Orchestrator {
    /// Get the run configuration.
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Get a handle to the shared shutdown scope.
    pub fn shutdown_handle(&self) -> Shutdown {
        self.shutdown.clone()
    }

    /// Run the pool to completion.
    ///
    /// Blocks until every worker has joined, then returns the
    /// finalized result. Worker failures do not make this method
    /// return an error; they are collected, ordered by worker id, in
    /// `RunResult::errors`.
    pub async fn run(&self) -> Result<RunResult> {
        let worker_count = self.config.worker_count;
        let (events_tx, events_rx) =
            mpsc::channel::<CompletionEvent>(self.channels.completion_capacity(worker_count));
        // Non-blocking producers: each worker reports at most one
        // error, so capacity == worker_count makes try_send infallible.
        let (errors_tx, mut errors_rx) = mpsc::channel::<WorkerError>(worker_count);

        let aggregator = tokio::spawn(MetricsAggregator::new(events_rx).run());

        tracing::info!(
            nodes = ?self.config.nodes,
            total_workers = worker_count,
            tps = self.config.rate_per_worker,
            total_tps = self.config.total_rate(),
            duration = ?self.config.duration,
            tx_type = %self.config.tx_kind,
            network = self.ledger.network_name(),
            "Starting transaction load generation"
        );

        let mut handles = Vec::with_capacity(worker_count);
        for worker_id in 0..worker_count {
            let worker = WorkerBuilder::new(worker_id)
                .nodes(self.config.nodes.clone())
                .directory(Arc::clone(&self.directory))
                .operator(self.operator)
                .tx_kind(self.config.tx_kind)
                .ledger(Arc::clone(&self.ledger))
                .events_tx(events_tx.clone())
                .errors_tx(errors_tx.clone())
                .shutdown(self.shutdown.clone())
                .rate(self.config.rate_per_worker)
                .duration(self.config.duration)
                .fail_fast(self.fail_fast)
                .build()?;

            // Subscribe before spawning so a trigger can never race
            // past a worker that has not started yet.
            let shutdown_rx = self.shutdown.subscribe();
            handles.push(tokio::spawn(worker.run(shutdown_rx)));
        }

        // The workers now hold the only senders; the completion channel
        // closes exactly when the last worker exits.
        drop(events_tx);
        drop(errors_tx);

        let mut workers: Vec<WorkerStats> = Vec::with_capacity(worker_count);
        let mut errors: Vec<WorkerError> = Vec::new();
        for (worker_id, handle) in handles.into_iter().enumerate() {
            match handle.await {
                Ok(stats) => {
                    tracing::debug!(
                        worker_id,
                        completed = stats.completed,
                        errors = stats.errors,
                        reason = ?stats.stop_reason,
                        "Worker joined"
                    );
                    workers.push(stats);
                }
                Err(e) => {
                    // A panicked worker never reaches report_failure;
                    // record the failure here so the run cannot end
                    // clean with a dead worker.
                    tracing::error!(worker_id, error = %e, "Worker task panicked");
                    errors.push(WorkerError::new(
                        worker_id,
                        WorkerErrorKind::Panicked(e.to_string()),
                    ));
                }
            }
        }

        let report = aggregator
            .await
            .map_err(|e| Error::Aggregator(e.to_string()))?;

        while let Ok(err) = errors_rx.try_recv() {
            errors.push(err);
        }

        let result = finalize(report, workers, errors);
        tracing::info!(
            total_tx = result.total_items,
            total_time_sec = result.total_elapsed.as_secs_f64(),
            tps = result.throughput,
            failed_workers = result.errors.len(),
            "All transaction workers completed"
        );
        Ok(result)
    }

    /// Run with Ctrl+C handling: an interrupt triggers the shared
    /// shutdown scope and the run finalizes normally.
    pub async fn run_with_signal_handling(&self) -> Result<RunResult> {
        let shutdown = self.shutdown.clone();

        let signal_handle = tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::info!("Received exit signal, stopping workers");
                    shutdown.trigger();
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to listen for exit signal");
                }
            }
        });

        let result = self.run().await;
        signal_handle.abort();
        result
    }

    /// Run with a hard timeout shared by all workers, the single
    /// shared deadline alternative to per-worker duration timers.
    pub async fn run_with_timeout(&self, timeout: Duration) -> Result<RunResult> {
        let shutdown = self.shutdown.clone();

        let timeout_handle = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            tracing::info!(timeout = ?timeout, "Run timeout reached, stopping workers");
            shutdown.trigger();
        });

        let result = self.run().await;
        timeout_handle.abort();
        result
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("config", &self.config)
            .field("network", &self.ledger.network_name())
            .field("fail_fast", &self.fail_fast)
            .finish()
    }
}
