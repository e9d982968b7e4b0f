//! Builder pattern for Worker construction

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::account::AccountId;
use crate::config::{TxKind, MAX_RATE_PER_WORKER};
use crate::directory::Directory;
use crate::error::{ConfigError, Error, Result, WorkerError};
use crate::metrics::CompletionEvent;
use crate::shutdown::Shutdown;
use crate::traits::LedgerClient;

use super::executor::Worker;
use super::producer::WorkItemProducer;

/// Builder for creating `Worker` instances with validation.
///
/// # Example
/// ```ignore
/// let worker = WorkerBuilder::new(0)
///     .nodes(vec!["node1".into()])
///     .directory(directory)
///     .operator(operator)
///     .ledger(client)
///     .events_tx(events_tx)
///     .errors_tx(errors_tx)
///     .shutdown(shutdown)
///     .rate(10)
///     .duration(Duration::from_secs(60))
///     .build()?;
/// ```
pub struct WorkerBuilder {
    id: usize,
    nodes: Option<Vec<String>>,
    directory: Option<Arc<Directory>>,
    operator: Option<AccountId>,
    tx_kind: TxKind,
    ledger: Option<Arc<dyn LedgerClient>>,
    events_tx: Option<mpsc::Sender<CompletionEvent>>,
    errors_tx: Option<mpsc::Sender<WorkerError>>,
    shutdown: Option<Shutdown>,
    rate: Option<u32>,
    duration: Option<Duration>,
    fail_fast: bool,
}

impl WorkerBuilder {
    /// Create a new builder for the given worker id.
    pub fn new(id: usize) -> Self {
        Self {
            id,
            nodes: None,
            directory: None,
            operator: None,
            tx_kind: TxKind::CryptoTransfer,
            ledger: None,
            events_tx: None,
            errors_tx: None,
            shutdown: None,
            rate: None,
            duration: None,
            fail_fast: true,
        }
    }

    /// Set the node names this worker spreads transfers across.
    pub fn nodes(mut self, nodes: Vec<String>) -> Self {
        self.nodes = Some(nodes);
        self
    }

    /// Set the endpoint directory.
    pub fn directory(mut self, directory: Arc<Directory>) -> Self {
        self.directory = Some(directory);
        self
    }

    /// Set the operator account transfers are debited from.
    pub fn operator(mut self, operator: AccountId) -> Self {
        self.operator = Some(operator);
        self
    }

    /// Set the transaction kind (defaults to crypto transfer).
    pub fn tx_kind(mut self, kind: TxKind) -> Self {
        self.tx_kind = kind;
        self
    }

    /// Set the ledger client.
    pub fn ledger(mut self, ledger: Arc<dyn LedgerClient>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    /// Set the completion-event sender.
    pub fn events_tx(mut self, tx: mpsc::Sender<CompletionEvent>) -> Self {
        self.events_tx = Some(tx);
        self
    }

    /// Set the worker-error sender.
    pub fn errors_tx(mut self, tx: mpsc::Sender<WorkerError>) -> Self {
        self.errors_tx = Some(tx);
        self
    }

    /// Set the shared shutdown scope.
    pub fn shutdown(mut self, shutdown: Shutdown) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Set the per-second tick rate.
    pub fn rate(mut self, rate: u32) -> Self {
        self.rate = Some(rate);
        self
    }

    /// Set how long the worker runs.
    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Whether a failure in this worker cancels its peers
    /// (defaults to true).
    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Build the worker.
    ///
    /// # Errors
    /// Returns an error if any required field is missing or the rate
    /// is zero or beyond the timer's resolution.
    pub fn build(self) -> Result<Worker> {
        let nodes = self.nodes.ok_or(Error::MissingField("nodes"))?;
        let directory = self.directory.ok_or(Error::MissingField("directory"))?;
        let operator = self.operator.ok_or(Error::MissingField("operator"))?;
        let ledger = self.ledger.ok_or(Error::MissingField("ledger"))?;
        let events_tx = self.events_tx.ok_or(Error::MissingField("events_tx"))?;
        let errors_tx = self.errors_tx.ok_or(Error::MissingField("errors_tx"))?;
        let shutdown = self.shutdown.ok_or(Error::MissingField("shutdown"))?;
        let duration = self.duration.ok_or(Error::MissingField("duration"))?;
        let rate = self.rate.ok_or(Error::MissingField("rate"))?;
        if rate > MAX_RATE_PER_WORKER {
            return Err(Error::Config(ConfigError::RateTooHigh));
        }
        let rate = NonZeroU32::new(rate).ok_or(Error::Config(ConfigError::InvalidRate))?;

        if nodes.is_empty() {
            return Err(Error::Config(ConfigError::NoNodes));
        }

        let producer = WorkItemProducer::new(nodes, directory, operator, self.tx_kind);

        Ok(Worker::new(
            self.id,
            producer,
            ledger,
            events_tx,
            errors_tx,
            shutdown,
            rate,
            duration,
            self.fail_fast,
        ))
    }
}
