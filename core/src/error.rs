//! Error types for hammer-core

use thiserror::Error;

use crate::traits::LedgerError;

/// Errors detected while loading or validating configuration.
///
/// All of these are fatal before any worker starts; a partial run never
/// happens on a configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Worker count was zero.
    #[error("worker count must be at least 1")]
    InvalidWorkerCount,

    /// Per-worker rate was zero.
    #[error("rate must be at least 1 transaction per second")]
    InvalidRate,

    /// Per-worker rate exceeded what the tick timer can express.
    #[error(
        "rate must not exceed {} transactions per second",
        crate::config::MAX_RATE_PER_WORKER
    )]
    RateTooHigh,

    /// Run duration was zero.
    #[error("duration must be positive")]
    InvalidDuration,

    /// No node names were configured for the run.
    #[error("no nodes provided")]
    NoNodes,

    /// A configured node name has no entry in the directory.
    #[error("node {0} not found in config")]
    UnknownNode(String),

    /// An account id string did not parse.
    #[error("invalid account id {value}: {reason}")]
    InvalidAccount {
        /// The offending account id string.
        value: String,
        /// Why it failed to parse.
        reason: String,
    },

    /// The operator account is missing from config and environment.
    #[error("operator account is not configured")]
    MissingOperatorAccount,

    /// The operator key is missing from config and environment.
    #[error("operator key is not configured")]
    MissingOperatorKey,

    /// The requested transaction type is not supported.
    #[error("unsupported transaction type: {0}")]
    UnsupportedTxType(String),

    /// The config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// Path that was attempted.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The config file could not be parsed as YAML.
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        /// Path that was attempted.
        path: String,
        /// Underlying YAML error.
        #[source]
        source: serde_yaml::Error,
    },
}

/// The ways a single worker can fail.
///
/// Every kind is fatal to the worker that hit it and is never
/// retried; the only recovery path is a fresh run.
#[derive(Debug, Error)]
pub enum WorkerErrorKind {
    /// The chosen node name could not be resolved.
    #[error("node {0} not found in directory")]
    EndpointNotFound(String),

    /// The ledger client rejected or failed the transfer.
    #[error("failed to send transaction: {0}")]
    Transfer(#[from] LedgerError),

    /// The worker task panicked instead of returning its stats.
    #[error("worker task panicked: {0}")]
    Panicked(String),
}

/// A failure reported by one worker, tagged with its identifier.
#[derive(Debug, Error)]
#[error("worker {worker_id}: {kind}")]
pub struct WorkerError {
    /// Identifier of the worker that failed.
    pub worker_id: usize,
    /// What went wrong.
    pub kind: WorkerErrorKind,
}

impl WorkerError {
    /// Tag a failure with the worker that reported it.
    pub fn new(worker_id: usize, kind: WorkerErrorKind) -> Self {
        Self { worker_id, kind }
    }
}

/// Composite error carrying every worker failure from one run,
/// ordered by worker id.
#[derive(Debug)]
pub struct AggregateRunError {
    /// The individual worker failures.
    pub errors: Vec<WorkerError>,
}

impl std::fmt::Display for AggregateRunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} worker(s) failed:", self.errors.len())?;
        for err in &self.errors {
            write!(f, " [{err}]")?;
        }
        Ok(())
    }
}

impl std::error::Error for AggregateRunError {}

/// Core error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A builder was finalized without a required field.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// One or more workers failed during a run.
    #[error(transparent)]
    Run(#[from] AggregateRunError),

    /// The metrics aggregator task did not complete.
    #[error("metrics aggregator task failed: {0}")]
    Aggregator(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
