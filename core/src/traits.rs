//! The ledger client seam
//!
//! The trait is defined in core so the engine can be exercised with
//! mock clients; the production implementation lives in the
//! `hammer-ledger` crate.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::account::AccountId;

/// One unit of work: a crypto transfer aimed at a specific node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    /// Debited account (the operator).
    pub from: AccountId,
    /// Credited account (the target node's account).
    pub to: AccountId,
    /// Name of the node the transfer is routed through.
    pub node_name: String,
    /// Network address of that node.
    pub node_address: String,
    /// Transfer amount, in whole units.
    pub amount: u64,
    /// Transaction memo, names the submitting worker.
    pub memo: String,
    /// Trace id threaded through logs on both sides.
    pub trace_id: String,
}

/// Proof that a transfer was executed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferReceipt {
    /// Ledger-assigned transaction id.
    pub transaction_id: String,
    /// Final consensus status, e.g. `SUCCESS`.
    pub status: String,
}

/// Errors surfaced by a ledger client.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// HTTP/network error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The node rejected the submission.
    #[error("transfer rejected: {status} - {message}")]
    Rejected {
        /// HTTP status code returned by the node.
        status: u16,
        /// Error message returned by the node.
        message: String,
    },

    /// The transfer was submitted but its receipt reports failure.
    #[error("receipt error: {0}")]
    Receipt(String),

    /// Request timed out.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Client-side configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Executes one unit of work against the remote ledger.
///
/// Constructed once, single-threaded, strictly before the worker pool
/// is spawned; shared read-only via `Arc` afterwards. One call per
/// tick per worker, no pipelining.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Network identifier, for logs.
    fn network_name(&self) -> &str;

    /// Execute a transfer and wait for its receipt.
    async fn transfer(&self, request: &TransferRequest) -> Result<TransferReceipt, LedgerError>;
}
