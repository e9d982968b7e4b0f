//! hammer-ledger: HTTP gateway implementation of the ledger client
//!
//! Provides [`GatewayClient`], the production `LedgerClient` used by
//! the hammer CLI. The engine in `hammer-core` only sees the trait.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod client;

pub use client::{GatewayClient, DEFAULT_REQUEST_TIMEOUT};
