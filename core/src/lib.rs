//! hammer-core: Multi-worker transaction load generation engine
//!
//! This crate provides the engine shared by every hammer component,
//! including:
//!
//! - Run and file configuration (`RunConfig`, `FileConfig`)
//! - The ledger client seam (`LedgerClient`)
//! - The rate-controlled worker pool (`Worker`, `WorkerBuilder`)
//! - Run orchestration and throughput aggregation (`Orchestrator`)
//! - Error handling

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod account;
pub mod channel;
pub mod config;
pub mod directory;
pub mod error;
pub mod metrics;
pub mod orchestrator;
pub mod shutdown;
pub mod traits;
pub mod worker;

pub use account::*;
pub use channel::*;
pub use config::*;
pub use directory::*;
pub use error::*;
pub use metrics::*;
pub use orchestrator::{MetricsAggregator, Orchestrator, OrchestratorBuilder, ThroughputReport};
pub use shutdown::*;
pub use traits::*;
pub use worker::{RateTicker, StopReason, Worker, WorkerBuilder, WorkerStats};
