//! Run orchestration
//!
//! The orchestrator owns one run end to end. It validates the
//! configuration, resolves every node name before anything is spawned,
//! starts the worker pool and the metrics aggregator, and finalizes
//! the result exactly once after every worker joins. Cancellation,
//! whether from a signal, a timeout, or a failing worker, flows
//! through the single shared [`crate::shutdown::Shutdown`] scope.

mod aggregator;
mod builder;
mod executor;

pub use aggregator::{MetricsAggregator, ThroughputReport};
pub use builder::OrchestratorBuilder;
pub use executor::Orchestrator;

#[cfg(test)]
mod tests;
