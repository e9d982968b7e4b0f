//! The per-worker execution unit
//!
//! Each worker is one tokio task driving the loop
//! **tick -> pick target -> transfer -> report -> repeat** at a fixed
//! rate until its duration expires, the shared cancellation scope
//! fires, or a transfer fails. Workers coordinate with the rest of a
//! run only through channels; their counters are exclusively owned.

mod builder;
mod executor;
mod producer;
mod stats;
mod ticker;

pub use builder::WorkerBuilder;
pub use executor::Worker;
pub use producer::{WorkItemProducer, TRANSFER_AMOUNT};
pub use stats::{StopReason, WorkerStats};
pub use ticker::RateTicker;
