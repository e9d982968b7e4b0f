//! Integration tests for the Orchestrator module

use super::*;
use crate::account::AccountId;
use crate::config::RunConfig;
use crate::directory::{Directory, Endpoint};
use crate::error::{ConfigError, Error, WorkerErrorKind};
use crate::shutdown::Shutdown;
use crate::traits::{LedgerClient, LedgerError, TransferReceipt, TransferRequest};
use crate::worker::StopReason;

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Mock LedgerClient
// ============================================================================

struct MockLedgerClient {
    transfers: AtomicU64,
    fail_for_node: Option<String>,
    panic_on_transfer: bool,
}

impl MockLedgerClient {
    fn new() -> Self {
        Self {
            transfers: AtomicU64::new(0),
            fail_for_node: None,
            panic_on_transfer: false,
        }
    }

    /// Fail every transfer aimed at the given node name.
    fn failing_for_node(node: &str) -> Self {
        Self {
            fail_for_node: Some(node.to_string()),
            ..Self::new()
        }
    }

    /// Panic on every transfer, killing the calling worker task.
    fn panicking() -> Self {
        Self {
            panic_on_transfer: true,
            ..Self::new()
        }
    }

    fn transfers(&self) -> u64 {
        self.transfers.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LedgerClient for MockLedgerClient {
    fn network_name(&self) -> &str {
        "local"
    }

    async fn transfer(&self, request: &TransferRequest) -> Result<TransferReceipt, LedgerError> {
        if self.panic_on_transfer {
            panic!("ledger client poisoned");
        }
        if let Some(bad) = &self.fail_for_node {
            if request.node_name == *bad {
                return Err(LedgerError::Rejected {
                    status: 503,
                    message: format!("{bad} unavailable"),
                });
            }
        }
        let n = self.transfers.fetch_add(1, Ordering::SeqCst);
        Ok(TransferReceipt {
            transaction_id: format!("{}@{}", request.from, n),
            status: "SUCCESS".to_string(),
        })
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn test_directory() -> Arc<Directory> {
    Arc::new(Directory::from_endpoints([
        Endpoint {
            name: "node1".into(),
            address: "10.0.0.1:50211".into(),
            account: AccountId::new(0, 0, 3),
        },
        Endpoint {
            name: "node2".into(),
            address: "10.0.0.2:50211".into(),
            account: AccountId::new(0, 0, 4),
        },
    ]))
}

fn build_orchestrator(
    config: RunConfig,
    ledger: Arc<dyn LedgerClient>,
) -> crate::error::Result<Orchestrator> {
    OrchestratorBuilder::new(config)
        .directory(test_directory())
        .operator(AccountId::new(0, 0, 2))
        .ledger(ledger)
        .build()
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test(start_paused = true)]
async fn pool_throughput_scales_with_worker_count() {
    let ledger = Arc::new(MockLedgerClient::new());
    let config = RunConfig::new(vec!["node1".into(), "node2".into()])
        .with_workers(3)
        .with_rate(10)
        .with_duration(Duration::from_secs(1));

    let orchestrator =
        build_orchestrator(config, Arc::clone(&ledger) as Arc<dyn LedgerClient>).unwrap();
    let result = orchestrator.run().await.unwrap();

    assert!(result.succeeded());
    assert_eq!(result.workers.len(), 3);
    for stats in &result.workers {
        assert_eq!(stats.stop_reason, Some(StopReason::DurationElapsed));
    }
    // 3 workers at 10/s for 1s, first tick immediate: 30 +- 3.
    assert!(
        (27..=33).contains(&result.total_items),
        "got {}",
        result.total_items
    );
    assert_eq!(result.total_items, ledger.transfers());
}

#[tokio::test(start_paused = true)]
async fn worker_failure_cancels_the_whole_run() {
    // node2 always rejects; every worker hits it within a few ticks.
    let ledger = Arc::new(MockLedgerClient::failing_for_node("node2"));
    let config = RunConfig::new(vec!["node1".into(), "node2".into()])
        .with_workers(3)
        .with_rate(10)
        .with_duration(Duration::from_secs(3600));

    let orchestrator = build_orchestrator(config, ledger).unwrap();
    let result = orchestrator.run().await.unwrap();

    assert!(!result.succeeded());
    assert_eq!(result.workers.len(), 3, "every worker must still join");
    assert!(result
        .workers
        .iter()
        .all(|s| matches!(
            s.stop_reason,
            Some(StopReason::Failed) | Some(StopReason::Cancelled)
        )));
    assert!(result
        .workers
        .iter()
        .any(|s| s.stop_reason == Some(StopReason::Failed)));

    let aggregate = result.into_aggregate_error().expect("missing failure");
    assert!(!aggregate.errors.is_empty());
    let mut ids: Vec<usize> = aggregate.errors.iter().map(|e| e.worker_id).collect();
    let sorted = ids.clone();
    ids.sort_unstable();
    assert_eq!(ids, sorted, "errors must be ordered by worker id");
}

#[tokio::test(start_paused = true)]
async fn panicked_worker_is_reported_as_a_failure() {
    let ledger = Arc::new(MockLedgerClient::panicking());
    let config = RunConfig::new(vec!["node1".into()])
        .with_rate(10)
        .with_duration(Duration::from_secs(1));

    let orchestrator = build_orchestrator(config, ledger).unwrap();
    let result = orchestrator.run().await.unwrap();

    // The worker died before producing stats, but the failure must
    // still surface in the aggregate.
    assert!(!result.succeeded());
    assert!(result.workers.is_empty());

    let aggregate = result.into_aggregate_error().expect("missing failure");
    assert_eq!(aggregate.errors.len(), 1);
    assert_eq!(aggregate.errors[0].worker_id, 0);
    assert!(matches!(
        aggregate.errors[0].kind,
        WorkerErrorKind::Panicked(_)
    ));
}

#[tokio::test(start_paused = true)]
async fn external_trigger_cancels_all_workers() {
    let ledger = Arc::new(MockLedgerClient::new());
    let config = RunConfig::new(vec!["node1".into()])
        .with_workers(2)
        .with_rate(10)
        .with_duration(Duration::from_secs(3600));

    let orchestrator = build_orchestrator(config, ledger).unwrap();
    let shutdown = orchestrator.shutdown_handle();

    let handle = tokio::spawn(async move { orchestrator.run().await });
    tokio::time::sleep(Duration::from_millis(500)).await;
    shutdown.trigger();
    // A second trigger on an already-stopped run is a no-op.
    shutdown.trigger();

    let result = handle.await.unwrap().unwrap();
    assert!(result.succeeded());
    for stats in &result.workers {
        assert_eq!(stats.stop_reason, Some(StopReason::Cancelled));
    }
}

#[tokio::test(start_paused = true)]
async fn timeout_stops_the_run_before_the_duration() {
    let ledger = Arc::new(MockLedgerClient::new());
    let config = RunConfig::new(vec!["node1".into()])
        .with_workers(2)
        .with_rate(10)
        .with_duration(Duration::from_secs(3600));

    let orchestrator = build_orchestrator(config, ledger).unwrap();
    let result = orchestrator
        .run_with_timeout(Duration::from_secs(1))
        .await
        .unwrap();

    assert!(result.succeeded());
    for stats in &result.workers {
        assert_eq!(stats.stop_reason, Some(StopReason::Cancelled));
    }
    // 2 workers ran for ~1s at 10/s before the timeout fired.
    assert!(result.total_items <= 22, "got {}", result.total_items);
}

#[test]
fn builder_rejects_unknown_node() {
    let config = RunConfig::new(vec!["node1".into(), "ghost".into()]);
    let result = build_orchestrator(config, Arc::new(MockLedgerClient::new()));
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::UnknownNode(ref name))) if name == "ghost"
    ));
}

#[test]
fn builder_rejects_invalid_run_config() {
    let config = RunConfig::new(vec!["node1".into()]).with_workers(0);
    let result = build_orchestrator(config, Arc::new(MockLedgerClient::new()));
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidWorkerCount))
    ));
}

#[test]
fn builder_rejects_missing_fields() {
    let config = RunConfig::new(vec!["node1".into()]);
    let result = OrchestratorBuilder::new(config).build();
    assert!(matches!(result, Err(Error::MissingField("directory"))));
}
