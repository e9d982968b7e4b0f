//! Work item production
//!
//! On each tick the producer picks a target node uniformly at random
//! from the configured set and builds one transfer request for the
//! configured transaction kind.

use std::sync::Arc;

use rand::Rng;

use crate::account::AccountId;
use crate::config::TxKind;
use crate::directory::Directory;
use crate::error::WorkerErrorKind;
use crate::traits::TransferRequest;

/// Amount moved by every generated crypto transfer, in whole units.
pub const TRANSFER_AMOUNT: u64 = 1;

/// Builds one transfer request per tick.
#[derive(Debug, Clone)]
pub struct WorkItemProducer {
    nodes: Vec<String>,
    directory: Arc<Directory>,
    operator: AccountId,
    kind: TxKind,
}

impl WorkItemProducer {
    /// Create a producer over the given node names.
    ///
    /// The node list must be non-empty; `RunConfig::validate` enforces
    /// that before any producer is built.
    pub fn new(
        nodes: Vec<String>,
        directory: Arc<Directory>,
        operator: AccountId,
        kind: TxKind,
    ) -> Self {
        Self {
            nodes,
            directory,
            operator,
            kind,
        }
    }

    /// Build the next request for the given worker.
    ///
    /// An unresolvable node name is fatal to the calling worker and is
    /// never retried.
    pub fn next_request(&self, worker_id: usize) -> Result<TransferRequest, WorkerErrorKind> {
        let index = rand::thread_rng().gen_range(0..self.nodes.len());
        let name = &self.nodes[index];
        let endpoint = self
            .directory
            .resolve(name)
            .ok_or_else(|| WorkerErrorKind::EndpointNotFound(name.clone()))?;

        match self.kind {
            TxKind::CryptoTransfer => Ok(TransferRequest {
                from: self.operator,
                to: endpoint.account,
                node_name: endpoint.name.clone(),
                node_address: endpoint.address.clone(),
                amount: TRANSFER_AMOUNT,
                memo: format!("hammer - worker {worker_id}"),
                trace_id: next_trace_id(),
            }),
        }
    }
}

fn next_trace_id() -> String {
    let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
    format!("tx-crypto-{nanos}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::Endpoint;

    fn directory() -> Arc<Directory> {
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

    fn producer(nodes: Vec<String>) -> WorkItemProducer {
        WorkItemProducer::new(
            nodes,
            directory(),
            AccountId::new(0, 0, 2),
            TxKind::CryptoTransfer,
        )
    }

    #[test]
    fn builds_transfer_from_operator_to_node_account() {
        let producer = producer(vec!["node1".into()]);
        let request = producer.next_request(7).unwrap();

        assert_eq!(request.from, AccountId::new(0, 0, 2));
        assert_eq!(request.to, AccountId::new(0, 0, 3));
        assert_eq!(request.node_address, "10.0.0.1:50211");
        assert_eq!(request.amount, TRANSFER_AMOUNT);
        assert_eq!(request.memo, "hammer - worker 7");
        assert!(request.trace_id.starts_with("tx-crypto-"));
    }

    #[test]
    fn unresolved_name_is_endpoint_not_found() {
        let producer = producer(vec!["ghost".into()]);
        assert!(matches!(
            producer.next_request(0),
            Err(WorkerErrorKind::EndpointNotFound(name)) if name == "ghost"
        ));
    }

    #[test]
    fn selection_covers_the_configured_set() {
        let producer = producer(vec!["node1".into(), "node2".into()]);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..64 {
            seen.insert(producer.next_request(0).unwrap().node_name);
        }
        // 64 uniform draws over two nodes miss one with probability 2^-63.
        assert_eq!(seen.len(), 2);
    }
}
