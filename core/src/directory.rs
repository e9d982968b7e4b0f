//! Name-to-endpoint resolution
//!
//! The directory is populated from the config file before the worker
//! pool starts and is read-only during a run.

use std::collections::HashMap;

use crate::account::AccountId;
use crate::config::FileConfig;
use crate::error::ConfigError;

/// A named remote target with a resolvable address and account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Node name, the resolution key.
    pub name: String,
    /// Network address.
    pub address: String,
    /// Account credited by transfers aimed at this node.
    pub account: AccountId,
}

/// A mirror node endpoint. Config surface only; the core loop does
/// not depend on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorEndpoint {
    /// Mirror node name.
    pub name: String,
    /// Network address.
    pub address: String,
}

/// Resolves node names to endpoints.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    nodes: HashMap<String, Endpoint>,
    mirrors: HashMap<String, MirrorEndpoint>,
}

impl Directory {
    /// Build a directory from a parsed config file.
    ///
    /// Fails on the first malformed node account id; a directory is
    /// either complete or not constructed at all.
    pub fn from_config(config: &FileConfig) -> Result<Self, ConfigError> {
        let mut nodes = HashMap::with_capacity(config.consensus_nodes.len());
        for entry in &config.consensus_nodes {
            let account: AccountId = entry.account.parse()?;
            tracing::debug!(
                name = %entry.name,
                account = %account,
                endpoint = %entry.endpoint,
                "Parsed consensus node"
            );
            nodes.insert(
                entry.name.clone(),
                Endpoint {
                    name: entry.name.clone(),
                    address: entry.endpoint.clone(),
                    account,
                },
            );
        }

        let mut mirrors = HashMap::with_capacity(config.mirror_nodes.len());
        for entry in &config.mirror_nodes {
            tracing::debug!(name = %entry.name, endpoint = %entry.endpoint, "Parsed mirror node");
            mirrors.insert(
                entry.name.clone(),
                MirrorEndpoint {
                    name: entry.name.clone(),
                    address: entry.endpoint.clone(),
                },
            );
        }

        Ok(Self { nodes, mirrors })
    }

    /// Build a directory directly from endpoints. Mostly useful for
    /// tests and embedding.
    pub fn from_endpoints(endpoints: impl IntoIterator<Item = Endpoint>) -> Self {
        Self {
            nodes: endpoints
                .into_iter()
                .map(|e| (e.name.clone(), e))
                .collect(),
            mirrors: HashMap::new(),
        }
    }

    /// Resolve a consensus node by name.
    pub fn resolve(&self, name: &str) -> Option<&Endpoint> {
        self.nodes.get(name)
    }

    /// Resolve a mirror node by name.
    pub fn resolve_mirror(&self, name: &str) -> Option<&MirrorEndpoint> {
        self.mirrors.get(name)
    }

    /// Number of consensus nodes known to the directory.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the directory knows no consensus nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
