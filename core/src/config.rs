//! Run and file configuration
//!
//! `RunConfig` describes one load-generation run and is immutable once
//! the run starts. `FileConfig` is the YAML document naming the
//! network's nodes and the operator identity.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::account::{AccountId, Operator};
use crate::error::ConfigError;

/// Highest per-worker rate the tick timer can express (one tick per
/// nanosecond).
pub const MAX_RATE_PER_WORKER: u32 = 1_000_000_000;

/// The kind of transaction a run generates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxKind {
    /// Fixed-amount crypto transfer from the operator to the target
    /// node's account.
    #[serde(rename = "crypto")]
    CryptoTransfer,
}

impl std::str::FromStr for TxKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "crypto" => Ok(TxKind::CryptoTransfer),
            other => Err(ConfigError::UnsupportedTxType(other.to_string())),
        }
    }
}

impl std::fmt::Display for TxKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TxKind::CryptoTransfer => write!(f, "crypto"),
        }
    }
}

/// Configuration for one load-generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Ordered node names to spread transfers across.
    pub nodes: Vec<String>,
    /// Number of concurrent workers.
    pub worker_count: usize,
    /// Transactions per second, per worker.
    pub rate_per_worker: u32,
    /// How long each worker runs.
    pub duration: Duration,
    /// Transaction kind to generate.
    pub tx_kind: TxKind,
}

impl RunConfig {
    /// Create a config for the given nodes with single-worker defaults.
    pub fn new(nodes: Vec<String>) -> Self {
        Self {
            nodes,
            worker_count: 1,
            rate_per_worker: 10,
            duration: Duration::from_secs(60),
            tx_kind: TxKind::CryptoTransfer,
        }
    }

    /// Set the worker count.
    pub fn with_workers(mut self, count: usize) -> Self {
        self.worker_count = count;
        self
    }

    /// Set the per-worker rate.
    pub fn with_rate(mut self, tps: u32) -> Self {
        self.rate_per_worker = tps;
        self
    }

    /// Set the run duration.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Set the transaction kind.
    pub fn with_tx_kind(mut self, kind: TxKind) -> Self {
        self.tx_kind = kind;
        self
    }

    /// The interval between two ticks of one worker.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(1) / self.rate_per_worker.max(1)
    }

    /// The nominal aggregate rate across all workers.
    pub fn total_rate(&self) -> u64 {
        self.rate_per_worker as u64 * self.worker_count as u64
    }

    /// Validate the configuration.
    ///
    /// Zero workers, a zero rate, a zero duration, or an empty node
    /// list are configuration errors, never runtime states.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_count == 0 {
            return Err(ConfigError::InvalidWorkerCount);
        }
        if self.rate_per_worker == 0 {
            return Err(ConfigError::InvalidRate);
        }
        if self.rate_per_worker > MAX_RATE_PER_WORKER {
            return Err(ConfigError::RateTooHigh);
        }
        if self.duration.is_zero() {
            return Err(ConfigError::InvalidDuration);
        }
        if self.nodes.is_empty() || self.nodes.iter().all(|n| n.is_empty()) {
            return Err(ConfigError::NoNodes);
        }
        Ok(())
    }
}

/// A consensus node entry in the config file.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeEntry {
    /// Node name, the key workers resolve by.
    pub name: String,
    /// Account credited by transfers aimed at this node.
    pub account: String,
    /// Network address of the node.
    pub endpoint: String,
}

/// A mirror node entry in the config file.
#[derive(Debug, Clone, Deserialize)]
pub struct MirrorEntry {
    /// Mirror node name.
    pub name: String,
    /// Network address of the mirror node.
    pub endpoint: String,
}

/// The operator block of the config file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OperatorEntry {
    /// Operator account id string.
    #[serde(default)]
    pub account: String,
    /// Operator key material.
    #[serde(default)]
    pub key: String,
}

/// The YAML configuration document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileConfig {
    /// Consensus nodes transfers can target.
    #[serde(default)]
    pub consensus_nodes: Vec<NodeEntry>,
    /// Mirror nodes, resolvable but unused by the core loop.
    #[serde(default)]
    pub mirror_nodes: Vec<MirrorEntry>,
    /// Operator identity.
    #[serde(default)]
    pub operator: OperatorEntry,
}

impl FileConfig {
    /// Load a config file, applying `OPERATOR_ID` / `OPERATOR_KEY`
    /// environment fallbacks for a missing operator block.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let mut config: FileConfig =
            serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        config.apply_env_fallbacks();
        Ok(config)
    }

    fn apply_env_fallbacks(&mut self) {
        if self.operator.account.is_empty() {
            if let Ok(account) = std::env::var("OPERATOR_ID") {
                self.operator.account = account;
            }
        }
        if self.operator.key.is_empty() {
            if let Ok(key) = std::env::var("OPERATOR_KEY") {
                self.operator.key = key;
            }
        }
    }

    /// Resolve the operator identity, failing on a missing account,
    /// a missing key, or a malformed account id.
    pub fn operator(&self) -> Result<Operator, ConfigError> {
        if self.operator.account.is_empty() {
            return Err(ConfigError::MissingOperatorAccount);
        }
        if self.operator.key.is_empty() {
            return Err(ConfigError::MissingOperatorKey);
        }
        let account: AccountId = self.operator.account.parse()?;
        Ok(Operator {
            account,
            key: self.operator.key.clone(),
        })
    }
}
