//! Builder pattern for Orchestrator construction

use std::sync::Arc;

use crate::account::AccountId;
use crate::channel::ChannelConfig;
use crate::config::RunConfig;
use crate::directory::Directory;
use crate::error::{ConfigError, Error, Result};
use crate::shutdown::Shutdown;
use crate::traits::LedgerClient;

use super::executor::Orchestrator;

/// Builder for creating `Orchestrator` instances with validation.
///
/// Validation happens up front: the run configuration is checked and
/// every requested node name is resolved against the directory before
/// any worker task is spawned.
///
/// # Example
/// ```ignore
/// let orchestrator = OrchestratorBuilder::new(config)
///     .directory(directory)
///     .operator(operator.account)
///     .ledger(client)
///     .build()?;
/// let result = orchestrator.run_with_signal_handling().await?;
/// ```
pub struct OrchestratorBuilder {
    config: RunConfig,
    directory: Option<Arc<Directory>>,
    operator: Option<AccountId>,
    ledger: Option<Arc<dyn LedgerClient>>,
    channels: ChannelConfig,
    shutdown: Option<Shutdown>,
    fail_fast: bool,
}

impl OrchestratorBuilder {
    /// Create a new builder for the given run configuration.
    pub fn new(config: RunConfig) -> Self {
        Self {
            config,
            directory: None,
            operator: None,
            ledger: None,
            channels: ChannelConfig::default(),
            shutdown: None,
            fail_fast: true,
        }
    }

    /// Set the endpoint directory.
    pub fn directory(mut self, directory: Arc<Directory>) -> Self {
        self.directory = Some(directory);
        self
    }

    /// Set the operator account transfers are debited from.
    pub fn operator(mut self, operator: AccountId) -> Self {
        self.operator = Some(operator);
        self
    }

    /// Set the ledger client shared by all workers.
    pub fn ledger(mut self, ledger: Arc<dyn LedgerClient>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    /// Set the channel sizing configuration.
    pub fn channels(mut self, channels: ChannelConfig) -> Self {
        self.channels = channels;
        self
    }

    /// Use an externally owned shutdown scope instead of a fresh one.
    pub fn shutdown(mut self, shutdown: Shutdown) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Whether a single worker failure cancels the whole run
    /// (defaults to true).
    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Build the orchestrator.
    ///
    /// # Errors
    /// Returns an error if a required field is missing, the run
    /// configuration is invalid, or a requested node name is not in
    /// the directory.
    pub fn build(self) -> Result<Orchestrator> {
        let directory = self.directory.ok_or(Error::MissingField("directory"))?;
        let operator = self.operator.ok_or(Error::MissingField("operator"))?;
        let ledger = self.ledger.ok_or(Error::MissingField("ledger"))?;

        self.config.validate().map_err(Error::Config)?;

        for name in &self.config.nodes {
            if directory.resolve(name).is_none() {
                return Err(Error::Config(ConfigError::UnknownNode(name.clone())));
            }
        }

        Ok(Orchestrator {
            config: self.config,
            directory,
            operator,
            ledger,
            channels: self.channels,
            shutdown: self.shutdown.unwrap_or_default(),
            fail_fast: self.fail_fast,
        })
    }
}
