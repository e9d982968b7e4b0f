//! HTTP gateway ledger client
//!
//! Talks to a transaction gateway in front of the network: one POST
//! submits a transfer, one GET fetches its receipt. The gateway holds
//! the signing machinery; this client authenticates with the operator
//! key and never signs locally.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use hammer_core::account::Operator;
use hammer_core::traits::{LedgerClient, LedgerError, TransferReceipt, TransferRequest};

/// Default end-to-end timeout for one submit-plus-receipt exchange.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const OPERATOR_KEY_HEADER: &str = "x-operator-key";

// ============================================================================
// Wire types
// ============================================================================

/// Submission payload sent to the gateway.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitBody<'a> {
    operator: String,
    #[serde(flatten)]
    transfer: &'a TransferRequest,
}

/// Gateway response to a submission.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitResponse {
    transaction_id: String,
    status: String,
}

/// Gateway response to a receipt query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReceiptResponse {
    status: String,
}

/// Error body the gateway returns on rejections. Parsed leniently;
/// a non-JSON body is used verbatim.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

fn rejection_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|e| e.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

/// A receipt is final only with status `SUCCESS`; anything else after
/// consensus is a failed transfer.
fn check_receipt_status(transaction_id: &str, status: &str) -> Result<(), LedgerError> {
    if status == "SUCCESS" {
        Ok(())
    } else {
        Err(LedgerError::Receipt(format!(
            "transaction {transaction_id} ended with status {status}"
        )))
    }
}

// ============================================================================
// Client
// ============================================================================

/// `LedgerClient` over an HTTP transaction gateway.
///
/// One instance is shared by the whole worker pool; `reqwest::Client`
/// pools connections internally.
pub struct GatewayClient {
    http: reqwest::Client,
    network: String,
    operator_key: String,
    timeout: Duration,
}

impl GatewayClient {
    /// Create a client for the given network name and operator.
    ///
    /// # Errors
    /// Fails if the operator key is empty or the HTTP client cannot
    /// be constructed.
    pub fn new(network: &str, operator: &Operator) -> Result<Self, LedgerError> {
        Self::with_timeout(network, operator, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a client with a non-default request timeout.
    pub fn with_timeout(
        network: &str,
        operator: &Operator,
        timeout: Duration,
    ) -> Result<Self, LedgerError> {
        if operator.key.is_empty() {
            return Err(LedgerError::Config(
                "operator key must not be empty".to_string(),
            ));
        }

        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            network: network.to_string(),
            operator_key: operator.key.clone(),
            timeout,
        })
    }

    fn submit_url(&self, node_address: &str) -> String {
        format!("http://{node_address}/api/v1/transactions")
    }

    fn receipt_url(&self, node_address: &str, transaction_id: &str) -> String {
        format!("http://{node_address}/api/v1/transactions/{transaction_id}/receipt")
    }

    fn map_timeout(&self, err: reqwest::Error) -> LedgerError {
        if err.is_timeout() {
            LedgerError::Timeout(self.timeout)
        } else {
            LedgerError::Http(err)
        }
    }

    async fn submit(&self, request: &TransferRequest) -> Result<SubmitResponse, LedgerError> {
        let body = SubmitBody {
            operator: request.from.to_string(),
            transfer: request,
        };

        let response = self
            .http
            .post(self.submit_url(&request.node_address))
            .header(OPERATOR_KEY_HEADER, &self.operator_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_timeout(e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(LedgerError::Rejected {
                status: status.as_u16(),
                message: rejection_message(&text),
            });
        }

        Ok(response.json().await.map_err(|e| self.map_timeout(e))?)
    }

    async fn fetch_receipt(
        &self,
        node_address: &str,
        transaction_id: &str,
    ) -> Result<ReceiptResponse, LedgerError> {
        let response = self
            .http
            .get(self.receipt_url(node_address, transaction_id))
            .header(OPERATOR_KEY_HEADER, &self.operator_key)
            .send()
            .await
            .map_err(|e| self.map_timeout(e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(LedgerError::Rejected {
                status: status.as_u16(),
                message: rejection_message(&text),
            });
        }

        Ok(response.json().await.map_err(|e| self.map_timeout(e))?)
    }
}

#[async_trait]
impl LedgerClient for GatewayClient {
    fn network_name(&self) -> &str {
        &self.network
    }

    async fn transfer(&self, request: &TransferRequest) -> Result<TransferReceipt, LedgerError> {
        let submitted = self.submit(request).await?;
        tracing::debug!(
            transaction_id = %submitted.transaction_id,
            node = %request.node_name,
            trace_id = %request.trace_id,
            "Transaction submitted"
        );

        // Some gateways fold the receipt into the submit response;
        // only a pending submission needs the second round trip.
        let final_status = if submitted.status == "PENDING" {
            self.fetch_receipt(&request.node_address, &submitted.transaction_id)
                .await?
                .status
        } else {
            submitted.status
        };

        check_receipt_status(&submitted.transaction_id, &final_status)?;

        Ok(TransferReceipt {
            transaction_id: submitted.transaction_id,
            status: final_status,
        })
    }
}

impl std::fmt::Debug for GatewayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayClient")
            .field("network", &self.network)
            .field("timeout", &self.timeout)
            .finish()
    }
}
