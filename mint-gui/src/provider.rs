//! Wallet provider capability and JSON-RPC transport.
//!
//! The wallet provider holds the user's keys: it authorizes accounts, reports
//! the chain, signs and broadcasts transactions. This client only talks to it
//! over JSON-RPC 2.0 (EIP-1193 method names) and never touches key material.
//!
//! Presence is decided once at startup by [`detect`]; every operation consumes
//! the resulting [`ProviderCapability`] instead of probing on its own.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;

static REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// Transaction handed to the provider for signing and broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionRequest {
    pub from: String,
    pub to: String,
    /// 0x-prefixed calldata
    pub data: String,
}

/// Receipt of a mined transaction.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: String,
    #[serde(default)]
    pub block_number: Option<String>,
    /// "0x1" on success, "0x0" on revert. Absent on pre-Byzantium chains.
    #[serde(default)]
    pub status: Option<String>,
}

impl TransactionReceipt {
    pub fn is_success(&self) -> bool {
        !matches!(self.status.as_deref(), Some("0x0") | Some("0x00"))
    }
}

/// A contract log as delivered by `eth_subscribe("logs")`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub address: String,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub transaction_hash: Option<String>,
    /// Set when the log was dropped by a chain reorganisation.
    #[serde(default)]
    pub removed: bool,
}

/// The operations this client needs from a wallet provider.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Prompt the user to authorize accounts (`eth_requestAccounts`).
    async fn request_accounts(&self) -> Result<Vec<String>, ProviderError>;

    /// Already-authorized accounts, without prompting (`eth_accounts`).
    async fn accounts(&self) -> Result<Vec<String>, ProviderError>;

    /// Hex chain id of the connected network (`eth_chainId`).
    async fn chain_id(&self) -> Result<String, ProviderError>;

    /// Sign and broadcast a transaction, returning its hash (`eth_sendTransaction`).
    async fn send_transaction(&self, tx: TransactionRequest) -> Result<String, ProviderError>;

    /// Receipt of a transaction, `None` while it is still pending.
    async fn transaction_receipt(
        &self,
        tx_hash: &str,
    ) -> Result<Option<TransactionReceipt>, ProviderError>;

    /// WebSocket endpoint serving `eth_subscribe`, if the provider has one.
    fn subscription_url(&self) -> Option<String>;
}

/// Result of wallet provider detection.
#[derive(Clone)]
pub enum ProviderCapability {
    Present(Arc<dyn WalletProvider>),
    Absent,
}

impl ProviderCapability {
    pub fn provider(&self) -> Option<&Arc<dyn WalletProvider>> {
        match self {
            ProviderCapability::Present(provider) => Some(provider),
            ProviderCapability::Absent => None,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, ProviderCapability::Present(_))
    }
}

impl fmt::Debug for ProviderCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderCapability::Present(_) => f.write_str("Present"),
            ProviderCapability::Absent => f.write_str("Absent"),
        }
    }
}

/// Detect the wallet provider configured for this process.
pub fn detect(config: &Config) -> ProviderCapability {
    let endpoint = match config.wallet_provider.as_deref().map(str::trim) {
        Some(endpoint) if !endpoint.is_empty() => endpoint.to_string(),
        _ => {
            log::info!("Make sure you have a wallet provider configured!");
            return ProviderCapability::Absent;
        }
    };

    match JsonRpcProvider::new(endpoint, config.subscription_url()) {
        Ok(provider) => {
            log::info!("👛 Wallet provider found at {}", provider.endpoint());
            ProviderCapability::Present(Arc::new(provider))
        }
        Err(e) => {
            log::warn!("Wallet provider unusable: {}", e);
            ProviderCapability::Absent
        }
    }
}

// ============================================================================
// JSON-RPC over HTTP
// ============================================================================

/// JSON-RPC 2.0 request
#[derive(Debug, Serialize)]
struct JsonRpcRequest {
    jsonrpc: &'static str,
    id: u64,
    method: String,
    params: serde_json::Value,
}

/// JSON-RPC 2.0 response
#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    /// Absent and `null` both read as `Value::Null`.
    #[serde(default)]
    result: serde_json::Value,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

/// Wallet provider reached over HTTP JSON-RPC (desktop signers, local nodes with unlocked accounts).
#[derive(Debug, Clone)]
pub struct JsonRpcProvider {
    endpoint: String,
    ws_url: Option<String>,
    client: Client,
}

impl JsonRpcProvider {
    pub fn new(endpoint: String, ws_url: Option<String>) -> Result<Self, ProviderError> {
        let endpoint = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint
        } else {
            format!("http://{}", endpoint)
        };

        // No overall timeout: eth_requestAccounts and eth_sendTransaction wait on the user.
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            endpoint,
            ws_url,
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn rpc_call(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, ProviderError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: REQUEST_ID.fetch_add(1, Ordering::Relaxed),
            method: method.to_string(),
            params,
        };

        log::debug!("→ RPC {}: {}", method, request.params);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::Http(response.status().as_u16()));
        }

        let rpc_response: JsonRpcResponse = response.json().await.map_err(|e| {
            ProviderError::InvalidResponse(format!("Failed to parse JSON-RPC response: {}", e))
        })?;

        into_result(rpc_response)
    }
}

fn into_result(response: JsonRpcResponse) -> Result<serde_json::Value, ProviderError> {
    match response.error {
        Some(error) => Err(ProviderError::Rpc(error.code, error.message)),
        None => Ok(response.result),
    }
}

#[async_trait]
impl WalletProvider for JsonRpcProvider {
    async fn request_accounts(&self) -> Result<Vec<String>, ProviderError> {
        let result = self
            .rpc_call("eth_requestAccounts", serde_json::json!([]))
            .await?;
        Ok(serde_json::from_value(result)?)
    }

    async fn accounts(&self) -> Result<Vec<String>, ProviderError> {
        let result = self.rpc_call("eth_accounts", serde_json::json!([])).await?;
        Ok(serde_json::from_value(result)?)
    }

    async fn chain_id(&self) -> Result<String, ProviderError> {
        let result = self.rpc_call("eth_chainId", serde_json::json!([])).await?;
        Ok(serde_json::from_value(result)?)
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<String, ProviderError> {
        let result = self
            .rpc_call("eth_sendTransaction", serde_json::json!([tx]))
            .await?;
        Ok(serde_json::from_value(result)?)
    }

    async fn transaction_receipt(
        &self,
        tx_hash: &str,
    ) -> Result<Option<TransactionReceipt>, ProviderError> {
        // Pending transactions have a null receipt
        let result = self
            .rpc_call("eth_getTransactionReceipt", serde_json::json!([tx_hash]))
            .await?;
        Ok(serde_json::from_value(result)?)
    }

    fn subscription_url(&self) -> Option<String> {
        self.ws_url.clone()
    }
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("HTTP error {0}")]
    Http(u16),

    #[error("RPC error {0}: {1}")]
    Rpc(i64, String),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProviderError {
    /// EIP-1193 code for a request the user declined in the wallet.
    pub const USER_REJECTED: i64 = 4001;

    pub fn is_user_rejection(&self) -> bool {
        matches!(self, ProviderError::Rpc(code, _) if *code == Self::USER_REJECTED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_creation() {
        let provider = JsonRpcProvider::new("http://127.0.0.1:1248".to_string(), None).unwrap();
        assert_eq!(provider.endpoint(), "http://127.0.0.1:1248");
    }

    #[test]
    fn test_provider_creation_bare_endpoint() {
        let provider = JsonRpcProvider::new(
            "127.0.0.1:1248".to_string(),
            Some("ws://127.0.0.1:1248".to_string()),
        )
        .unwrap();
        assert_eq!(provider.endpoint(), "http://127.0.0.1:1248");
        assert_eq!(
            provider.subscription_url().as_deref(),
            Some("ws://127.0.0.1:1248")
        );
    }

    #[test]
    fn test_detect_absent() {
        assert!(!detect(&Config::default()).is_present());

        let blank = Config {
            wallet_provider: Some("  ".to_string()),
            ..Config::default()
        };
        assert!(detect(&blank).provider().is_none());
    }

    #[test]
    fn test_detect_present() {
        let config = Config {
            wallet_provider: Some("http://127.0.0.1:1248".to_string()),
            ..Config::default()
        };
        let capability = detect(&config);
        assert!(capability.is_present());
        assert_eq!(format!("{:?}", capability), "Present");
        assert_eq!(
            capability.provider().unwrap().subscription_url().as_deref(),
            Some("ws://127.0.0.1:1248")
        );
    }

    #[test]
    fn test_rpc_error_response() {
        let response: JsonRpcResponse = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":4001,"message":"User rejected the request."}}"#,
        )
        .unwrap();
        let err = into_result(response).unwrap_err();
        assert!(err.is_user_rejection());
        assert_eq!(err.to_string(), "RPC error 4001: User rejected the request.");
    }

    #[test]
    fn test_rpc_result_response() {
        let response: JsonRpcResponse =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":7,"result":["0xaa"]}"#).unwrap();
        let accounts: Vec<String> = serde_json::from_value(into_result(response).unwrap()).unwrap();
        assert_eq!(accounts, vec!["0xaa".to_string()]);
    }

    #[test]
    fn test_pending_receipt_is_none() {
        let response: JsonRpcResponse =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":3,"result":null}"#).unwrap();
        let receipt: Option<TransactionReceipt> =
            serde_json::from_value(into_result(response).unwrap()).unwrap();
        assert!(receipt.is_none());
    }

    #[test]
    fn test_receipt_status() {
        let mined: TransactionReceipt = serde_json::from_str(
            r#"{"transactionHash":"0xabc","blockNumber":"0x10","status":"0x1"}"#,
        )
        .unwrap();
        assert!(mined.is_success());
        assert_eq!(mined.block_number.as_deref(), Some("0x10"));

        let reverted: TransactionReceipt =
            serde_json::from_str(r#"{"transactionHash":"0xabc","status":"0x0"}"#).unwrap();
        assert!(!reverted.is_success());

        let legacy: TransactionReceipt =
            serde_json::from_str(r#"{"transactionHash":"0xabc"}"#).unwrap();
        assert!(legacy.is_success());
    }

    #[test]
    fn test_transaction_request_serialization() {
        let tx = TransactionRequest {
            from: "0xaa".to_string(),
            to: "0xcc".to_string(),
            data: "0x12345678".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&tx).unwrap(),
            serde_json::json!({"from": "0xaa", "to": "0xcc", "data": "0x12345678"})
        );
    }

    #[test]
    fn test_log_entry_deserialization() {
        let log: LogEntry = serde_json::from_str(
            r#"{"address":"0xcc","topics":["0x01"],"data":"0x","transactionHash":"0xdd","logIndex":"0x0"}"#,
        )
        .unwrap();
        assert_eq!(log.transaction_hash.as_deref(), Some("0xdd"));
        assert!(!log.removed);
    }
}
