//! In-memory wallet provider for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use mint_gui::config::Config;
use mint_gui::contract::mint_event_topic;
use mint_gui::events::ServiceEvent;
use mint_gui::provider::{
    LogEntry, ProviderCapability, ProviderError, TransactionReceipt, TransactionRequest,
    WalletProvider,
};
use mint_gui::state::AppState;
use tokio::sync::mpsc;

pub const ACCOUNT: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
pub const CONTRACT: &str = "0xCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCC";
pub const TX_HASH: &str = "0x5f2b7c1e0a9d8e7f6a5b4c3d2e1f0a9b8c7d6e5f4a3b2c1d0e9f8a7b6c5d4e3f";

/// Scriptable wallet provider.
pub struct FakeProvider {
    /// Returned by `eth_accounts`.
    pub authorized: Vec<String>,
    /// Returned by `eth_requestAccounts`.
    pub granted: Vec<String>,
    pub chain_id: String,
    pub reject_connect: bool,
    /// `eth_requestAccounts` never resolves, like an unanswered wallet prompt.
    pub hang_connect: bool,
    pub reject_send: bool,
    /// Popped on each receipt poll; pending once exhausted.
    pub receipts: Mutex<VecDeque<Option<TransactionReceipt>>>,
    pub sent: Mutex<Vec<TransactionRequest>>,
}

impl Default for FakeProvider {
    fn default() -> Self {
        Self {
            authorized: vec![ACCOUNT.to_string()],
            granted: vec![ACCOUNT.to_string()],
            chain_id: "0x4".to_string(),
            reject_connect: false,
            hang_connect: false,
            reject_send: false,
            receipts: Mutex::new(VecDeque::new()),
            sent: Mutex::new(Vec::new()),
        }
    }
}

impl FakeProvider {
    pub fn with_receipts(self, receipts: Vec<Option<TransactionReceipt>>) -> Self {
        *self.receipts.lock().unwrap() = receipts.into();
        self
    }

    pub fn into_capability(self) -> (ProviderCapability, Arc<FakeProvider>) {
        let provider = Arc::new(self);
        (ProviderCapability::Present(provider.clone()), provider)
    }
}

fn rejected() -> ProviderError {
    ProviderError::Rpc(4001, "User rejected the request.".to_string())
}

#[async_trait]
impl WalletProvider for FakeProvider {
    async fn request_accounts(&self) -> Result<Vec<String>, ProviderError> {
        if self.hang_connect {
            std::future::pending::<()>().await;
        }
        if self.reject_connect {
            return Err(rejected());
        }
        Ok(self.granted.clone())
    }

    async fn accounts(&self) -> Result<Vec<String>, ProviderError> {
        Ok(self.authorized.clone())
    }

    async fn chain_id(&self) -> Result<String, ProviderError> {
        Ok(self.chain_id.clone())
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<String, ProviderError> {
        if self.reject_send {
            return Err(rejected());
        }
        self.sent.lock().unwrap().push(tx);
        Ok(TX_HASH.to_string())
    }

    async fn transaction_receipt(
        &self,
        _tx_hash: &str,
    ) -> Result<Option<TransactionReceipt>, ProviderError> {
        Ok(self.receipts.lock().unwrap().pop_front().flatten())
    }

    fn subscription_url(&self) -> Option<String> {
        None
    }
}

pub fn receipt(status: &str) -> Option<TransactionReceipt> {
    Some(TransactionReceipt {
        transaction_hash: TX_HASH.to_string(),
        block_number: Some("0x10".to_string()),
        status: Some(status.to_string()),
    })
}

pub fn config() -> Config {
    Config {
        contract_address: CONTRACT.to_string(),
        receipt_poll_ms: 1,
        ..Config::default()
    }
}

/// A `NewEpicNFTMinted(ACCOUNT, token_id)` log.
pub fn mint_log(token_id: u64) -> LogEntry {
    LogEntry {
        address: CONTRACT.to_string(),
        topics: vec![mint_event_topic()],
        data: format!(
            "0x{:0>64}{:064x}",
            ACCOUNT.trim_start_matches("0x"),
            token_id
        ),
        transaction_hash: Some(TX_HASH.to_string()),
        removed: false,
    }
}

/// Drain every pending service event.
pub fn drain(rx: &mut mpsc::UnboundedReceiver<ServiceEvent>) -> Vec<ServiceEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Apply events to a fresh state.
pub fn state_after(events: &[ServiceEvent]) -> AppState {
    let mut state = AppState::default();
    for event in events {
        state.apply(event.clone());
    }
    state
}
