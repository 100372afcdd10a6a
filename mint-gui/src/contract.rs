//! Collection contract handle.
//!
//! Binds the bundled contract interface to a deployed address and a signer
//! account. Calls go out as `eth_sendTransaction` through the wallet provider,
//! which signs and broadcasts; this module only encodes calldata, polls for
//! the receipt and decodes the mint event.

use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::{sol, SolCall, SolEvent};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::provider::{LogEntry, ProviderError, TransactionReceipt, TransactionRequest, WalletProvider};

sol! {
    /// Interface of the deployed collection contract.
    interface IEpicNft {
        /// Emitted once per mint, after the token is assigned to `sender`.
        event NewEpicNFTMinted(address sender, uint256 tokenId);

        function makeAnEpicNFT() external;
    }
}

/// Topic0 of the mint event, 0x-prefixed.
pub fn mint_event_topic() -> String {
    IEpicNft::NewEpicNFTMinted::SIGNATURE_HASH.to_string()
}

/// A decoded mint event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintedToken {
    pub sender: Address,
    pub token_id: U256,
    pub tx_hash: Option<String>,
}

/// Decode a `NewEpicNFTMinted` log.
pub fn decode_mint_log(log: &LogEntry) -> Result<MintedToken, ContractError> {
    let topics = log
        .topics
        .iter()
        .map(|topic| B256::from_str(topic))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ContractError::InvalidLog(format!("bad topic: {}", e)))?;
    let data = hex::decode(log.data.trim_start_matches("0x"))
        .map_err(|e| ContractError::InvalidLog(format!("bad data: {}", e)))?;

    let event = IEpicNft::NewEpicNFTMinted::decode_raw_log(topics, &data)
        .map_err(|e| ContractError::InvalidLog(e.to_string()))?;

    Ok(MintedToken {
        sender: event.sender,
        token_id: event.tokenId,
        tx_hash: log.transaction_hash.clone(),
    })
}

/// Contract handle bound to a signer account.
#[derive(Clone)]
pub struct ContractHandle {
    address: Address,
    signer: String,
    provider: Arc<dyn WalletProvider>,
}

impl ContractHandle {
    /// Bind to `address`, signing with the first account the provider has authorized.
    pub async fn connect(
        provider: Arc<dyn WalletProvider>,
        address: Address,
    ) -> Result<Self, ContractError> {
        let signer = provider
            .accounts()
            .await?
            .into_iter()
            .next()
            .ok_or(ContractError::NoSigner)?;

        Ok(Self {
            address,
            signer,
            provider,
        })
    }

    /// Submit `makeAnEpicNFT()`. Resolves once the wallet has broadcast the transaction.
    pub async fn make_an_epic_nft(&self) -> Result<PendingTransaction, ContractError> {
        // No arguments, so the calldata is the bare selector.
        let data = format!("0x{}", hex::encode(IEpicNft::makeAnEpicNFTCall::SELECTOR));
        let tx = TransactionRequest {
            from: self.signer.clone(),
            to: self.address.to_string(),
            data,
        };

        let hash = self.provider.send_transaction(tx).await?;
        Ok(PendingTransaction {
            hash,
            provider: Arc::clone(&self.provider),
        })
    }
}

/// A broadcast transaction awaiting inclusion.
pub struct PendingTransaction {
    hash: String,
    provider: Arc<dyn WalletProvider>,
}

impl PendingTransaction {
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Poll for the receipt until the transaction is mined. Never times out.
    pub async fn wait(&self, poll_interval: Duration) -> Result<TransactionReceipt, ContractError> {
        loop {
            match self.provider.transaction_receipt(&self.hash).await? {
                Some(receipt) if receipt.is_success() => return Ok(receipt),
                Some(_) => return Err(ContractError::Reverted(self.hash.clone())),
                None => tokio::time::sleep(poll_interval).await,
            }
        }
    }
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ContractError {
    #[error("Wallet has no authorized account to sign with")]
    NoSigner,

    #[error("Transaction {0} reverted")]
    Reverted(String),

    #[error("Invalid event log: {0}")]
    InvalidLog(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}
