//! Mint invoker — submits the mint transaction and waits for it to be mined.
//!
//! The minted asset's link is not produced here. It arrives through the mint
//! event listener, independently of when this call returns.

use tokio::sync::mpsc;

use crate::config::{Config, ConfigError};
use crate::contract::{ContractError, ContractHandle};
use crate::events::ServiceEvent;
use crate::provider::ProviderCapability;

/// A mined mint transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintReceipt {
    pub tx_hash: String,
    pub tx_url: String,
}

/// Sends `MintSettled` when dropped, so the in-flight flag is cleared on every
/// exit path, including cancellation of the task running the mint.
struct InFlightGuard<'a> {
    events: &'a mpsc::UnboundedSender<ServiceEvent>,
}

impl<'a> InFlightGuard<'a> {
    fn start(events: &'a mpsc::UnboundedSender<ServiceEvent>) -> Self {
        let _ = events.send(ServiceEvent::MintStarted);
        Self { events }
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let _ = self.events.send(ServiceEvent::MintSettled);
    }
}

/// Mint one token from the configured collection.
///
/// Reports progress on `events`. Failures are logged and reported as
/// `MintFailed` as well as returned.
pub async fn mint_nft(
    capability: &ProviderCapability,
    config: &Config,
    events: &mpsc::UnboundedSender<ServiceEvent>,
) -> Result<MintReceipt, MintError> {
    let Some(provider) = capability.provider() else {
        log::info!("Wallet provider doesn't exist!");
        return Err(MintError::ProviderMissing);
    };
    let address = config.contract()?;

    let _guard = InFlightGuard::start(events);

    let result = async {
        let contract = ContractHandle::connect(provider.clone(), address).await?;

        log::info!("👛 Going to pop wallet now to pay gas...");
        let pending = contract.make_an_epic_nft().await?;
        let _ = events.send(ServiceEvent::MintSubmitted {
            tx_hash: pending.hash().to_string(),
        });

        log::info!("⛏️ Mining... please wait.");
        let receipt = pending.wait(config.receipt_poll_interval()).await?;
        Ok::<_, ContractError>(receipt)
    }
    .await;

    match result {
        Ok(receipt) => {
            let tx_url = config.tx_url(&receipt.transaction_hash);
            log::info!(
                "✅ Mined in block {}, see transaction: {}",
                receipt.block_number.as_deref().unwrap_or("?"),
                tx_url
            );
            let _ = events.send(ServiceEvent::MintConfirmed {
                tx_url: tx_url.clone(),
            });
            Ok(MintReceipt {
                tx_hash: receipt.transaction_hash,
                tx_url,
            })
        }
        Err(e) => {
            log::warn!("❌ Mint failed: {}", e);
            let _ = events.send(ServiceEvent::MintFailed(e.to_string()));
            Err(MintError::Contract(e))
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MintError {
    #[error("No wallet provider available")]
    ProviderMissing,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Contract(#[from] ContractError),
}
