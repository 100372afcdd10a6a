//! Connection manager — finds or requests the active wallet account.

use tokio::sync::mpsc;

use crate::config::Config;
use crate::events::ServiceEvent;
use crate::provider::{ProviderCapability, ProviderError};

/// Outcome of an explicit connection request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub account: String,
    pub chain_id: String,
    /// The wallet is on a different chain than `Config::expected_chain_id`.
    pub wrong_network: bool,
}

/// Look for an account the user already authorized. Never prompts.
///
/// Returns `None` when no provider is present, nothing is authorized, or the
/// provider fails. Errors are logged, never propagated.
pub async fn check_existing_connection(capability: &ProviderCapability) -> Option<String> {
    let Some(provider) = capability.provider() else {
        log::info!("Make sure you have a wallet provider!");
        return None;
    };

    match provider.accounts().await {
        Ok(accounts) => match accounts.into_iter().next() {
            Some(account) => {
                log::info!("🔑 Found an authorized account: {}", account);
                Some(account)
            }
            None => {
                log::info!("No authorized account found");
                None
            }
        },
        Err(e) => {
            log::warn!("Failed to query authorized accounts: {}", e);
            None
        }
    }
}

/// Prompt the wallet for account access and read the connected chain.
///
/// A chain mismatch does not fail the connection; it is reported in
/// [`Connection::wrong_network`].
pub async fn request_connection(
    capability: &ProviderCapability,
    config: &Config,
) -> Result<Connection, ConnectError> {
    let provider = capability.provider().ok_or(ConnectError::ProviderMissing)?;

    let accounts = provider.request_accounts().await?;
    let chain_id = provider.chain_id().await?;
    log::info!("Connected to chain {}", chain_id);

    let account = accounts
        .into_iter()
        .next()
        .ok_or(ConnectError::NoAccounts)?;

    let wrong_network = !config.is_expected_chain(&chain_id);
    if wrong_network {
        log::warn!(
            "⚠️ Wallet is on chain {}, expected {}",
            chain_id,
            config.expected_chain_id
        );
    }

    log::info!("✅ Connected {}", account);
    Ok(Connection {
        account,
        chain_id,
        wrong_network,
    })
}

/// Startup check: adopt an already-authorized account, if any.
pub async fn restore(capability: &ProviderCapability, events: &mpsc::UnboundedSender<ServiceEvent>) {
    if let Some(account) = check_existing_connection(capability).await {
        let _ = events.send(ServiceEvent::AccountConnected {
            account,
            chain_id: None,
        });
    }
}

/// Handle a connect click: request access and report the outcome to the UI.
///
/// A missing provider becomes a blocking alert. Any other failure is logged
/// and leaves the UI state unchanged.
pub async fn connect(
    capability: &ProviderCapability,
    config: &Config,
    events: &mpsc::UnboundedSender<ServiceEvent>,
) {
    match request_connection(capability, config).await {
        Ok(connection) => {
            let _ = events.send(ServiceEvent::AccountConnected {
                account: connection.account,
                chain_id: Some(connection.chain_id.clone()),
            });
            if connection.wrong_network {
                let _ = events.send(ServiceEvent::WrongNetwork {
                    chain_id: connection.chain_id,
                    expected: config.expected_chain_id.clone(),
                });
            }
        }
        Err(ConnectError::ProviderMissing) => {
            log::warn!("Connect requested without a wallet provider");
            let _ = events.send(ServiceEvent::Alert(
                "Get a wallet! No wallet provider is configured.".to_string(),
            ));
        }
        Err(e) => {
            log::warn!("Wallet connection failed: {}", e);
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("No wallet provider available")]
    ProviderMissing,

    #[error("Wallet returned no accounts")]
    NoAccounts,

    #[error(transparent)]
    Provider(#[from] ProviderError),
}
