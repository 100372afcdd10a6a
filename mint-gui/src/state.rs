//! Application state — plain data, no async, no Arc.
//!
//! `AppState` holds everything the mint view needs to render. The service task
//! sends `ServiceEvent`s which are applied via `AppState::apply()`. The UI reads
//! fields directly — no locking, no channels.

use crate::events::ServiceEvent;

/// All application state needed for rendering.
#[derive(Debug, Default)]
pub struct AppState {
    // -- Wallet --
    /// Whether a wallet provider was detected at startup.
    pub provider_available: bool,
    /// Empty while disconnected. There is no disconnect flow.
    pub active_account: String,
    pub chain_id: Option<String>,

    // -- Mint --
    pub mint_in_flight: bool,
    pub last_tx_hash: Option<String>,
    pub last_tx_url: Option<String>,

    // -- Minted assets --
    /// Append-only, in event delivery order.
    pub minted_links: Vec<String>,
    pub listener_subscribed: bool,

    // -- Messages --
    /// Blocking message, cleared when the user dismisses it.
    pub alert: Option<String>,
    /// Non-blocking warning (wrong network).
    pub warning: Option<String>,
    /// Last status line.
    pub status: Option<String>,
}

impl AppState {
    pub fn is_connected(&self) -> bool {
        !self.active_account.is_empty()
    }

    /// Apply a service event to the state.
    pub fn apply(&mut self, event: ServiceEvent) {
        match event {
            ServiceEvent::ProviderDetected { available } => {
                self.provider_available = available;
            }
            ServiceEvent::AccountConnected { account, chain_id } => {
                if account.is_empty() {
                    return;
                }
                self.active_account = account;
                if chain_id.is_some() {
                    self.chain_id = chain_id;
                }
            }
            ServiceEvent::WrongNetwork { chain_id, expected } => {
                self.warning = Some(format!(
                    "You are not connected to the expected test network (wallet is on {}, contract is on {})",
                    chain_id, expected
                ));
                self.chain_id = Some(chain_id);
            }
            ServiceEvent::ListenerSubscribed => {
                self.listener_subscribed = true;
            }
            ServiceEvent::ListenerUnsubscribed => {
                self.listener_subscribed = false;
            }
            ServiceEvent::MintStarted => {
                self.mint_in_flight = true;
                self.status = Some("Waiting for the wallet to sign...".to_string());
            }
            ServiceEvent::MintSubmitted { tx_hash } => {
                self.status = Some("Mining... please wait.".to_string());
                self.last_tx_hash = Some(tx_hash);
            }
            ServiceEvent::MintConfirmed { tx_url } => {
                self.status = Some(
                    "Minted! It can take a few minutes to show up on the marketplace.".to_string(),
                );
                self.last_tx_url = Some(tx_url);
            }
            ServiceEvent::MintFailed(message) => {
                self.status = Some(format!("Mint failed: {}", message));
            }
            ServiceEvent::MintSettled => {
                self.mint_in_flight = false;
            }
            ServiceEvent::NftMinted { link } => {
                self.minted_links.push(link);
            }
            ServiceEvent::Alert(message) => {
                self.alert = Some(message);
            }
        }
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }
}
