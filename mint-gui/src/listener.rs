//! Mint event listener.
//!
//! While mounted, every `NewEpicNFTMinted` log emitted by the collection
//! contract becomes one marketplace link appended to the UI's list. The
//! [`MintSubscription`] handle owns the append function; once it is
//! unmounted nothing more is appended, even for logs already in flight.

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::contract::{self, MintedToken};
use crate::events::ServiceEvent;
use crate::log_stream::{LogFilter, LogStream};
use crate::provider::{LogEntry, ProviderCapability};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    Subscribed,
    Unsubscribed,
}

/// Turns minted tokens into display links and appends them to the UI list.
#[derive(Clone)]
pub struct LinkSink {
    config: Arc<Config>,
    events: mpsc::UnboundedSender<ServiceEvent>,
}

impl LinkSink {
    pub fn new(config: Arc<Config>, events: mpsc::UnboundedSender<ServiceEvent>) -> Self {
        Self { config, events }
    }

    pub fn append(&self, minted: &MintedToken) {
        let link = self.config.asset_url(&minted.token_id);
        log::info!(
            "🎉 Minted token {} for {}. It can take up to 10 minutes to show up: {}",
            minted.token_id,
            minted.sender,
            link
        );
        let _ = self.events.send(ServiceEvent::NftMinted { link });
    }
}

/// Subscription handle for the mint event.
pub struct MintSubscription {
    sink: Option<LinkSink>,
    stream: Option<(CancellationToken, JoinHandle<()>)>,
}

impl MintSubscription {
    /// A subscribed handle with no log source attached; logs are fed through [`deliver`].
    ///
    /// [`deliver`]: MintSubscription::deliver
    pub fn new(sink: LinkSink) -> Self {
        let _ = sink.events.send(ServiceEvent::ListenerSubscribed);
        Self {
            sink: Some(sink),
            stream: None,
        }
    }

    /// Subscribe to the contract's mint event through the wallet provider.
    ///
    /// Returns `None`, without retrying, when no provider is present. Raw logs
    /// are forwarded to `log_tx`; the owner passes them back to [`deliver`].
    ///
    /// [`deliver`]: MintSubscription::deliver
    pub fn mount(
        capability: &ProviderCapability,
        config: Arc<Config>,
        events: mpsc::UnboundedSender<ServiceEvent>,
        log_tx: mpsc::UnboundedSender<LogEntry>,
        parent: &CancellationToken,
    ) -> Option<Self> {
        let Some(provider) = capability.provider() else {
            log::info!("Wallet provider doesn't exist, not listening for mints");
            return None;
        };

        let mut subscription = Self::new(LinkSink::new(Arc::clone(&config), events));

        match provider.subscription_url() {
            Some(ws_url) => {
                let filter = LogFilter {
                    address: config.contract_address.clone(),
                    topics: vec![contract::mint_event_topic()],
                };
                let token = parent.child_token();
                let handle = LogStream::start(ws_url, filter, log_tx, token.clone());
                subscription.stream = Some((token, handle));
                log::info!("👂 Setup event listener!");
            }
            None => {
                log::warn!("Wallet provider has no subscription endpoint, minted links won't be listed");
            }
        }

        Some(subscription)
    }

    pub fn state(&self) -> ListenerState {
        if self.sink.is_some() {
            ListenerState::Subscribed
        } else {
            ListenerState::Unsubscribed
        }
    }

    /// Mint event callback. No-op once unsubscribed.
    pub fn deliver(&self, log: &LogEntry) {
        let Some(ref sink) = self.sink else {
            log::debug!("Dropping log delivered after unsubscribe");
            return;
        };
        if log.removed {
            log::debug!("Ignoring removed log {:?}", log.transaction_hash);
            return;
        }

        match contract::decode_mint_log(log) {
            Ok(minted) => sink.append(&minted),
            Err(e) => log::warn!("Ignoring undecodable mint log: {}", e),
        }
    }

    /// Stop listening. Safe to call more than once.
    pub fn unmount(&mut self) {
        if let Some((token, _handle)) = self.stream.take() {
            token.cancel();
        }
        if let Some(sink) = self.sink.take() {
            let _ = sink.events.send(ServiceEvent::ListenerUnsubscribed);
            log::info!("🔇 Mint event listener removed");
        }
    }
}

impl Drop for MintSubscription {
    fn drop(&mut self) {
        self.unmount();
    }
}
