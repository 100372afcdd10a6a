//! Background service task — single `select!` loop.
//!
//! The service owns all async I/O. It detects the wallet provider, restores an
//! existing connection, keeps the mint event subscription for the lifetime of
//! the window, and turns [`UiEvent`]s into provider calls. Results go back to
//! the UI as [`ServiceEvent`]s.

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::connection;
use crate::events::{ServiceEvent, UiEvent};
use crate::listener::MintSubscription;
use crate::mint::{self, MintError};
use crate::provider::{self, LogEntry, ProviderCapability};

/// Run the service loop until the cancellation token fires.
pub async fn run(
    token: CancellationToken,
    ui_rx: mpsc::UnboundedReceiver<UiEvent>,
    svc_tx: mpsc::UnboundedSender<ServiceEvent>,
    config: Arc<Config>,
) {
    let capability = provider::detect(&config);
    run_with_provider(token, ui_rx, svc_tx, config, capability).await;
}

/// Service loop over an already-detected provider capability.
pub async fn run_with_provider(
    token: CancellationToken,
    mut ui_rx: mpsc::UnboundedReceiver<UiEvent>,
    svc_tx: mpsc::UnboundedSender<ServiceEvent>,
    config: Arc<Config>,
    capability: ProviderCapability,
) {
    let _ = svc_tx.send(ServiceEvent::ProviderDetected {
        available: capability.is_present(),
    });

    connection::restore(&capability, &svc_tx).await;

    let (log_tx, mut log_rx) = mpsc::unbounded_channel::<LogEntry>();
    let mut subscription = MintSubscription::mount(
        &capability,
        Arc::clone(&config),
        svc_tx.clone(),
        log_tx,
        &token,
    );

    let mut connect_task: Option<JoinHandle<()>> = None;
    let mut mint_task: Option<JoinHandle<()>> = None;

    log::info!("🚀 Service loop started");

    loop {
        tokio::select! {
            _ = token.cancelled() => {
                log::info!("🛑 Service loop shutting down");
                break;
            }

            Some(log) = log_rx.recv() => {
                if let Some(ref subscription) = subscription {
                    subscription.deliver(&log);
                }
            }

            Some(event) = ui_rx.recv() => {
                match event {
                    UiEvent::Shutdown => break,

                    // The wallet prompt can wait on the user indefinitely.
                    UiEvent::Connect => {
                        if connect_task.as_ref().is_some_and(|task| !task.is_finished()) {
                            log::info!("Connection request already pending, ignoring");
                        } else {
                            connect_task = Some(spawn_connect(
                                capability.clone(),
                                Arc::clone(&config),
                                svc_tx.clone(),
                            ));
                        }
                    }

                    UiEvent::Mint => {
                        if mint_task.as_ref().is_some_and(|task| !task.is_finished()) {
                            log::info!("Mint already in flight, ignoring request");
                        } else {
                            mint_task = Some(spawn_mint(
                                capability.clone(),
                                Arc::clone(&config),
                                svc_tx.clone(),
                            ));
                        }
                    }
                }
            }
        }
    }

    if let Some(mut subscription) = subscription.take() {
        subscription.unmount();
    }
    if let Some(task) = connect_task.take() {
        task.abort();
    }
    // Cancelling drops the in-flight guard, which settles the mint.
    if let Some(task) = mint_task.take() {
        task.abort();
    }
}

fn spawn_connect(
    capability: ProviderCapability,
    config: Arc<Config>,
    svc_tx: mpsc::UnboundedSender<ServiceEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        connection::connect(&capability, &config, &svc_tx).await;
    })
}

/// Run a mint in its own task so mint events keep flowing during the confirmation wait.
fn spawn_mint(
    capability: ProviderCapability,
    config: Arc<Config>,
    svc_tx: mpsc::UnboundedSender<ServiceEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        match mint::mint_nft(&capability, &config, &svc_tx).await {
            Ok(receipt) => log::debug!("Mint task finished: {}", receipt.tx_hash),
            Err(e @ (MintError::ProviderMissing | MintError::Config(_))) => {
                log::warn!("Mint not attempted: {}", e);
            }
            // Already logged and reported by the mint invoker
            Err(_) => {}
        }
    })
}
