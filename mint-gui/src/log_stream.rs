//! WebSocket log subscription against the wallet provider.
//!
//! Opens `eth_subscribe("logs", filter)` on the provider's WebSocket endpoint
//! and forwards every matching log. Reconnects with exponential backoff until
//! cancelled; on cancellation the subscription is removed with
//! `eth_unsubscribe` before the socket closes.

use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

use crate::provider::LogEntry;

/// `eth_subscribe` log filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogFilter {
    pub address: String,
    pub topics: Vec<String>,
}

/// Client request to the provider
#[derive(Serialize)]
struct ClientMessage {
    jsonrpc: &'static str,
    id: u64,
    method: &'static str,
    params: serde_json::Value,
}

/// Anything the provider sends: a call response or a subscription notification.
#[derive(Deserialize, Debug)]
struct ServerMessage {
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    params: Option<NotificationParams>,
    #[serde(default)]
    result: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Deserialize, Debug)]
struct NotificationParams {
    subscription: String,
    result: serde_json::Value,
}

/// A message from the provider that the stream acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamMessage {
    /// Response to `eth_subscribe` carrying the subscription id.
    Subscribed(String),
    /// A log notification for a subscription.
    Log { subscription: String, log: LogEntry },
    /// Error response.
    Error(String),
}

const SUBSCRIBE_ID: u64 = 1;
const UNSUBSCRIBE_ID: u64 = 2;

/// Parse one text frame from the provider. Unknown frames yield `None`.
pub fn parse_message(text: &str) -> Option<StreamMessage> {
    let msg = match serde_json::from_str::<ServerMessage>(text) {
        Ok(msg) => msg,
        Err(e) => {
            log::debug!("Failed to parse WebSocket message: {}", e);
            return None;
        }
    };

    if let Some(error) = msg.error {
        return Some(StreamMessage::Error(error.to_string()));
    }

    if msg.method.as_deref() == Some("eth_subscription") {
        let params = msg.params?;
        return match serde_json::from_value::<LogEntry>(params.result) {
            Ok(log) => Some(StreamMessage::Log {
                subscription: params.subscription,
                log,
            }),
            Err(e) => {
                log::warn!("Failed to parse log notification: {}", e);
                None
            }
        };
    }

    match msg.result {
        Some(serde_json::Value::String(id)) => Some(StreamMessage::Subscribed(id)),
        _ => None,
    }
}

/// Background task that keeps a log subscription alive.
pub struct LogStream;

impl LogStream {
    /// Start the subscription in a background task.
    pub fn start(
        ws_url: String,
        filter: LogFilter,
        log_tx: mpsc::UnboundedSender<LogEntry>,
        token: CancellationToken,
    ) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut backoff_secs = 1u64;
            let max_backoff = 60u64;

            loop {
                if token.is_cancelled() {
                    break;
                }

                log::info!("📡 Connecting to WebSocket at {}...", ws_url);

                let connect = tokio::select! {
                    _ = token.cancelled() => break,
                    result = tokio_tungstenite::connect_async(&ws_url) => result,
                };

                match connect {
                    Ok((ws_stream, _response)) => {
                        log::info!("✅ WebSocket connected to {}", ws_url);
                        backoff_secs = 1;

                        match Self::handle_connection(ws_stream, &filter, &log_tx, &token).await {
                            Ok(()) => log::info!("WebSocket connection closed normally"),
                            Err(e) => log::warn!("⚠️ WebSocket connection error: {}", e),
                        }
                    }
                    Err(e) => {
                        log::warn!(
                            "⚠️ WebSocket connection failed: {} (retry in {}s)",
                            e,
                            backoff_secs
                        );
                    }
                }

                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = tokio::time::sleep(std::time::Duration::from_secs(backoff_secs)) => {}
                }
                backoff_secs = (backoff_secs * 2).min(max_backoff);
            }

            log::info!("🛑 Log stream shut down");
        })
    }

    async fn handle_connection(
        ws_stream: tokio_tungstenite::WebSocketStream<
            tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
        >,
        filter: &LogFilter,
        log_tx: &mpsc::UnboundedSender<LogEntry>,
        token: &CancellationToken,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let (mut ws_sender, mut ws_receiver) = ws_stream.split();

        let subscribe = ClientMessage {
            jsonrpc: "2.0",
            id: SUBSCRIBE_ID,
            method: "eth_subscribe",
            params: serde_json::json!(["logs", filter]),
        };
        ws_sender
            .send(Message::Text(serde_json::to_string(&subscribe)?))
            .await?;

        let mut subscription_id: Option<String> = None;

        loop {
            tokio::select! {
                msg = ws_receiver.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => match parse_message(&text) {
                            Some(StreamMessage::Subscribed(id)) => {
                                log::info!("✅ Subscription confirmed: {}", id);
                                subscription_id = Some(id);
                            }
                            Some(StreamMessage::Log { subscription, log }) => {
                                if subscription_id.as_deref() == Some(subscription.as_str()) {
                                    if log_tx.send(log).is_err() {
                                        break;
                                    }
                                } else {
                                    log::debug!("Log for unknown subscription {}", subscription);
                                }
                            }
                            Some(StreamMessage::Error(e)) => {
                                return Err(format!("provider error: {}", e).into());
                            }
                            None => {}
                        },
                        Some(Ok(Message::Ping(data))) => {
                            ws_sender.send(Message::Pong(data)).await?;
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            log::info!("WebSocket server closed connection");
                            break;
                        }
                        Some(Err(e)) => {
                            return Err(Box::new(e));
                        }
                        _ => {}
                    }
                }

                _ = token.cancelled() => {
                    if let Some(id) = subscription_id.take() {
                        let unsubscribe = ClientMessage {
                            jsonrpc: "2.0",
                            id: UNSUBSCRIBE_ID,
                            method: "eth_unsubscribe",
                            params: serde_json::json!([id]),
                        };
                        let json = serde_json::to_string(&unsubscribe)?;
                        let _ = ws_sender.send(Message::Text(json)).await;
                    }
                    let _ = ws_sender.send(Message::Close(None)).await;
                    break;
                }
            }
        }

        Ok(())
    }
}
