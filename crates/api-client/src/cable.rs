// In crates/api-client/src/cable.rs

use app_config::{ApiSettings, RealtimeSettings};
use async_stream::stream;
use events::{DashboardChannel, PushEvent, Transport};
use futures::Stream;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::Value;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::HeaderValue;

use crate::Result;

const CHANNEL_NAME: &str = "DashboardChannel";
const CABLE_PROTOCOL: &str = "actioncable-v1-json";

// --- Wire format ---

/// One frame received from the cable server.
#[derive(Debug, Clone)]
pub enum CableFrame {
    Welcome,
    Ping,
    Confirmed,
    Rejected,
    Disconnect { reason: Option<String>, reconnect: bool },
    /// A broadcast on the subscribed channel.
    Event(PushEvent),
    /// Anything else, including broadcasts that are not push events.
    Unrecognised,
}

#[derive(Deserialize)]
struct RawFrame {
    #[serde(rename = "type")]
    kind: Option<String>,
    message: Option<Value>,
    reason: Option<String>,
    reconnect: Option<bool>,
}

/// Parses a text frame. Control frames carry a `type`; broadcasts carry a `message`.
pub fn parse_frame(text: &str) -> std::result::Result<CableFrame, serde_json::Error> {
    let raw: RawFrame = serde_json::from_str(text)?;
    let frame = match raw.kind.as_deref() {
        Some("welcome") => CableFrame::Welcome,
        Some("ping") => CableFrame::Ping,
        Some("confirm_subscription") => CableFrame::Confirmed,
        Some("reject_subscription") => CableFrame::Rejected,
        Some("disconnect") => CableFrame::Disconnect {
            reason: raw.reason,
            reconnect: raw.reconnect.unwrap_or(true),
        },
        Some(_) => CableFrame::Unrecognised,
        None => match raw.message.map(serde_json::from_value::<PushEvent>) {
            Some(Ok(event)) => CableFrame::Event(event),
            _ => CableFrame::Unrecognised,
        },
    };
    Ok(frame)
}

/// The channel identifier, itself a JSON document encoded as a string.
pub fn channel_identifier() -> String {
    serde_json::json!({ "channel": CHANNEL_NAME }).to_string()
}

pub fn subscribe_command() -> String {
    serde_json::json!({ "command": "subscribe", "identifier": channel_identifier() }).to_string()
}

fn cable_request(url: &str) -> Result<Request> {
    let mut request = url.into_client_request()?;
    request
        .headers_mut()
        .insert("Sec-WebSocket-Protocol", HeaderValue::from_static(CABLE_PROTOCOL));
    Ok(request)
}

// --- Stream ---

/// What the dashboard stream reports to its consumer.
#[derive(Debug, Clone)]
pub enum CableUpdate {
    Connected,
    Disconnected,
    Event(PushEvent),
}

/// Connects to the cable, subscribes to the dashboard channel and yields its
/// push events. Dropped connections are retried after `reconnect_delay`
/// until the server says not to reconnect.
pub fn dashboard_stream(url: String, reconnect_delay: Duration) -> impl Stream<Item = CableUpdate> {
    stream! {
        'connect: loop {
            tracing::info!(url = %url, "Connecting to dashboard cable...");
            let request = match cable_request(&url) {
                Ok(r) => r,
                Err(e) => {
                    tracing::error!(url = %url, error = %e, "Invalid cable URL. Giving up.");
                    break 'connect;
                }
            };
            let (ws_stream, _) = match connect_async(request).await {
                Ok(s) => s,
                Err(e) => {
                    tracing::error!(error = %e, ?reconnect_delay, "Cable connection failed. Retrying...");
                    tokio::time::sleep(reconnect_delay).await;
                    continue;
                }
            };
            tracing::info!("Cable connection successful.");

            let (mut write, mut read) = ws_stream.split();
            let mut subscribed = false;
            let mut reconnect = true;

            while let Some(message) = read.next().await {
                let text = match message {
                    Ok(Message::Text(text)) => text,
                    Ok(Message::Close(_)) => break,
                    Ok(_) => continue,
                    Err(e) => {
                        tracing::warn!(error = %e, "Error reading from cable. Reconnecting...");
                        break;
                    }
                };

                match parse_frame(text.as_str()) {
                    Ok(CableFrame::Welcome) => {
                        if let Err(e) = write.send(Message::text(subscribe_command())).await {
                            tracing::warn!(error = %e, "Failed to subscribe. Reconnecting...");
                            break;
                        }
                    }
                    Ok(CableFrame::Confirmed) => {
                        tracing::info!(channel = CHANNEL_NAME, "Subscribed to dashboard channel.");
                        subscribed = true;
                        yield CableUpdate::Connected;
                    }
                    Ok(CableFrame::Rejected) => {
                        tracing::error!(channel = CHANNEL_NAME, "Subscription rejected. Reconnecting...");
                        break;
                    }
                    Ok(CableFrame::Disconnect { reason, reconnect: again }) => {
                        tracing::warn!(?reason, reconnect = again, "Server closed the cable.");
                        reconnect = again;
                        break;
                    }
                    Ok(CableFrame::Event(event)) => yield CableUpdate::Event(event),
                    Ok(CableFrame::Ping) | Ok(CableFrame::Unrecognised) => {}
                    Err(e) => tracing::debug!(error = %e, "Ignoring undecodable cable frame"),
                }
            }

            if subscribed {
                yield CableUpdate::Disconnected;
            }
            if !reconnect {
                break 'connect;
            }
            tokio::time::sleep(reconnect_delay).await;
        }
    }
}

// --- Transport ---

/// Feeds a `DashboardChannel` from the cable on a background task.
pub struct CableTransport {
    url: String,
    reconnect_delay: Duration,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl CableTransport {
    pub fn new(url: impl Into<String>, reconnect_delay: Duration) -> Self {
        Self {
            url: url.into(),
            reconnect_delay,
            task: Mutex::new(None),
        }
    }

    pub fn from_settings(api: &ApiSettings, realtime: &RealtimeSettings) -> Self {
        Self::new(
            api.cable_url.clone(),
            Duration::from_secs(realtime.reconnect_delay_secs),
        )
    }

    pub fn is_running(&self) -> bool {
        self.slot().as_ref().is_some_and(|t| !t.is_finished())
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.task.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Transport for CableTransport {
    fn open(&self, channel: Arc<DashboardChannel>) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::error!("Cable transport opened outside a tokio runtime; staying disconnected.");
            return;
        };

        let updates = dashboard_stream(self.url.clone(), self.reconnect_delay);
        let task = runtime.spawn(async move {
            let mut updates = std::pin::pin!(updates);
            while let Some(update) = updates.next().await {
                match update {
                    CableUpdate::Connected => channel.set_connected(true),
                    CableUpdate::Disconnected => channel.set_connected(false),
                    CableUpdate::Event(event) => {
                        let handled = channel.dispatch(&event);
                        tracing::trace!(kind = ?event.kind, handled, "Push event dispatched");
                    }
                }
            }
            channel.set_connected(false);
        });

        if let Some(previous) = self.slot().replace(task) {
            previous.abort();
        }
    }

    fn close(&self) {
        if let Some(task) = self.slot().take() {
            task.abort();
            tracing::info!("Cable transport closed.");
        }
    }
}
