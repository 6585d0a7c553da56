// --- Push Event Structures ---

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub mod channel;
pub mod connection;

pub use channel::{DashboardChannel, Subscription};
pub use connection::{ConnectionLease, ConnectionManager, Transport};

/// The kinds of message the backend pushes on the dashboard channel.
///
/// Unrecognised kinds decode to `Unknown` so that newer backends do not break
/// older dashboards; nothing is ever subscribed to `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    MarketUpdate,
    PositionUpdate,
    DecisionUpdate,
    MacroStrategyUpdate,
    SystemStatusUpdate,
    #[serde(other)]
    Unknown,
}

/// A single pushed message: `{ "type": ..., "data": ..., "timestamp": ... }`.
///
/// `data` is kept as raw JSON; each consumer decodes the payload shape it expects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushEvent {
    #[serde(rename = "type")]
    pub kind: EventType,
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    /// Position updates carry `opened`, `closed` or `updated` here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

impl PushEvent {
    pub fn new(kind: EventType, data: serde_json::Value) -> Self {
        Self {
            kind,
            data,
            timestamp: Utc::now(),
            action: None,
        }
    }

    /// Decodes the payload into the shape the event kind promises.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.data)
    }
}
