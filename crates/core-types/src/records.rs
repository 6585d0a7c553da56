// In crates/core-types/src/records.rs
//
// Rows served by the paginated list endpoints.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::Bias;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Macd {
    pub value: f64,
    pub signal: f64,
    pub histogram: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SnapshotIndicators {
    pub rsi_14: Option<f64>,
    pub ema_20: Option<f64>,
    pub ema_50: Option<f64>,
    pub ema_100: Option<f64>,
    pub macd: Option<Macd>,
    pub pivot_points: Option<HashMap<String, f64>>,
}

/// A point-in-time capture of one symbol's price and indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub id: i64,
    pub symbol: String,
    pub price: Decimal,
    #[serde(default)]
    pub indicators: SnapshotIndicators,
    #[serde(default)]
    pub sentiment: Option<serde_json::Value>,
    pub captured_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastListItem {
    pub id: i64,
    pub symbol: String,
    pub timeframe: String,
    pub current_price: Decimal,
    pub predicted_price: Decimal,
    pub direction: Bias,
    pub change_pct: f64,
    pub forecast_for: DateTime<Utc>,
    #[serde(default)]
    pub actual_price: Option<Decimal>,
    #[serde(default)]
    pub mae: Option<f64>,
    #[serde(default)]
    pub mape: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// One call the agent made against the exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionLog {
    pub id: i64,
    pub action: String,
    pub status: String,
    pub loggable_type: Option<String>,
    pub loggable_id: Option<i64>,
    pub duration_ms: Option<u64>,
    pub error_message: Option<String>,
    #[serde(default)]
    pub request_payload: Option<serde_json::Value>,
    #[serde(default)]
    pub response_payload: Option<serde_json::Value>,
    pub executed_at: DateTime<Utc>,
}
