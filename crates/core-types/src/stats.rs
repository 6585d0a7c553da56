// In crates/core-types/src/stats.rs
//
// Aggregates served by the stats, performance, market and cost endpoints.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::types::{Bias, MacdSignal, RsiSignal};

// --- Performance ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    /// Day label as sent by the backend (a date or an ISO timestamp).
    pub date: String,
    pub daily_pnl: Decimal,
    pub cumulative_pnl: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PerformanceStats {
    pub total_trades: u32,
    pub wins: u32,
    pub losses: u32,
    /// Percentage, `0..=100`.
    pub win_rate: f64,
    pub total_pnl: Decimal,
    pub avg_win: Decimal,
    pub avg_loss: Decimal,
}

/// The body of `GET /positions/performance`: the equity curve and closed-trade stats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceData {
    pub equity_curve: Vec<EquityPoint>,
    pub statistics: PerformanceStats,
}

// --- Decision and execution statistics ---

/// The body of `GET /decisions/stats`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionStats {
    pub period_hours: u32,
    pub total_decisions: u64,
    pub by_status: BTreeMap<String, u64>,
    pub by_symbol: BTreeMap<String, u64>,
    pub by_operation: BTreeMap<String, u64>,
    pub average_confidence: Option<f64>,
    pub execution_rate: f64,
    #[serde(default)]
    pub rejection_reasons: BTreeMap<String, u64>,
}

/// The body of `GET /execution_logs/stats`. Every field is optional on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ExecutionLogsStats {
    pub period_hours: Option<u32>,
    pub total_logs: u64,
    pub by_action: BTreeMap<String, u64>,
    pub by_status: BTreeMap<String, u64>,
    pub success_rate: Option<f64>,
    pub average_duration_ms: Option<f64>,
}

// --- Market data ---

/// Latest indicators for one tracked symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketAsset {
    pub symbol: String,
    pub price: Decimal,
    pub rsi_14: Option<f64>,
    pub rsi_signal: Option<RsiSignal>,
    pub macd_signal: Option<MacdSignal>,
    pub ema_20: Option<f64>,
    pub ema_50: Option<f64>,
    pub ema_100: Option<f64>,
    pub above_ema_20: Option<bool>,
    pub above_ema_50: Option<bool>,
    pub captured_at: DateTime<Utc>,
}

/// The body of `GET /market_data/current`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentMarketData {
    pub assets: Vec<MarketAsset>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub current_price: Decimal,
    pub predicted_price: Decimal,
    pub direction: Bias,
    pub change_pct: f64,
    pub forecast_for: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Symbol -> timeframe -> latest forecast. `None` where no forecast exists yet.
pub type ForecastGrid = BTreeMap<String, BTreeMap<String, Option<ForecastPoint>>>;

// --- Costs ---

/// The window a cost summary covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CostPeriod {
    #[default]
    Today,
    Week,
    Month,
    All,
}

impl CostPeriod {
    pub fn as_str(self) -> &'static str {
        match self {
            CostPeriod::Today => "today",
            CostPeriod::Week => "week",
            CostPeriod::Month => "month",
            CostPeriod::All => "all",
        }
    }
}

impl fmt::Display for CostPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Net P&L after fees, with the running costs of the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostSummary {
    pub period: String,
    pub trading_fees: Decimal,
    pub llm_costs: Decimal,
    pub server_cost_daily: Decimal,
    pub total_costs: Decimal,
    pub gross_realized_pnl: Decimal,
    pub net_realized_pnl: Decimal,
    pub llm_provider: String,
    pub llm_model: String,
}

/// The body of `GET /costs/llm`. Every field is optional on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LlmCosts {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub total_cost: Decimal,
    pub total_calls: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// The body of `GET /costs/trading`. Every field is optional on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TradingCosts {
    pub total_fees: Decimal,
    pub trade_count: u64,
    pub gross_realized_pnl: Decimal,
    pub net_realized_pnl: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn forecast_grid_keeps_missing_timeframes() {
        let body = serde_json::json!({
            "BTC": {
                "1h": {
                    "current_price": 97000, "predicted_price": 97500.5, "direction": "bullish",
                    "change_pct": 0.52, "forecast_for": "2024-06-01T13:00:00Z",
                    "created_at": "2024-06-01T12:00:00Z"
                },
                "1d": null
            }
        });
        let grid: ForecastGrid = serde_json::from_value(body).unwrap();
        let btc = &grid["BTC"];
        assert_eq!(btc["1h"].as_ref().unwrap().predicted_price, dec!(97500.5));
        assert!(btc["1d"].is_none());
    }

    #[test]
    fn sparse_stats_decode_with_defaults() {
        let logs: ExecutionLogsStats =
            serde_json::from_value(serde_json::json!({ "total_logs": 12 })).unwrap();
        assert_eq!(logs.total_logs, 12);
        assert!(logs.by_action.is_empty());

        let llm: LlmCosts = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(llm.total_cost, Decimal::ZERO);
    }

    #[test]
    fn cost_period_uses_query_names() {
        assert_eq!(CostPeriod::default().as_str(), "today");
        assert_eq!(CostPeriod::Month.to_string(), "month");
    }
}
