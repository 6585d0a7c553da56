// In crates/core-types/src/types.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::stats::CostSummary;

// --- Enumerations shared by the dashboard records ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bias {
    Bullish,
    Bearish,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Long,
    Short,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionStatus {
    Open,
    Closing,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionStatus {
    Pending,
    Approved,
    Rejected,
    Executed,
    Failed,
}

/// The action a trading decision asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Open,
    Close,
    Hold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RsiSignal {
    Oversold,
    Overbought,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MacdSignal {
    Bullish,
    Bearish,
}

// --- Dashboard records ---

/// A position held by the agent, open or historical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub id: i64,
    pub symbol: String,
    pub direction: Direction,
    pub size: Decimal,
    pub entry_price: Decimal,
    pub current_price: Option<Decimal>,
    pub leverage: u32,
    pub margin_used: Option<Decimal>,
    pub unrealized_pnl: Option<Decimal>,
    pub pnl_percent: f64,
    pub status: PositionStatus,
    pub stop_loss_price: Option<Decimal>,
    pub take_profit_price: Option<Decimal>,
    pub risk_reward_ratio: Option<f64>,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub close_reason: Option<String>,
    pub realized_pnl: Option<Decimal>,
}

/// A single decision produced by the agent's trading cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingDecision {
    pub id: i64,
    pub symbol: String,
    pub operation: Operation,
    pub direction: Option<Direction>,
    /// Confidence in `[0, 1]`, when the model reported one.
    pub confidence: Option<f64>,
    pub status: DecisionStatus,
    pub executed: bool,
    pub rejection_reason: Option<String>,
    pub leverage: Option<u32>,
    pub stop_loss: Option<Decimal>,
    pub take_profit: Option<Decimal>,
    pub reasoning: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct KeyLevels {
    pub support: Vec<Decimal>,
    pub resistance: Vec<Decimal>,
}

/// The agent's higher-timeframe market view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroStrategy {
    pub id: i64,
    pub bias: Bias,
    pub risk_tolerance: f64,
    pub market_narrative: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_levels: Option<HashMap<String, KeyLevels>>,
    pub valid_until: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub stale: bool,
}

/// Per-symbol indicator summary shown on the market card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketOverview {
    pub price: Decimal,
    pub rsi: Option<f64>,
    pub rsi_signal: Option<RsiSignal>,
    pub macd_signal: Option<MacdSignal>,
    pub above_ema_50: Option<bool>,
    pub forecast_direction: Option<Bias>,
    pub forecast_change_pct: Option<f64>,
    pub updated_at: DateTime<Utc>,
}

/// Symbol -> overview. A `None` value means the backend knows the symbol but has no data yet.
pub type MarketMap = BTreeMap<String, Option<MarketOverview>>;

/// Circuit-breaker counters reported with the account summary.
///
/// Whether trading is allowed is deliberately not read from here; the health
/// endpoint is the single source for that flag (see `HealthResponse`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CircuitBreaker {
    pub daily_loss: Option<Decimal>,
    pub consecutive_losses: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSummary {
    pub open_positions_count: u32,
    pub total_unrealized_pnl: Decimal,
    pub total_margin_used: Decimal,
    pub realized_pnl_today: Decimal,
    pub paper_trading: bool,
    #[serde(default)]
    pub circuit_breaker: CircuitBreaker,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedHealth {
    pub healthy: bool,
    pub last_update: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleHealth {
    pub healthy: bool,
    pub last_run: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyHealth {
    pub healthy: bool,
    pub last_update: Option<DateTime<Utc>>,
    pub stale: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemStatus {
    pub market_data: FeedHealth,
    pub trading_cycle: CycleHealth,
    pub macro_strategy: StrategyHealth,
    pub paper_trading: bool,
    pub assets_tracked: Vec<String>,
}

/// The aggregate returned by `GET /dashboard`: everything the overview page shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardData {
    pub account: AccountSummary,
    pub positions: Vec<Position>,
    pub market: MarketMap,
    pub macro_strategy: Option<MacroStrategy>,
    /// Newest first.
    pub recent_decisions: Vec<TradingDecision>,
    pub system_status: SystemStatus,
    /// Today's costs; older backends omit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_summary: Option<CostSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionsSummary {
    pub count: u32,
    pub total_pnl: Decimal,
    pub gross_pnl: Decimal,
    pub total_fees: Decimal,
    pub net_pnl: Decimal,
    pub total_margin: Decimal,
}

/// The body of `GET /positions/open`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenPositions {
    pub positions: Vec<Position>,
    pub summary: PositionsSummary,
}

/// The body of `GET /macro_strategies/current`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentMacroStrategy {
    pub strategy: Option<MacroStrategy>,
    #[serde(default)]
    pub needs_refresh: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
}

/// The body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub environment: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub paper_trading: Option<bool>,
    #[serde(default)]
    pub trading_allowed: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn dashboard_decodes_backend_payload() {
        let body = serde_json::json!({
            "account": {
                "open_positions_count": 1,
                "total_unrealized_pnl": 12.5,
                "total_margin_used": 300,
                "realized_pnl_today": -4.25,
                "paper_trading": true,
                "circuit_breaker": { "trading_allowed": true, "daily_loss": null, "consecutive_losses": 0 }
            },
            "positions": [],
            "market": {
                "BTC": {
                    "price": 97000.5, "rsi": 55.1, "rsi_signal": "neutral", "macd_signal": "bullish",
                    "above_ema_50": true, "forecast_direction": "bullish", "forecast_change_pct": 1.2,
                    "updated_at": "2024-06-01T12:00:00Z"
                },
                "DOGE": null
            },
            "macro_strategy": null,
            "recent_decisions": [],
            "system_status": {
                "market_data": { "healthy": true, "last_update": "2024-06-01T12:00:00Z" },
                "trading_cycle": { "healthy": true, "last_run": null },
                "macro_strategy": { "healthy": false, "last_update": null, "stale": null },
                "paper_trading": true,
                "assets_tracked": ["BTC", "DOGE"]
            }
        });

        let data: DashboardData = serde_json::from_value(body).unwrap();
        assert_eq!(data.account.realized_pnl_today, dec!(-4.25));
        assert_eq!(data.market["BTC"].as_ref().unwrap().rsi_signal, Some(RsiSignal::Neutral));
        assert!(data.market["DOGE"].is_none());
        assert_eq!(data.account.circuit_breaker.consecutive_losses, Some(0));
        assert!(data.system_status.trading_cycle.last_run.is_none());
        assert!(data.cost_summary.is_none());
    }

    #[test]
    fn health_flags_are_optional() {
        let body = serde_json::json!({
            "status": "ok", "version": "1.4.0", "environment": "production",
            "timestamp": "2024-06-01T12:00:00Z"
        });
        let health: HealthResponse = serde_json::from_value(body).unwrap();
        assert_eq!(health.trading_allowed, None);
        assert_eq!(health.paper_trading, None);
    }
}
