// In crates/core-types/src/fixtures.rs
//
// Factories for tests across the workspace. Enabled by the `fixtures` feature.

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::stats::CostSummary;
use crate::types::*;

/// 2024-06-01T12:00:00Z, the reference instant used by every factory.
pub fn reference_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0)
        .single()
        .expect("valid reference time")
}

pub fn market_overview(price: i64) -> MarketOverview {
    MarketOverview {
        price: Decimal::from(price),
        rsi: Some(50.0),
        rsi_signal: Some(RsiSignal::Neutral),
        macd_signal: Some(MacdSignal::Bullish),
        above_ema_50: Some(true),
        forecast_direction: Some(Bias::Neutral),
        forecast_change_pct: Some(0.5),
        updated_at: reference_time(),
    }
}

pub fn decision(id: i64, symbol: &str) -> TradingDecision {
    TradingDecision {
        id,
        symbol: symbol.to_string(),
        operation: Operation::Open,
        direction: Some(Direction::Long),
        confidence: Some(0.8),
        status: DecisionStatus::Executed,
        executed: true,
        rejection_reason: None,
        leverage: Some(5),
        stop_loss: None,
        take_profit: None,
        reasoning: Some("Momentum confirmed on the 4h chart".to_string()),
        created_at: reference_time(),
    }
}

pub fn macro_strategy(id: i64, bias: Bias) -> MacroStrategy {
    MacroStrategy {
        id,
        bias,
        risk_tolerance: 0.6,
        market_narrative: "Range-bound with a bullish tilt".to_string(),
        key_levels: None,
        valid_until: reference_time() + chrono::Duration::hours(12),
        created_at: reference_time(),
        stale: false,
    }
}

pub fn position(id: i64, symbol: &str) -> Position {
    Position {
        id,
        symbol: symbol.to_string(),
        direction: Direction::Long,
        size: Decimal::new(15, 2),
        entry_price: Decimal::from(95_000),
        current_price: Some(Decimal::from(96_000)),
        leverage: 5,
        margin_used: Some(Decimal::from(2_850)),
        unrealized_pnl: Some(Decimal::from(150)),
        pnl_percent: 1.05,
        status: PositionStatus::Open,
        stop_loss_price: None,
        take_profit_price: None,
        risk_reward_ratio: None,
        opened_at: reference_time(),
        closed_at: None,
        close_reason: None,
        realized_pnl: None,
    }
}

pub fn system_status() -> SystemStatus {
    SystemStatus {
        market_data: FeedHealth { healthy: true, last_update: Some(reference_time()) },
        trading_cycle: CycleHealth { healthy: true, last_run: Some(reference_time()) },
        macro_strategy: StrategyHealth {
            healthy: true,
            last_update: Some(reference_time()),
            stale: Some(false),
        },
        paper_trading: true,
        assets_tracked: vec!["BTC".to_string(), "ETH".to_string()],
    }
}

pub fn account_summary() -> AccountSummary {
    AccountSummary {
        open_positions_count: 1,
        total_unrealized_pnl: Decimal::from(150),
        total_margin_used: Decimal::from(2_850),
        realized_pnl_today: Decimal::ZERO,
        paper_trading: true,
        circuit_breaker: CircuitBreaker::default(),
    }
}

/// A dashboard with BTC and ETH market data and `decisions` recent decisions (ids 1..=n, newest first).
pub fn dashboard(decisions: usize) -> DashboardData {
    let mut market = MarketMap::new();
    market.insert("BTC".to_string(), Some(market_overview(97_000)));
    market.insert("ETH".to_string(), Some(market_overview(3_500)));

    DashboardData {
        account: account_summary(),
        positions: vec![position(1, "BTC")],
        market,
        macro_strategy: Some(macro_strategy(1, Bias::Bullish)),
        recent_decisions: (1..=decisions as i64).rev().map(|id| decision(id, "BTC")).collect(),
        system_status: system_status(),
        cost_summary: Some(cost_summary()),
    }
}

pub fn cost_summary() -> CostSummary {
    CostSummary {
        period: "today".to_string(),
        trading_fees: Decimal::new(52_345, 4),
        llm_costs: Decimal::new(1_234, 4),
        server_cost_daily: Decimal::new(50, 2),
        total_costs: Decimal::new(586, 2),
        gross_realized_pnl: Decimal::from(150),
        net_realized_pnl: Decimal::new(14_477, 2),
        llm_provider: "anthropic".to_string(),
        llm_model: "claude-sonnet".to_string(),
    }
}
