// In crates/presentation/src/status.rs

use app_config::StalenessSettings;
use chrono::{DateTime, Utc};
use core_types::{HealthResponse, SystemStatus};
use serde::Serialize;

use crate::format::{is_overdue, time_ago};

/// The three-state light shown next to each backend component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthIndicator {
    Healthy,
    Stale,
    Down,
}

/// Unhealthy wins over stale.
pub fn health_indicator(healthy: bool, stale: bool) -> HealthIndicator {
    match (healthy, stale) {
        (false, _) => HealthIndicator::Down,
        (true, true) => HealthIndicator::Stale,
        (true, false) => HealthIndicator::Healthy,
    }
}

/// One row of the system status card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentHealth {
    pub label: &'static str,
    pub indicator: HealthIndicator,
    pub last_seen: String,
}

/// Market data, trading cycle and macro strategy, in display order.
///
/// A component is stale if the backend flags it so or if its last update is
/// older than the configured threshold.
pub fn component_health(
    status: &SystemStatus,
    thresholds: &StalenessSettings,
    now: DateTime<Utc>,
) -> [ComponentHealth; 3] {
    let row = |label: &'static str,
               healthy: bool,
               flagged_stale: bool,
               last: Option<DateTime<Utc>>,
               threshold: i64| ComponentHealth {
        label,
        indicator: health_indicator(healthy, flagged_stale || is_overdue(last, threshold, now)),
        last_seen: time_ago(last, now),
    };

    [
        row(
            "Market Data",
            status.market_data.healthy,
            false,
            status.market_data.last_update,
            thresholds.market_data_minutes,
        ),
        row(
            "Trading Cycle",
            status.trading_cycle.healthy,
            false,
            status.trading_cycle.last_run,
            thresholds.trading_cycle_minutes,
        ),
        row(
            "Macro Strategy",
            status.macro_strategy.healthy,
            status.macro_strategy.stale.unwrap_or(false),
            status.macro_strategy.last_update,
            thresholds.macro_strategy_minutes,
        ),
    ]
}

/// Trading mode and permission, as reported by the health endpoint.
///
/// The health endpoint is the only source for `trading_allowed`; the account
/// summary's circuit breaker only carries loss counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TradingStatus {
    pub paper_trading: bool,
    pub trading_allowed: bool,
    pub version: Option<String>,
    pub environment: Option<String>,
}

impl TradingStatus {
    /// Before the first health response: paper trading off, trading allowed.
    pub fn from_health(health: Option<&HealthResponse>) -> Self {
        Self {
            paper_trading: health.and_then(|h| h.paper_trading).unwrap_or(false),
            trading_allowed: health.and_then(|h| h.trading_allowed).unwrap_or(true),
            version: health.map(|h| h.version.clone()),
            environment: health.map(|h| h.environment.clone()),
        }
    }

    pub fn mode_label(&self) -> &'static str {
        if self.paper_trading { "PAPER" } else { "LIVE" }
    }
}
