// In app/src/report.rs

use app_config::StalenessSettings;
use chrono::{DateTime, Utc};
use core_types::{CostSummary, DashboardData, PerformanceData};
use presentation::{
    CURRENCY_DECIMALS, FEE_DECIMALS, HealthIndicator, TradingStatus, component_health,
    format_signed_currency, item_count_label, time_ago,
};

/// One line summarising the account side of the dashboard.
pub fn account_line(data: &DashboardData) -> String {
    let account = &data.account;
    format!(
        "{} | unrealized {} | realized today {} | margin ${:.2}",
        item_count_label(u64::from(account.open_positions_count), "open position", "open positions"),
        format_signed_currency(account.total_unrealized_pnl, CURRENCY_DECIMALS),
        format_signed_currency(account.realized_pnl_today, CURRENCY_DECIMALS),
        account.total_margin_used,
    )
}

/// Net P&L after fees, then what the agent cost to run over the period.
pub fn cost_line(costs: &CostSummary) -> String {
    format!(
        "{} net {} | fees ${:.fee$} | llm ${:.fee$} ({}/{}) | total costs ${:.2}",
        costs.period,
        format_signed_currency(costs.net_realized_pnl, CURRENCY_DECIMALS),
        costs.trading_fees,
        costs.llm_costs,
        costs.llm_provider,
        costs.llm_model,
        costs.total_costs,
        fee = FEE_DECIMALS as usize,
    )
}

pub fn log_performance(days: u32, performance: &PerformanceData) {
    let stats = &performance.statistics;
    tracing::info!(
        days,
        trades = stats.total_trades,
        wins = stats.wins,
        losses = stats.losses,
        win_rate = stats.win_rate,
        "Performance: {}",
        format_signed_currency(stats.total_pnl, CURRENCY_DECIMALS)
    );
}

pub fn log_dashboard(data: &DashboardData, staleness: &StalenessSettings, now: DateTime<Utc>) {
    tracing::info!(paper_trading = data.account.paper_trading, "{}", account_line(data));
    if let Some(costs) = &data.cost_summary {
        tracing::info!("{}", cost_line(costs));
    }

    for row in component_health(&data.system_status, staleness, now) {
        match row.indicator {
            HealthIndicator::Healthy => {
                tracing::info!(component = row.label, last_seen = %row.last_seen, "healthy")
            }
            HealthIndicator::Stale => {
                tracing::warn!(component = row.label, last_seen = %row.last_seen, "stale")
            }
            HealthIndicator::Down => {
                tracing::error!(component = row.label, last_seen = %row.last_seen, "down")
            }
        }
    }

    if let Some(latest) = data.recent_decisions.first() {
        tracing::info!(
            id = latest.id,
            symbol = %latest.symbol,
            status = ?latest.status,
            when = %time_ago(Some(latest.created_at), now),
            "Latest decision"
        );
    }
}

pub fn log_trading_status(status: &TradingStatus) {
    if status.trading_allowed {
        tracing::info!(mode = status.mode_label(), version = ?status.version, "Trading allowed");
    } else {
        tracing::warn!(mode = status.mode_label(), version = ?status.version, "Trading halted by circuit breaker");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::fixtures;

    #[test]
    fn account_line_uses_signed_amounts() {
        let line = account_line(&fixtures::dashboard(0));
        assert_eq!(
            line,
            "1 open position | unrealized +$150.00 | realized today +$0.00 | margin $2850.00"
        );
    }

    #[test]
    fn cost_line_keeps_fee_precision() {
        let mut costs = fixtures::cost_summary();
        assert_eq!(
            cost_line(&costs),
            "today net +$144.77 | fees $5.2345 | llm $0.1234 (anthropic/claude-sonnet) | total costs $5.86"
        );

        costs.net_realized_pnl = -costs.net_realized_pnl;
        assert!(cost_line(&costs).starts_with("today net $-144.77 |"));
    }
}
