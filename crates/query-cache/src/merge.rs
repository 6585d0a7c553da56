// In crates/query-cache/src/merge.rs
//
// Pure merge rules for pushed events. Each returns a new aggregate; the
// caller swaps it into the cache.

use core_types::{DashboardData, MacroStrategy, MarketMap, SystemStatus, TradingDecision};

/// Merges a `symbol -> overview` patch into the market map, key by key.
/// Symbols absent from the patch are left as they were.
pub fn merge_market(current: &DashboardData, patch: MarketMap) -> DashboardData {
    let mut market = current.market.clone();
    market.extend(patch);
    DashboardData {
        market,
        ..current.clone()
    }
}

/// Puts `decision` at the head of the recent list and keeps at most `cap` entries.
pub fn prepend_decision(current: &DashboardData, decision: TradingDecision, cap: usize) -> DashboardData {
    let mut recent_decisions = Vec::with_capacity(cap);
    recent_decisions.push(decision);
    recent_decisions.extend(
        current
            .recent_decisions
            .iter()
            .take(cap.saturating_sub(1))
            .cloned(),
    );
    DashboardData {
        recent_decisions,
        ..current.clone()
    }
}

pub fn replace_macro_strategy(current: &DashboardData, strategy: Option<MacroStrategy>) -> DashboardData {
    DashboardData {
        macro_strategy: strategy,
        ..current.clone()
    }
}

pub fn replace_system_status(current: &DashboardData, status: SystemStatus) -> DashboardData {
    DashboardData {
        system_status: status,
        ..current.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::fixtures;
    use rust_decimal_macros::dec;

    #[test]
    fn market_patch_leaves_other_symbols_untouched() {
        let current = fixtures::dashboard(0);
        let mut btc = fixtures::market_overview(99_000);
        btc.rsi = Some(71.0);
        let mut patch = MarketMap::new();
        patch.insert("BTC".to_string(), Some(btc));

        let merged = merge_market(&current, patch);
        assert_eq!(merged.market["BTC"].as_ref().unwrap().price, dec!(99000));
        assert_eq!(merged.market["ETH"], current.market["ETH"]);
        assert_eq!(merged.positions, current.positions);
    }

    #[test]
    fn market_patch_may_null_out_or_add_symbols() {
        let current = fixtures::dashboard(0);
        let mut patch = MarketMap::new();
        patch.insert("ETH".to_string(), None);
        patch.insert("SOL".to_string(), Some(fixtures::market_overview(150)));

        let merged = merge_market(&current, patch);
        assert!(merged.market["ETH"].is_none());
        assert!(merged.market["SOL"].is_some());
        assert!(merged.market["BTC"].is_some());
    }

    #[test]
    fn decision_at_cap_drops_the_oldest() {
        let current = fixtures::dashboard(5);
        let merged = prepend_decision(&current, fixtures::decision(6, "ETH"), 5);

        let ids: Vec<i64> = merged.recent_decisions.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![6, 5, 4, 3, 2]);
    }

    #[test]
    fn decision_below_cap_keeps_everything() {
        let current = fixtures::dashboard(2);
        let merged = prepend_decision(&current, fixtures::decision(3, "BTC"), 5);

        let ids: Vec<i64> = merged.recent_decisions.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn macro_strategy_is_replaced_wholesale() {
        let current = fixtures::dashboard(1);
        let next = fixtures::macro_strategy(2, core_types::Bias::Bearish);
        let merged = replace_macro_strategy(&current, Some(next.clone()));
        assert_eq!(merged.macro_strategy, Some(next));
        assert_eq!(merged.recent_decisions, current.recent_decisions);

        assert!(replace_macro_strategy(&current, None).macro_strategy.is_none());
    }
}
