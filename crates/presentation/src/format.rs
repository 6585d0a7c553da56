// In crates/presentation/src/format.rs

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Decimal places for ordinary currency amounts.
pub const CURRENCY_DECIMALS: u32 = 2;
/// Decimal places for trading fees, which are often fractions of a cent.
pub const FEE_DECIMALS: u32 = 4;

/// Whether a P&L figure reads as a gain or a loss. Zero counts as a gain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PnlTone {
    Profit,
    Loss,
}

pub fn pnl_tone(value: Decimal) -> PnlTone {
    if value >= dec!(0) {
        PnlTone::Profit
    } else {
        PnlTone::Loss
    }
}

/// `+$12.50` / `$-3.20`, with `decimals` fixed places.
///
/// Only non-negative values carry a `+`; negatives keep their minus after the
/// `$`. The sign comes from the unrounded value, so `-0.001` renders as `$-0.00`.
pub fn format_signed_currency(value: Decimal, decimals: u32) -> String {
    let (prefix, minus) = match pnl_tone(value) {
        PnlTone::Profit => ("+", ""),
        PnlTone::Loss => ("", "-"),
    };
    let magnitude = value
        .abs()
        .round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    format!("{prefix}${minus}{magnitude:.prec$}", prec = decimals as usize)
}

/// `30s ago`, `5m ago`, `2h ago`, `3d ago`; each unit is truncated, not rounded.
///
/// A missing timestamp reads `Never`. Timestamps ahead of `now` read `0s ago`.
pub fn time_ago(timestamp: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(timestamp) = timestamp else {
        return "Never".to_string();
    };
    let seconds = (now - timestamp).num_seconds().max(0);
    match seconds {
        s if s < 60 => format!("{s}s ago"),
        s if s < 3_600 => format!("{}m ago", s / 60),
        s if s < 86_400 => format!("{}h ago", s / 3_600),
        s => format!("{}d ago", s / 86_400),
    }
}

/// True when `last_update` is known and more than `threshold_minutes` whole
/// minutes have passed since. No timestamp is never overdue.
pub fn is_overdue(last_update: Option<DateTime<Utc>>, threshold_minutes: i64, now: DateTime<Utc>) -> bool {
    last_update.is_some_and(|last| (now - last).num_minutes() > threshold_minutes)
}

/// `1 decision`, `0 decisions`, `12 decisions`.
pub fn item_count_label(count: u64, singular: &str, plural: &str) -> String {
    let noun = if count == 1 { singular } else { plural };
    format!("{count} {noun}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use core_types::fixtures::reference_time;

    #[test]
    fn signed_currency_marks_zero_as_positive() {
        assert_eq!(format_signed_currency(dec!(0), CURRENCY_DECIMALS), "+$0.00");
        assert_eq!(format_signed_currency(dec!(150.5), CURRENCY_DECIMALS), "+$150.50");
        assert_eq!(format_signed_currency(dec!(-42.125), CURRENCY_DECIMALS), "$-42.13");
        assert_eq!(format_signed_currency(dec!(-0.001), CURRENCY_DECIMALS), "$-0.00");
    }

    #[test]
    fn negative_amounts_put_the_minus_after_the_dollar() {
        assert_eq!(format_signed_currency(dec!(-3.2), CURRENCY_DECIMALS), "$-3.20");
        assert!(!format_signed_currency(dec!(-3.2), CURRENCY_DECIMALS).starts_with('-'));
    }

    #[test]
    fn fees_keep_four_places() {
        assert_eq!(format_signed_currency(dec!(0.01234), FEE_DECIMALS), "+$0.0123");
        assert_eq!(format_signed_currency(dec!(-1.5), FEE_DECIMALS), "$-1.5000");
    }

    #[test]
    fn time_ago_buckets_truncate() {
        let now = reference_time();
        let ago = |secs: i64| time_ago(Some(now - Duration::seconds(secs)), now);
        assert_eq!(ago(30), "30s ago");
        assert_eq!(ago(300), "5m ago");
        assert_eq!(ago(359), "5m ago");
        assert_eq!(ago(7_200), "2h ago");
        assert_eq!(ago(172_800), "2d ago");
        assert_eq!(time_ago(None, now), "Never");
        assert_eq!(time_ago(Some(now + Duration::seconds(5)), now), "0s ago");
    }

    #[test]
    fn overdue_needs_a_timestamp_past_the_threshold() {
        let now = reference_time();
        assert!(!is_overdue(None, 5, now));
        assert!(is_overdue(Some(now - Duration::minutes(6)), 5, now));
        assert!(!is_overdue(Some(now - Duration::minutes(4)), 5, now));
        // 5m59s is five whole minutes, which does not exceed five.
        assert!(!is_overdue(Some(now - Duration::seconds(359)), 5, now));
    }

    #[test]
    fn tone_and_count_labels() {
        assert_eq!(pnl_tone(dec!(0)), PnlTone::Profit);
        assert_eq!(pnl_tone(dec!(-0.01)), PnlTone::Loss);
        assert_eq!(item_count_label(1, "position", "positions"), "1 position");
        assert_eq!(item_count_label(0, "position", "positions"), "0 positions");
    }
}
