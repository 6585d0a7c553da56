// In crates/presentation/src/lib.rs

pub mod format;
pub mod status;

pub use format::{
    CURRENCY_DECIMALS, FEE_DECIMALS, PnlTone, format_signed_currency, is_overdue, item_count_label,
    pnl_tone, time_ago,
};
pub use status::{ComponentHealth, HealthIndicator, TradingStatus, component_health, health_indicator};
