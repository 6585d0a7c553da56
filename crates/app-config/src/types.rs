// In crates/app-config/src/types.rs

use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    /// The application's general settings.
    pub app: AppSettings,
    /// Where the dashboard backend lives.
    pub api: ApiSettings,
    #[serde(default)]
    pub realtime: RealtimeSettings,
    #[serde(default)]
    pub filters: FilterSettings,
    #[serde(default)]
    pub staleness: StalenessSettings,
}

#[derive(Deserialize, Debug, Clone)]
pub struct AppSettings {
    /// The environment the application is running in (e.g., "development", "production").
    pub environment: String,
    /// The log level for the application.
    pub log_level: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ApiSettings {
    /// Base URL of the REST API, including the version prefix (e.g. `http://localhost:3000/api/v1`).
    pub base_url: String,
    /// The ActionCable endpoint (e.g. `ws://localhost:3000/cable`).
    pub cable_url: String,
    /// How many times a failed GET is retried before the error is surfaced.
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Settings for push-event reconciliation and fallback polling.
#[derive(Deserialize, Debug, Clone)]
pub struct RealtimeSettings {
    /// Maximum length of the cached recent-decisions list.
    #[serde(default = "default_recent_decisions_cap")]
    pub recent_decisions_cap: usize,
    /// Fallback polling interval for the dashboard aggregate.
    #[serde(default = "default_dashboard_refetch_secs")]
    pub dashboard_refetch_secs: u64,
    /// Delay before the cable transport reconnects after a dropped connection.
    #[serde(default = "default_reconnect_delay_secs")]
    pub reconnect_delay_secs: u64,
}

#[derive(Deserialize, Debug, Clone)]
pub struct FilterSettings {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
    #[serde(default = "default_page_size_options")]
    pub page_size_options: Vec<u32>,
}

/// Minutes after which a component's last update counts as overdue.
#[derive(Deserialize, Debug, Clone)]
pub struct StalenessSettings {
    #[serde(default = "default_market_data_minutes")]
    pub market_data_minutes: i64,
    #[serde(default = "default_trading_cycle_minutes")]
    pub trading_cycle_minutes: i64,
    #[serde(default = "default_macro_strategy_minutes")]
    pub macro_strategy_minutes: i64,
}

impl Default for RealtimeSettings {
    fn default() -> Self {
        Self {
            recent_decisions_cap: default_recent_decisions_cap(),
            dashboard_refetch_secs: default_dashboard_refetch_secs(),
            reconnect_delay_secs: default_reconnect_delay_secs(),
        }
    }
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            default_page_size: default_page_size(),
            page_size_options: default_page_size_options(),
        }
    }
}

impl Default for StalenessSettings {
    fn default() -> Self {
        Self {
            market_data_minutes: default_market_data_minutes(),
            trading_cycle_minutes: default_trading_cycle_minutes(),
            macro_strategy_minutes: default_macro_strategy_minutes(),
        }
    }
}

/// Helper functions for serde defaults
fn default_retry_count() -> u32 { 2 }
fn default_request_timeout_secs() -> u64 { 10 }
fn default_recent_decisions_cap() -> usize { 5 }
fn default_dashboard_refetch_secs() -> u64 { 30 }
fn default_reconnect_delay_secs() -> u64 { 5 }
fn default_debounce_ms() -> u64 { 300 }
fn default_page_size() -> u32 { 25 }
fn default_page_size_options() -> Vec<u32> { vec![10, 25, 50, 100] }
fn default_market_data_minutes() -> i64 { 5 }
fn default_trading_cycle_minutes() -> i64 { 15 }
fn default_macro_strategy_minutes() -> i64 { 720 }
