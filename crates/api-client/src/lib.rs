// In crates/api-client/src/lib.rs

use app_config::ApiSettings;
use async_trait::async_trait;
use core_types::{
    AccountSummary, CostPeriod, CostSummary, CurrentMacroStrategy, CurrentMarketData,
    DashboardData, DecisionStats, ExecutionLog, ExecutionLogsStats, ForecastGrid,
    ForecastListItem, HealthResponse, ListFilterParams, LlmCosts, MacroStrategy, MarketSnapshot,
    OpenPositions, PerformanceData, Position, SystemStatus, TradingCosts, TradingDecision,
};
use query_cache::DashboardSource;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use url::Url;

use crate::types::ErrorBody;

pub mod cable;
pub mod error;
pub mod query;
pub mod types;

// Re-export public types
pub use cable::{CableFrame, CableTransport, CableUpdate, dashboard_stream};
pub use error::{Error, Result};
pub use query::{count_param, list_query};
pub use types::*;

/// Upper bound on the wait between retries.
const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

impl ApiClient {
    /// Constructs a new ApiClient from the API settings.
    pub fn new(settings: &ApiSettings) -> Result<Self> {
        let request_timeout = Duration::from_secs(settings.request_timeout_secs);
        let http_client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(Error::ClientBuildError)?;

        // `Url::join` replaces the last segment unless the base ends in a slash.
        let mut base = settings.base_url.trim_end_matches('/').to_string();
        base.push('/');
        let base_url = Url::parse(&base)?;

        Ok(ApiClient {
            http_client,
            base_url,
            retry_count: settings.retry_count,
            request_timeout,
        })
    }

    /// The absolute URL for `path` (relative to the API base) with `query` appended.
    pub fn endpoint(&self, path: &str, query: &[(&str, String)]) -> Result<Url> {
        let mut url = self.base_url.join(path.trim_start_matches('/'))?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    /// GETs `path` and decodes the body, retrying transport and server errors.
    async fn get_value(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let url = self.endpoint(path, query)?;
        let mut attempt = 0;
        loop {
            match self.get_once(&url).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.retry_count => {
                    let delay = retry_delay(attempt);
                    tracing::warn!(url = %url, attempt, error = %e, ?delay, "Request failed; retrying.");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn get_once(&self, url: &Url) -> Result<Value> {
        let response = self
            .http_client
            .get(url.clone())
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(Error::RequestFailed)?;

        let status = response.status();
        let text = response.text().await.map_err(Error::RequestFailed)?;

        if !status.is_success() {
            let msg = serde_json::from_str::<ErrorBody>(&text)
                .ok()
                .and_then(|b| b.error)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            return Err(Error::ApiError { status: status.as_u16(), msg });
        }

        serde_json::from_str(&text).map_err(Error::DeserializationFailed)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let value = self.get_value(path, query).await?;
        serde_json::from_value(value).map_err(Error::DeserializationFailed)
    }

    /// GETs `path` and decodes the single field `field` of the response object.
    async fn get_field<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        field: &'static str,
    ) -> Result<T> {
        let mut value = self.get_value(path, query).await?;
        take_field(&mut value, field)
    }

    /// GETs a list endpoint whose items sit under `field`, next to `meta`.
    async fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        field: &'static str,
    ) -> Result<Page<T>> {
        let mut value = self.get_value(path, query).await?;
        Ok(Page {
            items: take_field(&mut value, field)?,
            meta: take_field(&mut value, "meta")?,
        })
    }

    // --- Health & dashboard ---

    /// `GET /health`
    pub async fn health(&self) -> Result<HealthResponse> {
        self.get("health", &[]).await
    }

    /// `GET /dashboard`, the aggregate the cache reconciles against.
    pub async fn dashboard(&self) -> Result<DashboardData> {
        self.get("dashboard", &[]).await
    }

    pub async fn account(&self) -> Result<AccountSummary> {
        self.get_field("dashboard/account", &[], "account").await
    }

    pub async fn system_status(&self) -> Result<SystemStatus> {
        self.get_field("dashboard/system_status", &[], "system").await
    }

    // --- Positions ---

    pub async fn open_positions(&self) -> Result<OpenPositions> {
        self.get("positions/open", &[]).await
    }

    pub async fn positions(&self, params: &ListFilterParams) -> Result<Page<Position>> {
        let query = list_query(params, QueryDialect::Positions, None);
        self.get_page("positions", &query, "positions").await
    }

    pub async fn position(&self, id: i64) -> Result<Position> {
        self.get_field(&format!("positions/{id}"), &[], "position").await
    }

    /// `GET /positions/performance`: daily equity curve over the last `days`.
    pub async fn performance(&self, days: Option<u32>) -> Result<PerformanceData> {
        self.get("positions/performance", &count_param("days", days)).await
    }

    // --- Decisions ---

    pub async fn decisions(&self, params: &ListFilterParams) -> Result<Page<TradingDecision>> {
        let query = list_query(params, QueryDialect::Standard, None);
        self.get_page("decisions", &query, "decisions").await
    }

    pub async fn recent_decisions(&self, limit: Option<u32>) -> Result<Vec<TradingDecision>> {
        self.get_field("decisions/recent", &count_param("limit", limit), "decisions").await
    }

    pub async fn decision(&self, id: i64) -> Result<TradingDecision> {
        self.get_field(&format!("decisions/{id}"), &[], "decision").await
    }

    pub async fn decision_stats(&self, hours: Option<u32>) -> Result<DecisionStats> {
        self.get("decisions/stats", &count_param("hours", hours)).await
    }

    // --- Macro strategies ---

    pub async fn macro_strategies(&self, params: &ListFilterParams) -> Result<Page<MacroStrategy>> {
        let query = list_query(params, QueryDialect::Standard, None);
        self.get_page("macro_strategies", &query, "strategies").await
    }

    /// `GET /macro_strategies/current`; `strategy` is null until the first one is generated.
    pub async fn current_macro_strategy(&self) -> Result<CurrentMacroStrategy> {
        self.get("macro_strategies/current", &[]).await
    }

    pub async fn macro_strategy(&self, id: i64) -> Result<MacroStrategy> {
        self.get_field(&format!("macro_strategies/{id}"), &[], "strategy").await
    }

    // --- Market data ---

    pub async fn current_market_data(&self) -> Result<CurrentMarketData> {
        self.get("market_data/current", &[]).await
    }

    /// `GET /market_data/forecasts` without list filters: the latest forecast
    /// per symbol and timeframe.
    pub async fn forecast_grid(&self) -> Result<ForecastGrid> {
        self.get_field("market_data/forecasts", &[], "forecasts").await
    }

    pub async fn market_snapshots(&self, params: &ListFilterParams) -> Result<Page<MarketSnapshot>> {
        let query = list_query(params, QueryDialect::Standard, None);
        self.get_page("market_data/snapshots", &query, "snapshots").await
    }

    pub async fn forecasts(
        &self,
        params: &ListFilterParams,
        timeframe: Option<&str>,
    ) -> Result<Page<ForecastListItem>> {
        let query = list_query(params, QueryDialect::Forecasts, timeframe);
        self.get_page("market_data/forecasts", &query, "forecasts").await
    }

    // --- Execution logs ---

    pub async fn execution_logs(&self, params: &ListFilterParams) -> Result<Page<ExecutionLog>> {
        let query = list_query(params, QueryDialect::ExecutionLogs, None);
        self.get_page("execution_logs", &query, "execution_logs").await
    }

    pub async fn execution_log(&self, id: i64) -> Result<ExecutionLog> {
        self.get_field(&format!("execution_logs/{id}"), &[], "execution_log").await
    }

    pub async fn execution_logs_stats(&self, hours: Option<u32>) -> Result<ExecutionLogsStats> {
        self.get("execution_logs/stats", &count_param("hours", hours)).await
    }

    // --- Costs ---

    pub async fn cost_summary(&self, period: CostPeriod) -> Result<CostSummary> {
        self.get("costs/summary", &[("period", period.to_string())]).await
    }

    pub async fn llm_costs(&self) -> Result<LlmCosts> {
        self.get("costs/llm", &[]).await
    }

    pub async fn trading_costs(&self) -> Result<TradingCosts> {
        self.get("costs/trading", &[]).await
    }
}

#[async_trait]
impl DashboardSource for ApiClient {
    type Error = Error;

    async fn dashboard(&self) -> Result<DashboardData> {
        ApiClient::dashboard(self).await
    }

    async fn open_positions(&self) -> Result<OpenPositions> {
        ApiClient::open_positions(self).await
    }

    async fn current_macro_strategy(&self) -> Result<CurrentMacroStrategy> {
        ApiClient::current_macro_strategy(self).await
    }

    async fn health(&self) -> Result<HealthResponse> {
        ApiClient::health(self).await
    }
}

/// Exponential backoff: 1s, 2s, 4s... capped at thirty seconds.
pub fn retry_delay(attempt: u32) -> Duration {
    Duration::from_secs(1u64 << attempt.min(5)).min(MAX_RETRY_DELAY)
}

fn take_field<T: DeserializeOwned>(value: &mut Value, field: &'static str) -> Result<T> {
    let inner = value.get_mut(field).ok_or(Error::MissingField(field))?.take();
    serde_json::from_value(inner).map_err(Error::DeserializationFailed)
}

// Free function to allow api_client::new usage
pub fn new(settings: &ApiSettings) -> Result<ApiClient> {
    ApiClient::new(settings)
}
