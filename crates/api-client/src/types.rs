// In crates/api-client/src/types.rs

use core_types::PaginationMeta;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// The client for the trading agent's dashboard API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// The persistent HTTP client.
    pub http_client: Client,
    /// Base URL including the version prefix, e.g. `http://localhost:3000/api/v1`.
    pub base_url: Url,
    /// Extra attempts after a retryable failure.
    pub retry_count: u32,
    pub request_timeout: Duration,
}

/// One page of a list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PaginationMeta,
}

impl<T> Page<T> {
    pub fn empty(per_page: u32) -> Self {
        Self {
            items: Vec::new(),
            meta: PaginationMeta::empty(per_page),
        }
    }
}

/// The `{ "error": "..." }` body returned with non-2xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: Option<String>,
}

/// How a list endpoint spells its filter parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryDialect {
    /// `start_date, end_date, symbol, status, operation, search, page, per_page`.
    Standard,
    /// Positions accept only `status, symbol, page, per_page`.
    Positions,
    /// Forecasts take `timeframe` and no status, operation or search.
    Forecasts,
    /// Execution logs call the operation `log_action` and take no symbol or search.
    ExecutionLogs,
}
