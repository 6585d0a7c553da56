// In crates/query-cache/src/keys.rs

use core_types::ListFilterParams;
use std::fmt;

/// Identifies one cached query, as a path of segments.
///
/// Invalidation works by prefix: invalidating `positions` also marks
/// `positions/open` and every `positions/...` list stale.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }

    pub fn health() -> Self {
        Self::new(["health"])
    }

    pub fn dashboard() -> Self {
        Self::new(["dashboard"])
    }

    pub fn positions() -> Self {
        Self::new(["positions"])
    }

    pub fn open_positions() -> Self {
        Self::new(["positions", "open"])
    }

    pub fn performance(days: u32) -> Self {
        Self::new(["positions".to_string(), "performance".to_string(), days.to_string()])
    }

    pub fn decisions_list(params: &ListFilterParams) -> Self {
        Self::new(["decisions".to_string(), "list".to_string(), params_segment(params)])
    }

    pub fn macro_strategy() -> Self {
        Self::new(["macroStrategy"])
    }

    pub fn current_macro_strategy() -> Self {
        Self::new(["macroStrategy", "current"])
    }

    pub fn macro_strategies_list(params: &ListFilterParams) -> Self {
        Self::new(["macroStrategy".to_string(), "list".to_string(), params_segment(params)])
    }

    pub fn market_snapshots_list(params: &ListFilterParams) -> Self {
        Self::new(["marketSnapshots".to_string(), "list".to_string(), params_segment(params)])
    }

    pub fn forecasts_list(params: &ListFilterParams, timeframe: Option<&str>) -> Self {
        Self::new([
            "forecasts".to_string(),
            "list".to_string(),
            params_segment(params),
            timeframe.unwrap_or_default().to_string(),
        ])
    }

    pub fn execution_logs_list(params: &ListFilterParams) -> Self {
        Self::new(["executionLogs".to_string(), "list".to_string(), params_segment(params)])
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

// Params are plain strings and integers, so serialization cannot fail.
fn params_segment(params: &ListFilterParams) -> String {
    serde_json::to_string(params).unwrap_or_default()
}
