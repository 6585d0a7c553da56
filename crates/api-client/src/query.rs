// In crates/api-client/src/query.rs

use core_types::ListFilterParams;

use crate::types::QueryDialect;

/// Encodes list filters as query pairs for `dialect`. Unset and empty
/// filters are left out, as are parameters the endpoint does not accept.
pub fn list_query(
    params: &ListFilterParams,
    dialect: QueryDialect,
    timeframe: Option<&str>,
) -> Vec<(&'static str, String)> {
    let mut pairs = Vec::new();
    let mut push = |key: &'static str, value: Option<&str>| {
        if let Some(v) = value.filter(|v| !v.is_empty()) {
            pairs.push((key, v.to_string()));
        }
    };

    match dialect {
        QueryDialect::Standard => {
            push("start_date", params.start_date.as_deref());
            push("end_date", params.end_date.as_deref());
            push("symbol", params.symbol.as_deref());
            push("status", params.status.as_deref());
            push("operation", params.operation.as_deref());
            push("search", params.search.as_deref());
        }
        QueryDialect::Positions => {
            push("status", params.status.as_deref());
            push("symbol", params.symbol.as_deref());
        }
        QueryDialect::Forecasts => {
            push("start_date", params.start_date.as_deref());
            push("end_date", params.end_date.as_deref());
            push("symbol", params.symbol.as_deref());
            push("timeframe", timeframe);
        }
        QueryDialect::ExecutionLogs => {
            push("start_date", params.start_date.as_deref());
            push("end_date", params.end_date.as_deref());
            push("status", params.status.as_deref());
            push("log_action", params.operation.as_deref());
        }
    }

    // Page 0 means "unset", as does an absent value.
    if let Some(page) = params.page.filter(|p| *p > 0) {
        pairs.push(("page", page.to_string()));
    }
    if let Some(per_page) = params.per_page.filter(|p| *p > 0) {
        pairs.push(("per_page", per_page.to_string()));
    }
    pairs
}

/// A single optional count parameter such as `days`, `hours` or `limit`.
/// Zero is treated as unset.
pub fn count_param(key: &'static str, value: Option<u32>) -> Vec<(&'static str, String)> {
    value.filter(|v| *v > 0).map(|v| (key, v.to_string())).into_iter().collect()
}
