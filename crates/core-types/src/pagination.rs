// In crates/core-types/src/pagination.rs

use serde::{Deserialize, Serialize};

/// Pagination metadata returned next to every list response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    pub total_pages: u32,
}

impl PaginationMeta {
    /// The placeholder used before the first page arrives.
    pub fn empty(per_page: u32) -> Self {
        Self {
            page: 1,
            per_page,
            total: 0,
            total_pages: 0,
        }
    }
}

/// The filter parameters a list endpoint accepts.
///
/// Every field is optional; `None` means "not filtered" and is never sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListFilterParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub symbol: Option<String>,
    pub status: Option<String>,
    /// Decision operation, or execution-log action.
    pub operation: Option<String>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}
