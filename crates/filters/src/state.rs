// In crates/filters/src/state.rs

use app_config::FilterSettings;
use chrono::NaiveDate;
use core_types::ListFilterParams;

use crate::query_string::QueryParams;

const DATE_FORMAT: &str = "%Y-%m-%d";

// --- Fields ---

/// One filter field, and the URL key it is mirrored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterField {
    StartDate,
    EndDate,
    Symbol,
    Status,
    Search,
    Page,
    PageSize,
}

impl FilterField {
    pub const ALL: [FilterField; 7] = [
        FilterField::StartDate,
        FilterField::EndDate,
        FilterField::Symbol,
        FilterField::Status,
        FilterField::Search,
        FilterField::Page,
        FilterField::PageSize,
    ];

    pub fn url_key(self) -> &'static str {
        match self {
            FilterField::StartDate => "startDate",
            FilterField::EndDate => "endDate",
            FilterField::Symbol => "symbol",
            FilterField::Status => "status",
            FilterField::Search => "search",
            FilterField::Page => "page",
            FilterField::PageSize => "pageSize",
        }
    }

    /// Changing a non-pagination field sends the view back to page 1.
    pub fn is_pagination(self) -> bool {
        matches!(self, FilterField::Page | FilterField::PageSize)
    }
}

// --- State ---

/// The filter and pagination state of one list view.
///
/// Text fields use `""` for "not filtered".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    pub start_date: String,
    pub end_date: String,
    pub symbol: String,
    pub status: String,
    pub search: String,
    pub page: u32,
    pub page_size: u32,
}

impl FilterState {
    /// Unfiltered, first page.
    pub fn with_page_size(page_size: u32) -> Self {
        Self {
            start_date: String::new(),
            end_date: String::new(),
            symbol: String::new(),
            status: String::new(),
            search: String::new(),
            page: 1,
            page_size,
        }
    }

    /// The value as written to the URL; `""` for an unset text field.
    pub fn url_value(&self, field: FilterField) -> String {
        match field {
            FilterField::StartDate => self.start_date.clone(),
            FilterField::EndDate => self.end_date.clone(),
            FilterField::Symbol => self.symbol.clone(),
            FilterField::Status => self.status.clone(),
            FilterField::Search => self.search.clone(),
            FilterField::Page => self.page.to_string(),
            FilterField::PageSize => self.page_size.to_string(),
        }
    }

    /// Whether any non-pagination filter holds a value.
    pub fn has_active_filters(&self) -> bool {
        [
            &self.start_date,
            &self.end_date,
            &self.symbol,
            &self.status,
            &self.search,
        ]
        .iter()
        .any(|v| !v.is_empty())
    }

    /// The parameters sent to a list endpoint. Empty fields are omitted.
    pub fn to_list_params(&self) -> ListFilterParams {
        fn non_empty(value: &str) -> Option<String> {
            (!value.is_empty()).then(|| value.to_string())
        }

        ListFilterParams {
            start_date: non_empty(&self.start_date),
            end_date: non_empty(&self.end_date),
            symbol: non_empty(&self.symbol),
            status: non_empty(&self.status),
            operation: None,
            search: non_empty(&self.search),
            page: Some(self.page),
            per_page: Some(self.page_size),
        }
    }

    pub(crate) fn apply(&mut self, update: FilterUpdate) {
        match update {
            FilterUpdate::StartDate(v) => self.start_date = v,
            FilterUpdate::EndDate(v) => self.end_date = v,
            FilterUpdate::Symbol(v) => self.symbol = v,
            FilterUpdate::Status(v) => self.status = v,
            FilterUpdate::Search(v) => self.search = v,
            FilterUpdate::Page(v) => self.page = v,
            FilterUpdate::PageSize(v) => self.page_size = v,
        }
    }
}

/// A single-field change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterUpdate {
    StartDate(String),
    EndDate(String),
    Symbol(String),
    Status(String),
    Search(String),
    Page(u32),
    PageSize(u32),
}

impl FilterUpdate {
    pub fn field(&self) -> FilterField {
        match self {
            FilterUpdate::StartDate(_) => FilterField::StartDate,
            FilterUpdate::EndDate(_) => FilterField::EndDate,
            FilterUpdate::Symbol(_) => FilterField::Symbol,
            FilterUpdate::Status(_) => FilterField::Status,
            FilterUpdate::Search(_) => FilterField::Search,
            FilterUpdate::Page(_) => FilterField::Page,
            FilterUpdate::PageSize(_) => FilterField::PageSize,
        }
    }
}

/// A multi-field change, applied atomically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPatch {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub symbol: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl FilterPatch {
    pub fn into_updates(self) -> Vec<FilterUpdate> {
        [
            self.start_date.map(FilterUpdate::StartDate),
            self.end_date.map(FilterUpdate::EndDate),
            self.symbol.map(FilterUpdate::Symbol),
            self.status.map(FilterUpdate::Status),
            self.search.map(FilterUpdate::Search),
            self.page.map(FilterUpdate::Page),
            self.page_size.map(FilterUpdate::PageSize),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

// --- Defaults ---

/// The values a view falls back to, and the page sizes it offers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterDefaults {
    pub values: FilterState,
    pub page_size_options: Vec<u32>,
}

impl FilterDefaults {
    pub fn new(values: FilterState, page_size_options: Vec<u32>) -> Self {
        Self {
            values,
            page_size_options,
        }
    }

    pub fn from_settings(settings: &FilterSettings) -> Self {
        Self::new(
            FilterState::with_page_size(settings.default_page_size),
            settings.page_size_options.clone(),
        )
    }

    /// Reads the state from URL params. Anything absent, empty or unparseable
    /// takes the default.
    pub fn state_from_query(&self, params: &QueryParams) -> FilterState {
        let d = &self.values;
        let text = |field: FilterField, default: &String| {
            params
                .get_non_empty(field.url_key())
                .map_or_else(|| default.clone(), str::to_string)
        };
        let date = |field: FilterField, default: &String| {
            params
                .get_non_empty(field.url_key())
                .filter(|v| is_valid_date(v))
                .map_or_else(|| default.clone(), str::to_string)
        };

        FilterState {
            start_date: date(FilterField::StartDate, &d.start_date),
            end_date: date(FilterField::EndDate, &d.end_date),
            symbol: text(FilterField::Symbol, &d.symbol),
            status: text(FilterField::Status, &d.status),
            search: text(FilterField::Search, &d.search),
            page: positive(params, FilterField::Page).unwrap_or(d.page),
            page_size: positive(params, FilterField::PageSize)
                .filter(|size| self.accepts_page_size(*size))
                .unwrap_or(d.page_size),
        }
    }

    pub fn accepts_page_size(&self, size: u32) -> bool {
        self.page_size_options.contains(&size)
    }

    /// Whether `update` describes a state the view can be in.
    pub fn accepts(&self, update: &FilterUpdate) -> bool {
        match update {
            FilterUpdate::Page(page) => *page >= 1,
            FilterUpdate::PageSize(size) => self.accepts_page_size(*size),
            FilterUpdate::StartDate(v) | FilterUpdate::EndDate(v) => v.is_empty() || is_valid_date(v),
            _ => true,
        }
    }
}

fn positive(params: &QueryParams, field: FilterField) -> Option<u32> {
    params
        .get_non_empty(field.url_key())
        .and_then(|v| v.parse::<u32>().ok())
        .filter(|n| *n > 0)
}

fn is_valid_date(value: &str) -> bool {
    NaiveDate::parse_from_str(value, DATE_FORMAT).is_ok()
}
