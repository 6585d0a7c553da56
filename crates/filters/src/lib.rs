// In crates/filters/src/lib.rs

pub mod history;
pub mod manager;
pub mod pagination;
pub mod query_string;
pub mod search;
pub mod state;

pub use history::{History, MemoryHistory};
pub use manager::FilterStateManager;
pub use pagination::PaginationController;
pub use query_string::QueryParams;
pub use search::{DebouncedSearch, SearchInput};
pub use state::{FilterDefaults, FilterField, FilterPatch, FilterState, FilterUpdate};
