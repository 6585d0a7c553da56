// In crates/query-cache/src/lib.rs

pub mod cache;
pub mod keys;
pub mod merge;
pub mod reconciler;
pub mod refresher;

pub use cache::{CacheEvent, QueryCache, SharedCache, lock};
pub use keys::QueryKey;
pub use reconciler::{MountedReconciler, Outcome, Reconciler, apply_event};
pub use refresher::{DashboardSource, Refresher};
