// In crates/filters/src/history.rs

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// The location's query string, as owned by the host (browser history, router, test double).
pub trait History: Send + Sync {
    /// The current query string, without a leading `?`.
    fn query(&self) -> String;

    /// Replaces the query string in place, without adding a history entry.
    fn replace_query(&self, query: &str);
}

/// An in-memory history for headless use and tests.
#[derive(Debug, Default)]
pub struct MemoryHistory {
    query: Mutex<String>,
    writes: AtomicUsize,
}

impl MemoryHistory {
    pub fn new(initial: &str) -> Arc<Self> {
        Arc::new(Self {
            query: Mutex::new(initial.strip_prefix('?').unwrap_or(initial).to_string()),
            writes: AtomicUsize::new(0),
        })
    }

    /// How many times `replace_query` has been called.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl History for MemoryHistory {
    fn query(&self) -> String {
        self.query.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn replace_query(&self, query: &str) {
        *self.query.lock().unwrap_or_else(PoisonError::into_inner) = query.to_string();
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}
