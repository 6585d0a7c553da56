// In crates/query-cache/src/cache.rs

use chrono::{DateTime, Utc};
use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;

use crate::keys::QueryKey;

// Shared cache type, one per page view.
pub type SharedCache = Arc<Mutex<QueryCache>>;

const CACHE_EVENT_CAPACITY: usize = 256;

/// Notifications emitted whenever an entry changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    /// The entry was replaced, wholesale or by a merge.
    Updated(QueryKey),
    /// The entry is stale and should be refetched.
    Invalidated(QueryKey),
}

struct Entry {
    value: Arc<dyn Any + Send + Sync>,
    updated_at: DateTime<Utc>,
    stale: bool,
}

/// An in-memory store of query results keyed by `QueryKey`.
///
/// Values are immutable snapshots behind `Arc`: writers build a new value and
/// swap it in, so a reader holding an older snapshot never sees a torn state.
pub struct QueryCache {
    entries: HashMap<QueryKey, Entry>,
    events: broadcast::Sender<CacheEvent>,
}

impl QueryCache {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(CACHE_EVENT_CAPACITY);
        Self {
            entries: HashMap::new(),
            events,
        }
    }

    pub fn shared() -> SharedCache {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Receives every update and invalidation made after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.events.subscribe()
    }

    /// Returns the cached snapshot for `key`, if present and of type `T`.
    pub fn get<T: Any + Send + Sync>(&self, key: &QueryKey) -> Option<Arc<T>> {
        let entry = self.entries.get(key)?;
        entry.value.clone().downcast::<T>().ok()
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Stores `value` under `key`, replacing whatever was there. Clears the stale flag.
    pub fn set<T: Any + Send + Sync>(&mut self, key: QueryKey, value: T) {
        self.entries.insert(
            key.clone(),
            Entry {
                value: Arc::new(value),
                updated_at: Utc::now(),
                stale: false,
            },
        );
        tracing::debug!(key = %key, "Cache entry replaced");
        let _ = self.events.send(CacheEvent::Updated(key));
    }

    /// Replaces the entry under `key` with `f(current)`.
    ///
    /// Only existing entries of type `T` are updated; returns `false` and
    /// leaves the cache untouched otherwise.
    pub fn update<T, F>(&mut self, key: &QueryKey, f: F) -> bool
    where
        T: Any + Send + Sync,
        F: FnOnce(&T) -> T,
    {
        let Some(entry) = self.entries.get_mut(key) else {
            return false;
        };
        let Some(current) = entry.value.downcast_ref::<T>() else {
            tracing::warn!(key = %key, "Cache entry has an unexpected type; update skipped");
            return false;
        };

        let next = f(current);
        entry.value = Arc::new(next);
        entry.updated_at = Utc::now();
        let _ = self.events.send(CacheEvent::Updated(key.clone()));
        true
    }

    /// Marks every entry under `prefix` stale and announces each one.
    /// Returns how many entries were invalidated.
    pub fn invalidate(&mut self, prefix: &QueryKey) -> usize {
        let mut invalidated = 0;
        for (key, entry) in self.entries.iter_mut() {
            if key.starts_with(prefix) {
                entry.stale = true;
                invalidated += 1;
                let _ = self.events.send(CacheEvent::Invalidated(key.clone()));
            }
        }
        tracing::debug!(prefix = %prefix, invalidated, "Cache entries invalidated");
        invalidated
    }

    /// `None` when the key is not cached.
    pub fn is_stale(&self, key: &QueryKey) -> Option<bool> {
        self.entries.get(key).map(|e| e.stale)
    }

    pub fn updated_at(&self, key: &QueryKey) -> Option<DateTime<Utc>> {
        self.entries.get(key).map(|e| e.updated_at)
    }

    pub fn remove(&mut self, key: &QueryKey) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Locks a shared cache, recovering the guard if a previous holder panicked.
pub fn lock(cache: &SharedCache) -> MutexGuard<'_, QueryCache> {
    cache.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_requires_an_existing_entry() {
        let mut cache = QueryCache::new();
        assert!(!cache.update::<u32, _>(&QueryKey::dashboard(), |v| v + 1));
        assert!(!cache.contains(&QueryKey::dashboard()));

        cache.set(QueryKey::dashboard(), 1u32);
        assert!(cache.update::<u32, _>(&QueryKey::dashboard(), |v| v + 1));
        assert_eq!(*cache.get::<u32>(&QueryKey::dashboard()).unwrap(), 2);
    }

    #[test]
    fn readers_keep_their_snapshot_across_updates() {
        let mut cache = QueryCache::new();
        cache.set(QueryKey::dashboard(), vec![1, 2, 3]);
        let before = cache.get::<Vec<i32>>(&QueryKey::dashboard()).unwrap();

        cache.update::<Vec<i32>, _>(&QueryKey::dashboard(), |v| {
            let mut next = v.clone();
            next.push(4);
            next
        });

        assert_eq!(*before, vec![1, 2, 3]);
        assert_eq!(*cache.get::<Vec<i32>>(&QueryKey::dashboard()).unwrap(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn wrong_type_is_neither_read_nor_updated() {
        let mut cache = QueryCache::new();
        cache.set(QueryKey::health(), "ok".to_string());
        assert!(cache.get::<u32>(&QueryKey::health()).is_none());
        assert!(!cache.update::<u32, _>(&QueryKey::health(), |v| *v));
    }

    #[test]
    fn invalidation_is_by_prefix_and_is_announced() {
        let mut cache = QueryCache::new();
        cache.set(QueryKey::open_positions(), 1u8);
        cache.set(QueryKey::dashboard(), 2u8);
        let mut rx = cache.subscribe();

        assert_eq!(cache.invalidate(&QueryKey::positions()), 1);
        assert_eq!(cache.is_stale(&QueryKey::open_positions()), Some(true));
        assert_eq!(cache.is_stale(&QueryKey::dashboard()), Some(false));
        assert_eq!(rx.try_recv().unwrap(), CacheEvent::Invalidated(QueryKey::open_positions()));

        // A refetch clears the flag.
        cache.set(QueryKey::open_positions(), 3u8);
        assert_eq!(cache.is_stale(&QueryKey::open_positions()), Some(false));
        assert_eq!(rx.try_recv().unwrap(), CacheEvent::Updated(QueryKey::open_positions()));
    }
}
