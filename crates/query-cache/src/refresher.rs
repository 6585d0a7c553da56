// In crates/query-cache/src/refresher.rs

use async_trait::async_trait;
use core_types::{CurrentMacroStrategy, DashboardData, HealthResponse, OpenPositions};
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::MissedTickBehavior;

use crate::cache::{CacheEvent, SharedCache, lock};
use crate::keys::QueryKey;

/// Where the refresher fetches the dashboard's queries from.
#[async_trait]
pub trait DashboardSource: Send + Sync {
    type Error: Display + Send;

    async fn dashboard(&self) -> Result<DashboardData, Self::Error>;
    async fn open_positions(&self) -> Result<OpenPositions, Self::Error>;
    async fn current_macro_strategy(&self) -> Result<CurrentMacroStrategy, Self::Error>;
    async fn health(&self) -> Result<HealthResponse, Self::Error>;
}

/// Services invalidations and the fallback poll.
///
/// A failed fetch leaves the stale entry in place; the next invalidation or
/// poll tick retries.
pub struct Refresher<S> {
    source: Arc<S>,
    cache: SharedCache,
}

impl<S: DashboardSource> Refresher<S> {
    pub fn new(source: Arc<S>, cache: SharedCache) -> Self {
        Self { source, cache }
    }

    /// Fetches `key` and stores the result. Returns `true` if the cache was replaced.
    ///
    /// Filtered list keys belong to the views that own their filters and are
    /// not refetched here.
    pub async fn refresh(&self, key: &QueryKey) -> bool {
        if *key == QueryKey::dashboard() {
            self.store(key, self.source.dashboard().await)
        } else if *key == QueryKey::open_positions() {
            self.store(key, self.source.open_positions().await)
        } else if *key == QueryKey::current_macro_strategy() {
            self.store(key, self.source.current_macro_strategy().await)
        } else if *key == QueryKey::health() {
            self.store(key, self.source.health().await)
        } else {
            tracing::trace!(key = %key, "No fetcher for key; skipping refresh");
            false
        }
    }

    fn store<T: Send + Sync + 'static>(&self, key: &QueryKey, result: Result<T, S::Error>) -> bool {
        match result {
            Ok(value) => {
                lock(&self.cache).set(key.clone(), value);
                true
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Refetch failed; keeping cached data.");
                false
            }
        }
    }

    /// Runs until the cache's event channel closes.
    ///
    /// The dashboard and health queries are refetched on every `poll_interval`
    /// tick (the first tick fires immediately); invalidated keys are refetched
    /// as they are announced.
    pub async fn run(self, mut events: broadcast::Receiver<CacheEvent>, poll_interval: Duration) {
        let mut poll = tokio::time::interval(poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = poll.tick() => {
                    self.refresh(&QueryKey::dashboard()).await;
                    self.refresh(&QueryKey::health()).await;
                }
                event = events.recv() => match event {
                    Ok(CacheEvent::Invalidated(key)) => {
                        self.refresh(&key).await;
                    }
                    Ok(CacheEvent::Updated(_)) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Refresher lagged behind cache events; refetching dashboard.");
                        self.refresh(&QueryKey::dashboard()).await;
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }
        tracing::info!("Refresher stopped.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::QueryCache;
    use core_types::{PositionsSummary, fixtures};
    use rust_decimal::Decimal;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeSource {
        failing: AtomicBool,
        dashboard_calls: AtomicUsize,
        positions_calls: AtomicUsize,
    }

    #[async_trait]
    impl DashboardSource for FakeSource {
        type Error = String;

        async fn dashboard(&self) -> Result<DashboardData, String> {
            self.dashboard_calls.fetch_add(1, Ordering::SeqCst);
            if self.failing.load(Ordering::SeqCst) {
                return Err("backend unavailable".to_string());
            }
            Ok(fixtures::dashboard(2))
        }

        async fn open_positions(&self) -> Result<OpenPositions, String> {
            self.positions_calls.fetch_add(1, Ordering::SeqCst);
            Ok(OpenPositions {
                positions: vec![fixtures::position(1, "BTC")],
                summary: PositionsSummary {
                    count: 1,
                    total_pnl: Decimal::from(150),
                    gross_pnl: Decimal::from(150),
                    total_fees: Decimal::ZERO,
                    net_pnl: Decimal::from(150),
                    total_margin: Decimal::from(2_850),
                },
            })
        }

        async fn current_macro_strategy(&self) -> Result<CurrentMacroStrategy, String> {
            Err("not used".to_string())
        }

        async fn health(&self) -> Result<HealthResponse, String> {
            Err("not used".to_string())
        }
    }

    #[tokio::test]
    async fn refresh_replaces_a_stale_entry() {
        let cache = QueryCache::shared();
        lock(&cache).set(QueryKey::dashboard(), fixtures::dashboard(0));
        lock(&cache).invalidate(&QueryKey::dashboard());

        let refresher = Refresher::new(Arc::new(FakeSource::default()), cache.clone());
        assert!(refresher.refresh(&QueryKey::dashboard()).await);

        let guard = lock(&cache);
        assert_eq!(guard.is_stale(&QueryKey::dashboard()), Some(false));
        assert_eq!(
            guard.get::<DashboardData>(&QueryKey::dashboard()).unwrap().recent_decisions.len(),
            2
        );
    }

    #[tokio::test]
    async fn failed_refresh_keeps_the_stale_snapshot() {
        let cache = QueryCache::shared();
        lock(&cache).set(QueryKey::dashboard(), fixtures::dashboard(1));
        lock(&cache).invalidate(&QueryKey::dashboard());

        let source = Arc::new(FakeSource::default());
        source.failing.store(true, Ordering::SeqCst);
        let refresher = Refresher::new(source, cache.clone());

        assert!(!refresher.refresh(&QueryKey::dashboard()).await);
        let guard = lock(&cache);
        assert_eq!(guard.is_stale(&QueryKey::dashboard()), Some(true));
        assert_eq!(
            guard.get::<DashboardData>(&QueryKey::dashboard()).unwrap().recent_decisions.len(),
            1
        );
    }

    #[tokio::test]
    async fn list_keys_are_left_to_their_views() {
        let cache = QueryCache::shared();
        let refresher = Refresher::new(Arc::new(FakeSource::default()), cache.clone());
        let key = QueryKey::decisions_list(&Default::default());
        assert!(!refresher.refresh(&key).await);
        assert!(lock(&cache).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn run_polls_and_services_invalidations() {
        let cache = QueryCache::shared();
        let source = Arc::new(FakeSource::default());
        let events = lock(&cache).subscribe();
        let task = tokio::spawn(
            Refresher::new(source.clone(), cache.clone()).run(events, Duration::from_secs(30)),
        );

        // First tick is immediate.
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(source.dashboard_calls.load(Ordering::SeqCst), 1);

        lock(&cache).set(QueryKey::open_positions(), 0u8);
        lock(&cache).invalidate(&QueryKey::open_positions());
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(source.positions_calls.load(Ordering::SeqCst), 1);
        assert!(lock(&cache).get::<OpenPositions>(&QueryKey::open_positions()).is_some());

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(source.dashboard_calls.load(Ordering::SeqCst), 2);

        task.abort();
    }
}
