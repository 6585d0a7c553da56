// In crates/query-cache/src/reconciler.rs

use chrono::{DateTime, Utc};
use core_types::{DashboardData, MacroStrategy, MarketMap, SystemStatus, TradingDecision};
use events::{ConnectionLease, ConnectionManager, EventType, PushEvent, Subscription};
use std::sync::Arc;
use tokio::sync::watch;

use crate::cache::{QueryCache, SharedCache, lock};
use crate::keys::QueryKey;
use crate::merge;

/// The event types the reconciler registers for on mount.
pub const RECONCILED_EVENTS: [EventType; 5] = [
    EventType::MarketUpdate,
    EventType::PositionUpdate,
    EventType::DecisionUpdate,
    EventType::MacroStrategyUpdate,
    EventType::SystemStatusUpdate,
];

/// Event types that count as trading activity for the "last update" stamp.
/// System status heartbeats are reconciled but do not move it.
pub const ACTIVITY_EVENTS: [EventType; 4] = [
    EventType::MarketUpdate,
    EventType::PositionUpdate,
    EventType::DecisionUpdate,
    EventType::MacroStrategyUpdate,
];

/// What applying one event did to the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The aggregate was patched in place of a refetch.
    Merged,
    /// No merge is defined; this many entries were marked for refetch.
    Invalidated(usize),
    /// The aggregate is not cached yet, so there was nothing to patch.
    NoTarget,
    /// The payload did not have the expected shape.
    Malformed,
    /// The event type is not handled.
    Ignored,
}

/// Applies one pushed event to the cache.
///
/// | event                   | rule                                                   |
/// |-------------------------|--------------------------------------------------------|
/// | `market_update`         | key-by-key merge into the market map                   |
/// | `position_update`       | invalidate open positions and the dashboard            |
/// | `decision_update`       | prepend to recent decisions, truncate to `cap`         |
/// | `macro_strategy_update` | replace the strategy, invalidate the current strategy  |
/// | `system_status_update`  | replace the system status                              |
pub fn apply_event(cache: &mut QueryCache, event: &PushEvent, cap: usize) -> Outcome {
    let dashboard = QueryKey::dashboard();
    match event.kind {
        EventType::MarketUpdate => match event.decode::<MarketMap>() {
            Ok(patch) => patch_dashboard(cache, &dashboard, |d| merge::merge_market(d, patch)),
            Err(e) => malformed(event, e),
        },
        EventType::PositionUpdate => {
            let invalidated = cache.invalidate(&QueryKey::open_positions()) + cache.invalidate(&dashboard);
            Outcome::Invalidated(invalidated)
        }
        EventType::DecisionUpdate => match event.decode::<TradingDecision>() {
            Ok(decision) => {
                patch_dashboard(cache, &dashboard, |d| merge::prepend_decision(d, decision, cap))
            }
            Err(e) => malformed(event, e),
        },
        EventType::MacroStrategyUpdate => match event.decode::<Option<MacroStrategy>>() {
            Ok(strategy) => {
                let outcome = patch_dashboard(cache, &dashboard, |d| {
                    merge::replace_macro_strategy(d, strategy)
                });
                cache.invalidate(&QueryKey::current_macro_strategy());
                outcome
            }
            Err(e) => malformed(event, e),
        },
        EventType::SystemStatusUpdate => match event.decode::<SystemStatus>() {
            Ok(status) => {
                patch_dashboard(cache, &dashboard, |d| merge::replace_system_status(d, status))
            }
            Err(e) => malformed(event, e),
        },
        EventType::Unknown => Outcome::Ignored,
    }
}

fn patch_dashboard<F>(cache: &mut QueryCache, key: &QueryKey, f: F) -> Outcome
where
    F: FnOnce(&DashboardData) -> DashboardData,
{
    if cache.update(key, f) {
        Outcome::Merged
    } else {
        Outcome::NoTarget
    }
}

fn malformed(event: &PushEvent, error: serde_json::Error) -> Outcome {
    tracing::warn!(kind = ?event.kind, error = %error, "Dropping push event with malformed payload");
    Outcome::Malformed
}

struct Inner {
    cache: SharedCache,
    recent_decisions_cap: usize,
    last_update: watch::Sender<Option<DateTime<Utc>>>,
}

impl Inner {
    fn handle(&self, event: &PushEvent) -> Outcome {
        let outcome = apply_event(&mut lock(&self.cache), event, self.recent_decisions_cap);
        if ACTIVITY_EVENTS.contains(&event.kind) {
            self.last_update.send_replace(Some(Utc::now()));
        }
        tracing::debug!(kind = ?event.kind, ?outcome, "Push event reconciled");
        outcome
    }
}

/// Keeps the cached dashboard aggregate in step with pushed events.
///
/// The reconciler is the only writer of merged state; a successful full
/// refetch replaces the aggregate wholesale through the cache instead.
#[derive(Clone)]
pub struct Reconciler {
    inner: Arc<Inner>,
}

impl Reconciler {
    pub fn new(cache: SharedCache, recent_decisions_cap: usize) -> Self {
        let (last_update, _) = watch::channel(None);
        Self {
            inner: Arc::new(Inner {
                cache,
                recent_decisions_cap,
                last_update,
            }),
        }
    }

    /// Applies one event directly, bypassing the channel.
    pub fn apply(&self, event: &PushEvent) -> Outcome {
        self.inner.handle(event)
    }

    /// When the last market, position, decision or macro strategy event
    /// arrived, for "updated N ago" displays.
    pub fn watch_last_update(&self) -> watch::Receiver<Option<DateTime<Utc>>> {
        self.inner.last_update.subscribe()
    }

    /// Leases the shared connection and registers one handler per reconciled event type.
    ///
    /// Everything registered here is torn down when the returned handle is
    /// unmounted or dropped; mounting again creates a fresh set.
    pub fn mount(&self, manager: &Arc<ConnectionManager>) -> MountedReconciler {
        let lease = manager.acquire();
        let subscriptions = RECONCILED_EVENTS
            .iter()
            .map(|&kind| {
                let inner = self.inner.clone();
                lease.channel().on(kind, move |event| {
                    inner.handle(event);
                })
            })
            .collect();

        tracing::info!(handlers = RECONCILED_EVENTS.len(), "Real-time reconciler mounted.");
        MountedReconciler {
            subscriptions,
            lease,
        }
    }
}

/// A mounted reconciler. Handlers are removed before the connection lease is released.
pub struct MountedReconciler {
    subscriptions: Vec<Subscription>,
    lease: ConnectionLease,
}

impl MountedReconciler {
    pub fn is_connected(&self) -> bool {
        self.lease.channel().is_connected()
    }

    pub fn watch_connected(&self) -> watch::Receiver<bool> {
        self.lease.channel().watch_connected()
    }

    pub fn unmount(self) {
        tracing::info!("Real-time reconciler unmounted.");
    }
}

impl Drop for MountedReconciler {
    fn drop(&mut self) {
        self.subscriptions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::fixtures;
    use events::Transport;
    use events::DashboardChannel;
    use rust_decimal_macros::dec;
    use serde_json::json;

    struct NullTransport;

    impl Transport for NullTransport {
        fn open(&self, channel: Arc<DashboardChannel>) {
            channel.set_connected(true);
        }
        fn close(&self) {}
    }

    fn cached_dashboard(decisions: usize) -> SharedCache {
        let cache = QueryCache::shared();
        lock(&cache).set(QueryKey::dashboard(), fixtures::dashboard(decisions));
        cache
    }

    fn dashboard_of(cache: &SharedCache) -> Arc<DashboardData> {
        lock(cache).get::<DashboardData>(&QueryKey::dashboard()).unwrap()
    }

    fn event(kind: EventType, data: serde_json::Value) -> PushEvent {
        PushEvent::new(kind, data)
    }

    #[test]
    fn market_update_patches_only_named_symbols() {
        let cache = cached_dashboard(0);
        let eth_before = dashboard_of(&cache).market["ETH"].clone();
        let patch = json!({ "BTC": serde_json::to_value(fixtures::market_overview(99_000)).unwrap() });

        let outcome = apply_event(&mut lock(&cache), &event(EventType::MarketUpdate, patch), 5);
        assert_eq!(outcome, Outcome::Merged);

        let after = dashboard_of(&cache);
        assert_eq!(after.market["BTC"].as_ref().unwrap().price, dec!(99000));
        assert_eq!(after.market["ETH"], eth_before);
    }

    #[test]
    fn decision_update_keeps_the_list_at_cap() {
        let cache = cached_dashboard(5);
        let payload = serde_json::to_value(fixtures::decision(42, "SOL")).unwrap();

        apply_event(&mut lock(&cache), &event(EventType::DecisionUpdate, payload), 5);

        let decisions = &dashboard_of(&cache).recent_decisions;
        assert_eq!(decisions.len(), 5);
        assert_eq!(decisions[0].id, 42);
        assert!(decisions.iter().all(|d| d.id != 1), "oldest entry should be dropped");
    }

    #[test]
    fn position_update_invalidates_instead_of_merging() {
        let cache = cached_dashboard(0);
        lock(&cache).set(
            QueryKey::open_positions(),
            vec![fixtures::position(1, "BTC")],
        );

        let outcome = apply_event(&mut lock(&cache), &event(EventType::PositionUpdate, json!({})), 5);
        assert_eq!(outcome, Outcome::Invalidated(2));
        assert_eq!(lock(&cache).is_stale(&QueryKey::dashboard()), Some(true));
        assert_eq!(lock(&cache).is_stale(&QueryKey::open_positions()), Some(true));
    }

    #[test]
    fn macro_update_replaces_and_invalidates_current_strategy() {
        let cache = cached_dashboard(0);
        lock(&cache).set(QueryKey::current_macro_strategy(), 0u8);
        let next = fixtures::macro_strategy(9, core_types::Bias::Bearish);

        let payload = serde_json::to_value(&next).unwrap();
        let outcome = apply_event(&mut lock(&cache), &event(EventType::MacroStrategyUpdate, payload), 5);

        assert_eq!(outcome, Outcome::Merged);
        assert_eq!(dashboard_of(&cache).macro_strategy, Some(next));
        assert_eq!(lock(&cache).is_stale(&QueryKey::current_macro_strategy()), Some(true));
    }

    #[test]
    fn updates_before_first_fetch_are_dropped() {
        let cache = QueryCache::shared();
        let payload = serde_json::to_value(fixtures::decision(1, "BTC")).unwrap();

        let outcome = apply_event(&mut lock(&cache), &event(EventType::DecisionUpdate, payload), 5);
        assert_eq!(outcome, Outcome::NoTarget);
        assert!(lock(&cache).is_empty());
    }

    #[test]
    fn malformed_payloads_leave_the_cache_alone() {
        let cache = cached_dashboard(3);
        let before = dashboard_of(&cache);

        let outcome = apply_event(
            &mut lock(&cache),
            &event(EventType::DecisionUpdate, json!({ "id": "not-a-number" })),
            5,
        );
        assert_eq!(outcome, Outcome::Malformed);
        assert_eq!(*dashboard_of(&cache), *before);
    }

    #[test]
    fn mount_and_unmount_own_exactly_their_handlers() {
        let manager = ConnectionManager::new(Arc::new(NullTransport));
        let cache = cached_dashboard(0);
        let reconciler = Reconciler::new(cache.clone(), 5);

        let mounted = reconciler.mount(&manager);
        assert!(mounted.is_connected());
        assert_eq!(manager.channel().handler_count(), RECONCILED_EVENTS.len());
        mounted.unmount();
        assert_eq!(manager.channel().handler_count(), 0);
        assert_eq!(manager.lease_count(), 0);

        // Events after unmount do not reach the cache.
        let payload = serde_json::to_value(fixtures::decision(7, "BTC")).unwrap();
        manager.channel().dispatch(&event(EventType::DecisionUpdate, payload.clone()));
        assert!(dashboard_of(&cache).recent_decisions.is_empty());

        // A remount starts from a clean slate rather than stacking handlers.
        let _mounted = reconciler.mount(&manager);
        assert_eq!(manager.channel().handler_count(), RECONCILED_EVENTS.len());
        manager.channel().dispatch(&event(EventType::DecisionUpdate, payload));
        assert_eq!(dashboard_of(&cache).recent_decisions.len(), 1);
    }

    #[test]
    fn handled_events_stamp_the_last_update() {
        let reconciler = Reconciler::new(cached_dashboard(0), 5);
        let rx = reconciler.watch_last_update();
        assert!(rx.borrow().is_none());

        reconciler.apply(&event(EventType::PositionUpdate, json!({})));
        assert!(rx.borrow().is_some());
    }

    #[test]
    fn system_status_updates_do_not_stamp_the_last_update() {
        let reconciler = Reconciler::new(cached_dashboard(0), 5);
        let rx = reconciler.watch_last_update();

        let status = serde_json::to_value(fixtures::dashboard(0).system_status).unwrap();
        let outcome = reconciler.apply(&event(EventType::SystemStatusUpdate, status));
        assert_eq!(outcome, Outcome::Merged);
        assert!(rx.borrow().is_none());

        reconciler.apply(&event(EventType::Unknown, json!({})));
        assert!(rx.borrow().is_none());
    }
}
