// In crates/events/src/channel.rs

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use tokio::sync::watch;

use crate::{EventType, PushEvent};

type Handler = Arc<dyn Fn(&PushEvent) + Send + Sync>;

struct Registration {
    id: u64,
    /// Cleared before the registration is removed, so a dispatch that already
    /// cloned the handler list skips it.
    active: Arc<AtomicBool>,
    handler: Handler,
}

/// Routes pushed events to the handlers registered for their type.
///
/// The channel is shared by every subscriber of one connection. It also
/// carries the connected flag, which is informational only.
pub struct DashboardChannel {
    handlers: Mutex<HashMap<EventType, Vec<Registration>>>,
    next_id: AtomicU64,
    connected: watch::Sender<bool>,
}

impl DashboardChannel {
    pub fn new() -> Arc<Self> {
        let (connected, _) = watch::channel(false);
        Arc::new(Self {
            handlers: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            connected,
        })
    }

    /// Registers `handler` for events of `kind`.
    ///
    /// The handler stays registered until the returned `Subscription` is
    /// dropped or explicitly unsubscribed.
    pub fn on<F>(self: &Arc<Self>, kind: EventType, handler: F) -> Subscription
    where
        F: Fn(&PushEvent) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let active = Arc::new(AtomicBool::new(true));
        self.lock()
            .entry(kind)
            .or_default()
            .push(Registration { id, active: active.clone(), handler: Arc::new(handler) });

        tracing::debug!(?kind, id, "Push handler registered");
        Subscription {
            channel: Arc::downgrade(self),
            kind,
            id,
            active,
        }
    }

    /// Delivers `event` to every active handler of its type and returns how many ran.
    pub fn dispatch(&self, event: &PushEvent) -> usize {
        if event.kind == EventType::Unknown {
            tracing::debug!("Ignoring push event of unknown type");
            return 0;
        }

        // Snapshot the handlers so they run without the registry lock held;
        // a handler is free to subscribe or unsubscribe.
        let targets: Vec<(Arc<AtomicBool>, Handler)> = match self.lock().get(&event.kind) {
            Some(registrations) => registrations
                .iter()
                .map(|r| (r.active.clone(), r.handler.clone()))
                .collect(),
            None => Vec::new(),
        };

        let mut delivered = 0;
        for (active, handler) in targets {
            if active.load(Ordering::Acquire) {
                handler(event);
                delivered += 1;
            }
        }
        tracing::trace!(kind = ?event.kind, delivered, "Push event dispatched");
        delivered
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.send_if_modified(|current| {
            let changed = *current != connected;
            *current = connected;
            changed
        });
    }

    pub fn is_connected(&self) -> bool {
        *self.connected.borrow()
    }

    /// A receiver that observes connect/disconnect transitions.
    pub fn watch_connected(&self) -> watch::Receiver<bool> {
        self.connected.subscribe()
    }

    /// Total number of live registrations, across all event types.
    pub fn handler_count(&self) -> usize {
        self.lock().values().map(Vec::len).sum()
    }

    fn remove(&self, kind: EventType, id: u64) {
        let mut handlers = self.lock();
        if let Some(registrations) = handlers.get_mut(&kind) {
            registrations.retain(|r| r.id != id);
            if registrations.is_empty() {
                handlers.remove(&kind);
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<EventType, Vec<Registration>>> {
        self.handlers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Handle to one registered handler. Dropping it unregisters the handler.
#[must_use = "dropping a Subscription unregisters its handler immediately"]
pub struct Subscription {
    channel: Weak<DashboardChannel>,
    kind: EventType,
    id: u64,
    active: Arc<AtomicBool>,
}

impl Subscription {
    pub fn kind(&self) -> EventType {
        self.kind
    }

    /// Unregisters the handler now. Equivalent to dropping the subscription.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.active.store(false, Ordering::Release);
        if let Some(channel) = self.channel.upgrade() {
            channel.remove(self.kind, self.id);
            tracing::debug!(kind = ?self.kind, id = self.id, "Push handler removed");
        }
    }
}
