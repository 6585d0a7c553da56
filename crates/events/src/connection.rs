// In crates/events/src/connection.rs

use std::sync::{Arc, Mutex, PoisonError};

use crate::channel::DashboardChannel;

/// The wire that feeds a `DashboardChannel`.
///
/// Implementations own reconnection and backoff. `open` must return promptly
/// (spawn work instead of blocking) and must not call back into the manager.
pub trait Transport: Send + Sync {
    /// Starts delivering events into `channel`, flipping its connected flag as the link comes and goes.
    fn open(&self, channel: Arc<DashboardChannel>);

    /// Stops delivery and releases the underlying connection.
    fn close(&self);
}

/// Shares one push connection among any number of subscribers.
///
/// The transport is opened when the first lease is taken and closed when the
/// last lease is dropped. Construct it once at start-up and pass it to
/// whatever needs real-time data.
pub struct ConnectionManager {
    transport: Arc<dyn Transport>,
    channel: Arc<DashboardChannel>,
    leases: Mutex<usize>,
}

impl ConnectionManager {
    pub fn new(transport: Arc<dyn Transport>) -> Arc<Self> {
        Arc::new(Self {
            transport,
            channel: DashboardChannel::new(),
            leases: Mutex::new(0),
        })
    }

    pub fn channel(&self) -> &Arc<DashboardChannel> {
        &self.channel
    }

    /// Takes a lease on the connection, opening it if this is the first one.
    pub fn acquire(self: &Arc<Self>) -> ConnectionLease {
        let mut leases = self.leases.lock().unwrap_or_else(PoisonError::into_inner);
        if *leases == 0 {
            tracing::info!("Opening shared push connection.");
            self.transport.open(self.channel.clone());
        }
        *leases += 1;
        tracing::debug!(leases = *leases, "Push connection lease acquired");

        ConnectionLease {
            manager: self.clone(),
        }
    }

    pub fn lease_count(&self) -> usize {
        *self.leases.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn release(&self) {
        let mut leases = self.leases.lock().unwrap_or_else(PoisonError::into_inner);
        *leases = leases.saturating_sub(1);
        tracing::debug!(leases = *leases, "Push connection lease released");
        if *leases == 0 {
            tracing::info!("Last subscriber gone; closing shared push connection.");
            self.transport.close();
            self.channel.set_connected(false);
        }
    }
}

/// Keeps the shared connection open while held.
pub struct ConnectionLease {
    manager: Arc<ConnectionManager>,
}

impl ConnectionLease {
    pub fn channel(&self) -> &Arc<DashboardChannel> {
        self.manager.channel()
    }
}

impl Drop for ConnectionLease {
    fn drop(&mut self) {
        self.manager.release();
    }
}
