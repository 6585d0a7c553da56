// In crates/filters/src/search.rs

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};

/// Input to a search field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchInput {
    /// The user typed; carries the full field value.
    Keystroke(String),
    /// The clear button or Escape.
    Clear,
    /// The owning view changed the committed value.
    External(String),
}

/// A search box that commits its value once typing settles.
///
/// The local value echoes every keystroke. A commit is sent `delay` after the
/// last keystroke, unless the settled value already equals the external one.
/// Clearing commits `""` at once. There is at most one pending deadline.
pub struct DebouncedSearch {
    local: String,
    external: String,
    delay: Duration,
    pending: Option<Instant>,
    mounted: bool,
    commits: mpsc::UnboundedSender<String>,
}

impl DebouncedSearch {
    pub fn new(external: &str, delay: Duration, commits: mpsc::UnboundedSender<String>) -> Self {
        Self {
            local: external.to_string(),
            external: external.to_string(),
            delay,
            pending: None,
            mounted: true,
            commits,
        }
    }

    pub fn local_value(&self) -> &str {
        &self.local
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending
    }

    pub fn handle(&mut self, input: SearchInput, now: Instant) {
        match input {
            SearchInput::Keystroke(value) => self.on_input(value, now),
            SearchInput::Clear => self.clear(),
            SearchInput::External(value) => self.sync_external(value),
        }
    }

    /// Echoes `value` locally and restarts the debounce window.
    pub fn on_input(&mut self, value: impl Into<String>, now: Instant) {
        if !self.mounted {
            return;
        }
        self.local = value.into();
        self.pending = Some(now + self.delay);
    }

    /// Empties the field and commits `""` immediately, dropping any pending commit.
    pub fn clear(&mut self) {
        if !self.mounted {
            return;
        }
        self.local.clear();
        self.pending = None;
        self.send(String::new());
    }

    /// Adopts a value set by the owning view. A pending commit is dropped.
    pub fn sync_external(&mut self, value: impl Into<String>) {
        let value = value.into();
        self.local.clone_from(&value);
        self.external = value;
        self.pending = None;
    }

    /// Commits the local value if its deadline has passed. Returns whether a commit was sent.
    pub fn fire_due(&mut self, now: Instant) -> bool {
        if !self.mounted {
            return false;
        }
        match self.pending {
            Some(deadline) if deadline <= now => {
                self.pending = None;
                if self.local != self.external {
                    self.send(self.local.clone());
                    return true;
                }
                false
            }
            _ => false,
        }
    }

    /// Cancels the pending deadline. Everything after this is a no-op.
    pub fn unmount(&mut self) {
        self.mounted = false;
        self.pending = None;
    }

    fn send(&self, value: String) {
        tracing::debug!(value = %value, "Search committed");
        if self.commits.send(value).is_err() {
            tracing::trace!("Search commit receiver dropped");
        }
    }

    /// Drives the field from `inputs` until the sender side is dropped, then unmounts.
    pub async fn run(mut self, mut inputs: mpsc::UnboundedReceiver<SearchInput>) {
        loop {
            let deadline = self.next_deadline();
            tokio::select! {
                input = inputs.recv() => match input {
                    Some(input) => self.handle(input, Instant::now()),
                    None => break,
                },
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.fire_due(Instant::now());
                }
            }
        }
        self.unmount();
    }
}
