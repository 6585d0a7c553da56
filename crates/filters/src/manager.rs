// In crates/filters/src/manager.rs

use core_types::ListFilterParams;
use std::sync::Arc;
use tokio::sync::watch;

use crate::history::History;
use crate::query_string::QueryParams;
use crate::state::{FilterDefaults, FilterField, FilterPatch, FilterState, FilterUpdate};

/// Owns a list view's filter state and keeps it mirrored in the URL.
///
/// State and URL change together: each accepted mutation writes the query
/// string exactly once and then notifies subscribers.
pub struct FilterStateManager {
    history: Arc<dyn History>,
    defaults: FilterDefaults,
    state: watch::Sender<FilterState>,
}

impl FilterStateManager {
    /// Builds the state from the current URL, falling back to `defaults`
    /// for anything missing or malformed. Does not touch the URL.
    pub fn initialize(history: Arc<dyn History>, defaults: FilterDefaults) -> Self {
        let initial = defaults.state_from_query(&QueryParams::parse(&history.query()));
        tracing::debug!(state = ?initial, "Filter state initialized from URL");
        let (state, _) = watch::channel(initial);
        Self {
            history,
            defaults,
            state,
        }
    }

    pub fn state(&self) -> FilterState {
        self.state.borrow().clone()
    }

    pub fn defaults(&self) -> &FilterDefaults {
        &self.defaults
    }

    pub fn subscribe(&self) -> watch::Receiver<FilterState> {
        self.state.subscribe()
    }

    /// Sets one field. Any field other than `page` and `pageSize` sends the
    /// view back to page 1, and so does a page size change.
    ///
    /// Returns `false` (and changes nothing) for a value the view cannot
    /// hold: page 0, a page size outside the options, or a malformed date.
    pub fn set_field(&self, update: FilterUpdate) -> bool {
        if !self.defaults.accepts(&update) {
            tracing::debug!(?update, "Rejected filter update");
            return false;
        }
        let field = update.field();
        let mut next = self.state();
        next.apply(update);
        if field != FilterField::Page {
            next.page = 1;
        }
        self.commit(next);
        true
    }

    /// Applies several fields in one step, with one URL write.
    ///
    /// The page is reset to 1 when the patch touches anything but `page`.
    /// A patch carrying any unacceptable value is rejected whole.
    pub fn set_fields(&self, patch: FilterPatch) -> bool {
        let updates = patch.into_updates();
        if let Some(bad) = updates.iter().find(|u| !self.defaults.accepts(u)) {
            tracing::debug!(update = ?bad, "Rejected filter patch");
            return false;
        }
        let reset_page = updates.iter().any(|u| u.field() != FilterField::Page);
        let mut next = self.state();
        for update in updates {
            next.apply(update);
        }
        if reset_page {
            next.page = 1;
        }
        self.commit(next);
        true
    }

    /// Restores every field to its default and strips the filter keys from the
    /// URL. Unrelated params stay.
    pub fn reset_filters(&self) {
        let mut params = QueryParams::parse(&self.history.query());
        for field in FilterField::ALL {
            params.remove(field.url_key());
        }
        self.history.replace_query(&params.to_query_string());
        self.publish(self.defaults.values.clone());
    }

    pub fn has_active_filters(&self) -> bool {
        self.state.borrow().has_active_filters()
    }

    pub fn list_params(&self) -> ListFilterParams {
        self.state.borrow().to_list_params()
    }

    fn commit(&self, next: FilterState) {
        let mut params = QueryParams::parse(&self.history.query());
        for field in FilterField::ALL {
            let value = next.url_value(field);
            if !value.is_empty() && value != self.defaults.values.url_value(field) {
                params.set(field.url_key(), value);
            } else {
                params.remove(field.url_key());
            }
        }
        self.history.replace_query(&params.to_query_string());
        self.publish(next);
    }

    fn publish(&self, next: FilterState) {
        self.state.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MemoryHistory;

    fn manager(query: &str) -> (FilterStateManager, Arc<MemoryHistory>) {
        let history = MemoryHistory::new(query);
        let defaults = FilterDefaults::new(FilterState::with_page_size(25), vec![10, 25, 50, 100]);
        (FilterStateManager::initialize(history.clone(), defaults), history)
    }

    #[test]
    fn initialize_reads_the_url_without_writing_it() {
        let (manager, history) = manager("status=executed&page=2");
        assert_eq!(manager.state().status, "executed");
        assert_eq!(manager.state().page, 2);
        assert_eq!(history.write_count(), 0);
    }

    #[test]
    fn non_page_field_forces_page_one() {
        let (manager, history) = manager("page=4");
        assert!(manager.set_field(FilterUpdate::Symbol("ETH".to_string())));

        assert_eq!(manager.state().page, 1);
        assert_eq!(history.query(), "symbol=ETH");
        assert_eq!(history.write_count(), 1);
    }

    #[test]
    fn page_changes_keep_other_fields() {
        let (manager, history) = manager("symbol=BTC");
        manager.set_field(FilterUpdate::Page(3));
        assert_eq!(manager.state().page, 3);
        assert_eq!(manager.state().symbol, "BTC");
        assert_eq!(history.query(), "symbol=BTC&page=3");
    }

    #[test]
    fn page_size_change_resets_page() {
        let (manager, history) = manager("page=5");
        manager.set_field(FilterUpdate::PageSize(50));
        assert_eq!((manager.state().page, manager.state().page_size), (1, 50));
        assert_eq!(history.query(), "pageSize=50");
    }

    #[test]
    fn default_and_empty_values_are_not_written() {
        let (manager, history) = manager("symbol=BTC&pageSize=50");
        manager.set_fields(FilterPatch {
            symbol: Some(String::new()),
            page_size: Some(25),
            ..Default::default()
        });
        assert_eq!(history.query(), "");
        assert_eq!(history.write_count(), 1);
    }

    #[test]
    fn patch_touching_only_page_keeps_it() {
        let (manager, _) = manager("");
        manager.set_fields(FilterPatch {
            page: Some(2),
            ..Default::default()
        });
        assert_eq!(manager.state().page, 2);

        manager.set_fields(FilterPatch {
            page: Some(3),
            search: Some("funding".to_string()),
            ..Default::default()
        });
        assert_eq!(manager.state().page, 1);
        assert_eq!(manager.state().search, "funding");
    }

    #[test]
    fn set_field_keeps_foreign_params() {
        let (manager, history) = manager("tab=closed&page=3");
        manager.set_field(FilterUpdate::Symbol("ETH".to_string()));
        assert_eq!(history.query(), "tab=closed&symbol=ETH");

        manager.set_field(FilterUpdate::Page(2));
        assert_eq!(history.query(), "tab=closed&symbol=ETH&page=2");
    }

    #[test]
    fn set_fields_keeps_foreign_params() {
        let (manager, history) = manager("utm=mail&page=3&tab=closed");
        manager.set_fields(FilterPatch {
            status: Some("executed".to_string()),
            search: Some("breakout".to_string()),
            ..Default::default()
        });
        assert_eq!(history.query(), "utm=mail&tab=closed&status=executed&search=breakout");
        assert_eq!(history.write_count(), 1);
    }

    #[test]
    fn reset_restores_defaults_and_keeps_foreign_params() {
        let (manager, history) = manager("tab=closed&symbol=ETH&search=dip&page=3&pageSize=100");
        assert!(manager.has_active_filters());

        manager.reset_filters();
        assert_eq!(manager.state(), FilterState::with_page_size(25));
        assert!(!manager.has_active_filters());
        assert_eq!(history.query(), "tab=closed");
        assert_eq!(history.write_count(), 1);
    }

    #[test]
    fn invalid_updates_are_rejected_without_a_write() {
        let (manager, history) = manager("page=2");
        assert!(!manager.set_field(FilterUpdate::Page(0)));
        assert!(!manager.set_field(FilterUpdate::PageSize(7)));
        assert!(!manager.set_field(FilterUpdate::StartDate("01/06/2024".to_string())));
        assert_eq!(manager.state().page, 2);
        assert_eq!(history.write_count(), 0);
    }

    #[test]
    fn subscribers_see_each_change() {
        let (manager, _) = manager("");
        let mut rx = manager.subscribe();
        assert!(!rx.has_changed().unwrap());

        manager.set_field(FilterUpdate::Status("rejected".to_string()));
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().status, "rejected");
    }
}
