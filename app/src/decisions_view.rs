// In app/src/decisions_view.rs

use anyhow::Result;
use api_client::ApiClient;
use app_config::FilterSettings;
use core_types::PaginationMeta;
use filters::{
    FilterDefaults, FilterStateManager, FilterUpdate, History, MemoryHistory, PaginationController,
};
use presentation::{item_count_label, time_ago};
use std::sync::Arc;

/// The decisions list, driven by filter state kept in an in-memory URL.
pub struct DecisionsView {
    client: Arc<ApiClient>,
    history: Arc<MemoryHistory>,
    filters: FilterStateManager,
    pager: PaginationController,
}

impl DecisionsView {
    pub fn new(client: Arc<ApiClient>, settings: &FilterSettings, initial_query: &str) -> Self {
        let history = MemoryHistory::new(initial_query);
        let filters =
            FilterStateManager::initialize(history.clone(), FilterDefaults::from_settings(settings));
        let state = filters.state();
        Self {
            client,
            history,
            filters,
            pager: PaginationController::new(state.page, state.page_size, 0),
        }
    }

    fn location(&self) -> String {
        let query = self.history.query();
        if query.is_empty() { "(none)".to_string() } else { format!("?{query}") }
    }

    pub fn search_term(&self) -> String {
        self.filters.state().search
    }

    /// Applies a committed search term. The page goes back to 1.
    pub fn search(&mut self, term: String) {
        if self.filters.set_field(FilterUpdate::Search(term)) {
            self.pager.set_page(1);
        }
    }

    fn apply_meta(&mut self, meta: &PaginationMeta) {
        self.pager.apply_meta(meta);
    }

    pub async fn load(&mut self) -> Result<()> {
        let page = self.client.decisions(&self.filters.list_params()).await?;
        self.apply_meta(&page.meta);
        tracing::info!(
            query = %self.location(),
            filtered = self.filters.has_active_filters(),
            "{} ({})",
            self.pager.page_label(),
            item_count_label(page.meta.total, "decision", "decisions"),
        );
        let now = chrono::Utc::now();
        for decision in &page.items {
            tracing::info!(
                id = decision.id,
                symbol = %decision.symbol,
                operation = ?decision.operation,
                status = ?decision.status,
                when = %time_ago(Some(decision.created_at), now),
                "decision"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use app_config::ApiSettings;

    fn view(initial_query: &str) -> DecisionsView {
        let api = ApiSettings {
            base_url: "http://localhost:3000/api/v1".to_string(),
            cable_url: "ws://localhost:3000/cable".to_string(),
            retry_count: 0,
            request_timeout_secs: 5,
        };
        let client = Arc::new(ApiClient::new(&api).unwrap());
        DecisionsView::new(client, &FilterSettings::default(), initial_query)
    }

    fn meta(total_pages: u32) -> PaginationMeta {
        PaginationMeta { page: 1, per_page: 50, total: u64::from(total_pages) * 50, total_pages }
    }

    #[test]
    fn one_pager_lives_across_loads() {
        let mut view = view("page=3&pageSize=50");
        view.apply_meta(&meta(5));
        assert_eq!(view.pager.page(), 3);
        assert_eq!(view.pager.total_pages(), 5);

        view.search("eth".to_string());
        assert_eq!(view.pager.page(), 1);
        assert_eq!(view.filters.state().page, 1);

        view.apply_meta(&meta(2));
        assert_eq!(view.pager.total_pages(), 2);

        // The construction-time snapshot survives the fetches.
        view.pager.reset();
        assert_eq!((view.pager.page(), view.pager.page_size()), (3, 50));
    }
}
