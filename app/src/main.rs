// In app/src/main.rs

use anyhow::Result;
use api_client::{ApiClient, CableTransport};
use app_config::Settings;
use core_types::{DashboardData, HealthResponse};
use events::ConnectionManager;
use filters::{DebouncedSearch, SearchInput};
use presentation::TradingStatus;
use query_cache::{CacheEvent, QueryCache, QueryKey, Reconciler, Refresher, lock};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{broadcast::error::RecvError, mpsc};
use tracing_subscriber::prelude::*;

mod decisions_view;
mod report;

use crate::decisions_view::DecisionsView;

/// Window for the startup performance summary.
const PERFORMANCE_DAYS: u32 = 30;

// --- Main Application Entry Point ---

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load environment variables from a .env file, if it exists.
    dotenvy::dotenv().ok();

    let settings = app_config::load_settings()?;

    let level = tracing::Level::from_str(&settings.app.log_level).unwrap_or(tracing::Level::INFO);
    let fmt_layer = tracing_subscriber::fmt::layer().with_filter(
        tracing_subscriber::filter::Targets::new()
            .with_target("hyper_util", tracing::Level::WARN)
            .with_target("tungstenite", tracing::Level::WARN)
            .with_default(level),
    );
    tracing_subscriber::registry().with(fmt_layer).init();

    tracing::info!(
        environment = %settings.app.environment,
        api = %settings.api.base_url,
        "Starting dashboard monitor"
    );

    run_monitor(settings).await
}

async fn run_monitor(settings: Settings) -> Result<()> {
    // --- 1. Component Instantiation ---
    let client = Arc::new(ApiClient::new(&settings.api)?);
    let cache = QueryCache::shared();
    let transport = Arc::new(CableTransport::from_settings(&settings.api, &settings.realtime));
    let connection = ConnectionManager::new(transport);

    // --- 2. Real-time reconciliation and refetching ---
    let reconciler = Reconciler::new(cache.clone(), settings.realtime.recent_decisions_cap);
    let mounted = reconciler.mount(&connection);
    let mut connected = mounted.watch_connected();

    let refresher = Refresher::new(client.clone(), cache.clone());
    let refresher_handle = tokio::spawn(refresher.run(
        lock(&cache).subscribe(),
        Duration::from_secs(settings.realtime.dashboard_refetch_secs),
    ));
    let mut cache_events = lock(&cache).subscribe();

    match client.performance(Some(PERFORMANCE_DAYS)).await {
        Ok(performance) => {
            report::log_performance(PERFORMANCE_DAYS, &performance);
            lock(&cache).set(QueryKey::performance(PERFORMANCE_DAYS), performance);
        }
        Err(e) => tracing::warn!(error = %e, "Performance load failed."),
    }

    // --- 3. Decisions list with debounced search from stdin ---
    let mut decisions = DecisionsView::new(client.clone(), &settings.filters, "");
    if let Err(e) = decisions.load().await {
        tracing::warn!(error = %e, "Initial decisions load failed.");
    }

    let (search_tx, search_rx) = mpsc::unbounded_channel();
    let (commit_tx, mut commits) = mpsc::unbounded_channel();
    let search = DebouncedSearch::new(
        &decisions.search_term(),
        Duration::from_millis(settings.filters.debounce_ms),
        commit_tx,
    );
    let search_handle = tokio::spawn(search.run(search_rx));

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    tracing::info!("Type to search decisions; an empty line clears the search. Ctrl-C to quit.");

    // --- 4. Event loop ---
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown requested.");
                break;
            }
            line = stdin.next_line(), if stdin_open => match line {
                Ok(Some(line)) => {
                    let term = line.trim();
                    let input = if term.is_empty() {
                        SearchInput::Clear
                    } else {
                        SearchInput::Keystroke(term.to_string())
                    };
                    forward_search(&search_tx, input);
                }
                Ok(None) => stdin_open = false,
                Err(e) => {
                    tracing::warn!(error = %e, "Stopped reading stdin.");
                    stdin_open = false;
                }
            },
            Some(term) = commits.recv() => {
                decisions.search(term);
                forward_search(&search_tx, SearchInput::External(decisions.search_term()));
                if let Err(e) = decisions.load().await {
                    tracing::warn!(error = %e, "Decisions load failed.");
                }
            }
            changed = connected.changed() => {
                if changed.is_err() {
                    break;
                }
                let is_connected = *connected.borrow_and_update();
                tracing::info!(connected = is_connected, "Real-time connection changed.");
            }
            event = cache_events.recv() => match event {
                Ok(CacheEvent::Updated(key)) => report_update(&cache, &key, &settings),
                Ok(CacheEvent::Invalidated(_)) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Report lagged behind cache events");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    // --- 5. Teardown ---
    mounted.unmount();
    drop(search_tx);
    let _ = search_handle.await;
    refresher_handle.abort();
    tracing::info!(last_update = ?*reconciler.watch_last_update().borrow(), "Dashboard monitor stopped.");
    Ok(())
}

/// Hands one input to the search field task. Returns false once the task is gone.
fn forward_search(tx: &mpsc::UnboundedSender<SearchInput>, input: SearchInput) -> bool {
    match tx.send(input) {
        Ok(()) => true,
        Err(mpsc::error::SendError(input)) => {
            tracing::trace!(?input, "Search field stopped; dropping input");
            false
        }
    }
}

fn report_update(cache: &query_cache::SharedCache, key: &QueryKey, settings: &Settings) {
    let now = chrono::Utc::now();
    if *key == QueryKey::dashboard() {
        if let Some(data) = lock(cache).get::<DashboardData>(key) {
            report::log_dashboard(&data, &settings.staleness, now);
        }
    } else if *key == QueryKey::health() {
        let health = lock(cache).get::<HealthResponse>(key);
        report::log_trading_status(&TradingStatus::from_health(health.as_deref()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_inputs_after_the_field_stops_are_dropped() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        assert!(forward_search(&tx, SearchInput::Keystroke("btc".to_string())));
        assert_eq!(rx.try_recv().ok(), Some(SearchInput::Keystroke("btc".to_string())));

        drop(rx);
        assert!(!forward_search(&tx, SearchInput::Clear));
    }
}
