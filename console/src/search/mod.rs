//! Debounced player search.
//!
//! Keystrokes update the query at once; the remote lookup only fires after a
//! quiet period with no further edits. The pending call is a real task
//! handle that gets aborted outright by the next keystroke, and every issued
//! request carries a sequence tag: a response may only touch the result list
//! while its tag is still the latest one handed out. That keeps a slow old
//! response from overwriting the results of a newer query.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};

use crate::api::common::PageRequest;
use crate::api::player::{Player, PlayerFilter, PlayerService};
use crate::errors::ServiceResult;
use crate::http::HttpClient;

/// Looks up players matching a filter.
#[async_trait]
pub trait Searcher: Send + Sync + 'static {
    async fn search(&self, filter: PlayerFilter) -> ServiceResult<Vec<Player>>;
}

/// Searches the live backend. The search box shows a flat result list, so
/// the listing is requested as one oversized first page.
pub struct BackendSearcher {
    http: Arc<HttpClient>,
    page_size: u32,
}

impl BackendSearcher {
    pub fn new(http: Arc<HttpClient>, page_size: u32) -> Self {
        BackendSearcher { http, page_size }
    }
}

#[async_trait]
impl Searcher for BackendSearcher {
    async fn search(&self, filter: PlayerFilter) -> ServiceResult<Vec<Player>> {
        let page = PageRequest::first(self.page_size);
        let listing = PlayerService::new(&self.http)
            .list_players(page, &filter)
            .await?;
        Ok(listing.data)
    }
}

/// The two inputs of the search box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Country,
    SearchKey,
}

/// Snapshot of what the search box should render.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchView {
    pub query: PlayerFilter,
    pub loading: bool,
    pub results: Vec<Player>,
    pub error: Option<String>,
}

#[derive(Default)]
struct SearchState {
    query: PlayerFilter,
    loading: bool,
    results: Vec<Player>,
    error: Option<String>,
}

/// The search box core: a query, a cancellable pending lookup, and the
/// latest results.
pub struct DebouncedSearch<S> {
    searcher: Arc<S>,
    delay: Duration,
    state: Arc<Mutex<SearchState>>,
    latest_seq: Arc<AtomicU64>,
    timer: Option<JoinHandle<()>>,
}

impl<S: Searcher> DebouncedSearch<S> {
    pub fn new(searcher: S, delay: Duration) -> Self {
        DebouncedSearch {
            searcher: Arc::new(searcher),
            delay,
            state: Arc::new(Mutex::new(SearchState::default())),
            latest_seq: Arc::new(AtomicU64::new(0)),
            timer: None,
        }
    }

    /// An edit to one of the two fields. The query updates immediately and
    /// any armed or in-flight lookup is cancelled. With both fields blank
    /// the results empty right here; otherwise a fresh lookup is armed for
    /// `delay` from now.
    pub async fn input(&mut self, field: SearchField, value: &str) {
        self.cancel_pending();

        let armed_query = {
            let mut state = self.state.lock().await;
            let slot = match field {
                SearchField::Country => &mut state.query.country,
                SearchField::SearchKey => &mut state.query.search_key,
            };
            *slot = if value.is_empty() {
                None
            } else {
                Some(value.to_string())
            };

            if state.query.is_empty() {
                // No wait and no request for a blank query; anything already
                // in flight is now stale.
                self.latest_seq.fetch_add(1, Ordering::SeqCst);
                state.results.clear();
                state.loading = false;
                state.error = None;
                None
            } else {
                Some(state.query.clone())
            }
        };

        if let Some(query) = armed_query {
            self.arm(query);
        }
    }

    /// The reset control: blank query, no results, nothing pending.
    pub async fn reset(&mut self) {
        self.cancel_pending();
        self.latest_seq.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().await;
        state.query = PlayerFilter::default();
        state.results.clear();
        state.loading = false;
        state.error = None;
    }

    /// Snapshot for rendering.
    pub async fn view(&self) -> SearchView {
        let state = self.state.lock().await;
        SearchView {
            query: state.query.clone(),
            loading: state.loading,
            results: state.results.clone(),
            error: state.error.clone(),
        }
    }

    fn arm(&mut self, query: PlayerFilter) {
        let seq = self.latest_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let deadline = Instant::now() + self.delay;
        let searcher = self.searcher.clone();
        let state = self.state.clone();
        let latest_seq = self.latest_seq.clone();

        self.timer = Some(tokio::spawn(async move {
            sleep_until(deadline).await;

            {
                let mut state = state.lock().await;
                if latest_seq.load(Ordering::SeqCst) != seq {
                    return;
                }
                state.loading = true;
            }

            let outcome = searcher.search(query).await;

            let mut state = state.lock().await;
            if latest_seq.load(Ordering::SeqCst) != seq {
                return;
            }
            state.loading = false;
            match outcome {
                Ok(results) => {
                    state.results = results;
                    state.error = None;
                }
                Err(e) => {
                    // Results from the previous successful lookup stay up.
                    state.error = Some(e.to_string());
                }
            }
        }));
    }

    fn cancel_pending(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl<S> Drop for DebouncedSearch<S> {
    fn drop(&mut self) {
        // A pending lookup must not outlive the search box.
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}
