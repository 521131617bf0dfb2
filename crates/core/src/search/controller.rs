//! Debounced, cancelable search driven by keystrokes.
//!
//! Each call to [`SearchController::set_query`] takes a new generation token
//! and aborts the lookup in flight. A lookup only publishes its outcome while
//! its token is still current, so a slow response for an old query can never
//! replace the results of a newer one.
//!
//! Tokens are taken and checked while holding the state channel's write lock,
//! so a lookup that loses the race to [`SearchController::clear`] on another
//! worker thread cannot publish after the reset.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use metro_transit::Coordinate;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::SearchConfig;
use crate::search::geocoder::{Geocoder, SearchCandidate, SearchError};

pub const SEARCH_FAILED_MESSAGE: &str = "Failed to search. Please try again.";

#[derive(Clone, Debug, Default, PartialEq)]
pub enum SearchState {
    /// No query worth sending
    #[default]
    Idle,
    Loading {
        query: String,
    },
    Results {
        query: String,
        candidates: Vec<SearchCandidate>,
    },
    Failed {
        query: String,
        message: String,
    },
}

impl SearchState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }
}

pub struct SearchController<G: Geocoder + ?Sized + 'static> {
    geocoder: Arc<G>,
    config: SearchConfig,
    query: String,
    generation: Arc<AtomicU64>,
    state: Arc<watch::Sender<SearchState>>,
    pending: Option<JoinHandle<()>>,
}

impl<G: Geocoder + ?Sized + 'static> SearchController<G> {
    pub fn new(geocoder: Arc<G>, config: SearchConfig) -> Self {
        let (state, _) = watch::channel(SearchState::Idle);
        Self {
            geocoder,
            config,
            query: String::new(),
            generation: Arc::new(AtomicU64::new(0)),
            state: Arc::new(state),
            pending: None,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> SearchState {
        self.state.borrow().clone()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Candidates of the last successful lookup, empty in any other state
    pub fn results(&self) -> Vec<SearchCandidate> {
        match &*self.state.borrow() {
            SearchState::Results { candidates, .. } => candidates.clone(),
            _ => Vec::new(),
        }
    }

    /// Record a new query text.
    ///
    /// Must be called from within a tokio runtime; the lookup runs on a
    /// spawned task once the debounce period passes without another change.
    pub fn set_query(&mut self, query: &str) {
        let trimmed = query.trim();
        let sendable = trimmed.chars().count() >= self.config.min_query_chars.max(1);
        let token = self.invalidate(!sendable);
        self.query = query.to_string();

        if !sendable {
            return;
        }

        let query = trimmed.to_string();
        let debounce = self.config.debounce();
        let geocoder = Arc::clone(&self.geocoder);
        let generation = Arc::clone(&self.generation);
        let state = Arc::clone(&self.state);

        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            let loading = SearchState::Loading {
                query: query.clone(),
            };
            if !publish_if_current(&state, &generation, token, loading) {
                return;
            }

            let (next, found) = match geocoder.search(&query).await {
                Ok(candidates) => {
                    let found = candidates.len();
                    (SearchState::Results { query: query.clone(), candidates }, Ok(found))
                }
                Err(e) => (
                    SearchState::Failed {
                        query: query.clone(),
                        message: SEARCH_FAILED_MESSAGE.to_string(),
                    },
                    Err(e),
                ),
            };

            if !publish_if_current(&state, &generation, token, next) {
                tracing::debug!("discarding stale search results for {query:?}");
                return;
            }
            match found {
                Ok(count) => tracing::debug!("{count} result(s) for {query:?}"),
                Err(e) => tracing::warn!("search for {query:?} failed: {e}"),
            }
        }));
    }

    /// Empty the query and results, cancelling any lookup in flight.
    pub fn clear(&mut self) {
        self.invalidate(true);
        self.query.clear();
    }

    /// Take a candidate's coordinate and reset the search.
    ///
    /// An unselectable candidate is rejected and leaves the state untouched.
    pub fn select(&mut self, candidate: &SearchCandidate) -> Result<Coordinate, SearchError> {
        let coordinate = candidate.coordinate()?;
        tracing::info!("selected {} at {coordinate:?}", candidate.display_name);
        self.clear();
        Ok(coordinate)
    }

    /// Take a fresh token, optionally resetting the state to idle in the same
    /// critical section. Every older token is stale from here on.
    fn invalidate(&mut self, reset: bool) -> u64 {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }

        let generation = &self.generation;
        let mut token = 0;
        self.state.send_if_modified(|current| {
            token = generation.fetch_add(1, Ordering::SeqCst) + 1;
            if reset {
                *current = SearchState::Idle;
            }
            reset
        });
        token
    }
}

/// Publish `next` only while `token` is the current generation.
///
/// The check and the write happen under the channel's write lock, the same
/// lock `invalidate` bumps the generation under.
fn publish_if_current(
    state: &watch::Sender<SearchState>,
    generation: &AtomicU64,
    token: u64,
    next: SearchState,
) -> bool {
    state.send_if_modified(|current| {
        if generation.load(Ordering::SeqCst) != token {
            return false;
        }
        *current = next;
        true
    })
}

impl<G: Geocoder + ?Sized + 'static> Drop for SearchController<G> {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }
}
