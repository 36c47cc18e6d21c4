//! Debounced search controller
//!
//! Turns keystrokes into geocoder lookups:
//! - input shorter than `MIN_QUERY_LEN` never reaches the network
//! - a lookup is issued only after `DEBOUNCE` of quiet input
//! - issuing a lookup aborts the one still in flight
//!
//! Two counters guard against stale work. `input_generation` changes on
//! every input, clear and selection, so a debounce timer that already woke
//! up cannot issue a lookup for old text. `lookup_generation` changes
//! whenever the outstanding lookup is superseded, and a finished lookup only
//! applies its outcome while its generation is still current. Both are
//! checked under the state lock, so at most one lookup result is ever
//! applied and it is always the latest one not superseded.

use crate::{MAX_SUGGESTIONS, Result, SuggestionSource};
use clientmap_core::{SelectedLocation, Suggestion};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Queries shorter than this (in characters) are not searched
pub const MIN_QUERY_LEN: usize = 3;

/// Quiet period before a lookup is issued
pub const DEBOUNCE: Duration = Duration::from_millis(500);

pub const NO_RESULTS_MESSAGE: &str = "No results found";

pub const SEARCH_FAILED_MESSAGE: &str = "Search failed. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    #[default]
    Idle,
    /// Waiting out the debounce window or a lookup in flight
    Pending,
    ShowingResults,
    ShowingError,
}

/// Everything the search box and its results panel render
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchState {
    pub query: String,
    pub status: SearchStatus,
    pub suggestions: Vec<Suggestion>,
    pub selected: Option<SelectedLocation>,
    pub error: Option<String>,
    /// Whether the results panel is expanded
    pub expanded: bool,
}

struct Shared {
    state: SearchState,
    input_generation: u64,
    lookup_generation: u64,
    debounce_task: Option<JoinHandle<()>>,
    lookup_task: Option<JoinHandle<()>>,
}

impl Shared {
    fn cancel_debounce(&mut self) {
        self.input_generation += 1;
        if let Some(task) = self.debounce_task.take() {
            task.abort();
        }
    }

    /// Supersede the outstanding lookup. Its outcome will never be applied.
    fn cancel_lookup(&mut self) {
        self.lookup_generation += 1;
        if let Some(task) = self.lookup_task.take() {
            debug!("Canceling in-flight lookup");
            task.abort();
        }
    }
}

struct Inner<S> {
    source: S,
    debounce: Duration,
    shared: Mutex<Shared>,
    updates: watch::Sender<SearchState>,
}

impl<S: SuggestionSource> Inner<S> {
    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn publish(&self, shared: &Shared) {
        self.updates.send_replace(shared.state.clone());
    }

    /// Called by the debounce task once the quiet period elapsed
    fn issue_lookup(self: &Arc<Self>, input_generation: u64, query: String) {
        let mut shared = self.lock();
        if shared.input_generation != input_generation {
            return;
        }
        shared.debounce_task = None;
        shared.cancel_lookup();

        shared.state.status = SearchStatus::Pending;
        self.publish(&shared);

        let lookup_generation = shared.lookup_generation;
        debug!(query = %query, generation = lookup_generation, "Issuing lookup");
        let inner = Arc::clone(self);
        shared.lookup_task = Some(tokio::spawn(async move {
            let outcome = inner.source.suggest(&query).await;
            inner.apply(lookup_generation, outcome);
        }));
    }

    fn apply(&self, lookup_generation: u64, outcome: Result<Vec<Suggestion>>) {
        let mut shared = self.lock();
        if shared.lookup_generation != lookup_generation {
            debug!(generation = lookup_generation, "Dropping superseded lookup result");
            return;
        }
        shared.lookup_task = None;

        let state = &mut shared.state;
        match outcome {
            Ok(suggestions) if suggestions.is_empty() => {
                state.status = SearchStatus::ShowingError;
                state.suggestions.clear();
                state.error = Some(NO_RESULTS_MESSAGE.to_string());
                state.expanded = false;
            }
            Ok(mut suggestions) => {
                suggestions.truncate(MAX_SUGGESTIONS);
                state.status = SearchStatus::ShowingResults;
                state.suggestions = suggestions;
                state.error = None;
                state.expanded = true;
            }
            Err(e) => {
                warn!("Location search failed: {}", e);
                state.status = SearchStatus::ShowingError;
                state.suggestions.clear();
                state.error = Some(SEARCH_FAILED_MESSAGE.to_string());
                state.expanded = false;
            }
        }
        self.publish(&shared);
    }
}

/// Debounced, cancelable location search.
///
/// Must be used from within a tokio runtime. Dropping the controller aborts
/// any pending debounce timer and in-flight lookup.
pub struct SearchController<S> {
    inner: Arc<Inner<S>>,
}

impl<S: SuggestionSource> SearchController<S> {
    pub fn new(source: S) -> Self {
        Self::with_debounce(source, DEBOUNCE)
    }

    pub fn with_debounce(source: S, debounce: Duration) -> Self {
        let (updates, _) = watch::channel(SearchState::default());
        Self {
            inner: Arc::new(Inner {
                source,
                debounce,
                shared: Mutex::new(Shared {
                    state: SearchState::default(),
                    input_generation: 0,
                    lookup_generation: 0,
                    debounce_task: None,
                    lookup_task: None,
                }),
                updates,
            }),
        }
    }

    /// Current state snapshot
    pub fn state(&self) -> SearchState {
        self.inner.lock().state.clone()
    }

    /// Receive every published state change
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.inner.updates.subscribe()
    }

    /// Handle a change of the search box text
    pub fn on_input(&self, text: impl Into<String>) {
        let text = text.into();
        let mut shared = self.inner.lock();
        shared.cancel_debounce();
        shared.state.query = text.clone();
        shared.state.error = None;

        let query = text.trim().to_string();
        if query.chars().count() < MIN_QUERY_LEN {
            shared.cancel_lookup();
            shared.state.status = SearchStatus::Idle;
            shared.state.suggestions.clear();
            shared.state.expanded = false;
            self.inner.publish(&shared);
            return;
        }

        shared.state.status = SearchStatus::Pending;
        let input_generation = shared.input_generation;
        let inner = Arc::clone(&self.inner);
        shared.debounce_task = Some(tokio::spawn(async move {
            tokio::time::sleep(inner.debounce).await;
            inner.issue_lookup(input_generation, query);
        }));
        self.inner.publish(&shared);
    }

    /// Pick the suggestion at `index`.
    ///
    /// Returns the persisted selection so the caller can recenter the map,
    /// or `None` if no suggestion is shown at that index.
    pub fn select(&self, index: usize) -> Option<SelectedLocation> {
        let mut shared = self.inner.lock();
        let suggestion = shared.state.suggestions.get(index).cloned()?;
        shared.cancel_debounce();
        shared.cancel_lookup();

        let selected = SelectedLocation::from(suggestion);
        let state = &mut shared.state;
        state.query = selected.name.clone();
        state.status = SearchStatus::Idle;
        state.suggestions.clear();
        state.error = None;
        state.expanded = false;
        state.selected = Some(selected.clone());
        self.inner.publish(&shared);
        Some(selected)
    }

    /// Reset everything: query, suggestions, selection, error and panel
    pub fn clear(&self) {
        let mut shared = self.inner.lock();
        shared.cancel_debounce();
        shared.cancel_lookup();
        shared.state = SearchState::default();
        self.inner.publish(&shared);
    }
}

impl<S> Drop for SearchController<S> {
    fn drop(&mut self) {
        let mut shared = self
            .inner
            .shared
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        shared.input_generation += 1;
        shared.lookup_generation += 1;
        if let Some(task) = shared.debounce_task.take() {
            task.abort();
        }
        if let Some(task) = shared.lookup_task.take() {
            task.abort();
        }
    }
}
