//! Imagery session store.
//!
//! Owns everything a single user session knows about imagery: the
//! location-keyed result cache, the recent query history, the active result
//! and the layer selections. All mutation happens on the host's event thread.
//!
//! A query is split into two synchronous halves so an event-driven host can
//! interleave completions of several in-flight fetches:
//!
//! ```rust,ignore
//! match session.begin_query(&text) {
//!     QueryStart::Ignored => {}
//!     QueryStart::Cached(result) => show(result),
//!     QueryStart::Fetch(pending) => {
//!         let outcome = fetcher.fetch_imagery(pending.location()).await;
//!         session.complete_query(pending, outcome);
//!     }
//! }
//! ```
//!
//! [`SessionState::query`] drives both halves for hosts that await inline.

use std::collections::HashMap;
use web_time::Instant;

use crate::constants::HISTORY_LIMIT;
use crate::fetch::{ImageryFetcher, QueryError};
use crate::history::{HistoryStore, RecentHistory};
use crate::model::{ImageryResult, LayerKind};
use crate::navigation::LayerNavigator;

/// Validate location text. Only blank input is rejected; the text itself is
/// kept verbatim as the cache key.
pub fn validate_location(text: &str) -> Result<&str, QueryError> {
    if text.trim().is_empty() {
        Err(QueryError::InvalidInput)
    } else {
        Ok(text)
    }
}

/// A fetch the store is waiting on. Only [`SessionState::begin_query`]
/// creates these.
#[derive(Debug)]
#[must_use = "a pending query must be completed with SessionState::complete_query"]
pub struct PendingQuery {
    location: String,
}

impl PendingQuery {
    /// Location text to send to the backend.
    pub fn location(&self) -> &str {
        &self.location
    }
}

/// First half of a query.
#[derive(Debug)]
pub enum QueryStart {
    /// Blank input, nothing happened
    Ignored,
    /// Served from the cache and made active
    Cached(ImageryResult),
    /// Cache miss; the host must fetch and complete the query
    Fetch(PendingQuery),
}

/// How a query was satisfied.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// Blank input, nothing happened
    Ignored,
    /// Served from the cache without a fetch
    Cached(ImageryResult),
    /// Fetched from the backend and cached
    Fetched(ImageryResult),
}

impl QueryOutcome {
    /// The result, unless the query was ignored.
    pub fn result(&self) -> Option<&ImageryResult> {
        match self {
            QueryOutcome::Ignored => None,
            QueryOutcome::Cached(result) | QueryOutcome::Fetched(result) => Some(result),
        }
    }
}

/// Session-wide imagery state.
pub struct SessionState {
    /// Results keyed by the exact text the user submitted
    cache: HashMap<String, ImageryResult>,
    history: RecentHistory,
    history_store: Box<dyn HistoryStore>,
    active_location: Option<String>,
    selected_layer: LayerKind,
    fullscreen: LayerNavigator,
    /// Text in the search box
    location_input: String,
    /// Number of fetches in flight
    pending: usize,
    /// User-facing message of the last failed query
    last_error: Option<String>,
}

impl SessionState {
    /// Create a session persisting history to `history_store`.
    ///
    /// History is not read until [`restore_history`](Self::restore_history).
    pub fn new(history_store: Box<dyn HistoryStore>) -> Self {
        Self::with_history_limit(history_store, HISTORY_LIMIT)
    }

    /// Create a session with a smaller history cap (clamped to 1..=5).
    pub fn with_history_limit(history_store: Box<dyn HistoryStore>, limit: usize) -> Self {
        Self {
            cache: HashMap::new(),
            history: RecentHistory::new(limit),
            history_store,
            active_location: None,
            selected_layer: LayerKind::Rgb,
            fullscreen: LayerNavigator::new(),
            location_input: String::new(),
            pending: 0,
            last_error: None,
        }
    }

    /// Rehydrate history from durable storage. Never fails.
    pub fn restore_history(&mut self) {
        self.history = RecentHistory::restore(self.history_store.as_ref(), self.history.limit());
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Start a query for `location_text`.
    pub fn begin_query(&mut self, location_text: &str) -> QueryStart {
        let location = match validate_location(location_text) {
            Ok(location) => location,
            Err(_) => {
                log::debug!("Ignoring blank location query");
                return QueryStart::Ignored;
            }
        };

        self.last_error = None;

        if let Some(result) = self.cache.get(location) {
            log::debug!("📦 Cache hit for '{}'", location);
            let result = result.clone();
            self.activate(location);
            return QueryStart::Cached(result);
        }

        self.pending += 1;
        log::debug!("Cache miss for '{}' ({} in flight)", location, self.pending);
        QueryStart::Fetch(PendingQuery {
            location: location.to_string(),
        })
    }

    /// Finish a query started with [`begin_query`](Self::begin_query).
    ///
    /// On success the result is cached under the submitted text, made
    /// active, and the location moves to the front of the history. On
    /// failure nothing but the error message changes.
    pub fn complete_query(
        &mut self,
        pending: PendingQuery,
        outcome: Result<ImageryResult, QueryError>,
    ) -> Result<ImageryResult, QueryError> {
        self.pending = self.pending.saturating_sub(1);
        let PendingQuery { location } = pending;

        let fetched = match outcome {
            Ok(result) => result,
            Err(err) => {
                match &err {
                    QueryError::MalformedResponse(reason) => {
                        log::error!("Malformed imagery response for '{}': {}", location, reason);
                    }
                    QueryError::BackendFailure {
                        status,
                        message,
                        detail,
                    } => {
                        log::error!(
                            "Imagery backend failed for '{}' (status {:?}): {} {}",
                            location,
                            status,
                            message,
                            detail.as_deref().unwrap_or_default()
                        );
                    }
                    QueryError::InvalidInput => return Err(err),
                }
                self.last_error = Some(err.user_message());
                return Err(err);
            }
        };

        // A cached result is immutable, so when fetches of the same key race
        // the first completion is stored; later ones only re-activate it.
        let result = self
            .cache
            .entry(location.clone())
            .or_insert(fetched)
            .clone();
        self.activate(&location);

        self.history.push(&location);
        if let Err(e) = self.history.persist(self.history_store.as_mut()) {
            log::warn!("Failed to persist location history: {}", e);
        }

        log::info!(
            "🛰️ Imagery for '{}' ({}) cached, {} locations in session",
            location,
            result.date,
            self.cache.len()
        );
        Ok(result)
    }

    /// Run a full query, awaiting the fetch inline.
    pub async fn query<F: ImageryFetcher + ?Sized>(
        &mut self,
        fetcher: &F,
        location_text: &str,
    ) -> Result<QueryOutcome, QueryError> {
        let pending = match self.begin_query(location_text) {
            QueryStart::Ignored => return Ok(QueryOutcome::Ignored),
            QueryStart::Cached(result) => return Ok(QueryOutcome::Cached(result)),
            QueryStart::Fetch(pending) => pending,
        };

        let started = Instant::now();
        let outcome = fetcher.fetch_imagery(pending.location()).await;
        log::debug!(
            "Fetch for '{}' finished in {:?}",
            pending.location(),
            started.elapsed()
        );

        self.complete_query(pending, outcome)
            .map(QueryOutcome::Fetched)
    }

    fn activate(&mut self, location: &str) {
        self.active_location = Some(location.to_string());
        self.selected_layer = LayerKind::Rgb;
    }

    // ------------------------------------------------------------------
    // Layer selection
    // ------------------------------------------------------------------

    /// Select the inline layer. No-op without an active result.
    pub fn select_layer(&mut self, layer: LayerKind) -> bool {
        if self.active_location.is_none() {
            return false;
        }
        self.selected_layer = layer;
        true
    }

    /// Open the fullscreen viewer on the selected layer. No-op without an
    /// active result.
    pub fn open_fullscreen(&mut self) -> bool {
        if self.active_location.is_none() {
            return false;
        }
        self.fullscreen.open(self.selected_layer);
        true
    }

    pub fn close_fullscreen(&mut self) {
        self.fullscreen.close();
    }

    pub fn fullscreen(&self) -> &LayerNavigator {
        &self.fullscreen
    }

    pub fn fullscreen_mut(&mut self) -> &mut LayerNavigator {
        &mut self.fullscreen
    }

    // ------------------------------------------------------------------
    // Search input
    // ------------------------------------------------------------------

    pub fn set_location_input(&mut self, text: impl Into<String>) {
        self.location_input = text.into();
    }

    pub fn location_input(&self) -> &str {
        &self.location_input
    }

    /// Copy a history entry into the search input without querying.
    pub fn recall(&mut self, index: usize) -> Option<&str> {
        let location = self.history.get(index)?.to_string();
        self.location_input = location;
        Some(&self.location_input)
    }

    // ------------------------------------------------------------------
    // Queries on state
    // ------------------------------------------------------------------

    /// Result currently displayed.
    pub fn active(&self) -> Option<&ImageryResult> {
        self.active_location
            .as_deref()
            .and_then(|location| self.cache.get(location))
    }

    pub fn active_location(&self) -> Option<&str> {
        self.active_location.as_deref()
    }

    pub fn selected_layer(&self) -> LayerKind {
        self.selected_layer
    }

    /// Path of the selected layer of the active result.
    pub fn active_layer_path(&self) -> Option<&str> {
        self.active()
            .map(|result| result.layer_path(self.selected_layer))
    }

    pub fn cached(&self, location: &str) -> Option<&ImageryResult> {
        self.cache.get(location)
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn history(&self) -> &RecentHistory {
        &self.history
    }

    pub fn is_loading(&self) -> bool {
        self.pending > 0
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}
