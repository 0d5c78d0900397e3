// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Source list state
//!
//! [`ListState`] owns the current [`ViewParameters`], the loaded sources and
//! catalogs, and the loading flags. Every fetch takes a [`RequestTicket`];
//! a response is written only when its ticket belongs to the latest intent,
//! so a superseded fetch that arrives late is dropped.

use crate::error::ConsoleError;
use crate::types::{AppType, Catalogs, Source, SourceType};
use crate::view::{filter_entities, project, Projection, ViewParameters, ViewUpdate};
use std::time::{Duration, Instant};

// =============================================================================
// Request tickets
// =============================================================================

/// Identifies one issued fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTicket {
    /// Monotonic issue number
    pub seq: u64,
    /// Intent key of the parameters the fetch was issued for
    pub intent: String,
}

/// What happened to a delivered response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Written to the state
    Applied,
    /// Superseded and discarded
    Stale,
}

// =============================================================================
// List state
// =============================================================================

/// What the list page should show
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListDisplay {
    /// Something is still loading
    Placeholder,
    /// The sources could not be fetched
    Error(ConsoleError),
    /// There are no sources at all
    NoSources,
    /// Sources exist but no source passes the filters
    NoResults,
    /// Rows to render
    Table(Projection),
}

/// Loaded data and view parameters of the source list
#[derive(Debug, Clone, Default)]
pub struct ListState {
    params: ViewParameters,
    entities: Vec<Source>,
    count: usize,
    catalogs: Catalogs,
    loaded: bool,
    source_types_loaded: bool,
    app_types_loaded: bool,
    entities_error: Option<ConsoleError>,
    source_types_error: Option<ConsoleError>,
    app_types_error: Option<ConsoleError>,
    seq: u64,
    applied_seq: u64,
    latest_intent: Option<String>,
}

impl ListState {
    /// Empty state with the given starting parameters
    #[must_use]
    pub fn new(params: ViewParameters) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    /// Current view parameters
    #[must_use]
    pub fn params(&self) -> &ViewParameters {
        &self.params
    }

    /// Loaded sources, unfiltered
    #[must_use]
    pub fn entities(&self) -> &[Source] {
        &self.entities
    }

    /// Loaded catalogs
    #[must_use]
    pub fn catalogs(&self) -> &Catalogs {
        &self.catalogs
    }

    /// Total count reported by the backend
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    /// First outstanding fetch failure among sources and both catalogs
    #[must_use]
    pub fn error(&self) -> Option<&ConsoleError> {
        self.entities_error
            .as_ref()
            .or(self.source_types_error.as_ref())
            .or(self.app_types_error.as_ref())
    }

    /// Apply a user action to the view parameters
    pub fn update(&mut self, update: ViewUpdate) -> &ViewParameters {
        self.params = self.params.apply(update);
        &self.params
    }

    /// Replace the view parameters wholesale
    pub fn set_params(&mut self, params: ViewParameters) {
        self.params = params;
    }

    /// Issue a ticket for a sources fetch with the current parameters; marks
    /// the list as loading
    pub fn begin_fetch(&mut self) -> RequestTicket {
        self.seq += 1;
        let intent = self.params.intent_key();
        self.latest_intent = Some(intent.clone());
        self.loaded = false;
        tracing::debug!(seq = self.seq, intent = %intent, "sources fetch issued");
        RequestTicket {
            seq: self.seq,
            intent,
        }
    }

    fn is_current(&self, ticket: &RequestTicket) -> bool {
        self.latest_intent.as_deref() == Some(ticket.intent.as_str()) && ticket.seq >= self.applied_seq
    }

    /// Deliver a sources response; superseded tickets are discarded
    pub fn receive_entities(
        &mut self,
        ticket: &RequestTicket,
        response: Result<(Vec<Source>, usize), ConsoleError>,
    ) -> Delivery {
        if !self.is_current(ticket) {
            tracing::debug!(seq = ticket.seq, "discarding superseded sources response");
            return Delivery::Stale;
        }

        self.applied_seq = ticket.seq;
        self.loaded = true;
        match response {
            Ok((entities, count)) => {
                self.entities = entities;
                self.count = count;
                self.entities_error = None;
            }
            Err(err) => {
                tracing::warn!(error = %err, "sources fetch failed");
                self.entities_error = Some(err);
            }
        }
        Delivery::Applied
    }

    /// Deliver the source type catalog
    pub fn receive_source_types(&mut self, response: Result<Vec<SourceType>, ConsoleError>) {
        self.source_types_loaded = true;
        match response {
            Ok(types) => {
                self.catalogs.source_types = types;
                self.source_types_error = None;
            }
            Err(err) => {
                tracing::warn!(error = %err, "source types fetch failed");
                self.source_types_error = Some(err);
            }
        }
    }

    /// Deliver the application type catalog
    pub fn receive_app_types(&mut self, response: Result<Vec<AppType>, ConsoleError>) {
        self.app_types_loaded = true;
        match response {
            Ok(types) => {
                self.catalogs.app_types = types;
                self.app_types_error = None;
            }
            Err(err) => {
                tracing::warn!(error = %err, "application types fetch failed");
                self.app_types_error = Some(err);
            }
        }
    }

    /// Sources and both catalogs have arrived
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded && self.source_types_loaded && self.app_types_loaded
    }

    /// Number of loaded sources passing the current filters
    #[must_use]
    pub fn total_filtered(&self) -> usize {
        filter_entities(&self.entities, &self.params.filter, &self.catalogs).len()
    }

    /// Flag a source as being removed; returns whether it was found
    pub fn mark_deleting(&mut self, id: &str) -> bool {
        match self.entities.iter_mut().find(|s| s.id == id) {
            Some(source) => {
                source.is_deleting = true;
                true
            }
            None => false,
        }
    }

    /// What the list page should render now
    #[must_use]
    pub fn display(&self) -> ListDisplay {
        if let Some(err) = self.error() {
            if err.is_fetch_failure() {
                return ListDisplay::Error(err.clone());
            }
        }
        if !self.is_loaded() {
            return ListDisplay::Placeholder;
        }
        if self.entities.is_empty() && self.params.filter.is_empty() {
            return ListDisplay::NoSources;
        }

        let projection = project(&self.entities, &self.params, &self.catalogs);
        if projection.total_filtered == 0 {
            ListDisplay::NoResults
        } else {
            ListDisplay::Table(projection)
        }
    }
}

// =============================================================================
// Debouncing
// =============================================================================

/// Holds back rapidly changing input until it settles for `window`
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    /// Debouncer releasing values after `window` of quiet
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    /// Record a new value, restarting the quiet period
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.window));
    }

    /// Release the pending value once its quiet period has passed
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, due)) if *due <= now => self.pending.take().map(|(value, _)| value),
            _ => None,
        }
    }

    /// Release the pending value immediately
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    /// Whether a value is waiting
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending value will be released
    #[must_use]
    pub fn due(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, due)| *due)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::FilterValue;

    fn make_source(id: &str, name: &str) -> Source {
        Source {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    fn make_loaded_state(entities: Vec<Source>) -> ListState {
        let mut state = ListState::default();
        let ticket = state.begin_fetch();
        let count = entities.len();
        state.receive_entities(&ticket, Ok((entities, count)));
        state.receive_source_types(Ok(vec![]));
        state.receive_app_types(Ok(vec![]));
        state
    }

    #[test]
    fn test_placeholder_until_all_three_loaded() {
        let mut state = ListState::default();
        let ticket = state.begin_fetch();
        state.receive_entities(&ticket, Ok((vec![make_source("1", "a")], 1)));
        assert_eq!(state.display(), ListDisplay::Placeholder);

        state.receive_source_types(Ok(vec![]));
        assert!(!state.is_loaded());

        state.receive_app_types(Ok(vec![]));
        assert!(state.is_loaded());
        assert!(matches!(state.display(), ListDisplay::Table(_)));
    }

    #[test]
    fn test_empty_and_no_results_states() {
        let state = make_loaded_state(vec![]);
        assert_eq!(state.display(), ListDisplay::NoSources);

        let mut state = make_loaded_state(vec![make_source("1", "Pepa")]);
        state.update(ViewUpdate::FilterName(Some("zzz".into())));
        assert_eq!(state.display(), ListDisplay::NoResults);
        assert_eq!(state.total_filtered(), 0);
    }

    #[test]
    fn test_fetch_failure_shows_error() {
        let mut state = ListState::default();
        let ticket = state.begin_fetch();
        state.receive_entities(&ticket, Err(ConsoleError::fetch("sources", "boom")));

        match state.display() {
            ListDisplay::Error(err) => assert!(err.to_string().contains("boom")),
            other => panic!("unexpected display {other:?}"),
        }
    }

    #[test]
    fn test_catalog_failure_survives_successful_entities() {
        let mut state = ListState::default();
        state.receive_source_types(Err(ConsoleError::fetch("source types", "503")));
        state.receive_app_types(Ok(vec![]));
        let ticket = state.begin_fetch();
        state.receive_entities(&ticket, Ok((vec![make_source("1", "a")], 1)));

        assert!(matches!(
            state.display(),
            ListDisplay::Error(ConsoleError::FetchFailure { resource: "source types", .. })
        ));

        state.receive_source_types(Ok(vec![]));
        assert!(matches!(state.display(), ListDisplay::Table(_)));
    }

    #[test]
    fn test_superseded_response_is_discarded() {
        let mut state = ListState::default();
        state.receive_source_types(Ok(vec![]));
        state.receive_app_types(Ok(vec![]));

        let first = state.begin_fetch();
        state.update(ViewUpdate::Filter(FilterValue {
            name: Some("new".into()),
            ..FilterValue::default()
        }));
        let second = state.begin_fetch();

        // second answer lands before the first
        assert_eq!(
            state.receive_entities(&second, Ok((vec![make_source("2", "new")], 1))),
            Delivery::Applied
        );
        assert_eq!(
            state.receive_entities(&first, Ok((vec![make_source("1", "old")], 1))),
            Delivery::Stale
        );

        assert_eq!(state.entities()[0].id, "2");
    }

    #[test]
    fn test_same_intent_older_seq_is_stale() {
        let mut state = ListState::default();
        let first = state.begin_fetch();
        let second = state.begin_fetch();
        assert_eq!(first.intent, second.intent);

        assert_eq!(state.receive_entities(&second, Ok((vec![], 0))), Delivery::Applied);
        assert_eq!(state.receive_entities(&first, Ok((vec![], 0))), Delivery::Stale);
    }

    #[test]
    fn test_mark_deleting_disables_row_actions() {
        let mut state = make_loaded_state(vec![make_source("7", "a")]);
        assert!(state.mark_deleting("7"));
        assert!(!state.mark_deleting("8"));

        let ListDisplay::Table(projection) = state.display() else {
            panic!("expected a table");
        };
        assert!(projection.rows[0].disable_actions);
    }

    #[test]
    fn test_debouncer_releases_after_quiet_period() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(450));

        debouncer.push("p", start);
        debouncer.push("pe", start + Duration::from_millis(100));
        debouncer.push("pep", start + Duration::from_millis(200));

        assert_eq!(debouncer.poll(start + Duration::from_millis(500)), None);
        assert_eq!(debouncer.poll(start + Duration::from_millis(650)), Some("pep"));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_debouncer_flush() {
        let mut debouncer = Debouncer::new(Duration::from_secs(10));
        debouncer.push(1, Instant::now());
        assert_eq!(debouncer.flush(), Some(1));
        assert_eq!(debouncer.flush(), None);
    }

    #[test]
    fn test_debouncer_due_moves_with_each_push() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(450));
        assert_eq!(debouncer.due(), None);

        debouncer.push("a", start);
        assert_eq!(debouncer.due(), Some(start + Duration::from_millis(450)));

        debouncer.push("aw", start + Duration::from_millis(100));
        assert_eq!(debouncer.due(), Some(start + Duration::from_millis(550)));
    }
}
