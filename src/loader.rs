// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Data loading
//!
//! [`SourcesApi`] is the seam to whatever serves sources and catalogs. The
//! crate ships [`SnapshotApi`], which reads exported JSON files from a data
//! directory:
//!
//! | File                      | Content                 |
//! |---------------------------|-------------------------|
//! | `sources.json`            | array of sources        |
//! | `source_types.json`       | source type catalog     |
//! | `application_types.json`  | application type catalog|
//!
//! A missing file is an empty list; a file that does not parse is a
//! [`ConsoleError::FetchFailure`].

use crate::actions::Route;
use crate::error::ConsoleError;
use crate::store::{Debouncer, Delivery, ListState};
use crate::types::{AppType, Source, SourceType};
use crate::view::{FilterValue, ViewParameters, ViewUpdate};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

/// Sources snapshot file name
pub const SOURCES_FILE: &str = "sources.json";
/// Source type catalog file name
pub const SOURCE_TYPES_FILE: &str = "source_types.json";
/// Application type catalog file name
pub const APP_TYPES_FILE: &str = "application_types.json";

// =============================================================================
// API seam
// =============================================================================

/// Backend serving sources and catalogs
#[async_trait]
pub trait SourcesApi: Send + Sync {
    /// Sources for the given view parameters
    async fn load_entities(&self, params: &ViewParameters) -> Result<Vec<Source>, ConsoleError>;

    /// Total number of sources for the given view parameters
    async fn load_entity_count(&self, params: &ViewParameters) -> Result<usize, ConsoleError>;

    /// Source type catalog
    async fn load_source_types(&self) -> Result<Vec<SourceType>, ConsoleError>;

    /// Application type catalog
    async fn load_app_types(&self) -> Result<Vec<AppType>, ConsoleError>;

    /// One source by id; [`ConsoleError::NotFound`] when it does not exist
    async fn load_single_entity(&self, id: &str) -> Result<Source, ConsoleError>;
}

/// Reads exported JSON snapshots from a directory
#[derive(Debug, Clone)]
pub struct SnapshotApi {
    dir: PathBuf,
}

impl SnapshotApi {
    /// Snapshot reader rooted at `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Data directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn read_list<T: DeserializeOwned>(
        &self,
        file: &str,
        resource: &'static str,
    ) -> Result<Vec<T>, ConsoleError> {
        let path = self.dir.join(file);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "snapshot missing, treating as empty");
                return Ok(Vec::new());
            }
            Err(err) => return Err(ConsoleError::fetch(resource, format!("{}: {err}", path.display()))),
        };

        let records: Vec<serde_json::Value> = serde_json::from_str(&raw)
            .map_err(|err| ConsoleError::fetch(resource, format!("{}: {err}", path.display())))?;

        let total = records.len();
        let decoded: Vec<T> = records
            .into_iter()
            .filter_map(|record| serde_json::from_value(record).ok())
            .collect();
        if decoded.len() < total {
            tracing::warn!(
                path = %path.display(),
                resource,
                skipped = total - decoded.len(),
                "dropped records that are not objects"
            );
        }
        Ok(decoded)
    }
}

#[async_trait]
impl SourcesApi for SnapshotApi {
    // The snapshot has no server-side filtering; the pipeline filters locally.
    async fn load_entities(&self, _params: &ViewParameters) -> Result<Vec<Source>, ConsoleError> {
        self.read_list(SOURCES_FILE, "sources").await
    }

    async fn load_entity_count(&self, params: &ViewParameters) -> Result<usize, ConsoleError> {
        Ok(self.load_entities(params).await?.len())
    }

    async fn load_source_types(&self) -> Result<Vec<SourceType>, ConsoleError> {
        self.read_list(SOURCE_TYPES_FILE, "source types").await
    }

    async fn load_app_types(&self) -> Result<Vec<AppType>, ConsoleError> {
        self.read_list(APP_TYPES_FILE, "application types").await
    }

    async fn load_single_entity(&self, id: &str) -> Result<Source, ConsoleError> {
        let sources: Vec<Source> = self.read_list(SOURCES_FILE, "sources").await?;
        sources
            .into_iter()
            .find(|s| s.id == id)
            .ok_or_else(|| ConsoleError::NotFound { id: id.to_string() })
    }
}

// =============================================================================
// List loading
// =============================================================================

/// Sources and their count, fetched concurrently
pub async fn fetch_entities<A: SourcesApi + ?Sized>(
    api: &A,
    params: &ViewParameters,
) -> Result<(Vec<Source>, usize), ConsoleError> {
    let (entities, count) = tokio::join!(api.load_entities(params), api.load_entity_count(params));
    Ok((entities?, count?))
}

/// Initial load: sources, count and both catalogs at once
pub async fn mount<A: SourcesApi + ?Sized>(api: &A, state: &mut ListState) -> Delivery {
    let ticket = state.begin_fetch();
    let params = state.params().clone();

    let (entities, source_types, app_types) = tokio::join!(
        fetch_entities(api, &params),
        api.load_source_types(),
        api.load_app_types()
    );

    state.receive_source_types(source_types);
    state.receive_app_types(app_types);
    state.receive_entities(&ticket, entities)
}

/// Refetch sources after the view parameters changed
pub async fn refresh<A: SourcesApi + ?Sized>(api: &A, state: &mut ListState) -> Delivery {
    let ticket = state.begin_fetch();
    let params = state.params().clone();
    let response = fetch_entities(api, &params).await;
    state.receive_entities(&ticket, response)
}

/// Load the list for `params`, moving back to the last page when the
/// requested one no longer exists
pub async fn open_list<A: SourcesApi + ?Sized>(api: &A, params: ViewParameters) -> ListState {
    let mut state = ListState::new(params);
    mount(api, &mut state).await;

    let total = state.total_filtered();
    if state.is_loaded() && state.params().is_page_out_of_range(total) {
        let clamped = state.params().clamp_page(total);
        tracing::info!(
            requested = state.params().page_number,
            page = clamped.page_number,
            "requested page past the end, clamping"
        );
        state.set_params(clamped);
        refresh(api, &mut state).await;
    }

    state
}

/// Wait for name filter edits to settle, then apply the last one and refetch.
///
/// Each edit restarts the debounce window. When `edits` closes, a pending
/// value is applied at once. Returns `None` once `edits` is closed and
/// nothing is pending.
pub async fn next_name_filter<A: SourcesApi + ?Sized>(
    api: &A,
    state: &mut ListState,
    debouncer: &mut Debouncer<String>,
    edits: &mut mpsc::Receiver<String>,
) -> Option<Delivery> {
    loop {
        let due = debouncer.due().map(tokio::time::Instant::from_std);
        tokio::select! {
            edit = edits.recv() => match edit {
                Some(name) => debouncer.push(name, tokio::time::Instant::now().into_std()),
                None => {
                    let name = debouncer.flush()?;
                    return Some(apply_name_filter(api, state, name).await);
                }
            },
            () = sleep_until_due(due), if due.is_some() => {
                if let Some(name) = debouncer.poll(tokio::time::Instant::now().into_std()) {
                    return Some(apply_name_filter(api, state, name).await);
                }
            }
        }
    }
}

async fn sleep_until_due(due: Option<tokio::time::Instant>) {
    if let Some(due) = due {
        tokio::time::sleep_until(due).await;
    }
}

async fn apply_name_filter<A: SourcesApi + ?Sized>(
    api: &A,
    state: &mut ListState,
    name: String,
) -> Delivery {
    let name = name.trim().to_string();
    tracing::debug!(name = %name, "name filter settled");
    let filter = FilterValue {
        name: Some(name).filter(|n| !n.is_empty()),
        ..state.params().filter.clone()
    };
    state.update(ViewUpdate::Filter(filter));
    refresh(api, state).await
}

// =============================================================================
// Detail loading
// =============================================================================

/// Notification severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationVariant {
    /// Failure the user should know about
    Danger,
}

/// Toast shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Severity
    pub variant: NotificationVariant,
    /// Headline
    pub title: String,
    /// Body text
    pub description: String,
}

impl Notification {
    /// Notice for a detail page whose source does not exist
    #[must_use]
    pub fn source_not_found(id: &str) -> Self {
        Self {
            variant: NotificationVariant::Danger,
            title: "Requested source was not found".to_string(),
            description: format!("Source with {id} was not found. Try it again later."),
        }
    }
}

/// Result of opening a source detail page
#[derive(Debug, Clone, PartialEq)]
pub enum DetailOutcome {
    /// The source exists
    Found(Box<Source>),
    /// The source is gone; go elsewhere and tell the user
    Redirect {
        /// Target path
        to: String,
        /// Notice to show
        notification: Notification,
    },
}

/// Load a single source, turning a missing id into a redirect to the list
pub async fn open_detail<A: SourcesApi + ?Sized>(api: &A, id: &str) -> Result<DetailOutcome, ConsoleError> {
    match api.load_single_entity(id).await {
        Ok(source) => Ok(DetailOutcome::Found(Box::new(source))),
        Err(ConsoleError::NotFound { id }) => {
            tracing::warn!(id = %id, "source not found, redirecting to list");
            Ok(DetailOutcome::Redirect {
                to: Route::Sources.path().to_string(),
                notification: Notification::source_not_found(&id),
            })
        }
        Err(err) => Err(err),
    }
}
