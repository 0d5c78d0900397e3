// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Source list view pipeline
//!
//! [`project`] turns the loaded sources into the rows currently on screen:
//!
//! 1. **filter** by every active predicate of [`FilterValue`]
//! 2. **sort** stably by the selected column
//! 3. **paginate** to the selected page (never clamped here)
//! 4. **project** each source through the column table into cells
//!
//! The pipeline is pure: the same sources, parameters and catalogs always
//! give the same [`Projection`].

use crate::actions::{row_actions, RowAction};
use crate::formatters::{
    application_statuses, applications_text, name_cell, relative_date, source_type_name, NameCell,
};
use crate::status::{aggregate_status, tooltip_text, AppStatus, AvailabilityErrors, StatusColor};
use crate::types::{Catalogs, Source, Status};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Vendor name of first-party source types
pub const RED_HAT_VENDOR: &str = "Red Hat";

/// Page size used when nothing else is configured
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Column sorted by default
pub const DEFAULT_SORT_BY: &str = "created_at";

// =============================================================================
// View parameters
// =============================================================================

/// Sort order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Smallest first
    Asc,
    /// Largest first
    #[default]
    Desc,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        })
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Asc),
            "desc" | "descending" => Ok(Self::Desc),
            other => Err(format!("unknown sort direction '{other}' (expected asc or desc)")),
        }
    }
}

/// Vendor tab of the list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vendor {
    /// Third-party cloud providers
    Cloud,
    /// Red Hat products
    RedHat,
}

impl FromStr for Vendor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "cloud" => Ok(Self::Cloud),
            "red_hat" | "redhat" => Ok(Self::RedHat),
            other => Err(format!("unknown vendor '{other}' (expected cloud or red_hat)")),
        }
    }
}

/// Structured filter; every field left empty puts no constraint on the list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterValue {
    /// Case-insensitive name substring
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Accepted source type ids
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub source_type_id: Vec<String>,
    /// Accepted application type ids; a source matches when any of its
    /// applications does
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub applications: Vec<String>,
    /// Accepted aggregated statuses
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub availability_status: Vec<Status>,
    /// Vendor tab
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<Vendor>,
}

impl FilterValue {
    /// Whether no predicate is active
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.predicates().is_empty()
    }

    /// Active predicates, one per filter kind
    #[must_use]
    pub fn predicates(&self) -> Vec<Predicate<'_>> {
        let mut predicates = Vec::new();
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            predicates.push(Predicate::Name(name.to_lowercase()));
        }
        if !self.source_type_id.is_empty() {
            predicates.push(Predicate::SourceType(&self.source_type_id));
        }
        if !self.applications.is_empty() {
            predicates.push(Predicate::Application(&self.applications));
        }
        if !self.availability_status.is_empty() {
            predicates.push(Predicate::Status(&self.availability_status));
        }
        if let Some(vendor) = self.vendor {
            predicates.push(Predicate::Vendor(vendor));
        }
        predicates
    }
}

/// One filter kind with its accepted values
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate<'a> {
    /// Lower-cased name substring
    Name(String),
    /// Source type id set
    SourceType(&'a [String]),
    /// Application type id set
    Application(&'a [String]),
    /// Aggregated status set
    Status(&'a [Status]),
    /// Vendor tab
    Vendor(Vendor),
}

impl Predicate<'_> {
    /// Whether a source passes this predicate
    #[must_use]
    pub fn matches(&self, source: &Source, catalogs: &Catalogs) -> bool {
        match self {
            Self::Name(needle) => source.name.to_lowercase().contains(needle.as_str()),
            Self::SourceType(ids) => ids.contains(&source.source_type_id),
            Self::Application(ids) => source
                .applications
                .iter()
                .any(|app| ids.contains(&app.application_type_id)),
            Self::Status(statuses) => statuses.contains(&aggregate_status(source).status),
            Self::Vendor(vendor) => catalogs
                .source_type(&source.source_type_id)
                .is_some_and(|t| match vendor {
                    Vendor::RedHat => t.vendor == RED_HAT_VENDOR,
                    Vendor::Cloud => t.vendor != RED_HAT_VENDOR,
                }),
        }
    }
}

/// Sort, filter and page state driving the list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewParameters {
    /// Column key to sort by
    pub sort_by: Option<String>,
    /// Sort order
    pub sort_direction: SortDirection,
    /// Active filters
    pub filter: FilterValue,
    /// 1-based page number
    pub page_number: usize,
    /// Rows per page
    pub page_size: usize,
}

impl Default for ViewParameters {
    fn default() -> Self {
        Self {
            sort_by: Some(DEFAULT_SORT_BY.to_string()),
            sort_direction: SortDirection::Desc,
            filter: FilterValue::default(),
            page_number: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// A user action changing the view parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewUpdate {
    /// Replace every filter
    Filter(FilterValue),
    /// Change the name filter only
    FilterName(Option<String>),
    /// Drop every filter
    ClearFilters,
    /// Sort by a column
    Sort {
        /// Column key
        by: String,
        /// Sort order
        direction: SortDirection,
    },
    /// Go to a page
    Page(usize),
    /// Change the page size
    PageSize(usize),
}

impl ViewParameters {
    /// Index of the first row of the current page
    #[must_use]
    pub fn page_offset(&self) -> usize {
        self.page_number.saturating_sub(1).saturating_mul(self.page_size)
    }

    /// Number of pages needed for `total` rows
    #[must_use]
    pub fn page_count(&self, total: usize) -> usize {
        if self.page_size == 0 {
            0
        } else {
            total.div_ceil(self.page_size)
        }
    }

    /// Whether the current page is page 0 or lies past the last page of
    /// `total` rows
    #[must_use]
    pub fn is_page_out_of_range(&self, total: usize) -> bool {
        self.page_number == 0 || self.page_number > self.page_count(total).max(1)
    }

    /// Same parameters moved onto an existing page: page 0 goes to the
    /// first page, anything past the end to the last
    #[must_use]
    pub fn clamp_page(&self, total: usize) -> Self {
        let mut clamped = self.clone();
        if self.page_number == 0 {
            clamped.page_number = 1;
        } else if self.is_page_out_of_range(total) {
            clamped.page_number = self.page_count(total).max(1);
        }
        clamped
    }

    /// Parameters after a user action; filter and page-size changes return to
    /// the first page
    #[must_use]
    pub fn apply(&self, update: ViewUpdate) -> Self {
        let mut next = self.clone();
        match update {
            ViewUpdate::Filter(filter) => {
                next.filter = filter;
                next.page_number = 1;
            }
            ViewUpdate::FilterName(name) => {
                next.filter.name = name.filter(|n| !n.is_empty());
                next.page_number = 1;
            }
            ViewUpdate::ClearFilters => {
                next.filter = FilterValue::default();
                next.page_number = 1;
            }
            ViewUpdate::Sort { by, direction } => {
                next.sort_by = Some(by);
                next.sort_direction = direction;
            }
            ViewUpdate::Page(page) => next.page_number = page.max(1),
            ViewUpdate::PageSize(size) => {
                next.page_size = size;
                next.page_number = 1;
            }
        }
        next
    }

    /// Stable key identifying what a fetch issued for these parameters asks for
    #[must_use]
    pub fn intent_key(&self) -> String {
        let encoded = serde_json::to_vec(self).unwrap_or_default();
        let hash = hex::encode(Sha256::digest(&encoded));
        hash[..16].to_string()
    }
}

// =============================================================================
// Columns
// =============================================================================

/// Renderable value of one cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Cell {
    /// Source name with link
    Name(NameCell),
    /// Plain text
    Text {
        /// Cell text
        text: String,
    },
    /// Attached applications with their effective status
    Applications {
        /// Applications sorted by display name
        apps: Vec<AppStatus>,
    },
    /// Timestamp rendered relative to now by the caller
    Date {
        /// Timestamp
        at: Option<DateTime<Utc>>,
    },
    /// Aggregated availability
    Status {
        /// Derived status
        status: Status,
        /// Label colour
        color: StatusColor,
        /// Label text
        label: &'static str,
        /// Popover text
        tooltip: String,
        /// Failures behind the status
        errors: AvailabilityErrors,
    },
}

impl Cell {
    /// Plain text rendering, dates relative to `now`
    #[must_use]
    pub fn text(&self, now: DateTime<Utc>) -> String {
        match self {
            Self::Name(cell) => match &cell.url {
                Some(url) => format!("{} ({url})", cell.name),
                None => cell.name.clone(),
            },
            Self::Text { text } => text.clone(),
            Self::Applications { apps } => applications_text(apps),
            Self::Date { at } => at.map_or_else(String::new, |at| relative_date(at, now)),
            Self::Status { label, .. } => (*label).to_string(),
        }
    }
}

/// Compares two sources for one column
pub type CompareFn = fn(&Source, &Source, &Catalogs) -> Ordering;

/// Renders one column of a source
pub type RenderFn = fn(&Source, &Catalogs) -> Cell;

/// One column of the source table
#[derive(Clone, Copy)]
pub struct Column {
    /// Key used by `sort_by`
    pub key: &'static str,
    /// Header title
    pub title: &'static str,
    /// Sort rule; `None` for columns that cannot be sorted
    pub compare: Option<CompareFn>,
    /// Cell renderer
    pub render: RenderFn,
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("title", &self.title)
            .field("sortable", &self.compare.is_some())
            .finish_non_exhaustive()
    }
}

/// Header metadata handed to the renderer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnMeta {
    /// Column key
    pub key: &'static str,
    /// Header title
    pub title: &'static str,
    /// Whether the header can be clicked to sort
    pub sortable: bool,
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

fn compare_name(a: &Source, b: &Source, _: &Catalogs) -> Ordering {
    compare_text(&a.name, &b.name)
}

fn compare_type(a: &Source, b: &Source, catalogs: &Catalogs) -> Ordering {
    compare_text(&source_type_name(a, catalogs), &source_type_name(b, catalogs))
}

fn compare_created(a: &Source, b: &Source, _: &Catalogs) -> Ordering {
    a.created_at.cmp(&b.created_at)
}

fn compare_status(a: &Source, b: &Source, _: &Catalogs) -> Ordering {
    aggregate_status(a)
        .status
        .rank()
        .cmp(&aggregate_status(b).status.rank())
}

fn render_name(source: &Source, catalogs: &Catalogs) -> Cell {
    Cell::Name(name_cell(source, catalogs))
}

fn render_type(source: &Source, catalogs: &Catalogs) -> Cell {
    Cell::Text {
        text: source_type_name(source, catalogs),
    }
}

fn render_applications(source: &Source, catalogs: &Catalogs) -> Cell {
    Cell::Applications {
        apps: application_statuses(source, &catalogs.app_types),
    }
}

fn render_created(source: &Source, _: &Catalogs) -> Cell {
    Cell::Date {
        at: source.created_at,
    }
}

fn render_status(source: &Source, catalogs: &Catalogs) -> Cell {
    let report = aggregate_status(source);
    Cell::Status {
        status: report.status,
        color: report.status.color(),
        label: report.status.label(),
        tooltip: tooltip_text(&report, &catalogs.app_types),
        errors: report.errors,
    }
}

/// The source table, in display order
pub static COLUMNS: [Column; 5] = [
    Column {
        key: "name",
        title: "Name",
        compare: Some(compare_name),
        render: render_name,
    },
    Column {
        key: "source_type_id",
        title: "Type",
        compare: Some(compare_type),
        render: render_type,
    },
    Column {
        key: "applications",
        title: "Connected applications",
        compare: None,
        render: render_applications,
    },
    Column {
        key: "created_at",
        title: "Date added",
        compare: Some(compare_created),
        render: render_created,
    },
    Column {
        key: "availability_status",
        title: "Status",
        compare: Some(compare_status),
        render: render_status,
    },
];

/// Look up a column by key
#[must_use]
pub fn column(key: &str) -> Option<&'static Column> {
    COLUMNS.iter().find(|c| c.key == key)
}

/// Header metadata of every column
#[must_use]
pub fn column_meta() -> Vec<ColumnMeta> {
    COLUMNS
        .iter()
        .map(|c| ColumnMeta {
            key: c.key,
            title: c.title,
            sortable: c.compare.is_some(),
        })
        .collect()
}

// =============================================================================
// Pipeline
// =============================================================================

/// One rendered source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    /// Source id
    pub id: String,
    /// Cells in column order
    pub cells: Vec<Cell>,
    /// Kebab menu actions
    pub actions: Vec<RowAction>,
    /// Actions are disabled while the source is being removed
    pub disable_actions: bool,
}

/// Everything the renderer needs for the current page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Projection {
    /// Column headers
    pub columns: Vec<ColumnMeta>,
    /// Rows of the current page
    pub rows: Vec<Row>,
    /// Sources passing the filters, before pagination
    pub total_filtered: usize,
}

/// Sources passing every active predicate, in input order
#[must_use]
pub fn filter_entities<'a>(
    entities: &'a [Source],
    filter: &FilterValue,
    catalogs: &Catalogs,
) -> Vec<&'a Source> {
    let predicates = filter.predicates();
    entities
        .iter()
        .filter(|source| predicates.iter().all(|p| p.matches(source, catalogs)))
        .collect()
}

/// Stable sort by the selected column; unknown or unsortable keys keep the
/// input order
pub fn sort_entities(entities: &mut [&Source], params: &ViewParameters, catalogs: &Catalogs) {
    let Some(compare) = params
        .sort_by
        .as_deref()
        .and_then(column)
        .and_then(|c| c.compare)
    else {
        return;
    };

    entities.sort_by(|a, b| {
        let ordering = compare(a, b, catalogs);
        match params.sort_direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

/// Slice of the current page; empty for page 0 and past the last page
#[must_use]
pub fn paginate<'s, 'a>(entities: &'s [&'a Source], params: &ViewParameters) -> &'s [&'a Source] {
    if params.page_number == 0 {
        return &[];
    }
    let start = params.page_offset().min(entities.len());
    let end = start.saturating_add(params.page_size).min(entities.len());
    &entities[start..end]
}

/// Render one source through the column table
#[must_use]
pub fn project_row(source: &Source, catalogs: &Catalogs) -> Row {
    Row {
        id: source.id.clone(),
        cells: COLUMNS.iter().map(|c| (c.render)(source, catalogs)).collect(),
        actions: row_actions(source),
        disable_actions: source.is_deleting,
    }
}

/// Filter, sort, paginate and render the sources for the given parameters
#[must_use]
pub fn project(entities: &[Source], params: &ViewParameters, catalogs: &Catalogs) -> Projection {
    let mut retained = filter_entities(entities, &params.filter, catalogs);
    let total_filtered = retained.len();

    sort_entities(&mut retained, params, catalogs);

    let rows = paginate(&retained, params)
        .iter()
        .map(|source| project_row(source, catalogs))
        .collect();

    tracing::debug!(
        entities = entities.len(),
        total_filtered,
        page = params.page_number,
        "projected source list"
    );

    Projection {
        columns: column_meta(),
        rows,
        total_filtered,
    }
}
