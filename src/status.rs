// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Availability status aggregation
//!
//! A source is healthy only as far as its parts are: the source record, its
//! applications, its endpoint and the endpoint credentials each report their
//! own availability. [`aggregate_status`] walks those records in a fixed
//! order and folds them into one [`Status`] plus the per-category errors.

use crate::types::{
    AppType, Application, Authentication, AvailabilityStatus, Endpoint, Source, Status,
};
use serde::{Serialize, Serializer};
use std::fmt;

/// Text shown for a failing record that did not say why
pub const UNKNOWN_ERROR: &str = "unavailable";

// =============================================================================
// Error map
// =============================================================================

/// Failure reason of one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeafError {
    /// Reason reported by the backend
    Reported(String),
    /// The record failed without a reason
    Unknown,
}

impl LeafError {
    fn from_text(text: Option<&str>) -> Self {
        match text {
            Some(t) if !t.is_empty() => Self::Reported(t.to_string()),
            _ => Self::Unknown,
        }
    }

    /// Display text of the failure
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Reported(text) => text,
            Self::Unknown => UNKNOWN_ERROR,
        }
    }
}

impl fmt::Display for LeafError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for LeafError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Failing application, keyed by its application type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationError {
    /// Application type id
    pub id: String,
    /// Failure reason
    pub error: LeafError,
}

/// Failing endpoint credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticationError {
    /// Credential kind
    #[serde(rename = "type")]
    pub authtype: Option<String>,
    /// Failure reason
    pub error: LeafError,
}

/// Errors collected per record category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AvailabilityErrors {
    /// The source record itself
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<LeafError>,
    /// Failing applications, in source order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub applications: Vec<ApplicationError>,
    /// The source endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<LeafError>,
    /// Failing endpoint credentials, in endpoint order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub authentications: Vec<AuthenticationError>,
}

impl AvailabilityErrors {
    /// No category recorded a failure
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories() == 0
    }

    /// Number of categories with at least one failure
    #[must_use]
    pub fn categories(&self) -> usize {
        usize::from(self.source.is_some())
            + usize::from(!self.applications.is_empty())
            + usize::from(self.endpoint.is_some())
            + usize::from(!self.authentications.is_empty())
    }
}

/// Overall status of a source with the errors behind it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    /// Derived status
    pub status: Status,
    /// Failures per category
    pub errors: AvailabilityErrors,
}

// =============================================================================
// Status sources
// =============================================================================

/// Record category an availability signal belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// The source record
    Source,
    /// An application
    Applications,
    /// The endpoint
    Endpoint,
    /// An endpoint credential
    Authentications,
}

/// One record that reports availability
#[derive(Debug, Clone, Copy)]
pub enum StatusSource<'a> {
    /// The source itself
    Source(&'a Source),
    /// An application; reads the endpoint when it shares the endpoint credential
    Application {
        /// The application
        app: &'a Application,
        /// Endpoint of the owning source
        endpoint: Option<&'a Endpoint>,
    },
    /// The source endpoint
    Endpoint(&'a Endpoint),
    /// A credential of the endpoint
    Authentication(&'a Authentication),
}

/// Uniform view of what a [`StatusSource`] reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signal<'a> {
    /// Category of the record
    pub category: Category,
    /// Reported availability
    pub status: Option<AvailabilityStatus>,
    /// Reported failure reason
    pub error: Option<&'a str>,
    /// Application type id or credential kind, for list categories
    pub key: Option<&'a str>,
}

impl<'a> StatusSource<'a> {
    /// Read the signal of this record
    #[must_use]
    pub fn signal(&self) -> Signal<'a> {
        match *self {
            Self::Source(source) => Signal {
                category: Category::Source,
                status: source.availability_status,
                error: source.availability_status_error.as_deref(),
                key: None,
            },
            Self::Application { app, endpoint } => {
                let (status, error) = if app.uses_endpoint_status() {
                    (
                        endpoint.and_then(|e| e.availability_status),
                        endpoint.and_then(|e| e.availability_status_error.as_deref()),
                    )
                } else {
                    (app.availability_status, app.availability_status_error.as_deref())
                };
                Signal {
                    category: Category::Applications,
                    status,
                    error,
                    key: Some(app.application_type_id.as_str()),
                }
            }
            Self::Endpoint(endpoint) => Signal {
                category: Category::Endpoint,
                status: endpoint.availability_status,
                error: endpoint.availability_status_error.as_deref(),
                key: None,
            },
            Self::Authentication(auth) => Signal {
                category: Category::Authentications,
                status: auth.availability_status,
                error: auth.availability_status_error.as_deref(),
                key: auth.authtype.as_deref(),
            },
        }
    }
}

/// Every reporting record of a source: the source, each application, the
/// endpoint, each endpoint credential
pub fn status_sources(source: &Source) -> impl Iterator<Item = StatusSource<'_>> {
    let endpoint = source.endpoint();
    std::iter::once(StatusSource::Source(source))
        .chain(
            source
                .applications
                .iter()
                .map(move |app| StatusSource::Application { app, endpoint }),
        )
        .chain(endpoint.map(StatusSource::Endpoint))
        .chain(
            endpoint
                .into_iter()
                .flat_map(|e| e.authentications.iter().map(StatusSource::Authentication)),
        )
}

/// Derive the overall status of a source
///
/// A source being validated reports `in_progress` with no errors, whatever its
/// parts say. Otherwise every record reporting `available` or `unavailable`
/// counts; no reports gives `unknown`, no failures `available`, only failures
/// `unavailable`, and anything in between `partially_available`.
///
/// Applications sharing the endpoint credential report the endpoint status, so
/// an endpoint failure also shows up under `applications`.
#[must_use]
pub fn aggregate_status(source: &Source) -> StatusReport {
    if source.availability_status == Some(AvailabilityStatus::InProgress) {
        return StatusReport {
            status: Status::InProgress,
            errors: AvailabilityErrors::default(),
        };
    }

    let mut errors = AvailabilityErrors::default();
    let mut statuses_count = 0usize;
    let mut errors_count = 0usize;

    for signal in status_sources(source).map(|s| s.signal()) {
        match signal.status {
            Some(AvailabilityStatus::Available) => statuses_count += 1,
            Some(AvailabilityStatus::Unavailable) => {
                statuses_count += 1;
                errors_count += 1;
                record_error(&mut errors, &signal);
            }
            Some(AvailabilityStatus::InProgress) | None => {}
        }
    }

    let status = if statuses_count == 0 {
        Status::Unknown
    } else if errors_count == 0 {
        Status::Available
    } else if errors_count == statuses_count {
        Status::Unavailable
    } else {
        Status::PartiallyAvailable
    };

    tracing::trace!(source = %source.id, %status, statuses_count, errors_count, "aggregated status");

    StatusReport { status, errors }
}

fn record_error(errors: &mut AvailabilityErrors, signal: &Signal<'_>) {
    let error = LeafError::from_text(signal.error);
    match signal.category {
        Category::Source => errors.source = Some(error),
        Category::Applications => errors.applications.push(ApplicationError {
            id: signal.key.unwrap_or_default().to_string(),
            error,
        }),
        Category::Endpoint => errors.endpoint = Some(error),
        Category::Authentications => errors.authentications.push(AuthenticationError {
            authtype: signal.key.map(String::from),
            error,
        }),
    }
}

// =============================================================================
// Presentation
// =============================================================================

/// Label colour of a status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusColor {
    /// Failure
    Red,
    /// Healthy
    Green,
    /// Partial failure
    Orange,
    /// Pending or unknown
    Grey,
}

impl Status {
    /// Label colour
    #[must_use]
    pub fn color(&self) -> StatusColor {
        match self {
            Self::Unavailable => StatusColor::Red,
            Self::Available => StatusColor::Green,
            Self::PartiallyAvailable => StatusColor::Orange,
            Self::InProgress | Self::Unknown => StatusColor::Grey,
        }
    }

    /// Human readable label
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unavailable => "Unavailable",
            Self::Available => "Available",
            Self::PartiallyAvailable => "Partially available",
            Self::InProgress => "In progress",
            Self::Unknown => "Unknown",
        }
    }
}

fn app_name<'a>(app_types: &'a [AppType], id: &'a str) -> &'a str {
    app_types
        .iter()
        .find(|t| t.id == id)
        .map_or(id, |t| t.display_name.as_str())
}

/// One line per failing category, application ids resolved to display names
#[must_use]
pub fn format_availability_errors(errors: &AvailabilityErrors, app_types: &[AppType]) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(error) = &errors.source {
        lines.push(format!("Source's status: {error}"));
    }
    if let Some(error) = &errors.endpoint {
        lines.push(format!("Endpoint error: {error}"));
    }
    if !errors.authentications.is_empty() {
        let noun = if errors.authentications.len() == 1 { "status" } else { "statuses" };
        lines.push(format!("Authentication {noun}:"));
        for auth in &errors.authentications {
            lines.push(format!(
                "  {}: {}",
                auth.authtype.as_deref().unwrap_or_default(),
                auth.error
            ));
        }
    }
    if !errors.applications.is_empty() {
        let noun = if errors.applications.len() == 1 { "status" } else { "statuses" };
        lines.push(format!("Application {noun}:"));
        for app in &errors.applications {
            lines.push(format!("  {}: {}", app_name(app_types, &app.id), app.error));
        }
    }

    lines
}

/// Popover text explaining a status
#[must_use]
pub fn tooltip_text(report: &StatusReport, app_types: &[AppType]) -> String {
    match report.status {
        Status::Unavailable | Status::PartiallyAvailable => {
            let headline = if report.errors.categories() == 1 {
                "We found this error."
            } else {
                "We found these errors."
            };
            let mut lines = vec![headline.to_string()];
            lines.extend(format_availability_errors(&report.errors, app_types));
            lines.join("\n")
        }
        Status::Available => "Everything works fine.".to_string(),
        Status::InProgress => {
            "We are still working to validate credentials. Check back for status updates."
                .to_string()
        }
        Status::Unknown => "Status has not been verified.".to_string(),
    }
}

// =============================================================================
// Per-application status
// =============================================================================

/// Effective status of one application as shown in the list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppStatus {
    /// Application type display name
    pub display_name: String,
    /// Effective availability
    pub availability_status: Option<AvailabilityStatus>,
    /// Effective failure reason
    pub availability_status_error: Option<String>,
}

impl AppStatus {
    /// Label colour
    #[must_use]
    pub fn color(&self) -> StatusColor {
        match self.availability_status {
            Some(AvailabilityStatus::Available) => StatusColor::Green,
            Some(AvailabilityStatus::Unavailable) => StatusColor::Red,
            Some(AvailabilityStatus::InProgress) | None => StatusColor::Grey,
        }
    }

    /// Popover text
    #[must_use]
    pub fn tooltip_text(&self) -> String {
        match self.availability_status {
            Some(AvailabilityStatus::Available) => "Everything works fine.".to_string(),
            Some(AvailabilityStatus::Unavailable) => self
                .availability_status_error
                .clone()
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| "Unknown error".to_string()),
            Some(AvailabilityStatus::InProgress) | None => {
                "Status has not been verified.".to_string()
            }
        }
    }
}

/// Effective status of an application, or `None` when its type is not in the
/// catalog
#[must_use]
pub fn app_status(app: &Application, source: &Source, app_types: &[AppType]) -> Option<AppStatus> {
    let app_type = app_types.iter().find(|t| t.id == app.application_type_id)?;
    let signal = StatusSource::Application {
        app,
        endpoint: source.endpoint(),
    }
    .signal();

    Some(AppStatus {
        display_name: app_type.display_name.clone(),
        availability_status: signal.status,
        availability_status_error: signal.error.map(String::from),
    })
}
