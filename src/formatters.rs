// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Cell formatters for the source list and detail views

use crate::actions::Route;
use crate::status::{app_status, AppStatus};
use crate::types::{AppType, AvailabilityStatus, Catalogs, Endpoint, Source, SourceType};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Source type whose list entry shows the endpoint URL
pub const OPENSHIFT: &str = "openshift";

/// Configuration mode using an account-authorization superkey
pub const ACCOUNT_AUTHORIZATION: &str = "account_authorization";

// =============================================================================
// Endpoint URL
// =============================================================================

/// Port implied by a URL scheme
#[must_use]
pub fn default_port(scheme: &str) -> Option<&'static str> {
    match scheme {
        "http" => Some("80"),
        "https" => Some("443"),
        _ => None,
    }
}

/// `:port` unless the port is absent or the scheme default
#[must_use]
pub fn scheme_port_suffix(scheme: &str, port: Option<&str>) -> String {
    match port {
        Some(p) if !p.is_empty() && Some(p) != default_port(scheme) => format!(":{p}"),
        _ => String::new(),
    }
}

/// `scheme://host[:port]path`, or `None` when the endpoint has no parts
#[must_use]
pub fn endpoint_to_url(endpoint: &Endpoint) -> Option<String> {
    let scheme = endpoint.scheme.as_deref().unwrap_or_default();
    let host = endpoint.host.as_deref().unwrap_or_default();
    let path = endpoint.path.as_deref().unwrap_or_default();

    let url = format!(
        "{scheme}://{host}{}{path}",
        scheme_port_suffix(scheme, endpoint.port.as_deref())
    );

    (url != "://").then_some(url)
}

/// Whether the source is an OpenShift cluster
#[must_use]
pub fn source_is_openshift(source: &Source, source_types: &[SourceType]) -> bool {
    source_types
        .iter()
        .find(|t| t.id == source.source_type_id)
        .is_some_and(|t| t.name == OPENSHIFT)
}

/// URL of the source endpoint
#[must_use]
pub fn format_url(source: &Source) -> Option<String> {
    source.endpoint().and_then(endpoint_to_url)
}

// =============================================================================
// Column values
// =============================================================================

/// Product name of the source type, falling back to the raw type id
#[must_use]
pub fn source_type_name(source: &Source, catalogs: &Catalogs) -> String {
    catalogs
        .source_type(&source.source_type_id)
        .map(|t| t.product_name.as_str())
        .filter(|name| !name.is_empty())
        .unwrap_or(source.source_type_id.as_str())
        .to_string()
}

/// Badge marking a source managed by another product
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportedBadge {
    /// Badge text
    pub label: &'static str,
    /// Explanation for known importers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<&'static str>,
}

fn imports_text(importer: &str) -> Option<&'static str> {
    match importer.to_lowercase().as_str() {
        "cfme" => Some("This source can be managed from your connected CloudForms application."),
        _ => None,
    }
}

/// Imported badge for an import tag, if any
#[must_use]
pub fn imported_badge(imported: Option<&str>) -> Option<ImportedBadge> {
    let importer = imported.filter(|i| !i.is_empty())?;
    Some(ImportedBadge {
        label: "imported",
        tooltip: imports_text(importer),
    })
}

/// Name column: link to the detail page plus the cluster URL for OpenShift
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameCell {
    /// Source name
    pub name: String,
    /// Detail page route
    pub link: String,
    /// Endpoint URL, OpenShift only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Imported badge
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imported: Option<ImportedBadge>,
}

/// Build the name column value
#[must_use]
pub fn name_cell(source: &Source, catalogs: &Catalogs) -> NameCell {
    let url = if source_is_openshift(source, &catalogs.source_types) {
        format_url(source)
    } else {
        None
    };

    NameCell {
        name: source.name.clone(),
        link: Route::Detail.for_id(&source.id),
        url,
        imported: imported_badge(source.imported.as_deref()),
    }
}

/// Effective application statuses sorted by display name
#[must_use]
pub fn application_statuses(source: &Source, app_types: &[AppType]) -> Vec<AppStatus> {
    let mut apps: Vec<AppStatus> = source
        .applications
        .iter()
        .filter_map(|app| app_status(app, source, app_types))
        .collect();
    apps.sort_by(|a, b| {
        a.display_name
            .to_lowercase()
            .cmp(&b.display_name.to_lowercase())
    });
    apps
}

/// Applications column text; `--` when nothing is attached
#[must_use]
pub fn applications_text(apps: &[AppStatus]) -> String {
    if apps.is_empty() {
        "--".to_string()
    } else {
        apps.iter()
            .map(|a| a.display_name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{count} {unit}s ago")
    }
}

/// Relative rendering of a timestamp ("3 days ago")
#[must_use]
pub fn relative_date(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(at);
    if elapsed.num_seconds() < 0 {
        return at.format("%d %b %Y").to_string();
    }

    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if minutes < 1 {
        "just now".to_string()
    } else if hours < 1 {
        plural(minutes, "minute")
    } else if days < 1 {
        plural(hours, "hour")
    } else if days < 30 {
        plural(days, "day")
    } else if days < 365 {
        plural(days / 30, "month")
    } else {
        plural(days / 365, "year")
    }
}

// =============================================================================
// Configuration mode
// =============================================================================

/// How the applications of a source are configured
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigurationMode {
    /// Mode label
    pub label: &'static str,
    /// Superkey failure to flag next to the label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    /// Route to edit the superkey credentials
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit_credentials: Option<String>,
}

/// Configuration mode of a source
#[must_use]
pub fn configuration_mode(source: &Source, source_type: Option<&SourceType>) -> ConfigurationMode {
    if source.app_creation_workflow.as_deref() != Some(ACCOUNT_AUTHORIZATION) {
        return ConfigurationMode {
            label: "Manual configuration",
            warning: None,
            edit_credentials: None,
        };
    }

    let superkey_type = source_type
        .and_then(|t| t.schema.as_ref())
        .and_then(|schema| schema.authentication.iter().find(|a| a.is_superkey))
        .map(|a| a.auth_type.as_str());

    let superkey_auth = superkey_type.and_then(|kind| {
        source
            .authentications
            .iter()
            .find(|auth| auth.authtype.as_deref() == Some(kind))
    });

    let warning = superkey_auth
        .filter(|auth| auth.availability_status == Some(AvailabilityStatus::Unavailable))
        .map(|auth| {
            auth.availability_status_error
                .clone()
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| "Edit credentials required.".to_string())
        });

    ConfigurationMode {
        label: "Account authorization",
        warning,
        edit_credentials: Some(Route::EditCredentials.for_id(&source.id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Application, Authentication, AuthenticationSchema, SourceTypeSchema};
    use chrono::Duration;

    fn endpoint(scheme: &str, host: &str, port: Option<&str>, path: &str) -> Endpoint {
        Endpoint {
            scheme: Some(scheme.into()),
            host: Some(host.into()),
            port: port.map(String::from),
            path: Some(path.into()),
            ..Default::default()
        }
    }

    fn openshift() -> SourceType {
        SourceType {
            id: "1".into(),
            name: OPENSHIFT.into(),
            product_name: "OpenShift Container Platform".into(),
            vendor: "Red Hat".into(),
            schema: None,
        }
    }

    #[test]
    fn test_endpoint_url_hides_default_port() {
        let e = endpoint("https", "cluster.example.com", Some("443"), "/api");
        assert_eq!(endpoint_to_url(&e).as_deref(), Some("https://cluster.example.com/api"));
    }

    #[test]
    fn test_endpoint_url_keeps_custom_port() {
        let e = endpoint("http", "10.0.0.1", Some("8443"), "");
        assert_eq!(endpoint_to_url(&e).as_deref(), Some("http://10.0.0.1:8443"));
    }

    #[test]
    fn test_empty_endpoint_has_no_url() {
        assert_eq!(endpoint_to_url(&Endpoint::default()), None);
    }

    #[test]
    fn test_name_cell_shows_url_for_openshift_only() {
        let mut source = Source {
            id: "7".into(),
            name: "cluster".into(),
            source_type_id: "1".into(),
            endpoints: vec![endpoint("https", "ocp.example.com", None, "")],
            ..Default::default()
        };
        let catalogs = Catalogs {
            source_types: vec![openshift()],
            app_types: vec![],
        };

        let cell = name_cell(&source, &catalogs);
        assert_eq!(cell.url.as_deref(), Some("https://ocp.example.com"));
        assert_eq!(cell.link, "/detail/7");

        source.source_type_id = "2".into();
        assert_eq!(name_cell(&source, &catalogs).url, None);
    }

    #[test]
    fn test_source_type_name_falls_back_to_id() {
        let source = Source {
            source_type_id: "42".into(),
            ..Default::default()
        };
        assert_eq!(source_type_name(&source, &Catalogs::default()), "42");
    }

    #[test]
    fn test_imported_badge_tooltip() {
        let badge = imported_badge(Some("CFME")).unwrap();
        assert!(badge.tooltip.unwrap().contains("CloudForms"));
        assert_eq!(imported_badge(Some("other")).unwrap().tooltip, None);
        assert_eq!(imported_badge(None), None);
    }

    #[test]
    fn test_applications_sorted_and_filtered() {
        let source = Source {
            applications: vec![
                Application {
                    application_type_id: "2".into(),
                    ..Default::default()
                },
                Application {
                    application_type_id: "1".into(),
                    ..Default::default()
                },
                Application {
                    application_type_id: "404".into(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let app_types = vec![
            AppType {
                id: "1".into(),
                name: "/insights/platform/topological-inventory".into(),
                display_name: "Topological Inventory".into(),
            },
            AppType {
                id: "2".into(),
                name: "/insights/platform/cost-management".into(),
                display_name: "Cost Management".into(),
            },
        ];

        let apps = application_statuses(&source, &app_types);

        insta::assert_snapshot!(applications_text(&apps), @"Cost Management, Topological Inventory");
        assert_eq!(applications_text(&[]), "--");
    }

    #[test]
    fn test_relative_date() {
        let now = Utc::now();
        assert_eq!(relative_date(now, now), "just now");
        assert_eq!(relative_date(now - Duration::minutes(1), now), "1 minute ago");
        assert_eq!(relative_date(now - Duration::hours(5), now), "5 hours ago");
        assert_eq!(relative_date(now - Duration::days(3), now), "3 days ago");
        assert_eq!(relative_date(now - Duration::days(400), now), "1 year ago");
    }

    #[test]
    fn test_configuration_mode_flags_failing_superkey() {
        let source_type = SourceType {
            schema: Some(SourceTypeSchema {
                authentication: vec![AuthenticationSchema {
                    auth_type: "access_key_secret_key".into(),
                    is_superkey: true,
                }],
            }),
            ..Default::default()
        };
        let source = Source {
            id: "3".into(),
            app_creation_workflow: Some(ACCOUNT_AUTHORIZATION.into()),
            authentications: vec![Authentication {
                authtype: Some("access_key_secret_key".into()),
                availability_status: Some(AvailabilityStatus::Unavailable),
                ..Default::default()
            }],
            ..Default::default()
        };

        let mode = configuration_mode(&source, Some(&source_type));

        assert_eq!(mode.label, "Account authorization");
        assert_eq!(mode.warning.as_deref(), Some("Edit credentials required."));
        assert_eq!(mode.edit_credentials.as_deref(), Some("/detail/3/edit_credentials"));
    }

    #[test]
    fn test_configuration_mode_manual_by_default() {
        let mode = configuration_mode(&Source::default(), None);
        assert_eq!(mode.label, "Manual configuration");
        assert!(mode.warning.is_none());
    }
}
