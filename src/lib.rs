// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Sources console library - availability status and list views for
//! integration sources
//!
//! This crate provides the client-side core of the sources console: the
//! status aggregator that folds nested endpoint, authentication and
//! application health into one availability value, and the view pipeline
//! that filters, sorts, paginates and projects the source list.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod actions;
pub mod commands;
pub mod config;
pub mod error;
pub mod formatters;
pub mod loader;
pub mod status;
pub mod store;
pub mod view;

/// Core records as served by the sources backend
pub mod types {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serialize};
    use std::fmt;
    use std::str::FromStr;

    // =========================================================================
    // Availability
    // =========================================================================

    /// Availability reported by a single record (source, endpoint,
    /// authentication or application)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum AvailabilityStatus {
        /// Last health check succeeded
        Available,
        /// Last health check failed
        Unavailable,
        /// Validation is still running
        InProgress,
    }

    impl AvailabilityStatus {
        /// Parse a wire value, returning `None` for anything a leaf may not store
        #[must_use]
        pub fn parse(raw: &str) -> Option<Self> {
            match raw {
                "available" => Some(Self::Available),
                "unavailable" => Some(Self::Unavailable),
                "in_progress" => Some(Self::InProgress),
                _ => None,
            }
        }
    }

    /// Overall availability derived from every record of a source
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Status {
        /// Every reporting record is available
        Available,
        /// Every reporting record is unavailable
        Unavailable,
        /// The source is being validated
        InProgress,
        /// Some reporting records are unavailable
        PartiallyAvailable,
        /// No record reported anything
        Unknown,
    }

    impl Status {
        /// All statuses in sort rank order
        pub const ALL: [Self; 5] = [
            Self::Available,
            Self::PartiallyAvailable,
            Self::Unavailable,
            Self::InProgress,
            Self::Unknown,
        ];

        /// Wire name of the status
        #[must_use]
        pub fn as_str(&self) -> &'static str {
            match self {
                Self::Available => "available",
                Self::Unavailable => "unavailable",
                Self::InProgress => "in_progress",
                Self::PartiallyAvailable => "partially_available",
                Self::Unknown => "unknown",
            }
        }

        /// Position used when sorting by status
        #[must_use]
        pub fn rank(&self) -> u8 {
            match self {
                Self::Available => 0,
                Self::PartiallyAvailable => 1,
                Self::Unavailable => 2,
                Self::InProgress => 3,
                Self::Unknown => 4,
            }
        }
    }

    impl fmt::Display for Status {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.as_str())
        }
    }

    impl FromStr for Status {
        type Err = String;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s.to_lowercase().replace('-', "_").as_str() {
                "available" => Ok(Self::Available),
                "unavailable" => Ok(Self::Unavailable),
                "in_progress" => Ok(Self::InProgress),
                "partially_available" | "partial" => Ok(Self::PartiallyAvailable),
                "unknown" => Ok(Self::Unknown),
                other => Err(format!(
                    "unknown status '{other}' (expected available, unavailable, in_progress, partially_available, unknown)"
                )),
            }
        }
    }

    /// Accept any JSON value and keep only statuses a leaf record may store
    fn lenient_status<'de, D>(deserializer: D) -> Result<Option<AvailabilityStatus>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
        Ok(raw
            .as_ref()
            .and_then(serde_json::Value::as_str)
            .and_then(AvailabilityStatus::parse))
    }

    /// Scalars become text; anything else is absent
    fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
        Ok(match raw {
            Some(serde_json::Value::String(s)) => Some(s),
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            Some(serde_json::Value::Bool(b)) => Some(b.to_string()),
            _ => None,
        })
    }

    fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(lenient_text(deserializer)?.unwrap_or_default())
    }

    /// RFC 3339 timestamps; unparseable values are absent
    fn lenient_time<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(lenient_text(deserializer)?
            .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
            .map(|at| at.with_timezone(&Utc)))
    }

    fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
        Ok(matches!(raw, Some(serde_json::Value::Bool(true))))
    }

    /// `null` is an empty list and entries that do not decode are dropped
    fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: serde::de::DeserializeOwned,
    {
        let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
        let Some(serde_json::Value::Array(entries)) = raw else {
            return Ok(Vec::new());
        };
        Ok(entries
            .into_iter()
            .filter_map(|entry| serde_json::from_value(entry).ok())
            .collect())
    }

    /// Ports arrive as numbers or numeric strings
    fn lenient_port<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
        Ok(match raw {
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s),
            _ => None,
        })
    }

    // =========================================================================
    // Records
    // =========================================================================

    /// Credential attached to an endpoint, an application or a source
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct Authentication {
        /// Backend identifier
        #[serde(default, deserialize_with = "lenient_text")]
        pub id: Option<String>,
        /// Credential kind tag (e.g. `arn`, `token`)
        #[serde(default, deserialize_with = "lenient_text")]
        pub authtype: Option<String>,
        /// Owner kind; `"Endpoint"` marks an application credential shared
        /// with the source endpoint
        #[serde(default, deserialize_with = "lenient_text")]
        pub resource_type: Option<String>,
        /// Last reported availability
        #[serde(
            default,
            deserialize_with = "lenient_status",
            skip_serializing_if = "Option::is_none"
        )]
        pub availability_status: Option<AvailabilityStatus>,
        /// Reason for the last failure
        #[serde(default, deserialize_with = "lenient_text")]
        pub availability_status_error: Option<String>,
    }

    /// Connection descriptor of a source
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct Endpoint {
        /// Backend identifier
        #[serde(default, deserialize_with = "lenient_text")]
        pub id: Option<String>,
        /// URL scheme
        #[serde(default, deserialize_with = "lenient_text")]
        pub scheme: Option<String>,
        /// Host name
        #[serde(default, deserialize_with = "lenient_text")]
        pub host: Option<String>,
        /// Port
        #[serde(default, deserialize_with = "lenient_port")]
        pub port: Option<String>,
        /// URL path
        #[serde(default, deserialize_with = "lenient_text")]
        pub path: Option<String>,
        /// Last reported availability
        #[serde(
            default,
            deserialize_with = "lenient_status",
            skip_serializing_if = "Option::is_none"
        )]
        pub availability_status: Option<AvailabilityStatus>,
        /// Reason for the last failure
        #[serde(default, deserialize_with = "lenient_text")]
        pub availability_status_error: Option<String>,
        /// Endpoint credentials
        #[serde(default, deserialize_with = "lenient_list")]
        pub authentications: Vec<Authentication>,
    }

    /// Product capability attached to a source
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct Application {
        /// Backend identifier
        #[serde(default, deserialize_with = "lenient_text")]
        pub id: Option<String>,
        /// Application type catalog key
        #[serde(default, deserialize_with = "lenient_string")]
        pub application_type_id: String,
        /// Last reported availability
        #[serde(
            default,
            deserialize_with = "lenient_status",
            skip_serializing_if = "Option::is_none"
        )]
        pub availability_status: Option<AvailabilityStatus>,
        /// Reason for the last failure
        #[serde(default, deserialize_with = "lenient_text")]
        pub availability_status_error: Option<String>,
        /// Application credentials
        #[serde(default, deserialize_with = "lenient_list")]
        pub authentications: Vec<Authentication>,
    }

    impl Application {
        /// Whether the application reports through the source endpoint
        #[must_use]
        pub fn uses_endpoint_status(&self) -> bool {
            self.authentications
                .first()
                .and_then(|auth| auth.resource_type.as_deref())
                == Some("Endpoint")
        }
    }

    /// Configured external integration
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct Source {
        /// Backend identifier
        #[serde(default, deserialize_with = "lenient_string")]
        pub id: String,
        /// Display name
        #[serde(default, deserialize_with = "lenient_string")]
        pub name: String,
        /// Source type catalog key
        #[serde(default, deserialize_with = "lenient_string")]
        pub source_type_id: String,
        /// Creation time
        #[serde(default, deserialize_with = "lenient_time")]
        pub created_at: Option<DateTime<Utc>>,
        /// Import tag when managed by another product (e.g. `cfme`)
        #[serde(default, deserialize_with = "lenient_text")]
        pub imported: Option<String>,
        /// Configuration mode (`account_authorization` or `manual_configuration`)
        #[serde(default, deserialize_with = "lenient_text")]
        pub app_creation_workflow: Option<String>,
        /// Last reported availability
        #[serde(
            default,
            deserialize_with = "lenient_status",
            skip_serializing_if = "Option::is_none"
        )]
        pub availability_status: Option<AvailabilityStatus>,
        /// Reason for the last failure
        #[serde(default, deserialize_with = "lenient_text")]
        pub availability_status_error: Option<String>,
        /// Endpoints as served; only the first one is used
        #[serde(default, deserialize_with = "lenient_list")]
        pub endpoints: Vec<Endpoint>,
        /// Attached applications
        #[serde(default, deserialize_with = "lenient_list")]
        pub applications: Vec<Application>,
        /// Source-level credentials
        #[serde(default, deserialize_with = "lenient_list")]
        pub authentications: Vec<Authentication>,
        /// Set by the client while a removal is pending
        #[serde(default, deserialize_with = "lenient_flag")]
        pub is_deleting: bool,
    }

    impl Source {
        /// The source endpoint, if any
        #[must_use]
        pub fn endpoint(&self) -> Option<&Endpoint> {
            self.endpoints.first()
        }
    }

    // =========================================================================
    // Catalogs
    // =========================================================================

    /// Authentication kind declared by a source type schema
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct AuthenticationSchema {
        /// Credential kind tag
        #[serde(rename = "type", default)]
        pub auth_type: String,
        /// Whether this kind is the account-authorization superkey
        #[serde(default)]
        pub is_superkey: bool,
    }

    /// Source type schema subset used by the console
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct SourceTypeSchema {
        /// Declared authentication kinds
        #[serde(default)]
        pub authentication: Vec<AuthenticationSchema>,
    }

    /// Source type catalog entry
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct SourceType {
        /// Catalog key
        #[serde(default, deserialize_with = "lenient_string")]
        pub id: String,
        /// Machine name (`amazon`, `openshift`, ...)
        #[serde(default)]
        pub name: String,
        /// Human readable product name
        #[serde(default)]
        pub product_name: String,
        /// Vendor (`Amazon`, `Red Hat`, ...)
        #[serde(default)]
        pub vendor: String,
        /// Type schema
        #[serde(default)]
        pub schema: Option<SourceTypeSchema>,
    }

    /// Application type catalog entry
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct AppType {
        /// Catalog key
        #[serde(default, deserialize_with = "lenient_string")]
        pub id: String,
        /// Machine name
        #[serde(default)]
        pub name: String,
        /// Human readable name
        #[serde(default)]
        pub display_name: String,
    }

    /// Both catalogs the list view resolves names against
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct Catalogs {
        /// Source types
        #[serde(default)]
        pub source_types: Vec<SourceType>,
        /// Application types
        #[serde(default)]
        pub app_types: Vec<AppType>,
    }

    impl Catalogs {
        /// Look up a source type
        #[must_use]
        pub fn source_type(&self, id: &str) -> Option<&SourceType> {
            self.source_types.iter().find(|t| t.id == id)
        }

        /// Look up an application type
        #[must_use]
        pub fn app_type(&self, id: &str) -> Option<&AppType> {
            self.app_types.iter().find(|t| t.id == id)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn make_source(json: &str) -> Source {
            serde_json::from_str(json).unwrap()
        }

        #[test]
        fn test_null_name_is_empty() {
            let source = make_source(r#"{"id": "2", "name": null}"#);
            assert_eq!(source.id, "2");
            assert_eq!(source.name, "");
        }

        #[test]
        fn test_numeric_ids_become_text() {
            let source = make_source(r#"{"id": 7, "source_type_id": 3}"#);
            assert_eq!(source.id, "7");
            assert_eq!(source.source_type_id, "3");
        }

        #[test]
        fn test_missing_id_is_empty() {
            assert_eq!(make_source(r#"{"name": "aws"}"#).id, "");
        }

        #[test]
        fn test_unparseable_created_at_is_absent() {
            assert_eq!(make_source(r#"{"id": "1", "created_at": "yesterday"}"#).created_at, None);
            assert_eq!(make_source(r#"{"id": "1", "created_at": 12}"#).created_at, None);

            let source = make_source(r#"{"id": "1", "created_at": "2024-03-01T10:00:00Z"}"#);
            assert_eq!(
                source.created_at.map(|at| at.to_rfc3339()),
                Some("2024-03-01T10:00:00+00:00".to_string())
            );
        }

        #[test]
        fn test_missing_application_type_id_is_empty() {
            let source = make_source(
                r#"{"id": "1", "applications": [{"id": "10"}, {"id": 11, "application_type_id": 5}]}"#,
            );
            assert_eq!(source.applications.len(), 2);
            assert_eq!(source.applications[0].application_type_id, "");
            assert_eq!(source.applications[1].id.as_deref(), Some("11"));
            assert_eq!(source.applications[1].application_type_id, "5");
        }

        #[test]
        fn test_null_and_garbage_lists() {
            let source = make_source(
                r#"{"id": "1", "endpoints": null, "applications": "none", "authentications": [3, {"authtype": "arn"}]}"#,
            );
            assert!(source.endpoints.is_empty());
            assert!(source.applications.is_empty());
            assert_eq!(source.authentications.len(), 1);
            assert_eq!(source.authentications[0].authtype.as_deref(), Some("arn"));
        }

        #[test]
        fn test_is_deleting_only_true_when_true() {
            assert!(!make_source(r#"{"id": "1", "is_deleting": "yes"}"#).is_deleting);
            assert!(make_source(r#"{"id": "1", "is_deleting": true}"#).is_deleting);
        }
    }
}

/// Prelude for common imports
pub mod prelude {
    pub use crate::error::ConsoleError;
    pub use crate::status::{aggregate_status, StatusReport};
    pub use crate::types::*;
    pub use crate::view::{project, Projection, ViewParameters};
    pub use anyhow::{Context, Result};
}
