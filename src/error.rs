// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Error taxonomy for data loading
//!
//! A record reporting `unavailable` is not an error here: that is carried as
//! data in [`crate::status::StatusReport`]. Only infrastructure failures and
//! missing single records are raised.

use thiserror::Error;

/// Errors raised while loading console data
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsoleError {
    /// The API collaborator failed to deliver a resource
    #[error("failed to load {resource}: {message}")]
    FetchFailure {
        /// Which resource was requested (`sources`, `source types`, ...)
        resource: &'static str,
        /// Underlying failure
        message: String,
    },

    /// A single source was requested but does not exist
    #[error("source {id} was not found")]
    NotFound {
        /// Requested source id
        id: String,
    },

    /// Settings could not be loaded or stored
    #[error("configuration error: {0}")]
    Config(String),
}

impl ConsoleError {
    /// Build a fetch failure from any displayable cause
    pub fn fetch(resource: &'static str, cause: impl std::fmt::Display) -> Self {
        Self::FetchFailure {
            resource,
            message: cause.to_string(),
        }
    }

    /// Whether the caller should render the full-page error state
    #[must_use]
    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, Self::FetchFailure { .. })
    }
}

impl From<config::ConfigError> for ConsoleError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
