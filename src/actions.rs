// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Console routes and per-row actions

use crate::types::Source;
use serde::Serialize;

/// Console pages addressed by path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Source list
    Sources,
    /// Source detail
    Detail,
    /// Superkey credential editor
    EditCredentials,
    /// Application management
    ManageApps,
    /// Source editor
    Edit,
    /// Removal confirmation
    Remove,
}

impl Route {
    /// Path template with an `:id` placeholder where applicable
    #[must_use]
    pub fn path(&self) -> &'static str {
        match self {
            Self::Sources => "/",
            Self::Detail => "/detail/:id",
            Self::EditCredentials => "/detail/:id/edit_credentials",
            Self::ManageApps => "/manage_apps/:id",
            Self::Edit => "/edit/:id",
            Self::Remove => "/remove/:id",
        }
    }

    /// Concrete path for a source
    #[must_use]
    pub fn for_id(&self, id: &str) -> String {
        self.path().replace(":id", id)
    }
}

/// Action offered in a row's kebab menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowAction {
    /// Menu label
    pub title: &'static str,
    /// Target path
    pub route: String,
    /// Rendered in the danger colour
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub danger: bool,
}

/// Actions for one source; imported sources cannot be edited here
#[must_use]
pub fn row_actions(source: &Source) -> Vec<RowAction> {
    let mut actions = vec![
        RowAction {
            title: "Manage applications",
            route: Route::ManageApps.for_id(&source.id),
            danger: false,
        },
        RowAction {
            title: "Delete",
            route: Route::Remove.for_id(&source.id),
            danger: true,
        },
    ];

    let editable = source.imported.as_deref().map_or(true, str::is_empty);
    if editable {
        actions.insert(
            1,
            RowAction {
                title: "Edit",
                route: Route::Edit.for_id(&source.id),
                danger: false,
            },
        );
    }

    actions
}
