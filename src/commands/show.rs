// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Show command - one source with its status breakdown

use super::{paint, print_json, OutputOptions};
use crate::actions::{row_actions, RowAction};
use crate::config::Settings;
use crate::formatters::{
    application_statuses, configuration_mode, format_url, imported_badge, relative_date,
    source_type_name, ConfigurationMode, ImportedBadge,
};
use crate::loader::{open_detail, DetailOutcome, SnapshotApi, SourcesApi};
use crate::status::{aggregate_status, tooltip_text, AppStatus, StatusReport};
use crate::types::{Catalogs, Source};
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Everything shown about one source
#[derive(Debug, Clone, Serialize)]
pub struct SourceDetail {
    /// Source id
    pub id: String,
    /// Source name
    pub name: String,
    /// Source type product name
    pub source_type: String,
    /// Endpoint URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Creation time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Imported badge
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imported: Option<ImportedBadge>,
    /// Configuration mode
    pub configuration_mode: ConfigurationMode,
    /// Aggregated status with its failures
    pub status: StatusReport,
    /// Status explanation
    pub tooltip: String,
    /// Effective application statuses
    pub applications: Vec<AppStatus>,
    /// Available actions
    pub actions: Vec<RowAction>,
}

impl SourceDetail {
    /// Resolve every detail of a source against the catalogs
    #[must_use]
    pub fn new(source: &Source, catalogs: &Catalogs) -> Self {
        let status = aggregate_status(source);
        Self {
            id: source.id.clone(),
            name: source.name.clone(),
            source_type: source_type_name(source, catalogs),
            url: format_url(source),
            created_at: source.created_at,
            imported: imported_badge(source.imported.as_deref()),
            configuration_mode: configuration_mode(source, catalogs.source_type(&source.source_type_id)),
            tooltip: tooltip_text(&status, &catalogs.app_types),
            status,
            applications: application_statuses(source, &catalogs.app_types),
            actions: row_actions(source),
        }
    }

    /// Text rendering, dates relative to `now`
    #[must_use]
    pub fn render(&self, now: DateTime<Utc>, output: OutputOptions) -> String {
        let mut lines = vec![format!("{} ({})", self.name, self.id)];
        lines.push(format!("  Type:     {}", self.source_type));
        if let Some(url) = &self.url {
            lines.push(format!("  URL:      {url}"));
        }
        if let Some(at) = self.created_at {
            lines.push(format!("  Added:    {}", relative_date(at, now)));
        }
        if let Some(badge) = &self.imported {
            lines.push(format!(
                "  Imported: {}",
                badge.tooltip.unwrap_or(badge.label)
            ));
        }

        let mut mode = format!("  Mode:     {}", self.configuration_mode.label);
        if let Some(warning) = &self.configuration_mode.warning {
            mode.push_str(&format!(" ({warning})"));
        }
        lines.push(mode);

        lines.push(format!(
            "  Status:   {}",
            paint(self.status.status.label(), self.status.status.color(), output)
        ));
        lines.extend(self.tooltip.lines().map(|l| format!("    {l}")));

        if self.applications.is_empty() {
            lines.push("  Applications: --".to_string());
        } else {
            lines.push("  Applications:".to_string());
            for app in &self.applications {
                lines.push(format!(
                    "    {}: {}",
                    app.display_name,
                    paint(&app.tooltip_text(), app.color(), output)
                ));
            }
        }

        let actions: Vec<&str> = self.actions.iter().map(|a| a.title).collect();
        lines.push(format!("  Actions:  {}", actions.join(", ")));

        lines.join("\n")
    }
}

/// Run the show command
pub async fn run(settings: &Settings, id: &str, output: OutputOptions) -> Result<()> {
    let api = SnapshotApi::new(&settings.data_dir);

    let (source_types, app_types, outcome) = tokio::join!(
        api.load_source_types(),
        api.load_app_types(),
        open_detail(&api, id)
    );
    let catalogs = Catalogs {
        source_types: source_types.context("Failed to load source types")?,
        app_types: app_types.context("Failed to load application types")?,
    };

    let source = match outcome.with_context(|| format!("Failed to load source {id}"))? {
        DetailOutcome::Found(source) => source,
        DetailOutcome::Redirect { notification, .. } => {
            bail!("{}: {}", notification.title, notification.description)
        }
    };

    let detail = SourceDetail::new(&source, &catalogs);
    if output.json {
        return print_json(&detail);
    }

    println!("{}", detail.render(Utc::now(), output));
    Ok(())
}
