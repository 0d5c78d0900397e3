// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! List command - filtered, sorted and paginated source table

use super::{paint, print_json, OutputOptions};
use crate::config::Settings;
use crate::loader::{next_name_filter, open_list, SnapshotApi};
use crate::store::{Debouncer, ListDisplay, ListState};
use crate::types::Status;
use crate::view::{Cell, FilterValue, Projection, SortDirection, Vendor, ViewParameters};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;
use tracing::info;

/// Arguments of `sources list`
#[derive(Debug, Clone, Default, Args)]
pub struct ListArgs {
    /// Case-insensitive name filter
    #[arg(long)]
    pub name: Option<String>,

    /// Only these source type ids (repeatable)
    #[arg(long = "type", value_name = "ID")]
    pub source_type: Vec<String>,

    /// Only sources with one of these application type ids (repeatable)
    #[arg(long = "app", value_name = "ID")]
    pub application: Vec<String>,

    /// Only these aggregated statuses (repeatable)
    #[arg(long)]
    pub status: Vec<Status>,

    /// Vendor tab (cloud, red_hat)
    #[arg(long)]
    pub vendor: Option<Vendor>,

    /// Column to sort by
    #[arg(long)]
    pub sort_by: Option<String>,

    /// Sort order (asc, desc)
    #[arg(long)]
    pub direction: Option<SortDirection>,

    /// Page number, starting at 1
    #[arg(long)]
    pub page: Option<usize>,

    /// Rows per page
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Keep reading name filters from stdin, one per line, and redraw once
    /// typing settles
    #[arg(long)]
    pub live: bool,
}

impl ListArgs {
    /// View parameters for these arguments on top of the configured defaults
    #[must_use]
    pub fn view_parameters(&self, settings: &Settings) -> ViewParameters {
        let mut params = settings.view_parameters();
        params.filter = FilterValue {
            name: self.name.clone().filter(|n| !n.is_empty()),
            source_type_id: self.source_type.clone(),
            applications: self.application.clone(),
            availability_status: self.status.clone(),
            vendor: self.vendor,
        };
        if let Some(sort_by) = &self.sort_by {
            params.sort_by = Some(sort_by.clone());
        }
        if let Some(direction) = self.direction {
            params.sort_direction = direction;
        }
        if let Some(size) = self.page_size {
            params.page_size = size.max(1);
        }
        if let Some(page) = self.page {
            params.page_number = page.max(1);
        }
        params
    }
}

#[derive(Serialize)]
struct ListOutput<'a> {
    params: &'a ViewParameters,
    page_count: usize,
    #[serde(flatten)]
    projection: Projection,
}

/// Run the list command
pub async fn run(settings: &Settings, args: &ListArgs, output: OutputOptions) -> Result<()> {
    let params = args.view_parameters(settings);
    info!("Loading sources from {}", settings.data_dir.display());

    let api = SnapshotApi::new(&settings.data_dir);
    let mut state = open_list(&api, params).await;
    render(&state, settings, output)?;

    if !args.live {
        return Ok(());
    }

    let mut edits = spawn_stdin_lines();
    let mut debouncer = Debouncer::new(settings.debounce_window());
    while next_name_filter(&api, &mut state, &mut debouncer, &mut edits)
        .await
        .is_some()
    {
        render(&state, settings, output)?;
    }
    Ok(())
}

/// Lines typed on stdin, forwarded until end of input
fn spawn_stdin_lines() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    tokio::spawn(async move {
        let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if tx.send(line).await.is_err() {
                break;
            }
        }
    });
    rx
}

fn render(state: &ListState, settings: &Settings, output: OutputOptions) -> Result<()> {
    let projection = match state.display() {
        ListDisplay::Error(err) => {
            return Err(err).with_context(|| {
                format!("Failed to load sources from {}", settings.data_dir.display())
            })
        }
        ListDisplay::Table(projection) => projection,
        ListDisplay::Placeholder | ListDisplay::NoSources | ListDisplay::NoResults => {
            if output.json {
                crate::view::project(state.entities(), state.params(), state.catalogs())
            } else {
                print_empty(&state.display());
                return Ok(());
            }
        }
    };

    let params = state.params();
    if output.json {
        return print_json(&ListOutput {
            params,
            page_count: params.page_count(projection.total_filtered),
            projection,
        });
    }

    print!("{}", render_table(&projection, Utc::now(), output));
    println!("{}", footer(params, projection.total_filtered));
    Ok(())
}

fn print_empty(display: &ListDisplay) {
    match display {
        ListDisplay::NoSources => {
            println!("No sources found. Export sources into the data directory to see them here.");
        }
        ListDisplay::NoResults => {
            println!("No sources match the current filters. Remove filters to see all sources.");
        }
        _ => println!("Sources are still loading."),
    }
}

/// Plain table of the projected rows, status labels coloured
#[must_use]
pub fn render_table(projection: &Projection, now: DateTime<Utc>, output: OutputOptions) -> String {
    let rows: Vec<Vec<String>> = projection
        .rows
        .iter()
        .map(|row| row.cells.iter().map(|cell| cell.text(now)).collect())
        .collect();

    let widths: Vec<usize> = projection
        .columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            rows.iter()
                .map(|cells| cells.get(i).map_or(0, |t| t.chars().count()))
                .chain(std::iter::once(column.title.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    let header: Vec<String> = projection
        .columns
        .iter()
        .zip(&widths)
        .map(|(column, width)| format!("{:<width$}", column.title, width = *width))
        .collect();
    out.push_str(header.join("  ").trim_end());
    out.push('\n');

    for (row, texts) in projection.rows.iter().zip(&rows) {
        let line: Vec<String> = row
            .cells
            .iter()
            .zip(texts)
            .zip(&widths)
            .map(|((cell, text), width)| {
                let padded = format!("{text:<width$}", width = *width);
                match cell {
                    Cell::Status { color, .. } => paint(&padded, *color, output),
                    _ => padded,
                }
            })
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    }

    out
}

/// Position summary under the table
#[must_use]
pub fn footer(params: &ViewParameters, total: usize) -> String {
    let first = params.page_offset() + 1;
    let last = (params.page_offset() + params.page_size).min(total);
    format!(
        "{first}-{last} of {total} (page {} of {})",
        params.page_number,
        params.page_count(total).max(1)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AvailabilityStatus, Catalogs, Source};
    use crate::view::project;

    fn plain() -> OutputOptions {
        OutputOptions {
            json: false,
            color: false,
        }
    }

    #[test]
    fn test_args_override_settings() {
        let args = ListArgs {
            name: Some("aws".into()),
            status: vec![Status::Unavailable],
            sort_by: Some("name".into()),
            direction: Some(SortDirection::Asc),
            page: Some(0),
            page_size: Some(10),
            ..ListArgs::default()
        };

        let params = args.view_parameters(&Settings::default());

        assert_eq!(params.filter.name.as_deref(), Some("aws"));
        assert_eq!(params.filter.availability_status, vec![Status::Unavailable]);
        assert_eq!(params.sort_by.as_deref(), Some("name"));
        assert_eq!(params.sort_direction, SortDirection::Asc);
        assert_eq!(params.page_number, 1);
        assert_eq!(params.page_size, 10);
    }

    #[test]
    fn test_render_table_aligns_columns() {
        let entities = vec![Source {
            id: "1".into(),
            name: "Pepa".into(),
            source_type_id: "amazon".into(),
            availability_status: Some(AvailabilityStatus::Available),
            ..Default::default()
        }];
        let projection = project(&entities, &ViewParameters::default(), &Catalogs::default());

        let table = render_table(&projection, Utc::now(), plain());
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Name  Type"));
        assert!(lines[1].starts_with("Pepa  amazon"));
        assert!(lines[1].ends_with("Available"));
    }

    #[test]
    fn test_footer() {
        let params = ViewParameters {
            page_size: 10,
            page_number: 3,
            ..ViewParameters::default()
        };
        assert_eq!(footer(&params, 23), "21-23 of 23 (page 3 of 3)");
    }
}
