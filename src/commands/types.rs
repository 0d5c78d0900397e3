// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Types command - source type and application type catalogs

use super::{print_json, OutputOptions};
use crate::config::Settings;
use crate::loader::{SnapshotApi, SourcesApi};
use crate::types::Catalogs;
use anyhow::{Context, Result};

/// Run the types command
pub async fn run(settings: &Settings, output: OutputOptions) -> Result<()> {
    let api = SnapshotApi::new(&settings.data_dir);
    let (source_types, app_types) = tokio::join!(api.load_source_types(), api.load_app_types());
    let catalogs = Catalogs {
        source_types: source_types.context("Failed to load source types")?,
        app_types: app_types.context("Failed to load application types")?,
    };

    if output.json {
        return print_json(&catalogs);
    }

    print!("{}", render(&catalogs));
    Ok(())
}

/// Text listing of both catalogs
#[must_use]
pub fn render(catalogs: &Catalogs) -> String {
    let mut out = String::from("Source types:\n");
    if catalogs.source_types.is_empty() {
        out.push_str("  (none)\n");
    }
    for t in &catalogs.source_types {
        let vendor = if t.vendor.is_empty() { "-" } else { t.vendor.as_str() };
        out.push_str(&format!("  {:<6} {:<24} {}\n", t.id, t.product_name, vendor));
    }

    out.push_str("Application types:\n");
    if catalogs.app_types.is_empty() {
        out.push_str("  (none)\n");
    }
    for t in &catalogs.app_types {
        out.push_str(&format!("  {:<6} {}\n", t.id, t.display_name));
    }
    out
}
