// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Config command - get or set a setting

use crate::config::{Settings, KEYS};
use anyhow::{anyhow, Context, Result};
use std::path::Path;
use tracing::info;

/// Print a setting, or change it in the config file at `path`
pub fn run(settings: &Settings, path: Option<&Path>, key: &str, value: Option<String>) -> Result<()> {
    let Some(value) = value else {
        let current = settings
            .get(key)
            .ok_or_else(|| anyhow!("Unknown key: {}. Known keys: {}", key, KEYS.join(", ")))?;
        println!("{current}");
        return Ok(());
    };

    let path = path.ok_or_else(|| anyhow!("No config file location; pass --config"))?;

    // Only the file layer is persisted, never environment overrides
    let mut stored = if path.exists() {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str::<Settings>(&raw).with_context(|| format!("Failed to parse {}", path.display()))?
    } else {
        Settings::default()
    };

    stored.set(key, &value)?;
    stored.save(path)?;

    info!("Set {} = {} in {}", key, value, path.display());
    Ok(())
}
