// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Configuration management
//!
//! Settings are layered, later layers winning:
//!
//! 1. built-in defaults
//! 2. the TOML config file (optional)
//! 3. `SOURCES_CONSOLE_*` environment variables

use crate::error::ConsoleError;
use crate::view::{column, SortDirection, ViewParameters, DEFAULT_PAGE_SIZE, DEFAULT_SORT_BY};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "SOURCES_CONSOLE";

/// Keys accepted by [`Settings::get`] and [`Settings::set`]
pub const KEYS: [&str; 6] = [
    "data_dir",
    "page_size",
    "sort_by",
    "sort_direction",
    "filter_debounce_ms",
    "log_level",
];

/// Accepted free-text filter debounce window, in milliseconds
pub const DEBOUNCE_RANGE_MS: std::ops::RangeInclusive<u64> = 400..=500;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "hyperpolymath", "sources-console")
}

/// Default location of the config file
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|d| d.config_dir().join("config.toml"))
}

/// Console settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory holding the JSON snapshots
    pub data_dir: PathBuf,
    /// Rows per page
    pub page_size: usize,
    /// Column sorted by default
    pub sort_by: String,
    /// Default sort order
    pub sort_direction: SortDirection,
    /// Quiet period before a typed name filter is applied
    pub filter_debounce_ms: u64,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: project_dirs()
                .map(|d| d.data_dir().to_path_buf())
                .unwrap_or_else(|| PathBuf::from("~/.local/share/sources-console")),
            page_size: DEFAULT_PAGE_SIZE,
            sort_by: DEFAULT_SORT_BY.to_string(),
            sort_direction: SortDirection::Desc,
            filter_debounce_ms: 450,
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from defaults, the config file at `path` (if it exists)
    /// and the environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConsoleError> {
        let mut builder = config::Config::builder().add_source(config::Config::try_from(&Self::default())?);

        if let Some(path) = path {
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(false),
            );
        }

        let settings: Self = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the console cannot work with
    pub fn validate(&self) -> Result<(), ConsoleError> {
        if self.page_size == 0 {
            return Err(ConsoleError::Config("page_size must be at least 1".into()));
        }
        if column(&self.sort_by).and_then(|c| c.compare).is_none() {
            return Err(ConsoleError::Config(format!(
                "sort_by '{}' is not a sortable column",
                self.sort_by
            )));
        }
        if !DEBOUNCE_RANGE_MS.contains(&self.filter_debounce_ms) {
            return Err(ConsoleError::Config(format!(
                "filter_debounce_ms must be within {}..={} (got {})",
                DEBOUNCE_RANGE_MS.start(),
                DEBOUNCE_RANGE_MS.end(),
                self.filter_debounce_ms
            )));
        }
        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(ConsoleError::Config(format!(
                "log_level '{}' is not one of {}",
                self.log_level,
                LOG_LEVELS.join(", ")
            )));
        }
        Ok(())
    }

    /// Starting view parameters
    #[must_use]
    pub fn view_parameters(&self) -> ViewParameters {
        ViewParameters {
            sort_by: Some(self.sort_by.clone()),
            sort_direction: self.sort_direction,
            page_size: self.page_size,
            ..ViewParameters::default()
        }
    }

    /// Debounce window for the name filter
    #[must_use]
    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.filter_debounce_ms)
    }

    /// Current value of a key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        let value = match key {
            "data_dir" => self.data_dir.display().to_string(),
            "page_size" => self.page_size.to_string(),
            "sort_by" => self.sort_by.clone(),
            "sort_direction" => self.sort_direction.to_string(),
            "filter_debounce_ms" => self.filter_debounce_ms.to_string(),
            "log_level" => self.log_level.clone(),
            _ => return None,
        };
        Some(value)
    }

    /// Change a key; the result is validated before it is kept
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConsoleError> {
        let mut next = self.clone();
        match key {
            "data_dir" => next.data_dir = PathBuf::from(value),
            "page_size" => next.page_size = parse_number(key, value)?,
            "sort_by" => next.sort_by = value.to_string(),
            "sort_direction" => next.sort_direction = value.parse().map_err(ConsoleError::Config)?,
            "filter_debounce_ms" => next.filter_debounce_ms = parse_number(key, value)?,
            "log_level" => next.log_level = value.to_lowercase(),
            _ => {
                return Err(ConsoleError::Config(format!(
                    "unknown key '{key}' (expected one of {})",
                    KEYS.join(", ")
                )))
            }
        }
        next.validate()?;
        *self = next;
        Ok(())
    }

    /// Write the settings as TOML, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), ConsoleError> {
        let body = toml::to_string_pretty(self).map_err(|e| ConsoleError::Config(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConsoleError::Config(format!("{}: {e}", parent.display())))?;
        }
        std::fs::write(path, body).map_err(|e| ConsoleError::Config(format!("{}: {e}", path.display())))
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConsoleError> {
    value
        .parse()
        .map_err(|_| ConsoleError::Config(format!("{key} expects a number, got '{value}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.page_size, 50);
        assert_eq!(settings.debounce_window(), Duration::from_millis(450));
        assert_eq!(settings.view_parameters(), ViewParameters::default());
    }

    #[test]
    fn test_load_reads_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "page_size = 20\nsort_by = \"name\"\nsort_direction = \"asc\"\n").unwrap();

        let settings = Settings::load(Some(&path)).unwrap();

        assert_eq!(settings.page_size, 20);
        assert_eq!(settings.sort_by, "name");
        assert_eq!(settings.sort_direction, SortDirection::Asc);
        assert_eq!(settings.filter_debounce_ms, 450);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(settings.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "filter_debounce_ms = 5000\n").unwrap();

        let err = Settings::load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("filter_debounce_ms"));
    }

    #[test]
    fn test_set_validates() {
        let mut settings = Settings::default();

        settings.set("page_size", "10").unwrap();
        assert_eq!(settings.get("page_size").as_deref(), Some("10"));

        assert!(settings.set("page_size", "0").is_err());
        assert!(settings.set("page_size", "ten").is_err());
        assert!(settings.set("sort_by", "applications").is_err());
        assert!(settings.set("colour", "red").is_err());
        assert_eq!(settings.page_size, 10);
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut settings = Settings::default();
        settings.set("sort_by", "availability_status").unwrap();

        settings.save(&path).unwrap();
        let loaded = Settings::load(Some(&path)).unwrap();

        assert_eq!(loaded.sort_by, "availability_status");
    }

    #[test]
    fn test_get_unknown_key() {
        assert_eq!(Settings::default().get("nope"), None);
        for key in KEYS {
            assert!(Settings::default().get(key).is_some(), "{key}");
        }
    }
}
