// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Command implementations

pub mod completions;
pub mod config;
pub mod list;
pub mod show;
pub mod types;

use crate::status::StatusColor;
use owo_colors::OwoColorize;

/// Output switches shared by every command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputOptions {
    /// Print machine readable JSON instead of text
    pub json: bool,
    /// Colour status labels
    pub color: bool,
}

/// Colour `text` the way a status of that colour is shown
#[must_use]
pub fn paint(text: &str, color: StatusColor, options: OutputOptions) -> String {
    if !options.color {
        return text.to_string();
    }
    match color {
        StatusColor::Red => text.red().to_string(),
        StatusColor::Green => text.green().to_string(),
        StatusColor::Orange => text.yellow().to_string(),
        StatusColor::Grey => text.bright_black().to_string(),
    }
}

/// Print a value as pretty JSON
pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paint_without_color_is_plain() {
        let options = OutputOptions {
            json: false,
            color: false,
        };
        assert_eq!(paint("Available", StatusColor::Green, options), "Available");
    }

    #[test]
    fn test_paint_with_color_wraps_text() {
        let options = OutputOptions {
            json: false,
            color: true,
        };
        let painted = paint("Unavailable", StatusColor::Red, options);
        assert!(painted.contains("Unavailable"));
        assert_ne!(painted, "Unavailable");
    }
}
