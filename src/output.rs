// SPDX-License-Identifier: MIT OR Apache-2.0

//! Output and color utilities for consistent terminal formatting
//!
//! Provides shared color functions respecting NO_COLOR environment variable.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

/// Check if colors should be used (respects NO_COLOR env var)
pub fn use_colors() -> bool {
    std::env::var("NO_COLOR").is_err()
}

/// Colorize source id (cyan)
pub fn colorize_source(text: &str, use_color: bool) -> String {
    if use_color {
        text.cyan().to_string()
    } else {
        text.to_string()
    }
}

/// Colorize rank (yellow)
pub fn colorize_rank(rank: usize, use_color: bool) -> String {
    if use_color {
        format!("#{rank}").yellow().to_string()
    } else {
        format!("#{rank}")
    }
}

/// Format a similarity score with four decimals (green)
pub fn colorize_score(score: f64, use_color: bool) -> String {
    let text = format!("{score:.4}");
    if use_color {
        text.green().to_string()
    } else {
        text
    }
}

/// Colorize passage body (dimmed)
pub fn colorize_passage(text: &str, use_color: bool) -> String {
    if use_color {
        text.dimmed().to_string()
    } else {
        text.to_string()
    }
}

/// Colorize heading (bold)
pub fn colorize_heading(text: &str, use_color: bool) -> String {
    if use_color {
        text.bold().to_string()
    } else {
        text.to_string()
    }
}

/// Print a value as JSON, pretty unless `compact`
pub fn print_json<T: Serialize + ?Sized>(value: &T, compact: bool) -> Result<()> {
    let text = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{text}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_output_without_color() {
        assert_eq!(colorize_source("a.txt", false), "a.txt");
        assert_eq!(colorize_rank(2, false), "#2");
        assert_eq!(colorize_score(0.5, false), "0.5000");
        assert_eq!(colorize_passage("body", false), "body");
        assert_eq!(colorize_heading("Sources", false), "Sources");
    }
}
