//! Terminal styling helpers
//!
//! Strings are always styled; `anstream` strips the escapes when the output
//! is not a terminal.

use indicatif::ProgressStyle;
use owo_colors::OwoColorize;
use std::fmt::Display;

/// Semantic styles for CLI output
pub trait Stylize: Display + Sized {
    /// Highlight names, refs and values
    fn accent(&self) -> String {
        self.cyan().to_string()
    }

    /// De-emphasize secondary detail
    fn muted(&self) -> String {
        self.dimmed().to_string()
    }

    /// Headings and outcomes
    fn emphasis(&self) -> String {
        self.bold().to_string()
    }

    /// Failure text
    fn failure(&self) -> String {
        self.red().bold().to_string()
    }
}

impl<T: Display> Stylize for T {}

/// Success mark
pub fn check() -> String {
    "✓".green().to_string()
}

/// Failure mark
pub fn cross() -> String {
    "✗".red().to_string()
}

/// Style for the network spinner
pub fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}
