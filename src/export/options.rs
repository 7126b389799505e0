//! Export Options and Configuration
//!
//! This module defines the listing formats and the compiled options the
//! export pipeline runs with. Options are built once from `ListingSettings`
//! so directories are normalized and ignore patterns compiled up front.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::capture::PollPolicy;
use crate::config::ListingSettings;
use crate::paths::{normalize_directory_path, IgnoreMatcher, OutputFormats};

// ─────────────────────────────────────────────────────────────────────────────
// Export Format
// ─────────────────────────────────────────────────────────────────────────────

/// Supported listing formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Highlighted HTML as captured from the host
    Html,
    /// LaTeX listing converted from the captured HTML
    #[default]
    Latex,
}

impl ExportFormat {
    /// Get the display label for this format.
    pub fn label(&self) -> &'static str {
        match self {
            ExportFormat::Html => "HTML",
            ExportFormat::Latex => "LaTeX",
        }
    }

    /// Get the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Html => "html",
            ExportFormat::Latex => "tex",
        }
    }

    /// Get all available export formats.
    pub fn all() -> &'static [ExportFormat] {
        &[ExportFormat::Html, ExportFormat::Latex]
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Export Options
// ─────────────────────────────────────────────────────────────────────────────

/// Settings compiled for the export pipeline.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Theme to capture under (`None` keeps the active theme)
    pub theme: Option<String>,

    /// Normalized source directory, empty or ending with `/`
    pub source_directory: String,

    /// Normalized output directory, empty or ending with `/`
    pub output_directory: String,

    /// Formats written on save
    pub formats: OutputFormats,

    /// Compiled ignore patterns
    pub ignore: IgnoreMatcher,

    /// Capture timing
    pub poll: PollPolicy,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self::from_settings(&ListingSettings::default())
    }
}

impl ExportOptions {
    /// Compile settings into export options.
    pub fn from_settings(settings: &ListingSettings) -> Self {
        Self {
            theme: settings.effective_theme().map(str::to_string),
            source_directory: normalize_directory_path(&settings.source_directory),
            output_directory: normalize_directory_path(&settings.output_directory),
            formats: OutputFormats {
                html: settings.save_html,
                latex: settings.save_latex,
            },
            ignore: IgnoreMatcher::compile(&settings.ignore_pattern_list),
            poll: settings.poll_policy(),
        }
    }

    /// Whether saving a document should export anything at all.
    pub fn exports_on_save(&self) -> bool {
        !self.formats.is_empty()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
