//! Listing settings
//!
//! This module defines the `ListingSettings` struct that holds the `listing`
//! settings group, with serde support for JSON persistence. Keys use the
//! kebab-case names of the settings group (`source-directory`, `save-html`,
//! ...).

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::capture::{PollPolicy, CLIPBOARD_POLL_INTERVAL, CLIPBOARD_POLL_RETRIES};

// ─────────────────────────────────────────────────────────────────────────────
// Main Settings Struct
// ─────────────────────────────────────────────────────────────────────────────

/// The `listing` settings group.
///
/// All fields have defaults via the `Default` trait and `#[serde(default)]`,
/// so partial files are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ListingSettings {
    // ─────────────────────────────────────────────────────────────────────────
    // Scope
    // ─────────────────────────────────────────────────────────────────────────
    /// Directory (relative to a workspace root) whose files are exported
    pub source_directory: String,

    /// Directory (relative to a workspace root) receiving the listings
    pub output_directory: String,

    /// Glob patterns, relative to the source directory, of files to skip
    pub ignore_pattern_list: Vec<String>,

    // ─────────────────────────────────────────────────────────────────────────
    // Formats
    // ─────────────────────────────────────────────────────────────────────────
    /// Write `.html` listings on save
    pub save_html: bool,

    /// Write `.tex` listings on save
    pub save_latex: bool,

    // ─────────────────────────────────────────────────────────────────────────
    // Theme Override
    // ─────────────────────────────────────────────────────────────────────────
    /// Capture under `theme` instead of the active theme
    pub switch_theme: bool,

    /// Theme to capture under when `switch_theme` is enabled
    pub theme: String,

    // ─────────────────────────────────────────────────────────────────────────
    // Capture Timing
    // ─────────────────────────────────────────────────────────────────────────
    /// Delay before each clipboard read, in milliseconds
    pub clipboard_poll_interval_ms: u64,

    /// Clipboard reads after the first one
    pub clipboard_poll_retries: u32,

    /// Upper bound on waiting for the paste, in milliseconds (unbounded if unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paste_timeout_ms: Option<u64>,
}

impl Default for ListingSettings {
    fn default() -> Self {
        Self {
            // Scope
            source_directory: String::from("src"),
            output_directory: String::from("listing"),
            ignore_pattern_list: Vec::new(),

            // Formats
            save_html: false,
            save_latex: true,

            // Theme Override
            switch_theme: false,
            theme: String::from("InspiredGitHub"),

            // Capture Timing
            clipboard_poll_interval_ms: CLIPBOARD_POLL_INTERVAL.as_millis() as u64,
            clipboard_poll_retries: CLIPBOARD_POLL_RETRIES,
            paste_timeout_ms: None,
        }
    }
}

impl ListingSettings {
    // ─────────────────────────────────────────────────────────────────────────
    // Validation Constants and Sanitization
    // ─────────────────────────────────────────────────────────────────────────

    /// Maximum allowed clipboard poll interval.
    pub const MAX_POLL_INTERVAL_MS: u64 = 5_000;
    /// Maximum allowed clipboard poll retries.
    pub const MAX_POLL_RETRIES: u32 = 100;

    /// Sanitize settings that might have been edited by hand.
    ///
    /// Directories are trimmed, duplicate and blank ignore patterns dropped,
    /// an empty theme disables theme switching and poll timing is clamped.
    pub fn sanitize(&mut self) {
        self.source_directory = self.source_directory.trim().to_string();
        self.output_directory = self.output_directory.trim().to_string();

        let mut seen = std::collections::HashSet::new();
        self.ignore_pattern_list = self
            .ignore_pattern_list
            .iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty() && seen.insert(p.clone()))
            .collect();

        self.theme = self.theme.trim().to_string();
        if self.theme.is_empty() {
            self.switch_theme = false;
        }

        self.clipboard_poll_interval_ms = self
            .clipboard_poll_interval_ms
            .min(Self::MAX_POLL_INTERVAL_MS);
        self.clipboard_poll_retries = self.clipboard_poll_retries.min(Self::MAX_POLL_RETRIES);
    }

    /// Load settings and sanitize them to ensure validity.
    pub fn from_json_sanitized(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Self = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }

    /// Theme to capture under, `None` when theme switching is off.
    pub fn effective_theme(&self) -> Option<&str> {
        self.switch_theme.then_some(self.theme.as_str())
    }

    /// Capture timing described by these settings.
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_millis(self.clipboard_poll_interval_ms),
            retries: self.clipboard_poll_retries,
            paste_timeout: self.paste_timeout_ms.map(Duration::from_millis),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = ListingSettings::default();
        assert_eq!(settings.source_directory, "src");
        assert_eq!(settings.output_directory, "listing");
        assert!(settings.ignore_pattern_list.is_empty());
        assert!(!settings.save_html);
        assert!(settings.save_latex);
        assert!(!settings.switch_theme);
        assert_eq!(settings.poll_policy(), PollPolicy::default());
    }

    #[test]
    fn test_kebab_case_keys() {
        let json = r#"{
            "source-directory": "lib",
            "output-directory": "build/listings",
            "save-html": true,
            "save-latex": false,
            "ignore-pattern-list": ["*.lock"],
            "switch-theme": true,
            "theme": "Solarized (light)"
        }"#;
        let settings: ListingSettings = serde_json::from_str(json).unwrap();

        assert_eq!(settings.source_directory, "lib");
        assert_eq!(settings.output_directory, "build/listings");
        assert!(settings.save_html);
        assert!(!settings.save_latex);
        assert_eq!(settings.ignore_pattern_list, vec!["*.lock".to_string()]);
        assert_eq!(settings.effective_theme(), Some("Solarized (light)"));
    }

    #[test]
    fn test_settings_deserialize_with_defaults() {
        let settings: ListingSettings = serde_json::from_str(r#"{"save-html": true}"#).unwrap();
        assert!(settings.save_html);
        assert!(settings.save_latex);
        assert_eq!(settings.source_directory, "src");
    }

    #[test]
    fn test_settings_serialization_roundtrip() {
        let settings = ListingSettings {
            save_html: true,
            paste_timeout_ms: Some(2_000),
            ..Default::default()
        };
        let json = serde_json::to_string(&settings).unwrap();
        assert!(json.contains("\"paste-timeout-ms\":2000"));
        let parsed: ListingSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    fn test_effective_theme_requires_switch() {
        let settings = ListingSettings {
            switch_theme: false,
            theme: "InspiredGitHub".to_string(),
            ..Default::default()
        };
        assert_eq!(settings.effective_theme(), None);
    }

    #[test]
    fn test_sanitize_patterns_and_theme() {
        let mut settings = ListingSettings {
            source_directory: "  src/ ".to_string(),
            ignore_pattern_list: vec![
                "*.lock".to_string(),
                " ".to_string(),
                "*.lock ".to_string(),
                "tests/**".to_string(),
            ],
            switch_theme: true,
            theme: "   ".to_string(),
            ..Default::default()
        };
        settings.sanitize();

        assert_eq!(settings.source_directory, "src/");
        assert_eq!(
            settings.ignore_pattern_list,
            vec!["*.lock".to_string(), "tests/**".to_string()]
        );
        assert!(!settings.switch_theme);
        assert_eq!(settings.effective_theme(), None);
    }

    #[test]
    fn test_sanitize_poll_timing() {
        let settings = ListingSettings::from_json_sanitized(
            r#"{"clipboard-poll-interval-ms": 999999, "clipboard-poll-retries": 5000, "paste-timeout-ms": 1500}"#,
        )
        .unwrap();
        let policy = settings.poll_policy();

        assert_eq!(policy.interval, Duration::from_millis(5_000));
        assert_eq!(policy.retries, ListingSettings::MAX_POLL_RETRIES);
        assert_eq!(policy.paste_timeout, Some(Duration::from_millis(1_500)));
    }
}
