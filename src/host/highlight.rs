//! Syntax Highlighting Module
//!
//! This module integrates syntect to render source text as the inline-styled
//! HTML an editor puts on the clipboard for "copy with syntax highlighting".
//!
//! # Features
//! - Loads and caches syntect SyntaxSet and ThemeSet
//! - Resolves syntaxes by language identifier or file extension
//! - Renders one `<div>` per line with `<span style="color: ...">` runs
//!
//! # Example
//! ```ignore
//! use crate::host::highlight::get_highlighter;
//!
//! let html = get_highlighter().highlight_html("fn main() {}", "rs", "InspiredGitHub")?;
//! ```

use log::{debug, warn};
use std::fmt::Write as _;
use std::sync::OnceLock;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Color, FontStyle, Style, Theme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use crate::error::{Error, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Default theme name from syntect's built-in themes
pub const DEFAULT_THEME: &str = "InspiredGitHub";

/// Container styling that does not depend on the theme
const CONTAINER_FONT_STYLE: &str =
    "font-family: Consolas, 'Courier New', monospace;font-weight: normal;font-size: 14px;line-height: 19px;white-space: pre;";

// ─────────────────────────────────────────────────────────────────────────────
// Syntax Highlighter
// ─────────────────────────────────────────────────────────────────────────────

/// Syntax highlighter that caches syntect sets for performance.
///
/// This struct holds the loaded SyntaxSet and ThemeSet, which are expensive
/// to load and should be reused across highlighting operations.
pub struct SyntaxHighlighter {
    /// Loaded syntax definitions
    syntax_set: SyntaxSet,
    /// Loaded color themes
    theme_set: ThemeSet,
}

impl Default for SyntaxHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntaxHighlighter {
    /// Create a new syntax highlighter with default syntax and theme sets.
    pub fn new() -> Self {
        debug!("Loading syntect syntax and theme sets");
        let syntax_set = SyntaxSet::load_defaults_newlines();
        let theme_set = ThemeSet::load_defaults();
        debug!(
            "Loaded {} syntaxes and {} themes",
            syntax_set.syntaxes().len(),
            theme_set.themes.len()
        );
        Self {
            syntax_set,
            theme_set,
        }
    }

    /// Get available theme names.
    pub fn available_themes(&self) -> Vec<&str> {
        self.theme_set.themes.keys().map(|s| s.as_str()).collect()
    }

    /// Whether a theme with this name is loaded.
    pub fn has_theme(&self, name: &str) -> bool {
        self.theme_set.themes.contains_key(name)
    }

    /// Get a theme by name.
    pub fn get_theme(&self, name: &str) -> Option<&Theme> {
        self.theme_set.themes.get(name)
    }

    /// Render `code` as highlighted HTML under the named theme.
    ///
    /// Unknown languages are rendered as plain text in the theme's
    /// foreground color.
    pub fn highlight_html(&self, code: &str, language: &str, theme_name: &str) -> Result<String> {
        let theme = self
            .get_theme(theme_name)
            .ok_or_else(|| Error::Host(format!("Unknown color theme '{}'", theme_name)))?;
        let syntax = self.find_syntax_for_language(language).unwrap_or_else(|| {
            debug!("No syntax found for language: {}", language);
            self.syntax_set.find_syntax_plain_text()
        });

        let foreground = theme.settings.foreground.unwrap_or(Color::BLACK);
        let background = theme.settings.background.unwrap_or(Color::WHITE);

        let mut html = format!(
            "<div style=\"color: {};background-color: {};{}\">",
            css_color(foreground),
            css_color(background),
            CONTAINER_FONT_STYLE
        );

        let mut highlighter = HighlightLines::new(syntax, theme);
        for line in LinesWithEndings::from(code) {
            let ranges = match highlighter.highlight_line(line, &self.syntax_set) {
                Ok(ranges) => ranges,
                Err(e) => {
                    warn!("Failed to highlight line: {}", e);
                    vec![(
                        Style {
                            foreground,
                            background,
                            font_style: FontStyle::empty(),
                        },
                        line,
                    )]
                }
            };
            push_line(&mut html, &ranges);
        }

        html.push_str("</div>");
        Ok(html)
    }

    /// Find syntax definition for a language identifier.
    ///
    /// Tries multiple strategies:
    /// 1. By extension (e.g., "rs" -> Rust)
    /// 2. By name (e.g., "Rust" -> Rust)
    fn find_syntax_for_language(&self, language: &str) -> Option<&SyntaxReference> {
        if language.is_empty() {
            return None;
        }

        let lang_lower = language.to_lowercase();

        // Map common language aliases to extensions
        let extension = match lang_lower.as_str() {
            "rust" => "rs",
            "python" => "py",
            "javascript" | "mjs" | "cjs" => "js",
            "typescript" => "ts",
            "cpp" | "c++" | "cxx" => "cpp",
            "csharp" | "c#" => "cs",
            "golang" => "go",
            "ruby" => "rb",
            "htm" => "html",
            "markdown" => "md",
            "shell" | "bash" | "zsh" => "sh",
            "tex" | "latex" => "tex",
            "haskell" => "hs",
            other => other,
        };

        if let Some(syntax) = self.syntax_set.find_syntax_by_extension(extension) {
            return Some(syntax);
        }

        if let Some(syntax) = self.syntax_set.find_syntax_by_name(language) {
            return Some(syntax);
        }

        self.syntax_set
            .syntaxes()
            .iter()
            .find(|&syntax| syntax.name.to_lowercase() == lang_lower)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helper Functions
// ─────────────────────────────────────────────────────────────────────────────

/// Format a syntect color as `#rrggbb`.
fn css_color(color: Color) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b)
}

/// Escape text for HTML element content.
pub fn html_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Append one highlighted line. Empty lines become a bare `<br>`.
fn push_line(html: &mut String, ranges: &[(Style, &str)]) {
    let content: usize = ranges
        .iter()
        .map(|(_, text)| text.trim_end_matches(['\n', '\r']).len())
        .sum();
    if content == 0 {
        html.push_str("<br>");
        return;
    }

    html.push_str("<div>");
    for (style, text) in ranges {
        let text = text.trim_end_matches(['\n', '\r']);
        if text.is_empty() {
            continue;
        }
        let _ = write!(html, "<span style=\"color: {};", css_color(style.foreground));
        if style.font_style.contains(FontStyle::BOLD) {
            html.push_str("font-weight: bold;");
        }
        if style.font_style.contains(FontStyle::ITALIC) {
            html.push_str("font-style: italic;");
        }
        let _ = write!(html, "\">{}</span>", html_escape(text));
    }
    html.push_str("</div>");
}

// ─────────────────────────────────────────────────────────────────────────────
// Global Highlighter Instance
// ─────────────────────────────────────────────────────────────────────────────

/// Global syntax highlighter instance, lazily initialized on first access.
static HIGHLIGHTER: OnceLock<SyntaxHighlighter> = OnceLock::new();

/// Get or create the global syntax highlighter.
pub fn get_highlighter() -> &'static SyntaxHighlighter {
    HIGHLIGHTER.get_or_init(SyntaxHighlighter::new)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::latex::ToLatex;
    use crate::export::ListingConverter;

    #[test]
    fn test_available_themes() {
        let highlighter = get_highlighter();
        assert!(highlighter.available_themes().contains(&DEFAULT_THEME));
        assert!(highlighter.has_theme("base16-ocean.dark"));
        assert!(!highlighter.has_theme("No Such Theme"));
    }

    #[test]
    fn test_highlight_python_code() {
        let html = get_highlighter()
            .highlight_html("def f():\n    return 1\n", "py", DEFAULT_THEME)
            .unwrap();
        assert!(html.starts_with("<div style=\"color: #"));
        assert!(html.ends_with("</div>"));
        assert_eq!(html.matches("<div>").count(), 2);
        assert!(html.contains(">def</span>"));
    }

    #[test]
    fn test_empty_lines_become_br() {
        let html = get_highlighter()
            .highlight_html("a = 1\n\nb = 2", "python", DEFAULT_THEME)
            .unwrap();
        assert_eq!(html.matches("<br>").count(), 1);
        assert_eq!(html.matches("<div>").count(), 2);
    }

    #[test]
    fn test_unknown_language_is_plain() {
        let html = get_highlighter()
            .highlight_html("<x & y>", "no-such-language", DEFAULT_THEME)
            .unwrap();
        assert!(html.contains("&lt;x &amp; y&gt;"));
    }

    #[test]
    fn test_unknown_theme_fails() {
        let result = get_highlighter().highlight_html("x", "py", "No Such Theme");
        assert!(matches!(result, Err(Error::Host(_))));
    }

    #[test]
    fn test_rendered_html_converts_to_latex() {
        let html = get_highlighter()
            .highlight_html("fn main() {\n\n    let s = \"\\\\\";\n}\n", "rs", DEFAULT_THEME)
            .unwrap();
        let latex = ListingConverter::new().convert(&html).unwrap();

        assert!(latex.starts_with("\\begin{Verbatim}"));
        assert!(latex.contains("\\textcolor[HTML]{"));
        assert!(latex.contains("\\{"));
        assert!(latex.contains("\\textbackslash{}"));
        // Four source lines, the empty one included
        let body = latex.lines().count() - 2;
        assert_eq!(body, 4);
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("a<b>&\"'"), "a&lt;b&gt;&amp;&quot;&#39;");
    }
}
