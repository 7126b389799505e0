//! Path resolution for listing exports.
//!
//! Maps an absolute document path onto a workspace root and the configured
//! source directory, decides whether the document is excluded by an ignore
//! pattern, and computes the mirrored output paths under the output directory.
//!
//! All paths handled here use a canonical forward-slash form so that Windows
//! and Unix inputs compare the same way.

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use log::{debug, warn};
use std::path::{Path, PathBuf};

// ─────────────────────────────────────────────────────────────────────────────
// Normalization
// ─────────────────────────────────────────────────────────────────────────────

/// Normalize a file path to forward slashes, resolving `.` and `..` lexically.
///
/// Repeated separators are collapsed. A leading `/` (or a leading `//` for
/// UNC-style paths) is preserved.
pub fn normalize_file_path(path: &str) -> String {
    let unified = path.replace('\\', "/");

    let prefix = if unified.starts_with("//") && !unified.starts_with("///") {
        "//"
    } else if unified.starts_with('/') {
        "/"
    } else {
        ""
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                // `..` above an absolute root stays at the root
                _ if !prefix.is_empty() => {}
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    if joined.is_empty() {
        if prefix.is_empty() {
            ".".to_string()
        } else {
            prefix.to_string()
        }
    } else {
        format!("{}{}", prefix, joined)
    }
}

/// Normalize a directory path so it always ends with exactly one `/`.
///
/// An empty directory (or `.`) normalizes to the empty string, meaning
/// "directly under the workspace root".
pub fn normalize_directory_path(path: &str) -> String {
    let normalized = normalize_file_path(path);
    if normalized == "." {
        String::new()
    } else if normalized.ends_with('/') {
        normalized
    } else {
        format!("{}/", normalized)
    }
}

fn path_to_normalized(path: &Path) -> String {
    normalize_file_path(&path.to_string_lossy())
}

// ─────────────────────────────────────────────────────────────────────────────
// Scope
// ─────────────────────────────────────────────────────────────────────────────

/// Where an in-scope document lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    /// Normalized workspace root, ending with `/`
    pub root: String,
    /// Path relative to the source directory
    pub relative_path: String,
}

/// Resolve the workspace root and source-relative path of a document.
///
/// The first root (in host order) that is a literal prefix of the normalized
/// path wins. The remainder must then start with the normalized source
/// directory. Returns `None` when the document is out of scope.
pub fn resolve_scope(path: &Path, workspace_roots: &[PathBuf], source_dir: &str) -> Option<Scope> {
    let file = path_to_normalized(path);
    let source_dir = normalize_directory_path(source_dir);

    for root in workspace_roots {
        let root = normalize_directory_path(&root.to_string_lossy());
        let Some(from_root) = file.strip_prefix(root.as_str()) else {
            continue;
        };
        return match from_root.strip_prefix(source_dir.as_str()) {
            Some(relative) if !relative.is_empty() => Some(Scope {
                root,
                relative_path: relative.to_string(),
            }),
            _ => {
                debug!("{} is outside source directory '{}'", file, source_dir);
                None
            }
        };
    }

    debug!("{} is not under any workspace root", file);
    None
}

// ─────────────────────────────────────────────────────────────────────────────
// Ignore Patterns
// ─────────────────────────────────────────────────────────────────────────────

/// Compiled ignore patterns, matched against source-relative paths.
///
/// `*` does not cross `/`, so `ignored.*` only matches files directly in the
/// source directory while `**/ignored.*` matches at any depth.
///
/// Wildcards do not match dot files: a path with a segment starting with `.`
/// is only ignored by a pattern that itself has a segment starting with `.`,
/// so `*` leaves `.env` alone while `.env` and `.*` match it.
#[derive(Debug, Clone)]
pub struct IgnoreMatcher {
    set: GlobSet,
    /// Per compiled pattern, whether it names a dot segment explicitly
    explicit_dot: Vec<bool>,
}

impl Default for IgnoreMatcher {
    fn default() -> Self {
        Self {
            set: GlobSet::empty(),
            explicit_dot: Vec::new(),
        }
    }
}

fn has_dot_segment(path: &str) -> bool {
    path.split('/').any(|segment| segment.starts_with('.'))
}

impl IgnoreMatcher {
    /// Compile each pattern once. Invalid patterns are skipped with a warning
    /// and therefore never match.
    pub fn compile(patterns: &[String]) -> Self {
        let mut builder = GlobSetBuilder::new();
        let mut explicit_dot = Vec::new();

        for pattern in patterns {
            match GlobBuilder::new(pattern).literal_separator(true).build() {
                Ok(glob) => {
                    builder.add(glob);
                    explicit_dot.push(has_dot_segment(pattern));
                }
                Err(e) => warn!("Ignoring invalid ignore pattern '{}': {}", pattern, e),
            }
        }

        match builder.build() {
            Ok(set) => Self { set, explicit_dot },
            Err(e) => {
                warn!("Failed to compile ignore patterns: {}", e);
                Self::default()
            }
        }
    }

    /// Whether any pattern matches the source-relative path.
    pub fn is_match(&self, relative_path: &str) -> bool {
        if !has_dot_segment(relative_path) {
            return self.set.is_match(relative_path);
        }
        self.set
            .matches(relative_path)
            .into_iter()
            .any(|index| self.explicit_dot[index])
    }
}

/// Whether a source-relative path is excluded by any ignore pattern.
pub fn is_ignored(relative_path: &str, patterns: &IgnoreMatcher) -> bool {
    patterns.is_match(relative_path)
}

// ─────────────────────────────────────────────────────────────────────────────
// Output Paths
// ─────────────────────────────────────────────────────────────────────────────

/// Which output files to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutputFormats {
    pub html: bool,
    pub latex: bool,
}

impl OutputFormats {
    /// Whether no format is enabled.
    pub fn is_empty(&self) -> bool {
        !self.html && !self.latex
    }
}

/// Resolved output files for one source document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OutputPaths {
    pub html: Option<PathBuf>,
    pub latex: Option<PathBuf>,
}

impl OutputPaths {
    /// Whether no output path was resolved.
    pub fn is_empty(&self) -> bool {
        self.html.is_none() && self.latex.is_none()
    }
}

/// Strip the extension of the final path component.
///
/// Dots in directory names and a leading dot of a hidden file are kept.
pub fn strip_extension(path: &str) -> &str {
    let name_start = path.rfind('/').map(|i| i + 1).unwrap_or(0);
    match path[name_start..].rfind('.') {
        Some(dot) if dot > 0 => &path[..name_start + dot],
        _ => path,
    }
}

/// Compute output paths as `root + output_dir + stem + extension`.
///
/// `output_dir` is relative to the workspace root regardless of how deep the
/// source directory is.
pub fn output_paths(
    root: &str,
    relative_path: &str,
    output_dir: &str,
    formats: OutputFormats,
) -> OutputPaths {
    let root = normalize_directory_path(root);
    let output_dir = normalize_directory_path(output_dir);
    let stem = format!("{}{}{}", root, output_dir, strip_extension(relative_path));

    OutputPaths {
        html: formats.html.then(|| PathBuf::from(format!("{}.html", stem))),
        latex: formats.latex.then(|| PathBuf::from(format!("{}.tex", stem))),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
