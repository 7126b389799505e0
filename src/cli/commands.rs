//! Command implementations for the listing CLI.
//!
//! Every command runs against a [`LocalHost`] over the workspace roots, so
//! exports go through exactly the same capture handshake an editor would.

use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::{
    load_config, load_settings, save_workspace_settings, workspace_settings_path, ListingSettings,
    WORKSPACE_CONFIG_DIR,
};
use crate::error::{Error, Result};
use crate::export::{
    dispatch_copy, dispatch_save, ExportFormat, ExportOptions, ListingConverter, ListingJob,
};
use crate::host::clipboard::ClipboardBackend;
use crate::host::highlight::get_highlighter;
use crate::host::{EditorHost, LocalHost, Notification, Position, Selection};
use crate::paths::normalize_directory_path;
use crate::workspaces::{collect_source_files, saved_paths, Exclusions, SaveWatcher};

/// Time to let a burst of writes settle before exporting.
const SAVE_SETTLE: Duration = Duration::from_millis(200);

// ─────────────────────────────────────────────────────────────────────────────
// Shared Setup
// ─────────────────────────────────────────────────────────────────────────────

/// Host-level flags shared by every command.
#[derive(Debug, Clone, Default)]
pub struct HostOptions {
    pub system_clipboard: bool,
    pub theme: Option<String>,
}

impl HostOptions {
    /// Build the host. The system clipboard stays open for the host's lifetime.
    fn build(&self, roots: Vec<PathBuf>) -> Result<LocalHost> {
        let clipboard = if self.system_clipboard {
            ClipboardBackend::system()?
        } else {
            ClipboardBackend::in_memory()
        };
        let host = LocalHost::new(roots, clipboard);
        Ok(match &self.theme {
            Some(theme) => host.with_theme(theme),
            None => host,
        })
    }
}

/// Canonical workspace roots, defaulting to the current directory.
fn resolve_roots(roots: Vec<PathBuf>) -> Result<Vec<PathBuf>> {
    let roots = if roots.is_empty() {
        vec![std::env::current_dir()?]
    } else {
        roots
    };
    roots
        .into_iter()
        .map(|root| {
            fs::canonicalize(&root).map_err(|e| {
                Error::Host(format!("Cannot open workspace '{}': {}", root.display(), e))
            })
        })
        .collect()
}

fn resolve_root(root: Option<PathBuf>) -> Result<PathBuf> {
    let mut roots = resolve_roots(root.into_iter().collect())?;
    Ok(roots.remove(0))
}

/// Writes that must not trigger an export: the settings directory and the
/// listing files under the output directory.
fn exclusions(roots: &[PathBuf], settings: &ListingSettings) -> Exclusions {
    let output_dir = normalize_directory_path(&settings.output_directory);
    Exclusions {
        dirs: roots.iter().map(|root| root.join(WORKSPACE_CONFIG_DIR)).collect(),
        output_dirs: roots.iter().map(|root| root.join(&output_dir)).collect(),
        listing_extensions: ExportFormat::all().iter().map(ExportFormat::extension).collect(),
    }
}

/// Fail when any notification reported an error.
fn check_notifications(host: &LocalHost) -> Result<()> {
    let failures = host
        .notifications()
        .iter()
        .filter(|n| matches!(n, Notification::Error(_)))
        .count();
    if failures > 0 {
        return Err(Error::Host(format!("{} export(s) failed", failures)));
    }
    Ok(())
}

/// Export one file if it is in scope. Returns the number of listings written.
fn export_file(host: &mut LocalHost, path: &Path, options: &ExportOptions) -> Result<usize> {
    if ListingJob::plan(path, &host.workspace_roots(), options).is_none() {
        debug!("{} is not exported", path.display());
        return Ok(0);
    }
    let document = host.open_file(path)?;
    Ok(dispatch_save(host, document, options, &ListingConverter::new()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Watch the roots and export every saved file until the watcher stops.
pub fn watch(roots: Vec<PathBuf>, host_options: &HostOptions) -> Result<()> {
    let roots = resolve_roots(roots)?;
    let settings = load_settings(roots.first().map(PathBuf::as_path));
    let options = ExportOptions::from_settings(&settings);
    if !options.exports_on_save() {
        warn!("Neither save-html nor save-latex is enabled, nothing to watch for");
        return Ok(());
    }

    let watcher = SaveWatcher::new(&roots, exclusions(&roots, &settings))?;
    let mut host = host_options.build(roots.clone())?;
    info!(
        "Watching {} workspace root(s) for saves under '{}'",
        roots.len(),
        settings.source_directory
    );

    while let Some(events) = watcher.wait_events(SAVE_SETTLE) {
        for path in saved_paths(events) {
            if let Err(e) = export_file(&mut host, &path, &options) {
                warn!("Could not export {}: {}", path.display(), e);
            }
        }
    }
    Ok(())
}

/// Export one file as if it had just been saved.
pub fn export(file: &Path, roots: Vec<PathBuf>, host_options: &HostOptions) -> Result<()> {
    let roots = resolve_roots(roots)?;
    let settings = load_settings(roots.first().map(PathBuf::as_path));
    let options = ExportOptions::from_settings(&settings);
    let path = fs::canonicalize(file)
        .map_err(|e| Error::Host(format!("Cannot open '{}': {}", file.display(), e)))?;

    let mut host = host_options.build(roots)?;
    let written = export_file(&mut host, &path, &options)?;
    if written == 0 && host.notifications().is_empty() {
        info!("{} is outside the source directory or ignored", path.display());
    }
    check_notifications(&host)
}

/// Export every file of the source directory.
pub fn export_all(root: Option<PathBuf>, host_options: &HostOptions) -> Result<()> {
    let root = resolve_root(root)?;
    let settings = load_settings(Some(&root));
    let options = ExportOptions::from_settings(&settings);

    let mut host = host_options.build(vec![root.clone()])?;
    let mut written = 0;
    for path in collect_source_files(&root, &options.source_directory) {
        written += export_file(&mut host, &path, &options)?;
    }
    info!("Wrote {} listing(s)", written);
    check_notifications(&host)
}

/// Copy a file, or a line range of it, as a listing.
///
/// With the process-local clipboard the listing is printed to stdout.
pub fn copy(
    file: &Path,
    format: ExportFormat,
    lines: Option<(usize, usize)>,
    root: Option<PathBuf>,
    host_options: &HostOptions,
) -> Result<()> {
    let root = resolve_root(root)?;
    let settings = load_settings(Some(&root));
    let options = ExportOptions::from_settings(&settings);

    let mut host = host_options.build(vec![root])?;
    let document = host.open_file(file)?;
    host.show_document(document)?;
    let selection = match lines {
        Some((start, end)) => Selection::new(Position::new(start - 1, 0), Position::new(end, 0)),
        None => Selection::whole_document(host.line_count(document)?),
    };
    host.set_selection(selection)?;

    if !dispatch_copy(&mut host, format, &options, &ListingConverter::new()) {
        return check_notifications(&host);
    }
    if !host_options.system_clipboard {
        print!("{}", host.read_clipboard()?);
    }
    Ok(())
}

/// Write a workspace settings file seeded from the global configuration.
pub fn init(root: Option<PathBuf>, force: bool) -> Result<()> {
    let root = resolve_root(root)?;
    let path = workspace_settings_path(&root);
    if path.exists() && !force {
        return Err(Error::Host(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    let path = save_workspace_settings(&root, &load_config())?;
    println!("Settings written to: {}", path.display());
    Ok(())
}

/// Print the available color themes.
pub fn themes() {
    let mut themes = get_highlighter().available_themes();
    themes.sort_unstable();
    for theme in themes {
        println!("{}", theme);
    }
}
