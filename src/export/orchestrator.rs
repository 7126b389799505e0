//! Export orchestration
//!
//! Ties path resolution, theme override and capture together:
//!
//! - [`handle_save`] exports a whole saved document to listing files.
//! - [`copy_as`] captures the current selection and puts it on the clipboard.
//!
//! Scope misses are silent. Capture and theme failures abort the job with a
//! single error, while every destination file gets its own [`ExportOutcome`].

use log::{debug, info, warn};
use std::path::{Path, PathBuf};

use super::file::save;
use super::latex::ToLatex;
use super::options::{ExportFormat, ExportOptions};
use crate::capture::CaptureRequest;
use crate::error::{Error, Result};
use crate::host::{DocumentId, EditorHost, Selection};
use crate::paths::{is_ignored, output_paths, resolve_scope, OutputPaths};

// ─────────────────────────────────────────────────────────────────────────────
// Listing Job
// ─────────────────────────────────────────────────────────────────────────────

/// An in-scope document and where its listings go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingJob {
    /// Normalized workspace root, ending with `/`
    pub root_directory: String,
    /// Path relative to the source directory
    pub source_relative_path: String,
    /// Listing files to write
    pub output_paths: OutputPaths,
    /// Theme to capture under
    pub theme_override: Option<String>,
}

impl ListingJob {
    /// Plan the export of a document, `None` if nothing should be written.
    pub fn plan(path: &Path, workspace_roots: &[PathBuf], options: &ExportOptions) -> Option<Self> {
        let scope = resolve_scope(path, workspace_roots, &options.source_directory)?;

        if is_ignored(&scope.relative_path, &options.ignore) {
            debug!("{} matches an ignore pattern", scope.relative_path);
            return None;
        }

        let output_paths = output_paths(
            &scope.root,
            &scope.relative_path,
            &options.output_directory,
            options.formats,
        );
        if output_paths.is_empty() {
            return None;
        }

        Some(Self {
            root_directory: scope.root,
            source_relative_path: scope.relative_path,
            output_paths,
            theme_override: options.theme.clone(),
        })
    }

    /// Write every requested listing from the captured HTML.
    ///
    /// Destinations are independent: a failed conversion or write is
    /// recorded and the remaining ones are still attempted.
    pub fn write(&self, html: &str, converter: &dyn ToLatex) -> Vec<ExportOutcome> {
        let mut outcomes = Vec::new();

        if let Some(path) = &self.output_paths.html {
            outcomes.push(ExportOutcome::new(ExportFormat::Html, path, save(path, html)));
        }
        if let Some(path) = &self.output_paths.latex {
            let result = converter
                .convert(html)
                .and_then(|latex| save(path, &latex));
            outcomes.push(ExportOutcome::new(ExportFormat::Latex, path, result));
        }
        outcomes
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Export Outcome
// ─────────────────────────────────────────────────────────────────────────────

/// Result of writing one listing file.
#[derive(Debug)]
pub struct ExportOutcome {
    pub path: PathBuf,
    pub result: Result<()>,
}

impl ExportOutcome {
    fn new(format: ExportFormat, path: &Path, result: Result<()>) -> Self {
        match &result {
            Ok(()) => info!("Listing saved to: {}", path.display()),
            Err(e) => warn!("{} listing not written: {}", format, e),
        }
        Self {
            path: path.to_path_buf(),
            result,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Save-triggered Export
// ─────────────────────────────────────────────────────────────────────────────

/// Export a saved document to its listing files.
///
/// Returns no outcomes when the document is out of scope, ignored, or no
/// format is enabled.
pub fn handle_save<H: EditorHost + ?Sized>(
    host: &mut H,
    document: DocumentId,
    options: &ExportOptions,
    converter: &dyn ToLatex,
) -> Result<Vec<ExportOutcome>> {
    let Some(path) = host.document_path(document) else {
        debug!("Document {} has no file path", document);
        return Ok(Vec::new());
    };
    let Some(job) = ListingJob::plan(&path, &host.workspace_roots(), options) else {
        return Ok(Vec::new());
    };
    debug!(
        "Exporting {} under {} ({:?})",
        job.source_relative_path, job.root_directory, job.output_paths
    );

    host.show_document(document)?;
    if host.active_document() != Some(document) {
        return Err(Error::WrongActiveDocument);
    }
    let lines = host.line_count(document)?;
    host.set_selection(Selection::whole_document(lines))?;
    let text = host.selected_text().unwrap_or_default();

    let html = CaptureRequest::new(text, job.theme_override.clone()).run(host, &options.poll)?;
    Ok(job.write(&html, converter))
}

// ─────────────────────────────────────────────────────────────────────────────
// Copy to Clipboard
// ─────────────────────────────────────────────────────────────────────────────

/// Capture the current selection and put it on the clipboard as `format`.
pub fn copy_as<H: EditorHost + ?Sized>(
    host: &mut H,
    format: ExportFormat,
    options: &ExportOptions,
    converter: &dyn ToLatex,
) -> Result<()> {
    if host.active_document().is_none() {
        return Err(Error::NoActiveEditor);
    }
    match host.selection() {
        Some(selection) if !selection.is_empty() => {}
        _ => return Err(Error::EmptySelection),
    }
    let text = host.selected_text().unwrap_or_default();

    let html = CaptureRequest::new(text, options.theme.clone()).run(host, &options.poll)?;
    let listing = match format {
        ExportFormat::Html => html,
        ExportFormat::Latex => converter.convert(&html)?,
    };
    host.write_clipboard(&listing)?;
    info!("{} listing copied to clipboard", format);
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
