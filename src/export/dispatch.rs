//! User-facing entry points
//!
//! Wrap the orchestrator so that every outcome, good or bad, ends up as a
//! host notification. Nothing here returns an error.

use log::error;

use super::latex::ToLatex;
use super::options::{ExportFormat, ExportOptions};
use super::orchestrator::{copy_as, handle_save};
use crate::host::{DocumentId, EditorHost, Notification};

/// Export a saved document and notify the user of each listing written.
///
/// Returns the number of listings written.
pub fn dispatch_save<H: EditorHost + ?Sized>(
    host: &mut H,
    document: DocumentId,
    options: &ExportOptions,
    converter: &dyn ToLatex,
) -> usize {
    match handle_save(host, document, options, converter) {
        Ok(outcomes) => {
            let mut written = 0;
            for outcome in outcomes {
                match outcome.result {
                    Ok(()) => {
                        written += 1;
                        host.notify(Notification::Info(format!(
                            "Listing saved to: {}",
                            outcome.path.display()
                        )));
                    }
                    Err(e) => host.notify(Notification::Error(e.to_string())),
                }
            }
            written
        }
        Err(e) => {
            error!("Export of document {} failed: {}", document, e);
            host.notify(Notification::Error(e.to_string()));
            0
        }
    }
}

/// Copy the current selection as a listing and notify the user.
///
/// Returns whether the clipboard was updated.
pub fn dispatch_copy<H: EditorHost + ?Sized>(
    host: &mut H,
    format: ExportFormat,
    options: &ExportOptions,
    converter: &dyn ToLatex,
) -> bool {
    match copy_as(host, format, options, converter) {
        Ok(()) => {
            host.notify(Notification::Info(format!(
                "{} listing copied to clipboard.",
                format
            )));
            true
        }
        Err(e) => {
            error!("Copy as {} failed: {}", format, e);
            host.notify(Notification::Error(e.to_string()));
            false
        }
    }
}
