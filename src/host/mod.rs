//! Editing host capabilities
//!
//! The capture pipeline never talks to an editor directly. Everything it needs
//! (documents, the active editor and its selection, command dispatch, the
//! clipboard, the color theme, scratch buffers and notifications) goes through
//! the [`EditorHost`] trait so any host can be plugged in.
//!
//! # Architecture
//!
//! - `text.rs` - Line/character positions and selections over document text
//! - `highlight.rs` - syntect-backed highlighted HTML rendering
//! - `clipboard.rs` - In-memory and system clipboard backends
//! - `local.rs` - In-process host built on the pieces above

pub mod clipboard;
#[cfg(test)]
pub mod fake;
pub mod highlight;
pub mod local;
pub mod text;

pub use local::LocalHost;
pub use text::{Position, Selection};

use crate::error::Result;
use std::fmt;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};

// ─────────────────────────────────────────────────────────────────────────────
// Host Types
// ─────────────────────────────────────────────────────────────────────────────

/// Identifier of a document open in the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(pub u64);

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Commands the pipeline dispatches by name. Both are fire-and-forget: the
/// host reports completion only through side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCommand {
    /// Copy the active selection with syntax highlighting
    CopyWithSyntaxHighlighting,
    /// Paste the clipboard into the active document using the given format
    PasteAs { id: String },
}

impl HostCommand {
    /// Paste the clipboard as HTML markup.
    pub fn paste_as_html() -> Self {
        HostCommand::PasteAs {
            id: "html".to_string(),
        }
    }

    /// The host command identifier.
    pub fn id(&self) -> &'static str {
        match self {
            HostCommand::CopyWithSyntaxHighlighting => {
                "editor.action.clipboardCopyWithSyntaxHighlightingAction"
            }
            HostCommand::PasteAs { .. } => "editor.action.pasteAs",
        }
    }
}

/// A document's content changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentChange {
    pub document: DocumentId,
}

/// The active color theme changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeChange {
    pub theme: String,
}

/// A user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Info(String),
    Error(String),
}

// ─────────────────────────────────────────────────────────────────────────────
// EditorHost
// ─────────────────────────────────────────────────────────────────────────────

/// Capabilities an editing host exposes to the capture pipeline.
pub trait EditorHost {
    /// Open workspace roots, in host order.
    fn workspace_roots(&self) -> Vec<PathBuf>;

    /// File path of a document, `None` for untitled buffers.
    fn document_path(&self, document: DocumentId) -> Option<PathBuf>;

    /// Full text of a document.
    fn document_text(&self, document: DocumentId) -> Result<String>;

    /// Number of lines in a document.
    fn line_count(&self, document: DocumentId) -> Result<usize>;

    /// Document shown in the active editor.
    fn active_document(&self) -> Option<DocumentId>;

    /// Show a document and make its editor active.
    fn show_document(&mut self, document: DocumentId) -> Result<()>;

    /// Selection of the active editor.
    fn selection(&self) -> Option<Selection>;

    /// Replace the selection of the active editor.
    fn set_selection(&mut self, selection: Selection) -> Result<()>;

    /// Text currently selected in the active editor.
    fn selected_text(&self) -> Option<String> {
        let document = self.active_document()?;
        let selection = self.selection()?;
        let text = self.document_text(document).ok()?;
        Some(text::text_in_range(&text, selection).to_string())
    }

    /// Dispatch a command. Completion is not observable.
    fn execute_command(&mut self, command: HostCommand) -> Result<()>;

    /// Plain-text clipboard contents.
    fn read_clipboard(&mut self) -> Result<String>;

    /// Replace the clipboard with plain text.
    fn write_clipboard(&mut self, text: &str) -> Result<()>;

    /// Open an empty, untitled document tagged with a content type.
    fn open_scratch_document(&mut self, content_type: &str) -> Result<DocumentId>;

    /// Revert the active document and close its editor.
    fn revert_and_close_active(&mut self) -> Result<()>;

    /// Receive every document change from now on, until the receiver is dropped.
    fn subscribe_document_changes(&mut self) -> Receiver<DocumentChange>;

    /// Name of the active color theme.
    fn color_theme(&self) -> String;

    /// Ask the host to switch color theme. Confirmation arrives as a
    /// [`ThemeChange`] event.
    fn request_color_theme(&mut self, theme: &str) -> Result<()>;

    /// Receive every theme change from now on, until the receiver is dropped.
    fn subscribe_theme_changes(&mut self) -> Receiver<ThemeChange>;

    /// Show a message to the user.
    fn notify(&mut self, notification: Notification);
}

// ─────────────────────────────────────────────────────────────────────────────
// Event Fan-out
// ─────────────────────────────────────────────────────────────────────────────

/// Fan-out of host events to subscribers.
///
/// Subscribers unsubscribe by dropping their receiver; disconnected senders
/// are pruned on the next emit.
#[derive(Debug)]
pub struct EventHub<T> {
    senders: Vec<Sender<T>>,
}

impl<T> Default for EventHub<T> {
    fn default() -> Self {
        Self {
            senders: Vec::new(),
        }
    }
}

impl<T: Clone> EventHub<T> {
    /// Add a subscriber.
    pub fn subscribe(&mut self) -> Receiver<T> {
        let (tx, rx) = channel();
        self.senders.push(tx);
        rx
    }

    /// Deliver an event to every live subscriber.
    pub fn emit(&mut self, event: T) {
        self.senders.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_ids() {
        assert_eq!(
            HostCommand::CopyWithSyntaxHighlighting.id(),
            "editor.action.clipboardCopyWithSyntaxHighlightingAction"
        );
        assert_eq!(HostCommand::paste_as_html().id(), "editor.action.pasteAs");
        assert_eq!(
            HostCommand::paste_as_html(),
            HostCommand::PasteAs {
                id: "html".to_string()
            }
        );
    }

    #[test]
    fn test_event_hub_delivers_and_prunes() {
        let mut hub = EventHub::default();
        let first = hub.subscribe();
        let second = hub.subscribe();

        hub.emit(ThemeChange {
            theme: "dark".to_string(),
        });
        assert_eq!(first.try_recv().unwrap().theme, "dark");
        assert_eq!(second.try_recv().unwrap().theme, "dark");

        drop(first);
        hub.emit(ThemeChange {
            theme: "light".to_string(),
        });
        assert_eq!(hub.senders.len(), 1);
        assert_eq!(second.try_recv().unwrap().theme, "light");
    }
}
