//! In-memory host for tests.
//!
//! Behaves like a cooperative editor by default: highlight-copy puts the
//! selection on the clipboard and paste inserts `highlighted_html` into the
//! active document. Switches simulate the failure modes the pipeline must
//! survive, and counters record every host interaction.

use super::{
    text, DocumentChange, DocumentId, EditorHost, EventHub, HostCommand, Notification, Selection,
    ThemeChange,
};
use crate::error::{Error, Result};
use std::cell::Cell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc::Receiver;

#[derive(Debug, Clone)]
struct FakeDocument {
    path: Option<PathBuf>,
    text: String,
}

#[derive(Debug, Default)]
pub struct FakeHost {
    pub roots: Vec<PathBuf>,
    documents: HashMap<DocumentId, FakeDocument>,
    next_id: u64,
    editors: Vec<DocumentId>,
    selections: HashMap<DocumentId, Selection>,

    pub clipboard: String,
    pub clipboard_reads: u32,
    pub clipboard_writes: Vec<String>,

    theme: String,
    pub theme_reads: Cell<u32>,
    pub theme_requests: Vec<String>,

    pub commands: Vec<HostCommand>,
    pub notifications: Vec<Notification>,
    pub scratch_opened: Vec<DocumentId>,
    pub closed: Vec<DocumentId>,

    /// HTML produced by pasting after a highlight copy
    pub highlighted_html: String,
    /// Highlight copy never reaches the clipboard
    pub clipboard_stuck: bool,
    /// Paste reports a change on a document other than the active one
    pub paste_hits_other_document: bool,
    /// Paste does nothing and emits no change event
    pub paste_ignored: bool,
    /// Theme requests never take effect (the change event still fires)
    pub theme_locked: bool,
    /// Showing a document does not make it active
    pub show_ignored: bool,

    document_changes: EventHub<DocumentChange>,
    theme_changes: EventHub<ThemeChange>,
}

impl FakeHost {
    pub fn new(roots: &[&str]) -> Self {
        Self {
            roots: roots.iter().map(PathBuf::from).collect(),
            theme: "Default Dark".to_string(),
            highlighted_html: "<pre>code</pre>".to_string(),
            ..Default::default()
        }
    }

    /// Add a document backed by a file path.
    pub fn open(&mut self, path: &str, text: &str) -> DocumentId {
        self.insert(Some(PathBuf::from(path)), text)
    }

    fn insert(&mut self, path: Option<PathBuf>, text: &str) -> DocumentId {
        self.next_id += 1;
        let id = DocumentId(self.next_id);
        self.documents.insert(
            id,
            FakeDocument {
                path,
                text: text.to_string(),
            },
        );
        id
    }

    /// Set the theme without going through the change protocol.
    pub fn set_theme_directly(&mut self, theme: &str) {
        self.theme = theme.to_string();
    }

    /// Current theme, without counting it as a read.
    pub fn theme(&self) -> &str {
        &self.theme
    }

    pub fn is_open(&self, document: DocumentId) -> bool {
        self.documents.contains_key(&document)
    }

    fn document(&self, document: DocumentId) -> Result<&FakeDocument> {
        self.documents
            .get(&document)
            .ok_or_else(|| Error::Host(format!("Unknown document {:?}", document)))
    }
}

impl EditorHost for FakeHost {
    fn workspace_roots(&self) -> Vec<PathBuf> {
        self.roots.clone()
    }

    fn document_path(&self, document: DocumentId) -> Option<PathBuf> {
        self.documents.get(&document).and_then(|d| d.path.clone())
    }

    fn document_text(&self, document: DocumentId) -> Result<String> {
        Ok(self.document(document)?.text.clone())
    }

    fn line_count(&self, document: DocumentId) -> Result<usize> {
        Ok(text::line_count(&self.document(document)?.text))
    }

    fn active_document(&self) -> Option<DocumentId> {
        self.editors.last().copied()
    }

    fn show_document(&mut self, document: DocumentId) -> Result<()> {
        self.document(document)?;
        if self.show_ignored {
            return Ok(());
        }
        self.editors.retain(|d| *d != document);
        self.editors.push(document);
        self.selections.entry(document).or_default();
        Ok(())
    }

    fn selection(&self) -> Option<Selection> {
        self.active_document()
            .and_then(|d| self.selections.get(&d).copied())
    }

    fn set_selection(&mut self, selection: Selection) -> Result<()> {
        let active = self.active_document().ok_or(Error::NoActiveEditor)?;
        self.selections.insert(active, selection);
        Ok(())
    }

    fn execute_command(&mut self, command: HostCommand) -> Result<()> {
        self.commands.push(command.clone());
        match command {
            HostCommand::CopyWithSyntaxHighlighting => {
                if !self.clipboard_stuck {
                    self.clipboard = self.selected_text().unwrap_or_default();
                }
            }
            HostCommand::PasteAs { .. } => {
                let Some(active) = self.active_document() else {
                    return Ok(());
                };
                if self.paste_ignored {
                    return Ok(());
                }
                if self.paste_hits_other_document {
                    self.document_changes.emit(DocumentChange {
                        document: DocumentId(u64::MAX),
                    });
                } else {
                    let html = self.highlighted_html.clone();
                    if let Some(doc) = self.documents.get_mut(&active) {
                        doc.text.push_str(&html);
                    }
                    self.document_changes.emit(DocumentChange { document: active });
                }
            }
        }
        Ok(())
    }

    fn read_clipboard(&mut self) -> Result<String> {
        self.clipboard_reads += 1;
        Ok(self.clipboard.clone())
    }

    fn write_clipboard(&mut self, text: &str) -> Result<()> {
        self.clipboard = text.to_string();
        self.clipboard_writes.push(text.to_string());
        Ok(())
    }

    fn open_scratch_document(&mut self, _content_type: &str) -> Result<DocumentId> {
        let id = self.insert(None, "");
        self.scratch_opened.push(id);
        Ok(id)
    }

    fn revert_and_close_active(&mut self) -> Result<()> {
        let active = self.editors.pop().ok_or(Error::NoActiveEditor)?;
        if self.documents[&active].path.is_none() {
            self.documents.remove(&active);
            self.selections.remove(&active);
        }
        self.closed.push(active);
        Ok(())
    }

    fn subscribe_document_changes(&mut self) -> Receiver<DocumentChange> {
        self.document_changes.subscribe()
    }

    fn color_theme(&self) -> String {
        self.theme_reads.set(self.theme_reads.get() + 1);
        self.theme.clone()
    }

    fn request_color_theme(&mut self, theme: &str) -> Result<()> {
        self.theme_requests.push(theme.to_string());
        if !self.theme_locked {
            self.theme = theme.to_string();
        }
        let current = self.theme.clone();
        self.theme_changes.emit(ThemeChange { theme: current });
        Ok(())
    }

    fn subscribe_theme_changes(&mut self) -> Receiver<ThemeChange> {
        self.theme_changes.subscribe()
    }

    fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }
}
