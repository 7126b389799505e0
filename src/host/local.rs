//! In-process editing host
//!
//! `LocalHost` stands in for an editor when running from the command line.
//! Documents are loaded from disk, highlighting comes from syntect under the
//! active color theme, and the clipboard is either process-local or the
//! system clipboard.
//!
//! Commands behave like their editor counterparts: a highlight copy puts the
//! plain selection on the clipboard and keeps the highlighted HTML as the
//! rich payload, and paste-as-HTML inserts that payload into the active
//! document.

use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;

use super::clipboard::ClipboardBackend;
use super::highlight::{get_highlighter, html_escape, DEFAULT_THEME};
use super::{
    text, DocumentChange, DocumentId, EditorHost, EventHub, HostCommand, Notification, Selection,
    ThemeChange,
};
use crate::error::{Error, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Local Document
// ─────────────────────────────────────────────────────────────────────────────

/// A document held by the local host.
#[derive(Debug, Clone)]
struct LocalDocument {
    /// File path, `None` for scratch documents
    path: Option<PathBuf>,
    /// Language identifier used for highlighting
    language: String,
    /// Current text
    text: String,
    /// Text to go back to on revert
    saved_text: String,
}

/// Language identifier of a file, taken from its extension.
fn language_for_path(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default()
}

// ─────────────────────────────────────────────────────────────────────────────
// Local Host
// ─────────────────────────────────────────────────────────────────────────────

/// Editing host backed by files on disk.
pub struct LocalHost {
    roots: Vec<PathBuf>,
    documents: HashMap<DocumentId, LocalDocument>,
    next_id: u64,

    /// Open editors, the active one last
    editors: Vec<DocumentId>,
    selections: HashMap<DocumentId, Selection>,

    clipboard: ClipboardBackend,
    /// HTML of the last highlight copy, paired with its plain text
    rich_payload: Option<(String, String)>,

    theme: String,
    notifications: Vec<Notification>,

    document_changes: EventHub<DocumentChange>,
    theme_changes: EventHub<ThemeChange>,
}

impl LocalHost {
    /// Create a host over the given workspace roots.
    pub fn new(roots: Vec<PathBuf>, clipboard: ClipboardBackend) -> Self {
        Self {
            roots,
            documents: HashMap::new(),
            next_id: 0,
            editors: Vec::new(),
            selections: HashMap::new(),
            clipboard,
            rich_payload: None,
            theme: DEFAULT_THEME.to_string(),
            notifications: Vec::new(),
            document_changes: EventHub::default(),
            theme_changes: EventHub::default(),
        }
    }

    /// Start under a given color theme instead of the default one.
    pub fn with_theme(mut self, theme: &str) -> Self {
        if get_highlighter().has_theme(theme) {
            self.theme = theme.to_string();
        } else {
            warn!("Unknown color theme '{}', keeping '{}'", theme, self.theme);
        }
        self
    }

    /// Open a file, or reload it from disk if it is already open.
    pub fn open_file(&mut self, path: &Path) -> Result<DocumentId> {
        let path = fs::canonicalize(path).map_err(|e| {
            Error::Host(format!("Cannot open '{}': {}", path.display(), e))
        })?;
        let text = fs::read_to_string(&path)
            .map_err(|e| Error::Host(format!("Cannot read '{}': {}", path.display(), e)))?;

        if let Some((&id, document)) = self
            .documents
            .iter_mut()
            .find(|(_, d)| d.path.as_deref() == Some(path.as_path()))
        {
            debug!("Reloading {}", path.display());
            document.text = text.clone();
            document.saved_text = text;
            return Ok(id);
        }

        debug!("Opening {}", path.display());
        let language = language_for_path(&path);
        Ok(self.insert(Some(path), language, text))
    }

    fn insert(&mut self, path: Option<PathBuf>, language: String, text: String) -> DocumentId {
        self.next_id += 1;
        let id = DocumentId(self.next_id);
        self.documents.insert(
            id,
            LocalDocument {
                path,
                language,
                saved_text: text.clone(),
                text,
            },
        );
        id
    }

    fn document(&self, document: DocumentId) -> Result<&LocalDocument> {
        self.documents
            .get(&document)
            .ok_or_else(|| Error::Host(format!("Unknown document {}", document)))
    }

    /// Notifications shown so far.
    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    fn copy_with_syntax_highlighting(&mut self) -> Result<()> {
        let Some(active) = self.active_document() else {
            debug!("Highlight copy without an active editor");
            return Ok(());
        };
        let Some(selected) = self.selected_text().filter(|s| !s.is_empty()) else {
            debug!("Highlight copy with an empty selection");
            return Ok(());
        };

        let language = self.document(active)?.language.clone();
        let html = get_highlighter().highlight_html(&selected, &language, &self.theme)?;
        self.clipboard.write_html(&html, &selected)?;
        self.rich_payload = Some((html, selected));
        Ok(())
    }

    fn paste_as(&mut self, format: &str) -> Result<()> {
        let Some(active) = self.active_document() else {
            debug!("Paste without an active editor");
            return Ok(());
        };
        let plain = self.clipboard.read_text()?;

        let insert = match (&self.rich_payload, format) {
            // The payload only counts while the clipboard still holds its text
            (Some((html, text)), "html") if *text == plain => html.clone(),
            (_, "html") => html_escape(&plain),
            _ => plain,
        };

        let selection = self.selections.get(&active).copied().unwrap_or_default();
        let document = self
            .documents
            .get_mut(&active)
            .ok_or_else(|| Error::Host(format!("Unknown document {}", active)))?;
        let start = text::offset_at(&document.text, selection.start);
        let end = text::offset_at(&document.text, selection.end);
        document.text.replace_range(start..end, &insert);
        debug!("Pasted {} bytes into document {}", insert.len(), active);

        self.document_changes.emit(DocumentChange { document: active });
        Ok(())
    }
}

impl EditorHost for LocalHost {
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
        self.editors.retain(|d| *d != document);
        self.editors.push(document);
        self.selections.entry(document).or_default();
        Ok(())
    }

    fn selection(&self) -> Option<Selection> {
        let active = self.active_document()?;
        self.selections.get(&active).copied()
    }

    fn set_selection(&mut self, selection: Selection) -> Result<()> {
        let active = self.active_document().ok_or(Error::NoActiveEditor)?;
        self.selections.insert(active, selection);
        Ok(())
    }

    fn execute_command(&mut self, command: HostCommand) -> Result<()> {
        debug!("Executing {}", command.id());
        match command {
            HostCommand::CopyWithSyntaxHighlighting => self.copy_with_syntax_highlighting(),
            HostCommand::PasteAs { id } => self.paste_as(&id),
        }
    }

    fn read_clipboard(&mut self) -> Result<String> {
        Ok(self.clipboard.read_text()?)
    }

    fn write_clipboard(&mut self, text: &str) -> Result<()> {
        self.rich_payload = None;
        Ok(self.clipboard.write_text(text)?)
    }

    fn open_scratch_document(&mut self, content_type: &str) -> Result<DocumentId> {
        let id = self.insert(None, content_type.to_string(), String::new());
        debug!("Opened scratch document {} ({})", id, content_type);
        Ok(id)
    }

    fn revert_and_close_active(&mut self) -> Result<()> {
        let active = self.editors.pop().ok_or(Error::NoActiveEditor)?;
        self.selections.remove(&active);

        let is_scratch = self.document(active)?.path.is_none();
        if is_scratch {
            self.documents.remove(&active);
        } else if let Some(document) = self.documents.get_mut(&active) {
            document.text = document.saved_text.clone();
        }
        Ok(())
    }

    fn subscribe_document_changes(&mut self) -> Receiver<DocumentChange> {
        self.document_changes.subscribe()
    }

    fn color_theme(&self) -> String {
        self.theme.clone()
    }

    fn request_color_theme(&mut self, theme: &str) -> Result<()> {
        if get_highlighter().has_theme(theme) {
            info!("Color theme changed to '{}'", theme);
            self.theme = theme.to_string();
        } else {
            warn!("Unknown color theme '{}', keeping '{}'", theme, self.theme);
        }
        // Always confirm so a waiting caller can compare the outcome
        let current = self.theme.clone();
        self.theme_changes.emit(ThemeChange { theme: current });
        Ok(())
    }

    fn subscribe_theme_changes(&mut self) -> Receiver<ThemeChange> {
        self.theme_changes.subscribe()
    }

    fn notify(&mut self, notification: Notification) {
        match &notification {
            Notification::Info(message) => info!("{}", message),
            Notification::Error(message) => error!("{}", message),
        }
        self.notifications.push(notification);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{capture, PollPolicy};
    use crate::error::Error;
    use crate::host::Position;
    use crate::theme::run_with_theme;
    use std::time::Duration;
    use tempfile::TempDir;

    fn host() -> LocalHost {
        LocalHost::new(vec![PathBuf::from("/ws")], ClipboardBackend::in_memory())
    }

    /// Open an in-memory document as if it had been read from `path`.
    fn open_text(host: &mut LocalHost, path: &str, language: &str, text: &str) -> DocumentId {
        host.insert(Some(PathBuf::from(path)), language.to_string(), text.to_string())
    }

    fn fast_policy() -> PollPolicy {
        PollPolicy {
            interval: Duration::from_millis(1),
            ..PollPolicy::default()
        }
    }

    #[test]
    fn test_open_file_and_reload() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("app.py");
        fs::write(&path, "a = 1\n").unwrap();
        let mut host = LocalHost::new(vec![temp.path().to_path_buf()], ClipboardBackend::in_memory());

        let doc = host.open_file(&path).unwrap();
        assert_eq!(host.document_text(doc).unwrap(), "a = 1\n");
        assert_eq!(host.line_count(doc).unwrap(), 2);

        fs::write(&path, "a = 2\n").unwrap();
        assert_eq!(host.open_file(&path).unwrap(), doc);
        assert_eq!(host.document_text(doc).unwrap(), "a = 2\n");
    }

    #[test]
    fn test_open_missing_file_fails() {
        let temp = TempDir::new().unwrap();
        let result = host().open_file(&temp.path().join("absent.py"));
        assert!(matches!(result, Err(Error::Host(_))));
    }

    #[test]
    fn test_highlight_copy_puts_plain_text_on_clipboard() {
        let mut host = host();
        let doc = open_text(&mut host, "/ws/src/app.py", "py", "x = 1\ny = 2\n");
        host.show_document(doc).unwrap();
        host.set_selection(Selection::new(Position::new(0, 0), Position::new(0, 5)))
            .unwrap();

        host.execute_command(HostCommand::CopyWithSyntaxHighlighting)
            .unwrap();

        assert_eq!(host.read_clipboard().unwrap(), "x = 1");
    }

    #[test]
    fn test_capture_round_trip() {
        let mut host = host();
        let doc = open_text(&mut host, "/ws/src/app.py", "py", "def f():\n    pass\n");
        host.show_document(doc).unwrap();
        host.set_selection(Selection::whole_document(3)).unwrap();

        let selected = host.selected_text().unwrap();
        let html = capture(&mut host, &selected, &fast_policy()).unwrap();

        assert!(html.starts_with("<div style="));
        assert!(html.contains(">def</span>"));
        // Scratch document is gone and the source is active again
        assert_eq!(host.active_document(), Some(doc));
        assert_eq!(host.documents.len(), 1);
    }

    #[test]
    fn test_paste_without_rich_payload_escapes_text() {
        let mut host = host();
        host.write_clipboard("<a>").unwrap();
        let scratch = host.open_scratch_document("html").unwrap();
        host.show_document(scratch).unwrap();
        let changes = host.subscribe_document_changes();

        host.execute_command(HostCommand::paste_as_html()).unwrap();

        assert_eq!(changes.try_recv().unwrap().document, scratch);
        assert_eq!(host.document_text(scratch).unwrap(), "&lt;a&gt;");
    }

    #[test]
    fn test_revert_and_close() {
        let mut host = host();
        let doc = open_text(&mut host, "/ws/src/app.py", "py", "x");
        host.show_document(doc).unwrap();
        host.write_clipboard("y").unwrap();
        host.execute_command(HostCommand::PasteAs {
            id: "text".to_string(),
        })
        .unwrap();
        assert_eq!(host.document_text(doc).unwrap(), "yx");

        host.revert_and_close_active().unwrap();

        assert!(host.documents.contains_key(&doc));
        assert_eq!(host.document_text(doc).unwrap(), "x");
        assert_eq!(host.active_document(), None);
        assert!(matches!(
            host.revert_and_close_active(),
            Err(Error::NoActiveEditor)
        ));
    }

    #[test]
    fn test_theme_switch_and_unknown_theme() {
        let mut host = host();
        let events = host.subscribe_theme_changes();

        host.request_color_theme("base16-ocean.dark").unwrap();
        assert_eq!(events.try_recv().unwrap().theme, "base16-ocean.dark");
        assert_eq!(host.color_theme(), "base16-ocean.dark");

        host.request_color_theme("No Such Theme").unwrap();
        assert_eq!(events.try_recv().unwrap().theme, "base16-ocean.dark");
    }

    #[test]
    fn test_unknown_override_theme_fails_and_restores() {
        let mut host = host();
        let result = run_with_theme(&mut host, Some("No Such Theme"), |_| Ok(()));

        assert!(matches!(result, Err(Error::ThemeSwitchFailed { .. })));
        assert_eq!(host.color_theme(), DEFAULT_THEME);
    }

    #[test]
    fn test_notifications_are_kept() {
        let mut host = host();
        host.notify(Notification::Info("done".to_string()));
        host.notify(Notification::Error("failed".to_string()));
        assert_eq!(host.notifications().len(), 2);
    }
}
