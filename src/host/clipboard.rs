//! Clipboard backends for the local host
//!
//! The capture handshake only ever compares and writes plain text, but a
//! highlight copy also carries rich HTML. The in-memory backend keeps both in
//! the process. The system backend goes through the arboard crate and keeps
//! one clipboard handle open, so contents it sets stay owned by this process
//! until the backend is dropped.

use arboard::Clipboard;
use log::debug;

use crate::error::Error;

// ─────────────────────────────────────────────────────────────────────────────
// Clipboard Error
// ─────────────────────────────────────────────────────────────────────────────

/// Errors that can occur during clipboard operations.
#[derive(Debug)]
pub enum ClipboardError {
    /// Failed to access clipboard
    Access(String),
    /// Failed to read clipboard content
    Read(String),
    /// Failed to set clipboard content
    Write(String),
}

impl std::fmt::Display for ClipboardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClipboardError::Access(msg) => write!(f, "Clipboard access error: {}", msg),
            ClipboardError::Read(msg) => write!(f, "Clipboard read error: {}", msg),
            ClipboardError::Write(msg) => write!(f, "Clipboard write error: {}", msg),
        }
    }
}

impl std::error::Error for ClipboardError {}

impl From<ClipboardError> for Error {
    fn from(err: ClipboardError) -> Self {
        Error::Host(err.to_string())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Clipboard Backend
// ─────────────────────────────────────────────────────────────────────────────

/// Where clipboard contents live.
pub enum ClipboardBackend {
    /// Process-local clipboard
    InMemory { text: String, html: Option<String> },
    /// The desktop clipboard
    System(Clipboard),
}

impl Default for ClipboardBackend {
    fn default() -> Self {
        ClipboardBackend::InMemory {
            text: String::new(),
            html: None,
        }
    }
}

impl ClipboardBackend {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open the desktop clipboard.
    pub fn system() -> Result<Self, ClipboardError> {
        let clipboard = Clipboard::new().map_err(|e| ClipboardError::Access(e.to_string()))?;
        Ok(ClipboardBackend::System(clipboard))
    }

    /// Plain-text contents. An empty system clipboard reads as `""`.
    pub fn read_text(&mut self) -> Result<String, ClipboardError> {
        match self {
            ClipboardBackend::InMemory { text, .. } => Ok(text.clone()),
            ClipboardBackend::System(clipboard) => match clipboard.get_text() {
                Ok(text) => Ok(text),
                Err(arboard::Error::ContentNotAvailable) => Ok(String::new()),
                Err(e) => Err(ClipboardError::Read(e.to_string())),
            },
        }
    }

    /// Replace the contents with plain text.
    pub fn write_text(&mut self, contents: &str) -> Result<(), ClipboardError> {
        match self {
            ClipboardBackend::InMemory { text, html } => {
                *text = contents.to_string();
                *html = None;
                Ok(())
            }
            ClipboardBackend::System(clipboard) => clipboard
                .set_text(contents)
                .map_err(|e| ClipboardError::Write(e.to_string())),
        }
    }

    /// Replace the contents with HTML and its plain-text alternative.
    pub fn write_html(&mut self, markup: &str, plain_text: &str) -> Result<(), ClipboardError> {
        debug!("Setting {} bytes of HTML on the clipboard", markup.len());
        match self {
            ClipboardBackend::InMemory { text, html } => {
                *text = plain_text.to_string();
                *html = Some(markup.to_string());
                Ok(())
            }
            ClipboardBackend::System(clipboard) => clipboard
                .set_html(markup, Some(plain_text))
                .map_err(|e| ClipboardError::Write(e.to_string())),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
