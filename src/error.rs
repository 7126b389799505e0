//! Centralized error handling for listing
//!
//! This module provides a unified error type that covers every failure the
//! capture and export pipeline can report: host handshake failures, theme
//! switching, file output, LaTeX conversion and configuration loading.

use log::warn;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

// ─────────────────────────────────────────────────────────────────────────────
// Custom Result Type Alias
// ─────────────────────────────────────────────────────────────────────────────

/// A specialized `Result` type for the application.
pub type Result<T> = std::result::Result<T, Error>;

/// The centralized error type for the application.
#[derive(Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────
    // Capture Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Nothing is selected, so there is nothing to capture
    EmptySelection,

    /// The clipboard never reflected the selection within the poll budget
    ClipboardTimeout { attempts: u32 },

    /// The first document change after pasting hit another document
    PasteMismatch,

    /// The paste never produced a document change (host hung up or timed out)
    PasteAborted(String),

    /// No editor is active in the host
    NoActiveEditor,

    /// The active editor shows a different document than expected
    WrongActiveDocument,

    // ─────────────────────────────────────────────────────────────────────────
    // Theme Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// The host reported another theme than the one requested
    ThemeSwitchFailed { requested: String, actual: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Output Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Failed to write a listing file
    WriteFailed { path: PathBuf, source: io::Error },

    /// The HTML could not be turned into a LaTeX listing
    ConverterFailed(String),

    // ─────────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Generic I/O error wrapper
    Io(io::Error),

    /// Failed to load configuration file
    ConfigLoad {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to parse configuration (invalid JSON/format)
    ConfigParse {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration directory not found or inaccessible
    ConfigDirNotFound,

    // ─────────────────────────────────────────────────────────────────────────
    // Host Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// The editing host rejected an operation
    Host(String),

    /// The save watcher could not be set up
    Watch(String),
}

impl Error {
    /// Build a paste-timeout error for the given wait.
    pub fn paste_timed_out(timeout: Duration) -> Self {
        Error::PasteAborted(format!(
            "no document change within {} ms",
            timeout.as_millis()
        ))
    }
}

// Implement From traits for convenient error conversion
impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ConfigParse {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<notify::Error> for Error {
    fn from(err: notify::Error) -> Self {
        Error::Watch(err.to_string())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Display trait implementation for user-friendly error messages
// ─────────────────────────────────────────────────────────────────────────────
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Capture Errors
            Error::EmptySelection => {
                write!(f, "Cannot extract listing from empty selection.")
            }
            Error::ClipboardTimeout { attempts } => write!(
                f,
                "Could not copy listing to clipboard (gave up after {} attempts).",
                attempts
            ),
            Error::PasteMismatch => {
                write!(f, "Could not paste HTML listing in temporary document.")
            }
            Error::PasteAborted(reason) => {
                write!(f, "HTML listing was never pasted: {}", reason)
            }
            Error::NoActiveEditor => write!(f, "No active editor for extracting listing."),
            Error::WrongActiveDocument => {
                write!(f, "Wrong active document for extracting listing.")
            }

            // Theme Errors
            Error::ThemeSwitchFailed { requested, actual } => write!(
                f,
                "Could not switch theme to '{}' (host reports '{}').",
                requested, actual
            ),

            // Output Errors
            Error::WriteFailed { path, source } => {
                write!(f, "Failed to write '{}': {}", path.display(), source)
            }
            Error::ConverterFailed(msg) => write!(f, "LaTeX conversion failed: {}", msg),

            // Configuration Errors
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::ConfigLoad { path, source } => {
                write!(
                    f,
                    "Failed to load configuration from '{}': {}",
                    path.display(),
                    source
                )
            }
            Error::ConfigParse { message, .. } => {
                write!(f, "Invalid configuration format: {}", message)
            }
            Error::ConfigDirNotFound => {
                write!(f, "Configuration directory not found")
            }

            // Host Errors
            Error::Host(msg) => write!(f, "{}", msg),
            Error::Watch(msg) => write!(f, "File watcher error: {}", msg),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// std::error::Error trait implementation for error chaining
// ─────────────────────────────────────────────────────────────────────────────
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::WriteFailed { source, .. } => Some(source),
            Error::ConfigLoad { source, .. } => Some(source.as_ref()),
            Error::ConfigParse { source, .. } => source
                .as_ref()
                .map(|s| s.as_ref() as &(dyn std::error::Error + 'static)),
            Error::EmptySelection
            | Error::ClipboardTimeout { .. }
            | Error::PasteMismatch
            | Error::PasteAborted(_)
            | Error::NoActiveEditor
            | Error::WrongActiveDocument
            | Error::ThemeSwitchFailed { .. }
            | Error::ConverterFailed(_)
            | Error::ConfigDirNotFound
            | Error::Host(_)
            | Error::Watch(_) => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Graceful Degradation Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Extension trait for Result to support graceful degradation.
pub trait ResultExt<T> {
    /// If the result is an error, log it at warning level and return the provided default.
    fn unwrap_or_warn_default(self, default: T, context: &str) -> T;
}

impl<T> ResultExt<T> for Result<T> {
    fn unwrap_or_warn_default(self, default: T, context: &str) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                warn!("{}: {}. Using default.", context, err);
                default
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
