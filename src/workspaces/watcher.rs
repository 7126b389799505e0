//! File system watcher for save-triggered exports.
//!
//! Watches the workspace roots and reports files that were written, so the
//! command-line front end can treat each write as a save. Writes to the
//! settings directory and listing files under the output directory are
//! dropped so exports never trigger themselves.

use log::{debug, warn};
use notify::event::ModifyKind;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use crate::error::{Error, Result};

/// File system events the export loop cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveEvent {
    /// A file was written
    Saved(PathBuf),
    /// The watcher encountered an error
    Error(String),
}

/// Writes the export loop never reacts to.
#[derive(Debug, Clone, Default)]
pub struct Exclusions {
    /// Directories whose writes are never reported
    pub dirs: Vec<PathBuf>,
    /// Directories whose listing files are never reported
    pub output_dirs: Vec<PathBuf>,
    /// Extensions of listing files
    pub listing_extensions: Vec<&'static str>,
}

impl Exclusions {
    /// Whether a write to `path` must be dropped.
    ///
    /// An output directory may be the workspace root itself, so only files
    /// with a listing extension count as output there.
    pub fn matches(&self, path: &Path) -> bool {
        if self.dirs.iter().any(|dir| path.starts_with(dir)) {
            return true;
        }
        let is_listing = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.listing_extensions.iter().any(|known| *known == ext));
        is_listing && self.output_dirs.iter().any(|dir| path.starts_with(dir))
    }
}

/// Watches workspace roots for saved files.
#[derive(Debug)]
pub struct SaveWatcher {
    /// The internal notify watcher
    _watcher: RecommendedWatcher,
    /// Receiver for file system events
    receiver: Receiver<SaveEvent>,
    /// Writes that are never reported
    excluded: Exclusions,
}

impl SaveWatcher {
    /// Watch every root recursively.
    pub fn new(roots: &[PathBuf], excluded: Exclusions) -> Result<Self> {
        let (tx, rx) = channel();

        let mut watcher = RecommendedWatcher::new(
            move |result: std::result::Result<Event, notify::Error>| {
                Self::handle_event(result, &tx);
            },
            Config::default().with_poll_interval(Duration::from_millis(500)),
        )
        .map_err(|e| Error::Watch(format!("Failed to create file watcher: {}", e)))?;

        for root in roots {
            watcher
                .watch(root, RecursiveMode::Recursive)
                .map_err(|e| Error::Watch(format!("Failed to watch path {}: {}", root.display(), e)))?;
            debug!("Watching {}", root.display());
        }

        Ok(Self {
            _watcher: watcher,
            receiver: rx,
            excluded,
        })
    }

    /// Handle a raw notify event and convert to SaveEvents.
    fn handle_event(result: std::result::Result<Event, notify::Error>, tx: &Sender<SaveEvent>) {
        match result {
            Ok(event) => {
                let is_write = matches!(
                    event.kind,
                    EventKind::Create(_)
                        | EventKind::Modify(ModifyKind::Data(_))
                        | EventKind::Modify(ModifyKind::Name(_))
                        | EventKind::Modify(ModifyKind::Any)
                );
                if !is_write {
                    return;
                }
                for path in event.paths {
                    let _ = tx.send(SaveEvent::Saved(path));
                }
            }
            Err(e) => {
                let _ = tx.send(SaveEvent::Error(e.to_string()));
            }
        }
    }

    /// Block until at least one event arrives, then collect everything that
    /// follows within `settle`. Returns `None` once the watcher has stopped.
    pub fn wait_events(&self, settle: Duration) -> Option<Vec<SaveEvent>> {
        let first = self.receiver.recv().ok()?;
        let mut events = vec![first];
        loop {
            match self.receiver.recv_timeout(settle) {
                Ok(event) => events.push(event),
                Err(RecvTimeoutError::Timeout) => break,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        Some(filter_saves(events, &self.excluded))
    }
}

/// Drop duplicate saves, saves of non-files and excluded writes. Errors
/// always pass through.
pub fn filter_saves(events: Vec<SaveEvent>, excluded: &Exclusions) -> Vec<SaveEvent> {
    let mut seen: Vec<PathBuf> = Vec::new();
    events
        .into_iter()
        .filter(|event| {
            let SaveEvent::Saved(path) = event else {
                return true;
            };
            if seen.contains(path) {
                return false;
            }
            seen.push(path.clone());

            if excluded.matches(path) {
                debug!("Ignoring write to {}", path.display());
                return false;
            }
            if !path.is_file() {
                return false;
            }
            true
        })
        .collect()
}

/// Log watcher errors and return the saved paths.
pub fn saved_paths(events: Vec<SaveEvent>) -> Vec<PathBuf> {
    events
        .into_iter()
        .filter_map(|event| match event {
            SaveEvent::Saved(path) => Some(path),
            SaveEvent::Error(e) => {
                warn!("File watcher error: {}", e);
                None
            }
        })
        .collect()
}
