//! Workspace support for listing
//!
//! This module provides:
//! - Scanning a workspace source directory for files to export
//! - File watching that turns writes into save events

mod scan;
pub mod watcher;

pub use scan::collect_source_files;
pub use watcher::{saved_paths, Exclusions, SaveWatcher};
