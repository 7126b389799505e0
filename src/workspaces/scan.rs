//! Source directory scanning.

use log::{debug, warn};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Dot-directories that are never scanned.
fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

/// Collect every file under `root/source_dir`, sorted by path.
///
/// Hidden files and directories are skipped, and symlinks are not followed.
pub fn collect_source_files(root: &Path, source_dir: &str) -> Vec<PathBuf> {
    let base = root.join(source_dir);
    if !base.is_dir() {
        debug!("Source directory {} does not exist", base.display());
        return Vec::new();
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(&base)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| !is_hidden(entry));

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                warn!("Failed to read directory entry: {}", err);
                continue;
            }
        };
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }

    files.sort();
    debug!("Found {} files under {}", files.len(), base.display());
    files
}
