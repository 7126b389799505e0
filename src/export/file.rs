//! Listing file output

use log::debug;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Write a listing, creating missing parent directories first.
pub fn save(path: &Path, content: &str) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| Error::WriteFailed {
            path: dir.to_path_buf(),
            source: e,
        })?;
    }

    fs::write(path, content).map_err(|e| Error::WriteFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    debug!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}
