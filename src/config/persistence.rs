//! Configuration file persistence for listing
//!
//! Settings are looked up per workspace first and then globally:
//!
//! 1. `{workspace_root}/.listing/settings.json`
//! 2. the platform config directory (`~/.config/listing/config.json` on Linux)
//! 3. built-in defaults
//!
//! Missing files fall through to the next source; corrupted files are logged
//! and replaced by defaults rather than aborting.

use crate::config::ListingSettings;
use crate::error::{Error, Result, ResultExt};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Application name used for the config directory
const APP_NAME: &str = "listing";

/// Global configuration file name
const CONFIG_FILE_NAME: &str = "config.json";

/// Subdirectory of a workspace root holding workspace settings
pub const WORKSPACE_CONFIG_DIR: &str = ".listing";

/// Workspace settings file name
const WORKSPACE_SETTINGS_FILE: &str = "settings.json";

/// Temporary file name used during atomic writes
const BACKUP_SUFFIX: &str = "bak";

// ─────────────────────────────────────────────────────────────────────────────
// Directory Resolution
// ─────────────────────────────────────────────────────────────────────────────

/// Get the platform-specific configuration directory for the application.
///
/// # Errors
///
/// Returns `Error::ConfigDirNotFound` if the config directory cannot be determined
/// (e.g., if the HOME environment variable is not set).
pub fn get_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|base| base.join(APP_NAME))
        .ok_or(Error::ConfigDirNotFound)
}

/// Get the full path to the global configuration file.
pub fn get_config_file_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join(CONFIG_FILE_NAME))
}

/// Path of the settings file of a workspace.
pub fn workspace_settings_path(workspace_root: &Path) -> PathBuf {
    workspace_root
        .join(WORKSPACE_CONFIG_DIR)
        .join(WORKSPACE_SETTINGS_FILE)
}

// ─────────────────────────────────────────────────────────────────────────────
// Load Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Load settings for a workspace, falling back to the global configuration
/// and then to defaults.
pub fn load_settings(workspace_root: Option<&Path>) -> ListingSettings {
    if let Some(root) = workspace_root {
        let path = workspace_settings_path(root);
        if path.exists() {
            return load_settings_file(&path)
                .unwrap_or_warn_default(ListingSettings::default(), "Failed to load workspace settings");
        }
        debug!("No workspace settings file at {}", path.display());
    }
    load_config()
}

/// Load the global configuration, returning defaults if it is missing or
/// unreadable.
pub fn load_config() -> ListingSettings {
    get_config_file_path()
        .and_then(|path| {
            if path.exists() {
                load_settings_file(&path)
            } else {
                debug!("Config file not found at {}, using defaults", path.display());
                Ok(ListingSettings::default())
            }
        })
        .unwrap_or_warn_default(ListingSettings::default(), "Failed to load configuration")
}

/// Read and sanitize one settings file.
pub fn load_settings_file(path: &Path) -> Result<ListingSettings> {
    debug!("Loading settings from: {}", path.display());

    let contents = fs::read_to_string(path).map_err(|e| Error::ConfigLoad {
        path: path.to_path_buf(),
        source: Box::new(e),
    })?;

    // Handle empty file
    if contents.trim().is_empty() {
        debug!("Settings file is empty, using defaults");
        return Ok(ListingSettings::default());
    }

    let settings = ListingSettings::from_json_sanitized(&contents).map_err(|e| {
        warn!(
            "Settings file at {} contains invalid JSON: {}",
            path.display(),
            e
        );
        Error::ConfigParse {
            message: format!("Failed to parse settings file: {}", e),
            source: Some(Box::new(e)),
        }
    })?;

    info!("Settings loaded from {}", path.display());
    Ok(settings)
}

// ─────────────────────────────────────────────────────────────────────────────
// Save Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Write settings as pretty JSON, creating parent directories.
///
/// Writes to a sibling `.bak` file first and renames it over the target so a
/// crash never leaves a half-written settings file.
pub fn save_settings_file(path: &Path, settings: &ListingSettings) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| Error::WriteFailed {
            path: dir.to_path_buf(),
            source: e,
        })?;
    }

    let json = serde_json::to_string_pretty(settings)?;
    let backup_path = path.with_extension(BACKUP_SUFFIX);

    fs::write(&backup_path, &json).map_err(|e| Error::WriteFailed {
        path: backup_path.clone(),
        source: e,
    })?;
    fs::rename(&backup_path, path).map_err(|e| Error::WriteFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    info!("Settings saved to {}", path.display());
    Ok(())
}

/// Write the settings file of a workspace.
pub fn save_workspace_settings(workspace_root: &Path, settings: &ListingSettings) -> Result<PathBuf> {
    let path = workspace_settings_path(workspace_root);
    save_settings_file(&path, settings)?;
    Ok(path)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
