//! Configuration loading from and saving to the file system
//!
//! Settings live in `<config_dir>/copypaste/settings.json`.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

use super::defaults::{APP_DIR_NAME, DATABASE_FILE_NAME, SETTINGS_FILE_NAME};
use super::types::Config;
use crate::error::{CopyPasteError, Result};

/// Default settings path (`<config_dir>/copypaste/settings.json`)
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR_NAME)
        .join(SETTINGS_FILE_NAME)
}

/// Default history database path (`<data_local_dir>/copypaste/history.sqlite`)
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR_NAME)
        .join(DATABASE_FILE_NAME)
}

/// Load configuration from `path`.
///
/// - Missing file: defaults.
/// - Unreadable or malformed file: the file is moved aside to
///   `<stem>.broken.json` (so the next save does not clobber the user's
///   edits) and defaults are returned.
#[instrument(name = "load_config", skip_all, fields(path = %path.display()))]
pub fn load_config(path: &Path) -> Config {
    if !path.exists() {
        info!("Config file not found, using defaults");
        return Config::default();
    }

    match read_config(path) {
        Ok(config) => {
            info!("Successfully loaded config");
            config
        }
        Err(e) => {
            let backup = path.with_extension("broken.json");
            warn!(
                error = %e,
                backup = %backup.display(),
                "Failed to load config, moving it aside and using defaults"
            );
            if let Err(rename_err) = fs::rename(path, &backup) {
                warn!(error = %rename_err, "Failed to move broken config aside");
            }
            Config::default()
        }
    }
}

fn read_config(path: &Path) -> Result<Config> {
    let raw = fs::read_to_string(path).map_err(|source| CopyPasteError::ConfigIo {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str::<Config>(&raw)?)
}

/// Write configuration atomically (temp sibling + rename).
pub fn save_config(path: &Path, config: &Config) -> Result<()> {
    let io_err = |source| CopyPasteError::ConfigIo {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let json = serde_json::to_string_pretty(config)?;
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, json).map_err(io_err)?;
    fs::rename(&tmp, path).map_err(io_err)?;

    info!(path = %path.display(), "Saved config");
    Ok(())
}
