// src/core/paths.rs

use crate::constants::{SETTINGS_DIR, SETTINGS_FILENAME};
use lazy_static::lazy_static;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

lazy_static! {
    static ref SETTINGS_DIR_CACHE: Mutex<Option<PathBuf>> = Mutex::new(None);
}

#[derive(Error, Debug)]
pub enum PathError {
    #[error("Could not find system config directory.")]
    ConfigDirNotFound,
    #[error("Could not expand path '{template}': {message}")]
    Expansion { template: String, message: String },
}

/// Returns the directory holding the user-level settings (`~/.config/projects`).
///
/// The directory is only located, never created: reading a Projectfile tree must not
/// touch the filesystem. The result is memoized.
pub fn get_settings_dir() -> Result<PathBuf, PathError> {
    let mut cached = SETTINGS_DIR_CACHE
        .lock()
        .unwrap_or_else(PoisonError::into_inner);

    if let Some(path) = &*cached {
        return Ok(path.clone());
    }

    let dir = dirs::config_dir()
        .ok_or(PathError::ConfigDirNotFound)?
        .join(SETTINGS_DIR);
    log::trace!("Settings directory resolved to '{}'", dir.display());

    *cached = Some(dir.clone());
    Ok(dir)
}

/// Returns the path of the default `settings.toml`.
pub fn get_default_settings_path() -> Result<PathBuf, PathError> {
    get_settings_dir().map(|dir| dir.join(SETTINGS_FILENAME))
}

/// Expands `~` and environment variables (`$VAR`, `${VAR}`) in a user-provided path.
///
/// # Errors
/// Returns `PathError::Expansion` when a referenced environment variable is not set.
pub fn expand_path(template: &str) -> Result<PathBuf, PathError> {
    let expanded = shellexpand::full(template).map_err(|e| PathError::Expansion {
        template: template.to_string(),
        message: e.to_string(),
    })?;
    Ok(PathBuf::from(expanded.into_owned()))
}
