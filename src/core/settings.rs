//! # Settings
//!
//! Knobs for the directory walk, read from an optional `settings.toml`. A missing file is
//! not an error; it simply means the defaults, which reproduce a plain recursive walk.
//!
//! ```toml
//! follow_links = false
//! max_depth = 6
//! skip_hidden = true
//! ```

use crate::core::paths::{self, PathError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Controls how the Projectfile tree is discovered.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Descend into symlinked directories.
    pub follow_links: bool,
    /// Maximum depth below the root to search. `None` means unbounded.
    pub max_depth: Option<usize>,
    /// Skip directories whose name starts with a dot (`.git`, `.cache`, ...).
    pub skip_hidden: bool,
}

/// Represents errors that can occur while loading `settings.toml`.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings file at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse settings file at '{path}': {source}")]
    TomlParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error(transparent)]
    Path(#[from] PathError),
}

impl Settings {
    /// Loads settings from `path`. A file that does not exist yields the defaults.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        if !path.is_file() {
            log::debug!(
                "No settings file at '{}', using defaults.",
                path.display()
            );
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Self = toml::from_str(&content).map_err(|source| SettingsError::TomlParse {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loaded settings from '{}': {:?}", path.display(), settings);
        Ok(settings)
    }

    /// Loads settings from a user-provided path template (`~` and `$VAR` are expanded).
    pub fn load_from(template: &str) -> Result<Self, SettingsError> {
        Self::load(&paths::expand_path(template)?)
    }

    /// Loads settings from the default location (`<config dir>/projects/settings.toml`).
    /// A system without a config directory gets the defaults, like a missing file.
    pub fn load_default() -> Result<Self, SettingsError> {
        Self::load_located(paths::get_default_settings_path())
    }

    fn load_located(location: Result<PathBuf, PathError>) -> Result<Self, SettingsError> {
        match location {
            Ok(path) => Self::load(&path),
            Err(PathError::ConfigDirNotFound) => {
                log::debug!("No system config directory, using default settings.");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }
}
