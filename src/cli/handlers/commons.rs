// src/cli/handlers/commons.rs

use crate::{ResolvedProject, Settings};
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

/// Resolves the directory argument shared by every action. Defaults to the current directory.
pub fn resolve_root(path: Option<PathBuf>) -> Result<PathBuf> {
    match path {
        Some(path) => Ok(path),
        None => env::current_dir().context("Could not determine the current directory"),
    }
}

/// Runs the full pipeline for the directory argument.
pub fn load_project(path: Option<PathBuf>, settings: &Settings) -> Result<(PathBuf, ResolvedProject)> {
    let root = resolve_root(path)?;
    log::debug!("Loading Projectfile tree at '{}'", root.display());
    let project = crate::load_with(&root, settings)?;
    Ok((root, project))
}
