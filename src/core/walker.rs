//! # Tree Walker
//!
//! Finds every Projectfile below a root directory and loads it as a list of lines.
//!
//! Siblings are visited in file-name order and every directory is yielded before its
//! contents, so the result is a deterministic pre-order listing. The processing tree
//! builder relies on that order.

use crate::{
    constants::PROJECTFILE_NAME,
    core::settings::Settings,
    error::{ErrorKind, ProjectfileError},
};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// One Projectfile found during the walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectfileSource {
    /// The directory containing the Projectfile.
    pub path: PathBuf,
    /// The file content, split on newlines.
    pub lines: Vec<String>,
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

/// Walks `root` and loads every Projectfile found, in pre-order.
///
/// Directories without a Projectfile are skipped, but their subdirectories are still visited.
///
/// # Arguments
///
/// * `root` - The directory to search.
/// * `settings` - Walk options (symlinks, depth limit, hidden directories).
///
/// # Errors
///
/// `ProjectfileNoProjectfile` if nothing was found, `Walk` / `Io` if the tree or a file
/// could not be read.
pub fn collect(root: &Path, settings: &Settings) -> Result<Vec<ProjectfileSource>, ProjectfileError> {
    log::debug!("Searching for Projectfiles under '{}'", root.display());

    let mut walker = WalkDir::new(root)
        .follow_links(settings.follow_links)
        .sort_by_file_name();
    if let Some(depth) = settings.max_depth {
        walker = walker.max_depth(depth);
    }

    let skip_hidden = settings.skip_hidden;
    let mut sources = Vec::new();
    for entry in walker
        .into_iter()
        .filter_entry(|entry| !(skip_hidden && is_hidden(entry)))
    {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            ProjectfileError::from(ErrorKind::Walk(e)).with_path(&path)
        })?;
        if !entry.file_type().is_dir() {
            continue;
        }

        let candidate = entry.path().join(PROJECTFILE_NAME);
        if !candidate.is_file() {
            continue;
        }

        let content = fs::read_to_string(&candidate)
            .map_err(|e| ProjectfileError::from(ErrorKind::Io(e)).with_path(entry.path()))?;
        log::trace!(
            "Loaded '{}' ({} lines)",
            candidate.display(),
            content.lines().count()
        );
        sources.push(ProjectfileSource {
            path: entry.path().to_path_buf(),
            lines: content.lines().map(str::to_string).collect(),
        });
    }

    if sources.is_empty() {
        return Err(ErrorKind::ProjectfileNoProjectfile {
            path: root.to_path_buf(),
        }
        .into());
    }
    log::debug!("Found {} Projectfile(s)", sources.len());
    Ok(sources)
}
