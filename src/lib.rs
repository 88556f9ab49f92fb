//! # projectfile
//!
//! Reads `Projectfile`s scattered across a directory tree and turns them into one table of
//! runnable commands.
//!
//! ```text
//! walker -> processing_tree (parser, line_classifier) -> aggregator -> flattener
//! ```
//!
//! [`load`] runs the whole pipeline. The stages are public for callers that need the
//! intermediate forms, e.g. [`core::aggregator::aggregate`] for the merged but unflattened
//! scope tree.

pub mod cli;
pub mod constants;
pub mod core;
pub mod error;
pub mod models;

pub use crate::core::settings::Settings;
pub use crate::error::{ErrorKind, NameOwner, ProjectfileError};
pub use crate::models::{ResolvedCommand, ResolvedProject, Script, Version};

use crate::core::{aggregator, flattener, processing_tree, walker};
use std::path::Path;

/// Loads the Projectfile tree rooted at `root` with the default walk settings.
pub fn load(root: &Path) -> Result<ResolvedProject, ProjectfileError> {
    load_with(root, &Settings::default())
}

/// Loads the Projectfile tree rooted at `root`.
///
/// The root is canonicalised first, so every directory path in the result (and in the
/// `cd` lines of the scripts) is absolute. The filesystem is only read.
///
/// # Arguments
///
/// * `root` - The top directory of the tree.
/// * `settings` - Walk options.
///
/// # Returns
///
/// The resolved project, or the first error found, with its file path and line when known.
pub fn load_with(root: &Path, settings: &Settings) -> Result<ResolvedProject, ProjectfileError> {
    let root = dunce::canonicalize(root)
        .map_err(|e| ProjectfileError::from(ErrorKind::Io(e)).with_path(root))?;

    let sources = walker::collect(&root, settings)?;
    let tree = processing_tree::build(sources)?;
    let data = aggregator::aggregate(&tree)?;
    Ok(flattener::resolve(data))
}
