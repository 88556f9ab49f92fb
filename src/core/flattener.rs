//! # Script Flattener
//!
//! Turns each command's nested per-directory entries into one linear script, bracketed with
//! `cd <path>` markers, then substitutes global variables.
//!
//! An entry renders as: a marker for its directory, its `pre` lines, each child in order,
//! and, when it has `post` lines, a marker back to its directory followed by those lines.
//! The emitter keeps the directory it is currently in, so redundant markers never appear:
//!
//! * a marker for the directory it is already in is skipped,
//! * a marker directly after another marker replaces it,
//! * a marker at the very end of the script is dropped.

use crate::{
    constants::CD_MARKER_PREFIX,
    core::interpolator::Interpolator,
    models::{
        AggregatedCommand, AggregatedData, DirEntry, ResolvedCommand, ResolvedProject, Script,
    },
};
use std::path::{Path, PathBuf};

/// A `cd` marker that has not been followed by a script line yet.
#[derive(Debug)]
struct PendingMarker {
    /// The directory the emitter was in before the marker.
    previous: Option<PathBuf>,
}

#[derive(Debug, Default)]
struct ScriptEmitter {
    lines: Vec<String>,
    cwd: Option<PathBuf>,
    pending: Option<PendingMarker>,
}

impl ScriptEmitter {
    fn change_dir(&mut self, path: &Path) {
        if self.cwd.as_deref() == Some(path) {
            return;
        }
        if let Some(marker) = self.pending.take() {
            self.lines.pop();
            self.cwd = marker.previous;
            if self.cwd.as_deref() == Some(path) {
                return;
            }
        }
        self.lines
            .push(format!("{}{}", CD_MARKER_PREFIX, path.display()));
        self.pending = Some(PendingMarker {
            previous: self.cwd.replace(path.to_path_buf()),
        });
    }

    fn push_lines(&mut self, lines: &[String]) {
        if lines.is_empty() {
            return;
        }
        self.pending = None;
        self.lines.extend(lines.iter().cloned());
    }

    fn render(&mut self, entry: &DirEntry) {
        self.change_dir(&entry.path);
        self.push_lines(&entry.pre);
        for child in &entry.children {
            self.render(child);
        }
        if !entry.post.is_empty() {
            self.change_dir(&entry.path);
            self.push_lines(&entry.post);
        }
    }

    fn finish(mut self) -> Vec<String> {
        if self.pending.is_some() {
            self.lines.pop();
        }
        self.lines
    }
}

/// Renders a command's top-level entries, in order, into one flat script.
pub fn flatten(root: &[DirEntry]) -> Vec<String> {
    let mut emitter = ScriptEmitter::default();
    for entry in root {
        emitter.render(entry);
    }
    emitter.finish()
}

/// Flattens every command and substitutes variables. The variable table is consumed.
///
/// # Arguments
///
/// * `data` - The merged tree, as returned by the aggregator.
///
/// # Returns
///
/// The project as the executor sees it: aliases untouched, one flat script per command.
pub fn resolve(data: AggregatedData) -> ResolvedProject {
    let interpolator = Interpolator::new(&data.variables);

    let commands = data
        .commands
        .into_iter()
        .map(|(name, command)| {
            let resolved = match command {
                AggregatedCommand::Alias { alias } => ResolvedCommand::Alias { alias },
                AggregatedCommand::Primary(tree) => {
                    let script = flatten(&tree.root)
                        .iter()
                        .map(|line| interpolator.expand(line))
                        .collect();
                    log::trace!("Flattened '{}'", name);
                    ResolvedCommand::Script(Script {
                        description: interpolator.expand_opt(tree.description),
                        dependencies: tree.dependencies,
                        alternatives: tree.alternatives,
                        script,
                    })
                }
            };
            (name, resolved)
        })
        .collect();

    ResolvedProject {
        min_version: data.min_version,
        description: interpolator.expand_opt(data.description),
        commands,
    }
}
