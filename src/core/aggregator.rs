//! # Aggregator
//!
//! Merges the per-directory parse results of a processing tree into one [`AggregatedData`].
//!
//! Nodes are visited depth first, in sibling order. For each node, in this order:
//!
//! 1. its commands are merged into the global command table,
//! 2. the global minimum version is lowered if needed,
//! 3. its variables are added (a name defined twice in the tree is an error),
//! 4. its description is appended to the global description.
//!
//! ## Scope slots
//!
//! A command defined in several directories keeps one *slot* per directory, nested the way
//! the directories nest, so the flattener can wrap a child directory's script inside its
//! parent's pre/post script. Slots live in a [`SlotArena`] and are addressed by index.
//! Each command keeps a stack of open slots: before a new slot is placed, every open slot
//! that is not an ancestor directory of the new one is popped (its subtree has been fully
//! walked). The new slot becomes a child of what remains on top, or a new root.

use crate::{
    core::line_classifier::sort_longest_first,
    error::{ErrorKind, NameOwner, ProjectfileError},
    models::{
        AggregatedCommand, AggregatedData, CommandFragment, CommandTree, DirEntry, ParseResult,
        PrimaryCommand, ProcessingNode, Variable,
    },
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

type SlotId = usize;

/// One directory's contribution to one command.
#[derive(Debug)]
struct Slot {
    path: PathBuf,
    pre: Vec<String>,
    post: Vec<String>,
    children: Vec<SlotId>,
}

/// Owns every slot of every command.
#[derive(Debug, Default)]
struct SlotArena {
    slots: Vec<Slot>,
}

impl SlotArena {
    fn insert(&mut self, path: &Path, pre: Vec<String>, post: Vec<String>) -> SlotId {
        self.slots.push(Slot {
            path: path.to_path_buf(),
            pre,
            post,
            children: Vec::new(),
        });
        self.slots.len() - 1
    }

    fn get(&self, id: SlotId) -> Option<&Slot> {
        self.slots.get(id)
    }

    fn attach(&mut self, parent: SlotId, child: SlotId) {
        if let Some(slot) = self.slots.get_mut(parent) {
            slot.children.push(child);
        }
    }

    /// Copies a slot and its descendants out of the arena.
    fn to_dir_entry(&self, id: SlotId) -> Option<DirEntry> {
        let slot = self.get(id)?;
        Some(DirEntry {
            path: slot.path.clone(),
            pre: slot.pre.clone(),
            post: slot.post.clone(),
            children: slot
                .children
                .iter()
                .filter_map(|&child| self.to_dir_entry(child))
                .collect(),
        })
    }
}

/// A command being accumulated across the tree.
#[derive(Debug)]
struct CommandBuilder {
    /// The first directory that defined the command, for error reporting.
    origin: PathBuf,
    description: Option<String>,
    dependencies: Vec<String>,
    alternatives: Vec<String>,
    roots: Vec<SlotId>,
    open_slots: Vec<SlotId>,
}

impl CommandBuilder {
    fn new(origin: &Path) -> Self {
        Self {
            origin: origin.to_path_buf(),
            description: None,
            dependencies: Vec::new(),
            alternatives: Vec::new(),
            roots: Vec::new(),
            open_slots: Vec::new(),
        }
    }

    /// Places a new slot for `path`, nested under the closest open ancestor slot.
    fn place_slot(&mut self, arena: &mut SlotArena, path: &Path, command: &PrimaryCommand) {
        while let Some(&top) = self.open_slots.last() {
            let is_ancestor = arena
                .get(top)
                .is_some_and(|slot| path != slot.path && path.starts_with(&slot.path));
            if is_ancestor {
                break;
            }
            self.open_slots.pop();
        }

        let id = arena.insert(path, command.pre.clone(), command.post.clone());
        match self.open_slots.last() {
            Some(&parent) => arena.attach(parent, id),
            None => self.roots.push(id),
        }
        self.open_slots.push(id);
    }

    fn merge_metadata(&mut self, command: &PrimaryCommand) {
        if let Some(description) = &command.description {
            join_paragraphs(&mut self.description, description);
        }
        for dependency in &command.dependencies {
            if !self.dependencies.contains(dependency) {
                self.dependencies.push(dependency.clone());
            }
        }
        let before = self.alternatives.len();
        for alternative in &command.alternatives {
            if !self.alternatives.contains(alternative) {
                self.alternatives.push(alternative.clone());
            }
        }
        if self.alternatives.len() != before {
            sort_longest_first(&mut self.alternatives);
        }
    }
}

#[derive(Debug)]
enum Entry {
    Alias(String),
    Command(CommandBuilder),
}

/// Appends `text` to `target`, separated from existing text by a blank line.
pub fn join_paragraphs(target: &mut Option<String>, text: &str) {
    match target {
        Some(existing) => {
            existing.push_str("\n\n");
            existing.push_str(text);
        }
        None => *target = Some(text.to_string()),
    }
}

/// Accumulates processing tree nodes into one command table.
#[derive(Debug, Default)]
pub struct Aggregator {
    arena: SlotArena,
    commands: BTreeMap<String, Entry>,
    min_version: Option<crate::models::Version>,
    description: Option<String>,
    variables: BTreeMap<String, Variable>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges `node` and then, recursively, its children.
    pub fn visit(&mut self, node: &ProcessingNode) -> Result<(), ProjectfileError> {
        self.merge_node(&node.path, &node.data)
            .map_err(|kind| ProjectfileError::from(kind).with_path(&node.path))?;
        for child in &node.children {
            self.visit(child)?;
        }
        Ok(())
    }

    fn merge_node(&mut self, path: &Path, data: &ParseResult) -> Result<(), ErrorKind> {
        log::trace!("Merging '{}'", path.display());

        for (name, fragment) in &data.commands {
            match fragment {
                CommandFragment::Alias { alias } => self.merge_alias(name, alias)?,
                CommandFragment::Primary(command) => self.merge_primary(path, name, command)?,
            }
        }

        self.min_version = Some(match self.min_version.take() {
            Some(current) => current.min(data.min_version.clone()),
            None => data.min_version.clone(),
        });

        for (name, value) in &data.variables {
            if let Some(existing) = self.variables.get(name) {
                return Err(ErrorKind::VariableRedefined {
                    name: name.clone(),
                    path: path.to_path_buf(),
                    original_path: existing.origin.clone(),
                });
            }
            self.variables.insert(
                name.clone(),
                Variable {
                    value: value.clone(),
                    origin: path.to_path_buf(),
                },
            );
        }

        if let Some(description) = &data.description {
            join_paragraphs(&mut self.description, description);
        }
        Ok(())
    }

    fn merge_alias(&mut self, name: &str, target: &str) -> Result<(), ErrorKind> {
        match self.commands.get(name) {
            None => {
                self.commands
                    .insert(name.to_string(), Entry::Alias(target.to_string()));
                Ok(())
            }
            Some(Entry::Alias(existing)) if existing == target => Ok(()),
            Some(Entry::Alias(existing)) => Err(ErrorKind::ProjectfileAlternativeRedefined {
                alternative: name.to_string(),
                claimed_as: NameOwner::AlternativeOf(target.to_string()),
                existing: NameOwner::AlternativeOf(existing.clone()),
            }),
            Some(Entry::Command(_)) => Err(ErrorKind::ProjectfileAlternativeRedefined {
                alternative: name.to_string(),
                claimed_as: NameOwner::AlternativeOf(target.to_string()),
                existing: NameOwner::Command,
            }),
        }
    }

    fn merge_primary(
        &mut self,
        path: &Path,
        name: &str,
        command: &PrimaryCommand,
    ) -> Result<(), ErrorKind> {
        let arena = &mut self.arena;
        let entry = self
            .commands
            .entry(name.to_string())
            .or_insert_with(|| Entry::Command(CommandBuilder::new(path)));

        match entry {
            Entry::Alias(existing) => Err(ErrorKind::ProjectfileAlternativeRedefined {
                alternative: name.to_string(),
                claimed_as: NameOwner::Command,
                existing: NameOwner::AlternativeOf(existing.clone()),
            }),
            Entry::Command(builder) => {
                builder.place_slot(arena, path, command);
                builder.merge_metadata(command);
                Ok(())
            }
        }
    }

    /// Checks that every dependency names a known command or alternative.
    fn check_dependencies(&self) -> Result<(), ProjectfileError> {
        for (name, entry) in &self.commands {
            let Entry::Command(builder) = entry else {
                continue;
            };
            if let Some(missing) = builder
                .dependencies
                .iter()
                .find(|dep| !self.commands.contains_key(dep.as_str()))
            {
                return Err(ProjectfileError::from(ErrorKind::ProjectfileInvalidDependency {
                    dependency: missing.clone(),
                    command: name.clone(),
                })
                .with_path(&builder.origin));
            }
        }
        Ok(())
    }

    /// Runs the tree-wide dependency check and drops the scope bookkeeping.
    pub fn finish(self) -> Result<AggregatedData, ProjectfileError> {
        self.check_dependencies()?;

        let arena = self.arena;
        let commands = self
            .commands
            .into_iter()
            .map(|(name, entry)| {
                let command = match entry {
                    Entry::Alias(alias) => AggregatedCommand::Alias { alias },
                    Entry::Command(builder) => AggregatedCommand::Primary(CommandTree {
                        description: builder.description,
                        dependencies: builder.dependencies,
                        alternatives: builder.alternatives,
                        root: builder
                            .roots
                            .iter()
                            .filter_map(|&id| arena.to_dir_entry(id))
                            .collect(),
                    }),
                };
                (name, command)
            })
            .collect();

        Ok(AggregatedData {
            min_version: self.min_version,
            description: self.description,
            variables: self.variables,
            commands,
        })
    }
}

/// Merges a whole processing tree (one or more roots, in traversal order).
pub fn aggregate(roots: &[ProcessingNode]) -> Result<AggregatedData, ProjectfileError> {
    let mut aggregator = Aggregator::new();
    for root in roots {
        aggregator.visit(root)?;
    }
    let data = aggregator.finish()?;
    log::debug!(
        "Aggregated {} command entries and {} variables",
        data.commands.len(),
        data.variables.len()
    );
    Ok(data)
}
