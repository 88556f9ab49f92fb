//! # Errors
//!
//! Every failure in the pipeline is reported as a [`ProjectfileError`]: one machine-readable
//! [`ErrorKind`] plus the context that was known where it surfaced.
//!
//! Line-level failures start out as a bare `ErrorKind`. The per-line driver in
//! [`crate::core::parser`] attaches the 1-based line number, and the tree builder attaches
//! the directory path. Aggregation failures only ever carry a path.

use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// What a name in the merged command table is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameOwner {
    /// A command with its own script.
    Command,
    /// An alternative name of the given command.
    AlternativeOf(String),
}

impl fmt::Display for NameOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Command => write!(f, "a command"),
            Self::AlternativeOf(command) => write!(f, "an alternative of '{}'", command),
        }
    }
}

/// The catalog of everything that can go wrong while reading a Projectfile tree.
#[derive(Error, Debug)]
pub enum ErrorKind {
    // --- Version line ---
    /// The version line starts with whitespace.
    #[error("The version declaration must not be indented.")]
    VersionIndentation,
    /// A `from` line that does not carry a `MAJOR.MINOR.PATCH` version.
    #[error("Invalid version declaration. Expected 'from vMAJOR.MINOR.PATCH'.")]
    VersionFormat,
    /// The first meaningful line is not a version declaration.
    #[error("The first line of a Projectfile must be a version declaration ('from vX.Y.Z').")]
    VersionMissing,

    // --- Comment blocks ---
    /// A `"""` line in a position where no description block may start.
    #[error("Unexpected comment delimiter. Descriptions must precede variables and commands.")]
    CommentDelimiterUnexpected,

    // --- Variables ---
    /// A variable assignment starts with whitespace.
    #[error("Variable assignments must not be indented.")]
    VariableIndentation,
    /// The value's opening and closing quotes do not pair up.
    #[error("Unbalanced quotes in the value of variable '{name}'.")]
    VariableQuoteMismatch {
        /// The variable being assigned.
        name: String,
    },
    /// Unexpected text after a quoted value.
    #[error("Unexpected text after the value of variable '{name}'.")]
    VariableSyntax {
        /// The variable being assigned.
        name: String,
    },
    /// The assignment has no value.
    #[error("Variable '{name}' has no value.")]
    VariableValueMissing {
        /// The variable being assigned.
        name: String,
    },
    /// The same variable name appears in two Projectfiles of one tree.
    #[error("Variable '{name}' in '{}' is already defined in '{}'.", .path.display(), .original_path.display())]
    VariableRedefined {
        /// The variable name.
        name: String,
        /// The directory that redefines it.
        path: PathBuf,
        /// The directory that defined it first.
        original_path: PathBuf,
    },

    // --- Command headers ---
    /// A command header starts with whitespace.
    #[error("Command headers must not be indented.")]
    CommandHeaderIndentation,
    /// A line that should have been a command header is not one.
    #[error("Invalid command header. Expected 'name(|alternative)*: [dependency, ...]'.")]
    CommandHeaderSyntax,
    /// `name||other:` or `name|:`.
    #[error("Empty alternative name in the command header.")]
    CommandHeaderEmptyAlternative,
    /// `name: []`.
    #[error("Empty dependency list. Remove the brackets if the command has no dependencies.")]
    CommandHeaderEmptyDependencyList,
    /// `name: [a,,b]` and friends.
    #[error("Invalid dependency list. Expected comma separated command names.")]
    CommandHeaderInvalidDependencyList,
    /// `name: [a, b`.
    #[error("Missing closing bracket in the dependency list.")]
    CommandHeaderMissingClosingBracket,
    /// `name: [a # comment ]`.
    #[error("Comments are not allowed inside the dependency list.")]
    CommandHeaderCommentInDependencyList,
    /// The header names a command the dispatcher reserves for itself.
    #[error("The command name '{name}' is reserved and cannot be used.")]
    CommandHeaderDisabledName {
        /// The reserved name.
        name: String,
    },
    /// An unindented line where the body of a command was expected.
    #[error("Unexpected unindented line. Command bodies must be indented.")]
    CommandHeaderUnexpectedUnindented,
    /// A header reuses a name that the same Projectfile has already declared.
    #[error("The command name '{name}' is already declared in this Projectfile.")]
    CommandHeaderRedefined {
        /// The colliding name.
        name: String,
    },
    /// A second `===` divisor inside one command.
    #[error("Unexpected command divisor. A command can only have one pre/post divisor.")]
    CommandDelimiterUnexpected,

    // --- File level ---
    /// The Projectfile holds nothing at all.
    #[error("The Projectfile is empty.")]
    ProjectfileEmpty,
    /// The Projectfile ends before declaring any command.
    #[error("The Projectfile does not declare any command.")]
    ProjectfileNoCommand,
    /// The Projectfile ends right after a command header.
    #[error("Command '{command}' has no body.")]
    ProjectfileNoCommandInCommand {
        /// The command left without a body.
        command: String,
    },
    /// A dependency names a command that does not exist.
    #[error("Command '{command}' depends on '{dependency}', which is not defined.")]
    ProjectfileInvalidDependency {
        /// The missing dependency.
        dependency: String,
        /// The command declaring it.
        command: String,
    },
    /// A name is bound twice in the tree, in two incompatible ways.
    #[error("The name '{alternative}' is declared as {claimed_as}, but it is already {existing}.")]
    ProjectfileAlternativeRedefined {
        /// The contested name.
        alternative: String,
        /// The binding that was rejected.
        claimed_as: NameOwner,
        /// The binding that was there first.
        existing: NameOwner,
    },
    /// No Projectfile was found anywhere below the root.
    #[error("No Projectfile found under '{}'.", .path.display())]
    ProjectfileNoProjectfile {
        /// The root that was searched.
        path: PathBuf,
    },

    // --- Collaborators ---
    /// A Projectfile could not be read.
    #[error("I/O error while reading a Projectfile: {0}")]
    Io(#[from] std::io::Error),
    /// The directory walk failed.
    #[error("Failed to walk the directory tree: {0}")]
    Walk(#[from] walkdir::Error),
}

impl ErrorKind {
    /// Returns the stable, machine-readable identifier of this kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::VersionIndentation => "VersionIndentation",
            Self::VersionFormat => "VersionFormat",
            Self::VersionMissing => "VersionMissing",
            Self::CommentDelimiterUnexpected => "CommentDelimiterUnexpected",
            Self::VariableIndentation => "VariableIndentation",
            Self::VariableQuoteMismatch { .. } => "VariableQuoteMismatch",
            Self::VariableSyntax { .. } => "VariableSyntax",
            Self::VariableValueMissing { .. } => "VariableValueMissing",
            Self::VariableRedefined { .. } => "VariableRedefined",
            Self::CommandHeaderIndentation => "CommandHeaderIndentation",
            Self::CommandHeaderSyntax => "CommandHeaderSyntax",
            Self::CommandHeaderEmptyAlternative => "CommandHeaderEmptyAlternative",
            Self::CommandHeaderEmptyDependencyList => "CommandHeaderEmptyDependencyList",
            Self::CommandHeaderInvalidDependencyList => "CommandHeaderInvalidDependencyList",
            Self::CommandHeaderMissingClosingBracket => "CommandHeaderMissingClosingBracket",
            Self::CommandHeaderCommentInDependencyList => "CommandHeaderCommentInDependencyList",
            Self::CommandHeaderDisabledName { .. } => "CommandHeaderDisabledName",
            Self::CommandHeaderUnexpectedUnindented => "CommandHeaderUnexpectedUnindented",
            Self::CommandHeaderRedefined { .. } => "CommandHeaderRedefined",
            Self::CommandDelimiterUnexpected => "CommandDelimiterUnexpected",
            Self::ProjectfileEmpty => "ProjectfileEmpty",
            Self::ProjectfileNoCommand => "ProjectfileNoCommand",
            Self::ProjectfileNoCommandInCommand { .. } => "ProjectfileNoCommandInCommand",
            Self::ProjectfileInvalidDependency { .. } => "ProjectfileInvalidDependency",
            Self::ProjectfileAlternativeRedefined { .. } => "ProjectfileAlternativeRedefined",
            Self::ProjectfileNoProjectfile { .. } => "ProjectfileNoProjectfile",
            Self::Io(_) => "Io",
            Self::Walk(_) => "Walk",
        }
    }
}

/// The structured error returned by every public operation of this crate.
#[derive(Debug)]
pub struct ProjectfileError {
    /// What went wrong.
    pub kind: ErrorKind,
    /// The 1-based line number, when the failure comes from a single line.
    pub line: Option<usize>,
    /// The directory whose Projectfile (or whose merge) failed.
    pub path: Option<PathBuf>,
}

impl ProjectfileError {
    /// Wraps a line-level failure with its 1-based line number.
    pub fn at_line(kind: ErrorKind, line: usize) -> Self {
        Self {
            kind,
            line: Some(line),
            path: None,
        }
    }

    /// Attaches the directory path, keeping a path that is already set.
    pub fn with_path(mut self, path: &Path) -> Self {
        if self.path.is_none() {
            self.path = Some(path.to_path_buf());
        }
        self
    }

    /// Shorthand for [`ErrorKind::code`].
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }
}

impl From<ErrorKind> for ProjectfileError {
    fn from(kind: ErrorKind) -> Self {
        Self {
            kind,
            line: None,
            path: None,
        }
    }
}

impl fmt::Display for ProjectfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.path, self.line) {
            (Some(path), Some(line)) => write!(f, "{}, line {}: ", path.display(), line)?,
            (Some(path), None) => write!(f, "{}: ", path.display())?,
            (None, Some(line)) => write!(f, "line {}: ", line)?,
            (None, None) => {}
        }
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for ProjectfileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}
