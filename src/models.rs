// src/models.rs

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

// --- VERSION ---

/// One component of a version: a non-negative integer of any length.
///
/// Stored as its decimal digits without leading zeros, so equal numbers compare equal and a
/// longer digit string is always the larger number.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct VersionNumber(String);

impl VersionNumber {
    /// Parses a run of ASCII digits. Anything else (including an empty string) is `None`.
    pub fn parse(digits: &str) -> Option<Self> {
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let trimmed = digits.trim_start_matches('0');
        Some(Self(if trimmed.is_empty() {
            "0".to_string()
        } else {
            trimmed.to_string()
        }))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for VersionNumber {
    fn default() -> Self {
        Self("0".to_string())
    }
}

impl From<u64> for VersionNumber {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl Ord for VersionNumber {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for VersionNumber {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for VersionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A `MAJOR.MINOR.PATCH` triple, as declared by a `from vX.Y.Z` line.
/// Ordering is the usual triple comparison, major first.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Version {
    pub major: VersionNumber,
    pub minor: VersionNumber,
    pub patch: VersionNumber,
}

impl Version {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major: major.into(),
            minor: minor.into(),
            patch: patch.into(),
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}.{}.{}", self.major, self.minor, self.patch)
    }
}

// --- SINGLE FILE MODELS (what one Projectfile parses into) ---

/// A command defined with a body in one Projectfile.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct PrimaryCommand {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
    /// Alternative names, longest first.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pre: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub post: Vec<String>,
}

/// One entry of a Projectfile's command table.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum CommandFragment {
    /// An alternative name. Carries nothing but the canonical command it points at.
    Alias { alias: String },
    Primary(PrimaryCommand),
}

impl CommandFragment {
    pub fn as_primary(&self) -> Option<&PrimaryCommand> {
        match self {
            Self::Primary(cmd) => Some(cmd),
            Self::Alias { .. } => None,
        }
    }
}

/// The parsed content of one Projectfile.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct ParseResult {
    pub min_version: Version,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub variables: BTreeMap<String, String>,
    pub commands: BTreeMap<String, CommandFragment>,
}

// --- PROCESSING TREE ---

/// A directory holding a Projectfile, nested under its closest ancestor that also holds one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingNode {
    pub path: PathBuf,
    pub data: ParseResult,
    pub children: Vec<ProcessingNode>,
}

// --- AGGREGATED MODELS (the whole tree merged) ---

/// A variable together with the directory that defined it.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub value: String,
    pub origin: PathBuf,
}

/// One directory's contribution to a command, nested the way the directories nest.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct DirEntry {
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pre: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub post: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DirEntry>,
}

/// A command merged across every directory that defines it.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandTree {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<String>,
    /// Top-level directory entries, in traversal order.
    pub root: Vec<DirEntry>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum AggregatedCommand {
    Alias { alias: String },
    Primary(CommandTree),
}

/// The merge of every Projectfile in a tree, before flattening.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct AggregatedData {
    /// Smallest version declared anywhere. `None` only for an empty tree.
    pub min_version: Option<Version>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub variables: BTreeMap<String, Variable>,
    pub commands: BTreeMap<String, AggregatedCommand>,
}

// --- RESOLVED MODELS (handed to the executor) ---

/// A command ready to run: one flat list of shell lines.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Script {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<String>,
    pub script: Vec<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum ResolvedCommand {
    Alias { alias: String },
    Script(Script),
}

/// The terminal artifact of the pipeline.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolvedProject {
    pub min_version: Option<Version>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub commands: BTreeMap<String, ResolvedCommand>,
}

impl ResolvedProject {
    /// Looks up a command by name or alternative name.
    /// Returns the canonical name along with its script.
    pub fn find(&self, name: &str) -> Option<(&str, &Script)> {
        let (canonical, entry) = self.commands.get_key_value(name)?;
        match entry {
            ResolvedCommand::Script(script) => Some((canonical.as_str(), script)),
            ResolvedCommand::Alias { alias } => {
                let (target, entry) = self.commands.get_key_value(alias.as_str())?;
                match entry {
                    ResolvedCommand::Script(script) => Some((target.as_str(), script)),
                    ResolvedCommand::Alias { .. } => None,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_ordering_is_major_first() {
        assert!(Version::new(1, 9, 9) < Version::new(2, 0, 0));
        assert!(Version::new(1, 2, 3) < Version::new(1, 10, 0));
        assert_eq!(Version::new(1, 2, 3).to_string(), "v1.2.3");
    }

    #[test]
    fn test_version_numbers_of_any_length() {
        let huge = VersionNumber::parse("000123456789012345678901234567890").unwrap();
        assert_eq!(huge.as_str(), "123456789012345678901234567890");
        assert!(VersionNumber::from(u64::MAX) < huge);
        assert!(VersionNumber::parse("99").unwrap() < VersionNumber::parse("100").unwrap());
        assert_eq!(VersionNumber::parse("000").unwrap(), VersionNumber::from(0));
        assert!(VersionNumber::parse("").is_none());
        assert!(VersionNumber::parse("1a").is_none());
    }

    #[test]
    fn test_find_resolves_alternatives() {
        let mut project = ResolvedProject::default();
        project.commands.insert(
            "build".to_string(),
            ResolvedCommand::Script(Script {
                script: vec!["make".to_string()],
                ..Default::default()
            }),
        );
        project.commands.insert(
            "b".to_string(),
            ResolvedCommand::Alias {
                alias: "build".to_string(),
            },
        );

        let (name, script) = project.find("b").unwrap();
        assert_eq!(name, "build");
        assert_eq!(script.script, vec!["make"]);
        assert!(project.find("missing").is_none());
    }

    #[test]
    fn test_alias_fragment_serializes_as_bare_alias() {
        let fragment = CommandFragment::Alias {
            alias: "command".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&fragment).unwrap(),
            r#"{"alias":"command"}"#
        );
    }
}
