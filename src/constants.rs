// src/constants.rs

/// The name of the per-directory command definition file. Matched case-sensitively.
pub const PROJECTFILE_NAME: &str = "Projectfile";

/// Command names the external dispatcher already binds for itself.
/// A Projectfile may not declare any of them, neither as a name nor as an alternative.
pub const DISABLED_COMMAND_NAMES: &[&str] = &["p"];

/// Prefix of the directory-change line emitted in front of each directory's script block.
pub const CD_MARKER_PREFIX: &str = "cd ";

/// The name of the directory holding the user-level settings (inside the system config dir).
pub const SETTINGS_DIR: &str = "projects";

/// The name of the walker settings file (inside `SETTINGS_DIR`).
pub const SETTINGS_FILENAME: &str = "settings.toml";
