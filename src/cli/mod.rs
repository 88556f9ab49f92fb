// src/cli/mod.rs

use clap::Parser;

pub mod handlers;

/// projects: inspects the Projectfiles of a directory tree.
///
/// Usage: `projects [--settings FILE] <action> [args...]`
///
/// Actions:
/// - `check [PATH]`            validate the tree
/// - `dump [PATH]`             print the resolved commands as JSON
/// - `script <COMMAND> [PATH]` print the flattened script of one command
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// Path to a walker settings file. Defaults to `<config dir>/projects/settings.toml`.
    #[arg(long, short)]
    pub settings: Option<String>,

    /// The action to perform.
    pub action: String,

    /// Arguments for the action.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}
