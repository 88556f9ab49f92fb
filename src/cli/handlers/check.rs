// src/cli/handlers/check.rs

use crate::{ResolvedCommand, ResolvedProject, Settings, cli::handlers::commons};
use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Validates every Projectfile below a directory."
)]
struct CheckArgs {
    /// The root of the tree. Defaults to the current directory.
    path: Option<PathBuf>,
}

pub fn handle(args: Vec<String>, settings: &Settings) -> Result<()> {
    let check_args = CheckArgs::try_parse_from(&args)?;
    let (root, project) = commons::load_project(check_args.path, settings)?;

    let (scripts, aliases) = count_commands(&project);

    println!(
        "{} {} ({} commands, {} alternatives)",
        "✔".green(),
        root.display().to_string().cyan(),
        scripts,
        aliases
    );
    if let Some(version) = &project.min_version {
        println!("  {:<12} {}", "min version".blue(), version);
    }
    Ok(())
}

/// Counts commands with a script and alternative names.
fn count_commands(project: &ResolvedProject) -> (usize, usize) {
    project
        .commands
        .values()
        .fold((0, 0), |(scripts, aliases), cmd| match cmd {
            ResolvedCommand::Script(_) => (scripts + 1, aliases),
            ResolvedCommand::Alias { .. } => (scripts, aliases + 1),
        })
}
