// src/cli/handlers/script.rs

use crate::{ResolvedProject, Script, Settings, cli::handlers::commons};
use anyhow::{Result, anyhow};
use clap::Parser;
use colored::Colorize;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Prints the flattened script of one command. Nothing is executed."
)]
struct ScriptArgs {
    /// The command name or one of its alternatives.
    command: String,

    /// The root of the tree. Defaults to the current directory.
    path: Option<PathBuf>,
}

pub fn handle(args: Vec<String>, settings: &Settings) -> Result<()> {
    let script_args = ScriptArgs::try_parse_from(&args)?;
    let (root, project) = commons::load_project(script_args.path, settings)?;
    let script = find_script(&project, &script_args.command, &root)?;

    if let Some(description) = &script.description {
        for line in description.lines() {
            println!("{}", format!("# {}", line).dimmed());
        }
    }
    for line in &script.script {
        println!("{}", line);
    }
    Ok(())
}

/// Looks up a command by name or alternative.
fn find_script<'a>(project: &'a ResolvedProject, command: &str, root: &Path) -> Result<&'a Script> {
    let (name, script) = project.find(command).ok_or_else(|| {
        anyhow!(
            "Command '{}' is not defined in the tree at '{}'.",
            command,
            root.display()
        )
    })?;
    if name != command {
        log::debug!("'{}' resolved to '{}'", command, name);
    }
    Ok(script)
}
