// src/bin/projects.rs

use anyhow::Result;
use clap::Parser;
use colored::*;
use projectfile::{
    ProjectfileError, Settings,
    cli::{Cli, handlers},
};

// --- Command Definition and Registry ---

/// An action of the `projects` binary, its aliases, and its handler.
struct CommandDefinition {
    name: &'static str,
    aliases: &'static [&'static str],
    handler: fn(Vec<String>, &Settings) -> Result<()>,
}

/// Every action the binary knows. Add an entry here to add an action.
static COMMAND_REGISTRY: &[CommandDefinition] = &[
    CommandDefinition {
        name: "check",
        aliases: &["validate"],
        handler: handlers::check::handle,
    },
    CommandDefinition {
        name: "dump",
        aliases: &["json"],
        handler: handlers::dump::handle,
    },
    CommandDefinition {
        name: "script",
        aliases: &["show"],
        handler: handlers::script::handle,
    },
];

/// Finds a command definition in the registry by its name or alias.
fn find_command(name: &str) -> Option<&'static CommandDefinition> {
    COMMAND_REGISTRY
        .iter()
        .find(|cmd| cmd.name == name || cmd.aliases.contains(&name))
}

fn main() {
    env_logger::init();

    if let Err(e) = run_cli(Cli::parse()) {
        // Structured pipeline errors also show their machine-readable code.
        if let Some(err) = e.downcast_ref::<ProjectfileError>() {
            eprintln!(
                "\n{} [{}]: {}",
                "Error".red().bold(),
                err.code().yellow(),
                err
            );
        } else {
            eprintln!("\n{}: {}", "Error".red().bold(), e);
        }
        std::process::exit(1);
    }
}

fn run_cli(cli: Cli) -> Result<()> {
    log::debug!("CLI args parsed: {:?}", cli);

    let settings = match &cli.settings {
        Some(template) => Settings::load_from(template)?,
        None => Settings::load_default()?,
    };

    let command = find_command(&cli.action).ok_or_else(|| {
        let known: Vec<&str> = COMMAND_REGISTRY.iter().map(|cmd| cmd.name).collect();
        anyhow::anyhow!(
            "Unknown action '{}'. Available actions: {}",
            cli.action,
            known.join(", ")
        )
    })?;
    (command.handler)(cli.args, &settings)
}
