// src/cli/handlers/dump.rs

use crate::{Settings, cli::handlers::commons};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Prints the resolved commands of a directory tree as JSON."
)]
struct DumpArgs {
    /// The root of the tree. Defaults to the current directory.
    path: Option<PathBuf>,

    /// Print on a single line.
    #[arg(long, short)]
    compact: bool,
}

pub fn handle(args: Vec<String>, settings: &Settings) -> Result<()> {
    let dump_args = DumpArgs::try_parse_from(&args)?;
    let (_, project) = commons::load_project(dump_args.path, settings)?;

    let json = if dump_args.compact {
        serde_json::to_string(&project)
    } else {
        serde_json::to_string_pretty(&project)
    }
    .context("Failed to serialize the resolved project")?;
    println!("{}", json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_dump_accepts_both_layouts() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("Projectfile"), "from v1.0.0\ncmd:\n  x\n").unwrap();
        let path = tmp.path().display().to_string();

        assert!(handle(vec![path.clone()], &Settings::default()).is_ok());
        assert!(handle(vec![path, "--compact".to_string()], &Settings::default()).is_ok());
    }

    #[test]
    fn test_dump_of_a_tree_without_projectfiles_fails() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().display().to_string();
        assert!(handle(vec![path], &Settings::default()).is_err());
    }
}
