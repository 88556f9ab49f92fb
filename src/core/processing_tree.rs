//! # Processing Tree Builder
//!
//! Parses each collected Projectfile and nests the results the way their directories nest.
//! A node's children are the closest descendant directories that hold a Projectfile;
//! directories in between without one are skipped.

use crate::{
    core::{parser, walker::ProjectfileSource},
    error::ProjectfileError,
    models::ProcessingNode,
};

/// Hangs a finished node under the node below it on the stack, or makes it a root.
fn attach(node: ProcessingNode, stack: &mut [ProcessingNode], roots: &mut Vec<ProcessingNode>) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => roots.push(node),
    }
}

/// Builds the processing tree from sources listed in pre-order.
///
/// The stack holds the chain of open ancestors. A new source pops every node that is not
/// its ancestor (those subtrees are complete), then becomes the new top.
///
/// # Returns
///
/// The top-level nodes, in traversal order. Parse errors carry the directory path.
pub fn build(sources: Vec<ProjectfileSource>) -> Result<Vec<ProcessingNode>, ProjectfileError> {
    let mut roots = Vec::new();
    let mut stack: Vec<ProcessingNode> = Vec::new();

    for source in sources {
        let data = parser::parse_unchecked(&source.lines).map_err(|e| e.with_path(&source.path))?;
        log::trace!(
            "Parsed '{}': {} command entries",
            source.path.display(),
            data.commands.len()
        );

        while let Some(top) = stack.last() {
            if source.path.starts_with(&top.path) && source.path != top.path {
                break;
            }
            if let Some(done) = stack.pop() {
                attach(done, &mut stack, &mut roots);
            }
        }
        stack.push(ProcessingNode {
            path: source.path,
            data,
            children: Vec::new(),
        });
    }

    while let Some(done) = stack.pop() {
        attach(done, &mut stack, &mut roots);
    }

    log::debug!("Built processing tree with {} root(s)", roots.len());
    Ok(roots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::path::{Path, PathBuf};

    fn source(path: &str) -> ProjectfileSource {
        ProjectfileSource {
            path: PathBuf::from(path),
            lines: vec![
                "from v1.0.0".to_string(),
                "cmd:".to_string(),
                "  echo".to_string(),
            ],
        }
    }

    fn shape(node: &ProcessingNode) -> String {
        let children: Vec<String> = node.children.iter().map(shape).collect();
        if children.is_empty() {
            node.path.display().to_string()
        } else {
            format!("{}({})", node.path.display(), children.join(","))
        }
    }

    #[test]
    fn test_nesting_follows_directories() {
        let roots = build(vec![
            source("/r"),
            source("/r/a"),
            source("/r/a/x/deep"),
            source("/r/b"),
            source("/r/bc"),
        ])
        .unwrap();
        assert_eq!(roots.len(), 1);
        assert_eq!(shape(&roots[0]), "/r(/r/a(/r/a/x/deep),/r/b,/r/bc)");
    }

    #[test]
    fn test_unrelated_subtrees_become_separate_roots() {
        let roots = build(vec![source("/r/a"), source("/r/a/1"), source("/r/b")]).unwrap();
        let shapes: Vec<String> = roots.iter().map(shape).collect();
        assert_eq!(shapes, vec!["/r/a(/r/a/1)", "/r/b"]);
    }

    #[test]
    fn test_parse_errors_carry_the_directory() {
        let mut broken = source("/r/a");
        broken.lines[0] = " from v1.0.0".to_string();

        let err = build(vec![source("/r"), broken]).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::VersionIndentation));
        assert_eq!(err.line, Some(1));
        assert_eq!(err.path.as_deref(), Some(Path::new("/r/a")));
    }
}
