// tests/pipeline.rs

use projectfile::{ErrorKind, ResolvedCommand, load};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_projectfile(dir: &Path, content: &str) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join("Projectfile"), content).unwrap();
}

fn canonical_tmp() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = dunce::canonicalize(tmp.path()).unwrap();
    (tmp, root)
}

fn cd(path: &Path) -> String {
    format!("cd {}", path.display())
}

#[test]
fn test_minimal_project() {
    let (_tmp, root) = canonical_tmp();
    write_projectfile(&root, "from v1.2.3\n\ncommand:\n  echo hi\n");

    let project = load(&root).unwrap();
    assert_eq!(project.min_version, Some(projectfile::Version::new(1, 2, 3)));
    let (name, script) = project.find("command").unwrap();
    assert_eq!(name, "command");
    assert_eq!(script.script, vec![cd(&root), "echo hi".to_string()]);
}

#[test]
fn test_nested_command_wraps_the_child_directory() {
    let (_tmp, root) = canonical_tmp();
    let child = root.join("B");
    write_projectfile(&root, "from v1.0.0\nmy-command:\n  a-pre\n  ===\n  a-post\n");
    write_projectfile(&child, "from v1.0.0\nmy-command:\n  b-pre\n  ===\n  b-post\n");

    let project = load(&root).unwrap();
    let (_, script) = project.find("my-command").unwrap();
    assert_eq!(
        script.script,
        vec![
            cd(&root),
            "a-pre".to_string(),
            cd(&child),
            "b-pre".to_string(),
            "b-post".to_string(),
            cd(&root),
            "a-post".to_string(),
        ]
    );
}

#[test]
fn test_variable_redefinition_is_rejected_in_any_layout() {
    let (_tmp, root) = canonical_tmp();
    write_projectfile(&root, "from v1.0.0\nx = 1\ncmd:\n  a\n");
    write_projectfile(&root.join("B"), "from v1.0.0\nx = 1\nother:\n  b\n");
    let err = load(&root).unwrap_err();
    assert_eq!(err.code(), "VariableRedefined");
    assert!(matches!(
        err.kind,
        ErrorKind::VariableRedefined { ref path, ref original_path, .. }
            if *path == root.join("B") && *original_path == root
    ));

    let (_tmp, root) = canonical_tmp();
    write_projectfile(&root.join("a"), "from v1.0.0\nx = 1\ncmd:\n  a\n");
    write_projectfile(&root.join("b"), "from v1.0.0\nx = 2\nother:\n  b\n");
    let err = load(&root).unwrap_err();
    assert_eq!(err.code(), "VariableRedefined");
}

#[test]
fn test_dependencies_are_checked_after_the_whole_tree() {
    let (_tmp, root) = canonical_tmp();
    // `a` is visited before `b`, which defines the dependency.
    write_projectfile(&root.join("a"), "from v1.0.0\nbuild: [gen]\n  make\n");
    write_projectfile(&root.join("b"), "from v1.0.0\ngenerate|gen:\n  gen\n");
    assert!(load(&root).is_ok());

    let (_tmp, root) = canonical_tmp();
    write_projectfile(&root.join("a"), "from v1.0.0\nbuild: [ghost]\n  make\n");
    write_projectfile(&root.join("b"), "from v1.0.0\nother:\n  o\n");
    let err = load(&root).unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::ProjectfileInvalidDependency { ref dependency, ref command }
            if dependency == "ghost" && command == "build"
    ));
}

#[test]
fn test_alternatives_across_files() {
    let (_tmp, root) = canonical_tmp();
    write_projectfile(&root.join("a"), "from v1.0.0\nfirst|c:\n  a\n");
    write_projectfile(&root.join("b"), "from v1.0.0\nsecond|c:\n  b\n");
    let err = load(&root).unwrap_err();
    assert_eq!(err.code(), "ProjectfileAlternativeRedefined");

    let (_tmp, root) = canonical_tmp();
    write_projectfile(&root.join("a"), "from v1.0.0\nfirst|c:\n  a\n");
    write_projectfile(&root.join("b"), "from v1.0.0\nfirst|com|c:\n  b\n");
    let project = load(&root).unwrap();
    let (name, script) = project.find("c").unwrap();
    assert_eq!(name, "first");
    assert_eq!(script.alternatives, vec!["com", "c"]);
    assert_eq!(script.script.len(), 4);
    assert!(matches!(
        project.commands.get("com"),
        Some(ResolvedCommand::Alias { alias }) if alias == "first"
    ));
}

#[test]
fn test_errors_carry_the_file_and_line() {
    let (_tmp, root) = canonical_tmp();
    write_projectfile(&root, "from v1.0.0\ncmd:\n  a\n");
    write_projectfile(&root.join("sub"), "\n from v1.0.0\ncmd:\n  b\n");

    let err = load(&root).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::VersionIndentation));
    assert_eq!(err.line, Some(2));
    assert_eq!(err.path, Some(root.join("sub")));
}

#[test]
fn test_tree_without_projectfiles() {
    let (_tmp, root) = canonical_tmp();
    fs::create_dir_all(root.join("empty/deeper")).unwrap();
    let err = load(&root).unwrap_err();
    assert_eq!(err.code(), "ProjectfileNoProjectfile");
}

#[test]
fn test_variables_are_substituted_everywhere() {
    let (_tmp, root) = canonical_tmp();
    write_projectfile(
        &root,
        concat!(
            "from v1.0.0\n",
            "\"\"\"\n",
            "The $name project.\n",
            "\"\"\"\n",
            "name = demo\n",
            "build:\n",
            "  \"\"\"\n",
            "  Builds ${name}.\n",
            "  \"\"\"\n",
            "  make $name HOME=$HOME\n",
        ),
    );

    let project = load(&root).unwrap();
    assert_eq!(project.description.as_deref(), Some("The demo project."));
    let (_, script) = project.find("build").unwrap();
    assert_eq!(script.description.as_deref(), Some("Builds demo."));
    assert_eq!(script.script, vec![cd(&root), "make demo HOME=$HOME".to_string()]);
}

#[test]
fn test_loading_twice_is_idempotent() {
    let (_tmp, root) = canonical_tmp();
    write_projectfile(&root, "from v1.0.0\nx = 1\ncmd:\n  a $x\n");
    write_projectfile(&root.join("sub"), "from v1.0.0\ncmd:\n  b\n");

    let first = load(&root).unwrap();
    let second = load(&root).unwrap();
    assert_eq!(first, second);
    assert!(root.join("sub/Projectfile").is_file());
}
