//! # Projectfile Parser
//!
//! A single-pass, line-driven state machine over the lines of one Projectfile.
//!
//! ```text
//! Start -> BeforeCommands -> MainComment -> Variables -> Command -> CommandComment -> Pre -> Post
//!                        \___________________/  \______/  ^   \____________________/    |
//!                                                          \________________________________/
//! ```
//!
//! Each state function consumes exactly one line and returns the next state. The command
//! being defined travels inside the state itself (`State::Command(open)`, `State::Pre(open)`,
//! ...) and is moved into the command table when the next header or the end of input closes it.
//!
//! Any error raised for a line is wrapped with that line's 1-based number before leaving
//! [`parse`]. Errors found at end of input carry no line number.

use crate::{
    core::line_classifier::{self, CommandHeader, Line, Shape},
    error::{ErrorKind, ProjectfileError},
    models::{CommandFragment, ParseResult, PrimaryCommand, Version},
};
use std::collections::BTreeMap;

/// The command whose body is currently being read.
#[derive(Debug)]
struct OpenCommand {
    name: String,
    body: PrimaryCommand,
    description: String,
}

/// Every state after a header owns the command that header opened, so reading a command body
/// never has to look the command up.
#[derive(Debug)]
enum State {
    Start,
    BeforeCommands,
    MainComment,
    Variables,
    Command(OpenCommand),
    CommandComment(OpenCommand),
    Pre(OpenCommand),
    Post(OpenCommand),
}

#[derive(Debug, Default)]
struct Accumulator {
    version: Option<Version>,
    description: String,
    variables: BTreeMap<String, String>,
    commands: BTreeMap<String, CommandFragment>,
}

impl Accumulator {
    /// Moves a finished command into the command table.
    fn close_command(&mut self, open: OpenCommand) {
        log::trace!("Closing command '{}'", open.name);
        self.commands
            .insert(open.name, CommandFragment::Primary(open.body));
    }

    /// Closes `previous`, if any, and opens the command declared by `header`.
    fn open_command(
        &mut self,
        previous: Option<OpenCommand>,
        header: CommandHeader,
    ) -> Result<State, ErrorKind> {
        if let Some(open) = previous {
            self.close_command(open);
        }

        let mut seen: Vec<&str> = Vec::new();
        for name in header.names() {
            if self.commands.contains_key(name) || seen.contains(&name) {
                return Err(ErrorKind::CommandHeaderRedefined {
                    name: name.to_string(),
                });
            }
            seen.push(name);
        }

        for alternative in &header.alternatives {
            self.commands.insert(
                alternative.clone(),
                CommandFragment::Alias {
                    alias: header.name.clone(),
                },
            );
        }
        Ok(State::Command(OpenCommand {
            name: header.name,
            body: PrimaryCommand {
                dependencies: header.dependencies,
                alternatives: header.alternatives,
                ..Default::default()
            },
            description: String::new(),
        }))
    }
}

/// Appends one line of a `"""` block to a description.
///
/// Non-blank lines are trimmed and joined with a single space, or appended directly after a
/// paragraph break. A blank line adds one paragraph break (`\n\n`); further blank lines
/// add nothing.
pub fn append_description_line(description: &mut String, line: &str) {
    let text = line.trim();
    if text.is_empty() {
        if !description.is_empty() && !description.ends_with("\n\n") {
            description.push_str("\n\n");
        }
    } else {
        if !description.is_empty() && !description.ends_with("\n\n") {
            description.push(' ');
        }
        description.push_str(text);
    }
}

/// Drops a trailing paragraph break. An empty description becomes `None`.
fn finish_description(description: &str) -> Option<String> {
    let text = description.trim_end();
    (!text.is_empty()).then(|| text.to_string())
}

// --- STATES ---

fn state_start(acc: &mut Accumulator, line: &str) -> Result<State, ErrorKind> {
    match line_classifier::classify(line, &[Shape::Empty, Shape::Version])? {
        Line::Empty => Ok(State::Start),
        Line::Version(version) => {
            acc.version = Some(version);
            Ok(State::BeforeCommands)
        }
        _ => Err(ErrorKind::VersionMissing),
    }
}

fn state_before_commands(acc: &mut Accumulator, line: &str) -> Result<State, ErrorKind> {
    let accepted = [
        Shape::Empty,
        Shape::CommentDelimiter,
        Shape::Variable,
        Shape::Header,
    ];
    match line_classifier::classify(line, &accepted)? {
        Line::Empty => Ok(State::BeforeCommands),
        Line::CommentDelimiter => Ok(State::MainComment),
        Line::Variable { name, value } => {
            acc.variables.insert(name, value);
            Ok(State::Variables)
        }
        Line::Header(header) => acc.open_command(None, header),
        _ => Err(ErrorKind::CommandHeaderSyntax),
    }
}

fn state_main_comment(acc: &mut Accumulator, line: &str) -> State {
    if line_classifier::is_comment_delimiter(line) {
        return State::Variables;
    }
    append_description_line(&mut acc.description, line);
    State::MainComment
}

fn state_variables(acc: &mut Accumulator, line: &str) -> Result<State, ErrorKind> {
    let accepted = [
        Shape::Empty,
        Shape::CommentDelimiter,
        Shape::Variable,
        Shape::Header,
    ];
    match line_classifier::classify(line, &accepted)? {
        Line::Empty => Ok(State::Variables),
        Line::CommentDelimiter => Err(ErrorKind::CommentDelimiterUnexpected),
        Line::Variable { name, value } => {
            acc.variables.insert(name, value);
            Ok(State::Variables)
        }
        Line::Header(header) => acc.open_command(None, header),
        _ => Err(ErrorKind::CommandHeaderSyntax),
    }
}

fn state_command(mut open: OpenCommand, line: &str) -> Result<State, ErrorKind> {
    let accepted = [
        Shape::Empty,
        Shape::CommentDelimiter,
        Shape::Divisor,
        Shape::Indented,
    ];
    match line_classifier::classify(line, &accepted)? {
        Line::Empty => Ok(State::Command(open)),
        Line::CommentDelimiter => Ok(State::CommandComment(open)),
        Line::Divisor => Ok(State::Post(open)),
        Line::Indented(content) => {
            open.body.pre.push(content);
            Ok(State::Pre(open))
        }
        _ => Err(ErrorKind::CommandHeaderUnexpectedUnindented),
    }
}

fn state_command_comment(mut open: OpenCommand, line: &str) -> State {
    if line_classifier::is_comment_delimiter(line) {
        open.body.description = finish_description(&open.description);
        return State::Pre(open);
    }
    append_description_line(&mut open.description, line);
    State::CommandComment(open)
}

fn state_pre(acc: &mut Accumulator, mut open: OpenCommand, line: &str) -> Result<State, ErrorKind> {
    let accepted = [
        Shape::Empty,
        Shape::CommentDelimiter,
        Shape::Divisor,
        Shape::Indented,
        Shape::Header,
    ];
    match line_classifier::classify(line, &accepted)? {
        Line::Empty => Ok(State::Pre(open)),
        Line::CommentDelimiter => Err(ErrorKind::CommentDelimiterUnexpected),
        Line::Divisor => Ok(State::Post(open)),
        Line::Indented(content) => {
            open.body.pre.push(content);
            Ok(State::Pre(open))
        }
        Line::Header(header) => acc.open_command(Some(open), header),
        _ => Err(ErrorKind::CommandHeaderSyntax),
    }
}

fn state_post(acc: &mut Accumulator, mut open: OpenCommand, line: &str) -> Result<State, ErrorKind> {
    let accepted = [
        Shape::Empty,
        Shape::CommentDelimiter,
        Shape::Divisor,
        Shape::Indented,
        Shape::Header,
    ];
    match line_classifier::classify(line, &accepted)? {
        Line::Empty => Ok(State::Post(open)),
        Line::CommentDelimiter => Err(ErrorKind::CommentDelimiterUnexpected),
        Line::Divisor => Err(ErrorKind::CommandDelimiterUnexpected),
        Line::Indented(content) => {
            open.body.post.push(content);
            Ok(State::Post(open))
        }
        Line::Header(header) => acc.open_command(Some(open), header),
        _ => Err(ErrorKind::CommandHeaderSyntax),
    }
}

fn step(state: State, acc: &mut Accumulator, line: &str) -> Result<State, ErrorKind> {
    match state {
        State::Start => state_start(acc, line),
        State::BeforeCommands => state_before_commands(acc, line),
        State::MainComment => Ok(state_main_comment(acc, line)),
        State::Variables => state_variables(acc, line),
        State::Command(open) => state_command(open, line),
        State::CommandComment(open) => Ok(state_command_comment(open, line)),
        State::Pre(open) => state_pre(acc, open, line),
        State::Post(open) => state_post(acc, open, line),
    }
}

/// Applies the end-of-input rules for the state the machine halted in.
fn finish(state: State, mut acc: Accumulator) -> Result<ParseResult, ErrorKind> {
    match state {
        State::Start => return Err(ErrorKind::ProjectfileEmpty),
        State::BeforeCommands | State::MainComment | State::Variables => {
            return Err(ErrorKind::ProjectfileNoCommand);
        }
        State::Command(open) | State::CommandComment(open) => {
            return Err(ErrorKind::ProjectfileNoCommandInCommand { command: open.name });
        }
        State::Pre(open) | State::Post(open) => acc.close_command(open),
    }

    Ok(ParseResult {
        min_version: acc.version.unwrap_or_default(),
        description: finish_description(&acc.description),
        variables: acc.variables,
        commands: acc.commands,
    })
}

// --- PUBLIC API ---

/// Parses the lines of one Projectfile, without checking that dependencies exist.
///
/// The tree pipeline uses this variant because a dependency may live in another directory's
/// Projectfile; it checks dependencies once the whole tree is merged.
///
/// # Arguments
///
/// * `lines` - The file content split into lines, without newline characters.
///
/// # Returns
///
/// The parsed `ParseResult`, or the first error found, tagged with its line number.
pub fn parse_unchecked<S: AsRef<str>>(lines: &[S]) -> Result<ParseResult, ProjectfileError> {
    let mut acc = Accumulator::default();
    let mut state = State::Start;

    for (index, line) in lines.iter().enumerate() {
        state = step(state, &mut acc, line.as_ref())
            .map_err(|kind| ProjectfileError::at_line(kind, index + 1))?;
    }

    Ok(finish(state, acc)?)
}

/// Parses the lines of one standalone Projectfile.
///
/// On top of [`parse_unchecked`], every dependency must name a command or alternative
/// declared in the same file.
pub fn parse<S: AsRef<str>>(lines: &[S]) -> Result<ParseResult, ProjectfileError> {
    let result = parse_unchecked(lines)?;
    check_dependencies(&result.commands)?;
    Ok(result)
}

/// Parses a whole Projectfile text.
pub fn parse_str(content: &str) -> Result<ParseResult, ProjectfileError> {
    parse(&content.lines().collect::<Vec<_>>())
}

/// Verifies that every dependency names a key of the file's command table.
fn check_dependencies(commands: &BTreeMap<String, CommandFragment>) -> Result<(), ErrorKind> {
    for (name, fragment) in commands {
        let Some(command) = fragment.as_primary() else {
            continue;
        };
        if let Some(missing) = command
            .dependencies
            .iter()
            .find(|dep| !commands.contains_key(dep.as_str()))
        {
            return Err(ErrorKind::ProjectfileInvalidDependency {
                dependency: missing.clone(),
                command: name.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn primary<'a>(result: &'a ParseResult, name: &str) -> &'a PrimaryCommand {
        result
            .commands
            .get(name)
            .and_then(CommandFragment::as_primary)
            .unwrap()
    }

    fn error_of(lines: &[&str]) -> ProjectfileError {
        parse(lines).unwrap_err()
    }

    // --- Happy paths ---

    #[test]
    fn test_minimal_file() {
        let result = parse(&["from v1.2.3", "", "command:", "  echo hi"]).unwrap();
        assert_eq!(result.min_version, Version::new(1, 2, 3));
        assert!(result.description.is_none());
        assert!(result.variables.is_empty());
        assert_eq!(result.commands.len(), 1);
        assert_eq!(
            primary(&result, "command"),
            &PrimaryCommand {
                pre: vec!["echo hi".to_string()],
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_full_file() {
        let content = r#"
# leading comment lines are fine
from v1.0.0  # min version

"""
Main description
spanning two lines.

Second paragraph.
"""

name = "my project"
target = release   # bare value

build|b: [setup]
  """
  Builds everything.
  """
  cargo build --$target   # comment is dropped
  ===
  echo built

setup:
  mkdir -p out

clean:
  ===
  rm -rf out
"#;
        let result = parse_str(content).unwrap();
        assert_eq!(result.min_version, Version::new(1, 0, 0));
        assert_eq!(
            result.description.as_deref(),
            Some("Main description spanning two lines.\n\nSecond paragraph.")
        );
        assert_eq!(result.variables.get("name").map(String::as_str), Some("my project"));
        assert_eq!(result.variables.get("target").map(String::as_str), Some("release"));

        let build = primary(&result, "build");
        assert_eq!(build.description.as_deref(), Some("Builds everything."));
        assert_eq!(build.dependencies, vec!["setup"]);
        assert_eq!(build.alternatives, vec!["b"]);
        assert_eq!(build.pre, vec!["cargo build --$target"]);
        assert_eq!(build.post, vec!["echo built"]);
        assert_eq!(
            result.commands.get("b"),
            Some(&CommandFragment::Alias {
                alias: "build".to_string()
            })
        );

        let clean = primary(&result, "clean");
        assert!(clean.pre.is_empty());
        assert_eq!(clean.post, vec!["rm -rf out"]);
    }

    #[test]
    fn test_script_lines_keep_order_and_trimmed_content() {
        let lines = [
            "from v1.0.0",
            "cmd:",
            "    first   --flag",
            "\tsecond",
            "      # ignored",
            "  third 'with  spaces'",
            "  ===",
            "  fourth",
        ];
        let result = parse(&lines).unwrap();
        let cmd = primary(&result, "cmd");
        assert_eq!(cmd.pre, vec!["first   --flag", "second", "third 'with  spaces'"]);
        assert_eq!(cmd.post, vec!["fourth"]);
    }

    #[test]
    fn test_comment_block_paragraph_breaks_never_double() {
        let lines = [
            "from v1.0.0",
            r#"""""#,
            "first",
            "",
            "",
            "",
            "second",
            "   third   ",
            "",
            r#"""""#,
            "cmd:",
            "  x",
        ];
        let result = parse(&lines).unwrap();
        assert_eq!(result.description.as_deref(), Some("first\n\nsecond third"));
    }

    #[test]
    fn test_command_with_only_a_description_is_closed_at_eof() {
        let lines = ["from v1.0.0", "cmd:", r#"  """"#, "  about", r#"  """"#];
        let result = parse(&lines).unwrap();
        let cmd = primary(&result, "cmd");
        assert_eq!(cmd.description.as_deref(), Some("about"));
        assert!(cmd.pre.is_empty() && cmd.post.is_empty());
    }

    #[test]
    fn test_each_header_closes_the_command_before_it() {
        let lines = [
            "from v1.0.0",
            "first:",
            r#"  """"#,
            "  About first.",
            r#"  """"#,
            "second:",
            "  ===",
            "  s-post",
            "third:",
            "  t-pre",
        ];
        let result = parse(&lines).unwrap();
        assert_eq!(result.commands.len(), 3);
        assert_eq!(primary(&result, "first").description.as_deref(), Some("About first."));
        assert!(primary(&result, "first").pre.is_empty());
        assert_eq!(primary(&result, "second").post, vec!["s-post"]);
        assert_eq!(primary(&result, "third").pre, vec!["t-pre"]);
    }

    #[test]
    fn test_duplicate_variable_in_one_file_overwrites() {
        let result = parse(&["from v1.0.0", "a = 1", "a = 2", "cmd:", "  x"]).unwrap();
        assert_eq!(result.variables.get("a").map(String::as_str), Some("2"));
    }

    // --- Errors with line numbers ---

    #[test]
    fn test_version_indentation_is_reported_on_line_one() {
        let err = error_of(&[" from v1.2.3", "", "command:", "  echo hi"]);
        assert!(matches!(err.kind, ErrorKind::VersionIndentation));
        assert_eq!(err.line, Some(1));
    }

    #[test]
    fn test_missing_version() {
        let err = error_of(&["", "command:", "  echo hi"]);
        assert!(matches!(err.kind, ErrorKind::VersionMissing));
        assert_eq!(err.line, Some(2));
    }

    #[test]
    fn test_dependency_list_errors_carry_the_line() {
        let err = error_of(&["from v1.0.0", "command: []", "  x"]);
        assert!(matches!(err.kind, ErrorKind::CommandHeaderEmptyDependencyList));
        assert_eq!(err.line, Some(2));

        let err = error_of(&["from v1.0.0", "command: [a,,b]", "  x"]);
        assert!(matches!(err.kind, ErrorKind::CommandHeaderInvalidDependencyList));
    }

    #[test]
    fn test_comment_delimiter_after_variables_is_rejected() {
        let err = error_of(&["from v1.0.0", "a = 1", r#"""""#, "x", r#"""""#]);
        assert!(matches!(err.kind, ErrorKind::CommentDelimiterUnexpected));
        assert_eq!(err.line, Some(3));
    }

    #[test]
    fn test_comment_delimiter_inside_script_is_rejected() {
        let err = error_of(&["from v1.0.0", "cmd:", "  x", r#"  """"#]);
        assert!(matches!(err.kind, ErrorKind::CommentDelimiterUnexpected));
        let err = error_of(&["from v1.0.0", "cmd:", "  ===", "  x", r#"""""#]);
        assert!(matches!(err.kind, ErrorKind::CommentDelimiterUnexpected));
    }

    #[test]
    fn test_second_divisor_is_rejected() {
        let err = error_of(&["from v1.0.0", "cmd:", "  x", "===", "  y", "==="]);
        assert!(matches!(err.kind, ErrorKind::CommandDelimiterUnexpected));
        assert_eq!(err.line, Some(6));
    }

    #[test]
    fn test_unindented_line_after_header() {
        let err = error_of(&["from v1.0.0", "cmd:", "other:", "  x"]);
        assert!(matches!(err.kind, ErrorKind::CommandHeaderUnexpectedUnindented));
        assert_eq!(err.line, Some(3));
    }

    #[test]
    fn test_indented_header_with_invalid_names() {
        let err = parse_str("from v1.0.0\n  bad name!: x\ncmd:\n  x").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::CommandHeaderIndentation));
        assert_eq!(err.line, Some(2));
    }

    #[test]
    fn test_garbage_before_commands() {
        let err = error_of(&["from v1.0.0", "this is not a header"]);
        assert!(matches!(err.kind, ErrorKind::CommandHeaderSyntax));
        assert_eq!(err.line, Some(2));
    }

    #[test]
    fn test_header_redefinition() {
        let err = error_of(&["from v1.0.0", "cmd|c:", "  x", "c:", "  y"]);
        assert!(matches!(err.kind, ErrorKind::CommandHeaderRedefined { ref name } if name == "c"));
        assert_eq!(err.line, Some(4));

        let err = error_of(&["from v1.0.0", "cmd:", "  x", "other|cmd:", "  y"]);
        assert!(matches!(err.kind, ErrorKind::CommandHeaderRedefined { ref name } if name == "cmd"));

        let err = error_of(&["from v1.0.0", "cmd|c|c:", "  x"]);
        assert!(matches!(err.kind, ErrorKind::CommandHeaderRedefined { .. }));
    }

    // --- End-of-input rules ---

    #[test]
    fn test_end_of_input_errors() {
        let err = error_of(&["", "   # nothing here"]);
        assert!(matches!(err.kind, ErrorKind::ProjectfileEmpty));
        assert!(err.line.is_none());

        let err = error_of(&["from v1.0.0", "a = 1"]);
        assert!(matches!(err.kind, ErrorKind::ProjectfileNoCommand));

        let err = error_of(&["from v1.0.0", r#"""""#, "unterminated"]);
        assert!(matches!(err.kind, ErrorKind::ProjectfileNoCommand));

        let err = error_of(&["from v1.0.0", "cmd:", ""]);
        assert!(matches!(
            err.kind,
            ErrorKind::ProjectfileNoCommandInCommand { ref command } if command == "cmd"
        ));

        let err = error_of(&["from v1.0.0", "cmd:", r#"  """"#, "  never closed"]);
        assert!(matches!(err.kind, ErrorKind::ProjectfileNoCommandInCommand { .. }));
    }

    // --- Dependency integrity ---

    #[test]
    fn test_dependencies_must_exist_in_the_file() {
        let err = error_of(&["from v1.0.0", "cmd: [ghost]", "  x"]);
        assert!(matches!(
            err.kind,
            ErrorKind::ProjectfileInvalidDependency { ref dependency, ref command }
                if dependency == "ghost" && command == "cmd"
        ));
        assert!(err.line.is_none());

        // Alternatives count as command names.
        assert!(parse(&["from v1.0.0", "a|alpha:", "  x", "b: [alpha]", "  y"]).is_ok());
        // The unchecked variant leaves this to the aggregator.
        assert!(parse_unchecked(&["from v1.0.0", "cmd: [ghost]", "  x"]).is_ok());
    }
}
