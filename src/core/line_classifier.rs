//! # Line Classifier
//!
//! Stateless recognizers for the six line shapes of the Projectfile format, plus blank and
//! comment-only lines. Each recognizer looks at one raw line and answers one of three ways:
//!
//! - the line has this shape (the parsed value is returned),
//! - the line does not have this shape (not an error, another shape may still match),
//! - the line clearly tries to be this shape but is malformed (an [`ErrorKind`]).
//!
//! The parser never calls the recognizers one by one. It calls [`classify`] with the set of
//! shapes its current state accepts, and gets back a tagged [`Line`]. Shapes are tried in a
//! fixed priority order so that, e.g., an indented `name:` inside a script body is a script
//! line and not a badly indented header.

use crate::{
    constants::DISABLED_COMMAND_NAMES,
    error::ErrorKind,
    models::{Version, VersionNumber},
};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref EMPTY_RE: Regex = Regex::new(r"^\s*(#.*)?$").expect("valid empty line regex");
    static ref VERSION_START_RE: Regex =
        Regex::new(r"^(\s*)from\b").expect("valid version start regex");
    static ref VERSION_RE: Regex =
        Regex::new(r"^from\s+v?([0-9]+)\.([0-9]+)\.([0-9]+)\s*$").expect("valid version regex");
    static ref COMMENT_DELIMITER_RE: Regex =
        Regex::new(r#"^\s*"""\s*(#.*)?$"#).expect("valid comment delimiter regex");
    static ref DIVISOR_RE: Regex = Regex::new(r"^\s*===\s*(#.*)?$").expect("valid divisor regex");
    static ref VARIABLE_RE: Regex =
        Regex::new(r"^(\s*)([\w.-]+)\s*=\s*(.*)$").expect("valid variable regex");
    // Anything indented with a colon outside a trailing comment looks like a header.
    static ref INDENTED_HEADER_RE: Regex =
        Regex::new(r"^\s+[^#]*:").expect("valid indented header regex");
    // Everything before the first colon may only hold names, pipes and whitespace.
    static ref HEADER_RE: Regex =
        Regex::new(r"^([\w.|\s-]*?)\s*:(.*)$").expect("valid header regex");
    static ref NAME_RE: Regex = Regex::new(r"^[\w.-]+$").expect("valid name regex");
}

/// The line shapes a parser state can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Empty,
    CommentDelimiter,
    Divisor,
    Version,
    Indented,
    Variable,
    Header,
}

/// The order in which shapes are tried.
const PRIORITY: [Shape; 7] = [
    Shape::Empty,
    Shape::CommentDelimiter,
    Shape::Divisor,
    Shape::Version,
    Shape::Indented,
    Shape::Variable,
    Shape::Header,
];

/// A parsed `name|alt|...: [dep, ...]` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandHeader {
    pub name: String,
    /// Sorted longest first.
    pub alternatives: Vec<String>,
    pub dependencies: Vec<String>,
}

impl CommandHeader {
    /// The primary name followed by every alternative.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.alternatives.iter().map(String::as_str))
    }
}

/// The outcome of classifying one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Empty,
    CommentDelimiter,
    Divisor,
    Version(Version),
    /// Script content with surrounding whitespace and trailing comment removed.
    Indented(String),
    Variable { name: String, value: String },
    Header(CommandHeader),
    /// None of the accepted shapes matched.
    Unrecognized,
}

/// Classifies `line`, trying only the `accepted` shapes, in priority order.
///
/// # Arguments
///
/// * `line` - The raw line, without its trailing newline.
/// * `accepted` - The shapes the caller can handle in its current state.
///
/// # Returns
///
/// The first matching shape, `Line::Unrecognized` if none matched, or the error raised by
/// the first recognizer that found a malformed line of its shape.
pub fn classify(line: &str, accepted: &[Shape]) -> Result<Line, ErrorKind> {
    for shape in PRIORITY.iter().filter(|shape| accepted.contains(shape)) {
        let matched = match shape {
            Shape::Empty => is_empty(line).then_some(Line::Empty),
            Shape::CommentDelimiter => is_comment_delimiter(line).then_some(Line::CommentDelimiter),
            Shape::Divisor => is_divisor(line).then_some(Line::Divisor),
            Shape::Version => version(line)?.map(Line::Version),
            Shape::Indented => indented(line).map(Line::Indented),
            Shape::Variable => variable(line)?.map(|(name, value)| Line::Variable { name, value }),
            Shape::Header => header(line)?.map(Line::Header),
        };
        if let Some(classified) = matched {
            return Ok(classified);
        }
    }
    Ok(Line::Unrecognized)
}

// --- RECOGNIZERS ---

/// Cuts everything from the first `#` on.
fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => line.get(..pos).unwrap_or(line),
        None => line,
    }
}

/// A `from vMAJOR.MINOR.PATCH` line.
pub fn version(line: &str) -> Result<Option<Version>, ErrorKind> {
    let Some(caps) = VERSION_START_RE.captures(line) else {
        return Ok(None);
    };
    if caps.get(1).is_some_and(|indent| !indent.as_str().is_empty()) {
        return Err(ErrorKind::VersionIndentation);
    }

    let caps = VERSION_RE
        .captures(strip_comment(line))
        .ok_or(ErrorKind::VersionFormat)?;
    let component = |i: usize| -> Result<VersionNumber, ErrorKind> {
        caps.get(i)
            .and_then(|m| VersionNumber::parse(m.as_str()))
            .ok_or(ErrorKind::VersionFormat)
    };
    Ok(Some(Version {
        major: component(1)?,
        minor: component(2)?,
        patch: component(3)?,
    }))
}

/// Whitespace only, optionally followed by a comment.
pub fn is_empty(line: &str) -> bool {
    EMPTY_RE.is_match(line)
}

/// An indented line with real content. Indented comment-only lines return `None`.
pub fn indented(line: &str) -> Option<String> {
    if !line.starts_with(char::is_whitespace) {
        return None;
    }
    let content = strip_comment(line).trim();
    (!content.is_empty()).then(|| content.to_string())
}

/// A line holding nothing but `"""`.
pub fn is_comment_delimiter(line: &str) -> bool {
    COMMENT_DELIMITER_RE.is_match(line)
}

/// A line holding nothing but `===`.
pub fn is_divisor(line: &str) -> bool {
    DIVISOR_RE.is_match(line)
}

/// A `NAME = VALUE` line.
pub fn variable(line: &str) -> Result<Option<(String, String)>, ErrorKind> {
    let Some(caps) = VARIABLE_RE.captures(line) else {
        return Ok(None);
    };
    if caps.get(1).is_some_and(|indent| !indent.as_str().is_empty()) {
        return Err(ErrorKind::VariableIndentation);
    }
    let name = caps.get(2).map_or("", |m| m.as_str()).to_string();
    let raw = caps.get(3).map_or("", |m| m.as_str());

    let value = parse_value(&name, raw)?;
    if value.is_empty() {
        return Err(ErrorKind::VariableValueMissing { name });
    }
    Ok(Some((name, value)))
}

/// Parses the right-hand side of an assignment, quoted or bare.
fn parse_value(name: &str, raw: &str) -> Result<String, ErrorKind> {
    let quote = match raw.chars().next() {
        Some(q @ ('"' | '\'')) => q,
        _ => {
            let value = strip_comment(raw).trim_end();
            if value.ends_with(['"', '\'']) {
                return Err(ErrorKind::VariableQuoteMismatch {
                    name: name.to_string(),
                });
            }
            return Ok(value.to_string());
        }
    };

    let mut value = String::new();
    let mut closed_at = None;
    let mut chars = raw.char_indices().skip(1);
    while let Some((pos, c)) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some((_, escaped @ ('"' | '\''))) => value.push(escaped),
                Some((_, other)) => {
                    value.push('\\');
                    value.push(other);
                }
                None => value.push('\\'),
            },
            c if c == quote => {
                closed_at = Some(pos + c.len_utf8());
                break;
            }
            c => value.push(c),
        }
    }

    let end = closed_at.ok_or_else(|| ErrorKind::VariableQuoteMismatch {
        name: name.to_string(),
    })?;
    if !is_empty(raw.get(end..).unwrap_or("")) {
        return Err(ErrorKind::VariableSyntax {
            name: name.to_string(),
        });
    }
    Ok(value)
}

/// A `name|alt: [dep, ...]` line.
///
/// Returns `Ok(None)` when the text before the first colon is not a list of names, so the
/// caller decides whether that is an error in its state. An indented line with a colon is
/// always `CommandHeaderIndentation`, whatever the rest of it holds.
pub fn header(line: &str) -> Result<Option<CommandHeader>, ErrorKind> {
    if INDENTED_HEADER_RE.is_match(line) {
        return Err(ErrorKind::CommandHeaderIndentation);
    }
    let Some(caps) = HEADER_RE.captures(line) else {
        return Ok(None);
    };
    let names_part = caps.get(1).map_or("", |m| m.as_str());
    let rest = caps.get(2).map_or("", |m| m.as_str());

    let mut names = names_part.split('|').map(str::trim);
    let name = match names.next() {
        Some(n) if NAME_RE.is_match(n) => n.to_string(),
        _ => return Ok(None),
    };
    let alternatives: Vec<&str> = names.collect();
    if alternatives
        .iter()
        .any(|alt| !alt.is_empty() && !NAME_RE.is_match(alt))
    {
        return Ok(None);
    }

    if alternatives.iter().any(|alt| alt.is_empty()) {
        return Err(ErrorKind::CommandHeaderEmptyAlternative);
    }
    if let Some(disabled) = std::iter::once(name.as_str())
        .chain(alternatives.iter().copied())
        .find(|n| DISABLED_COMMAND_NAMES.contains(n))
    {
        return Err(ErrorKind::CommandHeaderDisabledName {
            name: disabled.to_string(),
        });
    }

    let dependencies = parse_dependencies(rest)?;

    let mut alternatives: Vec<String> = alternatives.into_iter().map(str::to_string).collect();
    sort_longest_first(&mut alternatives);

    Ok(Some(CommandHeader {
        name,
        alternatives,
        dependencies,
    }))
}

/// Parses whatever follows the colon of a header: nothing, a comment, or `[dep, ...]`.
fn parse_dependencies(rest: &str) -> Result<Vec<String>, ErrorKind> {
    let rest = rest.trim_start();
    if is_empty(rest) {
        return Ok(Vec::new());
    }
    let Some(bracketed) = rest.strip_prefix('[') else {
        return Err(ErrorKind::CommandHeaderSyntax);
    };

    let close = match (bracketed.find(']'), bracketed.find('#')) {
        (Some(close), Some(hash)) if hash < close => {
            return Err(ErrorKind::CommandHeaderCommentInDependencyList);
        }
        (None, Some(_)) => return Err(ErrorKind::CommandHeaderCommentInDependencyList),
        (None, None) => return Err(ErrorKind::CommandHeaderMissingClosingBracket),
        (Some(close), _) => close,
    };
    let inner = bracketed.get(..close).unwrap_or("");
    if !is_empty(bracketed.get(close + 1..).unwrap_or("")) {
        return Err(ErrorKind::CommandHeaderSyntax);
    }
    if inner.trim().is_empty() {
        return Err(ErrorKind::CommandHeaderEmptyDependencyList);
    }

    inner
        .split(',')
        .map(str::trim)
        .map(|dep| {
            if NAME_RE.is_match(dep) {
                Ok(dep.to_string())
            } else {
                Err(ErrorKind::CommandHeaderInvalidDependencyList)
            }
        })
        .collect()
}

/// Orders names longest first. Names of equal length keep their order.
pub fn sort_longest_first(names: &mut [String]) {
    names.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));
}
