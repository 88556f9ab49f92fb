// src/core/interpolator.rs

use crate::models::Variable;
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::collections::BTreeMap;

lazy_static! {
    // `${name}` or `$name`.
    static ref REFERENCE_REGEX: Regex =
        Regex::new(r"\$\{([\w.-]+)\}|\$([\w.-]+)").expect("Invalid variable reference regex");
}

/// Substitutes global variables into script lines and descriptions.
///
/// Both `${name}` and `$name` are recognised. The braced form needs an exact name. In the
/// short form the longest defined variable that prefixes the name run wins, and whatever
/// follows it is kept verbatim, so `$out_dir/bin` and `$target.exe` work as expected.
/// References to undefined names (`$HOME`, `${PATH}`) are left untouched for the shell.
///
/// Substitution is a single pass: a substituted value is never scanned again.
#[derive(Debug, Clone, Copy)]
pub struct Interpolator<'a> {
    variables: &'a BTreeMap<String, Variable>,
}

impl<'a> Interpolator<'a> {
    pub fn new(variables: &'a BTreeMap<String, Variable>) -> Self {
        Self { variables }
    }

    /// Returns `text` with every known variable reference replaced by its value.
    pub fn expand(&self, text: &str) -> String {
        if self.variables.is_empty() || !text.contains('$') {
            return text.to_string();
        }
        REFERENCE_REGEX
            .replace_all(text, |caps: &Captures<'_>| self.replacement(caps))
            .into_owned()
    }

    fn replacement(&self, caps: &Captures<'_>) -> String {
        let whole = caps.get(0).map_or("", |m| m.as_str());

        if let Some(name) = caps.get(1) {
            return match self.variables.get(name.as_str()) {
                Some(var) => var.value.clone(),
                None => whole.to_string(),
            };
        }

        let Some(run) = caps.get(2).map(|m| m.as_str()) else {
            return whole.to_string();
        };
        match self.longest_prefix(run) {
            Some((name, var)) => {
                let rest = run.get(name.len()..).unwrap_or("");
                format!("{}{}", var.value, rest)
            }
            None => whole.to_string(),
        }
    }

    fn longest_prefix(&self, run: &str) -> Option<(&'a str, &'a Variable)> {
        self.variables
            .iter()
            .filter(|(name, _)| run.starts_with(name.as_str()))
            .max_by_key(|(name, _)| name.len())
            .map(|(name, var)| (name.as_str(), var))
    }

    /// Expands an optional description.
    pub fn expand_opt(&self, text: Option<String>) -> Option<String> {
        text.map(|t| self.expand(&t))
    }
}
