//! Binding templates - `{parameter}` substitution in path patterns
//!
//! A template is parsed once into literal and parameter segments:
//!
//! ```text
//! "input/{name}.txt"  →  [Literal("input/"), Parameter("name"), Literal(".txt")]
//! ```
//!
//! `{{` and `}}` stand for literal braces. Parameter names are identifiers
//! (`[A-Za-z_][A-Za-z0-9_]*`) and may appear only once per template.

use std::fmt;

use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;

use crate::error::{BindingError, Result};

use super::data::BindingData;

/// Pre-compiled regex for parameter names
static PARAMETER_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// One parsed fragment of a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal text, escapes already resolved
    Literal(String),
    /// Named parameter slot: `{name}`
    Parameter(String),
}

/// Parsed `{parameter}` template
///
/// Immutable after [`BindingTemplate::parse`]; safe to share across threads and
/// to bind concurrently with different values.
#[derive(Debug, Clone)]
pub struct BindingTemplate {
    pattern: String,
    segments: Vec<Segment>,
    /// Anchored matcher for reverse matching, built on first use
    matcher: OnceCell<Option<Regex>>,
}

impl PartialEq for BindingTemplate {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

impl Eq for BindingTemplate {}

impl BindingTemplate {
    /// Parse a template string into segments
    pub fn parse(pattern: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut names: Vec<&str> = Vec::new();
        let mut chars = pattern.char_indices().peekable();

        while let Some((i, ch)) = chars.next() {
            match ch {
                '{' if chars.peek().map(|(_, c)| *c) == Some('{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek().map(|(_, c)| *c) == Some('}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let end = loop {
                        match chars.next() {
                            Some((j, '}')) => break j,
                            Some((_, '{')) | None => {
                                return Err(format_error(
                                    pattern,
                                    format!("unterminated parameter at position {}", i),
                                ));
                            }
                            Some(_) => {}
                        }
                    };

                    let name = &pattern[i + 1..end];
                    if name.is_empty() {
                        return Err(format_error(
                            pattern,
                            format!("empty parameter name at position {}", i),
                        ));
                    }
                    if !PARAMETER_NAME_RE.is_match(name) {
                        return Err(format_error(
                            pattern,
                            format!("invalid parameter name '{}' at position {}", name, i),
                        ));
                    }
                    if names.contains(&name) {
                        return Err(format_error(
                            pattern,
                            format!("parameter '{}' appears more than once", name),
                        ));
                    }
                    names.push(name);

                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Parameter(name.to_string()));
                }
                '}' => {
                    return Err(format_error(
                        pattern,
                        format!("unmatched '}}' at position {}", i),
                    ));
                }
                c => literal.push(c),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            pattern: pattern.to_string(),
            segments,
            matcher: OnceCell::new(),
        })
    }

    /// The original pattern string
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Parameter names in order of appearance
    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Parameter(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    pub fn parameter_count(&self) -> usize {
        self.parameter_names().count()
    }

    pub fn has_parameters(&self) -> bool {
        self.parameter_names().next().is_some()
    }

    /// The literal text of a parameter-free template
    pub fn as_literal(&self) -> Option<String> {
        if self.has_parameters() {
            return None;
        }
        Some(
            self.segments
                .iter()
                .map(|segment| match segment {
                    Segment::Literal(text) | Segment::Parameter(text) => text.as_str(),
                })
                .collect(),
        )
    }

    /// Substitute parameter values into the template
    ///
    /// Fails with `MissingParameter` on the first parameter absent from `values`.
    pub fn bind(&self, values: &BindingData) -> Result<String> {
        let mut result = String::with_capacity(self.pattern.len() + 32);

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => result.push_str(text),
                Segment::Parameter(name) => {
                    let value = values
                        .get(name)
                        .ok_or_else(|| BindingError::MissingParameter {
                            parameter: name.clone(),
                            pattern: self.pattern.clone(),
                        })?;
                    result.push_str(value);
                }
            }
        }

        Ok(result)
    }

    /// Reverse of [`bind`](Self::bind): extract parameter values from a concrete string
    ///
    /// Each parameter matches a non-empty, shortest-possible run of characters.
    /// Returns `None` when `input` does not have the template's shape.
    pub fn match_values(&self, input: &str) -> Option<BindingData> {
        let matcher = self
            .matcher
            .get_or_init(|| Regex::new(&self.matcher_source()).ok())
            .as_ref()?;

        let captures = matcher.captures(input)?;
        let mut data = BindingData::new();
        for name in self.parameter_names() {
            data.insert(name, captures.name(name)?.as_str());
        }
        Some(data)
    }

    fn matcher_source(&self) -> String {
        let mut source = String::from("^");
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => source.push_str(&regex::escape(text)),
                Segment::Parameter(name) => {
                    source.push_str("(?P<");
                    source.push_str(name);
                    source.push_str(">.+?)");
                }
            }
        }
        source.push('$');
        source
    }
}

impl fmt::Display for BindingTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

fn format_error(pattern: &str, reason: String) -> BindingError {
    BindingError::Format {
        pattern: pattern.to_string(),
        reason,
    }
}
