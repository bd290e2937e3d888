//! Pipeline expressions
//!
//! A template string starting with `$` is an expression of the form
//!
//! ```text
//! $name.path | stage | stage(arg, arg)
//! ```
//!
//! The source is a variable (`$name`, or a bare `$` for the current root)
//! optionally followed by a path; each stage names a transformer. `$$` at the
//! start of a string escapes a literal `$`.
//!
//! Copyright (c) 2025 Jsonatr Team
//! Licensed under the Apache-2.0 license

use crate::jsonpath::{PathError, PathQuery, PathResult};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

static STAGE_REGEX: OnceLock<Regex> = OnceLock::new();

fn stage_regex() -> &'static Regex {
    STAGE_REGEX.get_or_init(|| {
        Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\s*(?:\(\s*([^)]*?)\s*\))?$")
            .expect("stage pattern is a valid regex")
    })
}

/// What a template string leaf stands for
#[derive(Debug, Clone, PartialEq)]
pub enum Leaf {
    /// A plain string, with any `$$` escape already removed
    Literal(String),
    Expression(Expression),
}

impl Leaf {
    /// Classify a template string
    pub fn parse(text: &str) -> PathResult<Self> {
        if let Some(rest) = text.strip_prefix("$$") {
            Ok(Leaf::Literal(format!("${}", rest)))
        } else if text.starts_with('$') {
            Expression::parse(text).map(Leaf::Expression)
        } else {
            Ok(Leaf::Literal(text.to_string()))
        }
    }
}

/// Where a pipeline takes its initial value from
#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    /// `None` for a bare `$`
    pub variable: Option<String>,
    pub path: Option<PathQuery>,
}

/// A transformer call in a pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    pub name: String,
    pub args: Vec<String>,
}

/// A parsed `source | stage | ...` expression
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub source: Source,
    pub stages: Vec<Stage>,
}

impl Expression {
    /// Parse an expression; `text` must start with `$`
    pub fn parse(text: &str) -> PathResult<Self> {
        let segments = split_stages(text);
        let mut segments = segments.into_iter();

        let (head_offset, head) = segments
            .next()
            .ok_or_else(|| PathError::parse("empty expression", 0, text))?;
        let source = parse_source(text, head_offset, head)?;

        let stages = segments
            .map(|(offset, segment)| parse_stage(text, offset, segment))
            .collect::<PathResult<Vec<_>>>()?;

        Ok(Self { source, stages })
    }

    /// The variable the expression reads, if it is not the bare root
    pub fn variable(&self) -> Option<&str> {
        self.source.variable.as_deref()
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.source.variable.as_deref().unwrap_or(""))?;
        if let Some(path) = &self.source.path {
            // the query displays with its own leading '$'
            let rendered = path.to_string();
            write!(f, "{}", rendered.strip_prefix('$').unwrap_or(&rendered))?;
        }
        for stage in &self.stages {
            write!(f, " | {}", stage.name)?;
            if !stage.args.is_empty() {
                write!(f, "({})", stage.args.join(", "))?;
            }
        }
        Ok(())
    }
}

/// Split on top-level `|`, skipping `||` and anything inside brackets,
/// parentheses or quotes. Returns each segment with its byte offset.
fn split_stages(text: &str) -> Vec<(usize, &str)> {
    let bytes = text.as_bytes();
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let byte = bytes[i];
        match quote {
            Some(q) => {
                if byte == b'\\' {
                    i += 1;
                } else if byte == q {
                    quote = None;
                }
            }
            None => match byte {
                b'\'' | b'"' => quote = Some(byte),
                b'[' | b'(' => depth += 1,
                b']' | b')' => depth = depth.saturating_sub(1),
                b'|' if bytes.get(i + 1) == Some(&b'|') => i += 1,
                b'|' if depth == 0 => {
                    segments.push((start, &text[start..i]));
                    start = i + 1;
                }
                _ => {}
            },
        }
        i += 1;
    }

    segments.push((start, &text[start..]));
    segments
}

fn parse_source(text: &str, offset: usize, segment: &str) -> PathResult<Source> {
    let trimmed = segment.trim_end();
    let rest = trimmed
        .strip_prefix('$')
        .ok_or_else(|| PathError::parse("expression must start with '$'", offset, text))?;

    let name_len = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(rest.len());
    let (name, path) = rest.split_at(name_len);
    let variable = (!name.is_empty()).then(|| name.to_string());

    let path = if path.is_empty() {
        None
    } else if path.starts_with('.') || path.starts_with('[') {
        let query = PathQuery::parse(&format!("${}", path)).map_err(|e| match e {
            PathError::Parse { message, position, .. } | PathError::Syntax { message, position, .. } => {
                // re-anchor the position: the query's '$' stands for "$name"
                PathError::parse(message, offset + name_len + position, text)
            }
            other => other,
        })?;
        Some(query)
    } else {
        return Err(PathError::parse(
            format!("unexpected '{}' after variable name", path.chars().next().unwrap_or(' ')),
            offset + 1 + name_len,
            text,
        ));
    };

    Ok(Source { variable, path })
}

fn parse_stage(text: &str, offset: usize, segment: &str) -> PathResult<Stage> {
    let trimmed = segment.trim();
    let captures = stage_regex().captures(trimmed).ok_or_else(|| {
        let position = offset + (segment.len() - segment.trim_start().len());
        if trimmed.is_empty() {
            PathError::parse("empty pipeline stage", position, text)
        } else {
            PathError::parse(format!("invalid transformer call '{}'", trimmed), position, text)
        }
    })?;

    let name = captures[1].to_string();
    let args = match captures.get(2) {
        Some(args) if !args.as_str().is_empty() => args
            .as_str()
            .split(',')
            .map(|arg| arg.trim().to_string())
            .collect(),
        _ => Vec::new(),
    };

    if args.iter().any(String::is_empty) {
        return Err(PathError::parse(
            format!("empty argument in call to '{}'", name),
            offset,
            text,
        ));
    }

    Ok(Stage { name, args })
}
