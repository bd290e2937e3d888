//! Core types for the transformer system
//!
//! Copyright (c) 2025 Jsonatr Team
//! Licensed under the Apache-2.0 license

use super::built_in::Builtin;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// Errors raised while applying a transformer
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    /// No builtin or definition with this name
    #[error("Unknown transformer '{name}'")]
    UnknownTransformer { name: String },

    /// External process could not be run, exited non-zero, or emitted bad output
    #[error("External transformer '{name}' failed: {message}")]
    ExternalFailure {
        name: String,
        message: String,
        status: Option<i32>,
        stderr: String,
    },

    /// Input value has the wrong shape for the transformer
    #[error("Transformer '{name}' expected {expected}, found {found}")]
    ShapeMismatch {
        name: String,
        expected: String,
        found: String,
    },

    /// A single value was required but the sequence was empty
    #[error("Transformer '{name}' received an empty sequence")]
    EmptySequence { name: String },

    /// A single value was required but the sequence held several
    #[error("Transformer '{name}' received {count} values where exactly one was expected")]
    MultipleValues { name: String, count: usize },

    /// Wrong number of arguments in a pipeline stage
    #[error("Transformer '{name}' takes {expected} argument(s), got {found}")]
    Arity {
        name: String,
        expected: usize,
        found: usize,
    },

    /// Scalar conversion failed
    #[error("Type conversion failed: cannot convert {from} to {to} for value: {value}")]
    TypeConversion {
        from: String,
        to: String,
        value: String,
    },
}

impl TransformError {
    /// Create an unknown transformer error
    pub fn unknown(name: impl Into<String>) -> Self {
        Self::UnknownTransformer { name: name.into() }
    }

    /// Create an external failure error
    pub fn external(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExternalFailure {
            name: name.into(),
            message: message.into(),
            status: None,
            stderr: String::new(),
        }
    }

    /// Create a shape mismatch error
    pub fn shape(name: impl Into<String>, expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::ShapeMismatch {
            name: name.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }
}

/// How an external transformer's standard output is decoded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OutputFormat {
    /// A single JSON document; anything else is a failure
    #[default]
    Json,
    /// Raw text, trimmed, yielded as a JSON string
    Text,
}

/// A composite transformer defined by a template
#[derive(Debug, Clone, PartialEq)]
pub struct InternalTransformer {
    /// Ordered `let` bindings, each a template
    pub bindings: Map<String, Value>,
    /// Template evaluated with the transformer input as `$`
    pub source: Value,
}

/// An external program invocation
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalCommand {
    pub program: String,
    pub args: Vec<String>,
    /// Whether the current value is written to the process's stdin
    pub stdin: bool,
    pub format: OutputFormat,
}

impl ExternalCommand {
    /// Build a command from a spec `source` (a command line or an argv array)
    /// plus extra arguments
    pub fn from_source(
        source: &Value,
        extra_args: &[String],
        stdin: bool,
        format: OutputFormat,
    ) -> std::result::Result<Self, String> {
        let mut argv = match source {
            Value::String(line) => shell_words::split(line)
                .map_err(|e| format!("cannot split command line '{}': {}", line, e))?,
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| format!("command array entries must be strings, found {}", item))
                })
                .collect::<std::result::Result<Vec<_>, _>>()?,
            other => return Err(format!("command must be a string or an array, found {}", other)),
        };

        if argv.is_empty() {
            return Err("command is empty".to_string());
        }

        let program = argv.remove(0);
        argv.extend(extra_args.iter().cloned());

        Ok(Self {
            program,
            args: argv,
            stdin,
            format,
        })
    }
}

impl fmt::Display for ExternalCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut words = Vec::with_capacity(self.args.len() + 1);
        words.push(self.program.as_str());
        words.extend(self.args.iter().map(String::as_str));
        write!(f, "{}", shell_words::join(words))
    }
}

/// A named transformer: builtin, template-defined, or external process
#[derive(Debug, Clone, PartialEq)]
pub enum Transformer {
    Builtin(Builtin),
    Internal(InternalTransformer),
    External(ExternalCommand),
}

impl Transformer {
    /// Short label for listings and logs
    pub fn kind(&self) -> &'static str {
        match self {
            Transformer::Builtin(_) => "builtin",
            Transformer::Internal(_) => "internal",
            Transformer::External(_) => "external",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_command_from_string_source() {
        let command = ExternalCommand::from_source(
            &json!("jq -c '.items | length'"),
            &["--tab".to_string()],
            true,
            OutputFormat::Json,
        )
        .expect("command should build");

        assert_eq!(command.program, "jq");
        assert_eq!(command.args, vec!["-c", ".items | length", "--tab"]);
    }

    #[test]
    fn test_command_from_array_source() {
        let command = ExternalCommand::from_source(
            &json!(["date", "-I"]),
            &[],
            false,
            OutputFormat::Text,
        )
        .expect("command should build");

        assert_eq!(command.program, "date");
        assert_eq!(command.args, vec!["-I"]);
        assert!(!command.stdin);
    }

    #[test]
    fn test_command_rejects_bad_sources() {
        assert!(ExternalCommand::from_source(&json!(""), &[], true, OutputFormat::Json).is_err());
        assert!(ExternalCommand::from_source(&json!(42), &[], true, OutputFormat::Json).is_err());
        assert!(ExternalCommand::from_source(&json!(["a", 1]), &[], true, OutputFormat::Json).is_err());
        assert!(ExternalCommand::from_source(&json!("echo 'open"), &[], true, OutputFormat::Json).is_err());
    }

    #[test]
    fn test_command_display_quotes_arguments() {
        let command = ExternalCommand::from_source(&json!(["sh", "-c", "cat -"]), &[], true, OutputFormat::Json)
            .expect("command should build");
        assert_eq!(command.to_string(), "sh -c 'cat -'");
    }

    #[test]
    fn test_output_format_serde() {
        let format: OutputFormat = serde_json::from_value(json!("TEXT")).expect("format should parse");
        assert_eq!(format, OutputFormat::Text);
        assert_eq!(OutputFormat::default(), OutputFormat::Json);
    }
}
