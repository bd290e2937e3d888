//! Error types and handling for the CLI
//!
//! Every failure maps to a process exit code; engine errors keep their own
//! context chain and are rendered with the failing location first.
//!
//! Copyright (c) 2025 Jsonatr Team
//! Licensed under the Apache-2.0 license

use std::io;
use std::path::PathBuf;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for CLI operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error (file operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error from jsonatr-core
    #[error("{0}")]
    Core(#[from] jsonatr_core::Error),

    /// File not found
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// Input document that is not valid JSON or YAML
    #[error("Invalid {expected} in {}: {message}", path.display())]
    InvalidFormat {
        path: PathBuf,
        expected: String,
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid argument combination
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{message}")]
    Other { message: String },
}

impl From<jsonatr_core::LoadError> for Error {
    fn from(error: jsonatr_core::LoadError) -> Self {
        Self::Core(error.into())
    }
}

impl From<jsonatr_core::PathError> for Error {
    fn from(error: jsonatr_core::PathError) -> Self {
        Self::Core(error.into())
    }
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an invalid arguments error
    pub fn invalid_args(message: impl Into<String>) -> Self {
        Self::InvalidArgs(message.into())
    }

    /// Create a generic error with message
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Io(_) => 1,
            Self::Core(error) => match error.root_cause() {
                jsonatr_core::Error::Load(_) => 3,
                jsonatr_core::Error::Path(e) if e.is_parse_error() => 4,
                _ => 2,
            },
            Self::FileNotFound { .. } => 5,
            Self::InvalidFormat { .. } => 6,
            Self::Config(_) => 7,
            Self::InvalidArgs(_) => 8,
            Self::Json(_) => 12,
            Self::Other { .. } => 99,
        }
    }

    /// Check if this error should display usage help
    pub fn should_show_help(&self) -> bool {
        matches!(self, Self::InvalidArgs(_))
    }
}

/// Format an error for display to the user
pub fn format_error(error: &Error, use_color: bool) -> String {
    let mut message = error.to_string();

    // Parse errors get the caret diagram under the offending expression
    if let Error::Core(core) = error {
        if let jsonatr_core::Error::Path(path_error) = core.root_cause() {
            if path_error.is_parse_error() {
                message = format!("{}\n\n{}", message, path_error.detailed_message());
            }
        }
    }

    if use_color {
        use colored::Colorize;
        format!("{} {}", "Error:".red().bold(), message)
    } else {
        format!("Error: {}", message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonatr_core::{LoadError, PathQuery};

    #[test]
    fn test_exit_codes_by_category() {
        let load: Error = LoadError::MissingOutput {
            spec: "spec.json".to_string(),
        }
        .into();
        assert_eq!(load.exit_code(), 3);

        let parse: Error = PathQuery::parse("$.a[").unwrap_err().into();
        assert_eq!(parse.exit_code(), 4);

        let runtime: Error = jsonatr_core::Error::unknown_name("missing").at("output.x").into();
        assert_eq!(runtime.exit_code(), 2);

        assert_eq!(Error::invalid_args("bad").exit_code(), 8);
        assert!(Error::invalid_args("bad").should_show_help());
        assert!(!Error::config("bad").should_show_help());
    }

    #[test]
    fn test_format_error_plain() {
        let error = Error::FileNotFound {
            path: PathBuf::from("missing.json"),
        };
        assert_eq!(format_error(&error, false), "Error: File not found: missing.json");
    }

    #[test]
    fn test_format_error_includes_caret_for_parse_errors() {
        let error: Error = PathQuery::parse("$.a[").unwrap_err().into();
        let formatted = format_error(&error, false);
        assert!(formatted.starts_with("Error: "));
        assert!(formatted.contains('^'));
    }
}
