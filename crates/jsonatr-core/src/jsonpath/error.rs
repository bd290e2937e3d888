//! Error types for path parsing and resolution
//!
//! Parse failures carry the offending input and byte position so callers can
//! render a caret under the problem; resolution failures carry the path
//! prefix that was being evaluated.
//!
//! Copyright (c) 2025 Jsonatr Team
//! Licensed under the Apache-2.0 license

use thiserror::Error;

/// Result alias for path operations
pub type PathResult<T> = std::result::Result<T, PathError>;

/// Path parsing and resolution errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PathError {
    /// Malformed expression
    #[error("Parse error at position {position}: {message}")]
    Parse {
        message: String,
        position: usize,
        input: String,
    },

    /// Unexpected token with the set of tokens that would have been accepted
    #[error("Syntax error at position {position}: {message}")]
    Syntax {
        message: String,
        position: usize,
        input: String,
        expected: Vec<String>,
        found: String,
    },

    /// A singular path addressed a member that does not exist
    #[error("No value at {path}: member '{member}' not found")]
    NotFound { member: String, path: String },

    /// A singular path indexed past the end of an array
    #[error("Index out of bounds at {path}: {index} in array of length {length}")]
    IndexOutOfBounds {
        index: i64,
        length: usize,
        path: String,
    },

    /// Field access on a non-object, index on a non-array, or similar
    #[error("Type mismatch at {path}: expected {expected}, found {found}")]
    TypeMismatch {
        expected: String,
        found: String,
        path: String,
    },

    /// Runtime failure while walking the document
    #[error("Execution error: {message}")]
    Execution { message: String, path: String },
}

impl PathError {
    /// Create a parse error with position
    pub fn parse(message: impl Into<String>, position: usize, input: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            position,
            input: input.into(),
        }
    }

    /// Create a syntax error with detailed information
    pub fn syntax(
        message: impl Into<String>,
        position: usize,
        input: impl Into<String>,
        expected: Vec<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::Syntax {
            message: message.into(),
            position,
            input: input.into(),
            expected,
            found: found.into(),
        }
    }

    /// Create a not-found error
    pub fn not_found(member: impl Into<String>, path: impl Into<String>) -> Self {
        Self::NotFound {
            member: member.into(),
            path: path.into(),
        }
    }

    /// Create an index out of bounds error
    pub fn index_out_of_bounds(index: i64, length: usize, path: impl Into<String>) -> Self {
        Self::IndexOutOfBounds {
            index,
            length,
            path: path.into(),
        }
    }

    /// Create a type mismatch error
    pub fn type_mismatch(
        expected: impl Into<String>,
        found: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
            path: path.into(),
        }
    }

    /// Create an execution error
    pub fn execution(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::Execution {
            message: message.into(),
            path: path.into(),
        }
    }

    /// Whether this error came from parsing rather than resolution
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::Parse { .. } | Self::Syntax { .. })
    }

    /// Get the error message with a caret under the failing position
    pub fn detailed_message(&self) -> String {
        match self {
            Self::Parse { message, position, input } => {
                let mut result = format!("Parse error at position {}: {}", position, message);
                push_caret(&mut result, input, *position);
                result
            }
            Self::Syntax { message, position, input, expected, found } => {
                let mut result = format!("Syntax error at position {}: {}", position, message);
                result.push_str(&format!("\nExpected one of: {}", expected.join(", ")));
                result.push_str(&format!("\nFound: {}", found));
                push_caret(&mut result, input, *position);
                result
            }
            _ => self.to_string(),
        }
    }
}

fn push_caret(result: &mut String, input: &str, position: usize) {
    if input.is_empty() {
        return;
    }
    result.push_str(&format!("\nInput: {}", input));
    if position <= input.len() {
        let column = input[..floor_char_boundary(input, position)].chars().count();
        result.push_str(&format!("\n       {}^", " ".repeat(column)));
    }
}

fn floor_char_boundary(input: &str, mut position: usize) -> usize {
    while position > 0 && !input.is_char_boundary(position) {
        position -= 1;
    }
    position
}
