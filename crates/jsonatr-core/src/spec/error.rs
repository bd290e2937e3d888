//! Error types for spec loading and composition
//!
//! Copyright (c) 2025 Jsonatr Team
//! Licensed under the Apache-2.0 license

use thiserror::Error;

/// Result type alias for loading operations
pub type LoadResult<T> = std::result::Result<T, LoadError>;

/// Errors raised while loading and composing specs
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    /// The `use` graph contains a cycle; `chain` ends with the repeated spec
    #[error("Cyclic import: {}", .chain.join(" -> "))]
    CyclicImport { chain: Vec<String> },

    /// A spec or file reference could not be resolved
    #[error("Cannot resolve '{reference}' from {from}: {reason}")]
    UnresolvableRef {
        reference: String,
        from: String,
        reason: String,
    },

    /// Two inputs with the same name in one spec
    #[error("Duplicate input '{name}' in {spec}")]
    DuplicateInput { name: String, spec: String },

    /// An input uses a builtin transformer's name
    #[error("Input name '{name}' in {spec} is reserved for a builtin transformer")]
    ReservedName { name: String, spec: String },

    /// Conflicting definitions under the reject policy
    #[error("Conflicting definitions of '{name}' in {first} and {second}")]
    Collision {
        name: String,
        first: String,
        second: String,
    },

    /// A named input that cannot be turned into a transformer
    #[error("Invalid definition of '{name}' in {spec}: {reason}")]
    InvalidDefinition {
        name: String,
        spec: String,
        reason: String,
    },

    /// The root spec has no `output` template
    #[error("Spec {spec} has no output template")]
    MissingOutput { spec: String },

    /// Imports nest deeper than the configured limit
    #[error("Import depth limit of {limit} exceeded at {spec}")]
    ImportDepthExceeded { spec: String, limit: usize },

    /// A referenced document could not be read
    #[error("Cannot read {path}: {message}")]
    Io { path: String, message: String },

    /// A referenced document is not a valid spec or JSON/YAML value
    #[error("Cannot parse {spec}: {message}")]
    Parse { spec: String, message: String },
}

impl LoadError {
    /// Create an unresolvable reference error
    pub fn unresolvable(
        reference: impl Into<String>,
        from: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::UnresolvableRef {
            reference: reference.into(),
            from: from.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid definition error
    pub fn invalid_definition(
        name: impl Into<String>,
        spec: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidDefinition {
            name: name.into(),
            spec: spec.into(),
            reason: reason.into(),
        }
    }

    /// Create a parse error
    pub fn parse(spec: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            spec: spec.into(),
            message: message.into(),
        }
    }

    /// Create an I/O error
    pub fn io(path: impl Into<String>, err: &std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message_shows_chain() {
        let err = LoadError::CyclicImport {
            chain: vec!["a.json".into(), "b.json".into(), "a.json".into()],
        };
        assert_eq!(err.to_string(), "Cyclic import: a.json -> b.json -> a.json");
    }

    #[test]
    fn test_io_error_keeps_message() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = LoadError::io("spec.json", &io);
        assert_eq!(err.to_string(), "Cannot read spec.json: no such file");
    }
}
