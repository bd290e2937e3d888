//! Error types for the transformation engine
//!
//! Each stage has its own error enum (`PathError`, `TransformError`,
//! `LoadError`); this module wraps them and adds the context wrappers that
//! tell the user where in a spec a failure happened.
//!
//! Copyright (c) 2025 Jsonatr Team
//! Licensed under the Apache-2.0 license

use crate::jsonpath::PathError;
use crate::spec::LoadError;
use crate::transformer::TransformError;
use thiserror::Error;

/// Main error type for transformation operations
#[derive(Error, Debug)]
pub enum Error {
    /// Path parsing or resolution failure
    #[error(transparent)]
    Path(#[from] PathError),

    /// Transformer application failure
    #[error(transparent)]
    Transform(#[from] TransformError),

    /// Spec loading or composition failure
    #[error(transparent)]
    Load(#[from] LoadError),

    /// `$name` is neither bound in scope nor a defined input
    #[error("Unknown name '${name}': not bound in scope and not a defined input")]
    UnknownName { name: String },

    /// Nested definition calls exceeded the configured depth
    #[error("Call depth limit of {limit} exceeded while evaluating '{name}'")]
    RecursionLimit { name: String, limit: usize },

    /// A pipeline stage failed
    #[error("Stage {index} ('{name}') failed: {source}")]
    Stage {
        index: usize,
        name: String,
        source: Box<Error>,
    },

    /// `map` failed on one element
    #[error("Element {index} failed: {source}")]
    Element { index: usize, source: Box<Error> },

    /// Failure while evaluating the template leaf at `location`
    #[error("At {location}: {source}")]
    At { location: String, source: Box<Error> },

    /// JSON serialization or deserialization error
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type alias for transformation operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an unknown name error
    pub fn unknown_name(name: impl Into<String>) -> Self {
        Self::UnknownName { name: name.into() }
    }

    /// Wrap with the template location being evaluated
    pub fn at(self, location: impl Into<String>) -> Self {
        Self::At {
            location: location.into(),
            source: Box::new(self),
        }
    }

    /// Wrap with the failing pipeline stage
    pub fn in_stage(self, index: usize, name: impl Into<String>) -> Self {
        Self::Stage {
            index,
            name: name.into(),
            source: Box::new(self),
        }
    }

    /// Wrap with the failing `map` element
    pub fn in_element(self, index: usize) -> Self {
        Self::Element {
            index,
            source: Box::new(self),
        }
    }

    /// The underlying failure with every context wrapper removed
    pub fn root_cause(&self) -> &Error {
        match self {
            Self::Stage { source, .. } | Self::Element { source, .. } | Self::At { source, .. } => {
                source.root_cause()
            }
            other => other,
        }
    }

    /// The outermost template location, if the failure happened inside a template
    pub fn location(&self) -> Option<&str> {
        match self {
            Self::At { location, .. } => Some(location),
            Self::Stage { source, .. } | Self::Element { source, .. } => source.location(),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}
