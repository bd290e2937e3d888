//! Transformation spec documents and their composition
//!
//! A spec declares named inputs (transformers) and an output template, and
//! may `use` other specs to import their inputs. Loading resolves the whole
//! `use` graph into a single [`ComposedSpec`].
//!
//! Copyright (c) 2025 Jsonatr Team
//! Licensed under the Apache-2.0 license

pub mod composer;
pub mod error;
pub mod source;

pub use composer::{ComposedSpec, Composer, ComposerOptions};
pub use error::{LoadError, LoadResult};
pub use source::{FileSpecSource, MemorySpecSource, SpecSource};

use crate::transformer::OutputFormat;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Identity of a loaded spec, as produced by a [`SpecSource`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpecId(String);

impl SpecId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identity used for specs handed to the engine directly
    pub fn inline() -> Self {
        Self::new("<inline>")
    }

    /// Pseudo-origin of builtin transformers
    pub fn builtin() -> Self {
        Self::new("<builtin>")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SpecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A transformation spec document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformSpec {
    #[serde(default)]
    pub description: String,

    /// Other specs whose inputs are imported, in precedence order
    #[serde(default, rename = "use", skip_serializing_if = "Vec::is_empty")]
    pub uses: Vec<String>,

    #[serde(default, alias = "inputs", skip_serializing_if = "Vec::is_empty")]
    pub input: Vec<NamedInput>,

    /// Output template; absent for specs that only provide transformers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
}

impl TransformSpec {
    /// Deserialize a spec from a JSON value
    pub fn from_value(value: Value, id: &SpecId) -> LoadResult<Self> {
        serde_json::from_value(value).map_err(|e| LoadError::parse(id.as_str(), e.to_string()))
    }

    /// Parse a spec from JSON text
    pub fn from_json_str(text: &str) -> LoadResult<Self> {
        serde_json::from_str(text).map_err(|e| LoadError::parse(SpecId::inline().as_str(), e.to_string()))
    }

    /// Parse a spec from YAML text
    pub fn from_yaml_str(text: &str) -> LoadResult<Self> {
        serde_yaml::from_str(text).map_err(|e| LoadError::parse(SpecId::inline().as_str(), e.to_string()))
    }
}

/// How a named input produces its value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InputKind {
    /// `source` is a template
    #[default]
    Inline,
    /// `source` names a document whose content is the template
    File,
    /// `source` is a command line run as an external transformer
    #[serde(alias = "COMMAND")]
    External,
}

fn default_stdin() -> bool {
    true
}

/// A named input declared by a spec
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedInput {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub kind: InputKind,

    /// Local bindings visible while evaluating `source`
    #[serde(default, rename = "let", skip_serializing_if = "Map::is_empty")]
    pub bindings: Map<String, Value>,

    pub source: Value,

    /// EXTERNAL only: pipe the current value to the process
    #[serde(default = "default_stdin")]
    pub stdin: bool,

    /// EXTERNAL only: extra arguments appended to the command line
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,

    /// EXTERNAL only: how to decode the process output
    #[serde(default)]
    pub format: OutputFormat,
}
