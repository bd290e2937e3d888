//! Shared utilities for command handlers
//!
//! Copyright (c) 2025 Jsonatr Team
//! Licensed under the Apache-2.0 license

use crate::error::{Error, Result};
use jsonatr_core::{ComposedSpec, Engine, FileSpecSource, RootInputs};
use serde_json::{Map, Value};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Read a JSON or YAML document; `-` reads JSON from stdin
pub fn read_document(path: &Path) -> Result<Value> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return parse_document(path, &text, false);
    }

    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let text = fs::read_to_string(path)?;
    debug!(path = %path.display(), bytes = text.len(), "Read document");
    parse_document(path, &text, is_yaml(path))
}

fn parse_document(path: &Path, text: &str, yaml: bool) -> Result<Value> {
    if yaml {
        serde_yaml::from_str(text).map_err(|e| Error::InvalidFormat {
            path: path.to_path_buf(),
            expected: "YAML".to_string(),
            message: e.to_string(),
        })
    } else {
        serde_json::from_str(text).map_err(|e| Error::InvalidFormat {
            path: path.to_path_buf(),
            expected: "JSON".to_string(),
            message: e.to_string(),
        })
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|s| s.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Build the root inputs from `--input` and `--var` arguments.
///
/// With `--input` the document is the root and each variable is bound
/// alongside it. Without it, the root is the object of all variables.
pub fn root_inputs(input: Option<&Path>, vars: &[(String, PathBuf)]) -> Result<RootInputs> {
    if vars.iter().filter(|(_, path)| path == Path::new("-")).count()
        + usize::from(input == Some(Path::new("-")))
        > 1
    {
        return Err(Error::invalid_args("stdin ('-') can be read only once"));
    }

    let mut named = Map::new();
    for (name, path) in vars {
        if named.contains_key(name) {
            return Err(Error::invalid_args(format!("variable '{}' bound twice", name)));
        }
        named.insert(name.clone(), read_document(path)?);
    }

    Ok(match input {
        Some(path) => {
            let root = read_document(path)?;
            named
                .into_iter()
                .fold(RootInputs::new(root), |inputs, (name, value)| {
                    inputs.with_variable(name, value)
                })
        }
        None if !named.is_empty() => RootInputs::from_named(named),
        None => RootInputs::new(Value::Null),
    })
}

/// Load and compose the spec at `path`; `use` and FILE references resolve
/// relative to the spec's own directory
pub fn load_spec(engine: &Engine, path: &Path) -> Result<ComposedSpec> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let source = FileSpecSource::default();
    let composed = engine.load(&path.to_string_lossy(), &source)?;
    debug!(
        spec = %composed.id,
        definitions = composed.registry.len(),
        "Composed spec"
    );
    Ok(composed)
}
