//! Pipeline execution
//!
//! Threads a value through the stages of an [`Expression`]. The source is
//! resolved first; every stage then receives the whole previous result.
//! Sequences are never broadcast implicitly, only `map` iterates.
//!
//! Copyright (c) 2025 Jsonatr Team
//! Licensed under the Apache-2.0 license

use crate::expression::Expression;
use crate::Result;
use serde_json::Value;
use std::borrow::Cow;
use tracing::{debug, trace};

/// Name resolution and transformer dispatch for a running pipeline
pub trait StageContext {
    /// Value of `$name`, or of the current root when `name` is `None`
    fn variable(&mut self, name: Option<&str>) -> Result<Cow<'_, Value>>;

    /// Apply the transformer called `name` to `input`
    fn invoke(&mut self, name: &str, args: &[String], input: Value) -> Result<Value>;
}

/// Run an expression. Stages are numbered from 1 in errors.
pub fn run(expression: &Expression, context: &mut dyn StageContext) -> Result<Value> {
    let mut value = {
        let base = context.variable(expression.variable())?;
        match &expression.source.path {
            Some(path) => {
                trace!(%path, "resolving path");
                path.resolve(&base)?
            }
            None => base.into_owned(),
        }
    };

    for (index, stage) in expression.stages.iter().enumerate() {
        let number = index + 1;
        debug!(stage = number, transformer = %stage.name, "applying pipeline stage");
        value = context
            .invoke(&stage.name, &stage.args, value)
            .map_err(|e| e.in_stage(number, stage.name.as_str()))?;
    }

    Ok(value)
}
