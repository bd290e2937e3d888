//! Path expression executor
//!
//! Multi-match expressions run through the lenient selector pipeline and
//! always succeed with a (possibly empty) node list. Singular expressions are
//! walked strictly so that a missing member or out-of-range index is reported
//! with the path prefix where resolution stopped.
//!
//! Copyright (c) 2025 Jsonatr Team
//! Licensed under the Apache-2.0 license

use super::ast::*;
use super::error::*;
use super::filter::value_type_name;
use super::selector::{create_selector_executor, IndexSelector as IndexLookup, SelectionIterator};
use serde_json::Value;

/// Execution context for controlling execution behavior
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    /// Maximum nesting depth walked by recursive descent
    pub max_depth: usize,
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self { max_depth: 256 }
    }
}

/// Path expression executor
#[derive(Debug, Clone, Default)]
pub struct Executor {
    context: ExecutionContext,
}

impl Executor {
    /// Create a new executor with default context
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new executor with custom context
    pub fn with_context(context: ExecutionContext) -> Self {
        Self { context }
    }

    /// Execute an expression and return every matching node in document order
    pub fn execute<'a>(&self, expression: &PathExpression, data: &'a Value) -> PathResult<Vec<&'a Value>> {
        let mut current = SelectionIterator::single(data);

        for selector in &expression.selectors {
            if current.is_empty() {
                break;
            }
            let executor = create_selector_executor(selector, data, self.context.max_depth);
            current = executor.execute(current)?;
        }

        Ok(current.into_values())
    }

    /// Resolve a singular expression to exactly one node
    pub fn resolve_singular<'a>(&self, expression: &PathExpression, data: &'a Value) -> PathResult<&'a Value> {
        let mut current = data;
        let mut path = String::from("$");

        for selector in &expression.selectors {
            current = match selector {
                Selector::Child(child) => {
                    let name = child.name();
                    let next = match current {
                        Value::Object(obj) => obj
                            .get(name)
                            .ok_or_else(|| PathError::not_found(name, path.clone()))?,
                        other => {
                            return Err(PathError::type_mismatch(
                                "object",
                                value_type_name(other),
                                path,
                            ));
                        }
                    };
                    path.push_str(&child.to_string());
                    next
                }
                Selector::Index(index) => {
                    let next = match current {
                        Value::Array(array) => IndexLookup::effective_index(*index, array.len())
                            .map(|i| &array[i])
                            .ok_or_else(|| {
                                let signed = match index {
                                    IndexSelector::Positive(i) => {
                                        i64::try_from(*i).unwrap_or(i64::MAX)
                                    }
                                    IndexSelector::Negative(i) => {
                                        i64::try_from(*i).map(|v| -v).unwrap_or(i64::MIN)
                                    }
                                };
                                PathError::index_out_of_bounds(signed, array.len(), path.clone())
                            })?,
                        other => {
                            return Err(PathError::type_mismatch(
                                "array",
                                value_type_name(other),
                                path,
                            ));
                        }
                    };
                    path.push_str(&format!("[{}]", index));
                    next
                }
                other => {
                    return Err(PathError::execution(
                        format!("Selector {} may match several values", other),
                        path,
                    ));
                }
            };
        }

        Ok(current)
    }
}
