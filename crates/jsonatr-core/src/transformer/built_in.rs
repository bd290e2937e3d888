//! Built-in transformers
//!
//! Builtin names are reserved: a spec input may not be called `map` or
//! `unwrap`. Structural builtins work on the value alone; `map` and `ifelse`
//! delegate to other transformers through the caller-supplied `invoke`.
//!
//! Copyright (c) 2025 Jsonatr Team
//! Licensed under the Apache-2.0 license

use super::types::TransformError;
use crate::jsonpath::{is_truthy, value_type_name};
use crate::Result;
use serde_json::{Number, Value};
use std::fmt;

/// Callback used by higher-order builtins to apply a named transformer
pub type Invoke<'a> = dyn FnMut(&str, Value) -> Result<Value> + 'a;

/// The closed set of builtin transformers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    /// Singleton array to its element; one-member object to its value
    Unwrap,
    /// Apply a transformer to every array element, preserving order
    Map,
    /// Apply the first transformer to truthy input, the second otherwise
    IfElse,
    First,
    Last,
    Count,
    Flatten,
    Keys,
    Values,
    ToString,
    ToNumber,
}

impl Builtin {
    /// Every builtin, in listing order
    pub const ALL: [Builtin; 11] = [
        Builtin::Unwrap,
        Builtin::Map,
        Builtin::IfElse,
        Builtin::First,
        Builtin::Last,
        Builtin::Count,
        Builtin::Flatten,
        Builtin::Keys,
        Builtin::Values,
        Builtin::ToString,
        Builtin::ToNumber,
    ];

    /// Name used in pipeline stages
    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Unwrap => "unwrap",
            Builtin::Map => "map",
            Builtin::IfElse => "ifelse",
            Builtin::First => "first",
            Builtin::Last => "last",
            Builtin::Count => "count",
            Builtin::Flatten => "flatten",
            Builtin::Keys => "keys",
            Builtin::Values => "values",
            Builtin::ToString => "to_string",
            Builtin::ToNumber => "to_number",
        }
    }

    /// Look up a builtin by name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|b| b.name() == name)
    }

    /// Number of arguments the builtin takes
    pub fn arity(&self) -> usize {
        match self {
            Builtin::Map => 1,
            Builtin::IfElse => 2,
            _ => 0,
        }
    }

    /// Fail unless `args` has the expected length
    pub fn check_arity(&self, args: &[String]) -> std::result::Result<(), TransformError> {
        if args.len() == self.arity() {
            Ok(())
        } else {
            Err(TransformError::Arity {
                name: self.name().to_string(),
                expected: self.arity(),
                found: args.len(),
            })
        }
    }

    /// Apply the builtin to `input`
    pub fn apply(&self, input: Value, args: &[String], invoke: &mut Invoke<'_>) -> Result<Value> {
        self.check_arity(args)?;

        match self {
            Builtin::Unwrap => Ok(unwrap(input)?),
            Builtin::Map => {
                let items = match input {
                    Value::Array(items) => items,
                    other => return Err(self.shape("array", &other).into()),
                };
                let mut mapped = Vec::with_capacity(items.len());
                for (index, item) in items.into_iter().enumerate() {
                    mapped.push(invoke(&args[0], item).map_err(|e| e.in_element(index))?);
                }
                Ok(Value::Array(mapped))
            }
            Builtin::IfElse => {
                let branch = if is_truthy(&input) { &args[0] } else { &args[1] };
                invoke(branch, input)
            }
            Builtin::First | Builtin::Last => match input {
                Value::Array(mut items) => {
                    if items.is_empty() {
                        return Err(TransformError::EmptySequence { name: self.name().to_string() }.into());
                    }
                    let item = if *self == Builtin::First { items.swap_remove(0) } else { items.pop().unwrap_or(Value::Null) };
                    Ok(item)
                }
                other => Err(self.shape("array", &other).into()),
            },
            Builtin::Count => {
                let count = match &input {
                    Value::Array(items) => items.len(),
                    Value::Object(members) => members.len(),
                    Value::String(s) => s.chars().count(),
                    other => return Err(self.shape("array, object, or string", other).into()),
                };
                Ok(Value::Number(Number::from(count)))
            }
            Builtin::Flatten => match input {
                Value::Array(items) => {
                    let mut flat = Vec::with_capacity(items.len());
                    for item in items {
                        match item {
                            Value::Array(inner) => flat.extend(inner),
                            other => flat.push(other),
                        }
                    }
                    Ok(Value::Array(flat))
                }
                other => Err(self.shape("array", &other).into()),
            },
            Builtin::Keys => match input {
                Value::Object(members) => Ok(Value::Array(members.into_iter().map(|(k, _)| Value::String(k)).collect())),
                other => Err(self.shape("object", &other).into()),
            },
            Builtin::Values => match input {
                Value::Object(members) => Ok(Value::Array(members.into_iter().map(|(_, v)| v).collect())),
                other => Err(self.shape("object", &other).into()),
            },
            Builtin::ToString => Ok(to_string(input)?),
            Builtin::ToNumber => Ok(to_number(input)?),
        }
    }

    fn shape(&self, expected: &str, found: &Value) -> TransformError {
        TransformError::shape(self.name(), expected, value_type_name(found))
    }
}

impl fmt::Display for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Reduce a singleton to its only value
pub fn unwrap(input: Value) -> std::result::Result<Value, TransformError> {
    match input {
        Value::Array(mut items) => match items.len() {
            0 => Err(TransformError::EmptySequence { name: "unwrap".to_string() }),
            1 => Ok(items.swap_remove(0)),
            count => Err(TransformError::MultipleValues { name: "unwrap".to_string(), count }),
        },
        Value::Object(members) if members.len() == 1 => {
            Ok(members.into_iter().next().map(|(_, v)| v).unwrap_or(Value::Null))
        }
        other => Ok(other),
    }
}

fn to_string(input: Value) -> std::result::Result<Value, TransformError> {
    match input {
        Value::String(s) => Ok(Value::String(s)),
        Value::Number(n) => Ok(Value::String(n.to_string())),
        Value::Bool(b) => Ok(Value::String(b.to_string())),
        Value::Null => Ok(Value::String("null".to_string())),
        other => Err(TransformError::TypeConversion {
            from: value_type_name(&other).to_string(),
            to: "string".to_string(),
            value: other.to_string(),
        }),
    }
}

fn to_number(input: Value) -> std::result::Result<Value, TransformError> {
    let conversion_error = |value: &Value| TransformError::TypeConversion {
        from: value_type_name(value).to_string(),
        to: "number".to_string(),
        value: value.to_string(),
    };

    match input {
        Value::Number(n) => Ok(Value::Number(n)),
        Value::Bool(b) => Ok(Value::Number(Number::from(u8::from(b)))),
        Value::String(ref s) => {
            let trimmed = s.trim();
            if let Ok(i) = trimmed.parse::<i64>() {
                return Ok(Value::Number(Number::from(i)));
            }
            trimmed
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| conversion_error(&input))
        }
        other => Err(conversion_error(&other)),
    }
}
