//! Filter expression evaluation
//!
//! A filter selects children of each input node: array elements, or member
//! values of an object. Operands that address a missing member evaluate to
//! "nothing", which equals only nothing and never satisfies an ordering.
//!
//! Copyright (c) 2025 Jsonatr Team
//! Licensed under the Apache-2.0 license

use super::ast::*;
use super::error::*;
use super::selector::{IndexSelector, SelectionIterator, SelectorExecutor};
use serde_json::{Number, Value};
use std::borrow::Cow;
use std::cmp::Ordering;

/// Evaluated operand; `None` means the addressed member does not exist
type Operand<'v> = Option<Cow<'v, Value>>;

/// Filter executor for evaluating filter expressions
pub struct FilterExecutor<'f> {
    filter: &'f FilterExpression,
    root: &'f Value,
}

impl<'f> FilterExecutor<'f> {
    pub fn new(filter: &'f FilterExpression, root: &'f Value) -> Self {
        Self { filter, root }
    }

    /// Whether `candidate` passes the filter
    pub fn matches(&self, candidate: &Value) -> PathResult<bool> {
        self.test(self.filter, candidate, self.root)
    }

    fn test(&self, expr: &FilterExpression, current: &Value, root: &Value) -> PathResult<bool> {
        match expr {
            FilterExpression::Binary { left, operator: BinaryOperator::And, right } => {
                Ok(self.test(left, current, root)? && self.test(right, current, root)?)
            }
            FilterExpression::Binary { left, operator: BinaryOperator::Or, right } => {
                Ok(self.test(left, current, root)? || self.test(right, current, root)?)
            }
            FilterExpression::Binary { left, operator, right } => {
                let left = self.evaluate(left, current, root)?;
                let right = self.evaluate(right, current, root)?;
                Ok(compare(left.as_deref(), *operator, right.as_deref()))
            }
            FilterExpression::Not(operand) => Ok(!self.test(operand, current, root)?),
            FilterExpression::Literal(literal) => Ok(is_truthy(&literal_to_value(literal))),
            path => Ok(self.evaluate(path, current, root)?.is_some()),
        }
    }

    /// Evaluate an operand expression
    fn evaluate<'v>(
        &self,
        expr: &FilterExpression,
        current: &'v Value,
        root: &'v Value,
    ) -> PathResult<Operand<'v>> {
        match expr {
            FilterExpression::Current => Ok(Some(Cow::Borrowed(current))),
            FilterExpression::Root => Ok(Some(Cow::Borrowed(root))),
            FilterExpression::Property { base, property } => {
                Ok(self.evaluate(base, current, root)?.and_then(|base| match base {
                    Cow::Borrowed(value) => value.get(property.as_str()).map(Cow::Borrowed),
                    Cow::Owned(value) => value.get(property.as_str()).cloned().map(Cow::Owned),
                }))
            }
            FilterExpression::Index { base, index } => {
                let spec = if *index < 0 {
                    super::ast::IndexSelector::Negative(index.unsigned_abs() as usize)
                } else {
                    super::ast::IndexSelector::Positive(*index as usize)
                };
                Ok(self.evaluate(base, current, root)?.and_then(|base| match base {
                    Cow::Borrowed(value) => {
                        let array = value.as_array()?;
                        IndexSelector::effective_index(spec, array.len())
                            .map(|i| Cow::Borrowed(&array[i]))
                    }
                    Cow::Owned(value) => {
                        let array = value.as_array()?;
                        IndexSelector::effective_index(spec, array.len())
                            .map(|i| Cow::Owned(array[i].clone()))
                    }
                }))
            }
            FilterExpression::Literal(literal) => Ok(Some(Cow::Owned(literal_to_value(literal)))),
            other => Ok(Some(Cow::Owned(Value::Bool(self.test(other, current, root)?)))),
        }
    }
}

impl SelectorExecutor for FilterExecutor<'_> {
    fn execute<'a>(&self, inputs: SelectionIterator<'a>) -> PathResult<SelectionIterator<'a>> {
        let mut results = Vec::new();

        for value in inputs {
            let children: Box<dyn Iterator<Item = &'a Value>> = match value {
                Value::Array(array) => Box::new(array.iter()),
                Value::Object(obj) => Box::new(obj.values()),
                _ => continue,
            };
            for child in children {
                if self.matches(child)? {
                    results.push(child);
                }
            }
        }

        Ok(SelectionIterator::new(results))
    }
}

fn compare(left: Option<&Value>, operator: BinaryOperator, right: Option<&Value>) -> bool {
    match operator {
        BinaryOperator::Equal => operands_equal(left, right),
        BinaryOperator::NotEqual => !operands_equal(left, right),
        _ => {
            let ordering = match (left, right) {
                (Some(l), Some(r)) => value_ordering(l, r),
                _ => None,
            };
            match (ordering, operator) {
                (Some(ord), BinaryOperator::LessThan) => ord == Ordering::Less,
                (Some(ord), BinaryOperator::LessThanOrEqual) => ord != Ordering::Greater,
                (Some(ord), BinaryOperator::GreaterThan) => ord == Ordering::Greater,
                (Some(ord), BinaryOperator::GreaterThanOrEqual) => ord != Ordering::Less,
                _ => false,
            }
        }
    }
}

fn operands_equal(left: Option<&Value>, right: Option<&Value>) -> bool {
    match (left, right) {
        (None, None) => true,
        (Some(l), Some(r)) => values_equal(l, r),
        _ => false,
    }
}

/// Ordering between two values of the same comparable type
fn value_ordering(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(ai), Some(bi)) => Some(ai.cmp(&bi)),
            _ => a.as_f64()?.partial_cmp(&b.as_f64()?),
        },
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) if a == b => Some(Ordering::Equal),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        _ => None,
    }
}

fn literal_to_value(literal: &FilterLiteral) -> Value {
    match literal {
        FilterLiteral::String(s) => Value::String(s.clone()),
        FilterLiteral::Number(n) => {
            if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
                Value::Number(Number::from(*n as i64))
            } else {
                Number::from_f64(*n).map(Value::Number).unwrap_or(Value::Null)
            }
        }
        FilterLiteral::Boolean(b) => Value::Bool(*b),
        FilterLiteral::Null => Value::Null,
    }
}

/// Check if a value is truthy: not null, not false, not zero, not empty
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(arr) => !arr.is_empty(),
        Value::Object(obj) => !obj.is_empty(),
    }
}

/// Check if two values are equal, comparing integers and floats numerically
pub fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(ai), Some(bi)) => ai == bi,
            _ => match (a.as_f64(), b.as_f64()) {
                (Some(af), Some(bf)) => (af - bf).abs() < f64::EPSILON,
                _ => a == b,
            },
        },
        _ => left == right,
    }
}

/// Get the type name of a value
pub fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
