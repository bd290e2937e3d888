//! Selector implementations for path traversal
//!
//! Each selector maps a set of input nodes to a set of output nodes in
//! document order. Selectors here are lenient: a node of the wrong shape or a
//! missing member simply contributes nothing.
//!
//! Copyright (c) 2025 Jsonatr Team
//! Licensed under the Apache-2.0 license

use super::ast::{IndexSelector as IndexSpec, Selector, SliceSelector as SliceSpec};
use super::error::*;
use super::filter::FilterExecutor;
use serde_json::Value;

/// An ordered set of selected nodes
pub struct SelectionIterator<'a> {
    values: Vec<&'a Value>,
    index: usize,
}

impl<'a> SelectionIterator<'a> {
    /// Create a new selection iterator
    pub fn new(values: Vec<&'a Value>) -> Self {
        Self { values, index: 0 }
    }

    /// Create a single-value iterator
    pub fn single(value: &'a Value) -> Self {
        Self::new(vec![value])
    }

    /// Collect all remaining values
    pub fn into_values(mut self) -> Vec<&'a Value> {
        self.values.drain(..self.index);
        self.values
    }

    /// Check if iterator is exhausted
    pub fn is_empty(&self) -> bool {
        self.index >= self.values.len()
    }

    /// Number of remaining values
    pub fn len(&self) -> usize {
        self.values.len() - self.index
    }
}

impl<'a> Iterator for SelectionIterator<'a> {
    type Item = &'a Value;

    fn next(&mut self) -> Option<Self::Item> {
        let value = self.values.get(self.index).copied()?;
        self.index += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SelectionIterator<'_> {}

/// Trait for selector execution
pub trait SelectorExecutor {
    /// Execute this selector on a set of input values
    fn execute<'a>(&self, inputs: SelectionIterator<'a>) -> PathResult<SelectionIterator<'a>>;
}

/// Property selector implementation
pub struct PropertySelector<'s> {
    pub key: &'s str,
}

impl SelectorExecutor for PropertySelector<'_> {
    fn execute<'a>(&self, inputs: SelectionIterator<'a>) -> PathResult<SelectionIterator<'a>> {
        let results = inputs
            .filter_map(|value| value.as_object().and_then(|obj| obj.get(self.key)))
            .collect();
        Ok(SelectionIterator::new(results))
    }
}

/// Array index selector implementation
pub struct IndexSelector {
    pub index: IndexSpec,
}

impl IndexSelector {
    /// Resolve the index against an array length
    pub fn effective_index(index: IndexSpec, length: usize) -> Option<usize> {
        match index {
            IndexSpec::Positive(idx) if idx < length => Some(idx),
            IndexSpec::Negative(idx) if idx > 0 && idx <= length => Some(length - idx),
            _ => None,
        }
    }
}

impl SelectorExecutor for IndexSelector {
    fn execute<'a>(&self, inputs: SelectionIterator<'a>) -> PathResult<SelectionIterator<'a>> {
        let results = inputs
            .filter_map(|value| {
                let array = value.as_array()?;
                Self::effective_index(self.index, array.len()).map(|idx| &array[idx])
            })
            .collect();
        Ok(SelectionIterator::new(results))
    }
}

/// Array slice selector implementation
pub struct SliceSelector<'s> {
    pub slice: &'s SliceSpec,
}

impl SliceSelector<'_> {
    /// Indices selected from an array of the given length, in output order
    pub fn indices(&self, length: usize) -> Vec<usize> {
        let len = length as i64;
        let step = self.slice.step;
        let normalize = |i: i64| if i < 0 { i + len } else { i };
        let mut indices = Vec::new();

        if step > 0 {
            let lower = self.slice.start.map(normalize).unwrap_or(0).clamp(0, len);
            let upper = self.slice.end.map(normalize).unwrap_or(len).clamp(0, len);
            let mut i = lower;
            while i < upper {
                indices.push(i as usize);
                i = match i.checked_add(step) {
                    Some(next) => next,
                    None => break,
                };
            }
        } else if step < 0 {
            let upper = self
                .slice
                .start
                .map(normalize)
                .unwrap_or(len - 1)
                .clamp(-1, len - 1);
            let lower = self.slice.end.map(normalize).unwrap_or(-1).clamp(-1, len - 1);
            let mut i = upper;
            while i > lower {
                indices.push(i as usize);
                i = match i.checked_add(step) {
                    Some(next) => next,
                    None => break,
                };
            }
        }

        indices
    }
}

impl SelectorExecutor for SliceSelector<'_> {
    fn execute<'a>(&self, inputs: SelectionIterator<'a>) -> PathResult<SelectionIterator<'a>> {
        if self.slice.step == 0 {
            return Err(PathError::execution("Slice step cannot be zero", self.slice.to_string()));
        }

        let mut results = Vec::new();
        for value in inputs {
            if let Some(array) = value.as_array() {
                results.extend(self.indices(array.len()).into_iter().map(|i| &array[i]));
            }
        }

        Ok(SelectionIterator::new(results))
    }
}

/// Wildcard selector implementation
pub struct WildcardSelector;

impl SelectorExecutor for WildcardSelector {
    fn execute<'a>(&self, inputs: SelectionIterator<'a>) -> PathResult<SelectionIterator<'a>> {
        let mut results = Vec::new();

        for value in inputs {
            match value {
                Value::Object(obj) => results.extend(obj.values()),
                Value::Array(array) => results.extend(array.iter()),
                _ => {}
            }
        }

        Ok(SelectionIterator::new(results))
    }
}

/// Recursive descent: each input node followed by all of its descendants, in
/// pre-order. The selector after `..` is then applied to every one of them.
pub struct RecursiveDescentSelector {
    pub max_depth: usize,
}

impl RecursiveDescentSelector {
    fn collect_recursive<'a>(
        &self,
        value: &'a Value,
        depth: usize,
        results: &mut Vec<&'a Value>,
    ) -> PathResult<()> {
        if depth > self.max_depth {
            return Err(PathError::execution(
                format!("Maximum descent depth {} exceeded", self.max_depth),
                "..",
            ));
        }

        results.push(value);
        match value {
            Value::Object(obj) => {
                for child in obj.values() {
                    self.collect_recursive(child, depth + 1, results)?;
                }
            }
            Value::Array(array) => {
                for child in array {
                    self.collect_recursive(child, depth + 1, results)?;
                }
            }
            _ => {}
        }
        Ok(())
    }
}

impl SelectorExecutor for RecursiveDescentSelector {
    fn execute<'a>(&self, inputs: SelectionIterator<'a>) -> PathResult<SelectionIterator<'a>> {
        let mut results = Vec::new();
        for value in inputs {
            self.collect_recursive(value, 0, &mut results)?;
        }
        Ok(SelectionIterator::new(results))
    }
}

/// Union selector: every member selector applied to each input in turn
pub struct UnionSelector<'s> {
    pub selectors: &'s [Selector],
    pub root: &'s Value,
    pub max_depth: usize,
}

impl SelectorExecutor for UnionSelector<'_> {
    fn execute<'a>(&self, inputs: SelectionIterator<'a>) -> PathResult<SelectionIterator<'a>> {
        let mut results = Vec::new();

        for value in inputs {
            for selector in self.selectors {
                let executor = create_selector_executor(selector, self.root, self.max_depth);
                results.extend(executor.execute(SelectionIterator::single(value))?);
            }
        }

        Ok(SelectionIterator::new(results))
    }
}

/// Build the executor for one selector
pub fn create_selector_executor<'s>(
    selector: &'s Selector,
    root: &'s Value,
    max_depth: usize,
) -> Box<dyn SelectorExecutor + 's> {
    match selector {
        Selector::Child(child) => Box::new(PropertySelector { key: child.name() }),
        Selector::Index(index) => Box::new(IndexSelector { index: *index }),
        Selector::Slice(slice) => Box::new(SliceSelector { slice }),
        Selector::Wildcard => Box::new(WildcardSelector),
        Selector::RecursiveDescent => Box::new(RecursiveDescentSelector { max_depth }),
        Selector::Union(union) => Box::new(UnionSelector {
            selectors: &union.selectors,
            root,
            max_depth,
        }),
        Selector::Filter(filter) => Box::new(FilterExecutor::new(&filter.filter, root)),
    }
}
