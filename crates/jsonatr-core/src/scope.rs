//! Lexical binding scopes
//!
//! A scope is an immutable singly-linked chain of frames. Extending a scope
//! never touches the parent, so a child scope can be dropped to restore the
//! outer bindings and sibling evaluations never observe each other's frames.
//!
//! Copyright (c) 2025 Jsonatr Team
//! Licensed under the Apache-2.0 license

use serde_json::{Map, Value};
use std::sync::Arc;

#[derive(Debug)]
struct Frame {
    bindings: Map<String, Value>,
    parent: Option<Arc<Frame>>,
}

/// An environment mapping variable names to values
#[derive(Debug, Clone, Default)]
pub struct Scope {
    head: Option<Arc<Frame>>,
}

impl Scope {
    /// The empty scope
    pub fn new() -> Self {
        Self::default()
    }

    /// A scope with a single outermost frame
    pub fn root(bindings: Map<String, Value>) -> Self {
        Self::new().extend(bindings)
    }

    /// A new scope whose innermost frame holds `bindings`
    pub fn extend(&self, bindings: Map<String, Value>) -> Self {
        Self {
            head: Some(Arc::new(Frame {
                bindings,
                parent: self.head.clone(),
            })),
        }
    }

    /// A new scope with one extra binding in its own frame
    pub fn bind(&self, name: impl Into<String>, value: Value) -> Self {
        let mut bindings = Map::new();
        bindings.insert(name.into(), value);
        self.extend(bindings)
    }

    /// Look up a name, innermost frame first
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        let mut frame = self.head.as_deref();
        while let Some(current) = frame {
            if let Some(value) = current.bindings.get(name) {
                return Some(value);
            }
            frame = current.parent.as_deref();
        }
        None
    }

    /// Number of frames in the chain
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut frame = self.head.as_deref();
        while let Some(current) = frame {
            depth += 1;
            frame = current.parent.as_deref();
        }
        depth
    }

    /// Names visible from this scope, innermost first, without duplicates
    pub fn visible_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        let mut frame = self.head.as_deref();
        while let Some(current) = frame {
            for name in current.bindings.keys() {
                if !names.contains(&name.as_str()) {
                    names.push(name.as_str());
                }
            }
            frame = current.parent.as_deref();
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn frame(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("frame must be an object"),
        }
    }

    #[test]
    fn test_lookup_walks_outward() {
        let outer = Scope::root(frame(json!({"a": 1, "b": 2})));
        let inner = outer.extend(frame(json!({"b": 20})));

        assert_eq!(inner.lookup("a"), Some(&json!(1)));
        assert_eq!(inner.lookup("b"), Some(&json!(20)));
        assert_eq!(inner.lookup("c"), None);
    }

    #[test]
    fn test_extending_never_mutates_parent() {
        let outer = Scope::root(frame(json!({"x": "outer"})));
        let inner = outer.bind("x", json!("inner"));

        assert_eq!(outer.lookup("x"), Some(&json!("outer")));
        assert_eq!(inner.lookup("x"), Some(&json!("inner")));
        drop(inner);
        assert_eq!(outer.lookup("x"), Some(&json!("outer")));
    }

    #[test]
    fn test_siblings_are_isolated() {
        let outer = Scope::root(Map::new());
        let left = outer.bind("only_left", json!(true));
        let right = outer.bind("only_right", json!(true));

        assert_eq!(left.lookup("only_right"), None);
        assert_eq!(right.lookup("only_left"), None);
    }

    #[test]
    fn test_depth_and_visible_names() {
        let scope = Scope::root(frame(json!({"a": 1, "b": 2}))).bind("a", json!(3));
        assert_eq!(scope.depth(), 2);
        assert_eq!(scope.visible_names(), vec!["a", "b"]);
        assert_eq!(Scope::new().depth(), 0);
    }
}
