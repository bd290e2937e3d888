//! Template evaluation
//!
//! A template is a JSON value whose string leaves may be expressions. Objects
//! and arrays keep their shape (object members in spec order), expression
//! leaves are replaced by their value and everything else passes through.
//!
//! Named inputs are evaluated lexically: a definition sees the caller's root
//! variables and its own `let` bindings, never the scope of the expression
//! that referenced it. Referenced at the caller's root, a definition is
//! evaluated at most once per [`Evaluator`].
//!
//! Copyright (c) 2025 Jsonatr Team
//! Licensed under the Apache-2.0 license

use crate::error::Error;
use crate::expression::Leaf;
use crate::pipeline::{self, StageContext};
use crate::scope::Scope;
use crate::transformer::{external, CommandRunner, InternalTransformer, Registry, TransformError, Transformer};
use crate::Result;
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::{debug, trace};

/// Default limit on nested definition calls
pub const DEFAULT_MAX_CALL_DEPTH: usize = 64;

/// Where an expression is being evaluated
#[derive(Clone, Copy)]
struct Env<'a> {
    scope: &'a Scope,
    root: &'a Value,
    /// `root` is the caller's root document
    at_root: bool,
}

/// Evaluates templates against one root document and registry
pub struct Evaluator<'e> {
    registry: &'e Registry,
    runner: &'e dyn CommandRunner,
    globals: Scope,
    root: &'e Value,
    memo: HashMap<String, Value>,
    leaves: HashMap<String, Rc<Leaf>>,
    depth: usize,
    max_depth: usize,
}

impl<'e> Evaluator<'e> {
    /// Create an evaluator; `globals` is the outermost scope frame
    pub fn new(
        registry: &'e Registry,
        runner: &'e dyn CommandRunner,
        root: &'e Value,
        globals: Scope,
    ) -> Self {
        Self {
            registry,
            runner,
            globals,
            root,
            memo: HashMap::new(),
            leaves: HashMap::new(),
            depth: 0,
            max_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }

    /// Set the limit on nested definition calls
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Evaluate `template` at the caller's root in the outermost scope
    pub fn evaluate(&mut self, template: &Value, location: &str) -> Result<Value> {
        let globals = self.globals.clone();
        self.evaluate_in(template, &globals, location)
    }

    /// Evaluate `template` at the caller's root in `scope`
    pub fn evaluate_in(&mut self, template: &Value, scope: &Scope, location: &str) -> Result<Value> {
        let env = Env {
            scope,
            root: self.root,
            at_root: true,
        };
        self.eval(template, env, location)
    }

    /// Number of definitions evaluated and cached at the caller's root
    pub fn cached_inputs(&self) -> usize {
        self.memo.len()
    }

    fn eval(&mut self, template: &Value, env: Env<'_>, location: &str) -> Result<Value> {
        match template {
            Value::Object(members) => {
                let mut evaluated = Map::with_capacity(members.len());
                for (key, member) in members {
                    let value = self.eval(member, env, &format!("{}.{}", location, key))?;
                    evaluated.insert(key.clone(), value);
                }
                Ok(Value::Object(evaluated))
            }
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(index, item)| self.eval(item, env, &format!("{}[{}]", location, index)))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            Value::String(text) => self.eval_string(text, env).map_err(|e| e.at(location)),
            other => Ok(other.clone()),
        }
    }

    fn eval_string(&mut self, text: &str, env: Env<'_>) -> Result<Value> {
        let leaf = self.leaf(text)?;
        match &*leaf {
            Leaf::Literal(literal) => Ok(Value::String(literal.clone())),
            Leaf::Expression(expression) => {
                let mut frame = Frame {
                    evaluator: self,
                    env,
                };
                pipeline::run(expression, &mut frame)
            }
        }
    }

    /// Parse a string leaf, reusing earlier parses of the same text
    fn leaf(&mut self, text: &str) -> Result<Rc<Leaf>> {
        if let Some(leaf) = self.leaves.get(text) {
            return Ok(Rc::clone(leaf));
        }
        let leaf = Rc::new(Leaf::parse(text)?);
        self.leaves.insert(text.to_string(), Rc::clone(&leaf));
        Ok(leaf)
    }

    /// Resolve `$name` once the scope has no binding for it
    fn reference(&mut self, name: &str, root: &Value, at_root: bool) -> Result<Value> {
        let registry = self.registry;
        let definition = registry.get(name).ok_or_else(|| Error::unknown_name(name))?;

        if at_root {
            if let Some(value) = self.memo.get(name) {
                trace!(input = name, "using cached input");
                return Ok(value.clone());
            }
        }

        let value = self.apply(name, &definition.transformer, root, at_root)?;
        if at_root {
            self.memo.insert(name.to_string(), value.clone());
        }
        Ok(value)
    }

    /// Apply the transformer called `name` as a pipeline stage
    fn invoke(&mut self, name: &str, args: &[String], input: Value) -> Result<Value> {
        let registry = self.registry;
        let transformer = registry
            .lookup(name)
            .ok_or_else(|| TransformError::unknown(name))?;

        match &*transformer {
            Transformer::Builtin(builtin) => {
                let builtin = *builtin;
                builtin.apply(input, args, &mut |inner, value| self.invoke(inner, &[], value))
            }
            other => {
                if !args.is_empty() {
                    return Err(TransformError::Arity {
                        name: name.to_string(),
                        expected: 0,
                        found: args.len(),
                    }
                    .into());
                }
                self.apply(name, other, &input, false)
            }
        }
    }

    fn apply(&mut self, name: &str, transformer: &Transformer, root: &Value, at_root: bool) -> Result<Value> {
        match transformer {
            Transformer::Internal(internal) => self.call(name, internal, root, at_root),
            Transformer::External(command) => Ok(external::invoke(name, command, root, self.runner)?),
            Transformer::Builtin(builtin) => {
                builtin.apply(root.clone(), &[], &mut |inner, value| self.invoke(inner, &[], value))
            }
        }
    }

    fn call(&mut self, name: &str, internal: &InternalTransformer, root: &Value, at_root: bool) -> Result<Value> {
        if self.depth >= self.max_depth {
            return Err(Error::RecursionLimit {
                name: name.to_string(),
                limit: self.max_depth,
            });
        }

        self.depth += 1;
        debug!(definition = name, depth = self.depth, "evaluating definition");
        let result = self.call_definition(name, internal, root, at_root);
        self.depth -= 1;
        result
    }

    fn call_definition(
        &mut self,
        name: &str,
        internal: &InternalTransformer,
        root: &Value,
        at_root: bool,
    ) -> Result<Value> {
        let mut scope = self.globals.clone();

        // each binding sees the ones declared before it
        for (key, binding) in &internal.bindings {
            let env = Env {
                scope: &scope,
                root,
                at_root,
            };
            let value = self.eval(binding, env, &format!("input[{}].let.{}", name, key))?;
            scope = scope.bind(key.clone(), value);
        }

        let env = Env {
            scope: &scope,
            root,
            at_root,
        };
        self.eval(&internal.source, env, &format!("input[{}].source", name))
    }
}

/// Pipeline view of an evaluator at one point in a template
struct Frame<'a, 'e> {
    evaluator: &'a mut Evaluator<'e>,
    env: Env<'a>,
}

impl StageContext for Frame<'_, '_> {
    fn variable(&mut self, name: Option<&str>) -> Result<Cow<'_, Value>> {
        let Some(name) = name else {
            return Ok(Cow::Borrowed(self.env.root));
        };
        if let Some(value) = self.env.scope.lookup(name) {
            return Ok(Cow::Borrowed(value));
        }
        self.evaluator
            .reference(name, self.env.root, self.env.at_root)
            .map(Cow::Owned)
    }

    fn invoke(&mut self, name: &str, args: &[String], input: Value) -> Result<Value> {
        self.evaluator.invoke(name, args, input)
    }
}
