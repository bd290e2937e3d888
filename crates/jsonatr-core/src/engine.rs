//! Engine facade
//!
//! Ties composition and evaluation together. An [`Engine`] is configuration
//! only; every `transform` call gets its own evaluator, so no state is shared
//! between calls.
//!
//! Copyright (c) 2025 Jsonatr Team
//! Licensed under the Apache-2.0 license

use crate::scope::Scope;
use crate::spec::{ComposedSpec, Composer, ComposerOptions, LoadError, LoadResult, SpecId, SpecSource, TransformSpec};
use crate::spec::composer::DEFAULT_MAX_IMPORT_DEPTH;
use crate::template::{Evaluator, DEFAULT_MAX_CALL_DEPTH};
use crate::transformer::{CollisionPolicy, CommandRunner, ProcessRunner, Registry};
use crate::Result;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// The documents a transformation runs against
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RootInputs {
    /// What a bare `$` denotes at top level
    pub root: Value,
    /// Pseudo-variables in the outermost scope frame (`$states`, ...)
    pub variables: Map<String, Value>,
}

impl RootInputs {
    /// A root document without variables
    pub fn new(root: Value) -> Self {
        Self {
            root,
            variables: Map::new(),
        }
    }

    /// Named documents, each bound as a variable; the root is the object
    /// holding all of them, so `$states` and `$.states` agree
    pub fn from_named(named: Map<String, Value>) -> Self {
        Self {
            root: Value::Object(named.clone()),
            variables: named,
        }
    }

    /// Add or replace a variable
    pub fn with_variable(mut self, name: impl Into<String>, value: Value) -> Self {
        self.variables.insert(name.into(), value);
        self
    }
}

/// Composes specs and runs transformations
#[derive(Clone)]
pub struct Engine {
    policy: CollisionPolicy,
    max_import_depth: usize,
    max_call_depth: usize,
    runner: Arc<dyn CommandRunner>,
}

impl Engine {
    /// An engine with default limits that spawns real processes
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn policy(&self) -> CollisionPolicy {
        self.policy
    }

    fn composer_options(&self) -> ComposerOptions {
        ComposerOptions {
            policy: self.policy,
            max_depth: self.max_import_depth,
        }
    }

    /// Compose an in-memory spec; its `use` references resolve through `source`
    pub fn compose(&self, spec: &TransformSpec, source: &dyn SpecSource) -> LoadResult<ComposedSpec> {
        Composer::new(source, self.composer_options()).compose(spec, SpecId::inline())
    }

    /// Load and compose the spec `reference` from `source`
    pub fn load(&self, reference: &str, source: &dyn SpecSource) -> LoadResult<ComposedSpec> {
        Composer::new(source, self.composer_options()).load(reference)
    }

    /// Evaluate a composed spec's output template
    pub fn transform(&self, spec: &ComposedSpec, inputs: &RootInputs) -> Result<Value> {
        let output = spec.output.as_ref().ok_or_else(|| LoadError::MissingOutput {
            spec: spec.id.to_string(),
        })?;

        let start = Instant::now();
        let result = self.evaluate_with(&spec.registry, output, inputs)?;
        info!(
            spec = %spec.id,
            definitions = spec.registry.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "transform complete"
        );
        Ok(result)
    }

    /// Evaluate a standalone template with builtins only
    pub fn evaluate(&self, template: &Value, inputs: &RootInputs) -> Result<Value> {
        self.evaluate_with(&Registry::new(), template, inputs)
    }

    fn evaluate_with(&self, registry: &Registry, template: &Value, inputs: &RootInputs) -> Result<Value> {
        let globals = Scope::root(inputs.variables.clone());
        let mut evaluator = Evaluator::new(registry, self.runner.as_ref(), &inputs.root, globals)
            .with_max_depth(self.max_call_depth);
        evaluator.evaluate(template, "output")
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("policy", &self.policy)
            .field("max_import_depth", &self.max_import_depth)
            .field("max_call_depth", &self.max_call_depth)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Engine`]
pub struct EngineBuilder {
    policy: CollisionPolicy,
    max_import_depth: usize,
    max_call_depth: usize,
    runner: Arc<dyn CommandRunner>,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            policy: CollisionPolicy::default(),
            max_import_depth: DEFAULT_MAX_IMPORT_DEPTH,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            runner: Arc::new(ProcessRunner),
        }
    }
}

impl EngineBuilder {
    pub fn collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn max_import_depth(mut self, depth: usize) -> Self {
        self.max_import_depth = depth;
        self
    }

    pub fn max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    /// Run external transformers through `runner` instead of spawning processes
    pub fn runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    pub fn build(self) -> Engine {
        Engine {
            policy: self.policy,
            max_import_depth: self.max_import_depth,
            max_call_depth: self.max_call_depth,
            runner: self.runner,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::spec::MemorySpecSource;
    use serde_json::json;

    fn spec(value: Value) -> TransformSpec {
        TransformSpec::from_value(value, &SpecId::inline()).expect("test spec should parse")
    }

    #[test]
    fn test_root_inputs_from_named() {
        let mut named = Map::new();
        named.insert("states".to_string(), json!([1, 2]));
        let inputs = RootInputs::from_named(named);

        let engine = Engine::new();
        let result = engine
            .evaluate(&json!({"a": "$states", "b": "$.states"}), &inputs)
            .expect("evaluate");
        assert_eq!(result, json!({"a": [1, 2], "b": [1, 2]}));
    }

    #[test]
    fn test_missing_output() {
        let engine = Engine::new();
        let composed = engine
            .compose(&spec(json!({"input": [{"name": "x", "source": 1}]})), &MemorySpecSource::new())
            .expect("compose");
        let err = engine.transform(&composed, &RootInputs::default()).expect_err("no output");
        assert!(matches!(err, Error::Load(LoadError::MissingOutput { .. })));
    }

    #[test]
    fn test_builder_settings_reach_composer() {
        let source = MemorySpecSource::new()
            .with("a", json!({"input": [{"name": "x", "source": 1}]}))
            .with("b", json!({"input": [{"name": "x", "source": 2}]}));
        let root = spec(json!({"use": ["a", "b"], "output": "$x"}));

        let lenient = Engine::new();
        let composed = lenient.compose(&root, &source).expect("importer wins");
        assert_eq!(lenient.transform(&composed, &RootInputs::default()).expect("transform"), json!(2));

        let strict = Engine::builder().collision_policy(CollisionPolicy::Reject).build();
        assert_eq!(strict.policy(), CollisionPolicy::Reject);
        assert!(matches!(strict.compose(&root, &source), Err(LoadError::Collision { .. })));
    }

    #[test]
    fn test_call_depth_is_configurable() {
        let engine = Engine::builder().max_call_depth(2).build();
        let composed = engine
            .compose(
                &spec(json!({
                    "input": [
                        {"name": "a", "source": "$b"},
                        {"name": "b", "source": "$c"},
                        {"name": "c", "source": 1}
                    ],
                    "output": "$a"
                })),
                &MemorySpecSource::new(),
            )
            .expect("compose");
        let err = engine.transform(&composed, &RootInputs::default()).expect_err("too deep");
        assert!(matches!(err.root_cause(), Error::RecursionLimit { limit: 2, .. }));

        let roomy = Engine::builder().max_call_depth(3).build();
        assert_eq!(roomy.transform(&composed, &RootInputs::default()).expect("transform"), json!(1));
    }
}
