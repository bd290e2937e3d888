//! Jsonatr Core - Declarative JSON-to-JSON transformation engine
//!
//! A transformation spec declares named inputs and an output template. The
//! engine resolves the spec's imports, then evaluates the output template
//! against the caller's root documents, expanding `$` expressions through
//! path queries and transformer pipelines.
//!
//! # Main Components
//!
//! - **Path Resolver**: the JSONPath subset used inside expressions
//! - **Binding Scope**: immutable, lexically nested variable frames
//! - **Transformer Registry**: builtin, template-defined and external transformers
//! - **Pipeline Executor**: `source | stage | stage(arg)` evaluation
//! - **Template Evaluator**: structure-preserving template expansion
//! - **Spec Composer**: `use` graph resolution with cycle detection
//!
//! # Example
//!
//! ```no_run
//! use jsonatr_core::{transform, RootInputs, TransformSpec};
//! use serde_json::json;
//!
//! fn example() -> jsonatr_core::Result<()> {
//!     let spec = TransformSpec::from_json_str(
//!         r#"{"input": [{"name": "first", "source": "$.items[0]"}],
//!             "output": {"head": "$first", "total": "$.items | count"}}"#,
//!     )?;
//!     let output = transform(spec, RootInputs::new(json!({"items": [3, 1, 2]})))?;
//!     assert_eq!(output, json!({"head": 3, "total": 3}));
//!     Ok(())
//! }
//! ```
//!
//! Copyright (c) 2025 Jsonatr Team
//! Licensed under the Apache-2.0 license

pub mod engine;
pub mod error;
pub mod expression;
pub mod jsonpath;
pub mod pipeline;
pub mod scope;
pub mod spec;
pub mod template;
pub mod transformer;

// Re-export main types for convenience
pub use engine::{Engine, EngineBuilder, RootInputs};
pub use error::{Error, Result};
pub use expression::{Expression, Leaf, Stage};
pub use jsonpath::{PathError, PathQuery};
pub use scope::Scope;
pub use spec::{
    ComposedSpec, Composer, ComposerOptions, FileSpecSource, InputKind, LoadError, MemorySpecSource,
    NamedInput, SpecId, SpecSource, TransformSpec,
};
pub use template::Evaluator;
pub use transformer::{
    Builtin, CollisionPolicy, CommandOutput, CommandRunner, OutputFormat, ProcessRunner, Registry,
    TransformError, Transformer,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Compose `spec` and evaluate its output against `inputs`.
///
/// `use` and FILE references resolve relative to the current directory and
/// external transformers run as real processes. Use [`Engine`] to change
/// either.
pub fn transform(spec: TransformSpec, inputs: RootInputs) -> Result<serde_json::Value> {
    let engine = Engine::new();
    let composed = engine.compose(&spec, &FileSpecSource::default())?;
    engine.transform(&composed, &inputs)
}
