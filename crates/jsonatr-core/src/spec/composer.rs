//! Spec composition
//!
//! Resolves a spec's `use` graph depth-first and merges every imported
//! registry, in `use` order, followed by the spec's own inputs. Specs already
//! composed during this session are reused from an arena keyed by [`SpecId`],
//! so diamond-shaped imports are loaded once.
//!
//! Copyright (c) 2025 Jsonatr Team
//! Licensed under the Apache-2.0 license

use super::error::{LoadError, LoadResult};
use super::source::SpecSource;
use super::{InputKind, NamedInput, SpecId, TransformSpec};
use crate::transformer::{
    CollisionPolicy, Definition, ExternalCommand, InternalTransformer, Registry, Transformer,
};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, trace};

/// Default limit on nested `use` chains
pub const DEFAULT_MAX_IMPORT_DEPTH: usize = 32;

/// Options controlling composition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComposerOptions {
    pub policy: CollisionPolicy,
    pub max_depth: usize,
}

impl Default for ComposerOptions {
    fn default() -> Self {
        Self {
            policy: CollisionPolicy::default(),
            max_depth: DEFAULT_MAX_IMPORT_DEPTH,
        }
    }
}

/// A spec with its whole `use` graph resolved
#[derive(Debug, Clone)]
pub struct ComposedSpec {
    pub id: SpecId,
    pub description: String,
    /// Imported definitions merged with the spec's own
    pub registry: Arc<Registry>,
    pub output: Option<Value>,
}

/// Loads and composes specs from a [`SpecSource`]
pub struct Composer<'s> {
    source: &'s dyn SpecSource,
    options: ComposerOptions,
    arena: HashMap<SpecId, Arc<Registry>>,
}

impl<'s> Composer<'s> {
    pub fn new(source: &'s dyn SpecSource, options: ComposerOptions) -> Self {
        Self {
            source,
            options,
            arena: HashMap::new(),
        }
    }

    /// Resolve, read and compose a top-level spec reference
    pub fn load(&mut self, reference: &str) -> LoadResult<ComposedSpec> {
        let id = self.source.resolve(reference, None)?;
        let spec = self.read_spec(&id)?;
        self.compose(&spec, id)
    }

    /// Compose an already parsed spec identified by `id`
    pub fn compose(&mut self, spec: &TransformSpec, id: SpecId) -> LoadResult<ComposedSpec> {
        let mut loading = Vec::new();
        self.compose_with(spec, id, &mut loading)
    }

    /// Compose `spec` while the specs in `loading` are still being composed
    pub fn compose_with(
        &mut self,
        spec: &TransformSpec,
        id: SpecId,
        loading: &mut Vec<SpecId>,
    ) -> LoadResult<ComposedSpec> {
        if loading.contains(&id) {
            return Err(cyclic_import(loading, &id));
        }
        if loading.len() >= self.options.max_depth {
            return Err(LoadError::ImportDepthExceeded {
                spec: id.to_string(),
                limit: self.options.max_depth,
            });
        }

        loading.push(id.clone());
        let registry = self.build_registry(spec, &id, loading);
        loading.pop();

        let registry = Arc::new(registry?);
        self.arena.insert(id.clone(), Arc::clone(&registry));

        debug!(spec = %id, definitions = registry.len(), "composed spec");
        Ok(ComposedSpec {
            id,
            description: spec.description.clone(),
            registry,
            output: spec.output.clone(),
        })
    }

    /// Number of distinct specs composed so far
    pub fn composed_count(&self) -> usize {
        self.arena.len()
    }

    fn build_registry(
        &mut self,
        spec: &TransformSpec,
        id: &SpecId,
        loading: &mut Vec<SpecId>,
    ) -> LoadResult<Registry> {
        let mut registry = Registry::new();

        for reference in &spec.uses {
            let imported = self.load_import(reference, id, loading)?;
            registry.merge(&imported, self.options.policy)?;
        }

        let mut seen = HashSet::new();
        for input in &spec.input {
            if !seen.insert(input.name.as_str()) {
                return Err(LoadError::DuplicateInput {
                    name: input.name.clone(),
                    spec: id.to_string(),
                });
            }
            let transformer = self.definition(input, id)?;
            registry.define(
                Definition {
                    name: input.name.clone(),
                    origin: id.clone(),
                    transformer,
                },
                self.options.policy,
            )?;
        }

        Ok(registry)
    }

    fn load_import(
        &mut self,
        reference: &str,
        from: &SpecId,
        loading: &mut Vec<SpecId>,
    ) -> LoadResult<Arc<Registry>> {
        let id = self.source.resolve(reference, Some(from))?;

        if loading.contains(&id) {
            return Err(cyclic_import(loading, &id));
        }
        if let Some(registry) = self.arena.get(&id) {
            trace!(spec = %id, "reusing composed import");
            return Ok(Arc::clone(registry));
        }

        let spec = self.read_spec(&id)?;
        Ok(self.compose_with(&spec, id, loading)?.registry)
    }

    fn read_spec(&self, id: &SpecId) -> LoadResult<TransformSpec> {
        let document = self.source.read(id)?;
        TransformSpec::from_value(document, id)
    }

    fn definition(&self, input: &NamedInput, id: &SpecId) -> LoadResult<Transformer> {
        match input.kind {
            InputKind::Inline => Ok(Transformer::Internal(InternalTransformer {
                bindings: input.bindings.clone(),
                source: input.source.clone(),
            })),
            InputKind::File => {
                let reference = input.source.as_str().ok_or_else(|| {
                    LoadError::invalid_definition(
                        &input.name,
                        id.as_str(),
                        "FILE source must be a string reference",
                    )
                })?;
                let file = self.source.resolve(reference, Some(id))?;
                let template = self.source.read(&file)?;
                trace!(input = %input.name, file = %file, "loaded template file");
                Ok(Transformer::Internal(InternalTransformer {
                    bindings: input.bindings.clone(),
                    source: template,
                }))
            }
            InputKind::External => {
                if !input.bindings.is_empty() {
                    return Err(LoadError::invalid_definition(
                        &input.name,
                        id.as_str(),
                        "'let' is not allowed on EXTERNAL inputs",
                    ));
                }
                ExternalCommand::from_source(&input.source, &input.args, input.stdin, input.format)
                    .map(Transformer::External)
                    .map_err(|reason| LoadError::invalid_definition(&input.name, id.as_str(), reason))
            }
        }
    }
}

fn cyclic_import(loading: &[SpecId], id: &SpecId) -> LoadError {
    let mut chain: Vec<String> = loading.iter().map(SpecId::to_string).collect();
    chain.push(id.to_string());
    LoadError::CyclicImport { chain }
}
