//! Where spec documents come from
//!
//! The composer never touches the filesystem itself; it asks a
//! [`SpecSource`] to resolve references and read documents.
//!
//! Copyright (c) 2025 Jsonatr Team
//! Licensed under the Apache-2.0 license

use super::error::{LoadError, LoadResult};
use super::SpecId;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Resolves spec references and reads the referenced documents
pub trait SpecSource {
    /// Resolve `reference` as written in the spec `from` (or at top level)
    fn resolve(&self, reference: &str, from: Option<&SpecId>) -> LoadResult<SpecId>;

    /// Read the document identified by `id`
    fn read(&self, id: &SpecId) -> LoadResult<Value>;
}

/// Reads specs from disk; relative references resolve against the
/// directory of the referencing spec
#[derive(Debug, Clone)]
pub struct FileSpecSource {
    base_dir: PathBuf,
}

impl FileSpecSource {
    /// Create a source resolving top-level references against `base_dir`
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// The directory top-level references are resolved against
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

impl Default for FileSpecSource {
    fn default() -> Self {
        Self::new(".")
    }
}

impl SpecSource for FileSpecSource {
    fn resolve(&self, reference: &str, from: Option<&SpecId>) -> LoadResult<SpecId> {
        let from_label = from.map(SpecId::to_string).unwrap_or_else(|| self.base_dir.display().to_string());
        let relative = Path::new(reference);

        let candidate = if relative.is_absolute() {
            relative.to_path_buf()
        } else {
            let dir = from
                .and_then(|id| Path::new(id.as_str()).parent())
                .filter(|parent| !parent.as_os_str().is_empty())
                .unwrap_or(self.base_dir.as_path());
            dir.join(relative)
        };

        let canonical = candidate
            .canonicalize()
            .map_err(|e| LoadError::unresolvable(reference, from_label, e.to_string()))?;

        trace!(reference, resolved = %canonical.display(), "resolved spec reference");
        Ok(SpecId::new(canonical.display().to_string()))
    }

    fn read(&self, id: &SpecId) -> LoadResult<Value> {
        let path = Path::new(id.as_str());
        let text = std::fs::read_to_string(path).map_err(|e| LoadError::io(id.as_str(), &e))?;
        parse_document(id, path.extension().and_then(|e| e.to_str()), &text)
    }
}

/// Parse a document as YAML when the extension says so, JSON otherwise
pub fn parse_document(id: &SpecId, extension: Option<&str>, text: &str) -> LoadResult<Value> {
    match extension {
        Some("yaml") | Some("yml") => {
            serde_yaml::from_str(text).map_err(|e| LoadError::parse(id.as_str(), e.to_string()))
        }
        _ => serde_json::from_str(text).map_err(|e| LoadError::parse(id.as_str(), e.to_string())),
    }
}

/// In-memory documents keyed by reference; useful for tests and embedding
#[derive(Debug, Clone, Default)]
pub struct MemorySpecSource {
    documents: HashMap<String, Value>,
}

impl MemorySpecSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document under `name`
    pub fn with(mut self, name: impl Into<String>, document: Value) -> Self {
        self.insert(name, document);
        self
    }

    /// Add or replace a document under `name`
    pub fn insert(&mut self, name: impl Into<String>, document: Value) {
        self.documents.insert(name.into(), document);
    }
}

impl SpecSource for MemorySpecSource {
    fn resolve(&self, reference: &str, from: Option<&SpecId>) -> LoadResult<SpecId> {
        if self.documents.contains_key(reference) {
            Ok(SpecId::new(reference))
        } else {
            Err(LoadError::unresolvable(
                reference,
                from.map(SpecId::to_string).unwrap_or_else(|| "<memory>".to_string()),
                "no such document",
            ))
        }
    }

    fn read(&self, id: &SpecId) -> LoadResult<Value> {
        self.documents
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| LoadError::unresolvable(id.as_str(), "<memory>", "no such document"))
    }
}
