//! Transformer registry
//!
//! Maps transformer names to definitions. Builtins are always present and
//! cannot be redefined; spec definitions are merged in under an explicit
//! [`CollisionPolicy`].
//!
//! Copyright (c) 2025 Jsonatr Team
//! Licensed under the Apache-2.0 license

use super::built_in::Builtin;
use super::types::Transformer;
use crate::spec::{LoadError, LoadResult, SpecId};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// What happens when two specs define the same name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollisionPolicy {
    /// The later definition wins: imports in `use` order, then the importer
    #[default]
    ImporterWins,
    /// Non-identical redefinitions are an error
    Reject,
}

impl FromStr for CollisionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "importer-wins" => Ok(CollisionPolicy::ImporterWins),
            "reject" => Ok(CollisionPolicy::Reject),
            other => Err(format!(
                "unknown collision policy '{}', expected 'importer-wins' or 'reject'",
                other
            )),
        }
    }
}

impl fmt::Display for CollisionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollisionPolicy::ImporterWins => write!(f, "importer-wins"),
            CollisionPolicy::Reject => write!(f, "reject"),
        }
    }
}

/// A named transformer and the spec that defined it
#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    pub name: String,
    pub origin: SpecId,
    pub transformer: Transformer,
}

/// Name to transformer mapping for one composed spec
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registry {
    definitions: BTreeMap<String, Definition>,
}

impl Registry {
    /// An empty registry; builtins are implicit
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a definition. Builtins are found first and never shadowed.
    pub fn lookup(&self, name: &str) -> Option<Cow<'_, Transformer>> {
        if let Some(builtin) = Builtin::from_name(name) {
            return Some(Cow::Owned(Transformer::Builtin(builtin)));
        }
        self.definitions.get(name).map(|d| Cow::Borrowed(&d.transformer))
    }

    /// Borrow a spec-level definition
    pub fn get(&self, name: &str) -> Option<&Definition> {
        self.definitions.get(name)
    }

    /// Whether a name is defined (builtins included)
    pub fn contains(&self, name: &str) -> bool {
        Builtin::from_name(name).is_some() || self.definitions.contains_key(name)
    }

    /// Spec-level definitions in name order
    pub fn definitions(&self) -> impl Iterator<Item = &Definition> {
        self.definitions.values()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Add one definition under `policy`
    pub fn define(&mut self, definition: Definition, policy: CollisionPolicy) -> LoadResult<()> {
        if Builtin::from_name(&definition.name).is_some() {
            return Err(LoadError::ReservedName {
                name: definition.name,
                spec: definition.origin.to_string(),
            });
        }

        match self.definitions.get(&definition.name) {
            Some(existing) if existing.transformer == definition.transformer => Ok(()),
            Some(existing) => match policy {
                CollisionPolicy::ImporterWins => {
                    debug!(
                        name = %definition.name,
                        replaced = %existing.origin,
                        by = %definition.origin,
                        "definition shadowed"
                    );
                    self.definitions.insert(definition.name.clone(), definition);
                    Ok(())
                }
                CollisionPolicy::Reject => Err(LoadError::Collision {
                    name: definition.name,
                    first: existing.origin.to_string(),
                    second: definition.origin.to_string(),
                }),
            },
            None => {
                self.definitions.insert(definition.name.clone(), definition);
                Ok(())
            }
        }
    }

    /// Merge every definition of `other` into this registry
    pub fn merge(&mut self, other: &Registry, policy: CollisionPolicy) -> LoadResult<()> {
        for definition in other.definitions() {
            self.define(definition.clone(), policy)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transformer::InternalTransformer;
    use serde_json::{json, Map};

    fn internal(name: &str, origin: &str, source: serde_json::Value) -> Definition {
        Definition {
            name: name.to_string(),
            origin: SpecId::new(origin),
            transformer: Transformer::Internal(InternalTransformer {
                bindings: Map::new(),
                source,
            }),
        }
    }

    #[test]
    fn test_builtins_are_implicit_and_reserved() {
        let mut registry = Registry::new();
        assert_eq!(
            registry.lookup("unwrap").as_deref(),
            Some(&Transformer::Builtin(Builtin::Unwrap))
        );
        assert!(registry.contains("map"));
        assert!(registry.is_empty());

        let err = registry
            .define(internal("map", "a", json!(1)), CollisionPolicy::ImporterWins)
            .expect_err("builtin names are reserved");
        assert!(matches!(err, LoadError::ReservedName { .. }));
    }

    #[test]
    fn test_importer_wins_replaces() {
        let mut registry = Registry::new();
        registry
            .define(internal("x", "lib", json!(1)), CollisionPolicy::ImporterWins)
            .expect("first definition");
        registry
            .define(internal("x", "main", json!(2)), CollisionPolicy::ImporterWins)
            .expect("shadowing definition");

        let definition = registry.get("x").expect("x defined");
        assert_eq!(definition.origin, SpecId::new("main"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_reject_policy() {
        let mut registry = Registry::new();
        registry
            .define(internal("x", "lib", json!(1)), CollisionPolicy::Reject)
            .expect("first definition");

        // Identical redefinitions, as produced by diamond imports, are fine
        registry
            .define(internal("x", "other", json!(1)), CollisionPolicy::Reject)
            .expect("identical redefinition");
        assert_eq!(registry.get("x").map(|d| d.origin.as_str()), Some("lib"));

        let err = registry
            .define(internal("x", "main", json!(2)), CollisionPolicy::Reject)
            .expect_err("conflicting redefinition");
        assert_eq!(
            err,
            LoadError::Collision {
                name: "x".to_string(),
                first: "lib".to_string(),
                second: "main".to_string(),
            }
        );
    }

    #[test]
    fn test_merge_in_order() {
        let mut first = Registry::new();
        first.define(internal("a", "first", json!(1)), CollisionPolicy::ImporterWins).expect("a");
        first.define(internal("b", "first", json!(1)), CollisionPolicy::ImporterWins).expect("b");
        let mut second = Registry::new();
        second.define(internal("b", "second", json!(2)), CollisionPolicy::ImporterWins).expect("b");

        let mut merged = Registry::new();
        merged.merge(&first, CollisionPolicy::ImporterWins).expect("merge first");
        merged.merge(&second, CollisionPolicy::ImporterWins).expect("merge second");

        let names: Vec<&str> = merged.definitions().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(merged.get("b").map(|d| d.origin.as_str()), Some("second"));
        assert!(merged.merge(&first, CollisionPolicy::Reject).is_err());
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("reject".parse::<CollisionPolicy>(), Ok(CollisionPolicy::Reject));
        assert_eq!(
            "importer-wins".parse::<CollisionPolicy>(),
            Ok(CollisionPolicy::ImporterWins)
        );
        assert!("first-wins".parse::<CollisionPolicy>().is_err());
        assert_eq!(CollisionPolicy::default().to_string(), "importer-wins");
    }
}
