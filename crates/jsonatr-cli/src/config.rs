//! Configuration management for the CLI
//!
//! This module handles loading configuration from:
//! - Default values
//! - Configuration files (YAML/JSON)
//! - Command-line arguments, which the handlers apply on top
//!
//! Copyright (c) 2025 Jsonatr Team
//! Licensed under the Apache-2.0 license

use crate::error::{Error, Result};
use jsonatr_core::{CollisionPolicy, Engine};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Engine limits and policies
    pub engine: EngineConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// What happens when two specs define the same name
    pub collision_policy: CollisionPolicy,

    /// Maximum depth of the `use` graph
    pub max_import_depth: usize,

    /// Maximum depth of nested definition calls
    pub max_call_depth: usize,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Pretty-print JSON output unless `--compact` is given
    pub pretty: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `-v` flags take precedence
    pub level: Option<String>,

    /// Log format (compact, full, json)
    pub format: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            collision_policy: CollisionPolicy::default(),
            max_import_depth: jsonatr_core::spec::composer::DEFAULT_MAX_IMPORT_DEPTH,
            max_call_depth: jsonatr_core::template::DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = if is_yaml(path) {
            serde_yaml::from_str(&content)
                .map_err(|e| Error::config(format!("{}: {}", path.display(), e)))?
        } else {
            serde_json::from_str(&content)
                .map_err(|e| Error::config(format!("{}: {}", path.display(), e)))?
        };

        config.validate()?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Load configuration from the first default location that exists
    pub fn load() -> Result<Self> {
        for path in Self::default_config_paths() {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file or default locations
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        match file {
            Some(path) => Self::from_file(path),
            None => Self::load(),
        }
    }

    /// Get default configuration file paths to check, in order
    fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(".jsonatr.yaml"), PathBuf::from(".jsonatr.json")];

        if let Some(config_dir) = dirs::config_dir() {
            let jsonatr_dir = config_dir.join("jsonatr");
            paths.push(jsonatr_dir.join("config.yaml"));
            paths.push(jsonatr_dir.join("config.json"));
        }

        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".jsonatr.yaml"));
            paths.push(home_dir.join(".jsonatr.json"));
        }

        paths
    }

    fn validate(&self) -> Result<()> {
        if self.engine.max_import_depth == 0 {
            return Err(Error::config("engine.max_import_depth must be at least 1"));
        }
        if self.engine.max_call_depth == 0 {
            return Err(Error::config("engine.max_call_depth must be at least 1"));
        }
        if let Some(format) = &self.logging.format {
            if !matches!(format.to_lowercase().as_str(), "compact" | "full" | "json") {
                return Err(Error::config(format!(
                    "logging.format must be compact, full or json, got '{}'",
                    format
                )));
            }
        }
        Ok(())
    }

    /// Build an engine from these settings, with an optional policy override
    pub fn engine(&self, policy: Option<CollisionPolicy>) -> Engine {
        Engine::builder()
            .collision_policy(policy.unwrap_or(self.engine.collision_policy))
            .max_import_depth(self.engine.max_import_depth)
            .max_call_depth(self.engine.max_call_depth)
            .build()
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|s| s.to_str()),
        Some("yaml") | Some("yml")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_engine_defaults() {
        let config = Config::default();
        assert_eq!(config.engine.collision_policy, CollisionPolicy::ImporterWins);
        assert_eq!(config.engine.max_import_depth, 32);
        assert_eq!(config.engine.max_call_depth, 64);
        assert!(config.output.pretty);
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_load_yaml_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "engine:\n  collision_policy: reject\n  max_call_depth: 8\noutput:\n  pretty: false\nlogging:\n  format: json\n",
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.engine.collision_policy, CollisionPolicy::Reject);
        assert_eq!(config.engine.max_call_depth, 8);
        assert_eq!(config.engine.max_import_depth, 32);
        assert!(!config.output.pretty);
        assert_eq!(config.logging.format.as_deref(), Some("json"));

        let engine = config.engine(None);
        assert_eq!(engine.policy(), CollisionPolicy::Reject);
        let engine = config.engine(Some(CollisionPolicy::ImporterWins));
        assert_eq!(engine.policy(), CollisionPolicy::ImporterWins);
    }

    #[test]
    fn test_load_json_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"engine": {"max_import_depth": 4}}"#).unwrap();

        let config = Config::load_with_file(Some(&path)).unwrap();
        assert_eq!(config.engine.max_import_depth, 4);
        assert!(config.output.pretty);
    }

    #[test]
    fn test_invalid_configs_are_rejected() {
        let dir = TempDir::new().unwrap();

        let unknown = dir.path().join("unknown.json");
        std::fs::write(&unknown, r#"{"engine": {"policy": "reject"}}"#).unwrap();
        assert!(matches!(Config::from_file(&unknown), Err(Error::Config(_))));

        let zero = dir.path().join("zero.json");
        std::fs::write(&zero, r#"{"engine": {"max_call_depth": 0}}"#).unwrap();
        assert!(matches!(Config::from_file(&zero), Err(Error::Config(_))));

        let format = dir.path().join("format.json");
        std::fs::write(&format, r#"{"logging": {"format": "xml"}}"#).unwrap();
        assert!(matches!(Config::from_file(&format), Err(Error::Config(_))));

        let missing = dir.path().join("missing.json");
        assert!(matches!(
            Config::from_file(&missing),
            Err(Error::FileNotFound { .. })
        ));
    }
}
