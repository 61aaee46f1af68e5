//! Translation options
//!
//! Options can be built in code, loaded from a YAML document, or overridden
//! from the environment:
//!
//! ```yaml
//! duplicate_keys: reject        # or last_write_wins
//! compiled_stream: compiled     # or legacy_vars
//! default_namespace: default
//! ```

use crate::data_model::DEFAULT_NAMESPACE;
use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable overriding [`TranslateOptions::duplicate_keys`].
pub const DUPLICATE_KEYS_ENV: &str = "FLEET_DUPLICATE_KEYS";

/// What to do when two config entries map to the same remote key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateKeyPolicy {
    /// Fail with `CoreError::DuplicateKey`.
    #[default]
    Reject,
    /// The later entry replaces the earlier one.
    LastWriteWins,
}

/// Which remote field feeds a stream's read-only `compiled_stream`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompiledStreamSource {
    /// The stream's actual `compiled_stream` value.
    #[default]
    Compiled,
    /// The stream's `vars`, as earlier provider releases stored it.
    LegacyVars,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslateOptions {
    pub duplicate_keys: DuplicateKeyPolicy,
    pub compiled_stream: CompiledStreamSource,
    pub default_namespace: String,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self {
            duplicate_keys: DuplicateKeyPolicy::default(),
            compiled_stream: CompiledStreamSource::default(),
            default_namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

impl TranslateOptions {
    pub fn last_write_wins(mut self) -> Self {
        self.duplicate_keys = DuplicateKeyPolicy::LastWriteWins;
        self
    }

    pub fn legacy_compiled_stream(mut self) -> Self {
        self.compiled_stream = CompiledStreamSource::LegacyVars;
        self
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, CoreError> {
        serde_yaml::from_str(yaml).map_err(|e| CoreError::Options(e.to_string()))
    }

    /// Load options from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| CoreError::Options(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml_str(&content)
    }

    /// Apply overrides from the process environment.
    pub fn from_env(self) -> Result<Self, CoreError> {
        match std::env::var(DUPLICATE_KEYS_ENV) {
            Ok(value) => self.with_duplicate_keys_str(&value),
            Err(_) => Ok(self),
        }
    }

    fn with_duplicate_keys_str(mut self, value: &str) -> Result<Self, CoreError> {
        self.duplicate_keys = match value.trim() {
            "reject" => DuplicateKeyPolicy::Reject,
            "last_write_wins" => DuplicateKeyPolicy::LastWriteWins,
            other => {
                return Err(CoreError::Options(format!(
                    "{}: unknown policy {:?}",
                    DUPLICATE_KEYS_ENV, other
                )))
            }
        };
        Ok(self)
    }
}
