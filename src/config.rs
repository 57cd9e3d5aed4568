use serde::Deserialize;
use std::{fs, path::Path};
use thiserror::Error;

pub const DEFAULT_MAX_CALL_DEPTH: usize = 256;

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RedefinitionPolicy {
    /// Overwrite the earlier binding and emit a warning.
    #[default]
    Permissive,
    /// Refuse a second definition of a name in the same frame.
    Strict,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct EvalConfig {
    pub redefinition: RedefinitionPolicy,
    pub max_call_depth: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            redefinition: RedefinitionPolicy::Permissive,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

impl EvalConfig {
    pub fn strict() -> Self {
        Self {
            redefinition: RedefinitionPolicy::Strict,
            ..Self::default()
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}
