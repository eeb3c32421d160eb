//! `secrets.yaml` store backing the `!secret` tag

use crate::error::{ConfigError, ConfigResult};
use serde_yaml::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const SECRETS_FILE: &str = "secrets.yaml";

/// Secrets loaded from a config directory's `secrets.yaml`
///
/// Scalar values are kept as their string form. A missing file is an empty
/// store, not an error.
#[derive(Debug, Clone, Default)]
pub struct Secrets {
    values: HashMap<String, String>,
    path: Option<PathBuf>,
}

impl Secrets {
    pub fn load(config_dir: &Path) -> ConfigResult<Self> {
        let path = config_dir.join(SECRETS_FILE);
        if !path.is_file() {
            debug!(path = %path.display(), "No secrets file, using empty secrets");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).map_err(|source| ConfigError::ReadFile {
            path: path.clone(),
            source,
        })?;
        let raw: HashMap<String, Value> =
            serde_yaml::from_str(&content).map_err(|source| ConfigError::ParseYaml {
                path: path.clone(),
                source,
            })?;

        let mut values = HashMap::with_capacity(raw.len());
        for (key, value) in raw {
            let text = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null => String::new(),
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key,
                        reason: "secrets must be scalars".to_string(),
                    })
                }
            };
            values.insert(key, text);
        }

        debug!(count = values.len(), path = %path.display(), "Loaded secrets");
        Ok(Self {
            values,
            path: Some(path),
        })
    }

    /// Build a store from in-memory pairs
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            path: None,
        }
    }

    pub fn get(&self, key: &str) -> ConfigResult<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| ConfigError::SecretNotFound {
                key: key.to_string(),
            })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// The file the secrets were read from, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
