//! YAML loader with custom tag support
//!
//! - `!include path` - Inline another YAML file, relative to the including file
//! - `!secret key` - Substitute a value from `secrets.yaml`
//! - `!env_var VAR [default]` - Substitute an environment variable
//!
//! Unknown tags are kept, with their inner value processed.

use crate::error::{ConfigError, ConfigResult};
use crate::secrets::Secrets;
use serde_yaml::value::TaggedValue;
use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// YAML loader resolving includes, secrets and environment variables
pub struct YamlLoader {
    config_dir: PathBuf,
    secrets: Secrets,
    /// Files currently being loaded, outermost first
    loading: Vec<PathBuf>,
}

impl YamlLoader {
    /// Create a loader for `config_dir`, reading its `secrets.yaml` if present
    pub fn new(config_dir: impl Into<PathBuf>) -> ConfigResult<Self> {
        let config_dir = config_dir.into();
        let secrets = Secrets::load(&config_dir)?;
        Ok(Self::with_secrets(config_dir, secrets))
    }

    /// Create a loader with pre-loaded secrets
    pub fn with_secrets(config_dir: impl Into<PathBuf>, secrets: Secrets) -> Self {
        Self {
            config_dir: config_dir.into(),
            secrets,
            loading: Vec::new(),
        }
    }

    /// Load and process a YAML file, relative paths resolving against the config dir
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> ConfigResult<Value> {
        let path = match path.as_ref() {
            p if p.is_absolute() => p.to_path_buf(),
            p => self.config_dir.join(p),
        };

        if self.loading.contains(&path) {
            return Err(ConfigError::CircularInclude { path });
        }

        debug!(path = %path.display(), "Loading YAML file");
        let content = fs::read_to_string(&path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound && !self.loading.is_empty() {
                ConfigError::IncludeNotFound { path: path.clone() }
            } else {
                ConfigError::ReadFile {
                    path: path.clone(),
                    source,
                }
            }
        })?;

        self.loading.push(path.clone());
        let result = self.load_string(&content, &path);
        self.loading.pop();
        result
    }

    /// Load and process YAML text as if read from `source_path`
    pub fn load_string(&mut self, content: &str, source_path: &Path) -> ConfigResult<Value> {
        let value: Value =
            serde_yaml::from_str(content).map_err(|source| ConfigError::ParseYaml {
                path: source_path.to_path_buf(),
                source,
            })?;
        self.resolve(value, source_path)
    }

    fn resolve(&mut self, value: Value, source_path: &Path) -> ConfigResult<Value> {
        match value {
            Value::Tagged(tagged) => self.resolve_tag(*tagged, source_path),
            Value::Mapping(map) => map
                .into_iter()
                .map(|(k, v)| Ok((self.resolve(k, source_path)?, self.resolve(v, source_path)?)))
                .collect::<ConfigResult<serde_yaml::Mapping>>()
                .map(Value::Mapping),
            Value::Sequence(seq) => seq
                .into_iter()
                .map(|v| self.resolve(v, source_path))
                .collect::<ConfigResult<Vec<_>>>()
                .map(Value::Sequence),
            other => Ok(other),
        }
    }

    fn resolve_tag(&mut self, tagged: TaggedValue, source_path: &Path) -> ConfigResult<Value> {
        let tag = tagged.tag.to_string();
        trace!(tag = %tag, "Resolving tag");

        match tag.as_str() {
            "!include" => {
                let target = self.include_path(&tagged.value, source_path)?;
                self.load_file(target)
            }
            "!secret" => {
                let key = tag_argument("!secret", &tagged.value)?;
                let secret = self.secrets.get(key)?;
                debug!(key = %key, "Substituted secret");
                Ok(Value::String(secret.to_string()))
            }
            "!env_var" => {
                let argument = tag_argument("!env_var", &tagged.value)?;
                env_var(argument).map(Value::String)
            }
            _ => {
                let value = self.resolve(tagged.value, source_path)?;
                Ok(Value::Tagged(Box::new(TaggedValue {
                    tag: tagged.tag,
                    value,
                })))
            }
        }
    }

    /// Resolve an include target relative to the including file
    fn include_path(&self, value: &Value, source_path: &Path) -> ConfigResult<PathBuf> {
        let Value::String(target) = value else {
            return Err(ConfigError::InvalidIncludePath {
                path: format!("{:?}", value),
                reason: "path must be a string".to_string(),
            });
        };

        let target = Path::new(target);
        if target.is_absolute() {
            return Ok(target.to_path_buf());
        }
        let base = source_path.parent().unwrap_or(&self.config_dir);
        Ok(base.join(target))
    }
}

fn tag_argument<'a>(tag: &str, value: &'a Value) -> ConfigResult<&'a str> {
    value.as_str().ok_or_else(|| ConfigError::InvalidValue {
        key: tag.to_string(),
        reason: "argument must be a string".to_string(),
    })
}

/// `VAR` or `VAR default`
fn env_var(argument: &str) -> ConfigResult<String> {
    let (name, default) = match argument.trim().split_once(char::is_whitespace) {
        Some((name, default)) => (name, Some(default.trim())),
        None => (argument.trim(), None),
    };

    match (std::env::var(name), default) {
        (Ok(value), _) => {
            debug!(var = %name, "Substituted env var");
            Ok(value)
        }
        (Err(_), Some(default)) => {
            debug!(var = %name, "Env var not set, using default");
            Ok(default.to_string())
        }
        (Err(_), None) => Err(ConfigError::EnvVarNotFound {
            var: name.to_string(),
        }),
    }
}

/// Load a YAML file with full tag processing
pub fn load_yaml(config_dir: impl Into<PathBuf>, file: impl AsRef<Path>) -> ConfigResult<Value> {
    YamlLoader::new(config_dir)?.load_file(file)
}

/// Load YAML text with tag processing
pub fn load_yaml_string(
    config_dir: impl Into<PathBuf>,
    content: &str,
    source_name: &str,
) -> ConfigResult<Value> {
    let config_dir = config_dir.into();
    let source = config_dir.join(source_name);
    YamlLoader::new(config_dir)?.load_string(content, &source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn get<'a>(value: &'a Value, key: &str) -> &'a Value {
        value.get(key).unwrap()
    }

    #[test]
    fn test_load_simple_yaml() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "bridge.yaml", "triggers: []\ncommands: []\n");

        let value = load_yaml(dir.path(), "bridge.yaml").unwrap();
        assert!(get(&value, "triggers").is_sequence());
    }

    #[test]
    fn test_include_is_relative_to_including_file() {
        let dir = TempDir::new().unwrap();
        write_file(
            dir.path(),
            "lights/bed.yaml",
            "- kind: light.on\n  entity_id: light.bed_light\n",
        );
        write_file(dir.path(), "lights/all.yaml", "bed: !include bed.yaml\n");
        write_file(dir.path(), "bridge.yaml", "lights: !include lights/all.yaml\n");

        let value = load_yaml(dir.path(), "bridge.yaml").unwrap();
        let bed = get(get(&value, "lights"), "bed");
        assert_eq!(bed.as_sequence().unwrap().len(), 1);
    }

    #[test]
    fn test_missing_include() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "bridge.yaml", "triggers: !include missing.yaml\n");

        let result = load_yaml(dir.path(), "bridge.yaml");
        assert!(matches!(result, Err(ConfigError::IncludeNotFound { .. })));
    }

    #[test]
    fn test_secret() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "secrets.yaml", "bed_light: light.bed_light\n");
        write_file(dir.path(), "bridge.yaml", "entity_id: !secret bed_light\n");

        let value = load_yaml(dir.path(), "bridge.yaml").unwrap();
        assert_eq!(get(&value, "entity_id").as_str(), Some("light.bed_light"));
    }

    #[test]
    fn test_missing_secret() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "secrets.yaml", "existing: value\n");
        write_file(dir.path(), "bridge.yaml", "entity_id: !secret nonexistent\n");

        let result = load_yaml(dir.path(), "bridge.yaml");
        assert!(matches!(result, Err(ConfigError::SecretNotFound { .. })));
    }

    #[test]
    fn test_env_var_with_default() {
        let dir = TempDir::new().unwrap();
        std::env::set_var("TEST_BRIDGE_PLAYER", "media_player.kitchen");
        std::env::remove_var("TEST_BRIDGE_UNSET");
        write_file(
            dir.path(),
            "bridge.yaml",
            "player: !env_var TEST_BRIDGE_PLAYER\nsource: !env_var TEST_BRIDGE_UNSET Radio One\n",
        );

        let value = load_yaml(dir.path(), "bridge.yaml").unwrap();
        assert_eq!(get(&value, "player").as_str(), Some("media_player.kitchen"));
        assert_eq!(get(&value, "source").as_str(), Some("Radio One"));

        std::env::remove_var("TEST_BRIDGE_PLAYER");
    }

    #[test]
    fn test_env_var_missing() {
        std::env::remove_var("TEST_BRIDGE_NEVER_SET");
        assert!(matches!(
            env_var("TEST_BRIDGE_NEVER_SET"),
            Err(ConfigError::EnvVarNotFound { var }) if var == "TEST_BRIDGE_NEVER_SET"
        ));
    }

    #[test]
    fn test_circular_include_detection() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "a.yaml", "include_b: !include b.yaml\n");
        write_file(dir.path(), "b.yaml", "include_a: !include a.yaml\n");

        let result = load_yaml(dir.path(), "a.yaml");
        assert!(matches!(result, Err(ConfigError::CircularInclude { .. })));
    }

    #[test]
    fn test_unknown_tag_is_kept() {
        let dir = TempDir::new().unwrap();
        let value = load_yaml_string(dir.path(), "x: !custom [1, 2]\n", "inline.yaml").unwrap();
        assert!(matches!(get(&value, "x"), Value::Tagged(_)));
    }
}
