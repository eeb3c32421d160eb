//! Bridge configuration
//!
//! Declares the triggers and commands a bridge registers, plus optional
//! initial appliance states:
//!
//! ```yaml
//! triggers:
//!   - kind: light.on
//!     entity_id: light.bed_light
//!   - kind: sensor.in_between
//!     entity_id: sensor.outdoor
//!     value: 10
//!     range: 5
//! commands:
//!   - kind: light.brightness
//!     entity_id: light.bed_light
//!   - kind: media_player.select_source
//!     entity_id: media_player.living_room
//!     source: Radio
//! appliances:
//!   light.bed_light:
//!     is_on: false
//! ```

use ha_core::ApplianceState;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

use crate::error::{ConfigError, ConfigResult};
use crate::loader::YamlLoader;

/// A trigger to register
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TriggerConfig {
    /// Trigger kind name, e.g. `light.brightness`
    pub kind: String,

    pub entity_id: String,

    /// Appliance events the trigger originates from; the kind's defaults when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<String>>,

    /// Threshold for comparison kinds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,

    /// Window width for in-between kinds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<f64>,

    /// Expected state for exact-match kinds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<JsonValue>,

    /// Expected attributes for exact-match kinds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Map<String, JsonValue>>,
}

/// A command to register
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandConfig {
    /// Command kind name, e.g. `light.turn_on`
    pub kind: String,

    pub entity_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_level: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shuffle: Option<bool>,
}

/// Everything one bridge registers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BridgeConfig {
    #[serde(default)]
    pub triggers: Vec<TriggerConfig>,

    #[serde(default)]
    pub commands: Vec<CommandConfig>,

    /// Initial appliance states by entity id; unlisted appliances start off
    #[serde(default)]
    pub appliances: BTreeMap<String, ApplianceState>,
}

impl BridgeConfig {
    /// Build from an already loaded YAML value
    pub fn from_yaml(yaml: Value, source: &Path) -> ConfigResult<Self> {
        let config: Self = serde_yaml::from_value(yaml).map_err(|e| ConfigError::Schema {
            path: source.to_path_buf(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values serde cannot
    pub fn validate(&self) -> ConfigResult<()> {
        for (i, trigger) in self.triggers.iter().enumerate() {
            let at = |reason: &str| ConfigError::ValidationFailed {
                message: format!("triggers[{}] ({}): {}", i, trigger.kind, reason),
            };
            check_entity_id(&trigger.entity_id).map_err(at)?;
            if let Some(value) = trigger.value {
                if !value.is_finite() {
                    return Err(at("value must be a finite number"));
                }
            }
            if let Some(range) = trigger.range {
                if !(range.is_finite() && range > 0.0) {
                    return Err(at("range must be a positive number"));
                }
            }
        }

        for (i, command) in self.commands.iter().enumerate() {
            let at = |reason: &str| ConfigError::ValidationFailed {
                message: format!("commands[{}] ({}): {}", i, command.kind, reason),
            };
            check_entity_id(&command.entity_id).map_err(at)?;
            if let Some(level) = command.volume_level {
                if !(0.0..=1.0).contains(&level) {
                    return Err(at("volume_level must be within [0, 1]"));
                }
            }
        }

        for entity_id in self.appliances.keys() {
            check_entity_id(entity_id).map_err(|reason| ConfigError::ValidationFailed {
                message: format!("appliances.{}: {}", entity_id, reason),
            })?;
        }

        Ok(())
    }

    /// Initial state of an appliance
    pub fn appliance(&self, entity_id: &str) -> ApplianceState {
        self.appliances.get(entity_id).cloned().unwrap_or_default()
    }
}

fn check_entity_id(entity_id: &str) -> Result<(), &'static str> {
    match entity_id.split_once('.') {
        Some((domain, object_id)) if !domain.is_empty() && !object_id.is_empty() => Ok(()),
        _ => Err("entity_id must look like domain.object_id"),
    }
}

/// Load a bridge configuration file, resolving tags relative to its directory
pub fn load_bridge_config(path: impl AsRef<Path>) -> ConfigResult<BridgeConfig> {
    let path = path.as_ref();
    let config_dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let file = path.file_name().map(Path::new).unwrap_or(path);

    let yaml = YamlLoader::new(config_dir)?.load_file(file)?;
    let config = BridgeConfig::from_yaml(yaml, path)?;

    info!(
        path = %path.display(),
        triggers = config.triggers.len(),
        commands = config.commands.len(),
        "Loaded bridge configuration"
    );
    Ok(config)
}
