//! Configuration loading for the hub bridge
//!
//! YAML files may use these custom tags:
//!
//! - `!include path` - Include another YAML file
//! - `!secret key` - Substitute from secrets.yaml
//! - `!env_var VAR [default]` - Environment variable substitution
//!
//! # Example
//!
//! ```ignore
//! use ha_config::load_bridge_config;
//!
//! let config = load_bridge_config("/config/bridge.yaml")?;
//! for trigger in &config.triggers {
//!     println!("{} on {}", trigger.kind, trigger.entity_id);
//! }
//! ```

mod bridge;
mod error;
mod loader;
mod secrets;

pub use bridge::{load_bridge_config, BridgeConfig, CommandConfig, TriggerConfig};
pub use error::{ConfigError, ConfigResult};
pub use loader::{load_yaml, load_yaml_string, YamlLoader};
pub use secrets::Secrets;

// Re-export serde_yaml::Value for convenience
pub use serde_yaml::Value;
