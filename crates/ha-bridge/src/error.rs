//! Bridge errors

use ha_command::CommandError;
use ha_config::ConfigError;
use ha_trigger::TriggerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Trigger setup failed: {0}")]
    Trigger(#[from] TriggerError),

    #[error("Command setup failed: {0}")]
    Command(#[from] CommandError),

    #[error("Command kind {kind} does not take a {parameter}")]
    UnsupportedParameter { kind: String, parameter: &'static str },

    #[error("Invalid input line: {0}")]
    InvalidInput(String),
}

pub type BridgeResult<T> = Result<T, BridgeError>;
