//! Command errors

use thiserror::Error;

/// Command registration errors
///
/// Synthesis itself never fails: a command that does not apply to a
/// transition yields no message.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Unknown command kind: {0}")]
    UnknownKind(String),

    #[error("Command kind already registered: {0}")]
    DuplicateKind(String),
}

/// Result type for command operations
pub type CommandResult<T> = Result<T, CommandError>;
