//! Trigger errors
//!
//! Only registration can fail. Matching never returns an error.

use thiserror::Error;

/// Trigger registration errors
#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("Unknown trigger kind: {0}")]
    UnknownKind(String),

    #[error("Trigger kind already registered: {0}")]
    DuplicateKind(String),

    #[error("Template of trigger kind {0} has no event data to fill")]
    InvalidTemplate(String),

    #[error("Trigger kind {kind} does not accept a {field}")]
    UnsupportedField { kind: String, field: &'static str },
}

/// Result type for trigger operations
pub type TriggerResult<T> = Result<T, TriggerError>;
