//! Built-in trigger kinds
//!
//! - [`light`] - on/off and attribute changes reported for lights
//! - [`sensor`] - numeric threshold comparisons on any entity state
//! - [`entity`] - exact state/attribute patterns on any entity

pub mod entity;
pub mod light;
pub mod sensor;

use ha_core::message;
use serde_json::Value;

/// Whether a message is a `state_changed` event carrying a new state
pub(crate) fn has_new_state(raw: &Value) -> bool {
    raw.get("event")
        .and_then(|e| e.get("event_type"))
        .and_then(Value::as_str)
        == Some(ha_core::events::STATE_CHANGED)
        && message::new_state(raw).is_some_and(Value::is_object)
}

/// Whether the new state carries an attribute key
pub(crate) fn has_attribute(raw: &Value, key: &str) -> bool {
    message::new_attributes(raw).is_some_and(|attrs| attrs.contains_key(key))
}

/// Read a number that may arrive as a JSON number or a numeric string
pub(crate) fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
