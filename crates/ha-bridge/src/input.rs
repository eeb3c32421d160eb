//! Input lines read by the runner
//!
//! Each line is one JSON object. Hub messages keep the hub's own envelope
//! (`type: event`); appliance transitions use `type: transition`:
//!
//! ```text
//! {"type": "transition", "entity_id": "light.bed_light", "old": {...}, "new": {...}}
//! ```
//!
//! `old` may be omitted, in which case the bridge's last known state is used.

use ha_core::ApplianceState;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{BridgeError, BridgeResult};

/// Top-level `type` of an appliance transition line
pub const TRANSITION: &str = "transition";

/// An appliance state transition reported by the appliance state machine
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Transition {
    pub entity_id: String,

    #[serde(default)]
    pub old: Option<ApplianceState>,

    pub new: ApplianceState,
}

/// One parsed input line
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    /// A message from the hub, kept raw for the trigger engine
    Hub(Value),
    /// An appliance transition for the command engine
    Transition(Transition),
    /// Any other message type, which the bridge ignores
    Other(String),
}

impl Input {
    pub fn parse(line: &str) -> BridgeResult<Self> {
        let value: Value = serde_json::from_str(line)
            .map_err(|e| BridgeError::InvalidInput(format!("not JSON: {}", e)))?;

        let message_type = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| BridgeError::InvalidInput("missing message type".to_string()))?;

        match message_type {
            ha_core::events::EVENT => Ok(Input::Hub(value)),
            TRANSITION => serde_json::from_value(value)
                .map(Input::Transition)
                .map_err(|e| BridgeError::InvalidInput(format!("bad transition: {}", e))),
            other => Ok(Input::Other(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hub_event() {
        let input = Input::parse(r#"{"type": "event", "event": {"event_type": "state_changed"}}"#)
            .unwrap();
        assert!(matches!(input, Input::Hub(_)));
    }

    #[test]
    fn test_parse_transition() {
        let input = Input::parse(
            r#"{"type": "transition", "entity_id": "light.bed_light", "new": {"is_on": true, "brightness": 51}}"#,
        )
        .unwrap();

        let Input::Transition(transition) = input else {
            panic!("expected a transition");
        };
        assert_eq!(transition.entity_id, "light.bed_light");
        assert!(transition.old.is_none());
        assert_eq!(transition.new.brightness, Some(51.0));
    }

    #[test]
    fn test_parse_other_and_invalid() {
        assert_eq!(
            Input::parse(r#"{"type": "result", "success": true}"#).unwrap(),
            Input::Other("result".to_string())
        );
        assert!(matches!(
            Input::parse("not json"),
            Err(BridgeError::InvalidInput(_))
        ));
        assert!(matches!(
            Input::parse(r#"{"event": {}}"#),
            Err(BridgeError::InvalidInput(_))
        ));
        assert!(matches!(
            Input::parse(r#"{"type": "transition", "entity_id": "light.a"}"#),
            Err(BridgeError::InvalidInput(_))
        ));
    }
}
