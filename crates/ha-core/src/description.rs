//! Parsed view over an inbound hub message

use indexmap::IndexMap;
use serde_json::Value;
use tracing::trace;

use crate::events::STATE_CHANGED;
use crate::StateValue;

/// Attribute mapping of an entity state, in message order
pub type Attributes = IndexMap<String, Value>;

/// Typed view of one inbound `state_changed` message
///
/// Parsing never fails: any missing or mistyped path yields `None` or an
/// empty mapping for that field, and a message that is not a `state_changed`
/// event yields an entirely empty description. Matching code treats absence
/// as "never equal, never triggered".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Description {
    entity_id: Option<String>,
    state: Option<StateValue>,
    old_state: Option<StateValue>,
    attributes: Attributes,
    old_attributes: Attributes,
}

impl Description {
    /// Parse a raw message envelope
    ///
    /// ```text
    /// {type, event: {event_type, data: {entity_id, new_state: {state, attributes}, old_state?}}}
    /// ```
    pub fn parse(message: &Value) -> Self {
        let Some(event) = message.get("event") else {
            trace!("Message has no event payload");
            return Self::default();
        };

        if event.get("event_type").and_then(Value::as_str) != Some(STATE_CHANGED) {
            trace!(event_type = ?event.get("event_type"), "Not a state_changed event");
            return Self::default();
        }

        let Some(data) = event.get("data") else {
            return Self::default();
        };

        let new_state = data.get("new_state");
        let old_state = data.get("old_state");

        Self {
            entity_id: data
                .get("entity_id")
                .and_then(Value::as_str)
                .map(str::to_owned),
            state: state_of(new_state),
            old_state: state_of(old_state),
            attributes: attributes_of(new_state),
            old_attributes: attributes_of(old_state),
        }
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub fn state(&self) -> Option<&StateValue> {
        self.state.as_ref()
    }

    pub fn old_state(&self) -> Option<&StateValue> {
        self.old_state.as_ref()
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn old_attributes(&self) -> &Attributes {
        &self.old_attributes
    }

    /// Get a current attribute by key
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// True when nothing could be extracted from the message
    pub fn is_empty(&self) -> bool {
        self.entity_id.is_none()
            && self.state.is_none()
            && self.old_state.is_none()
            && self.attributes.is_empty()
            && self.old_attributes.is_empty()
    }
}

fn state_of(state: Option<&Value>) -> Option<StateValue> {
    state
        .and_then(|s| s.get("state"))
        .and_then(StateValue::from_json)
}

fn attributes_of(state: Option<&Value>) -> Attributes {
    state
        .and_then(|s| s.get("attributes"))
        .and_then(Value::as_object)
        .map(|attrs| {
            attrs
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()
        })
        .unwrap_or_default()
}
