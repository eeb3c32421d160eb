//! Builders and in-place editors for inbound message envelopes
//!
//! Trigger templates and test fixtures are plain JSON envelopes of the shape
//! the hub sends. These helpers build them and inject the per-instance fields
//! (entity id, templated state) into a freshly built copy.

use serde_json::{json, Value};

use crate::events::{EVENT, STATE_CHANGED};

/// Build a `state_changed` event envelope
///
/// `new_state` and `old_state` are the state objects without their
/// `entity_id`, which is filled in from `entity_id`.
pub fn state_changed(entity_id: &str, new_state: Value, old_state: Option<Value>) -> Value {
    let mut data = json!({
        "entity_id": entity_id,
        "new_state": with_entity_id(new_state, entity_id),
    });

    if let Some(old_state) = old_state {
        data["old_state"] = with_entity_id(old_state, entity_id);
    }

    json!({
        "type": EVENT,
        "event": {
            "event_type": STATE_CHANGED,
            "data": data,
        }
    })
}

/// Set `event.data.entity_id` (and the new state's entity id) in place
///
/// Returns false when the envelope has no `event.data` object to edit.
pub fn set_entity_id(message: &mut Value, entity_id: &str) -> bool {
    let Some(data) = message
        .get_mut("event")
        .and_then(|e| e.get_mut("data"))
        .and_then(Value::as_object_mut)
    else {
        return false;
    };

    data.insert("entity_id".to_string(), json!(entity_id));
    if let Some(new_state) = data.get_mut("new_state").and_then(Value::as_object_mut) {
        new_state.insert("entity_id".to_string(), json!(entity_id));
    }
    true
}

/// Set `event.data.new_state.state` in place
///
/// Returns false when the envelope has no `new_state` object to edit.
pub fn set_state(message: &mut Value, state: Value) -> bool {
    let Some(new_state) = message
        .get_mut("event")
        .and_then(|e| e.get_mut("data"))
        .and_then(|d| d.get_mut("new_state"))
        .and_then(Value::as_object_mut)
    else {
        return false;
    };

    new_state.insert("state".to_string(), state);
    true
}

/// Replace `event.data.new_state.attributes` in place
pub fn set_attributes(message: &mut Value, attributes: serde_json::Map<String, Value>) -> bool {
    let Some(new_state) = message
        .get_mut("event")
        .and_then(|e| e.get_mut("data"))
        .and_then(|d| d.get_mut("new_state"))
        .and_then(Value::as_object_mut)
    else {
        return false;
    };

    new_state.insert("attributes".to_string(), Value::Object(attributes));
    true
}

/// Read `event.data.new_state`
pub fn new_state(message: &Value) -> Option<&Value> {
    message.get("event")?.get("data")?.get("new_state")
}

/// Read `event.data.new_state.attributes`
pub fn new_attributes(message: &Value) -> Option<&serde_json::Map<String, Value>> {
    new_state(message)?.get("attributes")?.as_object()
}

fn with_entity_id(mut state: Value, entity_id: &str) -> Value {
    if let Some(obj) = state.as_object_mut() {
        obj.insert("entity_id".to_string(), json!(entity_id));
    }
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Description, StateValue};

    #[test]
    fn test_state_changed_parses_back() {
        let message = state_changed(
            "light.kitchen",
            json!({"state": "on", "attributes": {"brightness": 10}}),
            Some(json!({"state": "off", "attributes": {}})),
        );

        let description = Description::parse(&message);
        assert_eq!(description.entity_id(), Some("light.kitchen"));
        assert_eq!(description.state(), Some(&StateValue::from("on")));
        assert_eq!(description.old_state(), Some(&StateValue::from("off")));
        assert_eq!(
            message["event"]["data"]["new_state"]["entity_id"],
            json!("light.kitchen")
        );
    }

    #[test]
    fn test_set_fields() {
        let mut message = state_changed("none", json!({"state": "on"}), None);

        assert!(set_entity_id(&mut message, "sensor.outdoor"));
        assert!(set_state(&mut message, json!(21.5)));

        let description = Description::parse(&message);
        assert_eq!(description.entity_id(), Some("sensor.outdoor"));
        assert_eq!(description.state(), Some(&StateValue::from(21.5)));
    }

    #[test]
    fn test_set_fields_on_malformed() {
        let mut message = json!({"type": "event"});
        assert!(!set_entity_id(&mut message, "light.x"));
        assert!(!set_state(&mut message, json!("on")));
        assert!(new_attributes(&message).is_none());
    }
}
