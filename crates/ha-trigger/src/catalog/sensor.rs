//! Numeric threshold kinds
//!
//! These claim any `state_changed` message whose new state reads as a
//! number. Instances take their threshold from `Trigger::with_value`.

use ha_core::message::{self, state_changed};
use serde_json::{json, Value};

use super::{as_number, has_new_state};
use crate::descriptor::{Strategy, TriggerDescriptor};

pub static GREATER_THAN: TriggerDescriptor = TriggerDescriptor {
    name: "sensor.greater_than",
    strategy: Strategy::GreaterThan,
    check: has_numeric_state,
    template: threshold_template,
    default_events: &[],
    apply: None,
};

pub static LESSER_THAN: TriggerDescriptor = TriggerDescriptor {
    name: "sensor.lesser_than",
    strategy: Strategy::LesserThan,
    check: has_numeric_state,
    template: threshold_template,
    default_events: &[],
    apply: None,
};

pub static IN_BETWEEN: TriggerDescriptor = TriggerDescriptor {
    name: "sensor.in_between",
    strategy: Strategy::InBetween,
    check: has_numeric_state,
    template: threshold_template,
    default_events: &[],
    apply: None,
};

/// All sensor kinds in registry order
pub static ALL: &[&TriggerDescriptor] = &[&GREATER_THAN, &LESSER_THAN, &IN_BETWEEN];

fn has_numeric_state(raw: &Value) -> bool {
    has_new_state(raw)
        && message::new_state(raw)
            .and_then(|s| s.get("state"))
            .and_then(as_number)
            .is_some()
}

fn threshold_template() -> Value {
    state_changed("none", json!({"state": "0", "attributes": {}}), None)
}
