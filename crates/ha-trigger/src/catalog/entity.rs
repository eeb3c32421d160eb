//! Exact-match kind for any entity
//!
//! The pattern's state and attributes come from configuration through
//! `Trigger::with_state` and `Trigger::with_attributes`.

use ha_core::message::state_changed;
use serde_json::{json, Value};

use super::has_new_state;
use crate::descriptor::{Strategy, TriggerDescriptor};

pub static EQUALS: TriggerDescriptor = TriggerDescriptor {
    name: "entity.equals",
    strategy: Strategy::Equals,
    check: has_new_state,
    template: equals_template,
    default_events: &[],
    apply: None,
};

/// All entity kinds in registry order
pub static ALL: &[&TriggerDescriptor] = &[&EQUALS];

fn equals_template() -> Value {
    state_changed("none", json!({"state": "on", "attributes": {}}), None)
}
