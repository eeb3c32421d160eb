//! Light trigger kinds
//!
//! Registry order is on, off, brightness, temperature, hue/saturation.

use ha_core::message::{self, state_changed};
use ha_core::{ApplianceState, Attribute, Description};
use serde_json::{json, Value};

use super::{as_number, has_attribute};
use crate::descriptor::{Strategy, TriggerDescriptor};

/// Appliance event emitted when a light is forced on from the hub
pub const EVENT_FORCED_ON: &str = "forced_on";

/// Appliance event emitted when a light is forced off from the hub
pub const EVENT_FORCED_OFF: &str = "forced_off";

pub static ON: TriggerDescriptor = TriggerDescriptor {
    name: "light.on",
    strategy: Strategy::ChangedState,
    check: is_on,
    template: on_template,
    default_events: &[EVENT_FORCED_ON],
    apply: Some(apply_on),
};

pub static OFF: TriggerDescriptor = TriggerDescriptor {
    name: "light.off",
    strategy: Strategy::ChangedState,
    check: is_off,
    template: off_template,
    default_events: &[EVENT_FORCED_OFF],
    apply: Some(apply_off),
};

pub static BRIGHTNESS: TriggerDescriptor = TriggerDescriptor {
    name: "light.brightness",
    strategy: Strategy::ChangedAttribute,
    check: has_brightness,
    template: brightness_template,
    default_events: &[],
    apply: Some(apply_brightness),
};

pub static TEMPERATURE: TriggerDescriptor = TriggerDescriptor {
    name: "light.temperature",
    strategy: Strategy::ChangedAttribute,
    check: has_color_temp,
    template: temperature_template,
    default_events: &[],
    apply: Some(apply_temperature),
};

pub static HUE_SATURATION: TriggerDescriptor = TriggerDescriptor {
    name: "light.hue_saturation",
    strategy: Strategy::ChangedAttribute,
    check: has_hs_color,
    template: hue_saturation_template,
    default_events: &[],
    apply: Some(apply_hue_saturation),
};

/// All light kinds in registry order
pub static ALL: &[&TriggerDescriptor] = &[&ON, &OFF, &BRIGHTNESS, &TEMPERATURE, &HUE_SATURATION];

fn new_state_is(raw: &Value, expected: &str) -> bool {
    message::new_state(raw)
        .and_then(|s| s.get("state"))
        .and_then(Value::as_str)
        == Some(expected)
}

fn is_on(raw: &Value) -> bool {
    new_state_is(raw, "on")
}

fn is_off(raw: &Value) -> bool {
    new_state_is(raw, "off")
}

fn has_brightness(raw: &Value) -> bool {
    has_attribute(raw, "brightness")
}

fn has_color_temp(raw: &Value) -> bool {
    has_attribute(raw, "color_temp")
}

fn has_hs_color(raw: &Value) -> bool {
    has_attribute(raw, "hs_color")
}

fn on_template() -> Value {
    state_changed("none", json!({"state": "on", "attributes": {}}), None)
}

fn off_template() -> Value {
    state_changed("none", json!({"state": "off", "attributes": {}}), None)
}

fn brightness_template() -> Value {
    state_changed("none", json!({"attributes": {"brightness": "0"}}), None)
}

fn temperature_template() -> Value {
    state_changed("none", json!({"attributes": {"color_temp": 1}}), None)
}

fn hue_saturation_template() -> Value {
    state_changed("none", json!({"attributes": {"hs_color": [1, 1]}}), None)
}

fn apply_on(_: &Description, state: &mut ApplianceState) {
    state.is_on = true;
}

fn apply_off(_: &Description, state: &mut ApplianceState) {
    state.is_on = false;
}

/// Hub brightness is 0–255, the appliance's is a 0–100 percentage
fn apply_brightness(incoming: &Description, state: &mut ApplianceState) {
    if let Some(brightness) = incoming.attribute("brightness").and_then(as_number) {
        state.set_attribute(Attribute::Brightness, (brightness * 100.0 / 255.0).trunc());
    }
}

fn apply_temperature(incoming: &Description, state: &mut ApplianceState) {
    if let Some(color_temp) = incoming.attribute("color_temp").and_then(as_number) {
        state.set_attribute(Attribute::Temperature, color_temp * 10000.0);
    }
}

fn apply_hue_saturation(incoming: &Description, state: &mut ApplianceState) {
    let Some(hs) = incoming.attribute("hs_color").and_then(Value::as_array) else {
        return;
    };
    if let (Some(hue), Some(saturation)) = (
        hs.first().and_then(as_number),
        hs.get(1).and_then(as_number),
    ) {
        state.set_attribute(Attribute::Hue, hue);
        state.set_attribute(Attribute::Saturation, saturation);
    }
}
