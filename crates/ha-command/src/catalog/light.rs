//! Light command kinds
//!
//! Color and brightness kinds, including the `off_*` variants that call
//! `turn_off`, apply whenever the new state is on. Only `turn_on` and
//! `turn_off` are edge-triggered.

use ha_core::ServiceCallMessage;
use serde_json::json;

use crate::descriptor::{Applicability, CommandDescriptor, Stamp};

pub const DOMAIN: &str = "light";

/// `color_mode` sent along with color temperature from `turn_off`
pub const COLOR_MODE_COLOR_TEMP: &str = "ColorMode.COLOR_TEMP";

/// `color_mode` sent along with hue/saturation from `turn_off`
pub const COLOR_MODE_HS: &str = "ColorMode.HS";

pub static TURN_ON: CommandDescriptor = CommandDescriptor {
    name: "light.turn_on",
    template: turn_on,
    applicability: Applicability::TurnedOn,
    stamps: &[],
};

pub static TURN_OFF: CommandDescriptor = CommandDescriptor {
    name: "light.turn_off",
    template: turn_off,
    applicability: Applicability::TurnedOff,
    stamps: &[],
};

pub static BRIGHTNESS: CommandDescriptor = CommandDescriptor {
    name: "light.brightness",
    template: brightness_on,
    applicability: Applicability::IsOn,
    stamps: &[Stamp::Brightness],
};

pub static OFF_BRIGHTNESS: CommandDescriptor = CommandDescriptor {
    name: "light.off_brightness",
    template: brightness_off,
    applicability: Applicability::IsOn,
    stamps: &[Stamp::Brightness],
};

pub static TEMPERATURE: CommandDescriptor = CommandDescriptor {
    name: "light.temperature",
    template: temperature_on,
    applicability: Applicability::IsOn,
    stamps: &[Stamp::ColorTemp],
};

pub static OFF_TEMPERATURE: CommandDescriptor = CommandDescriptor {
    name: "light.off_temperature",
    template: temperature_off,
    applicability: Applicability::IsOn,
    stamps: &[Stamp::ColorTemp],
};

pub static HUE_SATURATION: CommandDescriptor = CommandDescriptor {
    name: "light.hue_saturation",
    template: hue_saturation_on,
    applicability: Applicability::IsOn,
    stamps: &[Stamp::HsColor],
};

pub static OFF_HUE_SATURATION: CommandDescriptor = CommandDescriptor {
    name: "light.off_hue_saturation",
    template: hue_saturation_off,
    applicability: Applicability::IsOn,
    stamps: &[Stamp::HsColor],
};

/// All light kinds in registry order
pub static ALL: &[&CommandDescriptor] = &[
    &TURN_ON,
    &TURN_OFF,
    &BRIGHTNESS,
    &OFF_BRIGHTNESS,
    &TEMPERATURE,
    &OFF_TEMPERATURE,
    &HUE_SATURATION,
    &OFF_HUE_SATURATION,
];

fn turn_on() -> ServiceCallMessage {
    ServiceCallMessage::new(DOMAIN, "turn_on")
}

fn turn_off() -> ServiceCallMessage {
    ServiceCallMessage::new(DOMAIN, "turn_off")
}

// brightness is an int in [1, 255]
fn brightness_on() -> ServiceCallMessage {
    turn_on().with_data("brightness", json!(127))
}

fn brightness_off() -> ServiceCallMessage {
    turn_off().with_data("brightness", json!(127))
}

fn temperature_on() -> ServiceCallMessage {
    turn_on().with_data("color_temp", json!(1))
}

fn temperature_off() -> ServiceCallMessage {
    turn_off()
        .with_data("color_mode", json!(COLOR_MODE_COLOR_TEMP))
        .with_data("color_temp", json!(1))
}

fn hue_saturation_on() -> ServiceCallMessage {
    turn_on().with_data("hs_color", json!([1, 1]))
}

fn hue_saturation_off() -> ServiceCallMessage {
    turn_off()
        .with_data("color_mode", json!(COLOR_MODE_HS))
        .with_data("hs_color", json!([1, 1]))
}
