//! Appliance-side state consumed by the command engine

use serde::{Deserialize, Serialize};
use std::fmt;

/// Continuous appliance attributes the bridge knows how to convert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    /// Brightness in percent, 0–100
    Brightness,
    /// Color temperature in the appliance's Kelvin-like units (e.g. 3200)
    Temperature,
    /// Hue in native units
    Hue,
    /// Saturation in native units
    Saturation,
}

impl Attribute {
    pub fn as_str(&self) -> &'static str {
        match self {
            Attribute::Brightness => "brightness",
            Attribute::Temperature => "temperature",
            Attribute::Hue => "hue",
            Attribute::Saturation => "saturation",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of an appliance's state as seen by the state machine
///
/// The appliance state machine hands `(old, new)` pairs of these to the
/// command engine on every transition. Attributes an appliance does not
/// support stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplianceState {
    #[serde(default)]
    pub is_on: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brightness: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hue: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saturation: Option<f64>,
}

impl ApplianceState {
    /// An appliance that is off with no attributes set
    pub fn off() -> Self {
        Self::default()
    }

    /// An appliance that is on with no attributes set
    pub fn on() -> Self {
        Self {
            is_on: true,
            ..Self::default()
        }
    }

    pub fn with_brightness(mut self, brightness: f64) -> Self {
        self.brightness = Some(brightness);
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_hue(mut self, hue: f64) -> Self {
        self.hue = Some(hue);
        self
    }

    pub fn with_saturation(mut self, saturation: f64) -> Self {
        self.saturation = Some(saturation);
        self
    }

    /// Read an attribute by kind
    pub fn attribute(&self, attribute: Attribute) -> Option<f64> {
        match attribute {
            Attribute::Brightness => self.brightness,
            Attribute::Temperature => self.temperature,
            Attribute::Hue => self.hue,
            Attribute::Saturation => self.saturation,
        }
    }

    /// Write an attribute by kind
    pub fn set_attribute(&mut self, attribute: Attribute, value: f64) {
        let slot = match attribute {
            Attribute::Brightness => &mut self.brightness,
            Attribute::Temperature => &mut self.temperature,
            Attribute::Hue => &mut self.hue,
            Attribute::Saturation => &mut self.saturation,
        };
        *slot = Some(value);
    }
}
