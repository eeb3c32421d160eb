//! Command kinds
//!
//! A kind is plain data: the service call template its instances start from,
//! when it applies to a transition, and which `service_data` fields are
//! stamped from the new appliance state.

use ha_core::{json_number, ApplianceState, ServiceCallMessage};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

/// Builds a fresh copy of a kind's service call template
pub type MessageTemplate = fn() -> ServiceCallMessage;

/// When a command kind applies to an `(old, new)` transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Applicability {
    /// `is_on` changed and is now true
    TurnedOn,
    /// `is_on` changed and is now false
    TurnedOff,
    /// The new state is on, whatever the old state was
    IsOn,
    /// Every transition
    Always,
}

impl Applicability {
    pub fn holds(&self, old: &ApplianceState, new: &ApplianceState) -> bool {
        match self {
            Applicability::TurnedOn => old.is_on != new.is_on && new.is_on,
            Applicability::TurnedOff => old.is_on != new.is_on && !new.is_on,
            Applicability::IsOn => new.is_on,
            Applicability::Always => true,
        }
    }
}

/// A `service_data` field computed from the new appliance state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stamp {
    /// `brightness` in 0–255 from a 0–100 percentage
    Brightness,
    /// `color_temp` in mireds from the appliance temperature
    ColorTemp,
    /// `hs_color` as `[hue, saturation]`
    HsColor,
}

impl Stamp {
    /// The `service_data` key this stamp writes
    pub fn field(&self) -> &'static str {
        match self {
            Stamp::Brightness => "brightness",
            Stamp::ColorTemp => "color_temp",
            Stamp::HsColor => "hs_color",
        }
    }

    /// Compute the field value, or `None` when the state lacks what it needs
    pub fn value(&self, state: &ApplianceState) -> Option<Value> {
        match self {
            Stamp::Brightness => state
                .brightness
                .map(|b| json_number((b * 255.0 / 100.0).trunc())),
            Stamp::ColorTemp => state
                .temperature
                .filter(|t| *t > 0.0)
                .map(|t| json_number((10000.0 / t).trunc())),
            Stamp::HsColor => match (state.hue, state.saturation) {
                (Some(hue), Some(saturation)) => {
                    Some(json!([json_number(hue), json_number(saturation)]))
                }
                _ => None,
            },
        }
    }
}

impl fmt::Display for Stamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field())
    }
}

/// A registered command kind
pub struct CommandDescriptor {
    /// Unique kind name, e.g. `light.brightness`
    pub name: &'static str,

    /// Service call instances start from, with placeholder values
    pub template: MessageTemplate,

    /// When instances emit a message
    pub applicability: Applicability,

    /// Fields stamped from the new state before sending
    pub stamps: &'static [Stamp],
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("name", &self.name)
            .field("applicability", &self.applicability)
            .field("stamps", &self.stamps)
            .finish_non_exhaustive()
    }
}

impl PartialEq for CommandDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for CommandDescriptor {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_applicability() {
        let off = ApplianceState::off();
        let on = ApplianceState::on();

        assert!(Applicability::TurnedOn.holds(&off, &on));
        assert!(!Applicability::TurnedOn.holds(&on, &on));
        assert!(!Applicability::TurnedOn.holds(&on, &off));
        assert!(Applicability::TurnedOff.holds(&on, &off));
        assert!(!Applicability::TurnedOff.holds(&off, &off));
    }

    #[test]
    fn test_level_applicability() {
        let off = ApplianceState::off();
        let on = ApplianceState::on();

        assert!(Applicability::IsOn.holds(&on, &on));
        assert!(Applicability::IsOn.holds(&off, &on));
        assert!(!Applicability::IsOn.holds(&on, &off));
        assert!(Applicability::Always.holds(&off, &off));
    }

    #[test]
    fn test_brightness_stamp() {
        let stamp = |b: f64| Stamp::Brightness.value(&ApplianceState::on().with_brightness(b));
        assert_eq!(stamp(51.0), Some(json!(130)));
        assert_eq!(stamp(100.0), Some(json!(255)));
        assert_eq!(stamp(0.0), Some(json!(0)));
        assert_eq!(Stamp::Brightness.value(&ApplianceState::on()), None);
    }

    #[test]
    fn test_color_temp_stamp() {
        let stamp = |t: f64| Stamp::ColorTemp.value(&ApplianceState::on().with_temperature(t));
        assert_eq!(stamp(3200.0), Some(json!(3)));
        assert_eq!(stamp(0.0), None);
        assert_eq!(stamp(-1.0), None);
    }

    #[test]
    fn test_hs_color_stamp() {
        let state = ApplianceState::on().with_hue(320.0).with_saturation(80.0);
        assert_eq!(Stamp::HsColor.value(&state), Some(json!([320, 80])));

        let half = ApplianceState::on().with_hue(320.0);
        assert_eq!(Stamp::HsColor.value(&half), None);
    }
}
