//! Trigger kinds
//!
//! A kind is plain data: the message template its instances start from, a
//! structural check used to classify inbound messages, the matching strategy,
//! and optionally how a firing maps back onto the appliance state.

use ha_core::{ApplianceState, Description};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Structural probe deciding whether a raw message belongs to a kind
pub type StructuralCheck = fn(&serde_json::Value) -> bool;

/// Builds a fresh copy of a kind's template message
pub type TemplateFn = fn() -> serde_json::Value;

/// Maps a firing message onto the appliance state
pub type StateMapper = fn(&Description, &mut ApplianceState);

/// Matching strategy of a trigger kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Same state and the same set of attribute values
    Equals,
    /// State changed into the pattern's state
    ChangedState,
    /// At least one of the pattern's attributes changed
    ChangedAttribute,
    /// Incoming state above the pattern's threshold
    GreaterThan,
    /// Incoming state below the pattern's threshold
    LesserThan,
    /// Incoming state strictly inside `(threshold, threshold + range)`
    InBetween,
}

impl Strategy {
    /// Whether this is a numeric comparison rather than an equality test
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Strategy::GreaterThan | Strategy::LesserThan | Strategy::InBetween
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Equals => "equals",
            Strategy::ChangedState => "changed_state",
            Strategy::ChangedAttribute => "changed_attribute",
            Strategy::GreaterThan => "greater_than",
            Strategy::LesserThan => "lesser_than",
            Strategy::InBetween => "in_between",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered trigger kind
pub struct TriggerDescriptor {
    /// Unique kind name, e.g. `light.brightness`
    pub name: &'static str,

    /// How instances of this kind match
    pub strategy: Strategy,

    /// Whether an inbound message structurally belongs to this kind
    pub check: StructuralCheck,

    /// Template message instances are built from
    pub template: TemplateFn,

    /// Appliance events instances originate from when none are configured
    pub default_events: &'static [&'static str],

    /// How a firing of this kind updates the appliance state
    pub apply: Option<StateMapper>,
}

impl TriggerDescriptor {
    /// Run the structural check against a raw message
    pub fn claims(&self, message: &serde_json::Value) -> bool {
        (self.check)(message)
    }
}

impl fmt::Debug for TriggerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriggerDescriptor")
            .field("name", &self.name)
            .field("strategy", &self.strategy)
            .field("default_events", &self.default_events)
            .finish_non_exhaustive()
    }
}

impl PartialEq for TriggerDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for TriggerDescriptor {}
