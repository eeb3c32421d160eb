//! Registered trigger patterns
//!
//! A [`Trigger`] is built once at registration from its kind's template and
//! an entity id, then compared repeatedly against inbound messages. It is
//! never mutated after construction, so a trigger can be evaluated from
//! several callers at once.

use ha_core::{json_number, message, ApplianceState, Description, StateValue};
use serde_json::Value;
use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use tracing::{debug, trace};

use crate::descriptor::{Strategy, TriggerDescriptor};
use crate::error::{TriggerError, TriggerResult};
use crate::matcher::{self, Side};

/// Default width of an in-between window
const DEFAULT_RANGE: f64 = 1.0;

/// Something a trigger can be tested against
///
/// A bare [`Description`] carries no kind. A [`Trigger`] built by the
/// registry from an inbound message carries the kind that claimed it, which
/// comparison triggers require to be their own.
pub trait Incoming {
    /// Parsed view of the inbound message
    fn description(&self) -> &Description;

    /// Name of the kind that claimed the message, if any
    fn kind(&self) -> Option<&'static str> {
        None
    }
}

impl Incoming for Description {
    fn description(&self) -> &Description {
        self
    }
}

/// A registered trigger pattern
#[derive(Debug, Clone)]
pub struct Trigger {
    descriptor: &'static TriggerDescriptor,
    message: Value,
    view: Description,
    events: BTreeSet<String>,
    range: Option<f64>,
}

impl Trigger {
    /// Wrap a raw message as a trigger of the given kind
    ///
    /// This is how the registry turns inbound messages into candidates.
    pub fn new(descriptor: &'static TriggerDescriptor, message: Value) -> Self {
        let view = Description::parse(&message);
        Self {
            descriptor,
            message,
            view,
            events: BTreeSet::new(),
            range: None,
        }
    }

    /// Build a trigger for `entity_id` from a fresh copy of the kind's template
    pub fn make(descriptor: &'static TriggerDescriptor, entity_id: &str) -> TriggerResult<Self> {
        let mut template = (descriptor.template)();
        if !message::set_entity_id(&mut template, entity_id) {
            return Err(TriggerError::InvalidTemplate(descriptor.name.to_string()));
        }
        Ok(Self::new(descriptor, template))
    }

    /// Restrict the appliance events this trigger may originate from
    pub fn with_events<I, S>(mut self, events: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.events = events.into_iter().map(Into::into).collect();
        self
    }

    /// Use the kind's default events
    pub fn with_default_events(self) -> Self {
        let defaults = self.descriptor.default_events;
        self.with_events(defaults.iter().copied())
    }

    /// Replace the templated state
    pub fn with_state(mut self, state: Value) -> TriggerResult<Self> {
        if !message::set_state(&mut self.message, state) {
            return Err(TriggerError::InvalidTemplate(self.descriptor.name.to_string()));
        }
        self.view = Description::parse(&self.message);
        Ok(self)
    }

    /// Replace the templated attributes
    pub fn with_attributes(
        mut self,
        attributes: serde_json::Map<String, Value>,
    ) -> TriggerResult<Self> {
        if !message::set_attributes(&mut self.message, attributes) {
            return Err(TriggerError::InvalidTemplate(self.descriptor.name.to_string()));
        }
        self.view = Description::parse(&self.message);
        Ok(self)
    }

    /// Embed a comparison threshold as the templated state
    pub fn with_value(self, value: f64) -> TriggerResult<Self> {
        if !self.descriptor.strategy.is_comparison() {
            return Err(TriggerError::UnsupportedField {
                kind: self.descriptor.name.to_string(),
                field: "value",
            });
        }
        self.with_state(json_number(value))
    }

    /// Set the width of an in-between window
    ///
    /// A width that is not a positive finite number leaves the default.
    pub fn with_range(mut self, range: f64) -> TriggerResult<Self> {
        if self.descriptor.strategy != Strategy::InBetween {
            return Err(TriggerError::UnsupportedField {
                kind: self.descriptor.name.to_string(),
                field: "range",
            });
        }
        if range.is_finite() && range > 0.0 {
            self.range = Some(range);
        } else {
            debug!(kind = self.descriptor.name, range, "Ignoring unusable range");
            self.range = None;
        }
        Ok(self)
    }

    pub fn descriptor(&self) -> &'static TriggerDescriptor {
        self.descriptor
    }

    pub fn strategy(&self) -> Strategy {
        self.descriptor.strategy
    }

    /// The pattern message this trigger was built from
    pub fn message(&self) -> &Value {
        &self.message
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.view.entity_id()
    }

    pub fn state(&self) -> Option<&StateValue> {
        self.view.state()
    }

    pub fn attributes(&self) -> &ha_core::Attributes {
        self.view.attributes()
    }

    pub fn events(&self) -> &BTreeSet<String> {
        &self.events
    }

    /// Width of the in-between window
    pub fn range(&self) -> f64 {
        self.range.unwrap_or(DEFAULT_RANGE)
    }

    /// Whether two triggers describe the same automation
    ///
    /// Entity ids must match and, when both sides list events, the event sets
    /// must intersect. The strategy of `self` adds state and attribute rules.
    pub fn equals(&self, other: &Trigger) -> bool {
        let ours = self.side();
        let theirs = other.side();
        matcher::equality_rules(self.strategy())
            .iter()
            .all(|rule| rule(&ours, &theirs))
    }

    /// Whether this pattern fires for an inbound message
    ///
    /// Never fails: any missing field makes the answer `false`.
    pub fn is_triggered<I: Incoming + ?Sized>(&self, incoming: &I) -> bool {
        let no_events = BTreeSet::new();
        let ours = self.side();
        let theirs = Side {
            view: incoming.description(),
            events: &no_events,
        };

        if !matcher::same_entity(&ours, &theirs) {
            return false;
        }

        let rules_hold = || {
            matcher::equality_rules(self.strategy())
                .iter()
                .all(|rule| rule(&ours, &theirs))
        };
        let same_kind = || incoming.kind() == Some(self.descriptor.name);
        let threshold = self.view.state();
        let value = theirs.view.state();

        let triggered = match self.strategy() {
            Strategy::Equals => rules_hold(),
            Strategy::ChangedState => rules_hold() && matcher::state_changed(theirs.view),
            Strategy::ChangedAttribute => {
                rules_hold() && matcher::attribute_changed(self.attributes().keys(), theirs.view)
            }
            Strategy::GreaterThan => {
                same_kind() && matcher::compare(threshold, value, |t, v| t < v)
            }
            Strategy::LesserThan => {
                same_kind() && matcher::compare(threshold, value, |t, v| t > v)
            }
            Strategy::InBetween => {
                let range = self.range();
                same_kind() && matcher::compare(threshold, value, |t, v| t < v && v < t + range)
            }
        };

        if triggered {
            debug!(trigger = %self, incoming = ?theirs.view, "Trigger matched");
        } else {
            trace!(kind = self.descriptor.name, state = ?value, "Trigger did not match");
        }

        triggered
    }

    /// Hash identifying duplicate registrations
    ///
    /// Built from the kind, entity id and state, plus the attribute keys for
    /// changed-attribute triggers.
    pub fn identity_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.descriptor.name.hash(&mut hasher);
        self.entity_id().hash(&mut hasher);
        self.state().hash(&mut hasher);
        if self.strategy() == Strategy::ChangedAttribute {
            for key in self.attributes().keys() {
                key.hash(&mut hasher);
            }
        }
        hasher.finish()
    }

    /// Copy `old_state` with this kind's reading of the incoming message applied
    pub fn make_new_state_from(
        &self,
        incoming: &Description,
        old_state: &ApplianceState,
    ) -> ApplianceState {
        let mut new_state = old_state.clone();
        if let Some(apply) = self.descriptor.apply {
            apply(incoming, &mut new_state);
        }
        new_state
    }

    fn side(&self) -> Side<'_> {
        Side {
            view: &self.view,
            events: &self.events,
        }
    }
}

impl Incoming for Trigger {
    fn description(&self) -> &Description {
        &self.view
    }

    fn kind(&self) -> Option<&'static str> {
        Some(self.descriptor.name)
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entity_id = self.entity_id().unwrap_or("<none>");
        let state = self
            .state()
            .map(StateValue::to_string)
            .unwrap_or_else(|| "<none>".to_string());

        match self.strategy() {
            Strategy::Equals => {
                let attributes: serde_json::Map<String, Value> = self
                    .attributes()
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                write!(
                    f,
                    "Triggered entity {} state {} with attributes [{}]",
                    entity_id,
                    state,
                    Value::Object(attributes)
                )
            }
            Strategy::ChangedState => {
                write!(f, "Triggered entity {} with state changed in {}", entity_id, state)
            }
            Strategy::ChangedAttribute => {
                let keys: Vec<&str> = self.attributes().keys().map(String::as_str).collect();
                write!(
                    f,
                    "Triggered entity {} with at least one changed attribute in {:?}",
                    entity_id, keys
                )
            }
            Strategy::GreaterThan => {
                write!(f, "Triggered entity {} greater than {}", entity_id, state)
            }
            Strategy::LesserThan => {
                write!(f, "Triggered entity {} lesser than {}", entity_id, state)
            }
            Strategy::InBetween => {
                let upper = self
                    .state()
                    .and_then(StateValue::as_number)
                    .map(|t| (t + self.range()).to_string())
                    .unwrap_or_else(|| "<none>".to_string());
                write!(
                    f,
                    "Triggered entity {} in between [{}:{}]",
                    entity_id, state, upper
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ha_core::message::state_changed;
    use serde_json::json;

    fn no_check(_: &Value) -> bool {
        false
    }

    fn on_template() -> Value {
        state_changed("none", json!({"state": "on", "attributes": {}}), None)
    }

    fn attribute_template() -> Value {
        state_changed("none", json!({"attributes": {"an_attribute": "a_value"}}), None)
    }

    fn threshold_template() -> Value {
        state_changed("none", json!({"state": "0"}), None)
    }

    static CHANGED_ON: TriggerDescriptor = TriggerDescriptor {
        name: "test.changed_on",
        strategy: Strategy::ChangedState,
        check: no_check,
        template: on_template,
        default_events: &["forced_on"],
        apply: None,
    };

    static CHANGED_ATTRIBUTE: TriggerDescriptor = TriggerDescriptor {
        name: "test.changed_attribute",
        strategy: Strategy::ChangedAttribute,
        check: no_check,
        template: attribute_template,
        default_events: &[],
        apply: None,
    };

    static ABOVE: TriggerDescriptor = TriggerDescriptor {
        name: "test.above",
        strategy: Strategy::GreaterThan,
        check: no_check,
        template: threshold_template,
        default_events: &[],
        apply: None,
    };

    fn example_message() -> Value {
        state_changed(
            "example_id",
            json!({"state": "on", "attributes": {"an_attribute": "new_value", "min_mireds": 153}}),
            Some(json!({"state": "off", "attributes": {"an_attribute": "old_value", "min_mireds": 153}})),
        )
    }

    #[test]
    fn test_make_round_trips_through_description() {
        let trigger = Trigger::make(&ABOVE, "sensor.outdoor")
            .unwrap()
            .with_events(["tick"])
            .with_value(10.0)
            .unwrap();

        let parsed = Description::parse(trigger.message());
        assert_eq!(parsed.entity_id(), trigger.entity_id());
        assert_eq!(parsed.state(), trigger.state());
        assert_eq!(trigger.state(), Some(&StateValue::from(10.0)));
    }

    #[test]
    fn test_make_does_not_share_templates() {
        let a = Trigger::make(&CHANGED_ON, "light.a").unwrap();
        let b = Trigger::make(&CHANGED_ON, "light.b").unwrap();
        assert_eq!(a.entity_id(), Some("light.a"));
        assert_eq!(b.entity_id(), Some("light.b"));
    }

    #[test]
    fn test_changed_state() {
        let trigger = Trigger::make(&CHANGED_ON, "example_id").unwrap();
        let message_trigger = Trigger::new(&CHANGED_ON, example_message());

        assert!(trigger.equals(&message_trigger));
        assert!(trigger.is_triggered(&Description::parse(&example_message())));
        assert_eq!(
            trigger.to_string(),
            "Triggered entity example_id with state changed in on"
        );
    }

    #[test]
    fn test_changed_attribute() {
        let trigger = Trigger::make(&CHANGED_ATTRIBUTE, "example_id").unwrap();
        let message_trigger = Trigger::new(&CHANGED_ATTRIBUTE, example_message());

        assert!(trigger.equals(&message_trigger));
        assert!(trigger.is_triggered(&Description::parse(&example_message())));
        assert_ne!(trigger.identity_hash(), message_trigger.identity_hash());
        assert_eq!(
            trigger.to_string(),
            r#"Triggered entity example_id with at least one changed attribute in ["an_attribute"]"#
        );
    }

    #[test]
    fn test_events_gate_equality() {
        let forced = Trigger::make(&CHANGED_ON, "example_id")
            .unwrap()
            .with_default_events();
        let other = Trigger::make(&CHANGED_ON, "example_id")
            .unwrap()
            .with_events(["scheduled"]);
        let any = Trigger::make(&CHANGED_ON, "example_id").unwrap();

        assert!(!forced.equals(&other));
        assert!(forced.equals(&any));
        assert!(forced.events().contains("forced_on"));
    }

    #[test]
    fn test_comparison_requires_same_kind() {
        let trigger = Trigger::make(&ABOVE, "sensor.outdoor")
            .unwrap()
            .with_value(10.0)
            .unwrap();
        let message = state_changed("sensor.outdoor", json!({"state": "12"}), None);

        assert!(!trigger.is_triggered(&Description::parse(&message)));
        assert!(trigger.is_triggered(&Trigger::new(&ABOVE, message)));
    }

    #[test]
    fn test_builder_rejects_foreign_fields() {
        let trigger = Trigger::make(&CHANGED_ON, "light.a").unwrap();
        assert!(matches!(
            trigger.clone().with_value(1.0),
            Err(TriggerError::UnsupportedField { field: "value", .. })
        ));
        assert!(matches!(
            trigger.with_range(1.0),
            Err(TriggerError::UnsupportedField { field: "range", .. })
        ));
    }
}
