//! Matching predicates
//!
//! Equality between two trigger views is an ordered list of small predicates
//! per strategy, all of which must hold. Firing tests build on the same
//! predicates. Every predicate answers `false` when a field it needs is absent.

use ha_core::{Description, StateValue};
use serde_json::Value;
use std::collections::BTreeSet;

use crate::descriptor::Strategy;

/// One side of a comparison: a parsed view plus its originating events
pub(crate) struct Side<'a> {
    pub view: &'a Description,
    pub events: &'a BTreeSet<String>,
}

/// A single equality predicate
pub(crate) type Rule = fn(&Side<'_>, &Side<'_>) -> bool;

const EQUALS_RULES: &[Rule] = &[
    same_entity,
    events_overlap,
    same_state,
    attribute_values_match,
];

const CHANGED_STATE_RULES: &[Rule] = &[same_entity, events_overlap, same_state];

const CHANGED_ATTRIBUTE_RULES: &[Rule] = &[same_entity, events_overlap, attribute_keys_subset];

const COMPARISON_RULES: &[Rule] = &[same_entity, events_overlap, same_state];

/// Equality rules of a strategy, in evaluation order
pub(crate) fn equality_rules(strategy: Strategy) -> &'static [Rule] {
    match strategy {
        Strategy::Equals => EQUALS_RULES,
        Strategy::ChangedState => CHANGED_STATE_RULES,
        Strategy::ChangedAttribute => CHANGED_ATTRIBUTE_RULES,
        Strategy::GreaterThan | Strategy::LesserThan | Strategy::InBetween => COMPARISON_RULES,
    }
}

/// Both sides name the same entity
pub(crate) fn same_entity(ours: &Side<'_>, theirs: &Side<'_>) -> bool {
    matches!(
        (ours.view.entity_id(), theirs.view.entity_id()),
        (Some(a), Some(b)) if a == b
    )
}

/// Event sets intersect, or at least one side accepts any event
pub(crate) fn events_overlap(ours: &Side<'_>, theirs: &Side<'_>) -> bool {
    ours.events.is_empty() || theirs.events.is_empty() || !ours.events.is_disjoint(theirs.events)
}

/// Both sides carry the same state
pub(crate) fn same_state(ours: &Side<'_>, theirs: &Side<'_>) -> bool {
    matches!(
        (ours.view.state(), theirs.view.state()),
        (Some(a), Some(b)) if a == b
    )
}

/// The values of our attributes, as a set, equal the set of their values
/// for the same keys. Values are compared as unordered sets, not per key.
pub(crate) fn attribute_values_match(ours: &Side<'_>, theirs: &Side<'_>) -> bool {
    let our_attributes = ours.view.attributes();
    let our_values: Vec<&Value> = our_attributes.values().collect();
    let their_values: Vec<&Value> = theirs
        .view
        .attributes()
        .iter()
        .filter(|(key, _)| our_attributes.contains_key(*key))
        .map(|(_, value)| value)
        .collect();

    same_value_set(&our_values, &their_values)
}

/// Our attribute keys are a subset of theirs
pub(crate) fn attribute_keys_subset(ours: &Side<'_>, theirs: &Side<'_>) -> bool {
    let their_attributes = theirs.view.attributes();
    ours.view
        .attributes()
        .keys()
        .all(|key| their_attributes.contains_key(key))
}

/// The incoming message reports a state different from its previous one
pub(crate) fn state_changed(incoming: &Description) -> bool {
    match incoming.state() {
        Some(new) => incoming.old_state() != Some(new),
        None => false,
    }
}

/// At least one of `keys` has a previous value that differs from its new value
pub(crate) fn attribute_changed<'a>(
    keys: impl IntoIterator<Item = &'a String>,
    incoming: &Description,
) -> bool {
    keys.into_iter().any(|key| {
        match (
            incoming.attributes().get(key),
            incoming.old_attributes().get(key),
        ) {
            (Some(new), Some(old)) => !same_value(new, old),
            _ => false,
        }
    })
}

/// Compare the pattern threshold against an incoming state numerically
pub(crate) fn compare(
    threshold: Option<&StateValue>,
    incoming: Option<&StateValue>,
    test: impl Fn(f64, f64) -> bool,
) -> bool {
    match (
        threshold.and_then(StateValue::as_number),
        incoming.and_then(StateValue::as_number),
    ) {
        (Some(t), Some(v)) => test(t, v),
        _ => false,
    }
}

fn same_value_set(a: &[&Value], b: &[&Value]) -> bool {
    fn contains(set: &[&Value], value: &Value) -> bool {
        set.iter().any(|v| same_value(v, value))
    }
    a.iter().all(|v| contains(b, v)) && b.iter().all(|v| contains(a, v))
}

/// JSON equality with numbers compared by value, so `180` equals `180.0`
pub(crate) fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(x, y)| same_value(x, y))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(key, x)| y.get(key).is_some_and(|y| same_value(x, y)))
        }
        _ => a == b,
    }
}
