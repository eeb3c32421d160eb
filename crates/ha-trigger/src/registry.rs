//! Trigger registry and registered trigger sets
//!
//! The [`TriggerRegistry`] is the ordered list of known kinds. It classifies
//! inbound messages into candidate triggers and resolves kind names from
//! configuration. A [`TriggerSet`] holds the patterns one bridge registered.

use ha_core::Description;
use serde_json::Value;
use tracing::{debug, info, trace};

use crate::catalog;
use crate::descriptor::TriggerDescriptor;
use crate::error::{TriggerError, TriggerResult};
use crate::trigger::Trigger;

/// Ordered list of trigger kinds
///
/// Built once at start and passed by reference. Order is registration order
/// and is kept by every classification.
#[derive(Debug, Clone, Default)]
pub struct TriggerRegistry {
    descriptors: Vec<&'static TriggerDescriptor>,
}

impl TriggerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the light kinds
    pub fn light() -> Self {
        Self::from_catalog(&[catalog::light::ALL])
    }

    /// Registry holding the sensor comparison kinds
    pub fn sensor() -> Self {
        Self::from_catalog(&[catalog::sensor::ALL])
    }

    /// Registry holding every built-in kind: lights, sensors, then entity patterns
    pub fn standard() -> Self {
        Self::from_catalog(&[
            catalog::light::ALL,
            catalog::sensor::ALL,
            catalog::entity::ALL,
        ])
    }

    fn from_catalog(groups: &[&[&'static TriggerDescriptor]]) -> Self {
        Self {
            descriptors: groups.iter().flat_map(|g| g.iter().copied()).collect(),
        }
    }

    /// Append a kind
    pub fn register(&mut self, descriptor: &'static TriggerDescriptor) -> TriggerResult<()> {
        if self.descriptor(descriptor.name).is_some() {
            return Err(TriggerError::DuplicateKind(descriptor.name.to_string()));
        }
        debug!(kind = descriptor.name, strategy = %descriptor.strategy, "Registered trigger kind");
        self.descriptors.push(descriptor);
        Ok(())
    }

    /// Look up a kind by name
    pub fn descriptor(&self, name: &str) -> Option<&'static TriggerDescriptor> {
        self.descriptors.iter().copied().find(|d| d.name == name)
    }

    /// Look up a kind by name, failing for unknown names
    pub fn require(&self, name: &str) -> TriggerResult<&'static TriggerDescriptor> {
        self.descriptor(name)
            .ok_or_else(|| TriggerError::UnknownKind(name.to_string()))
    }

    /// Kinds in registration order
    pub fn descriptors(&self) -> &[&'static TriggerDescriptor] {
        &self.descriptors
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Classify a raw message into candidate triggers
    ///
    /// Every kind whose structural check passes contributes one trigger
    /// wrapping the message, in registration order. This does not decide
    /// firing.
    pub fn get_triggers_from(&self, message: &Value) -> Vec<Trigger> {
        let candidates: Vec<Trigger> = self
            .descriptors
            .iter()
            .copied()
            .filter(|d| d.claims(message))
            .map(|d| Trigger::new(d, message.clone()))
            .collect();

        trace!(
            kinds = ?candidates.iter().map(|t| t.descriptor().name).collect::<Vec<_>>(),
            "Classified inbound message"
        );
        candidates
    }
}

/// Registered triggers of one bridge, in registration order
#[derive(Debug, Clone, Default)]
pub struct TriggerSet {
    triggers: Vec<Trigger>,
}

impl TriggerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a trigger
    ///
    /// Returns false, leaving the set unchanged, when an equal trigger with
    /// the same identity hash is already registered.
    pub fn insert(&mut self, trigger: Trigger) -> bool {
        let hash = trigger.identity_hash();
        let duplicate = self
            .triggers
            .iter()
            .any(|t| t.identity_hash() == hash && t.equals(&trigger));
        if duplicate {
            debug!(trigger = %trigger, "Skipping duplicate trigger");
            return false;
        }
        self.triggers.push(trigger);
        true
    }

    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Trigger> {
        self.triggers.iter()
    }

    /// Registered triggers that fire for an inbound message, in registration order
    ///
    /// Comparison triggers are tested against the registry's candidates so that
    /// they only fire for a message their own kind claimed. The rest are tested
    /// against the parsed message.
    pub fn evaluate(&self, registry: &TriggerRegistry, message: &Value) -> Vec<&Trigger> {
        let description = Description::parse(message);
        if description.is_empty() {
            trace!("Ignoring message without state_changed data");
            return Vec::new();
        }

        let candidates = registry.get_triggers_from(message);
        let fired: Vec<&Trigger> = self
            .triggers
            .iter()
            .filter(|trigger| {
                if trigger.strategy().is_comparison() {
                    candidates.iter().any(|c| trigger.is_triggered(c))
                } else {
                    trigger.is_triggered(&description)
                }
            })
            .collect();

        for trigger in &fired {
            info!(trigger = %trigger, "Trigger fired");
        }
        fired
    }
}

impl<'a> IntoIterator for &'a TriggerSet {
    type Item = &'a Trigger;
    type IntoIter = std::slice::Iter<'a, Trigger>;

    fn into_iter(self) -> Self::IntoIter {
        self.triggers.iter()
    }
}
