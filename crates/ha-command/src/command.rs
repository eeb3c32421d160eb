//! Commands bound to an entity
//!
//! The template is fixed at construction. [`Command::build`] is pure and
//! produces a new message per transition, which [`Command::make_msgs_from`]
//! hands to the transport.

use ha_core::{ApplianceState, SentMessage, ServiceCallMessage};
use ha_service_registry::Transport;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::descriptor::CommandDescriptor;

/// A command kind bound to an entity and a transport
#[derive(Clone)]
pub struct Command {
    descriptor: &'static CommandDescriptor,
    template: ServiceCallMessage,
    transport: Arc<dyn Transport>,
}

impl Command {
    /// Build a command for `entity_id` from a fresh copy of the kind's template
    pub fn make(
        descriptor: &'static CommandDescriptor,
        entity_id: &str,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let template = (descriptor.template)().for_entity(entity_id);
        Self {
            descriptor,
            template,
            transport,
        }
    }

    /// Fix a `service_data` parameter at construction, e.g. a media source
    pub fn with_service_data(mut self, key: impl Into<String>, value: Value) -> Self {
        self.template = self.template.with_data(key, value);
        self
    }

    pub fn descriptor(&self) -> &'static CommandDescriptor {
        self.descriptor
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.template.entity_id()
    }

    /// The message every build starts from
    pub fn template(&self) -> &ServiceCallMessage {
        &self.template
    }

    /// Whether this command emits a message for the transition
    pub fn is_applicable(&self, old_state: &ApplianceState, new_state: &ApplianceState) -> bool {
        self.descriptor.applicability.holds(old_state, new_state)
    }

    /// Build the outbound message for a transition, if one is needed
    ///
    /// Returns `None` when the kind does not apply or when the new state
    /// lacks an attribute one of its stamps needs.
    pub fn build(
        &self,
        old_state: &ApplianceState,
        new_state: &ApplianceState,
    ) -> Option<ServiceCallMessage> {
        if !self.is_applicable(old_state, new_state) {
            trace!(kind = self.descriptor.name, "Command does not apply");
            return None;
        }

        let mut message = self.template.clone();
        for stamp in self.descriptor.stamps {
            let Some(value) = stamp.value(new_state) else {
                debug!(
                    kind = self.descriptor.name,
                    field = stamp.field(),
                    "New state lacks a value for a stamped field"
                );
                return None;
            };
            message.service_data.insert(stamp.field().to_string(), value);
        }
        Some(message)
    }

    /// Send whatever the transition requires and report what was sent
    ///
    /// Returns zero or one records. Transport failures also yield none.
    pub async fn make_msgs_from(
        &self,
        old_state: &ApplianceState,
        new_state: &ApplianceState,
    ) -> Vec<SentMessage> {
        match self.build(old_state, new_state) {
            Some(message) => self.transport.execute(message).await,
            None => Vec::new(),
        }
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("kind", &self.descriptor.name)
            .field("template", &self.template)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} on {}",
            self.template.service_id(),
            self.entity_id().unwrap_or("<none>")
        )
    }
}
