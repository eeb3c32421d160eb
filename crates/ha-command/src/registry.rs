//! Command registry and per-appliance command sets

use ha_core::{ApplianceState, SentMessage};
use tracing::{debug, info};

use crate::catalog;
use crate::command::Command;
use crate::descriptor::CommandDescriptor;
use crate::error::{CommandError, CommandResult};

/// Ordered list of command kinds, resolved by name from configuration
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    descriptors: Vec<&'static CommandDescriptor>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in kind: lights, then media players
    pub fn standard() -> Self {
        Self {
            descriptors: catalog::light::ALL
                .iter()
                .chain(catalog::media_player::ALL.iter())
                .copied()
                .collect(),
        }
    }

    /// Append a kind
    pub fn register(&mut self, descriptor: &'static CommandDescriptor) -> CommandResult<()> {
        if self.descriptor(descriptor.name).is_some() {
            return Err(CommandError::DuplicateKind(descriptor.name.to_string()));
        }
        debug!(kind = descriptor.name, "Registered command kind");
        self.descriptors.push(descriptor);
        Ok(())
    }

    pub fn descriptor(&self, name: &str) -> Option<&'static CommandDescriptor> {
        self.descriptors.iter().copied().find(|d| d.name == name)
    }

    /// Look up a kind by name, failing for unknown names
    pub fn require(&self, name: &str) -> CommandResult<&'static CommandDescriptor> {
        self.descriptor(name)
            .ok_or_else(|| CommandError::UnknownKind(name.to_string()))
    }

    pub fn descriptors(&self) -> &[&'static CommandDescriptor] {
        &self.descriptors
    }
}

/// Commands registered for one appliance, in registration order
#[derive(Debug, Clone, Default)]
pub struct CommandSet {
    commands: Vec<Command>,
}

impl CommandSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter()
    }

    /// Run every command against a transition
    ///
    /// Each command decides on its own whether it applies. Sent records are
    /// returned in registration order.
    pub async fn make_msgs_from(
        &self,
        old_state: &ApplianceState,
        new_state: &ApplianceState,
    ) -> Vec<SentMessage> {
        let mut sent = Vec::new();
        for command in &self.commands {
            let records = command.make_msgs_from(old_state, new_state).await;
            if !records.is_empty() {
                info!(command = %command, count = records.len(), "Command sent");
            }
            sent.extend(records);
        }
        sent
    }
}

impl Extend<Command> for CommandSet {
    fn extend<I: IntoIterator<Item = Command>>(&mut self, iter: I) {
        self.commands.extend(iter);
    }
}
