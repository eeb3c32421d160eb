//! The bridge between hub messages and appliance transitions
//!
//! Hub messages run through the registered triggers; every trigger that fires
//! maps the message onto its appliance's state. Appliance transitions run
//! through the commands registered for that appliance and come back as the
//! service calls the transport sent.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use ha_command::{Command, CommandRegistry, CommandSet};
use ha_config::{BridgeConfig, CommandConfig, TriggerConfig};
use ha_core::{ApplianceState, Description, SentMessage};
use ha_service_registry::Transport;
use ha_trigger::{Trigger, TriggerRegistry, TriggerSet};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::error::{BridgeError, BridgeResult};
use crate::input::{Input, Transition};

/// A trigger that fired and the appliance change it caused
#[derive(Debug, Clone, PartialEq)]
pub struct Fired {
    /// Display string of the trigger
    pub trigger: String,
    pub entity_id: String,
    /// Appliance events the trigger originates from
    pub events: Vec<String>,
    pub old: ApplianceState,
    pub new: ApplianceState,
}

/// What handling one input line produced
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Fired(Vec<Fired>),
    Sent(Vec<SentMessage>),
    Ignored,
}

pub struct Bridge {
    registry: TriggerRegistry,
    triggers: TriggerSet,
    commands: HashMap<String, CommandSet>,
    appliances: HashMap<String, ApplianceState>,
}

impl Bridge {
    /// Register everything a configuration declares, using the standard catalogs
    pub fn from_config(config: &BridgeConfig, transport: Arc<dyn Transport>) -> BridgeResult<Self> {
        Self::with_registries(
            config,
            TriggerRegistry::standard(),
            &CommandRegistry::standard(),
            transport,
        )
    }

    pub fn with_registries(
        config: &BridgeConfig,
        registry: TriggerRegistry,
        command_registry: &CommandRegistry,
        transport: Arc<dyn Transport>,
    ) -> BridgeResult<Self> {
        let mut triggers = TriggerSet::new();
        for trigger_config in &config.triggers {
            let trigger = make_trigger(&registry, trigger_config)?;
            if !triggers.insert(trigger) {
                warn!(
                    kind = %trigger_config.kind,
                    entity_id = %trigger_config.entity_id,
                    "Duplicate trigger ignored"
                );
            }
        }

        let mut commands: HashMap<String, CommandSet> = HashMap::new();
        for command_config in &config.commands {
            let command = make_command(command_registry, command_config, transport.clone())?;
            commands
                .entry(command_config.entity_id.clone())
                .or_default()
                .push(command);
        }

        let appliances = config
            .appliances
            .iter()
            .map(|(entity_id, state)| (entity_id.clone(), state.clone()))
            .collect();

        info!(
            triggers = triggers.len(),
            commands = config.commands.len(),
            "Bridge ready"
        );

        Ok(Self {
            registry,
            triggers,
            commands,
            appliances,
        })
    }

    pub fn triggers(&self) -> &TriggerSet {
        &self.triggers
    }

    /// Commands registered for one appliance
    pub fn commands_for(&self, entity_id: &str) -> Option<&CommandSet> {
        self.commands.get(entity_id)
    }

    /// Every distinct `(domain, service)` the registered commands call
    pub fn services(&self) -> BTreeSet<(String, String)> {
        self.commands
            .values()
            .flat_map(CommandSet::iter)
            .map(|command| {
                let template = command.template();
                (template.domain.clone(), template.service.clone())
            })
            .collect()
    }

    /// Last known state of an appliance; unknown appliances are off
    pub fn appliance(&self, entity_id: &str) -> ApplianceState {
        self.appliances.get(entity_id).cloned().unwrap_or_default()
    }

    /// Parse and handle one input line
    pub async fn handle_line(&mut self, line: &str) -> BridgeResult<Outcome> {
        match Input::parse(line)? {
            Input::Hub(message) => Ok(Outcome::Fired(self.handle_hub_message(&message))),
            Input::Transition(transition) => {
                Ok(Outcome::Sent(self.handle_transition(transition).await))
            }
            Input::Other(message_type) => {
                debug!(message_type = %message_type, "Ignoring message");
                Ok(Outcome::Ignored)
            }
        }
    }

    /// Run a hub message through the triggers and update the appliances they fire for
    ///
    /// Triggers firing for the same appliance apply in registration order, each
    /// on top of the previous one's result.
    pub fn handle_hub_message(&mut self, message: &Value) -> Vec<Fired> {
        let fired = self.triggers.evaluate(&self.registry, message);
        if fired.is_empty() {
            return Vec::new();
        }

        let description = Description::parse(message);
        let mut results = Vec::with_capacity(fired.len());
        for trigger in fired {
            let Some(entity_id) = trigger.entity_id() else {
                continue;
            };
            let old = self.appliances.get(entity_id).cloned().unwrap_or_default();
            let new = trigger.make_new_state_from(&description, &old);
            debug!(entity_id = %entity_id, old = ?old, new = ?new, "Appliance updated");

            self.appliances.insert(entity_id.to_string(), new.clone());
            results.push(Fired {
                trigger: trigger.to_string(),
                entity_id: entity_id.to_string(),
                events: trigger.events().iter().cloned().collect(),
                old,
                new,
            });
        }
        results
    }

    /// Run an appliance transition through that appliance's commands
    ///
    /// A transition without `old` starts from the last known state. The new
    /// state is remembered either way.
    pub async fn handle_transition(&mut self, transition: Transition) -> Vec<SentMessage> {
        let Transition {
            entity_id,
            old,
            new,
        } = transition;
        let old = old.unwrap_or_else(|| self.appliance(&entity_id));

        let sent = match self.commands.get(&entity_id) {
            Some(commands) => commands.make_msgs_from(&old, &new).await,
            None => {
                debug!(entity_id = %entity_id, "No commands registered for appliance");
                Vec::new()
            }
        };

        self.appliances.insert(entity_id, new);
        sent
    }
}

fn make_trigger(registry: &TriggerRegistry, config: &TriggerConfig) -> BridgeResult<Trigger> {
    let descriptor = registry.require(&config.kind)?;
    let mut trigger = Trigger::make(descriptor, &config.entity_id)?;

    trigger = match &config.events {
        Some(events) => trigger.with_events(events.iter().cloned()),
        None => trigger.with_default_events(),
    };
    if let Some(state) = &config.state {
        trigger = trigger.with_state(state.clone())?;
    }
    if let Some(attributes) = &config.attributes {
        trigger = trigger.with_attributes(attributes.clone())?;
    }
    if let Some(value) = config.value {
        trigger = trigger.with_value(value)?;
    }
    if let Some(range) = config.range {
        trigger = trigger.with_range(range)?;
    }

    debug!(trigger = %trigger, "Registered trigger");
    Ok(trigger)
}

fn make_command(
    registry: &CommandRegistry,
    config: &CommandConfig,
    transport: Arc<dyn Transport>,
) -> BridgeResult<Command> {
    let descriptor = registry.require(&config.kind)?;
    let mut command = Command::make(descriptor, &config.entity_id, transport);

    let parameters = [
        ("source", config.source.as_ref().map(|s| json!(s))),
        ("volume_level", config.volume_level.map(|v| json!(v))),
        ("shuffle", config.shuffle.map(|s| json!(s))),
    ];
    for (parameter, value) in parameters {
        let Some(value) = value else {
            continue;
        };
        // Only fields the kind's template already carries can be overridden
        if !command.template().service_data.contains_key(parameter) {
            return Err(BridgeError::UnsupportedParameter {
                kind: config.kind.clone(),
                parameter,
            });
        }
        command = command.with_service_data(parameter, value);
    }

    debug!(command = %command, "Registered command");
    Ok(command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ha_core::ServiceCallMessage;

    struct Discard;

    #[async_trait]
    impl Transport for Discard {
        async fn execute(&self, _message: ServiceCallMessage) -> Vec<SentMessage> {
            Vec::new()
        }
    }

    fn trigger_config(kind: &str, entity_id: &str) -> TriggerConfig {
        TriggerConfig {
            kind: kind.to_string(),
            entity_id: entity_id.to_string(),
            events: None,
            value: None,
            range: None,
            state: None,
            attributes: None,
        }
    }

    fn command_config(kind: &str, entity_id: &str) -> CommandConfig {
        CommandConfig {
            kind: kind.to_string(),
            entity_id: entity_id.to_string(),
            source: None,
            volume_level: None,
            shuffle: None,
        }
    }

    #[test]
    fn test_default_events_applied() {
        let trigger =
            make_trigger(&TriggerRegistry::standard(), &trigger_config("light.on", "light.a"))
                .unwrap();
        assert!(trigger.events().contains("forced_on"));

        let mut config = trigger_config("light.on", "light.a");
        config.events = Some(vec!["manual".to_string()]);
        let trigger = make_trigger(&TriggerRegistry::standard(), &config).unwrap();
        assert_eq!(trigger.events().len(), 1);
        assert!(trigger.events().contains("manual"));
    }

    #[test]
    fn test_command_parameters() {
        let registry = CommandRegistry::standard();

        let mut config = command_config("media_player.select_source", "media_player.a");
        config.source = Some("Radio".to_string());
        let command = make_command(&registry, &config, Arc::new(Discard)).unwrap();
        assert_eq!(command.template().service_data["source"], json!("Radio"));

        let mut config = command_config("light.turn_on", "light.a");
        config.source = Some("Radio".to_string());
        assert!(matches!(
            make_command(&registry, &config, Arc::new(Discard)),
            Err(BridgeError::UnsupportedParameter { parameter: "source", .. })
        ));
    }

    #[test]
    fn test_services_are_distinct() {
        let config = BridgeConfig {
            commands: vec![
                command_config("light.turn_on", "light.a"),
                command_config("light.brightness", "light.a"),
                command_config("light.turn_on", "light.b"),
            ],
            ..Default::default()
        };
        let bridge = Bridge::from_config(&config, Arc::new(Discard)).unwrap();

        let services: Vec<_> = bridge.services().into_iter().collect();
        assert_eq!(
            services,
            vec![("light".to_string(), "turn_on".to_string())]
        );
        assert_eq!(bridge.commands_for("light.a").map(CommandSet::len), Some(2));
    }
}
