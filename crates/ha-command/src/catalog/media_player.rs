//! Media player command kinds

use ha_core::ServiceCallMessage;
use ha_service_registry::Transport;
use serde_json::json;
use std::sync::Arc;

use crate::command::Command;
use crate::descriptor::{Applicability, CommandDescriptor};

pub const DOMAIN: &str = "media_player";

/// Volume sent when none is configured
pub const DEFAULT_VOLUME_LEVEL: f64 = 0.1;

/// Source sent when none is configured
pub const DEFAULT_SOURCE: &str = "none";

pub static PLAY: CommandDescriptor = CommandDescriptor {
    name: "media_player.play",
    template: play,
    applicability: Applicability::TurnedOn,
    stamps: &[],
};

pub static PAUSE: CommandDescriptor = CommandDescriptor {
    name: "media_player.pause",
    template: pause,
    applicability: Applicability::TurnedOff,
    stamps: &[],
};

pub static VOLUME_SET: CommandDescriptor = CommandDescriptor {
    name: "media_player.volume_set",
    template: volume_set_template,
    applicability: Applicability::Always,
    stamps: &[],
};

pub static SHUFFLE_SET: CommandDescriptor = CommandDescriptor {
    name: "media_player.shuffle_set",
    template: shuffle_set,
    applicability: Applicability::Always,
    stamps: &[],
};

pub static SELECT_SOURCE: CommandDescriptor = CommandDescriptor {
    name: "media_player.select_source",
    template: select_source_template,
    applicability: Applicability::Always,
    stamps: &[],
};

/// All media player kinds in registry order
pub static ALL: &[&CommandDescriptor] = &[&PLAY, &PAUSE, &VOLUME_SET, &SHUFFLE_SET, &SELECT_SOURCE];

/// Select `source` (a name in the player's queue) on every transition
pub fn select_source(entity_id: &str, source: &str, transport: Arc<dyn Transport>) -> Command {
    Command::make(&SELECT_SOURCE, entity_id, transport).with_service_data("source", json!(source))
}

/// Set the volume, a float in `[0, 1]`, on every transition
pub fn volume_set(entity_id: &str, volume_level: f64, transport: Arc<dyn Transport>) -> Command {
    Command::make(&VOLUME_SET, entity_id, transport)
        .with_service_data("volume_level", json!(volume_level))
}

fn play() -> ServiceCallMessage {
    ServiceCallMessage::new(DOMAIN, "media_play")
}

fn pause() -> ServiceCallMessage {
    ServiceCallMessage::new(DOMAIN, "media_pause")
}

fn volume_set_template() -> ServiceCallMessage {
    ServiceCallMessage::new(DOMAIN, "volume_set")
        .with_data("volume_level", json!(DEFAULT_VOLUME_LEVEL))
}

fn shuffle_set() -> ServiceCallMessage {
    ServiceCallMessage::new(DOMAIN, "shuffle_set").with_data("shuffle", json!(true))
}

fn select_source_template() -> ServiceCallMessage {
    ServiceCallMessage::new(DOMAIN, "select_source").with_data("source", json!(DEFAULT_SOURCE))
}
