//! Command synthesis tests for light and media player kinds

use async_trait::async_trait;
use ha_command::catalog::{light, media_player};
use ha_command::{Command, CommandSet};
use ha_core::{ApplianceState, SentMessage, ServiceCallMessage};
use ha_service_registry::{ServiceError, ServiceRegistry, Transport};
use serde_json::json;
use std::sync::{Arc, Mutex};

/// Accepts every call and remembers it
#[derive(Default)]
struct RecordingTransport {
    sent: Mutex<Vec<ServiceCallMessage>>,
}

impl RecordingTransport {
    fn sent(&self) -> Vec<ServiceCallMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn execute(&self, message: ServiceCallMessage) -> Vec<SentMessage> {
        self.sent.lock().unwrap().push(message.clone());
        vec![SentMessage::new(message)]
    }
}

fn transport() -> Arc<RecordingTransport> {
    Arc::new(RecordingTransport::default())
}

// ============================================================================
// Edge-triggered power
// ============================================================================

#[tokio::test]
async fn test_turn_on() {
    let cmd = Command::make(&light::TURN_ON, "a light", transport());
    let off = ApplianceState::off();
    let on = ApplianceState::on();

    let msgs = cmd.make_msgs_from(&off, &on).await;
    assert_eq!(msgs.len(), 1);
    assert_eq!(msgs[0].service(), "turn_on");

    assert!(cmd.make_msgs_from(&on, &off).await.is_empty());
    assert!(cmd.make_msgs_from(&on, &on).await.is_empty());
}

#[tokio::test]
async fn test_turn_off() {
    let cmd = Command::make(&light::TURN_OFF, "a light", transport());
    let off = ApplianceState::off();
    let on = ApplianceState::on();

    assert!(cmd.make_msgs_from(&off, &on).await.is_empty());
    let msgs = cmd.make_msgs_from(&on, &off).await;
    assert_eq!(msgs.len(), 1);
    assert_eq!(msgs[0].service(), "turn_off");
}

#[tokio::test]
async fn test_outbound_envelope() {
    let cmd = Command::make(&light::TURN_ON, "light.bed_light", transport());
    let msgs = cmd
        .make_msgs_from(&ApplianceState::off(), &ApplianceState::on())
        .await;

    assert_eq!(
        serde_json::to_value(&msgs[0].message).unwrap(),
        json!({
            "type": "call_service",
            "domain": "light",
            "service": "turn_on",
            "service_data": {"entity_id": "light.bed_light"},
            "target": {"entity_id": "light.bed_light"}
        })
    );
}

// ============================================================================
// Stamped light attributes
// ============================================================================

#[tokio::test]
async fn test_brightness() {
    let cmd = Command::make(&light::BRIGHTNESS, "a light", transport());
    let off = ApplianceState::off();
    let on = ApplianceState::on();
    let bright = ApplianceState::on().with_brightness(51.0);

    let msgs = cmd.make_msgs_from(&off, &bright).await;
    assert_eq!(msgs.len(), 1);
    assert_eq!(msgs[0].service(), "turn_on");
    assert_eq!(msgs[0].message.service_data["brightness"], json!(130));

    assert!(cmd.make_msgs_from(&on, &off).await.is_empty());
}

#[tokio::test]
async fn test_temperature() {
    let cmd = Command::make(&light::TEMPERATURE, "a light", transport());
    let warm = ApplianceState::on().with_temperature(3200.0);

    let msgs = cmd.make_msgs_from(&ApplianceState::off(), &warm).await;
    assert_eq!(msgs.len(), 1);
    assert_eq!(msgs[0].service(), "turn_on");
    assert_eq!(msgs[0].message.service_data["color_temp"], json!(3));

    assert!(cmd
        .make_msgs_from(&ApplianceState::on(), &ApplianceState::off())
        .await
        .is_empty());
}

#[tokio::test]
async fn test_hue_saturation() {
    let cmd = Command::make(&light::HUE_SATURATION, "a light", transport());
    let colored = ApplianceState::on().with_hue(320.0).with_saturation(80.0);

    let msgs = cmd.make_msgs_from(&ApplianceState::off(), &colored).await;
    assert_eq!(msgs.len(), 1);
    assert_eq!(msgs[0].message.service_data["hs_color"], json!([320, 80]));
}

#[tokio::test]
async fn test_missing_attribute_sends_nothing() {
    let transport = transport();
    let cmd = Command::make(&light::BRIGHTNESS, "a light", transport.clone());

    assert!(cmd
        .make_msgs_from(&ApplianceState::off(), &ApplianceState::on())
        .await
        .is_empty());
    assert!(transport.sent().is_empty());
}

// The off_* kinds call turn_off but apply whenever the new state is on, not
// on the off transition. This mirrors the hub integration's behavior.

#[tokio::test]
async fn test_off_brightness_fires_while_on() {
    let cmd = Command::make(&light::OFF_BRIGHTNESS, "a light", transport());
    let bright_on = ApplianceState::on().with_brightness(51.0);
    let bright_off = ApplianceState::off().with_brightness(51.0);

    let msgs = cmd.make_msgs_from(&ApplianceState::off(), &bright_on).await;
    assert_eq!(msgs.len(), 1);
    assert_eq!(msgs[0].service(), "turn_off");
    assert_eq!(msgs[0].message.service_data["brightness"], json!(130));

    assert!(cmd.make_msgs_from(&bright_on, &bright_off).await.is_empty());
}

#[tokio::test]
async fn test_off_temperature_fires_while_on() {
    let cmd = Command::make(&light::OFF_TEMPERATURE, "a light", transport());
    let warm_on = ApplianceState::on().with_temperature(3200.0);

    let msgs = cmd.make_msgs_from(&ApplianceState::on(), &warm_on).await;
    assert_eq!(msgs.len(), 1);
    assert_eq!(msgs[0].service(), "turn_off");
    assert_eq!(
        msgs[0].message.service_data["color_mode"],
        json!("ColorMode.COLOR_TEMP")
    );
    assert_eq!(msgs[0].message.service_data["color_temp"], json!(3));

    assert!(cmd
        .make_msgs_from(&ApplianceState::on(), &ApplianceState::off())
        .await
        .is_empty());
}

#[tokio::test]
async fn test_off_hue_saturation_fires_while_on() {
    let cmd = Command::make(&light::OFF_HUE_SATURATION, "a light", transport());
    let colored = ApplianceState::on().with_hue(320.0).with_saturation(80.0);

    let msgs = cmd.make_msgs_from(&ApplianceState::on(), &colored).await;
    assert_eq!(msgs.len(), 1);
    assert_eq!(msgs[0].service(), "turn_off");
    assert_eq!(msgs[0].message.service_data["color_mode"], json!("ColorMode.HS"));
    assert_eq!(msgs[0].message.service_data["hs_color"], json!([320, 80]));
}

#[test]
fn test_builds_do_not_leak_between_calls() {
    let cmd = Command::make(&light::BRIGHTNESS, "a light", transport());

    let first = cmd
        .build(&ApplianceState::off(), &ApplianceState::on().with_brightness(100.0))
        .unwrap();
    let second = cmd
        .build(&ApplianceState::off(), &ApplianceState::on().with_brightness(51.0))
        .unwrap();

    assert_eq!(first.service_data["brightness"], json!(255));
    assert_eq!(second.service_data["brightness"], json!(130));
    assert_eq!(cmd.template().service_data["brightness"], json!(127));
}

// ============================================================================
// Media player
// ============================================================================

#[tokio::test]
async fn test_play_pause() {
    let play = Command::make(&media_player::PLAY, "media_player.living_room", transport());
    let pause = Command::make(&media_player::PAUSE, "media_player.living_room", transport());
    let stopped = ApplianceState::off();
    let playing = ApplianceState::on();

    let msgs = play.make_msgs_from(&stopped, &playing).await;
    assert_eq!(msgs[0].service(), "media_play");
    assert!(play.make_msgs_from(&playing, &stopped).await.is_empty());

    let msgs = pause.make_msgs_from(&playing, &stopped).await;
    assert_eq!(msgs[0].service(), "media_pause");
    assert!(pause.make_msgs_from(&stopped, &playing).await.is_empty());
}

#[tokio::test]
async fn test_unconditional_media_commands() {
    let same = ApplianceState::off();
    let volume = Command::make(&media_player::VOLUME_SET, "media_player.living_room", transport());
    let shuffle = Command::make(&media_player::SHUFFLE_SET, "media_player.living_room", transport());
    let loud = media_player::volume_set("media_player.living_room", 0.6, transport());

    let msgs = volume.make_msgs_from(&same, &same).await;
    assert_eq!(msgs[0].message.service_data["volume_level"], json!(0.1));

    let msgs = shuffle.make_msgs_from(&same, &same).await;
    assert_eq!(msgs[0].message.service_data["shuffle"], json!(true));

    let msgs = loud.make_msgs_from(&same, &same).await;
    assert_eq!(msgs[0].message.service_data["volume_level"], json!(0.6));
}

#[tokio::test]
async fn test_select_source() {
    let cmd = media_player::select_source("media_player.living_room", "Radio", transport());

    let msgs = cmd
        .make_msgs_from(&ApplianceState::on(), &ApplianceState::on())
        .await;
    assert_eq!(msgs.len(), 1);
    assert_eq!(msgs[0].service(), "select_source");
    assert_eq!(msgs[0].message.service_data["source"], json!("Radio"));
    assert_eq!(
        msgs[0].message.service_data["entity_id"],
        json!("media_player.living_room")
    );
}

// ============================================================================
// Command sets and transports
// ============================================================================

#[tokio::test]
async fn test_set_fans_out_in_order() {
    let transport = transport();
    let mut set = CommandSet::new();
    set.push(Command::make(&light::TURN_ON, "light.bed_light", transport.clone()));
    set.push(Command::make(&light::TURN_OFF, "light.bed_light", transport.clone()));
    set.push(Command::make(&light::BRIGHTNESS, "light.bed_light", transport.clone()));
    set.push(Command::make(&light::HUE_SATURATION, "light.bed_light", transport.clone()));

    let old = ApplianceState::off();
    let new = ApplianceState::on().with_brightness(40.0);
    let sent = set.make_msgs_from(&old, &new).await;

    let services: Vec<&str> = sent.iter().map(|s| s.service()).collect();
    assert_eq!(services, vec!["turn_on", "turn_on"]);
    assert_eq!(transport.sent()[1].service_data["brightness"], json!(102));
}

#[tokio::test]
async fn test_service_registry_transport() {
    let registry = Arc::new(ServiceRegistry::new());
    registry.register("light", "turn_on", |_: ServiceCallMessage| async { Ok(()) });
    registry.register("light", "turn_off", |_: ServiceCallMessage| async {
        Err(ServiceError::CallFailed("hub disconnected".to_string()))
    });

    let on = Command::make(&light::TURN_ON, "light.bed_light", registry.clone());
    let off = Command::make(&light::TURN_OFF, "light.bed_light", registry.clone());
    let play = Command::make(&media_player::PLAY, "media_player.kitchen", registry);

    let sent = on
        .make_msgs_from(&ApplianceState::off(), &ApplianceState::on())
        .await;
    assert_eq!(sent.len(), 1);
    assert!(off
        .make_msgs_from(&ApplianceState::on(), &ApplianceState::off())
        .await
        .is_empty());
    assert!(play
        .make_msgs_from(&ApplianceState::off(), &ApplianceState::on())
        .await
        .is_empty());
}
