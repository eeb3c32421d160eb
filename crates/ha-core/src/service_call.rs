//! Outbound service-call message and its delivery record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::events::CALL_SERVICE;

/// Represents a `call_service` message sent to the hub
///
/// ```text
/// {type: "call_service", domain, service, service_data: {entity_id, ...}, target: {entity_id}}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceCallMessage {
    /// Always `call_service`
    #[serde(rename = "type")]
    pub message_type: String,

    /// The domain the service belongs to (e.g., "light", "media_player")
    pub domain: String,

    /// The service name (e.g., "turn_on", "media_pause")
    pub service: String,

    /// Data passed to the service (e.g., entity_id, brightness, hs_color)
    #[serde(default)]
    pub service_data: Map<String, Value>,

    /// Entity targeted by the call
    #[serde(default)]
    pub target: Target,
}

/// Target section of a service call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Target {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
}

impl ServiceCallMessage {
    /// Create a new service call with empty service data
    pub fn new(domain: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            message_type: CALL_SERVICE.to_string(),
            domain: domain.into(),
            service: service.into(),
            service_data: Map::new(),
            target: Target::default(),
        }
    }

    /// Address the call to an entity, both in `service_data` and `target`
    pub fn for_entity(mut self, entity_id: impl Into<String>) -> Self {
        let entity_id = entity_id.into();
        self.service_data
            .insert("entity_id".to_string(), Value::String(entity_id.clone()));
        self.target.entity_id = Some(entity_id);
        self
    }

    /// Set one `service_data` field
    pub fn with_data(mut self, key: impl Into<String>, value: Value) -> Self {
        self.service_data.insert(key.into(), value);
        self
    }

    /// Get the full service identifier (domain.service)
    pub fn service_id(&self) -> String {
        format!("{}.{}", self.domain, self.service)
    }

    /// Get a value from service_data
    pub fn get<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.service_data
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// The targeted entity, falling back to `service_data.entity_id`
    pub fn entity_id(&self) -> Option<&str> {
        self.target
            .entity_id
            .as_deref()
            .or_else(|| self.service_data.get("entity_id").and_then(Value::as_str))
    }
}

/// Record of a message the transport confirmed as sent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentMessage {
    /// The message as it was sent
    pub message: ServiceCallMessage,

    /// When the transport sent it
    pub sent_at: DateTime<Utc>,
}

impl SentMessage {
    /// Record a message as sent now
    pub fn new(message: ServiceCallMessage) -> Self {
        Self {
            message,
            sent_at: Utc::now(),
        }
    }

    pub fn domain(&self) -> &str {
        &self.message.domain
    }

    pub fn service(&self) -> &str {
        &self.message.service
    }
}
