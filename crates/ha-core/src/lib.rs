//! Core types for the hub bridge
//!
//! This crate provides the fundamental types shared by the trigger and command
//! engines: the parsed [`Description`] of an inbound hub message, the
//! [`StateValue`] carried in it, the appliance-side [`ApplianceState`], and the
//! outbound [`ServiceCallMessage`] with its [`SentMessage`] delivery record.

mod appliance;
mod description;
pub mod message;
mod service_call;
mod state_value;

pub use appliance::{ApplianceState, Attribute};
pub use description::{Attributes, Description};
pub use service_call::{SentMessage, ServiceCallMessage, Target};
pub use state_value::{json_number, StateValue};

/// Message and event type identifiers used on the hub protocol
pub mod events {
    /// Top-level `type` of an inbound event message
    pub const EVENT: &str = "event";

    /// Event type for state changes
    pub const STATE_CHANGED: &str = "state_changed";

    /// Top-level `type` of an outbound service call
    pub const CALL_SERVICE: &str = "call_service";
}
