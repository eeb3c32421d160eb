//! Command Engine
//!
//! This crate turns appliance state transitions into outbound service calls.
//!
//! # Architecture
//!
//! ```text
//! (old, new) ApplianceState → Command::build → ServiceCallMessage → Transport → SentMessage
//! ```
//!
//! A [`Command`] is built once per (entity, kind) pair from an immutable
//! template. Every call to [`Command::make_msgs_from`] builds a fresh message,
//! so a command can be shared between concurrent callers.
//!
//! # Key Types
//!
//! - [`CommandDescriptor`] - A command kind: template, applicability, stamps
//! - [`Command`] - A kind bound to an entity and a transport
//! - [`CommandRegistry`] - Known kinds, resolved by name from configuration
//! - [`CommandSet`] - Commands of one appliance, fanned out in order

pub mod catalog;
mod command;
mod descriptor;
mod error;
mod registry;

pub use command::Command;
pub use descriptor::{Applicability, CommandDescriptor, MessageTemplate, Stamp};
pub use error::{CommandError, CommandResult};
pub use registry::{CommandRegistry, CommandSet};
