//! Trigger Engine
//!
//! This crate decides whether registered trigger patterns fire for inbound
//! hub messages.
//!
//! # Architecture
//!
//! ```text
//! hub message → Description → registered Triggers → fired triggers → appliance events
//!             ↘ TriggerRegistry (structural checks) → candidate Triggers ↗
//! ```
//!
//! - **Descriptors**: static kinds (template, structural check, strategy)
//! - **Triggers**: registered patterns built from a descriptor plus an entity id
//! - **Registry**: ordered list of descriptors used to classify inbound messages
//! - **TriggerSet**: registration-ordered, deduplicated triggers of one bridge
//!
//! # Key Types
//!
//! - [`Trigger`] - Registered pattern
//! - [`TriggerDescriptor`] - A trigger kind
//! - [`TriggerRegistry`] - Ordered kinds used by the factory
//! - [`TriggerSet`] - Registered triggers evaluated in order

pub mod catalog;
mod descriptor;
mod error;
mod matcher;
mod registry;
mod trigger;

pub use descriptor::{StateMapper, Strategy, StructuralCheck, TemplateFn, TriggerDescriptor};
pub use error::{TriggerError, TriggerResult};
pub use registry::{TriggerRegistry, TriggerSet};
pub use trigger::{Incoming, Trigger};
