//! Hub Bridge
//!
//! Wires the trigger engine and the command engine to one configuration:
//!
//! ```text
//! hub message ──▶ TriggerSet ──▶ fired triggers ──▶ appliance state
//! appliance transition ──▶ CommandSet (per appliance) ──▶ Transport ──▶ sent calls
//! ```
//!
//! The `ha-bridge` binary feeds it JSON lines from stdin.

mod bridge;
mod error;
mod input;

pub use bridge::{Bridge, Fired, Outcome};
pub use error::{BridgeError, BridgeResult};
pub use input::{Input, Transition, TRANSITION};
