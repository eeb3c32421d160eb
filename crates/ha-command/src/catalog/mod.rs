//! Built-in command kinds
//!
//! - [`light`] - power, brightness, color temperature and hue/saturation
//! - [`media_player`] - play/pause, volume, shuffle and source selection

pub mod light;
pub mod media_player;
