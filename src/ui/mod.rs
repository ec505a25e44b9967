//! UI module - score HUD, rally messages and the debug overlay

mod debug;
mod hud;
mod message;

pub use debug::*;
pub use hud::*;
pub use message::*;
