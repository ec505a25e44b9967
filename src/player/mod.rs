//! Player module - avatar components, team spawning and drag control

mod components;
mod drag;

pub use components::*;
pub use drag::*;
