//! Game event logging
//!
//! Provides a compact text format for logging rally events (serves, contacts,
//! points) and sampled ball ticks. Used by the windowed game when debug logging
//! is on, by the headless simulator, and by the scenario runner, which asserts
//! on the event sequence.

mod bus;
mod format;
mod logger;
mod types;

pub use bus::{BusEvent, EventBus, flush_event_log, update_event_bus_time};
pub use format::{parse_event, serialize_event};
pub use logger::{EventBuffer, EventLogConfig, EventLogger};
pub use types::{GameConfig, GameEvent};
