//! Event Bus - central hub for rally events
//!
//! Gameplay systems emit events to the bus; the logger drains them once per
//! frame and writes them to the event log. Drained events are kept in a
//! bounded history so headless runs can inspect what happened.

use bevy::prelude::*;

use super::logger::EventLogger;
use super::types::GameEvent;

/// How many drained events the bus remembers
const PROCESSED_HISTORY: usize = 4096;

/// Timestamped event for the event bus
#[derive(Debug, Clone)]
pub struct BusEvent {
    /// Time in milliseconds since startup
    pub time_ms: u32,
    /// The event data
    pub event: GameEvent,
}

/// Central event bus for rally events
#[derive(Resource, Default)]
pub struct EventBus {
    /// Events emitted since the last flush
    pending: Vec<BusEvent>,
    /// Flushed events, oldest first, capped at `PROCESSED_HISTORY`
    processed: Vec<BusEvent>,
    /// Current elapsed time in milliseconds (for timestamping)
    elapsed_ms: u32,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the elapsed time (called each tick)
    pub fn update_time(&mut self, elapsed_secs: f32) {
        self.elapsed_ms = (elapsed_secs * 1000.0) as u32;
    }

    /// Emit an event to the bus
    pub fn emit(&mut self, event: GameEvent) {
        self.pending.push(BusEvent {
            time_ms: self.elapsed_ms,
            event,
        });
    }

    /// Events emitted since the last flush
    pub fn peek(&self) -> &[BusEvent] {
        &self.pending
    }

    /// Drain pending events, moving them to processed
    pub fn drain(&mut self) -> Vec<BusEvent> {
        let events = std::mem::take(&mut self.pending);
        self.processed.extend(events.iter().cloned());
        if self.processed.len() > PROCESSED_HISTORY {
            let excess = self.processed.len() - PROCESSED_HISTORY;
            self.processed.drain(..excess);
        }
        events
    }

    /// Drained events, oldest first
    pub fn processed(&self) -> &[BusEvent] {
        &self.processed
    }

    /// Every event seen so far, drained or not
    pub fn history(&self) -> impl Iterator<Item = &BusEvent> {
        self.processed.iter().chain(self.pending.iter())
    }

    /// Forget drained events (headless runs collect them per tick)
    pub fn clear_processed(&mut self) {
        self.processed.clear();
    }

    /// Get current elapsed time in milliseconds
    pub fn elapsed_ms(&self) -> u32 {
        self.elapsed_ms
    }
}

/// System to update the event bus time each frame
pub fn update_event_bus_time(mut bus: ResMut<EventBus>, time: Res<Time>) {
    bus.update_time(time.elapsed_secs());
}

/// Drain the bus and append the events to the log file (if one is open)
pub fn flush_event_log(mut bus: ResMut<EventBus>, logger: Option<ResMut<EventLogger>>) {
    let events = bus.drain();
    let Some(mut logger) = logger else {
        return;
    };
    if !logger.is_active() || events.is_empty() {
        return;
    }
    for e in events {
        logger.log_at(e.time_ms, &e.event);
    }
    logger.flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_and_drain() {
        let mut bus = EventBus::new();
        bus.update_time(1.5);

        bus.emit(GameEvent::Receive { pos: (240.0, -135.0) });

        assert_eq!(bus.peek().len(), 1);

        let events = bus.drain();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].time_ms, 1500);
        assert!(bus.peek().is_empty());
        assert_eq!(bus.processed().len(), 1);

        bus.clear_processed();
        assert!(bus.processed().is_empty());
    }

    #[test]
    fn test_history_is_bounded() {
        let mut bus = EventBus::new();
        for _ in 0..PROCESSED_HISTORY + 10 {
            bus.emit(GameEvent::Pause);
        }
        bus.drain();
        bus.emit(GameEvent::Resume);
        assert_eq!(bus.processed().len(), PROCESSED_HISTORY);
        assert_eq!(bus.history().count(), PROCESSED_HISTORY + 1);
        assert_eq!(bus.history().last().map(|e| &e.event), Some(&GameEvent::Resume));
    }
}
