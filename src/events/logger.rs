//! Event logger for rally debug logs
//!
//! Writes `.evlog` files for the windowed game and keeps in-memory buffers for
//! headless runs.

use bevy::prelude::*;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use uuid::Uuid;

use super::format::serialize_event;
use super::types::{GameConfig, GameEvent};

/// Configuration for event logging
#[derive(Resource, Clone)]
pub struct EventLogConfig {
    /// Directory for log files
    pub log_dir: PathBuf,
    /// Whether logging is enabled
    pub enabled: bool,
    /// Sample rate for tick events (every N ms, 0 = disabled)
    pub tick_sample_ms: u32,
}

impl Default for EventLogConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("logs"),
            enabled: true,
            tick_sample_ms: 100,
        }
    }
}

/// Active event logger with file handle
#[derive(Resource)]
pub struct EventLogger {
    writer: Option<BufWriter<File>>,
    session_id: String,
    last_tick_ms: Option<u32>,
    config: EventLogConfig,
}

impl EventLogger {
    /// Create a new event logger (but don't open file yet)
    pub fn new(config: EventLogConfig) -> Self {
        Self {
            writer: None,
            session_id: String::new(),
            last_tick_ms: None,
            config,
        }
    }

    /// Start a new log session.
    /// Generates a new UUID for this session and logs a SessionStart event.
    pub fn start_session(&mut self, timestamp: &str) {
        if !self.config.enabled {
            return;
        }

        self.session_id = Uuid::new_v4().to_string();

        if let Err(e) = std::fs::create_dir_all(&self.config.log_dir) {
            warn!("Failed to create log directory: {}", e);
            return;
        }

        let filename = format!("{}_{}.evlog", timestamp, &self.session_id[..8]);
        let path = self.config.log_dir.join(filename);

        match OpenOptions::new().create(true).write(true).truncate(true).open(&path) {
            Ok(file) => {
                self.writer = Some(BufWriter::new(file));
                self.last_tick_ms = None;
                info!("Event logging started: {} (session: {})", path.display(), &self.session_id[..8]);

                let event = GameEvent::SessionStart {
                    session_id: self.session_id.clone(),
                    timestamp: timestamp.to_string(),
                };
                self.log_at(0, &event);
            }
            Err(e) => {
                warn!("Failed to open event log: {}", e);
            }
        }
    }

    /// Log the match configuration (call after start_session)
    pub fn log_config(&mut self, config: GameConfig) {
        self.log_at(0, &GameEvent::Config(config));
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// End the current log session
    pub fn end_session(&mut self) {
        if let Some(mut writer) = self.writer.take()
            && let Err(e) = writer.flush()
        {
            warn!("Failed to flush event log: {}", e);
        }
    }

    /// Write one event line
    pub fn log_at(&mut self, time_ms: u32, event: &GameEvent) {
        let Some(writer) = &mut self.writer else {
            return;
        };
        let line = serialize_event(time_ms, event);
        if let Err(e) = writeln!(writer, "{}", line) {
            warn!("Failed to write event: {}", e);
        }
    }

    /// Push buffered lines to disk
    pub fn flush(&mut self) {
        if let Some(writer) = &mut self.writer
            && let Err(e) = writer.flush()
        {
            warn!("Failed to flush event log: {}", e);
        }
    }

    /// Check if a tick event should be logged (based on sample rate)
    pub fn should_log_tick(&mut self, time_ms: u32) -> bool {
        if self.config.tick_sample_ms == 0 || self.writer.is_none() {
            return false;
        }
        match self.last_tick_ms {
            Some(last) if time_ms.saturating_sub(last) < self.config.tick_sample_ms => false,
            _ => {
                self.last_tick_ms = Some(time_ms);
                true
            }
        }
    }

    /// Check if logging is active
    pub fn is_active(&self) -> bool {
        self.writer.is_some()
    }
}

impl Default for EventLogger {
    fn default() -> Self {
        Self::new(EventLogConfig::default())
    }
}

impl Drop for EventLogger {
    fn drop(&mut self) {
        self.end_session();
    }
}

/// Simple in-memory event buffer for simulation (no file I/O)
#[derive(Default)]
pub struct EventBuffer {
    events: Vec<(u32, GameEvent)>,
    session_id: String,
}

impl EventBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new session with a fresh UUID
    pub fn start_session(&mut self, timestamp: &str) {
        self.events.clear();
        self.session_id = Uuid::new_v4().to_string();
        self.log(0, GameEvent::SessionStart {
            session_id: self.session_id.clone(),
            timestamp: timestamp.to_string(),
        });
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn log(&mut self, time_ms: u32, event: GameEvent) {
        self.events.push((time_ms, event));
    }

    /// Import events from an external source (like EventBus)
    pub fn import_events(&mut self, events: impl IntoIterator<Item = (u32, GameEvent)>) {
        self.events.extend(events);
    }

    /// Serialize all events to a log string
    pub fn serialize(&self) -> String {
        self.events
            .iter()
            .map(|(ts, e)| serialize_event(*ts, e))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::parse_event;

    #[test]
    fn test_buffer_session_and_serialize() {
        let mut buffer = EventBuffer::new();
        buffer.start_session("20260101_120000");
        assert_eq!(buffer.session_id().len(), 36);
        buffer.import_events(vec![(1200, GameEvent::Pause), (1500, GameEvent::Resume)]);

        let text = buffer.serialize();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("T:00000|SE|"));
        assert_eq!(parse_event(lines[2]), Some((1500, GameEvent::Resume)));
    }

    #[test]
    fn test_tick_sampling_needs_open_file() {
        let mut logger = EventLogger::default();
        assert!(!logger.should_log_tick(0));
        assert!(!logger.is_active());
    }
}
