//! Debug logging configuration shared across binaries.
//!
//! Turns the `.evlog` game-event log on or off. Enabled by `--debug-log` or
//! `config/debug_logging.json`.

use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::events::EventLogConfig;

pub const DEBUG_LOG_SETTINGS_FILE: &str = "config/debug_logging.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Resource)]
#[serde(default)]
pub struct DebugLogConfig {
    pub enabled: bool,
    /// Directory for `.evlog` files
    pub log_dir: String,
    /// Ball tick sample interval in ms (0 = no ticks)
    pub tick_sample_ms: u32,
}

impl Default for DebugLogConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_dir: "logs".to_string(),
            tick_sample_ms: 100,
        }
    }
}

impl DebugLogConfig {
    pub fn load() -> Self {
        Self::load_from(Path::new(DEBUG_LOG_SETTINGS_FILE))
    }

    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    pub fn enabled_from_args(args: &[String]) -> bool {
        args.iter().any(|arg| arg == "--debug-log")
    }

    pub fn load_with_args(args: &[String]) -> Self {
        let mut config = Self::load();
        if Self::enabled_from_args(args) {
            config.enabled = true;
        }
        config
    }

    /// Logger settings for the event log
    pub fn event_log_config(&self) -> EventLogConfig {
        EventLogConfig {
            log_dir: PathBuf::from(&self.log_dir),
            enabled: self.enabled,
            tick_sample_ms: self.tick_sample_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_enables_logging() {
        let args = vec!["volleyball".to_string(), "--debug-log".to_string()];
        assert!(DebugLogConfig::enabled_from_args(&args));
        assert!(!DebugLogConfig::enabled_from_args(&["volleyball".to_string()]));
    }

    #[test]
    fn test_missing_file_is_disabled() {
        let config = DebugLogConfig::load_from(Path::new("config/nope_debug_logging.json"));
        assert!(!config.enabled);
        assert_eq!(config.tick_sample_ms, 100);
    }

    #[test]
    fn test_event_log_config_carries_fields() {
        let config = DebugLogConfig {
            enabled: true,
            log_dir: "tmp_logs".to_string(),
            tick_sample_ms: 0,
        };
        let log = config.event_log_config();
        assert!(log.enabled);
        assert_eq!(log.log_dir, PathBuf::from("tmp_logs"));
        assert_eq!(log.tick_sample_ms, 0);
    }
}
