//! Persistent settings for game initialization
//!
//! Saves and loads match preferences (win score, CPU profile, practice length,
//! debug overlay) to/from an init_settings.json file in the config directory.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::constants::{DEFAULT_WIN_SCORE, PRACTICE_SERVES};
use crate::scoring::MatchRules;

/// Path to the settings file
pub const SETTINGS_FILE: &str = "config/init_settings.json";

/// Persistent settings that survive between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitSettings {
    /// Points needed to win a match (0 = endless)
    pub win_score: u32,
    /// Winner must lead by two
    pub win_by_two: bool,
    /// CPU profile name
    pub cpu_profile: String,
    /// Attempts per serve practice session
    pub practice_serves: u32,
    /// Show the F3 debug overlay at startup
    pub show_debug: bool,
}

impl Default for InitSettings {
    fn default() -> Self {
        Self {
            win_score: DEFAULT_WIN_SCORE,
            win_by_two: true,
            cpu_profile: "Balanced".to_string(),
            practice_serves: PRACTICE_SERVES,
            show_debug: false,
        }
    }
}

impl InitSettings {
    /// Load settings from file. A missing file is created with defaults.
    pub fn load() -> Self {
        let path = Path::new(SETTINGS_FILE);
        if !path.exists() {
            info!("No init_settings.json found, writing defaults");
            let settings = Self::default();
            if let Err(e) = settings.save() {
                warn!("Failed to write default settings: {}", e);
            }
            return settings;
        }
        Self::load_from(path)
    }

    /// Load from a specific path, falling back to defaults on any error
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(settings) => {
                    info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    warn!("Failed to parse {}: {}, using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read {}: {}, using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save settings to file
    pub fn save(&self) -> Result<(), std::io::Error> {
        self.save_to(Path::new(SETTINGS_FILE))
    }

    pub fn save_to(&self, path: &Path) -> Result<(), std::io::Error> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, json)?;
        info!("Saved settings to {}", path.display());
        Ok(())
    }

    /// Match rules described by these settings
    pub fn match_rules(&self) -> MatchRules {
        MatchRules {
            win_score: self.win_score,
            win_by_two: self.win_by_two,
        }
    }
}

/// Resource tracking the current init settings (for change detection)
#[derive(Resource)]
pub struct CurrentSettings {
    pub settings: InitSettings,
    pub dirty: bool,
}

impl Default for CurrentSettings {
    fn default() -> Self {
        Self {
            settings: InitSettings::load(),
            dirty: false,
        }
    }
}

impl CurrentSettings {
    pub fn new(settings: InitSettings) -> Self {
        Self {
            settings,
            dirty: false,
        }
    }

    /// Mark settings as changed (will be saved on next update)
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Save if dirty
    pub fn save_if_dirty(&mut self) {
        if self.dirty {
            if let Err(e) = self.settings.save() {
                warn!("Failed to save settings: {}", e);
            }
            self.dirty = false;
        }
    }
}

/// System to save settings when changed
pub fn save_settings_system(mut settings: ResMut<CurrentSettings>) {
    settings.save_if_dirty();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: InitSettings =
            serde_json::from_str(r#"{ "win_score": 5, "cpu_profile": "Ace" }"#).unwrap();
        assert_eq!(settings.win_score, 5);
        assert_eq!(settings.cpu_profile, "Ace");
        assert!(settings.win_by_two);
        assert_eq!(settings.practice_serves, PRACTICE_SERVES);
    }

    #[test]
    fn test_save_and_load_from_path() {
        let dir = std::env::temp_dir().join(format!("volleyball_settings_{}", std::process::id()));
        let path = dir.join("init_settings.json");
        let settings = InitSettings {
            win_score: 7,
            win_by_two: false,
            show_debug: true,
            ..Default::default()
        };
        settings.save_to(&path).unwrap();
        assert_eq!(InitSettings::load_from(&path), settings);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_broken_file_uses_defaults() {
        let dir = std::env::temp_dir().join(format!("volleyball_broken_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("init_settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(InitSettings::load_from(&path), InitSettings::default());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_match_rules_from_settings() {
        let settings = InitSettings {
            win_score: 3,
            win_by_two: false,
            ..Default::default()
        };
        let rules = settings.match_rules();
        assert_eq!(rules.win_score, 3);
        assert!(!rules.win_by_two);
    }
}
