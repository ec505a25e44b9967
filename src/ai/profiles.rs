//! CPU profiles - configurable opponent personalities
//!
//! Each profile defines numeric values that affect CPU behavior.
//! Loaded from assets/cpu_profiles.txt and hot-reloaded by the config watcher.
//!
//! ```text
//! profile: Balanced
//! move_speed: 260
//! reaction_time: 0.25
//! return_skill: 0.85
//! aim_error: 40
//! serve_apex: 150
//! ```

use bevy::prelude::*;
use std::fs;

/// Path to CPU profiles file
pub const CPU_PROFILES_FILE: &str = "assets/cpu_profiles.txt";

/// CPU behavior parameters loaded from config file
#[derive(Debug, Clone, PartialEq)]
pub struct CpuProfile {
    /// Profile name for display and `--cpu`
    pub name: String,
    /// Horizontal walking speed (pixels/second)
    pub move_speed: f32,
    /// Delay before reacting to an incoming ball (seconds)
    pub reaction_time: f32,
    /// Chance (0-1) that a reachable ball is returned
    pub return_skill: f32,
    /// Random horizontal error added to return targets (+-pixels)
    pub aim_error: f32,
    /// Apex height above the net for serves and returns (pixels)
    pub serve_apex: f32,
}

impl Default for CpuProfile {
    fn default() -> Self {
        Self {
            name: "Balanced".to_string(),
            move_speed: 260.0,
            reaction_time: 0.25,
            return_skill: 0.85,
            aim_error: 40.0,
            serve_apex: 150.0,
        }
    }
}

/// Profiles used when the file is missing or empty
pub fn builtin_profiles() -> Vec<CpuProfile> {
    vec![
        CpuProfile {
            name: "Rookie".to_string(),
            move_speed: 180.0,
            reaction_time: 0.45,
            return_skill: 0.65,
            aim_error: 80.0,
            serve_apex: 120.0,
        },
        CpuProfile::default(),
        CpuProfile {
            name: "Ace".to_string(),
            move_speed: 360.0,
            reaction_time: 0.12,
            return_skill: 0.96,
            aim_error: 20.0,
            serve_apex: 170.0,
        },
    ]
}

/// Database of CPU profiles with the one currently in play
#[derive(Resource, Debug, Clone)]
pub struct CpuProfileDatabase {
    profiles: Vec<CpuProfile>,
    selected: usize,
}

impl Default for CpuProfileDatabase {
    fn default() -> Self {
        Self::load_from_file(CPU_PROFILES_FILE)
    }
}

impl CpuProfileDatabase {
    /// Database holding only the built-in profiles, "Balanced" selected
    pub fn builtin() -> Self {
        Self::from_profiles(builtin_profiles())
    }

    /// Build from a list of profiles, selecting "Balanced" if present.
    /// An empty list falls back to the built-ins.
    pub fn from_profiles(profiles: Vec<CpuProfile>) -> Self {
        if profiles.is_empty() {
            return Self::builtin();
        }
        let selected = profiles
            .iter()
            .position(|p| p.name.eq_ignore_ascii_case("Balanced"))
            .unwrap_or(0);
        Self { profiles, selected }
    }

    /// Load profiles from file, or the built-ins if the file doesn't exist
    pub fn load_from_file(path: &str) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                warn!("Could not read CPU profiles file: {}, using built-ins", e);
                return Self::builtin();
            }
        };

        let profiles = parse_profiles(&content);
        if profiles.is_empty() {
            warn!("No profiles parsed from {}, using built-ins", path);
            return Self::builtin();
        }

        info!("Loaded {} CPU profiles from {}", profiles.len(), path);
        Self::from_profiles(profiles)
    }

    /// Replace the profile list, keeping the selection by name where possible
    pub fn reload(&mut self, other: CpuProfileDatabase) {
        let name = self.current().name.clone();
        *self = other;
        self.select(&name);
    }

    /// Select a profile by name (case-insensitive). Returns false if not found.
    pub fn select(&mut self, name: &str) -> bool {
        match self.index_of(name) {
            Some(i) => {
                self.selected = i;
                true
            }
            None => false,
        }
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.profiles.iter().position(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Profile currently in play
    pub fn current(&self) -> &CpuProfile {
        self.get(self.selected)
    }

    /// Get profile by index, wrapping around if out of bounds
    pub fn get(&self, index: usize) -> &CpuProfile {
        &self.profiles[index % self.profiles.len()]
    }

    pub fn names(&self) -> Vec<&str> {
        self.profiles.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

/// Parse profiles from file content
pub fn parse_profiles(content: &str) -> Vec<CpuProfile> {
    let mut profiles = Vec::new();
    let mut current: Option<CpuProfile> = None;

    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(name) = line.strip_prefix("profile:") {
            if let Some(p) = current.take() {
                profiles.push(p);
            }
            current = Some(CpuProfile {
                name: name.trim().to_string(),
                ..default()
            });
            continue;
        }

        let Some(profile) = current.as_mut() else {
            continue;
        };

        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let Ok(v) = value.trim().parse::<f32>() else {
            warn!("cpu profiles line {}: bad value for {}", line_no + 1, key);
            continue;
        };

        match key {
            "move_speed" => profile.move_speed = v.max(0.0),
            "reaction_time" => profile.reaction_time = v.max(0.0),
            "return_skill" => profile.return_skill = v.clamp(0.0, 1.0),
            "aim_error" => profile.aim_error = v.abs(),
            "serve_apex" => profile.serve_apex = v.max(0.0),
            _ => warn!("cpu profiles line {}: unknown key {}", line_no + 1, key),
        }
    }

    if let Some(p) = current {
        profiles.push(p);
    }

    profiles
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "
# comment
profile: Wall
move_speed: 500
return_skill: 1.4
reaction_time: 0.05

profile: Sleepy
reaction_time: 1.5
aim_error: -60
";

    #[test]
    fn test_parse_profiles() {
        let profiles = parse_profiles(SAMPLE);
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].name, "Wall");
        assert_eq!(profiles[0].move_speed, 500.0);
        assert_eq!(profiles[0].return_skill, 1.0);
        // Unset keys keep the defaults
        assert_eq!(profiles[0].serve_apex, CpuProfile::default().serve_apex);
        assert_eq!(profiles[1].aim_error, 60.0);
    }

    #[test]
    fn test_lines_before_first_profile_are_ignored() {
        let profiles = parse_profiles("move_speed: 10\nprofile: A\n");
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].move_speed, CpuProfile::default().move_speed);
    }

    #[test]
    fn test_select_and_reload_keep_name() {
        let mut db = CpuProfileDatabase::builtin();
        assert_eq!(db.current().name, "Balanced");
        assert!(db.select("ace"));
        assert_eq!(db.current().name, "Ace");
        assert!(!db.select("nobody"));

        db.reload(CpuProfileDatabase::from_profiles(parse_profiles(
            "profile: Rookie\nprofile: Ace\nmove_speed: 999\n",
        )));
        assert_eq!(db.current().name, "Ace");
        assert_eq!(db.current().move_speed, 999.0);
    }

    #[test]
    fn test_empty_falls_back_to_builtin() {
        let db = CpuProfileDatabase::from_profiles(Vec::new());
        assert_eq!(db.names(), vec!["Rookie", "Balanced", "Ace"]);
    }
}
