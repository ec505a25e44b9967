//! Config file auto-reload system
//!
//! Polls the gameplay tuning and CPU profile files every 10 seconds and
//! reloads them when modified.

use bevy::prelude::*;
use std::fs;
use std::time::SystemTime;

use crate::ai::{CPU_PROFILES_FILE, CpuProfileDatabase};
use crate::tuning::{GAMEPLAY_TUNING_FILE, PhysicsTweaks, load_gameplay_tuning_from_file};

/// How often to check for config changes (seconds)
const CHECK_INTERVAL: f32 = 10.0;

/// Tracks modification times of config files for hot-reload
#[derive(Resource)]
pub struct ConfigWatcher {
    /// Time since last check
    pub timer: f32,
    /// Last known modification times
    pub tuning_mtime: Option<SystemTime>,
    pub cpu_profiles_mtime: Option<SystemTime>,
}

impl Default for ConfigWatcher {
    fn default() -> Self {
        Self {
            timer: 0.0,
            tuning_mtime: get_mtime(GAMEPLAY_TUNING_FILE),
            cpu_profiles_mtime: get_mtime(CPU_PROFILES_FILE),
        }
    }
}

impl ConfigWatcher {
    /// Advance the poll timer. True once per interval.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.timer += dt;
        if self.timer < CHECK_INTERVAL {
            return false;
        }
        self.timer = 0.0;
        true
    }
}

/// Get file modification time, or None if file doesn't exist
fn get_mtime(path: &str) -> Option<SystemTime> {
    fs::metadata(path).ok().and_then(|m| m.modified().ok())
}

/// Check for config file changes and reload as needed.
/// Runs every 10 seconds.
pub fn check_config_changes(
    time: Res<Time>,
    mut watcher: ResMut<ConfigWatcher>,
    mut tweaks: ResMut<PhysicsTweaks>,
    mut profile_db: ResMut<CpuProfileDatabase>,
) {
    if !watcher.tick(time.delta_secs()) {
        return;
    }

    let new_tuning_mtime = get_mtime(GAMEPLAY_TUNING_FILE);
    if new_tuning_mtime != watcher.tuning_mtime {
        watcher.tuning_mtime = new_tuning_mtime;
        match load_gameplay_tuning_from_file(GAMEPLAY_TUNING_FILE) {
            Ok(tuning) => {
                tuning.apply_to(&mut tweaks);
                info!("Auto-reloaded gameplay tuning from {}", GAMEPLAY_TUNING_FILE);
            }
            // Keep the current values rather than snapping back to defaults mid-match
            Err(e) => warn!("{}", e),
        }
    }

    let new_profiles_mtime = get_mtime(CPU_PROFILES_FILE);
    if new_profiles_mtime != watcher.cpu_profiles_mtime {
        watcher.cpu_profiles_mtime = new_profiles_mtime;
        profile_db.reload(CpuProfileDatabase::load_from_file(CPU_PROFILES_FILE));
        info!(
            "Auto-reloaded CPU profiles from {} (current: {})",
            CPU_PROFILES_FILE,
            profile_db.current().name
        );
    }
}
