//! Global gameplay tuning settings
//!
//! `config/gameplay_tuning.json` overrides physics and rally window values.
//! Missing fields fall back to the compiled-in constants.

use bevy::log::warn;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::constants::*;

/// Path to global gameplay tuning config
pub const GAMEPLAY_TUNING_FILE: &str = "config/gameplay_tuning.json";

/// Serializable tuning values stored in config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplayTuning {
    pub ball_gravity: f32,
    pub floor_bounce: f32,
    pub floor_friction: f32,
    pub net_bounce: f32,
    pub tape_bounce: f32,
    pub spin_factor: f32,
    pub receive_tolerance: f32,
    pub receive_reach: f32,
    pub receive_lift: f32,
    pub set_reach: f32,
    pub toss_lift: f32,
    pub spike_tolerance: f32,
    pub spike_reach: f32,
    pub spike_speed: f32,
    pub serve_apex_above_net: f32,
    pub cpu_reach: f32,
}

impl Default for GameplayTuning {
    fn default() -> Self {
        Self {
            ball_gravity: BALL_GRAVITY,
            floor_bounce: BALL_FLOOR_BOUNCE,
            floor_friction: BALL_FLOOR_FRICTION,
            net_bounce: BALL_NET_BOUNCE,
            tape_bounce: BALL_TAPE_BOUNCE,
            spin_factor: BALL_SPIN_FACTOR,
            receive_tolerance: RECEIVE_ZONE_TOLERANCE,
            receive_reach: RECEIVE_REACH,
            receive_lift: RECEIVE_LIFT,
            set_reach: SET_REACH,
            toss_lift: TOSS_LIFT,
            spike_tolerance: SPIKE_ZONE_TOLERANCE,
            spike_reach: SPIKE_REACH,
            spike_speed: SPIKE_SPEED,
            serve_apex_above_net: SERVE_APEX_ABOVE_NET,
            cpu_reach: CPU_REACH,
        }
    }
}

impl GameplayTuning {
    pub fn apply_to(&self, tweaks: &mut PhysicsTweaks) {
        *tweaks = PhysicsTweaks {
            ball_gravity: self.ball_gravity,
            floor_bounce: self.floor_bounce,
            floor_friction: self.floor_friction,
            net_bounce: self.net_bounce,
            tape_bounce: self.tape_bounce,
            spin_factor: self.spin_factor,
            receive_tolerance: self.receive_tolerance,
            receive_reach: self.receive_reach,
            receive_lift: self.receive_lift,
            set_reach: self.set_reach,
            toss_lift: self.toss_lift,
            spike_tolerance: self.spike_tolerance,
            spike_reach: self.spike_reach,
            spike_speed: self.spike_speed,
            serve_apex_above_net: self.serve_apex_above_net,
            cpu_reach: self.cpu_reach,
        };
    }

    /// Values that would break the simulation (non-positive gravity, bounces above 1)
    pub fn validate(&self) -> Result<(), String> {
        if self.ball_gravity <= 0.0 {
            return Err(format!("ball_gravity must be positive, got {}", self.ball_gravity));
        }
        for (name, v) in [
            ("floor_bounce", self.floor_bounce),
            ("floor_friction", self.floor_friction),
            ("net_bounce", self.net_bounce),
            ("tape_bounce", self.tape_bounce),
        ] {
            if !(0.0..=1.0).contains(&v) {
                return Err(format!("{} must be within 0..=1, got {}", name, v));
            }
        }
        if self.spike_speed <= 0.0 {
            return Err(format!("spike_speed must be positive, got {}", self.spike_speed));
        }
        Ok(())
    }
}

/// Runtime physics and rally values, read by the gameplay systems
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct PhysicsTweaks {
    pub ball_gravity: f32,
    pub floor_bounce: f32,
    pub floor_friction: f32,
    pub net_bounce: f32,
    pub tape_bounce: f32,
    pub spin_factor: f32,
    pub receive_tolerance: f32,
    pub receive_reach: f32,
    pub receive_lift: f32,
    pub set_reach: f32,
    pub toss_lift: f32,
    pub spike_tolerance: f32,
    pub spike_reach: f32,
    pub spike_speed: f32,
    pub serve_apex_above_net: f32,
    pub cpu_reach: f32,
}

impl Default for PhysicsTweaks {
    fn default() -> Self {
        let mut tweaks = Self {
            ball_gravity: 0.0,
            floor_bounce: 0.0,
            floor_friction: 0.0,
            net_bounce: 0.0,
            tape_bounce: 0.0,
            spin_factor: 0.0,
            receive_tolerance: 0.0,
            receive_reach: 0.0,
            receive_lift: 0.0,
            set_reach: 0.0,
            toss_lift: 0.0,
            spike_tolerance: 0.0,
            spike_reach: 0.0,
            spike_speed: 0.0,
            serve_apex_above_net: 0.0,
            cpu_reach: 0.0,
        };
        GameplayTuning::default().apply_to(&mut tweaks);
        tweaks
    }
}

pub fn load_gameplay_tuning_from_file(path: &str) -> Result<GameplayTuning, String> {
    let contents =
        std::fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path, e))?;
    let tuning: GameplayTuning =
        serde_json::from_str(&contents).map_err(|e| format!("Failed to parse {}: {}", path, e))?;
    tuning
        .validate()
        .map_err(|e| format!("Invalid tuning in {}: {}", path, e))?;
    Ok(tuning)
}

/// Apply the global tuning file, falling back to defaults if it is missing or broken
pub fn apply_global_tuning(tweaks: &mut PhysicsTweaks) -> Result<(), String> {
    match load_gameplay_tuning_from_file(GAMEPLAY_TUNING_FILE) {
        Ok(tuning) => {
            tuning.apply_to(tweaks);
            Ok(())
        }
        Err(err) => {
            GameplayTuning::default().apply_to(tweaks);
            Err(err)
        }
    }
}

pub fn load_global_tuning_system(mut tweaks: ResMut<PhysicsTweaks>) {
    if let Err(err) = apply_global_tuning(&mut tweaks) {
        // A missing file is the normal case
        if std::path::Path::new(GAMEPLAY_TUNING_FILE).exists() {
            warn!("{}", err);
        }
    }
}
