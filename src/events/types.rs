//! Event type definitions for the logging system

use serde::{Deserialize, Serialize};

use crate::court::Side;
use crate::scoring::MatchRules;
use crate::tuning::PhysicsTweaks;

/// Match configuration snapshot, logged once per session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub ball_gravity: f32,
    pub floor_bounce: f32,
    pub floor_friction: f32,
    pub receive_reach: f32,
    pub set_reach: f32,
    pub spike_reach: f32,
    pub spike_speed: f32,
    pub win_score: u32,
    pub win_by_two: bool,
    pub cpu_profile: String,
}

impl GameConfig {
    pub fn new(tweaks: &PhysicsTweaks, rules: &MatchRules, cpu_profile: &str) -> Self {
        Self {
            ball_gravity: tweaks.ball_gravity,
            floor_bounce: tweaks.floor_bounce,
            floor_friction: tweaks.floor_friction,
            receive_reach: tweaks.receive_reach,
            set_reach: tweaks.set_reach,
            spike_reach: tweaks.spike_reach,
            spike_speed: tweaks.spike_speed,
            win_score: rules.win_score,
            win_by_two: rules.win_by_two,
            cpu_profile: cpu_profile.to_string(),
        }
    }
}

/// All game events that can be logged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    // === Session Events ===
    /// Session started (generated once per launch)
    SessionStart {
        session_id: String, // UUID v4
        timestamp: String,
    },
    /// Configuration snapshot (logged after session start)
    Config(GameConfig),

    // === Match Events ===
    MatchStart {
        cpu_profile: String,
        win_score: u32,
        seed: u64,
    },
    MatchEnd {
        score_player: u32,
        score_cpu: u32,
        duration: f32,
    },

    // === Rally Events ===
    /// Ball launched from a serve
    Serve {
        side: Side,
        pos: (f32, f32),
        vel: (f32, f32),
    },
    /// Player receive succeeded
    Receive { pos: (f32, f32) },
    /// Player tapped for a receive outside the window
    ReceiveMiss { pos: (f32, f32) },
    /// Setter tossed the ball to the attacker
    Set { pos: (f32, f32) },
    /// Player spike succeeded
    Spike {
        pos: (f32, f32),
        vel: (f32, f32),
    },
    /// Player tapped for a spike outside the window
    SpikeMiss { pos: (f32, f32) },
    /// CPU returned the ball
    CpuReturn {
        pos: (f32, f32),
        vel: (f32, f32),
    },
    /// CPU reached the ball but failed the return
    CpuMiss { pos: (f32, f32) },

    // === Ball Events ===
    /// Ball touched the net (tape = bounced off the top)
    NetHit { pos: (f32, f32), tape: bool },
    /// Live ball touched the floor
    Land { pos: (f32, f32) },
    /// Live ball left the court sideways
    Out { pos: (f32, f32) },

    // === Scoring Events ===
    Point {
        winner: Side,
        reason: String,
        score_player: u32,
        score_cpu: u32,
    },

    // === Control Events ===
    Pause,
    Resume,
    Restart,
    /// Player avatar released after a drag
    Drag { role: String, x: f32 },

    // === Practice Events ===
    PracticeServe {
        attempt: u32,
        power: f32,
        landing_x: f32,
        zone: String,
        points: u32,
    },

    // === Debug/Tick Events ===
    /// Sampled ball state
    Tick {
        frame: u64,
        ball_pos: (f32, f32),
        ball_vel: (f32, f32),
        ball_state: char, // H=Held, L=Live, D=Dead
        phase: String,
    },
}

impl GameEvent {
    /// Get the event type code for compact serialization
    pub fn type_code(&self) -> &'static str {
        match self {
            GameEvent::SessionStart { .. } => "SE",
            GameEvent::Config(_) => "CF",
            GameEvent::MatchStart { .. } => "MS",
            GameEvent::MatchEnd { .. } => "ME",
            GameEvent::Serve { .. } => "SV",
            GameEvent::Receive { .. } => "RC",
            GameEvent::ReceiveMiss { .. } => "RM",
            GameEvent::Set { .. } => "ST",
            GameEvent::Spike { .. } => "SP",
            GameEvent::SpikeMiss { .. } => "SM",
            GameEvent::CpuReturn { .. } => "CR",
            GameEvent::CpuMiss { .. } => "CM",
            GameEvent::NetHit { .. } => "NH",
            GameEvent::Land { .. } => "LD",
            GameEvent::Out { .. } => "OB",
            GameEvent::Point { .. } => "PT",
            GameEvent::Pause => "PA",
            GameEvent::Resume => "RS",
            GameEvent::Restart => "RT",
            GameEvent::Drag { .. } => "DG",
            GameEvent::PracticeServe { .. } => "PS",
            GameEvent::Tick { .. } => "T",
        }
    }

    /// Variant name, as used by scenario expectations
    pub fn name(&self) -> &'static str {
        match self {
            GameEvent::SessionStart { .. } => "SessionStart",
            GameEvent::Config(_) => "Config",
            GameEvent::MatchStart { .. } => "MatchStart",
            GameEvent::MatchEnd { .. } => "MatchEnd",
            GameEvent::Serve { .. } => "Serve",
            GameEvent::Receive { .. } => "Receive",
            GameEvent::ReceiveMiss { .. } => "ReceiveMiss",
            GameEvent::Set { .. } => "Set",
            GameEvent::Spike { .. } => "Spike",
            GameEvent::SpikeMiss { .. } => "SpikeMiss",
            GameEvent::CpuReturn { .. } => "CpuReturn",
            GameEvent::CpuMiss { .. } => "CpuMiss",
            GameEvent::NetHit { .. } => "NetHit",
            GameEvent::Land { .. } => "Land",
            GameEvent::Out { .. } => "Out",
            GameEvent::Point { .. } => "Point",
            GameEvent::Pause => "Pause",
            GameEvent::Resume => "Resume",
            GameEvent::Restart => "Restart",
            GameEvent::Drag { .. } => "Drag",
            GameEvent::PracticeServe { .. } => "PracticeServe",
            GameEvent::Tick { .. } => "Tick",
        }
    }

    /// Side the event belongs to, where it names one
    pub fn side(&self) -> Option<Side> {
        match self {
            GameEvent::Serve { side, .. } => Some(*side),
            GameEvent::Point { winner, .. } => Some(*winner),
            GameEvent::Receive { .. }
            | GameEvent::ReceiveMiss { .. }
            | GameEvent::Set { .. }
            | GameEvent::Spike { .. }
            | GameEvent::SpikeMiss { .. }
            | GameEvent::Drag { .. } => Some(Side::Player),
            GameEvent::CpuReturn { .. } | GameEvent::CpuMiss { .. } => Some(Side::Cpu),
            _ => None,
        }
    }
}
