//! Serve practice state: zones, charge and per-serve results

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::*;
use crate::court::Court;

/// Landing depths past the net (fractions of the CPU half) where zones begin
const SHORT_ZONE_START: f32 = 0.25;
const MID_ZONE_START: f32 = 0.5;
const DEEP_ZONE_START: f32 = 0.75;

/// Where a practice serve landed on the CPU half
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PracticeZone {
    /// Strip right behind the net
    TooShort,
    Short,
    Mid,
    Deep,
    /// Past the end line (or back on the serving side)
    Out,
}

impl PracticeZone {
    pub const SCORING: [PracticeZone; 3] = [PracticeZone::Short, PracticeZone::Mid, PracticeZone::Deep];

    pub fn points(self) -> u32 {
        match self {
            PracticeZone::Short => 1,
            PracticeZone::Mid => 2,
            PracticeZone::Deep => 3,
            PracticeZone::TooShort | PracticeZone::Out => 0,
        }
    }

    /// Banner text for a landing in this zone
    pub fn label(self) -> &'static str {
        match self {
            PracticeZone::TooShort => "Short!",
            PracticeZone::Short => "Short",
            PracticeZone::Mid => "Mid",
            PracticeZone::Deep => "Deep",
            PracticeZone::Out => "Out!",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PracticeZone::TooShort => "too_short",
            PracticeZone::Short => "short",
            PracticeZone::Mid => "mid",
            PracticeZone::Deep => "deep",
            PracticeZone::Out => "out",
        }
    }

    /// Zone for a landing x. Practice serves go from the player half to the CPU half.
    pub fn classify(x: f32, court: &Court) -> PracticeZone {
        let (min_x, max_x) = court.half_range(crate::court::Side::Cpu);
        if x < min_x || x > max_x {
            return PracticeZone::Out;
        }
        let depth = (court.net_x - x) / (max_x - min_x);
        if depth < SHORT_ZONE_START {
            PracticeZone::TooShort
        } else if depth < MID_ZONE_START {
            PracticeZone::Short
        } else if depth < DEEP_ZONE_START {
            PracticeZone::Mid
        } else {
            PracticeZone::Deep
        }
    }

    /// World x range (min, max) of a scoring zone
    pub fn x_range(self, court: &Court) -> Option<(f32, f32)> {
        let half = court.width / 2.0;
        let (near, far) = match self {
            PracticeZone::TooShort => (0.0, SHORT_ZONE_START),
            PracticeZone::Short => (SHORT_ZONE_START, MID_ZONE_START),
            PracticeZone::Mid => (MID_ZONE_START, DEEP_ZONE_START),
            PracticeZone::Deep => (DEEP_ZONE_START, 1.0),
            PracticeZone::Out => return None,
        };
        Some((court.net_x - far * half, court.net_x - near * half))
    }
}

/// Target depth past the net for a serve of `power` (0-1), before spread
pub fn target_depth(power: f32) -> f32 {
    PRACTICE_MIN_DEPTH + power.clamp(0.0, 1.0) * (PRACTICE_MAX_DEPTH - PRACTICE_MIN_DEPTH)
}

/// Practice flow
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PracticePhase {
    /// Ball held, waiting for a press
    #[default]
    Ready,
    /// Tap held, power rising
    Charging { power: f32 },
    /// Serve in the air
    InFlight { power: f32 },
    /// Showing the last result
    Result { timer: f32 },
    /// All serves used
    Complete,
}

impl PracticePhase {
    pub fn label(&self) -> &'static str {
        match self {
            PracticePhase::Ready => "ready",
            PracticePhase::Charging { .. } => "charging",
            PracticePhase::InFlight { .. } => "in_flight",
            PracticePhase::Result { .. } => "result",
            PracticePhase::Complete => "complete",
        }
    }
}

/// One served ball
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServeResult {
    pub attempt: u32,
    pub power: f32,
    pub landing_x: f32,
    pub zone: PracticeZone,
}

/// Serve practice session resource
#[derive(Resource, Debug, Clone)]
pub struct PracticeState {
    pub phase: PracticePhase,
    /// Serves allowed this session
    pub total: u32,
    pub results: Vec<ServeResult>,
    /// Timestamp-based session identifier
    pub session_id: String,
    pub session_dir: PathBuf,
    /// Seconds since the session started
    pub elapsed: f32,
    /// Print and write the summary when the session ends
    pub save_summary: bool,
}

impl Default for PracticeState {
    fn default() -> Self {
        Self::new(PRACTICE_SERVES)
    }
}

impl PracticeState {
    pub fn new(total: u32) -> Self {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
        let session_dir = PathBuf::from("practice_logs").join(format!("session_{}", timestamp));
        Self {
            phase: PracticePhase::Ready,
            total: total.max(1),
            results: Vec::new(),
            session_id: timestamp,
            session_dir,
            elapsed: 0.0,
            save_summary: true,
        }
    }

    /// Serves made so far
    pub fn attempts(&self) -> u32 {
        self.results.len() as u32
    }

    pub fn points(&self) -> u32 {
        self.results.iter().map(|r| r.zone.points()).sum()
    }

    /// Best possible score for the session
    pub fn max_points(&self) -> u32 {
        self.total * PracticeZone::Deep.points()
    }

    pub fn count(&self, zone: PracticeZone) -> u32 {
        self.results.iter().filter(|r| r.zone == zone).count() as u32
    }

    pub fn is_last_serve(&self) -> bool {
        self.attempts() >= self.total
    }

    /// Store a landing and move to the result pause
    pub fn record(&mut self, power: f32, landing_x: f32, zone: PracticeZone) -> &ServeResult {
        let attempt = self.attempts() + 1;
        self.results.push(ServeResult {
            attempt,
            power,
            landing_x,
            zone,
        });
        self.phase = PracticePhase::Result {
            timer: PRACTICE_RESULT_PAUSE,
        };
        &self.results[self.results.len() - 1]
    }

    /// Start over with a fresh session id
    pub fn restart(&mut self) {
        let save_summary = self.save_summary;
        *self = Self::new(self.total);
        self.save_summary = save_summary;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_boundaries() {
        let court = Court::default();
        assert_eq!(PracticeZone::classify(-50.0, &court), PracticeZone::TooShort);
        assert_eq!(PracticeZone::classify(-150.0, &court), PracticeZone::Short);
        assert_eq!(PracticeZone::classify(-300.0, &court), PracticeZone::Mid);
        assert_eq!(PracticeZone::classify(-470.0, &court), PracticeZone::Deep);
        assert_eq!(PracticeZone::classify(-481.0, &court), PracticeZone::Out);
        // Never made it over
        assert_eq!(PracticeZone::classify(50.0, &court), PracticeZone::Out);
    }

    #[test]
    fn test_zone_ranges_match_classify() {
        let court = Court::default();
        for zone in PracticeZone::SCORING {
            let (lo, hi) = zone.x_range(&court).unwrap();
            assert_eq!(PracticeZone::classify((lo + hi) / 2.0, &court), zone);
        }
        assert!(PracticeZone::Out.x_range(&court).is_none());
    }

    #[test]
    fn test_power_maps_to_depth() {
        assert_eq!(target_depth(0.0), PRACTICE_MIN_DEPTH);
        assert_eq!(target_depth(1.0), PRACTICE_MAX_DEPTH);
        assert_eq!(target_depth(3.0), PRACTICE_MAX_DEPTH);
        // Full power lands past the end line
        assert!(PRACTICE_MAX_DEPTH > COURT_WIDTH / 2.0);
    }

    #[test]
    fn test_record_and_points() {
        let mut state = PracticeState::new(3);
        state.record(0.5, -200.0, PracticeZone::Short);
        state.record(0.9, -400.0, PracticeZone::Deep);
        assert_eq!(state.attempts(), 2);
        assert_eq!(state.points(), 4);
        assert_eq!(state.max_points(), 9);
        assert!(!state.is_last_serve());
        state.record(1.0, -500.0, PracticeZone::Out);
        assert!(state.is_last_serve());
        assert_eq!(state.count(PracticeZone::Out), 1);
        assert!(matches!(state.phase, PracticePhase::Result { .. }));

        state.restart();
        assert_eq!(state.attempts(), 0);
        assert_eq!(state.total, 3);
    }
}
