//! TOML test file parsing

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::ball::BallState;
use crate::court::Side;
use crate::player::Role;
use crate::rally::RallyPhase;

/// Complete test definition from TOML file
#[derive(Debug, Deserialize)]
pub struct TestDefinition {
    pub name: String,
    pub description: Option<String>,
    /// Frames to simulate (at least up to the last input or check)
    pub frames: Option<u64>,
    #[serde(default)]
    pub setup: TestSetup,
    #[serde(default)]
    pub input: Vec<FrameInput>,
    #[serde(default)]
    pub expect: TestExpectations,
}

/// Test setup configuration. Anything left out keeps the normal match start.
#[derive(Debug, Default, Deserialize)]
pub struct TestSetup {
    pub seed: Option<u64>,
    pub cpu_profile: Option<String>,
    pub win_score: Option<u32>,
    pub win_by_two: Option<bool>,
    /// Run the start countdown instead of skipping it
    #[serde(default)]
    pub countdown: bool,
    /// Rally phase to start in (see `parse_phase`)
    pub phase: Option<String>,
    pub score: Option<ScoreDef>,
    pub ball: Option<BallDef>,
    /// Avatar x positions, e.g. `{ role = "setter", x = 160.0 }` or role "cpu"
    #[serde(default)]
    pub avatars: Vec<AvatarDef>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ScoreDef {
    #[serde(default)]
    pub player: u32,
    #[serde(default)]
    pub cpu: u32,
}

/// Ball placement
#[derive(Debug, Clone, Deserialize)]
pub struct BallDef {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub velocity_x: f32,
    #[serde(default)]
    pub velocity_y: f32,
    /// "held", "live" (default) or "dead"
    pub state: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AvatarDef {
    pub role: String,
    pub x: f32,
}

impl AvatarDef {
    /// Team and role this entry refers to. "cpu" is the CPU receiver.
    pub fn target(&self) -> Option<(Side, Role)> {
        if self.role == "cpu" {
            return Some((Side::Cpu, Role::Receiver));
        }
        Role::from_name(&self.role).map(|role| (Side::Player, role))
    }
}

/// Input at a specific frame. Presses apply for that frame only.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FrameInput {
    pub frame: u64,
    /// Space / click with no drag
    #[serde(default)]
    pub tap: bool,
    /// Pointer goes down at [x, y]
    pub press: Option<[f32; 2]>,
    /// Pointer moves to [x, y]
    pub pointer: Option<[f32; 2]>,
    /// Pointer goes up at [x, y]
    pub release: Option<[f32; 2]>,
    #[serde(default)]
    pub pause: bool,
    #[serde(default)]
    pub restart: bool,
}

/// Expected test outcomes
#[derive(Debug, Default, Deserialize)]
pub struct TestExpectations {
    #[serde(default)]
    pub sequence: Vec<ExpectedEvent>,
    /// Multiple state assertions at different frames (uses [[expect.state]] TOML syntax)
    #[serde(default)]
    pub state: Vec<StateAssertion>,
    /// Events that must not happen at all (name or type code)
    #[serde(default)]
    pub absent: Vec<String>,
}

/// Expected event in sequence
#[derive(Debug, Deserialize)]
pub struct ExpectedEvent {
    /// Event name ("Receive") or type code ("RC")
    pub event: String,
    /// "player" or "cpu"
    pub side: Option<String>,
    pub frame_min: Option<u64>,
    pub frame_max: Option<u64>,
}

/// State assertion after simulation
#[derive(Debug, Clone, Deserialize)]
pub struct StateAssertion {
    pub after_frame: u64,
    #[serde(default)]
    pub checks: Vec<String>,
}

/// Phase names accepted in `setup.phase`
pub fn parse_phase(name: &str) -> Option<RallyPhase> {
    match name {
        "ready" => Some(RallyPhase::Ready),
        "serving_player" => Some(RallyPhase::Serving {
            server: Side::Player,
        }),
        "serving_cpu" => Some(RallyPhase::Serving { server: Side::Cpu }),
        "incoming" => Some(RallyPhase::Incoming),
        "set" => Some(RallyPhase::Set),
        "toss" => Some(RallyPhase::Toss),
        "attack" => Some(RallyPhase::Attack),
        _ => None,
    }
}

pub fn parse_ball_state(name: &str) -> Option<BallState> {
    match name {
        "held" => Some(BallState::Held),
        "live" => Some(BallState::Live),
        "dead" => Some(BallState::Dead),
        _ => None,
    }
}

/// "player" / "cpu" / "P" / "C"
pub fn parse_side(name: &str) -> Option<Side> {
    match name {
        "player" | "P" => Some(Side::Player),
        "cpu" | "C" => Some(Side::Cpu),
        _ => None,
    }
}

impl TestDefinition {
    /// Catch typos before running anything
    pub fn validate(&self) -> Result<(), String> {
        if let Some(phase) = &self.setup.phase
            && parse_phase(phase).is_none()
        {
            return Err(format!("Unknown phase '{}'", phase));
        }
        if let Some(state) = self.setup.ball.as_ref().and_then(|b| b.state.as_ref())
            && parse_ball_state(state).is_none()
        {
            return Err(format!("Unknown ball state '{}'", state));
        }
        if let Some(avatar) = self.setup.avatars.iter().find(|a| a.target().is_none()) {
            return Err(format!("Unknown avatar role '{}'", avatar.role));
        }
        if let Some(exp) = self
            .expect
            .sequence
            .iter()
            .find(|e| e.side.as_deref().is_some_and(|s| parse_side(s).is_none()))
        {
            return Err(format!("Unknown side in expected '{}'", exp.event));
        }
        Ok(())
    }

    /// Last frame to simulate: `frames - 1`, or the last input, check or event bound
    pub fn last_frame(&self) -> u64 {
        let inputs = self.input.iter().map(|i| i.frame);
        let checks = self.expect.state.iter().map(|s| s.after_frame);
        let bounds = self.expect.sequence.iter().filter_map(|e| e.frame_max);
        let requested = self.frames.map(|f| f.saturating_sub(1));
        inputs.chain(checks).chain(bounds).chain(requested).max().unwrap_or(0)
    }
}

/// Parse a test file from path
pub fn parse_test_file(path: &Path) -> Result<TestDefinition, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;

    let def: TestDefinition =
        toml::from_str(&content).map_err(|e| format!("Failed to parse {}: {}", path.display(), e))?;
    def.validate()
        .map_err(|e| format!("Invalid test {}: {}", path.display(), e))?;
    Ok(def)
}
