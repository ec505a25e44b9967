//! AI module - CPU opponent profiles, ball prediction and decision making

mod decision;
mod prediction;
mod profiles;

pub use decision::*;
pub use prediction::*;
pub use profiles::*;

use bevy::prelude::*;

/// CPU state machine tracking current goal and reaction delay
#[derive(Component, Default, Debug)]
pub struct CpuBrain {
    pub goal: CpuGoal,
    /// Seconds left before the CPU starts chasing an incoming ball
    pub reaction_timer: f32,
    /// Set once the CPU has noticed the current incoming ball
    pub alerted: bool,
    /// Set after a failed return so the CPU doesn't swing twice at one ball
    pub whiffed: bool,
}

/// Goals the CPU can pursue
#[derive(Clone, Copy, PartialEq, Default, Debug)]
pub enum CpuGoal {
    /// Stand still
    Idle,
    /// Walk back to the home position
    #[default]
    ReturnToBase,
    /// Move under the predicted contact point
    Intercept { x: f32 },
    /// Holding the ball for a serve
    Serve,
}

impl CpuGoal {
    /// Short label for the debug overlay and tick logs
    pub fn label(&self) -> &'static str {
        match self {
            CpuGoal::Idle => "idle",
            CpuGoal::ReturnToBase => "base",
            CpuGoal::Intercept { .. } => "intercept",
            CpuGoal::Serve => "serve",
        }
    }
}
