//! Volleyball - A side-view arcade volleyball game built with Bevy
//!
//! This crate provides all game components, resources, and systems organized into modules.

// Core modules
pub mod config_watcher;
pub mod constants;
pub mod countdown;
pub mod debug_logging;
pub mod events;
pub mod helpers;
pub mod settings;
pub mod simulation;
pub mod testing;
pub mod tuning;

// Game logic modules
pub mod ai;
pub mod ball;
pub mod court;
pub mod input;
pub mod player;
pub mod practice;
pub mod rally;
pub mod scoring;
pub mod ui;

// Re-export commonly used types for convenience
pub use ai::{CPU_PROFILES_FILE, CpuBrain, CpuGoal, CpuProfile, CpuProfileDatabase, predict_x_at_height};
pub use ball::{Ball, BallContacts, BallSpin, BallState, Velocity};
pub use config_watcher::ConfigWatcher;
pub use constants::*;
pub use countdown::{MatchCountdown, in_countdown, not_in_countdown};
pub use court::{Court, Side};
pub use debug_logging::DebugLogConfig;
pub use events::{EventBus, GameEvent};
pub use helpers::*;
pub use input::PlayerInput;
pub use player::{Avatar, DragState, DragTarget, Role};
pub use rally::{GameRng, MatchPlugin, PointReason, Rally, RallyPhase};
pub use scoring::{MatchRules, Score};
pub use settings::{CurrentSettings, InitSettings};
pub use tuning::PhysicsTweaks;
pub use ui::MessageBanner;

use bevy::math::Vec2;

// =============================================================================
// TRAJECTORY AIMING (shared by rally, CPU, practice and the auto-player)
// =============================================================================

/// A ballistic pass solved for a given apex height
#[derive(Debug, Clone, Copy)]
pub struct Lob {
    /// Launch velocity (pixels/second)
    pub velocity: Vec2,
    /// Seconds from launch until the ball comes down through the target
    pub flight_time: f32,
    /// Highest point of the path
    pub apex: Vec2,
}

/// How much the apex is raised per attempt when a lob would clip the net
const LOB_APEX_STEP: f32 = 40.0;
/// Give up raising the apex after this many attempts
const LOB_MAX_RAISES: usize = 20;
/// Past the net a lob may drop no more than this below the clearance height
/// over the same horizontal distance, so a steep descent does not clip the tape
const LOB_NET_DESCENT: f32 = 20.0;

/// Solve the launch velocity that rises to `apex_y` and comes down through `to`.
/// Returns None if the apex is below either endpoint or gravity is not positive.
pub fn calculate_lob(from: Vec2, to: Vec2, apex_y: f32, gravity: f32) -> Option<Lob> {
    if gravity <= 0.0 || apex_y < from.y || apex_y < to.y {
        return None;
    }

    // v² = 2*g*h for the rise, t = sqrt(2h/g) for the fall
    let vy = (2.0 * gravity * (apex_y - from.y)).sqrt();
    let t_up = vy / gravity;
    let t_down = (2.0 * (apex_y - to.y) / gravity).sqrt();
    let flight_time = t_up + t_down;
    if flight_time <= f32::EPSILON {
        return None;
    }

    let vx = (to.x - from.x) / flight_time;
    Some(Lob {
        velocity: Vec2::new(vx, vy),
        flight_time,
        apex: Vec2::new(from.x + vx * t_up, apex_y),
    })
}

/// Height of a ballistic path when it reaches `x`.
/// None if the path never gets there (moving away, or no horizontal motion).
pub fn height_at_x(from: Vec2, velocity: Vec2, gravity: f32, x: f32) -> Option<f32> {
    let dx = x - from.x;
    if velocity.x.abs() < f32::EPSILON || dx.signum() != velocity.x.signum() {
        return None;
    }
    let t = dx / velocity.x;
    Some(from.y + velocity.y * t - 0.5 * gravity * t * t)
}

/// Lob from one side of the net to the other, raising the apex until the path
/// passes the net at or above `clear_y` and is not yet dropping steeply onto it.
pub fn calculate_lob_over_net(
    from: Vec2,
    to: Vec2,
    min_apex_y: f32,
    net_x: f32,
    clear_y: f32,
    gravity: f32,
) -> Option<Lob> {
    let crosses_net = (from.x - net_x).signum() != (to.x - net_x).signum();
    let mut apex_y = min_apex_y.max(from.y).max(to.y);

    for _ in 0..=LOB_MAX_RAISES {
        let lob = calculate_lob(from, to, apex_y, gravity)?;
        if !crosses_net {
            return Some(lob);
        }
        let past_net = net_x + (to.x - net_x).signum() * LOB_NET_DESCENT;
        let clears = height_at_x(from, lob.velocity, gravity, net_x).is_some_and(|y| y >= clear_y)
            && height_at_x(from, lob.velocity, gravity, past_net)
                .is_some_and(|y| y >= clear_y - LOB_NET_DESCENT);
        if clears {
            return Some(lob);
        }
        apex_y += LOB_APEX_STEP;
    }
    None
}

/// How far the target moves away from the net per retry in `calculate_lob_clearing_net`
const LOB_TARGET_STEP: f32 = 4.0;
/// Give up moving the target after this many retries
const LOB_MAX_TARGET_SHIFTS: usize = 80;

/// `calculate_lob_over_net`, but a target too close to the net to be reached is
/// moved deeper until a path clears it. Returns the lob and the target it lands on.
pub fn calculate_lob_clearing_net(
    from: Vec2,
    to: Vec2,
    min_apex_y: f32,
    net_x: f32,
    clear_y: f32,
    gravity: f32,
) -> Option<(Lob, Vec2)> {
    let away = if (to.x - net_x).abs() > f32::EPSILON {
        (to.x - net_x).signum()
    } else {
        -(from.x - net_x).signum()
    };

    (0..=LOB_MAX_TARGET_SHIFTS).find_map(|i| {
        let target = Vec2::new(to.x + away * LOB_TARGET_STEP * i as f32, to.y);
        calculate_lob_over_net(from, target, min_apex_y, net_x, clear_y, gravity)
            .map(|lob| (lob, target))
    })
}

/// Hard, flat shot at `target` with a fixed horizontal speed.
/// If the straight solution would pass the net below `clear_y`, the shot is
/// flattened to pass exactly at `clear_y` (it then lands deeper).
pub fn calculate_spike(
    from: Vec2,
    target: Vec2,
    speed: f32,
    gravity: f32,
    net_x: f32,
    clear_y: f32,
) -> Vec2 {
    let dx = target.x - from.x;
    let vx = speed * dx.signum();
    if dx.abs() < f32::EPSILON || speed <= 0.0 {
        return Vec2::new(0.0, 0.0);
    }

    // y(t) = y0 + vy*t - g*t²/2  →  vy = (y - y0 + g*t²/2) / t
    let t = dx / vx;
    let mut vy = (target.y - from.y + 0.5 * gravity * t * t) / t;

    let crosses_net = (from.x - net_x).signum() != (target.x - net_x).signum();
    if crosses_net {
        let t_net = (net_x - from.x) / vx;
        if t_net > 0.0 {
            let y_net = from.y + vy * t_net - 0.5 * gravity * t_net * t_net;
            if y_net < clear_y {
                vy = (clear_y - from.y + 0.5 * gravity * t_net * t_net) / t_net;
            }
        }
    }

    Vec2::new(vx, vy)
}
