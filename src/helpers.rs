//! Utility functions for volleyball

use bevy::prelude::*;
use rand::Rng;

use crate::constants::{FLOOR_TOP, TARGET_EDGE_MARGIN, TARGET_NET_MARGIN};
use crate::court::{Court, Side};

/// Move a value toward a target by a maximum delta
pub fn move_toward(current: f32, target: f32, max_delta: f32) -> f32 {
    if (target - current).abs() <= max_delta {
        target
    } else {
        current + (target - current).signum() * max_delta
    }
}

/// Y coordinate of an avatar's centre when standing on the floor
pub fn avatar_standing_y(height: f32) -> f32 {
    FLOOR_TOP + height / 2.0
}

/// Pick a random landing point on the floor of `side`, kept inside the lines
/// and away from the net.
pub fn random_floor_target(court: &Court, side: Side, ball_radius: f32, rng: &mut impl Rng) -> Vec2 {
    let (min_x, max_x) = court.half_range(side);
    let (lo, hi) = match side {
        Side::Player => (min_x + TARGET_NET_MARGIN, max_x - TARGET_EDGE_MARGIN),
        Side::Cpu => (min_x + TARGET_EDGE_MARGIN, max_x - TARGET_NET_MARGIN),
    };
    let x = if hi > lo { rng.gen_range(lo..hi) } else { (lo + hi) / 2.0 };
    Vec2::new(x, court.floor_contact_y(ball_radius))
}
