//! Ball flight prediction for the CPU

use bevy::prelude::*;

/// Seconds until a ballistic path comes *down* through `height`.
/// None if it never reaches that height.
pub fn time_to_height(pos: Vec2, vel: Vec2, gravity: f32, height: f32) -> Option<f32> {
    if gravity <= 0.0 {
        return None;
    }
    // height = y + vy*t - g*t²/2, descending root
    let disc = vel.y * vel.y + 2.0 * gravity * (pos.y - height);
    if disc < 0.0 {
        return None;
    }
    let t = (vel.y + disc.sqrt()) / gravity;
    (t >= 0.0).then_some(t)
}

/// Where a ball will be horizontally when it falls through `height`.
/// Ignores the net and walls.
pub fn predict_x_at_height(pos: Vec2, vel: Vec2, gravity: f32, height: f32) -> Option<f32> {
    time_to_height(pos, vel, gravity, height).map(|t| pos.x + vel.x * t)
}
