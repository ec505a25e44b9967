//! Ball-related components

use bevy::prelude::*;

/// Marker for ball entities
#[derive(Component)]
pub struct Ball;

/// 2D velocity in pixels per second
#[derive(Component, Default, Debug, Clone, Copy)]
pub struct Velocity(pub Vec2);

/// Ball state - Held, Live, or Dead
#[derive(Component, Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BallState {
    /// Positioned by the server, no physics
    #[default]
    Held,
    /// In play, can score
    Live,
    /// Point decided; still moves but can never score again
    Dead,
}

impl BallState {
    /// Single-char code for tick logging
    pub fn code(self) -> char {
        match self {
            BallState::Held => 'H',
            BallState::Live => 'L',
            BallState::Dead => 'D',
        }
    }
}

/// Angular velocity of the ball sprite (radians per second)
#[derive(Component, Default)]
pub struct BallSpin(pub f32);

/// Surfaces touched during the current tick
#[derive(Component, Default, Debug, Clone, Copy)]
pub struct BallContacts {
    pub floor: bool,
    pub net: bool,
}
