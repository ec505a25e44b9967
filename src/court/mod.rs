//! Court geometry, sides, and the floor/net entities

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::constants::*;

/// Which half of the court (and which team) something belongs to
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Right half, human controlled
    Player,
    /// Left half, CPU controlled
    Cpu,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Player => Side::Cpu,
            Side::Cpu => Side::Player,
        }
    }

    /// Short code used in event logs
    pub fn code(self) -> char {
        match self {
            Side::Player => 'P',
            Side::Cpu => 'C',
        }
    }

    pub fn from_code(c: char) -> Option<Side> {
        match c {
            'P' => Some(Side::Player),
            'C' => Some(Side::Cpu),
            _ => None,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Court bounds and net placement
#[derive(Resource, Debug, Clone)]
pub struct Court {
    pub width: f32,
    pub height: f32,
    /// Y of the floor surface
    pub floor_top: f32,
    pub net_x: f32,
    pub net_top: f32,
    pub net_half_width: f32,
}

impl Default for Court {
    fn default() -> Self {
        Self {
            width: COURT_WIDTH,
            height: COURT_HEIGHT,
            floor_top: FLOOR_TOP,
            net_x: NET_X,
            net_top: NET_TOP,
            net_half_width: NET_HALF_WIDTH,
        }
    }
}

impl Court {
    /// Which half a horizontal position falls in. The net line itself counts as CPU side.
    pub fn side_of(&self, x: f32) -> Side {
        if x > self.net_x {
            Side::Player
        } else {
            Side::Cpu
        }
    }

    /// Ball centre past a side line
    pub fn is_out(&self, x: f32) -> bool {
        x < -self.width / 2.0 || x > self.width / 2.0
    }

    /// Horizontal extent (min, max) of a half, net line to side line
    pub fn half_range(&self, side: Side) -> (f32, f32) {
        match side {
            Side::Player => (self.net_x, self.width / 2.0),
            Side::Cpu => (-self.width / 2.0, self.net_x),
        }
    }

    /// Range an avatar of the given width may stand in
    pub fn avatar_range(&self, side: Side, avatar_width: f32) -> (f32, f32) {
        let half = avatar_width / 2.0;
        match side {
            Side::Player => (self.net_x + NET_MARGIN + half, self.width / 2.0 - half),
            Side::Cpu => (-self.width / 2.0 + half, self.net_x - NET_MARGIN - half),
        }
    }

    /// Clamp an avatar x into its own half
    pub fn clamp_avatar_x(&self, side: Side, x: f32, avatar_width: f32) -> f32 {
        let (min_x, max_x) = self.avatar_range(side, avatar_width);
        x.clamp(min_x, max_x)
    }

    /// Centre height of a ball resting on the floor
    pub fn floor_contact_y(&self, ball_radius: f32) -> f32 {
        self.floor_top + ball_radius
    }

    /// Minimum ball-centre height for a pass to be considered over the net
    pub fn net_clear_y(&self, ball_radius: f32) -> f32 {
        self.net_top + ball_radius + NET_CLEARANCE
    }

    /// Convert a height above the floor to a world y
    pub fn above_floor(&self, height: f32) -> f32 {
        self.floor_top + height
    }
}

/// Marker for the floor sprite
#[derive(Component)]
pub struct Floor;

/// Marker for the net sprite
#[derive(Component)]
pub struct Net;

/// Spawn the floor strip and the net
pub fn spawn_court(commands: &mut Commands, court: &Court) {
    commands.spawn((
        Sprite::from_color(FLOOR_COLOR, Vec2::new(court.width, FLOOR_THICKNESS)),
        Transform::from_xyz(0.0, court.floor_top - FLOOR_THICKNESS / 2.0, 0.0),
        Floor,
    ));

    let net_height = court.net_top - court.floor_top;
    commands.spawn((
        Sprite::from_color(NET_COLOR, Vec2::new(court.net_half_width * 2.0, net_height)),
        Transform::from_xyz(court.net_x, court.floor_top + net_height / 2.0, 0.5),
        Net,
    ));
}
