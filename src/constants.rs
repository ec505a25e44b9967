//! Tunable constants for volleyball
//!
//! All gameplay values are defined here for easy tweaking. Runtime-adjustable
//! copies live in `PhysicsTweaks`.

use bevy::prelude::*;

// =============================================================================
// COLORS
// =============================================================================

pub const SKY_COLOR: Color = Color::srgb(0.53, 0.81, 0.92); // Sky blue background
pub const FLOOR_COLOR: Color = Color::srgb(0.96, 0.64, 0.38); // Wooden floor
pub const NET_COLOR: Color = Color::srgb(0.2, 0.2, 0.2);
pub const BALL_COLOR: Color = Color::srgb(1.0, 0.84, 0.0); // Gold
pub const PLAYER_RECEIVER_COLOR: Color = Color::srgb(1.0, 0.41, 0.71); // Hot pink
pub const PLAYER_SETTER_COLOR: Color = Color::srgb(0.86, 0.44, 0.58);
pub const PLAYER_ATTACKER_COLOR: Color = Color::srgb(1.0, 0.08, 0.58); // Deep pink
pub const CPU_COLOR: Color = Color::srgb(0.25, 0.41, 0.88); // Royal blue

pub const TEXT_PRIMARY: Color = Color::srgb(0.05, 0.05, 0.05);
pub const TEXT_MESSAGE: Color = Color::srgba(0.0, 0.0, 0.0, 0.7);
pub const TEXT_ACCENT: Color = Color::srgb(0.9, 0.2, 0.3);

// =============================================================================
// COURT DIMENSIONS
// =============================================================================

pub const COURT_WIDTH: f32 = 960.0;
pub const COURT_HEIGHT: f32 = 540.0;
pub const FLOOR_THICKNESS: f32 = 20.0;
pub const FLOOR_TOP: f32 = -COURT_HEIGHT / 2.0 + FLOOR_THICKNESS; // -250
pub const NET_X: f32 = 0.0;
pub const NET_HALF_WIDTH: f32 = 2.0;
pub const NET_TOP: f32 = 0.0; // Net reaches half the court height
pub const NET_MARGIN: f32 = 24.0; // Avatars keep this far from the net

// =============================================================================
// SIZES
// =============================================================================

pub const BALL_RADIUS: f32 = 8.0;
pub const AVATAR_SIZE: Vec2 = Vec2::new(30.0, 50.0);

// =============================================================================
// BALL PHYSICS (60 Hz fixed tick; original values were per frame)
// =============================================================================

pub const BALL_GRAVITY: f32 = 720.0; // 0.2 px/frame²
pub const BALL_FLOOR_BOUNCE: f32 = 0.6; // Vertical velocity retained on floor bounce
pub const BALL_FLOOR_FRICTION: f32 = 0.9; // Horizontal velocity retained on floor bounce
pub const BALL_NET_BOUNCE: f32 = 1.0; // Horizontal velocity retained off the net
pub const BALL_TAPE_BOUNCE: f32 = 0.5; // Vertical velocity retained off the net tape
pub const BALL_SPIN_FACTOR: f32 = 0.05; // Radians per pixel of horizontal travel
pub const PHYSICS_HZ: f64 = 60.0;

// =============================================================================
// TIMING
// =============================================================================

pub const MESSAGE_DURATION: f32 = 2.0; // 120 frames
pub const POINT_PAUSE: f32 = 1.5;
pub const START_DELAY: f32 = 2.0;
pub const SERVE_DELAY: f32 = 1.0;

// =============================================================================
// RALLY WINDOWS
// =============================================================================

// Receive window: 0.75 * height from the top of the court, +-30
pub const RECEIVE_ZONE_HEIGHT: f32 = 0.25 * COURT_HEIGHT - FLOOR_THICKNESS; // 115 above floor
pub const RECEIVE_ZONE_TOLERANCE: f32 = 30.0;
pub const RECEIVE_REACH: f32 = 90.0;
pub const RECEIVE_LIFT: f32 = 200.0; // Apex above the higher endpoint of the pass

pub const SET_CONTACT_HEIGHT: f32 = 190.0; // Above floor
pub const SET_REACH: f32 = 70.0;
pub const TOSS_LIFT: f32 = 100.0;

// Spike window: past 0.55 * width, centred on the net top (half the court height)
pub const ATTACK_LINE_X: f32 = 0.05 * COURT_WIDTH; // 48
pub const SPIKE_ZONE_TOLERANCE: f32 = 30.0;
pub const SPIKE_REACH: f32 = 80.0;
pub const SPIKE_SPEED: f32 = 420.0; // Horizontal speed of a spike

pub const NET_CLEARANCE: f32 = 12.0; // Extra height above the tape when aiming over the net
pub const SERVE_APEX_ABOVE_NET: f32 = 150.0;
pub const SERVE_HOLD_HEIGHT: f32 = 120.0; // Held ball above the floor while serving
pub const TARGET_EDGE_MARGIN: f32 = 40.0; // Aim targets stay this far inside the lines
pub const TARGET_NET_MARGIN: f32 = 60.0; // Aim targets stay this far from the net

// =============================================================================
// CPU
// =============================================================================

pub const CPU_CONTACT_HEIGHT: f32 = RECEIVE_ZONE_HEIGHT;
pub const CPU_REACH: f32 = 70.0;
pub const CPU_POSITION_TOLERANCE: f32 = 4.0;

// =============================================================================
// DRAG
// =============================================================================

pub const GRAB_RADIUS: f32 = 40.0;

// =============================================================================
// SPAWN POSITIONS (x only; avatars stand on the floor)
// =============================================================================

pub const PLAYER_RECEIVER_X: f32 = 240.0; // 0.75 * width
pub const PLAYER_SETTER_X: f32 = 150.0;
pub const PLAYER_ATTACKER_X: f32 = 96.0; // 0.6 * width
pub const CPU_RECEIVER_X: f32 = -240.0; // 0.25 * width

// =============================================================================
// MATCH
// =============================================================================

pub const DEFAULT_WIN_SCORE: u32 = 11;

// =============================================================================
// SERVE PRACTICE
// =============================================================================

pub const PRACTICE_SERVES: u32 = 10;
pub const PRACTICE_CHARGE_TIME: f32 = 1.2;
pub const PRACTICE_MIN_DEPTH: f32 = 20.0; // Target distance past the net at zero power
pub const PRACTICE_MAX_DEPTH: f32 = COURT_WIDTH / 2.0 + 40.0; // Full power overshoots the end line
pub const PRACTICE_SPREAD: f32 = 18.0; // Random landing spread (+-px)
pub const PRACTICE_RESULT_PAUSE: f32 = 1.2;

// =============================================================================
// WINDOW
// =============================================================================

pub const WINDOW_WIDTH: u32 = 1280;
pub const WINDOW_HEIGHT: u32 = 720;
