//! Auto-player - stands in for the human in headless matches
//!
//! Walks the receiver under the incoming ball and taps inside the receive and
//! spike windows. Each ball gets one skill roll; a failed roll lets the ball
//! drop. Taps go through `PlayerInput` exactly like real input.

use bevy::prelude::*;
use rand::Rng;

use crate::ai::predict_x_at_height;
use crate::ball::{Ball, BallState, Velocity};
use crate::constants::*;
use crate::countdown::not_in_countdown;
use crate::court::{Court, Side};
use crate::helpers::move_toward;
use crate::input::PlayerInput;
use crate::player::{Avatar, HomeX, Role};
use crate::rally::{GameRng, Rally, RallyPhase, handle_tap, in_spike_window, not_paused};
use crate::tuning::PhysicsTweaks;

/// Receiver walking speed (pixels/second)
const AUTO_MOVE_SPEED: f32 = 420.0;
/// Seconds the auto-player holds the ball before serving
const AUTO_SERVE_DELAY: f32 = 0.8;

/// Auto-player state
#[derive(Resource, Debug, Clone)]
pub struct AutoPlayer {
    /// Chance (0-1) that a ball is played inside its window
    pub skill: f32,
    pub move_speed: f32,
    pub serve_delay: f32,
    serve_timer: f32,
    /// Rally contact count the current roll was made for
    rolled_at: Option<u32>,
    will_hit: bool,
}

impl AutoPlayer {
    pub fn new(skill: f32) -> Self {
        Self {
            skill: skill.clamp(0.0, 1.0),
            move_speed: AUTO_MOVE_SPEED,
            serve_delay: AUTO_SERVE_DELAY,
            serve_timer: AUTO_SERVE_DELAY,
            rolled_at: None,
            will_hit: false,
        }
    }

    /// One roll per ball, keyed by the rally's contact count
    fn roll(&mut self, touches: u32, rng: &mut impl Rng) -> bool {
        if self.rolled_at != Some(touches) {
            self.rolled_at = Some(touches);
            self.will_hit = rng.gen_bool(self.skill as f64);
        }
        self.will_hit
    }
}

/// Add the auto-player to a headless match app
pub fn add_auto_player(app: &mut App, skill: f32) {
    app.insert_resource(AutoPlayer::new(skill)).add_systems(
        FixedUpdate,
        auto_play
            .before(handle_tap)
            .run_if(not_in_countdown.and(not_paused)),
    );
}

/// Move the receiver and press taps for the player team
#[allow(clippy::too_many_arguments)]
pub fn auto_play(
    time: Res<Time>,
    court: Res<Court>,
    tweaks: Res<PhysicsTweaks>,
    rally: Res<Rally>,
    mut auto: ResMut<AutoPlayer>,
    mut rng: ResMut<GameRng>,
    mut input: ResMut<PlayerInput>,
    balls: Query<(&Transform, &Velocity, &BallState), (With<Ball>, Without<Avatar>)>,
    mut avatars: Query<(&mut Transform, &Side, &Role, &HomeX), With<Avatar>>,
) {
    let Ok((ball_transform, velocity, state)) = balls.single() else {
        return;
    };
    let pos = ball_transform.translation.truncate();
    let vel = velocity.0;
    let dt = time.delta_secs();
    let live = *state == BallState::Live;
    let receive_y = court.above_floor(RECEIVE_ZONE_HEIGHT);

    let step = auto.move_speed * dt;
    match rally.phase {
        RallyPhase::Incoming if live && vel.x > 0.0 => {
            if let Some(x) = predict_x_at_height(pos, vel, tweaks.ball_gravity, receive_y) {
                walk_receiver(&mut avatars, Some(x), step, &court);
            }
        }
        RallyPhase::PointScored { .. } => walk_receiver(&mut avatars, None, step, &court),
        _ => {}
    }

    if !matches!(rally.phase, RallyPhase::Serving { server: Side::Player }) {
        auto.serve_timer = auto.serve_delay;
    }

    match rally.phase {
        RallyPhase::Serving {
            server: Side::Player,
        } => {
            auto.serve_timer -= dt;
            if auto.serve_timer <= 0.0 {
                auto.serve_timer = auto.serve_delay;
                input.tap_pressed = true;
            }
        }
        RallyPhase::Incoming => {
            let in_window = live
                && vel.x > 0.0
                && vel.y < 0.0
                && court.side_of(pos.x) == Side::Player
                && (pos.y - receive_y).abs() <= tweaks.receive_tolerance * 0.5;
            if in_window && auto.roll(rally.touches, &mut rng.rng) {
                input.tap_pressed = true;
            }
        }
        RallyPhase::Toss => {
            let in_window =
                live && vel.y < 0.0 && in_spike_window(pos, &court, tweaks.spike_tolerance * 0.5);
            if in_window && auto.roll(rally.touches, &mut rng.rng) {
                input.tap_pressed = true;
            }
        }
        _ => {}
    }
}

/// Walk the player receiver toward `goal`, or home when there is none
fn walk_receiver(
    avatars: &mut Query<(&mut Transform, &Side, &Role, &HomeX), With<Avatar>>,
    goal: Option<f32>,
    step: f32,
    court: &Court,
) {
    for (mut transform, side, role, home) in avatars.iter_mut() {
        if *side != Side::Player || *role != Role::Receiver {
            continue;
        }
        let target = court.clamp_avatar_x(Side::Player, goal.unwrap_or(home.0), AVATAR_SIZE.x);
        transform.translation.x = move_toward(transform.translation.x, target, step);
    }
}
