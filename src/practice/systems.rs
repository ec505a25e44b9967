//! Serve practice systems - charge, serve, landing and session flow

use bevy::prelude::*;
use rand::Rng;

use super::session::{print_session_summary, write_session_summary};
use super::state::*;
use crate::ball::{Ball, BallContacts, BallState, Velocity};
use crate::{Lob, calculate_lob_clearing_net};
use crate::constants::*;
use crate::court::{Court, Side};
use crate::events::{EventBus, GameEvent};
use crate::helpers::avatar_standing_y;
use crate::input::PlayerInput;
use crate::player::{Avatar, Role};
use crate::rally::GameRng;
use crate::tuning::PhysicsTweaks;
use crate::ui::MessageBanner;

/// Floor strip marking a practice zone
#[derive(Component)]
pub struct ZoneMarker(pub PracticeZone);

/// Serve counter / power bar text
#[derive(Component)]
pub struct PracticeHudText;

fn zone_color(zone: PracticeZone) -> Color {
    match zone {
        PracticeZone::TooShort => Color::srgb(0.6, 0.6, 0.6),
        PracticeZone::Short => Color::srgb(0.55, 0.8, 0.45),
        PracticeZone::Mid => Color::srgb(0.95, 0.8, 0.3),
        PracticeZone::Deep => Color::srgb(0.9, 0.35, 0.3),
        PracticeZone::Out => Color::NONE,
    }
}

/// Where the server holds the ball
pub fn serve_origin(court: &Court) -> Vec2 {
    Vec2::new(
        court.clamp_avatar_x(Side::Player, PLAYER_RECEIVER_X, AVATAR_SIZE.x),
        court.above_floor(SERVE_HOLD_HEIGHT),
    )
}

/// Court, zone strips, the server and the ball
pub fn spawn_practice(mut commands: Commands, court: Res<Court>) {
    crate::court::spawn_court(&mut commands, &court);

    for zone in [
        PracticeZone::TooShort,
        PracticeZone::Short,
        PracticeZone::Mid,
        PracticeZone::Deep,
    ] {
        let Some((lo, hi)) = zone.x_range(&court) else {
            continue;
        };
        commands.spawn((
            Sprite::from_color(zone_color(zone), Vec2::new(hi - lo, 6.0)),
            Transform::from_xyz((lo + hi) / 2.0, court.floor_top + 3.0, 0.2),
            ZoneMarker(zone),
        ));
    }

    let origin = serve_origin(&court);
    commands.spawn((
        Sprite::from_color(PLAYER_RECEIVER_COLOR, AVATAR_SIZE),
        Transform::from_xyz(origin.x, avatar_standing_y(AVATAR_SIZE.y), 1.0),
        Avatar,
        Side::Player,
        Role::Receiver,
    ));
    crate::ball::spawn_ball(&mut commands, origin);
}

/// R starts a new session
pub fn practice_restart(
    mut input: ResMut<PlayerInput>,
    mut state: ResMut<PracticeState>,
    mut banner: ResMut<MessageBanner>,
    mut bus: ResMut<EventBus>,
) {
    if !std::mem::take(&mut input.restart_pressed) {
        return;
    }
    state.restart();
    banner.clear();
    bus.emit(GameEvent::Restart);
    info!("Practice restarted ({} serves)", state.total);
}

/// Keep the ball above the server until it is served
pub fn hold_practice_ball(
    court: Res<Court>,
    state: Res<PracticeState>,
    mut balls: Query<(&mut Transform, &mut Velocity, &mut BallState), With<Ball>>,
) {
    if !matches!(
        state.phase,
        PracticePhase::Ready | PracticePhase::Charging { .. }
    ) {
        return;
    }
    let origin = serve_origin(&court);
    for (mut transform, mut velocity, mut ball_state) in &mut balls {
        *ball_state = BallState::Held;
        velocity.0 = Vec2::ZERO;
        transform.translation.x = origin.x;
        transform.translation.y = origin.y;
        transform.rotation = Quat::IDENTITY;
    }
}

/// Lob for a serve of `power` with a landing `spread`, and where it comes down.
/// Aims too close to the net are pushed deeper until they clear it.
pub fn practice_serve(
    court: &Court,
    tweaks: &PhysicsTweaks,
    power: f32,
    spread: f32,
) -> Option<(Lob, Vec2)> {
    let depth = target_depth(power) + spread;
    calculate_lob_clearing_net(
        serve_origin(court),
        Vec2::new(court.net_x - depth, court.floor_contact_y(BALL_RADIUS)),
        court.net_top + tweaks.serve_apex_above_net,
        court.net_x,
        court.net_clear_y(BALL_RADIUS),
        tweaks.ball_gravity,
    )
}

/// Press to start charging, hold to build power, release to serve
#[allow(clippy::too_many_arguments)]
pub fn practice_charge(
    time: Res<Time>,
    court: Res<Court>,
    tweaks: Res<PhysicsTweaks>,
    mut rng: ResMut<GameRng>,
    mut input: ResMut<PlayerInput>,
    mut state: ResMut<PracticeState>,
    mut bus: ResMut<EventBus>,
    mut balls: Query<(&mut Velocity, &mut BallState), With<Ball>>,
) {
    let dt = time.delta_secs();
    let tapped = input.consume_tap();
    let released = input.consume_release();
    if state.phase != PracticePhase::Complete {
        state.elapsed += dt;
    }

    if state.phase == PracticePhase::Ready && tapped {
        state.phase = PracticePhase::Charging { power: 0.0 };
    }

    let PracticePhase::Charging { power } = &mut state.phase else {
        return;
    };
    if input.tap_held {
        *power = (*power + dt / PRACTICE_CHARGE_TIME).min(1.0);
    }
    if !released {
        return;
    }
    let power = *power;

    let from = serve_origin(&court);
    let spread = rng.rng.gen_range(-PRACTICE_SPREAD..=PRACTICE_SPREAD);
    let Some((lob, target)) = practice_serve(&court, &tweaks, power, spread) else {
        warn!("No practice serve path at power {:.2}", power);
        state.phase = PracticePhase::Ready;
        return;
    };

    let Ok((mut velocity, mut ball_state)) = balls.single_mut() else {
        return;
    };
    *ball_state = BallState::Live;
    velocity.0 = lob.velocity;
    state.phase = PracticePhase::InFlight { power };
    bus.emit(GameEvent::Serve {
        side: Side::Player,
        pos: (from.x, from.y),
        vel: (lob.velocity.x, lob.velocity.y),
    });
    debug!("Practice serve power {:.2} aimed at {:.0}", power, target.x);
}

/// Score the serve when it lands or leaves the court
pub fn judge_practice_landing(
    court: Res<Court>,
    mut state: ResMut<PracticeState>,
    mut banner: ResMut<MessageBanner>,
    mut bus: ResMut<EventBus>,
    mut balls: Query<(&Transform, &mut BallState, &BallContacts), With<Ball>>,
) {
    let PracticePhase::InFlight { power } = state.phase else {
        return;
    };
    let Ok((transform, mut ball_state, contacts)) = balls.single_mut() else {
        return;
    };
    let x = transform.translation.x;
    if *ball_state != BallState::Live || !(contacts.floor || court.is_out(x)) {
        return;
    }

    *ball_state = BallState::Dead;
    let zone = PracticeZone::classify(x, &court);
    let attempt = state.record(power, x, zone).attempt;
    bus.emit(GameEvent::PracticeServe {
        attempt,
        power,
        landing_x: x,
        zone: zone.name().to_string(),
        points: zone.points(),
    });
    match zone.points() {
        0 => banner.show(zone.label()),
        points => banner.show(format!("{} +{}", zone.label(), points)),
    }
    info!(
        "Serve {}/{}: {} ({} pts, total {})",
        attempt,
        state.total,
        zone.label(),
        zone.points(),
        state.points()
    );
}

/// After the result pause, ready the next serve or finish the session
pub fn advance_practice(
    time: Res<Time>,
    mut state: ResMut<PracticeState>,
    mut banner: ResMut<MessageBanner>,
) {
    let PracticePhase::Result { timer } = &mut state.phase else {
        return;
    };
    *timer -= time.delta_secs();
    if *timer > 0.0 {
        return;
    }

    if !state.is_last_serve() {
        state.phase = PracticePhase::Ready;
        return;
    }

    state.phase = PracticePhase::Complete;
    banner.show_sticky(format!(
        "Done! {} / {} points - R to restart",
        state.points(),
        state.max_points()
    ));
    if state.save_summary {
        print_session_summary(&state);
        if let Err(e) = write_session_summary(&state) {
            warn!("Failed to write practice summary: {}", e);
        }
    }
}

/// HUD line: serve counter, points and the power bar
pub fn practice_hud_line(state: &PracticeState) -> String {
    let power = match state.phase {
        PracticePhase::Charging { power } | PracticePhase::InFlight { power } => power,
        _ => 0.0,
    };
    let filled = (power * 10.0).round() as usize;
    let serve = (state.attempts() + 1).min(state.total);
    format!(
        "Serve {}/{}   Points {}   Power [{}{}]",
        serve,
        state.total,
        state.points(),
        "#".repeat(filled),
        "-".repeat(10 - filled.min(10)),
    )
}

pub fn spawn_practice_hud(commands: &mut Commands, court: &Court) {
    commands.spawn((
        Text2d::new(""),
        TextFont {
            font_size: 22.0,
            ..default()
        },
        TextColor(TEXT_PRIMARY),
        Transform::from_xyz(0.0, court.height / 2.0 - 30.0, 10.0),
        PracticeHudText,
    ));

    for zone in PracticeZone::SCORING {
        let Some((lo, hi)) = zone.x_range(court) else {
            continue;
        };
        commands.spawn((
            Text2d::new(format!("{} ({})", zone.label(), zone.points())),
            TextFont {
                font_size: 14.0,
                ..default()
            },
            TextColor(TEXT_PRIMARY),
            Transform::from_xyz((lo + hi) / 2.0, court.floor_top + 16.0, 10.0),
        ));
    }
}

pub fn update_practice_hud(
    state: Res<PracticeState>,
    mut text_query: Query<&mut Text2d, With<PracticeHudText>>,
) {
    if let Ok(mut text) = text_query.single_mut() {
        text.0 = practice_hud_line(&state);
    }
}
