//! Rally systems - serve, taps, automatic set, dead balls and point flow
//!
//! All run in FixedUpdate, chained by `MatchPlugin`.

use bevy::prelude::*;

use crate::ai::{CpuBrain, CpuProfile, CpuProfileDatabase};
use crate::ball::{Ball, BallContacts, BallState, Velocity};
use crate::constants::*;
use crate::countdown::MatchCountdown;
use crate::court::{Court, Side};
use crate::events::{EventBus, EventLogger, GameEvent};
use crate::helpers::random_floor_target;
use crate::input::PlayerInput;
use crate::player::{Avatar, DragState, HomeX, Role, reset_avatars};
use crate::rally::GameRng;
use crate::rally::judge::*;
use crate::rally::phase::*;
use crate::scoring::{MatchRules, Score};
use crate::tuning::PhysicsTweaks;
use crate::ui::MessageBanner;
use crate::{calculate_lob, calculate_lob_over_net, calculate_spike};

/// Set when the match should start over at the next tick
#[derive(Resource, Default)]
pub struct PendingRestart(pub bool);

fn pos2(v: Vec2) -> (f32, f32) {
    (v.x, v.y)
}

/// X of the first avatar on `side` with `role`
pub fn avatar_x<'a>(
    avatars: impl IntoIterator<Item = (&'a Transform, &'a Side, &'a Role)>,
    side: Side,
    role: Role,
) -> Option<f32> {
    avatars
        .into_iter()
        .find(|(_, s, r)| **s == side && **r == role)
        .map(|(t, _, _)| t.translation.x)
}

/// Launch velocity for a serve from `from` into the opponent's half
pub fn serve_velocity(
    server: Side,
    from: Vec2,
    apex_above_net: f32,
    court: &Court,
    gravity: f32,
    rng: &mut GameRng,
) -> Vec2 {
    let target = random_floor_target(court, server.opponent(), BALL_RADIUS, &mut rng.rng);
    calculate_lob_over_net(
        from,
        target,
        court.net_top + apex_above_net,
        court.net_x,
        court.net_clear_y(BALL_RADIUS),
        gravity,
    )
    .map(|lob| lob.velocity)
    .unwrap_or_else(|| {
        warn!("No serve path from {:?} to {:?}", from, target);
        Vec2::ZERO
    })
}

/// Kill the ball and award a point. Decides game over.
#[allow(clippy::too_many_arguments)]
pub fn award_point(
    rally: &mut Rally,
    score: &mut Score,
    rules: &MatchRules,
    banner: &mut MessageBanner,
    bus: &mut EventBus,
    ball_state: &mut BallState,
    winner: Side,
    reason: PointReason,
) {
    *ball_state = BallState::Dead;
    score.award(winner);
    bus.emit(GameEvent::Point {
        winner,
        reason: reason.as_str().to_string(),
        score_player: score.player,
        score_cpu: score.cpu,
    });
    info!(
        "Point {} ({}) - {}:{}",
        winner,
        reason.as_str(),
        score.player,
        score.cpu
    );

    // Miss messages were already shown by the tap
    match (reason, winner) {
        (PointReason::Out, _) => banner.show("Out!"),
        (PointReason::Floor, Side::Player) => banner.show("Nice!"),
        (PointReason::Floor, Side::Cpu) => banner.show("CPU point!"),
        _ => {}
    }

    if let Some(match_winner) = rules.winner(score) {
        rally.phase = RallyPhase::GameOver {
            winner: match_winner,
        };
        banner.show_sticky(match match_winner {
            Side::Player => "YOU WIN!",
            Side::Cpu => "CPU WINS",
        });
        bus.emit(GameEvent::MatchEnd {
            score_player: score.player,
            score_cpu: score.cpu,
            duration: rally.elapsed,
        });
        info!("Match over: {} wins {}:{}", match_winner, score.player, score.cpu);
    } else {
        rally.phase = RallyPhase::PointScored {
            timer: POINT_PAUSE,
            next_server: winner,
        };
    }
}

/// Spawn court, teams and ball, and announce the match
pub fn spawn_match(
    mut commands: Commands,
    court: Res<Court>,
    rng: Res<GameRng>,
    profiles: Res<CpuProfileDatabase>,
    rules: Res<MatchRules>,
    mut bus: ResMut<EventBus>,
) {
    crate::court::spawn_court(&mut commands, &court);
    crate::player::spawn_teams(&mut commands, &court);
    let hold = Vec2::new(
        court.clamp_avatar_x(Side::Cpu, CPU_RECEIVER_X, AVATAR_SIZE.x),
        court.above_floor(SERVE_HOLD_HEIGHT),
    );
    crate::ball::spawn_ball(&mut commands, hold);

    bus.emit(GameEvent::MatchStart {
        cpu_profile: profiles.current().name.clone(),
        win_score: rules.win_score,
        seed: rng.seed,
    });
}

/// Pause (P / Escape) and restart (R). Runs even while paused.
pub fn handle_match_controls(
    mut input: ResMut<PlayerInput>,
    mut rally: ResMut<Rally>,
    mut pending: ResMut<PendingRestart>,
    mut bus: ResMut<EventBus>,
) {
    if std::mem::take(&mut input.pause_pressed) {
        rally.paused = !rally.paused;
        bus.emit(if rally.paused {
            GameEvent::Pause
        } else {
            GameEvent::Resume
        });
        info!("{}", if rally.paused { "Paused" } else { "Resumed" });
    }
    if std::mem::take(&mut input.restart_pressed) {
        pending.0 = true;
    }
    if rally.paused {
        // Taps while paused are dropped, not queued
        input.tap_pressed = false;
        input.tap_released = false;
        input.pointer_pressed = false;
    }
}

/// Reset score, rally, countdown and entities for a new match
#[allow(clippy::too_many_arguments)]
pub fn apply_restart(
    mut pending: ResMut<PendingRestart>,
    court: Res<Court>,
    rng: Res<GameRng>,
    profiles: Res<CpuProfileDatabase>,
    rules: Res<MatchRules>,
    mut score: ResMut<Score>,
    mut rally: ResMut<Rally>,
    mut countdown: ResMut<MatchCountdown>,
    mut banner: ResMut<MessageBanner>,
    mut drag: ResMut<DragState>,
    mut bus: ResMut<EventBus>,
    mut balls: Query<(&mut Transform, &mut Velocity, &mut BallState), (With<Ball>, Without<Avatar>)>,
    mut avatars: Query<(&mut Transform, &HomeX), With<Avatar>>,
    mut brains: Query<&mut CpuBrain>,
) {
    if !std::mem::take(&mut pending.0) {
        return;
    }

    score.reset();
    *rally = Rally::default();
    countdown.start();
    banner.clear();
    drag.grabbed = None;

    reset_avatars(&mut avatars);
    for mut brain in &mut brains {
        *brain = CpuBrain::default();
    }
    let hold_x = court.clamp_avatar_x(Side::Cpu, CPU_RECEIVER_X, AVATAR_SIZE.x);
    for (mut transform, mut velocity, mut state) in &mut balls {
        *state = BallState::Held;
        velocity.0 = Vec2::ZERO;
        transform.translation.x = hold_x;
        transform.translation.y = court.above_floor(SERVE_HOLD_HEIGHT);
        transform.rotation = Quat::IDENTITY;
    }

    bus.emit(GameEvent::Restart);
    bus.emit(GameEvent::MatchStart {
        cpu_profile: profiles.current().name.clone(),
        win_score: rules.win_score,
        seed: rng.seed,
    });
    info!("Match restarted");
}

/// Count play time
pub fn tick_rally_clock(time: Res<Time>, mut rally: ResMut<Rally>) {
    rally.elapsed += time.delta_secs();
    rally.ticks += 1;
}

/// The CPU serves first once the countdown is over
pub fn begin_first_serve(mut rally: ResMut<Rally>) {
    if rally.phase == RallyPhase::Ready {
        rally.start_serve(Side::Cpu);
    }
}

/// Keep the ball above the server; launch the CPU serve after its delay
#[allow(clippy::too_many_arguments)]
pub fn hold_and_serve(
    time: Res<Time>,
    court: Res<Court>,
    tweaks: Res<PhysicsTweaks>,
    profiles: Res<CpuProfileDatabase>,
    mut rng: ResMut<GameRng>,
    mut rally: ResMut<Rally>,
    mut banner: ResMut<MessageBanner>,
    mut bus: ResMut<EventBus>,
    mut balls: Query<(&mut Transform, &mut Velocity, &mut BallState), With<Ball>>,
    avatars: Query<(&Transform, &Side, &Role), (With<Avatar>, Without<Ball>)>,
) {
    let RallyPhase::Serving { server } = rally.phase else {
        return;
    };
    let Ok((mut transform, mut velocity, mut state)) = balls.single_mut() else {
        return;
    };
    let Some(server_x) = avatar_x(&avatars, server, Role::Receiver) else {
        return;
    };

    let hold = Vec2::new(server_x, court.above_floor(SERVE_HOLD_HEIGHT));
    *state = BallState::Held;
    velocity.0 = Vec2::ZERO;
    transform.translation.x = hold.x;
    transform.translation.y = hold.y;

    if server != Side::Cpu {
        return;
    }
    rally.serve_timer -= time.delta_secs();
    if rally.serve_timer > 0.0 {
        return;
    }

    let profile: &CpuProfile = profiles.current();
    let vel = serve_velocity(
        Side::Cpu,
        hold,
        profile.serve_apex,
        &court,
        tweaks.ball_gravity,
        &mut rng,
    );
    *state = BallState::Live;
    velocity.0 = vel;
    rally.touch(Side::Cpu, RallyPhase::Incoming);
    banner.show("CPU serve!");
    bus.emit(GameEvent::Serve {
        side: Side::Cpu,
        pos: pos2(hold),
        vel: pos2(vel),
    });
}

/// Apply the player's tap: serve, receive, spike or restart
#[allow(clippy::too_many_arguments)]
pub fn handle_tap(
    court: Res<Court>,
    tweaks: Res<PhysicsTweaks>,
    rules: Res<MatchRules>,
    mut rng: ResMut<GameRng>,
    mut input: ResMut<PlayerInput>,
    mut rally: ResMut<Rally>,
    mut pending: ResMut<PendingRestart>,
    mut score: ResMut<Score>,
    mut banner: ResMut<MessageBanner>,
    mut bus: ResMut<EventBus>,
    mut balls: Query<(&Transform, &mut Velocity, &mut BallState), With<Ball>>,
    avatars: Query<(&Transform, &Side, &Role), (With<Avatar>, Without<Ball>)>,
) {
    if !input.consume_tap() {
        return;
    }
    let Ok((transform, mut velocity, mut state)) = balls.single_mut() else {
        return;
    };

    let team: Vec<(Role, f32)> = avatars
        .iter()
        .filter(|(_, side, _)| **side == Side::Player)
        .map(|(t, _, role)| (*role, t.translation.x))
        .collect();
    let pos = transform.translation.truncate();
    let g = tweaks.ball_gravity;

    match judge_tap(rally.phase, *state, pos, velocity.0, &team, &court, &tweaks) {
        TapOutcome::Ignored => {}
        TapOutcome::Restart => pending.0 = true,
        TapOutcome::Serve => {
            let vel = serve_velocity(
                Side::Player,
                pos,
                tweaks.serve_apex_above_net,
                &court,
                g,
                &mut rng,
            );
            *state = BallState::Live;
            velocity.0 = vel;
            rally.touch(Side::Player, RallyPhase::Attack);
            bus.emit(GameEvent::Serve {
                side: Side::Player,
                pos: pos2(pos),
                vel: pos2(vel),
            });
        }
        TapOutcome::Receive => {
            let setter_x = avatar_x(&avatars, Side::Player, Role::Setter).unwrap_or(pos.x);
            let target = Vec2::new(setter_x, court.above_floor(SET_CONTACT_HEIGHT));
            let apex = pos.y.max(target.y) + tweaks.receive_lift;
            let Some(lob) = calculate_lob(pos, target, apex, g) else {
                warn!("No receive path from {:?} to {:?}", pos, target);
                return;
            };
            velocity.0 = lob.velocity;
            rally.touch(Side::Player, RallyPhase::Set);
            banner.show("Receive!");
            bus.emit(GameEvent::Receive { pos: pos2(pos) });
        }
        TapOutcome::ReceiveMiss => {
            banner.show("Receive miss!");
            bus.emit(GameEvent::ReceiveMiss { pos: pos2(pos) });
            award_point(
                &mut rally,
                &mut score,
                &rules,
                &mut banner,
                &mut bus,
                &mut state,
                Side::Cpu,
                PointReason::ReceiveMiss,
            );
        }
        TapOutcome::Spike => {
            let target = random_floor_target(&court, Side::Cpu, BALL_RADIUS, &mut rng.rng);
            let vel = calculate_spike(
                pos,
                target,
                tweaks.spike_speed,
                g,
                court.net_x,
                court.net_clear_y(BALL_RADIUS),
            );
            velocity.0 = vel;
            rally.touch(Side::Player, RallyPhase::Attack);
            banner.show("Spike!");
            bus.emit(GameEvent::Spike {
                pos: pos2(pos),
                vel: pos2(vel),
            });
        }
        TapOutcome::SpikeMiss => {
            banner.show("Spike miss!");
            bus.emit(GameEvent::SpikeMiss { pos: pos2(pos) });
            award_point(
                &mut rally,
                &mut score,
                &rules,
                &mut banner,
                &mut bus,
                &mut state,
                Side::Cpu,
                PointReason::SpikeMiss,
            );
        }
    }
}

/// Setter tosses the received ball to the attacker when it drops to contact height
pub fn auto_set(
    time: Res<Time>,
    court: Res<Court>,
    tweaks: Res<PhysicsTweaks>,
    mut rally: ResMut<Rally>,
    mut bus: ResMut<EventBus>,
    mut balls: Query<(&Transform, &mut Velocity, &BallState), With<Ball>>,
    avatars: Query<(&Transform, &Side, &Role), (With<Avatar>, Without<Ball>)>,
) {
    if rally.phase != RallyPhase::Set {
        return;
    }
    let Ok((transform, mut velocity, state)) = balls.single_mut() else {
        return;
    };
    if *state != BallState::Live {
        return;
    }
    let pos = transform.translation.truncate();
    let contact_y = court.above_floor(SET_CONTACT_HEIGHT);
    if !crossed_downward(pos.y, velocity.0.y, time.delta_secs(), contact_y) {
        return;
    }
    let Some(setter_x) = avatar_x(&avatars, Side::Player, Role::Setter) else {
        return;
    };
    if (setter_x - pos.x).abs() > tweaks.set_reach {
        debug!("Setter out of reach ({:.0} vs ball {:.0})", setter_x, pos.x);
        return;
    }

    // Toss comes down through the spike window over the attacker
    let attacker_x = avatar_x(&avatars, Side::Player, Role::Attacker).unwrap_or(setter_x);
    let target = Vec2::new(
        attacker_x.max(court.net_x + ATTACK_LINE_X + BALL_RADIUS),
        court.net_top,
    );
    let apex = pos.y.max(target.y) + tweaks.toss_lift;
    let Some(lob) = calculate_lob(pos, target, apex, tweaks.ball_gravity) else {
        return;
    };
    velocity.0 = lob.velocity;
    rally.touch(Side::Player, RallyPhase::Toss);
    bus.emit(GameEvent::Set { pos: pos2(pos) });
}

/// Floor or side-line contact ends the rally
pub fn check_dead_ball(
    court: Res<Court>,
    rules: Res<MatchRules>,
    mut rally: ResMut<Rally>,
    mut score: ResMut<Score>,
    mut banner: ResMut<MessageBanner>,
    mut bus: ResMut<EventBus>,
    mut balls: Query<(&Transform, &Velocity, &mut BallState, &BallContacts), With<Ball>>,
) {
    let Ok((transform, velocity, mut state, contacts)) = balls.single_mut() else {
        return;
    };
    if *state != BallState::Live {
        return;
    }
    let pos = transform.translation.truncate();
    let Some((winner, reason)) =
        classify_dead_ball(pos, velocity.0, contacts.floor, &court, rally.last_touch)
    else {
        return;
    };

    bus.emit(match reason {
        PointReason::Out => GameEvent::Out { pos: pos2(pos) },
        _ => GameEvent::Land { pos: pos2(pos) },
    });
    award_point(
        &mut rally,
        &mut score,
        &rules,
        &mut banner,
        &mut bus,
        &mut state,
        winner,
        reason,
    );
}

/// After the point pause, hand the ball to the point winner
pub fn advance_point_timer(
    time: Res<Time>,
    mut rally: ResMut<Rally>,
    mut banner: ResMut<MessageBanner>,
) {
    let RallyPhase::PointScored { timer, next_server } = &mut rally.phase else {
        return;
    };
    *timer -= time.delta_secs();
    if *timer > 0.0 {
        return;
    }
    let server = *next_server;
    rally.start_serve(server);
    if server == Side::Player {
        banner.show("Your serve!");
    }
}

/// Sampled ball ticks for the debug log
pub fn emit_ball_ticks(
    rally: Res<Rally>,
    logger: Option<ResMut<EventLogger>>,
    mut bus: ResMut<EventBus>,
    balls: Query<(&Transform, &Velocity, &BallState), With<Ball>>,
) {
    let Some(mut logger) = logger else {
        return;
    };
    if !logger.should_log_tick(bus.elapsed_ms()) {
        return;
    }
    let Ok((transform, velocity, state)) = balls.single() else {
        return;
    };
    bus.emit(GameEvent::Tick {
        frame: rally.ticks,
        ball_pos: pos2(transform.translation.truncate()),
        ball_vel: pos2(velocity.0),
        ball_state: state.code(),
        phase: rally.phase.label().to_string(),
    });
}
