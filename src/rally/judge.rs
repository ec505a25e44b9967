//! Rally judges - pure rules for taps, contacts and dead balls

use bevy::prelude::*;

use crate::ball::BallState;
use crate::constants::*;
use crate::court::{Court, Side};
use crate::player::Role;
use crate::rally::phase::{PointReason, RallyPhase};
use crate::tuning::PhysicsTweaks;

/// What a tap does in the current situation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    Ignored,
    Serve,
    Receive,
    ReceiveMiss,
    Spike,
    SpikeMiss,
    Restart,
}

/// Ball height is inside the receive window
pub fn in_receive_window(y: f32, court: &Court, tolerance: f32) -> bool {
    (y - court.above_floor(RECEIVE_ZONE_HEIGHT)).abs() <= tolerance
}

/// Ball is past the attack line and within `tolerance` of the net top
pub fn in_spike_window(pos: Vec2, court: &Court, tolerance: f32) -> bool {
    pos.x > court.net_x + ATTACK_LINE_X && (pos.y - court.net_top).abs() <= tolerance
}

/// Ball fell through `level` during the last tick
pub fn crossed_downward(y: f32, vy: f32, dt: f32, level: f32) -> bool {
    vy < 0.0 && y <= level && y - vy * dt > level
}

/// Any avatar with `role` (or any role if None) within `reach` of `x`
fn within_reach(avatars: &[(Role, f32)], role: Option<Role>, x: f32, reach: f32) -> bool {
    avatars
        .iter()
        .filter(|(r, _)| role.is_none_or(|want| *r == want))
        .any(|(_, ax)| (ax - x).abs() <= reach)
}

/// Decide what a tap does. `avatars` lists the player team as (role, x).
pub fn judge_tap(
    phase: RallyPhase,
    ball_state: BallState,
    ball_pos: Vec2,
    ball_vel: Vec2,
    avatars: &[(Role, f32)],
    court: &Court,
    tweaks: &PhysicsTweaks,
) -> TapOutcome {
    match phase {
        RallyPhase::Serving { server: Side::Player } => return TapOutcome::Serve,
        RallyPhase::GameOver { .. } => return TapOutcome::Restart,
        RallyPhase::Incoming | RallyPhase::Toss => {}
        _ => return TapOutcome::Ignored,
    }

    if ball_state != BallState::Live || court.side_of(ball_pos.x) != Side::Player {
        return TapOutcome::Ignored;
    }

    if phase == RallyPhase::Incoming {
        // Ball still travelling away from the player
        if ball_vel.x <= 0.0 {
            return TapOutcome::Ignored;
        }
        let ok = in_receive_window(ball_pos.y, court, tweaks.receive_tolerance)
            && within_reach(avatars, None, ball_pos.x, tweaks.receive_reach);
        return if ok {
            TapOutcome::Receive
        } else {
            TapOutcome::ReceiveMiss
        };
    }

    let ok = in_spike_window(ball_pos, court, tweaks.spike_tolerance)
        && within_reach(avatars, Some(Role::Attacker), ball_pos.x, tweaks.spike_reach);
    if ok {
        TapOutcome::Spike
    } else {
        TapOutcome::SpikeMiss
    }
}

/// Decide whether a live ball is dead this tick, and who wins the point
pub fn classify_dead_ball(
    pos: Vec2,
    vel: Vec2,
    touched_floor: bool,
    court: &Court,
    last_touch: Option<Side>,
) -> Option<(Side, PointReason)> {
    if court.is_out(pos.x) {
        let winner = match last_touch {
            Some(side) => side.opponent(),
            // Moving right means the CPU side sent it out
            None if vel.x > 0.0 => Side::Player,
            None => Side::Cpu,
        };
        return Some((winner, PointReason::Out));
    }
    if touched_floor {
        let landed = court.side_of(pos.x);
        return Some((landed.opponent(), PointReason::Floor));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team() -> Vec<(Role, f32)> {
        vec![
            (Role::Receiver, PLAYER_RECEIVER_X),
            (Role::Setter, PLAYER_SETTER_X),
            (Role::Attacker, PLAYER_ATTACKER_X),
        ]
    }

    fn receive_y(court: &Court) -> f32 {
        court.above_floor(RECEIVE_ZONE_HEIGHT)
    }

    #[test]
    fn test_receive_inside_window_and_reach() {
        let court = Court::default();
        let tweaks = PhysicsTweaks::default();
        let pos = Vec2::new(250.0, receive_y(&court) + 10.0);
        let out = judge_tap(
            RallyPhase::Incoming,
            BallState::Live,
            pos,
            Vec2::new(200.0, -300.0),
            &team(),
            &court,
            &tweaks,
        );
        assert_eq!(out, TapOutcome::Receive);
    }

    #[test]
    fn test_receive_too_high_is_a_miss() {
        let court = Court::default();
        let tweaks = PhysicsTweaks::default();
        let pos = Vec2::new(250.0, receive_y(&court) + 31.0);
        let out = judge_tap(
            RallyPhase::Incoming,
            BallState::Live,
            pos,
            Vec2::new(200.0, -300.0),
            &team(),
            &court,
            &tweaks,
        );
        assert_eq!(out, TapOutcome::ReceiveMiss);
    }

    #[test]
    fn test_receive_out_of_reach_is_a_miss() {
        let court = Court::default();
        let tweaks = PhysicsTweaks::default();
        // Nobody stands near x=460
        let avatars = vec![(Role::Receiver, 100.0)];
        let pos = Vec2::new(460.0, receive_y(&court));
        let out = judge_tap(
            RallyPhase::Incoming,
            BallState::Live,
            pos,
            Vec2::new(200.0, -300.0),
            &avatars,
            &court,
            &tweaks,
        );
        assert_eq!(out, TapOutcome::ReceiveMiss);
    }

    #[test]
    fn test_tap_ignored_on_cpu_side_or_moving_away() {
        let court = Court::default();
        let tweaks = PhysicsTweaks::default();
        let y = receive_y(&court);
        let cpu_side = judge_tap(
            RallyPhase::Incoming,
            BallState::Live,
            Vec2::new(-100.0, y),
            Vec2::new(200.0, 0.0),
            &team(),
            &court,
            &tweaks,
        );
        assert_eq!(cpu_side, TapOutcome::Ignored);
        let moving_away = judge_tap(
            RallyPhase::Incoming,
            BallState::Live,
            Vec2::new(240.0, y),
            Vec2::new(-50.0, 0.0),
            &team(),
            &court,
            &tweaks,
        );
        assert_eq!(moving_away, TapOutcome::Ignored);
    }

    #[test]
    fn test_spike_window() {
        let court = Court::default();
        let tweaks = PhysicsTweaks::default();
        let good = Vec2::new(PLAYER_ATTACKER_X, court.net_top);
        let vel = Vec2::new(-30.0, -100.0);
        assert_eq!(
            judge_tap(RallyPhase::Toss, BallState::Live, good, vel, &team(), &court, &tweaks),
            TapOutcome::Spike
        );

        // Too close to the net
        let near_net = Vec2::new(ATTACK_LINE_X - 1.0, good.y);
        assert_eq!(
            judge_tap(RallyPhase::Toss, BallState::Live, near_net, vel, &team(), &court, &tweaks),
            TapOutcome::SpikeMiss
        );

        // Attacker dragged away
        let avatars = vec![(Role::Attacker, 400.0), (Role::Setter, PLAYER_ATTACKER_X)];
        assert_eq!(
            judge_tap(RallyPhase::Toss, BallState::Live, good, vel, &avatars, &court, &tweaks),
            TapOutcome::SpikeMiss
        );

        // Window edges around the net top
        assert!(in_spike_window(Vec2::new(good.x, court.net_top + 29.0), &court, 30.0));
        assert!(in_spike_window(Vec2::new(good.x, court.net_top - 29.0), &court, 30.0));
        assert!(!in_spike_window(Vec2::new(good.x, court.net_top + 80.0), &court, 30.0));
    }

    #[test]
    fn test_taps_in_other_phases() {
        let court = Court::default();
        let tweaks = PhysicsTweaks::default();
        let judge = |phase| {
            judge_tap(phase, BallState::Held, Vec2::ZERO, Vec2::ZERO, &team(), &court, &tweaks)
        };
        assert_eq!(judge(RallyPhase::Serving { server: Side::Player }), TapOutcome::Serve);
        assert_eq!(judge(RallyPhase::Serving { server: Side::Cpu }), TapOutcome::Ignored);
        assert_eq!(judge(RallyPhase::GameOver { winner: Side::Cpu }), TapOutcome::Restart);
        assert_eq!(judge(RallyPhase::Set), TapOutcome::Ignored);
        assert_eq!(judge(RallyPhase::Ready), TapOutcome::Ignored);
    }

    #[test]
    fn test_dead_ball_floor_sides() {
        let court = Court::default();
        let floor_y = court.floor_contact_y(BALL_RADIUS);
        assert_eq!(
            classify_dead_ball(Vec2::new(200.0, floor_y), Vec2::ZERO, true, &court, Some(Side::Cpu)),
            Some((Side::Cpu, PointReason::Floor))
        );
        assert_eq!(
            classify_dead_ball(Vec2::new(-200.0, floor_y), Vec2::ZERO, true, &court, Some(Side::Cpu)),
            Some((Side::Player, PointReason::Floor))
        );
        assert_eq!(
            classify_dead_ball(Vec2::new(-200.0, 50.0), Vec2::ZERO, false, &court, None),
            None
        );
    }

    #[test]
    fn test_dead_ball_out_goes_against_last_touch() {
        let court = Court::default();
        let pos = Vec2::new(-490.0, -100.0);
        assert_eq!(
            classify_dead_ball(pos, Vec2::new(-300.0, 0.0), false, &court, Some(Side::Player)),
            Some((Side::Cpu, PointReason::Out))
        );
        // No touch: direction of travel decides
        let pos = Vec2::new(490.0, -100.0);
        assert_eq!(
            classify_dead_ball(pos, Vec2::new(300.0, 0.0), true, &court, None),
            Some((Side::Player, PointReason::Out))
        );
    }

    #[test]
    fn test_crossed_downward() {
        let dt = 1.0 / 60.0;
        assert!(crossed_downward(99.0, -120.0, dt, 100.0));
        assert!(!crossed_downward(101.0, -120.0, dt, 100.0));
        assert!(!crossed_downward(99.0, 120.0, dt, 100.0));
        // Already well below the level last tick
        assert!(!crossed_downward(80.0, -120.0, dt, 100.0));
    }
}
