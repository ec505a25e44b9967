//! Rally module - match flow from serve to game over
//!
//! `MatchPlugin` wires the rally, ball, CPU and drag systems into FixedUpdate.
//! Rendering, input capture and the HUD are added by the binaries.

mod judge;
mod phase;
mod systems;

pub use judge::*;
pub use phase::*;
pub use systems::*;

use bevy::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::ai::{CpuProfileDatabase, cpu_decision, cpu_move, cpu_return};
use crate::ball::{
    apply_velocity, ball_floor_collision, ball_gravity, ball_net_collision, ball_spin,
};
use crate::constants::PHYSICS_HZ;
use crate::countdown::{MatchCountdown, not_in_countdown, tick_countdown};
use crate::court::Court;
use crate::events::{EventBus, flush_event_log, update_event_bus_time};
use crate::input::PlayerInput;
use crate::player::{DragState, drag_avatars};
use crate::scoring::{MatchRules, Score};
use crate::tuning::PhysicsTweaks;
use crate::ui::{MessageBanner, tick_message};

/// Seeded random source for serve targets and CPU rolls.
/// Headless runs pass a seed so matches can be replayed.
#[derive(Resource)]
pub struct GameRng {
    pub rng: StdRng,
    pub seed: u64,
}

impl GameRng {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::seeded(rand::random())
    }
}

/// Match resources and the fixed-tick rally pipeline.
/// Resources already inserted by the caller are kept.
pub struct MatchPlugin;

impl Plugin for MatchPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(Time::<Fixed>::from_hz(PHYSICS_HZ))
            .init_resource::<Court>()
            .init_resource::<PhysicsTweaks>()
            .init_resource::<CpuProfileDatabase>()
            .init_resource::<MatchRules>()
            .init_resource::<Score>()
            .init_resource::<Rally>()
            .init_resource::<PendingRestart>()
            .init_resource::<MatchCountdown>()
            .init_resource::<MessageBanner>()
            .init_resource::<GameRng>()
            .init_resource::<DragState>()
            .init_resource::<PlayerInput>()
            .init_resource::<EventBus>()
            .add_systems(Startup, spawn_match)
            .add_systems(
                FixedUpdate,
                (
                    update_event_bus_time,
                    handle_match_controls,
                    apply_restart,
                    tick_countdown.run_if(not_paused),
                    (
                        tick_rally_clock,
                        begin_first_serve,
                        drag_avatars,
                        cpu_decision,
                        cpu_move,
                        hold_and_serve,
                        handle_tap,
                        ball_gravity,
                        apply_velocity,
                        ball_spin,
                        ball_net_collision,
                        ball_floor_collision,
                        auto_set,
                        cpu_return,
                        check_dead_ball,
                        advance_point_timer,
                        tick_message,
                        emit_ball_ticks,
                    )
                        .chain()
                        .run_if(not_in_countdown.and(not_paused)),
                )
                    .chain(),
            )
            .add_systems(Last, flush_event_log);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ball::{Ball, BallState, Velocity};
    use crate::constants::*;
    use crate::court::Side;
    use crate::events::GameEvent;
    use crate::player::{Avatar, Role};

    fn match_app(rules: MatchRules) -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(bevy::time::TimeUpdateStrategy::ManualDuration(
                std::time::Duration::from_secs_f64(1.0 / PHYSICS_HZ),
            ))
            .insert_resource(CpuProfileDatabase::builtin())
            .insert_resource(GameRng::seeded(11))
            .insert_resource(MatchCountdown::headless())
            .insert_resource(rules)
            .add_plugins(MatchPlugin);
        app
    }

    fn run(app: &mut App, ticks: usize) {
        for _ in 0..ticks {
            app.update();
        }
    }

    fn ball(app: &mut App) -> (Vec2, Vec2, BallState) {
        let world = app.world_mut();
        let mut q = world.query_filtered::<(&Transform, &Velocity, &BallState), With<Ball>>();
        let (t, v, s) = q.single(world).unwrap();
        (t.translation.truncate(), v.0, *s)
    }

    fn phase(app: &App) -> RallyPhase {
        app.world().resource::<Rally>().phase
    }

    fn tap(app: &mut App) {
        app.world_mut().resource_mut::<PlayerInput>().tap_pressed = true;
    }

    /// Run until `pred` holds, returning false if it never does
    fn run_until(app: &mut App, max_ticks: usize, pred: impl Fn(&mut App) -> bool) -> bool {
        for _ in 0..max_ticks {
            app.update();
            if pred(app) {
                return true;
            }
        }
        false
    }

    #[test]
    fn test_spawns_court_teams_and_ball() {
        let mut app = match_app(MatchRules::default());
        app.update();
        let world = app.world_mut();
        let avatars = world
            .query_filtered::<(&Side, &Role), With<Avatar>>()
            .iter(world)
            .map(|(s, r)| (*s, *r))
            .collect::<Vec<_>>();
        assert_eq!(avatars.len(), 4);
        assert_eq!(avatars.iter().filter(|(s, _)| *s == Side::Player).count(), 3);
        assert!(avatars.contains(&(Side::Cpu, Role::Receiver)));
        let (_, _, state) = ball(&mut app);
        assert_eq!(state, BallState::Held);
    }

    #[test]
    fn test_cpu_serves_after_countdown() {
        let mut app = match_app(MatchRules::default());
        // Countdown plus the serve delay, with slack
        let served = run_until(&mut app, 300, |app| phase(app) == RallyPhase::Incoming);
        assert!(served, "CPU never served, phase {:?}", phase(&app));
        let (pos, vel, state) = ball(&mut app);
        assert_eq!(state, BallState::Live);
        assert!(pos.x < 0.0);
        assert!(vel.x > 0.0, "serve should head to the player side");
        let bus = app.world().resource::<EventBus>();
        assert!(
            bus.history()
                .any(|e| matches!(e.event, GameEvent::Serve { side: Side::Cpu, .. }))
        );
    }

    #[test]
    fn test_ignored_serve_lands_for_cpu_point() {
        let mut app = match_app(MatchRules::default());
        let scored = run_until(&mut app, 900, |app| {
            matches!(phase(app), RallyPhase::PointScored { .. })
        });
        assert!(scored);
        let score = app.world().resource::<Score>();
        assert_eq!((score.player, score.cpu), (0, 1));
        assert!(matches!(
            phase(&app),
            RallyPhase::PointScored {
                next_server: Side::Cpu,
                ..
            }
        ));
    }

    #[test]
    fn test_early_tap_is_receive_miss() {
        let mut app = match_app(MatchRules::default());
        // Tap just after the serve crosses the net, far above the receive window
        let window_y = Court::default().above_floor(RECEIVE_ZONE_HEIGHT);
        let crossed = run_until(&mut app, 400, |app| {
            let (pos, _, state) = ball(app);
            state == BallState::Live && pos.x > 0.0 && pos.y > window_y + 60.0
        });
        assert!(crossed);
        tap(&mut app);
        app.update();
        let score = app.world().resource::<Score>();
        assert_eq!(score.cpu, 1);
        assert_eq!(
            app.world().resource::<MessageBanner>().text,
            "Receive miss!"
        );
    }

    #[test]
    fn test_perfect_receive_gets_set_and_tossed() {
        let mut app = match_app(MatchRules::default());
        assert!(run_until(&mut app, 300, |app| phase(app) == RallyPhase::Incoming));

        // Walk the receiver under the serve's predicted contact point
        let court = Court::default();
        let window_y = court.above_floor(RECEIVE_ZONE_HEIGHT);
        let (pos, vel, _) = ball(&mut app);
        let landing_x = crate::ai::predict_x_at_height(pos, vel, BALL_GRAVITY, window_y).unwrap();
        {
            let world = app.world_mut();
            let mut q = world.query::<(&mut Transform, &Side, &Role)>();
            for (mut t, side, role) in q.iter_mut(world) {
                if *side == Side::Player && *role == Role::Receiver {
                    t.translation.x = landing_x;
                }
            }
        }

        // Tap as the ball comes down into the window
        let in_window = run_until(&mut app, 300, |app| {
            let (pos, vel, _) = ball(app);
            vel.y < 0.0 && (pos.y - window_y).abs() < 10.0
        });
        assert!(in_window);
        tap(&mut app);
        app.update();
        assert_eq!(phase(&app), RallyPhase::Set);

        // Receive is aimed at the setter, who tosses automatically
        let tossed = run_until(&mut app, 300, |app| phase(app) == RallyPhase::Toss);
        assert!(tossed, "no toss, phase {:?}", phase(&app));
    }

    #[test]
    fn test_pause_freezes_ball() {
        let mut app = match_app(MatchRules::default());
        assert!(run_until(&mut app, 300, |app| phase(app) == RallyPhase::Incoming));
        app.world_mut().resource_mut::<PlayerInput>().pause_pressed = true;
        app.update();
        let (before, _, _) = ball(&mut app);
        run(&mut app, 30);
        let (after, _, _) = ball(&mut app);
        assert_eq!(before, after);
        assert!(app.world().resource::<Rally>().paused);

        // Taps while paused are dropped
        tap(&mut app);
        app.update();
        assert!(!app.world().resource::<PlayerInput>().tap_pressed);
        assert_eq!(app.world().resource::<Score>().cpu, 0);
    }

    #[test]
    fn test_game_over_and_restart() {
        let rules = MatchRules {
            win_score: 1,
            win_by_two: false,
        };
        let mut app = match_app(rules);
        let over = run_until(&mut app, 900, |app| {
            matches!(phase(app), RallyPhase::GameOver { .. })
        });
        assert!(over);
        assert_eq!(phase(&app), RallyPhase::GameOver { winner: Side::Cpu });
        assert_eq!(app.world().resource::<MessageBanner>().text, "CPU WINS");

        // A tap in game over restarts
        tap(&mut app);
        run(&mut app, 2);
        assert_eq!(app.world().resource::<Score>().cpu, 0);
        assert!(app.world().resource::<MatchCountdown>().active);
        let bus = app.world().resource::<EventBus>();
        assert!(bus.history().any(|e| e.event == GameEvent::Restart));
    }
}
