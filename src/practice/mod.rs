//! Serve practice minigame
//!
//! Charge with a held tap, release to serve into the CPU half and score by
//! landing zone. Runs as its own binary (`serve_practice`).

mod session;
mod state;
mod systems;

pub use session::*;
pub use state::*;
pub use systems::*;

use bevy::prelude::*;

use crate::ball::{
    apply_velocity, ball_floor_collision, ball_gravity, ball_net_collision, ball_spin,
};
use crate::constants::PHYSICS_HZ;
use crate::court::Court;
use crate::events::{EventBus, flush_event_log, update_event_bus_time};
use crate::input::PlayerInput;
use crate::rally::GameRng;
use crate::tuning::PhysicsTweaks;
use crate::ui::{MessageBanner, tick_message};

/// Practice resources and the fixed-tick serve pipeline
pub struct PracticePlugin;

impl Plugin for PracticePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(Time::<Fixed>::from_hz(PHYSICS_HZ))
            .init_resource::<Court>()
            .init_resource::<PhysicsTweaks>()
            .init_resource::<GameRng>()
            .init_resource::<PlayerInput>()
            .init_resource::<EventBus>()
            .init_resource::<MessageBanner>()
            .init_resource::<PracticeState>()
            .add_systems(Startup, spawn_practice)
            .add_systems(
                FixedUpdate,
                (
                    update_event_bus_time,
                    practice_restart,
                    hold_practice_ball,
                    practice_charge,
                    ball_gravity,
                    apply_velocity,
                    ball_spin,
                    ball_net_collision,
                    ball_floor_collision,
                    judge_practice_landing,
                    advance_practice,
                    tick_message,
                )
                    .chain(),
            )
            .add_systems(Last, flush_event_log);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;
    use crate::events::GameEvent;

    fn practice_app(total: u32) -> App {
        let mut state = PracticeState::new(total);
        state.save_summary = false;
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(bevy::time::TimeUpdateStrategy::ManualDuration(
                std::time::Duration::from_secs_f64(1.0 / PHYSICS_HZ),
            ))
            .insert_resource(GameRng::seeded(5))
            .insert_resource(state)
            .add_plugins(PracticePlugin);
        app.update();
        app
    }

    fn serve(app: &mut App, hold_ticks: usize) {
        let origin = serve_origin(&Court::default());
        app.world_mut().resource_mut::<PlayerInput>().press_at(origin);
        for _ in 0..hold_ticks {
            app.update();
        }
        app.world_mut().resource_mut::<PlayerInput>().release_at(origin);
        app.update();
    }

    fn run_until(app: &mut App, max_ticks: usize, pred: impl Fn(&App) -> bool) -> bool {
        for _ in 0..max_ticks {
            app.update();
            if pred(app) {
                return true;
            }
        }
        false
    }

    #[test]
    fn test_held_tap_charges_power() {
        let mut app = practice_app(3);
        let origin = serve_origin(&Court::default());
        app.world_mut().resource_mut::<PlayerInput>().press_at(origin);
        for _ in 0..30 {
            app.update();
        }
        let phase = app.world().resource::<PracticeState>().phase;
        let PracticePhase::Charging { power } = phase else {
            panic!("expected charging, got {:?}", phase);
        };
        // The press tick charges too
        let expected = 30.0 / 60.0 / PRACTICE_CHARGE_TIME;
        assert!((power - expected).abs() < 0.02, "power {power} vs {expected}");
    }

    #[test]
    fn test_serve_lands_and_scores() {
        let mut app = practice_app(3);
        // About two thirds power: aims into the Mid/Deep area
        serve(&mut app, 50);
        assert!(matches!(
            app.world().resource::<PracticeState>().phase,
            PracticePhase::InFlight { .. }
        ));

        let landed = run_until(&mut app, 600, |app| {
            matches!(
                app.world().resource::<PracticeState>().phase,
                PracticePhase::Result { .. }
            )
        });
        assert!(landed);

        let state = app.world().resource::<PracticeState>();
        assert_eq!(state.attempts(), 1);
        let result = &state.results[0];
        assert!(result.landing_x < 0.0, "serve should cross the net");
        assert_eq!(result.zone, PracticeZone::classify(result.landing_x, &Court::default()));

        let bus = app.world().resource::<EventBus>();
        assert!(
            bus.history()
                .any(|e| matches!(e.event, GameEvent::PracticeServe { attempt: 1, .. }))
        );

        // Result pause, then ready for the next serve
        let ready = run_until(&mut app, 200, |app| {
            app.world().resource::<PracticeState>().phase == PracticePhase::Ready
        });
        assert!(ready);
    }

    #[test]
    fn test_weakest_serve_still_crosses_the_net() {
        let court = Court::default();
        let tweaks = PhysicsTweaks::default();
        let (lob, target) =
            practice_serve(&court, &tweaks, 0.0, -PRACTICE_SPREAD).expect("serve path");
        assert!(lob.velocity.x < 0.0);
        assert!(target.x < court.net_x);
        assert_eq!(PracticeZone::classify(target.x, &court), PracticeZone::TooShort);
    }

    #[test]
    fn test_quick_tap_is_always_an_attempt() {
        for seed in 0..8 {
            let mut app = practice_app(1);
            app.insert_resource(GameRng::seeded(seed));
            serve(&mut app, 0);
            assert!(
                matches!(
                    app.world().resource::<PracticeState>().phase,
                    PracticePhase::InFlight { .. }
                ),
                "seed {seed}: tap did not serve"
            );
            assert!(
                run_until(&mut app, 600, |app| {
                    app.world().resource::<PracticeState>().attempts() == 1
                }),
                "seed {seed}: serve never landed"
            );
            let state = app.world().resource::<PracticeState>();
            assert_eq!(state.results[0].zone, PracticeZone::TooShort, "seed {seed}");
            assert_eq!(app.world().resource::<MessageBanner>().text, "Short!");
        }
    }

    #[test]
    fn test_full_power_sails_out() {
        let mut app = practice_app(1);
        serve(&mut app, 120);
        assert!(run_until(&mut app, 900, |app| {
            app.world().resource::<PracticeState>().attempts() == 1
        }));
        let state = app.world().resource::<PracticeState>();
        assert_eq!(state.results[0].zone, PracticeZone::Out);
        assert_eq!(state.points(), 0);
    }

    #[test]
    fn test_session_completes_and_restarts() {
        let mut app = practice_app(1);
        serve(&mut app, 40);
        let done = run_until(&mut app, 900, |app| {
            app.world().resource::<PracticeState>().phase == PracticePhase::Complete
        });
        assert!(done);
        assert!(
            app.world()
                .resource::<MessageBanner>()
                .text
                .starts_with("Done!")
        );

        // Taps do nothing once complete
        let origin = serve_origin(&Court::default());
        app.world_mut().resource_mut::<PlayerInput>().press_at(origin);
        app.update();
        assert_eq!(
            app.world().resource::<PracticeState>().phase,
            PracticePhase::Complete
        );

        app.world_mut().resource_mut::<PlayerInput>().restart_pressed = true;
        app.update();
        let state = app.world().resource::<PracticeState>();
        assert_eq!(state.attempts(), 0);
        assert!(!state.save_summary);
    }
}
