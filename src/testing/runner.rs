//! Test execution engine
//!
//! Each scenario runs in its own headless match app. The setup is written
//! straight into the world after the startup update, then one fixed tick is
//! simulated per scripted frame.

use bevy::prelude::*;
use std::collections::HashMap;

use crate::ai::CpuBrain;
use crate::ball::{Ball, BallState, Velocity};
use crate::countdown::MatchCountdown;
use crate::court::Side;
use crate::events::EventBus;
use crate::input::PlayerInput;
use crate::player::{Avatar, Role};
use crate::rally::{Rally, RallyPhase};
use crate::scoring::{MatchRules, Score};
use crate::simulation::HeadlessAppBuilder;
use crate::ui::MessageBanner;

use super::assertions::{
    AssertionError, BallSnapshot, CapturedEvent, WorldState, check_absent, check_sequence,
    check_state,
};
use super::parser::{FrameInput, TestDefinition, TestSetup, parse_ball_state, parse_phase};

/// Result of running a test
#[derive(Debug)]
pub enum TestResult {
    Pass { frames: u64 },
    Fail { error: AssertionError },
    Error { message: String },
}

impl TestResult {
    pub fn is_pass(&self) -> bool {
        matches!(self, TestResult::Pass { .. })
    }
}

/// Run a single test and return the result
pub fn run_test(test: &TestDefinition) -> TestResult {
    if let Err(message) = test.validate() {
        return TestResult::Error { message };
    }

    let setup = &test.setup;
    let defaults = MatchRules::default();
    let rules = MatchRules {
        win_score: setup.win_score.unwrap_or(defaults.win_score),
        win_by_two: setup.win_by_two.unwrap_or(defaults.win_by_two),
    };
    let mut builder = HeadlessAppBuilder::new()
        .with_seed(setup.seed.unwrap_or(0))
        .with_rules(rules)
        .with_default_tuning()
        .with_minimal_threads();
    if let Some(profile) = &setup.cpu_profile {
        builder = builder.with_cpu_profile(profile);
    }
    if !setup.countdown {
        builder = builder.without_countdown();
    }
    let mut app = builder.build();

    // Startup spawns the court, teams and ball; no fixed tick runs yet
    app.update();
    let mut captured = drain_events(&mut app, 0);
    apply_setup(app.world_mut(), setup);

    let last_frame = test.last_frame();
    let mut checks: Vec<_> = test.expect.state.iter().collect();
    checks.sort_by_key(|c| c.after_frame);
    let mut next_check = 0;

    for frame in 0..=last_frame {
        inject_inputs(
            app.world_mut(),
            test.input.iter().filter(|i| i.frame == frame),
        );
        app.update();
        captured.extend(drain_events(&mut app, frame));

        while let Some(check) = checks.get(next_check)
            && check.after_frame == frame
        {
            let state = extract_world_state(app.world_mut());
            if let Err(error) = check_state(check, &state) {
                return TestResult::Fail { error };
            }
            next_check += 1;
        }
    }

    if let Err(error) = check_sequence(&test.expect.sequence, &captured) {
        return TestResult::Fail { error };
    }
    if let Err(error) = check_absent(&test.expect.absent, &captured) {
        return TestResult::Fail { error };
    }

    TestResult::Pass {
        frames: last_frame + 1,
    }
}

/// Take everything the bus flushed this update, tagged with `frame`
fn drain_events(app: &mut App, frame: u64) -> Vec<CapturedEvent> {
    let mut bus = app.world_mut().resource_mut::<EventBus>();
    let events = bus
        .processed()
        .iter()
        .map(|e| CapturedEvent::new(frame, e.event.clone()))
        .collect();
    bus.clear_processed();
    events
}

/// Write the scenario's starting position into the world
fn apply_setup(world: &mut World, setup: &TestSetup) {
    if let Some(phase) = setup.phase.as_deref().and_then(parse_phase) {
        let mut rally = world.resource_mut::<Rally>();
        match phase {
            RallyPhase::Ready => {}
            RallyPhase::Serving { server } => rally.start_serve(server),
            RallyPhase::Incoming => rally.touch(Side::Cpu, RallyPhase::Incoming),
            other => rally.touch(Side::Player, other),
        }
    }

    if let Some(def) = setup.score {
        let mut score = world.resource_mut::<Score>();
        score.player = def.player;
        score.cpu = def.cpu;
    }

    if let Some(def) = &setup.ball {
        let state = def
            .state
            .as_deref()
            .and_then(parse_ball_state)
            .unwrap_or(BallState::Live);
        let mut balls =
            world.query_filtered::<(&mut Transform, &mut Velocity, &mut BallState), With<Ball>>();
        for (mut transform, mut velocity, mut ball_state) in balls.iter_mut(world) {
            transform.translation.x = def.x;
            transform.translation.y = def.y;
            velocity.0 = Vec2::new(def.velocity_x, def.velocity_y);
            *ball_state = state;
        }
    }

    if !setup.avatars.is_empty() {
        let mut avatars = world
            .query_filtered::<(&mut Transform, &Side, &Role), (With<Avatar>, Without<Ball>)>();
        for def in &setup.avatars {
            let Some(target) = def.target() else {
                continue;
            };
            for (mut transform, side, role) in avatars.iter_mut(world) {
                if (*side, *role) == target {
                    transform.translation.x = def.x;
                }
            }
        }
    }
}

/// Per-frame input: presses last one frame, the pointer and hold carry over
fn inject_inputs<'a>(world: &mut World, inputs: impl Iterator<Item = &'a FrameInput>) {
    let mut input = world.resource_mut::<PlayerInput>();
    *input = PlayerInput {
        pointer: input.pointer,
        tap_held: input.tap_held,
        ..Default::default()
    };

    for frame_input in inputs {
        if frame_input.tap {
            input.tap_pressed = true;
        }
        if let Some([x, y]) = frame_input.pointer {
            input.pointer = Some(Vec2::new(x, y));
        }
        if let Some([x, y]) = frame_input.press {
            input.press_at(Vec2::new(x, y));
        }
        if let Some([x, y]) = frame_input.release {
            input.release_at(Vec2::new(x, y));
        }
        input.pause_pressed |= frame_input.pause;
        input.restart_pressed |= frame_input.restart;
    }
}

/// Snapshot everything state checks can look at
fn extract_world_state(world: &mut World) -> WorldState {
    let rally = world.resource::<Rally>();
    let score = world.resource::<Score>();
    let banner = world.resource::<MessageBanner>();
    let mut state = WorldState {
        phase: rally.phase.label().to_string(),
        paused: rally.paused,
        countdown: world.resource::<MatchCountdown>().active,
        score_player: score.player,
        score_cpu: score.cpu,
        message: if banner.is_visible() {
            banner.text.clone()
        } else {
            String::new()
        },
        ..Default::default()
    };

    let mut balls = world.query_filtered::<(&Transform, &Velocity, &BallState), With<Ball>>();
    if let Ok((transform, velocity, ball_state)) = balls.single(world) {
        state.ball = Some(BallSnapshot {
            x: transform.translation.x,
            y: transform.translation.y,
            vx: velocity.0.x,
            vy: velocity.0.y,
            state: match ball_state {
                BallState::Held => "held",
                BallState::Live => "live",
                BallState::Dead => "dead",
            }
            .to_string(),
        });
    }

    let mut avatars = world.query_filtered::<(&Transform, &Side, &Role), With<Avatar>>();
    let positions: HashMap<String, f32> = avatars
        .iter(world)
        .map(|(transform, side, role)| {
            let key = match side {
                Side::Player => role.name().to_string(),
                Side::Cpu => "cpu".to_string(),
            };
            (key, transform.translation.x)
        })
        .collect();
    state.avatars = positions;

    let mut brains = world.query::<&CpuBrain>();
    if let Some(brain) = brains.iter(world).next() {
        state.cpu_goal = brain.goal.label().to_string();
    }

    state
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> TestDefinition {
        toml::from_str(toml).unwrap()
    }

    #[test]
    fn test_cpu_serves_first() {
        let test = parse(
            r#"
name = "CPU serve"
frames = 90

[[expect.sequence]]
event = "MatchStart"

[[expect.sequence]]
event = "Serve"
side = "cpu"
frame_min = 50
frame_max = 70

[[expect.state]]
after_frame = 5
checks = ["phase == serving", "ball.state == held", "countdown == false"]
"#,
        );
        let result = run_test(&test);
        assert!(result.is_pass(), "{:?}", result);
    }

    #[test]
    fn test_setup_places_score_and_avatars() {
        let test = parse(
            r#"
name = "Setup"

[setup]
score = { player = 4, cpu = 7 }
avatars = [{ role = "setter", x = 180.0 }]

[[expect.state]]
after_frame = 0
checks = ["score.player == 4", "score.cpu == 7", "setter.x == 180", "cpu.x < 0"]
"#,
        );
        let result = run_test(&test);
        assert!(result.is_pass(), "{:?}", result);
    }

    #[test]
    fn test_failed_check_is_reported() {
        let test = parse(
            r#"
name = "Wrong"

[[expect.state]]
after_frame = 1
checks = ["score.cpu == 5"]
"#,
        );
        match run_test(&test) {
            TestResult::Fail { error } => assert!(error.message.contains("score.cpu")),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_setup_is_error() {
        let test = parse("name = \"Bad\"\n[setup]\nphase = \"halftime\"");
        assert!(matches!(run_test(&test), TestResult::Error { .. }));
    }

    #[test]
    fn test_pause_input_pauses() {
        let test = parse(
            r#"
name = "Pause"

[[input]]
frame = 2
pause = true

[[expect.sequence]]
event = "Pause"
frame_min = 2
frame_max = 2

[[expect.state]]
after_frame = 10
checks = ["paused == true"]
"#,
        );
        let result = run_test(&test);
        assert!(result.is_pass(), "{:?}", result);
    }
}
