//! CPU decision, movement and return systems
//!
//! The CPU only ever acts with its receiver: it waits out its reaction time
//! once the player sends the ball over, walks under the predicted contact
//! point and, if the ball drops to contact height within reach, rolls its
//! return skill.

use bevy::prelude::*;
use rand::Rng;

use crate::ai::{CpuBrain, CpuGoal, CpuProfileDatabase, predict_x_at_height};
use crate::ball::{Ball, BallState, Velocity};
use crate::calculate_lob_clearing_net;
use crate::constants::*;
use crate::court::{Court, Side};
use crate::events::{EventBus, GameEvent};
use crate::helpers::{move_toward, random_floor_target};
use crate::player::HomeX;
use crate::rally::{GameRng, Rally, RallyPhase, crossed_downward};
use crate::tuning::PhysicsTweaks;

/// Pick the CPU goal for the current rally phase (FixedUpdate)
pub fn cpu_decision(
    time: Res<Time>,
    court: Res<Court>,
    tweaks: Res<PhysicsTweaks>,
    rally: Res<Rally>,
    profiles: Res<CpuProfileDatabase>,
    balls: Query<(&Transform, &Velocity, &BallState), With<Ball>>,
    mut cpus: Query<&mut CpuBrain, Without<Ball>>,
) {
    let profile = profiles.current();
    let ball = balls.single().ok();

    for mut brain in &mut cpus {
        match (rally.phase, ball) {
            (RallyPhase::Serving { server: Side::Cpu }, _) => {
                brain.goal = CpuGoal::Serve;
                brain.alerted = false;
                brain.whiffed = false;
            }
            (RallyPhase::Attack, Some((transform, velocity, BallState::Live))) => {
                if !brain.alerted {
                    brain.alerted = true;
                    brain.reaction_timer = profile.reaction_time;
                }
                if brain.reaction_timer > 0.0 {
                    brain.reaction_timer -= time.delta_secs();
                    continue;
                }
                let predicted = predict_x_at_height(
                    transform.translation.truncate(),
                    velocity.0,
                    tweaks.ball_gravity,
                    court.above_floor(CPU_CONTACT_HEIGHT),
                );
                brain.goal = match predicted {
                    Some(x) => CpuGoal::Intercept {
                        x: court.clamp_avatar_x(Side::Cpu, x, AVATAR_SIZE.x),
                    },
                    None => CpuGoal::ReturnToBase,
                };
            }
            _ => {
                brain.alerted = false;
                brain.whiffed = false;
                brain.goal = match rally.phase {
                    RallyPhase::GameOver { .. } => CpuGoal::Idle,
                    _ => CpuGoal::ReturnToBase,
                };
            }
        }
    }
}

/// Walk the CPU toward its goal at the profile's speed (FixedUpdate)
pub fn cpu_move(
    time: Res<Time>,
    court: Res<Court>,
    profiles: Res<CpuProfileDatabase>,
    mut cpus: Query<(&mut Transform, &HomeX, &CpuBrain), Without<Ball>>,
) {
    let step = profiles.current().move_speed * time.delta_secs();

    for (mut transform, home, brain) in &mut cpus {
        let target = match brain.goal {
            CpuGoal::Intercept { x } => x,
            CpuGoal::ReturnToBase => home.0,
            CpuGoal::Idle | CpuGoal::Serve => continue,
        };
        let x = transform.translation.x;
        if (target - x).abs() <= CPU_POSITION_TOLERANCE {
            continue;
        }
        transform.translation.x =
            court.clamp_avatar_x(Side::Cpu, move_toward(x, target, step), AVATAR_SIZE.x);
    }
}

/// Return the ball when it drops to contact height over the CPU (FixedUpdate)
#[allow(clippy::too_many_arguments)]
pub fn cpu_return(
    time: Res<Time>,
    court: Res<Court>,
    tweaks: Res<PhysicsTweaks>,
    profiles: Res<CpuProfileDatabase>,
    mut rng: ResMut<GameRng>,
    mut rally: ResMut<Rally>,
    mut bus: ResMut<EventBus>,
    mut balls: Query<(&Transform, &mut Velocity, &BallState), With<Ball>>,
    mut cpus: Query<(&Transform, &mut CpuBrain), Without<Ball>>,
) {
    if rally.phase != RallyPhase::Attack {
        return;
    }
    let Ok((transform, mut velocity, state)) = balls.single_mut() else {
        return;
    };
    let pos = transform.translation.truncate();
    if *state != BallState::Live || court.side_of(pos.x) != Side::Cpu {
        return;
    }
    let contact_y = court.above_floor(CPU_CONTACT_HEIGHT);
    if !crossed_downward(pos.y, velocity.0.y, time.delta_secs(), contact_y) {
        return;
    }

    let profile = profiles.current();
    for (cpu_transform, mut brain) in &mut cpus {
        if brain.whiffed || (cpu_transform.translation.x - pos.x).abs() > tweaks.cpu_reach {
            continue;
        }

        let skill = profile.return_skill.clamp(0.0, 1.0) as f64;
        if !rng.rng.gen_bool(skill) {
            brain.whiffed = true;
            bus.emit(GameEvent::CpuMiss { pos: (pos.x, pos.y) });
            debug!("CPU whiffed at {:.0},{:.0}", pos.x, pos.y);
            return;
        }

        let mut target = random_floor_target(&court, Side::Player, BALL_RADIUS, &mut rng.rng);
        if profile.aim_error > 0.0 {
            target.x += rng.rng.gen_range(-profile.aim_error..=profile.aim_error);
        }
        // Aim error never pulls the target closer to the net than a planned target
        target.x = target.x.max(court.net_x + TARGET_NET_MARGIN);

        let Some((lob, _)) = calculate_lob_clearing_net(
            pos,
            target,
            court.net_top + profile.serve_apex,
            court.net_x,
            court.net_clear_y(BALL_RADIUS),
            tweaks.ball_gravity,
        ) else {
            warn!("No CPU return path from {:?} to {:?}", pos, target);
            return;
        };

        velocity.0 = lob.velocity;
        rally.touch(Side::Cpu, RallyPhase::Incoming);
        bus.emit(GameEvent::CpuReturn {
            pos: (pos.x, pos.y),
            vel: (lob.velocity.x, lob.velocity.y),
        });
        return;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::CpuProfile;
    use crate::player::Avatar;

    fn cpu_app(profile: CpuProfile, phase: RallyPhase) -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(bevy::time::TimeUpdateStrategy::ManualDuration(
                std::time::Duration::from_secs_f64(1.0 / 60.0),
            ))
            .insert_resource(Court::default())
            .init_resource::<PhysicsTweaks>()
            .insert_resource(CpuProfileDatabase::from_profiles(vec![profile]))
            .insert_resource(GameRng::seeded(3))
            .insert_resource(EventBus::new())
            .insert_resource(Rally {
                phase,
                ..Default::default()
            })
            .add_systems(Update, (cpu_decision, cpu_move, cpu_return).chain());
        app
    }

    fn spawn_cpu(app: &mut App, x: f32) -> Entity {
        app.world_mut()
            .spawn((
                Transform::from_xyz(x, -225.0, 0.0),
                Avatar,
                Side::Cpu,
                HomeX(CPU_RECEIVER_X),
                CpuBrain::default(),
            ))
            .id()
    }

    fn spawn_ball(app: &mut App, pos: Vec2, vel: Vec2) -> Entity {
        app.world_mut()
            .spawn((
                Transform::from_translation(pos.extend(0.0)),
                Ball,
                Velocity(vel),
                BallState::Live,
            ))
            .id()
    }

    #[test]
    fn test_cpu_chases_predicted_contact_point() {
        let profile = CpuProfile {
            reaction_time: 0.0,
            ..Default::default()
        };
        let mut app = cpu_app(profile, RallyPhase::Attack);
        let cpu = spawn_cpu(&mut app, CPU_RECEIVER_X);
        // Ball falling straight down at x = -100
        spawn_ball(&mut app, Vec2::new(-100.0, 200.0), Vec2::ZERO);

        app.update();
        app.update();
        let brain = app.world().get::<CpuBrain>(cpu).unwrap();
        match brain.goal {
            CpuGoal::Intercept { x } => assert!((x + 100.0).abs() < 0.01),
            other => panic!("expected intercept, got {:?}", other),
        }
        let x = app.world().get::<Transform>(cpu).unwrap().translation.x;
        assert!(x > CPU_RECEIVER_X, "CPU should have moved toward the ball");
    }

    #[test]
    fn test_cpu_waits_out_reaction_time() {
        let profile = CpuProfile {
            reaction_time: 10.0,
            ..Default::default()
        };
        let mut app = cpu_app(profile, RallyPhase::Attack);
        let cpu = spawn_cpu(&mut app, CPU_RECEIVER_X);
        spawn_ball(&mut app, Vec2::new(-100.0, 200.0), Vec2::ZERO);
        for _ in 0..5 {
            app.update();
        }
        let brain = app.world().get::<CpuBrain>(cpu).unwrap();
        assert!(brain.alerted);
        assert!(!matches!(brain.goal, CpuGoal::Intercept { .. }));
    }

    #[test]
    fn test_cpu_walks_home_outside_attack() {
        let mut app = cpu_app(CpuProfile::default(), RallyPhase::Incoming);
        let cpu = spawn_cpu(&mut app, -100.0);
        spawn_ball(&mut app, Vec2::new(200.0, 0.0), Vec2::new(100.0, 0.0));
        for _ in 0..120 {
            app.update();
        }
        let x = app.world().get::<Transform>(cpu).unwrap().translation.x;
        assert!((x - CPU_RECEIVER_X).abs() <= CPU_POSITION_TOLERANCE);
    }

    #[test]
    fn test_perfect_cpu_returns_over_the_net() {
        let profile = CpuProfile {
            reaction_time: 0.0,
            return_skill: 1.0,
            aim_error: 0.0,
            ..Default::default()
        };
        let mut app = cpu_app(profile, RallyPhase::Attack);
        spawn_cpu(&mut app, -200.0);
        let court = Court::default();
        // Just above contact height, falling; crosses it on the next tick
        let contact = court.above_floor(CPU_CONTACT_HEIGHT);
        let ball = spawn_ball(&mut app, Vec2::new(-200.0, contact - 1.0), Vec2::new(0.0, -120.0));

        app.update();
        app.update();
        let rally = app.world().resource::<Rally>();
        assert_eq!(rally.phase, RallyPhase::Incoming);
        assert_eq!(rally.last_touch, Some(Side::Cpu));
        let v = app.world().get::<Velocity>(ball).unwrap().0;
        assert!(v.x > 0.0 && v.y > 0.0, "return should go up and toward the player: {v:?}");
    }

    #[test]
    fn test_wild_aim_never_turns_a_return_into_a_miss() {
        let court = Court::default();
        let contact = court.above_floor(CPU_CONTACT_HEIGHT);
        for seed in 0..12 {
            let profile = CpuProfile {
                reaction_time: 0.0,
                return_skill: 1.0,
                aim_error: 1000.0,
                ..Default::default()
            };
            let mut app = cpu_app(profile, RallyPhase::Attack);
            app.insert_resource(GameRng::seeded(seed));
            let cpu = spawn_cpu(&mut app, -200.0);
            let ball = spawn_ball(&mut app, Vec2::new(-200.0, contact - 1.0), Vec2::new(0.0, -120.0));

            app.update();
            app.update();
            assert!(!app.world().get::<CpuBrain>(cpu).unwrap().whiffed, "seed {seed}");
            assert_eq!(app.world().resource::<Rally>().phase, RallyPhase::Incoming, "seed {seed}");
            let v = app.world().get::<Velocity>(ball).unwrap().0;
            assert!(v.x > 0.0, "seed {seed}: return heads for the player side");
            assert!(
                !app.world()
                    .resource::<EventBus>()
                    .peek()
                    .iter()
                    .any(|e| matches!(e.event, GameEvent::CpuMiss { .. })),
                "seed {seed}"
            );
        }
    }

    #[test]
    fn test_hopeless_cpu_whiffs_once() {
        let profile = CpuProfile {
            reaction_time: 0.0,
            return_skill: 0.0,
            ..Default::default()
        };
        let mut app = cpu_app(profile, RallyPhase::Attack);
        let cpu = spawn_cpu(&mut app, -200.0);
        let court = Court::default();
        let contact = court.above_floor(CPU_CONTACT_HEIGHT);
        spawn_ball(&mut app, Vec2::new(-200.0, contact - 1.0), Vec2::new(0.0, -120.0));

        app.update();
        app.update();
        assert!(app.world().get::<CpuBrain>(cpu).unwrap().whiffed);
        assert_eq!(app.world().resource::<Rally>().phase, RallyPhase::Attack);
        let misses = app
            .world()
            .resource::<EventBus>()
            .peek()
            .iter()
            .filter(|e| matches!(e.event, GameEvent::CpuMiss { .. }))
            .count();
        assert_eq!(misses, 1);
    }
}
