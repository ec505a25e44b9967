//! Ball physics systems
//!
//! Run in FixedUpdate in this order: gravity, velocity, spin, net, floor.
//! The collision helpers are plain functions so the rally judges and the
//! tests can drive them without an App.

use bevy::prelude::*;

use crate::ball::components::*;
use crate::constants::*;
use crate::court::Court;
use crate::events::{EventBus, GameEvent};
use crate::tuning::PhysicsTweaks;

/// Below this upward speed a floor bounce settles instead of jittering
const REST_SPEED: f32 = 30.0;

/// Which part of the net the ball touched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetContact {
    /// Bounced off the top of the net
    Tape,
    /// Hit the side of the net and was pushed back
    Face,
}

/// Spawn the ball, held above the given point
pub fn spawn_ball(commands: &mut Commands, position: Vec2) -> Entity {
    commands
        .spawn((
            Sprite::from_color(BALL_COLOR, Vec2::splat(BALL_RADIUS * 2.0)),
            Transform::from_xyz(position.x, position.y, 2.0),
            Ball,
            Velocity::default(),
            BallState::Held,
            BallSpin::default(),
            BallContacts::default(),
        ))
        .id()
}

/// Resolve overlap between the ball and the net rectangle.
/// Above the tape the ball bounces off the top; below it the horizontal velocity
/// is reflected and the ball is pushed back to the side it came from.
pub fn resolve_net_collision(
    pos: &mut Vec2,
    vel: &mut Vec2,
    court: &Court,
    radius: f32,
    net_bounce: f32,
    tape_bounce: f32,
) -> Option<NetContact> {
    let left = court.net_x - court.net_half_width;
    let right = court.net_x + court.net_half_width;
    let closest = Vec2::new(
        pos.x.clamp(left, right),
        pos.y.clamp(court.floor_top, court.net_top),
    );
    let offset = *pos - closest;
    if offset.length_squared() >= radius * radius {
        return None;
    }

    if pos.y > court.net_top {
        // Tape: push out along the contact normal, reflect the approaching component
        let normal = offset.normalize_or(Vec2::Y);
        *pos = closest + normal * radius;
        let approach = vel.dot(normal);
        if approach < 0.0 {
            *vel -= normal * approach * (1.0 + tape_bounce);
        }
        return Some(NetContact::Tape);
    }

    // Face: side decided by travel direction, position as a tiebreak
    let from_left = if vel.x.abs() > f32::EPSILON {
        vel.x > 0.0
    } else {
        pos.x < court.net_x
    };
    if from_left {
        pos.x = left - radius;
        vel.x = -vel.x.abs() * net_bounce;
    } else {
        pos.x = right + radius;
        vel.x = vel.x.abs() * net_bounce;
    }
    Some(NetContact::Face)
}

/// Bounce the ball off the floor. Returns true when the ball touched it.
pub fn resolve_floor_collision(
    pos: &mut Vec2,
    vel: &mut Vec2,
    court: &Court,
    radius: f32,
    bounce: f32,
    friction: f32,
) -> bool {
    let contact_y = court.floor_contact_y(radius);
    if pos.y >= contact_y {
        return false;
    }
    pos.y = contact_y;
    if vel.y < 0.0 {
        vel.y = -vel.y * bounce;
        vel.x *= friction;
        if vel.y < REST_SPEED {
            vel.y = 0.0;
        }
    }
    true
}

/// Apply gravity to the ball and clear last tick's contacts
pub fn ball_gravity(
    tweaks: Res<PhysicsTweaks>,
    mut query: Query<(&mut Velocity, &BallState, &mut BallContacts), With<Ball>>,
    time: Res<Time>,
) {
    let dt = time.delta_secs();

    for (mut velocity, state, mut contacts) in &mut query {
        *contacts = BallContacts::default();
        match state {
            BallState::Live | BallState::Dead => {
                velocity.0.y -= tweaks.ball_gravity * dt;
            }
            BallState::Held => {
                // Server positions the ball
                velocity.0 = Vec2::ZERO;
            }
        }
    }
}

/// Integrate ball position
pub fn apply_velocity(mut query: Query<(&mut Transform, &Velocity), With<Ball>>, time: Res<Time>) {
    let dt = time.delta_secs();

    for (mut transform, velocity) in &mut query {
        transform.translation.x += velocity.0.x * dt;
        transform.translation.y += velocity.0.y * dt;
    }
}

/// Spin the ball with its horizontal speed (clockwise when moving right)
pub fn ball_spin(
    tweaks: Res<PhysicsTweaks>,
    mut query: Query<(&mut Transform, &Velocity, &mut BallSpin), With<Ball>>,
    time: Res<Time>,
) {
    let dt = time.delta_secs();

    for (mut transform, velocity, mut spin) in &mut query {
        spin.0 = -velocity.0.x * tweaks.spin_factor;
        transform.rotate_z(spin.0 * dt);
    }
}

/// Net collision for the ball
pub fn ball_net_collision(
    court: Res<Court>,
    tweaks: Res<PhysicsTweaks>,
    mut bus: ResMut<EventBus>,
    mut query: Query<(&mut Transform, &mut Velocity, &BallState, &mut BallContacts), With<Ball>>,
) {
    for (mut transform, mut velocity, state, mut contacts) in &mut query {
        if *state == BallState::Held {
            continue;
        }
        let mut pos = transform.translation.truncate();
        let Some(contact) = resolve_net_collision(
            &mut pos,
            &mut velocity.0,
            &court,
            BALL_RADIUS,
            tweaks.net_bounce,
            tweaks.tape_bounce,
        ) else {
            continue;
        };

        transform.translation.x = pos.x;
        transform.translation.y = pos.y;
        contacts.net = true;
        if *state == BallState::Live {
            bus.emit(GameEvent::NetHit {
                pos: (pos.x, pos.y),
                tape: contact == NetContact::Tape,
            });
        }
    }
}

/// Floor collision for the ball
pub fn ball_floor_collision(
    court: Res<Court>,
    tweaks: Res<PhysicsTweaks>,
    mut query: Query<(&mut Transform, &mut Velocity, &BallState, &mut BallContacts), With<Ball>>,
) {
    for (mut transform, mut velocity, state, mut contacts) in &mut query {
        if *state == BallState::Held {
            continue;
        }
        let mut pos = transform.translation.truncate();
        if resolve_floor_collision(
            &mut pos,
            &mut velocity.0,
            &court,
            BALL_RADIUS,
            tweaks.floor_bounce,
            tweaks.floor_friction,
        ) {
            transform.translation.y = pos.y;
            contacts.floor = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_bounce_loses_energy() {
        let court = Court::default();
        let mut pos = Vec2::new(100.0, court.floor_top + 2.0);
        let mut vel = Vec2::new(200.0, -300.0);
        assert!(resolve_floor_collision(&mut pos, &mut vel, &court, BALL_RADIUS, 0.6, 0.9));
        assert_eq!(pos.y, court.floor_top + BALL_RADIUS);
        assert!((vel.y - 180.0).abs() < 0.001);
        assert!((vel.x - 180.0).abs() < 0.001);
    }

    #[test]
    fn test_floor_slow_bounce_settles() {
        let court = Court::default();
        let mut pos = Vec2::new(0.0, court.floor_top);
        let mut vel = Vec2::new(0.0, -12.0);
        assert!(resolve_floor_collision(&mut pos, &mut vel, &court, BALL_RADIUS, 0.6, 0.9));
        assert_eq!(vel.y, 0.0);
    }

    #[test]
    fn test_no_floor_contact_in_air() {
        let court = Court::default();
        let mut pos = Vec2::new(0.0, 0.0);
        let mut vel = Vec2::new(0.0, -100.0);
        assert!(!resolve_floor_collision(&mut pos, &mut vel, &court, BALL_RADIUS, 0.6, 0.9));
        assert_eq!(vel.y, -100.0);
    }

    #[test]
    fn test_net_face_reflects_back_to_origin_side() {
        let court = Court::default();
        // Moving right into the net from the CPU side
        let mut pos = Vec2::new(-5.0, -100.0);
        let mut vel = Vec2::new(300.0, -50.0);
        let contact = resolve_net_collision(&mut pos, &mut vel, &court, BALL_RADIUS, 1.0, 0.5);
        assert_eq!(contact, Some(NetContact::Face));
        assert_eq!(pos.x, -court.net_half_width - BALL_RADIUS);
        assert_eq!(vel.x, -300.0);
        assert_eq!(vel.y, -50.0);

        // Moving left from the player side
        let mut pos = Vec2::new(6.0, -200.0);
        let mut vel = Vec2::new(-120.0, 0.0);
        resolve_net_collision(&mut pos, &mut vel, &court, BALL_RADIUS, 1.0, 0.5);
        assert_eq!(pos.x, court.net_half_width + BALL_RADIUS);
        assert_eq!(vel.x, 120.0);
    }

    #[test]
    fn test_net_tape_bounces_up() {
        let court = Court::default();
        let mut pos = Vec2::new(0.0, court.net_top + 5.0);
        let mut vel = Vec2::new(0.0, -200.0);
        let contact = resolve_net_collision(&mut pos, &mut vel, &court, BALL_RADIUS, 1.0, 0.5);
        assert_eq!(contact, Some(NetContact::Tape));
        assert!((pos.y - (court.net_top + BALL_RADIUS)).abs() < 0.001);
        assert!((vel.y - 100.0).abs() < 0.001);
    }

    #[test]
    fn test_ball_clear_of_net_is_untouched() {
        let court = Court::default();
        let mut pos = Vec2::new(20.0, -100.0);
        let mut vel = Vec2::new(-100.0, 0.0);
        assert!(resolve_net_collision(&mut pos, &mut vel, &court, BALL_RADIUS, 1.0, 0.5).is_none());
        let mut pos = Vec2::new(0.0, court.net_top + BALL_RADIUS + 1.0);
        assert!(resolve_net_collision(&mut pos, &mut vel, &court, BALL_RADIUS, 1.0, 0.5).is_none());
    }

    #[test]
    fn test_gravity_reduces_vertical_velocity_each_tick() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(bevy::time::TimeUpdateStrategy::ManualDuration(
                std::time::Duration::from_secs_f64(1.0 / 60.0),
            ))
            .init_resource::<PhysicsTweaks>()
            .add_systems(Update, (ball_gravity, apply_velocity).chain());
        let ball = app
            .world_mut()
            .spawn((
                Transform::from_xyz(0.0, 100.0, 0.0),
                Ball,
                Velocity(Vec2::new(0.0, 50.0)),
                BallState::Live,
                BallContacts::default(),
            ))
            .id();

        // First update has zero delta
        app.update();
        let mut last = app.world().get::<Velocity>(ball).unwrap().0.y;
        for _ in 0..10 {
            app.update();
            let vy = app.world().get::<Velocity>(ball).unwrap().0.y;
            assert!(vy < last, "vy {vy} should drop below {last}");
            last = vy;
        }
    }

    #[test]
    fn test_held_ball_does_not_fall() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(bevy::time::TimeUpdateStrategy::ManualDuration(
                std::time::Duration::from_secs_f64(1.0 / 60.0),
            ))
            .init_resource::<PhysicsTweaks>()
            .add_systems(Update, (ball_gravity, apply_velocity).chain());
        let ball = app
            .world_mut()
            .spawn((
                Transform::from_xyz(-240.0, -130.0, 0.0),
                Ball,
                Velocity(Vec2::new(10.0, 10.0)),
                BallState::Held,
                BallContacts::default(),
            ))
            .id();
        for _ in 0..5 {
            app.update();
        }
        let t = app.world().get::<Transform>(ball).unwrap();
        assert_eq!(t.translation.truncate(), Vec2::new(-240.0, -130.0));
    }
}
