//! Avatar components and team spawning

use bevy::prelude::*;

use crate::ai::CpuBrain;
use crate::constants::*;
use crate::court::{Court, Side};
use crate::helpers::avatar_standing_y;

/// Marker for avatar entities (both teams)
#[derive(Component)]
pub struct Avatar;

/// What an avatar does in the rally
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// Takes the serve / CPU returns
    Receiver,
    /// Tosses the received ball to the attacker
    Setter,
    /// Spikes the toss
    Attacker,
}

impl Role {
    pub fn name(&self) -> &'static str {
        match self {
            Role::Receiver => "receiver",
            Role::Setter => "setter",
            Role::Attacker => "attacker",
        }
    }

    pub fn from_name(name: &str) -> Option<Role> {
        match name {
            "receiver" => Some(Role::Receiver),
            "setter" => Some(Role::Setter),
            "attacker" => Some(Role::Attacker),
            _ => None,
        }
    }
}

/// Player avatars that can be dragged. Holds the pointer x while grabbed.
#[derive(Component, Default, Debug)]
pub struct DragTarget(pub Option<f32>);

/// Home x of an avatar (restored on restart)
#[derive(Component, Clone, Copy, Debug)]
pub struct HomeX(pub f32);

/// Spawn the player team (receiver, setter, attacker) and the CPU receiver
pub fn spawn_teams(commands: &mut Commands, court: &Court) {
    let y = avatar_standing_y(AVATAR_SIZE.y);

    for (role, x, color) in [
        (Role::Receiver, PLAYER_RECEIVER_X, PLAYER_RECEIVER_COLOR),
        (Role::Setter, PLAYER_SETTER_X, PLAYER_SETTER_COLOR),
        (Role::Attacker, PLAYER_ATTACKER_X, PLAYER_ATTACKER_COLOR),
    ] {
        let x = court.clamp_avatar_x(Side::Player, x, AVATAR_SIZE.x);
        commands.spawn((
            Sprite::from_color(color, AVATAR_SIZE),
            Transform::from_xyz(x, y, 1.0),
            Avatar,
            Side::Player,
            role,
            DragTarget::default(),
            HomeX(x),
        ));
    }

    let cpu_x = court.clamp_avatar_x(Side::Cpu, CPU_RECEIVER_X, AVATAR_SIZE.x);
    commands.spawn((
        Sprite::from_color(CPU_COLOR, AVATAR_SIZE),
        Transform::from_xyz(cpu_x, y, 1.0),
        Avatar,
        Side::Cpu,
        Role::Receiver,
        CpuBrain::default(),
        HomeX(cpu_x),
    ));
}

/// Put every avatar back on its home spot
pub fn reset_avatars(avatars: &mut Query<(&mut Transform, &HomeX), With<Avatar>>) {
    for (mut transform, home) in avatars.iter_mut() {
        transform.translation.x = home.0;
    }
}
