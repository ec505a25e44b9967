//! Debug overlay (F3): rally phase, ball state and CPU goal

use bevy::prelude::*;

use crate::ai::{CpuBrain, CpuProfileDatabase};
use crate::ball::{Ball, BallState, Velocity};
use crate::constants::*;
use crate::input::PlayerInput;
use crate::rally::Rally;
use crate::settings::CurrentSettings;

/// Debug settings resource
#[derive(Resource, Default)]
pub struct DebugSettings {
    pub visible: bool,
}

/// Debug text component
#[derive(Component)]
pub struct DebugText;

pub fn spawn_debug_text(commands: &mut Commands, visible: bool) {
    commands.spawn((
        Text2d::new(""),
        TextFont {
            font_size: 14.0,
            ..default()
        },
        TextColor(TEXT_PRIMARY),
        Transform::from_xyz(0.0, FLOOR_TOP - FLOOR_THICKNESS / 2.0, 10.0),
        if visible {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        },
        DebugText,
    ));
}

/// Toggle debug overlay visibility. The choice is remembered in init settings.
pub fn toggle_debug(
    mut input: ResMut<PlayerInput>,
    mut settings: ResMut<DebugSettings>,
    saved: Option<ResMut<CurrentSettings>>,
    mut text_query: Query<&mut Visibility, With<DebugText>>,
) {
    if !std::mem::take(&mut input.debug_pressed) {
        return;
    }
    settings.visible = !settings.visible;
    if let Some(mut saved) = saved {
        saved.settings.show_debug = settings.visible;
        saved.mark_dirty();
    }
    if let Ok(mut visibility) = text_query.single_mut() {
        *visibility = if settings.visible {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
    }
}

/// Update debug text display
pub fn update_debug_text(
    settings: Res<DebugSettings>,
    rally: Res<Rally>,
    profiles: Res<CpuProfileDatabase>,
    ball_query: Query<(&Transform, &Velocity, &BallState), With<Ball>>,
    brain_query: Query<&CpuBrain>,
    mut text_query: Query<&mut Text2d, With<DebugText>>,
) {
    if !settings.visible {
        return;
    }
    let Ok(mut text) = text_query.single_mut() else {
        return;
    };

    let ball = ball_query
        .single()
        .map(|(t, v, s)| {
            format!(
                "ball {:?} ({:.0},{:.0}) v({:.0},{:.0})",
                s, t.translation.x, t.translation.y, v.0.x, v.0.y
            )
        })
        .unwrap_or_else(|_| "no ball".to_string());
    let goal = brain_query
        .single()
        .map(|b| b.goal.label())
        .unwrap_or("-");
    let last = rally
        .last_touch
        .map(|s| s.code().to_string())
        .unwrap_or_else(|| "-".to_string());

    text.0 = format!(
        "{} | touches {} last {} | {} | cpu {} [{}]",
        rally.phase.label(),
        rally.touches,
        last,
        ball,
        profiles.current().name,
        goal,
    );
}
