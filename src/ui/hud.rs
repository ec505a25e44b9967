//! HUD components and systems (score and status display)

use bevy::prelude::*;

use crate::constants::*;
use crate::countdown::MatchCountdown;
use crate::rally::{Rally, RallyPhase};
use crate::scoring::Score;

/// Score text component
#[derive(Component)]
pub struct ScoreText;

/// Pause / countdown / game-over status line
#[derive(Component)]
pub struct StatusText;

pub fn spawn_hud(commands: &mut Commands) {
    commands.spawn((
        Text2d::new("YOU: 0   CPU: 0"),
        TextFont {
            font_size: 28.0,
            ..default()
        },
        TextLayout::new_with_justify(bevy::text::Justify::Center),
        TextColor(TEXT_PRIMARY),
        Transform::from_xyz(0.0, COURT_HEIGHT / 2.0 - 30.0, 10.0),
        ScoreText,
    ));

    commands.spawn((
        Text2d::new(""),
        TextFont {
            font_size: 48.0,
            ..default()
        },
        TextLayout::new_with_justify(bevy::text::Justify::Center),
        TextColor(TEXT_ACCENT),
        Transform::from_xyz(0.0, 60.0, 10.0),
        StatusText,
    ));
}

/// Update score display
pub fn update_score_text(score: Res<Score>, mut text_query: Query<&mut Text2d, With<ScoreText>>) {
    if !score.is_changed() {
        return;
    }
    let Ok(mut text) = text_query.single_mut() else {
        return;
    };
    text.0 = format!("YOU: {}   CPU: {}", score.player, score.cpu);
}

/// What the status line should say right now
pub fn status_line(rally: &Rally, countdown: &MatchCountdown) -> String {
    if rally.paused {
        return "PAUSED".to_string();
    }
    if countdown.active {
        return countdown.label();
    }
    match rally.phase {
        RallyPhase::GameOver { .. } => "Tap or R to play again".to_string(),
        _ => String::new(),
    }
}

pub fn update_status_text(
    rally: Res<Rally>,
    countdown: Res<MatchCountdown>,
    mut text_query: Query<&mut Text2d, With<StatusText>>,
) {
    let Ok(mut text) = text_query.single_mut() else {
        return;
    };
    let line = status_line(&rally, &countdown);
    if text.0 != line {
        text.0 = line;
    }
}
