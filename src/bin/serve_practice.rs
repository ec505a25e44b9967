//! Serve Practice - hold to charge, release to serve into the CPU half
//!
//! Usage:
//!   cargo run --bin serve_practice
//!   cargo run --bin serve_practice -- --serves 5
//!
//! Each landing zone scores: Deep 3, Mid 2, Short 1. Too short and out score
//! nothing. A session summary is written to practice_logs/ at the end.

use bevy::{camera::ScalingMode, prelude::*};
use volleyball::constants::*;
use volleyball::practice::{PracticePlugin, PracticeState, spawn_practice_hud, update_practice_hud};
use volleyball::{Court, CurrentSettings, input, tuning, ui};

fn parse_serves(args: &[String]) -> Option<u32> {
    args.iter()
        .position(|a| a == "--serves")
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        println!("Serve Practice");
        println!();
        println!("    --serves <N>    Serves in the session (default from config/init_settings.json)");
        println!();
        println!("Hold Space or the mouse to charge, release to serve. R restarts.");
        return;
    }

    let settings = CurrentSettings::default();
    let serves = parse_serves(&args).unwrap_or(settings.settings.practice_serves);

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                resolution: bevy::window::WindowResolution::new(
                    COURT_WIDTH as u32,
                    COURT_HEIGHT as u32,
                )
                .with_scale_factor_override(1.0),
                title: "Volleyball - Serve Practice".into(),
                resizable: true,
                ..default()
            }),
            ..default()
        }))
        .insert_resource(ClearColor(SKY_COLOR))
        .insert_resource(PracticeState::new(serves))
        .add_plugins(PracticePlugin)
        .add_systems(Startup, (tuning::load_global_tuning_system, setup))
        .add_systems(
            Update,
            (
                input::capture_input,
                update_practice_hud,
                ui::update_message_text,
            )
                .chain(),
        )
        .run();
}

fn setup(mut commands: Commands, court: Res<Court>) {
    commands.spawn((
        Camera2d,
        Projection::Orthographic(OrthographicProjection {
            scaling_mode: ScalingMode::FixedVertical {
                viewport_height: COURT_HEIGHT,
            },
            ..OrthographicProjection::default_2d()
        }),
    ));
    spawn_practice_hud(&mut commands, &court);
    ui::spawn_message_text(&mut commands);
}
