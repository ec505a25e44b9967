//! Volleyball - A side-view arcade volleyball game built with Bevy
//!
//! Main entry point: app setup and system registration.

use bevy::{camera::ScalingMode, prelude::*};
use volleyball::events::{EventLogger, GameConfig};
use volleyball::settings::save_settings_system;
use volleyball::{
    ConfigWatcher, CpuProfileDatabase, CurrentSettings, DebugLogConfig, GameRng, MatchPlugin,
    MatchRules, PhysicsTweaks, config_watcher, constants::*, input, tuning, ui,
};

/// Command-line overrides for the saved settings
#[derive(Debug, Default)]
struct LaunchArgs {
    cpu_profile: Option<String>,
    win_score: Option<u32>,
    seed: Option<u64>,
}

fn print_help() {
    println!("Volleyball");
    println!();
    println!("USAGE:");
    println!("    cargo run -- [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    --cpu <NAME>        CPU profile (see assets/cpu_profiles.txt)");
    println!("    --win-score <N>     Points to win (0 = endless)");
    println!("    --seed <N>          Seed for serve targets and CPU rolls");
    println!("    --debug-log         Write a .evlog event log to logs/");
    println!("    -h, --help          Show this help");
    println!();
    println!("CONTROLS:");
    println!("    Space / click       Serve, receive, spike");
    println!("    Drag                Move your players along the floor");
    println!("    P / Esc             Pause");
    println!("    R                   Restart");
    println!("    F3                  Debug overlay");
}

fn parse_args(args: &[String]) -> LaunchArgs {
    let mut launch = LaunchArgs::default();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--cpu" => {
                i += 1;
                launch.cpu_profile = args.get(i).cloned();
            }
            "--win-score" => {
                i += 1;
                launch.win_score = args.get(i).and_then(|s| s.parse().ok());
            }
            "--seed" => {
                i += 1;
                launch.seed = args.get(i).and_then(|s| s.parse().ok());
            }
            "--debug-log" => {}
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            other => eprintln!("Unknown argument: {}", other),
        }
        i += 1;
    }
    launch
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let launch = parse_args(&args);

    // Load persistent settings (uses defaults if file doesn't exist)
    let current_settings = CurrentSettings::default();
    let settings = &current_settings.settings;

    let mut rules = settings.match_rules();
    if let Some(win_score) = launch.win_score {
        rules.win_score = win_score;
    }

    let mut profile_db = CpuProfileDatabase::default();
    let profile_name = launch.cpu_profile.as_deref().unwrap_or(&settings.cpu_profile);
    if !profile_db.select(profile_name) {
        warn!("Unknown CPU profile '{}', using {}", profile_name, profile_db.current().name);
    }

    let rng = launch.seed.map(GameRng::seeded).unwrap_or_default();
    let debug_visible = settings.show_debug;
    let log_config = DebugLogConfig::load_with_args(&args);

    let mut app = App::new();
    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            // Set scale_factor_override to 1.0 for consistent behavior on HiDPI displays
            resolution: bevy::window::WindowResolution::new(COURT_WIDTH as u32, COURT_HEIGHT as u32)
                .with_scale_factor_override(1.0),
            title: "Volleyball".into(),
            resizable: true,
            ..default()
        }),
        ..default()
    }))
    .insert_resource(ClearColor(SKY_COLOR))
    .insert_resource(rules)
    .insert_resource(profile_db)
    .insert_resource(rng)
    .insert_resource(current_settings)
    .insert_resource(ui::DebugSettings {
        visible: debug_visible,
    })
    .init_resource::<ConfigWatcher>()
    .add_plugins(MatchPlugin)
    .add_systems(Startup, (tuning::load_global_tuning_system, setup).chain())
    // Input is sampled every frame and consumed by the fixed-tick rally systems
    .add_systems(
        Update,
        (
            input::capture_input,
            ui::toggle_debug,
            ui::update_score_text,
            ui::update_status_text,
            ui::update_message_text,
            ui::update_debug_text,
        )
            .chain(),
    )
    .add_systems(
        Update,
        (config_watcher::check_config_changes, save_settings_system),
    );

    if log_config.enabled {
        app.insert_resource(EventLogger::new(log_config.event_log_config()))
            .add_systems(Startup, start_event_log.after(tuning::load_global_tuning_system));
    }

    app.run();
}

/// Camera and HUD. The court, teams and ball come from `MatchPlugin`.
fn setup(mut commands: Commands, debug: Res<ui::DebugSettings>) {
    // FixedVertical keeps the whole court height visible regardless of window size
    commands.spawn((
        Camera2d,
        Projection::Orthographic(OrthographicProjection {
            scaling_mode: ScalingMode::FixedVertical {
                viewport_height: COURT_HEIGHT,
            },
            ..OrthographicProjection::default_2d()
        }),
    ));

    ui::spawn_hud(&mut commands);
    ui::spawn_message_text(&mut commands);
    ui::spawn_debug_text(&mut commands, debug.visible);
}

/// Open the `.evlog` file and record the match configuration
fn start_event_log(
    mut logger: ResMut<EventLogger>,
    tweaks: Res<PhysicsTweaks>,
    rules: Res<MatchRules>,
    profiles: Res<CpuProfileDatabase>,
) {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
    logger.start_session(&timestamp);
    logger.log_config(GameConfig::new(&tweaks, &rules, &profiles.current().name));
}
