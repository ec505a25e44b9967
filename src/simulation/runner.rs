//! Headless simulation runner

use bevy::prelude::*;
use rand::Rng;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::ai::CpuProfileDatabase;
use crate::constants::{PHYSICS_HZ, START_DELAY};
use crate::events::{EventBuffer, EventBus, GameConfig, GameEvent};
use crate::rally::{Rally, RallyPhase};
use crate::scoring::{MatchRules, Score};
use crate::tuning::PhysicsTweaks;

use super::app_builder::HeadlessAppBuilder;
use super::autoplay::add_auto_player;
use super::config::{SimConfig, SimMode};
use super::metrics::{MatchResult, RallyStats, SweepResult, summarize};
use super::parallel::{
    MatchSpec, init_parallel, multi_match_specs, run_matches_parallel, sweep_specs,
};

/// Run a single match and return the result
pub fn run_match(config: &SimConfig, seed: u64, profile_db: &CpuProfileDatabase) -> MatchResult {
    let rules = MatchRules {
        win_score: config.win_score,
        win_by_two: config.win_by_two,
    };
    let mut builder = HeadlessAppBuilder::new()
        .with_seed(seed)
        .with_profile_db(profile_db.clone())
        .with_cpu_profile(&config.cpu_profile)
        .with_rules(rules);
    if config.parallel > 0 {
        builder = builder.with_minimal_threads();
    }
    let mut app = builder.build();
    add_auto_player(&mut app, config.player_skill);

    let mut buffer = config.log_events.then(|| {
        let mut buffer = EventBuffer::new();
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
        buffer.start_session(&timestamp);
        let world = app.world();
        let profile = world.resource::<CpuProfileDatabase>().current().name.clone();
        let game_config = GameConfig::new(world.resource::<PhysicsTweaks>(), &rules, &profile);
        buffer.log(0, GameEvent::Config(game_config));
        buffer
    });

    let mut stats = RallyStats::new();
    // Countdown plus play time, plus the zero-delta first update
    let max_updates = ((config.duration_limit + START_DELAY) as f64 * PHYSICS_HZ).ceil() as u64 + 1;

    for _ in 0..max_updates {
        app.update();

        let events = {
            let mut bus = app.world_mut().resource_mut::<EventBus>();
            let events = bus.processed().to_vec();
            bus.clear_processed();
            events
        };
        for e in &events {
            stats.record(&e.event);
        }
        if let Some(buffer) = buffer.as_mut() {
            buffer.import_events(events.into_iter().map(|e| (e.time_ms, e.event)));
        }

        let rally = app.world().resource::<Rally>();
        if matches!(rally.phase, RallyPhase::GameOver { .. }) || rally.elapsed >= config.duration_limit {
            break;
        }
    }
    stats.finalize();

    let world = app.world();
    let score = world.resource::<Score>();
    let rally = world.resource::<Rally>();
    let result = MatchResult {
        cpu_profile: world.resource::<CpuProfileDatabase>().current().name.clone(),
        player_skill: config.player_skill,
        seed,
        duration: rally.elapsed,
        score_player: score.player,
        score_cpu: score.cpu,
        winner: MatchResult::winner_from(rules.winner(score)),
        stats,
    };

    if let Some(buffer) = &buffer {
        match write_event_log(buffer, Path::new(&config.log_dir)) {
            Ok(path) => debug!("Event log written to {}", path.display()),
            Err(e) => warn!("Failed to write event log: {}", e),
        }
    }

    result
}

/// Write the event buffer to `<log_dir>/<session_id>.evlog`
fn write_event_log(buffer: &EventBuffer, log_dir: &Path) -> io::Result<PathBuf> {
    fs::create_dir_all(log_dir)?;
    let path = log_dir.join(format!("{}.evlog", buffer.session_id()));
    let mut file = File::create(&path)?;
    file.write_all(buffer.serialize().as_bytes())?;
    Ok(path)
}

/// Run specs in parallel or one after another with a progress line
fn run_specs(specs: &[MatchSpec], config: &SimConfig, profile_db: &CpuProfileDatabase) -> Vec<MatchResult> {
    if config.parallel > 0 {
        if !config.quiet {
            println!("Running {} matches on {} threads...", specs.len(), config.parallel);
        }
        return run_matches_parallel(specs, profile_db);
    }

    let mut results = Vec::with_capacity(specs.len());
    for (i, spec) in specs.iter().enumerate() {
        if !config.quiet {
            print!(
                "\rMatch {}/{} vs {}...",
                i + 1,
                specs.len(),
                spec.config.cpu_profile
            );
            io::stdout().flush().ok();
        }
        results.push(run_match(&spec.config, spec.seed, profile_db));
    }
    if !config.quiet {
        println!("\rCompleted {} matches.          ", specs.len());
    }
    results
}

/// Main simulation entry point
pub fn run_simulation(config: SimConfig) -> Result<(), String> {
    let profile_db = CpuProfileDatabase::default();
    init_parallel(config.parallel)?;
    let base_seed = config.seed.unwrap_or_else(|| rand::thread_rng().r#gen());

    match &config.mode {
        SimMode::Single => {
            if !config.quiet {
                println!(
                    "Running single match vs {} (skill {:.2}, seed: {})",
                    config.cpu_profile, config.player_skill, base_seed
                );
            }
            let result = run_match(&config, base_seed, &profile_db);
            output_json(&result, config.output_file.as_deref())?;
        }

        SimMode::MultiMatch { count } => {
            let specs = multi_match_specs(&config, *count, base_seed);
            let results = run_specs(&specs, &config, &profile_db);
            let refs: Vec<&MatchResult> = results.iter().collect();
            let summary = summarize(&refs);

            println!(
                "\nResults vs {}: {} wins - {} losses - {} unfinished",
                config.cpu_profile, summary.player_wins, summary.cpu_wins, summary.unfinished
            );
            println!(
                "Avg score: {:.1} - {:.1}, avg rally {:.2} contacts",
                summary.avg_score_player, summary.avg_score_cpu, summary.avg_rally
            );
            println!(
                "Receive rate {:.1}%, CPU return rate {:.1}%",
                summary.receive_rate * 100.0,
                summary.cpu_return_rate * 100.0
            );

            if let Some(output_file) = &config.output_file {
                output_json(&results, Some(output_file))?;
            }
        }

        SimMode::Sweep {
            matches_per_profile,
        } => {
            let profiles = sweep_profiles(&config, &profile_db);
            if profiles.is_empty() {
                return Err("No known CPU profiles to sweep".to_string());
            }
            if !config.quiet {
                println!(
                    "Running sweep: {} profiles, {} matches each",
                    profiles.len(),
                    matches_per_profile
                );
            }
            let specs = sweep_specs(&config, &profiles, *matches_per_profile, base_seed);
            let sweep = SweepResult::new(run_specs(&specs, &config, &profile_db));
            println!("{}", sweep.format_table());

            if let Some(output_file) = &config.output_file {
                output_json(&sweep, Some(output_file))?;
            }
        }
    }

    Ok(())
}

/// Profiles named in the config that exist, or every profile
fn sweep_profiles(config: &SimConfig, profile_db: &CpuProfileDatabase) -> Vec<String> {
    if config.profiles.is_empty() {
        return profile_db.names().into_iter().map(String::from).collect();
    }
    config
        .profiles
        .iter()
        .filter(|name| {
            let known = profile_db.index_of(name).is_some();
            if !known {
                warn!("Unknown CPU profile '{}' skipped", name);
            }
            known
        })
        .cloned()
        .collect()
}

/// Pretty JSON to a file, or stdout when no file is given
fn output_json<T: serde::Serialize>(value: &T, output_file: Option<&str>) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize results: {}", e))?;
    match output_file {
        Some(path) => {
            fs::write(path, json).map_err(|e| format!("Failed to write {}: {}", path, e))?;
            println!("Results written to {}", path);
        }
        None => println!("{}", json),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn short_match() -> SimConfig {
        SimConfig {
            win_score: 3,
            win_by_two: false,
            quiet: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_match_finishes_with_a_winner() {
        let db = CpuProfileDatabase::builtin();
        let result = run_match(&short_match(), 42, &db);
        assert_ne!(result.winner, "none");
        assert_eq!(result.score_player.max(result.score_cpu), 3);
        assert_eq!(result.stats.rallies(), result.score_player + result.score_cpu);
        assert!(result.stats.serves_cpu >= 1);
        assert_eq!(result.cpu_profile, "Balanced");
    }

    #[test]
    fn test_same_seed_same_match() {
        let db = CpuProfileDatabase::builtin();
        let a = run_match(&short_match(), 9, &db);
        let b = run_match(&short_match(), 9, &db);
        assert_eq!((a.score_player, a.score_cpu), (b.score_player, b.score_cpu));
        assert_eq!(a.stats.receives, b.stats.receives);
        assert_eq!(a.duration, b.duration);
    }

    #[test]
    fn test_time_limit_stops_endless_match() {
        let config = SimConfig {
            win_score: 0,
            duration_limit: 5.0,
            ..short_match()
        };
        let result = run_match(&config, 1, &CpuProfileDatabase::builtin());
        assert_eq!(result.winner, "none");
        assert!(result.duration <= 5.0 + 0.05);
    }

    #[test]
    fn test_event_log_is_written() {
        let dir = std::env::temp_dir().join(format!("volleyball_sim_{}", std::process::id()));
        let config = SimConfig {
            log_events: true,
            log_dir: dir.to_string_lossy().to_string(),
            ..short_match()
        };
        run_match(&config, 3, &CpuProfileDatabase::builtin());
        let logs: Vec<_> = fs::read_dir(&dir).unwrap().flatten().collect();
        assert_eq!(logs.len(), 1);
        let text = fs::read_to_string(logs[0].path()).unwrap();
        assert!(text.lines().next().unwrap().contains("|SE|"));
        assert!(text.contains("|MS|"));
        assert!(text.contains("|PT|"));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_sweep_profiles_filters_unknown() {
        let db = CpuProfileDatabase::builtin();
        let config = SimConfig {
            profiles: vec!["ace".to_string(), "Nobody".to_string()],
            ..Default::default()
        };
        assert_eq!(sweep_profiles(&config, &db), vec!["ace".to_string()]);
        assert_eq!(sweep_profiles(&SimConfig::default(), &db).len(), db.len());
    }
}
