//! Headless App Builder
//!
//! Provides a reusable builder for creating headless Bevy apps that run the
//! full match pipeline. Used by the simulation runner, the scenario runner and
//! parallel execution.

use bevy::app::ScheduleRunnerPlugin;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use std::time::Duration;

use crate::ai::CpuProfileDatabase;
use crate::constants::PHYSICS_HZ;
use crate::countdown::MatchCountdown;
use crate::events::EventBus;
use crate::rally::{GameRng, MatchPlugin};
use crate::scoring::MatchRules;
use crate::tuning::{self, PhysicsTweaks};

/// Builder for creating headless Bevy apps
pub struct HeadlessAppBuilder {
    seed: u64,
    profile_db: Option<CpuProfileDatabase>,
    cpu_profile: Option<String>,
    rules: MatchRules,
    minimal_threads: bool,
    skip_countdown: bool,
    global_tuning: bool,
}

impl Default for HeadlessAppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessAppBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self {
            seed: 0,
            profile_db: None,
            cpu_profile: None,
            rules: MatchRules::default(),
            minimal_threads: false,
            skip_countdown: false,
            global_tuning: true,
        }
    }

    /// RNG seed for serve targets and CPU rolls
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the CPU profile database (default: built-in profiles)
    pub fn with_profile_db(mut self, profile_db: CpuProfileDatabase) -> Self {
        self.profile_db = Some(profile_db);
        self
    }

    /// Select a CPU profile by name
    pub fn with_cpu_profile(mut self, name: &str) -> Self {
        self.cpu_profile = Some(name.to_string());
        self
    }

    pub fn with_rules(mut self, rules: MatchRules) -> Self {
        self.rules = rules;
        self
    }

    /// Enable minimal thread mode (task pools = 1)
    ///
    /// Use this when running many apps in parallel to avoid hitting OS thread limits.
    pub fn with_minimal_threads(mut self) -> Self {
        self.minimal_threads = true;
        self
    }

    /// Start in play, with no countdown before the first serve
    pub fn without_countdown(mut self) -> Self {
        self.skip_countdown = true;
        self
    }

    /// Ignore `config/gameplay_tuning.json` and use the compiled-in values
    pub fn with_default_tuning(mut self) -> Self {
        self.global_tuning = false;
        self
    }

    /// Build the app with minimal plugins and the match pipeline
    ///
    /// Every `app.update()` advances virtual time by exactly one physics
    /// tick (the first update has zero delta), so FixedUpdate runs once per
    /// update after the first.
    pub fn build(self) -> App {
        let mut app = App::new();

        let tick = Duration::from_secs_f64(1.0 / PHYSICS_HZ);
        if self.minimal_threads {
            app.add_plugins(
                MinimalPlugins
                    .set(ScheduleRunnerPlugin::run_loop(tick))
                    .set(TaskPoolPlugin {
                        task_pool_options: TaskPoolOptions::with_num_threads(1),
                    }),
            );
        } else {
            app.add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(tick)));
        }
        app.insert_resource(TimeUpdateStrategy::ManualDuration(tick));

        let mut tweaks = PhysicsTweaks::default();
        if self.global_tuning {
            // Missing file keeps the defaults
            let _ = tuning::apply_global_tuning(&mut tweaks);
        }
        app.insert_resource(tweaks);

        let mut profile_db = self.profile_db.unwrap_or_else(CpuProfileDatabase::builtin);
        if let Some(name) = &self.cpu_profile
            && !profile_db.select(name)
        {
            warn!("Unknown CPU profile '{}', using {}", name, profile_db.current().name);
        }
        app.insert_resource(profile_db);

        let mut countdown = MatchCountdown::headless();
        if self.skip_countdown {
            countdown.finish();
        }
        app.insert_resource(countdown);
        app.insert_resource(self.rules);
        app.insert_resource(GameRng::seeded(self.seed));
        app.insert_resource(EventBus::new());

        app.add_plugins(MatchPlugin);
        app
    }
}
