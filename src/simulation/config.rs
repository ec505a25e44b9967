//! Simulation configuration

use serde::{Deserialize, Serialize};

/// Simulation mode
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum SimMode {
    /// Run a single match
    #[default]
    Single,
    /// Run multiple matches with same config
    MultiMatch { count: u32 },
    /// Play every CPU profile against the auto-player
    Sweep { matches_per_profile: u32 },
}

/// Configuration for a simulation run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Simulation mode
    pub mode: SimMode,
    /// CPU profile name
    pub cpu_profile: String,
    /// Chance (0-1) that the auto-player times a receive or spike correctly
    pub player_skill: f32,
    /// Points needed to win
    pub win_score: u32,
    /// Winner must lead by two
    pub win_by_two: bool,
    /// Match duration limit in seconds of play
    pub duration_limit: f32,
    /// RNG seed for reproducibility (None = random)
    pub seed: Option<u64>,
    /// Output file path (None = stdout)
    pub output_file: Option<String>,
    /// Suppress progress output
    pub quiet: bool,
    /// Number of parallel threads (0 = sequential, N = N threads)
    pub parallel: usize,
    /// Profiles to include in a sweep (empty = all profiles)
    pub profiles: Vec<String>,
    /// Write an .evlog per match
    pub log_events: bool,
    /// Directory for .evlog files
    pub log_dir: String,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            mode: SimMode::Single,
            cpu_profile: "Balanced".to_string(),
            player_skill: 0.8,
            win_score: crate::constants::DEFAULT_WIN_SCORE,
            win_by_two: true,
            duration_limit: 600.0,
            seed: None,
            output_file: None,
            quiet: false,
            parallel: 0, // Sequential by default
            profiles: Vec::new(), // Empty = all profiles
            log_events: false,
            log_dir: "logs/simulation".to_string(),
        }
    }
}

/// Template simulation settings (checked into git)
pub const SIM_SETTINGS_TEMPLATE: &str = "config/simulation_settings.template.json";
/// Local simulation settings (gitignored, user's custom settings)
pub const SIM_SETTINGS_FILE: &str = "config/simulation_settings.json";

impl SimConfig {
    /// Load configuration from a JSON settings file
    pub fn from_file(path: &str) -> Result<Self, String> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path, e))?;
        serde_json::from_str(&contents).map_err(|e| format!("Failed to parse {}: {}", path, e))
    }

    /// Load configuration from default config files
    /// Priority: local settings > template settings > built-in defaults
    pub fn from_config_files() -> Self {
        if let Ok(config) = Self::from_file(SIM_SETTINGS_FILE) {
            return config;
        }
        if let Ok(config) = Self::from_file(SIM_SETTINGS_TEMPLATE) {
            return config;
        }
        Self::default()
    }

    /// Parse configuration from command line arguments
    pub fn from_args() -> Self {
        let args: Vec<String> = std::env::args().collect();
        let mut config = Self::from_config_files();
        if args.iter().any(|a| a == "--help" || a == "-h") {
            print_help();
            std::process::exit(0);
        }
        config.apply_args(&args[1..]);
        config
    }

    /// Apply command line overrides. `--settings <FILE>` replaces the base
    /// config before any other flag is applied.
    pub fn apply_args(&mut self, args: &[String]) {
        if let Some(pos) = args.iter().position(|a| a == "--settings")
            && let Some(path) = args.get(pos + 1)
        {
            match Self::from_file(path) {
                Ok(loaded) => *self = loaded,
                Err(e) => eprintln!("Warning: {}", e),
            }
        }

        let mut i = 0;
        while i < args.len() {
            let value = args.get(i + 1);
            // Optional count after a mode flag
            let count = value.filter(|v| !v.starts_with('-')).and_then(|v| v.parse().ok());
            match args[i].as_str() {
                "--settings" => i += 1,
                "--cpu" => {
                    if let Some(v) = value {
                        self.cpu_profile = v.clone();
                        i += 1;
                    }
                }
                "--profiles" => {
                    if let Some(v) = value {
                        self.profiles = v
                            .split(',')
                            .map(|s| s.trim().to_string())
                            .filter(|s| !s.is_empty())
                            .collect();
                        i += 1;
                    }
                }
                "--skill" => {
                    if let Some(v) = value {
                        self.player_skill = v.parse::<f32>().unwrap_or(0.8).clamp(0.0, 1.0);
                        i += 1;
                    }
                }
                "--win-score" => {
                    if let Some(v) = value {
                        self.win_score = v.parse().unwrap_or(self.win_score);
                        i += 1;
                    }
                }
                "--no-win-by-two" => self.win_by_two = false,
                "--duration" => {
                    if let Some(v) = value {
                        self.duration_limit = v.parse().unwrap_or(self.duration_limit);
                        i += 1;
                    }
                }
                "--matches" => {
                    if let Some(n) = count {
                        self.mode = SimMode::MultiMatch { count: n };
                        i += 1;
                    }
                }
                "--sweep" => {
                    let n = match count {
                        Some(n) => {
                            i += 1;
                            n
                        }
                        None => 5,
                    };
                    self.mode = SimMode::Sweep {
                        matches_per_profile: n,
                    };
                }
                "--seed" => {
                    if let Some(v) = value {
                        self.seed = v.parse().ok();
                        i += 1;
                    }
                }
                "--output" => {
                    if let Some(v) = value {
                        self.output_file = Some(v.clone());
                        i += 1;
                    }
                }
                "--quiet" | "-q" => self.quiet = true,
                "--parallel" => {
                    if let Some(v) = value {
                        self.parallel = v.parse().unwrap_or(0);
                        i += 1;
                    }
                }
                "--log-events" => self.log_events = true,
                other => eprintln!("Warning: unknown argument '{}'", other),
            }
            i += 1;
        }
    }
}

fn print_help() {
    println!(
        r#"Volleyball Simulation - headless matches of an auto-player against CPU profiles

USAGE:
    cargo run --bin simulate -- [OPTIONS]

OPTIONS:
    --settings <FILE>   Load settings from JSON file (CLI args override file settings)
    --cpu <PROFILE>     CPU profile (default: Balanced)
    --profiles <LIST>   Comma-separated profile names for a sweep (e.g., "Rookie,Ace")
    --skill <0-1>       Auto-player timing skill (default: 0.8)
    --win-score <N>     Points needed to win (default: 11, 0 = play until --duration)
    --no-win-by-two     First to the win score wins outright
    --duration <SECS>   Match duration limit in seconds of play (default: 600)
    --matches <N>       Run N matches with same config
    --sweep [N]         Play every profile (N matches each, default: 5)
    --seed <N>          RNG seed for reproducibility
    --output <FILE>     Output JSON to file (default: stdout)
    --quiet, -q         Suppress progress output
    --parallel <N>      Run matches in parallel with N threads
    --log-events        Write an .evlog per match to logs/simulation/
    --help, -h          Show this help

EXAMPLES:
    # One match against the Ace profile
    cargo run --bin simulate -- --cpu Ace --seed 42

    # 100 matches on 8 threads
    cargo run --bin simulate -- --matches 100 --parallel 8 --quiet

    # Compare all profiles against a weak auto-player
    cargo run --bin simulate -- --sweep 20 --skill 0.5 --output sweep.json

SETTINGS FILE FORMAT (JSON):
    {{
      "profiles": ["Rookie", "Ace"],
      "player_skill": 0.7,
      "parallel": 8,
      "win_score": 15
    }}
"#
    );
}
