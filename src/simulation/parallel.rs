//! Parallel simulation execution
//!
//! Uses Rayon to run multiple matches concurrently.
//! Each match runs in its own Bevy app with minimal threading
//! to avoid hitting OS thread limits.

use rayon::prelude::*;

use crate::ai::CpuProfileDatabase;

use super::config::SimConfig;
use super::metrics::MatchResult;
use super::runner::run_match;

/// Initialize parallel execution with the given thread count.
/// Call this once at startup before running parallel simulations.
pub fn init_parallel(threads: usize) -> Result<(), String> {
    if threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .map_err(|e| format!("Failed to initialize Rayon thread pool: {}", e))?;
    }
    // If threads == 0, use Rayon's default (auto-detect)
    Ok(())
}

/// Configuration for a single match in a batch
#[derive(Debug, Clone)]
pub struct MatchSpec {
    /// Config with the profile for this match filled in
    pub config: SimConfig,
    /// RNG seed for this match
    pub seed: u64,
}

/// The same matchup `count` times, seeds counting up from `base_seed`
pub fn multi_match_specs(base: &SimConfig, count: u32, base_seed: u64) -> Vec<MatchSpec> {
    (0..count)
        .map(|i| MatchSpec {
            config: base.clone(),
            seed: base_seed.wrapping_add(i as u64),
        })
        .collect()
}

/// `matches_per_profile` matches against each profile
pub fn sweep_specs(
    base: &SimConfig,
    profiles: &[String],
    matches_per_profile: u32,
    base_seed: u64,
) -> Vec<MatchSpec> {
    let mut specs = Vec::new();
    let mut match_num = 0u64;
    for profile in profiles {
        for _ in 0..matches_per_profile {
            let mut config = base.clone();
            config.cpu_profile = profile.clone();
            specs.push(MatchSpec {
                config,
                seed: base_seed.wrapping_add(match_num),
            });
            match_num += 1;
        }
    }
    specs
}

/// Run a batch of matches in parallel.
/// Returns results in the same order as specs.
pub fn run_matches_parallel(specs: &[MatchSpec], profile_db: &CpuProfileDatabase) -> Vec<MatchResult> {
    specs
        .par_iter()
        .map(|spec| run_match(&spec.config, spec.seed, profile_db))
        .collect()
}
