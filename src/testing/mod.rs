//! Scenario testing system for deterministic game testing
//!
//! Scenarios are TOML files with a starting position, scripted per-frame
//! input and expectations on the events and state that follow. They run
//! against the headless match app.

pub mod assertions;
pub mod parser;
pub mod runner;

pub use assertions::{AssertionError, CapturedEvent, WorldState, check_sequence, check_state};
pub use parser::{
    ExpectedEvent, FrameInput, StateAssertion, TestDefinition, TestExpectations, TestSetup,
    parse_test_file,
};
pub use runner::{TestResult, run_test};

use std::fs;
use std::path::{Path, PathBuf};

/// Default path for test scenarios
pub const SCENARIOS_DIR: &str = "tests/scenarios";

/// All `.toml` files under `base`, sorted. `filter` keeps paths (relative to
/// `base`) that contain it, so "rally/" selects a category.
pub fn discover_scenarios(base: &Path, filter: Option<&str>) -> Vec<PathBuf> {
    let mut tests = Vec::new();
    discover_recursive(base, base, filter, &mut tests);
    tests.sort();
    tests
}

fn discover_recursive(base: &Path, current: &Path, filter: Option<&str>, tests: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(current) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            discover_recursive(base, &path, filter, tests);
        } else if path.extension().is_some_and(|e| e == "toml") {
            if let Some(f) = filter {
                let rel = path.strip_prefix(base).unwrap_or(&path).to_string_lossy();
                if !rel.contains(f) {
                    continue;
                }
            }
            tests.push(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenarios_root() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join(SCENARIOS_DIR)
    }

    #[test]
    fn test_discover_filters_by_category() {
        let root = scenarios_root();
        let all = discover_scenarios(&root, None);
        let rally = discover_scenarios(&root, Some("rally/"));
        assert!(!rally.is_empty());
        assert!(rally.len() < all.len());
        assert!(rally.iter().all(|p| p.to_string_lossy().contains("rally")));
    }

    #[test]
    fn test_bundled_scenarios_pass() {
        let files = discover_scenarios(&scenarios_root(), None);
        assert!(!files.is_empty(), "no scenarios under {}", SCENARIOS_DIR);

        let mut failures = Vec::new();
        for file in &files {
            let result = match parse_test_file(file) {
                Ok(test) => run_test(&test),
                Err(message) => TestResult::Error { message },
            };
            match result {
                TestResult::Pass { .. } => {}
                TestResult::Fail { error } => failures.push(format!("{}: {}", file.display(), error)),
                TestResult::Error { message } => failures.push(format!("{}: {}", file.display(), message)),
            }
        }
        assert!(failures.is_empty(), "{}", failures.join("\n"));
    }
}
