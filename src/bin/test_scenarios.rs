//! Scenario test runner CLI
//!
//! Usage:
//!   cargo run --bin test-scenarios                       # Run all tests
//!   cargo run --bin test-scenarios -- rally/             # Run category
//!   cargo run --bin test-scenarios -- rally/receive_miss # Run single test
//!   cargo run --bin test-scenarios -- --list             # List tests without running
//!   cargo run --bin test-scenarios -- --verbose          # Show expected/actual on failure

use std::env;
use std::path::{Path, PathBuf};

use volleyball::testing::{SCENARIOS_DIR, TestResult, discover_scenarios, parse_test_file, run_test};

#[derive(Default)]
struct Options {
    verbose: bool,
    list: bool,
    filter: Option<String>,
}

fn parse_options(args: &[String]) -> Options {
    let mut options = Options::default();
    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--verbose" | "-v" => options.verbose = true,
            "--list" | "-l" => options.list = true,
            other if !other.starts_with('-') => options.filter = Some(other.to_string()),
            other => eprintln!("Unknown flag: {}", other),
        }
    }
    options
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let options = parse_options(&args);

    let base = Path::new(SCENARIOS_DIR);
    if !base.exists() {
        println!("No scenarios directory found at {}", SCENARIOS_DIR);
        std::process::exit(1);
    }

    let tests = discover_scenarios(base, options.filter.as_deref());
    if tests.is_empty() {
        println!("No scenarios match {:?}", options.filter.as_deref().unwrap_or("*"));
        std::process::exit(1);
    }

    if options.list {
        for path in &tests {
            let name = describe(base, path);
            match parse_test_file(path) {
                Ok(def) => println!("{:<32} {}", name, def.name),
                Err(e) => println!("{:<32} (invalid: {})", name, e),
            }
        }
        return;
    }

    println!("Scenario Tests");
    println!("==============\n");

    let mut passed = 0;
    let mut failures: Vec<String> = Vec::new();
    let mut category = String::new();

    for path in &tests {
        let rel = path.strip_prefix(base).unwrap_or(path);
        let dir = rel
            .parent()
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_default();
        if dir != category {
            if !category.is_empty() {
                println!();
            }
            if !dir.is_empty() {
                println!("{}/", dir);
            }
            category = dir;
        }

        let stem = rel
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let result = match parse_test_file(path) {
            Ok(def) => run_test(&def),
            Err(message) => TestResult::Error { message },
        };
        print_result(&stem, &result, options.verbose);

        if result.is_pass() {
            passed += 1;
        } else {
            failures.push(describe(base, path));
        }
    }

    println!("\n==============");
    println!("Results: {} passed, {} failed", passed, failures.len());
    if !failures.is_empty() {
        for name in &failures {
            println!("  - {}", name);
        }
        std::process::exit(1);
    }
}

/// Scenario path relative to the scenarios dir, without extension
fn describe(base: &Path, path: &Path) -> String {
    let rel: PathBuf = path.strip_prefix(base).unwrap_or(path).with_extension("");
    rel.to_string_lossy().to_string()
}

fn print_result(name: &str, result: &TestResult, verbose: bool) {
    let dots = ".".repeat(40 - name.len().min(39));

    match result {
        TestResult::Pass { frames } => {
            println!("  {} {} PASS ({} frames)", name, dots, frames);
        }
        TestResult::Fail { error } => {
            println!("  {} {} FAIL", name, dots);
            if verbose {
                println!("    {}", error);
            } else {
                println!("    {}", error.message);
            }
        }
        TestResult::Error { message } => {
            println!("  {} {} ERROR", name, dots);
            println!("    {}", message);
        }
    }
}
