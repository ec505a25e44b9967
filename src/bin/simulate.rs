//! Match Simulation Tool - headless matches against the CPU
//!
//! An auto-player with a configurable skill takes the human's place, so CPU
//! profiles and tuning changes can be compared without rendering.
//!
//! Usage:
//!   cargo run --bin simulate -- --help
//!   cargo run --bin simulate -- --cpu Ace --skill 0.7 --seed 42
//!   cargo run --bin simulate -- --matches 50 --parallel 8
//!   cargo run --bin simulate -- --sweep 20 --output sweep.json

use volleyball::simulation::{SimConfig, run_simulation};

fn main() {
    let config = SimConfig::from_args();
    if let Err(e) = run_simulation(config) {
        eprintln!("Simulation failed: {}", e);
        std::process::exit(1);
    }
}
