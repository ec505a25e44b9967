//! Practice session summary

use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::state::{PracticeState, PracticeZone, ServeResult};

/// Session summary for JSON output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PracticeSummary {
    pub session_id: String,
    pub serves: u32,
    pub points: u32,
    pub max_points: u32,
    pub too_short: u32,
    pub short: u32,
    pub mid: u32,
    pub deep: u32,
    pub out: u32,
    pub average_power: f32,
    pub duration_secs: f32,
    pub attempts: Vec<ServeResult>,
}

impl PracticeSummary {
    pub fn from_state(state: &PracticeState) -> Self {
        let serves = state.attempts();
        let average_power = if serves == 0 {
            0.0
        } else {
            state.results.iter().map(|r| r.power).sum::<f32>() / serves as f32
        };

        Self {
            session_id: state.session_id.clone(),
            serves,
            points: state.points(),
            max_points: state.max_points(),
            too_short: state.count(PracticeZone::TooShort),
            short: state.count(PracticeZone::Short),
            mid: state.count(PracticeZone::Mid),
            deep: state.count(PracticeZone::Deep),
            out: state.count(PracticeZone::Out),
            average_power,
            duration_secs: state.elapsed,
            attempts: state.results.clone(),
        }
    }

    /// Write summary to JSON file
    pub fn write_to_file(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

/// Write `summary.json` into the session directory, returning its path
pub fn write_session_summary(state: &PracticeState) -> std::io::Result<PathBuf> {
    fs::create_dir_all(&state.session_dir)?;
    let path = state.session_dir.join("summary.json");
    PracticeSummary::from_state(state).write_to_file(&path)?;
    println!("\nSession summary written to: {}", path.display());
    Ok(path)
}

/// Print session summary to console
pub fn print_session_summary(state: &PracticeState) {
    let summary = PracticeSummary::from_state(state);

    println!("\n========================================");
    println!("       SERVE PRACTICE COMPLETE");
    println!("========================================");
    println!();
    println!("  SCORE: {} / {}", summary.points, summary.max_points);
    println!(
        "  Deep {}  Mid {}  Short {}  Too short {}  Out {}",
        summary.deep, summary.mid, summary.short, summary.too_short, summary.out
    );
    println!("  Average power: {:.0}%", summary.average_power * 100.0);
    println!();

    for r in &state.results {
        println!(
            "  Serve {:>2}: {:<7} {} pts  (power {:>3.0}%, x {:.0})",
            r.attempt,
            r.zone.label(),
            r.zone.points(),
            r.power * 100.0,
            r.landing_x
        );
    }

    println!("========================================");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts_zones() {
        let mut state = PracticeState::new(4);
        state.record(0.2, -100.0, PracticeZone::TooShort);
        state.record(0.6, -300.0, PracticeZone::Mid);
        state.record(0.8, -420.0, PracticeZone::Deep);
        state.record(1.0, -500.0, PracticeZone::Out);
        let summary = PracticeSummary::from_state(&state);
        assert_eq!(summary.serves, 4);
        assert_eq!(summary.points, 5);
        assert_eq!(summary.max_points, 12);
        assert_eq!((summary.too_short, summary.mid, summary.deep, summary.out), (1, 1, 1, 1));
        assert!((summary.average_power - 0.65).abs() < 1e-5);
    }

    #[test]
    fn test_summary_written_as_json() {
        let mut state = PracticeState::new(1);
        state.session_dir =
            std::env::temp_dir().join(format!("volleyball_practice_{}", std::process::id()));
        state.record(0.5, -250.0, PracticeZone::Mid);
        let path = write_session_summary(&state).unwrap();
        let json = fs::read_to_string(&path).unwrap();
        let parsed: PracticeSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.points, 2);
        assert_eq!(parsed.attempts[0].zone, PracticeZone::Mid);
        let _ = fs::remove_dir_all(&state.session_dir);
    }
}
