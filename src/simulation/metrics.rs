//! Metrics collection for headless matches

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::court::Side;
use crate::events::GameEvent;

/// Rally counters for one match, built from the event stream
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RallyStats {
    pub serves_player: u32,
    pub serves_cpu: u32,
    pub receives: u32,
    pub receive_misses: u32,
    pub sets: u32,
    pub spikes: u32,
    pub spike_misses: u32,
    pub cpu_returns: u32,
    pub cpu_misses: u32,
    pub net_hits: u32,
    pub outs: u32,
    pub points_player: u32,
    pub points_cpu: u32,
    /// Most contacts (serve included) in one rally
    pub longest_rally: u32,
    /// Average contacts per rally (finalized after match)
    pub avg_rally: f32,
    /// Internal: contacts in the rally in progress
    #[serde(skip)]
    current_rally: u32,
    /// Internal: contacts summed over finished rallies
    #[serde(skip)]
    total_contacts: u32,
}

impl RallyStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one event
    pub fn record(&mut self, event: &GameEvent) {
        match event {
            GameEvent::Serve { side, .. } => {
                match side {
                    Side::Player => self.serves_player += 1,
                    Side::Cpu => self.serves_cpu += 1,
                }
                self.current_rally = 1;
            }
            GameEvent::Receive { .. } => {
                self.receives += 1;
                self.current_rally += 1;
            }
            GameEvent::ReceiveMiss { .. } => self.receive_misses += 1,
            GameEvent::Set { .. } => {
                self.sets += 1;
                self.current_rally += 1;
            }
            GameEvent::Spike { .. } => {
                self.spikes += 1;
                self.current_rally += 1;
            }
            GameEvent::SpikeMiss { .. } => self.spike_misses += 1,
            GameEvent::CpuReturn { .. } => {
                self.cpu_returns += 1;
                self.current_rally += 1;
            }
            GameEvent::CpuMiss { .. } => self.cpu_misses += 1,
            GameEvent::NetHit { .. } => self.net_hits += 1,
            GameEvent::Out { .. } => self.outs += 1,
            GameEvent::Point { winner, .. } => {
                match winner {
                    Side::Player => self.points_player += 1,
                    Side::Cpu => self.points_cpu += 1,
                }
                self.longest_rally = self.longest_rally.max(self.current_rally);
                self.total_contacts += self.current_rally;
                self.current_rally = 0;
            }
            _ => {}
        }
    }

    pub fn rallies(&self) -> u32 {
        self.points_player + self.points_cpu
    }

    /// Calculate derived statistics
    pub fn finalize(&mut self) {
        let rallies = self.rallies();
        if rallies > 0 {
            self.avg_rally = self.total_contacts as f32 / rallies as f32;
        }
    }

    /// Share of receive attempts that worked (0 if none were tried)
    pub fn receive_rate(&self) -> f32 {
        ratio(self.receives, self.receives + self.receive_misses)
    }

    /// Share of reachable balls the CPU sent back
    pub fn cpu_return_rate(&self) -> f32 {
        ratio(self.cpu_returns, self.cpu_returns + self.cpu_misses)
    }
}

fn ratio(part: u32, total: u32) -> f32 {
    if total == 0 {
        0.0
    } else {
        part as f32 / total as f32
    }
}

/// Result of a single match
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    /// CPU profile played against
    pub cpu_profile: String,
    /// Auto-player skill
    pub player_skill: f32,
    /// RNG seed used
    pub seed: u64,
    /// Seconds of play
    pub duration: f32,
    /// Final score
    pub score_player: u32,
    pub score_cpu: u32,
    /// Winner ("player", "cpu", or "none" if the time limit hit first)
    pub winner: String,
    pub stats: RallyStats,
}

impl MatchResult {
    pub fn winner_from(side: Option<Side>) -> String {
        match side {
            Some(Side::Player) => "player",
            Some(Side::Cpu) => "cpu",
            None => "none",
        }
        .to_string()
    }
}

/// Aggregate over all matches against one CPU profile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub matches: u32,
    pub player_wins: u32,
    pub cpu_wins: u32,
    pub unfinished: u32,
    pub avg_score_player: f32,
    pub avg_score_cpu: f32,
    pub avg_rally: f32,
    pub receive_rate: f32,
    pub cpu_return_rate: f32,
}

/// Results from a profile sweep
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SweepResult {
    pub matches: Vec<MatchResult>,
    /// Summary per profile, sorted by name
    pub profiles: BTreeMap<String, ProfileSummary>,
}

impl SweepResult {
    pub fn new(matches: Vec<MatchResult>) -> Self {
        let mut sweep = Self {
            matches,
            profiles: BTreeMap::new(),
        };
        sweep.calculate_stats();
        sweep
    }

    pub fn calculate_stats(&mut self) {
        let mut grouped: BTreeMap<String, Vec<&MatchResult>> = BTreeMap::new();
        for result in &self.matches {
            grouped.entry(result.cpu_profile.clone()).or_default().push(result);
        }

        self.profiles = grouped
            .into_iter()
            .map(|(name, results)| (name, summarize(&results)))
            .collect();
    }

    /// Format as ASCII table
    pub fn format_table(&self) -> String {
        let mut output = String::new();
        output.push_str("\nCPU Profile Results:\n\n");
        output.push_str(&format!(
            "{:>12} | {:>7} | {:>9} | {:>11} | {:>9} | {:>8} | {:>10}\n",
            "Profile", "Matches", "Win Rate", "Avg Score", "Avg Rally", "Receive", "CPU Return"
        ));
        output.push_str(&format!(
            "{:-<13}+{:-<9}+{:-<11}+{:-<13}+{:-<11}+{:-<10}+{:-<11}\n",
            "", "", "", "", "", "", ""
        ));

        for (name, summary) in &self.profiles {
            let win_rate = ratio(summary.player_wins, summary.matches);
            output.push_str(&format!(
                "{:>12} | {:>7} | {:>8.1}% | {:>5.1}-{:<5.1} | {:>9.2} | {:>7.1}% | {:>9.1}%\n",
                &name[..name.len().min(12)],
                summary.matches,
                win_rate * 100.0,
                summary.avg_score_player,
                summary.avg_score_cpu,
                summary.avg_rally,
                summary.receive_rate * 100.0,
                summary.cpu_return_rate * 100.0
            ));
        }

        output
    }
}

/// Aggregate a list of match results
pub fn summarize(results: &[&MatchResult]) -> ProfileSummary {
    let count = results.len() as u32;
    if count == 0 {
        return ProfileSummary::default();
    }
    let n = count as f32;

    let receives: u32 = results.iter().map(|r| r.stats.receives).sum();
    let receive_misses: u32 = results.iter().map(|r| r.stats.receive_misses).sum();
    let returns: u32 = results.iter().map(|r| r.stats.cpu_returns).sum();
    let cpu_misses: u32 = results.iter().map(|r| r.stats.cpu_misses).sum();

    ProfileSummary {
        matches: count,
        player_wins: results.iter().filter(|r| r.winner == "player").count() as u32,
        cpu_wins: results.iter().filter(|r| r.winner == "cpu").count() as u32,
        unfinished: results.iter().filter(|r| r.winner == "none").count() as u32,
        avg_score_player: results.iter().map(|r| r.score_player).sum::<u32>() as f32 / n,
        avg_score_cpu: results.iter().map(|r| r.score_cpu).sum::<u32>() as f32 / n,
        avg_rally: results.iter().map(|r| r.stats.avg_rally).sum::<f32>() / n,
        receive_rate: ratio(receives, receives + receive_misses),
        cpu_return_rate: ratio(returns, returns + cpu_misses),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(winner: Side) -> GameEvent {
        GameEvent::Point {
            winner,
            reason: "floor".to_string(),
            score_player: 0,
            score_cpu: 0,
        }
    }

    #[test]
    fn test_rally_length_counts_contacts() {
        let mut stats = RallyStats::new();
        stats.record(&GameEvent::Serve {
            side: Side::Cpu,
            pos: (0.0, 0.0),
            vel: (0.0, 0.0),
        });
        stats.record(&GameEvent::Receive { pos: (0.0, 0.0) });
        stats.record(&GameEvent::Set { pos: (0.0, 0.0) });
        stats.record(&GameEvent::Spike {
            pos: (0.0, 0.0),
            vel: (0.0, 0.0),
        });
        stats.record(&point(Side::Player));

        stats.record(&GameEvent::Serve {
            side: Side::Player,
            pos: (0.0, 0.0),
            vel: (0.0, 0.0),
        });
        stats.record(&GameEvent::CpuMiss { pos: (0.0, 0.0) });
        stats.record(&point(Side::Player));
        stats.finalize();

        assert_eq!(stats.longest_rally, 4);
        assert_eq!(stats.rallies(), 2);
        assert!((stats.avg_rally - 2.5).abs() < 1e-6);
        assert_eq!(stats.serves_cpu, 1);
        assert_eq!(stats.serves_player, 1);
        assert_eq!(stats.cpu_return_rate(), 0.0);
        assert_eq!(stats.receive_rate(), 1.0);
    }

    fn result(profile: &str, winner: &str, score: (u32, u32)) -> MatchResult {
        MatchResult {
            cpu_profile: profile.to_string(),
            player_skill: 0.8,
            seed: 1,
            duration: 60.0,
            score_player: score.0,
            score_cpu: score.1,
            winner: winner.to_string(),
            stats: RallyStats::default(),
        }
    }

    #[test]
    fn test_sweep_groups_by_profile() {
        let sweep = SweepResult::new(vec![
            result("Rookie", "player", (11, 4)),
            result("Ace", "cpu", (3, 11)),
            result("Rookie", "cpu", (9, 11)),
        ]);
        let rookie = &sweep.profiles["Rookie"];
        assert_eq!(rookie.matches, 2);
        assert_eq!(rookie.player_wins, 1);
        assert!((rookie.avg_score_player - 10.0).abs() < 1e-6);
        assert_eq!(sweep.profiles["Ace"].cpu_wins, 1);

        let table = sweep.format_table();
        assert!(table.contains("Rookie"));
        assert!(table.contains("50.0%"));
    }

    #[test]
    fn test_winner_labels() {
        assert_eq!(MatchResult::winner_from(Some(Side::Player)), "player");
        assert_eq!(MatchResult::winner_from(None), "none");
    }
}
