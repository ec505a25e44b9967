//! Scoring module - score counters and match-end rules

use bevy::prelude::*;

use crate::constants::DEFAULT_WIN_SCORE;
use crate::court::Side;

/// Points for each side
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub player: u32,
    pub cpu: u32,
}

impl Score {
    /// Add a point to `side`
    pub fn award(&mut self, side: Side) {
        match side {
            Side::Player => self.player += 1,
            Side::Cpu => self.cpu += 1,
        }
    }

    pub fn get(&self, side: Side) -> u32 {
        match side {
            Side::Player => self.player,
            Side::Cpu => self.cpu,
        }
    }

    pub fn reset(&mut self) {
        *self = Score::default();
    }
}

/// How a match is decided
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchRules {
    /// Points needed to win
    pub win_score: u32,
    /// Winner must also lead by two
    pub win_by_two: bool,
}

impl Default for MatchRules {
    fn default() -> Self {
        Self {
            win_score: DEFAULT_WIN_SCORE,
            win_by_two: true,
        }
    }
}

impl MatchRules {
    /// The side that has won, if any. A win score of 0 means endless play.
    pub fn winner(&self, score: &Score) -> Option<Side> {
        if self.win_score == 0 {
            return None;
        }
        let margin = if self.win_by_two { 2 } else { 1 };
        for side in [Side::Player, Side::Cpu] {
            let mine = score.get(side);
            let theirs = score.get(side.opponent());
            if mine >= self.win_score && mine >= theirs + margin {
                return Some(side);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_award_and_reset() {
        let mut score = Score::default();
        score.award(Side::Player);
        score.award(Side::Cpu);
        score.award(Side::Cpu);
        assert_eq!(score, Score { player: 1, cpu: 2 });
        score.reset();
        assert_eq!(score, Score::default());
    }

    #[test]
    fn test_winner_needs_two_point_lead() {
        let rules = MatchRules::default();
        assert_eq!(rules.winner(&Score { player: 11, cpu: 10 }), None);
        assert_eq!(rules.winner(&Score { player: 12, cpu: 10 }), Some(Side::Player));
        assert_eq!(rules.winner(&Score { player: 9, cpu: 11 }), Some(Side::Cpu));
        assert_eq!(rules.winner(&Score { player: 10, cpu: 10 }), None);
    }

    #[test]
    fn test_winner_without_deuce() {
        let rules = MatchRules {
            win_score: 5,
            win_by_two: false,
        };
        assert_eq!(rules.winner(&Score { player: 5, cpu: 4 }), Some(Side::Player));
        assert_eq!(rules.winner(&Score { player: 4, cpu: 4 }), None);
    }

    #[test]
    fn test_zero_win_score_is_endless() {
        let rules = MatchRules {
            win_score: 0,
            win_by_two: false,
        };
        assert_eq!(rules.winner(&Score { player: 99, cpu: 0 }), None);
    }
}
