//! Rally phases and the Rally resource

use bevy::prelude::*;

use crate::constants::SERVE_DELAY;
use crate::court::Side;

/// Where the rally is. Pausing is tracked separately in `Rally::paused`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum RallyPhase {
    /// Opening countdown before the first serve
    #[default]
    Ready,
    /// Ball held above the server's receiver
    Serving { server: Side },
    /// Ball travelling toward the player side, waiting for a receive
    Incoming,
    /// Received ball travelling to the setter
    Set,
    /// Setter's toss travelling to the attacker, waiting for a spike
    Toss,
    /// Ball travelling toward the CPU side
    Attack,
    /// Ball dead, next serve after the timer
    PointScored { timer: f32, next_server: Side },
    /// Match decided
    GameOver { winner: Side },
}

impl RallyPhase {
    pub fn label(&self) -> &'static str {
        match self {
            RallyPhase::Ready => "ready",
            RallyPhase::Serving { .. } => "serving",
            RallyPhase::Incoming => "incoming",
            RallyPhase::Set => "set",
            RallyPhase::Toss => "toss",
            RallyPhase::Attack => "attack",
            RallyPhase::PointScored { .. } => "point",
            RallyPhase::GameOver { .. } => "game_over",
        }
    }

    /// Ball is in play between serve and point
    pub fn in_rally(&self) -> bool {
        matches!(
            self,
            RallyPhase::Incoming | RallyPhase::Set | RallyPhase::Toss | RallyPhase::Attack
        )
    }
}

/// Why a point was awarded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointReason {
    /// Live ball touched the floor
    Floor,
    /// Live ball crossed a side line
    Out,
    /// Player tapped for a receive outside the window
    ReceiveMiss,
    /// Player tapped for a spike outside the window
    SpikeMiss,
}

impl PointReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            PointReason::Floor => "floor",
            PointReason::Out => "out",
            PointReason::ReceiveMiss => "receive_miss",
            PointReason::SpikeMiss => "spike_miss",
        }
    }

    pub fn from_name(name: &str) -> Option<PointReason> {
        match name {
            "floor" => Some(PointReason::Floor),
            "out" => Some(PointReason::Out),
            "receive_miss" => Some(PointReason::ReceiveMiss),
            "spike_miss" => Some(PointReason::SpikeMiss),
            _ => None,
        }
    }
}

/// Rally state shared by the match systems
#[derive(Resource, Debug, Clone)]
pub struct Rally {
    pub phase: RallyPhase,
    pub paused: bool,
    /// Side that last played the ball (serve, receive, set, spike, return)
    pub last_touch: Option<Side>,
    /// Seconds until a CPU serve is launched
    pub serve_timer: f32,
    /// Contacts in the current rally
    pub touches: u32,
    /// Seconds of play in this match (excludes pause and countdown)
    pub elapsed: f32,
    /// Fixed ticks simulated in this match
    pub ticks: u64,
}

impl Default for Rally {
    fn default() -> Self {
        Self {
            phase: RallyPhase::Ready,
            paused: false,
            last_touch: None,
            serve_timer: SERVE_DELAY,
            touches: 0,
            elapsed: 0.0,
            ticks: 0,
        }
    }
}

impl Rally {
    /// Hand the ball to `server` for the next serve
    pub fn start_serve(&mut self, server: Side) {
        self.phase = RallyPhase::Serving { server };
        self.serve_timer = SERVE_DELAY;
        self.last_touch = None;
        self.touches = 0;
    }

    /// Record a contact by `side`
    pub fn touch(&mut self, side: Side, next: RallyPhase) {
        self.last_touch = Some(side);
        self.touches += 1;
        self.phase = next;
    }
}

/// Run condition: match is not paused
pub fn not_paused(rally: Res<Rally>) -> bool {
    !rally.paused
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_serve_resets_rally_state() {
        let mut rally = Rally::default();
        rally.touch(Side::Player, RallyPhase::Attack);
        rally.touch(Side::Cpu, RallyPhase::Incoming);
        assert_eq!(rally.touches, 2);
        assert_eq!(rally.last_touch, Some(Side::Cpu));

        rally.serve_timer = 0.0;
        rally.start_serve(Side::Player);
        assert_eq!(rally.phase, RallyPhase::Serving { server: Side::Player });
        assert_eq!(rally.touches, 0);
        assert_eq!(rally.last_touch, None);
        assert_eq!(rally.serve_timer, SERVE_DELAY);
    }

    #[test]
    fn test_in_rally_phases() {
        assert!(RallyPhase::Toss.in_rally());
        assert!(!RallyPhase::Ready.in_rally());
        assert!(!RallyPhase::Serving { server: Side::Cpu }.in_rally());
        assert!(
            !RallyPhase::PointScored {
                timer: 1.0,
                next_server: Side::Cpu
            }
            .in_rally()
        );
    }

    #[test]
    fn test_point_reason_names() {
        for r in [
            PointReason::Floor,
            PointReason::Out,
            PointReason::ReceiveMiss,
            PointReason::SpikeMiss,
        ] {
            assert_eq!(PointReason::from_name(r.as_str()), Some(r));
        }
    }
}
