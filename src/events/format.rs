//! Compact text format for game event serialization
//!
//! Format: `T:NNNNN|CODE|data...`
//! - T:NNNNN = timestamp in milliseconds (5 digits, wraps at 99999)
//! - CODE = 1-2 char event type code
//! - data = pipe-separated values specific to event type
//!
//! Examples:
//! ```text
//! T:00000|MS|Balanced|11|12345678
//! T:03000|SV|C|-240.0,-130.0|180.3,512.9
//! T:04410|RC|251.2,-136.7
//! T:05022|ST|150.4,-60.2
//! T:05850|SP|102.1,79.6|-420.0,-310.5
//! T:06300|PT|P|floor|1|0
//! ```
//!
//! Tick events (sampled, debug logging only):
//! ```text
//! T:00050|T|3|-240.0,-130.0|0.0,0.0|H|serving
//!          ^frame|ball_pos|ball_vel|state|phase
//! ```

use super::types::{GameConfig, GameEvent};
use crate::court::Side;

/// Format a float with fixed precision (1 decimal)
fn fmt_f1(v: f32) -> String {
    format!("{:.1}", v)
}

/// Format a position tuple
fn fmt_pos(pos: (f32, f32)) -> String {
    format!("{:.1},{:.1}", pos.0, pos.1)
}

/// Serialize a GameEvent to compact text format
pub fn serialize_event(time_ms: u32, event: &GameEvent) -> String {
    let ts = format!("T:{:05}", time_ms % 100000);
    let code = event.type_code();

    let data = match event {
        GameEvent::SessionStart {
            session_id,
            timestamp,
        } => format!("{}|{}", session_id, timestamp),
        GameEvent::Config(config) => {
            // Config is compact JSON for easy parsing
            serde_json::to_string(config).unwrap_or_else(|_| "{}".to_string())
        }
        GameEvent::MatchStart {
            cpu_profile,
            win_score,
            seed,
        } => format!("{}|{}|{}", cpu_profile, win_score, seed),
        GameEvent::MatchEnd {
            score_player,
            score_cpu,
            duration,
        } => format!("{}|{}|{}", score_player, score_cpu, fmt_f1(*duration)),
        GameEvent::Serve { side, pos, vel } => {
            format!("{}|{}|{}", side, fmt_pos(*pos), fmt_pos(*vel))
        }
        GameEvent::Receive { pos }
        | GameEvent::ReceiveMiss { pos }
        | GameEvent::Set { pos }
        | GameEvent::SpikeMiss { pos }
        | GameEvent::CpuMiss { pos }
        | GameEvent::Land { pos }
        | GameEvent::Out { pos } => fmt_pos(*pos),
        GameEvent::Spike { pos, vel } | GameEvent::CpuReturn { pos, vel } => {
            format!("{}|{}", fmt_pos(*pos), fmt_pos(*vel))
        }
        GameEvent::NetHit { pos, tape } => {
            format!("{}|{}", fmt_pos(*pos), if *tape { 1 } else { 0 })
        }
        GameEvent::Point {
            winner,
            reason,
            score_player,
            score_cpu,
        } => format!("{}|{}|{}|{}", winner, reason, score_player, score_cpu),
        GameEvent::Pause | GameEvent::Resume | GameEvent::Restart => String::new(),
        GameEvent::Drag { role, x } => format!("{}|{}", role, fmt_f1(*x)),
        GameEvent::PracticeServe {
            attempt,
            power,
            landing_x,
            zone,
            points,
        } => format!(
            "{}|{:.2}|{}|{}|{}",
            attempt,
            power,
            fmt_f1(*landing_x),
            zone,
            points
        ),
        GameEvent::Tick {
            frame,
            ball_pos,
            ball_vel,
            ball_state,
            phase,
        } => format!(
            "{}|{}|{}|{}|{}",
            frame,
            fmt_pos(*ball_pos),
            fmt_pos(*ball_vel),
            ball_state,
            phase
        ),
    };

    format!("{}|{}|{}", ts, code, data)
}

/// Parse a line back into timestamp and event
pub fn parse_event(line: &str) -> Option<(u32, GameEvent)> {
    let parts: Vec<&str> = line.trim_end().split('|').collect();
    if parts.len() < 3 {
        return None;
    }

    let ts_str = parts[0].strip_prefix("T:")?;
    let time_ms: u32 = ts_str.parse().ok()?;

    let code = parts[1];
    let data = &parts[2..];

    let event = match code {
        "SE" if data.len() >= 2 => GameEvent::SessionStart {
            session_id: data[0].to_string(),
            timestamp: data[1].to_string(),
        },
        "CF" if !data.is_empty() => {
            // Rejoin with | in case the JSON contains one
            let json_str = data.join("|");
            let config: GameConfig = serde_json::from_str(&json_str).ok()?;
            GameEvent::Config(config)
        }
        "MS" if data.len() >= 3 => GameEvent::MatchStart {
            cpu_profile: data[0].to_string(),
            win_score: data[1].parse().ok()?,
            seed: data[2].parse().ok()?,
        },
        "ME" if data.len() >= 3 => GameEvent::MatchEnd {
            score_player: data[0].parse().ok()?,
            score_cpu: data[1].parse().ok()?,
            duration: data[2].parse().ok()?,
        },
        "SV" if data.len() >= 3 => GameEvent::Serve {
            side: parse_side(data[0])?,
            pos: parse_pos(data[1])?,
            vel: parse_pos(data[2])?,
        },
        "RC" if !data.is_empty() => GameEvent::Receive {
            pos: parse_pos(data[0])?,
        },
        "RM" if !data.is_empty() => GameEvent::ReceiveMiss {
            pos: parse_pos(data[0])?,
        },
        "ST" if !data.is_empty() => GameEvent::Set {
            pos: parse_pos(data[0])?,
        },
        "SP" if data.len() >= 2 => GameEvent::Spike {
            pos: parse_pos(data[0])?,
            vel: parse_pos(data[1])?,
        },
        "SM" if !data.is_empty() => GameEvent::SpikeMiss {
            pos: parse_pos(data[0])?,
        },
        "CR" if data.len() >= 2 => GameEvent::CpuReturn {
            pos: parse_pos(data[0])?,
            vel: parse_pos(data[1])?,
        },
        "CM" if !data.is_empty() => GameEvent::CpuMiss {
            pos: parse_pos(data[0])?,
        },
        "NH" if data.len() >= 2 => GameEvent::NetHit {
            pos: parse_pos(data[0])?,
            tape: data[1] == "1",
        },
        "LD" if !data.is_empty() => GameEvent::Land {
            pos: parse_pos(data[0])?,
        },
        "OB" if !data.is_empty() => GameEvent::Out {
            pos: parse_pos(data[0])?,
        },
        "PT" if data.len() >= 4 => GameEvent::Point {
            winner: parse_side(data[0])?,
            reason: data[1].to_string(),
            score_player: data[2].parse().ok()?,
            score_cpu: data[3].parse().ok()?,
        },
        "PA" => GameEvent::Pause,
        "RS" => GameEvent::Resume,
        "RT" => GameEvent::Restart,
        "DG" if data.len() >= 2 => GameEvent::Drag {
            role: data[0].to_string(),
            x: data[1].parse().ok()?,
        },
        "PS" if data.len() >= 5 => GameEvent::PracticeServe {
            attempt: data[0].parse().ok()?,
            power: data[1].parse().ok()?,
            landing_x: data[2].parse().ok()?,
            zone: data[3].to_string(),
            points: data[4].parse().ok()?,
        },
        "T" if data.len() >= 5 => GameEvent::Tick {
            frame: data[0].parse().ok()?,
            ball_pos: parse_pos(data[1])?,
            ball_vel: parse_pos(data[2])?,
            ball_state: data[3].chars().next()?,
            phase: data[4].to_string(),
        },
        _ => return None,
    };

    Some((time_ms, event))
}

fn parse_side(s: &str) -> Option<Side> {
    let mut chars = s.chars();
    let side = Side::from_code(chars.next()?)?;
    chars.next().is_none().then_some(side)
}

fn parse_pos(s: &str) -> Option<(f32, f32)> {
    let (x, y) = s.split_once(',')?;
    Some((x.parse().ok()?, y.parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_point() {
        let event = GameEvent::Point {
            winner: Side::Cpu,
            reason: "receive_miss".to_string(),
            score_player: 3,
            score_cpu: 4,
        };
        let line = serialize_event(1500, &event);
        assert_eq!(line, "T:01500|PT|C|receive_miss|3|4");
        let (ts, parsed) = parse_event(&line).unwrap();
        assert_eq!(ts, 1500);
        assert_eq!(parsed, event);
    }

    #[test]
    fn test_roundtrip_serve_rounds_to_one_decimal() {
        let event = GameEvent::Serve {
            side: Side::Cpu,
            pos: (-240.04, -130.0),
            vel: (180.33, 512.96),
        };
        let line = serialize_event(3000, &event);
        assert!(line.starts_with("T:03000|SV|C|-240.0,-130.0|"));
        let (_, parsed) = parse_event(&line).unwrap();
        if let GameEvent::Serve { side, vel, .. } = parsed {
            assert_eq!(side, Side::Cpu);
            assert!((vel.0 - 180.3).abs() < 0.01);
            assert!((vel.1 - 513.0).abs() < 0.01);
        } else {
            panic!("Wrong event type");
        }
    }

    #[test]
    fn test_roundtrip_config_json() {
        let config = GameConfig {
            ball_gravity: 720.0,
            win_score: 11,
            win_by_two: true,
            cpu_profile: "Ace".to_string(),
            ..Default::default()
        };
        let line = serialize_event(0, &GameEvent::Config(config));
        let (_, parsed) = parse_event(&line).unwrap();
        if let GameEvent::Config(c) = parsed {
            assert_eq!(c.cpu_profile, "Ace");
            assert_eq!(c.win_score, 11);
        } else {
            panic!("Wrong event type");
        }
    }

    #[test]
    fn test_empty_payload_events() {
        let line = serialize_event(42, &GameEvent::Restart);
        assert_eq!(line, "T:00042|RT|");
        assert_eq!(parse_event(&line), Some((42, GameEvent::Restart)));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse_event("").is_none());
        assert!(parse_event("T:abc|PT|P|floor|1|0").is_none());
        assert!(parse_event("T:00010|ZZ|1").is_none());
        assert!(parse_event("T:00010|SV|X|0,0|0,0").is_none());
        assert!(parse_event("T:00010|RC|12.0").is_none());
    }
}
