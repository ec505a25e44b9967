//! Assertion checking for test expectations

use std::collections::HashMap;

use super::parser::{ExpectedEvent, StateAssertion, parse_side};
use crate::court::Side;
use crate::events::GameEvent;

/// Error when an assertion fails
#[derive(Debug, Clone)]
pub struct AssertionError {
    pub message: String,
    pub expected: String,
    pub actual: String,
}

impl std::fmt::Display for AssertionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\n    Expected: {}\n    Actual: {}", self.message, self.expected, self.actual)
    }
}

/// Captured event with timing info
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub frame: u64,
    pub event: GameEvent,
}

impl CapturedEvent {
    pub fn new(frame: u64, event: GameEvent) -> Self {
        Self { frame, event }
    }

    /// Matches a name ("Receive") or a type code ("RC")
    pub fn is(&self, name: &str) -> bool {
        self.event.name() == name || self.event.type_code() == name
    }

    pub fn side(&self) -> Option<Side> {
        self.event.side()
    }
}

/// Check if captured events match expected sequence
pub fn check_sequence(expected: &[ExpectedEvent], captured: &[CapturedEvent]) -> Result<(), AssertionError> {
    let mut captured_idx = 0;

    for (i, exp) in expected.iter().enumerate() {
        let want_side = exp.side.as_deref().and_then(parse_side);
        // Find matching event starting from current position
        let found = captured[captured_idx..].iter().enumerate().find(|(_, cap)| {
            cap.is(&exp.event) && want_side.is_none_or(|side| cap.side() == Some(side))
        });

        match found {
            Some((offset, cap)) => {
                if let Some(min) = exp.frame_min
                    && cap.frame < min
                {
                    return Err(AssertionError {
                        message: format!("Event #{} '{}' occurred too early", i + 1, exp.event),
                        expected: format!("frame >= {}", min),
                        actual: format!("frame {}", cap.frame),
                    });
                }
                if let Some(max) = exp.frame_max
                    && cap.frame > max
                {
                    return Err(AssertionError {
                        message: format!("Event #{} '{}' occurred too late", i + 1, exp.event),
                        expected: format!("frame <= {}", max),
                        actual: format!("frame {}", cap.frame),
                    });
                }
                captured_idx += offset + 1;
            }
            None => {
                let side_str = exp.side.as_ref().map(|s| format!(" (side: {})", s)).unwrap_or_default();
                return Err(AssertionError {
                    message: format!("Event #{} '{}'{} not found", i + 1, exp.event, side_str),
                    expected: format!("'{}' event in sequence", exp.event),
                    actual: format!(
                        "events after position {}: {:?}",
                        captured_idx,
                        captured[captured_idx..].iter().map(|e| e.event.name()).collect::<Vec<_>>()
                    ),
                });
            }
        }
    }

    Ok(())
}

/// Fail if any of the named events was captured
pub fn check_absent(absent: &[String], captured: &[CapturedEvent]) -> Result<(), AssertionError> {
    for name in absent {
        if let Some(cap) = captured.iter().find(|c| c.is(name)) {
            return Err(AssertionError {
                message: format!("Unexpected '{}' event", name),
                expected: format!("no '{}' event", name),
                actual: format!("{:?} at frame {}", cap.event, cap.frame),
            });
        }
    }
    Ok(())
}

/// World state for assertions
#[derive(Debug, Clone, Default)]
pub struct WorldState {
    /// Rally phase label ("incoming", "set", ...)
    pub phase: String,
    pub paused: bool,
    pub countdown: bool,
    pub score_player: u32,
    pub score_cpu: u32,
    pub ball: Option<BallSnapshot>,
    /// Avatar x by role name; the CPU receiver is "cpu"
    pub avatars: HashMap<String, f32>,
    /// Current banner text ("" when hidden)
    pub message: String,
    /// CPU goal label
    pub cpu_goal: String,
}

#[derive(Debug, Clone, Default)]
pub struct BallSnapshot {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    /// "held", "live" or "dead"
    pub state: String,
}

/// Parse a check string into (path, operator, value)
fn parse_check(check: &str) -> Option<(&str, &str, &str)> {
    // Try operators in order of specificity (>= before >, == before =, etc.)
    for op in &[">=", "<=", "!=", "==", "=", ">", "<"] {
        if let Some(idx) = check.find(op) {
            let path = check[..idx].trim();
            let value = check[idx + op.len()..].trim();
            return Some((path, op, value));
        }
    }
    None
}

/// Check state assertions against world state
pub fn check_state(assertion: &StateAssertion, state: &WorldState) -> Result<(), AssertionError> {
    for check in &assertion.checks {
        let (path, operator, expected_value) = parse_check(check).ok_or_else(|| AssertionError {
            message: format!("Invalid check syntax: {}", check),
            expected: "format: 'path == value' or 'path > value'".to_string(),
            actual: check.clone(),
        })?;

        let path_parts: Vec<&str> = path.split('.').collect();
        let unknown = || AssertionError {
            message: format!("Unknown check path '{}'", path),
            expected: "score.*, phase, paused, countdown, message, cpu_goal, ball.*, <role>.x".to_string(),
            actual: path.to_string(),
        };

        match path_parts.as_slice() {
            ["score", "player"] => check_number(check, state.score_player as f32, operator, expected_value)?,
            ["score", "cpu"] => check_number(check, state.score_cpu as f32, operator, expected_value)?,
            ["phase"] => check_text(check, &state.phase, operator, expected_value)?,
            ["message"] => check_text(check, &state.message, operator, expected_value)?,
            ["cpu_goal"] => check_text(check, &state.cpu_goal, operator, expected_value)?,
            ["paused"] => check_text(check, &state.paused.to_string(), operator, expected_value)?,
            ["countdown"] => check_text(check, &state.countdown.to_string(), operator, expected_value)?,
            ["ball", field] => {
                let ball = state.ball.as_ref().ok_or_else(|| AssertionError {
                    message: "Ball state check failed".to_string(),
                    expected: "ball exists".to_string(),
                    actual: "no ball".to_string(),
                })?;
                match *field {
                    "x" => check_number(check, ball.x, operator, expected_value)?,
                    "y" => check_number(check, ball.y, operator, expected_value)?,
                    "vx" => check_number(check, ball.vx, operator, expected_value)?,
                    "vy" => check_number(check, ball.vy, operator, expected_value)?,
                    "state" => check_text(check, &ball.state, operator, expected_value)?,
                    _ => return Err(unknown()),
                }
            }
            [role, "x"] => {
                let x = state.avatars.get(*role).ok_or_else(|| AssertionError {
                    message: format!("Avatar '{}' not found", role),
                    expected: format!("avatar '{}'", role),
                    actual: format!("available: {:?}", state.avatars.keys().collect::<Vec<_>>()),
                })?;
                check_number(check, *x, operator, expected_value)?;
            }
            _ => return Err(unknown()),
        }
    }

    Ok(())
}

/// Compare text with == / = / !=, ignoring quotes
fn check_text(check: &str, actual: &str, operator: &str, expected_str: &str) -> Result<(), AssertionError> {
    let expected = expected_str.trim_matches('"');
    let pass = match operator {
        "=" | "==" => actual.eq_ignore_ascii_case(expected),
        "!=" => !actual.eq_ignore_ascii_case(expected),
        _ => {
            return Err(AssertionError {
                message: format!("Operator '{}' needs a number: {}", operator, check),
                expected: "==, = or !=".to_string(),
                actual: operator.to_string(),
            });
        }
    };

    if !pass {
        return Err(AssertionError {
            message: format!("Check failed: {}", check),
            expected: format!("{} {}", operator, expected),
            actual: actual.to_string(),
        });
    }
    Ok(())
}

/// Check float comparison with operator
fn check_number(check: &str, actual: f32, operator: &str, expected_str: &str) -> Result<(), AssertionError> {
    let value: f32 = expected_str.parse().map_err(|_| AssertionError {
        message: format!("Invalid value in '{}'", check),
        expected: "number".to_string(),
        actual: expected_str.to_string(),
    })?;

    let pass = match operator {
        ">=" => actual >= value,
        "<=" => actual <= value,
        ">" => actual > value,
        "<" => actual < value,
        "=" | "==" => (actual - value).abs() < 0.1,
        "!=" => (actual - value).abs() >= 0.1,
        _ => false,
    };

    if !pass {
        return Err(AssertionError {
            message: format!("Check failed: {} (actual: {:.1})", check, actual),
            expected: format!("{} {}", operator, value),
            actual: format!("{:.1}", actual),
        });
    }

    Ok(())
}
