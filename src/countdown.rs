//! Match countdown - "Tap to start", then a short count before the first serve
//!
//! Armed at launch and restarted on every new match.

use bevy::prelude::*;

use crate::constants::START_DELAY;
use crate::input::PlayerInput;

/// Resource tracking the countdown state
#[derive(Resource, Debug, Clone)]
pub struct MatchCountdown {
    /// Time remaining in countdown
    pub timer: f32,
    /// Whether countdown is currently active
    pub active: bool,
    /// Waiting for the first tap before counting
    pub awaiting_tap: bool,
}

impl Default for MatchCountdown {
    fn default() -> Self {
        Self {
            timer: START_DELAY,
            active: true,
            awaiting_tap: true,
        }
    }
}

impl MatchCountdown {
    /// Countdown that starts counting immediately (headless runs)
    pub fn headless() -> Self {
        Self {
            awaiting_tap: false,
            ..default()
        }
    }

    /// Start a new countdown
    pub fn start(&mut self) {
        self.timer = START_DELAY;
        self.active = true;
        self.awaiting_tap = false;
    }

    /// Skip straight to play
    pub fn finish(&mut self) {
        self.timer = 0.0;
        self.active = false;
        self.awaiting_tap = false;
    }

    pub fn is_finished(&self) -> bool {
        !self.active
    }

    /// Whole seconds left, rounded up
    pub fn display_number(&self) -> u32 {
        self.timer.max(0.0).ceil() as u32
    }

    /// Text shown while active
    pub fn label(&self) -> String {
        if self.awaiting_tap {
            "Tap to start".to_string()
        } else {
            self.display_number().max(1).to_string()
        }
    }

    /// Advance by `dt`. Taps are swallowed while the countdown runs.
    pub fn tick(&mut self, dt: f32, tapped: bool) {
        if !self.active {
            return;
        }
        if self.awaiting_tap {
            if tapped {
                self.awaiting_tap = false;
            }
            return;
        }
        self.timer -= dt;
        if self.timer <= 0.0 {
            self.active = false;
        }
    }
}

/// Advance the countdown (FixedUpdate)
pub fn tick_countdown(
    time: Res<Time>,
    mut countdown: ResMut<MatchCountdown>,
    mut input: ResMut<PlayerInput>,
) {
    if !countdown.active {
        return;
    }
    let tapped = input.consume_tap();
    // A press that starts the match must not become a drag once play begins
    input.tap_released = false;
    input.pointer_pressed = false;
    input.pointer_released = false;
    countdown.tick(time.delta_secs(), tapped);
}

/// Run condition: game is NOT in countdown
pub fn not_in_countdown(countdown: Res<MatchCountdown>) -> bool {
    !countdown.active
}

/// Run condition: game IS in countdown
pub fn in_countdown(countdown: Res<MatchCountdown>) -> bool {
    countdown.active
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waits_for_tap() {
        let mut countdown = MatchCountdown::default();
        assert_eq!(countdown.label(), "Tap to start");
        countdown.tick(10.0, false);
        assert!(countdown.active);
        assert_eq!(countdown.timer, START_DELAY);

        countdown.tick(0.0, true);
        assert!(!countdown.awaiting_tap);
        assert_eq!(countdown.label(), "2");
    }

    #[test]
    fn test_counts_down_to_play() {
        let mut countdown = MatchCountdown::headless();
        let dt = 1.0 / 60.0;
        let mut ticks = 0;
        while countdown.active {
            countdown.tick(dt, false);
            ticks += 1;
            assert!(ticks < 1000);
        }
        // START_DELAY seconds at 60 Hz, give or take float rounding
        assert!((119..=121).contains(&ticks), "took {ticks} ticks");
        assert!(countdown.is_finished());
    }

    #[test]
    fn test_pointer_press_is_used_up_by_the_countdown() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .init_resource::<MatchCountdown>()
            .init_resource::<PlayerInput>()
            .add_systems(Update, tick_countdown);

        app.world_mut()
            .resource_mut::<PlayerInput>()
            .press_at(Vec2::new(150.0, -225.0));
        app.update();
        assert!(!app.world().resource::<MatchCountdown>().awaiting_tap);
        let input = app.world().resource::<PlayerInput>();
        assert!(!input.tap_pressed);
        assert!(!input.pointer_pressed);

        app.world_mut()
            .resource_mut::<PlayerInput>()
            .release_at(Vec2::new(150.0, -225.0));
        app.update();
        let input = app.world().resource::<PlayerInput>();
        assert!(!input.pointer_released);
        assert!(!input.tap_released);
    }

    #[test]
    fn test_restart_skips_tap_prompt() {
        let mut countdown = MatchCountdown::default();
        countdown.finish();
        countdown.start();
        assert!(countdown.active);
        assert!(!countdown.awaiting_tap);
        assert_eq!(countdown.display_number(), 2);
    }
}
