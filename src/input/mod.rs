//! Input module - PlayerInput resource and capture_input system
//!
//! Every action in the match is a single "tap": Space, a mouse click or a
//! touch. Pointer presses near a player avatar become drags instead (decided
//! in FixedUpdate by the drag system).

use bevy::prelude::*;
use bevy::window::PrimaryWindow;

/// Buffered input state. Press/release flags accumulate in Update and are
/// consumed by FixedUpdate systems, so a tap is never lost between ticks.
#[derive(Resource, Default, Debug, Clone)]
pub struct PlayerInput {
    pub tap_pressed: bool,      // Any tap this frame - receive / spike / serve
    pub tap_held: bool,         // Tap button currently down (practice charge)
    pub tap_released: bool,     // Tap button released (practice serve)
    pub pointer: Option<Vec2>,  // Pointer in world space
    pub pointer_pressed: bool,  // Mouse/touch went down (candidate for a grab)
    pub pointer_released: bool, // Mouse/touch went up (ends a drag)
    pub pause_pressed: bool,    // P / Escape
    pub restart_pressed: bool,  // R
    pub debug_pressed: bool,    // F3
}

impl PlayerInput {
    /// Take the pending tap, clearing it
    pub fn consume_tap(&mut self) -> bool {
        std::mem::take(&mut self.tap_pressed)
    }

    /// Take the pending release, clearing it
    pub fn consume_release(&mut self) -> bool {
        std::mem::take(&mut self.tap_released)
    }

    /// Simulate a pointer press at a world position (scenario tests, auto-play)
    pub fn press_at(&mut self, pos: Vec2) {
        self.pointer = Some(pos);
        self.pointer_pressed = true;
        self.tap_pressed = true;
        self.tap_held = true;
    }

    /// Simulate the pointer being let go at a world position
    pub fn release_at(&mut self, pos: Vec2) {
        self.pointer = Some(pos);
        self.pointer_released = true;
        self.tap_released = true;
        self.tap_held = false;
    }
}

/// Runs in Update to capture keyboard, mouse and touch state before it's cleared
pub fn capture_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
    touches: Res<Touches>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform)>,
    mut input: ResMut<PlayerInput>,
) {
    // Pointer position: first active touch, else the mouse cursor
    let screen_pos = touches
        .iter()
        .next()
        .map(|t| t.position())
        .or_else(|| windows.single().ok().and_then(|w| w.cursor_position()));
    if let Some(screen_pos) = screen_pos
        && let Ok((camera, camera_transform)) = cameras.single()
        && let Ok(world) = camera.viewport_to_world_2d(camera_transform, screen_pos)
    {
        input.pointer = Some(world);
    }

    let pointer_down = mouse.just_pressed(MouseButton::Left) || touches.any_just_pressed();
    let pointer_up = mouse.just_released(MouseButton::Left) || touches.any_just_released();
    let key_down = keyboard.just_pressed(KeyCode::Space);
    let key_up = keyboard.just_released(KeyCode::Space);

    if pointer_down {
        input.pointer_pressed = true;
    }
    if pointer_up {
        input.pointer_released = true;
    }
    if pointer_down || key_down {
        input.tap_pressed = true;
    }
    if pointer_up || key_up {
        input.tap_released = true;
    }
    input.tap_held = keyboard.pressed(KeyCode::Space)
        || mouse.pressed(MouseButton::Left)
        || touches.iter().next().is_some();

    if keyboard.just_pressed(KeyCode::KeyP) || keyboard.just_pressed(KeyCode::Escape) {
        input.pause_pressed = true;
    }
    if keyboard.just_pressed(KeyCode::KeyR) {
        input.restart_pressed = true;
    }
    if keyboard.just_pressed(KeyCode::F3) {
        input.debug_pressed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tap_is_consumed_once() {
        let mut input = PlayerInput::default();
        input.press_at(Vec2::new(10.0, 20.0));
        assert!(input.pointer_pressed);
        assert!(input.consume_tap());
        assert!(!input.consume_tap());
        assert!(input.tap_held);
    }

    #[test]
    fn test_release_clears_hold() {
        let mut input = PlayerInput::default();
        input.press_at(Vec2::ZERO);
        input.release_at(Vec2::new(5.0, 0.0));
        assert!(!input.tap_held);
        assert!(input.consume_release());
        assert!(!input.consume_release());
        assert_eq!(input.pointer, Some(Vec2::new(5.0, 0.0)));
    }
}
