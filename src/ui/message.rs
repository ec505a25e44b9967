//! Rally message banner ("Receive!", "CPU point!", ...)

use bevy::prelude::*;

use crate::constants::*;

/// Current on-screen message and how long it stays up
#[derive(Resource, Default, Debug, Clone)]
pub struct MessageBanner {
    pub text: String,
    /// Seconds remaining (0 = hidden)
    pub timer: f32,
}

impl MessageBanner {
    /// Show a message for the standard duration, replacing any current one
    pub fn show(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.timer = MESSAGE_DURATION;
    }

    /// Show a message that stays until replaced or cleared
    pub fn show_sticky(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.timer = f32::INFINITY;
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.timer = 0.0;
    }

    pub fn tick(&mut self, dt: f32) {
        if self.timer > 0.0 {
            self.timer = (self.timer - dt).max(0.0);
        }
    }

    pub fn is_visible(&self) -> bool {
        self.timer > 0.0 && !self.text.is_empty()
    }
}

/// Marker for the message text entity
#[derive(Component)]
pub struct MessageText;

/// Count the banner down (FixedUpdate, so pausing freezes it)
pub fn tick_message(time: Res<Time>, mut banner: ResMut<MessageBanner>) {
    banner.tick(time.delta_secs());
}

pub fn spawn_message_text(commands: &mut Commands) {
    commands.spawn((
        Text2d::new(""),
        TextFont {
            font_size: 36.0,
            ..default()
        },
        TextLayout::new_with_justify(bevy::text::Justify::Center),
        TextColor(TEXT_MESSAGE),
        Transform::from_xyz(0.0, COURT_HEIGHT / 2.0 - 90.0, 10.0),
        Visibility::Hidden,
        MessageText,
    ));
}

/// Mirror the banner into its text entity
pub fn update_message_text(
    banner: Res<MessageBanner>,
    mut text_query: Query<(&mut Text2d, &mut Visibility), With<MessageText>>,
) {
    let Ok((mut text, mut visibility)) = text_query.single_mut() else {
        return;
    };
    if banner.is_visible() {
        if text.0 != banner.text {
            text.0 = banner.text.clone();
        }
        *visibility = Visibility::Visible;
    } else {
        *visibility = Visibility::Hidden;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_times_out() {
        let mut banner = MessageBanner::default();
        assert!(!banner.is_visible());
        banner.show("Receive!");
        assert!(banner.is_visible());
        for _ in 0..119 {
            banner.tick(1.0 / 60.0);
        }
        assert!(banner.is_visible());
        banner.tick(2.0 / 60.0);
        assert!(!banner.is_visible());
    }

    #[test]
    fn test_new_message_replaces_old() {
        let mut banner = MessageBanner::default();
        banner.show("CPU serve!");
        banner.tick(1.5);
        banner.show("Receive!");
        assert_eq!(banner.text, "Receive!");
        assert_eq!(banner.timer, MESSAGE_DURATION);
    }

    #[test]
    fn test_sticky_message() {
        let mut banner = MessageBanner::default();
        banner.show_sticky("YOU WIN!");
        banner.tick(1000.0);
        assert!(banner.is_visible());
        banner.clear();
        assert!(!banner.is_visible());
    }
}
