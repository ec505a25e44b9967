//! Drag control for the player team
//!
//! A pointer press within `GRAB_RADIUS` of a player avatar grabs it. While
//! held the avatar follows the pointer horizontally, clamped inside the player
//! half. A grab swallows the tap that started it.

use bevy::prelude::*;

use crate::constants::*;
use crate::court::{Court, Side};
use crate::events::{EventBus, GameEvent};
use crate::input::PlayerInput;
use crate::player::components::*;

/// Which avatar (if any) is currently grabbed
#[derive(Resource, Default, Debug)]
pub struct DragState {
    pub grabbed: Option<Entity>,
}

/// Nearest avatar within `radius` of `pointer`
pub fn pick_avatar(
    pointer: Vec2,
    radius: f32,
    avatars: impl IntoIterator<Item = (Entity, Vec2)>,
) -> Option<Entity> {
    avatars
        .into_iter()
        .map(|(e, pos)| (e, pos.distance(pointer)))
        .filter(|(_, d)| *d <= radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(e, _)| e)
}

/// Grab, move and release player avatars (FixedUpdate)
pub fn drag_avatars(
    court: Res<Court>,
    mut input: ResMut<PlayerInput>,
    mut drag: ResMut<DragState>,
    mut bus: ResMut<EventBus>,
    mut avatars: Query<(Entity, &mut Transform, &mut DragTarget, &Side, &Role), With<Avatar>>,
) {
    if std::mem::take(&mut input.pointer_pressed)
        && drag.grabbed.is_none()
        && let Some(pointer) = input.pointer
    {
        let candidates = avatars
            .iter()
            .filter(|(_, _, _, side, _)| **side == Side::Player)
            .map(|(e, t, _, _, _)| (e, t.translation.truncate()));
        if let Some(entity) = pick_avatar(pointer, GRAB_RADIUS, candidates) {
            drag.grabbed = Some(entity);
            input.tap_pressed = false;
            debug!("Grabbed avatar {:?}", entity);
        }
    }

    let Some(entity) = drag.grabbed else {
        input.pointer_released = false;
        return;
    };

    let Ok((_, mut transform, mut target, side, role)) = avatars.get_mut(entity) else {
        drag.grabbed = None;
        return;
    };

    if let Some(pointer) = input.pointer {
        let x = court.clamp_avatar_x(*side, pointer.x, AVATAR_SIZE.x);
        target.0 = Some(x);
        transform.translation.x = x;
    }

    if std::mem::take(&mut input.pointer_released) {
        // The release of a grab is not a serve/charge release either
        input.tap_released = false;
        bus.emit(GameEvent::Drag {
            role: role.name().to_string(),
            x: transform.translation.x,
        });
        target.0 = None;
        drag.grabbed = None;
    }
}
