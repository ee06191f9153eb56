//! Mouse and touch folded into one pointer, in window (client) coordinates
//! with the origin at the top-left.

use bevy::prelude::*;

pub fn just_pressed_screen_position(
    button_input: &Res<ButtonInput<MouseButton>>,
    touch_input: &Res<Touches>,
    windows: &Query<&Window>,
) -> Option<Vec2> {
    if button_input.just_pressed(MouseButton::Left) {
        let cursor_position = windows.single().cursor_position()?;
        Some(cursor_position)
    } else if touch_input.any_just_pressed() {
        let touch = touch_input.iter_just_pressed().next()?;
        Some(touch.position())
    } else {
        None
    }
}

/// Where the pointer is while the button or finger stays down.
pub fn held_screen_position(
    button_input: &Res<ButtonInput<MouseButton>>,
    touch_input: &Res<Touches>,
    windows: &Query<&Window>,
) -> Option<Vec2> {
    if button_input.pressed(MouseButton::Left) {
        windows.single().cursor_position()
    } else {
        touch_input.first_pressed_position()
    }
}

/// True when the pointer was let go this frame, including a cancelled touch
/// or the cursor leaving the window with the button still down.
pub fn just_released(
    button_input: &Res<ButtonInput<MouseButton>>,
    touch_input: &Res<Touches>,
) -> bool {
    button_input.just_released(MouseButton::Left)
        || touch_input.any_just_released()
        || touch_input.any_just_canceled()
}

/// Converts a world-space point to window coordinates through the single 2D
/// camera.
pub fn world_to_screen(camera: &Query<(&Camera, &GlobalTransform)>, point: Vec2) -> Option<Vec2> {
    let (camera, camera_transform) = camera.single();

    camera
        .world_to_viewport(camera_transform, point.extend(0.))
        .ok()
}
