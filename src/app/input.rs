//! Keyboard and mouse to the simulation's intent surface.
//!
//! Held keys become intent flags, mouse motion (while the cursor is grabbed)
//! feeds the pointer accumulator, and presses of the action keys queue
//! discrete `InputEvent`s. Queued events are applied after the tick so they
//! see the post-tick pose. Touch drags and gamepad sticks drive the analog
//! move and look sticks.

use bevy::ecs::schedule::SystemConfigs;
use bevy::input::gamepad::{GamepadAxisType, Gamepads};
use bevy::input::mouse::MouseMotion;
use bevy::input::touch::Touches;
use bevy::prelude::*;
use bevy::window::{CursorGrabMode, PrimaryWindow};
use cavegame::settings::Settings;
use cavegame::sim::{InputEvent, Simulation};

/// Discrete events captured this frame, in arrival order.
#[derive(Resource, Default)]
pub struct PendingInput(pub Vec<InputEvent>);

/// Device capture followed by the grab toggle. Capture sees the cursor
/// state from before this frame's click, so the click that grabs the cursor
/// does not also break a block.
pub fn input_systems() -> SystemConfigs {
    (capture_input, capture_sticks, cursor_grab).chain()
}

/// Drag distance, in logical pixels, that fully deflects a touch stick.
pub const TOUCH_STICK_RADIUS: f32 = 35.0;

/// Toggle cursor grab and visibility.
///
/// # Arguments
/// * `wq` - mutable window query to change cursor state
/// * `mb` - mouse button input to detect left-click for grabbing
/// * `kb` - keyboard input to detect the pause key to release cursor
#[allow(clippy::needless_pass_by_value)]
pub fn cursor_grab(
    mut wq: Query<&mut Window, With<PrimaryWindow>>,
    mb: Res<ButtonInput<MouseButton>>,
    kb: Res<ButtonInput<KeyCode>>,
    settings: Res<Settings>,
) {
    let Ok(mut w) = wq.get_single_mut() else { return };
    if mb.just_pressed(MouseButton::Left) && w.cursor.visible {
        w.cursor.grab_mode = CursorGrabMode::Locked;
        w.cursor.visible = false;
    }
    if kb.just_pressed(settings.key_for("pause", KeyCode::Escape)) {
        w.cursor.grab_mode = CursorGrabMode::None;
        w.cursor.visible = true;
    }
}

/// Copy device state into the player's intent and queue action presses.
///
/// # Arguments
/// * `kb`, `mb` - keyboard and mouse button state
/// * `motion_events` - mouse motion for this update
/// * `windows` - primary window, to check whether the cursor is grabbed
/// * `settings` - key bindings and axis inversion
/// * `sim` - receives the intent
/// * `pending` - receives the discrete events
#[allow(clippy::needless_pass_by_value)]
pub fn capture_input(
    kb: Res<ButtonInput<KeyCode>>,
    mb: Res<ButtonInput<MouseButton>>,
    motion_events: Res<Events<MouseMotion>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    settings: Res<Settings>,
    mut sim: ResMut<Simulation>,
    mut pending: ResMut<PendingInput>,
) {
    let grabbed = windows.get_single().is_ok_and(|w| !w.cursor.visible);
    let held = |action: &str, default: KeyCode| kb.pressed(settings.key_for(action, default));
    let pressed = |action: &str, default: KeyCode| kb.just_pressed(settings.key_for(action, default));

    let intent = sim.intent_mut();
    intent.forward = held("forward", KeyCode::KeyW);
    intent.backward = held("back", KeyCode::KeyS);
    intent.left = held("left", KeyCode::KeyA);
    intent.right = held("right", KeyCode::KeyD);
    intent.look_up = held("look_up", KeyCode::ArrowUp);
    intent.look_down = held("look_down", KeyCode::ArrowDown);
    intent.look_left = held("look_left", KeyCode::ArrowLeft);
    intent.look_right = held("look_right", KeyCode::ArrowRight);

    if grabbed {
        for ev in motion_events.iter_current_update_events() {
            let mut axis = ev.delta;
            if settings.controls.invert_x {
                axis.x = -axis.x;
            }
            if settings.controls.invert_y {
                axis.y = -axis.y;
            }
            intent.add_pointer_delta(axis);
        }
    }

    if pressed("break", KeyCode::KeyB) || (grabbed && mb.just_pressed(MouseButton::Left)) {
        pending.0.push(InputEvent::Break);
    }
    if pressed("place", KeyCode::KeyP) || (grabbed && mb.just_pressed(MouseButton::Right)) {
        pending.0.push(InputEvent::Place);
    }
    if pressed("jump", KeyCode::Space) {
        pending.0.push(InputEvent::Jump);
    }
    if pressed("teleport", KeyCode::KeyR) {
        pending.0.push(InputEvent::Teleport);
    }
}

/// Deflection of a touch stick dragged from `start` to `now`, with screen
/// down as positive y. Longer drags saturate at length 1.
#[must_use]
pub fn drag_stick(start: Vec2, now: Vec2) -> Vec2 {
    ((now - start) / TOUCH_STICK_RADIUS).clamp_length_max(1.0)
}

/// Gamepad axes (up positive) to a stick with screen-down positive y.
#[must_use]
pub fn gamepad_stick(x: f32, y: f32) -> Vec2 {
    let stick = Vec2::new(x, -y);
    if stick.is_finite() { stick.clamp_length_max(1.0) } else { Vec2::ZERO }
}

/// Fill the analog sticks from touch drags and the first gamepad.
///
/// A touch that starts on the left half of the window moves, one on the
/// right half looks. A stick with no active touch falls back to the gamepad.
#[allow(clippy::needless_pass_by_value)]
pub fn capture_sticks(
    touches: Res<Touches>,
    gamepads: Res<Gamepads>,
    axes: Res<Axis<GamepadAxis>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut sim: ResMut<Simulation>,
) {
    let half_width = windows.get_single().map_or(f32::INFINITY, |w| w.width() / 2.0);
    let mut move_touch = None;
    let mut look_touch = None;
    for touch in touches.iter() {
        let slot = if touch.start_position().x < half_width { &mut move_touch } else { &mut look_touch };
        slot.get_or_insert(drag_stick(touch.start_position(), touch.position()));
    }

    let pad = gamepads.iter().next();
    let pad_stick = |x: GamepadAxisType, y: GamepadAxisType| {
        pad.map_or(Vec2::ZERO, |g| {
            gamepad_stick(
                axes.get(GamepadAxis::new(g, x)).unwrap_or_default(),
                axes.get(GamepadAxis::new(g, y)).unwrap_or_default(),
            )
        })
    };

    let intent = sim.intent_mut();
    intent.move_stick = move_touch
        .unwrap_or_else(|| pad_stick(GamepadAxisType::LeftStickX, GamepadAxisType::LeftStickY));
    intent.look_stick = look_touch
        .unwrap_or_else(|| pad_stick(GamepadAxisType::RightStickX, GamepadAxisType::RightStickY));
}

/// Apply queued events against the post-tick state.
#[allow(clippy::needless_pass_by_value)]
pub fn dispatch_input_events(time: Res<Time>, mut sim: ResMut<Simulation>, mut pending: ResMut<PendingInput>) {
    let now = time.elapsed();
    for event in pending.0.drain(..) {
        let applied = sim.handle(event, now);
        debug!("{event:?} applied={applied}");
    }
}
