//! Settings, types and defaults.
//!
//! Every tunable of the simulation lives in one `Settings` struct. It is
//! stored as a RON file under `data/settings/` and is hot-reloadable using the
//! RON watcher utilities (see `ron::setup_ron_watcher`). Missing fields fall
//! back to the reference values below.
pub mod loader;

use crate::error::ConfigError;
use bevy::prelude::{KeyCode, Resource};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::f32::consts::{FRAC_PI_2, FRAC_PI_3};

/// Dimensions and layout of the voxel world. Fixed per world instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSettings {
    #[serde(default = "WorldSettings::default_width")]
    pub width: i32, // Blocks along X.
    #[serde(default = "WorldSettings::default_depth")]
    pub depth: i32, // Blocks along Z.
    #[serde(default = "WorldSettings::default_height")]
    pub height: i32, // Blocks along Y.
    #[serde(default = "WorldSettings::default_surface_y")]
    pub surface_y: i32, // Grass layer; everything below is cobblestone.
}

impl WorldSettings {
    fn default_width() -> i32 { 128 }
    fn default_depth() -> i32 { 128 }
    fn default_height() -> i32 { 32 }
    fn default_surface_y() -> i32 { 6 }
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            width: Self::default_width(),
            depth: Self::default_depth(),
            height: Self::default_height(),
            surface_y: Self::default_surface_y(),
        }
    }
}

/// Movement and collision tuning for the player capsule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSettings {
    #[serde(default = "PlayerSettings::default_speed")]
    pub speed: f32, // Ground speed in units per second.
    #[serde(default = "PlayerSettings::default_gravity")]
    pub gravity: f32, // Downward acceleration in units per second squared.
    #[serde(default = "PlayerSettings::default_jump_force")]
    pub jump_force: f32, // Upward velocity applied by a jump.
    #[serde(default = "PlayerSettings::default_eye_level")]
    pub eye_level: f32, // Camera height above the feet.
    #[serde(default = "PlayerSettings::default_height")]
    pub height: f32, // Collision box height.
    #[serde(default = "PlayerSettings::default_radius")]
    pub radius: f32, // Collision box half-width.
    #[serde(default = "PlayerSettings::default_spawn_height")]
    pub spawn_height: f32, // Camera height at spawn.
    #[serde(default = "PlayerSettings::default_terminal_velocity")]
    pub terminal_velocity: f32, // Maximum falling speed.
    #[serde(default)]
    pub coyote_time: f32, // Seconds after leaving the ground during which a jump is still accepted (0 disables).
    #[serde(default = "PlayerSettings::default_max_tick")]
    pub max_tick: f32, // Longest delta a single tick may integrate.
}

impl PlayerSettings {
    fn default_speed() -> f32 { 4.5 }
    fn default_gravity() -> f32 { 20.0 }
    fn default_jump_force() -> f32 { 8.0 }
    fn default_eye_level() -> f32 { 1.6 }
    fn default_height() -> f32 { 1.8 }
    fn default_radius() -> f32 { 0.3 }
    fn default_spawn_height() -> f32 { 34.0 }
    fn default_terminal_velocity() -> f32 { 50.0 }
    fn default_max_tick() -> f32 { 0.1 }
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            speed: Self::default_speed(),
            gravity: Self::default_gravity(),
            jump_force: Self::default_jump_force(),
            eye_level: Self::default_eye_level(),
            height: Self::default_height(),
            radius: Self::default_radius(),
            spawn_height: Self::default_spawn_height(),
            terminal_velocity: Self::default_terminal_velocity(),
            coyote_time: 0.0,
            max_tick: Self::default_max_tick(),
        }
    }
}

/// Look-rotation tuning shared by mouse, arrow keys and the look stick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookSettings {
    #[serde(default = "LookSettings::default_sensitivity")]
    pub mouse_sensitivity: f32, // Radians per pointer pixel.
    #[serde(default = "LookSettings::default_mouse_smoothing")]
    pub mouse_smoothing: f32, // Extra multiplier on pointer deltas.
    #[serde(default = "LookSettings::default_sensitivity")]
    pub touch_sensitivity: f32, // Radians per look-stick pixel.
    #[serde(default = "LookSettings::default_touch_smoothing")]
    pub touch_smoothing: f32, // Extra multiplier on look-stick input.
    #[serde(default = "LookSettings::default_look_stick_scale")]
    pub look_stick_scale: f32, // Pixels of thumb travel represented by a full stick deflection.
    #[serde(default = "LookSettings::default_key_look_speed")]
    pub key_look_speed: f32, // Radians per second while a look key is held.
    #[serde(default = "LookSettings::default_rotation_lerp_factor")]
    pub rotation_lerp_factor: f32, // Per-tick blend of the current angles toward the target angles.
    #[serde(default)]
    pub frame_rate_independent: bool, // Normalize the blend to a 60 Hz tick instead of applying it once per tick.
    #[serde(default = "LookSettings::default_max_pitch")]
    pub max_pitch: f32, // Vertical look clamp in radians.
}

impl LookSettings {
    fn default_sensitivity() -> f32 { 7e-4 }
    fn default_mouse_smoothing() -> f32 { 0.5 }
    fn default_touch_smoothing() -> f32 { 0.3 }
    fn default_look_stick_scale() -> f32 { 35.0 }
    fn default_key_look_speed() -> f32 { 3.0 }
    fn default_rotation_lerp_factor() -> f32 { 0.2 }
    fn default_max_pitch() -> f32 { FRAC_PI_3 }
}

impl Default for LookSettings {
    fn default() -> Self {
        Self {
            mouse_sensitivity: Self::default_sensitivity(),
            mouse_smoothing: Self::default_mouse_smoothing(),
            touch_sensitivity: Self::default_sensitivity(),
            touch_smoothing: Self::default_touch_smoothing(),
            look_stick_scale: Self::default_look_stick_scale(),
            key_look_speed: Self::default_key_look_speed(),
            rotation_lerp_factor: Self::default_rotation_lerp_factor(),
            frame_rate_independent: false,
            max_pitch: Self::default_max_pitch(),
        }
    }
}

/// Break/place gating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionSettings {
    #[serde(default = "InteractionSettings::default_cooldown_ms")]
    pub break_cooldown_ms: u64, // Minimum spacing between two successful breaks.
    #[serde(default = "InteractionSettings::default_cooldown_ms")]
    pub place_cooldown_ms: u64, // Minimum spacing between two successful placements.
    #[serde(default = "InteractionSettings::default_reach")]
    pub reach: f32, // Maximum ray length for both actions.
}

impl InteractionSettings {
    fn default_cooldown_ms() -> u64 { 500 }
    fn default_reach() -> f32 { 20.0 }
}

impl Default for InteractionSettings {
    fn default() -> Self {
        Self {
            break_cooldown_ms: Self::default_cooldown_ms(),
            place_cooldown_ms: Self::default_cooldown_ms(),
            reach: Self::default_reach(),
        }
    }
}

/// Controls / input settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlsSettings {
    #[serde(default)]
    pub invert_y: bool, // Invert pointer Y axis
    #[serde(default)]
    pub invert_x: bool, // Invert pointer X axis
    #[serde(default = "ControlsSettings::default_keybinds")]
    pub keybinds: HashMap<String, String>, // Map of action names to key identifiers (editable by user)
}

impl ControlsSettings {
    fn default_keybinds() -> HashMap<String, String> {
        [
            ("forward", "W"),
            ("back", "S"),
            ("left", "A"),
            ("right", "D"),
            ("look_up", "Up"),
            ("look_down", "Down"),
            ("look_left", "Left"),
            ("look_right", "Right"),
            ("jump", "Space"),
            ("break", "B"),
            ("place", "P"),
            ("teleport", "R"),
            ("pause", "Escape"),
            ("dump_debug", "F3"),
        ]
        .into_iter()
        .map(|(action, key)| (action.to_string(), key.to_string()))
        .collect()
    }
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            invert_y: false,
            invert_x: false,
            keybinds: Self::default_keybinds(),
        }
    }
}

/// Top-level Settings
#[derive(Resource, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub world: WorldSettings,
    #[serde(default)]
    pub player: PlayerSettings,
    #[serde(default)]
    pub look: LookSettings,
    #[serde(default)]
    pub interaction: InteractionSettings,
    #[serde(default)]
    pub controls: ControlsSettings,
}

fn positive(name: &'static str, v: f32) -> Result<(), ConfigError> {
    if v.is_finite() && v > 0.0 { Ok(()) } else { Err(ConfigError::NonPositive(name)) }
}

fn non_negative(name: &'static str, v: f32) -> Result<(), ConfigError> {
    if v.is_finite() && v >= 0.0 { Ok(()) } else { Err(ConfigError::Negative(name)) }
}

/// Largest accepted world width, depth or height.
pub const MAX_WORLD_DIMENSION: i32 = 4096;

impl Settings {
    #[must_use]
    pub fn defaults() -> Self { Settings::default() }

    /// Parse settings from a RON string and validate them.
    ///
    /// # Errors
    /// Returns `ConfigError::Parse` for malformed RON and any validation error
    /// from [`Settings::validate`].
    pub fn from_ron_str(s: &str) -> Result<Self, ConfigError> {
        let settings: Settings = ron::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values that cannot describe a playable world.
    ///
    /// # Errors
    /// Returns the first `ConfigError` found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let w = &self.world;
        for (name, v) in [("width", w.width), ("depth", w.depth), ("height", w.height)] {
            if v <= 0 {
                return Err(ConfigError::NonPositiveDimension(name));
            }
            if v > MAX_WORLD_DIMENSION {
                return Err(ConfigError::DimensionTooLarge { name, max: MAX_WORLD_DIMENSION });
            }
        }
        if w.surface_y < 0 || w.surface_y >= w.height {
            return Err(ConfigError::SurfaceAboveWorld { surface_y: w.surface_y, height: w.height });
        }

        let p = &self.player;
        positive("speed", p.speed)?;
        positive("gravity", p.gravity)?;
        non_negative("jump_force", p.jump_force)?;
        positive("eye_level", p.eye_level)?;
        positive("height", p.height)?;
        positive("radius", p.radius)?;
        positive("spawn_height", p.spawn_height)?;
        positive("terminal_velocity", p.terminal_velocity)?;
        non_negative("coyote_time", p.coyote_time)?;
        positive("max_tick", p.max_tick)?;
        if p.eye_level > p.height {
            return Err(ConfigError::EyeAboveHead { eye_level: p.eye_level, height: p.height });
        }

        let l = &self.look;
        non_negative("mouse_sensitivity", l.mouse_sensitivity)?;
        non_negative("mouse_smoothing", l.mouse_smoothing)?;
        non_negative("touch_sensitivity", l.touch_sensitivity)?;
        non_negative("touch_smoothing", l.touch_smoothing)?;
        non_negative("look_stick_scale", l.look_stick_scale)?;
        non_negative("key_look_speed", l.key_look_speed)?;
        let f = l.rotation_lerp_factor;
        if !(f.is_finite() && f > 0.0 && f <= 1.0) {
            return Err(ConfigError::LerpFactor(f));
        }
        if !(l.max_pitch.is_finite() && l.max_pitch > 0.0 && l.max_pitch < FRAC_PI_2) {
            return Err(ConfigError::MaxPitch(l.max_pitch));
        }

        positive("reach", self.interaction.reach)?;
        Ok(())
    }

    /// Resolve the key bound to `action`, falling back to `default` when the
    /// binding is missing or names an unknown key.
    #[must_use]
    pub fn key_for(&self, action: &str, default: KeyCode) -> KeyCode {
        self.controls
            .keybinds
            .get(action)
            .and_then(|s| Settings::keycode_from_str(s))
            .unwrap_or(default)
    }

    /// Convert a string key identifier (e.g., from `controls.keybinds`) into a `KeyCode` that
    /// can be used with Bevy's input system.
    ///
    /// # Arguments
    /// * `name` - The string key identifier to convert (e.g., "W", "Space", "F1").
    ///
    /// # Returns
    /// An `Option<KeyCode>` corresponding to the provided string, or `None` if the string
    /// does not match any known key.
    #[must_use]
    pub fn keycode_from_str(name: &str) -> Option<KeyCode> {
        const LETTERS: [KeyCode; 26] = [
            KeyCode::KeyA, KeyCode::KeyB, KeyCode::KeyC, KeyCode::KeyD, KeyCode::KeyE,
            KeyCode::KeyF, KeyCode::KeyG, KeyCode::KeyH, KeyCode::KeyI, KeyCode::KeyJ,
            KeyCode::KeyK, KeyCode::KeyL, KeyCode::KeyM, KeyCode::KeyN, KeyCode::KeyO,
            KeyCode::KeyP, KeyCode::KeyQ, KeyCode::KeyR, KeyCode::KeyS, KeyCode::KeyT,
            KeyCode::KeyU, KeyCode::KeyV, KeyCode::KeyW, KeyCode::KeyX, KeyCode::KeyY,
            KeyCode::KeyZ,
        ];
        const DIGITS: [KeyCode; 10] = [
            KeyCode::Digit0, KeyCode::Digit1, KeyCode::Digit2, KeyCode::Digit3, KeyCode::Digit4,
            KeyCode::Digit5, KeyCode::Digit6, KeyCode::Digit7, KeyCode::Digit8, KeyCode::Digit9,
        ];
        const FUNCTION: [KeyCode; 12] = [
            KeyCode::F1, KeyCode::F2, KeyCode::F3, KeyCode::F4, KeyCode::F5, KeyCode::F6,
            KeyCode::F7, KeyCode::F8, KeyCode::F9, KeyCode::F10, KeyCode::F11, KeyCode::F12,
        ];

        let s = name.trim().to_ascii_uppercase();
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if c.is_ascii_uppercase() {
                return Some(LETTERS[(c as u8 - b'A') as usize]);
            }
            if c.is_ascii_digit() {
                return Some(DIGITS[(c as u8 - b'0') as usize]);
            }
        }
        if let Some(n) = s.strip_prefix('F').and_then(|n| n.parse::<usize>().ok())
            && (1..=FUNCTION.len()).contains(&n)
        {
            return Some(FUNCTION[n - 1]);
        }

        Some(match s.as_str() {
            "LEFT" | "ARROWLEFT" => KeyCode::ArrowLeft,
            "RIGHT" | "ARROWRIGHT" => KeyCode::ArrowRight,
            "UP" | "ARROWUP" => KeyCode::ArrowUp,
            "DOWN" | "ARROWDOWN" => KeyCode::ArrowDown,
            "ESC" | "ESCAPE" => KeyCode::Escape,
            "SPACE" => KeyCode::Space,
            "TAB" => KeyCode::Tab,
            "ENTER" | "RETURN" => KeyCode::Enter,
            "BACKSPACE" => KeyCode::Backspace,
            "LSHIFT" | "SHIFT" => KeyCode::ShiftLeft,
            "RSHIFT" => KeyCode::ShiftRight,
            "LCTRL" | "CTRL" | "CONTROL" => KeyCode::ControlLeft,
            "RCTRL" => KeyCode::ControlRight,
            "LALT" | "ALT" => KeyCode::AltLeft,
            "RALT" => KeyCode::AltRight,
            _ => return None,
        })
    }
}
