//! Look orientation and its smoothing.
//!
//! `PlayerLook` keeps the current angles and the target angles they chase.
//! Input only ever moves the targets; `PlayerLook::integrate` then blends the
//! current angles toward them once per tick. Pitch is positive when looking
//! up and yaw turns counter-clockwise seen from above, so `yaw = 0` faces -Z.

use crate::player::PlayerIntent;
use crate::settings::{LookSettings, Settings};
use bevy::math::{Vec2, Vec3};
use std::f32::consts::{PI, TAU};

/// Stores the player's look orientation (yaw and pitch) in radians.
///
/// - `yaw`, `target_yaw`: rotation around the Y axis, kept in `[0, 2π)`.
/// - `pitch`, `target_pitch`: rotation around the X axis, kept within `±max_pitch`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerLook {
    pub yaw: f32,
    pub pitch: f32,
    pub target_yaw: f32,
    pub target_pitch: f32,
}

/// Reduce an angle into `[0, 2π)`.
#[must_use]
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Signed shortest arc from `from` to `to`, in `(-π, π]`.
#[must_use]
pub fn shortest_arc(from: f32, to: f32) -> f32 {
    let d = (to - from).rem_euclid(TAU);
    if d > PI { d - TAU } else { d }
}

impl PlayerLook {
    /// Apply a raw pointer delta (pixels) to the target angles.
    ///
    /// Public so benchmarks/systems can call the same logic.
    pub fn apply_delta(&mut self, delta: Vec2, settings: &Settings) {
        if !delta.is_finite() {
            return;
        }
        let look = &settings.look;
        let scale = look.mouse_sensitivity * look.mouse_smoothing;
        self.target_yaw -= delta.x * scale;
        self.target_pitch -= delta.y * scale;
        self.settle_targets(look);
    }

    /// Apply a look-stick deflection in `[-1, 1]²` to the target angles.
    pub fn apply_stick(&mut self, stick: Vec2, settings: &Settings) {
        if !stick.is_finite() {
            return;
        }
        let look = &settings.look;
        let stick = stick.clamp(Vec2::NEG_ONE, Vec2::ONE);
        let scale = look.look_stick_scale * look.touch_sensitivity * look.touch_smoothing;
        self.target_yaw -= stick.x * scale;
        self.target_pitch -= stick.y * scale;
        self.settle_targets(look);
    }

    /// One tick of look integration: key intents, pointer accumulator and
    /// stick move the targets, then the current angles blend toward them.
    ///
    /// # Arguments
    /// * `intent` - input state; its pointer accumulator is consumed
    /// * `settings` - sensitivity and smoothing tunables
    /// * `dt` - tick length in seconds
    pub fn integrate(&mut self, intent: &mut PlayerIntent, settings: &Settings, dt: f32) {
        let look = &settings.look;
        let key_step = look.key_look_speed * dt;
        let mut keys = Vec2::ZERO;
        if intent.look_up {
            keys.y += 1.0;
        }
        if intent.look_down {
            keys.y -= 1.0;
        }
        if intent.look_left {
            keys.x += 1.0;
        }
        if intent.look_right {
            keys.x -= 1.0;
        }
        self.target_yaw += keys.x * key_step;
        self.target_pitch += keys.y * key_step;
        self.settle_targets(look);

        self.apply_delta(intent.take_pointer_delta(), settings);
        self.apply_stick(intent.look_stick, settings);

        let f = blend_factor(look, dt);
        self.pitch = (self.pitch + (self.target_pitch - self.pitch) * f).clamp(-look.max_pitch, look.max_pitch);
        self.yaw = wrap_angle(self.yaw + shortest_arc(self.yaw, self.target_yaw) * f);
    }

    /// Point at `dir` immediately, bypassing smoothing. Pitch is clamped.
    pub fn look_at(&mut self, dir: Vec3, max_pitch: f32) {
        let Some(dir) = dir.try_normalize() else {
            return;
        };
        let horizontal = Vec2::new(dir.x, dir.z);
        let pitch = dir.y.clamp(-1.0, 1.0).asin().clamp(-max_pitch, max_pitch);
        let yaw = if horizontal.length_squared() > f32::EPSILON {
            wrap_angle((-dir.x).atan2(-dir.z))
        } else {
            self.yaw
        };
        *self = PlayerLook { yaw, pitch, target_yaw: yaw, target_pitch: pitch };
    }

    /// Unit forward vector of the current angles.
    #[must_use]
    pub fn direction(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        Vec3::new(-sy * cp, sp, -cy * cp)
    }

    fn settle_targets(&mut self, look: &LookSettings) {
        self.target_pitch = self.target_pitch.clamp(-look.max_pitch, look.max_pitch);
        self.target_yaw = wrap_angle(self.target_yaw);
    }
}

fn blend_factor(look: &LookSettings, dt: f32) -> f32 {
    let f = look.rotation_lerp_factor;
    if look.frame_rate_independent {
        1.0 - (1.0 - f).powf(60.0 * dt)
    } else {
        f
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn wrap_stays_in_range() {
        assert_eq!(wrap_angle(0.0), 0.0);
        assert!((wrap_angle(-FRAC_PI_2) - 3.0 * FRAC_PI_2).abs() < 1e-5);
        assert!((wrap_angle(TAU + 1.0) - 1.0).abs() < 1e-5);
        let tiny = wrap_angle(-1e-9);
        assert!((0.0..TAU).contains(&tiny));
    }

    #[test]
    fn shortest_arc_crosses_zero() {
        assert!((shortest_arc(0.1, TAU - 0.1) + 0.2).abs() < 1e-5);
        assert!((shortest_arc(TAU - 0.1, 0.1) - 0.2).abs() < 1e-5);
    }

    #[test]
    fn pointer_delta_moves_targets_then_blends() {
        let settings = Settings::defaults();
        let mut look = PlayerLook::default();
        let mut intent = PlayerIntent::default();
        intent.add_pointer_delta(Vec2::new(0.0, -100.0));
        look.integrate(&mut intent, &settings, 1.0 / 60.0);
        let expected_target = 100.0 * 7e-4 * 0.5;
        assert!((look.target_pitch - expected_target).abs() < 1e-6);
        assert!((look.pitch - expected_target * 0.2).abs() < 1e-6);
        assert_eq!(intent.take_pointer_delta(), Vec2::ZERO);
    }

    #[test]
    fn pitch_is_clamped_both_ways() {
        let settings = Settings::defaults();
        let max = settings.look.max_pitch;
        let mut look = PlayerLook::default();
        let mut intent = PlayerIntent::default();
        intent.look_up = true;
        for _ in 0..600 {
            look.integrate(&mut intent, &settings, 1.0 / 60.0);
            assert!(look.pitch <= max && look.target_pitch <= max);
        }
        assert!((look.pitch - max).abs() < 1e-3);
        intent.look_up = false;
        intent.add_pointer_delta(Vec2::new(0.0, 1e7));
        look.integrate(&mut intent, &settings, 1.0 / 60.0);
        assert_eq!(look.target_pitch, -max);
        assert!(look.pitch >= -max);
    }

    #[test]
    fn yaw_blend_takes_the_short_way_round() {
        let settings = Settings::defaults();
        let mut look = PlayerLook { yaw: 0.05, target_yaw: 0.05, ..Default::default() };
        let mut intent = PlayerIntent::default();
        intent.look_right = true;
        look.integrate(&mut intent, &settings, 0.1);
        assert!(look.target_yaw > 6.0);
        assert!(look.yaw > 6.0 || look.yaw < 0.05, "yaw {} went the long way", look.yaw);
        assert!((0.0..TAU).contains(&look.yaw));
    }

    #[test]
    fn frame_rate_independent_blend_matches_at_60hz() {
        let mut settings = Settings::defaults();
        settings.look.frame_rate_independent = true;
        assert!((blend_factor(&settings.look, 1.0 / 60.0) - 0.2).abs() < 1e-5);
        assert!(blend_factor(&settings.look, 1.0 / 30.0) > 0.2);
    }

    #[test]
    fn look_at_round_trips_direction() {
        let mut look = PlayerLook::default();
        look.look_at(Vec3::X, 1.0);
        assert!((look.yaw - 3.0 * FRAC_PI_2).abs() < 1e-5);
        assert!(look.direction().abs_diff_eq(Vec3::X, 1e-5));
        look.look_at(Vec3::NEG_Y, 1.0);
        assert_eq!(look.pitch, -1.0);
        assert_eq!(look.target_pitch, -1.0);
    }

    #[test]
    fn non_finite_input_is_ignored() {
        let settings = Settings::defaults();
        let mut look = PlayerLook::default();
        look.apply_delta(Vec2::new(f32::NAN, 1.0), &settings);
        look.apply_stick(Vec2::new(0.0, f32::INFINITY), &settings);
        assert_eq!(look, PlayerLook::default());
    }
}
