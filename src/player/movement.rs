//! Desired horizontal motion from movement intents.
//!
//! Turns the forward/back/left/right flags and the move stick into a unit
//! direction on the XZ plane, relative to the current yaw.

use crate::player::PlayerIntent;
use bevy::math::{Vec2, Vec3};

/// Horizontal basis `(front, right)` for a yaw angle.
#[must_use]
pub fn horizontal_basis(yaw: f32) -> (Vec3, Vec3) {
    let (s, c) = yaw.sin_cos();
    (Vec3::new(-s, 0.0, -c), Vec3::new(c, 0.0, -s))
}

/// Unit direction the intents ask for, or zero when they cancel out.
///
/// # Arguments
/// * `intent` - movement flags and the move stick (`x` strafes, `-y` walks forward)
/// * `yaw` - current yaw in radians
#[must_use]
pub fn desired_direction(intent: &PlayerIntent, yaw: f32) -> Vec3 {
    let (front, right) = horizontal_basis(yaw);
    let mut dir = Vec3::ZERO;
    if intent.forward {
        dir += front;
    }
    if intent.backward {
        dir -= front;
    }
    if intent.right {
        dir += right;
    }
    if intent.left {
        dir -= right;
    }
    let stick = if intent.move_stick.is_finite() {
        intent.move_stick.clamp(Vec2::NEG_ONE, Vec2::ONE)
    } else {
        Vec2::ZERO
    };
    dir += right * stick.x - front * stick.y;
    dir.normalize_or_zero()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn forward_at_zero_yaw_is_negative_z() {
        let intent = PlayerIntent { forward: true, ..Default::default() };
        assert!(desired_direction(&intent, 0.0).abs_diff_eq(Vec3::NEG_Z, 1e-6));
    }

    #[test]
    fn strafe_follows_yaw() {
        let intent = PlayerIntent { right: true, ..Default::default() };
        assert!(desired_direction(&intent, 0.0).abs_diff_eq(Vec3::X, 1e-6));
        assert!(desired_direction(&intent, FRAC_PI_2).abs_diff_eq(Vec3::NEG_Z, 1e-6));
    }

    #[test]
    fn diagonal_is_normalized() {
        let intent = PlayerIntent { forward: true, left: true, ..Default::default() };
        assert!((desired_direction(&intent, 0.3).length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn opposite_flags_cancel() {
        let intent = PlayerIntent { forward: true, backward: true, ..Default::default() };
        assert_eq!(desired_direction(&intent, 1.0), Vec3::ZERO);
    }

    #[test]
    fn stick_up_walks_forward() {
        let intent = PlayerIntent { move_stick: Vec2::new(0.0, -1.0), ..Default::default() };
        assert!(desired_direction(&intent, 0.0).abs_diff_eq(Vec3::NEG_Z, 1e-6));
        let bad = PlayerIntent { move_stick: Vec2::new(f32::NAN, 0.0), ..Default::default() };
        assert_eq!(desired_direction(&bad, 0.0), Vec3::ZERO);
    }
}
