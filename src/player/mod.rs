//! Player controller (look, movement, physics).
//!
//! The module provides the `Player` body owned by the simulation, the
//! `PlayerIntent` input surface the host writes into, and convenience
//! re-exports for the look, movement and physics helpers.
//!
//! # Example:
//!
//! ```
//! use bevy::math::IVec3;
//! use cavegame::player::Player;
//! use cavegame::settings::Settings;
//! use cavegame::world::VoxelWorld;
//!
//! let settings = Settings::defaults();
//! let mut world = VoxelWorld::new(&settings.world);
//! world.generate();
//! let mut player = Player::spawn(world.dimensions(), &settings.player);
//! player.intent.forward = true;
//! player.tick(&world, &settings, 1.0 / 60.0);
//! ```
pub mod camera;
pub mod movement;
pub mod physics;

use crate::settings::{PlayerSettings, Settings};
use crate::world::{Ray, VoxelWorld};
use bevy::log::info;
use bevy::math::{IVec3, Vec2, Vec3};

pub use camera::*;
pub use movement::*;
pub use physics::*;

/// Abstract input state, independent of the device that produced it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerIntent {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub look_up: bool,
    pub look_down: bool,
    pub look_left: bool,
    pub look_right: bool,
    /// Analog move stick in `[-1, 1]²`; `x` strafes, `-y` walks forward.
    pub move_stick: Vec2,
    /// Analog look stick in `[-1, 1]²`.
    pub look_stick: Vec2,
    pointer_delta: Vec2,
}

impl PlayerIntent {
    /// Accumulate relative pointer motion until the next tick consumes it.
    pub fn add_pointer_delta(&mut self, delta: Vec2) {
        if delta.is_finite() {
            self.pointer_delta += delta;
        }
    }

    /// Take the accumulated pointer motion, leaving zero behind.
    pub fn take_pointer_delta(&mut self) -> Vec2 {
        std::mem::take(&mut self.pointer_delta)
    }

    /// Release every held flag and stick.
    pub fn clear(&mut self) {
        *self = PlayerIntent::default();
    }
}

/// Camera position and look angles, as read by the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub pitch: f32,
    pub yaw: f32,
}

/// Kinematic player body.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    /// Camera (eye) position; the feet are `eye_level` below it.
    pub position: Vec3,
    pub look: PlayerLook,
    /// Vertical velocity in world units per second.
    pub velocity_y: f32,
    /// Whether downward motion was stopped by a floor this tick.
    pub grounded: bool,
    /// Seconds since the player was last grounded.
    pub air_time: f32,
    pub intent: PlayerIntent,
}

impl Player {
    /// Spawn above the middle of a world of size `dimensions`, looking along -Z.
    #[must_use]
    pub fn spawn(dimensions: IVec3, settings: &PlayerSettings) -> Self {
        Player {
            position: Vec3::new(dimensions.x as f32 / 2.0, settings.spawn_height, dimensions.z as f32 / 2.0),
            look: PlayerLook::default(),
            velocity_y: 0.0,
            grounded: false,
            air_time: f32::INFINITY,
            intent: PlayerIntent::default(),
        }
    }

    #[must_use]
    pub fn pose(&self) -> Pose {
        Pose {
            position: self.position,
            pitch: self.look.pitch,
            yaw: self.look.yaw,
        }
    }

    #[must_use]
    pub fn look_direction(&self) -> Vec3 {
        self.look.direction()
    }

    /// Ray from the eye along the view direction.
    #[must_use]
    pub fn look_ray(&self) -> Ray {
        Ray::new(self.position, self.look_direction())
    }

    /// Face `dir` immediately (pitch clamped to `max_pitch`).
    pub fn look_at(&mut self, dir: Vec3, max_pitch: f32) {
        self.look.look_at(dir, max_pitch);
    }

    /// Advance one tick: look, desired motion, gravity, collision.
    pub fn tick(&mut self, world: &VoxelWorld, settings: &Settings, dt: f32) {
        self.look.integrate(&mut self.intent, settings, dt);
        let dir = desired_direction(&self.intent, self.look.yaw);
        physics_step(self, world, &settings.player, dir, dt);
    }

    /// Start a jump.
    ///
    /// # Return
    /// * `true` if grounded, or still inside the coyote window.
    pub fn jump(&mut self, settings: &PlayerSettings) -> bool {
        let coyote = settings.coyote_time > 0.0 && self.air_time <= settings.coyote_time;
        if !self.grounded && !coyote {
            return false;
        }
        self.velocity_y = settings.jump_force;
        self.grounded = false;
        self.air_time = f32::INFINITY;
        true
    }

    /// Escape hatch for a stuck player: drop in from high above a random
    /// column of a world of size `dimensions`.
    pub fn teleport_to_random(&mut self, dimensions: IVec3, rng: &mut fastrand::Rng) {
        let x = rng.i32(0..dimensions.x.max(1)) as f32;
        let z = rng.i32(0..dimensions.z.max(1)) as f32;
        let y = 50.0 + rng.f32() * 100.0;
        self.position = Vec3::new(x, y, z);
        self.velocity_y = 0.0;
        self.grounded = false;
        self.air_time = f32::INFINITY;
        info!("teleported player to {}", self.position);
    }
}
