//! Breaking and placing blocks through the player's view ray.
//!
//! `InteractionService` casts a ray into the world and either removes the
//! voxel it hits or places one in the empty cell in front of the hit face.
//! Each action has its own cooldown; an action inside its cooldown is dropped,
//! never queued. Only successful actions restart a cooldown, so a refused
//! break (bedrock, miss) leaves the next attempt free.
//!
//! # Examples
//!
//! ```rust
//! use std::time::Duration;
//! use bevy::math::{IVec3, Vec3};
//! use cavegame::block::InteractionService;
//! use cavegame::settings::Settings;
//! use cavegame::world::{Ray, VoxelWorld};
//!
//! let settings = Settings::defaults();
//! let mut world = VoxelWorld::new(&settings.world);
//! world.generate();
//! let mut service = InteractionService::new(&settings.interaction);
//!
//! // Looking straight down from above the grass at (10, 6, 10).
//! let ray = Ray::new(Vec3::new(10.5, 8.6, 10.5), Vec3::NEG_Y);
//! assert!(service.break_block(&mut world, ray, Duration::ZERO));
//! assert!(!world.has_block(IVec3::new(10, 6, 10)));
//! // Still cooling down.
//! assert!(!service.break_block(&mut world, ray, Duration::from_millis(100)));
//! ```
use crate::block::BlockKind;
use crate::player::physics::Aabb;
use crate::settings::InteractionSettings;
use crate::world::{Ray, RaycastHit, VoxelWorld};
use bevy::log::debug;
use bevy::math::IVec3;
use std::time::Duration;

/// Cooldown-gated break/place actions.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionService {
    break_cooldown: Duration,
    place_cooldown: Duration,
    reach: f32,
    last_break: Option<Duration>,
    last_place: Option<Duration>,
}

impl InteractionService {
    #[must_use]
    pub fn new(settings: &InteractionSettings) -> Self {
        let mut service = InteractionService {
            break_cooldown: Duration::ZERO,
            place_cooldown: Duration::ZERO,
            reach: 0.0,
            last_break: None,
            last_place: None,
        };
        service.apply_settings(settings);
        service
    }

    /// Swap in new cooldowns and reach, keeping the action timestamps.
    pub fn apply_settings(&mut self, settings: &InteractionSettings) {
        self.break_cooldown = Duration::from_millis(settings.break_cooldown_ms);
        self.place_cooldown = Duration::from_millis(settings.place_cooldown_ms);
        self.reach = settings.reach;
    }

    /// The block the ray currently points at, within reach.
    #[must_use]
    pub fn target(&self, world: &VoxelWorld, ray: Ray) -> Option<RaycastHit> {
        world.raycast(ray.origin, ray.direction, self.reach)
    }

    /// Remove the block hit by `ray`.
    ///
    /// # Arguments
    /// * `world` - world to mutate
    /// * `ray` - usually the player's view ray
    /// * `now` - host clock reading
    ///
    /// # Return
    /// * `true` if a block was removed.
    pub fn break_block(&mut self, world: &mut VoxelWorld, ray: Ray, now: Duration) -> bool {
        if cooling_down(self.last_break, self.break_cooldown, now) {
            debug!("break ignored: cooling down");
            return false;
        }
        let Some(hit) = self.target(world, ray) else {
            return false;
        };
        if !world.remove_block(hit.coord) {
            return false;
        }
        self.last_break = Some(now);
        true
    }

    /// Place a block against the face hit by `ray`. The kind follows the
    /// layer rule of the target cell.
    ///
    /// # Return
    /// * `true` if a block was placed.
    pub fn place_block(&mut self, world: &mut VoxelWorld, ray: Ray, now: Duration) -> bool {
        self.place_where(world, ray, now, |_| true)
    }

    /// Like [`InteractionService::place_block`], but refuses a target cell
    /// that `body` overlaps, so nobody gets walled in by their own block.
    pub fn place_block_clear_of(&mut self, world: &mut VoxelWorld, ray: Ray, now: Duration, body: &Aabb) -> bool {
        self.place_where(world, ray, now, |target| !body.overlaps_cell(target))
    }

    fn place_where(&mut self, world: &mut VoxelWorld, ray: Ray, now: Duration, allowed: impl Fn(IVec3) -> bool) -> bool {
        if cooling_down(self.last_place, self.place_cooldown, now) {
            debug!("place ignored: cooling down");
            return false;
        }
        let Some(hit) = self.target(world, ray) else {
            return false;
        };
        let target = hit.adjacent();
        if !world.contains(target) || world.has_block(target) {
            return false;
        }
        if !allowed(target) {
            debug!("place ignored: {target} is occupied by the player");
            return false;
        }
        if !world.place_block(target, BlockKind::for_layer(target.y, world.surface_y())) {
            return false;
        }
        self.last_place = Some(now);
        true
    }

    /// Forget both action timestamps so the next actions are allowed.
    pub fn reset_cooldowns(&mut self) {
        self.last_break = None;
        self.last_place = None;
    }
}

fn cooling_down(last: Option<Duration>, cooldown: Duration, now: Duration) -> bool {
    last.is_some_and(|t| now.saturating_sub(t) < cooldown)
}
