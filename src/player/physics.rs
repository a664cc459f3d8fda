//! Player physics: gravity, axis-separated collision and ground detection.
//!
//! The player is an axis-aligned box hanging below the eye position. Each
//! tick the whole move is tried first; if it collides, the X, Z and Y parts
//! are tried one after another from the previous position and each is kept
//! only when it is collision-free. A blocked vertical move snaps onto the
//! floor or under the ceiling it ran into.

use crate::player::Player;
use crate::settings::PlayerSettings;
use crate::world::VoxelWorld;
use bevy::math::{IVec3, Vec3};

/// Touching faces closer than this do not count as overlapping.
pub const CONTACT_EPSILON: f32 = 1e-4;
/// Distance below the feet checked for ground contact after a move.
pub const GROUND_PROBE: f32 = 1e-3;

/// Player collision box in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Box for a player whose eyes are at `eye`.
    #[must_use]
    pub fn around(eye: Vec3, settings: &PlayerSettings) -> Self {
        let feet = eye - Vec3::Y * settings.eye_level;
        let half = Vec3::new(settings.radius, 0.0, settings.radius);
        Aabb {
            min: feet - half,
            max: feet + half + Vec3::Y * settings.height,
        }
    }

    /// Strict overlap with the unit cube at `cell`.
    #[must_use]
    pub fn overlaps_cell(&self, cell: IVec3) -> bool {
        let lo = cell.as_vec3();
        let hi = lo + Vec3::ONE;
        self.min.cmplt(hi - CONTACT_EPSILON).all() && self.max.cmpgt(lo + CONTACT_EPSILON).all()
    }

    /// Inclusive range of in-bounds cells this box can touch, or `None` when
    /// it lies entirely outside the world.
    fn cell_range(&self, world: &VoxelWorld) -> Option<(IVec3, IVec3)> {
        let lo = self.min.floor().as_ivec3().max(IVec3::ZERO);
        let hi = self.max.floor().as_ivec3().min(world.dimensions() - IVec3::ONE);
        lo.cmple(hi).all().then_some((lo, hi))
    }

    fn occupied_cells<'w>(&self, world: &'w VoxelWorld) -> impl Iterator<Item = IVec3> + 'w {
        let cells: Vec<IVec3> = match self.cell_range(world) {
            Some((lo, hi)) => (lo.x..=hi.x)
                .flat_map(|x| (lo.y..=hi.y).flat_map(move |y| (lo.z..=hi.z).map(move |z| IVec3::new(x, y, z))))
                .collect(),
            None => Vec::new(),
        };
        cells.into_iter().filter(move |c| world.has_block(*c))
    }
}

/// Whether a player with eyes at `eye` overlaps any occupied voxel.
#[must_use]
pub fn collides(world: &VoxelWorld, eye: Vec3, settings: &PlayerSettings) -> bool {
    let aabb = Aabb::around(eye, settings);
    aabb.occupied_cells(world).any(|c| aabb.overlaps_cell(c))
}

/// Step the player's body for one tick along the horizontal direction `dir`.
///
/// Extracted helper so the simulation and benchmarks exercise identical logic.
///
/// # Arguments
/// * `player` - body state to advance
/// * `world` - voxel world used for collision checks
/// * `settings` - speed, gravity and box dimensions
/// * `dir` - unit (or zero) horizontal direction
/// * `dt` - tick length in seconds
pub fn physics_step(player: &mut Player, world: &VoxelWorld, settings: &PlayerSettings, dir: Vec3, dt: f32) {
    if !player.grounded {
        player.velocity_y = (player.velocity_y - settings.gravity * dt).max(-settings.terminal_velocity);
    }
    player.grounded = false;

    let mut candidate = player.position + dir * settings.speed * dt + Vec3::Y * player.velocity_y * dt;
    if candidate.y <= settings.eye_level {
        candidate.y = settings.eye_level;
        player.velocity_y = 0.0;
        player.grounded = true;
    }

    if collides(world, candidate, settings) {
        resolve(player, world, settings, candidate);
    } else {
        player.position = candidate;
    }

    if player.velocity_y <= 0.0 && collides(world, player.position - Vec3::Y * GROUND_PROBE, settings) {
        player.grounded = true;
        player.velocity_y = 0.0;
    }

    if player.grounded {
        player.air_time = 0.0;
    } else {
        player.air_time += dt;
    }
}

/// Axis-separated resolution of a blocked move toward `candidate`.
///
/// The committed position always lies between the old position and
/// `candidate` on every axis.
pub fn resolve(player: &mut Player, world: &VoxelWorld, settings: &PlayerSettings, candidate: Vec3) {
    let mut cur = player.position;

    let try_x = Vec3::new(candidate.x, cur.y, cur.z);
    if !collides(world, try_x, settings) {
        cur = try_x;
    }
    let try_z = Vec3::new(cur.x, cur.y, candidate.z);
    if !collides(world, try_z, settings) {
        cur = try_z;
    }

    let try_y = Vec3::new(cur.x, candidate.y, cur.z);
    if !collides(world, try_y, settings) {
        cur = try_y;
    } else if candidate.y < cur.y {
        if let Some(y) = floor_below(world, settings, cur, candidate.y)
            && !collides(world, Vec3::new(cur.x, y, cur.z), settings)
        {
            cur.y = y;
            player.grounded = true;
        }
        player.velocity_y = 0.0;
    } else if candidate.y > cur.y {
        if let Some(y) = ceiling_above(world, settings, cur, candidate.y)
            && !collides(world, Vec3::new(cur.x, y, cur.z), settings)
        {
            cur.y = y;
        }
        player.velocity_y = 0.0;
    }

    player.position = cur;
}

/// Eye height that rests the feet on the highest top face crossed when
/// moving from `at` down to `target_y`.
fn floor_below(world: &VoxelWorld, settings: &PlayerSettings, at: Vec3, target_y: f32) -> Option<f32> {
    let old_feet = at.y - settings.eye_level;
    let new_feet = target_y - settings.eye_level;
    let swept = Aabb {
        min: Vec3::new(at.x - settings.radius, new_feet, at.z - settings.radius),
        max: Vec3::new(at.x + settings.radius, old_feet, at.z + settings.radius),
    };
    swept
        .occupied_cells(world)
        .filter(|c| overlaps_horizontally(&swept, *c))
        .map(|c| c.y as f32 + 1.0)
        .filter(|top| *top <= old_feet + CONTACT_EPSILON && *top > new_feet)
        .reduce(f32::max)
        .map(|top| (top + settings.eye_level).min(at.y))
}

/// Eye height that puts the head just under the lowest bottom face crossed
/// when moving from `at` up to `target_y`.
fn ceiling_above(world: &VoxelWorld, settings: &PlayerSettings, at: Vec3, target_y: f32) -> Option<f32> {
    let head_offset = settings.height - settings.eye_level;
    let old_head = at.y + head_offset;
    let new_head = target_y + head_offset;
    let swept = Aabb {
        min: Vec3::new(at.x - settings.radius, old_head, at.z - settings.radius),
        max: Vec3::new(at.x + settings.radius, new_head, at.z + settings.radius),
    };
    swept
        .occupied_cells(world)
        .filter(|c| overlaps_horizontally(&swept, *c))
        .map(|c| c.y as f32)
        .filter(|bottom| *bottom >= old_head - CONTACT_EPSILON && *bottom < new_head)
        .reduce(f32::min)
        .map(|bottom| (bottom - head_offset).max(at.y))
}

fn overlaps_horizontally(aabb: &Aabb, cell: IVec3) -> bool {
    let (x, z) = (cell.x as f32, cell.z as f32);
    aabb.min.x < x + 1.0 - CONTACT_EPSILON
        && aabb.max.x > x + CONTACT_EPSILON
        && aabb.min.z < z + 1.0 - CONTACT_EPSILON
        && aabb.max.z > z + CONTACT_EPSILON
}
