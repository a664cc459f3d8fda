//! World storage and block access helpers.
//!
//! This module provides `VoxelWorld`, the authoritative sparse voxel map
//! (`HashMap<IVec3, BlockKind>`). A missing key is an empty cell. The world
//! is a fixed box `[0, width) × [0, height) × [0, depth)`; nothing outside it
//! can ever be occupied, and the bottom layer can never be removed.
//!
//! Every mutation is recorded as a [`WorldEvent`] so a renderer can mirror the
//! map without holding references into it.
//!
//! # Example:
//!
//! ```
//! use bevy::math::IVec3;
//! use cavegame::block::BlockKind;
//! use cavegame::settings::WorldSettings;
//! use cavegame::world::VoxelWorld;
//!
//! let mut world = VoxelWorld::new(&WorldSettings::default());
//! world.generate();
//! assert_eq!(world.get_block(IVec3::new(10, 6, 10)), Some(BlockKind::Grass));
//! assert!(world.place_block(IVec3::new(10, 7, 10), BlockKind::Grass));
//! assert!(!world.remove_block(IVec3::new(10, 0, 10)));
//! ```

pub mod raycast;
pub use raycast::{Face, Ray, RaycastHit};

use crate::block::BlockKind;
use crate::settings::WorldSettings;
use bevy::log::{debug, info, warn};
use bevy::math::{IVec3, Vec3};
use bevy::utils::Instant;
use std::collections::HashMap;

/// A change to the voxel map, in the order it happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldEvent {
    /// Initial terrain was generated; take a full snapshot with [`VoxelWorld::blocks`].
    Generated,
    Placed { coord: IVec3, kind: BlockKind },
    Removed { coord: IVec3, kind: BlockKind },
}

/// Floor a float position to the block coordinate containing it.
///
/// # Return
/// * `None` if any component is non-finite or outside the `i32` range.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn block_coord(p: Vec3) -> Option<IVec3> {
    // 2^31 is exactly representable; anything at or above it does not fit.
    const LIMIT: f32 = 2_147_483_648.0;
    let f = p.floor();
    if !f.is_finite() || f.min_element() < -LIMIT || f.max_element() >= LIMIT {
        return None;
    }
    Some(IVec3::new(f.x as i32, f.y as i32, f.z as i32))
}

/// Number of cells in `layers` full layers of a world of `size`, computed
/// wide so large dimensions cannot overflow.
fn filled_volume(size: IVec3, layers: i32) -> usize {
    i64::from(size.x.max(0))
        .checked_mul(i64::from(size.z.max(0)))
        .and_then(|c| c.checked_mul(i64::from(layers.max(0))))
        .and_then(|c| usize::try_from(c).ok())
        .unwrap_or(usize::MAX)
}

pub struct VoxelWorld {
    blocks: HashMap<IVec3, BlockKind>,
    size: IVec3,
    surface_y: i32,
    generated: bool,
    events: Vec<WorldEvent>,
}

impl VoxelWorld {
    /// Create an empty world with the configured dimensions. Call
    /// [`VoxelWorld::generate`] once to lay down the terrain.
    #[must_use]
    pub fn new(settings: &WorldSettings) -> Self {
        VoxelWorld {
            blocks: HashMap::new(),
            size: IVec3::new(settings.width, settings.height, settings.depth),
            surface_y: settings.surface_y,
            generated: false,
            events: Vec::new(),
        }
    }

    /// World size as `(width, height, depth)`.
    #[must_use]
    pub fn dimensions(&self) -> IVec3 {
        self.size
    }

    #[must_use]
    pub fn surface_y(&self) -> i32 {
        self.surface_y
    }

    /// Whether `coord` lies inside the world box.
    #[must_use]
    pub fn contains(&self, coord: IVec3) -> bool {
        coord.cmpge(IVec3::ZERO).all() && coord.cmplt(self.size).all()
    }

    #[must_use]
    pub fn is_generated(&self) -> bool {
        self.generated
    }

    /// Lay down the flat terrain: cobblestone below `surface_y`, grass on it,
    /// empty above.
    ///
    /// # Return
    /// * `true` the first time. Later calls change nothing and return `false`.
    pub fn generate(&mut self) -> bool {
        if self.generated {
            warn!("world generation requested twice; ignoring");
            return false;
        }
        let started = Instant::now();
        let top = self.surface_y.min(self.size.y - 1);
        if self.blocks.try_reserve(filled_volume(self.size, top + 1)).is_err() {
            warn!("could not reserve room for the whole world up front");
        }
        for x in 0..self.size.x {
            for z in 0..self.size.z {
                for y in 0..=top {
                    let kind = if y == self.surface_y { BlockKind::Grass } else { BlockKind::Cobblestone };
                    self.blocks.insert(IVec3::new(x, y, z), kind);
                }
            }
        }
        self.generated = true;
        self.events.push(WorldEvent::Generated);
        info!(
            "generated {}x{}x{} world: {} blocks in {:.1?}",
            self.size.x,
            self.size.y,
            self.size.z,
            self.blocks.len(),
            started.elapsed()
        );
        true
    }

    #[must_use]
    pub fn has_block(&self, coord: IVec3) -> bool {
        self.blocks.contains_key(&coord)
    }

    #[must_use]
    pub fn get_block(&self, coord: IVec3) -> Option<BlockKind> {
        self.blocks.get(&coord).copied()
    }

    /// Place a block. The stored kind follows the layer rule
    /// ([`BlockKind::for_layer`]) regardless of `kind`.
    ///
    /// # Return
    /// * `false` if `coord` is outside the world or already occupied.
    pub fn place_block(&mut self, coord: IVec3, kind: BlockKind) -> bool {
        if !self.contains(coord) || self.has_block(coord) {
            debug!("place refused at {coord}");
            return false;
        }
        let kind_for_layer = BlockKind::for_layer(coord.y, self.surface_y);
        if kind != kind_for_layer {
            debug!("placing {kind_for_layer} instead of {kind} at layer {}", coord.y);
        }
        self.blocks.insert(coord, kind_for_layer);
        self.events.push(WorldEvent::Placed { coord, kind: kind_for_layer });
        true
    }

    /// Remove a block.
    ///
    /// # Return
    /// * `false` if the cell is empty or on the bottom layer.
    pub fn remove_block(&mut self, coord: IVec3) -> bool {
        if coord.y == 0 {
            debug!("bottom layer is permanent, refusing to remove {coord}");
            return false;
        }
        match self.blocks.remove(&coord) {
            Some(kind) => {
                self.events.push(WorldEvent::Removed { coord, kind });
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn has_block_at(&self, p: Vec3) -> bool {
        block_coord(p).is_some_and(|c| self.has_block(c))
    }

    #[must_use]
    pub fn get_block_at(&self, p: Vec3) -> Option<BlockKind> {
        block_coord(p).and_then(|c| self.get_block(c))
    }

    /// Float-coordinate variant of [`VoxelWorld::place_block`]; non-finite input is refused.
    pub fn place_block_at(&mut self, p: Vec3, kind: BlockKind) -> bool {
        block_coord(p).is_some_and(|c| self.place_block(c, kind))
    }

    /// Float-coordinate variant of [`VoxelWorld::remove_block`]; non-finite input is refused.
    pub fn remove_block_at(&mut self, p: Vec3) -> bool {
        block_coord(p).is_some_and(|c| self.remove_block(c))
    }

    /// Read-only snapshot iterator over every occupied cell.
    pub fn blocks(&self) -> impl Iterator<Item = (IVec3, BlockKind)> + '_ {
        self.blocks.iter().map(|(c, k)| (*c, *k))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Number of occupied cells on layer `y`.
    #[must_use]
    pub fn count_layer(&self, y: i32) -> usize {
        self.blocks.keys().filter(|c| c.y == y).count()
    }

    /// Whether an occupied cell can be seen: some neighbour is empty. The
    /// space under the bottom layer does not count.
    #[must_use]
    pub fn is_exposed(&self, coord: IVec3) -> bool {
        const NEIGHBOURS: [IVec3; 6] =
            [IVec3::X, IVec3::NEG_X, IVec3::Y, IVec3::NEG_Y, IVec3::Z, IVec3::NEG_Z];
        self.has_block(coord)
            && NEIGHBOURS
                .iter()
                .map(|d| coord + *d)
                .any(|n| n.y >= 0 && !self.has_block(n))
    }

    /// Take every change recorded since the last call.
    pub fn drain_events(&mut self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.events)
    }
}
