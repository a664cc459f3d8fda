//! Block kinds and the block interaction service.
//!
//! `BlockKind` is the closed set of voxel kinds the world can hold. Kinds are
//! cosmetic apart from the layer rule in [`BlockKind::for_layer`], which decides
//! what gets placed at a given height. The interaction service (breaking and
//! placing through a look ray) lives in [`interaction`].
//!
//! Example:
//!
//! ```rust
//! use cavegame::block::BlockKind;
//!
//! // Below the surface layer placed blocks are cobblestone, at or above it grass.
//! assert_eq!(BlockKind::for_layer(3, 6), BlockKind::Cobblestone);
//! assert_eq!(BlockKind::for_layer(9, 6), BlockKind::Grass);
//! ```

pub mod interaction;
pub use interaction::*;

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind stored in an occupied voxel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Grass,
    Cobblestone,
    Bedrock,
}

impl BlockKind {
    /// Every kind, in texture slot order.
    pub const ALL: [BlockKind; 3] = [BlockKind::Grass, BlockKind::Cobblestone, BlockKind::Bedrock];

    /// Kind to place at height `y` for a world whose grass layer sits at `surface_y`.
    ///
    /// # Arguments
    /// * `y` - block layer of the target cell
    /// * `surface_y` - the grass layer produced by generation
    ///
    /// # Return
    /// * `BlockKind::Cobblestone` below the surface, `BlockKind::Grass` otherwise.
    #[must_use]
    pub fn for_layer(y: i32, surface_y: i32) -> Self {
        if y < surface_y {
            BlockKind::Cobblestone
        } else {
            BlockKind::Grass
        }
    }

    /// Stable lowercase name, matching the serde representation.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            BlockKind::Grass => "grass",
            BlockKind::Cobblestone => "cobblestone",
            BlockKind::Bedrock => "bedrock",
        }
    }

    /// Inverse of [`BlockKind::name`].
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        BlockKind::ALL.into_iter().find(|k| k.name() == name)
    }

    /// Index into the texture set handed over by the asset loader
    /// (grass, stone, bedrock).
    #[must_use]
    pub fn texture_slot(self) -> usize {
        match self {
            BlockKind::Grass => 0,
            BlockKind::Cobblestone => 1,
            BlockKind::Bedrock => 2,
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_rule_matches_reference_layout() {
        for y in 0..=5 {
            assert_eq!(BlockKind::for_layer(y, 6), BlockKind::Cobblestone);
        }
        for y in 6..32 {
            assert_eq!(BlockKind::for_layer(y, 6), BlockKind::Grass);
        }
    }

    #[test]
    fn names_round_trip() {
        for kind in BlockKind::ALL {
            assert_eq!(BlockKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(BlockKind::from_name("dirt"), None);
    }

    #[test]
    fn texture_slots_are_distinct() {
        let slots: Vec<usize> = BlockKind::ALL.iter().map(|k| k.texture_slot()).collect();
        assert_eq!(slots, vec![0, 1, 2]);
    }
}
