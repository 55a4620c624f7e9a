//! # Block Type Module
//!
//! This module defines the materials a block can be made of and the mapping from
//! materials to terrain texture layers.

use std::fmt;

use num_derive::FromPrimitive;

use super::BlockTypeSize;

/// Enumerates all possible block types in the voxel world.
///
/// The discriminants are the on-GPU encoding of the type. `FromPrimitive` allows
/// decoding a stored byte back into the enum.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
#[repr(u8)]
pub enum BlockType {
    /// Empty space. Never stored; used as the "remove" request when editing the world.
    Air = 0,

    /// Grey stone.
    Stone = 1,

    /// Plain dirt.
    Dirt = 2,

    /// Grass, textured the same on every face.
    Grass = 3,
}

/// Block types the player can select for placement, in selection order.
pub const PLACEABLE_BLOCK_TYPES: [BlockType; 3] = [BlockType::Stone, BlockType::Dirt, BlockType::Grass];

impl BlockType {
    /// Converts a stored byte back into a `BlockType`.
    ///
    /// # Returns
    /// `None` if the byte does not name a block type
    pub fn from_int(btype: BlockTypeSize) -> Option<Self> {
        num::FromPrimitive::from_u8(btype)
    }

    /// Whether this type occupies space.
    pub fn is_solid(self) -> bool {
        self != BlockType::Air
    }

    /// Layer of the terrain texture array used by this type.
    ///
    /// # Returns
    /// `None` for [`BlockType::Air`], which is never drawn
    pub fn texture_layer(self) -> Option<u32> {
        match self {
            BlockType::Air => None,
            BlockType::Stone => Some(0),
            BlockType::Dirt => Some(1),
            BlockType::Grass => Some(2),
        }
    }

    /// File name of the terrain texture for this type.
    pub fn texture_file_name(self) -> Option<&'static str> {
        match self {
            BlockType::Air => None,
            BlockType::Stone => Some("stone.png"),
            BlockType::Dirt => Some("dirt.png"),
            BlockType::Grass => Some("grass.png"),
        }
    }

    /// Maps a number-row slot (0 for key `1`, ..., 9 for key `0`) to a placeable type.
    ///
    /// The three placeable types repeat across the row.
    pub fn from_hotbar_slot(slot: usize) -> Self {
        PLACEABLE_BLOCK_TYPES[slot % PLACEABLE_BLOCK_TYPES.len()]
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BlockType::Air => "Air",
            BlockType::Stone => "Stone",
            BlockType::Dirt => "Dirt",
            BlockType::Grass => "Grass",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_round_trip_through_from_int() {
        for block_type in [BlockType::Air, BlockType::Stone, BlockType::Dirt, BlockType::Grass] {
            assert_eq!(BlockType::from_int(block_type as u8), Some(block_type));
        }
        assert_eq!(BlockType::from_int(4), None);
    }

    #[test]
    fn hotbar_cycles_through_placeable_types() {
        assert_eq!(BlockType::from_hotbar_slot(0), BlockType::Stone);
        assert_eq!(BlockType::from_hotbar_slot(1), BlockType::Dirt);
        assert_eq!(BlockType::from_hotbar_slot(2), BlockType::Grass);
        assert_eq!(BlockType::from_hotbar_slot(3), BlockType::Stone);
        assert_eq!(BlockType::from_hotbar_slot(9), BlockType::Stone);
    }

    #[test]
    fn texture_layers_follow_discriminants() {
        for block_type in PLACEABLE_BLOCK_TYPES {
            assert_eq!(block_type.texture_layer(), Some(block_type as u32 - 1));
        }
        assert_eq!(BlockType::Air.texture_layer(), None);
    }
}
