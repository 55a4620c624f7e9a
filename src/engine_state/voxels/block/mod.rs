//! # Block Module
//!
//! This module provides the block data structure stored in the world and uploaded to the
//! GPU as per-instance vertex data.

use block_type::BlockType;
use cgmath::{Point3, Vector3};

pub mod block_type;

/// The underlying integer type used to represent block types in memory.
pub type BlockTypeSize = u8;

/// The underlying integer type of one block coordinate.
pub type BlockCoordinate = u8;

/// Number of distinct positions along one world axis.
pub const WORLD_DIMENSION: usize = BlockCoordinate::MAX as usize + 1;

/// Number of distinct block positions in the world.
pub const WORLD_VOLUME: usize = WORLD_DIMENSION * WORLD_DIMENSION * WORLD_DIMENSION;

/// Represents a single voxel block in the world.
///
/// # Memory Layout
/// The `#[repr(C)]` attribute ensures a consistent memory layout for GPU interoperability.
/// A block is exactly four bytes (`x`, `y`, `z`, type) and is read by the cube shader as a
/// single `Uint8x4` instance attribute.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Debug, PartialEq, Eq)]
pub struct Block {
    /// Lattice position of the block's minimum corner.
    pub position: [BlockCoordinate; 3],
    /// The type of this block, encoded as a `BlockTypeSize` for compact storage.
    pub block_type: BlockTypeSize,
}

impl Block {
    /// Creates a new block of the specified type at a lattice position.
    ///
    /// # Arguments
    /// * `position` - Minimum corner of the unit cube
    /// * `block_type` - The type of block to create
    pub fn new(position: [BlockCoordinate; 3], block_type: BlockType) -> Self {
        Block {
            position,
            block_type: block_type as BlockTypeSize,
        }
    }

    /// Decoded block type.
    pub fn get_block_type(&self) -> Option<BlockType> {
        BlockType::from_int(self.block_type)
    }

    /// Minimum corner of the block's bounding box.
    pub fn min_corner(&self) -> Point3<f32> {
        Point3::new(
            self.position[0] as f32,
            self.position[1] as f32,
            self.position[2] as f32,
        )
    }

    /// Position one step away from this block along `offset`.
    ///
    /// # Returns
    /// `None` if the neighbour lies outside the world on any axis
    pub fn neighbour_position(&self, offset: Vector3<i8>) -> Option<[BlockCoordinate; 3]> {
        let step = |coordinate: BlockCoordinate, delta: i8| {
            BlockCoordinate::try_from(coordinate as i16 + delta as i16).ok()
        };

        Some([
            step(self.position[0], offset.x)?,
            step(self.position[1], offset.y)?,
            step(self.position[2], offset.z)?,
        ])
    }

    /// Describes the per-instance vertex layout of a block.
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Uint8x4];

        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Block>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &ATTRIBUTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_is_four_bytes() {
        assert_eq!(std::mem::size_of::<Block>(), 4);
        let block = Block::new([1, 2, 3], BlockType::Grass);
        assert_eq!(bytemuck::bytes_of(&block), &[1, 2, 3, 3]);
    }

    #[test]
    fn neighbours_outside_the_world_are_rejected() {
        let corner = Block::new([255, 0, 10], BlockType::Stone);

        assert_eq!(corner.neighbour_position(Vector3::new(1, 0, 0)), None);
        assert_eq!(corner.neighbour_position(Vector3::new(0, -1, 0)), None);
        assert_eq!(
            corner.neighbour_position(Vector3::new(0, 0, -1)),
            Some([255, 0, 9])
        );
    }
}
