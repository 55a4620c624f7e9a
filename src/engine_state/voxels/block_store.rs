//! # Block Store
//!
//! The set of placed blocks, kept densely packed so it can be mirrored straight into the
//! GPU instance buffer. Slot order is instance order.

use crate::core::{DensePool, DensePoolError, PoolId};

use super::block::{block_type::BlockType, Block, WORLD_VOLUME};

/// Stable handle to a placed block.
pub type BlockId = PoolId;

/// Dense collection of every block in the world, bounded by the world volume.
///
/// Positions are not checked for duplicates; callers only place blocks next to existing
/// faces, which keeps positions unique.
#[derive(Debug, Clone)]
pub struct BlockStore {
    blocks: DensePool<Block>,
}

impl Default for BlockStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockStore {
    /// Creates an empty store that can hold one block per world position.
    pub fn new() -> Self {
        Self::with_capacity(WORLD_VOLUME)
    }

    /// Creates an empty store with a custom capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            blocks: DensePool::with_capacity_limit(capacity),
        }
    }

    /// Creates a store holding the 3x3x3 starter platform.
    ///
    /// The platform spans `126..129` on every axis: a stone layer at `y = 126`, dirt at
    /// `y = 127` and grass on top at `y = 128`.
    pub fn with_starter_platform() -> Result<Self, DensePoolError> {
        let mut store = Self::new();

        for (y, block_type) in [
            (126, BlockType::Stone),
            (127, BlockType::Dirt),
            (128, BlockType::Grass),
        ] {
            for x in 126..129 {
                for z in 126..129 {
                    store.append(Block::new([x, y, z], block_type))?;
                }
            }
        }

        Ok(store)
    }

    /// Adds a block.
    ///
    /// # Errors
    /// [`DensePoolError::CapacityExceeded`] once every world position is taken
    pub fn append(&mut self, block: Block) -> Result<BlockId, DensePoolError> {
        self.blocks.append(block)
    }

    /// Removes a block, compacting the store.
    pub fn remove(&mut self, id: BlockId) -> Result<Block, DensePoolError> {
        self.blocks.remove(id)
    }

    /// Looks up a live block.
    pub fn get(&self, id: BlockId) -> Result<&Block, DensePoolError> {
        self.blocks.get(id)
    }

    /// Number of placed blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Maximum number of blocks.
    pub fn capacity(&self) -> usize {
        self.blocks.capacity().unwrap_or(WORLD_VOLUME)
    }

    /// Iterates `(id, block)` pairs in instance order.
    pub fn iter(&self) -> impl Iterator<Item = (BlockId, &Block)> + '_ {
        self.blocks.iter()
    }

    /// Blocks in instance order, ready for upload.
    pub fn as_slice(&self) -> &[Block] {
        self.blocks.as_slice()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starter_platform_is_layered() {
        let store = BlockStore::with_starter_platform().unwrap();

        assert_eq!(store.len(), 27);
        for (_, block) in store.iter() {
            let expected = match block.position[1] {
                126 => BlockType::Stone,
                127 => BlockType::Dirt,
                128 => BlockType::Grass,
                other => panic!("unexpected layer {other}"),
            };
            assert_eq!(block.get_block_type(), Some(expected));
            assert!((126..129).contains(&block.position[0]));
            assert!((126..129).contains(&block.position[2]));
        }
    }

    #[test]
    fn appended_blocks_are_unchanged_after_unrelated_removals() {
        let mut store = BlockStore::new();
        let kept = store.append(Block::new([1, 2, 3], BlockType::Dirt)).unwrap();
        let removed = store.append(Block::new([4, 5, 6], BlockType::Stone)).unwrap();
        let moved = store.append(Block::new([7, 8, 9], BlockType::Grass)).unwrap();

        store.remove(removed).unwrap();

        assert_eq!(*store.get(kept).unwrap(), Block::new([1, 2, 3], BlockType::Dirt));
        assert_eq!(*store.get(moved).unwrap(), Block::new([7, 8, 9], BlockType::Grass));
        assert_eq!(store.as_slice().len(), 2);
    }

    #[test]
    fn small_store_reports_capacity_exceeded() {
        let mut store = BlockStore::with_capacity(1);
        store.append(Block::new([0, 0, 0], BlockType::Stone)).unwrap();

        assert_eq!(
            store.append(Block::new([1, 0, 0], BlockType::Stone)),
            Err(DensePoolError::CapacityExceeded { capacity: 1 })
        );
        assert_eq!(store.len(), 1);
    }
}
