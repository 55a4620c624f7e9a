//! # World Module
//!
//! This module provides the `World` struct, which owns every placed block and is the only
//! place the block set is edited.
//!
//! ## Editing
//!
//! All edits go through [`World::modify_block`], which picks the block under the
//! camera's crosshair and either removes it or places a new block against the face that
//! was hit. Edits are triggered by pointer and touch events, never once per frame.

use log::debug;

use crate::{core::DensePoolError, engine_state::camera_state::camera::Camera};

use super::{
    block::{block_type::BlockType, Block},
    block_store::{BlockId, BlockStore},
    picker::{self, PickResult},
};

/// Distance below which placing a block would put it inside the camera's cell.
const MIN_PLACEMENT_DISTANCE: f32 = 1.0;

/// A change applied by [`World::modify_block`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockEdit {
    /// The picked block was removed.
    Removed {
        /// Id the block had before removal
        id: BlockId,
        /// The removed block
        block: Block,
    },
    /// A new block was placed against the picked face.
    Placed {
        /// Id of the new block
        id: BlockId,
        /// The new block
        block: Block,
    },
}

/// The voxel world: a fixed-capacity set of unit blocks.
///
/// # Examples
///
/// ```rust,ignore
/// let mut world = World::new()?;
/// let edit = world.modify_block(&camera, BlockType::Stone)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct World {
    /// Every placed block, in GPU instance order
    pub blocks: BlockStore,
}

impl World {
    /// Creates a world holding the starter platform.
    pub fn new() -> Result<Self, DensePoolError> {
        Ok(Self {
            blocks: BlockStore::with_starter_platform()?,
        })
    }

    /// Creates a world around an existing block store.
    #[cfg(test)]
    pub fn from_store(blocks: BlockStore) -> Self {
        Self { blocks }
    }

    /// Picks the block under the camera's crosshair.
    pub fn pick(&self, camera: &Camera) -> Option<PickResult> {
        picker::pick_from_camera(camera, self.blocks.iter())
    }

    /// Edits the block under the camera's crosshair.
    ///
    /// * `Air` removes the picked block.
    /// * Any other type is placed against the picked face, unless the hit is within one
    ///   block of the camera or the new position falls outside the world.
    ///
    /// # Returns
    /// The edit that was applied, or `None` if nothing changed
    ///
    /// # Errors
    /// [`DensePoolError::CapacityExceeded`] if the world is full
    pub fn modify_block(
        &mut self,
        camera: &Camera,
        new_type: BlockType,
    ) -> Result<Option<BlockEdit>, DensePoolError> {
        let Some(hit) = self.pick(camera) else {
            return Ok(None);
        };

        if !new_type.is_solid() {
            let block = self.blocks.remove(hit.block_id)?;
            debug!("Removed {:?} block at {:?}", block.get_block_type(), block.position);
            return Ok(Some(BlockEdit::Removed {
                id: hit.block_id,
                block,
            }));
        }

        if hit.distance <= MIN_PLACEMENT_DISTANCE {
            return Ok(None);
        }

        let hit_block = *self.blocks.get(hit.block_id)?;
        let Some(position) = hit_block.neighbour_position(hit.face_normal) else {
            debug!(
                "Placement against {:?} face {:?} leaves the world",
                hit_block.position, hit.face_normal
            );
            return Ok(None);
        };

        let block = Block::new(position, new_type);
        let id = self.blocks.append(block)?;
        debug!("Placed {} block at {:?}", new_type, position);

        Ok(Some(BlockEdit::Placed { id, block }))
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use cgmath::{Point3, Rad};

    use super::*;

    fn world_with_block_at(position: [u8; 3]) -> World {
        let mut store = BlockStore::new();
        store.append(Block::new(position, BlockType::Stone)).unwrap();
        World::from_store(store)
    }

    fn camera_looking_along_x(x: f32) -> Camera {
        Camera::new(Point3::new(x, 10.5, 10.5), Rad(FRAC_PI_2), Rad(0.0))
    }

    #[test]
    fn placing_from_a_distance_appends_next_to_hit_face() {
        let mut world = world_with_block_at([10, 10, 10]);
        let camera = camera_looking_along_x(5.0);

        let edit = world.modify_block(&camera, BlockType::Grass).unwrap();

        let Some(BlockEdit::Placed { id, block }) = edit else {
            panic!("expected a placement, got {edit:?}");
        };
        assert_eq!(block, Block::new([9, 10, 10], BlockType::Grass));
        assert_eq!(*world.blocks.get(id).unwrap(), block);
        assert_eq!(world.blocks.len(), 2);
    }

    #[test]
    fn placing_within_one_block_is_a_no_op() {
        let mut world = world_with_block_at([10, 10, 10]);
        let camera = camera_looking_along_x(9.5);

        assert_eq!(world.modify_block(&camera, BlockType::Dirt).unwrap(), None);
        assert_eq!(world.blocks.len(), 1);
    }

    #[test]
    fn placing_from_inside_a_block_is_a_no_op() {
        let mut world = world_with_block_at([10, 10, 10]);
        let camera = camera_looking_along_x(10.5);

        assert_eq!(world.modify_block(&camera, BlockType::Dirt).unwrap(), None);
        assert_eq!(world.blocks.len(), 1);
    }

    #[test]
    fn air_removes_the_picked_block() {
        let mut world = world_with_block_at([10, 10, 10]);
        let camera = camera_looking_along_x(5.0);

        let edit = world.modify_block(&camera, BlockType::Air).unwrap();

        assert!(matches!(edit, Some(BlockEdit::Removed { .. })));
        assert_eq!(world.blocks.len(), 0);
    }

    #[test]
    fn missing_everything_changes_nothing() {
        let mut world = world_with_block_at([10, 10, 10]);
        let camera = Camera::new(Point3::new(5.0, 50.5, 10.5), Rad(FRAC_PI_2), Rad(0.0));

        assert_eq!(world.modify_block(&camera, BlockType::Air).unwrap(), None);
        assert_eq!(world.modify_block(&camera, BlockType::Stone).unwrap(), None);
        assert_eq!(world.blocks.len(), 1);
    }

    #[test]
    fn placement_outside_the_world_is_ignored() {
        let mut world = world_with_block_at([0, 10, 10]);
        // Looking along -x at the block's x = 0 face from the far side.
        let camera = Camera::new(Point3::new(5.0, 10.5, 10.5), Rad(-FRAC_PI_2), Rad(0.0));
        let mut from_outside = camera;
        from_outside.position.x = -5.0;
        from_outside.yaw = Rad(FRAC_PI_2);

        assert_eq!(world.modify_block(&from_outside, BlockType::Dirt).unwrap(), None);
        assert_eq!(world.blocks.len(), 1);

        let edit = world.modify_block(&camera, BlockType::Dirt).unwrap();
        assert!(matches!(
            edit,
            Some(BlockEdit::Placed { block, .. }) if block.position == [1, 10, 10]
        ));
    }

    #[test]
    fn starter_world_is_editable_from_the_start_position() {
        let mut world = World::new().unwrap();
        let camera = Camera::new(Point3::new(127.5, 127.5, 124.0), Rad(0.0), Rad(0.0));

        let hit = world.pick(&camera).unwrap();
        assert!((hit.distance - 2.0).abs() < 1e-5);

        let edit = world.modify_block(&camera, BlockType::Stone).unwrap();
        assert!(matches!(
            edit,
            Some(BlockEdit::Placed { block, .. }) if block.position == [127, 127, 125]
        ));
    }
}
