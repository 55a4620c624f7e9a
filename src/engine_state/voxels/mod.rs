//! # Voxel World
//!
//! This module contains the voxel world: the block representation, the dense block
//! store, the ray picker and the world editing entry point.
//!
//! ## Architecture
//!
//! * **Block**: a four-byte lattice position plus material, also used as GPU instance data
//! * **BlockStore**: dense, fixed-capacity block collection with stable ids
//! * **Picker**: slab-test ray casting against every block's bounding box
//! * **World**: owns the store and applies place/remove edits
//!
//! ## Data Flow
//!
//! 1. A pointer or touch event asks the world to edit the block under the crosshair
//! 2. The picker finds the nearest block the camera ray enters
//! 3. The store appends or swap-removes a block
//! 4. The renderer mirrors the store's dense array into the instance buffer next frame

pub mod block;
pub mod block_store;
pub mod picker;
pub mod world;
