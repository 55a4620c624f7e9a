//! # Core Module
//!
//! Fundamental data structures shared by the world and the renderer.
//!
//! ## Key Components
//! - `DensePool`: Densely packed arena with stable ids, used for blocks and textures
//! - `PoolId`: Stable handle into a `DensePool`

pub mod dense_pool;

pub use dense_pool::{DensePool, DensePoolError, PoolId};
