//! UI rendering system for the voxel engine.
//!
//! This module turns a frame's list of declarative UI draw commands into GPU work that is
//! composited on top of the 3D voxel world. It provides:
//!
//! - `command`: the draw command types produced by a layout engine
//! - `primitives`: GPU-facing instance and uniform layouts
//! - `quad_batch`: the growable per-frame quad staging buffer
//! - `text`: fixed-width bitmap glyph layout
//! - `manager`: the command state machine filling the batch
//! - `texture_registry`: named textures streamed to the GPU on demand
//! - `renderer`: the quad and image pipelines
//! - `hud`: the in-crate layout producer drawing the heads-up display

pub mod command;
pub mod hud;
pub mod manager;
pub mod primitives;
pub mod quad_batch;
pub mod renderer;
pub mod text;
pub mod texture_registry;

pub use manager::UiBatchManager;
pub use renderer::UiRenderer;

/// Errors raised while turning draw commands into batches.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UiError {
    /// A command kind this renderer cannot draw.
    #[error("custom UI render commands are not supported")]
    UnsupportedCommand,
    /// Glyph cells are addressed with 8-bit sizes and must not be empty.
    #[error("font size {0} is out of range, it must be between 1 and 255")]
    FontSizeOutOfRange(u16),
    /// Every draw-order slot of the frame is taken; later primitives could not be
    /// ordered above earlier ones.
    #[error("more than {} UI primitives in one frame", u16::MAX)]
    DrawOrderExhausted,
}
