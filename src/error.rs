//! # Engine Errors
//!
//! Top-level error type for everything that can stop the application: window and GPU
//! bootstrap, asset loading, configuration, and errors bubbled up from the world and UI.
//!
//! Logical no-ops (zero-area primitives, re-registering a texture name, placing a block
//! inside the camera) never produce an error.

use std::path::PathBuf;

use crate::{
    core::DensePoolError,
    engine_state::{
        buffer_state::BufferError,
        rendering::{
            bind_group_state::MissingBindGroup,
            ui::{texture_registry::TextureError, UiError},
        },
    },
};

/// Errors that abort start-up or a frame.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The event loop could not be created or stopped abnormally.
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    /// The window could not be created.
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    /// The window could not be wrapped in a GPU surface.
    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    /// No adapter compatible with the surface was found.
    #[error("no compatible GPU adapter: {0}")]
    RequestAdapter(#[from] wgpu::RequestAdapterError),

    /// The adapter refused to open a device.
    #[error("failed to open GPU device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    /// The surface reported formats the renderer cannot use.
    #[error("surface is not supported by the adapter")]
    UnsupportedSurface,

    /// The swapchain failed in a way reconfiguring cannot fix.
    #[error("failed to acquire swapchain texture: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    /// A file under the assets directory could not be read.
    #[error("failed to read {path}: {source}")]
    Asset {
        /// Path that failed to load
        path: PathBuf,
        /// Underlying I/O failure
        source: std::io::Error,
    },

    /// The configuration file exists but is not valid.
    #[error("invalid configuration file {path}: {source}")]
    Config {
        /// Path of the configuration file
        path: PathBuf,
        /// Parse failure
        source: serde_json::Error,
    },

    /// World storage failure.
    #[error(transparent)]
    Pool(#[from] DensePoolError),

    /// UI command processing failure.
    #[error(transparent)]
    Ui(#[from] UiError),

    /// Texture loading or upload failure.
    #[error(transparent)]
    Texture(#[from] TextureError),

    /// A GPU buffer was missing or written out of bounds.
    #[error(transparent)]
    Buffer(#[from] BufferError),

    /// A pipeline referenced a bind group that was never created.
    #[error(transparent)]
    BindGroup(#[from] MissingBindGroup),
}
