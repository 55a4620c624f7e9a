//! Rendering system for the voxel engine.
//!
//! This module contains the core rendering functionality: the surface and its
//! configuration, the pipelines for blocks and UI, and the per-frame render sequence.

use log::info;
use wgpu::{Surface, SurfaceConfiguration};

use crate::{config::EngineConfig, core::PoolId, error::EngineError};

use super::{buffer_state::BufferState, camera_state::camera, voxels::block::Block};

pub mod bind_group_state;
pub mod block_renderer;
pub mod pipeline_manager;
pub mod texture;
pub mod ui;

use pipeline_manager::{FrameOutcome, PipelineManager, UiFrame};
use ui::{
    texture_registry::{TextureRegistry, UiTexture},
    UiBatchManager,
};

/// Manages the entire rendering pipeline for the voxel engine.
///
/// This struct is the main entry point for all rendering operations.
/// It owns the surface, its configuration and the camera projection that must follow the
/// surface size.
pub struct RenderManager {
    /// The WebGPU surface being rendered to
    pub surface: Surface<'static>,
    /// Configuration for the surface (size, format, etc.)
    pub surface_config: SurfaceConfiguration,
    /// Manages the rendering pipelines and shaders
    pub pipeline_manager: PipelineManager,
    /// Camera projection settings
    pub camera_projection: camera::Projection,
}

impl RenderManager {
    /// Creates a new `RenderManager` instance.
    ///
    /// # Arguments
    /// * `surface` - The configured WebGPU surface to render to
    /// * `surface_config` - Configuration the surface was configured with
    /// * `buffer_state` - Registry holding the camera buffer
    /// * `config` - Asset locations and rendering tunables
    /// * `camera_projection` - Initial camera projection settings
    ///
    /// # Returns
    /// A new `RenderManager` with all rendering resources initialized
    pub fn new(
        surface: Surface<'static>,
        surface_config: SurfaceConfiguration,
        buffer_state: &mut BufferState,
        config: &EngineConfig,
        camera_projection: camera::Projection,
    ) -> Result<Self, EngineError> {
        let device = buffer_state.device.clone();
        let pipeline_manager = PipelineManager::new(
            &device,
            buffer_state,
            config,
            &surface_config,
            surface_config.format,
        )?;

        Ok(Self {
            surface,
            surface_config,
            pipeline_manager,
            camera_projection,
        })
    }

    /// Handles window resize events.
    ///
    /// Updates the surface configuration, camera projection, and depth texture to match the
    /// new window size. A zero-sized window (minimised) is ignored.
    ///
    /// # Arguments
    /// * `size` - The new window size in physical pixels
    /// * `buffer_state` - Provides the device
    pub fn resize_surface(&mut self, size: winit::dpi::PhysicalSize<u32>, buffer_state: &BufferState) {
        if size.width == 0 || size.height == 0 {
            return;
        }

        self.surface_config.width = size.width;
        self.surface_config.height = size.height;

        self.surface.configure(&buffer_state.device, &self.surface_config);

        self.camera_projection.resize(size.width, size.height);
        self.pipeline_manager
            .resize(&buffer_state.device, &self.surface_config);
        info!("Resized surface to {}x{}", size.width, size.height);
    }

    /// Current surface size in physical pixels.
    pub fn viewport(&self) -> (u32, u32) {
        (self.surface_config.width, self.surface_config.height)
    }

    /// Uploads the frame's data and renders it.
    ///
    /// # Arguments
    /// * `buffer_state` - Registry holding every GPU buffer
    /// * `blocks` - The block store's dense array
    /// * `batches` - The frame's UI batches
    /// * `textures` - UI textures, flushed before drawing
    /// * `font` - Id of the font atlas in `textures`
    pub fn render(
        &mut self,
        buffer_state: &mut BufferState,
        blocks: &[Block],
        batches: &UiBatchManager,
        textures: &mut TextureRegistry<UiTexture>,
        font: PoolId,
    ) -> Result<FrameOutcome, EngineError> {
        self.pipeline_manager
            .prepare(buffer_state, blocks, batches, textures)?;

        self.pipeline_manager.render(
            &self.surface,
            &self.surface_config,
            buffer_state,
            UiFrame {
                batches,
                textures,
                font,
            },
        )
    }
}
