//! Manages the WebGPU render pipelines and the per-frame render sequence.
//!
//! This module coordinates the frame: it owns the specialised renderers, the shared bind
//! groups and the depth texture, and runs the two passes that make up a frame.
//!
//! # Architecture
//!
//! - `PipelineManager`: Coordinates the overall rendering process
//! - `BlockRenderer`: Draws the block store as instanced cubes in the 3D pass
//! - `UiRenderer`: Draws the UI batches in the 2D pass
//!
//! # Frame Sequence
//!
//! 1. [`PipelineManager::prepare`] uploads block instances, pending UI textures, the quad
//!    batch and the image uniforms
//! 2. [`PipelineManager::render`] acquires the swapchain texture, clears to the sky colour,
//!    draws the blocks, then clears depth and draws the UI on top before presenting
//!
//! The 2D pass starts from a fresh depth buffer, so UI draw order alone decides overlap.

use log::debug;
use wgpu::{Device, Surface, SurfaceConfiguration, TextureFormat};

use crate::{
    config::EngineConfig,
    core::PoolId,
    engine_state::voxels::block::Block,
    error::EngineError,
};

use super::{
    super::buffer_state::BufferState,
    bind_group_state::BindGroupState,
    block_renderer::BlockRenderer,
    texture,
    ui::{
        texture_registry::{TextureRegistry, UiTexture},
        UiBatchManager, UiRenderer,
    },
};

/// File name of the block shader under the shader directory
pub const CUBE_SHADER: &str = "cube.wgsl";
/// File name of the UI quad shader under the shader directory
pub const UI_SHADER: &str = "ui.wgsl";
/// File name of the UI image shader under the shader directory
pub const UI_IMAGE_SHADER: &str = "ui_image.wgsl";

/// What happened to a frame handed to [`PipelineManager::render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The frame was drawn and presented.
    Presented,
    /// No swapchain texture was available in time; nothing was drawn.
    Skipped,
    /// The surface was out of date and has been reconfigured; nothing was drawn.
    Reconfigured,
}

/// How a frame that could not acquire a swapchain texture ends.
///
/// # Returns
/// `None` when the error is fatal
fn skipped_frame_outcome(error: &wgpu::SurfaceError) -> Option<FrameOutcome> {
    match error {
        wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other => Some(FrameOutcome::Skipped),
        wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost => {
            Some(FrameOutcome::Reconfigured)
        }
        _ => None,
    }
}

/// UI inputs of one frame.
pub struct UiFrame<'a> {
    /// The frame's batches
    pub batches: &'a UiBatchManager,
    /// Textures referenced by image commands and the font atlas
    pub textures: &'a TextureRegistry<UiTexture>,
    /// Id of the font atlas in `textures`
    pub font: PoolId,
}

/// Manages the WebGPU rendering process and associated rendering resources.
pub struct PipelineManager {
    /// Camera and terrain texture bind groups
    pub bind_group_state: BindGroupState,
    /// Depth texture shared by both passes
    pub depth_texture: texture::Texture,
    /// Renderer for the block store
    pub block_renderer: BlockRenderer,
    /// UI renderer for 2D interface elements
    pub ui_renderer: UiRenderer,
    /// Colour the 3D pass clears to
    clear_color: wgpu::Color,
}

impl PipelineManager {
    /// Creates a new `PipelineManager` instance.
    ///
    /// Loads the terrain textures and the three shaders from the configured asset directory.
    ///
    /// # Arguments
    /// * `device` - The WebGPU device
    /// * `buffer_state` - Registry holding the camera buffer; renderer buffers are added to it
    /// * `config` - Asset locations and the clear colour
    /// * `surface_config` - Surface configuration containing size and format
    /// * `texture_format` - The texture format to render to
    ///
    /// # Returns
    /// A new `PipelineManager` with all rendering resources initialized
    pub fn new(
        device: &Device,
        buffer_state: &mut BufferState,
        config: &EngineConfig,
        surface_config: &SurfaceConfiguration,
        texture_format: TextureFormat,
    ) -> Result<Self, EngineError> {
        let block_textures =
            texture::Texture::load_block_texture_array(device, &buffer_state.queue, config)?;
        let bind_group_state = BindGroupState::new(device, buffer_state, &block_textures)?;

        let depth_texture =
            texture::Texture::create_depth_texture(device, surface_config, "DEPTH TEXTURE");

        let depth_stencil = wgpu::DepthStencilState {
            format: texture::Texture::DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        };

        let block_renderer = BlockRenderer::new(
            device,
            buffer_state,
            &bind_group_state,
            &config.read_shader(CUBE_SHADER)?,
            texture_format,
            depth_stencil.clone(),
        )?;

        let ui_renderer = UiRenderer::new(
            device,
            buffer_state,
            texture_format,
            depth_stencil,
            &config.read_shader(UI_SHADER)?,
            &config.read_shader(UI_IMAGE_SHADER)?,
        )?;

        let [r, g, b] = config.clear_color;

        Ok(Self {
            bind_group_state,
            depth_texture,
            block_renderer,
            ui_renderer,
            clear_color: wgpu::Color { r, g, b, a: 1.0 },
        })
    }

    /// Uploads everything the frame draws.
    ///
    /// Pending UI textures are flushed here, before any pass references them.
    ///
    /// # Arguments
    /// * `buffer_state` - Registry receiving the writes
    /// * `blocks` - The block store's dense array
    /// * `batches` - The frame's UI batches
    /// * `textures` - UI texture registry whose pending uploads are flushed
    pub fn prepare(
        &mut self,
        buffer_state: &mut BufferState,
        blocks: &[Block],
        batches: &UiBatchManager,
        textures: &mut TextureRegistry<UiTexture>,
    ) -> Result<(), EngineError> {
        self.block_renderer.upload(buffer_state, blocks)?;

        let uploaded = {
            let mut uploader = self.ui_renderer.texture_uploader(buffer_state);
            textures.upload_pending(&mut uploader)?
        };
        if uploaded > 0 {
            debug!("Uploaded {} UI textures", uploaded);
        }

        self.ui_renderer.prepare(buffer_state, batches)?;
        Ok(())
    }

    /// Renders a frame to the given surface.
    ///
    /// # Arguments
    /// * `surface` - The target surface to render to
    /// * `surface_config` - Used to reconfigure an outdated or lost surface
    /// * `buffer_state` - Registry holding the buffers filled by [`PipelineManager::prepare`]
    /// * `ui` - The frame's UI batches and textures
    ///
    /// # Errors
    /// [`EngineError::Surface`] when the swapchain fails in a way reconfiguring cannot fix
    pub fn render(
        &mut self,
        surface: &Surface<'_>,
        surface_config: &SurfaceConfiguration,
        buffer_state: &BufferState,
        ui: UiFrame<'_>,
    ) -> Result<FrameOutcome, EngineError> {
        let device = &buffer_state.device;
        let queue = &buffer_state.queue;
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Frame Encoder"),
        });

        let frame = match surface.get_current_texture() {
            Ok(frame) => frame,
            Err(err) => {
                let Some(outcome) = skipped_frame_outcome(&err) else {
                    return Err(err.into());
                };
                debug!("Skipping frame ({}): {:?}", err, outcome);
                queue.submit([encoder.finish()]);
                if outcome == FrameOutcome::Reconfigured {
                    surface.configure(device, surface_config);
                }
                return Ok(outcome);
            }
        };

        let view = frame.texture.create_view(&Default::default());

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("World Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(self.depth_attachment()),
                ..Default::default()
            });
            self.block_renderer
                .render(&mut rpass, buffer_state, &self.bind_group_state)?;
        }

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("UI Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(self.depth_attachment()),
                ..Default::default()
            });
            self.ui_renderer
                .render(&mut rpass, buffer_state, ui.batches, ui.textures, ui.font)?;
        }

        queue.submit([encoder.finish()]);
        frame.present();

        Ok(FrameOutcome::Presented)
    }

    /// Depth attachment cleared to the far plane at the start of a pass.
    fn depth_attachment(&self) -> wgpu::RenderPassDepthStencilAttachment<'_> {
        wgpu::RenderPassDepthStencilAttachment {
            view: &self.depth_texture.view,
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(1.0),
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        }
    }

    /// Handles window resize events by recreating the depth texture.
    ///
    /// # Arguments
    /// * `device` - The WebGPU device
    /// * `config` - The new surface configuration containing the updated size
    pub fn resize(&mut self, device: &Device, config: &SurfaceConfiguration) {
        self.depth_texture =
            texture::Texture::create_depth_texture(device, config, "DEPTH TEXTURE");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_swapchain_skips_the_frame() {
        for error in [wgpu::SurfaceError::Timeout, wgpu::SurfaceError::Other] {
            assert_eq!(skipped_frame_outcome(&error), Some(FrameOutcome::Skipped));
        }
    }

    #[test]
    fn stale_surface_is_reconfigured() {
        for error in [wgpu::SurfaceError::Outdated, wgpu::SurfaceError::Lost] {
            assert_eq!(skipped_frame_outcome(&error), Some(FrameOutcome::Reconfigured));
        }
    }

    #[test]
    fn out_of_memory_is_fatal() {
        assert_eq!(skipped_frame_outcome(&wgpu::SurfaceError::OutOfMemory), None);
    }
}
