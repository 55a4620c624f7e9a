//! Block renderer module for the voxel engine.
//!
//! Every block is one instance of a unit cube. The cube's 36 vertices are generated in the
//! vertex shader from `vertex_index`, so the only vertex data is the per-instance
//! [`Block`] itself, mirrored from the block store's dense array.
//!
//! # Architecture
//!
//! The block renderer is responsible for:
//! 1. Creating and managing its own render pipeline
//! 2. Keeping the instance buffer in step with the block store
//! 3. Binding the camera and terrain texture groups and issuing the instanced draw

use wgpu::{DepthStencilState, Device, RenderPass, RenderPipeline, TextureFormat};

use crate::engine_state::{
    buffer_state::{BufferError, BufferState},
    rendering::bind_group_state::{
        BindGroupState, MissingBindGroup, CAMERA_BIND_GROUP, CAMERA_BIND_GROUP_LAYOUT,
        TEXTURE_BIND_GROUP, TEXTURE_BIND_GROUP_LAYOUT,
    },
    voxels::block::{Block, WORLD_VOLUME},
};

/// Name of the block instance buffer in the buffer state
pub const BLOCK_INSTANCE_BUFFER: &str = "block_instance_buffer";

/// Vertices of one cube: six faces of two triangles
const CUBE_VERTICES: u32 = 36;

/// Draws every block as an instanced cube.
pub struct BlockRenderer {
    /// The WebGPU render pipeline for block rendering
    render_pipeline: RenderPipeline,
    /// Number of instances written by the last upload
    instance_count: u32,
}

impl BlockRenderer {
    /// Creates the block pipeline and its instance buffer.
    ///
    /// The instance buffer holds one [`Block`] per world position, so it never has to grow.
    ///
    /// # Arguments
    /// * `device` - The WebGPU device
    /// * `buffer_state` - Registry the instance buffer is created in
    /// * `bind_group_state` - Provides the camera and terrain texture layouts
    /// * `shader_string` - The WGSL source of the cube shader
    /// * `texture_format` - The surface format
    /// * `depth_stencil` - Depth state of the 3D pass
    pub fn new(
        device: &Device,
        buffer_state: &mut BufferState,
        bind_group_state: &BindGroupState,
        shader_string: &str,
        texture_format: TextureFormat,
        depth_stencil: DepthStencilState,
    ) -> Result<Self, MissingBindGroup> {
        buffer_state.ensure_capacity(
            BLOCK_INSTANCE_BUFFER,
            (WORLD_VOLUME * std::mem::size_of::<Block>()) as u64,
            wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        );

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Block Render Pipeline Layout"),
            bind_group_layouts: &[
                bind_group_state.get_bind_group_layout(CAMERA_BIND_GROUP_LAYOUT)?,
                bind_group_state.get_bind_group_layout(TEXTURE_BIND_GROUP_LAYOUT)?,
            ],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Block Shader"),
            source: wgpu::ShaderSource::Wgsl(shader_string.into()),
        });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Block Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[Block::desc()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: texture_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(depth_stencil),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        Ok(Self {
            render_pipeline,
            instance_count: 0,
        })
    }

    /// Mirrors the block store's dense array into the instance buffer.
    ///
    /// Only the live prefix is written; instances past it are never drawn.
    pub fn upload(&mut self, buffer_state: &mut BufferState, blocks: &[Block]) -> Result<(), BufferError> {
        buffer_state.write_buffer(BLOCK_INSTANCE_BUFFER, 0, bytemuck::cast_slice(blocks))?;
        self.instance_count = blocks.len() as u32;
        Ok(())
    }

    /// Draws every uploaded block.
    ///
    /// # Arguments
    /// * `render_pass` - The 3D pass
    /// * `buffer_state` - Registry holding the instance buffer
    /// * `bind_group_state` - Provides the camera and terrain texture groups
    pub fn render(
        &self,
        render_pass: &mut RenderPass<'_>,
        buffer_state: &BufferState,
        bind_group_state: &BindGroupState,
    ) -> Result<(), crate::error::EngineError> {
        if self.instance_count == 0 {
            return Ok(());
        }

        render_pass.set_pipeline(&self.render_pipeline);
        render_pass.set_bind_group(0, bind_group_state.get_bind_group(CAMERA_BIND_GROUP)?, &[]);
        render_pass.set_bind_group(1, bind_group_state.get_bind_group(TEXTURE_BIND_GROUP)?, &[]);
        render_pass.set_vertex_buffer(0, buffer_state.get_buffer(BLOCK_INSTANCE_BUFFER)?.slice(..));
        render_pass.draw(0..CUBE_VERTICES, 0..self.instance_count);

        Ok(())
    }
}
