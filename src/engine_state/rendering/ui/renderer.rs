//! UI rendering module for the voxel engine.
//!
//! This module draws the batches built by the [`UiBatchManager`] on top of the 3D scene.
//! The UiRenderer owns two pipelines:
//!
//! - the quad pipeline draws every rectangle, border and glyph of the frame in a single
//!   instanced call, sampling the font atlas for glyphs
//! - the image pipeline draws each UI image with its own texture and a slice of a dynamic
//!   uniform buffer
//!
//! Both write depth derived from the draw order, so the frame composites in command order
//! regardless of which pipeline drew a primitive.

use std::{collections::HashSet, mem::size_of, num::NonZeroU64};

use log::warn;
use wgpu::{
    BindGroup, BindGroupLayout, DepthStencilState, Device, RenderPass, RenderPipeline, Sampler,
    ShaderModule, TextureFormat,
};

use crate::{
    core::PoolId,
    engine_state::buffer_state::{BufferError, BufferState},
};

use super::{
    primitives::{UiGlobals, UiImageUniforms, UiQuad},
    quad_batch::UI_QUAD_BUFFER,
    texture_registry::{TextureRegistry, UiTexture, WgpuTextureUploader},
    UiBatchManager,
};

/// Name of the UI globals uniform buffer in the buffer state
pub const UI_GLOBALS_BUFFER: &str = "ui_globals_buffer";
/// Name of the per-image uniform buffer in the buffer state
pub const UI_IMAGE_UNIFORM_BUFFER: &str = "ui_image_uniform_buffer";

/// Images the uniform buffer holds before it first grows
const INITIAL_IMAGE_CAPACITY: usize = 4;

/// Vertices of one instanced triangle-strip quad
const QUAD_VERTICES: u32 = 4;

/// Manages UI rendering in the voxel engine.
pub struct UiRenderer {
    quad_pipeline: RenderPipeline,
    image_pipeline: RenderPipeline,
    globals_bind_group: BindGroup,
    /// Layout of a UI texture's bind group, shared with the texture uploader
    texture_layout: BindGroupLayout,
    image_uniform_layout: BindGroupLayout,
    image_uniform_bind_group: BindGroup,
    sampler: Sampler,
    /// Bytes between consecutive images in the uniform buffer
    image_uniform_stride: u64,
    image_capacity: usize,
    /// Textures already reported as missing, so each is warned about once
    reported_textures: HashSet<PoolId>,
}

impl UiRenderer {
    /// Creates a new `UiRenderer` instance.
    ///
    /// # Arguments
    /// * `device` - The WebGPU device
    /// * `buffer_state` - Registry the UI buffers are created in
    /// * `format` - Texture format for the surface
    /// * `depth_stencil` - Depth state shared by both pipelines
    /// * `ui_shader_source` - WGSL source of the quad pipeline
    /// * `ui_image_shader_source` - WGSL source of the image pipeline
    ///
    /// # Returns
    /// A new `UiRenderer` instance
    pub fn new(
        device: &Device,
        buffer_state: &mut BufferState,
        format: TextureFormat,
        depth_stencil: DepthStencilState,
        ui_shader_source: &str,
        ui_image_shader_source: &str,
    ) -> Result<Self, BufferError> {
        buffer_state.create_buffer_init(
            UI_GLOBALS_BUFFER,
            wgpu::util::BufferInitDescriptor {
                label: Some(UI_GLOBALS_BUFFER),
                contents: bytemuck::cast_slice(&[UiGlobals::default()]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            },
        );

        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let image_uniform_stride = (size_of::<UiImageUniforms>() as u64).div_ceil(alignment) * alignment;
        buffer_state.ensure_capacity(
            UI_IMAGE_UNIFORM_BUFFER,
            image_uniform_stride * INITIAL_IMAGE_CAPACITY as u64,
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        );

        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("ui_globals_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("ui_globals_bind_group"),
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer_state.get_entire_binding(UI_GLOBALS_BUFFER)?,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("ui_texture_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let image_uniform_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("ui_image_uniform_bind_group_layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: NonZeroU64::new(size_of::<UiImageUniforms>() as u64),
                    },
                    count: None,
                }],
            });
        let image_uniform_bind_group =
            Self::create_image_uniform_bind_group(device, buffer_state, &image_uniform_layout)?;

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("ui_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let quad_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("UI Shader"),
            source: wgpu::ShaderSource::Wgsl(ui_shader_source.into()),
        });
        let image_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("UI Image Shader"),
            source: wgpu::ShaderSource::Wgsl(ui_image_shader_source.into()),
        });

        let quad_pipeline = Self::create_render_pipeline(
            device,
            "UI Quad",
            &quad_shader,
            &[&globals_layout, &texture_layout],
            &[UiQuad::desc()],
            format,
            depth_stencil.clone(),
        );
        let image_pipeline = Self::create_render_pipeline(
            device,
            "UI Image",
            &image_shader,
            &[&globals_layout, &texture_layout, &image_uniform_layout],
            &[],
            format,
            depth_stencil,
        );

        Ok(Self {
            quad_pipeline,
            image_pipeline,
            globals_bind_group,
            texture_layout,
            image_uniform_layout,
            image_uniform_bind_group,
            sampler,
            image_uniform_stride,
            image_capacity: INITIAL_IMAGE_CAPACITY,
            reported_textures: HashSet::new(),
        })
    }

    fn create_image_uniform_bind_group(
        device: &Device,
        buffer_state: &BufferState,
        layout: &BindGroupLayout,
    ) -> Result<BindGroup, BufferError> {
        Ok(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("ui_image_uniform_bind_group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: buffer_state.get_buffer(UI_IMAGE_UNIFORM_BUFFER)?,
                    offset: 0,
                    size: NonZeroU64::new(size_of::<UiImageUniforms>() as u64),
                }),
            }],
        }))
    }

    /// Creates a render pipeline for UI rendering.
    ///
    /// Both UI pipelines draw alpha-blended triangle strips without culling.
    fn create_render_pipeline(
        device: &Device,
        label: &str,
        shader: &ShaderModule,
        bind_group_layouts: &[&BindGroupLayout],
        vertex_buffers: &[wgpu::VertexBufferLayout],
        format: TextureFormat,
        depth_stencil: DepthStencilState,
    ) -> RenderPipeline {
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(label),
            bind_group_layouts,
            push_constant_ranges: &[],
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                buffers: vertex_buffers,
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState {
                        color: wgpu::BlendComponent {
                            src_factor: wgpu::BlendFactor::SrcAlpha,
                            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
                            operation: wgpu::BlendOperation::Add,
                        },
                        alpha: wgpu::BlendComponent {
                            src_factor: wgpu::BlendFactor::One,
                            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
                            operation: wgpu::BlendOperation::Add,
                        },
                    }),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(depth_stencil),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }

    /// Uploader creating UI textures compatible with the image and quad pipelines.
    pub fn texture_uploader<'a>(&'a self, buffer_state: &'a BufferState) -> WgpuTextureUploader<'a> {
        WgpuTextureUploader {
            device: &buffer_state.device,
            queue: &buffer_state.queue,
            layout: &self.texture_layout,
            sampler: &self.sampler,
        }
    }

    /// Uploads the frame's viewport, quads and image uniforms.
    pub fn prepare(
        &mut self,
        buffer_state: &mut BufferState,
        ui: &UiBatchManager,
    ) -> Result<(), BufferError> {
        let (width, height) = ui.viewport();
        buffer_state.write_buffer(
            UI_GLOBALS_BUFFER,
            0,
            bytemuck::cast_slice(&[UiGlobals::new(width, height)]),
        )?;

        ui.upload(buffer_state)?;

        let images = ui.images();
        if images.is_empty() {
            return Ok(());
        }

        if images.len() > self.image_capacity {
            self.image_capacity = images.len().next_power_of_two();
            buffer_state.ensure_capacity(
                UI_IMAGE_UNIFORM_BUFFER,
                self.image_uniform_stride * self.image_capacity as u64,
                wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            );
            let device = buffer_state.device.clone();
            self.image_uniform_bind_group = Self::create_image_uniform_bind_group(
                &device,
                buffer_state,
                &self.image_uniform_layout,
            )?;
        }

        let stride = self.image_uniform_stride as usize;
        let mut bytes = vec![0u8; stride * images.len()];
        for (slot, image) in bytes.chunks_exact_mut(stride).zip(images) {
            slot[..size_of::<UiImageUniforms>()].copy_from_slice(bytemuck::bytes_of(&image.uniforms));
        }
        buffer_state.write_buffer(UI_IMAGE_UNIFORM_BUFFER, 0, &bytes)
    }

    /// Looks up a texture for drawing, warning once per id if it cannot be drawn.
    fn drawable<'t>(
        &mut self,
        registry: &'t TextureRegistry<UiTexture>,
        id: PoolId,
    ) -> Option<&'t UiTexture> {
        match registry.get(id) {
            Ok(texture) => Some(texture),
            Err(err) => {
                if self.reported_textures.insert(id) {
                    warn!("Skipping UI draw: {}", err);
                }
                None
            }
        }
    }

    /// Draws the frame's quads, then each image.
    ///
    /// # Arguments
    /// * `render_pass` - A pass with the UI depth attachment cleared
    /// * `buffer_state` - Registry holding the buffers filled by [`UiRenderer::prepare`]
    /// * `ui` - The frame's batches
    /// * `registry` - UI textures
    /// * `font` - Id of the font atlas in `registry`
    pub fn render(
        &mut self,
        render_pass: &mut RenderPass<'_>,
        buffer_state: &BufferState,
        ui: &UiBatchManager,
        registry: &TextureRegistry<UiTexture>,
        font: PoolId,
    ) -> Result<(), BufferError> {
        let quads = ui.quads();
        if !quads.is_empty() {
            if let Some(font_texture) = self.drawable(registry, font) {
                render_pass.set_pipeline(&self.quad_pipeline);
                render_pass.set_bind_group(0, &self.globals_bind_group, &[]);
                render_pass.set_bind_group(1, &font_texture.bind_group, &[]);
                render_pass.set_vertex_buffer(0, buffer_state.get_buffer(UI_QUAD_BUFFER)?.slice(..));
                render_pass.draw(0..QUAD_VERTICES, 0..quads.len() as u32);
            }
        }

        if ui.images().is_empty() {
            return Ok(());
        }

        render_pass.set_pipeline(&self.image_pipeline);
        render_pass.set_bind_group(0, &self.globals_bind_group, &[]);
        for (index, image) in ui.images().iter().enumerate() {
            let Some(texture) = self.drawable(registry, image.texture) else {
                continue;
            };
            let offset = (index as u64 * self.image_uniform_stride) as u32;
            render_pass.set_bind_group(1, &texture.bind_group, &[]);
            render_pass.set_bind_group(2, &self.image_uniform_bind_group, &[offset]);
            render_pass.draw(0..QUAD_VERTICES, 0..1);
        }

        Ok(())
    }
}
