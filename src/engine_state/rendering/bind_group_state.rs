//! Manages WebGPU bind groups and their layouts.
//!
//! This module handles the creation and management of the bind groups shared by the block
//! pipeline: the camera uniform and the terrain texture array. UI bind groups are owned by
//! the UI renderer since they are rebuilt as UI textures stream in.

use std::collections::HashMap;

use wgpu::{BindGroup, BindGroupLayout, Device};

use crate::engine_state::{
    buffer_state::{BufferError, BufferState},
    camera_state::CAMERA_BUFFER_NAME,
};

use super::texture::Texture;

/// Raised when a renderer asks for a bind group that was never created.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("bind group '{0}' does not exist")]
pub struct MissingBindGroup(pub &'static str);

/// Manages WebGPU bind groups and their layouts.
///
/// Bind groups are stored by name so renderers can look up exactly the groups their
/// pipeline layout was built from.
pub struct BindGroupState {
    /// Map of bind group names to their WebGPU bind group objects
    bind_groups: HashMap<&'static str, wgpu::BindGroup>,
    /// Map of bind group layout names to their WebGPU bind group layout objects
    bind_group_layouts: HashMap<&'static str, wgpu::BindGroupLayout>,
}

impl BindGroupState {
    /// Creates a new `BindGroupState` with the camera and block texture groups.
    ///
    /// # Arguments
    /// * `device` - The WebGPU device
    /// * `buffer_state` - Registry holding the camera uniform buffer
    /// * `block_textures` - The terrain texture array and its sampler
    ///
    /// # Returns
    /// The bind group state, or an error if the camera buffer has not been created yet
    pub fn new(
        device: &Device,
        buffer_state: &BufferState,
        block_textures: &Texture,
    ) -> Result<Self, BufferError> {
        let mut bind_groups = HashMap::new();
        let mut bind_group_layouts = HashMap::new();

        let (camera_bind_group, camera_bind_group_layout) =
            Self::generate_camera_bindgroups(device, buffer_state)?;

        bind_groups.insert(CAMERA_BIND_GROUP, camera_bind_group);
        bind_group_layouts.insert(CAMERA_BIND_GROUP_LAYOUT, camera_bind_group_layout);

        let (texture_bind_group, texture_bind_group_layout) =
            Self::generate_texture_bindgroups(device, block_textures);

        bind_groups.insert(TEXTURE_BIND_GROUP, texture_bind_group);
        bind_group_layouts.insert(TEXTURE_BIND_GROUP_LAYOUT, texture_bind_group_layout);

        Ok(Self {
            bind_groups,
            bind_group_layouts,
        })
    }

    /// Retrieves a bind group by name.
    ///
    /// # Arguments
    /// * `name` - The name of the bind group to retrieve
    ///
    /// # Errors
    /// [`MissingBindGroup`] if no group with that name was created
    pub fn get_bind_group(&self, name: &'static str) -> Result<&wgpu::BindGroup, MissingBindGroup> {
        self.bind_groups.get(name).ok_or(MissingBindGroup(name))
    }

    /// Retrieves a bind group layout by name.
    ///
    /// # Arguments
    /// * `name` - The name of the bind group layout to retrieve
    ///
    /// # Errors
    /// [`MissingBindGroup`] if no layout with that name was created
    pub fn get_bind_group_layout(
        &self,
        name: &'static str,
    ) -> Result<&wgpu::BindGroupLayout, MissingBindGroup> {
        self.bind_group_layouts.get(name).ok_or(MissingBindGroup(name))
    }

    /// Creates bind groups for camera uniforms.
    ///
    /// # Arguments
    /// * `device` - The WebGPU device
    /// * `buffer_state` - Shared state for buffer management
    ///
    /// # Returns
    /// A tuple containing the bind group and its layout
    fn generate_camera_bindgroups(
        device: &Device,
        buffer_state: &BufferState,
    ) -> Result<(BindGroup, BindGroupLayout), BufferError> {
        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
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
                label: Some(CAMERA_BIND_GROUP_LAYOUT),
            });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer_state.get_entire_binding(CAMERA_BUFFER_NAME)?,
            }],
            label: Some(CAMERA_BIND_GROUP),
        });

        Ok((camera_bind_group, camera_bind_group_layout))
    }

    /// Creates the bind group for the terrain texture array.
    ///
    /// # Arguments
    /// * `device` - The WebGPU device
    /// * `block_textures` - Array texture with one layer per placeable block type
    ///
    /// # Returns
    /// A tuple containing the bind group and its layout
    fn generate_texture_bindgroups(
        device: &Device,
        block_textures: &Texture,
    ) -> (BindGroup, BindGroupLayout) {
        let texture_array_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            multisampled: false,
                            view_dimension: wgpu::TextureViewDimension::D2Array,
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        // This should match the filterable field of the corresponding Texture entry above.
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
                label: Some(TEXTURE_BIND_GROUP_LAYOUT),
            });

        let texture_array_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &texture_array_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&block_textures.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&block_textures.sampler),
                },
            ],
            label: Some(TEXTURE_BIND_GROUP),
        });

        (texture_array_bind_group, texture_array_bind_group_layout)
    }
}

/// Name of the camera bind group
pub const CAMERA_BIND_GROUP: &str = "camera_bind_group";
/// Name of the camera bind group layout
pub const CAMERA_BIND_GROUP_LAYOUT: &str = "camera_bind_group_layout";
/// Name of the terrain texture bind group
pub const TEXTURE_BIND_GROUP: &str = "texture_bind_group";
/// Name of the terrain texture bind group layout
pub const TEXTURE_BIND_GROUP_LAYOUT: &str = "texture_bind_group_layout";
