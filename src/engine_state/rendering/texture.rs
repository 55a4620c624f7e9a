//! Texture handling for the rendering pipeline.
//!
//! This module provides the depth texture shared by the 3D and UI passes and the terrain
//! texture array sampled by the block shader.

use std::path::Path;

use log::info;

use crate::{
    config::EngineConfig,
    engine_state::{
        rendering::ui::texture_registry::TextureError,
        voxels::block::block_type::{BlockType, PLACEABLE_BLOCK_TYPES},
    },
};

/// Side length in pixels of every terrain texture.
pub const BLOCK_TEXTURE_DIMENSION: u32 = 16;

/// Represents a GPU texture with associated view and sampler.
pub struct Texture {
    /// The underlying WebGPU texture resource.
    #[allow(dead_code)]
    pub texture: wgpu::Texture,
    /// The texture view used for binding the texture to the pipeline.
    pub view: wgpu::TextureView,
    /// The sampler used for texture filtering and addressing.
    pub sampler: wgpu::Sampler,
}

impl Texture {
    /// The texture format used for depth buffers.
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Creates a new depth texture with the given configuration.
    ///
    /// # Arguments
    /// * `device` - The WebGPU device
    /// * `config` - The surface configuration containing dimensions
    /// * `label` - Debug label for the texture
    ///
    /// # Returns
    /// A new `Texture` instance configured as a depth buffer
    pub fn create_depth_texture(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        label: &str,
    ) -> Self {
        let size = wgpu::Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
            depth_or_array_layers: 1,
        };
        let desc = wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        };

        let texture = device.create_texture(&desc);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            compare: Some(wgpu::CompareFunction::LessEqual),
            lod_min_clamp: 0.0,
            lod_max_clamp: 100.0,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Loads the terrain textures into one array texture, one layer per placeable block type.
    ///
    /// Layer `n` holds the texture of the block type with [`BlockType::texture_layer`] `n`.
    ///
    /// # Errors
    /// [`TextureError::Decode`] if a file cannot be read and
    /// [`TextureError::InvalidDimensions`] if it is not 16 by 16
    pub fn load_block_texture_array(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        config: &EngineConfig,
    ) -> Result<Self, TextureError> {
        let layers = PLACEABLE_BLOCK_TYPES.len() as u32;
        let size = wgpu::Extent3d {
            width: BLOCK_TEXTURE_DIMENSION,
            height: BLOCK_TEXTURE_DIMENSION,
            depth_or_array_layers: layers,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Block Texture Array"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for block_type in PLACEABLE_BLOCK_TYPES {
            let (Some(layer), Some(file_name)) =
                (block_type.texture_layer(), block_type.texture_file_name())
            else {
                continue;
            };
            let rgba = read_block_texture(&config.texture_path(file_name), block_type)?;

            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d {
                        x: 0,
                        y: 0,
                        z: layer,
                    },
                    aspect: wgpu::TextureAspect::All,
                },
                &rgba,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * BLOCK_TEXTURE_DIMENSION),
                    rows_per_image: Some(BLOCK_TEXTURE_DIMENSION),
                },
                wgpu::Extent3d {
                    width: BLOCK_TEXTURE_DIMENSION,
                    height: BLOCK_TEXTURE_DIMENSION,
                    depth_or_array_layers: 1,
                },
            );
        }
        info!("Loaded {} terrain textures", layers);

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Block Texture Array View"),
            dimension: Some(wgpu::TextureViewDimension::D2Array),
            ..Default::default()
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Block Sampler"),
            address_mode_u: wgpu::AddressMode::MirrorRepeat,
            address_mode_v: wgpu::AddressMode::MirrorRepeat,
            address_mode_w: wgpu::AddressMode::MirrorRepeat,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Ok(Self {
            texture,
            view,
            sampler,
        })
    }
}

/// Decodes a terrain texture and checks its size.
fn read_block_texture(path: &Path, block_type: BlockType) -> Result<Vec<u8>, TextureError> {
    let image = image::open(path)
        .map_err(|source| TextureError::Decode {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgba8();

    let (width, height) = image.dimensions();
    if width != BLOCK_TEXTURE_DIMENSION || height != BLOCK_TEXTURE_DIMENSION {
        return Err(TextureError::InvalidDimensions {
            name: block_type.to_string(),
            width,
            height,
        });
    }

    Ok(image.into_raw())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_png(name: &str, width: u32, height: u32) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("blockfield-{}-{}.png", name, std::process::id()));
        image::RgbaImage::from_pixel(width, height, image::Rgba([1, 2, 3, 255]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn block_textures_must_be_sixteen_square() {
        let good = temp_png("good-tile", 16, 16);
        let bad = temp_png("bad-tile", 16, 8);

        let rgba = read_block_texture(&good, BlockType::Stone).unwrap();
        assert_eq!(rgba.len(), 16 * 16 * 4);
        assert_eq!(&rgba[..4], &[1, 2, 3, 255]);

        assert!(matches!(
            read_block_texture(&bad, BlockType::Dirt),
            Err(TextureError::InvalidDimensions { width: 16, height: 8, .. })
        ));

        std::fs::remove_file(good).unwrap();
        std::fs::remove_file(bad).unwrap();
    }
}
