//! Named UI textures streamed to the GPU on demand.
//!
//! Loading a texture only decodes it and copies its pixels into a CPU staging area; the
//! GPU texture is created and filled by the next [`TextureRegistry::upload_pending`] call,
//! which the frame orchestrator issues once at the start of every frame. Textures are
//! flushed in the order they were loaded, each reading its bytes at the running offset
//! `sum(width * height * 4)` of the textures before it.
//!
//! Loads must therefore not interleave with a flush: after a flush the staging area is
//! reused from offset zero.
//!
//! The GPU side sits behind the [`TextureUploader`] trait so the bookkeeping can be
//! exercised without a device.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use log::{debug, info};

use crate::core::{DensePool, DensePoolError, PoolId};

/// Name the font atlas is registered under. It is always the first texture.
pub const FONT_TEXTURE_NAME: &str = "<font>";

/// Largest accepted texture side in pixels.
pub const MAX_TEXTURE_DIMENSION: u32 = 4096;

/// Most UI textures a registry holds by default.
pub const MAX_UI_TEXTURES: usize = 1024;

/// Size of a fresh staging area in bytes.
pub const INITIAL_STAGING_BYTES: usize = 1 << 20;

/// Errors raised while loading, uploading or looking up textures.
#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("failed to decode texture {path}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("texture '{name}' is {width}x{height}, each side must be between 1 and {MAX_TEXTURE_DIMENSION}")]
    InvalidDimensions {
        name: String,
        width: u32,
        height: u32,
    },
    #[error("texture '{name}' has {actual} bytes of pixel data, expected {expected}")]
    PixelCountMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
    #[error("no texture with id {0}")]
    UnknownTexture(PoolId),
    #[error("texture {0} has not been uploaded yet")]
    PendingUpload(PoolId),
    #[error("GPU texture creation failed: {0}")]
    Gpu(String),
    #[error("texture registry: {0}")]
    Pool(#[from] DensePoolError),
}

/// GPU operations the registry needs to flush pending textures.
pub trait TextureUploader {
    /// Handle to a created GPU texture.
    type Texture;

    /// Creates an empty RGBA8 texture.
    fn create_texture(
        &mut self,
        name: &str,
        dimensions: (u16, u16),
    ) -> Result<Self::Texture, TextureError>;

    /// Fills a texture created by [`TextureUploader::create_texture`] with tightly packed
    /// RGBA8 rows.
    fn write_texture(&mut self, texture: &Self::Texture, dimensions: (u16, u16), rgba: &[u8]);
}

/// A registered texture.
#[derive(Debug)]
pub struct TextureEntry<T> {
    pub name: String,
    pub dimensions: (u16, u16),
    /// `None` until the texture is flushed to the GPU
    pub gpu: Option<T>,
}

/// Growable CPU staging area for pixel data awaiting upload.
#[derive(Debug, Clone)]
pub struct DynamicStagingBuffer {
    bytes: Vec<u8>,
    offset: usize,
}

impl DynamicStagingBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            bytes: vec![0; capacity],
            offset: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// Copies `data` in after the staged bytes, growing to the next power of two if needed.
    ///
    /// # Returns
    /// The offset `data` was written at
    pub fn stage(&mut self, data: &[u8]) -> usize {
        let start = self.offset;
        let end = start + data.len();

        if end > self.capacity() {
            let new_capacity = end.next_power_of_two();
            debug!(
                "Growing texture staging area from {} to {} bytes",
                self.capacity(),
                new_capacity
            );
            let mut bytes = vec![0; new_capacity];
            bytes[..start].copy_from_slice(&self.bytes[..start]);
            self.bytes = bytes;
        }

        self.bytes[start..end].copy_from_slice(data);
        self.offset = end;
        start
    }

    /// Staged bytes in `start..start + len`.
    pub fn slice(&self, start: usize, len: usize) -> &[u8] {
        &self.bytes[start..start + len]
    }

    /// Makes the whole area available again.
    pub fn reset(&mut self) {
        self.offset = 0;
    }
}

/// Registry of named textures with deferred GPU upload.
pub struct TextureRegistry<T> {
    entries: DensePool<TextureEntry<T>>,
    ids_by_name: HashMap<String, PoolId>,
    staging: DynamicStagingBuffer,
    pending: Vec<PoolId>,
}

impl<T> Default for TextureRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TextureRegistry<T> {
    pub fn new() -> Self {
        Self::with_texture_limit(MAX_UI_TEXTURES)
    }

    /// Creates a registry that refuses more than `limit` textures.
    pub fn with_texture_limit(limit: usize) -> Self {
        Self {
            entries: DensePool::with_capacity_limit(limit),
            ids_by_name: HashMap::new(),
            staging: DynamicStagingBuffer::new(INITIAL_STAGING_BYTES),
            pending: Vec::new(),
        }
    }

    /// Decodes an image file and queues it for upload under `name`.
    ///
    /// If `name` is already registered its id is returned and the file is not read.
    ///
    /// # Arguments
    /// * `name` - Key the texture is looked up by
    /// * `path` - Image file to decode
    pub fn load_texture(&mut self, name: &str, path: &Path) -> Result<PoolId, TextureError> {
        if let Some(&id) = self.ids_by_name.get(name) {
            return Ok(id);
        }

        let image = image::open(path)
            .map_err(|source| TextureError::Decode {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();
        let (width, height) = image.dimensions();

        let id = self.register_pixels(name, width, height, image.as_raw())?;
        info!("Loaded texture '{}' ({}x{}) from {}", name, width, height, path.display());
        Ok(id)
    }

    /// Queues tightly packed RGBA8 pixels for upload under `name`.
    ///
    /// If `name` is already registered its id is returned and nothing is staged.
    pub fn register_pixels(
        &mut self,
        name: &str,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Result<PoolId, TextureError> {
        if let Some(&id) = self.ids_by_name.get(name) {
            return Ok(id);
        }

        let valid = 1..=MAX_TEXTURE_DIMENSION;
        if !valid.contains(&width) || !valid.contains(&height) {
            return Err(TextureError::InvalidDimensions {
                name: name.to_string(),
                width,
                height,
            });
        }

        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(TextureError::PixelCountMismatch {
                name: name.to_string(),
                expected,
                actual: rgba.len(),
            });
        }

        let id = self.entries.append(TextureEntry {
            name: name.to_string(),
            dimensions: (width as u16, height as u16),
            gpu: None,
        })?;

        self.staging.stage(rgba);
        self.pending.push(id);
        self.ids_by_name.insert(name.to_string(), id);

        Ok(id)
    }

    /// Creates and fills GPU textures for everything loaded since the last flush.
    ///
    /// # Returns
    /// The number of textures uploaded
    pub fn upload_pending<U>(&mut self, uploader: &mut U) -> Result<usize, TextureError>
    where
        U: TextureUploader<Texture = T>,
    {
        if self.pending.is_empty() {
            return Ok(0);
        }

        let mut offset = 0;
        let mut uploaded = 0;
        for &id in &self.pending {
            let entry = self
                .entries
                .get_mut(id)
                .map_err(|_| TextureError::UnknownTexture(id))?;

            let (width, height) = entry.dimensions;
            let len = width as usize * height as usize * 4;

            let texture = uploader.create_texture(&entry.name, entry.dimensions)?;
            uploader.write_texture(&texture, entry.dimensions, self.staging.slice(offset, len));
            entry.gpu = Some(texture);

            offset += len;
            uploaded += 1;
        }

        debug!("Uploaded {} UI textures ({} bytes)", uploaded, offset);
        self.staging.reset();
        self.pending.clear();
        Ok(uploaded)
    }

    /// The GPU texture for `id`.
    pub fn get(&self, id: PoolId) -> Result<&T, TextureError> {
        self.entries
            .get(id)
            .map_err(|_| TextureError::UnknownTexture(id))?
            .gpu
            .as_ref()
            .ok_or(TextureError::PendingUpload(id))
    }

    /// Number of registered textures, uploaded or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// A UI texture on the GPU with the bind group the image pipeline samples it through.
pub struct UiTexture {
    pub texture: wgpu::Texture,
    pub bind_group: wgpu::BindGroup,
}

/// [`TextureUploader`] writing through a wgpu queue.
pub struct WgpuTextureUploader<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    /// Layout of the per-texture bind group: texture view at 0, sampler at 1
    pub layout: &'a wgpu::BindGroupLayout,
    pub sampler: &'a wgpu::Sampler,
}

impl TextureUploader for WgpuTextureUploader<'_> {
    type Texture = UiTexture;

    fn create_texture(
        &mut self,
        name: &str,
        dimensions: (u16, u16),
    ) -> Result<Self::Texture, TextureError> {
        let max = self.device.limits().max_texture_dimension_2d;
        if u32::from(dimensions.0) > max || u32::from(dimensions.1) > max {
            return Err(TextureError::Gpu(format!(
                "'{}' exceeds the device limit of {} pixels",
                name, max
            )));
        }

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(name),
            size: wgpu::Extent3d {
                width: dimensions.0 as u32,
                height: dimensions.1 as u32,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(name),
            layout: self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(self.sampler),
                },
            ],
        });

        Ok(UiTexture {
            texture,
            bind_group,
        })
    }

    fn write_texture(&mut self, texture: &Self::Texture, dimensions: (u16, u16), rgba: &[u8]) {
        let (width, height) = (dimensions.0 as u32, dimensions.1 as u32);
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
    }
}
