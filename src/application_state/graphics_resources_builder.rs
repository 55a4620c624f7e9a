//! # Graphics Resources Builder
//!
//! This module handles the creation of the graphics resources required by the application:
//! the window, the WebGPU surface, adapter, device and queue, and the initial surface
//! configuration.
//!
//! Adapter and device requests are asynchronous in WebGPU; the desktop build blocks on
//! them with `pollster` while the event loop is resuming.

use std::sync::Arc;

use log::info;
use wgpu::{Device, Queue, Surface, SurfaceConfiguration};
use winit::{dpi::LogicalSize, event_loop::ActiveEventLoop, window::Window};

use crate::{config::EngineConfig, error::EngineError};

/// Contains all graphics-related resources required by the application.
pub struct Graphics {
    /// The application window
    pub window: Arc<Window>,
    /// Surface of `window`, already configured with `surface_config`
    pub surface: Surface<'static>,
    /// Size, format and present mode of the surface
    pub surface_config: SurfaceConfiguration,
    /// The WebGPU device
    pub device: Device,
    /// The WebGPU queue
    pub queue: Queue,
}

/// Creates the window and initializes all required graphics resources.
///
/// # Arguments
/// * `event_loop` - The active event loop used to create the window
/// * `config` - Window title and size
///
/// # Errors
/// Any failure to create the window or surface, find an adapter or open a device
pub fn create_graphics(
    event_loop: &ActiveEventLoop,
    config: &EngineConfig,
) -> Result<Graphics, EngineError> {
    let window_attrs = Window::default_attributes()
        .with_title(config.window_title.clone())
        .with_inner_size(LogicalSize::new(config.window_width, config.window_height));

    let window = Arc::new(event_loop.create_window(window_attrs)?);

    // The instance is a handle to our GPU
    // Backends::PRIMARY => Vulkan + Metal + DX12 + Browser WebGPU
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::PRIMARY,
        flags: wgpu::InstanceFlags::from_build_config(),
        backend_options: wgpu::BackendOptions::from_env_or_default(),
    });

    let surface = instance.create_surface(window.clone())?;

    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::default(),
        compatible_surface: Some(&surface),
        force_fallback_adapter: false,
    }))?;

    let adapter_info = adapter.get_info();
    info!(
        "Using adapter '{}' ({:?})",
        adapter_info.name, adapter_info.backend
    );

    let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
        label: Some("blockfield device"),
        required_features: wgpu::Features::empty(),
        required_limits: wgpu::Limits::default().using_resolution(adapter.limits()),
        memory_hints: wgpu::MemoryHints::MemoryUsage,
        trace: wgpu::Trace::Off,
    }))?;

    let size = window.inner_size();

    let surface_caps = surface.get_capabilities(&adapter);
    let surface_format = surface_caps
        .formats
        .iter()
        .find(|f| f.is_srgb())
        .or_else(|| surface_caps.formats.first())
        .copied()
        .ok_or(EngineError::UnsupportedSurface)?;
    let present_mode = surface_caps
        .present_modes
        .first()
        .copied()
        .ok_or(EngineError::UnsupportedSurface)?;
    let alpha_mode = surface_caps
        .alpha_modes
        .first()
        .copied()
        .ok_or(EngineError::UnsupportedSurface)?;

    let surface_config = wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format: surface_format,
        width: size.width.max(1),
        height: size.height.max(1),
        present_mode,
        alpha_mode,
        view_formats: vec![],
        desired_maximum_frame_latency: 2,
    };
    surface.configure(&device, &surface_config);

    Ok(Graphics {
        window,
        surface,
        surface_config,
        device,
        queue,
    })
}
