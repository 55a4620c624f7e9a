//! # Camera State Management
//!
//! This module handles all camera-related functionality including:
//! - Camera position and orientation tracking
//! - View and projection matrix calculations
//! - Player input processing for camera control
//! - Keeping the GPU camera uniform in sync
//!
//! ## Core Components
//! - `Camera`: Represents the camera's position and orientation in 3D space
//! - `CameraController`: Integrates player input into the camera each frame
//! - `Projection`: Manages the camera's projection matrix
//! - `CameraUniform`: GPU representation of camera data for shaders

use camera::{Camera, CameraController, CameraUniform, Projection};
use cgmath::{Deg, Point3, Rad};
use web_time::Duration;

use crate::config::EngineConfig;

use super::{
    buffer_state::{BufferError, BufferState},
    PlayerAction,
};

pub mod camera;

/// Name of the GPU buffer used for camera uniform data
pub const CAMERA_BUFFER_NAME: &str = "camera_buffer";

/// Manages the complete camera system including state, controls, and GPU resources.
pub struct CameraState {
    /// The current camera position and orientation
    pub camera: Camera,
    /// GPU-optimized camera data for shaders
    pub camera_uniform: CameraUniform,
    /// Handles player input and camera movement
    pub camera_controller: CameraController,
}

impl CameraState {
    /// Creates the camera at the configured start position and its uniform buffer.
    ///
    /// # Arguments
    /// * `config` - Start position and input tunables
    /// * `buffer_state` - Registry the camera uniform buffer is created in
    /// * `projection` - The initial camera projection settings
    pub fn new(
        config: &EngineConfig,
        buffer_state: &mut BufferState,
        projection: &Projection,
    ) -> Self {
        let camera = Camera::new(Point3::from(config.camera_start), Rad(0.0), Rad(0.0));
        let camera_controller = CameraController::new(
            config.movement_speed,
            Deg(config.mouse_sensitivity_degrees),
            config.touch_sensitivity,
            config.touch_move_gain,
        );

        let mut camera_uniform = CameraUniform::new();
        camera_uniform.update_view_proj(&camera, projection);

        buffer_state.create_buffer_init(
            CAMERA_BUFFER_NAME,
            wgpu::util::BufferInitDescriptor {
                label: Some(CAMERA_BUFFER_NAME),
                contents: bytemuck::cast_slice(&[camera_uniform]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            },
        );

        CameraState {
            camera,
            camera_uniform,
            camera_controller,
        }
    }

    /// Processes player input actions and updates the camera controller state.
    pub fn intake_actions(&mut self, actions: &PlayerAction) {
        self.camera_controller.intake_actions(actions);
    }

    /// Integrates this frame's input into the camera.
    pub fn update(&mut self, dt: Duration) {
        self.camera_controller
            .update_camera(&mut self.camera, dt);
    }

    /// Writes the current view-projection matrix to the camera uniform buffer.
    pub fn write_uniform(
        &mut self,
        projection: &Projection,
        buffer_state: &mut BufferState,
    ) -> Result<(), BufferError> {
        self.camera_uniform
            .update_view_proj(&self.camera, projection);
        buffer_state.write_buffer(
            CAMERA_BUFFER_NAME,
            0,
            bytemuck::cast_slice(&[self.camera_uniform]),
        )
    }
}
