//! # Camera Implementation
//!
//! This module contains the core camera implementation including:
//! - Camera representation and orientation basis
//! - Projection matrix handling
//! - Camera controller integrating mouse, keyboard and touch input
//! - GPU uniform buffer data
//!
//! ## Conventions
//! The world is left-handed with +Y up. A camera with zero yaw and pitch looks along +Z and
//! has +X on its right. Yaw turns towards +X, pitch raises the view towards +Y.

use cgmath::*;
use std::f32::consts::{FRAC_PI_2, TAU};
use web_time::Duration;

use crate::engine_state::PlayerAction;

/// Safe limit for pitch to keep the forward vector away from the up axis
pub const SAFE_FRAC_PI_2: f32 = FRAC_PI_2 - 0.001;

/// Represents a first-person camera in 3D space.
///
/// The camera maintains its position and orientation in the world. The orientation basis
/// is derived on demand from yaw and pitch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// The camera's position in world space
    pub position: Point3<f32>,
    /// Horizontal rotation (around Y axis) in radians
    pub yaw: Rad<f32>,
    /// Vertical rotation (elevation) in radians
    pub pitch: Rad<f32>,
}

impl Camera {
    /// Creates a new camera with the specified position and orientation.
    ///
    /// # Arguments
    /// * `position` - Initial position of the camera in world space
    /// * `yaw` - Initial yaw (horizontal rotation around Y axis)
    /// * `pitch` - Initial pitch (elevation)
    ///
    /// # Example
    /// ```rust,ignore
    /// use cgmath::{Point3, Deg};
    /// let camera = Camera::new(
    ///     Point3::new(0.0, 0.0, 0.0),  // Position at origin
    ///     Deg(0.0),                     // Facing along positive Z
    ///     Deg(0.0),                     // Level horizon
    /// );
    /// ```
    pub fn new<V: Into<Point3<f32>>, Y: Into<Rad<f32>>, P: Into<Rad<f32>>>(
        position: V,
        yaw: Y,
        pitch: P,
    ) -> Self {
        Self {
            position: position.into(),
            yaw: yaw.into(),
            pitch: pitch.into(),
        }
    }

    /// Unit vector a camera with the given orientation looks along.
    pub fn forward_from(yaw: Rad<f32>, pitch: Rad<f32>) -> Vector3<f32> {
        let (yaw_sin, yaw_cos) = yaw.0.sin_cos();
        let (pitch_sin, pitch_cos) = pitch.0.sin_cos();
        Vector3::new(pitch_cos * yaw_sin, pitch_sin, pitch_cos * yaw_cos)
    }

    /// Gets the camera's forward direction vector.
    pub fn forward(&self) -> Vector3<f32> {
        Self::forward_from(self.yaw, self.pitch)
    }

    /// Orientation basis of the camera.
    ///
    /// # Returns
    /// `(right, up, forward)`, where `right = normalize(up_world × forward)` and
    /// `up = forward × right`
    pub fn basis(&self) -> (Vector3<f32>, Vector3<f32>, Vector3<f32>) {
        let forward = self.forward();
        let right = Vector3::unit_y().cross(forward).normalize();
        let up = forward.cross(right);
        (right, up, forward)
    }

    /// Calculates the view matrix for this camera.
    ///
    /// The view matrix maps world space onto the camera basis: right to +X, up to +Y and
    /// forward to +Z.
    pub fn calc_matrix(&self) -> Matrix4<f32> {
        let (right, up, forward) = self.basis();
        let eye = self.position.to_vec();

        #[rustfmt::skip]
        let view = Matrix4::new(
            right.x, up.x, forward.x, 0.0,
            right.y, up.y, forward.y, 0.0,
            right.z, up.z, forward.z, 0.0,
            -right.dot(eye), -up.dot(eye), -forward.dot(eye), 1.0,
        );
        view
    }

    /// Applies a raw mouse motion.
    ///
    /// Yaw wraps into `[0, 2π)`; pitch is clamped just inside `±π/2`.
    pub fn rotate_by_mouse(&mut self, delta: (f64, f64), sensitivity: Rad<f32>) {
        let (delta_x, delta_y) = (delta.0 as f32, delta.1 as f32);
        self.yaw = Rad((self.yaw.0 + delta_x * sensitivity.0).rem_euclid(TAU));
        self.pitch = Rad(self.pitch.0 - delta_y * sensitivity.0);
        self.clamp_pitch();
    }

    /// Applies a look-touch drag for one frame.
    ///
    /// `drag` is the offset of the finger from where it first touched, in normalised screen
    /// units, so holding a finger away from its start keeps turning the camera. Yaw is not
    /// wrapped here.
    pub fn rotate_by_touch(&mut self, drag: Vector2<f32>, sensitivity: f32, dt: f32) {
        self.yaw += Rad(drag.x * sensitivity * dt);
        self.pitch += Rad(-drag.y * sensitivity * dt);
        self.clamp_pitch();
    }

    /// Moves the camera along its own basis.
    ///
    /// # Arguments
    /// * `input` - `(strafe, vertical, forward)` amounts, clamped to unit length
    /// * `speed` - Blocks per second at full input
    /// * `dt` - Frame duration in seconds
    pub fn translate(&mut self, input: Vector3<f32>, speed: f32, dt: f32) {
        let input = clamp_to_unit_length(input);
        let (right, up, forward) = self.basis();

        let velocity = (right * input.x + up * input.y + forward * input.z) * speed;
        self.position += velocity * dt;
    }

    fn clamp_pitch(&mut self) {
        self.pitch = Rad(self.pitch.0.clamp(-SAFE_FRAC_PI_2, SAFE_FRAC_PI_2));
    }
}

/// Scales `input` down to unit length if it is longer.
pub fn clamp_to_unit_length(input: Vector3<f32>) -> Vector3<f32> {
    let length = input.magnitude();
    if length > 1.0 {
        input / length
    } else {
        input
    }
}

/// Represents a camera's projection matrix and related parameters.
///
/// This handles the left-handed perspective projection used to render the 3D scene, with
/// depth mapped onto WGPU's `[0, 1]` range.
#[derive(Debug)]
pub struct Projection {
    /// Aspect ratio (width / height)
    aspect: f32,
    /// Vertical field of view in radians
    fovy: Rad<f32>,
    /// Near clipping plane distance
    znear: f32,
    /// Far clipping plane distance
    zfar: f32,
}

impl Projection {
    /// Creates a new projection with the given parameters.
    ///
    /// # Arguments
    /// * `width` - Viewport width in pixels
    /// * `height` - Viewport height in pixels
    /// * `fovy` - Vertical field of view (can be any type convertible to `Rad<f32>`)
    /// * `znear` - Near clipping plane distance
    /// * `zfar` - Far clipping plane distance
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: Self::aspect_of(width, height),
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    /// Updates the projection's aspect ratio for viewport resizing.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = Self::aspect_of(width, height);
    }

    /// Calculates the projection matrix.
    pub fn calc_matrix(&self) -> Matrix4<f32> {
        let focal = 1.0 / (self.fovy.0 * 0.5).tan();
        let depth_scale = self.zfar / (self.zfar - self.znear);

        #[rustfmt::skip]
        let projection = Matrix4::new(
            focal / self.aspect, 0.0, 0.0, 0.0,
            0.0, focal, 0.0, 0.0,
            0.0, 0.0, depth_scale, 1.0,
            0.0, 0.0, -self.znear * depth_scale, 0.0,
        );
        projection
    }

    fn aspect_of(width: u32, height: u32) -> f32 {
        width.max(1) as f32 / height.max(1) as f32
    }
}

/// Handles camera movement and rotation based on user input.
///
/// This struct collects one frame of player actions and applies them to the camera when
/// updated.
#[derive(Debug)]
pub struct CameraController {
    /// Held-key movement, `(strafe, vertical, forward)`
    key_movement: Vector3<f32>,
    /// Raw mouse motion accumulated this frame
    mouse_delta: Option<(f64, f64)>,
    /// Offset of the look finger from its start
    look_touch_drag: Option<Vector2<f32>>,
    /// Offset of the move finger from its start
    move_touch_drag: Option<Vector2<f32>>,

    // Configuration
    speed: f32,
    mouse_sensitivity: Rad<f32>,
    touch_sensitivity: f32,
    touch_move_gain: f32,
}

impl CameraController {
    /// Creates a new camera controller.
    ///
    /// # Arguments
    /// * `speed` - Movement speed in blocks per second
    /// * `mouse_sensitivity` - Rotation per unit of raw mouse motion
    /// * `touch_sensitivity` - Rotation rate per unit of look-touch drag
    /// * `touch_move_gain` - Scale applied to the move-touch drag
    pub fn new<S: Into<Rad<f32>>>(
        speed: f32,
        mouse_sensitivity: S,
        touch_sensitivity: f32,
        touch_move_gain: f32,
    ) -> Self {
        Self {
            key_movement: Vector3::zero(),
            mouse_delta: None,
            look_touch_drag: None,
            move_touch_drag: None,
            speed,
            mouse_sensitivity: mouse_sensitivity.into(),
            touch_sensitivity,
            touch_move_gain,
        }
    }

    /// Processes player actions and updates controller state accordingly.
    pub fn intake_actions(&mut self, actions: &PlayerAction) {
        self.key_movement = actions.movement;
        self.mouse_delta = actions.rotate_view;
        self.look_touch_drag = actions.look_touch_drag;
        self.move_touch_drag = actions.move_touch_drag;
    }

    /// Combined movement input for this frame, before clamping.
    pub fn movement_input(&self) -> Vector3<f32> {
        let mut input = self.key_movement;
        if let Some(drag) = self.move_touch_drag {
            let drag = drag * self.touch_move_gain;
            input.x += drag.x;
            input.z += -drag.y;
        }
        input
    }

    /// Applies the collected input to `camera` and clears per-frame state.
    ///
    /// Look-touch rotation is applied before the movement basis is computed, matching the
    /// order a player perceives: turn, then walk.
    pub fn update_camera(&mut self, camera: &mut Camera, dt: Duration) {
        let dt = dt.as_secs_f32();

        if let Some(delta) = self.mouse_delta.take() {
            camera.rotate_by_mouse(delta, self.mouse_sensitivity);
        }
        if let Some(drag) = self.look_touch_drag {
            camera.rotate_by_touch(drag, self.touch_sensitivity, dt);
        }

        camera.translate(self.movement_input(), self.speed, dt);

        self.key_movement = Vector3::zero();
        self.look_touch_drag = None;
        self.move_touch_drag = None;
    }
}

/// GPU-friendly representation of camera data for shaders.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    // We can't use cgmath with bytemuck directly so we'll have to convert the Matrix4 into a 4x4 f32 array
    view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    /// Creates a new camera uniform with an identity matrix.
    pub fn new() -> Self {
        Self {
            view_proj: cgmath::Matrix4::identity().into(),
        }
    }

    /// Updates the view-projection matrix based on the current camera state.
    pub fn update_view_proj(&mut self, camera: &Camera, projection: &Projection) {
        self.view_proj = (projection.calc_matrix() * camera.calc_matrix()).into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < 1e-5,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn zero_orientation_looks_along_positive_z() {
        let camera = Camera::new(Point3::new(0.0, 0.0, 0.0), Rad(0.0), Rad(0.0));
        let (right, up, forward) = camera.basis();

        assert_eq!(forward, Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(right, Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(up, Vector3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn mouse_yaw_wraps_into_one_turn() {
        let mut camera = Camera::new(Point3::new(0.0, 0.0, 0.0), Rad(6.2), Rad(0.0));
        camera.rotate_by_mouse((10.0, 0.0), Deg(1.0).into());

        assert!(camera.yaw.0 >= 0.0 && camera.yaw.0 < TAU);
        assert_close(camera.yaw.0, 6.2 + 10.0f32.to_radians() - TAU);

        camera.rotate_by_mouse((-400.0, 0.0), Deg(1.0).into());
        assert!(camera.yaw.0 >= 0.0 && camera.yaw.0 < TAU);
    }

    #[test]
    fn pitch_stays_inside_open_interval() {
        let mut camera = Camera::new(Point3::new(0.0, 0.0, 0.0), Rad(0.0), Rad(0.0));

        camera.rotate_by_mouse((0.0, -1000.0), Deg(1.0).into());
        assert_eq!(camera.pitch.0, SAFE_FRAC_PI_2);
        assert!(camera.pitch.0 < FRAC_PI_2);

        camera.rotate_by_touch(Vector2::new(0.0, 100.0), 15.0, 1.0);
        assert_eq!(camera.pitch.0, -SAFE_FRAC_PI_2);
    }

    #[test]
    fn mouse_motion_up_raises_the_view() {
        let mut camera = Camera::new(Point3::new(0.0, 0.0, 0.0), Rad(0.0), Rad(0.0));
        camera.rotate_by_mouse((0.0, -10.0), Deg(1.0).into());

        assert_close(camera.pitch.0, 10.0f32.to_radians());
    }

    #[test]
    fn diagonal_movement_is_clamped_to_unit_speed() {
        let mut camera = Camera::new(Point3::new(0.0, 0.0, 0.0), Rad(0.0), Rad(0.0));
        camera.translate(Vector3::new(1.0, 0.0, 1.0), 5.0, 1.0);

        let travelled = camera.position.to_vec().magnitude();
        assert_close(travelled, 5.0);
        assert_close(camera.position.x, camera.position.z);
    }

    #[test]
    fn small_input_is_not_normalised() {
        let input = Vector3::new(0.3, 0.0, 0.4);
        assert_eq!(clamp_to_unit_length(input), input);
    }

    #[test]
    fn move_touch_drag_is_scaled_and_mapped_onto_strafe_and_forward() {
        let mut controller = CameraController::new(5.0, Deg(1.0), 15.0, 10.0);
        controller.move_touch_drag = Some(Vector2::new(0.05, -0.02));

        let input = controller.movement_input();
        assert_close(input.x, 0.5);
        assert_close(input.y, 0.0);
        assert_close(input.z, 0.2);
    }

    #[test]
    fn controller_consumes_mouse_motion_once() {
        let mut controller = CameraController::new(5.0, Deg(1.0), 15.0, 10.0);
        let mut camera = Camera::new(Point3::new(0.0, 0.0, 0.0), Rad(0.0), Rad(0.0));

        controller.mouse_delta = Some((5.0, 0.0));
        controller.update_camera(&mut camera, Duration::from_millis(16));
        controller.update_camera(&mut camera, Duration::from_millis(16));

        assert_close(camera.yaw.0, 5.0f32.to_radians());
        assert_eq!(camera.position, Point3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn view_matrix_moves_the_eye_to_the_origin() {
        let camera = Camera::new(Point3::new(3.0, 4.0, 5.0), Rad(0.7), Rad(0.2));
        let eye = camera.calc_matrix() * camera.position.to_homogeneous();

        assert_close(eye.x, 0.0);
        assert_close(eye.y, 0.0);
        assert_close(eye.z, 0.0);
    }

    #[test]
    fn projection_maps_near_and_far_planes_onto_unit_depth() {
        let projection = Projection::new(800, 600, Deg(80.0), 0.2, 500.0);
        let matrix = projection.calc_matrix();

        let near = matrix * Vector4::new(0.0, 0.0, 0.2, 1.0);
        let far = matrix * Vector4::new(0.0, 0.0, 500.0, 1.0);

        assert_close(near.z / near.w, 0.0);
        assert_close(far.z / far.w, 1.0);
    }
}
