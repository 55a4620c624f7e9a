//! # Engine State Module
//!
//! The core engine module that manages the state and functionality of the voxel engine.
//!
//! ## Key Components
//!
//! * `EngineState` - The main state container for the engine
//! * `buffer_state` - Manages GPU buffers for rendering
//! * `camera_state` - Handles camera positioning and movement
//! * `rendering` - Contains the block and UI pipelines and the frame sequence
//! * `voxels` - Handles blocks, the block store, picking and world edits
//!
//! ## Architecture
//!
//! `EngineState` is the single owner of every subsystem. The application handler passes it
//! by `&mut` into each event and frame, and it lends its parts to each other explicitly:
//! the camera to the world for picking, the block store to the renderer for upload.

use cgmath::{Vector2, Vector3, Zero};
use log::{info, warn};
use web_time::Duration;
use wgpu::{Device, Queue, Surface, SurfaceConfiguration};
use winit::keyboard::KeyCode;

use buffer_state::BufferState;
use camera_state::{camera, CameraState};
use rendering::{
    pipeline_manager::FrameOutcome,
    ui::{
        hud::{build_hud, FrameStats, HudState},
        texture_registry::{TextureRegistry, UiTexture, FONT_TEXTURE_NAME},
        UiBatchManager,
    },
    RenderManager,
};
use voxels::{
    block::block_type::{BlockType, PLACEABLE_BLOCK_TYPES},
    world::{BlockEdit, World},
};

use crate::{
    application_state::input_state::{BlockAction, ProcessedInputState},
    config::EngineConfig,
    core::PoolId,
    error::EngineError,
};

pub mod buffer_state;
pub mod camera_state;
pub mod rendering;
pub mod voxels;

/// File name of the font atlas under the texture directory
pub const FONT_TEXTURE_FILE: &str = "font.png";

/// The main state container for the voxel engine
///
/// This struct maintains all major subsystems and coordinates their interactions. It
/// handles input processing, world edits and rendering.
///
/// # Examples
///
/// ```rust,ignore
/// let mut engine_state = EngineState::new(&config, surface, surface_config, device, queue)?;
///
/// // Main loop
/// loop {
///     engine_state.set_input_commands(input_manager.get_and_reset_processed_input());
///     engine_state.process_input(delta_time);
///     engine_state.render(delta_time)?;
/// }
/// ```
pub struct EngineState {
    /// Registry of every GPU buffer
    pub buffer_state: BufferState,
    /// Camera state managing position, orientation and movement
    pub camera_state: CameraState,
    /// Current player actions derived from input
    pub player_actions: PlayerAction,
    /// The block world
    pub world: World,
    /// Surface and pipelines
    pub render_manager: RenderManager,
    /// This frame's UI batches
    pub ui_batches: UiBatchManager,
    /// Streaming registry of UI textures
    pub ui_textures: TextureRegistry<UiTexture>,
    /// Id of the font atlas in `ui_textures`
    font_texture: PoolId,
    /// UI textures showing each placeable block type
    block_icons: Vec<(BlockType, PoolId)>,
    /// Type placed by the next place action
    selected_block_type: BlockType,
    /// Rolling frame rate for the HUD
    frame_stats: FrameStats,
}

impl EngineState {
    /// Creates a new engine state with all subsystems initialized
    ///
    /// Loads every asset: shaders and terrain textures for the pipelines, then the font
    /// atlas and block icons into the UI texture registry. The UI textures reach the GPU
    /// with the first frame.
    ///
    /// # Arguments
    ///
    /// * `config` - Runtime configuration
    /// * `surface` - The configured rendering surface
    /// * `surface_config` - Configuration the surface was configured with
    /// * `device` - The GPU device
    /// * `queue` - The GPU command queue
    ///
    /// # Errors
    ///
    /// Any asset that fails to load, or a GPU resource that cannot be created
    pub fn new(
        config: &EngineConfig,
        surface: Surface<'static>,
        surface_config: SurfaceConfiguration,
        device: Device,
        queue: Queue,
    ) -> Result<Self, EngineError> {
        let mut buffer_state = BufferState::new(device, queue);

        let camera_projection = camera::Projection::new(
            surface_config.width,
            surface_config.height,
            cgmath::Deg(config.field_of_view_degrees),
            config.z_near,
            config.z_far,
        );

        let camera_state = CameraState::new(config, &mut buffer_state, &camera_projection);

        let render_manager = RenderManager::new(
            surface,
            surface_config,
            &mut buffer_state,
            config,
            camera_projection,
        )?;

        let mut ui_textures = TextureRegistry::new();
        let font_texture =
            ui_textures.load_texture(FONT_TEXTURE_NAME, &config.texture_path(FONT_TEXTURE_FILE))?;

        let mut block_icons = Vec::with_capacity(PLACEABLE_BLOCK_TYPES.len());
        for block_type in PLACEABLE_BLOCK_TYPES {
            if let Some(file_name) = block_type.texture_file_name() {
                let id = ui_textures.load_texture(file_name, &config.texture_path(file_name))?;
                block_icons.push((block_type, id));
            }
        }

        info!("Registered {} UI textures", ui_textures.len());

        let world = World::new()?;
        info!(
            "World created with {} of {} blocks",
            world.blocks.len(),
            world.blocks.capacity()
        );

        Ok(Self {
            buffer_state,
            camera_state,
            player_actions: PlayerAction::default(),
            world,
            render_manager,
            ui_batches: UiBatchManager::new(),
            ui_textures,
            font_texture,
            block_icons,
            selected_block_type: PLACEABLE_BLOCK_TYPES[0],
            frame_stats: FrameStats::default(),
        })
    }

    /// Resizes the rendering surface when the window size changes
    ///
    /// # Arguments
    ///
    /// * `size` - The new physical size of the window
    pub fn resize_surface(&mut self, size: winit::dpi::PhysicalSize<u32>) {
        self.render_manager.resize_surface(size, &self.buffer_state);
    }

    /// Renders the current frame
    ///
    /// Lays out the HUD, batches it, then uploads and draws the world and UI.
    ///
    /// # Arguments
    ///
    /// * `delta_time` - Time since the previous frame
    pub fn render(&mut self, delta_time: Duration) -> Result<FrameOutcome, EngineError> {
        self.camera_state
            .write_uniform(&self.render_manager.camera_projection, &mut self.buffer_state)?;

        let viewport = self.render_manager.viewport();
        let hud = HudState {
            viewport,
            selected_block: self.selected_block_type,
            selected_texture: self.block_icon(self.selected_block_type),
            frames_per_second: self.frame_stats.frames_per_second(),
            block_count: self.world.blocks.len(),
        };
        let commands = build_hud(&hud)?;
        self.ui_batches
            .render_command_array(delta_time.as_secs_f32(), viewport, &commands)?;

        self.render_manager.render(
            &mut self.buffer_state,
            self.world.blocks.as_slice(),
            &self.ui_batches,
            &mut self.ui_textures,
            self.font_texture,
        )
    }

    /// Processes input and updates the camera and world state
    ///
    /// The camera moves first so edits pick along the ray the player sees this frame.
    ///
    /// # Arguments
    ///
    /// * `delta_time` - The time elapsed since the last frame
    pub fn process_input(&mut self, delta_time: Duration) {
        self.frame_stats.tick(delta_time);

        self.camera_state.intake_actions(&self.player_actions);
        self.camera_state.update(delta_time);

        if let Some(slot) = self.player_actions.hotbar_slot.take() {
            self.selected_block_type = BlockType::from_hotbar_slot(slot);
            info!("Selected {}", self.selected_block_type);
        }

        for action in std::mem::take(&mut self.player_actions.block_actions) {
            let new_type = match action {
                BlockAction::PlaceSelected => self.selected_block_type,
                BlockAction::Remove => BlockType::Air,
            };
            if let Err(err) = self.modify_block(new_type) {
                warn!("Block edit failed: {}", err);
            }
        }
    }

    /// Edits the block under the crosshair: `Air` removes it, any other type is placed
    /// against the picked face.
    ///
    /// # Returns
    ///
    /// The applied edit, or `None` when nothing is picked or the placement is refused
    pub fn modify_block(&mut self, new_type: BlockType) -> Result<Option<BlockEdit>, EngineError> {
        Ok(self
            .world
            .modify_block(&self.camera_state.camera, new_type)?)
    }

    /// Sets the input commands for the engine state.
    ///
    /// # Arguments
    /// * `input` - The processed input state to use for setting commands
    pub fn set_input_commands(&mut self, input: ProcessedInputState) {
        self.player_actions = Self::translate_processed_input(input);
    }

    /// UI texture showing `block_type`.
    fn block_icon(&self, block_type: BlockType) -> Option<PoolId> {
        self.block_icons
            .iter()
            .find(|(icon_type, _)| *icon_type == block_type)
            .map(|(_, id)| *id)
    }

    /// Translates the processed input state into player actions.
    ///
    /// # Arguments
    /// * `input` - The processed input state to translate
    ///
    /// # Returns
    /// A PlayerAction struct with the appropriate actions set
    fn translate_processed_input(input: ProcessedInputState) -> PlayerAction {
        PlayerAction {
            movement: Vector3::new(
                input.key_axis(KeyCode::KeyD, KeyCode::KeyA),
                input.key_axis(KeyCode::KeyR, KeyCode::KeyF),
                input.key_axis(KeyCode::KeyW, KeyCode::KeyS),
            ),
            rotate_view: input.mouse_delta,
            look_touch_drag: input.look_touch_drag,
            move_touch_drag: input.move_touch_drag,
            hotbar_slot: input.hotbar_slot,
            block_actions: input.block_actions,
        }
    }
}

/// Represents player actions derived from input
///
/// Movement axes are right, up and forward in camera space, each in `-1.0..=1.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerAction {
    /// Keyboard movement: x right, y up, z forward
    pub(crate) movement: Vector3<f32>,
    /// Mouse look delta in pixels
    pub(crate) rotate_view: Option<(f64, f64)>,
    /// Offset of the look finger from where it touched down, in normalised screen units
    pub(crate) look_touch_drag: Option<Vector2<f32>>,
    /// Offset of the move finger from where it touched down, in normalised screen units
    pub(crate) move_touch_drag: Option<Vector2<f32>>,
    /// Hotbar slot chosen this frame
    pub(crate) hotbar_slot: Option<usize>,
    /// World edits requested this frame, in input order
    pub(crate) block_actions: Vec<BlockAction>,
}

impl Default for PlayerAction {
    fn default() -> Self {
        Self {
            movement: Vector3::zero(),
            rotate_view: None,
            look_touch_drag: None,
            move_touch_drag: None,
            hotbar_slot: None,
            block_actions: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use crate::application_state::input_state::RawInputState;

    use super::*;

    #[test]
    fn idle_input_is_the_default_action() {
        let action = EngineState::translate_processed_input(ProcessedInputState::default());
        assert_eq!(action, PlayerAction::default());
        assert_eq!(action.movement, Vector3::zero());
        assert!(action.block_actions.is_empty());
    }

    #[test]
    fn processed_input_becomes_player_action() {
        let mut keyboard_states = HashMap::new();
        keyboard_states.insert(KeyCode::KeyW, RawInputState::Pressed);
        keyboard_states.insert(KeyCode::KeyA, RawInputState::Held);
        keyboard_states.insert(KeyCode::KeyR, RawInputState::Held);
        keyboard_states.insert(KeyCode::KeyF, RawInputState::Held);

        let input = ProcessedInputState {
            keyboard_states,
            mouse_delta: Some((3.0, -2.0)),
            hotbar_slot: Some(4),
            block_actions: vec![BlockAction::Remove, BlockAction::PlaceSelected],
            ..Default::default()
        };

        let action = EngineState::translate_processed_input(input);
        assert_eq!(action.movement, Vector3::new(-1.0, 0.0, 1.0));
        assert_eq!(action.rotate_view, Some((3.0, -2.0)));
        assert_eq!(action.hotbar_slot, Some(4));
        assert_eq!(
            action.block_actions,
            vec![BlockAction::Remove, BlockAction::PlaceSelected]
        );
        assert_eq!(action.look_touch_drag, None);
    }
}
