//! # Application State Management
//!
//! This module handles the application's state management, including:
//! - Window and graphics initialization
//! - Input handling
//! - Application lifecycle events
//! - Frame pacing in the foreground and background

pub mod graphics_resources_builder;
pub mod input_manager;
pub mod input_state;

use std::sync::Arc;

use cgmath::Vector2;
use graphics_resources_builder::create_graphics;
use input_manager::InputManager;
use log::{debug, error, info, warn};
use web_time::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, ElementState, KeyEvent, MouseButton, Touch, WindowEvent},
    event_loop::ActiveEventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorGrabMode, Window, WindowId},
};

use crate::{config::EngineConfig, engine_state::EngineState, error::EngineError};

/// Frame time assumed for the first frame, before any interval has been measured.
const FIRST_FRAME_TIME: Duration = Duration::from_nanos(1_000_000_000 / 60);

/// The main application state container that manages the application's lifecycle.
///
/// This struct holds the current state of the application and implements
/// `ApplicationHandler` to handle window and device events. A fatal error stops the
/// event loop and is kept for [`ApplicationState::into_result`].
pub struct ApplicationState {
    /// Runtime configuration handed to the engine on start-up
    config: EngineConfig,
    /// The initialized application state, if the application has started
    pub state: Option<InitializedApplicationState>,
    /// The error that stopped the event loop, if any
    fatal_error: Option<EngineError>,
}

/// Represents the fully initialized and running state of the application.
pub struct InitializedApplicationState {
    /// The core engine state and logic
    pub engine_state: EngineState,
    /// Handle to the application window
    pub window: Arc<Window>,
    /// Manages input state and event processing
    pub input_manager: InputManager,
    /// Timestamp of the last frame for delta time calculations
    pub last_frame_time: Option<Instant>,
    /// Time between the two most recent frames
    pub frame_time: Duration,
    /// Whether the window is visible and focused
    pub is_foreground: bool,
    /// Whether the cursor is captured for mouse look
    pub cursor_grabbed: bool,
}

impl ApplicationState {
    /// Creates the application state; graphics are created once the event loop resumes.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            state: None,
            fatal_error: None,
        }
    }

    /// The error that stopped the event loop, if any.
    pub fn into_result(self) -> Result<(), EngineError> {
        match self.fatal_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Logs a fatal error, stores it and stops the event loop.
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: EngineError) {
        error!("{}", err);
        if self.fatal_error.is_none() {
            self.fatal_error = Some(err);
        }
        event_loop.exit();
    }

    /// Creates the window, GPU resources and engine state.
    fn initialize_application_state(
        &mut self,
        event_loop: &ActiveEventLoop,
    ) -> Result<(), EngineError> {
        let graphics = create_graphics(event_loop, &self.config)?;
        let engine_state = EngineState::new(
            &self.config,
            graphics.surface,
            graphics.surface_config,
            graphics.device,
            graphics.queue,
        )?;

        let mut state = InitializedApplicationState {
            engine_state,
            window: graphics.window,
            input_manager: InputManager::new(Duration::from_millis(self.config.tap_threshold_ms)),
            last_frame_time: None,
            frame_time: FIRST_FRAME_TIME,
            is_foreground: true,
            cursor_grabbed: false,
        };
        state.set_cursor_grab(true);
        state.window.request_redraw();

        self.state = Some(state);
        Ok(())
    }
}

impl InitializedApplicationState {
    /// Captures or releases the cursor for mouse look.
    fn set_cursor_grab(&mut self, grab: bool) {
        let result = if grab {
            self.window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| self.window.set_cursor_grab(CursorGrabMode::Confined))
        } else {
            self.window.set_cursor_grab(CursorGrabMode::None)
        };

        match result {
            Ok(()) => {
                self.window.set_cursor_visible(!grab);
                self.cursor_grabbed = grab;
            }
            Err(err) => warn!("Could not change cursor grab: {}", err),
        }
    }

    /// Forwards a touch with its position normalised to the window size.
    fn intake_touch(&mut self, touch: Touch) {
        let size = self.window.inner_size();
        if size.width == 0 || size.height == 0 {
            return;
        }

        let position = Vector2::new(
            (touch.location.x / size.width as f64) as f32,
            (touch.location.y / size.height as f64) as f32,
        );
        self.input_manager
            .intake_touch(touch.id, touch.phase, position, Instant::now());
    }

    /// Advances the frame clock.
    fn tick(&mut self) -> Duration {
        let now = Instant::now();
        if let Some(last) = self.last_frame_time {
            self.frame_time = now - last;
        }
        self.last_frame_time = Some(now);
        self.frame_time
    }
}

impl ApplicationHandler for ApplicationState {
    /// Handles window-related events such as resize, focus changes, and input events.
    ///
    /// # Arguments
    /// * `event_loop` - Reference to the active event loop
    /// * `_window_id` - ID of the window that generated the event
    /// * `event` - The window event to process
    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(state) = &mut self.state else {
            if let WindowEvent::CloseRequested = event {
                event_loop.exit();
            }
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, exiting");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                state.engine_state.resize_surface(size);
            }
            WindowEvent::Focused(is_focused) => {
                state.is_foreground = is_focused;
                if !is_focused {
                    state.input_manager.release_all();
                    state.set_cursor_grab(false);
                }
            }
            WindowEvent::Occluded(is_occluded) => {
                state.is_foreground = !is_occluded;
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => {
                state.set_cursor_grab(false);
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } if !state.cursor_grabbed => {
                state.set_cursor_grab(true);
            }
            WindowEvent::Touch(touch) => {
                state.intake_touch(touch);
            }
            WindowEvent::RedrawRequested => {
                let frame_time = state.frame_time;
                match state.engine_state.render(frame_time) {
                    Ok(outcome) => debug!("Frame {:?}", outcome),
                    Err(err) => self.fail(event_loop, err),
                }
            }
            event => state.input_manager.intake_input(&event),
        }
    }

    /// Handles device-level input events such as mouse motion.
    ///
    /// Raw motion only turns the camera while the cursor is captured.
    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let Some(state) = &mut self.state {
            if let DeviceEvent::MouseMotion { delta } = event {
                if state.cursor_grabbed {
                    state.input_manager.intake_mouse_motion(delta);
                }
            }
        }
    }

    /// Creates the window and engine the first time the application resumes.
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        if let Err(err) = self.initialize_application_state(event_loop) {
            self.fail(event_loop, err);
        }
    }

    /// Called before the event loop goes to sleep.
    ///
    /// This method handles frame timing and input processing, and requests the next frame.
    /// In the background each frame is delayed to save power.
    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        let background_delay = Duration::from_millis(self.config.background_frame_delay_ms);

        if let Some(state) = &mut self.state {
            if !state.is_foreground {
                std::thread::sleep(background_delay);
            }

            let frame_time = state.tick();

            let processed_input = state.input_manager.get_and_reset_processed_input();
            state.engine_state.set_input_commands(processed_input);
            state.engine_state.process_input(frame_time);

            state.window.request_redraw();
        }
    }
}
