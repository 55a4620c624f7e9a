//! # Input Manager
//!
//! This module handles input processing for the application, including:
//! - Keyboard input state tracking
//! - Mouse clicks and motion
//! - Touch tracking with tap detection
//! - Collecting discrete world edits in event order

use std::collections::HashMap;

use cgmath::Vector2;
use log::debug;
use web_time::{Duration, Instant};
use winit::{
    event::{ElementState, KeyEvent, MouseButton, TouchPhase, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

use super::input_state::{BlockAction, ProcessedInputState, RawInputState, TouchRole, TouchTracker};

/// Keys whose held state drives camera movement.
const KEY_CODES: [KeyCode; 6] = [
    KeyCode::KeyW,
    KeyCode::KeyS,
    KeyCode::KeyA,
    KeyCode::KeyD,
    KeyCode::KeyR,
    KeyCode::KeyF,
];

/// Number-row keys in hotbar order.
const HOTBAR_KEY_CODES: [KeyCode; 10] = [
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
    KeyCode::Digit6,
    KeyCode::Digit7,
    KeyCode::Digit8,
    KeyCode::Digit9,
    KeyCode::Digit0,
];

/// Manages the state of all input devices and processes input events.
///
/// Held keys are sampled once per frame. Clicks, taps and hotbar presses are recorded
/// as they arrive so that a press and release inside one frame is never lost.
pub struct InputManager {
    /// Previous state of all tracked keyboard keys
    pub keyboard_inputs_old: HashMap<KeyCode, bool>,
    /// Current state of all tracked keyboard keys
    pub keyboard_inputs_new: HashMap<KeyCode, bool>,

    /// Mouse movement delta accumulated since the last frame (x, y)
    pub mouse_delta: Option<(f64, f64)>,

    /// Finger controlling movement, if any
    pub move_touch: Option<TouchTracker>,
    /// Finger controlling the view, if any
    pub look_touch: Option<TouchTracker>,

    /// Touches shorter than this are taps
    tap_threshold: Duration,
    /// Hotbar slot pressed since the last frame
    hotbar_slot: Option<usize>,
    /// Edits requested since the last frame
    block_actions: Vec<BlockAction>,
}

impl InputManager {
    /// Creates a new InputManager with every tracked key released and no touches.
    ///
    /// # Arguments
    /// * `tap_threshold` - Touches released within this time trigger a block edit
    pub fn new(tap_threshold: Duration) -> Self {
        let keyboard_inputs_old = KEY_CODES.iter().map(|key| (*key, false)).collect();
        let keyboard_inputs_new = KEY_CODES.iter().map(|key| (*key, false)).collect();

        Self {
            keyboard_inputs_old,
            keyboard_inputs_new,
            mouse_delta: None,
            move_touch: None,
            look_touch: None,
            tap_threshold,
            hotbar_slot: None,
            block_actions: Vec::new(),
        }
    }

    /// Updates the old state with the current state to prepare for the next frame.
    pub fn move_old_states(&mut self) {
        for (key, new_state) in self.keyboard_inputs_new.iter() {
            if let Some(old_state) = self.keyboard_inputs_old.get_mut(key) {
                *old_state = *new_state;
            }
        }
    }

    /// Processes a window event and updates internal input state.
    ///
    /// Handles keyboard and mouse button events. Held keys are sampled per frame; left and
    /// right button presses queue a place or remove edit respectively.
    pub fn intake_input(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state,
                        physical_key: PhysicalKey::Code(key),
                        repeat,
                        ..
                    },
                ..
            } => {
                if let Some(key_state) = self.keyboard_inputs_new.get_mut(key) {
                    *key_state = *state == ElementState::Pressed;
                }

                if *state == ElementState::Pressed && !repeat {
                    if let Some(slot) = HOTBAR_KEY_CODES.iter().position(|code| code == key) {
                        self.hotbar_slot = Some(slot);
                    }
                }
            }
            WindowEvent::MouseInput {
                button,
                state: ElementState::Pressed,
                ..
            } => self.intake_mouse_click(*button),
            _ => {}
        }
    }

    /// Queues the edit bound to a mouse button press.
    pub fn intake_mouse_click(&mut self, button: MouseButton) {
        match button {
            MouseButton::Left => self.block_actions.push(BlockAction::PlaceSelected),
            MouseButton::Right => self.block_actions.push(BlockAction::Remove),
            _ => {}
        }
    }

    /// Accumulates raw mouse motion.
    ///
    /// # Arguments
    /// * `delta` - The (x, y) delta of mouse movement reported by the device
    pub fn intake_mouse_motion(&mut self, delta: (f64, f64)) {
        let (x, y) = self.mouse_delta.unwrap_or((0.0, 0.0));
        self.mouse_delta = Some((x + delta.0, y + delta.1));
    }

    /// Processes a touch event.
    ///
    /// A new finger claims the move role on the left half of the screen and the look role
    /// on the right half, unless that role is already held by another finger. Lifting a
    /// tracked finger within the tap threshold queues the role's tap edit.
    ///
    /// # Arguments
    /// * `finger_id` - Platform id of the finger
    /// * `phase` - Touch phase reported by the window system
    /// * `position` - Position normalised to `[0, 1]` on both axes
    /// * `now` - Time the event was received
    pub fn intake_touch(
        &mut self,
        finger_id: u64,
        phase: TouchPhase,
        position: Vector2<f32>,
        now: Instant,
    ) {
        match phase {
            TouchPhase::Started => {
                let slot = match TouchRole::for_position(position) {
                    TouchRole::Move => &mut self.move_touch,
                    TouchRole::Look => &mut self.look_touch,
                };
                if slot.is_none() {
                    *slot = Some(TouchTracker::new(finger_id, position, now));
                }
            }
            TouchPhase::Moved => {
                if let Some((_, tracker)) = self.tracker_for(finger_id) {
                    tracker.current_position = position;
                }
            }
            TouchPhase::Ended => {
                if let Some((role, tracker)) = self.take_tracker(finger_id) {
                    if tracker.is_tap(now, self.tap_threshold) {
                        debug!("{:?} touch tap", role);
                        self.block_actions.push(role.tap_action());
                    }
                }
            }
            TouchPhase::Cancelled => {
                self.take_tracker(finger_id);
            }
        }
    }

    fn tracker_for(&mut self, finger_id: u64) -> Option<(TouchRole, &mut TouchTracker)> {
        if let Some(tracker) = self.move_touch.as_mut().filter(|t| t.finger_id == finger_id) {
            return Some((TouchRole::Move, tracker));
        }
        self.look_touch
            .as_mut()
            .filter(|t| t.finger_id == finger_id)
            .map(|tracker| (TouchRole::Look, tracker))
    }

    fn take_tracker(&mut self, finger_id: u64) -> Option<(TouchRole, TouchTracker)> {
        if self.move_touch.is_some_and(|t| t.finger_id == finger_id) {
            return self.move_touch.take().map(|t| (TouchRole::Move, t));
        }
        if self.look_touch.is_some_and(|t| t.finger_id == finger_id) {
            return self.look_touch.take().map(|t| (TouchRole::Look, t));
        }
        None
    }

    /// Creates a processed input state from the current raw states.
    pub fn create_processed_input_state(&mut self) -> ProcessedInputState {
        let keyboard_states = self
            .keyboard_inputs_new
            .iter()
            .map(|(key, &new_state)| {
                let old_state = self.keyboard_inputs_old.get(key).copied().unwrap_or(false);
                (*key, RawInputState::from_raw_states(old_state, new_state))
            })
            .collect();

        ProcessedInputState {
            keyboard_states,
            mouse_delta: self.mouse_delta,
            move_touch_drag: self.move_touch.map(|t| t.drag()),
            look_touch_drag: self.look_touch.map(|t| t.drag()),
            hotbar_slot: self.hotbar_slot,
            block_actions: self.block_actions.clone(),
        }
    }

    /// Returns the processed input state and resets per-frame state.
    pub fn get_and_reset_processed_input(&mut self) -> ProcessedInputState {
        let processed_input = self.create_processed_input_state();
        self.reset_inputs();
        processed_input
    }

    /// Clears per-frame state: motion, queued edits and the hotbar press.
    pub fn reset_inputs(&mut self) {
        self.move_old_states();

        self.mouse_delta = None;
        self.hotbar_slot = None;
        self.block_actions.clear();
    }

    /// Releases every key and finger, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.keyboard_inputs_new.values_mut().for_each(|state| *state = false);
        self.move_touch = None;
        self.look_touch = None;
        self.reset_inputs();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> InputManager {
        InputManager::new(Duration::from_millis(500))
    }

    #[test]
    fn quick_move_touch_queues_a_removal() {
        let mut input = manager();
        let start = Instant::now();

        input.intake_touch(7, TouchPhase::Started, Vector2::new(0.25, 0.5), start);
        input.intake_touch(
            7,
            TouchPhase::Ended,
            Vector2::new(0.25, 0.5),
            start + Duration::from_millis(120),
        );

        let processed = input.get_and_reset_processed_input();
        assert_eq!(processed.block_actions, vec![BlockAction::Remove]);
        assert!(input.move_touch.is_none());
    }

    #[test]
    fn quick_look_touch_queues_a_placement() {
        let mut input = manager();
        let start = Instant::now();

        input.intake_touch(2, TouchPhase::Started, Vector2::new(0.75, 0.5), start);
        input.intake_touch(
            2,
            TouchPhase::Ended,
            Vector2::new(0.75, 0.5),
            start + Duration::from_millis(300),
        );

        assert_eq!(
            input.get_and_reset_processed_input().block_actions,
            vec![BlockAction::PlaceSelected]
        );
    }

    #[test]
    fn long_press_is_a_drag_not_a_tap() {
        let mut input = manager();
        let start = Instant::now();

        input.intake_touch(2, TouchPhase::Started, Vector2::new(0.75, 0.5), start);
        input.intake_touch(
            2,
            TouchPhase::Ended,
            Vector2::new(0.75, 0.5),
            start + Duration::from_millis(800),
        );

        assert!(input.get_and_reset_processed_input().block_actions.is_empty());
    }

    #[test]
    fn cancelled_touch_never_taps() {
        let mut input = manager();
        let start = Instant::now();

        input.intake_touch(4, TouchPhase::Started, Vector2::new(0.1, 0.1), start);
        input.intake_touch(4, TouchPhase::Cancelled, Vector2::new(0.1, 0.1), start);
        input.intake_touch(4, TouchPhase::Ended, Vector2::new(0.1, 0.1), start);

        assert!(input.move_touch.is_none());
        assert!(input.get_and_reset_processed_input().block_actions.is_empty());
    }

    #[test]
    fn drags_report_offset_from_start() {
        let mut input = manager();
        let start = Instant::now();

        input.intake_touch(1, TouchPhase::Started, Vector2::new(0.2, 0.6), start);
        input.intake_touch(9, TouchPhase::Started, Vector2::new(0.8, 0.6), start);
        input.intake_touch(1, TouchPhase::Moved, Vector2::new(0.25, 0.5), start);

        let processed = input.get_and_reset_processed_input();
        let move_drag = processed.move_touch_drag.unwrap();
        assert!((move_drag.x - 0.05).abs() < 1e-6);
        assert!((move_drag.y + 0.1).abs() < 1e-6);
        assert_eq!(processed.look_touch_drag, Some(Vector2::new(0.0, 0.0)));

        // Drags persist across frames while the finger stays down.
        assert!(input.get_and_reset_processed_input().move_touch_drag.is_some());
    }

    #[test]
    fn second_finger_on_an_occupied_half_is_ignored() {
        let mut input = manager();
        let start = Instant::now();

        input.intake_touch(1, TouchPhase::Started, Vector2::new(0.2, 0.6), start);
        input.intake_touch(2, TouchPhase::Started, Vector2::new(0.3, 0.6), start);
        input.intake_touch(2, TouchPhase::Ended, Vector2::new(0.3, 0.6), start);

        assert_eq!(input.move_touch.map(|t| t.finger_id), Some(1));
        assert!(input.get_and_reset_processed_input().block_actions.is_empty());
    }

    #[test]
    fn held_key_moves_from_pressed_to_held_to_released() {
        let mut input = manager();

        input.keyboard_inputs_new.insert(KeyCode::KeyW, true);
        assert_eq!(
            input.get_and_reset_processed_input().get_key_state(KeyCode::KeyW),
            RawInputState::Pressed
        );
        assert_eq!(
            input.get_and_reset_processed_input().get_key_state(KeyCode::KeyW),
            RawInputState::Held
        );

        input.release_all();
        assert_eq!(
            input.get_and_reset_processed_input().get_key_state(KeyCode::KeyW),
            RawInputState::NotPressed
        );

        input.keyboard_inputs_new.insert(KeyCode::KeyW, true);
        input.get_and_reset_processed_input();
        input.keyboard_inputs_new.insert(KeyCode::KeyW, false);
        assert_eq!(
            input.get_and_reset_processed_input().get_key_state(KeyCode::KeyW),
            RawInputState::Released
        );
    }

    #[test]
    fn mouse_clicks_and_motion_are_collected_per_frame() {
        let mut input = manager();

        input.intake_mouse_click(MouseButton::Left);
        input.intake_mouse_click(MouseButton::Right);
        input.intake_mouse_click(MouseButton::Middle);
        input.intake_mouse_motion((2.0, 1.0));
        input.intake_mouse_motion((3.0, -4.0));

        let processed = input.get_and_reset_processed_input();
        assert_eq!(
            processed.block_actions,
            vec![BlockAction::PlaceSelected, BlockAction::Remove]
        );
        assert_eq!(processed.mouse_delta, Some((5.0, -3.0)));

        let next = input.get_and_reset_processed_input();
        assert!(next.block_actions.is_empty());
        assert_eq!(next.mouse_delta, None);
    }
}
