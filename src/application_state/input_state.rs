//! # Input State
//!
//! This module defines the input state types used by the input manager.
//! It provides enums and structs for representing the state of keyboards, mice and touch
//! screens, and the discrete world edits input can request.

use std::collections::HashMap;

use cgmath::Vector2;
use web_time::{Duration, Instant};
use winit::keyboard::KeyCode;

/// Represents the state of a key or button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RawInputState {
    /// Key/button is not pressed
    #[default]
    NotPressed,
    /// Key/button was just pressed this frame
    Pressed,
    /// Key/button has been held down for multiple frames
    Held,
    /// Key/button was just released this frame
    Released,
}

impl RawInputState {
    /// Determines if the input is actively down (either pressed or held)
    pub fn is_active(&self) -> bool {
        matches!(self, RawInputState::Pressed | RawInputState::Held)
    }

    /// Updates the input state based on the previous and current raw states
    pub fn from_raw_states(previous: bool, current: bool) -> Self {
        match (previous, current) {
            (false, true) => RawInputState::Pressed,
            (true, true) => RawInputState::Held,
            (true, false) => RawInputState::Released,
            (false, false) => RawInputState::NotPressed,
        }
    }
}

/// A world edit requested by a click or a tap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockAction {
    /// Place the currently selected block type against the picked face
    PlaceSelected,
    /// Remove the picked block
    Remove,
}

/// Which half of the screen a touch started on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchRole {
    /// Left half: drags move the camera, taps remove blocks
    Move,
    /// Right half: drags turn the camera, taps place blocks
    Look,
}

impl TouchRole {
    /// Role of a touch starting at a normalised screen position.
    pub fn for_position(position: Vector2<f32>) -> Self {
        if position.x < 0.5 {
            TouchRole::Move
        } else {
            TouchRole::Look
        }
    }

    /// Edit triggered by a tap with this role.
    pub fn tap_action(self) -> BlockAction {
        match self {
            TouchRole::Move => BlockAction::Remove,
            TouchRole::Look => BlockAction::PlaceSelected,
        }
    }
}

/// One finger being followed across touch events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchTracker {
    /// Platform id of the finger
    pub finger_id: u64,
    /// Normalised position the finger first touched
    pub initial_position: Vector2<f32>,
    /// Latest normalised position of the finger
    pub current_position: Vector2<f32>,
    /// When the finger touched down
    pub started_at: Instant,
}

impl TouchTracker {
    /// Starts tracking a finger.
    pub fn new(finger_id: u64, position: Vector2<f32>, started_at: Instant) -> Self {
        Self {
            finger_id,
            initial_position: position,
            current_position: position,
            started_at,
        }
    }

    /// Offset of the finger from where it first touched.
    pub fn drag(&self) -> Vector2<f32> {
        self.current_position - self.initial_position
    }

    /// Whether lifting the finger at `now` counts as a tap.
    pub fn is_tap(&self, now: Instant, tap_threshold: Duration) -> bool {
        now.saturating_duration_since(self.started_at) < tap_threshold
    }
}

/// A snapshot of the processed input states with state transitions.
#[derive(Debug, Default)]
pub struct ProcessedInputState {
    /// Current state of all tracked keyboard keys
    pub keyboard_states: HashMap<KeyCode, RawInputState>,

    /// Mouse movement delta accumulated since the last frame (x, y)
    pub mouse_delta: Option<(f64, f64)>,

    /// Drag of the active move touch
    pub move_touch_drag: Option<Vector2<f32>>,

    /// Drag of the active look touch
    pub look_touch_drag: Option<Vector2<f32>>,

    /// Number-row slot picked this frame (0 for key `1`, 9 for key `0`)
    pub hotbar_slot: Option<usize>,

    /// World edits requested this frame, in event order
    pub block_actions: Vec<BlockAction>,
}

impl ProcessedInputState {
    /// Gets the state of a keyboard key
    pub fn get_key_state(&self, key: KeyCode) -> RawInputState {
        self.keyboard_states.get(&key).copied().unwrap_or_default()
    }

    /// `1.0` when `positive` is held, `-1.0` when `negative` is, `0.0` for both or neither.
    pub fn key_axis(&self, positive: KeyCode, negative: KeyCode) -> f32 {
        let value = |key| {
            if self.get_key_state(key).is_active() {
                1.0
            } else {
                0.0
            }
        };
        value(positive) - value(negative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_state_transitions() {
        assert_eq!(RawInputState::from_raw_states(false, true), RawInputState::Pressed);
        assert_eq!(RawInputState::from_raw_states(true, true), RawInputState::Held);
        assert_eq!(RawInputState::from_raw_states(true, false), RawInputState::Released);
        assert!(!RawInputState::from_raw_states(false, false).is_active());
    }

    #[test]
    fn screen_halves_assign_roles() {
        assert_eq!(TouchRole::for_position(Vector2::new(0.2, 0.9)), TouchRole::Move);
        assert_eq!(TouchRole::for_position(Vector2::new(0.5, 0.1)), TouchRole::Look);
        assert_eq!(TouchRole::Move.tap_action(), BlockAction::Remove);
        assert_eq!(TouchRole::Look.tap_action(), BlockAction::PlaceSelected);
    }

    #[test]
    fn tap_threshold_is_exclusive() {
        let start = Instant::now();
        let tracker = TouchTracker::new(3, Vector2::new(0.7, 0.5), start);
        let threshold = Duration::from_millis(500);

        assert!(tracker.is_tap(start + Duration::from_millis(499), threshold));
        assert!(!tracker.is_tap(start + Duration::from_millis(500), threshold));
    }

    #[test]
    fn key_axis_cancels_opposing_keys() {
        let mut input = ProcessedInputState::default();
        input.keyboard_states.insert(KeyCode::KeyD, RawInputState::Held);
        assert_eq!(input.key_axis(KeyCode::KeyD, KeyCode::KeyA), 1.0);

        input.keyboard_states.insert(KeyCode::KeyA, RawInputState::Pressed);
        assert_eq!(input.key_axis(KeyCode::KeyD, KeyCode::KeyA), 0.0);
    }
}
