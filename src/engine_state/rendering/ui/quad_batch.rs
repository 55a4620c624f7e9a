//! Growable per-frame batch of UI quads.
//!
//! Quads are staged on the CPU and mirrored into a GPU vertex buffer once per frame. The
//! staging array starts small and grows to the next power of two whenever an append would
//! overflow it, carrying the staged quads forward. The GPU buffer follows the staging
//! capacity: whenever it changes, the old buffer is dropped and a new one allocated.

use std::mem::size_of;

use log::debug;

use crate::engine_state::buffer_state::{BufferError, BufferState};

use super::primitives::UiQuad;

/// Name of the UI quad instance buffer in the buffer state
pub const UI_QUAD_BUFFER: &str = "ui_quad_buffer";

/// Capacity of a fresh batch
pub const INITIAL_QUAD_CAPACITY: usize = 8;

/// CPU staging side of the UI quad buffer.
#[derive(Debug, Clone)]
pub struct QuadBatch {
    staging: Box<[UiQuad]>,
    count: usize,
}

impl Default for QuadBatch {
    fn default() -> Self {
        Self::new()
    }
}

impl QuadBatch {
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_QUAD_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            staging: vec![UiQuad::default(); capacity].into_boxed_slice(),
            count: 0,
        }
    }

    /// Number of quads staged this frame.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of quads the staging array holds before it must grow.
    pub fn capacity(&self) -> usize {
        self.staging.len()
    }

    /// The staged quads, in append order.
    pub fn as_slice(&self) -> &[UiQuad] {
        &self.staging[..self.count]
    }

    /// Drops every staged quad, keeping the allocation.
    pub fn reset(&mut self) {
        self.count = 0;
    }

    /// Appends quads, growing the staging array if needed.
    ///
    /// # Arguments
    /// * `quads` - Quads to copy in after the ones already staged
    pub fn append(&mut self, quads: &[UiQuad]) {
        let required = self.count + quads.len();
        if required > self.capacity() {
            self.grow(required.next_power_of_two());
        }

        self.staging[self.count..required].copy_from_slice(quads);
        self.count = required;
    }

    fn grow(&mut self, new_capacity: usize) {
        debug!(
            "Growing UI quad batch from {} to {} quads",
            self.capacity(),
            new_capacity
        );
        let mut staging = vec![UiQuad::default(); new_capacity].into_boxed_slice();
        staging[..self.count].copy_from_slice(self.as_slice());
        self.staging = staging;
    }

    /// Mirrors the staged quads into the GPU instance buffer.
    ///
    /// The buffer is sized to the staging capacity and recreated whenever that grew.
    pub fn upload(&self, buffer_state: &mut BufferState) -> Result<(), BufferError> {
        let size = (self.capacity() * size_of::<UiQuad>()) as u64;
        buffer_state.ensure_capacity(
            UI_QUAD_BUFFER,
            size,
            wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        );
        buffer_state.write_buffer(UI_QUAD_BUFFER, 0, bytemuck::cast_slice(self.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad(n: u16) -> UiQuad {
        UiQuad {
            rect: [n as i16, 2, 3, 4],
            color: [n as u8, 1, 2, 3],
            border_radius: [n as f32; 4],
            glyph: (n % 128) as u8,
            draw_order: n,
            ..Default::default()
        }
    }

    #[test]
    fn starts_empty_with_small_capacity() {
        let batch = QuadBatch::new();
        assert!(batch.is_empty());
        assert_eq!(batch.capacity(), INITIAL_QUAD_CAPACITY);
    }

    #[test]
    fn growth_rounds_to_power_of_two_and_preserves_bytes() {
        let mut batch = QuadBatch::new();
        let first: Vec<UiQuad> = (0..6).map(quad).collect();
        batch.append(&first);
        let before = bytemuck::cast_slice::<UiQuad, u8>(batch.as_slice()).to_vec();

        let second: Vec<UiQuad> = (6..19).map(quad).collect();
        batch.append(&second);

        assert_eq!(batch.len(), 19);
        assert_eq!(batch.capacity(), 32);
        assert_eq!(
            &bytemuck::cast_slice::<UiQuad, u8>(batch.as_slice())[..before.len()],
            &before[..]
        );
        assert_eq!(batch.as_slice()[18], quad(18));
    }

    #[test]
    fn exact_fit_does_not_grow() {
        let mut batch = QuadBatch::new();
        let quads: Vec<UiQuad> = (0..8).map(quad).collect();
        batch.append(&quads);
        assert_eq!(batch.capacity(), 8);

        batch.append(&[quad(8)]);
        assert_eq!(batch.capacity(), 16);
    }

    #[test]
    fn reset_keeps_capacity() {
        let mut batch = QuadBatch::new();
        let quads: Vec<UiQuad> = (0..20).map(quad).collect();
        batch.append(&quads);
        batch.reset();

        assert!(batch.is_empty());
        assert_eq!(batch.capacity(), 32);
        assert!(batch.as_slice().is_empty());
    }
}
