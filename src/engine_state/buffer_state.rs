//! # Buffer State Module
//!
//! This module provides a centralized system for managing GPU buffers.
//! It handles buffer creation, bounds-checked writing, growth, and analytics.
//!
//! ## Architecture
//!
//! The `BufferState` struct serves as a registry for all GPU buffers used by the renderer.
//! Buffers are referenced by name (static string). Growable buffers are recreated through
//! [`BufferState::ensure_capacity`]; the previous buffer is released when its handle is
//! dropped from the registry.

use std::collections::HashMap;

use log::debug;
use wgpu::{util::DeviceExt, Buffer, Device, Queue};

/// Errors raised by buffer registry operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BufferError {
    /// No buffer with this name was created.
    #[error("buffer '{0}' does not exist")]
    Missing(&'static str),
    /// A write would run past the end of the buffer.
    #[error("write of {size} bytes at offset {offset} overflows buffer '{name}' of {capacity} bytes")]
    OutOfBounds {
        /// Name of the buffer
        name: &'static str,
        /// Requested write offset
        offset: u64,
        /// Requested write size
        size: u64,
        /// Allocated size of the buffer
        capacity: u64,
    },
}

/// Analytics data for a GPU buffer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BufferAnalytics {
    /// Total memory allocated for the buffer in bytes
    pub allocated_memory: u64,
    /// Highest byte written so far
    pub used_memory: u64,
}

/// Per-buffer sizes, kept apart from the GPU handles so writes can be checked up front.
#[derive(Debug, Default)]
pub struct BufferLedger {
    buffers: HashMap<&'static str, BufferAnalytics>,
}

impl BufferLedger {
    /// Records a fresh allocation, resetting the used size to `used`.
    pub fn record_allocation(&mut self, buffer_name: &'static str, allocated: u64, used: u64) {
        self.buffers.insert(
            buffer_name,
            BufferAnalytics {
                allocated_memory: allocated,
                used_memory: used,
            },
        );
    }

    /// Allocated size of a buffer, if it exists.
    pub fn allocated(&self, buffer_name: &'static str) -> Option<u64> {
        self.buffers
            .get(buffer_name)
            .map(|analytics| analytics.allocated_memory)
    }

    /// Checks a write against the buffer's size and records it.
    ///
    /// # Errors
    /// [`BufferError::Missing`] for an unknown name and [`BufferError::OutOfBounds`] if the
    /// write would exceed the buffer
    pub fn record_write(
        &mut self,
        buffer_name: &'static str,
        offset: u64,
        size: u64,
    ) -> Result<(), BufferError> {
        let analytics = self
            .buffers
            .get_mut(buffer_name)
            .ok_or(BufferError::Missing(buffer_name))?;

        let end = offset
            .checked_add(size)
            .filter(|end| *end <= analytics.allocated_memory)
            .ok_or(BufferError::OutOfBounds {
                name: buffer_name,
                offset,
                size,
                capacity: analytics.allocated_memory,
            })?;

        analytics.used_memory = analytics.used_memory.max(end);
        Ok(())
    }

    /// Gets the total allocated memory across all buffers, in bytes.
    pub fn total_allocated_memory(&self) -> u64 {
        self.buffers
            .values()
            .map(|analytics| analytics.allocated_memory)
            .sum()
    }

    /// Gets the total used memory across all buffers, in bytes.
    pub fn total_used_memory(&self) -> u64 {
        self.buffers
            .values()
            .map(|analytics| analytics.used_memory)
            .sum()
    }
}

/// Central manager for GPU buffers
///
/// # Examples
///
/// ```rust,ignore
/// let mut buffer_state = BufferState::new(device, queue);
///
/// buffer_state.create_buffer_init(
///     "camera_buffer",
///     wgpu::util::BufferInitDescriptor {
///         label: Some("camera_buffer"),
///         contents: bytemuck::cast_slice(&[camera_uniform]),
///         usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
///     },
/// );
///
/// buffer_state.write_buffer("camera_buffer", 0, bytemuck::cast_slice(&[camera_uniform]))?;
/// ```
pub struct BufferState {
    /// The GPU device buffers are created on
    pub device: Device,
    /// The GPU command queue used for writes
    pub queue: Queue,
    /// Map of buffer names to buffer objects
    buffers: HashMap<&'static str, Buffer>,
    /// Sizes of each buffer
    ledger: BufferLedger,
}

impl BufferState {
    /// Creates a new buffer state manager with no buffers.
    pub fn new(device: Device, queue: Queue) -> Self {
        Self {
            device,
            queue,
            buffers: HashMap::new(),
            ledger: BufferLedger::default(),
        }
    }

    /// Creates an empty buffer, replacing any buffer with the same name.
    pub fn create_buffer(
        &mut self,
        buffer_name: &'static str,
        buffer_descriptor: wgpu::BufferDescriptor,
    ) {
        let buffer = self.device.create_buffer(&buffer_descriptor);

        self.buffers.insert(buffer_name, buffer);
        self.ledger
            .record_allocation(buffer_name, buffer_descriptor.size, 0);
    }

    /// Creates a buffer and initializes it with data.
    pub fn create_buffer_init(
        &mut self,
        buffer_name: &'static str,
        init_descriptor: wgpu::util::BufferInitDescriptor,
    ) {
        let size = init_descriptor.contents.len() as u64;
        let buffer = self.device.create_buffer_init(&init_descriptor);

        self.buffers.insert(buffer_name, buffer);
        self.ledger.record_allocation(buffer_name, size, size);
    }

    /// Makes sure a buffer of at least `size` bytes exists under `buffer_name`.
    ///
    /// A missing or smaller buffer is replaced by a new, empty one; its previous contents
    /// are not carried over.
    ///
    /// # Returns
    /// `true` if a new buffer was created
    pub fn ensure_capacity(
        &mut self,
        buffer_name: &'static str,
        size: u64,
        usage: wgpu::BufferUsages,
    ) -> bool {
        let allocated = self.ledger.allocated(buffer_name);

        if allocated.is_some_and(|allocated| allocated >= size) {
            return false;
        }

        self.create_buffer(
            buffer_name,
            wgpu::BufferDescriptor {
                label: Some(buffer_name),
                size,
                usage,
                mapped_at_creation: false,
            },
        );
        debug!(
            "Allocated buffer '{}' with {} bytes (previously {:?}); {} bytes allocated, {} used",
            buffer_name,
            size,
            allocated,
            self.ledger.total_allocated_memory(),
            self.ledger.total_used_memory()
        );
        true
    }

    /// Writes raw byte data to a buffer.
    ///
    /// # Errors
    /// [`BufferError::Missing`] for an unknown name and [`BufferError::OutOfBounds`] if the
    /// write would exceed the buffer
    pub fn write_buffer(
        &mut self,
        buffer_name: &'static str,
        offset: wgpu::BufferAddress,
        data: &[u8],
    ) -> Result<(), BufferError> {
        let buffer = self
            .buffers
            .get(buffer_name)
            .ok_or(BufferError::Missing(buffer_name))?;
        self.ledger
            .record_write(buffer_name, offset, data.len() as u64)?;

        if !data.is_empty() {
            self.queue.write_buffer(buffer, offset, data);
        }
        Ok(())
    }

    /// Gets a reference to a buffer by name.
    pub fn get_buffer(&self, buffer_name: &'static str) -> Result<&Buffer, BufferError> {
        self.buffers
            .get(buffer_name)
            .ok_or(BufferError::Missing(buffer_name))
    }

    /// Gets a binding resource for the entire buffer.
    pub fn get_entire_binding(
        &self,
        buffer_name: &'static str,
    ) -> Result<wgpu::BindingResource<'_>, BufferError> {
        Ok(self.get_buffer(buffer_name)?.as_entire_binding())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_to_unknown_buffers_are_missing() {
        let mut ledger = BufferLedger::default();
        assert_eq!(
            ledger.record_write("ui_quads", 0, 4),
            Err(BufferError::Missing("ui_quads"))
        );
    }

    #[test]
    fn writes_past_the_end_are_rejected() {
        let mut ledger = BufferLedger::default();
        ledger.record_allocation("instances", 64, 0);

        assert_eq!(ledger.record_write("instances", 48, 16), Ok(()));
        assert_eq!(
            ledger.record_write("instances", 56, 16),
            Err(BufferError::OutOfBounds {
                name: "instances",
                offset: 56,
                size: 16,
                capacity: 64,
            })
        );
        assert!(matches!(
            ledger.record_write("instances", u64::MAX, 1),
            Err(BufferError::OutOfBounds { .. })
        ));
        assert_eq!(ledger.total_used_memory(), 64);
    }

    #[test]
    fn totals_follow_reallocation() {
        let mut ledger = BufferLedger::default();
        ledger.record_allocation("camera", 64, 64);
        ledger.record_allocation("instances", 128, 0);
        ledger.record_write("instances", 0, 32).unwrap();

        assert_eq!(ledger.total_allocated_memory(), 192);
        assert_eq!(ledger.total_used_memory(), 96);

        ledger.record_allocation("instances", 256, 0);
        assert_eq!(ledger.allocated("instances"), Some(256));
        assert_eq!(ledger.total_used_memory(), 64);
    }
}
