//! # Dense Pool
//!
//! A densely packed arena with stable external ids.
//!
//! Live values always occupy the slots `[0, len)` of a single contiguous array, so the
//! array can be handed to the GPU as-is (one instance per slot). External ids stay valid
//! while values move around: removal swaps the last value into the freed slot and patches
//! the indirection table that maps ids to slots.
//!
//! Ids are handed out monotonically and are never reused, so a stale id can always be
//! told apart from a live one.

use std::fmt;

/// Stable handle to a value stored in a [`DensePool`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoolId(u32);

impl PoolId {
    /// Raw numeric value of the id.
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Errors reported by [`DensePool`] operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DensePoolError {
    /// The pool already holds `capacity` values.
    #[error("pool capacity of {capacity} values exceeded")]
    CapacityExceeded {
        /// Fixed capacity of the pool
        capacity: usize,
    },
    /// The id was never issued by this pool or has already been removed.
    #[error("pool id {0} is not live")]
    StaleId(PoolId),
}

/// Dense arena with swap-remove compaction and an id → slot indirection table.
///
/// # Example
///
/// ```rust,ignore
/// let mut pool = DensePool::with_capacity_limit(2);
/// let a = pool.append('a')?;
/// let b = pool.append('b')?;
/// pool.remove(a)?;
/// assert_eq!(pool.as_slice(), &['b']);
/// assert_eq!(*pool.get(b)?, 'b');
/// ```
#[derive(Debug, Clone)]
pub struct DensePool<T> {
    /// Live values, slot order
    values: Vec<T>,
    /// External id of the value in each slot
    slot_ids: Vec<PoolId>,
    /// Current slot of each issued id, `None` once removed
    id_slots: Vec<Option<u32>>,
    /// Maximum number of live values, `None` for unbounded
    capacity: Option<usize>,
}

impl<T> Default for DensePool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> DensePool<T> {
    /// Creates an unbounded pool.
    pub fn new() -> Self {
        Self {
            values: Vec::new(),
            slot_ids: Vec::new(),
            id_slots: Vec::new(),
            capacity: None,
        }
    }

    /// Creates a pool that refuses to hold more than `capacity` live values.
    pub fn with_capacity_limit(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::new()
        }
    }

    /// Maximum number of live values, if bounded.
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Number of live values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Appends a value to the end of the dense array.
    ///
    /// # Returns
    /// The id of the new value, valid until that id is removed
    ///
    /// # Errors
    /// [`DensePoolError::CapacityExceeded`] when the pool is full
    pub fn append(&mut self, value: T) -> Result<PoolId, DensePoolError> {
        if let Some(capacity) = self.capacity {
            if self.values.len() >= capacity {
                return Err(DensePoolError::CapacityExceeded { capacity });
            }
        }

        let id = PoolId(self.id_slots.len() as u32);
        let slot = self.values.len() as u32;

        self.values.push(value);
        self.slot_ids.push(id);
        self.id_slots.push(Some(slot));

        Ok(id)
    }

    /// Removes a value, moving the last value into its slot.
    ///
    /// Other live ids stay valid; only the moved value's slot changes.
    ///
    /// # Errors
    /// [`DensePoolError::StaleId`] if `id` is not live
    pub fn remove(&mut self, id: PoolId) -> Result<T, DensePoolError> {
        let slot = self.slot_of(id)? as usize;

        self.id_slots[id.0 as usize] = None;
        let value = self.values.swap_remove(slot);
        self.slot_ids.swap_remove(slot);

        if let Some(&moved_id) = self.slot_ids.get(slot) {
            self.id_slots[moved_id.0 as usize] = Some(slot as u32);
        }

        Ok(value)
    }

    /// Looks up a live value.
    ///
    /// # Errors
    /// [`DensePoolError::StaleId`] if `id` is not live
    pub fn get(&self, id: PoolId) -> Result<&T, DensePoolError> {
        let slot = self.slot_of(id)?;
        Ok(&self.values[slot as usize])
    }

    /// Mutable variant of [`DensePool::get`].
    pub fn get_mut(&mut self, id: PoolId) -> Result<&mut T, DensePoolError> {
        let slot = self.slot_of(id)?;
        Ok(&mut self.values[slot as usize])
    }

    /// Whether `id` currently refers to a live value.
    #[cfg(test)]
    pub fn contains(&self, id: PoolId) -> bool {
        self.slot_of(id).is_ok()
    }

    /// Live values in slot order.
    pub fn as_slice(&self) -> &[T] {
        &self.values
    }

    /// Iterates `(id, value)` pairs in slot order.
    ///
    /// The order is stable between mutations and matches [`DensePool::as_slice`].
    pub fn iter(&self) -> impl Iterator<Item = (PoolId, &T)> + '_ {
        self.slot_ids.iter().copied().zip(self.values.iter())
    }

    fn slot_of(&self, id: PoolId) -> Result<u32, DensePoolError> {
        self.id_slots
            .get(id.0 as usize)
            .copied()
            .flatten()
            .ok_or(DensePoolError::StaleId(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_then_get() {
        let mut pool = DensePool::new();

        let a = pool.append(10).unwrap();
        let b = pool.append(20).unwrap();

        assert_eq!(*pool.get(a).unwrap(), 10);
        assert_eq!(*pool.get(b).unwrap(), 20);
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn remove_moves_last_value_into_hole() {
        let mut pool = DensePool::new();

        let a = pool.append('a').unwrap();
        let b = pool.append('b').unwrap();
        let c = pool.append('c').unwrap();

        assert_eq!(pool.remove(a).unwrap(), 'a');
        assert_eq!(pool.as_slice(), &['c', 'b']);
        assert_eq!(*pool.get(b).unwrap(), 'b');
        assert_eq!(*pool.get(c).unwrap(), 'c');
    }

    #[test]
    fn removing_last_slot_leaves_others_untouched() {
        let mut pool = DensePool::new();

        let a = pool.append(1).unwrap();
        let b = pool.append(2).unwrap();

        pool.remove(b).unwrap();
        assert_eq!(pool.as_slice(), &[1]);
        assert_eq!(*pool.get(a).unwrap(), 1);
    }

    #[test]
    fn stale_ids_are_reported() {
        let mut pool = DensePool::new();

        let a = pool.append(1).unwrap();
        pool.remove(a).unwrap();

        assert_eq!(pool.get(a), Err(DensePoolError::StaleId(a)));
        assert_eq!(pool.remove(a), Err(DensePoolError::StaleId(a)));
        assert!(!pool.contains(a));
    }

    #[test]
    fn ids_are_never_reused() {
        let mut pool = DensePool::new();

        let a = pool.append(1).unwrap();
        pool.remove(a).unwrap();
        let b = pool.append(2).unwrap();

        assert_ne!(a, b);
        assert!(pool.get(a).is_err());
        assert_eq!(*pool.get(b).unwrap(), 2);
    }

    #[test]
    fn full_pool_rejects_append() {
        let mut pool = DensePool::with_capacity_limit(2);

        pool.append(1u8).unwrap();
        let b = pool.append(2u8).unwrap();

        assert_eq!(
            pool.append(3),
            Err(DensePoolError::CapacityExceeded { capacity: 2 })
        );

        pool.remove(b).unwrap();
        assert!(pool.append(3).is_ok());
    }

    #[test]
    fn live_ids_survive_arbitrary_removals() {
        let mut pool = DensePool::new();
        let mut live = Vec::new();

        for value in 0..64u32 {
            live.push((pool.append(value).unwrap(), value));
        }

        // Drop every third entry, in a scrambled order.
        let mut removed = Vec::new();
        for index in (0..live.len()).rev().step_by(3) {
            removed.push(live.remove(index));
        }
        for (id, value) in &removed {
            assert_eq!(pool.remove(*id).unwrap(), *value);
        }

        assert_eq!(pool.len(), live.len());
        for (id, value) in &live {
            assert_eq!(*pool.get(*id).unwrap(), *value);
        }
        for (id, _) in &removed {
            assert!(!pool.contains(*id));
        }

        let iterated: Vec<_> = pool.iter().map(|(id, value)| (id, *value)).collect();
        assert_eq!(iterated.len(), live.len());
        for (id, value) in iterated {
            assert_eq!(*pool.get(id).unwrap(), value);
        }
    }
}
