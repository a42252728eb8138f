//! # Recency Ring
//!
//! Fixed-capacity ring of the most recently resolved locations.
//!
//! This is deliberately a strict FIFO ring, not an LRU: a push always
//! consumes the next slot and reads never reorder anything, so a slot can be
//! overwritten even if it was read one call earlier. Duplicate identifiers
//! are not deduplicated either; pushing the same identifier twice occupies
//! two slots.

use crate::request::ResolvedLocation;
use parking_lot::Mutex;

/// Fixed-size ring with a modulo write cursor.
///
/// Memory is a boxed slot array allocated once; pushes overwrite the slot at
/// the cursor and advance it, giving O(1) bounded-memory behavior.
#[derive(Debug)]
pub struct RingBuffer<T> {
    slots: Box<[Option<T>]>,
    cursor: usize,
}

impl<T> RingBuffer<T> {
    /// Create a ring with `capacity` slots. Capacity must be non-zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "ring capacity must be non-zero");
        Self {
            slots: (0..capacity).map(|_| None).collect(),
            cursor: 0,
        }
    }

    /// Overwrite the slot at the write cursor and advance it.
    pub fn push(&mut self, item: T) {
        self.slots[self.cursor] = Some(item);
        self.cursor = (self.cursor + 1) % self.slots.len();
    }

    /// The `i`-th most recently pushed entry (0 = newest), or `None` if that
    /// slot was never written.
    pub fn get(&self, i: usize) -> Option<&T> {
        let capacity = self.slots.len();
        if i >= capacity {
            return None;
        }
        let slot = (self.cursor + capacity - 1 - i) % capacity;
        self.slots[slot].as_ref()
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

/// Thread-safe recency cache over resolved locations.
///
/// All mutation happens under one lightweight mutex so a push is atomic: an
/// abandoned resolution can never leave the cursor and a slot out of step.
pub struct RecencyCache {
    ring: Mutex<RingBuffer<ResolvedLocation>>,
}

impl RecencyCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            ring: Mutex::new(RingBuffer::new(capacity)),
        }
    }

    /// Record a freshly resolved location, evicting the oldest slot.
    pub fn push(&self, location: ResolvedLocation) {
        self.ring.lock().push(location);
    }

    /// The `i`-th most recent entry, newest first.
    pub fn get(&self, i: usize) -> Option<ResolvedLocation> {
        self.ring.lock().get(i).cloned()
    }

    /// Scan slots newest-first for a matching identifier.
    pub fn find(&self, identifier: &str) -> Option<ResolvedLocation> {
        let ring = self.ring.lock();
        (0..ring.capacity())
            .filter_map(|i| ring.get(i))
            .find(|location| location.identifier == identifier)
            .cloned()
    }

    pub fn capacity(&self) -> usize {
        self.ring.lock().capacity()
    }
}
