// =============================================================================
// Slot storage
// =============================================================================
//
// A single owned buffer of `(ticket, value)` slots plus the occupancy bitmap.
// `slots.len()` is the logical capacity. A slot is live iff its bit is set iff
// it holds `Some`; every live slot sits below `next_free`.
//
// Appends always land at `next_free`, so slot order is insertion order. Growth
// and compaction repack live slots into `0..count` without reordering them.

use tracing::trace;

use crate::bitmap::OccupancyBitmap;

#[derive(Clone)]
pub(crate) struct SlotStorage<T, V> {
    slots: Vec<Option<(T, V)>>,
    occupied: OccupancyBitmap,
    count: usize,
    /// First slot that has never been handed out since the last repack.
    next_free: usize,
}

impl<T, V> SlotStorage<T, V> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self {
            slots,
            occupied: OccupancyBitmap::new(capacity),
            count: 0,
            next_free: 0,
        }
    }

    /// Densely packed storage holding `elements` in order, with room for at
    /// least `min_capacity` slots.
    pub(crate) fn from_dense(elements: Vec<(T, V)>, min_capacity: usize) -> Self {
        let count = elements.len();
        let capacity = count.max(min_capacity);
        let mut slots = Vec::with_capacity(capacity);
        slots.extend(elements.into_iter().map(Some));
        slots.resize_with(capacity, || None);
        Self {
            slots,
            occupied: OccupancyBitmap::filled(count, capacity),
            count,
            next_free: count,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub(crate) fn next_free(&self) -> usize {
        self.next_free
    }

    #[inline]
    pub(crate) fn is_live(&self, slot: usize) -> bool {
        self.occupied.contains(slot)
    }

    /// First live slot at or after `from`.
    #[inline]
    pub(crate) fn next_live(&self, from: usize) -> Option<usize> {
        self.occupied.next_set(from, self.next_free)
    }

    /// First live slot in `from..end`.
    #[inline]
    pub(crate) fn next_live_in(&self, from: usize, end: usize) -> Option<usize> {
        self.occupied.next_set(from, end.min(self.next_free))
    }

    pub(crate) fn last_live(&self) -> Option<usize> {
        self.slots[..self.next_free].iter().rposition(Option::is_some)
    }

    #[inline]
    pub(crate) fn entry(&self, slot: usize) -> Option<&(T, V)> {
        self.slots.get(slot)?.as_ref()
    }

    #[inline]
    pub(crate) fn ticket_at(&self, slot: usize) -> Option<&T> {
        self.entry(slot).map(|(ticket, _)| ticket)
    }

    #[inline]
    pub(crate) fn value_at(&self, slot: usize) -> Option<&V> {
        self.entry(slot).map(|(_, value)| value)
    }

    #[inline]
    pub(crate) fn value_at_mut(&mut self, slot: usize) -> Option<&mut V> {
        self.slots.get_mut(slot)?.as_mut().map(|(_, value)| value)
    }

    /// Overwrite the value of a live slot, returning the previous one.
    /// `value` is dropped and `None` returned when the slot is not live.
    pub(crate) fn set(&mut self, value: V, slot: usize) -> Option<V> {
        self.value_at_mut(slot)
            .map(|current| std::mem::replace(current, value))
    }

    /// The used prefix of the buffer; free slots are `None`.
    pub(crate) fn used_slots_mut(&mut self) -> &mut [Option<(T, V)>] {
        &mut self.slots[..self.next_free]
    }

    pub(crate) fn into_slots(mut self) -> std::vec::IntoIter<Option<(T, V)>> {
        self.slots.truncate(self.next_free);
        self.slots.into_iter()
    }

    /// Store a new element at the append boundary and return its slot.
    pub(crate) fn append(&mut self, ticket: T, value: V) -> usize {
        if self.next_free >= self.capacity() {
            self.grow();
        }
        let slot = self.next_free;
        self.slots[slot] = Some((ticket, value));
        self.occupied.insert(slot);
        self.next_free += 1;
        self.count += 1;
        slot
    }

    fn grow(&mut self) {
        let old_capacity = self.capacity();
        let new_capacity = old_capacity.saturating_mul(2).max(1);
        let dense = self.count == self.next_free;
        if dense {
            // Live slots already fill `0..count`: keep them where they are.
            self.slots.reserve_exact(new_capacity - old_capacity);
            self.slots.resize_with(new_capacity, || None);
            self.occupied.resize(new_capacity);
        } else {
            self.repack(new_capacity);
        }
        trace!(
            old_capacity,
            new_capacity,
            count = self.count,
            dense,
            "grew slot storage"
        );
    }

    /// Remove the element in `slot`, compacting afterwards if the live ratio
    /// fell below `threshold` and more than `min_count_to_compact` elements
    /// remain. Returns `None` if the slot is not live.
    pub(crate) fn remove(
        &mut self,
        slot: usize,
        threshold: f64,
        min_count_to_compact: usize,
    ) -> Option<(T, V)> {
        if !self.is_live(slot) {
            return None;
        }
        let element = self.slots[slot].take()?;
        self.occupied.remove(slot);
        self.count -= 1;
        if slot + 1 == self.next_free {
            self.next_free -= 1;
        }

        let capacity = self.capacity();
        if (self.count as f64) < threshold * capacity as f64 && self.count > min_count_to_compact {
            self.compact();
        }
        Some(element)
    }

    /// Shrink the buffer to exactly `count` slots, all live.
    pub(crate) fn compact(&mut self) {
        let old_capacity = self.capacity();
        self.repack(self.count);
        trace!(
            old_capacity,
            new_capacity = self.count,
            "compacted slot storage"
        );
    }

    fn repack(&mut self, new_capacity: usize) {
        debug_assert!(new_capacity >= self.count);
        let old = std::mem::take(&mut self.slots);
        let mut slots = Vec::with_capacity(new_capacity);
        slots.extend(old.into_iter().take(self.next_free).flatten().map(Some));
        debug_assert_eq!(slots.len(), self.count);
        slots.resize_with(new_capacity, || None);

        self.slots = slots;
        self.occupied = OccupancyBitmap::filled(self.count, new_capacity);
        self.next_free = self.count;
    }

    /// Panics if the buffer, bitmap and counters disagree.
    #[cfg(test)]
    pub(crate) fn validate(&self) {
        assert!(self.count <= self.capacity(), "count exceeds capacity");
        assert!(self.next_free <= self.capacity(), "next_free past capacity");
        assert_eq!(self.occupied.len(), self.capacity(), "bitmap length");
        assert_eq!(self.occupied.count_ones(), self.count, "bitmap popcount");
        for (slot, entry) in self.slots.iter().enumerate() {
            assert_eq!(
                entry.is_some(),
                self.occupied.contains(slot),
                "slot {slot} disagrees with its occupancy bit"
            );
            if slot >= self.next_free {
                assert!(entry.is_none(), "live slot {slot} past next_free");
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn is_dense(&self) -> bool {
        self.count == self.next_free
    }
}
