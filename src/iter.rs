// =============================================================================
// Iteration
// =============================================================================

use std::iter::FusedIterator;

use crate::storage::SlotStorage;
use crate::TicketMap;

/// Borrowing iterator over `(ticket, value)` pairs in ascending ticket order.
///
/// Created by [`TicketMap::iter`].
pub struct Iter<'a, T, V> {
    storage: &'a SlotStorage<T, V>,
    slot: usize,
    remaining: usize,
}

impl<'a, T, V> Iter<'a, T, V> {
    pub(crate) fn new(storage: &'a SlotStorage<T, V>) -> Self {
        Self {
            storage,
            slot: 0,
            remaining: storage.len(),
        }
    }
}

impl<T, V> Clone for Iter<'_, T, V> {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage,
            slot: self.slot,
            remaining: self.remaining,
        }
    }
}

impl<'a, T, V> Iterator for Iter<'a, T, V> {
    type Item = (&'a T, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.storage.next_live(self.slot)?;
        self.slot = slot + 1;
        self.remaining -= 1;
        self.storage.entry(slot).map(|(t, v)| (t, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T, V> ExactSizeIterator for Iter<'_, T, V> {}
impl<T, V> FusedIterator for Iter<'_, T, V> {}

/// Iterator over `(ticket, value)` pairs with mutable access to the values.
///
/// Created by [`TicketMap::iter_mut`].
pub struct IterMut<'a, T, V> {
    slots: std::slice::IterMut<'a, Option<(T, V)>>,
    remaining: usize,
}

impl<'a, T, V> IterMut<'a, T, V> {
    pub(crate) fn new(storage: &'a mut SlotStorage<T, V>) -> Self {
        let remaining = storage.len();
        Self {
            slots: storage.used_slots_mut().iter_mut(),
            remaining,
        }
    }
}

impl<'a, T, V> Iterator for IterMut<'a, T, V> {
    type Item = (&'a T, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        for slot in self.slots.by_ref() {
            if let Some((t, v)) = slot {
                self.remaining -= 1;
                return Some((&*t, v));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T, V> ExactSizeIterator for IterMut<'_, T, V> {}
impl<T, V> FusedIterator for IterMut<'_, T, V> {}

/// Owning iterator over `(ticket, value)` pairs in ascending ticket order.
pub struct IntoIter<T, V> {
    slots: std::vec::IntoIter<Option<(T, V)>>,
    remaining: usize,
}

impl<T, V> IntoIter<T, V> {
    pub(crate) fn new(storage: SlotStorage<T, V>) -> Self {
        let remaining = storage.len();
        Self {
            slots: storage.into_slots(),
            remaining,
        }
    }
}

impl<T, V> Iterator for IntoIter<T, V> {
    type Item = (T, V);

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.slots.by_ref().flatten().next()?;
        self.remaining -= 1;
        Some(element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T, V> ExactSizeIterator for IntoIter<T, V> {}
impl<T, V> FusedIterator for IntoIter<T, V> {}

/// A detached, ticket-keyed position in a [`TicketMap`].
///
/// Unlike [`Iter`], a cursor does not borrow the map between steps, so the map
/// may be mutated while a traversal is in progress. The cursor remembers the
/// last ticket it yielded and, on every step, looks that ticket up again
/// before moving on. Growth and compaction move elements to different slots,
/// but never change their tickets, so the traversal stays in step:
///
/// ```rust
/// use ticket_map::TicketMap;
///
/// let mut map = TicketMap::new();
/// for c in ['a', 'b', 'c', 'd'] {
///     map.insert(c);
/// }
///
/// let mut cursor = map.cursor();
/// assert_eq!(cursor.next(&map), Some((&0, &'a')));
/// map.remove(&2);
/// map.insert('e');
/// assert_eq!(cursor.next(&map), Some((&1, &'b')));
/// assert_eq!(cursor.next(&map), Some((&3, &'d')));
/// assert_eq!(cursor.next(&map), Some((&4, &'e')));
/// assert_eq!(cursor.next(&map), None);
/// ```
///
/// If the element the cursor last yielded is removed, the next step resumes
/// at the smallest ticket greater than it. A cursor that has returned `None`
/// picks up elements inserted afterwards on the following call.
///
/// On a map whose generator has stopped increasing (see
/// [`TicketMap::is_ordered`]) there is no "greater ticket" to resume from, so
/// the cursor resumes at the slot its removed element occupied. If that
/// removal also compacted the map, elements that moved below the old slot are
/// skipped. Nothing is yielded twice either way.
#[derive(Clone, Debug)]
pub struct Cursor<T> {
    last: Option<(T, usize)>,
}

impl<T> Default for Cursor<T> {
    fn default() -> Self {
        Self { last: None }
    }
}

impl<T: Ord + Clone> Cursor<T> {
    /// A cursor positioned before the first element.
    pub fn new() -> Self {
        Self::default()
    }

    /// The ticket most recently yielded, if any.
    pub fn last_ticket(&self) -> Option<&T> {
        self.last.as_ref().map(|(ticket, _)| ticket)
    }

    /// Advance to the next element of `map`.
    pub fn next<'a, V, G>(&mut self, map: &'a TicketMap<T, V, G>) -> Option<(&'a T, &'a V)> {
        let slot = map.resume_slot(self.last.as_ref())?;
        let (ticket, value) = map.storage.entry(slot)?;
        self.last = Some((ticket.clone(), slot));
        Some((ticket, value))
    }
}
