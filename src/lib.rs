//! # ticket-map
//!
//! An ordered map whose keys ("tickets") are generated by the map itself.
//!
//! Values go in, tickets come out. Each [`TicketMap::insert`] hands back the
//! ticket the map assigned, produced by a caller-supplied
//! [`TicketGenerator`] from the previous one. Elements live in a single
//! growable slot array with an occupancy bitmap: inserts append, removals
//! leave holes that are reclaimed by compaction once fewer than half the slots
//! are live, and lookups either scan (small maps) or binary search the sparse
//! slots by ticket.
//!
//! ## Example
//!
//! ```rust
//! use ticket_map::TicketMap;
//!
//! let mut map: TicketMap<u64, f64> = TicketMap::new();
//! let e = map.insert(2.71);
//! let pi = map.insert(3.14);
//! let tau = map.insert(6.28);
//! assert_eq!((e, pi, tau), (0, 1, 2));
//!
//! assert_eq!(map.remove(&pi), Some(3.14));
//! assert!(map.contains_key(&e));
//! assert!(!map.contains_key(&pi));
//! assert_eq!(map.len(), 2);
//! ```
//!
//! ## Tickets must increase
//!
//! Binary search relies on slot order matching ticket order, which holds as
//! long as the generator is strictly increasing. A map notices the first time
//! its generator fails to increase and from then on searches linearly and
//! iterates in insertion order. See [`TicketMap::is_ordered`].

#![deny(unsafe_code)]

use std::fmt;
use std::hash::{Hash, Hasher};

use tracing::{debug, warn};

mod bitmap;
mod config;
mod error;
mod iter;
mod search;
#[cfg(feature = "serde")]
mod serde_impl;
mod storage;
mod ticket;

pub use config::TicketMapConfig;
pub use error::TicketMapError;
pub use iter::{Cursor, IntoIter, Iter, IterMut};
pub use ticket::{Step, Successor, TicketGenerator};

use search::SearchMode;
use storage::SlotStorage;

// =============================================================================
// TicketMap
// =============================================================================

/// An ordered map from generated tickets to values.
///
/// `T` is the ticket type, `V` the value type and `G` the generator that
/// derives each ticket from the previous one.
#[derive(Clone)]
pub struct TicketMap<T, V, G = Successor> {
    storage: SlotStorage<T, V>,
    next_ticket: T,
    generator: G,
    config: TicketMapConfig,
    /// Cleared the first time the generator fails to increase.
    ordered: bool,
}

impl<T: Step, V> TicketMap<T, V> {
    /// An empty map handing out `0, 1, 2, ...`.
    pub fn new() -> Self {
        Self::with_generator(T::ZERO, Successor)
    }
}

impl<T: Step, V> Default for TicketMap<T, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, V, G> TicketMap<T, V, G> {
    #[inline]
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.storage.len() == 0
    }

    /// Slots currently allocated, live or free.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.storage.capacity()
    }

    /// The ticket the next [`insert`](Self::insert) will return.
    #[inline]
    pub fn next_ticket(&self) -> &T {
        &self.next_ticket
    }

    pub fn config(&self) -> &TicketMapConfig {
        &self.config
    }

    /// Whether every ticket handed out so far was greater than the one before.
    ///
    /// Once this is `false` it stays `false`: lookups are linear and iteration
    /// follows insertion order rather than ticket order.
    #[inline]
    pub fn is_ordered(&self) -> bool {
        self.ordered
    }

    /// Remove every element. Tickets already handed out are never reissued.
    pub fn clear(&mut self) {
        debug!(dropped = self.storage.len(), "clearing ticket map");
        self.storage = SlotStorage::with_capacity(self.config.initial_capacity);
    }

    pub fn iter(&self) -> Iter<'_, T, V> {
        Iter::new(&self.storage)
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, T, V> {
        IterMut::new(&mut self.storage)
    }

    pub fn keys(&self) -> impl Iterator<Item = &T> + '_ {
        self.iter().map(|(ticket, _)| ticket)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, value)| value)
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> + '_ {
        self.iter_mut().map(|(_, value)| value)
    }

    /// A [`Cursor`] positioned before the first element.
    pub fn cursor(&self) -> Cursor<T> {
        Cursor::default()
    }

    /// The element with the lowest ticket.
    pub fn first(&self) -> Option<(&T, &V)> {
        let slot = self.storage.next_live(0)?;
        self.storage.entry(slot).map(|(t, v)| (t, v))
    }

    /// The element with the highest ticket.
    pub fn last(&self) -> Option<(&T, &V)> {
        let slot = self.storage.last_live()?;
        self.storage.entry(slot).map(|(t, v)| (t, v))
    }
}

impl<T: Ord, V, G> TicketMap<T, V, G> {
    #[inline]
    fn search_mode(&self) -> SearchMode {
        if !self.ordered || self.storage.capacity() < self.config.linear_search_limit {
            SearchMode::Linear
        } else {
            SearchMode::Binary
        }
    }

    #[inline]
    fn find(&self, ticket: &T) -> Option<usize> {
        self.storage.search(ticket, self.search_mode())
    }

    pub fn get(&self, ticket: &T) -> Option<&V> {
        let slot = self.find(ticket)?;
        self.storage.value_at(slot)
    }

    pub fn get_mut(&mut self, ticket: &T) -> Option<&mut V> {
        let slot = self.find(ticket)?;
        self.storage.value_at_mut(slot)
    }

    pub fn contains_key(&self, ticket: &T) -> bool {
        self.find(ticket).is_some()
    }

    /// Replace the value stored under `ticket`, returning the old one.
    ///
    /// This never inserts: an absent ticket leaves the map untouched and
    /// returns `None`.
    pub fn try_update(&mut self, value: V, ticket: &T) -> Option<V> {
        let slot = self.find(ticket)?;
        self.storage.set(value, slot)
    }

    /// Remove the element stored under `ticket`, returning its value.
    pub fn remove(&mut self, ticket: &T) -> Option<V> {
        let slot = self.find(ticket)?;
        let (_, value) = self.storage.remove(
            slot,
            self.config.compacting_threshold,
            self.config.min_count_to_compact,
        )?;
        Some(value)
    }

    /// Slot the cursor whose last yield is `last` should visit next.
    pub(crate) fn resume_slot(&self, last: Option<&(T, usize)>) -> Option<usize> {
        let Some((ticket, slot)) = last else {
            return self.storage.next_live(0);
        };
        if self.storage.ticket_at(*slot) == Some(ticket) {
            return self.storage.next_live(slot + 1);
        }

        let mode = self.search_mode();
        match self.storage.search(ticket, mode) {
            Some(current) => self.storage.next_live(current + 1),
            // The last yielded element is gone.
            None if self.ordered => self.storage.upper_bound(ticket, mode),
            None => self.storage.next_live(*slot),
        }
    }
}

impl<T, V, G> TicketMap<T, V, G>
where
    T: Ord + Clone,
    G: TicketGenerator<T>,
{
    /// An empty map whose first ticket is `start`, with each later ticket
    /// derived from the previous one by `generator`.
    pub fn with_generator(start: T, generator: G) -> Self {
        Self::with_config(start, generator, TicketMapConfig::default())
    }

    pub fn with_config(start: T, generator: G, config: TicketMapConfig) -> Self {
        Self {
            storage: SlotStorage::with_capacity(config.initial_capacity),
            next_ticket: start,
            generator,
            config,
            ordered: true,
        }
    }

    /// Rebuild a map from `(ticket, value)` pairs, e.g. ones previously read
    /// out of [`iter`](Self::iter).
    ///
    /// Tickets must be strictly ascending, and `next_ticket` (the first ticket
    /// fresh inserts will receive) must be greater than all of them.
    pub fn from_entries<I>(entries: I, next_ticket: T, generator: G) -> Result<Self, TicketMapError>
    where
        I: IntoIterator<Item = (T, V)>,
    {
        let config = TicketMapConfig::default();
        let elements: Vec<(T, V)> = entries.into_iter().collect();
        for (i, pair) in elements.windows(2).enumerate() {
            if pair[1].0 <= pair[0].0 {
                return Err(TicketMapError::OutOfOrder { position: i + 1 });
            }
        }
        if let Some((last, _)) = elements.last() {
            if next_ticket <= *last {
                return Err(TicketMapError::StaleNextTicket);
            }
        }

        Ok(Self {
            storage: SlotStorage::from_dense(elements, config.initial_capacity),
            next_ticket,
            generator,
            config,
            ordered: true,
        })
    }

    /// Store `value` under a fresh ticket and return the ticket.
    ///
    /// # Panics
    ///
    /// Panics if the generator does, e.g. [`Successor`] past the maximum
    /// integer value. The generator runs before `value` is stored, so a
    /// panicking insert leaves the map unchanged. With [`Successor`] this
    /// means the largest integer is never handed out as a ticket.
    pub fn insert(&mut self, value: V) -> T {
        let next = self.generator.next_ticket(&self.next_ticket);
        if self.ordered && next <= self.next_ticket {
            warn!("ticket generator is not strictly increasing; falling back to linear search");
            self.ordered = false;
        }
        let ticket = std::mem::replace(&mut self.next_ticket, next);
        self.storage.append(ticket.clone(), value);
        ticket
    }
}

impl<T, V, G> Extend<V> for TicketMap<T, V, G>
where
    T: Ord + Clone,
    G: TicketGenerator<T>,
{
    fn extend<I: IntoIterator<Item = V>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

// Equality and hashing look at the stored pairs only. Two maps holding the
// same elements are equal even if they would assign different tickets next.

impl<T, V, G, H> PartialEq<TicketMap<T, V, H>> for TicketMap<T, V, G>
where
    T: PartialEq,
    V: PartialEq,
{
    fn eq(&self, other: &TicketMap<T, V, H>) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq, V: Eq, G> Eq for TicketMap<T, V, G> {}

impl<T: Hash, V: Hash, G> Hash for TicketMap<T, V, G> {
    fn hash<S: Hasher>(&self, state: &mut S) {
        state.write_usize(self.len());
        for (ticket, value) in self.iter() {
            ticket.hash(state);
            value.hash(state);
        }
    }
}

impl<T: fmt::Debug, V: fmt::Debug, G> fmt::Debug for TicketMap<T, V, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, T, V, G> IntoIterator for &'a TicketMap<T, V, G> {
    type Item = (&'a T, &'a V);
    type IntoIter = Iter<'a, T, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, V, G> IntoIterator for &'a mut TicketMap<T, V, G> {
    type Item = (&'a T, &'a mut V);
    type IntoIter = IterMut<'a, T, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T, V, G> IntoIterator for TicketMap<T, V, G> {
    type Item = (T, V);
    type IntoIter = IntoIter<T, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self.storage)
    }
}


#[cfg(test)]
mod proptests;
