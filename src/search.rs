// =============================================================================
// Ticket search
// =============================================================================
//
// Maps a ticket to the slot holding it. Small buffers are scanned linearly;
// larger ones are binary searched over slot indices, which is only sound while
// live slots hold ascending tickets.

use std::cmp::Ordering;

use crate::storage::SlotStorage;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SearchMode {
    Linear,
    Binary,
}

impl<T: Ord, V> SlotStorage<T, V> {
    pub(crate) fn search(&self, ticket: &T, mode: SearchMode) -> Option<usize> {
        match mode {
            SearchMode::Linear => self.linear_search(ticket),
            SearchMode::Binary => self.binary_search(ticket),
        }
    }

    /// First live slot holding `ticket`, in slot order.
    pub(crate) fn linear_search(&self, ticket: &T) -> Option<usize> {
        let mut slot = self.next_live(0);
        while let Some(s) = slot {
            if self.ticket_at(s) == Some(ticket) {
                return Some(s);
            }
            slot = self.next_live(s + 1);
        }
        None
    }

    /// Binary search over `[lo, hi)` slot windows. Each step probes the window
    /// midpoint and snaps forward to the next live slot still inside the
    /// window; a window with no live slot right of the midpoint loses that half.
    pub(crate) fn binary_search(&self, ticket: &T) -> Option<usize> {
        let (mut lo, mut hi) = (0, self.next_free());
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let Some(probe) = self.next_live_in(mid, hi) else {
                hi = mid;
                continue;
            };
            match self.ticket_at(probe)?.cmp(ticket) {
                Ordering::Equal => return Some(probe),
                Ordering::Greater => hi = mid,
                Ordering::Less => lo = probe + 1,
            }
        }
        None
    }

    /// First live slot whose ticket is strictly greater than `ticket`.
    pub(crate) fn upper_bound(&self, ticket: &T, mode: SearchMode) -> Option<usize> {
        match mode {
            SearchMode::Linear => {
                let mut slot = self.next_live(0);
                while let Some(s) = slot {
                    if self.ticket_at(s).is_some_and(|t| t > ticket) {
                        return Some(s);
                    }
                    slot = self.next_live(s + 1);
                }
                None
            }
            SearchMode::Binary => {
                let (mut lo, mut hi) = (0, self.next_free());
                let mut found = None;
                while lo < hi {
                    let mid = lo + (hi - lo) / 2;
                    let Some(probe) = self.next_live_in(mid, hi) else {
                        hi = mid;
                        continue;
                    };
                    if self.ticket_at(probe)? > ticket {
                        found = Some(probe);
                        hi = mid;
                    } else {
                        lo = probe + 1;
                    }
                }
                found
            }
        }
    }
}
