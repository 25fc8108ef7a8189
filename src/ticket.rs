//! Ticket generation.
//!
//! A [`TicketMap`](crate::TicketMap) never takes keys from the caller. It
//! asks a [`TicketGenerator`] for the ticket following the last one it handed
//! out. Generators should be strictly increasing: lookups on large maps binary
//! search over tickets, and a map that sees its generator step backwards (or
//! stand still) falls back to linear search for the rest of its life.

/// Produces the ticket that follows `current`.
///
/// Implemented for every `Fn(&T) -> T`, so a closure is usually enough:
///
/// ```rust
/// use ticket_map::TicketMap;
///
/// let mut map = TicketMap::with_generator(100u32, |t: &u32| t + 10);
/// assert_eq!(map.insert("a"), 100);
/// assert_eq!(map.insert("b"), 110);
/// ```
pub trait TicketGenerator<T> {
    fn next_ticket(&self, current: &T) -> T;
}

impl<T, F> TicketGenerator<T> for F
where
    F: Fn(&T) -> T,
{
    #[inline]
    fn next_ticket(&self, current: &T) -> T {
        self(current)
    }
}

/// Integer-like tickets with a zero and a successor.
pub trait Step: Ord + Clone {
    const ZERO: Self;

    /// The next value up.
    ///
    /// # Panics
    ///
    /// Panics when `self` is the largest representable value.
    fn successor(&self) -> Self {
        self.checked_successor().expect("ticket space exhausted")
    }

    /// The next value up, or `None` when `self` is the largest representable
    /// value.
    fn checked_successor(&self) -> Option<Self>;
}

macro_rules! impl_step {
    ($($t:ty),* $(,)?) => {
        $(
            impl Step for $t {
                const ZERO: Self = 0;

                #[inline]
                fn checked_successor(&self) -> Option<Self> {
                    self.checked_add(1)
                }
            }
        )*
    };
}

impl_step!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);

/// The `+1` generator used by [`TicketMap::new`](crate::TicketMap::new).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Successor;

impl<T: Step> TicketGenerator<T> for Successor {
    #[inline]
    fn next_ticket(&self, current: &T) -> T {
        current.successor()
    }
}
