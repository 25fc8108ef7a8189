// =============================================================================
// Serde support
// =============================================================================
//
// A map is encoded as its `(ticket, value)` pairs in ascending order. The next
// ticket and the generator are not part of the encoding: maps driven by
// `Successor` resume after the last decoded ticket, and maps with any other
// generator are rebuilt with `TicketMap::from_entries`.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ticket::{Step, Successor};
use crate::{TicketMap, TicketMapError};

impl<T, V, G> Serialize for TicketMap<T, V, G>
where
    T: Serialize,
    V: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.iter())
    }
}

impl<'de, T, V> Deserialize<'de> for TicketMap<T, V, Successor>
where
    T: Step + Deserialize<'de>,
    V: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let entries = Vec::<(T, V)>::deserialize(deserializer)?;
        let next_ticket = match entries.last() {
            None => T::ZERO,
            Some((ticket, _)) => ticket
                .checked_successor()
                .ok_or_else(|| D::Error::custom(TicketMapError::TicketSpaceExhausted))?,
        };
        TicketMap::from_entries(entries, next_ticket, Successor).map_err(D::Error::custom)
    }
}
