/// Tuning knobs for a [`TicketMap`](crate::TicketMap).
///
/// The defaults suit most workloads; they only trade memory for time and never
/// change what a map returns.
#[derive(Debug, Clone, PartialEq)]
pub struct TicketMapConfig {
    /// Slots allocated at construction and after [`clear`](crate::TicketMap::clear).
    pub initial_capacity: usize,
    /// Live-slot ratio below which a removal repacks the buffer.
    pub compacting_threshold: f64,
    /// Removals never compact while the map holds this many elements or fewer.
    pub min_count_to_compact: usize,
    /// Buffers with fewer slots than this are searched linearly.
    pub linear_search_limit: usize,
}

pub(crate) const DEFAULT_INITIAL_CAPACITY: usize = 8;
pub(crate) const DEFAULT_COMPACTING_THRESHOLD: f64 = 0.5;
pub(crate) const DEFAULT_MIN_COUNT_TO_COMPACT: usize = 16;
pub(crate) const DEFAULT_LINEAR_SEARCH_LIMIT: usize = 200;

impl Default for TicketMapConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            compacting_threshold: DEFAULT_COMPACTING_THRESHOLD,
            min_count_to_compact: DEFAULT_MIN_COUNT_TO_COMPACT,
            linear_search_limit: DEFAULT_LINEAR_SEARCH_LIMIT,
        }
    }
}
