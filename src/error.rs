use thiserror::Error;

/// Errors raised when rebuilding a map from stored pairs.
///
/// Ordinary operations never fail: absent tickets surface as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TicketMapError {
    /// The pair at `position` does not have a ticket strictly greater than the
    /// one before it.
    #[error("ticket at position {position} is not greater than its predecessor")]
    OutOfOrder { position: usize },
    /// The ticket the map would assign next is not greater than the last
    /// stored ticket, so fresh inserts could collide with existing ones.
    #[error("next ticket is not greater than the last stored ticket")]
    StaleNextTicket,
    /// The last stored ticket is the largest value the ticket type can hold,
    /// so there is no ticket left to assign next.
    #[error("last stored ticket leaves no room for a next ticket")]
    TicketSpaceExhausted,
}
