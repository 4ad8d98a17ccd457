/// The outcome of a single, non-blocking attempt to issue an id.
///
/// Returned by [`LockFlakeGenerator::try_poll_id`]:
///
/// - [`IdGenStatus::Ready`] carries a freshly issued id.
/// - [`IdGenStatus::Pending`] means every sequence value of the current millisecond
///   has been handed out; retry after `yield_for` milliseconds.
///
/// [`LockFlakeGenerator::try_poll_id`]: crate::LockFlakeGenerator::try_poll_id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdGenStatus {
    /// A unique id was issued.
    Ready {
        /// The packed identifier.
        id: u64,
    },
    /// The sequence space of the current millisecond is exhausted.
    Pending {
        /// Milliseconds to wait before trying again.
        yield_for: u64,
    },
}

impl IdGenStatus {
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }
}
