use crate::ShardedId;

/// Outcome of a non-blocking generation attempt.
///
/// Returned by [`LockShardedGenerator::try_poll_id`]:
///
/// - [`Poll::Ready`] carries a newly issued ID.
/// - [`Poll::Pending`] means all 4096 sequence values of the current
///   millisecond are spent. The generator state is untouched; retry once the
///   clock has advanced by `yield_for` milliseconds.
///
/// [`LockShardedGenerator::try_poll_id`]: crate::LockShardedGenerator::try_poll_id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Poll {
    /// A unique ID was generated and is ready to use.
    Ready {
        /// The generated ID.
        id: ShardedId,
    },
    /// The sequence is exhausted for the current millisecond.
    Pending {
        /// Milliseconds to wait before trying again.
        yield_for: u64,
    },
}

impl Poll {
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }

    /// Returns the ID if one was issued.
    pub const fn ready(self) -> Option<ShardedId> {
        match self {
            Self::Ready { id } => Some(id),
            Self::Pending { .. } => None,
        }
    }
}
