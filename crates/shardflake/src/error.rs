/// A result type defaulting to this crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// A generator configuration that would corrupt the bit layout.
///
/// Returned before any generator exists; nothing produced with a rejected
/// configuration is ever observable.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The shard ID does not fit its 5-bit field.
    #[error("shard id {value} is outside 0..={max}")]
    ShardIdOutOfRange { value: i64, max: u64 },

    /// The worker ID does not fit its 5-bit field.
    #[error("worker id {value} is outside 0..={max}")]
    WorkerIdOutOfRange { value: i64, max: u64 },

    /// The epoch lies after the current wall-clock time.
    #[error("epoch {epoch_millis}ms is later than the current time {now_millis}ms")]
    EpochInFuture { epoch_millis: u64, now_millis: u64 },

    /// The epoch lies before the allowed floor.
    #[error("epoch {epoch_millis}ms is earlier than the minimum {min_millis}ms")]
    EpochBelowFloor { epoch_millis: u64, min_millis: u64 },
}

/// All errors a generator can emit.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Construction was rejected.
    #[error("invalid generator configuration: {0}")]
    Config(#[from] ConfigError),

    /// The clock reported a time earlier than the last issued ID.
    ///
    /// Both values are milliseconds since the Unix epoch. The generator halts
    /// on the first regression and every later call returns the same error,
    /// even once the clock moves forward. Callers decide whether to abort the
    /// process.
    #[error("clock moved backwards: last issued at {last}ms, clock now reads {now}ms")]
    ClockRegression { last: u64, now: u64 },

    /// The time elapsed since the epoch no longer fits the 41-bit timestamp
    /// field.
    #[error("elapsed time {elapsed}ms exceeds the timestamp field maximum {max}ms")]
    TimestampOverflow { elapsed: u64, max: u64 },

    /// A thread panicked while holding the generator lock.
    ///
    /// `parking_lot` mutexes do not poison, so this variant is absent with
    /// the `parking-lot` feature.
    #[cfg(not(feature = "parking-lot"))]
    #[error("generator lock poisoned")]
    LockPoisoned,
}

#[cfg(not(feature = "parking-lot"))]
use crate::generator::{MutexGuard, PoisonError};
#[cfg(not(feature = "parking-lot"))]
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}

/// Failure to parse a decimal [`ShardedId`] string.
///
/// [`ShardedId`]: crate::ShardedId
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ParseIdError {
    /// The input is not a decimal `u64`.
    #[error("invalid decimal id: {0}")]
    InvalidDigits(#[from] core::num::ParseIntError),

    /// The reserved top bit is set.
    #[error("id {0} has the reserved bit set")]
    ReservedBitSet(u64),
}
