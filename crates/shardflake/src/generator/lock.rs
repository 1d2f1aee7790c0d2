use core::{cmp::Ordering, time::Duration};
use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    Error, GeneratorConfig, Layout, Result, ShardedId, TimeSource,
    generator::{Mutex, MutexGuard, Poll},
};

/// Everything guarded by the generator's lock.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct State {
    /// The last issued ID, or `None` before the first call.
    last: Option<ShardedId>,
    /// `(last, now)` of the first clock regression. Once set, every call
    /// fails with it.
    halted: Option<(u64, u64)>,
}

impl State {
    /// Latches the generator into the halted state if `result` is a clock
    /// regression.
    fn halt_on_regression<R>(&mut self, result: Result<R>) -> Result<R> {
        if let Err(Error::ClockRegression { last, now }) = &result {
            self.halted = Some((*last, *now));
        }
        result
    }
}

/// A lock-based sharded Snowflake ID generator for multi-threaded use.
///
/// The last issued ID lives behind an [`Arc<Mutex<_>>`]; every call reads the
/// clock, decides the next ID and stores it while holding the lock, so no two
/// callers can ever observe the same `(timestamp, sequence)` pair. Clones
/// share that state and are interchangeable.
///
/// Epoch, shard ID and worker ID are fixed at construction.
///
/// ## Clock handling
/// - Same millisecond as the last ID: the sequence is incremented. Once all
///   4096 values are spent, [`Self::next_id`] spins on the clock (without
///   sleeping) until the next millisecond, keeping the lock held.
/// - Later millisecond: the sequence restarts at zero.
/// - Earlier millisecond: [`Error::ClockRegression`] is returned, and the
///   generator halts. Every later call on it (or any clone) returns the same
///   error, even after the clock moves forward again. Build a new generator
///   to resume issuing.
///
/// ## See Also
/// - [`default_generator`] for a lazily built process-wide instance
///
/// [`default_generator`]: crate::default_generator
pub struct LockShardedGenerator<T>
where
    T: TimeSource,
{
    #[cfg(feature = "cache-padded")]
    pub(crate) state: Arc<crossbeam_utils::CachePadded<Mutex<State>>>,
    #[cfg(not(feature = "cache-padded"))]
    pub(crate) state: Arc<Mutex<State>>,
    pub(crate) layout: Layout,
    pub(crate) time: T,
}

/// What the state permits for the current millisecond.
enum Step {
    Issue(ShardedId),
    Exhausted(ShardedId),
}

impl<T> LockShardedGenerator<T>
where
    T: TimeSource,
{
    /// Creates a generator for the given shard and worker using
    /// [`DEFAULT_EPOCH`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if either ID falls outside `0..=31`.
    ///
    /// [`DEFAULT_EPOCH`]: crate::DEFAULT_EPOCH
    pub fn new(shard_id: i64, worker_id: i64, time: T) -> Result<Self> {
        Self::with_config(GeneratorConfig::new(shard_id, worker_id), time)
    }

    /// Creates a generator from an explicit configuration.
    ///
    /// The configuration is validated against `time` once, here; the
    /// generator holds no state that a later configuration change could
    /// affect.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configuration is rejected by
    /// [`GeneratorConfig::validate`].
    ///
    /// # Example
    /// ```
    /// use shardflake::{ConfigError, Error, GeneratorConfig, LockShardedGenerator, SystemClock};
    ///
    /// let err = LockShardedGenerator::with_config(GeneratorConfig::new(0, 32), SystemClock)
    ///     .err()
    ///     .unwrap();
    /// assert!(matches!(err, Error::Config(ConfigError::WorkerIdOutOfRange { .. })));
    /// ```
    pub fn with_config(config: GeneratorConfig, time: T) -> Result<Self> {
        let layout = config.validate(time.current_millis())?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            shard_id = layout.shard_id,
            worker_id = layout.worker_id,
            epoch_millis = layout.epoch_millis,
            "sharded generator configured"
        );

        Ok(Self {
            #[cfg(feature = "cache-padded")]
            state: Arc::new(crossbeam_utils::CachePadded::new(Mutex::new(State::default()))),
            #[cfg(not(feature = "cache-padded"))]
            state: Arc::new(Mutex::new(State::default())),
            layout,
            time,
        })
    }

    pub fn shard_id(&self) -> u64 {
        self.layout.shard_id
    }

    pub fn worker_id(&self) -> u64 {
        self.layout.worker_id
    }

    /// The epoch subtracted from the clock before packing.
    pub fn epoch(&self) -> Duration {
        Duration::from_millis(self.layout.epoch_millis)
    }

    /// Generates the next ID, spinning through sequence exhaustion.
    ///
    /// The wait on exhaustion is bounded by the clock reaching the next
    /// millisecond. A spin is used rather than a sleep because sleep
    /// granularity is typically coarser than the millisecond being waited
    /// for.
    ///
    /// # Errors
    ///
    /// - [`Error::ClockRegression`] if the clock reads earlier than the last
    ///   issued ID (or the epoch), or if it ever did on an earlier call
    /// - [`Error::TimestampOverflow`] once the elapsed time exceeds 41 bits
    /// - `Error::LockPoisoned` if another thread panicked while holding the
    ///   lock (std mutex only)
    ///
    /// # Example
    /// ```
    /// use shardflake::{LockShardedGenerator, SystemClock};
    ///
    /// let generator = LockShardedGenerator::new(1, 2, SystemClock).unwrap();
    /// let a = generator.next_id().unwrap();
    /// let b = generator.next_id().unwrap();
    /// assert!(a < b);
    /// ```
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn next_id(&self) -> Result<ShardedId> {
        let mut state = self.lock()?;
        let id = match self.step(&mut state)? {
            Step::Issue(id) => id,
            Step::Exhausted(last) => {
                #[cfg(feature = "tracing")]
                tracing::trace!(timestamp = last.timestamp(), "sequence exhausted, spinning");
                let now = state.halt_on_regression(self.wait_past(last))?;
                last.rollover_to_timestamp(now)
            }
        };
        state.last = Some(id);
        Ok(id)
    }

    /// Generates the next ID rendered as decimal text.
    ///
    /// # Errors
    ///
    /// Same as [`Self::next_id`].
    pub fn next_id_string(&self) -> Result<String> {
        self.next_id().map(|id| id.to_string())
    }

    /// Attempts to generate the next ID without blocking.
    ///
    /// Behaves like [`Self::next_id`] except that sequence exhaustion yields
    /// [`Poll::Pending`] instead of spinning.
    ///
    /// # Errors
    ///
    /// Same as [`Self::next_id`].
    ///
    /// # Example
    /// ```
    /// use shardflake::{LockShardedGenerator, Poll, SystemClock};
    ///
    /// let generator = LockShardedGenerator::new(0, 0, SystemClock).unwrap();
    /// let id = loop {
    ///     match generator.try_poll_id().unwrap() {
    ///         Poll::Ready { id } => break id,
    ///         Poll::Pending { .. } => std::thread::yield_now(),
    ///     }
    /// };
    /// assert_eq!(id.sequence(), 0);
    /// ```
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_poll_id(&self) -> Result<Poll> {
        let mut state = self.lock()?;
        match self.step(&mut state)? {
            Step::Issue(id) => {
                state.last = Some(id);
                Ok(Poll::Ready { id })
            }
            Step::Exhausted(_) => Ok(Poll::Pending { yield_for: 1 }),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>> {
        #[cfg(feature = "parking-lot")]
        {
            Ok(self.state.lock())
        }
        #[cfg(not(feature = "parking-lot"))]
        {
            Ok(self.state.lock()?)
        }
    }

    /// Refuses if halted, otherwise decides the next step and halts on a
    /// regression.
    fn step(&self, state: &mut State) -> Result<Step> {
        if let Some((last, now)) = state.halted {
            return Err(Error::ClockRegression { last, now });
        }
        let step = self.decide(state.last);
        state.halt_on_regression(step)
    }

    fn decide(&self, last: Option<ShardedId>) -> Result<Step> {
        let now = self.elapsed(last)?;
        let Some(last) = last else {
            return Ok(Step::Issue(ShardedId::from_components(
                now,
                self.layout.shard_id,
                self.layout.worker_id,
                0,
            )));
        };

        match now.cmp(&last.timestamp()) {
            Ordering::Equal if last.has_sequence_room() => {
                Ok(Step::Issue(last.increment_sequence()))
            }
            Ordering::Equal => Ok(Step::Exhausted(last)),
            Ordering::Greater => Ok(Step::Issue(last.rollover_to_timestamp(now))),
            Ordering::Less => Err(self.cold_clock_behind(now, Some(last))),
        }
    }

    /// Spins until the clock passes `last`, returning the new elapsed time.
    fn wait_past(&self, last: ShardedId) -> Result<u64> {
        loop {
            core::hint::spin_loop();
            let now = self.elapsed(Some(last))?;
            match now.cmp(&last.timestamp()) {
                Ordering::Greater => return Ok(now),
                Ordering::Equal => {}
                Ordering::Less => return Err(self.cold_clock_behind(now, Some(last))),
            }
        }
    }

    /// Reads the clock and returns milliseconds elapsed since the epoch.
    fn elapsed(&self, last: Option<ShardedId>) -> Result<u64> {
        let now = self.time.current_millis();
        let Some(elapsed) = now.checked_sub(self.layout.epoch_millis) else {
            return Err(self.cold_clock_behind_epoch(now, last));
        };
        if elapsed > ShardedId::max_timestamp() {
            return Err(Error::TimestampOverflow {
                elapsed,
                max: ShardedId::max_timestamp(),
            });
        }
        Ok(elapsed)
    }

    #[cold]
    #[inline(never)]
    fn cold_clock_behind(&self, elapsed: u64, last: Option<ShardedId>) -> Error {
        self.cold_clock_behind_epoch(self.layout.epoch_millis + elapsed, last)
    }

    #[cold]
    #[inline(never)]
    fn cold_clock_behind_epoch(&self, now: u64, last: Option<ShardedId>) -> Error {
        let last = last.map_or(self.layout.epoch_millis, |id| {
            self.layout.epoch_millis + id.timestamp()
        });

        #[cfg(feature = "tracing")]
        tracing::error!(
            last_millis = last,
            now_millis = now,
            behind_millis = last.saturating_sub(now),
            "clock moved backwards, halting generator"
        );

        Error::ClockRegression { last, now }
    }
}

impl<T> Clone for LockShardedGenerator<T>
where
    T: TimeSource + Clone,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            layout: self.layout,
            time: self.time.clone(),
        }
    }
}

impl<T> core::fmt::Debug for LockShardedGenerator<T>
where
    T: TimeSource,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LockShardedGenerator")
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}
