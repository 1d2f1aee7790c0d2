use core::time::Duration;
use std::sync::Arc;

/// Default epoch: Friday, August 11, 2006 13:26:35 UTC
pub const DEFAULT_EPOCH: Duration = Duration::from_millis(1_155_302_795_000);

/// Lowest accepted epoch: Saturday, January 1, 2000 00:00:00 UTC
///
/// The 41-bit timestamp field covers roughly 69 years, so an epoch at the
/// floor stays usable until 2069.
pub const MIN_EPOCH: Duration = Duration::from_millis(946_684_800_000);

/// Twitter epoch: Thursday, November 4, 2010 1:42:54.657 UTC
pub const TWITTER_EPOCH: Duration = Duration::from_millis(1_288_834_974_657);

/// Discord epoch: Thursday, January 1, 2015 00:00:00 UTC
pub const DISCORD_EPOCH: Duration = Duration::from_millis(1_420_070_400_000);

/// A source of wall-clock time.
///
/// This abstraction allows you to plug in the system clock or a mocked time
/// source in tests. Unlike the epoch-relative values packed into an ID, the
/// returned value is **milliseconds since the Unix epoch**; the generator
/// subtracts its configured epoch itself.
///
/// # Example
///
/// ```
/// use shardflake::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1234
///     }
/// }
///
/// let time = FixedTime;
/// assert_eq!(time.current_millis(), 1234);
/// ```
pub trait TimeSource {
    /// Returns the current time in milliseconds since the Unix epoch.
    fn current_millis(&self) -> u64;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}
