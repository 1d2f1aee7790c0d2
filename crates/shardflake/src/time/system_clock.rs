use std::time::{SystemTime, UNIX_EPOCH};

use crate::TimeSource;

/// The operating system's wall clock.
///
/// Each call reads `SystemTime::now()`, so adjustments such as NTP steps or VM
/// migrations are visible to the generator. That is intentional: the
/// generator detects a clock that moved backwards and refuses to issue IDs
/// instead of hiding the jump.
///
/// A system time before 1970 is reported as `0`, which every valid epoch then
/// treats as a regression.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn current_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| {
                u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DEFAULT_EPOCH, MIN_EPOCH};

    #[test]
    fn system_clock_is_after_default_epoch() {
        let now = SystemClock.current_millis();
        assert!(now > DEFAULT_EPOCH.as_millis() as u64);
        assert!(now > MIN_EPOCH.as_millis() as u64);
    }

    #[test]
    fn system_clock_does_not_jump_backwards_between_reads() {
        let clock = SystemClock;
        let first = clock.current_millis();
        let second = clock.current_millis();
        // Two reads microseconds apart; a larger gap would mean a clock step.
        assert!(second + 1_000 >= first);
    }
}
