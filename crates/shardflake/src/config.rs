use core::time::Duration;

use crate::{ConfigError, DEFAULT_EPOCH, MIN_EPOCH, ShardedId};

/// Construction-time settings for a generator.
///
/// Shard and worker IDs are taken as signed integers so that values read from
/// external configuration (which may be negative) are rejected rather than
/// silently wrapped. Nothing here is checked until [`Self::validate`] runs,
/// which every generator constructor does.
///
/// # Example
///
/// ```
/// use shardflake::{GeneratorConfig, TWITTER_EPOCH};
///
/// let config = GeneratorConfig::default()
///     .with_epoch(TWITTER_EPOCH)
///     .with_shard_id(1)
///     .with_worker_id(2);
///
/// let layout = config.validate(TWITTER_EPOCH.as_millis() as u64 + 1).unwrap();
/// assert_eq!(layout.shard_id, 1);
/// assert_eq!(layout.worker_id, 2);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Origin of the timestamp field, as a [`Duration`] since 1970-01-01 UTC.
    pub epoch: Duration,
    /// Shard (datacenter) identifier, `0..=31`.
    pub shard_id: i64,
    /// Worker (process) identifier, `0..=31`.
    pub worker_id: i64,
}

impl Default for GeneratorConfig {
    /// Shard 0, worker 0, [`DEFAULT_EPOCH`].
    fn default() -> Self {
        Self {
            epoch: DEFAULT_EPOCH,
            shard_id: 0,
            worker_id: 0,
        }
    }
}

/// The validated, immutable part of a generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Layout {
    /// Epoch as Unix milliseconds.
    pub epoch_millis: u64,
    /// Shard ID, within `0..=31`.
    pub shard_id: u64,
    /// Worker ID, within `0..=31`.
    pub worker_id: u64,
}

impl GeneratorConfig {
    /// Creates an unvalidated config for `shard_id` and `worker_id` using
    /// [`DEFAULT_EPOCH`].
    pub fn new(shard_id: i64, worker_id: i64) -> Self {
        Self {
            shard_id,
            worker_id,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_epoch(mut self, epoch: Duration) -> Self {
        self.epoch = epoch;
        self
    }

    #[must_use]
    pub fn with_shard_id(mut self, shard_id: i64) -> Self {
        self.shard_id = shard_id;
        self
    }

    #[must_use]
    pub fn with_worker_id(mut self, worker_id: i64) -> Self {
        self.worker_id = worker_id;
        self
    }

    /// Checks every field against the bit layout and the current time.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::ShardIdOutOfRange`] / [`ConfigError::WorkerIdOutOfRange`]
    ///   if an identifier does not fit its 5-bit field
    /// - [`ConfigError::EpochBelowFloor`] if the epoch precedes [`MIN_EPOCH`]
    /// - [`ConfigError::EpochInFuture`] if the epoch is after `now_millis`
    pub fn validate(&self, now_millis: u64) -> Result<Layout, ConfigError> {
        let shard_id = check_field(self.shard_id, ShardedId::max_shard_id()).ok_or(
            ConfigError::ShardIdOutOfRange {
                value: self.shard_id,
                max: ShardedId::max_shard_id(),
            },
        )?;
        let worker_id = check_field(self.worker_id, ShardedId::max_worker_id()).ok_or(
            ConfigError::WorkerIdOutOfRange {
                value: self.worker_id,
                max: ShardedId::max_worker_id(),
            },
        )?;

        let epoch_millis = u64::try_from(self.epoch.as_millis()).unwrap_or(u64::MAX);
        let min_millis = MIN_EPOCH.as_millis() as u64;
        if epoch_millis < min_millis {
            return Err(ConfigError::EpochBelowFloor {
                epoch_millis,
                min_millis,
            });
        }
        if epoch_millis > now_millis {
            return Err(ConfigError::EpochInFuture {
                epoch_millis,
                now_millis,
            });
        }

        Ok(Layout {
            epoch_millis,
            shard_id,
            worker_id,
        })
    }
}

fn check_field(value: i64, max: u64) -> Option<u64> {
    u64::try_from(value).ok().filter(|&v| v <= max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TWITTER_EPOCH;

    const NOW: u64 = 1_700_000_000_000;

    #[test]
    fn default_config_is_valid() {
        let layout = GeneratorConfig::default().validate(NOW).unwrap();
        assert_eq!(layout.epoch_millis, DEFAULT_EPOCH.as_millis() as u64);
        assert_eq!(layout.shard_id, 0);
        assert_eq!(layout.worker_id, 0);
    }

    #[test]
    fn boundary_ids_are_accepted() {
        let layout = GeneratorConfig::new(31, 31).validate(NOW).unwrap();
        assert_eq!(layout.shard_id, 31);
        assert_eq!(layout.worker_id, 31);
    }

    #[test]
    fn worker_id_above_range_is_rejected() {
        let err = GeneratorConfig::new(0, 32).validate(NOW).unwrap_err();
        assert_eq!(
            err,
            ConfigError::WorkerIdOutOfRange {
                value: 32,
                max: 31
            }
        );
    }

    #[test]
    fn negative_shard_id_is_rejected() {
        let err = GeneratorConfig::new(-1, 0).validate(NOW).unwrap_err();
        assert_eq!(
            err,
            ConfigError::ShardIdOutOfRange { value: -1, max: 31 }
        );
    }

    #[test]
    fn negative_worker_id_is_rejected() {
        let err = GeneratorConfig::new(0, i64::MIN).validate(NOW).unwrap_err();
        assert!(matches!(err, ConfigError::WorkerIdOutOfRange { .. }));
    }

    #[test]
    fn epoch_after_now_is_rejected() {
        let config = GeneratorConfig::default().with_epoch(Duration::from_millis(NOW + 1));
        assert_eq!(
            config.validate(NOW).unwrap_err(),
            ConfigError::EpochInFuture {
                epoch_millis: NOW + 1,
                now_millis: NOW
            }
        );
    }

    #[test]
    fn epoch_equal_to_now_is_accepted() {
        let config = GeneratorConfig::default().with_epoch(Duration::from_millis(NOW));
        assert_eq!(config.validate(NOW).unwrap().epoch_millis, NOW);
    }

    #[test]
    fn epoch_below_floor_is_rejected() {
        let config = GeneratorConfig::default().with_epoch(Duration::ZERO);
        assert!(matches!(
            config.validate(NOW),
            Err(ConfigError::EpochBelowFloor {
                epoch_millis: 0,
                ..
            })
        ));

        let at_floor = GeneratorConfig::default().with_epoch(MIN_EPOCH);
        assert!(at_floor.validate(NOW).is_ok());
    }

    #[test]
    fn builder_methods_set_fields() {
        let config = GeneratorConfig::default()
            .with_epoch(TWITTER_EPOCH)
            .with_shard_id(5)
            .with_worker_id(6);
        assert_eq!(config.epoch, TWITTER_EPOCH);
        assert_eq!(config.shard_id, 5);
        assert_eq!(config.worker_id, 6);
    }
}
