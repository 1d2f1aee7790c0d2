use core::{fmt, str::FromStr, time::Duration};

use crate::error::ParseIdError;

/// A 64-bit Snowflake ID with separate shard and worker fields.
///
/// - 1 bit reserved (always zero, keeps the value positive as an `i64`)
/// - 41 bits timestamp (ms since the generator's epoch)
/// - 5 bits shard ID
/// - 5 bits worker ID
/// - 12 bits sequence
///
/// ```text
///  Bit Index:  63           63 62            22 21        17 16         12 11             0
///              +--------------+----------------+------------+-------------+---------------+
///  Field:      | reserved (1) | timestamp (41) | shard (5)  | worker (5)  | sequence (12) |
///              +--------------+----------------+------------+-------------+---------------+
///              |<---------------- MSB ------------ 64 bits ------------ LSB ------------->|
/// ```
///
/// Ordering of the raw value matches ordering by `(timestamp, shard, worker,
/// sequence)`, so IDs from a single generator sort in issue order.
///
/// # Example
///
/// ```
/// use shardflake::ShardedId;
///
/// let id = ShardedId::from(1000, 2, 3, 1);
/// assert_eq!(id.timestamp(), 1000);
/// assert_eq!(id.shard_id(), 2);
/// assert_eq!(id.worker_id(), 3);
/// assert_eq!(id.sequence(), 1);
/// assert_eq!(id.to_string(), id.to_raw().to_string());
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u64", into = "u64"))]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ShardedId {
    id: u64,
}

impl ShardedId {
    /// Bitmask for the reserved sign bit (bit 63).
    pub const RESERVED_MASK: u64 = 1 << 63;

    /// Bitmask for extracting the 41-bit timestamp field. Occupies bits 22
    /// through 62.
    pub const TIMESTAMP_MASK: u64 = (1 << 41) - 1;

    /// Bitmask for extracting the 5-bit shard ID field. Occupies bits 17
    /// through 21.
    pub const SHARD_ID_MASK: u64 = (1 << 5) - 1;

    /// Bitmask for extracting the 5-bit worker ID field. Occupies bits 12
    /// through 16.
    pub const WORKER_ID_MASK: u64 = (1 << 5) - 1;

    /// Bitmask for extracting the 12-bit sequence field. Occupies bits 0
    /// through 11.
    pub const SEQUENCE_MASK: u64 = (1 << 12) - 1;

    /// Number of bits to shift the timestamp to its correct position (bit 22).
    pub const TIMESTAMP_SHIFT: u64 = 22;

    /// Number of bits to shift the shard ID to its correct position (bit 17).
    pub const SHARD_ID_SHIFT: u64 = 17;

    /// Number of bits to shift the worker ID to its correct position (bit 12).
    pub const WORKER_ID_SHIFT: u64 = 12;

    /// Number of bits to shift the sequence field (bit 0).
    pub const SEQUENCE_SHIFT: u64 = 0;

    /// Packs the four fields, truncating each to its width.
    pub const fn from(timestamp: u64, shard_id: u64, worker_id: u64, sequence: u64) -> Self {
        let timestamp = (timestamp & Self::TIMESTAMP_MASK) << Self::TIMESTAMP_SHIFT;
        let shard_id = (shard_id & Self::SHARD_ID_MASK) << Self::SHARD_ID_SHIFT;
        let worker_id = (worker_id & Self::WORKER_ID_MASK) << Self::WORKER_ID_SHIFT;
        let sequence = (sequence & Self::SEQUENCE_MASK) << Self::SEQUENCE_SHIFT;
        Self {
            id: timestamp | shard_id | worker_id | sequence,
        }
    }

    /// Packs the four fields, asserting in debug builds that none overflows.
    pub fn from_components(timestamp: u64, shard_id: u64, worker_id: u64, sequence: u64) -> Self {
        debug_assert!(timestamp <= Self::TIMESTAMP_MASK, "timestamp overflow");
        debug_assert!(shard_id <= Self::SHARD_ID_MASK, "shard_id overflow");
        debug_assert!(worker_id <= Self::WORKER_ID_MASK, "worker_id overflow");
        debug_assert!(sequence <= Self::SEQUENCE_MASK, "sequence overflow");
        Self::from(timestamp, shard_id, worker_id, sequence)
    }

    /// Extracts the timestamp (ms since the generator's epoch).
    pub const fn timestamp(&self) -> u64 {
        (self.id >> Self::TIMESTAMP_SHIFT) & Self::TIMESTAMP_MASK
    }

    /// Extracts the shard ID.
    pub const fn shard_id(&self) -> u64 {
        (self.id >> Self::SHARD_ID_SHIFT) & Self::SHARD_ID_MASK
    }

    /// Extracts the worker ID.
    pub const fn worker_id(&self) -> u64 {
        (self.id >> Self::WORKER_ID_SHIFT) & Self::WORKER_ID_MASK
    }

    /// Extracts the sequence number.
    pub const fn sequence(&self) -> u64 {
        (self.id >> Self::SEQUENCE_SHIFT) & Self::SEQUENCE_MASK
    }

    pub const fn max_timestamp() -> u64 {
        Self::TIMESTAMP_MASK
    }

    pub const fn max_shard_id() -> u64 {
        Self::SHARD_ID_MASK
    }

    pub const fn max_worker_id() -> u64 {
        Self::WORKER_ID_MASK
    }

    pub const fn max_sequence() -> u64 {
        Self::SEQUENCE_MASK
    }

    pub const fn to_raw(&self) -> u64 {
        self.id
    }

    pub const fn from_raw(raw: u64) -> Self {
        Self { id: raw }
    }

    /// Returns the ID as a signed integer.
    ///
    /// Lossless for every generated ID since the reserved bit is never set.
    pub const fn to_i64(&self) -> i64 {
        self.id as i64
    }

    /// Returns true if the sequence can be incremented within the current
    /// millisecond.
    pub const fn has_sequence_room(&self) -> bool {
        self.sequence() < Self::max_sequence()
    }

    /// Returns a new ID with the sequence incremented.
    pub fn increment_sequence(&self) -> Self {
        Self::from_components(
            self.timestamp(),
            self.shard_id(),
            self.worker_id(),
            self.sequence() + 1,
        )
    }

    /// Returns a new ID for a newer timestamp with the sequence reset to zero.
    pub fn rollover_to_timestamp(&self, timestamp: u64) -> Self {
        Self::from_components(timestamp, self.shard_id(), self.worker_id(), 0)
    }

    /// Milliseconds since the Unix epoch at which this ID was issued, given
    /// the epoch its generator was configured with.
    pub fn unix_millis(&self, epoch: Duration) -> u128 {
        epoch.as_millis() + u128::from(self.timestamp())
    }

    /// Returns the ID as a zero-padded 20-digit string.
    ///
    /// Padded strings sort lexicographically in the same order as the
    /// numeric values.
    pub fn to_padded_string(&self) -> String {
        format!("{:020}", self.id)
    }
}

impl fmt::Display for ShardedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl fmt::Debug for ShardedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShardedId")
            .field("raw", &format_args!("0x{:016x}", self.id))
            .field("timestamp", &self.timestamp())
            .field("shard_id", &self.shard_id())
            .field("worker_id", &self.worker_id())
            .field("sequence", &self.sequence())
            .finish()
    }
}

impl FromStr for ShardedId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.parse::<u64>()?)
    }
}

/// Accepts any raw value with the reserved bit clear.
impl TryFrom<u64> for ShardedId {
    type Error = ParseIdError;

    fn try_from(raw: u64) -> Result<Self, Self::Error> {
        if raw & Self::RESERVED_MASK != 0 {
            return Err(ParseIdError::ReservedBitSet(raw));
        }
        Ok(Self::from_raw(raw))
    }
}

impl From<ShardedId> for u64 {
    fn from(id: ShardedId) -> Self {
        id.to_raw()
    }
}

impl From<ShardedId> for i64 {
    fn from(id: ShardedId) -> Self {
        id.to_i64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_and_bounds() {
        let ts = ShardedId::max_timestamp();
        let shard = ShardedId::max_shard_id();
        let worker = ShardedId::max_worker_id();
        let seq = ShardedId::max_sequence();

        let id = ShardedId::from(ts, shard, worker, seq);
        assert_eq!(id.timestamp(), ts);
        assert_eq!(id.shard_id(), shard);
        assert_eq!(id.worker_id(), worker);
        assert_eq!(id.sequence(), seq);
        assert_eq!(ShardedId::from_components(ts, shard, worker, seq), id);
        assert_eq!(id.to_raw() & ShardedId::RESERVED_MASK, 0);
        assert!(id.to_i64() > 0);
    }

    #[test]
    fn field_positions_match_layout() {
        let id = ShardedId::from(1, 1, 1, 1);
        assert_eq!(id.to_raw(), (1 << 22) | (1 << 17) | (1 << 12) | 1);

        let id = ShardedId::from(0, 31, 0, 0);
        assert_eq!(id.to_raw(), 31 << 17);

        let id = ShardedId::from(0, 0, 31, 0);
        assert_eq!(id.to_raw(), 31 << 12);
    }

    #[test]
    fn fields_do_not_bleed_into_neighbours() {
        let id = ShardedId::from(0, 0, ShardedId::max_worker_id(), 0);
        assert_eq!(id.shard_id(), 0);
        assert_eq!(id.sequence(), 0);

        let id = ShardedId::from(0, ShardedId::max_shard_id(), 0, 0);
        assert_eq!(id.worker_id(), 0);
        assert_eq!(id.timestamp(), 0);
    }

    #[test]
    #[should_panic(expected = "timestamp overflow")]
    fn timestamp_overflow_panics() {
        let ts = ShardedId::max_timestamp() + 1;
        ShardedId::from_components(ts, 0, 0, 0);
    }

    #[test]
    #[should_panic(expected = "shard_id overflow")]
    fn shard_id_overflow_panics() {
        ShardedId::from_components(0, ShardedId::max_shard_id() + 1, 0, 0);
    }

    #[test]
    #[should_panic(expected = "worker_id overflow")]
    fn worker_id_overflow_panics() {
        ShardedId::from_components(0, 0, ShardedId::max_worker_id() + 1, 0);
    }

    #[test]
    #[should_panic(expected = "sequence overflow")]
    fn sequence_overflow_panics() {
        ShardedId::from_components(0, 0, 0, ShardedId::max_sequence() + 1);
    }

    #[test]
    fn sequence_transitions() {
        let id = ShardedId::from(42, 3, 4, 0);
        let next = id.increment_sequence();
        assert_eq!(next.sequence(), 1);
        assert_eq!(next.timestamp(), 42);
        assert_eq!(next.shard_id(), 3);
        assert_eq!(next.worker_id(), 4);
        assert!(next > id);

        let full = ShardedId::from(42, 3, 4, ShardedId::max_sequence());
        assert!(!full.has_sequence_room());

        let rolled = full.rollover_to_timestamp(43);
        assert_eq!(rolled.timestamp(), 43);
        assert_eq!(rolled.sequence(), 0);
        assert_eq!(rolled.shard_id(), 3);
        assert_eq!(rolled.worker_id(), 4);
        assert!(rolled > full);
    }

    #[test]
    fn later_timestamp_always_sorts_higher() {
        let earlier = ShardedId::from(10, 31, 31, ShardedId::max_sequence());
        let later = ShardedId::from(11, 0, 0, 0);
        assert!(later > earlier);
        assert!(later.to_padded_string() > earlier.to_padded_string());
    }

    #[test]
    fn string_forms() {
        let id = ShardedId::from(123_456, 1, 2, 3);
        let decimal = id.to_string();
        assert_eq!(decimal, id.to_raw().to_string());
        assert_eq!(decimal.parse::<ShardedId>().unwrap(), id);

        let padded = id.to_padded_string();
        assert_eq!(padded.len(), 20);
        assert_eq!(padded.parse::<ShardedId>().unwrap(), id);
    }

    #[test]
    fn parse_rejects_garbage_and_reserved_bit() {
        assert!(matches!(
            "12ab".parse::<ShardedId>(),
            Err(ParseIdError::InvalidDigits(_))
        ));
        assert!(matches!(
            "-1".parse::<ShardedId>(),
            Err(ParseIdError::InvalidDigits(_))
        ));
        let raw = ShardedId::RESERVED_MASK | 1;
        assert_eq!(
            raw.to_string().parse::<ShardedId>(),
            Err(ParseIdError::ReservedBitSet(raw))
        );
        assert_eq!(
            ShardedId::try_from(raw),
            Err(ParseIdError::ReservedBitSet(raw))
        );
        assert_eq!(ShardedId::try_from(raw >> 1), Ok(ShardedId::from_raw(raw >> 1)));
    }

    #[test]
    fn unix_millis_adds_epoch_back() {
        let epoch = Duration::from_millis(1_000_000);
        let id = ShardedId::from(500, 0, 0, 0);
        assert_eq!(id.unix_millis(epoch), 1_000_500);
    }

    #[test]
    fn debug_shows_decoded_fields() {
        let rendered = format!("{:?}", ShardedId::from(7, 1, 2, 3));
        assert!(rendered.contains("timestamp: 7"));
        assert!(rendered.contains("shard_id: 1"));
        assert!(rendered.contains("worker_id: 2"));
        assert!(rendered.contains("sequence: 3"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_uses_the_raw_integer() {
        let id = ShardedId::from(99, 1, 2, 3);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, id.to_raw().to_string());
        let back: ShardedId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);

        let err = serde_json::from_str::<ShardedId>("9223372036854775809").unwrap_err();
        assert!(err.to_string().contains("reserved bit"), "{err}");
    }
}
