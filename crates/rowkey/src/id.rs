use core::{fmt, hash::Hash};

use crate::error::{Error, Result};

/// A trait representing a 64-bit Snowflake-style id layout.
///
/// This trait abstracts the core behavior of an id with separate bit fields
/// for timestamp, machine (worker) id, and sequence, packed
/// most-significant-first. Generators are written against this trait so the
/// field widths live in exactly one place.
///
/// # Example
///
/// ```
/// use rowkey::{RecordId, SnowflakeId};
///
/// let id = RecordId::from_components(1000, 2, 1);
/// assert_eq!(id.timestamp(), 1000);
/// assert_eq!(id.machine_id(), 2);
/// assert_eq!(id.sequence(), 1);
/// ```
pub trait SnowflakeId:
    Sized + Copy + Clone + fmt::Display + fmt::Debug + PartialOrd + Ord + PartialEq + Eq + Hash
{
    /// Returns the timestamp portion of the id.
    fn timestamp(&self) -> u64;

    /// Returns the maximum possible value for the timestamp field.
    fn max_timestamp() -> u64;

    /// Returns the machine id portion of the id.
    fn machine_id(&self) -> u64;

    /// Returns the maximum possible value for the machine id field.
    fn max_machine_id() -> u64;

    /// Returns the sequence portion of the id.
    fn sequence(&self) -> u64;

    /// Returns the maximum possible value for the sequence field.
    fn max_sequence() -> u64;

    /// Constructs a new id from its components.
    fn from_components(timestamp: u64, machine_id: u64, sequence: u64) -> Self;

    /// Converts this id into its packed representation.
    fn to_raw(&self) -> u64;

    /// Reinterprets a packed value as an id.
    ///
    /// `raw` must come from [`SnowflakeId::to_raw`]. Untrusted input goes
    /// through a checked conversion such as `TryFrom<u64>` instead.
    fn from_raw(raw: u64) -> Self;

    /// Returns true if the current sequence value can be incremented.
    fn has_sequence_room(&self) -> bool {
        self.sequence() < Self::max_sequence()
    }

    /// Returns the next sequence value.
    fn next_sequence(&self) -> u64 {
        self.sequence() + 1
    }

    /// Returns a new id with the sequence incremented.
    fn increment_sequence(&self) -> Self {
        Self::from_components(self.timestamp(), self.machine_id(), self.next_sequence())
    }

    /// Returns a new id for a newer timestamp with sequence reset to zero.
    fn rollover_to_timestamp(&self, ts: u64) -> Self {
        Self::from_components(ts, self.machine_id(), 0)
    }
}

/// The primary key assigned to every a1stream record before its first write.
///
/// - 1 bit reserved (always zero, so the value fits a signed `BIGINT`)
/// - 41 bits timestamp (ms since the generator's epoch)
/// - 10 bits worker id
/// - 12 bits sequence
///
/// ```text
///  Bit Index:  63           63 62            22 21            12 11             0
///              +--------------+----------------+----------------+---------------+
///  Field:      | reserved (1) | timestamp (41) | worker id (10) | sequence (12) |
///              +--------------+----------------+----------------+---------------+
///              |<----------- MSB ---------- 64 bits ----------- LSB ----------->|
/// ```
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "u64", into = "u64")
)]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId {
    id: u64,
}

impl RecordId {
    /// Bitmask for extracting the 41-bit timestamp field. Occupies bits 22
    /// through 62.
    pub const TIMESTAMP_MASK: u64 = (1 << 41) - 1;

    /// Bitmask for extracting the 10-bit worker id field. Occupies bits 12
    /// through 21.
    pub const MACHINE_ID_MASK: u64 = (1 << 10) - 1;

    /// Bitmask for extracting the 12-bit sequence field. Occupies bits 0
    /// through 11.
    pub const SEQUENCE_MASK: u64 = (1 << 12) - 1;

    /// Number of bits to shift the timestamp to its correct position (bit 22).
    pub const TIMESTAMP_SHIFT: u64 = 22;

    /// Number of bits to shift the worker id to its correct position (bit 12).
    pub const MACHINE_ID_SHIFT: u64 = 12;

    /// Number of bits to shift the sequence field (bit 0).
    pub const SEQUENCE_SHIFT: u64 = 0;

    const RESERVED_MASK: u64 = 1 << 63;

    /// Packs the three fields, silently truncating any that overflow.
    pub const fn from(timestamp: u64, machine_id: u64, sequence: u64) -> Self {
        let timestamp = (timestamp & Self::TIMESTAMP_MASK) << Self::TIMESTAMP_SHIFT;
        let machine_id = (machine_id & Self::MACHINE_ID_MASK) << Self::MACHINE_ID_SHIFT;
        let sequence = (sequence & Self::SEQUENCE_MASK) << Self::SEQUENCE_SHIFT;
        Self {
            id: timestamp | machine_id | sequence,
        }
    }

    /// Extracts the timestamp from the packed id.
    pub const fn timestamp(&self) -> u64 {
        (self.id >> Self::TIMESTAMP_SHIFT) & Self::TIMESTAMP_MASK
    }

    /// Extracts the worker id from the packed id.
    pub const fn machine_id(&self) -> u64 {
        (self.id >> Self::MACHINE_ID_SHIFT) & Self::MACHINE_ID_MASK
    }

    /// Extracts the sequence number from the packed id.
    pub const fn sequence(&self) -> u64 {
        (self.id >> Self::SEQUENCE_SHIFT) & Self::SEQUENCE_MASK
    }

    /// Returns the id as a zero-padded 20-digit string, which sorts the same
    /// way as the numeric value.
    pub fn to_padded_string(&self) -> String {
        format!("{:020}", self.id)
    }
}

impl SnowflakeId for RecordId {
    fn timestamp(&self) -> u64 {
        self.timestamp()
    }

    fn max_timestamp() -> u64 {
        Self::TIMESTAMP_MASK
    }

    fn machine_id(&self) -> u64 {
        self.machine_id()
    }

    fn max_machine_id() -> u64 {
        Self::MACHINE_ID_MASK
    }

    fn sequence(&self) -> u64 {
        self.sequence()
    }

    fn max_sequence() -> u64 {
        Self::SEQUENCE_MASK
    }

    fn from_components(timestamp: u64, machine_id: u64, sequence: u64) -> Self {
        debug_assert!(timestamp <= Self::TIMESTAMP_MASK, "timestamp overflow");
        debug_assert!(machine_id <= Self::MACHINE_ID_MASK, "machine_id overflow");
        debug_assert!(sequence <= Self::SEQUENCE_MASK, "sequence overflow");
        Self::from(timestamp, machine_id, sequence)
    }

    fn to_raw(&self) -> u64 {
        self.id
    }

    fn from_raw(raw: u64) -> Self {
        debug_assert!(raw & Self::RESERVED_MASK == 0, "reserved bit set");
        Self { id: raw }
    }
}

impl TryFrom<u64> for RecordId {
    type Error = Error;

    fn try_from(raw: u64) -> Result<Self> {
        if raw & Self::RESERVED_MASK != 0 {
            return Err(Error::InvalidRecordId { raw });
        }
        Ok(Self { id: raw })
    }
}

impl TryFrom<i64> for RecordId {
    type Error = Error;

    fn try_from(raw: i64) -> Result<Self> {
        Self::try_from(raw as u64)
    }
}

impl From<RecordId> for u64 {
    fn from(id: RecordId) -> Self {
        id.id
    }
}

impl From<RecordId> for i64 {
    fn from(id: RecordId) -> Self {
        // The reserved bit is never set on a generated or validated id.
        id.id as i64
    }
}

impl core::str::FromStr for RecordId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let raw: u64 = s.trim().parse().map_err(|_| Error::ParseRecordId {
            input: s.to_owned(),
        })?;
        Self::try_from(raw)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordId")
            .field("raw", &self.id)
            .field("timestamp", &self.timestamp())
            .field("machine_id", &self.machine_id())
            .field("sequence", &self.sequence())
            .finish()
    }
}
