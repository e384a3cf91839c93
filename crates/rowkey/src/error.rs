use crate::id::RecordId;

/// A result type defaulting to the crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All error variants that `rowkey` can emit.
///
/// Every variant is scoped to the single operation that produced it. None of
/// them leave shared state half-updated, so the caller may retry once the
/// underlying condition clears.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The clock reported a time earlier than the last timestamp this
    /// generator issued an id for.
    ///
    /// The generator state is left untouched. Retry after backing off once the
    /// host clock has caught up with `last`.
    #[error("clock moved backwards: now {now}ms, last issued {last}ms")]
    ClockRegression {
        /// Milliseconds since the epoch reported by the clock.
        now: u64,
        /// Milliseconds since the epoch of the most recently issued id.
        last: u64,
    },

    /// The clock has passed the largest timestamp the id layout can encode.
    #[error("timestamp {now}ms exceeds the layout maximum of {max}ms")]
    TimestampOverflow {
        /// Milliseconds since the epoch reported by the clock.
        now: u64,
        /// Largest timestamp the layout can encode.
        max: u64,
    },

    /// The configured worker id does not fit the id layout.
    #[error("worker id {machine_id} exceeds the layout maximum of {max}")]
    MachineIdOutOfRange {
        /// The rejected worker id.
        machine_id: u64,
        /// Largest worker id the layout can encode.
        max: u64,
    },

    /// The configured epoch lies after the current wall-clock time.
    ///
    /// Clocks read zero until the epoch passes, so a generator would stall
    /// once the first millisecond's sequence is spent.
    #[error("epoch {epoch_ms}ms is in the future (now {now_ms}ms since the Unix epoch)")]
    EpochInFuture {
        /// The configured epoch, in milliseconds since the Unix epoch.
        epoch_ms: u64,
        /// The wall-clock time of the check, in milliseconds since the Unix
        /// epoch.
        now_ms: u64,
    },

    /// A default partition key was requested outside an active session
    /// scope. Supply the key explicitly instead.
    #[error("no partition key in scope")]
    NoContext,

    /// A partition key failed validation.
    #[error("invalid partition key: {reason}")]
    InvalidPartitionKey {
        /// Why the key was rejected.
        reason: String,
    },

    /// A new record was saved under an id that is already stored.
    #[error("record {id} already exists")]
    DuplicateKey {
        /// The conflicting id.
        id: RecordId,
    },

    /// A persisted record was saved but its row no longer exists.
    #[error("record {id} not found")]
    NotFound {
        /// The missing id.
        id: RecordId,
    },

    /// A raw value does not describe a valid record id (the reserved sign bit
    /// is set).
    #[error("invalid record id: {raw}")]
    InvalidRecordId {
        /// The rejected raw value, reinterpreted as unsigned.
        raw: u64,
    },

    /// A string is not a decimal record id.
    #[error("cannot parse record id from {input:?}")]
    ParseRecordId {
        /// The rejected input.
        input: String,
    },

    /// The operation failed because a lock was **poisoned**.
    ///
    /// This occurs when a thread panics while holding the lock. When the
    /// `parking-lot` feature is enabled, locks do **not** poison, so this
    /// variant is not available.
    #[cfg_attr(docsrs, doc(cfg(not(feature = "parking-lot"))))]
    #[cfg(not(feature = "parking-lot"))]
    #[error("lock poisoned")]
    LockPoisoned,
}

#[cfg(not(feature = "parking-lot"))]
impl<G> From<std::sync::PoisonError<G>> for Error {
    fn from(_: std::sync::PoisonError<G>) -> Self {
        Self::LockPoisoned
    }
}
