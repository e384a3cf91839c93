use crate::{
    error::{Error, Result},
    generator::{Backoff, IdGenStatus},
    id::SnowflakeId,
    time::TimeSource,
};

/// A minimal interface for generating Snowflake ids.
pub trait SnowflakeGenerator<ID: SnowflakeId> {
    /// The time source read on every poll.
    type Clock: TimeSource;

    /// Creates a new generator for `machine_id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MachineIdOutOfRange`] if `machine_id` does not fit the
    /// layout of `ID`.
    fn new(machine_id: u64, clock: Self::Clock) -> Result<Self>
    where
        Self: Sized;

    /// Attempts to generate the next id without blocking.
    ///
    /// # Errors
    ///
    /// - [`Error::ClockRegression`] if the clock reads earlier than the last
    ///   issued timestamp. The generator state is left unchanged.
    /// - [`Error::TimestampOverflow`] once the clock passes the largest
    ///   timestamp the layout can encode.
    /// - [`Error::LockPoisoned`] if a lock-based generator's lock is poisoned
    ///   (std locks only).
    ///
    /// [`Error::LockPoisoned`]: crate::Error
    fn poll_id(&self) -> Result<IdGenStatus<ID>>;

    /// Generates the next id, waiting with `backoff` while the current
    /// millisecond's sequence is exhausted.
    ///
    /// The wait is bounded by the clock: it ends as soon as the clock ticks
    /// over to the next millisecond.
    ///
    /// # Errors
    ///
    /// Same as [`SnowflakeGenerator::poll_id`]; errors are never retried.
    fn next_id(&self, backoff: Backoff) -> Result<ID> {
        loop {
            match self.poll_id()? {
                IdGenStatus::Ready { id } => return Ok(id),
                IdGenStatus::Pending { yield_for } => backoff.wait(yield_for),
            }
        }
    }
}

/// Rejects worker ids that do not fit the layout of `ID`.
pub(crate) fn check_machine_id<ID: SnowflakeId>(machine_id: u64) -> Result<()> {
    let max = ID::max_machine_id();
    if machine_id > max {
        return Err(Error::MachineIdOutOfRange { machine_id, max });
    }
    Ok(())
}

/// Rejects clock readings the timestamp field can no longer hold.
pub(crate) fn check_timestamp<ID: SnowflakeId>(now: u64) -> Result<()> {
    let max = ID::max_timestamp();
    if now > max {
        return Err(Error::TimestampOverflow { now, max });
    }
    Ok(())
}

#[cold]
#[inline(never)]
pub(crate) fn clock_behind(now: u64, last: u64) -> Error {
    #[cfg(feature = "tracing")]
    tracing::warn!(now, last, "clock moved backwards; refusing to issue id");
    Error::ClockRegression { now, last }
}
