use core::cmp::Ordering;
use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    error::Result,
    generator::{
        IdGenStatus, SnowflakeGenerator,
        interface::{check_machine_id, check_timestamp, clock_behind},
    },
    id::SnowflakeId,
    sync::{self, Mutex},
    time::TimeSource,
};

/// A lock-based Snowflake id generator suitable for multi-threaded
/// environments.
///
/// The last issued id (and with it the last observed timestamp and sequence)
/// lives in an [`Arc<Mutex<_>>`]. The whole read-modify-write, including the
/// clock read, happens under that single lock, so two callers in the same
/// millisecond can never observe the same sequence value.
///
/// Cloning the generator shares its state: every clone draws from the same
/// sequence.
///
/// ## Recommended When
/// - You're in a multi-threaded environment
/// - Fair access across threads is important
///
/// ## See Also
/// - [`AtomicSnowflakeGenerator`]
///
/// [`AtomicSnowflakeGenerator`]: crate::AtomicSnowflakeGenerator
pub struct LockSnowflakeGenerator<ID, T>
where
    ID: SnowflakeId,
    T: TimeSource,
{
    #[cfg(feature = "cache-padded")]
    pub(crate) state: Arc<crossbeam_utils::CachePadded<Mutex<ID>>>,
    #[cfg(not(feature = "cache-padded"))]
    pub(crate) state: Arc<Mutex<ID>>,
    pub(crate) time: T,
}

impl<ID, T> LockSnowflakeGenerator<ID, T>
where
    ID: SnowflakeId,
    T: TimeSource,
{
    /// Creates a new [`LockSnowflakeGenerator`] for the given worker id.
    ///
    /// The initial timestamp and sequence are zero; the first poll rolls the
    /// state over to the clock's current millisecond.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MachineIdOutOfRange`] if `machine_id` does not fit the
    /// layout. Operators must also guarantee that no two running generators
    /// share a worker id; nothing here coordinates that.
    ///
    /// # Example
    /// ```
    /// use rowkey::{Backoff, LockSnowflakeGenerator, RecordId, SnowflakeGenerator, SystemClock};
    ///
    /// let generator =
    ///     LockSnowflakeGenerator::<RecordId, _>::new(7, SystemClock::default()).unwrap();
    /// let id = generator.next_id(Backoff::Yield).unwrap();
    /// assert_eq!(id.machine_id(), 7);
    /// ```
    ///
    /// [`Error::MachineIdOutOfRange`]: crate::Error::MachineIdOutOfRange
    pub fn new(machine_id: u64, time: T) -> Result<Self> {
        Self::from_components(0, machine_id, 0, time)
    }

    /// Creates a new generator from explicit component values.
    ///
    /// This constructor is primarily useful for restoring state or controlling
    /// the starting point of the generator manually, as tests do.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MachineIdOutOfRange`] if `machine_id` does not fit the
    /// layout.
    ///
    /// [`Error::MachineIdOutOfRange`]: crate::Error::MachineIdOutOfRange
    pub fn from_components(timestamp: u64, machine_id: u64, sequence: u64, time: T) -> Result<Self> {
        check_machine_id::<ID>(machine_id)?;
        let id = ID::from_components(timestamp, machine_id, sequence);
        Ok(Self {
            #[cfg(feature = "cache-padded")]
            state: Arc::new(crossbeam_utils::CachePadded::new(Mutex::new(id))),
            #[cfg(not(feature = "cache-padded"))]
            state: Arc::new(Mutex::new(id)),
            time,
        })
    }

    fn state(&self) -> &Mutex<ID> {
        &self.state
    }

    /// The worker id encoded into every id this generator issues.
    ///
    /// # Errors
    ///
    /// Fails only if the lock is poisoned (std locks only).
    pub fn machine_id(&self) -> Result<u64> {
        Ok(sync::lock(self.state())?.machine_id())
    }

    /// Attempts to generate the next id without blocking.
    ///
    /// # Errors
    ///
    /// See [`SnowflakeGenerator::poll_id`].
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn poll_id(&self) -> Result<IdGenStatus<ID>> {
        let mut id = sync::lock(self.state())?;

        // Read under the lock: a caller that waited on it must not compare a
        // stale reading against a timestamp written after that reading.
        let now = self.time.current_millis();
        let current_ts = id.timestamp();

        match now.cmp(&current_ts) {
            Ordering::Equal => {
                if id.has_sequence_room() {
                    *id = id.increment_sequence();
                    Ok(IdGenStatus::Ready { id: *id })
                } else {
                    Ok(IdGenStatus::Pending { yield_for: 1 })
                }
            }
            Ordering::Greater => {
                check_timestamp::<ID>(now)?;
                *id = id.rollover_to_timestamp(now);
                Ok(IdGenStatus::Ready { id: *id })
            }
            Ordering::Less => Err(clock_behind(now, current_ts)),
        }
    }
}

impl<ID, T> Clone for LockSnowflakeGenerator<ID, T>
where
    ID: SnowflakeId,
    T: TimeSource + Clone,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            time: self.time.clone(),
        }
    }
}

impl<ID, T> SnowflakeGenerator<ID> for LockSnowflakeGenerator<ID, T>
where
    ID: SnowflakeId,
    T: TimeSource,
{
    type Clock = T;

    fn new(machine_id: u64, clock: T) -> Result<Self> {
        Self::new(machine_id, clock)
    }

    fn poll_id(&self) -> Result<IdGenStatus<ID>> {
        self.poll_id()
    }
}
