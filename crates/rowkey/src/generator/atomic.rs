use core::{cmp, marker::PhantomData};

use portable_atomic::{AtomicU64, Ordering};
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    error::Result,
    generator::{
        IdGenStatus, SnowflakeGenerator,
        interface::{check_machine_id, check_timestamp, clock_behind},
    },
    id::SnowflakeId,
    time::TimeSource,
};

/// A lock-free Snowflake id generator suitable for multi-threaded
/// environments.
///
/// The last issued id is stored in an [`AtomicU64`] and replaced with a
/// compare-and-swap. A caller that loses the race gets
/// [`IdGenStatus::Pending`] with `yield_for == 0` and retries; it never
/// reuses the winner's sequence value.
///
/// ## Recommended When
/// - You're in a multi-threaded environment
/// - Fair access is sacrificed for higher throughput
///
/// ## See Also
/// - [`LockSnowflakeGenerator`]
///
/// [`LockSnowflakeGenerator`]: crate::LockSnowflakeGenerator
pub struct AtomicSnowflakeGenerator<ID, T>
where
    ID: SnowflakeId,
    T: TimeSource,
{
    #[cfg(feature = "cache-padded")]
    state: crossbeam_utils::CachePadded<AtomicU64>,
    #[cfg(not(feature = "cache-padded"))]
    state: AtomicU64,
    time: T,
    _id: PhantomData<ID>,
}

impl<ID, T> AtomicSnowflakeGenerator<ID, T>
where
    ID: SnowflakeId,
    T: TimeSource,
{
    /// Creates a new [`AtomicSnowflakeGenerator`] for the given worker id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MachineIdOutOfRange`] if `machine_id` does not fit the
    /// layout.
    ///
    /// # Example
    /// ```
    /// use rowkey::{AtomicSnowflakeGenerator, Backoff, MonotonicClock, RecordId, SnowflakeGenerator};
    ///
    /// let generator =
    ///     AtomicSnowflakeGenerator::<RecordId, _>::new(3, MonotonicClock::default()).unwrap();
    /// let first = generator.next_id(Backoff::Spin).unwrap();
    /// let second = generator.next_id(Backoff::Spin).unwrap();
    /// assert!(first < second);
    /// ```
    ///
    /// [`Error::MachineIdOutOfRange`]: crate::Error::MachineIdOutOfRange
    pub fn new(machine_id: u64, time: T) -> Result<Self> {
        Self::from_components(0, machine_id, 0, time)
    }

    /// Creates a new generator from explicit component values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MachineIdOutOfRange`] if `machine_id` does not fit the
    /// layout.
    ///
    /// [`Error::MachineIdOutOfRange`]: crate::Error::MachineIdOutOfRange
    pub fn from_components(timestamp: u64, machine_id: u64, sequence: u64, time: T) -> Result<Self> {
        check_machine_id::<ID>(machine_id)?;
        let initial = ID::from_components(timestamp, machine_id, sequence).to_raw();
        Ok(Self {
            #[cfg(feature = "cache-padded")]
            state: crossbeam_utils::CachePadded::new(AtomicU64::new(initial)),
            #[cfg(not(feature = "cache-padded"))]
            state: AtomicU64::new(initial),
            time,
            _id: PhantomData,
        })
    }

    /// The worker id encoded into every id this generator issues.
    pub fn machine_id(&self) -> u64 {
        ID::from_raw(self.state.load(Ordering::Relaxed)).machine_id()
    }

    /// Attempts to generate the next id without blocking.
    ///
    /// # Errors
    ///
    /// See [`SnowflakeGenerator::poll_id`].
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn poll_id(&self) -> Result<IdGenStatus<ID>> {
        let current_raw = self.state.load(Ordering::Acquire);
        // Read the clock only after observing the state, so any timestamp a
        // concurrent caller stored before our load is not ahead of `now`.
        let now = self.time.current_millis();

        let current_id = ID::from_raw(current_raw);
        let current_ts = current_id.timestamp();

        let next_id = match now.cmp(&current_ts) {
            cmp::Ordering::Equal => {
                if current_id.has_sequence_room() {
                    current_id.increment_sequence()
                } else {
                    return Ok(IdGenStatus::Pending { yield_for: 1 });
                }
            }
            cmp::Ordering::Greater => {
                check_timestamp::<ID>(now)?;
                current_id.rollover_to_timestamp(now)
            }
            cmp::Ordering::Less => return Err(clock_behind(now, current_ts)),
        };

        let next_raw = next_id.to_raw();

        if self
            .state
            .compare_exchange(current_raw, next_raw, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            Ok(IdGenStatus::Ready { id: next_id })
        } else {
            // Another caller won the slot; retry immediately.
            Ok(IdGenStatus::Pending { yield_for: 0 })
        }
    }
}

impl<ID, T> SnowflakeGenerator<ID> for AtomicSnowflakeGenerator<ID, T>
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
