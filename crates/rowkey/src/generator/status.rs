use crate::id::SnowflakeId;

/// Represents the result of polling a generator for a new id.
///
/// - [`IdGenStatus::Ready`] indicates a new id was successfully generated.
/// - [`IdGenStatus::Pending`] means the generator cannot produce an id right
///   now and the caller should back off for `yield_for` milliseconds.
///
/// Clock regression is not a pending state: it is reported as
/// [`Error::ClockRegression`] because waiting it out is the caller's decision.
///
/// # Example
///
/// ```
/// use rowkey::{IdGenStatus, LockSnowflakeGenerator, RecordId, SnowflakeId, TimeSource};
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1
///     }
/// }
///
/// let generator = LockSnowflakeGenerator::<RecordId, _>::from_components(
///     1,
///     0,
///     RecordId::max_sequence(),
///     FixedTime,
/// )
/// .unwrap();
/// match generator.poll_id().unwrap() {
///     IdGenStatus::Ready { id } => println!("id: {id}"),
///     IdGenStatus::Pending { yield_for } => println!("back off for {yield_for}ms"),
/// }
/// ```
///
/// [`Error::ClockRegression`]: crate::Error::ClockRegression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdGenStatus<ID: SnowflakeId> {
    /// A unique id was generated and is ready to use.
    Ready {
        /// The generated id.
        id: ID,
    },
    /// No id could be generated. Either the sequence is exhausted for the
    /// current millisecond (`yield_for == 1`) or a concurrent caller won the
    /// race for the same slot (`yield_for == 0`, retry immediately).
    Pending {
        /// Milliseconds to wait before polling again.
        yield_for: u64,
    },
}
