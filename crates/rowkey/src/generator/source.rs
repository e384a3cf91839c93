use std::sync::Arc;

use crate::{
    error::Result,
    generator::{Backoff, SnowflakeGenerator},
    id::RecordId,
};

/// Anything that can hand out a fresh [`RecordId`].
///
/// Record builders depend on this trait rather than on a concrete generator,
/// so id allocation can be swapped for a fixed sequence in tests. It is object
/// safe; builders take `&dyn IdSource`.
pub trait IdSource {
    /// Allocates the next record id, blocking briefly if the current
    /// millisecond is exhausted.
    ///
    /// # Errors
    ///
    /// Propagates generator errors such as
    /// [`Error::ClockRegression`](crate::Error::ClockRegression).
    fn allocate(&self) -> Result<RecordId>;
}

impl<S: IdSource + ?Sized> IdSource for &S {
    fn allocate(&self) -> Result<RecordId> {
        (**self).allocate()
    }
}

impl<S: IdSource + ?Sized> IdSource for Arc<S> {
    fn allocate(&self) -> Result<RecordId> {
        (**self).allocate()
    }
}

/// Pairs a generator with the [`Backoff`] used while it is pending, turning
/// it into an [`IdSource`].
///
/// # Example
///
/// ```
/// use rowkey::{Allocator, Backoff, IdSource, LockSnowflakeGenerator, RecordId, SystemClock};
///
/// let generator = LockSnowflakeGenerator::<RecordId, _>::new(7, SystemClock::default()).unwrap();
/// let ids = Allocator::new(generator, Backoff::Yield);
/// assert_eq!(ids.allocate().unwrap().machine_id(), 7);
/// ```
#[derive(Clone)]
pub struct Allocator<G> {
    generator: G,
    backoff: Backoff,
}

impl<G> Allocator<G>
where
    G: SnowflakeGenerator<RecordId>,
{
    /// Wraps `generator`, waiting with `backoff` on exhausted milliseconds.
    pub const fn new(generator: G, backoff: Backoff) -> Self {
        Self { generator, backoff }
    }

    /// The wrapped generator.
    pub const fn generator(&self) -> &G {
        &self.generator
    }

    /// The configured backoff strategy.
    pub const fn backoff(&self) -> Backoff {
        self.backoff
    }
}

impl<G> IdSource for Allocator<G>
where
    G: SnowflakeGenerator<RecordId>,
{
    fn allocate(&self) -> Result<RecordId> {
        self.generator.next_id(self.backoff)
    }
}
