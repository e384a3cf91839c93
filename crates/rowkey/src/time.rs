use std::{
    sync::{
        Arc, OnceLock,
        atomic::{AtomicU64, Ordering},
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant, SystemTime, UNIX_EPOCH},
};

/// Default epoch for a1stream record ids: Monday, January 1, 2024 00:00:00 UTC
pub const DEFAULT_EPOCH: Duration = Duration::from_millis(1_704_067_200_000);

/// Twitter epoch: Thursday, November 4, 2010 1:42:54.657 UTC
pub const TWITTER_EPOCH: Duration = Duration::from_millis(1_288_834_974_657);

/// A trait for time sources that return a wall-clock or monotonic timestamp.
///
/// This abstraction allows you to plug in the real system clock, a monotonic
/// timer, or a mocked time source in tests. The unit is **milliseconds**
/// relative to the source's epoch.
///
/// # Example
///
/// ```
/// use rowkey::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1234
///     }
/// }
///
/// assert_eq!(FixedTime.current_millis(), 1234);
/// ```
pub trait TimeSource {
    /// Returns the current time in milliseconds since the configured epoch.
    fn current_millis(&self) -> u64;
}

impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

/// A wall-clock time source that reads [`SystemTime::now`] on every call.
///
/// This clock follows every adjustment made to the host clock, including
/// backward steps from NTP corrections. Generators detect such steps and
/// refuse to issue ids rather than risk a collision.
///
/// Times earlier than the epoch are reported as `0`.
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    epoch: Duration,
}

impl Default for SystemClock {
    /// Constructs a wall clock aligned to [`DEFAULT_EPOCH`].
    fn default() -> Self {
        Self::with_epoch(DEFAULT_EPOCH)
    }
}

impl SystemClock {
    /// Constructs a wall clock whose zero point is `epoch`, given as a
    /// [`Duration`] since 1970-01-01 UTC.
    pub const fn with_epoch(epoch: Duration) -> Self {
        Self { epoch }
    }

    /// The epoch this clock counts from.
    pub const fn epoch(&self) -> Duration {
        self.epoch
    }
}

impl TimeSource for SystemClock {
    fn current_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .ok()
            .and_then(|now| now.checked_sub(self.epoch))
            .map_or(0, |elapsed| {
                u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
            })
    }
}

/// Shared ticker thread that updates every millisecond.
#[derive(Debug)]
struct SharedTickerInner {
    current: AtomicU64,
    _handle: OnceLock<JoinHandle<()>>,
}

/// A monotonic time source that returns elapsed time since construction,
/// offset from a user-defined epoch.
///
/// This avoids wall-clock adjustments (e.g., NTP corrections) while still
/// aligning timestamps to a fixed origin, so a generator driven by it never
/// observes a clock regression. The tradeoff is drift: ids from a long-lived
/// process slowly diverge from wall-clock time.
///
/// A background thread advances a shared atomic counter once per millisecond
/// and exits when the last clone is dropped.
#[derive(Clone, Debug)]
pub struct MonotonicClock {
    inner: Arc<SharedTickerInner>,
    epoch_offset: u64, // in milliseconds
}

impl Default for MonotonicClock {
    /// Constructs a monotonic clock aligned to [`DEFAULT_EPOCH`].
    fn default() -> Self {
        Self::with_epoch(DEFAULT_EPOCH)
    }
}

impl MonotonicClock {
    /// Constructs a monotonic clock using `epoch` as the origin (t = 0),
    /// specified as a [`Duration`] since 1970-01-01 UTC.
    ///
    /// The offset between the wall clock and the epoch is captured once, at
    /// construction. If the host clock is earlier than the epoch the offset
    /// is zero.
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::Duration;
    /// use rowkey::{MonotonicClock, TimeSource, DEFAULT_EPOCH};
    ///
    /// let clock = MonotonicClock::with_epoch(DEFAULT_EPOCH);
    /// let before = clock.current_millis();
    /// std::thread::sleep(Duration::from_millis(5));
    /// assert!(clock.current_millis() >= before);
    /// ```
    pub fn with_epoch(epoch: Duration) -> Self {
        let start = Instant::now();
        let offset = SystemClock::with_epoch(epoch).current_millis();

        let inner = Arc::new(SharedTickerInner {
            current: AtomicU64::new(0),
            _handle: OnceLock::new(),
        });

        let weak_inner = Arc::downgrade(&inner);
        let handle = thread::spawn(move || {
            let mut tick = 0;

            loop {
                let Some(inner_ref) = weak_inner.upgrade() else {
                    break;
                };

                // Absolute target time of the next tick
                let target = start + Duration::from_millis(tick);

                let now = Instant::now();
                if now < target {
                    thread::sleep(target - now);
                }

                let now_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                inner_ref.current.store(now_ms, Ordering::Relaxed);

                tick = now_ms + 1;
            }
        });

        // Freshly created, so the cell is always empty here.
        let _ = inner._handle.set(handle);

        Self {
            inner,
            epoch_offset: offset,
        }
    }
}

impl TimeSource for MonotonicClock {
    /// Returns the number of milliseconds since the configured epoch, based on
    /// the elapsed monotonic time since construction.
    fn current_millis(&self) -> u64 {
        self.epoch_offset + self.inner.current.load(Ordering::Relaxed)
    }
}
