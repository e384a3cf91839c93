use core::{fmt, str::FromStr, time::Duration};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::{
    error::{Error, Result},
    generator::{Allocator, AtomicSnowflakeGenerator, Backoff, LockSnowflakeGenerator},
    id::{RecordId, SnowflakeId},
    time::{DEFAULT_EPOCH, MonotonicClock, SystemClock, TimeSource},
};

/// Which [`TimeSource`] a configured generator reads.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ClockKind {
    /// [`SystemClock`]: follows the host clock, including backward steps.
    #[default]
    System,
    /// [`MonotonicClock`]: never moves backward but drifts from wall time.
    Monotonic,
}

impl fmt::Display for ClockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::System => "system",
            Self::Monotonic => "monotonic",
        })
    }
}

impl FromStr for ClockKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "system" => Ok(Self::System),
            "monotonic" => Ok(Self::Monotonic),
            other => Err(format!(
                "unknown clock `{other}` (expected system or monotonic)"
            )),
        }
    }
}

/// A clock chosen at runtime from a [`ClockKind`].
#[derive(Clone, Debug)]
pub enum ConfiguredClock {
    System(SystemClock),
    Monotonic(MonotonicClock),
}

impl TimeSource for ConfiguredClock {
    fn current_millis(&self) -> u64 {
        match self {
            Self::System(clock) => clock.current_millis(),
            Self::Monotonic(clock) => clock.current_millis(),
        }
    }
}

/// Everything needed to stand up an id generator for one worker.
///
/// The worker id must be unique among all running generators that write to
/// the same tables. Nothing here checks that; it is the deployment's job.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub worker_id: u64,
    /// Zero point of the timestamp field, as a [`Duration`] since the Unix
    /// epoch.
    pub epoch: Duration,
    pub backoff: Backoff,
    pub clock: ClockKind,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            worker_id: 0,
            epoch: DEFAULT_EPOCH,
            backoff: Backoff::default(),
            clock: ClockKind::default(),
        }
    }
}

impl GeneratorConfig {
    pub fn new(worker_id: u64) -> Self {
        Self {
            worker_id,
            ..Self::default()
        }
    }

    /// Checks the worker id against the [`RecordId`] layout and the epoch
    /// against the wall clock.
    ///
    /// # Errors
    ///
    /// - [`Error::MachineIdOutOfRange`] if the worker id does not fit.
    /// - [`Error::EpochInFuture`] if the epoch has not been reached yet.
    pub fn validate(&self) -> Result<()> {
        let max = RecordId::max_machine_id();
        if self.worker_id > max {
            return Err(Error::MachineIdOutOfRange {
                machine_id: self.worker_id,
                max,
            });
        }

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        if self.epoch > now {
            return Err(Error::EpochInFuture {
                epoch_ms: as_millis(self.epoch),
                now_ms: as_millis(now),
            });
        }
        Ok(())
    }

    /// Constructs the configured clock.
    pub fn clock(&self) -> ConfiguredClock {
        match self.clock {
            ClockKind::System => ConfiguredClock::System(SystemClock::with_epoch(self.epoch)),
            ClockKind::Monotonic => {
                ConfiguredClock::Monotonic(MonotonicClock::with_epoch(self.epoch))
            }
        }
    }

    /// Builds a [`LockSnowflakeGenerator`] wrapped in an [`Allocator`].
    ///
    /// # Errors
    ///
    /// Any [`GeneratorConfig::validate`] failure.
    pub fn build_lock_generator(
        &self,
    ) -> Result<Allocator<LockSnowflakeGenerator<RecordId, ConfiguredClock>>> {
        self.validate()?;
        let generator = LockSnowflakeGenerator::new(self.worker_id, self.clock())?;
        Ok(Allocator::new(generator, self.backoff))
    }

    /// Builds an [`AtomicSnowflakeGenerator`] wrapped in an [`Allocator`].
    ///
    /// # Errors
    ///
    /// Any [`GeneratorConfig::validate`] failure.
    pub fn build_atomic_generator(
        &self,
    ) -> Result<Allocator<AtomicSnowflakeGenerator<RecordId, ConfiguredClock>>> {
        self.validate()?;
        let generator = AtomicSnowflakeGenerator::new(self.worker_id, self.clock())?;
        Ok(Allocator::new(generator, self.backoff))
    }
}

fn as_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
