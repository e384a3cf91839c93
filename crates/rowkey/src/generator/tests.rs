use crate::{
    AtomicSnowflakeGenerator, Backoff, Error, IdGenStatus, LockSnowflakeGenerator, MonotonicClock,
    RecordId, SnowflakeGenerator, SnowflakeId, TimeSource,
};
use core::cell::Cell;
use std::collections::HashSet;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::scope;

struct MockTime {
    millis: u64,
}

impl TimeSource for MockTime {
    fn current_millis(&self) -> u64 {
        self.millis
    }
}

#[derive(Clone)]
struct SharedMockStepTime {
    clock: Rc<MockStepTime>,
}

impl TimeSource for SharedMockStepTime {
    fn current_millis(&self) -> u64 {
        self.clock.values[self.clock.index.get()]
    }
}

struct MockStepTime {
    values: Vec<u64>,
    index: Cell<usize>,
}

impl SharedMockStepTime {
    fn new(values: Vec<u64>) -> Self {
        Self {
            clock: Rc::new(MockStepTime {
                values,
                index: Cell::new(0),
            }),
        }
    }

    fn step_to(&self, index: usize) {
        self.clock.index.set(index);
    }
}

/// Advances one millisecond every `reads_per_ms` reads.
struct AdvancingTime {
    start: u64,
    reads_per_ms: u64,
    reads: AtomicU64,
}

impl TimeSource for AdvancingTime {
    fn current_millis(&self) -> u64 {
        self.start + self.reads.fetch_add(1, Ordering::Relaxed) / self.reads_per_ms
    }
}

trait IdGenStatusExt<ID: SnowflakeId> {
    fn unwrap_ready(self) -> ID;
    fn unwrap_pending(self) -> u64;
}

impl<ID: SnowflakeId> IdGenStatusExt<ID> for IdGenStatus<ID> {
    fn unwrap_ready(self) -> ID {
        match self {
            Self::Ready { id } => id,
            Self::Pending { yield_for } => {
                panic!("unexpected pending (yield for: {yield_for})")
            }
        }
    }

    fn unwrap_pending(self) -> u64 {
        match self {
            Self::Ready { id } => panic!("unexpected ready ({id})"),
            Self::Pending { yield_for } => yield_for,
        }
    }
}

fn run_id_sequence_increments_within_same_tick<G>(generator: &G)
where
    G: SnowflakeGenerator<RecordId>,
{
    let id1 = generator.poll_id().unwrap().unwrap_ready();
    let id2 = generator.poll_id().unwrap().unwrap_ready();
    let id3 = generator.poll_id().unwrap().unwrap_ready();

    assert_eq!((id1.timestamp(), id1.machine_id(), id1.sequence()), (42, 7, 0));
    assert_eq!((id2.timestamp(), id2.machine_id(), id2.sequence()), (42, 7, 1));
    assert_eq!((id3.timestamp(), id3.machine_id(), id3.sequence()), (42, 7, 2));
    assert!(id1 < id2 && id2 < id3);
}

fn run_first_reading_at_epoch_continues_tick_zero<G>(generator: &G)
where
    G: SnowflakeGenerator<RecordId>,
{
    let first = generator.poll_id().unwrap().unwrap_ready();
    let second = generator.poll_id().unwrap().unwrap_ready();

    assert_eq!((first.timestamp(), first.machine_id(), first.sequence()), (0, 7, 1));
    assert_eq!((second.timestamp(), second.machine_id(), second.sequence()), (0, 7, 2));
}

fn run_generator_returns_pending_when_sequence_exhausted<G>(generator: &G)
where
    G: SnowflakeGenerator<RecordId>,
{
    let yield_for = generator.poll_id().unwrap().unwrap_pending();
    assert_eq!(yield_for, 1);
}

fn run_generator_handles_rollover<G>(generator: &G, shared_time: &SharedMockStepTime)
where
    G: SnowflakeGenerator<RecordId>,
{
    for i in 0..=RecordId::max_sequence() {
        let id = generator.poll_id().unwrap().unwrap_ready();
        assert_eq!(id.sequence(), i);
        assert_eq!(id.timestamp(), 42);
    }

    let yield_for = generator.poll_id().unwrap().unwrap_pending();
    assert_eq!(yield_for, 1);

    shared_time.step_to(1);

    let id = generator.poll_id().unwrap().unwrap_ready();
    assert_eq!(id.timestamp(), 43);
    assert_eq!(id.sequence(), 0);
}

fn run_generator_rejects_clock_regression<G>(generator: &G, shared_time: &SharedMockStepTime)
where
    G: SnowflakeGenerator<RecordId>,
{
    let first = generator.poll_id().unwrap().unwrap_ready();
    assert_eq!((first.timestamp(), first.sequence()), (42, 0));

    shared_time.step_to(1);
    assert_eq!(
        generator.poll_id(),
        Err(Error::ClockRegression { now: 41, last: 42 })
    );
    assert_eq!(
        generator.next_id(Backoff::Spin),
        Err(Error::ClockRegression { now: 41, last: 42 })
    );

    // The failed calls left the state alone: the sequence resumes at 1.
    shared_time.step_to(2);
    let resumed = generator.poll_id().unwrap().unwrap_ready();
    assert_eq!((resumed.timestamp(), resumed.sequence()), (42, 1));
}

fn run_next_id_waits_for_next_tick<G>(generator: &G)
where
    G: SnowflakeGenerator<RecordId>,
{
    let id = generator.next_id(Backoff::Spin).unwrap();
    assert_eq!(id.timestamp(), 43);
    assert_eq!(id.machine_id(), 1);
    assert_eq!(id.sequence(), 0);
}

fn run_generator_monotonic<G>(generator: &G)
where
    G: SnowflakeGenerator<RecordId>,
{
    const TOTAL_IDS: usize = 4096 * 32;

    let mut last_timestamp = 0;
    let mut sequence = 0;
    let mut last_id: Option<RecordId> = None;

    for _ in 0..TOTAL_IDS {
        let id = generator.next_id(Backoff::Spin).unwrap();
        let ts = id.timestamp();
        if ts > last_timestamp {
            sequence = 0;
        }

        assert!(ts >= last_timestamp);
        assert_eq!(id.machine_id(), 1);
        assert_eq!(id.sequence(), sequence);
        if let Some(prev) = last_id {
            assert!(id > prev);
        }

        last_timestamp = ts;
        last_id = Some(id);
        sequence += 1;
    }
}

fn run_generator_unique_threaded<G>(generator: &G)
where
    G: SnowflakeGenerator<RecordId> + Sync,
{
    const IDS_PER_THREAD: usize = 4096 * 8;
    let threads = num_cpus::get().clamp(2, 16);

    let per_thread: Vec<Vec<RecordId>> = scope(|s| {
        let handles: Vec<_> = (0..threads)
            .map(|_| {
                s.spawn(|| {
                    (0..IDS_PER_THREAD)
                        .map(|_| generator.next_id(Backoff::Yield).unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let mut seen = HashSet::with_capacity(threads * IDS_PER_THREAD);
    for ids in &per_thread {
        // Each caller sees strictly increasing ids from a shared generator.
        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
        for id in ids {
            assert!(seen.insert(*id), "duplicate id {id:?}");
        }
    }
    assert_eq!(seen.len(), threads * IDS_PER_THREAD);
}

#[test]
fn lock_generator_sequence_test() {
    let generator: LockSnowflakeGenerator<RecordId, _> =
        LockSnowflakeGenerator::new(7, MockTime { millis: 42 }).unwrap();
    run_id_sequence_increments_within_same_tick(&generator);
}

#[test]
fn atomic_generator_sequence_test() {
    let generator: AtomicSnowflakeGenerator<RecordId, _> =
        AtomicSnowflakeGenerator::new(7, MockTime { millis: 42 }).unwrap();
    run_id_sequence_increments_within_same_tick(&generator);
}

#[test]
fn lock_generator_first_tick_at_epoch() {
    let generator: LockSnowflakeGenerator<RecordId, _> =
        LockSnowflakeGenerator::new(7, MockTime { millis: 0 }).unwrap();
    run_first_reading_at_epoch_continues_tick_zero(&generator);
}

#[test]
fn atomic_generator_first_tick_at_epoch() {
    let generator: AtomicSnowflakeGenerator<RecordId, _> =
        AtomicSnowflakeGenerator::new(7, MockTime { millis: 0 }).unwrap();
    run_first_reading_at_epoch_continues_tick_zero(&generator);
}

#[test]
fn worker_seven_scenario_across_a_tick() {
    let time = SharedMockStepTime::new(vec![42, 43]);
    let generator: LockSnowflakeGenerator<RecordId, _> =
        LockSnowflakeGenerator::new(7, time.clone()).unwrap();

    run_id_sequence_increments_within_same_tick(&generator);

    time.step_to(1);
    let id = generator.next_id(Backoff::Spin).unwrap();
    assert_eq!((id.timestamp(), id.machine_id(), id.sequence()), (43, 7, 0));
}

#[test]
fn lock_generator_pending_test() {
    let generator: LockSnowflakeGenerator<RecordId, _> = LockSnowflakeGenerator::from_components(
        42,
        0,
        RecordId::max_sequence(),
        MockTime { millis: 42 },
    )
    .unwrap();
    run_generator_returns_pending_when_sequence_exhausted(&generator);
}

#[test]
fn atomic_generator_pending_test() {
    let generator: AtomicSnowflakeGenerator<RecordId, _> =
        AtomicSnowflakeGenerator::from_components(
            42,
            0,
            RecordId::max_sequence(),
            MockTime { millis: 42 },
        )
        .unwrap();
    run_generator_returns_pending_when_sequence_exhausted(&generator);
}

#[test]
fn lock_generator_rollover_test() {
    let shared_time = SharedMockStepTime::new(vec![42, 43]);
    let generator: LockSnowflakeGenerator<RecordId, _> =
        LockSnowflakeGenerator::new(1, shared_time.clone()).unwrap();
    run_generator_handles_rollover(&generator, &shared_time);
}

#[test]
fn atomic_generator_rollover_test() {
    let shared_time = SharedMockStepTime::new(vec![42, 43]);
    let generator: AtomicSnowflakeGenerator<RecordId, _> =
        AtomicSnowflakeGenerator::new(1, shared_time.clone()).unwrap();
    run_generator_handles_rollover(&generator, &shared_time);
}

#[test]
fn lock_generator_clock_regression_test() {
    let shared_time = SharedMockStepTime::new(vec![42, 41, 42]);
    let generator: LockSnowflakeGenerator<RecordId, _> =
        LockSnowflakeGenerator::new(3, shared_time.clone()).unwrap();
    run_generator_rejects_clock_regression(&generator, &shared_time);
}

#[test]
fn atomic_generator_clock_regression_test() {
    let shared_time = SharedMockStepTime::new(vec![42, 41, 42]);
    let generator: AtomicSnowflakeGenerator<RecordId, _> =
        AtomicSnowflakeGenerator::new(3, shared_time.clone()).unwrap();
    run_generator_rejects_clock_regression(&generator, &shared_time);
}

#[test]
fn lock_generator_blocks_until_next_tick() {
    let time = AdvancingTime {
        start: 42,
        reads_per_ms: 5,
        reads: AtomicU64::new(0),
    };
    let generator: LockSnowflakeGenerator<RecordId, _> =
        LockSnowflakeGenerator::from_components(42, 1, RecordId::max_sequence(), &time).unwrap();
    run_next_id_waits_for_next_tick(&generator);
    assert!(time.reads.load(Ordering::Relaxed) > 1);
}

#[test]
fn atomic_generator_blocks_until_next_tick() {
    let time = AdvancingTime {
        start: 42,
        reads_per_ms: 5,
        reads: AtomicU64::new(0),
    };
    let generator: AtomicSnowflakeGenerator<RecordId, _> =
        AtomicSnowflakeGenerator::from_components(42, 1, RecordId::max_sequence(), &time)
            .unwrap();
    run_next_id_waits_for_next_tick(&generator);
    assert!(time.reads.load(Ordering::Relaxed) > 1);
}

#[test]
fn rejects_out_of_range_machine_id() {
    let max = RecordId::max_machine_id();
    let err = LockSnowflakeGenerator::<RecordId, _>::new(max + 1, MockTime { millis: 0 })
        .err()
        .unwrap();
    assert_eq!(
        err,
        Error::MachineIdOutOfRange {
            machine_id: max + 1,
            max
        }
    );
    assert!(AtomicSnowflakeGenerator::<RecordId, _>::new(max + 1, MockTime { millis: 0 }).is_err());
    assert!(AtomicSnowflakeGenerator::<RecordId, _>::new(max, MockTime { millis: 0 }).is_ok());
}

#[test]
fn rejects_timestamp_past_layout() {
    let max = RecordId::max_timestamp();
    let generator =
        LockSnowflakeGenerator::<RecordId, _>::new(0, MockTime { millis: max + 1 }).unwrap();
    assert_eq!(
        generator.poll_id(),
        Err(Error::TimestampOverflow { now: max + 1, max })
    );
}

#[test]
fn cloned_lock_generator_shares_sequence() {
    let generator =
        LockSnowflakeGenerator::<RecordId, _>::new(2, std::sync::Arc::new(MockTime { millis: 9 }))
            .unwrap();
    let clone = generator.clone();
    let a = generator.poll_id().unwrap().unwrap_ready();
    let b = clone.poll_id().unwrap().unwrap_ready();
    assert_eq!((a.sequence(), b.sequence()), (0, 1));
    assert_eq!(clone.machine_id().unwrap(), 2);
}

#[test]
fn lock_generator_monotonic_clock_sequence_increments() {
    let generator: LockSnowflakeGenerator<RecordId, _> =
        LockSnowflakeGenerator::new(1, MonotonicClock::default()).unwrap();
    run_generator_monotonic(&generator);
}

#[test]
fn atomic_generator_monotonic_clock_sequence_increments() {
    let generator: AtomicSnowflakeGenerator<RecordId, _> =
        AtomicSnowflakeGenerator::new(1, MonotonicClock::default()).unwrap();
    run_generator_monotonic(&generator);
}

#[test]
fn lock_generator_threaded_unique() {
    let generator: LockSnowflakeGenerator<RecordId, _> =
        LockSnowflakeGenerator::new(0, MonotonicClock::default()).unwrap();
    run_generator_unique_threaded(&generator);
}

#[test]
fn atomic_generator_threaded_unique() {
    let generator: AtomicSnowflakeGenerator<RecordId, _> =
        AtomicSnowflakeGenerator::new(0, MonotonicClock::default()).unwrap();
    run_generator_unique_threaded(&generator);
}
