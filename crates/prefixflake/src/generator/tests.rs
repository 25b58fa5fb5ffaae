use crate::{
    BeforeEpoch, Category, DEFAULT_EPOCH, Error, Generator, IdGenStatus, PrefixflakeId,
    TimeSource, WallClock, decode,
};
use core::time::Duration;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::scope;

/// A settable clock shared between the test and the generator.
#[derive(Default)]
struct MockTime {
    millis: AtomicU64,
}

impl MockTime {
    fn at(millis: u64) -> Arc<Self> {
        Arc::new(Self {
            millis: AtomicU64::new(millis),
        })
    }

    fn set(&self, millis: u64) {
        self.millis.store(millis, Ordering::SeqCst);
    }
}

impl TimeSource<u64> for MockTime {
    fn current_millis(&self) -> u64 {
        self.millis.load(Ordering::SeqCst)
    }
}

/// Returns `base` for the first `switch_at` reads, then `base + 1`.
struct StepAfterReads {
    base: u64,
    switch_at: usize,
    reads: AtomicUsize,
}

impl TimeSource<u64> for StepAfterReads {
    fn current_millis(&self) -> u64 {
        let n = self.reads.fetch_add(1, Ordering::SeqCst);
        if n < self.switch_at {
            self.base
        } else {
            self.base + 1
        }
    }
}

/// Advances one millisecond every `reads_per_tick` reads.
struct TickingTime {
    reads: AtomicU64,
    reads_per_tick: u64,
}

impl TimeSource<u64> for TickingTime {
    fn current_millis(&self) -> u64 {
        1 + self.reads.fetch_add(1, Ordering::Relaxed) / self.reads_per_tick
    }
}

/// Plays back a fixed list of readings, repeating the last one.
struct Scripted {
    readings: Mutex<Vec<Result<u64, BeforeEpoch>>>,
}

impl Scripted {
    fn new(mut readings: Vec<Result<u64, BeforeEpoch>>) -> Arc<Self> {
        readings.reverse();
        Arc::new(Self {
            readings: Mutex::new(readings),
        })
    }
}

impl TimeSource<u64> for Scripted {
    fn current_millis(&self) -> u64 {
        self.checked_millis().unwrap_or(0)
    }

    fn checked_millis(&self) -> Result<u64, BeforeEpoch> {
        let mut readings = self.readings.lock().unwrap();
        if readings.len() > 1 {
            readings.pop().unwrap()
        } else {
            *readings.last().unwrap()
        }
    }
}

trait IdGenStatusExt {
    fn unwrap_ready(self) -> PrefixflakeId;
    fn unwrap_pending(self) -> u64;
}

impl IdGenStatusExt for IdGenStatus {
    fn unwrap_ready(self) -> PrefixflakeId {
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

#[test]
fn generators_are_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Generator>();
    assert_send_sync::<Generator<Arc<MockTime>>>();
}

#[test]
fn sequence_increments_within_same_tick() {
    let generator = Generator::with_clock(1, 2, MockTime::at(42)).unwrap();

    let id1 = generator.next_id().unwrap().id;
    let id2 = generator.next_id().unwrap().id;
    let id3 = generator.next_id().unwrap().id;

    assert_eq!(id1.timestamp(), 42);
    assert_eq!(id2.timestamp(), 42);
    assert_eq!(id3.timestamp(), 42);
    assert_eq!(id1.sequence(), 0);
    assert_eq!(id2.sequence(), 1);
    assert_eq!(id3.sequence(), 2);
    assert!(id1 < id2 && id2 < id3);
}

#[test]
fn sequence_resets_on_new_millisecond() {
    let clock = MockTime::at(42);
    let generator = Generator::with_clock(0, 0, Arc::clone(&clock)).unwrap();

    generator.next_id().unwrap();
    generator.next_id().unwrap();
    clock.set(50);
    let id = generator.next_id().unwrap().id;

    assert_eq!(id.timestamp(), 50);
    assert_eq!(id.sequence(), 0);
}

#[test]
fn identity_fields_survive_generation() {
    let clock = MockTime::at(1_000);
    for business in 0..=PrefixflakeId::max_business() {
        for system in 0..=PrefixflakeId::max_system() {
            let generator = Generator::with_clock(business, system, Arc::clone(&clock)).unwrap();
            for category in Category::ALL {
                let generated = generator.next_id_with_prefix(category).unwrap();
                let decoded = decode(generated.id);
                assert_eq!(decoded.business, business);
                assert_eq!(decoded.system, system);
                assert_eq!(decoded.category(), category);
                assert_eq!(decoded.version, 1);
                assert_eq!(decoded.sign_bit, 0);
                assert_eq!(decoded.text, generated.text);
                assert!(generated.as_i64() >= 0);
            }
        }
    }
}

#[test]
fn full_millisecond_yields_distinct_sequences() {
    let generator = Generator::with_clock(3, 4, MockTime::at(7)).unwrap();

    let mut seen = HashSet::new();
    for expected in 0..=PrefixflakeId::max_sequence() {
        let generated = generator.next_id().unwrap();
        assert_eq!(generated.id.sequence(), expected);
        assert_eq!(generated.id.timestamp(), 7);
        assert!(seen.insert(generated.id));
        assert!(seen.len() == usize::from(expected) + 1);
    }
}

#[test]
fn exhausted_sequence_waits_for_next_millisecond() {
    let clock = Arc::new(StepAfterReads {
        base: 42,
        switch_at: 130,
        reads: AtomicUsize::new(0),
    });
    let generator = Generator::with_clock(1, 1, Arc::clone(&clock)).unwrap();

    for i in 0..=PrefixflakeId::max_sequence() {
        let id = generator.next_id().unwrap().id;
        assert_eq!(id.timestamp(), 42);
        assert_eq!(id.sequence(), i);
    }

    // The 129th call wraps the sequence and spins until the clock ticks
    let id = generator.next_id().unwrap().id;
    assert_eq!(id.timestamp(), 43);
    assert_eq!(id.sequence(), 0);
    assert!(clock.reads.load(Ordering::SeqCst) > 130);
}

#[test]
fn exhausted_sequence_blocks_until_clock_advances() {
    let clock = MockTime::at(42);
    let generator = Generator::with_clock(1, 1, Arc::clone(&clock)).unwrap();
    for _ in 0..=PrefixflakeId::max_sequence() {
        generator.next_id().unwrap();
    }

    let advanced = AtomicBool::new(false);
    scope(|s| {
        let waiter = s.spawn(|| {
            let id = generator.next_id().unwrap().id;
            assert!(advanced.load(Ordering::SeqCst), "returned before the clock moved");
            id
        });

        std::thread::sleep(Duration::from_millis(20));
        advanced.store(true, Ordering::SeqCst);
        clock.set(43);

        let id = waiter.join().unwrap();
        assert_eq!(id.timestamp(), 43);
        assert_eq!(id.sequence(), 0);
    });
}

#[test]
fn clock_regression_leaves_state_untouched() {
    let clock = MockTime::at(100);
    let generator = Generator::with_clock(0, 0, Arc::clone(&clock)).unwrap();

    let first = generator.next_id().unwrap().id;
    assert_eq!((first.timestamp(), first.sequence()), (100, 0));

    clock.set(99);
    assert_eq!(
        generator.next_id(),
        Err(Error::ClockRegression { now: 99, last: 100 })
    );
    assert!(matches!(
        generator.try_poll_id(),
        Err(Error::ClockRegression { now: 99, last: 100 })
    ));

    clock.set(100);
    let next = generator.next_id().unwrap().id;
    assert_eq!((next.timestamp(), next.sequence()), (100, 1));
    assert!(next > first);
}

#[test]
fn clock_behind_epoch_is_a_regression() {
    let now_unix = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap();
    let day_ahead = u64::try_from(now_unix.as_millis()).unwrap() + 86_400_000;
    let generator = Generator::with_clock(0, 0, WallClock::with_epoch_millis(day_ahead)).unwrap();

    match generator.next_id() {
        Err(Error::ClockRegression { now, last: 0 }) => assert!(now < 0, "now = {now}"),
        other => panic!("expected a regression, got {other:?}"),
    }
    assert!(matches!(
        generator.try_poll_id(),
        Err(Error::ClockRegression { now, last: 0 }) if now < 0
    ));
}

#[test]
fn recovers_after_clock_behind_epoch() {
    let behind = Err(BeforeEpoch { millis: 5 });
    let clock = Scripted::new(vec![behind, behind, behind, Ok(500)]);
    let generator = Generator::with_clock(1, 1, Arc::clone(&clock)).unwrap();

    for _ in 0..3 {
        assert_eq!(
            generator.next_id(),
            Err(Error::ClockRegression { now: -5, last: 0 })
        );
    }

    // Nothing was issued at timestamp 0
    let id = generator.next_id().unwrap().id;
    assert_eq!((id.timestamp(), id.sequence()), (500, 0));
}

#[test]
fn exhausted_wait_fails_when_clock_falls_behind_epoch() {
    let max = PrefixflakeId::max_sequence();
    let clock = Scripted::new(vec![Ok(10), Err(BeforeEpoch { millis: 1 }), Ok(10)]);
    let generator = Generator::from_components(10, max, 0, 0, Arc::clone(&clock)).unwrap();

    assert_eq!(
        generator.next_id(),
        Err(Error::ClockRegression { now: -1, last: 10 })
    );

    // Still exhausted at 10
    generator.try_poll_id().unwrap().unwrap_pending();
}

#[test]
fn poll_returns_pending_when_sequence_exhausted() {
    let clock = MockTime::at(42);
    let generator = Generator::with_clock(2, 5, Arc::clone(&clock)).unwrap();

    for i in 0..=PrefixflakeId::max_sequence() {
        let id = generator.try_poll_id().unwrap().unwrap_ready();
        assert_eq!(id.sequence(), i);
    }

    assert_eq!(generator.try_poll_id().unwrap().unwrap_pending(), 1);
    // Pending does not consume a sequence value
    assert_eq!(generator.try_poll_id().unwrap().unwrap_pending(), 1);

    clock.set(43);
    let id = generator.try_poll_id().unwrap().unwrap_ready();
    assert_eq!(id.timestamp(), 43);
    assert_eq!(id.sequence(), 0);
}

#[test]
fn restored_state_continues_sequence() {
    let generator = Generator::from_components(50, 126, 0, 0, MockTime::at(50)).unwrap();

    let id = generator.try_poll_id().unwrap().unwrap_ready();
    assert_eq!((id.timestamp(), id.sequence()), (50, 127));
    generator.try_poll_id().unwrap().unwrap_pending();
}

#[test]
fn monotonic_under_ticking_clock() {
    let generator = Generator::with_clock(
        1,
        1,
        TickingTime {
            reads: AtomicU64::new(0),
            reads_per_tick: 50,
        },
    )
    .unwrap();

    let mut last = generator.next_id().unwrap().id;
    for _ in 0..10_000 {
        let id = generator.next_id().unwrap().id;
        if id.timestamp() == last.timestamp() {
            assert_eq!(id.sequence(), last.sequence() + 1);
        } else {
            assert!(id.timestamp() > last.timestamp());
            assert_eq!(id.sequence(), 0);
        }
        assert!(id > last);
        last = id;
    }
}

#[test]
fn unique_across_threads() {
    const IDS_PER_THREAD: usize = 4096;
    let threads = num_cpus::get().clamp(2, 8);

    let generator = Generator::with_clock(
        4,
        9,
        TickingTime {
            reads: AtomicU64::new(0),
            reads_per_tick: 200,
        },
    )
    .unwrap();
    let seen = Mutex::new(HashSet::with_capacity(threads * IDS_PER_THREAD));

    scope(|s| {
        for _ in 0..threads {
            s.spawn(|| {
                let mut last = None;
                for _ in 0..IDS_PER_THREAD {
                    let id = generator.next_id().unwrap().id;
                    // Calls on one thread are ordered by the lock
                    assert!(last < Some(id));
                    last = Some(id);
                    assert!(seen.lock().unwrap().insert(id));
                }
            });
        }
    });

    assert_eq!(seen.lock().unwrap().len(), threads * IDS_PER_THREAD);
}

#[test]
fn unique_with_wall_clock() {
    let generator = Generator::new(7, 15).unwrap().with_prefix(Category::Task);
    let mut seen = HashSet::new();
    for _ in 0..2_000 {
        let generated = generator.next_id().unwrap();
        assert!(generated.text.starts_with('T'));
        assert!(seen.insert(generated.id));
    }
}

#[test]
fn clones_share_state() {
    let clock = MockTime::at(5);
    let a = Generator::with_clock(0, 0, Arc::clone(&clock)).unwrap();
    let b = a.clone();

    assert_eq!(a.next_id().unwrap().id.sequence(), 0);
    assert_eq!(b.next_id().unwrap().id.sequence(), 1);
    assert_eq!(a.next_id().unwrap().id.sequence(), 2);
}

#[test]
fn rejects_out_of_range_identity() {
    assert_eq!(
        Generator::new(8, 0).unwrap_err(),
        Error::InvalidComponent {
            field: "business",
            value: 8,
            max: 7
        }
    );
    assert_eq!(
        Generator::new(0, 16).unwrap_err(),
        Error::InvalidComponent {
            field: "system",
            value: 16,
            max: 15
        }
    );
    assert!(Generator::from_components(0, 128, 0, 0, MockTime::at(0)).is_err());
    assert!(Generator::new(7, 15).is_ok());
}

#[test]
fn timestamp_past_field_is_rejected() {
    let clock = MockTime::at(PrefixflakeId::max_timestamp());
    let generator = Generator::with_clock(0, 0, Arc::clone(&clock)).unwrap();
    assert!(generator.next_id().is_ok());

    clock.set(PrefixflakeId::max_timestamp() + 1);
    assert_eq!(
        generator.next_id(),
        Err(Error::TimestampOverflow {
            timestamp: PrefixflakeId::max_timestamp() + 1
        })
    );
}

#[test]
fn default_prefix_is_used_by_next_id() {
    let clock = MockTime::at(9);
    let plain = Generator::with_clock(0, 0, Arc::clone(&clock)).unwrap();
    assert_eq!(plain.prefix(), Category::Default);
    assert!(plain.next_id().unwrap().text.starts_with('A'));

    let backups = Generator::with_clock(0, 0, clock).unwrap().with_prefix(Category::Backup);
    let generated = backups.next_id().unwrap();
    assert_eq!(generated.id.category(), Category::Backup);
    assert!(generated.text.starts_with('4'));
}

#[test]
fn sink_receives_trace_lines() {
    let lines = Arc::new(Mutex::new(Vec::new()));
    let captured = Arc::clone(&lines);
    let generator = Generator::with_clock(1, 1, MockTime::at(1_000))
        .unwrap()
        .with_prefix(Category::Host)
        .with_sink(move |line: core::fmt::Arguments<'_>| {
            captured.lock().unwrap().push(line.to_string());
        });

    let generated = generator.next_id().unwrap();

    let lines = lines.lock().unwrap();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "now: 1000, lastTime: 0, sequence: 0");
    assert_eq!(
        lines[1],
        "prefix: 7, version: 1, timestamp: 1000, business: 1, system: 1, sequence: 0"
    );
    assert_eq!(lines[2], format!("id: {}", generated.id));
    let binary = format!("{:b}", generated.id.to_raw());
    assert_eq!(lines[3], format!("binaryID: {binary}, len {}", binary.len()));
    // Host sets bit 60 as the highest bit
    assert_eq!(binary.len(), 61);
}

#[test]
fn binary_len_matches_formatted_width() {
    assert_eq!(super::lock::binary_len(0), 1);
    for raw in [1, 2, 3, 0x7f, 1 << 40, i64::MAX as u64, u64::MAX] {
        let width = format!("{raw:b}").len();
        assert_eq!(super::lock::binary_len(raw) as usize, width, "{raw:#x}");
    }
}

#[test]
fn generator_decode_uses_clock_epoch() {
    struct UnixEpochTime;
    impl TimeSource<u64> for UnixEpochTime {
        fn current_millis(&self) -> u64 {
            1_000
        }

        fn epoch(&self) -> Duration {
            Duration::ZERO
        }
    }

    let generator = Generator::with_clock(0, 0, UnixEpochTime).unwrap();
    let id = generator.next_id().unwrap().id;
    assert_eq!(generator.decode(id).created_time.timestamp_millis(), 1_000);
    assert_eq!(
        decode(id).created_time.timestamp_millis(),
        DEFAULT_EPOCH.as_millis() as i64 + 1_000
    );
}
