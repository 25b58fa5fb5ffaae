use crate::{
    Category, DecodedId, Error, GeneratedId, IdGenStatus, Mutex, MutexGuard, NoopSink,
    PrefixflakeId, Result, TimeSource, TraceSink, WallClock, decode_with_epoch,
};
use core::fmt;
use std::sync::Arc;
#[cfg(feature = "tracing")]
use tracing::instrument;

/// Spins between clock reads before yielding the thread while waiting for
/// the next millisecond.
const SPINS_BEFORE_YIELD: u32 = 64;

/// Mutable generator state, guarded by the generator lock.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct State {
    last_time: u64,
    sequence: u8,
}

/// A lock-based prefixed Snowflake ID generator, safe to share across
/// threads.
///
/// Each generator owns a fixed `business` line and `system` ID. The lock
/// covers the clock read, the comparison with the last timestamp, the wait
/// for the next millisecond when the sequence is exhausted, and the state
/// update, so concurrent callers on one generator are fully serialized.
///
/// - Up to 128 IDs per millisecond. The 129th call in one millisecond spins
///   (holding the lock) until the clock advances, then continues at sequence
///   0.
/// - A clock that moves backwards yields [`Error::ClockRegression`] and
///   leaves the state untouched.
///
/// Cloning a generator shares its state.
///
/// # Example
///
/// ```
/// use prefixflake::{Category, Generator, decode};
///
/// let generator = Generator::new(1, 1)?.with_prefix(Category::Host);
/// let generated = generator.next_id()?;
///
/// assert_eq!(generated.text.len(), 13);
/// assert!(generated.text.starts_with('H'));
///
/// let decoded = decode(generated.id);
/// assert_eq!(decoded.business, 1);
/// assert_eq!(decoded.system, 1);
/// assert_eq!(decoded.version, 1);
/// # Ok::<(), prefixflake::Error>(())
/// ```
pub struct Generator<T = WallClock>
where
    T: TimeSource<u64>,
{
    #[cfg(feature = "cache-padded")]
    state: Arc<crossbeam_utils::CachePadded<Mutex<State>>>,
    #[cfg(not(feature = "cache-padded"))]
    state: Arc<Mutex<State>>,
    clock: T,
    prefix: Category,
    business: u8,
    system: u8,
    sink: Arc<dyn TraceSink>,
}

impl Generator<WallClock> {
    /// Creates a generator reading the system wall clock against
    /// [`DEFAULT_EPOCH`].
    ///
    /// # Errors
    ///
    /// [`Error::InvalidComponent`] if `business > 7` or `system > 15`.
    ///
    /// [`DEFAULT_EPOCH`]: crate::DEFAULT_EPOCH
    pub fn new(business: u8, system: u8) -> Result<Self> {
        Self::with_clock(business, system, WallClock::default())
    }
}

impl<T> Generator<T>
where
    T: TimeSource<u64>,
{
    /// Creates a generator with an explicit time source, which also fixes the
    /// epoch.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidComponent`] if `business > 7` or `system > 15`.
    pub fn with_clock(business: u8, system: u8, clock: T) -> Result<Self> {
        Self::from_components(0, 0, business, system, clock)
    }

    /// Creates a generator preloaded with a last timestamp and sequence.
    ///
    /// This constructor is primarily useful for advanced use cases such as
    /// restoring state from persistent storage. Prefer [`Self::with_clock`].
    ///
    /// # Errors
    ///
    /// [`Error::InvalidComponent`] if any component exceeds its field.
    pub fn from_components(
        last_time: u64,
        sequence: u8,
        business: u8,
        system: u8,
        clock: T,
    ) -> Result<Self> {
        check_component("business", business.into(), PrefixflakeId::BUSINESS_MASK)?;
        check_component("system", system.into(), PrefixflakeId::SYSTEM_MASK)?;
        check_component("timestamp", last_time, PrefixflakeId::TIMESTAMP_MASK)?;
        check_component("sequence", sequence.into(), PrefixflakeId::SEQUENCE_MASK)?;

        let state = Mutex::new(State {
            last_time,
            sequence,
        });
        Ok(Self {
            #[cfg(feature = "cache-padded")]
            state: Arc::new(crossbeam_utils::CachePadded::new(state)),
            #[cfg(not(feature = "cache-padded"))]
            state: Arc::new(state),
            clock,
            prefix: Category::default(),
            business,
            system,
            sink: Arc::new(NoopSink),
        })
    }

    /// Sets the category used by [`Self::next_id`].
    #[must_use]
    pub fn with_prefix(mut self, prefix: Category) -> Self {
        self.prefix = prefix;
        self
    }

    /// Sets the sink receiving per-call diagnostic lines.
    #[must_use]
    pub fn with_sink(mut self, sink: impl TraceSink + 'static) -> Self {
        self.sink = Arc::new(sink);
        self
    }

    #[must_use]
    pub const fn prefix(&self) -> Category {
        self.prefix
    }

    #[must_use]
    pub const fn business(&self) -> u8 {
        self.business
    }

    #[must_use]
    pub const fn system(&self) -> u8 {
        self.system
    }

    #[must_use]
    pub const fn clock(&self) -> &T {
        &self.clock
    }

    /// Unpacks an ID against this generator's epoch.
    #[must_use]
    pub fn decode(&self, id: impl Into<PrefixflakeId>) -> DecodedId {
        decode_with_epoch(id, self.clock.epoch())
    }

    /// Generates the next ID using the generator's default prefix.
    ///
    /// # Errors
    ///
    /// See [`Self::next_id_with_prefix`].
    pub fn next_id(&self) -> Result<GeneratedId> {
        self.next_id_with_prefix(self.prefix)
    }

    /// Generates the next ID with the given prefix.
    ///
    /// Blocks, spinning while holding the lock, when 128 IDs were already
    /// issued in the current millisecond.
    ///
    /// # Errors
    ///
    /// - [`Error::ClockRegression`] if the clock is behind the last emitted
    ///   timestamp. State is unchanged.
    /// - [`Error::TimestampOverflow`] if the clock is past the 42-bit range.
    /// - [`Error::LockPoisoned`] if another thread panicked while generating.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn next_id_with_prefix(&self, prefix: Category) -> Result<GeneratedId> {
        let mut state = self.lock()?;
        let mut now = self.current_millis(&state)?;

        let sequence = if now == state.last_time {
            let sequence = state.sequence.wrapping_add(1) & PrefixflakeId::max_sequence();
            if sequence == 0 {
                now = self.wait_next_millis(state.last_time)?;
            }
            sequence
        } else {
            0
        };

        self.sink.trace(format_args!(
            "now: {now}, lastTime: {}, sequence: {sequence}",
            state.last_time
        ));
        *state = State {
            last_time: now,
            sequence,
        };
        drop(state);

        Ok(GeneratedId::new(self.pack(prefix, now, sequence)))
    }

    /// Non-blocking variant of [`Self::next_id`].
    ///
    /// # Errors
    ///
    /// See [`Self::try_poll_id_with_prefix`].
    pub fn try_poll_id(&self) -> Result<IdGenStatus> {
        self.try_poll_id_with_prefix(self.prefix)
    }

    /// Attempts to generate the next ID without waiting.
    ///
    /// Returns [`IdGenStatus::Pending`] instead of spinning when the sequence
    /// of the current millisecond is exhausted. State is not modified in that
    /// case.
    ///
    /// # Errors
    ///
    /// Same as [`Self::next_id_with_prefix`].
    ///
    /// # Example
    /// ```
    /// use prefixflake::{Category, Generator, IdGenStatus};
    ///
    /// let generator = Generator::new(0, 3)?;
    /// let id = loop {
    ///     match generator.try_poll_id_with_prefix(Category::Queue)? {
    ///         IdGenStatus::Ready { id } => break id,
    ///         IdGenStatus::Pending { .. } => std::thread::yield_now(),
    ///     }
    /// };
    /// assert_eq!(id.category(), Category::Queue);
    /// # Ok::<(), prefixflake::Error>(())
    /// ```
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_poll_id_with_prefix(&self, prefix: Category) -> Result<IdGenStatus> {
        let mut state = self.lock()?;
        let now = self.current_millis(&state)?;

        let sequence = if now == state.last_time {
            if state.sequence >= PrefixflakeId::max_sequence() {
                return Ok(IdGenStatus::Pending { yield_for: 1 });
            }
            state.sequence + 1
        } else {
            0
        };

        self.sink.trace(format_args!(
            "now: {now}, lastTime: {}, sequence: {sequence}",
            state.last_time
        ));
        *state = State {
            last_time: now,
            sequence,
        };
        drop(state);

        Ok(IdGenStatus::Ready {
            id: self.pack(prefix, now, sequence),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>> {
        #[cfg(feature = "parking-lot")]
        {
            Ok(self.state.lock())
        }
        #[cfg(not(feature = "parking-lot"))]
        {
            Ok(self.state.lock()?)
        }
    }

    /// Reads the clock and rejects times behind `state` or past the
    /// timestamp field.
    fn current_millis(&self, state: &State) -> Result<u64> {
        let now = self.read_clock(state.last_time)?;
        if now < state.last_time {
            return Err(Self::cold_clock_behind(signed(now), state.last_time));
        }
        check_timestamp(now)?;
        Ok(now)
    }

    /// Spins until the clock passes `last_time`.
    ///
    /// No timeout: a clock stuck at or behind `last_time` keeps the caller
    /// (and everyone queued on the lock) waiting.
    fn wait_next_millis(&self, last_time: u64) -> Result<u64> {
        #[cfg(feature = "tracing")]
        tracing::debug!(last_time, "sequence exhausted, waiting for next millisecond");

        let mut spins = 0_u32;
        loop {
            let now = self.read_clock(last_time)?;
            if now > last_time {
                check_timestamp(now)?;
                return Ok(now);
            }
            spins = spins.wrapping_add(1);
            if spins % SPINS_BEFORE_YIELD == 0 {
                std::thread::yield_now();
            } else {
                core::hint::spin_loop();
            }
        }
    }

    fn pack(&self, prefix: Category, timestamp: u64, sequence: u8) -> PrefixflakeId {
        let id = PrefixflakeId::from_components(
            prefix.code(),
            PrefixflakeId::CURRENT_VERSION,
            self.business,
            self.system,
            timestamp,
            sequence,
        );
        self.sink.trace(format_args!(
            "prefix: {}, version: {}, timestamp: {timestamp}, business: {}, system: {}, sequence: {sequence}",
            prefix.code(),
            PrefixflakeId::CURRENT_VERSION,
            self.business,
            self.system,
        ));
        self.sink.trace(format_args!("id: {id}"));
        self.sink.trace(format_args!(
            "binaryID: {:b}, len {}",
            id.to_raw(),
            binary_len(id.to_raw())
        ));
        id
    }

    /// Reads the clock, rejecting a reading behind the epoch.
    fn read_clock(&self, last_time: u64) -> Result<u64> {
        self.clock
            .checked_millis()
            .map_err(|before| Self::cold_clock_behind(before.signed_millis(), last_time))
    }

    #[cold]
    #[inline(never)]
    fn cold_clock_behind(now: i64, last: u64) -> Error {
        #[cfg(feature = "tracing")]
        tracing::warn!(now, last, "clock moved backwards");
        Error::ClockRegression { now, last }
    }
}

impl<T> Clone for Generator<T>
where
    T: TimeSource<u64> + Clone,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            clock: self.clock.clone(),
            prefix: self.prefix,
            business: self.business,
            system: self.system,
            sink: Arc::clone(&self.sink),
        }
    }
}

impl<T> fmt::Debug for Generator<T>
where
    T: TimeSource<u64> + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generator")
            .field("clock", &self.clock)
            .field("prefix", &self.prefix)
            .field("business", &self.business)
            .field("system", &self.system)
            .finish_non_exhaustive()
    }
}

fn check_component(field: &'static str, value: u64, max: u64) -> Result<()> {
    if value > max {
        return Err(Error::InvalidComponent { field, value, max });
    }
    Ok(())
}

fn check_timestamp(timestamp: u64) -> Result<()> {
    if timestamp > PrefixflakeId::TIMESTAMP_MASK {
        return Err(Error::TimestampOverflow { timestamp });
    }
    Ok(())
}

fn signed(millis: u64) -> i64 {
    i64::try_from(millis).unwrap_or(i64::MAX)
}

/// Digits in the binary rendering of `raw`; `0` renders as one digit.
pub(super) fn binary_len(raw: u64) -> u32 {
    (u64::BITS - raw.leading_zeros()).max(1)
}
