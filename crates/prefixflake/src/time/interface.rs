use core::time::Duration;

/// Default epoch: Wednesday, January 1, 2025 00:00:00 UTC
pub const DEFAULT_EPOCH: Duration = Duration::from_millis(1_735_689_600_000);

/// A trait for time sources that return a wall-clock timestamp.
///
/// This abstraction allows you to plug in the real system clock or a mocked
/// time source in tests. The unit is **milliseconds** relative to the time
/// source's epoch.
///
/// # Example
///
/// ```
/// use prefixflake::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource<u64> for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1234
///     }
/// }
///
/// let time = FixedTime;
/// assert_eq!(time.current_millis(), 1234);
/// ```
pub trait TimeSource<T> {
    /// Returns the current time in milliseconds since the configured epoch.
    fn current_millis(&self) -> T;

    /// Returns the epoch this time source counts from, as a [`Duration`]
    /// since 1970-01-01 UTC.
    fn epoch(&self) -> Duration {
        DEFAULT_EPOCH
    }

    /// Like [`Self::current_millis`], but reports a reading earlier than the
    /// epoch instead of clamping it. The generator reads time through this.
    ///
    /// Sources that cannot run before their epoch keep the default.
    ///
    /// # Errors
    ///
    /// [`BeforeEpoch`] if the clock currently reads before the epoch.
    fn checked_millis(&self) -> Result<T, BeforeEpoch> {
        Ok(self.current_millis())
    }
}

/// A clock reading earlier than its time source's epoch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BeforeEpoch {
    /// How many milliseconds before the epoch the clock reads.
    pub millis: u64,
}

impl BeforeEpoch {
    /// The reading as signed milliseconds since the epoch.
    #[must_use]
    pub fn signed_millis(&self) -> i64 {
        i64::try_from(self.millis).map_or(i64::MIN, |millis| -millis)
    }
}

impl<T, S: TimeSource<T> + ?Sized> TimeSource<T> for &S {
    fn current_millis(&self) -> T {
        (**self).current_millis()
    }

    fn epoch(&self) -> Duration {
        (**self).epoch()
    }

    fn checked_millis(&self) -> Result<T, BeforeEpoch> {
        (**self).checked_millis()
    }
}

impl<T, S: TimeSource<T> + ?Sized> TimeSource<T> for std::sync::Arc<S> {
    fn current_millis(&self) -> T {
        (**self).current_millis()
    }

    fn epoch(&self) -> Duration {
        (**self).epoch()
    }

    fn checked_millis(&self) -> Result<T, BeforeEpoch> {
        (**self).checked_millis()
    }
}
