use crate::{BeforeEpoch, DEFAULT_EPOCH, TimeSource};
use core::time::Duration;
use std::time::{SystemTime, UNIX_EPOCH};

/// A time source that reads the system wall clock on every call.
///
/// Unlike a monotonic timer, the wall clock can step backwards (NTP
/// corrections, manual changes). The generator detects such steps and
/// reports [`Error::ClockRegression`] rather than hiding them.
///
/// A clock behind the epoch (a host booted without an RTC, or an epoch set in
/// the future) is reported by [`TimeSource::checked_millis`] as
/// [`BeforeEpoch`], which the generator also turns into
/// [`Error::ClockRegression`]. Only [`TimeSource::current_millis`] clamps such
/// readings to `0`.
///
/// [`Error::ClockRegression`]: crate::Error::ClockRegression
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WallClock {
    epoch: Duration,
}

impl Default for WallClock {
    /// Constructs a wall clock aligned to [`DEFAULT_EPOCH`].
    fn default() -> Self {
        Self::with_epoch(DEFAULT_EPOCH)
    }
}

impl WallClock {
    /// Constructs a wall clock counting from `epoch`, given as a [`Duration`]
    /// since 1970-01-01 UTC.
    ///
    /// # Example
    ///
    /// ```
    /// use core::time::Duration;
    /// use prefixflake::{TimeSource, WallClock};
    ///
    /// let clock = WallClock::with_epoch(Duration::ZERO);
    /// // Milliseconds since 1970: well past 2020-01-01.
    /// assert!(clock.current_millis() > 1_577_836_800_000);
    /// ```
    #[must_use]
    pub const fn with_epoch(epoch: Duration) -> Self {
        Self { epoch }
    }

    /// Constructs a wall clock counting from `epoch_ms` milliseconds since
    /// 1970-01-01 UTC.
    #[must_use]
    pub const fn with_epoch_millis(epoch_ms: u64) -> Self {
        Self::with_epoch(Duration::from_millis(epoch_ms))
    }
}

impl TimeSource<u64> for WallClock {
    fn current_millis(&self) -> u64 {
        self.checked_millis().unwrap_or(0)
    }

    fn epoch(&self) -> Duration {
        self.epoch
    }

    fn checked_millis(&self) -> Result<u64, BeforeEpoch> {
        let unix_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_millis();
        millis_since_epoch(unix_ms, self.epoch.as_millis())
    }
}

/// Whole milliseconds from `epoch_ms` to `unix_ms`.
fn millis_since_epoch(unix_ms: u128, epoch_ms: u128) -> Result<u64, BeforeEpoch> {
    if unix_ms < epoch_ms {
        let millis = u64::try_from(epoch_ms - unix_ms).unwrap_or(u64::MAX);
        return Err(BeforeEpoch { millis });
    }
    Ok(u64::try_from(unix_ms - epoch_ms).unwrap_or(u64::MAX))
}
