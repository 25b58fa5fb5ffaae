use crate::DecodeError;

/// A result type defaulting to the crate [`enum@Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All errors that `prefixflake` can produce.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The clock reported a time earlier than the last emitted timestamp,
    /// or earlier than the epoch itself.
    ///
    /// Generator state is left untouched. The generator never retries this
    /// internally; the caller decides whether to wait, restart or alert.
    #[error("clock moved backwards: now {now} ms < last {last} ms")]
    ClockRegression {
        /// Milliseconds since the epoch observed on this call. Negative when
        /// the clock is behind the epoch.
        now: i64,
        /// Timestamp of the last emitted ID.
        last: u64,
    },

    /// The clock reported a time that does not fit in the 42-bit timestamp
    /// field. The epoch is more than ~139 years in the past.
    #[error("timestamp {timestamp} ms exceeds the 42-bit timestamp field")]
    TimestampOverflow {
        /// Milliseconds since the epoch observed on this call.
        timestamp: u64,
    },

    /// A fixed identity component is wider than its bit field.
    #[error("{field} {value} out of range (max {max})")]
    InvalidComponent {
        /// Name of the rejected field.
        field: &'static str,
        /// Rejected value.
        value: u64,
        /// Largest accepted value.
        max: u64,
    },

    /// No [`Category`](crate::Category) has this name.
    #[error("unknown category: {name:?}")]
    UnknownCategory {
        /// The rejected name.
        name: String,
    },

    /// The text form of an ID could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The operation failed because the generator lock was **poisoned**.
    ///
    /// This occurs when a thread panics while holding the lock. When the
    /// `parking-lot` feature is enabled, mutexes do **not** poison, so this
    /// variant is never produced.
    #[error("generator lock poisoned")]
    LockPoisoned,
}

#[cfg(not(feature = "parking-lot"))]
use crate::generator::{MutexGuard, PoisonError};
#[cfg(not(feature = "parking-lot"))]
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}
