use crate::PrefixflakeId;

/// Represents the result of a non-blocking generation attempt.
///
/// This type models the outcome of [`Generator::try_poll_id`]:
///
/// - [`IdGenStatus::Ready`] indicates a new ID was successfully generated.
/// - [`IdGenStatus::Pending`] means all 128 sequence values of the current
///   millisecond are used; try again once the clock has advanced.
///
/// [`Generator::try_poll_id`]: crate::Generator::try_poll_id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdGenStatus {
    /// A unique ID was generated and is ready to use.
    Ready {
        /// The generated ID.
        id: PrefixflakeId,
    },
    /// No ID could be generated because the sequence has been exhausted for
    /// the current millisecond.
    Pending {
        /// Milliseconds to wait before trying again.
        yield_for: u64,
    },
}

/// An ID returned by [`Generator::next_id`], together with its text form.
///
/// [`Generator::next_id`]: crate::Generator::next_id
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeneratedId {
    /// The packed ID.
    pub id: PrefixflakeId,
    /// The 13-character text form of `id`.
    pub text: String,
}

impl GeneratedId {
    pub(crate) fn new(id: PrefixflakeId) -> Self {
        Self {
            text: id.encode().to_string(),
            id,
        }
    }

    /// Returns the ID as a non-negative `i64`.
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        // Generated IDs always have a clear sign bit
        self.id.to_raw() as i64
    }

    /// Splits into the signed integer and text forms.
    #[must_use]
    pub fn into_parts(self) -> (i64, String) {
        (self.as_i64(), self.text)
    }
}
