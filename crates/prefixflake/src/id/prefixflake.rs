use crate::{Category, id::layout::write_bit_layout_debug};
use core::fmt;

/// A 64-bit prefixed Snowflake ID.
///
/// - 1 bit sign (always 0 for generated IDs)
/// - 5 bits prefix (a [`Category`] code)
/// - 2 bits version (generators emit [`PrefixflakeId::CURRENT_VERSION`])
/// - 3 bits business line
/// - 4 bits system ID
/// - 42 bits timestamp (ms since [`DEFAULT_EPOCH`] or a configured epoch)
/// - 7 bits sequence
///
/// ```text
///  Bit Index:  63    63 62     58 57     56 55      53 52    49 48            7 6             0
///              +-------+---------+---------+----------+--------+----------------+--------------+
///  Field:      | sign  | prefix  | version | business | system | timestamp (42) | sequence (7) |
///              +-------+---------+---------+----------+--------+----------------+--------------+
///              |<--------------------- MSB ---------- 64 bits --------- LSB ------------------>|
/// ```
///
/// Ordering is plain unsigned ordering of the packed value, so IDs from one
/// generator sort by creation time.
///
/// [`DEFAULT_EPOCH`]: crate::DEFAULT_EPOCH
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PrefixflakeId {
    id: u64,
}

impl PrefixflakeId {
    pub const SIGN_BITS: u64 = 1;
    pub const PREFIX_BITS: u64 = 5;
    pub const VERSION_BITS: u64 = 2;
    pub const BUSINESS_BITS: u64 = 3;
    pub const SYSTEM_BITS: u64 = 4;
    pub const TIMESTAMP_BITS: u64 = 42;
    pub const SEQUENCE_BITS: u64 = 7;

    /// Sign bit position (bit 63).
    pub const SIGN_SHIFT: u64 = 63;
    /// Prefix position (bits 58 through 62).
    pub const PREFIX_SHIFT: u64 = Self::SIGN_SHIFT - Self::PREFIX_BITS;
    /// Version position (bits 56 through 57).
    pub const VERSION_SHIFT: u64 = Self::PREFIX_SHIFT - Self::VERSION_BITS;
    /// Business position (bits 53 through 55).
    pub const BUSINESS_SHIFT: u64 = Self::VERSION_SHIFT - Self::BUSINESS_BITS;
    /// System position (bits 49 through 52).
    pub const SYSTEM_SHIFT: u64 = Self::BUSINESS_SHIFT - Self::SYSTEM_BITS;
    /// Timestamp position (bits 7 through 48).
    pub const TIMESTAMP_SHIFT: u64 = Self::SYSTEM_SHIFT - Self::TIMESTAMP_BITS;
    /// Sequence position (bits 0 through 6).
    pub const SEQUENCE_SHIFT: u64 = 0;

    pub const SIGN_MASK: u64 = (1 << Self::SIGN_BITS) - 1;
    pub const PREFIX_MASK: u64 = (1 << Self::PREFIX_BITS) - 1;
    pub const VERSION_MASK: u64 = (1 << Self::VERSION_BITS) - 1;
    pub const BUSINESS_MASK: u64 = (1 << Self::BUSINESS_BITS) - 1;
    pub const SYSTEM_MASK: u64 = (1 << Self::SYSTEM_BITS) - 1;
    pub const TIMESTAMP_MASK: u64 = (1 << Self::TIMESTAMP_BITS) - 1;
    pub const SEQUENCE_MASK: u64 = (1 << Self::SEQUENCE_BITS) - 1;

    /// The format version stamped by every generator.
    pub const CURRENT_VERSION: u8 = 1;

    /// Packs the components into an ID.
    ///
    /// Every component is masked to the width of its field, so out-of-range
    /// values silently lose their high bits. The sign bit is always 0.
    /// [`Generator`] only ever passes in-range values.
    ///
    /// [`Generator`]: crate::Generator
    #[must_use]
    pub const fn from_components(
        prefix: u8,
        version: u8,
        business: u8,
        system: u8,
        timestamp: u64,
        sequence: u8,
    ) -> Self {
        let prefix = (prefix as u64 & Self::PREFIX_MASK) << Self::PREFIX_SHIFT;
        let version = (version as u64 & Self::VERSION_MASK) << Self::VERSION_SHIFT;
        let business = (business as u64 & Self::BUSINESS_MASK) << Self::BUSINESS_SHIFT;
        let system = (system as u64 & Self::SYSTEM_MASK) << Self::SYSTEM_SHIFT;
        let timestamp = (timestamp & Self::TIMESTAMP_MASK) << Self::TIMESTAMP_SHIFT;
        let sequence = (sequence as u64 & Self::SEQUENCE_MASK) << Self::SEQUENCE_SHIFT;
        Self {
            id: prefix | version | business | system | timestamp | sequence,
        }
    }

    /// Wraps a raw value. No validation is performed; see [`Self::is_valid`].
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self { id: raw }
    }

    #[must_use]
    pub const fn to_raw(&self) -> u64 {
        self.id
    }

    /// Returns the ID as a signed integer, or `None` when the sign bit is set.
    #[must_use]
    pub const fn to_i64(&self) -> Option<i64> {
        if self.is_valid() {
            Some(self.id as i64)
        } else {
            None
        }
    }

    /// Extracts the sign bit (bit 63).
    #[must_use]
    pub const fn sign_bit(&self) -> u8 {
        ((self.id >> Self::SIGN_SHIFT) & Self::SIGN_MASK) as u8
    }

    /// Extracts the raw 5-bit prefix code.
    #[must_use]
    pub const fn prefix_code(&self) -> u8 {
        ((self.id >> Self::PREFIX_SHIFT) & Self::PREFIX_MASK) as u8
    }

    /// Extracts the prefix as a [`Category`]. Every 5-bit code has one.
    #[must_use]
    pub const fn category(&self) -> Category {
        Category::from_code(self.prefix_code())
    }

    /// Extracts the format version.
    #[must_use]
    pub const fn version(&self) -> u8 {
        ((self.id >> Self::VERSION_SHIFT) & Self::VERSION_MASK) as u8
    }

    /// Extracts the business line.
    #[must_use]
    pub const fn business(&self) -> u8 {
        ((self.id >> Self::BUSINESS_SHIFT) & Self::BUSINESS_MASK) as u8
    }

    /// Extracts the system ID.
    #[must_use]
    pub const fn system(&self) -> u8 {
        ((self.id >> Self::SYSTEM_SHIFT) & Self::SYSTEM_MASK) as u8
    }

    /// Extracts the timestamp, in milliseconds since the epoch.
    #[must_use]
    pub const fn timestamp(&self) -> u64 {
        (self.id >> Self::TIMESTAMP_SHIFT) & Self::TIMESTAMP_MASK
    }

    /// Extracts the sequence number.
    #[must_use]
    pub const fn sequence(&self) -> u8 {
        ((self.id >> Self::SEQUENCE_SHIFT) & Self::SEQUENCE_MASK) as u8
    }

    #[must_use]
    pub const fn max_timestamp() -> u64 {
        Self::TIMESTAMP_MASK
    }

    #[must_use]
    pub const fn max_business() -> u8 {
        Self::BUSINESS_MASK as u8
    }

    #[must_use]
    pub const fn max_system() -> u8 {
        Self::SYSTEM_MASK as u8
    }

    #[must_use]
    pub const fn max_sequence() -> u8 {
        Self::SEQUENCE_MASK as u8
    }

    /// Returns `true` if the sign bit is clear, i.e. the ID is representable
    /// as a non-negative `i64`.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.sign_bit() == 0
    }

    /// Clears the sign bit.
    #[must_use]
    pub const fn into_valid(self) -> Self {
        Self {
            id: self.id & !(Self::SIGN_MASK << Self::SIGN_SHIFT),
        }
    }

    /// Returns the ID as a zero-padded 19-digit string (the width of
    /// `i64::MAX`), which sorts like the numeric value.
    #[must_use]
    pub fn to_padded_string(&self) -> String {
        format!("{:019}", self.id)
    }
}

impl From<PrefixflakeId> for u64 {
    fn from(id: PrefixflakeId) -> Self {
        id.to_raw()
    }
}

impl From<u64> for PrefixflakeId {
    fn from(raw: u64) -> Self {
        Self::from_raw(raw)
    }
}

impl fmt::Display for PrefixflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl fmt::Debug for PrefixflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_bit_layout_debug(f, self, "PrefixflakeId")
    }
}
