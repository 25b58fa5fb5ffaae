use crate::{Category, DEFAULT_EPOCH, DecodeError, PrefixflakeId};
use chrono::{DateTime, Utc};
use core::time::Duration;

/// The fields of an ID, unpacked.
///
/// A pure projection of a [`PrefixflakeId`]: produced by [`decode`],
/// [`decode_with_epoch`] and [`decode_category_text`], never mutated.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DecodedId {
    /// Bit 63. Always 0 for generated IDs.
    #[cfg_attr(feature = "serde", serde(rename = "signBit"))]
    pub sign_bit: u8,
    /// The 5-bit category code.
    pub prefix: u8,
    /// The format version.
    pub version: u8,
    /// Milliseconds since the epoch.
    pub timestamp: u64,
    /// The business line.
    pub business: u8,
    /// The system (node) ID.
    #[cfg_attr(feature = "serde", serde(rename = "systemId"))]
    pub system: u8,
    /// The intra-millisecond sequence.
    pub sequence: u8,
    /// The 13-character text form.
    #[cfg_attr(feature = "serde", serde(rename = "base32"))]
    pub text: String,
    /// `epoch + timestamp` as a calendar time.
    #[cfg_attr(feature = "serde", serde(rename = "createdTime"))]
    pub created_time: DateTime<Utc>,
}

impl DecodedId {
    /// Returns the prefix as a [`Category`].
    #[must_use]
    pub const fn category(&self) -> Category {
        Category::from_code(self.prefix)
    }
}

/// Unpacks an ID using [`DEFAULT_EPOCH`]. Total: accepts any 64-bit value,
/// including ones with the sign bit set.
///
/// # Example
/// ```
/// use prefixflake::{Category, PrefixflakeId, decode};
///
/// let id = PrefixflakeId::from_components(Category::Host.code(), 1, 1, 1, 1000, 5);
/// let decoded = decode(id);
/// assert_eq!(decoded.category(), Category::Host);
/// assert_eq!(decoded.timestamp, 1000);
/// assert_eq!(decoded.sequence, 5);
/// ```
#[must_use]
pub fn decode(id: impl Into<PrefixflakeId>) -> DecodedId {
    decode_with_epoch(id, DEFAULT_EPOCH)
}

/// Unpacks an ID whose timestamp counts from `epoch` (a [`Duration`] since
/// 1970-01-01 UTC).
#[must_use]
pub fn decode_with_epoch(id: impl Into<PrefixflakeId>, epoch: Duration) -> DecodedId {
    let id = id.into();
    DecodedId {
        sign_bit: id.sign_bit(),
        prefix: id.prefix_code(),
        version: id.version(),
        timestamp: id.timestamp(),
        business: id.business(),
        system: id.system(),
        sequence: id.sequence(),
        text: id.encode().to_string(),
        created_time: created_time(epoch, id.timestamp()),
    }
}

/// Decodes the text form and unpacks it using [`DEFAULT_EPOCH`]. The record
/// keeps the input text.
///
/// # Errors
///
/// Any [`DecodeError`] from [`decode_from_text`](crate::decode_from_text).
pub fn decode_category_text(text: impl AsRef<str>) -> Result<DecodedId, DecodeError> {
    decode_category_text_with_epoch(text, DEFAULT_EPOCH)
}

/// [`decode_category_text`] with an explicit epoch.
///
/// # Errors
///
/// Any [`DecodeError`] from [`decode_from_text`](crate::decode_from_text).
pub fn decode_category_text_with_epoch(
    text: impl AsRef<str>,
    epoch: Duration,
) -> Result<DecodedId, DecodeError> {
    let text = text.as_ref();
    let id = PrefixflakeId::decode(text)?;
    let mut decoded = decode_with_epoch(id, epoch);
    decoded.text = text.to_owned();
    Ok(decoded)
}

fn created_time(epoch: Duration, timestamp: u64) -> DateTime<Utc> {
    let millis = epoch.as_millis().saturating_add(u128::from(timestamp));
    i64::try_from(millis)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
