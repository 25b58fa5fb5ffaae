use super::rfc4648::{TEXT_LEN, decode_base32, encode_base32};
use crate::{DecodeError, PrefixflakeId};
use core::{fmt, str::FromStr};

/// Encodes an ID into its fixed 13-character text form.
///
/// The value is rotated left by one bit, moving the sign bit to the least
/// significant position, then written as 8 big-endian bytes in RFC 4648
/// base32 (`A-Z2-7`) without padding. The rotation puts the prefix in the top
/// five bits, so the first symbol is always the category symbol (see
/// [`Category::symbol`]).
///
/// # Example
/// ```
/// use prefixflake::{Category, PrefixflakeId, encode_to_text};
///
/// let id = PrefixflakeId::from_components(Category::Host.code(), 1, 1, 1, 1000, 5);
/// let text = encode_to_text(id);
/// assert_eq!(text.len(), 13);
/// assert!(text.starts_with('H'));
/// ```
///
/// [`Category::symbol`]: crate::Category::symbol
#[must_use]
pub fn encode_to_text(id: impl Into<PrefixflakeId>) -> String {
    id.into().encode().to_string()
}

/// Decodes the 13-character text form back into an ID.
///
/// # Errors
///
/// - [`DecodeError::InvalidLength`] unless the input is exactly 13 bytes
/// - [`DecodeError::InvalidSymbol`] for characters outside `A-Z2-7`
/// - [`DecodeError::NonZeroPadding`] for a non-canonical final symbol
/// - [`DecodeError::InvalidSignBit`] if the restored value has bit 63 set
///
/// # Example
/// ```
/// use prefixflake::{DecodeError, PrefixflakeId, decode_from_text, encode_to_text};
///
/// let id = PrefixflakeId::from_raw(123_456_789);
/// assert_eq!(decode_from_text(&encode_to_text(id)), Ok(id));
///
/// let err = decode_from_text("AAAAAA1AAAAAA").unwrap_err();
/// assert!(matches!(err, DecodeError::InvalidSymbol { byte: b'1', .. }));
/// ```
pub fn decode_from_text(text: impl AsRef<str>) -> Result<PrefixflakeId, DecodeError> {
    PrefixflakeId::decode(text)
}

impl PrefixflakeId {
    /// Returns a stack-allocated buffer sized for the text form.
    #[must_use]
    pub const fn buf() -> [u8; TEXT_LEN] {
        [0; TEXT_LEN]
    }

    /// Returns a zero-allocation formatter over the text form of this ID.
    ///
    /// The formatter implements [`fmt::Display`] and [`AsRef<str>`].
    #[must_use]
    pub fn encode(&self) -> Base32Formatter {
        Base32Formatter::new(self)
    }

    /// Writes the text form into `buf` and returns a `&str` view over it.
    pub fn encode_to_buf<'buf>(&self, buf: &'buf mut [u8; TEXT_LEN]) -> &'buf str {
        encode_base32(&self.to_raw().rotate_left(1).to_be_bytes(), buf);
        // SAFETY: `buf` holds only base32 alphabet ASCII
        unsafe { core::str::from_utf8_unchecked(buf) }
    }

    /// Decodes the text form, rejecting values with the sign bit set.
    ///
    /// # Errors
    ///
    /// See [`decode_from_text`].
    pub fn decode(text: impl AsRef<str>) -> Result<Self, DecodeError> {
        let bytes = decode_base32(text.as_ref())?;
        let raw = u64::from_be_bytes(bytes).rotate_right(1);
        let id = Self::from_raw(raw);
        if !id.is_valid() {
            return Err(DecodeError::InvalidSignBit { raw });
        }
        Ok(id)
    }
}

impl FromStr for PrefixflakeId {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

/// Owns the encoded text of an ID.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Base32Formatter {
    buf: [u8; TEXT_LEN],
}

impl Base32Formatter {
    #[must_use]
    pub fn new(id: &PrefixflakeId) -> Self {
        let mut buf = PrefixflakeId::buf();
        id.encode_to_buf(&mut buf);
        Self { buf }
    }

    /// Returns a `&str` view of the text form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        // SAFETY: `self.buf` holds only base32 alphabet ASCII
        unsafe { core::str::from_utf8_unchecked(&self.buf) }
    }

    /// Consumes the formatter and returns the raw buffer.
    #[must_use]
    pub const fn into_inner(self) -> [u8; TEXT_LEN] {
        self.buf
    }
}

impl fmt::Display for Base32Formatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Base32Formatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Base32Formatter").field(&self.as_str()).finish()
    }
}

impl AsRef<str> for Base32Formatter {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl PartialEq<&str> for Base32Formatter {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl PartialEq<String> for Base32Formatter {
    fn eq(&self, other: &String) -> bool {
        self.as_str() == other.as_str()
    }
}
