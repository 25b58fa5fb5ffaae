/// Errors produced while decoding the text form of an ID.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum DecodeError {
    /// The input is not exactly [`TEXT_LEN`](crate::TEXT_LEN) bytes long.
    #[error("invalid length: {len} (expected 13)")]
    InvalidLength { len: usize },

    /// The input contains a byte outside the `A-Z2-7` alphabet.
    #[error("invalid base32 symbol {byte:#04x} at index {index}")]
    InvalidSymbol { byte: u8, index: usize },

    /// The unused low bit of the final symbol is set. Such text is never
    /// produced by the encoder.
    #[error("non-zero trailing padding bit")]
    NonZeroPadding,

    /// The decoded value has its sign bit set, so it is not representable as
    /// a non-negative `i64`.
    #[error("invalid ID: sign bit is 1 (raw {raw:#018x})")]
    InvalidSignBit { raw: u64 },
}
