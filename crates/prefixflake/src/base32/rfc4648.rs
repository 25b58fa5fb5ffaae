use crate::DecodeError;

/// The RFC 4648 base32 alphabet. Text IDs are always upper-case.
pub const ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// Length of the text form of a 64-bit ID: `ceil(64 / 5)`.
pub const TEXT_LEN: usize = (u64::BITS as usize).div_ceil(BITS_PER_CHAR);

const NO_VALUE: u8 = 255;
const BITS_PER_CHAR: usize = 5;
const BYTES: usize = core::mem::size_of::<u64>();

/// Lookup table for base32 decoding. Lower-case is rejected.
const LOOKUP: [u8; 256] = {
    let mut lut = [NO_VALUE; 256];
    let mut i = 0_u8;
    while i < 32 {
        lut[ALPHABET[i as usize] as usize] = i;
        i += 1;
    }
    lut
};

/// Encodes `input` into `buf`, padding the final symbol with zero bits on the
/// right.
///
/// `buf` must hold exactly `ceil(input.len() * 8 / 5)` symbols; callers pass
/// fixed-size arrays so this holds at compile time.
#[inline]
pub(crate) fn encode_base32(input: &[u8], buf: &mut [u8]) {
    debug_assert_eq!(buf.len(), (input.len() * 8).div_ceil(BITS_PER_CHAR));
    let mut bits = 0;
    let mut acc = 0_u16;
    let mask = 0x1F;

    let mut out = 0;
    for &b in input {
        acc = (acc << 8) | u16::from(b);
        bits += 8;
        while bits >= BITS_PER_CHAR {
            bits -= BITS_PER_CHAR;
            buf[out] = ALPHABET[((acc >> bits) & mask) as usize];
            out += 1;
        }
    }

    // Remaining bits move to the top of the last symbol
    if bits > 0 {
        buf[out] = ALPHABET[((acc << (BITS_PER_CHAR - bits)) & mask) as usize];
    }
}

/// Decodes exactly [`TEXT_LEN`] symbols into 8 big-endian bytes.
///
/// # Errors
///
/// - [`DecodeError::InvalidLength`] if `encoded` is not [`TEXT_LEN`] bytes
/// - [`DecodeError::InvalidSymbol`] for any byte outside [`ALPHABET`]
/// - [`DecodeError::NonZeroPadding`] if the trailing pad bit is set
pub(crate) fn decode_base32(encoded: &str) -> Result<[u8; BYTES], DecodeError> {
    if encoded.len() != TEXT_LEN {
        return Err(DecodeError::InvalidLength { len: encoded.len() });
    }

    let mut out = [0_u8; BYTES];
    let mut bits = 0;
    let mut acc = 0_u16;
    let mut byte_idx = 0;

    for (index, byte) in encoded.bytes().enumerate() {
        let val = LOOKUP[byte as usize];
        if val == NO_VALUE {
            return Err(DecodeError::InvalidSymbol { byte, index });
        }

        acc = (acc << BITS_PER_CHAR) | u16::from(val);
        bits += BITS_PER_CHAR;

        if bits >= 8 {
            bits -= 8;
            out[byte_idx] = (acc >> bits) as u8;
            byte_idx += 1;
        }
    }

    debug_assert_eq!(byte_idx, BYTES);
    if acc & ((1 << bits) - 1) != 0 {
        return Err(DecodeError::NonZeroPadding);
    }

    Ok(out)
}
