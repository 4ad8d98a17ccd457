//! The "base32hex" alphabet: digits then `A`-`V`. Unlike Crockford's
//! alphabet it keeps every letter in a contiguous run, so symbol order,
//! ASCII order, and numeric order all agree.

use crate::TokenError;

/// Symbols in ascending value order.
pub const ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHIJKLMNOPQRSTUV";

/// Characters in a token: 13 × 5 bits covers the 64-bit id with one spare bit.
pub const TOKEN_LEN: usize = 13;

const BITS_PER_CHAR: u32 = 5;
const CHAR_MASK: u64 = 0x1F;
const NO_VALUE: u8 = 255;

/// Largest value the leading character may carry: the 65-bit window has its
/// top bit above the id, leaving 4 usable bits.
const MAX_LEADING: u8 = 0x0F;

/// Lookup table for decoding, accepting lower-case letters.
const LOOKUP: [u8; 256] = {
    let mut lut = [NO_VALUE; 256];
    let mut i = 0_u8;
    while i < 32 {
        let c = ALPHABET[i as usize];
        lut[c as usize] = i;
        if c.is_ascii_uppercase() {
            lut[(c + 32) as usize] = i;
        }
        i += 1;
    }
    lut
};

/// Writes `id` into `buf`, least significant group last.
#[inline]
pub(crate) fn encode(mut id: u64, buf: &mut [u8; TOKEN_LEN]) {
    for slot in buf.iter_mut().rev() {
        *slot = ALPHABET[(id & CHAR_MASK) as usize];
        id >>= BITS_PER_CHAR;
    }
}

/// Reassembles the id from a token's 5-bit groups.
pub(crate) fn decode(encoded: &[u8]) -> Result<u64, TokenError> {
    if encoded.len() != TOKEN_LEN {
        return Err(TokenError::InvalidLength { len: encoded.len() });
    }

    let mut acc = 0_u64;
    for (index, &byte) in encoded.iter().enumerate() {
        let val = LOOKUP[byte as usize];
        if val == NO_VALUE {
            return Err(TokenError::InvalidChar { byte, index });
        }
        if index == 0 && val > MAX_LEADING {
            return Err(TokenError::Overflow);
        }
        acc = (acc << BITS_PER_CHAR) | u64::from(val);
    }
    Ok(acc)
}

/// Decodes a buffer produced by [`encode`]. Every byte is an alphabet symbol
/// and the leading group is at most [`MAX_LEADING`], so no check can fail.
#[inline]
pub(crate) fn decode_encoded(buf: &[u8; TOKEN_LEN]) -> u64 {
    debug_assert!(LOOKUP[buf[0] as usize] <= MAX_LEADING);
    buf.iter().fold(0_u64, |acc, &byte| {
        debug_assert!(LOOKUP[byte as usize] != NO_VALUE);
        (acc << BITS_PER_CHAR) | u64::from(LOOKUP[byte as usize])
    })
}
