use core::{fmt, str::FromStr};

use super::hex::{self, TOKEN_LEN};
use crate::TokenError;

/// A 64-bit identifier rendered as 13 base32 characters (`0-9`, `A-V`).
///
/// Tokens are fixed-width and sort lexicographically in the same order as the
/// ids they encode, so they can be used directly as ordered keys in text
/// stores. The conversion is lossless in both directions.
///
/// # Example
///
/// ```
/// use flakemint::Token;
///
/// let token = Token::from_id(7_136_738_463_072_129_024);
/// assert_eq!(token.as_str().len(), 13);
///
/// let parsed: Token = token.as_str().parse().unwrap();
/// assert_eq!(parsed.to_id(), 7_136_738_463_072_129_024);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Token([u8; TOKEN_LEN]);

impl Token {
    /// Encodes an id, most significant 5-bit group first.
    pub fn from_id(id: u64) -> Self {
        let mut buf = [0_u8; TOKEN_LEN];
        hex::encode(id, &mut buf);
        Self(buf)
    }

    /// Decodes the id this token was built from.
    pub fn to_id(&self) -> u64 {
        hex::decode_encoded(&self.0)
    }

    /// Parses a token from raw bytes.
    ///
    /// # Errors
    ///
    /// Fails if the input is not 13 bytes, contains a byte outside the
    /// alphabet, or encodes a value wider than 64 bits. Lower-case letters are
    /// accepted and normalised to upper case.
    pub fn try_from_bytes(bytes: &[u8]) -> Result<Self, TokenError> {
        hex::decode(bytes).map(Self::from_id)
    }

    pub fn as_str(&self) -> &str {
        // SAFETY: the buffer only ever holds bytes from `ALPHABET`, which is
        // ASCII.
        unsafe { core::str::from_utf8_unchecked(&self.0) }
    }

    pub const fn as_bytes(&self) -> &[u8; TOKEN_LEN] {
        &self.0
    }
}

impl From<u64> for Token {
    fn from(id: u64) -> Self {
        Self::from_id(id)
    }
}

impl From<Token> for u64 {
    fn from(token: Token) -> Self {
        token.to_id()
    }
}

impl From<Token> for String {
    fn from(token: Token) -> Self {
        token.as_str().to_owned()
    }
}

impl FromStr for Token {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from_bytes(s.as_bytes())
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl PartialEq<str> for Token {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Token {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Token").field(&self.as_str()).finish()
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Token {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Token {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_string() {
        let id = (1_700_000_000_123_u64 << 22) | (7 << 12) | 99;
        let token = Token::from_id(id);
        let parsed: Token = token.to_string().parse().unwrap();
        assert_eq!(parsed, token);
        assert_eq!(parsed.to_id(), id);
        assert_eq!(u64::from(parsed), id);
    }

    #[test]
    fn to_id_covers_full_range() {
        for id in [0, 1, i64::MAX as u64, (i64::MAX as u64) + 1, u64::MAX] {
            assert_eq!(Token::from_id(id).to_id(), id);
        }
        assert_eq!(Token::from_id(u64::MAX), "FVVVVVVVVVVVV");
    }

    #[test]
    fn parse_normalises_case() {
        let upper: Token = "0123456789ABC".parse().unwrap();
        let lower: Token = "0123456789abc".parse().unwrap();
        assert_eq!(upper, lower);
        assert_eq!(lower, "0123456789ABC");
    }

    #[test]
    fn parse_errors_are_reported() {
        assert_eq!(
            "".parse::<Token>(),
            Err(TokenError::InvalidLength { len: 0 })
        );
        assert_eq!(
            "0123456789ABCD".parse::<Token>(),
            Err(TokenError::InvalidLength { len: 14 })
        );
        assert!(matches!(
            "0123456789ABZ".parse::<Token>(),
            Err(TokenError::InvalidChar { byte: b'Z', .. })
        ));
        assert_eq!("V000000000000".parse::<Token>(), Err(TokenError::Overflow));
    }

    #[test]
    fn ordering_matches_ids() {
        let a = Token::from_id(1 << 22);
        let b = Token::from_id((1 << 22) + 1);
        let c = Token::from_id(2 << 22);
        assert!(a < b && b < c);
        assert!(a.as_str() < b.as_str() && b.as_str() < c.as_str());
    }

    #[test]
    fn debug_shows_text() {
        assert_eq!(format!("{:?}", Token::from_id(0)), "Token(\"0000000000000\")");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_uses_text() {
        let token = Token::from_id(123_456_789);
        let json = serde_json::to_string(&token).unwrap();
        assert_eq!(json, format!("\"{token}\""));
        let back: Token = serde_json::from_str(&json).unwrap();
        assert_eq!(back, token);
        assert!(serde_json::from_str::<Token>("\"nope\"").is_err());
    }
}
