use thiserror::Error;

/// Reasons a string fails to decode as a [`Token`](crate::Token).
#[derive(Error, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum TokenError {
    /// The input is not exactly [`TOKEN_LEN`](crate::TOKEN_LEN) bytes long.
    #[error("invalid length: {len}")]
    InvalidLength { len: usize },

    /// The input contains a byte outside `0-9`, `A-V` (either case).
    #[error("invalid byte {byte:#04x} at index {index}")]
    InvalidChar { byte: u8, index: usize },

    /// The leading character encodes bits beyond the 64-bit range.
    #[error("token exceeds the 64-bit range")]
    Overflow,
}
