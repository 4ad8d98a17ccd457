use core::time::Duration;

use thiserror::Error;

use crate::base32::TokenError;

/// A result type defaulting to this crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All error variants that `flakemint` can emit.
///
/// - [`Error::InvalidConfiguration`] is only produced while building a
///   generator. A generator that was never built cannot be used.
/// - [`Error::ClockRegression`], [`Error::TimestampOverflow`] and
///   [`Error::Unavailable`] are produced at issue time. None of them mutates
///   generator state.
/// - [`Error::Token`] is produced when parsing a textual token.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The configuration record was rejected.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),

    /// The clock reads earlier than the last issued timestamp (or earlier than
    /// the epoch). Nothing was issued and the generator state is unchanged.
    #[error("clock moved backward: now {now} ms, last issued {last} ms")]
    ClockRegression { now: u64, last: u64 },

    /// The time elapsed since the epoch no longer fits the timestamp field.
    #[error("timestamp offset {offset} ms exceeds the layout maximum of {max} ms")]
    TimestampOverflow { offset: u64, max: u64 },

    /// The generator lock could not be acquired, or the clock did not advance,
    /// within the configured timeout.
    #[error("generator unavailable after waiting {waited:?}")]
    Unavailable { waited: Duration },

    /// A token failed to decode.
    #[error("invalid token: {0}")]
    Token(#[from] TokenError),
}

/// Reasons a configuration record is rejected.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    /// A bit width was zero.
    #[error("{field} must be greater than 0")]
    ZeroWidth { field: &'static str },

    /// The four bit widths do not add up to 64.
    #[error("bit widths must sum to 64 (got {total})")]
    BitSum { total: u32 },

    /// The instance id does not fit in the instance field.
    #[error("instance id {instance_id} is out of range (max = {max})")]
    InstanceOutOfRange { instance_id: u64, max: u64 },
}
