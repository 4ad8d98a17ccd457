use core::time::Duration;

use crate::{BitLayout, ConfigError};

/// Default number of sign (reserved) bits.
pub const DEFAULT_SIGN_BITS: u8 = 1;
/// Default timestamp width: 41 bits covers roughly 69 years of milliseconds.
pub const DEFAULT_TIMESTAMP_BITS: u8 = 41;
/// Default instance width: 1024 producers.
pub const DEFAULT_INSTANCE_BITS: u8 = 10;
/// Default sequence width: 4096 ids per producer per millisecond.
pub const DEFAULT_SEQUENCE_BITS: u8 = 12;
/// Default bound on how long a caller waits for the generator lock.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(10);

/// The configuration record a generator is built from.
///
/// The record is plain data; nothing is checked until [`Self::layout`] (or a
/// generator constructor, which calls it) validates it. The rules are:
///
/// - every bit width is greater than zero
/// - the four widths add up to exactly 64
/// - `instance_id < 2^instance_bits`
///
/// # Example
///
/// ```
/// use flakemint::GeneratorConfig;
///
/// let layout = GeneratorConfig::new(7)
///     .with_instance_bits(8)
///     .with_sequence_bits(14)
///     .with_epoch(1_735_689_600_000)
///     .layout()
///     .unwrap();
///
/// assert_eq!(layout.timestamp_shift(), 22);
/// assert_eq!(layout.max_sequence(), 16_383);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeneratorConfig {
    #[cfg_attr(feature = "serde", serde(default = "default_sign_bits"))]
    pub sign_bits: u8,
    #[cfg_attr(feature = "serde", serde(default = "default_timestamp_bits"))]
    pub timestamp_bits: u8,
    #[cfg_attr(feature = "serde", serde(default = "default_instance_bits"))]
    pub instance_bits: u8,
    #[cfg_attr(feature = "serde", serde(default = "default_sequence_bits"))]
    pub sequence_bits: u8,
    /// Milliseconds since the UNIX epoch that map to timestamp zero.
    #[cfg_attr(feature = "serde", serde(default))]
    pub timestamp_epoch: u64,
    /// Identity of this producer. Has no default: two producers sharing an id
    /// will collide.
    pub instance_id: u64,
    /// How long a caller may wait for the generator lock before getting
    /// [`Error::Unavailable`](crate::Error::Unavailable).
    #[cfg_attr(feature = "serde", serde(default = "default_lock_timeout"))]
    pub lock_timeout: Duration,
    /// Upper bound on waiting for the clock to leave an exhausted millisecond.
    /// `None` waits indefinitely.
    #[cfg_attr(feature = "serde", serde(default))]
    pub clock_wait_timeout: Option<Duration>,
}

#[cfg(feature = "serde")]
const fn default_sign_bits() -> u8 {
    DEFAULT_SIGN_BITS
}
#[cfg(feature = "serde")]
const fn default_timestamp_bits() -> u8 {
    DEFAULT_TIMESTAMP_BITS
}
#[cfg(feature = "serde")]
const fn default_instance_bits() -> u8 {
    DEFAULT_INSTANCE_BITS
}
#[cfg(feature = "serde")]
const fn default_sequence_bits() -> u8 {
    DEFAULT_SEQUENCE_BITS
}
#[cfg(feature = "serde")]
const fn default_lock_timeout() -> Duration {
    DEFAULT_LOCK_TIMEOUT
}

impl GeneratorConfig {
    /// Creates a record with the default 1/41/10/12 layout, a zero epoch, and
    /// the given instance id.
    pub const fn new(instance_id: u64) -> Self {
        Self {
            sign_bits: DEFAULT_SIGN_BITS,
            timestamp_bits: DEFAULT_TIMESTAMP_BITS,
            instance_bits: DEFAULT_INSTANCE_BITS,
            sequence_bits: DEFAULT_SEQUENCE_BITS,
            timestamp_epoch: 0,
            instance_id,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
            clock_wait_timeout: None,
        }
    }

    #[must_use]
    pub const fn with_sign_bits(mut self, bits: u8) -> Self {
        self.sign_bits = bits;
        self
    }

    #[must_use]
    pub const fn with_timestamp_bits(mut self, bits: u8) -> Self {
        self.timestamp_bits = bits;
        self
    }

    #[must_use]
    pub const fn with_instance_bits(mut self, bits: u8) -> Self {
        self.instance_bits = bits;
        self
    }

    #[must_use]
    pub const fn with_sequence_bits(mut self, bits: u8) -> Self {
        self.sequence_bits = bits;
        self
    }

    /// Sets the epoch, in milliseconds since 1970-01-01 UTC.
    #[must_use]
    pub const fn with_epoch(mut self, epoch_ms: u64) -> Self {
        self.timestamp_epoch = epoch_ms;
        self
    }

    #[must_use]
    pub const fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_clock_wait_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.clock_wait_timeout = timeout;
        self
    }

    /// Validates the record and derives the packing layout from it.
    ///
    /// # Errors
    ///
    /// Returns the first rule the record breaks, checked in the order: zero
    /// widths (sequence, instance, timestamp, sign), bit sum, instance range.
    pub fn layout(&self) -> Result<BitLayout, ConfigError> {
        BitLayout::try_from(self)
    }
}
