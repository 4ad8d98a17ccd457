use core::{cmp::Ordering, time::Duration};
use std::{thread, time::Instant};

use parking_lot::Mutex;
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    BitLayout, Error, GeneratorConfig, IdGenStatus, Result, TimeSource, Token,
};

/// The last issued `(timestamp, sequence)` pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Issued {
    pub(crate) timestamp: u64,
    pub(crate) sequence: u64,
}

impl Issued {
    const fn first_of(timestamp: u64) -> Self {
        Self {
            timestamp,
            sequence: 0,
        }
    }
}

/// A lock-based Snowflake-style generator safe to share across threads.
///
/// All issuing goes through one [`parking_lot::Mutex`] owned by the generator
/// for its whole lifetime. The clock is read, compared against the last issued
/// pair, and the new pair committed while that lock is held, so no two callers
/// can ever observe the same `(timestamp, sequence)` pair.
///
/// Share one instance between threads by reference or through an
/// [`Arc`](std::sync::Arc).
///
/// # Example
///
/// ```
/// use flakemint::{GeneratorConfig, LockFlakeGenerator, SystemClock};
///
/// let generator = LockFlakeGenerator::new(&GeneratorConfig::new(7), SystemClock).unwrap();
///
/// let a = generator.next_id().unwrap();
/// let b = generator.next_id().unwrap();
/// assert!(b > a);
///
/// let parts = generator.layout().decompose(b);
/// assert_eq!(parts.instance_id, 7);
///
/// let token = generator.next_token().unwrap();
/// assert_eq!(token.as_str().len(), 13);
/// ```
pub struct LockFlakeGenerator<T>
where
    T: TimeSource,
{
    layout: BitLayout,
    pub(crate) state: Mutex<Option<Issued>>,
    time: T,
    lock_timeout: Duration,
    clock_wait_timeout: Option<Duration>,
}

impl<T> LockFlakeGenerator<T>
where
    T: TimeSource,
{
    /// Validates `config` and builds a generator reading time from `time`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if the bit widths are zero or do
    /// not sum to 64, or if the instance id does not fit its field.
    pub fn new(config: &GeneratorConfig, time: T) -> Result<Self> {
        let layout = config.layout()?;
        Ok(Self {
            layout,
            state: Mutex::new(None),
            time,
            lock_timeout: config.lock_timeout,
            clock_wait_timeout: config.clock_wait_timeout,
        })
    }

    pub const fn layout(&self) -> &BitLayout {
        &self.layout
    }

    pub const fn lock_timeout(&self) -> Duration {
        self.lock_timeout
    }

    pub const fn clock_wait_timeout(&self) -> Option<Duration> {
        self.clock_wait_timeout
    }

    /// Issues the next id, sleeping in 1 ms steps while the current
    /// millisecond's sequence space is exhausted.
    ///
    /// The lock is released while sleeping; each retry re-enters the critical
    /// section, so waiting callers stay serialized with everyone else.
    ///
    /// # Errors
    ///
    /// - [`Error::ClockRegression`] if the clock reads earlier than the last
    ///   issued timestamp. The generator is left untouched.
    /// - [`Error::TimestampOverflow`] if the time since the epoch no longer
    ///   fits the layout's timestamp field.
    /// - [`Error::Unavailable`] if the lock is not acquired within the lock
    ///   timeout, or the clock does not advance within the configured
    ///   clock-wait timeout.
    pub fn next_id(&self) -> Result<u64> {
        let mut waiting_since: Option<Instant> = None;
        loop {
            match self.try_poll_id()? {
                IdGenStatus::Ready { id } => return Ok(id),
                IdGenStatus::Pending { yield_for } => {
                    let since = *waiting_since.get_or_insert_with(Instant::now);
                    if let Some(limit) = self.clock_wait_timeout {
                        let waited = since.elapsed();
                        if waited >= limit {
                            return Err(Self::cold_unavailable(waited));
                        }
                    }
                    thread::sleep(Duration::from_millis(yield_for));
                }
            }
        }
    }

    /// Issues the next id and renders it as a 13-character [`Token`].
    ///
    /// # Errors
    ///
    /// Same as [`Self::next_id`].
    pub fn next_token(&self) -> Result<Token> {
        self.next_id().map(Token::from_id)
    }

    /// Makes one attempt to issue an id without sleeping.
    ///
    /// # Returns
    /// - `Ok(IdGenStatus::Ready { id })`: a new id was issued
    /// - `Ok(IdGenStatus::Pending { yield_for })`: the sequence is exhausted for this
    ///   millisecond; nothing was committed
    ///
    /// # Errors
    ///
    /// Same as [`Self::next_id`], except that this method never waits on the
    /// clock and so never times out on it.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_poll_id(&self) -> Result<IdGenStatus> {
        let mut state = self
            .state
            .try_lock_for(self.lock_timeout)
            .ok_or_else(|| Self::cold_unavailable(self.lock_timeout))?;

        let now = self.time.current_millis();
        let Some(offset) = now.checked_sub(self.layout.epoch()) else {
            return Err(Self::cold_clock_behind(now, self.layout.epoch()));
        };
        if offset > self.layout.max_timestamp() {
            return Err(Self::cold_timestamp_overflow(
                offset,
                self.layout.max_timestamp(),
            ));
        }

        let next = match *state {
            None => Issued::first_of(now),
            Some(last) => match now.cmp(&last.timestamp) {
                Ordering::Greater => Issued::first_of(now),
                Ordering::Equal => {
                    let sequence = (last.sequence + 1) & self.layout.sequence_mask();
                    if sequence == 0 {
                        return Ok(IdGenStatus::Pending { yield_for: 1 });
                    }
                    Issued {
                        timestamp: now,
                        sequence,
                    }
                }
                Ordering::Less => return Err(Self::cold_clock_behind(now, last.timestamp)),
            },
        };

        *state = Some(next);
        Ok(IdGenStatus::Ready {
            id: self.layout.pack(next.timestamp, next.sequence),
        })
    }

    #[cold]
    #[inline(never)]
    fn cold_clock_behind(now: u64, last: u64) -> Error {
        #[cfg(feature = "tracing")]
        tracing::warn!(now, last, "clock moved backward, refusing to issue");
        Error::ClockRegression { now, last }
    }

    #[cold]
    #[inline(never)]
    fn cold_timestamp_overflow(offset: u64, max: u64) -> Error {
        #[cfg(feature = "tracing")]
        tracing::error!(offset, max, "timestamp no longer fits the layout");
        Error::TimestampOverflow { offset, max }
    }

    #[cold]
    #[inline(never)]
    fn cold_unavailable(waited: Duration) -> Error {
        #[cfg(feature = "tracing")]
        tracing::warn!(?waited, "generator unavailable");
        Error::Unavailable { waited }
    }
}
