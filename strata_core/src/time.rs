// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trace timestamps.
//!
//! A [`Timestamp`] pairs the monotonic elapsed-realtime clock that every trace
//! record carries with an optional wall-clock reading. Ordering, equality and
//! hashing consider only the monotonic component; the wall clock is carried
//! for display and correlation with external logs.
//!
//! Durations between timestamps are plain [`core::time::Duration`] values.

use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::ops::{Add, Sub};
use core::time::Duration;

/// A point in a trace's monotonic timeline, in nanoseconds.
#[derive(Clone, Copy, Default)]
pub struct Timestamp {
    elapsed_nanos: u64,
    unix_nanos: Option<u64>,
}

impl Timestamp {
    /// The earliest representable timestamp.
    pub const MIN: Self = Self {
        elapsed_nanos: 0,
        unix_nanos: None,
    };

    /// The latest representable timestamp.
    ///
    /// Used as the finish time of transitions that never reported one.
    pub const MAX: Self = Self {
        elapsed_nanos: u64::MAX,
        unix_nanos: None,
    };

    /// Creates a timestamp from monotonic elapsed nanoseconds.
    #[inline]
    #[must_use]
    pub const fn from_elapsed_nanos(elapsed_nanos: u64) -> Self {
        Self {
            elapsed_nanos,
            unix_nanos: None,
        }
    }

    /// Creates a timestamp carrying both the monotonic and wall-clock readings.
    #[inline]
    #[must_use]
    pub const fn with_unix_nanos(elapsed_nanos: u64, unix_nanos: u64) -> Self {
        Self {
            elapsed_nanos,
            unix_nanos: Some(unix_nanos),
        }
    }

    /// Returns the monotonic elapsed nanoseconds.
    #[inline]
    #[must_use]
    pub const fn elapsed_nanos(self) -> u64 {
        self.elapsed_nanos
    }

    /// Returns the wall-clock nanoseconds since the Unix epoch, if recorded.
    #[inline]
    #[must_use]
    pub const fn unix_nanos(self) -> Option<u64> {
        self.unix_nanos
    }

    /// Returns the duration between `self` and an earlier time, or zero if
    /// `earlier` is after `self`.
    #[inline]
    #[must_use]
    pub const fn saturating_duration_since(self, earlier: Self) -> Duration {
        Duration::from_nanos(self.elapsed_nanos.saturating_sub(earlier.elapsed_nanos))
    }

    /// Checked addition of a duration.
    ///
    /// The wall-clock reading, if any, is shifted by the same amount.
    #[must_use]
    pub fn checked_add(self, duration: Duration) -> Option<Self> {
        let nanos = u64::try_from(duration.as_nanos()).ok()?;
        let elapsed_nanos = self.elapsed_nanos.checked_add(nanos)?;
        let unix_nanos = match self.unix_nanos {
            Some(unix) => Some(unix.checked_add(nanos)?),
            None => None,
        };
        Some(Self {
            elapsed_nanos,
            unix_nanos,
        })
    }

    /// Checked subtraction of a duration.
    #[must_use]
    pub fn checked_sub(self, duration: Duration) -> Option<Self> {
        let nanos = u64::try_from(duration.as_nanos()).ok()?;
        let elapsed_nanos = self.elapsed_nanos.checked_sub(nanos)?;
        let unix_nanos = match self.unix_nanos {
            Some(unix) => Some(unix.checked_sub(nanos)?),
            None => None,
        };
        Some(Self {
            elapsed_nanos,
            unix_nanos,
        })
    }
}

impl PartialEq for Timestamp {
    fn eq(&self, other: &Self) -> bool {
        self.elapsed_nanos == other.elapsed_nanos
    }
}

impl Eq for Timestamp {}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        self.elapsed_nanos.cmp(&other.elapsed_nanos)
    }
}

impl Hash for Timestamp {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.elapsed_nanos.hash(state);
    }
}

impl Add<Duration> for Timestamp {
    type Output = Self;

    /// # Panics
    ///
    /// Panics on overflow.
    #[inline]
    fn add(self, rhs: Duration) -> Self {
        self.checked_add(rhs)
            .unwrap_or_else(|| panic!("timestamp overflow: {self:?} + {rhs:?}"))
    }
}

impl Sub<Duration> for Timestamp {
    type Output = Self;

    /// # Panics
    ///
    /// Panics on underflow.
    #[inline]
    fn sub(self, rhs: Duration) -> Self {
        self.checked_sub(rhs)
            .unwrap_or_else(|| panic!("timestamp underflow: {self:?} - {rhs:?}"))
    }
}

impl Sub for Timestamp {
    type Output = Duration;

    #[inline]
    fn sub(self, rhs: Self) -> Duration {
        self.saturating_duration_since(rhs)
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unix_nanos {
            Some(unix) => write!(f, "Timestamp({}ns, unix {}ns)", self.elapsed_nanos, unix),
            None => write!(f, "Timestamp({}ns)", self.elapsed_nanos),
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::MIN {
            return f.write_str("min");
        }
        if *self == Self::MAX {
            return f.write_str("max");
        }
        let secs = self.elapsed_nanos / 1_000_000_000;
        let millis = (self.elapsed_nanos / 1_000_000) % 1000;
        let micros = (self.elapsed_nanos / 1_000) % 1000;
        write!(f, "{secs}s{millis:03}ms{micros:03}us")
    }
}

/// Something that sits at a single point on a trace timeline.
pub trait Timestamped {
    /// The position of this item on the trace timeline.
    fn timestamp(&self) -> Timestamp;
}

/// Returns the sub-slice of `items` whose timestamps lie in `from..=to`.
///
/// `items` must already be sorted by timestamp.
#[must_use]
pub fn slice_by_time<T: Timestamped>(items: &[T], from: Timestamp, to: Timestamp) -> &[T] {
    if from > to {
        return &[];
    }
    let start = items.partition_point(|e| e.timestamp() < from);
    let end = items.partition_point(|e| e.timestamp() <= to);
    &items[start..end.max(start)]
}
