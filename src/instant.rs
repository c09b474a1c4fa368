//! [`Instant`] and [`Duration`]: a point on, and a span of, the nominal UTC-like time-line.
//!
//! Both are represented as a whole-seconds field plus a non-negative nanosecond-of-second
//! field, normalised on construction the same way `java.time.Instant`/`Duration` are. This is
//! deliberately a simpler model than a single `i128` nanosecond count: it keeps the common
//! case (second-granularity zone math) free of 128-bit arithmetic and mirrors the two-field
//! shape the zone engine's lower layers (`UTCInstant`, `TAIInstant`) already use.

use crate::error::CalendricalError;
use crate::safe_math::{checked_add, checked_mul, checked_sub, floor_div, floor_mod};
use crate::CalendricalResult;

const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// A point on the nominal time-line: seconds since the 1970-01-01T00:00:00Z epoch, plus
/// nanosecond-of-second in `[0, 1_000_000_000)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Instant {
    epoch_seconds: i64,
    nano_of_second: u32,
}

impl Instant {
    /// The 1970-01-01T00:00:00Z epoch instant.
    pub const EPOCH: Self = Self {
        epoch_seconds: 0,
        nano_of_second: 0,
    };

    /// Builds an `Instant` from seconds plus a (possibly out-of-range, possibly negative)
    /// nanosecond adjustment, normalising via floor-div/floor-mod.
    pub fn of_epoch_seconds(seconds: i64, nano_adjustment: i64) -> CalendricalResult<Self> {
        let extra_seconds = floor_div(nano_adjustment, NANOS_PER_SECOND);
        let nanos = floor_mod(nano_adjustment, NANOS_PER_SECOND);
        let epoch_seconds = checked_add(seconds, extra_seconds)?;
        Ok(Self {
            epoch_seconds,
            nano_of_second: nanos as u32,
        })
    }

    /// Builds an `Instant` from a millisecond epoch value.
    pub fn of_epoch_millis(epoch_millis: i64) -> CalendricalResult<Self> {
        let seconds = floor_div(epoch_millis, 1_000);
        let millis = floor_mod(epoch_millis, 1_000);
        Self::of_epoch_seconds(seconds, checked_mul(millis, 1_000_000)?)
    }

    #[must_use]
    pub fn epoch_seconds(&self) -> i64 {
        self.epoch_seconds
    }

    #[must_use]
    pub fn nano_of_second(&self) -> u32 {
        self.nano_of_second
    }

    /// Converts to a millisecond epoch value, failing if it would overflow `i64`.
    pub fn to_epoch_millis_long(&self) -> CalendricalResult<i64> {
        let millis_from_seconds = checked_mul(self.epoch_seconds, 1_000)?;
        checked_add(millis_from_seconds, i64::from(self.nano_of_second / 1_000_000))
    }

    /// Adds a [`Duration`], normalising and checking for overflow.
    pub fn plus(&self, duration: Duration) -> CalendricalResult<Self> {
        let seconds = checked_add(self.epoch_seconds, duration.seconds())?;
        let nanos = i64::from(self.nano_of_second) + i64::from(duration.nanos());
        Self::of_epoch_seconds(seconds, nanos)
    }

    /// Subtracts a [`Duration`].
    pub fn minus(&self, duration: Duration) -> CalendricalResult<Self> {
        self.plus(duration.negated()?)
    }

    pub fn plus_seconds(&self, seconds: i64) -> CalendricalResult<Self> {
        Self::of_epoch_seconds(checked_add(self.epoch_seconds, seconds)?, i64::from(self.nano_of_second))
    }

    pub fn plus_millis(&self, millis: i64) -> CalendricalResult<Self> {
        self.plus(Duration::of_millis(millis)?)
    }

    pub fn plus_nanos(&self, nanos: i64) -> CalendricalResult<Self> {
        Self::of_epoch_seconds(self.epoch_seconds, i64::from(self.nano_of_second) + nanos)
    }
}

/// A signed span of time with the same two-field shape as [`Instant`]. The sign is carried
/// entirely by `seconds`; `nanos` is always non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Duration {
    seconds: i64,
    nanos: u32,
}

/// A unit of duration, used by [`Duration::of`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationUnit {
    Nanos,
    Micros,
    Millis,
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl DurationUnit {
    fn nanos_per_unit(self) -> i64 {
        match self {
            Self::Nanos => 1,
            Self::Micros => 1_000,
            Self::Millis => 1_000_000,
            Self::Seconds => NANOS_PER_SECOND,
            Self::Minutes => 60 * NANOS_PER_SECOND,
            Self::Hours => 3_600 * NANOS_PER_SECOND,
            Self::Days => 86_400 * NANOS_PER_SECOND,
        }
    }
}

impl Duration {
    pub const ZERO: Self = Self { seconds: 0, nanos: 0 };

    /// Builds a `Duration` from seconds plus a nanosecond adjustment, normalising.
    pub fn of_seconds(seconds: i64, nano_adjustment: i64) -> CalendricalResult<Self> {
        let extra_seconds = floor_div(nano_adjustment, NANOS_PER_SECOND);
        let nanos = floor_mod(nano_adjustment, NANOS_PER_SECOND);
        Ok(Self {
            seconds: checked_add(seconds, extra_seconds)?,
            nanos: nanos as u32,
        })
    }

    pub fn of_millis(millis: i64) -> CalendricalResult<Self> {
        Self::of(millis, DurationUnit::Millis)
    }

    pub fn of_nanos(nanos: i64) -> CalendricalResult<Self> {
        Self::of(nanos, DurationUnit::Nanos)
    }

    /// Builds a `Duration` from an integer `amount` of the given `unit`, via checked
    /// multiplication into nanoseconds.
    pub fn of(amount: i64, unit: DurationUnit) -> CalendricalResult<Self> {
        let total_nanos = checked_mul(amount, unit.nanos_per_unit())?;
        Self::of_seconds(0, total_nanos)
    }

    #[must_use]
    pub fn seconds(&self) -> i64 {
        self.seconds
    }

    #[must_use]
    pub fn nanos(&self) -> u32 {
        self.nanos
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.seconds == 0 && self.nanos == 0
    }

    /// Negates this duration, failing only at the `i64::MIN` boundary.
    ///
    /// `seconds` carries the sign, so a nonzero `nanos` remainder means the true value is
    /// `seconds + nanos/1e9`; negating it yields `-(seconds + 1)` seconds and `1e9 - nanos`
    /// nanoseconds.
    pub fn negated(&self) -> CalendricalResult<Self> {
        if self.nanos == 0 {
            return Ok(Self {
                seconds: crate::safe_math::checked_neg(self.seconds)?,
                nanos: 0,
            });
        }
        let neg_seconds = crate::safe_math::checked_neg(checked_add(self.seconds, 1)?)?;
        Ok(Self {
            seconds: neg_seconds,
            nanos: (NANOS_PER_SECOND as u32) - self.nanos,
        })
    }

    pub fn plus(&self, other: Self) -> CalendricalResult<Self> {
        let seconds = checked_add(self.seconds, other.seconds)?;
        let nanos = i64::from(self.nanos) + i64::from(other.nanos);
        Self::of_seconds(seconds, nanos)
    }

    pub fn minus(&self, other: Self) -> CalendricalResult<Self> {
        self.plus(other.negated()?)
    }

    /// Multiplies by an integer scalar.
    pub fn multiplied_by(&self, scalar: i64) -> CalendricalResult<Self> {
        let seconds = checked_mul(self.seconds, scalar)?;
        let nanos = checked_mul(i64::from(self.nanos), scalar)?;
        Self::of_seconds(seconds, nanos)
    }

    /// Divides by an integer scalar, truncating towards negative infinity.
    pub fn divided_by(&self, scalar: i64) -> CalendricalResult<Self> {
        if scalar == 0 {
            return Err(CalendricalError::overflow());
        }
        let total_nanos = checked_add(
            checked_mul(self.seconds, NANOS_PER_SECOND)?,
            i64::from(self.nanos),
        )?;
        let divided = floor_div(total_nanos, scalar);
        Self::of_seconds(0, divided)
    }
}

impl core::ops::Sub<Instant> for Instant {
    type Output = CalendricalResult<Duration>;

    fn sub(self, rhs: Instant) -> Self::Output {
        let seconds = checked_sub(self.epoch_seconds, rhs.epoch_seconds)?;
        let nanos = i64::from(self.nano_of_second) - i64::from(rhs.nano_of_second);
        Duration::of_seconds(seconds, nanos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalisation_idempotence() {
        let i = Instant::of_epoch_seconds(100, 5_000_000_000).unwrap();
        let roundtrip = Instant::of_epoch_seconds(i.epoch_seconds(), i64::from(i.nano_of_second())).unwrap();
        assert_eq!(i, roundtrip);
        assert_eq!(i.epoch_seconds(), 105);
        assert_eq!(i.nano_of_second(), 0);
    }

    #[test]
    fn negative_nano_adjustment_borrows_a_second() {
        let i = Instant::of_epoch_seconds(10, -1).unwrap();
        assert_eq!(i.epoch_seconds(), 9);
        assert_eq!(i.nano_of_second(), 999_999_999);
    }

    #[test]
    fn duration_sign_is_carried_by_seconds() {
        let d = Duration::of_seconds(0, -1).unwrap();
        assert_eq!(d.seconds(), -1);
        assert_eq!(d.nanos(), 999_999_999);
    }

    #[test]
    fn duration_negate_roundtrip() {
        let d = Duration::of_seconds(5, 250_000_000).unwrap();
        let negated = d.negated().unwrap();
        assert_eq!(negated.seconds(), -6);
        assert_eq!(negated.nanos(), 750_000_000);
        assert_eq!(negated.negated().unwrap(), d);
    }

    #[test]
    fn instant_plus_duration() {
        let i = Instant::of_epoch_seconds(0, 0).unwrap();
        let d = Duration::of(90, DurationUnit::Minutes).unwrap();
        let result = i.plus(d).unwrap();
        assert_eq!(result.epoch_seconds(), 5_400);
    }

    #[test]
    fn epoch_millis_overflow_guard() {
        let i = Instant::of_epoch_seconds(i64::MAX, 0).unwrap();
        assert!(i.to_epoch_millis_long().is_err());
    }
}
