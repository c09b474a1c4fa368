//! [`ZoneOffset`]: a fixed offset from UTC.

use crate::error::CalendricalError;
use crate::CalendricalResult;
use core::fmt;

const MAX_SECONDS: i32 = 18 * 3_600;

/// A fixed offset from UTC in whole seconds, within `±18:00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ZoneOffset {
    total_seconds: i32,
}

impl ZoneOffset {
    pub const UTC: Self = Self { total_seconds: 0 };

    /// Builds a `ZoneOffset` from a total-seconds value, failing if it falls outside
    /// `±18:00`.
    pub fn from_total_seconds(total_seconds: i32) -> CalendricalResult<Self> {
        if total_seconds.unsigned_abs() > MAX_SECONDS as u32 {
            return Err(CalendricalError::invalid_field("zone_offset_seconds", total_seconds));
        }
        Ok(Self { total_seconds })
    }

    /// Builds a `ZoneOffset` from signed hours, minutes, and seconds components, which must
    /// all share the same sign (or be zero).
    pub fn from_hms(hours: i32, minutes: i32, seconds: i32) -> CalendricalResult<Self> {
        let total = hours * 3_600 + minutes * 60 + seconds;
        Self::from_total_seconds(total)
    }

    #[must_use]
    pub fn total_seconds(&self) -> i32 {
        self.total_seconds
    }
}

impl fmt::Display for ZoneOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.total_seconds == 0 {
            return write!(f, "Z");
        }
        let sign = if self.total_seconds < 0 { '-' } else { '+' };
        let abs = self.total_seconds.unsigned_abs();
        let (h, m, s) = (abs / 3_600, (abs % 3_600) / 60, abs % 60);
        if s == 0 {
            write!(f, "{sign}{h:02}:{m:02}")
        } else {
            write!(f, "{sign}{h:02}:{m:02}:{s:02}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn rejects_out_of_range() {
        assert!(ZoneOffset::from_total_seconds(MAX_SECONDS + 1).is_err());
        assert!(ZoneOffset::from_total_seconds(-MAX_SECONDS - 1).is_err());
        assert!(ZoneOffset::from_total_seconds(MAX_SECONDS).is_ok());
    }

    #[test]
    fn display_formats() {
        assert_eq!(ZoneOffset::UTC.to_string(), "Z");
        assert_eq!(ZoneOffset::from_hms(1, 0, 0).unwrap().to_string(), "+01:00");
        assert_eq!(ZoneOffset::from_hms(-5, -30, 0).unwrap().to_string(), "-05:30");
    }

    #[test]
    fn ordering_is_by_total_seconds() {
        let a = ZoneOffset::from_hms(1, 0, 0).unwrap();
        let b = ZoneOffset::from_hms(2, 0, 0).unwrap();
        assert!(a < b);
    }
}
