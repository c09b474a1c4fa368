//! UTC and TAI instants, and the process-wide leap-second table that relates them.
//!
//! The sorted-array-plus-search shape here follows the wider date-time ecosystem's standard
//! idiom for leap-second tables (parallel `dates`/`offsets`/`tai_seconds` arrays, binary search
//! for the active record), adapted to this crate's exact three-array model. The table itself is
//! held behind a `RwLock`, the same read-mostly-cache pattern `rules.rs`'s `year_cache` and
//! `resource_provider.rs`'s `cache` use.

use crate::error::CalendricalError;
use crate::safe_math::{floor_div, floor_mod};
use crate::CalendricalResult;
use std::sync::RwLock;

const NANOS_PER_SECOND: i64 = 1_000_000_000;
const SECONDS_PER_DAY: i64 = 86_400;

/// MJD of the TAI epoch, 1958-01-01T00:00:00.
const MJD_TAI_EPOCH: i64 = 36_204;

/// The UTC−TAI offset (whole seconds) before the first registered leap second.
const INITIAL_OFFSET: i64 = 10;

/// An instant expressed as Modified Julian Day plus nanosecond-of-day. `nano_of_day` may
/// exceed `86_400 * 1e9` by up to one second on a day with a positive leap second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct UtcInstant {
    pub mjd: i64,
    pub nano_of_day: i64,
}

/// A continuous instant: seconds since the TAI epoch (1958-01-01T00:00:00 TAI), which does
/// not stop for leap seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TaiInstant {
    pub tai_seconds: i64,
    pub nanos: u32,
}

/// The immutable snapshot a [`LeapSecondTable`] atomically swaps between. Three arrays,
/// sorted ascending by `dates`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct LeapSecondData {
    dates: Vec<i64>,
    offsets: Vec<i64>,
    tai_seconds: Vec<i64>,
}

impl LeapSecondData {
    fn offset_before(&self, mjd: i64) -> i64 {
        match self.dates.iter().rposition(|&d| d < mjd) {
            Some(i) => self.offsets[i],
            None => INITIAL_OFFSET,
        }
    }

    fn push(&mut self, mjd: i64, adjustment: i64) -> CalendricalResult<()> {
        if adjustment != 1 && adjustment != -1 {
            return Err(CalendricalError::invalid_field("leap_adjustment", adjustment));
        }
        if let Some(&last) = self.dates.last() {
            if mjd <= last {
                return Err(CalendricalError::invalid_date()
                    .with_message("leap second date must be strictly after the last registered leap"));
            }
        }
        let previous_offset = self.offsets.last().copied().unwrap_or(INITIAL_OFFSET);
        let new_offset = previous_offset + adjustment;
        let tai_seconds = (mjd + 1 - MJD_TAI_EPOCH) * SECONDS_PER_DAY + new_offset;
        self.dates.push(mjd);
        self.offsets.push(new_offset);
        self.tai_seconds.push(tai_seconds);
        Ok(())
    }
}

/// A process-wide, append-only table of leap seconds, held behind a `RwLock` so registration
/// (rare, exclusive) never blocks the many concurrent readers resolving UTC/TAI instants.
pub struct LeapSecondTable {
    current: RwLock<LeapSecondData>,
}

impl Default for LeapSecondTable {
    fn default() -> Self {
        Self::new()
    }
}

impl LeapSecondTable {
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: RwLock::new(LeapSecondData::default()),
        }
    }

    fn load(&self) -> LeapSecondData {
        self.current.read().unwrap().clone()
    }

    /// Parses the plain-text leap-second resource format: one `YYYY-MM-DD N` record per
    /// non-blank, non-comment (`#`) line.
    pub fn from_resource_text(text: &str) -> CalendricalResult<Self> {
        let mut data = LeapSecondData::default();
        let mut previous_offset = INITIAL_OFFSET;
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.split_whitespace();
            let date = parts.next().ok_or_else(|| CalendricalError::parse(line, 0))?;
            let offset_str = parts.next().ok_or_else(|| CalendricalError::parse(line, 0))?;
            let mjd = mjd_from_iso_date(date).ok_or_else(|| CalendricalError::parse(date, 0))?;
            let offset: i64 = offset_str
                .parse()
                .map_err(|_| CalendricalError::parse(offset_str, 0))?;
            let adjustment = offset - previous_offset;
            if ![-1, 0, 1].contains(&adjustment) {
                return Err(CalendricalError::config()
                    .with_message("adjacent leap-second offsets must differ by at most one"));
            }
            if adjustment != 0 {
                data.push(mjd, adjustment)?;
            }
            previous_offset = offset;
        }
        Ok(Self {
            current: RwLock::new(data),
        })
    }

    /// Registers a new leap second. `adjustment` must be `+1` or `-1`, and `mjd` must be
    /// strictly after the last registered leap. Holds the table's write lock for the duration,
    /// so concurrent registrations simply serialize rather than race.
    pub fn register_leap_second(&self, mjd: i64, adjustment: i64) -> CalendricalResult<()> {
        self.current.write().unwrap().push(mjd, adjustment)
    }

    fn offset_before(&self, mjd: i64) -> i64 {
        self.load().offset_before(mjd)
    }

    /// Converts a [`TaiInstant`] to the corresponding [`UtcInstant`] under the table's current
    /// snapshot.
    #[must_use]
    pub fn tai_to_utc(&self, tai: TaiInstant) -> UtcInstant {
        let data = self.load();
        let idx = data.tai_seconds.iter().rposition(|&t| t <= tai.tai_seconds);
        let offset = idx.map(|i| data.offsets[i]).unwrap_or(INITIAL_OFFSET);
        let adjusted = tai.tai_seconds - offset;
        let mut mjd = floor_div(adjusted, SECONDS_PER_DAY) + MJD_TAI_EPOCH;
        let mut nano_of_day = floor_mod(adjusted, SECONDS_PER_DAY) * NANOS_PER_SECOND + i64::from(tai.nanos);

        // If `mjd` is the day immediately after a leap-table entry but we resolved it using
        // that entry's *pre*-leap offset, the instant actually lies in the prior day's
        // 86,401st second.
        if let Some(j) = data.dates.iter().position(|&d| d + 1 == mjd) {
            let pre_leap_offset = if j == 0 {
                INITIAL_OFFSET
            } else {
                data.offsets[j - 1]
            };
            if offset == pre_leap_offset && data.offsets[j] != pre_leap_offset {
                mjd -= 1;
                nano_of_day += SECONDS_PER_DAY * NANOS_PER_SECOND;
            }
        }
        UtcInstant { mjd, nano_of_day }
    }

    /// Converts a [`UtcInstant`] to the corresponding [`TaiInstant`]; the algebraic inverse of
    /// [`LeapSecondTable::tai_to_utc`].
    #[must_use]
    pub fn utc_to_tai(&self, utc: UtcInstant) -> TaiInstant {
        let data = self.load();
        let in_leap_slot = utc.nano_of_day >= SECONDS_PER_DAY * NANOS_PER_SECOND;
        let offset = if in_leap_slot {
            // The extra second belongs to the offset in force *before* this day's own leap.
            match data.dates.iter().position(|&d| d == utc.mjd) {
                Some(0) => INITIAL_OFFSET,
                Some(j) => data.offsets[j - 1],
                None => data.offset_before(utc.mjd),
            }
        } else {
            data.offset_before(utc.mjd)
        };
        let tai_seconds = (utc.mjd - MJD_TAI_EPOCH) * SECONDS_PER_DAY
            + floor_div(utc.nano_of_day, NANOS_PER_SECOND)
            + offset;
        let nanos = floor_mod(utc.nano_of_day, NANOS_PER_SECOND) as u32;
        TaiInstant { tai_seconds, nanos }
    }
}

/// Parses a plain `YYYY-MM-DD` date into its Modified Julian Day.
fn mjd_from_iso_date(text: &str) -> Option<i64> {
    let mut parts = text.splitn(3, '-');
    let year: i32 = parts.next()?.parse().ok()?;
    let month: u8 = parts.next()?.parse().ok()?;
    let day: u8 = parts.next()?.parse().ok()?;
    const MJD_UNIX_EPOCH: i64 = 40_587;
    Some(crate::naive::days_from_civil(year, month, day) + MJD_UNIX_EPOCH)
}

impl UtcInstant {
    /// True if this instant's nanosecond-of-day extends into a positive leap second.
    #[must_use]
    pub fn is_in_leap_second(&self) -> bool {
        self.nano_of_day >= SECONDS_PER_DAY * NANOS_PER_SECOND
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paris_style_table() -> LeapSecondTable {
        // A single positive leap second at the end of 1972-06-30 (MJD 41498).
        LeapSecondTable::from_resource_text(
            "# comment\n1972-01-01 10\n1972-07-01 11\n",
        )
        .unwrap()
    }

    #[test]
    fn leap_second_roundtrip() {
        let table = paris_style_table();
        let leap_day_mjd = crate::naive::days_from_civil(1972, 6, 30) + 40_587;
        let utc = UtcInstant {
            mjd: leap_day_mjd,
            nano_of_day: 86_400 * NANOS_PER_SECOND, // the leap second itself, ns 0 into it
        };
        assert!(utc.is_in_leap_second());
        let tai = table.utc_to_tai(utc);
        let back = table.tai_to_utc(tai);
        assert_eq!(utc, back);
    }

    #[test]
    fn leap_second_free_roundtrip() {
        let table = paris_style_table();
        let utc = UtcInstant {
            mjd: crate::naive::days_from_civil(2000, 1, 1) + 40_587,
            nano_of_day: 12 * 3_600 * NANOS_PER_SECOND,
        };
        let tai = table.utc_to_tai(utc);
        assert_eq!(table.tai_to_utc(tai), utc);
    }

    #[test]
    fn register_then_query() {
        let table = LeapSecondTable::new();
        let mjd = crate::naive::days_from_civil(2016, 12, 31) + 40_587;
        table.register_leap_second(mjd, 1).unwrap();
        assert_eq!(table.offset_before(mjd + 1), INITIAL_OFFSET + 1);
        assert_eq!(table.offset_before(mjd), INITIAL_OFFSET);
    }

    #[test]
    fn register_rejects_non_unit_adjustment() {
        let table = LeapSecondTable::new();
        assert!(table.register_leap_second(60_000, 2).is_err());
    }

    #[test]
    fn register_rejects_non_increasing_date() {
        let table = LeapSecondTable::new();
        let mjd = crate::naive::days_from_civil(2016, 12, 31) + 40_587;
        table.register_leap_second(mjd, 1).unwrap();
        assert!(table.register_leap_second(mjd, 1).is_err());
        assert!(table.register_leap_second(mjd - 1, 1).is_err());
    }
}
