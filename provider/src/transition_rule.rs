//! [`ZoneOffsetTransitionRule`]: a recurring yearly rule that generates one transition per
//! calendar year.

use crate::error::CalendricalError;
use crate::naive::{day_of_week, days_in_month, NaiveDateTime, WeekDay};
use crate::offset::ZoneOffset;
use crate::transition::ZoneOffsetTransition;
use crate::CalendricalResult;

/// How a rule's `time_of_day` is to be interpreted when converting it to an instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeDefinition {
    Utc,
    Standard,
    Wall,
}

impl TimeDefinition {
    /// Converts a local date-time expressed under this time definition to the equivalent
    /// wall-clock local date-time, given the zone's standard offset and the savings in effect
    /// just before the transition.
    #[must_use]
    pub fn to_wall(&self, local: NaiveDateTime, standard_offset: ZoneOffset, offset_before: ZoneOffset) -> NaiveDateTime {
        match self {
            Self::Wall => local,
            Self::Standard => {
                let delta = offset_before.total_seconds() - standard_offset.total_seconds();
                local.plus_seconds(i64::from(delta))
            }
            Self::Utc => {
                let delta = offset_before.total_seconds();
                local.plus_seconds(i64::from(delta))
            }
        }
    }
}

/// A recurring yearly transition rule, e.g. "last Sunday in March at 02:00 wall time".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneOffsetTransitionRule {
    month: u8,
    /// Positive `1..=31`: that day of the month. Negative `-1..=-28`: that many days from the
    /// end of the month (`-1` is the last day).
    day_of_month_indicator: i8,
    day_of_week: Option<WeekDay>,
    hour: u8,
    minute: u8,
    second: u8,
    end_of_day: bool,
    time_definition: TimeDefinition,
    standard_offset: ZoneOffset,
    offset_before: ZoneOffset,
    offset_after: ZoneOffset,
}

impl ZoneOffsetTransitionRule {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        month: u8,
        day_of_month_indicator: i8,
        day_of_week: Option<WeekDay>,
        hour: u8,
        minute: u8,
        second: u8,
        end_of_day: bool,
        time_definition: TimeDefinition,
        standard_offset: ZoneOffset,
        offset_before: ZoneOffset,
        offset_after: ZoneOffset,
    ) -> CalendricalResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(CalendricalError::invalid_field("month", month));
        }
        if !(-28..=31).contains(&day_of_month_indicator) || day_of_month_indicator == 0 {
            return Err(CalendricalError::invalid_field(
                "day_of_month_indicator",
                day_of_month_indicator,
            ));
        }
        if offset_before == offset_after {
            return Err(CalendricalError::invalid_date()
                .with_message("transition rule offset_before must differ from offset_after"));
        }
        Ok(Self {
            month,
            day_of_month_indicator,
            day_of_week,
            hour,
            minute,
            second,
            end_of_day,
            time_definition,
            standard_offset,
            offset_before,
            offset_after,
        })
    }

    #[must_use]
    pub fn offset_before(&self) -> ZoneOffset {
        self.offset_before
    }

    #[must_use]
    pub fn offset_after(&self) -> ZoneOffset {
        self.offset_after
    }

    #[allow(clippy::type_complexity)]
    pub(crate) fn raw_fields(
        &self,
    ) -> (
        u8,
        i8,
        Option<WeekDay>,
        u8,
        u8,
        u8,
        bool,
        TimeDefinition,
        ZoneOffset,
        ZoneOffset,
        ZoneOffset,
    ) {
        (
            self.month,
            self.day_of_month_indicator,
            self.day_of_week,
            self.hour,
            self.minute,
            self.second,
            self.end_of_day,
            self.time_definition,
            self.standard_offset,
            self.offset_before,
            self.offset_after,
        )
    }

    /// Materialises the transition this rule produces in `year`, per the five-step algorithm:
    /// resolve the day-of-month indicator, adjust to the day-of-week if present, roll forward
    /// one day if `end_of_day`, combine with the time-of-day, then convert to wall time under
    /// `time_definition`.
    pub fn create_transition(&self, year: i32) -> CalendricalResult<ZoneOffsetTransition> {
        let day = if self.day_of_month_indicator >= 0 {
            self.day_of_month_indicator as u8
        } else {
            let last_day = days_in_month(year, self.month);
            (last_day as i16 + 1 + i16::from(self.day_of_month_indicator)) as u8
        };

        let mut date = NaiveDateTime::new(year, self.month, day, self.hour, self.minute, self.second)?;

        if let Some(target_dow) = self.day_of_week {
            date = adjust_to_day_of_week(date, target_dow, self.day_of_month_indicator < 0);
        }

        if self.end_of_day {
            date = date.plus_days(1);
        }

        let local_before = self.time_definition.to_wall(date, self.standard_offset, self.offset_before);

        Ok(ZoneOffsetTransition::new(local_before, self.offset_before, self.offset_after))
    }
}

/// Adjusts `date` to the nearest date with `target_dow`. `backward` scans backward-or-equal
/// (used for negative day-of-month indicators, e.g. `lastSun`); otherwise forward-or-equal
/// (e.g. `Sun>=8`).
fn adjust_to_day_of_week(date: NaiveDateTime, target_dow: WeekDay, backward: bool) -> NaiveDateTime {
    let current = day_of_week(date.epoch_day());
    let current_idx = current as i64;
    let target_idx = target_dow as i64;
    let delta = if backward {
        -((current_idx - target_idx).rem_euclid(7))
    } else {
        (target_idx - current_idx).rem_euclid(7)
    };
    date.plus_days(delta)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cet() -> ZoneOffset {
        ZoneOffset::from_hms(1, 0, 0).unwrap()
    }

    fn cest() -> ZoneOffset {
        ZoneOffset::from_hms(2, 0, 0).unwrap()
    }

    /// EU spring-forward: last Sunday in March, 01:00 UTC.
    fn eu_spring_rule() -> ZoneOffsetTransitionRule {
        ZoneOffsetTransitionRule::new(
            3,
            -1,
            Some(WeekDay::Sunday),
            1,
            0,
            0,
            false,
            TimeDefinition::Utc,
            cet(),
            cet(),
            cest(),
        )
        .unwrap()
    }

    #[test]
    fn eu_spring_rule_materialises_last_sunday() {
        let rule = eu_spring_rule();
        let transition = rule.create_transition(2011).unwrap();
        // Last Sunday of March 2011 is the 27th; at 01:00 UTC, wall (CET, +01:00) reads 02:00.
        let local = transition.local_before();
        assert_eq!((local.year, local.month, local.day), (2011, 3, 27));
        assert_eq!((local.hour, local.minute), (2, 0));
        assert!(transition.is_gap());
    }

    #[test]
    fn forward_day_of_week_indicator() {
        // "Sun>=8" in March 2020: March 8, 2020 is itself a Sunday.
        let rule = ZoneOffsetTransitionRule::new(
            3,
            8,
            Some(WeekDay::Sunday),
            2,
            0,
            0,
            false,
            TimeDefinition::Wall,
            cet(),
            cet(),
            cest(),
        )
        .unwrap();
        let transition = rule.create_transition(2020).unwrap();
        assert_eq!(transition.local_before().day, 8);
    }

    #[test]
    fn rejects_equal_offsets() {
        assert!(ZoneOffsetTransitionRule::new(
            3, -1, None, 1, 0, 0, false, TimeDefinition::Utc, cet(), cet(), cet(),
        )
        .is_err());
    }
}
