//! The TZDB text grammar's lexical building blocks: months, weekdays, the day-of-month
//! indicator grammar (`lastSun`, `Sun>=8`, `Fri<=10`), and qualified times (the `s`/`u`/`g`/`z`/
//! `w` suffixes).

use tzcore_provider::error::CalendricalError;
use tzcore_provider::naive::WeekDay as ProviderWeekDay;
use tzcore_provider::transition_rule::TimeDefinition;
use tzcore_provider::CalendricalResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Month {
    Jan = 1,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

impl Month {
    pub fn parse(token: &str) -> CalendricalResult<Self> {
        Ok(match token {
            "Jan" => Self::Jan,
            "Feb" => Self::Feb,
            "Mar" => Self::Mar,
            "Apr" => Self::Apr,
            "May" => Self::May,
            "Jun" => Self::Jun,
            "Jul" => Self::Jul,
            "Aug" => Self::Aug,
            "Sep" => Self::Sep,
            "Oct" => Self::Oct,
            "Nov" => Self::Nov,
            "Dec" => Self::Dec,
            other => return Err(parse_error(other)),
        })
    }

    #[must_use]
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Day of week, `Sun = 0` through `Sat = 6`, matching [`ProviderWeekDay`]'s numbering directly
/// so rule materialisation never needs to translate between two conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WeekDay {
    Sun = 0,
    Mon = 1,
    Tue = 2,
    Wed = 3,
    Thu = 4,
    Fri = 5,
    Sat = 6,
}

impl WeekDay {
    pub fn parse(token: &str) -> CalendricalResult<Self> {
        Ok(match token {
            "Sun" => Self::Sun,
            "Mon" => Self::Mon,
            "Tue" => Self::Tue,
            "Wed" => Self::Wed,
            "Thu" => Self::Thu,
            "Fri" => Self::Fri,
            "Sat" => Self::Sat,
            other => return Err(parse_error(other)),
        })
    }

    #[must_use]
    pub fn to_provider(self) -> ProviderWeekDay {
        ProviderWeekDay::from_index(self as u8)
    }
}

/// The day-of-month indicator grammar: a bare day number, the last weekday of the month, or a
/// weekday constrained to be on-or-after / on-or-before a given day number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayOfMonthRule {
    Day(u8),
    LastWeekDay(WeekDay),
    WeekDayOnOrAfter(WeekDay, u8),
    WeekDayOnOrBefore(WeekDay, u8),
}

impl DayOfMonthRule {
    pub fn parse(token: &str) -> CalendricalResult<Self> {
        if let Some(rest) = token.strip_prefix("last") {
            return Ok(Self::LastWeekDay(WeekDay::parse(rest)?));
        }
        if let Some((weekday, day)) = token.split_once(">=") {
            return Ok(Self::WeekDayOnOrAfter(WeekDay::parse(weekday)?, parse_u8(day)?));
        }
        if let Some((weekday, day)) = token.split_once("<=") {
            return Ok(Self::WeekDayOnOrBefore(WeekDay::parse(weekday)?, parse_u8(day)?));
        }
        Ok(Self::Day(parse_u8(token)?))
    }

    /// Converts to the provider's `(day_of_month_indicator, day_of_week)` pair for
    /// [`tzcore_provider::transition_rule::ZoneOffsetTransitionRule::new`].
    #[must_use]
    pub fn to_indicator(self) -> (i8, Option<ProviderWeekDay>) {
        match self {
            Self::Day(d) => (d as i8, None),
            Self::LastWeekDay(w) => (-1, Some(w.to_provider())),
            Self::WeekDayOnOrAfter(w, d) => (d as i8, Some(w.to_provider())),
            Self::WeekDayOnOrBefore(w, d) => (-(d as i8), Some(w.to_provider())),
        }
    }
}

/// A signed `h[:mm[:ss]]` clock time, as used for rule `AT`/`SAVE` columns and zone `STDOFF`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClockTime {
    pub negative: bool,
    pub hour: i32,
    pub minute: i32,
    pub second: i32,
}

impl ClockTime {
    pub fn parse(token: &str) -> CalendricalResult<Self> {
        let (negative, token) = match token.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, token),
        };
        let mut parts = token.split(':');
        let hour = parts.next().map(parse_i32).transpose()?.unwrap_or(0);
        let minute = parts.next().map(parse_i32).transpose()?.unwrap_or(0);
        let second = parts.next().map(parse_i32).transpose()?.unwrap_or(0);
        Ok(Self {
            negative,
            hour,
            minute,
            second,
        })
    }

    #[must_use]
    pub fn to_total_seconds(self) -> i32 {
        let magnitude = self.hour * 3_600 + self.minute * 60 + self.second;
        if self.negative {
            -magnitude
        } else {
            magnitude
        }
    }
}

/// A clock time qualified by which time-line it is expressed against: wall (`w`, default),
/// standard (`s`), or universal (`u`/`g`/`z`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualifiedTime {
    pub time: ClockTime,
    pub definition: TimeDefinition,
}

impl QualifiedTime {
    pub fn parse(token: &str) -> CalendricalResult<Self> {
        let (definition, stripped) = if let Some(rest) = strip_any_suffix(token, &['s']) {
            (TimeDefinition::Standard, rest)
        } else if let Some(rest) = strip_any_suffix(token, &['u', 'g', 'z']) {
            (TimeDefinition::Utc, rest)
        } else if let Some(rest) = strip_any_suffix(token, &['w']) {
            (TimeDefinition::Wall, rest)
        } else {
            (TimeDefinition::Wall, token)
        };
        Ok(Self {
            time: ClockTime::parse(stripped)?,
            definition,
        })
    }
}

fn strip_any_suffix<'a>(token: &'a str, suffixes: &[char]) -> Option<&'a str> {
    let last = token.chars().last()?;
    if suffixes.contains(&last) {
        Some(&token[..token.len() - last.len_utf8()])
    } else {
        None
    }
}

/// The `TO` column of a `RULE` line: either a literal year or `max`/`only`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToYear {
    Only,
    Max,
    Year(i32),
}

impl ToYear {
    pub fn parse(token: &str) -> CalendricalResult<Self> {
        Ok(match token {
            "only" => Self::Only,
            "max" => Self::Max,
            other => Self::Year(parse_i32(other)?),
        })
    }

    #[must_use]
    pub fn resolve(self, from_year: i32) -> i32 {
        match self {
            Self::Only => from_year,
            Self::Max => i32::MAX,
            Self::Year(y) => y,
        }
    }
}

fn parse_u8(token: &str) -> CalendricalResult<u8> {
    token.parse::<u8>().map_err(|_| parse_error(token))
}

fn parse_i32(token: &str) -> CalendricalResult<i32> {
    token.parse::<i32>().map_err(|_| parse_error(token))
}

fn parse_error(token: &str) -> CalendricalError {
    CalendricalError::parse(token, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_last_sunday() {
        let rule = DayOfMonthRule::parse("lastSun").unwrap();
        assert_eq!(rule, DayOfMonthRule::LastWeekDay(WeekDay::Sun));
        assert_eq!(rule.to_indicator(), (-1, Some(ProviderWeekDay::Sunday)));
    }

    #[test]
    fn parses_on_or_after() {
        let rule = DayOfMonthRule::parse("Sun>=8").unwrap();
        assert_eq!(rule, DayOfMonthRule::WeekDayOnOrAfter(WeekDay::Sun, 8));
    }

    #[test]
    fn parses_on_or_before() {
        let rule = DayOfMonthRule::parse("Fri<=10").unwrap();
        assert_eq!(rule, DayOfMonthRule::WeekDayOnOrBefore(WeekDay::Fri, 10));
        assert_eq!(rule.to_indicator(), (-10, Some(ProviderWeekDay::Friday)));
    }

    #[test]
    fn parses_negative_clock_time() {
        let t = ClockTime::parse("-5:30").unwrap();
        assert_eq!(t.to_total_seconds(), -(5 * 3_600 + 30 * 60));
    }

    #[test]
    fn qualified_time_suffixes() {
        assert_eq!(QualifiedTime::parse("2:00").unwrap().definition, TimeDefinition::Wall);
        assert_eq!(QualifiedTime::parse("2:00w").unwrap().definition, TimeDefinition::Wall);
        assert_eq!(QualifiedTime::parse("2:00s").unwrap().definition, TimeDefinition::Standard);
        assert_eq!(QualifiedTime::parse("2:00u").unwrap().definition, TimeDefinition::Utc);
        assert_eq!(QualifiedTime::parse("1:00").unwrap().time.to_total_seconds(), 3_600);
    }

    #[test]
    fn to_year_resolves_only_and_max() {
        assert_eq!(ToYear::parse("only").unwrap().resolve(1987), 1987);
        assert_eq!(ToYear::parse("max").unwrap().resolve(1987), i32::MAX);
        assert_eq!(ToYear::parse("2007").unwrap().resolve(1987), 2007);
    }
}
