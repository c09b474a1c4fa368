//! [`ZoneRulesBuilder`]: turns one zone's parsed `Zone` block (plus whatever named `Rule` set(s)
//! it references) into a [`StandardZoneRules`].
//!
//! The algorithm walks the zone's continuation segments in file order. A segment with no named
//! rule set (`-`) or a literal `SAVE` amount (`RuleRef::Fixed`) contributes a single constant
//! wall offset for its lifetime. A segment with a named rule set (`RuleRef::Named`) walks the
//! segment's years in order, tracking the savings amount currently in effect, and materialises
//! one transition per applicable rule per year via
//! [`ZoneOffsetTransitionRule::create_transition`], the same machinery the runtime uses to
//! extrapolate the open-ended tail.

use crate::grammar::{DayOfMonthRule, Month};
use crate::parser::{ParsedSource, RuleRef, ZoneBlock};
use alloc::vec::Vec;
use core::ops::RangeInclusive;
use tzcore_provider::error::CalendricalError;
use tzcore_provider::naive::NaiveDateTime;
use tzcore_provider::offset::ZoneOffset;
use tzcore_provider::rules::StandardZoneRules;
use tzcore_provider::transition::ZoneOffsetTransition;
use tzcore_provider::transition_rule::{TimeDefinition, ZoneOffsetTransitionRule};
use tzcore_provider::CalendricalResult;

/// Configures and runs the TZDB-to-`StandardZoneRules` materialisation for one zone.
pub struct ZoneRulesBuilder {
    year_range: RangeInclusive<i32>,
}

impl ZoneRulesBuilder {
    #[must_use]
    pub fn new(year_range: RangeInclusive<i32>) -> Self {
        Self { year_range }
    }

    /// Materialises `zone_name`'s rules out of `source`.
    pub fn build(&self, source: &ParsedSource, zone_name: &str) -> CalendricalResult<StandardZoneRules> {
        let block = source
            .zones
            .iter()
            .find(|z| z.name == zone_name)
            .ok_or_else(|| CalendricalError::config().with_message("unknown zone name"))?;
        self.build_block(source, block)
    }

    fn build_block(&self, source: &ParsedSource, block: &ZoneBlock) -> CalendricalResult<StandardZoneRules> {
        let mut wall_transitions: Vec<ZoneOffsetTransition> = Vec::new();
        let mut std_transition_epoch_seconds: Vec<i64> = Vec::new();
        let mut std_offsets: Vec<ZoneOffset> = Vec::new();
        let mut last_rules: Vec<ZoneOffsetTransitionRule> = Vec::new();

        // The savings amount in effect at the start of the segment currently being processed.
        let mut current_save_seconds: i32 = 0;

        for (segment_index, line) in block.lines.iter().enumerate() {
            let std_offset = ZoneOffset::from_total_seconds(line.std_offset.to_total_seconds())?;
            if std_offsets.last().copied() != Some(std_offset) {
                std_offsets.push(std_offset);
                if segment_index > 0 {
                    // The instant this segment starts is the previous segment's UNTIL boundary.
                    let previous = &block.lines[segment_index - 1];
                    if let Some(until) = previous.until {
                        let epoch_seconds = until_epoch_seconds(until, std_offset, ZoneOffset::from_total_seconds(current_save_seconds)?)?;
                        std_transition_epoch_seconds.push(epoch_seconds);
                    }
                }
            }

            let segment_end_year = match line.until {
                Some(until) => until.year,
                None => *self.year_range.end(),
            };
            let segment_start_year = if segment_index == 0 {
                *self.year_range.start()
            } else {
                match block.lines[segment_index - 1].until {
                    Some(until) => until.year,
                    None => *self.year_range.start(),
                }
            };
            let clipped_start = segment_start_year.max(*self.year_range.start());
            let clipped_end = segment_end_year.min(*self.year_range.end());

            match &line.rules {
                RuleRef::None => {
                    current_save_seconds = 0;
                }
                RuleRef::Fixed(save) => {
                    current_save_seconds = save.to_total_seconds();
                }
                RuleRef::Named(name) => {
                    let rule_lines: Vec<_> = source.rules.iter().filter(|r| &r.name == name).collect();
                    if clipped_start <= clipped_end {
                        for year in clipped_start..=clipped_end {
                            let mut applicable: Vec<_> = rule_lines
                                .iter()
                                .filter(|r| r.from_year <= year && year <= r.to_year.resolve(r.from_year))
                                .collect();
                            // Chronological order within the year: sort by the date the rule
                            // falls on, independent of the (not-yet-known) exact offset.
                            applicable.sort_by_key(|r| approximate_day_of_year(r.month, r.day));

                            for rule in applicable {
                                let new_save = rule.save.to_total_seconds();
                                if new_save == current_save_seconds {
                                    continue;
                                }
                                let offset_before = ZoneOffset::from_total_seconds(
                                    std_offset.total_seconds() + current_save_seconds,
                                )?;
                                let offset_after =
                                    ZoneOffset::from_total_seconds(std_offset.total_seconds() + new_save)?;
                                let (day_indicator, day_of_week) = rule.day.to_indicator();
                                let (hour, end_of_day) = resolve_clock_hour(rule.at.time.hour);
                                let transition_rule = ZoneOffsetTransitionRule::new(
                                    rule.month.as_u8(),
                                    day_indicator,
                                    day_of_week,
                                    hour,
                                    rule.at.time.minute.unsigned_abs() as u8,
                                    rule.at.time.second.unsigned_abs() as u8,
                                    end_of_day,
                                    rule.at.definition,
                                    std_offset,
                                    offset_before,
                                    offset_after,
                                )?;
                                wall_transitions.push(transition_rule.create_transition(year)?);
                                current_save_seconds = new_save;
                            }
                        }
                    }

                    // If this is the open-ended final segment, keep its rule set as the
                    // extrapolation tail. Each recurring rule's offset_before is whichever
                    // other rule in the cycle last took effect before it in the annual cycle
                    // (wrapping from December back to January), not the bare standard offset;
                    // only a single-rule, always-on set ever has offset_before == std_offset.
                    if line.until.is_none() {
                        let mut perpetual: Vec<_> = rule_lines
                            .iter()
                            .filter(|r| r.to_year.resolve(r.from_year) >= *self.year_range.end())
                            .collect();
                        perpetual.sort_by_key(|r| approximate_day_of_year(r.month, r.day));
                        let n = perpetual.len();
                        for (i, rule) in perpetual.iter().enumerate() {
                            let prev_save = perpetual[(i + n - 1) % n].save.to_total_seconds();
                            let this_save = rule.save.to_total_seconds();
                            if prev_save == this_save {
                                continue;
                            }
                            let offset_before =
                                ZoneOffset::from_total_seconds(std_offset.total_seconds() + prev_save)?;
                            let offset_after =
                                ZoneOffset::from_total_seconds(std_offset.total_seconds() + this_save)?;
                            let (day_indicator, day_of_week) = rule.day.to_indicator();
                            let (hour, end_of_day) = resolve_clock_hour(rule.at.time.hour);
                            last_rules.push(ZoneOffsetTransitionRule::new(
                                rule.month.as_u8(),
                                day_indicator,
                                day_of_week,
                                hour,
                                rule.at.time.minute.unsigned_abs() as u8,
                                rule.at.time.second.unsigned_abs() as u8,
                                end_of_day,
                                rule.at.definition,
                                std_offset,
                                offset_before,
                                offset_after,
                            )?);
                        }
                    }
                }
            }
        }

        wall_transitions.sort();
        wall_transitions.dedup_by_key(|t| t.instant_epoch_seconds());

        let wall_transition_epoch_seconds: Vec<i64> =
            wall_transitions.iter().map(ZoneOffsetTransition::instant_epoch_seconds).collect();
        let mut wall_offsets: Vec<ZoneOffset> = Vec::with_capacity(wall_transitions.len() + 1);
        if let Some(first) = wall_transitions.first() {
            wall_offsets.push(first.offset_before());
        } else {
            wall_offsets.push(
                std_offsets
                    .first()
                    .copied()
                    .unwrap_or(ZoneOffset::from_total_seconds(block.lines[0].std_offset.to_total_seconds())?),
            );
        }
        for t in &wall_transitions {
            wall_offsets.push(t.offset_after());
        }

        let savings_local_transitions = build_paired_local_transitions(&wall_transitions);

        if std_offsets.is_empty() {
            std_offsets.push(ZoneOffset::from_total_seconds(block.lines[0].std_offset.to_total_seconds())?);
        }

        StandardZoneRules::new(
            std_transition_epoch_seconds,
            std_offsets,
            wall_transition_epoch_seconds,
            wall_offsets,
            savings_local_transitions,
            last_rules,
        )
    }
}

fn build_paired_local_transitions(transitions: &[ZoneOffsetTransition]) -> Vec<NaiveDateTime> {
    let mut out = Vec::with_capacity(transitions.len() * 2);
    for t in transitions {
        let local_before = t.local_before();
        let local_after = t.local_after();
        if local_before <= local_after {
            out.push(local_before);
            out.push(local_after);
        } else {
            out.push(local_after);
            out.push(local_before);
        }
    }
    out
}

/// Splits a TZDB clock hour into the hour to store and whether it rolls into the next day.
/// `AT`/`UNTIL` columns historically allow hours `>= 24` (e.g. `25:00` meaning 1 a.m. the
/// following day); [`ZoneOffsetTransitionRule`] resolves the day-of-month/weekday on the
/// original day using `hour - 24`, then advances one day when `end_of_day` is set.
fn resolve_clock_hour(hour: i32) -> (u8, bool) {
    let h = hour.unsigned_abs();
    if h >= 24 {
        ((h - 24) as u8, true)
    } else {
        (h as u8, false)
    }
}

fn until_epoch_seconds(until: crate::parser::ZoneUntil, standard_offset: ZoneOffset, savings: ZoneOffset) -> CalendricalResult<i64> {
    let (day_indicator, day_of_week) = until.day.to_indicator();
    let day = resolve_day(until.year, until.month, day_indicator, day_of_week)?;
    let (hour, end_of_day) = resolve_clock_hour(until.at.time.hour);
    let mut local = NaiveDateTime::new(
        until.year,
        until.month.as_u8(),
        day,
        hour,
        until.at.time.minute.unsigned_abs() as u8,
        until.at.time.second.unsigned_abs() as u8,
    )?;
    if end_of_day {
        local = local.plus_days(1);
    }
    let offset_before = match until.at.definition {
        TimeDefinition::Wall => return Ok(local.to_epoch_seconds(savings.total_seconds() + standard_offset.total_seconds())),
        TimeDefinition::Standard => standard_offset,
        TimeDefinition::Utc => ZoneOffset::UTC,
    };
    Ok(local.to_epoch_seconds(offset_before.total_seconds()))
}

fn resolve_day(year: i32, month: Month, day_indicator: i8, day_of_week: Option<tzcore_provider::naive::WeekDay>) -> CalendricalResult<u8> {
    use tzcore_provider::naive::{day_of_week as compute_day_of_week, days_in_month, days_from_civil};
    let day = if day_indicator >= 0 {
        day_indicator as u8
    } else {
        let last_day = days_in_month(year, month.as_u8());
        (i16::from(last_day) + 1 + i16::from(day_indicator)) as u8
    };
    let Some(target_dow) = day_of_week else {
        return Ok(day);
    };
    let epoch_day = days_from_civil(year, month.as_u8(), day);
    let current = compute_day_of_week(epoch_day) as i64;
    let target = target_dow as i64;
    let delta = if day_indicator < 0 {
        -((current - target).rem_euclid(7))
    } else {
        (target - current).rem_euclid(7)
    };
    let (_, _, resolved_day) = tzcore_provider::naive::civil_from_days(epoch_day + delta);
    Ok(resolved_day)
}

/// A cheap chronological approximation for sorting same-year rules: day-of-year, ignoring
/// weekday resolution (which never moves a date across a month boundary by more than a week).
fn approximate_day_of_year(month: Month, day: DayOfMonthRule) -> i32 {
    const CUMULATIVE: [i32; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];
    let day_number = match day {
        DayOfMonthRule::Day(d) => i32::from(d),
        DayOfMonthRule::LastWeekDay(_) => 28,
        DayOfMonthRule::WeekDayOnOrAfter(_, d) => i32::from(d),
        DayOfMonthRule::WeekDayOnOrBefore(_, d) => i32::from(d),
    };
    CUMULATIVE[usize::from(month.as_u8() - 1)] + day_number
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_source;

    const EU_PARIS: &str = "\
Rule\tEU\t1981\tmax\t-\tMar\tlastSun\t 1:00u\t1:00\tS
Rule\tEU\t1996\tmax\t-\tOct\tlastSun\t 1:00u\t0\t-
Zone Europe/Paris\t1:00\tEU\tCE%sT
";

    #[test]
    fn builds_paris_from_named_rules() {
        let source = parse_source(EU_PARIS).unwrap();
        let builder = ZoneRulesBuilder::new(2009..=2012);
        let rules = builder.build(&source, "Europe/Paris").unwrap();

        let jan_2011 = NaiveDateTime::new(2011, 1, 1, 0, 0, 0).unwrap().to_epoch_seconds(0);
        let jul_2011 = NaiveDateTime::new(2011, 7, 1, 0, 0, 0).unwrap().to_epoch_seconds(0);
        assert_eq!(rules.offset_at_instant(jan_2011).unwrap().total_seconds(), 3_600);
        assert_eq!(rules.offset_at_instant(jul_2011).unwrap().total_seconds(), 7_200);

        let spring_local = NaiveDateTime::new(2011, 3, 27, 2, 30, 0).unwrap();
        let info = rules.offset_info_at_local(spring_local).unwrap();
        assert!(matches!(info, tzcore_provider::offset_info::OffsetInfo::Transition(t) if t.is_gap()));
    }

    #[test]
    fn unknown_zone_name_errors() {
        let source = parse_source(EU_PARIS).unwrap();
        let builder = ZoneRulesBuilder::new(2000..=2020);
        assert!(builder.build(&source, "Mars/Colony").is_err());
    }
}
