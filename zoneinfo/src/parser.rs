//! Tokenizes raw TZDB source text (the `Zone`/`Rule`/`Link` line grammar) into structured
//! records, before [`crate::builder`] turns them into zone rules.

use crate::grammar::{ClockTime, DayOfMonthRule, Month, QualifiedTime, ToYear};
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use tzcore_provider::error::CalendricalError;
use tzcore_provider::CalendricalResult;

/// One `RULE` line: a named, recurring yearly rule definition.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleLine {
    pub name: String,
    pub from_year: i32,
    pub to_year: ToYear,
    pub month: Month,
    pub day: DayOfMonthRule,
    pub at: QualifiedTime,
    pub save: ClockTime,
    pub letter: Option<String>,
}

/// The `RULES` column of a zone continuation line.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleRef {
    /// `-`: no savings ever apply.
    None,
    /// A literal `SAVE` amount with no named rule set.
    Fixed(ClockTime),
    /// A reference to a named `RULE` set.
    Named(String),
}

/// The optional `UNTIL` column of a zone continuation line: the line stops applying at this
/// date (exclusive), after which the next continuation line (or, for the last line, nothing)
/// takes over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneUntil {
    pub year: i32,
    pub month: Month,
    pub day: DayOfMonthRule,
    pub at: QualifiedTime,
}

/// One continuation line within a `Zone` block.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneLine {
    pub std_offset: ClockTime,
    pub rules: RuleRef,
    pub format: String,
    pub until: Option<ZoneUntil>,
}

/// A full `Zone NAME` block: its name plus every continuation line, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneBlock {
    pub name: String,
    pub lines: Vec<ZoneLine>,
}

/// One `Link TARGET LINK_NAME` line.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkLine {
    pub target: String,
    pub link_name: String,
}

/// The parsed contents of one or more concatenated TZDB source files.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedSource {
    pub rules: Vec<RuleLine>,
    pub zones: Vec<ZoneBlock>,
    pub links: Vec<LinkLine>,
}

/// Parses the full text of one or more concatenated TZDB source files (`africa`, `europe`, a
/// `backward` link file, and so on: TZDB files share one grammar regardless of name).
pub fn parse_source(text: &str) -> CalendricalResult<ParsedSource> {
    let mut parsed = ParsedSource::default();
    let mut current_zone: Option<ZoneBlock> = None;

    for raw_line in text.lines() {
        let line = strip_comment(raw_line);
        if line.trim().is_empty() {
            continue;
        }

        let mut tokens = line.split_whitespace();
        let Some(first) = tokens.next() else { continue };

        match first {
            "Rule" => {
                flush_zone(&mut current_zone, &mut parsed);
                parsed.rules.push(parse_rule_line(&mut tokens)?);
            }
            "Link" => {
                flush_zone(&mut current_zone, &mut parsed);
                let target = next_token(&mut tokens)?.to_string();
                let link_name = next_token(&mut tokens)?.to_string();
                parsed.links.push(LinkLine { target, link_name });
            }
            "Zone" => {
                flush_zone(&mut current_zone, &mut parsed);
                let name = next_token(&mut tokens)?.to_string();
                let zone_line = parse_zone_line(&mut tokens)?;
                current_zone = Some(ZoneBlock {
                    name,
                    lines: alloc::vec![zone_line],
                });
            }
            _ => {
                // A continuation line: the whole line (including `first`) is the next zone
                // line's STDOFF/RULES/FORMAT/UNTIL columns.
                let block = current_zone.as_mut().ok_or_else(|| {
                    #[cfg(feature = "log")]
                    log::warn!("unrecognised continuation line outside any Zone block: {raw_line:?}");
                    CalendricalError::parse(raw_line, 0).with_message("continuation line outside a Zone block")
                })?;
                let mut rest_tokens = core::iter::once(first).chain(tokens);
                block.lines.push(parse_zone_line(&mut rest_tokens)?);
            }
        }
    }
    flush_zone(&mut current_zone, &mut parsed);
    #[cfg(feature = "log")]
    log::debug!(
        "parsed {} rule line(s), {} zone(s), {} link(s)",
        parsed.rules.len(),
        parsed.zones.len(),
        parsed.links.len(),
    );
    Ok(parsed)
}

fn flush_zone(current: &mut Option<ZoneBlock>, parsed: &mut ParsedSource) {
    if let Some(block) = current.take() {
        parsed.zones.push(block);
    }
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(idx) => &line[..idx],
        None => line,
    }
}

fn next_token<'a>(tokens: &mut impl Iterator<Item = &'a str>) -> CalendricalResult<&'a str> {
    tokens
        .next()
        .ok_or_else(|| CalendricalError::parse("", 0).with_message("unexpected end of line"))
}

fn parse_rule_line<'a>(tokens: &mut impl Iterator<Item = &'a str>) -> CalendricalResult<RuleLine> {
    let name = next_token(tokens)?.to_string();
    let from_year = next_token(tokens)?
        .parse::<i32>()
        .map_err(|_| CalendricalError::parse("FROM", 0))?;
    let to_year = ToYear::parse(next_token(tokens)?)?;
    let _type_column = next_token(tokens)?; // always "-" in modern TZDB
    let month = Month::parse(next_token(tokens)?)?;
    let day = DayOfMonthRule::parse(next_token(tokens)?)?;
    let at = QualifiedTime::parse(next_token(tokens)?)?;
    let save = ClockTime::parse(next_token(tokens)?)?;
    let letter_token = next_token(tokens)?;
    let letter = if letter_token == "-" {
        None
    } else {
        Some(letter_token.to_string())
    };
    Ok(RuleLine {
        name,
        from_year,
        to_year,
        month,
        day,
        at,
        save,
        letter,
    })
}

fn parse_zone_line<'a>(tokens: &mut impl Iterator<Item = &'a str>) -> CalendricalResult<ZoneLine> {
    let std_offset = ClockTime::parse(next_token(tokens)?)?;
    let rules_token = next_token(tokens)?;
    let rules = if rules_token == "-" {
        RuleRef::None
    } else if rules_token
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || c == '-')
    {
        RuleRef::Fixed(ClockTime::parse(rules_token)?)
    } else {
        RuleRef::Named(rules_token.to_string())
    };
    let format = next_token(tokens)?.to_string();

    let until = match tokens.next() {
        None => None,
        Some(year_token) => {
            let year = year_token
                .parse::<i32>()
                .map_err(|_| CalendricalError::parse(year_token, 0))?;
            let month = tokens.next().map(Month::parse).transpose()?.unwrap_or(Month::Jan);
            let day = tokens
                .next()
                .map(DayOfMonthRule::parse)
                .transpose()?
                .unwrap_or(DayOfMonthRule::Day(1));
            let at = tokens
                .next()
                .map(QualifiedTime::parse)
                .transpose()?
                .unwrap_or(QualifiedTime::parse("0:00")?);
            Some(ZoneUntil { year, month, day, at })
        }
    };

    Ok(ZoneLine {
        std_offset,
        rules,
        format,
        until,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# comment line
Rule\tEU\t1981\tmax\t-\tMar\tlastSun\t 1:00u\t1:00\tS
Rule\tEU\t1996\tmax\t-\tOct\tlastSun\t 1:00u\t0\t-

Zone Europe/Paris\t0:09:21 -\tLMT\t1911 Mar 11
\t\t\t0:00\tEU\tCE%sT\t1940 Jun 14 23:00
\t\t\t1:00\tEU\tCE%sT

Link Europe/Paris Europe/Vaduz
";

    #[test]
    fn parses_rules_zone_and_link() {
        let parsed = parse_source(SAMPLE).unwrap();
        assert_eq!(parsed.rules.len(), 2);
        assert_eq!(parsed.rules[0].name, "EU");
        assert_eq!(parsed.zones.len(), 1);
        assert_eq!(parsed.zones[0].name, "Europe/Paris");
        assert_eq!(parsed.zones[0].lines.len(), 3);
        assert!(parsed.zones[0].lines[0].until.is_some());
        assert!(parsed.zones[0].lines.last().unwrap().until.is_none());
        assert_eq!(parsed.links.len(), 1);
        assert_eq!(parsed.links[0].target, "Europe/Paris");
        assert_eq!(parsed.links[0].link_name, "Europe/Vaduz");
    }

    #[test]
    fn rejects_continuation_without_zone() {
        assert!(parse_source("\t0:00\tEU\tCE%sT").is_err());
    }
}
