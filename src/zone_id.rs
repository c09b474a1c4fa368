//! [`ZoneId`]: the logical identity used to look up zone rules, independent of the provider
//! that resolves it.
//!
//! Grounded in the shape of `src/builtins/core/timezone.rs`'s `TimeZone` enum (an identifier
//! that is either a named zone or a fixed offset, resolved to rules through a provider) but
//! reduced to identity alone: no `ZonedDateTime` arithmetic lives here, only parsing and
//! formatting of `group_id:region_id#version_id`.

use crate::error::CalendricalError;
use crate::CalendricalResult;
use std::fmt;

/// A parsed `group_id:region_id#version_id` zone identifier, or a fixed UTC offset.
///
/// `group_id:` and `#version_id` are both optional on parse; an absent `group_id` defaults to
/// the empty group (the provider's own default group), and an absent version is
/// [`ZoneVersion::Floating`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ZoneId {
    Named {
        group_id: String,
        region_id: String,
        version: ZoneVersion,
    },
    /// A fixed offset from UTC, in whole seconds. Exposes a degenerate rule set with no
    /// transitions.
    FixedOffset(i32),
}

/// The version component of a [`ZoneId::Named`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ZoneVersion {
    /// No version pinned: resolves to the latest version valid for the reference instant.
    Floating,
    Fixed(String),
}

impl ZoneId {
    /// Parses `group_id:region_id#version_id`. `group_id:` and `#version_id` are both
    /// optional. `Z` and `±HH:MM[:SS]` parse as [`ZoneId::FixedOffset`].
    pub fn parse(text: &str) -> CalendricalResult<Self> {
        if text == "Z" || text == "UTC" {
            return Ok(Self::FixedOffset(0));
        }
        if let Some(offset) = parse_fixed_offset(text) {
            return Ok(Self::FixedOffset(offset));
        }

        let (without_version, version) = match text.split_once('#') {
            Some((head, version)) => {
                if version.is_empty() {
                    return Err(CalendricalError::parse(text, head.len()));
                }
                (head, ZoneVersion::Fixed(version.to_owned()))
            }
            None => (text, ZoneVersion::Floating),
        };

        let (group_id, region_id) = match without_version.split_once(':') {
            Some((group, region)) => (group.to_owned(), region.to_owned()),
            None => (String::new(), without_version.to_owned()),
        };

        if region_id.is_empty() {
            return Err(CalendricalError::parse(text, 0));
        }

        Ok(Self::Named {
            group_id,
            region_id,
            version,
        })
    }

    #[must_use]
    pub fn is_fixed_offset(&self) -> bool {
        matches!(self, Self::FixedOffset(_))
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FixedOffset(0) => write!(f, "Z"),
            Self::FixedOffset(seconds) => {
                let sign = if *seconds < 0 { '-' } else { '+' };
                let abs = seconds.unsigned_abs();
                let (h, m, s) = (abs / 3_600, (abs % 3_600) / 60, abs % 60);
                if s == 0 {
                    write!(f, "{sign}{h:02}:{m:02}")
                } else {
                    write!(f, "{sign}{h:02}:{m:02}:{s:02}")
                }
            }
            Self::Named {
                group_id,
                region_id,
                version,
            } => {
                if !group_id.is_empty() {
                    write!(f, "{group_id}:")?;
                }
                write!(f, "{region_id}")?;
                if let ZoneVersion::Fixed(v) = version {
                    write!(f, "#{v}")?;
                }
                Ok(())
            }
        }
    }
}

/// Parses `Z`, `+HH:MM`, `+HH:MM:SS`, `+HHMM`, or `+HH` into a whole-seconds offset.
fn parse_fixed_offset(text: &str) -> Option<i32> {
    let mut chars = text.chars();
    let sign = match chars.next()? {
        '+' => 1,
        '-' => -1,
        _ => return None,
    };
    let rest: String = chars.collect();
    let parts: Vec<&str> = if rest.contains(':') {
        rest.split(':').collect()
    } else {
        // `HHMM` or `HH` compact form.
        match rest.len() {
            2 => vec![&rest[0..2]],
            4 => vec![&rest[0..2], &rest[2..4]],
            6 => vec![&rest[0..2], &rest[2..4], &rest[4..6]],
            _ => return None,
        }
    };
    if parts.is_empty() || parts.len() > 3 {
        return None;
    }
    let hours: i32 = parts[0].parse().ok()?;
    let minutes: i32 = parts.get(1).map_or(Ok(0), |p| p.parse()).ok()?;
    let seconds: i32 = parts.get(2).map_or(Ok(0), |p| p.parse()).ok()?;
    if hours > 18 || minutes > 59 || seconds > 59 {
        return None;
    }
    Some(sign * (hours * 3_600 + minutes * 60 + seconds))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_form() {
        let id = ZoneId::parse("iana:Europe/Paris#2024a").unwrap();
        assert_eq!(
            id,
            ZoneId::Named {
                group_id: "iana".into(),
                region_id: "Europe/Paris".into(),
                version: ZoneVersion::Fixed("2024a".into()),
            }
        );
    }

    #[test]
    fn parses_region_only_as_floating() {
        let id = ZoneId::parse("Europe/Paris").unwrap();
        assert_eq!(
            id,
            ZoneId::Named {
                group_id: String::new(),
                region_id: "Europe/Paris".into(),
                version: ZoneVersion::Floating,
            }
        );
    }

    #[test]
    fn parses_fixed_offsets() {
        assert_eq!(ZoneId::parse("Z").unwrap(), ZoneId::FixedOffset(0));
        assert_eq!(ZoneId::parse("+01:00").unwrap(), ZoneId::FixedOffset(3_600));
        assert_eq!(ZoneId::parse("-05:30").unwrap(), ZoneId::FixedOffset(-19_800));
        assert_eq!(ZoneId::parse("+00:00:30").unwrap(), ZoneId::FixedOffset(30));
    }

    #[test]
    fn rejects_empty_region() {
        assert!(ZoneId::parse("iana:").is_err());
        assert!(ZoneId::parse("iana:#2024a").is_err());
    }

    #[test]
    fn display_roundtrips() {
        let id = ZoneId::parse("iana:Europe/Paris#2024a").unwrap();
        assert_eq!(id.to_string(), "iana:Europe/Paris#2024a");
        assert_eq!(ZoneId::FixedOffset(3_600).to_string(), "+01:00");
        assert_eq!(ZoneId::FixedOffset(0).to_string(), "Z");
    }
}
