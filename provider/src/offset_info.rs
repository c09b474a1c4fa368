//! [`OffsetInfo`]: the classification of a local date-time, and [`OffsetResolver`]: the named
//! policies for turning an ambiguous or nonexistent local date-time into a single offset.

use crate::error::CalendricalError;
use crate::naive::NaiveDateTime;
use crate::offset::ZoneOffset;
use crate::rules::ZoneRules;
use crate::transition::ZoneOffsetTransition;
use crate::CalendricalResult;

/// How a local date-time relates to a zone's offset history: either a single unambiguous
/// offset, or the transition it falls inside (a gap or an overlap).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetInfo {
    Normal(ZoneOffset),
    Transition(ZoneOffsetTransition),
}

impl OffsetInfo {
    /// The offset a zone resolver would pick by default: the only offset for `Normal`, the
    /// after-offset for `Transition`.
    #[must_use]
    pub fn estimated_offset(&self) -> ZoneOffset {
        match self {
            Self::Normal(o) => *o,
            Self::Transition(t) => t.offset_after(),
        }
    }

    #[must_use]
    pub fn is_valid_offset(&self, offset: ZoneOffset) -> bool {
        match self {
            Self::Normal(o) => *o == offset,
            Self::Transition(t) => t.is_valid_offset(offset),
        }
    }
}

/// A resolved local date-time plus the offset chosen for it. The local date-time may differ
/// from the one a caller asked to resolve (`pre_transition`/`post_transition`/`push_forward`
/// all reproject it).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedOffsetDateTime {
    pub local: NaiveDateTime,
    pub offset: ZoneOffset,
}

/// A named policy for resolving a gap or overlap to a single offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetResolver {
    /// Fail on any gap or overlap.
    Strict,
    /// At a gap, use the instant just before it; at an overlap, use the earlier offset.
    PreTransition,
    /// At a gap, use the instant just after it; at an overlap, use the later offset.
    PostTransition,
    /// Keep the previously observed offset if it is still valid; otherwise fall back to
    /// `PostTransition`.
    RetainOffset,
    /// At a gap, advance past it to the first valid local time; overlaps behave like
    /// `PostTransition`.
    PushForward,
}

impl OffsetResolver {
    /// Resolves `local` under `rules`. `old_offset` is consulted only by `RetainOffset`.
    pub fn resolve(
        &self,
        rules: &ZoneRules,
        local: NaiveDateTime,
        old_offset: Option<ZoneOffset>,
    ) -> CalendricalResult<ResolvedOffsetDateTime> {
        let info = rules.offset_info_at_local(local)?;
        let transition = match info {
            OffsetInfo::Normal(offset) => {
                return Ok(ResolvedOffsetDateTime { local, offset });
            }
            OffsetInfo::Transition(t) => t,
        };

        match self {
            Self::Strict => Err(CalendricalError::zone_resolution().with_message(if transition.is_gap() {
                "local date-time falls in a gap"
            } else {
                "local date-time falls in an overlap"
            })),
            Self::PreTransition => {
                if transition.is_gap() {
                    Ok(ResolvedOffsetDateTime {
                        local: transition.local_before().minus_one_nanosecond(),
                        offset: transition.offset_before(),
                    })
                } else {
                    Ok(ResolvedOffsetDateTime {
                        local,
                        offset: transition.offset_before(),
                    })
                }
            }
            Self::PostTransition => {
                if transition.is_gap() {
                    Ok(ResolvedOffsetDateTime {
                        local: transition.local_after(),
                        offset: transition.offset_after(),
                    })
                } else {
                    Ok(ResolvedOffsetDateTime {
                        local,
                        offset: transition.offset_after(),
                    })
                }
            }
            Self::PushForward => {
                if transition.is_gap() {
                    let shifted = local.plus_seconds(i64::from(transition.delta_seconds()));
                    Ok(ResolvedOffsetDateTime {
                        local: shifted,
                        offset: transition.offset_after(),
                    })
                } else {
                    Ok(ResolvedOffsetDateTime {
                        local,
                        offset: transition.offset_after(),
                    })
                }
            }
            Self::RetainOffset => {
                if let Some(offset) = old_offset {
                    if transition.is_valid_offset(offset) {
                        return Ok(ResolvedOffsetDateTime { local, offset });
                    }
                }
                #[cfg(feature = "log")]
                log::debug!("retain_offset falling through to post_transition");
                Self::PostTransition.resolve(rules, local, old_offset)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naive::WeekDay;
    use crate::rules::StandardZoneRules;
    use crate::transition_rule::{TimeDefinition, ZoneOffsetTransitionRule};
    use alloc::vec;

    fn cet() -> ZoneOffset {
        ZoneOffset::from_hms(1, 0, 0).unwrap()
    }
    fn cest() -> ZoneOffset {
        ZoneOffset::from_hms(2, 0, 0).unwrap()
    }

    fn paris_rules() -> ZoneRules {
        let spring = ZoneOffsetTransitionRule::new(
            3, -1, Some(WeekDay::Sunday), 1, 0, 0, false, TimeDefinition::Utc, cet(), cet(), cest(),
        )
        .unwrap();
        let autumn = ZoneOffsetTransitionRule::new(
            10, -1, Some(WeekDay::Sunday), 1, 0, 0, false, TimeDefinition::Utc, cet(), cest(), cet(),
        )
        .unwrap();
        ZoneRules::Standard(
            StandardZoneRules::new(vec![], vec![cet()], vec![], vec![cet()], vec![], vec![spring, autumn]).unwrap(),
        )
    }

    #[test]
    fn strict_fails_on_gap() {
        let rules = paris_rules();
        let local = NaiveDateTime::new(2011, 3, 27, 2, 30, 0).unwrap();
        assert!(OffsetResolver::Strict.resolve(&rules, local, None).is_err());
    }

    #[test]
    fn gap_resolvers_match_literal_scenario() {
        let rules = paris_rules();
        let local = NaiveDateTime::new(2011, 3, 27, 2, 30, 0).unwrap();

        let pre = OffsetResolver::PreTransition.resolve(&rules, local, None).unwrap();
        assert_eq!((pre.local.hour, pre.local.minute, pre.local.nanosecond), (1, 59, 999_999_999));
        assert_eq!(pre.offset, cet());

        let post = OffsetResolver::PostTransition.resolve(&rules, local, None).unwrap();
        assert_eq!((post.local.hour, post.local.minute), (3, 0));
        assert_eq!(post.offset, cest());

        let pushed = OffsetResolver::PushForward.resolve(&rules, local, None).unwrap();
        assert_eq!((pushed.local.hour, pushed.local.minute), (3, 30));
        assert_eq!(pushed.offset, cest());
    }

    #[test]
    fn overlap_resolvers_pick_earlier_and_later() {
        let rules = paris_rules();
        let local = NaiveDateTime::new(2011, 10, 30, 2, 30, 0).unwrap();

        let earlier = OffsetResolver::PreTransition.resolve(&rules, local, None).unwrap();
        assert_eq!(earlier.offset, cest());

        let later = OffsetResolver::PostTransition.resolve(&rules, local, None).unwrap();
        assert_eq!(later.offset, cet());
    }

    #[test]
    fn retain_offset_keeps_valid_old_offset() {
        let rules = paris_rules();
        let local = NaiveDateTime::new(2011, 10, 30, 2, 30, 0).unwrap();
        let resolved = OffsetResolver::RetainOffset.resolve(&rules, local, Some(cest())).unwrap();
        assert_eq!(resolved.offset, cest());
    }

    #[test]
    fn retain_offset_falls_back_when_invalid() {
        let rules = paris_rules();
        let local = NaiveDateTime::new(2011, 3, 27, 2, 30, 0).unwrap();
        let resolved = OffsetResolver::RetainOffset.resolve(&rules, local, Some(cet())).unwrap();
        assert_eq!(resolved.offset, cest());
    }
}
