//! [`StandardZoneRules`]: the in-memory representation of one time-zone version, and
//! [`ZoneRules`], the sum type covering both named zones and fixed offsets.

use crate::error::CalendricalError;
use crate::naive::NaiveDateTime;
use crate::offset::ZoneOffset;
use crate::transition::ZoneOffsetTransition;
use crate::transition_rule::ZoneOffsetTransitionRule;
use crate::CalendricalResult;
use alloc::vec;
use alloc::vec::Vec;

#[cfg(any(feature = "std", test))]
use hashbrown::HashMap;
#[cfg(any(feature = "std", test))]
use std::sync::RwLock;

/// Year beyond which the per-year last-rules transition cache is not retained.
pub const CACHE_HORIZON_YEAR: i32 = 2100;

/// Maximum number of tail rules a `StandardZoneRules` may carry.
pub const MAX_LAST_RULES: usize = 15;

/// The in-memory representation of one time-zone version.
///
/// `std_*` and `wall_*` arrays are independent: a standard-offset change need not coincide
/// with a savings change. `savings_local_transitions` pairs each wall transition's boundary
/// local date-times (for a gap: `(local_before, local_after)`; for an overlap:
/// `(local_after, local_before)`), enabling a single binary search over local date-times.
#[derive(Debug)]
pub struct StandardZoneRules {
    std_transition_epoch_seconds: Vec<i64>,
    std_offsets: Vec<ZoneOffset>,
    wall_transition_epoch_seconds: Vec<i64>,
    wall_offsets: Vec<ZoneOffset>,
    savings_local_transitions: Vec<NaiveDateTime>,
    last_rules: Vec<ZoneOffsetTransitionRule>,
    #[cfg(any(feature = "std", test))]
    year_cache: RwLock<HashMap<i32, Vec<ZoneOffsetTransition>>>,
}

impl Clone for StandardZoneRules {
    fn clone(&self) -> Self {
        Self {
            std_transition_epoch_seconds: self.std_transition_epoch_seconds.clone(),
            std_offsets: self.std_offsets.clone(),
            wall_transition_epoch_seconds: self.wall_transition_epoch_seconds.clone(),
            wall_offsets: self.wall_offsets.clone(),
            savings_local_transitions: self.savings_local_transitions.clone(),
            last_rules: self.last_rules.clone(),
            #[cfg(any(feature = "std", test))]
            year_cache: RwLock::new(HashMap::new()),
        }
    }
}

impl PartialEq for StandardZoneRules {
    fn eq(&self, other: &Self) -> bool {
        self.std_transition_epoch_seconds == other.std_transition_epoch_seconds
            && self.std_offsets == other.std_offsets
            && self.wall_transition_epoch_seconds == other.wall_transition_epoch_seconds
            && self.wall_offsets == other.wall_offsets
            && self.savings_local_transitions == other.savings_local_transitions
            && self.last_rules == other.last_rules
    }
}
impl Eq for StandardZoneRules {}

impl StandardZoneRules {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        std_transition_epoch_seconds: Vec<i64>,
        std_offsets: Vec<ZoneOffset>,
        wall_transition_epoch_seconds: Vec<i64>,
        wall_offsets: Vec<ZoneOffset>,
        savings_local_transitions: Vec<NaiveDateTime>,
        last_rules: Vec<ZoneOffsetTransitionRule>,
    ) -> CalendricalResult<Self> {
        if std_offsets.len() != std_transition_epoch_seconds.len() + 1 {
            return Err(CalendricalError::config()
                .with_message("std offsets length must be transitions length + 1"));
        }
        if wall_offsets.len() != wall_transition_epoch_seconds.len() + 1 {
            return Err(CalendricalError::config()
                .with_message("wall offsets length must be transitions length + 1"));
        }
        if savings_local_transitions.len() != wall_transition_epoch_seconds.len() * 2 {
            return Err(CalendricalError::config()
                .with_message("savings_local_transitions must pair each wall transition"));
        }
        if last_rules.len() > MAX_LAST_RULES {
            return Err(CalendricalError::config().with_message("too many last_rules"));
        }
        if !is_strictly_ascending(&std_transition_epoch_seconds) || !is_strictly_ascending(&wall_transition_epoch_seconds) {
            return Err(CalendricalError::config().with_message("transition arrays must be strictly ascending"));
        }
        Ok(Self {
            std_transition_epoch_seconds,
            std_offsets,
            wall_transition_epoch_seconds,
            wall_offsets,
            savings_local_transitions,
            last_rules,
            #[cfg(any(feature = "std", test))]
            year_cache: RwLock::new(HashMap::new()),
        })
    }

    #[must_use]
    pub fn last_rules(&self) -> &[ZoneOffsetTransitionRule] {
        &self.last_rules
    }

    #[must_use]
    pub fn standard_offset_transitions(&self) -> &[i64] {
        &self.std_transition_epoch_seconds
    }

    #[must_use]
    pub fn standard_offsets(&self) -> &[ZoneOffset] {
        &self.std_offsets
    }

    #[must_use]
    pub fn wall_offset_transitions(&self) -> &[i64] {
        &self.wall_transition_epoch_seconds
    }

    #[must_use]
    pub fn wall_offsets(&self) -> &[ZoneOffset] {
        &self.wall_offsets
    }

    /// The standard offset (ignoring savings) in effect at `epoch_seconds`.
    #[must_use]
    pub fn standard_offset_at_instant(&self, epoch_seconds: i64) -> ZoneOffset {
        match binary_search_before(&self.std_transition_epoch_seconds, epoch_seconds) {
            Some(i) => self.std_offsets[i + 1],
            None => self.std_offsets[0],
        }
    }

    /// The wall offset (standard plus savings) in effect at `epoch_seconds`.
    pub fn offset_at_instant(&self, epoch_seconds: i64) -> CalendricalResult<ZoneOffset> {
        if let Some(&last) = self.wall_transition_epoch_seconds.last() {
            if epoch_seconds < last {
                let idx = binary_search_before(&self.wall_transition_epoch_seconds, epoch_seconds);
                return Ok(match idx {
                    Some(i) => self.wall_offsets[i + 1],
                    None => self.wall_offsets[0],
                });
            }
        } else if self.last_rules.is_empty() {
            return Ok(self.wall_offsets[0]);
        }

        let year = self.year_of_instant(epoch_seconds);
        let transitions = self.year_transitions(year)?;
        let mut offset = self
            .wall_offsets
            .last()
            .copied()
            .unwrap_or(self.wall_offsets[0]);
        for t in &transitions {
            if t.instant_epoch_seconds() <= epoch_seconds {
                offset = t.offset_after();
            } else {
                break;
            }
        }
        Ok(offset)
    }

    fn year_of_instant(&self, epoch_seconds: i64) -> i32 {
        crate::naive::civil_from_days(crate::safe_math::floor_div(epoch_seconds, 86_400)).0
    }

    /// Classifies `local` as normal, a gap, or an overlap, and returns the offset-info.
    pub fn offset_info_at_local(&self, local: NaiveDateTime) -> CalendricalResult<crate::offset_info::OffsetInfo> {
        use crate::offset_info::OffsetInfo;

        if let Some(&last_local) = self.savings_local_transitions.last() {
            if local > last_local || self.wall_transition_epoch_seconds.is_empty() {
                let year = local.year;
                let transitions = self.year_transitions(year)?;
                return Ok(classify_against_transitions(&transitions, local));
            }
        } else if self.last_rules.is_empty() {
            return Ok(OffsetInfo::Normal(self.wall_offsets[0]));
        } else {
            let transitions = self.year_transitions(local.year)?;
            return Ok(classify_against_transitions(&transitions, local));
        }

        // Binary search the paired local array: even index N corresponds to wall transition
        // N/2's `(local_before_view, local_after_view)` pair. Duplicated entries mark an
        // overlap, so this must land on the first match rather than stdlib's arbitrary one.
        let lower_bound = self.savings_local_transitions.partition_point(|v| v < &local);
        let search_result = if self
            .savings_local_transitions
            .get(lower_bound)
            .is_some_and(|&v| v == local)
        {
            Ok(lower_bound)
        } else {
            Err(lower_bound)
        };
        match search_result {
            Ok(idx) => {
                let transition_idx = idx / 2;
                let transition = self.wall_transition(transition_idx);
                Ok(OffsetInfo::Transition(transition))
            }
            Err(insertion) => {
                if insertion == 0 {
                    return Ok(OffsetInfo::Normal(self.wall_offsets[0]));
                }
                if insertion % 2 == 1 {
                    // Between the two entries of a pair: local falls inside the transition.
                    let transition_idx = insertion / 2;
                    Ok(OffsetInfo::Transition(self.wall_transition(transition_idx)))
                } else {
                    Ok(OffsetInfo::Normal(self.wall_offsets[insertion / 2]))
                }
            }
        }
    }

    fn wall_transition(&self, index: usize) -> ZoneOffsetTransition {
        let epoch_seconds = self.wall_transition_epoch_seconds[index];
        let offset_before = self.wall_offsets[index];
        let offset_after = self.wall_offsets[index + 1];
        let local_before = NaiveDateTime::from_epoch_seconds(epoch_seconds, offset_before.total_seconds());
        ZoneOffsetTransition::new(local_before, offset_before, offset_after)
    }

    /// The next transition strictly after `epoch_seconds`, if any within the supported range.
    pub fn next_transition(&self, epoch_seconds: i64) -> CalendricalResult<Option<ZoneOffsetTransition>> {
        for i in 0..self.wall_transition_epoch_seconds.len() {
            if self.wall_transition_epoch_seconds[i] > epoch_seconds {
                return Ok(Some(self.wall_transition(i)));
            }
        }
        let year = self.year_of_instant(epoch_seconds) ;
        for candidate_year in year..=year + 2 {
            let transitions = self.year_transitions(candidate_year)?;
            for t in transitions {
                if t.instant_epoch_seconds() > epoch_seconds {
                    return Ok(Some(t));
                }
            }
        }
        Ok(None)
    }

    /// The most recent transition at or before `epoch_seconds`, if any.
    pub fn previous_transition(&self, epoch_seconds: i64) -> CalendricalResult<Option<ZoneOffsetTransition>> {
        for i in (0..self.wall_transition_epoch_seconds.len()).rev() {
            if self.wall_transition_epoch_seconds[i] <= epoch_seconds {
                return Ok(Some(self.wall_transition(i)));
            }
        }
        let year = self.year_of_instant(epoch_seconds);
        let transitions = self.year_transitions(year)?;
        Ok(transitions
            .into_iter()
            .rev()
            .find(|t| t.instant_epoch_seconds() <= epoch_seconds))
    }

    /// Generates (or returns the cached) set of transitions produced by `last_rules` for
    /// `year`. Years beyond [`CACHE_HORIZON_YEAR`] are computed but never cached.
    fn year_transitions(&self, year: i32) -> CalendricalResult<Vec<ZoneOffsetTransition>> {
        #[cfg(any(feature = "std", test))]
        {
            if year <= CACHE_HORIZON_YEAR {
                if let Some(hit) = self.year_cache.read().unwrap().get(&year) {
                    return Ok(hit.clone());
                }
            }
            let computed = self.compute_year_transitions(year)?;
            if year <= CACHE_HORIZON_YEAR {
                self.year_cache
                    .write()
                    .unwrap()
                    .entry(year)
                    .or_insert_with(|| computed.clone());
            }
            Ok(computed)
        }
        #[cfg(not(any(feature = "std", test)))]
        {
            self.compute_year_transitions(year)
        }
    }

    fn compute_year_transitions(&self, year: i32) -> CalendricalResult<Vec<ZoneOffsetTransition>> {
        let mut transitions = Vec::with_capacity(self.last_rules.len());
        for rule in &self.last_rules {
            transitions.push(rule.create_transition(year)?);
        }
        transitions.sort();
        Ok(transitions)
    }
}

fn classify_against_transitions(
    transitions: &[ZoneOffsetTransition],
    local: NaiveDateTime,
) -> crate::offset_info::OffsetInfo {
    use crate::offset_info::OffsetInfo;

    for t in transitions {
        let local_before = t.local_before();
        let local_after = t.local_after();
        let (lo, hi) = if local_before <= local_after {
            (local_before, local_after)
        } else {
            (local_after, local_before)
        };
        if local >= lo && local <= hi {
            return OffsetInfo::Transition(*t);
        }
    }
    let offset = transitions
        .iter()
        .rev()
        .find(|t| t.local_after() <= local)
        .map(ZoneOffsetTransition::offset_after)
        .or_else(|| transitions.first().map(ZoneOffsetTransition::offset_before));
    OffsetInfo::Normal(offset.unwrap_or(ZoneOffset::UTC))
}

fn is_strictly_ascending(values: &[i64]) -> bool {
    values.windows(2).all(|w| w[0] < w[1])
}

/// Rebuilds the paired local-date-time array the archive decoder needs: for each wall
/// transition, `(local_before, local_after)` in the order [`StandardZoneRules::new`] expects.
#[must_use]
pub(crate) fn paired_local_transitions(wall_transitions: &[i64], wall_offsets: &[ZoneOffset]) -> Vec<NaiveDateTime> {
    let mut out = Vec::with_capacity(wall_transitions.len() * 2);
    for (i, &epoch_seconds) in wall_transitions.iter().enumerate() {
        let offset_before = wall_offsets[i];
        let offset_after = wall_offsets[i + 1];
        let local_before = NaiveDateTime::from_epoch_seconds(epoch_seconds, offset_before.total_seconds());
        let transition = ZoneOffsetTransition::new(local_before, offset_before, offset_after);
        let local_after = transition.local_after();
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

/// Returns the index of the last entry `<= target`, or `None` if `target` precedes all
/// entries. `sorted` is assumed strictly ascending, so this is a true binary search via
/// `partition_point`.
fn binary_search_before(sorted: &[i64], target: i64) -> Option<usize> {
    let idx = sorted.partition_point(|&t| t <= target);
    idx.checked_sub(1)
}

/// The sum type covering both fixed-offset and named (rule-driven) zones.
#[derive(Debug, Clone)]
pub enum ZoneRules {
    Fixed(ZoneOffset),
    Standard(StandardZoneRules),
}

impl ZoneRules {
    pub fn offset_at_instant(&self, epoch_seconds: i64) -> CalendricalResult<ZoneOffset> {
        match self {
            Self::Fixed(offset) => Ok(*offset),
            Self::Standard(rules) => rules.offset_at_instant(epoch_seconds),
        }
    }

    pub fn offset_info_at_local(&self, local: NaiveDateTime) -> CalendricalResult<crate::offset_info::OffsetInfo> {
        match self {
            Self::Fixed(offset) => Ok(crate::offset_info::OffsetInfo::Normal(*offset)),
            Self::Standard(rules) => rules.offset_info_at_local(local),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transition_rule::TimeDefinition;

    fn cet() -> ZoneOffset {
        ZoneOffset::from_hms(1, 0, 0).unwrap()
    }
    fn cest() -> ZoneOffset {
        ZoneOffset::from_hms(2, 0, 0).unwrap()
    }

    fn paris_rules() -> StandardZoneRules {
        let spring = ZoneOffsetTransitionRule::new(
            3, -1, Some(crate::naive::WeekDay::Sunday), 1, 0, 0, false, TimeDefinition::Utc, cet(), cet(), cest(),
        )
        .unwrap();
        let autumn = ZoneOffsetTransitionRule::new(
            10, -1, Some(crate::naive::WeekDay::Sunday), 1, 0, 0, false, TimeDefinition::Utc, cet(), cest(), cet(),
        )
        .unwrap();
        StandardZoneRules::new(vec![], vec![cet()], vec![], vec![cet()], vec![], vec![spring, autumn]).unwrap()
    }

    #[test]
    fn offset_at_instant_uses_last_rules() {
        let rules = paris_rules();
        let jan_2020 = NaiveDateTime::new(2020, 1, 1, 0, 0, 0).unwrap().to_epoch_seconds(0);
        let jul_2020 = NaiveDateTime::new(2020, 7, 1, 0, 0, 0).unwrap().to_epoch_seconds(0);
        assert_eq!(rules.offset_at_instant(jan_2020).unwrap(), cet());
        assert_eq!(rules.offset_at_instant(jul_2020).unwrap(), cest());
    }

    #[test]
    fn spring_gap_classifies_as_transition() {
        let rules = paris_rules();
        let ldt = NaiveDateTime::new(2011, 3, 27, 2, 30, 0).unwrap();
        let info = rules.offset_info_at_local(ldt).unwrap();
        assert!(matches!(info, crate::offset_info::OffsetInfo::Transition(t) if t.is_gap()));
    }

    #[test]
    fn autumn_overlap_classifies_as_transition() {
        let rules = paris_rules();
        let ldt = NaiveDateTime::new(2011, 10, 30, 2, 30, 0).unwrap();
        let info = rules.offset_info_at_local(ldt).unwrap();
        assert!(matches!(info, crate::offset_info::OffsetInfo::Transition(t) if t.is_overlap()));
    }

    #[test]
    fn rejects_mismatched_array_lengths() {
        assert!(StandardZoneRules::new(vec![], vec![], vec![], vec![cet()], vec![], vec![]).is_err());
    }
}
