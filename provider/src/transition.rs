//! [`ZoneOffsetTransition`]: one discontinuity in a zone's offset history.

use crate::naive::NaiveDateTime;
use crate::offset::ZoneOffset;
use core::cmp::Ordering;

/// A single offset discontinuity. `local_before` is the boundary local date-time expressed in
/// `offset_before`; the instant it denotes is the first instant at which `offset_after`
/// applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneOffsetTransition {
    local_before: NaiveDateTime,
    offset_before: ZoneOffset,
    offset_after: ZoneOffset,
}

impl ZoneOffsetTransition {
    /// `offset_before` and `offset_after` must differ; callers (the rules builder and the
    /// archive decoder) both already guarantee this as a structural invariant.
    #[must_use]
    pub fn new(local_before: NaiveDateTime, offset_before: ZoneOffset, offset_after: ZoneOffset) -> Self {
        debug_assert_ne!(offset_before, offset_after);
        Self {
            local_before,
            offset_before,
            offset_after,
        }
    }

    #[must_use]
    pub fn local_before(&self) -> NaiveDateTime {
        self.local_before
    }

    #[must_use]
    pub fn offset_before(&self) -> ZoneOffset {
        self.offset_before
    }

    #[must_use]
    pub fn offset_after(&self) -> ZoneOffset {
        self.offset_after
    }

    /// The instant (epoch seconds) at which `offset_after` begins to apply.
    #[must_use]
    pub fn instant_epoch_seconds(&self) -> i64 {
        self.local_before.to_epoch_seconds(self.offset_before.total_seconds())
    }

    /// The same instant, expressed as a local date-time under `offset_after`.
    #[must_use]
    pub fn local_after(&self) -> NaiveDateTime {
        self.local_before
            .plus_seconds(i64::from(self.delta_seconds()))
    }

    /// `offset_after - offset_before`; positive for a gap, negative for an overlap.
    #[must_use]
    pub fn delta_seconds(&self) -> i32 {
        self.offset_after.total_seconds() - self.offset_before.total_seconds()
    }

    #[must_use]
    pub fn is_gap(&self) -> bool {
        self.offset_after.total_seconds() > self.offset_before.total_seconds()
    }

    #[must_use]
    pub fn is_overlap(&self) -> bool {
        self.offset_after.total_seconds() < self.offset_before.total_seconds()
    }

    /// A gap never has a valid offset; an overlap is valid for exactly its two boundary
    /// offsets.
    #[must_use]
    pub fn is_valid_offset(&self, offset: ZoneOffset) -> bool {
        if self.is_gap() {
            false
        } else {
            offset == self.offset_before || offset == self.offset_after
        }
    }
}

impl PartialOrd for ZoneOffsetTransition {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ZoneOffsetTransition {
    fn cmp(&self, other: &Self) -> Ordering {
        self.instant_epoch_seconds().cmp(&other.instant_epoch_seconds())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paris_spring_gap() -> ZoneOffsetTransition {
        let local_before = NaiveDateTime::new(2011, 3, 27, 2, 0, 0).unwrap();
        ZoneOffsetTransition::new(
            local_before,
            ZoneOffset::from_hms(1, 0, 0).unwrap(),
            ZoneOffset::from_hms(2, 0, 0).unwrap(),
        )
    }

    fn paris_autumn_overlap() -> ZoneOffsetTransition {
        let local_before = NaiveDateTime::new(2011, 10, 30, 3, 0, 0).unwrap();
        ZoneOffsetTransition::new(
            local_before,
            ZoneOffset::from_hms(2, 0, 0).unwrap(),
            ZoneOffset::from_hms(1, 0, 0).unwrap(),
        )
    }

    #[test]
    fn gap_has_no_valid_offset() {
        let t = paris_spring_gap();
        assert!(t.is_gap());
        assert!(!t.is_valid_offset(t.offset_before()));
        assert!(!t.is_valid_offset(t.offset_after()));
    }

    #[test]
    fn gap_local_after_is_pushed_forward_by_delta() {
        let t = paris_spring_gap();
        let after = t.local_after();
        assert_eq!((after.hour, after.minute), (3, 0));
    }

    #[test]
    fn overlap_has_two_valid_offsets() {
        let t = paris_autumn_overlap();
        assert!(t.is_overlap());
        assert!(t.is_valid_offset(t.offset_before()));
        assert!(t.is_valid_offset(t.offset_after()));
    }

    #[test]
    fn overlap_local_after_falls_back_by_delta() {
        let t = paris_autumn_overlap();
        let after = t.local_after();
        assert_eq!((after.hour, after.minute), (2, 0));
    }
}
