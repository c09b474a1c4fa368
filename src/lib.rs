//! `tzcore` is a time-zone engine core for the ISO-8601 proleptic calendar.
//!
//! It relates three time-lines (continuous TAI, leap-second-aware UTC, and the wall-clock
//! local time observed in a given region) and resolves local date-times to instants (and back)
//! under a configurable ambiguity-resolution strategy.
//!
//! The crate is split by concern:
//! - [`error`] and [`safe_math`]: the error type and overflow-checked arithmetic every other
//!   module routes through.
//! - [`instant`]: [`instant::Instant`]/[`instant::Duration`], the nominal UTC-like time-line.
//! - [`utc_tai`]: leap-second-aware UTC and continuous TAI, and the process-wide leap-second
//!   table relating them.
//! - [`naive`]: the offset-less local date-time used to express rule-derived transition
//!   instants.
//! - [`zone_id`]: the `group_id:region_id#version_id` zone identifier grammar.
//!
//! Zone rules themselves (offsets, transitions, resolvers, the TZDB compiler, and the binary
//! archive format) live in the `tzcore-provider` and `tzcore-tzdb` workspace members; this
//! crate depends on `tzcore-provider` for the resolved-rules API.
#![cfg_attr(not(test), forbid(clippy::unwrap_used))]
#![allow(
    clippy::module_name_repetitions,
    clippy::too_many_lines,
    clippy::missing_errors_doc
)]

pub mod error;
pub mod instant;
pub mod naive;
pub mod safe_math;
pub mod utc_tai;
pub mod zone_id;

#[doc(inline)]
pub use error::{CalendricalError, CalendricalResult, ErrorKind};

#[doc(inline)]
pub use instant::{Duration, Instant};

#[doc(inline)]
pub use tzcore_provider::{
    OffsetInfo, OffsetResolver, ResourceZoneRulesProvider, StandardZoneRules, ZoneOffset,
    ZoneOffsetTransition, ZoneRules, ZoneRulesProvider,
};

#[cfg(feature = "std")]
#[doc(inline)]
pub use tzcore_provider::ZoneRulesGroupRegistry;

#[doc(inline)]
pub use utc_tai::{LeapSecondTable, TaiInstant, UtcInstant};

#[doc(inline)]
pub use zone_id::{ZoneId, ZoneVersion};
