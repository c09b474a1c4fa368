//! A minimal internal local date-time, used only by the zone engine to express transition
//! instants and rule-derived dates.
//!
//! Re-exported verbatim from `tzcore-provider`, which owns the canonical definition so the
//! TZDB compiler (`tzcore-tzdb`) and the runtime rules engine can share it without a circular
//! crate dependency.

pub use tzcore_provider::naive::*;
