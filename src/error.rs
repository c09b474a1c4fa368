//! The crate's error type.
//!
//! Re-exported verbatim from `tzcore-provider`, which owns the canonical definition so that
//! both this crate and the TZDB compiler (`tzcore-tzdb`) can depend on the same error type
//! without a circular crate dependency.

pub use tzcore_provider::error::{CalendricalError, CalendricalResult, ErrorKind};
