//! Overflow-checked integer arithmetic primitives.
//!
//! Re-exported verbatim from `tzcore-provider`, which owns the canonical definition (see that
//! crate's `error` module doc for why the primitive layers live there).

pub use tzcore_provider::safe_math::*;
