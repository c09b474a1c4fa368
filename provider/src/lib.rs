//! Runtime zone-rules: offsets, transitions, the binary archive format, and the process-wide
//! zone-rules group registry.
//!
//! `no_std` plus `alloc`, so this crate can sit underneath embedded and WASM consumers as well
//! as ordinary host binaries; the `std` feature only gates `std::error::Error` on
//! [`error::CalendricalError`] and file-path convenience constructors.

#![no_std]
#![cfg_attr(not(test), forbid(clippy::unwrap_used))]

extern crate alloc;

#[cfg(any(feature = "std", test))]
extern crate std;

pub mod archive;
pub mod error;
pub mod naive;
pub mod offset;
pub mod offset_info;
#[cfg(any(feature = "std", test))]
pub mod registry;
pub mod resource_provider;
pub mod rules;
pub mod safe_math;
pub mod transition;
pub mod transition_rule;

#[doc(inline)]
pub use error::{CalendricalError, CalendricalResult, ErrorKind};
#[doc(inline)]
pub use naive::NaiveDateTime;
#[doc(inline)]
pub use offset::ZoneOffset;
#[doc(inline)]
pub use offset_info::{OffsetInfo, OffsetResolver};
#[cfg(any(feature = "std", test))]
#[doc(inline)]
pub use registry::ZoneRulesGroupRegistry;
#[doc(inline)]
pub use resource_provider::{ResourceZoneRulesProvider, ZoneRulesProvider};
#[doc(inline)]
pub use rules::{StandardZoneRules, ZoneRules};
#[doc(inline)]
pub use transition::ZoneOffsetTransition;
#[doc(inline)]
pub use transition_rule::{TimeDefinition, ZoneOffsetTransitionRule};
