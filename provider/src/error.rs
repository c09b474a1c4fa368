//! The crate's error type.
//!
//! Lives here, in the lowest crate of the dependency graph, so the root `tzcore` crate and the
//! `tzcore-tzdb` compiler can both depend on it without a cycle; `tzcore` re-exports it verbatim
//! as its own public error type (`tzcore::error::CalendricalError`).
//!
//! Every fallible operation in the zone engine returns [`CalendricalError`]. The taxonomy is
//! fixed (see [`ErrorKind`]) and is built with the same fluent, kind-first-then-message style
//! throughout: `CalendricalError::overflow().with_message(...)`.

use alloc::borrow::Cow;
use alloc::string::String;
use core::fmt;

/// The result type returned by fallible operations across the crate.
pub type CalendricalResult<T> = Result<T, CalendricalError>;

/// The kind of failure that occurred, independent of the message attached to it.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A checked arithmetic primitive overflowed.
    ArithmeticOverflow,
    /// A field value is outside the range a rule declares for it.
    InvalidField,
    /// Fields are each individually valid but do not combine into a valid date.
    InvalidDate,
    /// Malformed textual input.
    Parse,
    /// A local date-time could not be mapped to an instant under the resolver in use.
    ZoneResolution,
    /// An archive or leap-second resource is missing or malformed.
    ConfigData,
    /// An atomic compare-and-swap lost a race against a concurrent writer.
    ConcurrentUpdate,
}

/// The crate's single error type.
///
/// Carries an [`ErrorKind`] plus an optional human-readable message. Never constructed
/// directly; use one of the `ErrorKind`-named constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendricalError {
    kind: ErrorKind,
    message: Cow<'static, str>,
}

impl CalendricalError {
    fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: Cow::Borrowed(""),
        }
    }

    /// Attaches a message to this error, replacing any previously attached message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
        self.message = message.into();
        self
    }

    /// Returns the kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the attached message, if any.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn overflow() -> Self {
        Self::new(ErrorKind::ArithmeticOverflow)
    }

    #[must_use]
    pub fn invalid_field(field: &str, value: impl fmt::Display) -> Self {
        Self::new(ErrorKind::InvalidField)
            .with_message(format_msg(format_args!("field `{field}` out of range: {value}")))
    }

    #[must_use]
    pub fn invalid_date() -> Self {
        Self::new(ErrorKind::InvalidDate)
    }

    #[must_use]
    pub fn parse(text: &str, index: usize) -> Self {
        Self::new(ErrorKind::Parse).with_message(format_msg(format_args!(
            "parse failure at byte {index} in `{text}`"
        )))
    }

    #[must_use]
    pub fn zone_resolution() -> Self {
        Self::new(ErrorKind::ZoneResolution)
    }

    #[must_use]
    pub fn config() -> Self {
        Self::new(ErrorKind::ConfigData)
    }

    #[must_use]
    pub fn concurrent_update() -> Self {
        Self::new(ErrorKind::ConcurrentUpdate)
    }
}

fn format_msg(args: fmt::Arguments<'_>) -> String {
    use alloc::string::ToString;
    args.to_string()
}

impl fmt::Display for CalendricalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            ErrorKind::ArithmeticOverflow => "arithmetic overflow",
            ErrorKind::InvalidField => "invalid field",
            ErrorKind::InvalidDate => "invalid date",
            ErrorKind::Parse => "parse failure",
            ErrorKind::ZoneResolution => "zone resolution failure",
            ErrorKind::ConfigData => "configuration or data failure",
            ErrorKind::ConcurrentUpdate => "concurrent update",
        };
        if self.message.is_empty() {
            write!(f, "{kind}")
        } else {
            write!(f, "{kind}: {}", self.message)
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CalendricalError {}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn display_includes_message() {
        let err = CalendricalError::invalid_field("month", 13);
        assert_eq!(err.kind(), ErrorKind::InvalidField);
        assert!(err.to_string().contains("month"));
    }

    #[test]
    fn display_without_message() {
        let err = CalendricalError::overflow();
        assert_eq!(err.to_string(), "arithmetic overflow");
    }
}
