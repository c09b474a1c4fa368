//! Overflow-checked integer arithmetic primitives.
//!
//! Every arithmetic operation in the zone engine routes through this module. No silent
//! wrapping is permitted anywhere above this layer; a boundary overflow always surfaces
//! as [`CalendricalError::overflow`].

use crate::error::CalendricalError;
use crate::CalendricalResult;

/// Checked addition. Fails on overflow rather than wrapping.
pub fn checked_add(a: i64, b: i64) -> CalendricalResult<i64> {
    a.checked_add(b).ok_or_else(CalendricalError::overflow)
}

/// Checked subtraction.
pub fn checked_sub(a: i64, b: i64) -> CalendricalResult<i64> {
    a.checked_sub(b).ok_or_else(CalendricalError::overflow)
}

/// Checked multiplication.
pub fn checked_mul(a: i64, b: i64) -> CalendricalResult<i64> {
    a.checked_mul(b).ok_or_else(CalendricalError::overflow)
}

/// Checked negation. Fails on `i64::MIN`, which has no positive counterpart.
pub fn checked_neg(a: i64) -> CalendricalResult<i64> {
    a.checked_neg().ok_or_else(CalendricalError::overflow)
}

/// Checked increment.
pub fn checked_incr(a: i64) -> CalendricalResult<i64> {
    checked_add(a, 1)
}

/// Checked decrement.
pub fn checked_decr(a: i64) -> CalendricalResult<i64> {
    checked_sub(a, 1)
}

/// Narrows an `i64` to `i32`, failing if the value does not fit.
pub fn safe_to_i32(a: i64) -> CalendricalResult<i32> {
    i32::try_from(a).map_err(|_| CalendricalError::overflow())
}

/// Three-way comparison returning -1, 0, or 1.
#[must_use]
pub fn safe_compare(a: i64, b: i64) -> i32 {
    match a.cmp(&b) {
        core::cmp::Ordering::Less => -1,
        core::cmp::Ordering::Equal => 0,
        core::cmp::Ordering::Greater => 1,
    }
}

/// Division that rounds towards negative infinity rather than towards zero.
///
/// Panics (via integer division panic) only when `b == 0`; callers own that precondition
/// the same way they own it for `/`.
#[must_use]
pub fn floor_div(a: i64, b: i64) -> i64 {
    let q = a / b;
    let r = a % b;
    if (r != 0) && ((r < 0) != (b < 0)) {
        q - 1
    } else {
        q
    }
}

/// Remainder that always shares the sign of the divisor (or is zero).
///
/// `a == floor_div(a, b) * b + floor_mod(a, b)` and `0 <= floor_mod(a, b) < |b|` for `b > 0`.
#[must_use]
pub fn floor_mod(a: i64, b: i64) -> i64 {
    let r = a % b;
    if r != 0 && (r < 0) != (b < 0) {
        r + b
    } else {
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_overflow() {
        assert!(checked_add(i64::MAX, 1).is_err());
        assert_eq!(checked_add(2, 3).unwrap(), 5);
    }

    #[test]
    fn mul_overflow_min_times_neg_one() {
        assert!(checked_mul(i64::MIN, -1).is_err());
    }

    #[test]
    fn neg_min_value_overflows() {
        assert!(checked_neg(i64::MIN).is_err());
    }

    #[test]
    fn narrow_overflow() {
        assert!(safe_to_i32(i64::MAX).is_err());
        assert_eq!(safe_to_i32(42).unwrap(), 42);
    }

    #[test]
    fn floor_div_mod_identity() {
        for (a, b) in [(7, 3), (-7, 3), (7, -3), (-7, -3), (0, 5)] {
            let q = floor_div(a, b);
            let r = floor_mod(a, b);
            assert_eq!(q * b + r, a);
            if b > 0 {
                assert!(r >= 0 && r < b);
            }
        }
    }

    #[test]
    fn floor_mod_matches_divisor_sign() {
        assert_eq!(floor_mod(-1, 86400), 86399);
        assert_eq!(floor_div(-1, 86400), -1);
    }
}
