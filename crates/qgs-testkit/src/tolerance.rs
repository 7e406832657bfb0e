#![forbid(unsafe_code)]

//! Epsilon-bounded comparisons and the assertions built on them.
//!
//! # Invariants
//!
//! 1. **Inclusive bound**: two values exactly `epsilon` apart are near.
//!
//! 2. **Symmetry**: `is_near(a, b, eps) == is_near(b, a, eps)`.
//!
//! 3. **NaN is never near a number**: a NaN operand is near only another
//!    NaN. Equal infinities are near; opposite infinities never are.
//!
//! 4. **Composite checks evaluate every axis**: the point and rectangle
//!    assertions log a diagnostic for each failing coordinate before the
//!    test fails, so one run shows every mismatch.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Tolerance exceeded | Difference above `epsilon` | `warn!` diagnostic, then panic |
//! | Unexpectedly near | `assert_not_near` within tolerance | `warn!` diagnostic, then panic |
//! | NaN epsilon | Caller bug | Every non-identical comparison fails |
//!
//! A panic fails the enclosing `#[test]` only. Values owned by the test,
//! including a [`TestCase`](crate::test_case::TestCase), are still dropped
//! during unwinding.

use tracing::warn;

use crate::geometry::{PointLike, RectLike};

/// Default tolerance: a few ULPs around 1.0.
pub const DEFAULT_EPSILON: f64 = 4.0 * f64::EPSILON;

/// True when `value` and `expected` differ by at most `epsilon`.
#[must_use]
pub fn is_near(value: f64, expected: f64, epsilon: f64) -> bool {
    let value_nan = value.is_nan();
    let expected_nan = expected.is_nan();
    if value_nan || expected_nan {
        return value_nan && expected_nan;
    }
    if value == expected {
        return true;
    }
    if value.is_infinite() && expected.is_infinite() {
        return false;
    }
    (value - expected).abs() <= epsilon
}

/// [`is_near`] with [`DEFAULT_EPSILON`].
#[must_use]
pub fn is_near_default(value: f64, expected: f64) -> bool {
    is_near(value, expected, DEFAULT_EPSILON)
}

/// Outcome of a single tolerance check, kept only long enough to describe it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearComparison {
    /// Whether the values were within tolerance.
    pub passed: bool,
    /// The value under test.
    pub actual: f64,
    /// The reference value.
    pub expected: f64,
    /// The tolerance applied.
    pub epsilon: f64,
}

impl NearComparison {
    /// Absolute difference between the two operands.
    #[must_use]
    pub fn diff(&self) -> f64 {
        (self.expected - self.actual).abs()
    }

    /// Message for a failed "near" check, with ten fractional digits.
    #[must_use]
    pub fn near_diagnostic(&self) -> String {
        format!(
            "Expecting {:.10} got {:.10} (diff {:.10} > {:.10})",
            self.expected,
            self.actual,
            self.diff(),
            self.epsilon
        )
    }

    /// Message for a failed "not near" check, with six fractional digits.
    #[must_use]
    pub fn not_near_diagnostic(&self) -> String {
        format!(
            "Expecting {:.6} to be different from {:.6} (diff {:.6} > {:.6})",
            self.actual,
            self.expected,
            self.diff(),
            self.epsilon
        )
    }
}

/// Compare two values and keep the operands for diagnostics.
#[must_use]
pub fn compare_near(
    value: impl Into<f64>,
    expected: impl Into<f64>,
    epsilon: f64,
) -> NearComparison {
    let actual = value.into();
    let expected = expected.into();
    NearComparison {
        passed: is_near(actual, expected, epsilon),
        actual,
        expected,
        epsilon,
    }
}

/// Fail the current test unless `value` is within `epsilon` of `expected`.
#[track_caller]
pub fn assert_near(value: impl Into<f64>, expected: impl Into<f64>, epsilon: f64) {
    assert_near_labeled("", value, expected, epsilon);
}

/// [`assert_near`] with a label prefixed to the diagnostic.
///
/// The assertion macros pass the stringified expression here.
#[track_caller]
pub fn assert_near_labeled(
    label: &str,
    value: impl Into<f64>,
    expected: impl Into<f64>,
    epsilon: f64,
) {
    let comparison = compare_near(value, expected, epsilon);
    if let Some(message) = near_failure(label, &comparison) {
        panic!("{message}");
    }
}

/// Fail the current test if `value` is within `epsilon` of `not_expected`.
#[track_caller]
pub fn assert_not_near(value: impl Into<f64>, not_expected: impl Into<f64>, epsilon: f64) {
    assert_not_near_labeled("", value, not_expected, epsilon);
}

/// [`assert_not_near`] with a label prefixed to the diagnostic.
#[track_caller]
pub fn assert_not_near_labeled(
    label: &str,
    value: impl Into<f64>,
    not_expected: impl Into<f64>,
    epsilon: f64,
) {
    let comparison = compare_near(value, not_expected, epsilon);
    if comparison.passed {
        let message = with_label(label, comparison.not_near_diagnostic());
        warn!(
            value = comparison.actual,
            not_expected = comparison.expected,
            diff = comparison.diff(),
            epsilon = comparison.epsilon,
            "{message}"
        );
        panic!("{message}");
    }
}

/// Fail the current test unless both coordinates are within `epsilon`.
///
/// Both axes are checked and logged before the test fails.
#[track_caller]
pub fn assert_point_near<A, B>(actual: &A, expected: &B, epsilon: f64)
where
    A: PointLike + ?Sized,
    B: PointLike + ?Sized,
{
    let failures = [
        near_failure("x", &compare_near(actual.x(), expected.x(), epsilon)),
        near_failure("y", &compare_near(actual.y(), expected.y(), epsilon)),
    ];
    fail_on_any(&failures);
}

/// Fail the current test unless all four extremes are within `epsilon`.
///
/// The extremes are checked in the order x-min, x-max, y-min, y-max; every
/// failing one is logged before the test fails.
#[track_caller]
pub fn assert_rect_near<A, B>(actual: &A, expected: &B, epsilon: f64)
where
    A: RectLike + ?Sized,
    B: RectLike + ?Sized,
{
    let failures = [
        near_failure("x_min", &compare_near(actual.x_min(), expected.x_min(), epsilon)),
        near_failure("x_max", &compare_near(actual.x_max(), expected.x_max(), epsilon)),
        near_failure("y_min", &compare_near(actual.y_min(), expected.y_min(), epsilon)),
        near_failure("y_max", &compare_near(actual.y_max(), expected.y_max(), epsilon)),
    ];
    fail_on_any(&failures);
}

fn near_failure(label: &str, comparison: &NearComparison) -> Option<String> {
    if comparison.passed {
        return None;
    }
    let message = with_label(label, comparison.near_diagnostic());
    warn!(
        value = comparison.actual,
        expected = comparison.expected,
        diff = comparison.diff(),
        epsilon = comparison.epsilon,
        "{message}"
    );
    Some(message)
}

#[track_caller]
fn fail_on_any(failures: &[Option<String>]) {
    let messages: Vec<&str> = failures.iter().flatten().map(String::as_str).collect();
    if !messages.is_empty() {
        panic!("{}", messages.join("\n"));
    }
}

fn with_label(label: &str, message: String) -> String {
    if label.is_empty() {
        message
    } else {
        format!("{label}: {message}")
    }
}
