#![forbid(unsafe_code)]

//! Assertion macros that label diagnostics with the checked expression.

/// Assert that a value is within a tolerance of the expected value.
///
/// Without an explicit epsilon, [`DEFAULT_EPSILON`](crate::tolerance::DEFAULT_EPSILON)
/// is used.
///
/// ```
/// qgs_testkit::assert_near!(0.1 + 0.2, 0.3);
/// qgs_testkit::assert_near!(10.02, 10.0, 0.05);
/// ```
#[macro_export]
macro_rules! assert_near {
    ($value:expr, $expected:expr, $epsilon:expr $(,)?) => {
        $crate::tolerance::assert_near_labeled(
            ::core::stringify!($value),
            $value,
            $expected,
            $epsilon,
        )
    };
    ($value:expr, $expected:expr $(,)?) => {
        $crate::tolerance::assert_near_labeled(
            ::core::stringify!($value),
            $value,
            $expected,
            $crate::tolerance::DEFAULT_EPSILON,
        )
    };
}

/// Assert that a value is farther than a tolerance from another value.
#[macro_export]
macro_rules! assert_not_near {
    ($value:expr, $not_expected:expr, $epsilon:expr $(,)?) => {
        $crate::tolerance::assert_not_near_labeled(
            ::core::stringify!($value),
            $value,
            $not_expected,
            $epsilon,
        )
    };
    ($value:expr, $not_expected:expr $(,)?) => {
        $crate::tolerance::assert_not_near_labeled(
            ::core::stringify!($value),
            $value,
            $not_expected,
            $crate::tolerance::DEFAULT_EPSILON,
        )
    };
}

/// Assert that two points match on both axes.
#[macro_export]
macro_rules! assert_point_near {
    ($actual:expr, $expected:expr, $epsilon:expr $(,)?) => {
        $crate::tolerance::assert_point_near(&$actual, &$expected, $epsilon)
    };
}

/// Assert that two rectangles match on all four extremes.
#[macro_export]
macro_rules! assert_rect_near {
    ($actual:expr, $expected:expr, $epsilon:expr $(,)?) => {
        $crate::tolerance::assert_rect_near(&$actual, &$expected, $epsilon)
    };
}

/// Assert that two GML documents match up to `ts`/`cs` attribute order.
#[macro_export]
macro_rules! assert_gml_eq {
    ($result:expr, $expected:expr $(,)?) => {
        $crate::markup::assert_gml_eq(
            ::core::convert::AsRef::<str>::as_ref(&$result),
            ::core::convert::AsRef::<str>::as_ref(&$expected),
        )
    };
}

/// Assert that two values share a canonical string form.
#[macro_export]
macro_rules! assert_canonical_eq {
    ($actual:expr, $expected:expr $(,)?) => {
        $crate::canonical::assert_canonical_eq(&$actual, &$expected)
    };
}
