#![forbid(unsafe_code)]

//! Tolerance assertions and local HTML comparison reports for test suites.
//!
//! # Role
//! `qgs-testkit` is linked into test binaries only. It provides two things
//! that work independently but usually meet in one test:
//! - **Tolerance assertions** ([`tolerance`]): epsilon comparisons for
//!   scalars, points and rectangles that log a diagnostic and fail the
//!   current test on mismatch.
//! - **Local report** ([`report`], [`test_case`]): markup collected while a
//!   test runs and appended to a shared `index.html` when the owning
//!   [`TestCase`] is dropped, then opened in a viewer outside CI.
//!
//! Assertion failures are loud and fail the test; report failures are
//! silent and never do.
//!
//! # Example
//!
//! ```no_run
//! use qgs_testkit::{assert_near, assert_point_near, geometry::Point, TestCase};
//!
//! let mut case = TestCase::new("testBuffer");
//! let centroid = Point::new(10.0000001, 5.0);
//! assert_point_near!(centroid, Point::new(10.0, 5.0), 1e-6);
//! assert_near!(centroid.x * 2.0, 20.0, 1e-6);
//! case.report("<p>centroid ok</p>");
//! // `case` is dropped here and its section is appended to the report.
//! ```

pub mod canonical;
pub mod env;
pub mod geometry;
mod macros;
pub mod markup;
pub mod report;
pub mod temporal;
pub mod test_case;
pub mod tolerance;

pub use canonical::{CanonicalString, assert_canonical_eq};
pub use env::{is_ci_run, run_flaky_tests};
pub use geometry::{Point, PointLike, RectLike, Rectangle};
pub use markup::{AttributeSwap, compare_markup_ignoring_order, markup_matches};
pub use report::{ReportAccumulator, ReportConfig, ReportError, ReportViewer};
pub use temporal::{DateTimeRange, Interval, TemporalUnit};
pub use test_case::TestCase;
pub use tolerance::{
    DEFAULT_EPSILON, NearComparison, assert_near, assert_not_near, assert_point_near,
    assert_rect_near, compare_near, is_near,
};
