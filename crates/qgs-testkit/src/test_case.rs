#![forbid(unsafe_code)]

//! Per-test-case owner of a report section.
//!
//! Create a [`TestCase`] at the top of a test (or in a fixture) and let it
//! fall out of scope. Its report section is flushed on drop, which also runs
//! when an assertion panics part-way through the test.

use crate::env;
use crate::report::{ReportAccumulator, ReportConfig};
use crate::tolerance::NearComparison;

/// A named test case that collects report markup.
#[derive(Debug)]
pub struct TestCase {
    report: ReportAccumulator,
}

impl TestCase {
    /// Test case whose report goes wherever the environment says.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            report: ReportAccumulator::new(name),
        }
    }

    #[must_use]
    pub fn with_config(name: impl Into<String>, config: ReportConfig) -> Self {
        Self {
            report: ReportAccumulator::with_config(name, config),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.report.name()
    }

    /// Append a markup fragment to this test case's section.
    pub fn report(&mut self, fragment: &str) {
        self.report.append_fragment(fragment);
    }

    /// Append a one-line summary of a tolerance comparison.
    pub fn report_comparison(&mut self, label: &str, comparison: &NearComparison) {
        let fragment = if comparison.passed {
            format!(
                "<p>{label}: {:.10} within {:.10} of {:.10}</p>\n",
                comparison.actual, comparison.epsilon, comparison.expected
            )
        } else {
            format!("<p><b>{label}</b>: {}</p>\n", comparison.near_diagnostic())
        };
        self.report(&fragment);
    }

    /// Bytes of markup collected so far.
    #[must_use]
    pub fn report_len(&self) -> usize {
        self.report.len()
    }

    #[must_use]
    pub fn accumulator(&self) -> &ReportAccumulator {
        &self.report
    }

    /// True when running on CI infrastructure. Re-read on every call.
    #[must_use]
    pub fn is_ci_run() -> bool {
        env::is_ci_run()
    }

    /// True when flaky tests are enabled. Re-read on every call.
    #[must_use]
    pub fn run_flaky_tests() -> bool {
        env::run_flaky_tests()
    }
}
