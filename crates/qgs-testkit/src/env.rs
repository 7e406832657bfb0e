#![forbid(unsafe_code)]

//! Process-environment flags consulted by test suites.
//!
//! Every query reads the environment at call time. Nothing is cached, so a
//! suite that changes a variable mid-run sees the new value on the next call.
//! The `*_with` variants take a lookup closure so tests can inject an
//! environment without touching the real one.

/// Set to `true` by CI infrastructure.
pub const ENV_CI_RUN: &str = "QGIS_CONTINUOUS_INTEGRATION_RUN";

/// Set to `true` to enable tests known to be flaky.
pub const ENV_RUN_FLAKY_TESTS: &str = "RUN_FLAKY_TESTS";

/// Overrides the directory the local HTML report is written to.
pub const ENV_REPORT_DIR: &str = "QGIS_TEST_REPORT_DIR";

/// True when the tests run on CI infrastructure.
///
/// Only the exact value `true` counts; `1`, `True` or an empty value do not.
#[must_use]
pub fn is_ci_run() -> bool {
    is_ci_run_with(|key| std::env::var(key).ok())
}

/// [`is_ci_run`] against a custom environment lookup.
#[must_use]
pub fn is_ci_run_with<F>(get_env: F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    env_exact_true(get_env(ENV_CI_RUN).as_deref())
}

/// True when flaky tests should run.
#[must_use]
pub fn run_flaky_tests() -> bool {
    run_flaky_tests_with(|key| std::env::var(key).ok())
}

/// [`run_flaky_tests`] against a custom environment lookup.
#[must_use]
pub fn run_flaky_tests_with<F>(get_env: F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    env_exact_true(get_env(ENV_RUN_FLAKY_TESTS).as_deref())
}

fn env_exact_true(value: Option<&str>) -> bool {
    matches!(value, Some("true"))
}
