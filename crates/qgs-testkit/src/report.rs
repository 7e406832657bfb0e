#![forbid(unsafe_code)]

//! Local HTML report of test comparisons.
//!
//! Each [`ReportAccumulator`] buffers markup for one test case and, when it
//! is dropped, appends that markup under an `<h1>` heading to a shared
//! `index.html` in the report directory. Outside CI the file is then handed
//! to a viewer.
//!
//! # Invariants
//!
//! 1. **Empty means untouched**: an accumulator that never received markup
//!    does not create, open or modify the report file.
//!
//! 2. **One flush per accumulator**: the buffer is written at most once,
//!    on drop, including drops during panic unwinding.
//!
//! 3. **Append only**: the report file is never truncated; sections appear
//!    in drop order, which is not necessarily the order test cases were
//!    created or declared in.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Directory not creatable | Permissions, path is a file | Flush skipped, `debug!` |
//! | File not openable | Permissions, disk | Flush skipped, `debug!` |
//! | Partial write | Disk full | Handle closed, `debug!` |
//! | Viewer launch fails | No opener installed | Ignored, `trace!` |
//!
//! None of these reach the caller: reporting must never fail a test.
//! Concurrent appends from other processes are not locked against; each
//! flush is a single append-mode write.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, trace};

use crate::env::{self, ENV_REPORT_DIR};

/// File name of the shared report inside the report directory.
pub const REPORT_FILE_NAME: &str = "index.html";

/// Directory name used under the system temp directory by default.
pub const DEFAULT_REPORT_DIR_NAME: &str = "qgis_test_report";

/// Default report directory: `<temp>/qgis_test_report`.
#[must_use]
pub fn default_report_dir() -> PathBuf {
    std::env::temp_dir().join(DEFAULT_REPORT_DIR_NAME)
}

/// `file://` URL for a local path.
///
/// The path is used as given; see [`report_url`] for relative paths.
#[must_use]
pub fn file_url(path: &Path) -> String {
    let path = path.to_string_lossy().replace('\\', "/");
    if path.starts_with('/') {
        format!("file://{path}")
    } else {
        format!("file:///{path}")
    }
}

/// `file://` URL for `path`, resolved against the current directory first.
///
/// Falls back to the path as given when the current directory is unknown.
#[must_use]
pub fn report_url(path: &Path) -> String {
    match std::path::absolute(path) {
        Ok(absolute) => file_url(&absolute),
        Err(err) => {
            trace!(path = %path.display(), error = %err, "cannot resolve report path");
            file_url(path)
        }
    }
}

/// Errors from writing the report file.
///
/// Only observable through [`ReportAccumulator::flush_now`]; dropping an
/// accumulator swallows them.
#[derive(Debug)]
pub enum ReportError {
    /// The report directory could not be created.
    CreateDir { path: PathBuf, source: io::Error },
    /// The report file could not be opened for appending.
    Open { path: PathBuf, source: io::Error },
    /// Writing the section failed part-way.
    Write { path: PathBuf, source: io::Error },
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateDir { path, source } => {
                write!(f, "cannot create report dir {}: {source}", path.display())
            }
            Self::Open { path, source } => {
                write!(f, "cannot open report {}: {source}", path.display())
            }
            Self::Write { path, source } => {
                write!(f, "cannot write report {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ReportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::CreateDir { source, .. }
            | Self::Open { source, .. }
            | Self::Write { source, .. } => Some(source),
        }
    }
}

/// Something that can show a report file to the developer.
pub trait ReportViewer: fmt::Debug + Send + Sync {
    /// Open `url` (a `file://` URL). Called at most once per flush.
    fn open(&self, url: &str) -> io::Result<()>;
}

/// Launches the platform's default opener, detached.
///
/// The opener is waited on from a background thread so it does not linger
/// as a zombie until the test binary exits.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemViewer;

impl ReportViewer for SystemViewer {
    fn open(&self, url: &str) -> io::Result<()> {
        spawn_detached(opener_command(url)?).map(|_reaper| ())
    }
}

/// Spawn `command` with null stdio and reap it on a background thread.
fn spawn_detached(mut command: Command) -> io::Result<JoinHandle<io::Result<ExitStatus>>> {
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    thread::Builder::new()
        .name("qgs-report-viewer".into())
        .spawn(move || {
            let status = child.wait();
            trace!(?status, "report viewer exited");
            status
        })
}

#[cfg(target_os = "macos")]
fn opener_command(url: &str) -> io::Result<Command> {
    let mut command = Command::new("open");
    command.arg(url);
    Ok(command)
}

#[cfg(windows)]
fn opener_command(url: &str) -> io::Result<Command> {
    let mut command = Command::new("cmd");
    command.args(["/C", "start", ""]).arg(url);
    Ok(command)
}

#[cfg(all(unix, not(target_os = "macos")))]
fn opener_command(url: &str) -> io::Result<Command> {
    let mut command = Command::new("xdg-open");
    command.arg(url);
    Ok(command)
}

#[cfg(not(any(unix, windows)))]
fn opener_command(_url: &str) -> io::Result<Command> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "no default opener on this platform",
    ))
}

/// Never opens anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullViewer;

impl ReportViewer for NullViewer {
    fn open(&self, _url: &str) -> io::Result<()> {
        Ok(())
    }
}

/// How a flush decides whether it runs on CI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CiDetection {
    /// Read [`env::ENV_CI_RUN`] at flush time.
    #[default]
    Environment,
    /// Use a fixed answer.
    Assume(bool),
}

impl CiDetection {
    #[must_use]
    pub fn is_ci_run(self) -> bool {
        match self {
            Self::Environment => env::is_ci_run(),
            Self::Assume(ci) => ci,
        }
    }
}

/// Where and how reports are written.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Directory holding [`REPORT_FILE_NAME`].
    pub report_dir: PathBuf,
    /// CI detection used to suppress the viewer.
    pub ci: CiDetection,
    /// Viewer invoked after a successful flush outside CI.
    pub viewer: Arc<dyn ReportViewer>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            report_dir: default_report_dir(),
            ci: CiDetection::Environment,
            viewer: Arc::new(SystemViewer),
        }
    }
}

impl ReportConfig {
    /// Config from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Config from a custom environment lookup.
    ///
    /// A non-blank [`ENV_REPORT_DIR`] replaces the default directory.
    #[must_use]
    pub fn from_env_with<F>(get_env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(dir) = get_env(ENV_REPORT_DIR).filter(|dir| !dir.trim().is_empty()) {
            config.report_dir = PathBuf::from(dir);
        }
        config
    }

    #[must_use]
    pub fn with_report_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.report_dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_ci(mut self, ci: CiDetection) -> Self {
        self.ci = ci;
        self
    }

    #[must_use]
    pub fn with_viewer(mut self, viewer: Arc<dyn ReportViewer>) -> Self {
        self.viewer = viewer;
        self
    }

    /// Full path of the shared report file.
    #[must_use]
    pub fn report_file(&self) -> PathBuf {
        self.report_dir.join(REPORT_FILE_NAME)
    }
}

/// Result of a flush attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Nothing to write, or already written.
    Skipped,
    /// The section was appended.
    Written {
        path: PathBuf,
        bytes: usize,
        viewer_opened: bool,
    },
}

/// Per-test-case report buffer, flushed once on drop.
#[derive(Debug)]
pub struct ReportAccumulator {
    name: String,
    buffer: String,
    config: ReportConfig,
    flushed: bool,
}

impl ReportAccumulator {
    /// Accumulator configured from the environment.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, ReportConfig::from_env())
    }

    #[must_use]
    pub fn with_config(name: impl Into<String>, config: ReportConfig) -> Self {
        Self {
            name: name.into(),
            buffer: String::new(),
            config,
            flushed: false,
        }
    }

    /// Append markup verbatim. No validation, no deduplication.
    pub fn append_fragment(&mut self, markup: &str) {
        self.buffer.push_str(markup);
    }

    /// Heading text for this accumulator's section.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Markup collected so far.
    #[must_use]
    pub fn contents(&self) -> &str {
        &self.buffer
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Buffered length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    #[must_use]
    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Flush immediately instead of waiting for drop, surfacing errors.
    ///
    /// The accumulator counts as flushed afterwards even on error, so the
    /// drop does not retry.
    pub fn flush_now(&mut self) -> Result<FlushOutcome, ReportError> {
        if self.flushed || self.buffer.is_empty() {
            return Ok(FlushOutcome::Skipped);
        }
        self.flushed = true;

        ensure_dir(&self.config.report_dir)?;
        let path = self.config.report_file();
        let section = render_section(&self.name, &self.buffer);
        append_to(&path, &section)?;

        let viewer_opened = !self.config.ci.is_ci_run() && self.open_viewer(&path);
        Ok(FlushOutcome::Written {
            path,
            bytes: section.len(),
            viewer_opened,
        })
    }

    fn open_viewer(&self, path: &Path) -> bool {
        let url = report_url(path);
        match self.config.viewer.open(&url) {
            Ok(()) => true,
            Err(err) => {
                trace!(%url, error = %err, "report viewer failed");
                false
            }
        }
    }
}

impl Drop for ReportAccumulator {
    fn drop(&mut self) {
        match self.flush_now() {
            Ok(FlushOutcome::Skipped) => {}
            Ok(FlushOutcome::Written { path, bytes, .. }) => {
                debug!(name = %self.name, path = %path.display(), bytes, "report section written");
            }
            Err(err) => {
                debug!(name = %self.name, error = %err, "report section dropped");
            }
        }
    }
}

/// `<h1>name</h1>` followed by the markup, verbatim.
#[must_use]
pub fn render_section(name: &str, markup: &str) -> String {
    format!("<h1>{name}</h1>\n{markup}")
}

fn ensure_dir(dir: &Path) -> Result<(), ReportError> {
    if dir.is_dir() {
        return Ok(());
    }
    match fs::create_dir_all(dir) {
        Ok(()) => Ok(()),
        // Another writer may have created it in the meantime.
        Err(_) if dir.is_dir() => Ok(()),
        Err(source) => Err(ReportError::CreateDir {
            path: dir.to_path_buf(),
            source,
        }),
    }
}

fn append_to(path: &Path, section: &str) -> Result<(), ReportError> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| ReportError::Open {
            path: path.to_path_buf(),
            source,
        })?;
    file.write_all(section.as_bytes())
        .map_err(|source| ReportError::Write {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct RecordingViewer {
        urls: Mutex<Vec<String>>,
    }

    impl ReportViewer for RecordingViewer {
        fn open(&self, url: &str) -> io::Result<()> {
            self.urls.lock().expect("viewer lock").push(url.to_string());
            Ok(())
        }
    }

    #[derive(Debug)]
    struct FailingViewer;

    impl ReportViewer for FailingViewer {
        fn open(&self, _url: &str) -> io::Result<()> {
            Err(io::Error::other("no display"))
        }
    }

    /// `target` expressed relative to `base` through `..` components.
    #[cfg(unix)]
    fn relative_to(base: &Path, target: &Path) -> PathBuf {
        let mut relative: PathBuf = base.components().skip(1).map(|_| "..").collect();
        relative.push(target.strip_prefix("/").unwrap_or(target));
        relative
    }

    fn config_in(dir: &Path) -> ReportConfig {
        ReportConfig::default()
            .with_report_dir(dir)
            .with_ci(CiDetection::Assume(true))
            .with_viewer(Arc::new(NullViewer))
    }

    // ── config ────────────────────────────────────────────────────────

    #[test]
    fn default_dir_is_under_temp() {
        let config = ReportConfig::from_env_with(|_| None);
        assert_eq!(config.report_dir, std::env::temp_dir().join("qgis_test_report"));
        assert_eq!(
            config.report_file(),
            std::env::temp_dir().join("qgis_test_report").join("index.html")
        );
        assert_eq!(config.ci, CiDetection::Environment);
    }

    #[test]
    fn env_overrides_report_dir() {
        let env: HashMap<&str, &str> = [(ENV_REPORT_DIR, "/srv/reports")].into_iter().collect();
        let config = ReportConfig::from_env_with(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.report_dir, PathBuf::from("/srv/reports"));
    }

    #[test]
    fn blank_env_dir_is_ignored() {
        let config =
            ReportConfig::from_env_with(|key| (key == ENV_REPORT_DIR).then(|| "  ".into()));
        assert_eq!(config.report_dir, default_report_dir());
    }

    #[test]
    fn file_url_forms() {
        assert_eq!(file_url(Path::new("/tmp/r/index.html")), "file:///tmp/r/index.html");
        assert_eq!(file_url(Path::new(r"C:\r\index.html")), "file:///C:/r/index.html");
    }

    #[test]
    fn report_url_resolves_relative_paths() {
        let cwd = std::env::current_dir().expect("current dir");
        let relative = Path::new("rel_reports").join(REPORT_FILE_NAME);
        let url = report_url(&relative);
        assert_eq!(url, file_url(&cwd.join(&relative)));
        assert_ne!(url, file_url(&relative));
        assert!(url.starts_with("file:///"), "{url}");
    }

    #[test]
    fn report_url_keeps_absolute_paths() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(REPORT_FILE_NAME);
        assert_eq!(report_url(&path), file_url(&path));
    }

    #[test]
    fn section_rendering() {
        assert_eq!(render_section("A", "<p>X</p>"), "<h1>A</h1>\n<p>X</p>");
    }

    #[test]
    fn error_display_names_path() {
        let err = ReportError::Open {
            path: PathBuf::from("/nope/index.html"),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        let text = err.to_string();
        assert!(text.starts_with("cannot open report /nope/index.html"), "{text}");
        assert!(std::error::Error::source(&err).is_some());
    }

    // ── accumulator ───────────────────────────────────────────────────

    #[test]
    fn append_is_verbatim_and_duplicates() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut acc = ReportAccumulator::with_config("dup", config_in(dir.path()));
        acc.append_fragment("<p>a</p>");
        acc.append_fragment("<p>a</p>");
        assert_eq!(acc.contents(), "<p>a</p><p>a</p>");
        assert_eq!(acc.len(), 16);
        assert_eq!(acc.name(), "dup");
    }

    #[test]
    fn empty_flush_is_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let report_dir = dir.path().join("report");
        let mut acc = ReportAccumulator::with_config("empty", config_in(&report_dir));
        assert!(acc.is_empty());
        assert_eq!(acc.flush_now().expect("flush"), FlushOutcome::Skipped);
        drop(acc);
        assert!(!report_dir.exists());
    }

    #[test]
    fn flush_now_writes_once() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut acc = ReportAccumulator::with_config("once", config_in(dir.path()));
        acc.append_fragment("<p>X</p>");
        let outcome = acc.flush_now().expect("flush");
        assert_eq!(
            outcome,
            FlushOutcome::Written {
                path: dir.path().join(REPORT_FILE_NAME),
                bytes: "<h1>once</h1>\n<p>X</p>".len(),
                viewer_opened: false,
            }
        );
        assert_eq!(acc.flush_now().expect("second flush"), FlushOutcome::Skipped);
        drop(acc);
        let written = fs::read_to_string(dir.path().join(REPORT_FILE_NAME)).expect("read report");
        assert_eq!(written, "<h1>once</h1>\n<p>X</p>");
    }

    #[test]
    fn viewer_opens_outside_ci_only() {
        let dir = tempfile::tempdir().expect("tempdir");
        let viewer = Arc::new(RecordingViewer::default());

        let local = config_in(dir.path())
            .with_ci(CiDetection::Assume(false))
            .with_viewer(viewer.clone());
        let mut acc = ReportAccumulator::with_config("local", local.clone());
        acc.append_fragment("<p>1</p>");
        drop(acc);

        let ci = local.with_ci(CiDetection::Assume(true));
        let mut acc = ReportAccumulator::with_config("ci", ci);
        acc.append_fragment("<p>2</p>");
        drop(acc);

        let urls = viewer.urls.lock().expect("viewer lock");
        assert_eq!(urls.len(), 1);
        assert_eq!(urls[0], file_url(&dir.path().join(REPORT_FILE_NAME)));
    }

    #[test]
    fn viewer_failure_is_ignored() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = config_in(dir.path())
            .with_ci(CiDetection::Assume(false))
            .with_viewer(Arc::new(FailingViewer));
        let mut acc = ReportAccumulator::with_config("viewer", config);
        acc.append_fragment("<p>v</p>");
        match acc.flush_now().expect("flush") {
            FlushOutcome::Written { viewer_opened, .. } => assert!(!viewer_opened),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn uncreatable_dir_reports_error_but_drop_is_silent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"not a directory").expect("write blocker");

        let mut acc = ReportAccumulator::with_config("blocked", config_in(&blocker.join("sub")));
        acc.append_fragment("<p>lost</p>");
        let err = acc.flush_now().expect_err("dir under a file cannot exist");
        assert!(matches!(err, ReportError::CreateDir { .. }), "{err}");

        let mut silent = ReportAccumulator::with_config("blocked", config_in(&blocker.join("sub")));
        silent.append_fragment("<p>lost</p>");
        drop(silent);
    }

    #[cfg(unix)]
    #[test]
    fn viewer_gets_absolute_url_for_relative_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cwd = std::env::current_dir().expect("current dir");
        let relative_dir = relative_to(&cwd, dir.path());
        assert!(relative_dir.is_relative());

        let viewer = Arc::new(RecordingViewer::default());
        let config = config_in(&relative_dir)
            .with_ci(CiDetection::Assume(false))
            .with_viewer(viewer.clone());
        let mut acc = ReportAccumulator::with_config("relative", config);
        acc.append_fragment("<p>r</p>");
        drop(acc);

        let written = dir.path().join(REPORT_FILE_NAME);
        assert_eq!(
            fs::read_to_string(&written).expect("read report"),
            "<h1>relative</h1>\n<p>r</p>"
        );

        let urls = viewer.urls.lock().expect("viewer lock");
        let expected_target = cwd.join(&relative_dir).join(REPORT_FILE_NAME);
        assert_eq!(urls.as_slice(), [file_url(&expected_target)]);
        assert!(!urls[0].contains("file:///.."), "{}", urls[0]);
        assert_eq!(
            fs::canonicalize(&expected_target).expect("url target"),
            fs::canonicalize(&written).expect("written report"),
        );
    }

    #[cfg(unix)]
    #[test]
    fn detached_child_is_reaped() {
        let reaper = spawn_detached(Command::new("true")).expect("spawn true");
        let status = reaper.join().expect("reaper thread").expect("wait");
        assert!(status.success());
    }

    #[test]
    fn ci_detection_assume() {
        assert!(CiDetection::Assume(true).is_ci_run());
        assert!(!CiDetection::Assume(false).is_ci_run());
    }
}
