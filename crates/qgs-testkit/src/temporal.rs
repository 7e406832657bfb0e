#![forbid(unsafe_code)]

//! Temporal values with canonical descriptive strings.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::canonical::CanonicalString;

/// A date-time range with optional open bounds.
///
/// A `None` bound is unbounded on that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTimeRange {
    begin: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    include_beginning: bool,
    include_end: bool,
}

impl DateTimeRange {
    /// Closed range `[begin, end]`.
    #[must_use]
    pub fn new(begin: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            begin: Some(begin),
            end: Some(end),
            include_beginning: true,
            include_end: true,
        }
    }

    /// Range with explicit, possibly unbounded, limits.
    #[must_use]
    pub fn with_bounds(begin: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self {
            begin,
            end,
            include_beginning: true,
            include_end: true,
        }
    }

    #[must_use]
    pub fn include_beginning(mut self, include: bool) -> Self {
        self.include_beginning = include;
        self
    }

    #[must_use]
    pub fn include_end(mut self, include: bool) -> Self {
        self.include_end = include;
        self
    }

    #[must_use]
    pub fn begin(&self) -> Option<DateTime<Utc>> {
        self.begin
    }

    #[must_use]
    pub fn end(&self) -> Option<DateTime<Utc>> {
        self.end
    }

    #[must_use]
    pub fn includes_beginning(&self) -> bool {
        self.include_beginning
    }

    #[must_use]
    pub fn includes_end(&self) -> bool {
        self.include_end
    }

    /// True when `instant` falls inside the range, honoring bound inclusion.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        let after_begin = match self.begin {
            None => true,
            Some(begin) if self.include_beginning => instant >= begin,
            Some(begin) => instant > begin,
        };
        let before_end = match self.end {
            None => true,
            Some(end) if self.include_end => instant <= end,
            Some(end) => instant < end,
        };
        after_begin && before_end
    }
}

fn iso_with_ms(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_default()
}

impl CanonicalString for DateTimeRange {
    /// `<QgsDateTimeRange: [begin, end)>` with millisecond ISO timestamps.
    fn canonical_string(&self) -> String {
        format!(
            "<QgsDateTimeRange: {}{}, {}{}>",
            if self.include_beginning { "[" } else { "(" },
            iso_with_ms(self.begin),
            iso_with_ms(self.end),
            if self.include_end { "]" } else { ")" },
        )
    }
}

/// Units an [`Interval`] can be expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemporalUnit {
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
    Weeks,
    Months,
    Years,
    Decades,
    Centuries,
    IrregularStep,
    Unknown,
}

impl TemporalUnit {
    /// Length of one unit in seconds. `None` for units without a fixed length.
    ///
    /// Months count as 30 days and years as 365.25 days.
    #[must_use]
    pub fn seconds(self) -> Option<f64> {
        const DAY: f64 = 86_400.0;
        const YEAR: f64 = 365.25 * DAY;
        match self {
            Self::Milliseconds => Some(0.001),
            Self::Seconds => Some(1.0),
            Self::Minutes => Some(60.0),
            Self::Hours => Some(3_600.0),
            Self::Days => Some(DAY),
            Self::Weeks => Some(7.0 * DAY),
            Self::Months => Some(30.0 * DAY),
            Self::Years => Some(YEAR),
            Self::Decades => Some(10.0 * YEAR),
            Self::Centuries => Some(100.0 * YEAR),
            Self::IrregularStep | Self::Unknown => None,
        }
    }
}

impl fmt::Display for TemporalUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Milliseconds => "milliseconds",
            Self::Seconds => "seconds",
            Self::Minutes => "minutes",
            Self::Hours => "hours",
            Self::Days => "days",
            Self::Weeks => "weeks",
            Self::Months => "months",
            Self::Years => "years",
            Self::Decades => "decades",
            Self::Centuries => "centuries",
            Self::IrregularStep => "steps",
            Self::Unknown => "<unknown>",
        };
        f.write_str(name)
    }
}

/// A duration remembered in the unit it was created with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    duration: f64,
    unit: TemporalUnit,
}

impl Interval {
    #[must_use]
    pub fn new(duration: f64, unit: TemporalUnit) -> Self {
        Self { duration, unit }
    }

    /// Duration in the original unit.
    #[must_use]
    pub fn original_duration(&self) -> f64 {
        self.duration
    }

    #[must_use]
    pub fn original_unit(&self) -> TemporalUnit {
        self.unit
    }

    /// Duration converted to seconds, when the unit has a fixed length.
    #[must_use]
    pub fn as_seconds(&self) -> Option<f64> {
        self.unit.seconds().map(|s| s * self.duration)
    }
}

impl CanonicalString for Interval {
    /// `<QgsInterval: 1.5 hours>`.
    fn canonical_string(&self) -> String {
        format!("<QgsInterval: {} {}>", self.duration, self.unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s)
            .single()
            .expect("valid test timestamp")
    }

    #[test]
    fn closed_range_canonical() {
        let range = DateTimeRange::new(utc(2020, 1, 1, 0, 0, 0), utc(2020, 1, 2, 12, 30, 0));
        assert_eq!(
            range.canonical_string(),
            "<QgsDateTimeRange: [2020-01-01T00:00:00.000Z, 2020-01-02T12:30:00.000Z]>"
        );
    }

    #[test]
    fn half_open_range_canonical() {
        let range = DateTimeRange::new(utc(2020, 1, 1, 0, 0, 0), utc(2020, 1, 2, 0, 0, 0))
            .include_beginning(false)
            .include_end(false);
        assert_eq!(
            range.canonical_string(),
            "<QgsDateTimeRange: (2020-01-01T00:00:00.000Z, 2020-01-02T00:00:00.000Z)>"
        );
    }

    #[test]
    fn unbounded_range_canonical() {
        let range = DateTimeRange::with_bounds(None, Some(utc(2021, 6, 1, 0, 0, 0)));
        assert_eq!(
            range.canonical_string(),
            "<QgsDateTimeRange: [, 2021-06-01T00:00:00.000Z]>"
        );
    }

    #[test]
    fn contains_honors_inclusion() {
        let begin = utc(2020, 1, 1, 0, 0, 0);
        let end = utc(2020, 1, 2, 0, 0, 0);
        let closed = DateTimeRange::new(begin, end);
        assert!(closed.contains(begin));
        assert!(closed.contains(end));
        let open = closed.include_beginning(false).include_end(false);
        assert!(!open.contains(begin));
        assert!(!open.contains(end));
        assert!(open.contains(utc(2020, 1, 1, 12, 0, 0)));
        assert!(DateTimeRange::with_bounds(None, None).contains(begin));
    }

    #[test]
    fn interval_canonical_keeps_original_unit() {
        assert_eq!(
            Interval::new(1.5, TemporalUnit::Hours).canonical_string(),
            "<QgsInterval: 1.5 hours>"
        );
        assert_eq!(
            Interval::new(2.0, TemporalUnit::Days).canonical_string(),
            "<QgsInterval: 2 days>"
        );
    }

    #[test]
    fn interval_seconds() {
        assert_eq!(Interval::new(2.0, TemporalUnit::Minutes).as_seconds(), Some(120.0));
        assert_eq!(Interval::new(1.0, TemporalUnit::Years).as_seconds(), Some(31_557_600.0));
        assert_eq!(Interval::new(3.0, TemporalUnit::IrregularStep).as_seconds(), None);
    }
}
