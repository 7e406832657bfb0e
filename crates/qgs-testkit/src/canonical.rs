#![forbid(unsafe_code)]

//! Canonical textual form for opaque domain values.
//!
//! Geometries, extents and temporal ranges are compared in tests through a
//! single deterministic string: well-known text for geometries, a descriptive
//! string for everything else. The assertion here compares those strings and
//! shows both sides when they differ.

use tracing::warn;

/// A value with one deterministic, human-readable serialization.
pub trait CanonicalString {
    /// The canonical form. Equal values must produce equal strings.
    fn canonical_string(&self) -> String;
}

impl<T: CanonicalString + ?Sized> CanonicalString for &T {
    fn canonical_string(&self) -> String {
        (**self).canonical_string()
    }
}

impl<T: CanonicalString> CanonicalString for Option<T> {
    fn canonical_string(&self) -> String {
        match self {
            Some(value) => value.canonical_string(),
            None => "None".to_string(),
        }
    }
}

impl<T: CanonicalString> CanonicalString for [T] {
    /// Items joined as `[a, b, c]`.
    fn canonical_string(&self) -> String {
        let mut out = String::from("[");
        for (idx, item) in self.iter().enumerate() {
            if idx > 0 {
                out.push_str(", ");
            }
            out.push_str(&item.canonical_string());
        }
        out.push(']');
        out
    }
}

impl<T: CanonicalString> CanonicalString for Vec<T> {
    fn canonical_string(&self) -> String {
        self.as_slice().canonical_string()
    }
}

/// Fail the current test unless both values share a canonical form.
#[track_caller]
pub fn assert_canonical_eq<A, B>(actual: &A, expected: &B)
where
    A: CanonicalString + ?Sized,
    B: CanonicalString + ?Sized,
{
    let actual = actual.canonical_string();
    let expected = expected.canonical_string();
    if actual != expected {
        warn!(%actual, %expected, "canonical forms differ");
        panic!("canonical forms differ\n  actual: {actual}\nexpected: {expected}");
    }
}
