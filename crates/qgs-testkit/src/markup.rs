#![forbid(unsafe_code)]

//! Markup comparison that tolerates one interchangeable attribute pair.
//!
//! Some serializers emit two attributes in either order (GML coordinate
//! lists write `ts=" " cs=","` or `cs="," ts=" "`). Both sides are rewritten
//! to a single ordering before an exact string comparison, so any other
//! difference still fails.

/// Two attribute texts whose relative order is insignificant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeSwap<'a> {
    /// Attribute that comes first in the canonical ordering.
    pub leading: &'a str,
    /// Attribute that comes second in the canonical ordering.
    pub trailing: &'a str,
}

impl<'a> AttributeSwap<'a> {
    /// GML coordinate tuple/coordinate separators.
    pub const GML_COORDINATES: AttributeSwap<'static> = AttributeSwap {
        leading: r#"cs=",""#,
        trailing: r#"ts=" ""#,
    };

    #[must_use]
    pub const fn new(leading: &'a str, trailing: &'a str) -> Self {
        Self { leading, trailing }
    }

    fn canonical(&self) -> String {
        format!("{} {}", self.leading, self.trailing)
    }

    fn swapped(&self) -> String {
        format!("{} {}", self.trailing, self.leading)
    }
}

/// Rewrite every swapped occurrence of the pair into canonical order.
#[must_use]
pub fn normalize_markup(markup: &str, swap: &AttributeSwap<'_>) -> String {
    markup.replace(&swap.swapped(), &swap.canonical())
}

/// True when the two documents are identical up to the attribute ordering.
#[must_use]
pub fn markup_matches(result: &str, expected: &str, swap: &AttributeSwap<'_>) -> bool {
    normalize_markup(result, swap) == normalize_markup(expected, swap)
}

/// Fail the current test unless the documents match up to the ordering.
///
/// The failure shows a line diff of the normalized documents.
#[track_caller]
pub fn compare_markup_ignoring_order(result: &str, expected: &str, swap: &AttributeSwap<'_>) {
    let result = normalize_markup(result, swap);
    let expected = normalize_markup(expected, swap);
    if result != expected {
        tracing::warn!(%result, %expected, "markup differs");
    }
    pretty_assertions::assert_eq!(result, expected);
}

/// [`compare_markup_ignoring_order`] for GML coordinate attributes.
#[track_caller]
pub fn assert_gml_eq(result: &str, expected: &str) {
    compare_markup_ignoring_order(result, expected, &AttributeSwap::GML_COORDINATES);
}
