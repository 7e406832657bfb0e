#![forbid(unsafe_code)]

//! Minimal geometry values for tolerance assertions.
//!
//! Real geometry types live in the library under test. The assertions only
//! need coordinate accessors, so they are written against [`PointLike`] and
//! [`RectLike`]; [`Point`] and [`Rectangle`] are plain implementations for
//! tests that have nothing richer at hand.

use crate::canonical::CanonicalString;
use crate::tolerance::is_near;

/// Anything with planar `x`/`y` coordinates.
pub trait PointLike {
    /// Horizontal coordinate.
    fn x(&self) -> f64;
    /// Vertical coordinate.
    fn y(&self) -> f64;
}

/// Anything with an axis-aligned bounding box.
pub trait RectLike {
    /// Smallest x.
    fn x_min(&self) -> f64;
    /// Largest x.
    fn x_max(&self) -> f64;
    /// Smallest y.
    fn y_min(&self) -> f64;
    /// Largest y.
    fn y_max(&self) -> f64;
}

impl PointLike for (f64, f64) {
    fn x(&self) -> f64 {
        self.0
    }

    fn y(&self) -> f64 {
        self.1
    }
}

impl PointLike for [f64; 2] {
    fn x(&self) -> f64 {
        self[0]
    }

    fn y(&self) -> f64 {
        self[1]
    }
}

/// A 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// A point with no coordinates (`Point EMPTY`).
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            x: f64::NAN,
            y: f64::NAN,
        }
    }

    /// True when both coordinates are NaN.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x.is_nan() && self.y.is_nan()
    }
}

impl PointLike for Point {
    fn x(&self) -> f64 {
        self.x
    }

    fn y(&self) -> f64 {
        self.y
    }
}

impl CanonicalString for Point {
    /// Well-known text, e.g. `Point (1 2.5)`.
    fn canonical_string(&self) -> String {
        if self.is_empty() {
            return "Point EMPTY".to_string();
        }
        format!("Point ({} {})", self.x, self.y)
    }
}

/// An axis-aligned rectangle stored by its extremes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle {
    x_min: f64,
    y_min: f64,
    x_max: f64,
    y_max: f64,
}

impl Rectangle {
    /// Fixed decimal places used by the canonical form.
    pub const CANONICAL_PRECISION: usize = 16;

    /// Create a rectangle from two corners. Corners may be given in any
    /// order; the extremes are normalized so `min <= max`.
    #[must_use]
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            x_min: x1.min(x2),
            y_min: y1.min(y2),
            x_max: x1.max(x2),
            y_max: y1.max(y2),
        }
    }

    /// Rectangle spanning two points.
    #[must_use]
    pub fn from_points(a: &impl PointLike, b: &impl PointLike) -> Self {
        Self::new(a.x(), a.y(), b.x(), b.y())
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// True for degenerate (zero-width or zero-height) rectangles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x_max < self.x_min
            || self.y_max < self.y_min
            || is_near(self.x_max, self.x_min, crate::tolerance::DEFAULT_EPSILON)
            || is_near(self.y_max, self.y_min, crate::tolerance::DEFAULT_EPSILON)
    }

    /// Center point.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(
            self.x_min + self.width() / 2.0,
            self.y_min + self.height() / 2.0,
        )
    }
}

impl RectLike for Rectangle {
    fn x_min(&self) -> f64 {
        self.x_min
    }

    fn x_max(&self) -> f64 {
        self.x_max
    }

    fn y_min(&self) -> f64 {
        self.y_min
    }

    fn y_max(&self) -> f64 {
        self.y_max
    }
}

impl CanonicalString for Rectangle {
    /// `x_min,y_min : x_max,y_max` with fixed precision, or `Empty`.
    fn canonical_string(&self) -> String {
        if self.is_empty() {
            return "Empty".to_string();
        }
        let p = Self::CANONICAL_PRECISION;
        format!(
            "{:.p$},{:.p$} : {:.p$},{:.p$}",
            self.x_min, self.y_min, self.x_max, self.y_max
        )
    }
}
