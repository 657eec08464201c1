//! Coordinate spaces and scale transforms.
//!
//! Two coordinate spaces are in play:
//!
//! - **original** coordinates describe the page at scale 1.0 and are the
//!   durable state of every field;
//! - **display** coordinates are what the host draws, `original * scale`.
//!
//! Templates additionally record the page width they were authored against,
//! and are rescaled by [`rescale_factor`] when applied to a page of a
//! different width.

use serde::{Deserialize, Serialize};

/// Convert an original coordinate to display space.
pub fn to_display(original: f64, scale: f64) -> f64 {
    original * scale
}

/// Convert a display coordinate to original space.
pub fn to_original(display: f64, scale: f64) -> f64 {
    display / scale
}

/// Factor that maps a template authored at `template_page_width` onto a page
/// whose original width is `page_original_width`.
///
/// Returns `None` when the template width is not positive.
pub fn rescale_factor(page_original_width: f64, template_page_width: f64) -> Option<f64> {
    if template_page_width > 0.0 && template_page_width.is_finite() {
        Some(page_original_width / template_page_width)
    } else {
        None
    }
}

/// A point in either coordinate space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate
    pub y: f64,
}

impl Point {
    /// Create a new point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A size in either coordinate space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl Size {
    /// Create a new size.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from a top-left point and a size.
    pub fn from_point_size(point: Point, size: Size) -> Self {
        Self::new(point.x, point.y, size.width, size.height)
    }

    /// Left edge.
    pub fn left(&self) -> f64 {
        self.x
    }

    /// Top edge.
    pub fn top(&self) -> f64 {
        self.y
    }

    /// Right edge.
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Top-left corner.
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Width and height.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Multiply every component by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(
            self.x * factor,
            self.y * factor,
            self.width * factor,
            self.height * factor,
        )
    }

    /// Convert a display rectangle to original space.
    pub fn to_original(&self, scale: f64) -> Self {
        Self::new(
            to_original(self.x, scale),
            to_original(self.y, scale),
            to_original(self.width, scale),
            to_original(self.height, scale),
        )
    }

    /// Convert an original rectangle to display space.
    pub fn to_display(&self, scale: f64) -> Self {
        self.scaled(scale)
    }

    /// Check whether an offset from the left edge lies strictly inside.
    pub fn contains_offset_x(&self, offset: f64) -> bool {
        offset > 0.0 && offset < self.width
    }
}

/// On-screen zoom level, clamped to [`Scale::MIN`, `Scale::MAX`].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Scale(f64);

impl Scale {
    /// Smallest zoom level.
    pub const MIN: f64 = 0.1;
    /// Largest zoom level.
    pub const MAX: f64 = 3.0;
    /// Zoom increment used by [`Scale::zoomed_in`] and [`Scale::zoomed_out`].
    pub const STEP: f64 = 0.1;

    /// Create a scale, clamping into the allowed range. NaN maps to 1.0.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::default();
        }
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    /// Raw factor.
    pub fn value(self) -> f64 {
        self.0
    }

    /// One step larger, stopping at the maximum.
    pub fn zoomed_in(self) -> Self {
        Self::new(self.0 + Self::STEP)
    }

    /// One step smaller, stopping at the minimum.
    pub fn zoomed_out(self) -> Self {
        Self::new(self.0 - Self::STEP)
    }

    /// Rounded percentage text, e.g. `"150%"`.
    pub fn percent_text(self) -> String {
        format!("{}%", (self.0 * 100.0).round() as i64)
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self(1.0)
    }
}

impl From<Scale> for f64 {
    fn from(scale: Scale) -> Self {
        scale.0
    }
}

impl TryFrom<f64> for Scale {
    type Error = String;

    fn try_from(value: f64) -> std::result::Result<Self, Self::Error> {
        if value.is_finite() && value > 0.0 {
            Ok(Self::new(value))
        } else {
            Err(format!("scale must be a positive number, got {}", value))
        }
    }
}

impl std::fmt::Display for Scale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.percent_text())
    }
}
