//! Geometric primitives for word boxes.
//!
//! Boxes are kept in the `(x0, x1, y0, y1)` order used by the persisted page
//! metadata, in the page's native layout units (origin bottom-left).

use serde::{Deserialize, Serialize};

/// A 2D point in layout space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// X coordinate
    pub x: f32,
    /// Y coordinate
    pub y: f32,
}

impl Point {
    /// Create a new point.
    ///
    /// # Examples
    ///
    /// ```
    /// use page_highlight::geometry::Point;
    ///
    /// let point = Point::new(10.0, 20.0);
    /// assert_eq!(point.x, 10.0);
    /// assert_eq!(point.y, 20.0);
    /// ```
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned bounding box.
///
/// Serialized as a 4-element array `[x0, x1, y0, y1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct BoundingBox {
    /// Left edge
    pub x0: f32,
    /// Right edge
    pub x1: f32,
    /// Lower edge
    pub y0: f32,
    /// Upper edge
    pub y1: f32,
}

impl From<[f32; 4]> for BoundingBox {
    fn from(v: [f32; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<BoundingBox> for [f32; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.x0, b.x1, b.y0, b.y1]
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}

impl BoundingBox {
    /// Create a box from its edges.
    ///
    /// # Examples
    ///
    /// ```
    /// use page_highlight::geometry::BoundingBox;
    ///
    /// let b = BoundingBox::new(10.0, 50.0, 20.0, 60.0);
    /// assert_eq!(b.width(), 40.0);
    /// assert_eq!(b.height(), 40.0);
    /// ```
    pub fn new(x0: f32, x1: f32, y0: f32, y1: f32) -> Self {
        Self { x0, x1, y0, y1 }
    }

    /// The empty sentinel `(+inf, -inf, +inf, -inf)`.
    ///
    /// Expanding the sentinel by any box yields that box.
    pub fn empty() -> Self {
        Self {
            x0: f32::INFINITY,
            x1: f32::NEG_INFINITY,
            y0: f32::INFINITY,
            y1: f32::NEG_INFINITY,
        }
    }

    /// True while the box has never been expanded (or is inverted).
    pub fn is_empty(&self) -> bool {
        !(self.x0 <= self.x1 && self.y0 <= self.y1)
    }

    /// True if all four edges are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.x0.is_finite() && self.x1.is_finite() && self.y0.is_finite() && self.y1.is_finite()
    }

    /// Grow this box to cover `other` (element-wise min/max union).
    pub fn expand(&mut self, other: &BoundingBox) {
        self.x0 = self.x0.min(other.x0);
        self.x1 = self.x1.max(other.x1);
        self.y0 = self.y0.min(other.y0);
        self.y1 = self.y1.max(other.y1);
    }

    /// Compute the union of this box with another.
    ///
    /// # Examples
    ///
    /// ```
    /// use page_highlight::geometry::BoundingBox;
    ///
    /// let a = BoundingBox::new(0.0, 10.0, 0.0, 10.0);
    /// let b = BoundingBox::new(5.0, 20.0, -5.0, 8.0);
    /// assert_eq!(a.union(&b), BoundingBox::new(0.0, 20.0, -5.0, 10.0));
    /// ```
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let mut out = *self;
        out.expand(other);
        out
    }

    /// Width of the box.
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    /// Height of the box.
    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Centre point of the box.
    pub fn center(&self) -> Point {
        Point::new((self.x0 + self.x1) / 2.0, (self.y0 + self.y1) / 2.0)
    }

    /// Check if this box contains a point (edges inclusive).
    pub fn contains_point(&self, p: &Point) -> bool {
        p.x >= self.x0 && p.x <= self.x1 && p.y >= self.y0 && p.y <= self.y1
    }

    /// Multiply every edge by `factor` (layout units to image pixels).
    pub fn scaled(&self, factor: f32) -> BoundingBox {
        BoundingBox::new(
            self.x0 * factor,
            self.x1 * factor,
            self.y0 * factor,
            self.y1 * factor,
        )
    }

    /// Express the box as fractions of a page of the given size.
    pub fn normalized(&self, width: f32, height: f32) -> BoundingBox {
        BoundingBox::new(self.x0 / width, self.x1 / width, self.y0 / height, self.y1 / height)
    }

    /// Inverse of [`BoundingBox::normalized`].
    pub fn denormalized(&self, width: f32, height: f32) -> BoundingBox {
        BoundingBox::new(self.x0 * width, self.x1 * width, self.y0 * height, self.y1 * height)
    }

    /// Clamp the box to the bounds of `frame`.
    pub fn clipped_to(&self, frame: &BoundingBox) -> BoundingBox {
        BoundingBox::new(
            self.x0.max(frame.x0),
            self.x1.min(frame.x1),
            self.y0.max(frame.y0),
            self.y1.min(frame.y1),
        )
    }

    /// Project the box into the coordinate space of a crop rectangle.
    ///
    /// Returns `None` when the box centre lies outside the crop. Otherwise the
    /// box is clipped to the crop and translated so the crop origin becomes
    /// `(0, 0)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use page_highlight::geometry::BoundingBox;
    ///
    /// let crop = BoundingBox::new(10.0, 50.0, 20.0, 60.0);
    /// let inside = BoundingBox::new(15.0, 45.0, 25.0, 40.0);
    /// let outside = BoundingBox::new(0.0, 5.0, 0.0, 5.0);
    ///
    /// assert_eq!(inside.relative_to(&crop), Some(BoundingBox::new(5.0, 35.0, 5.0, 20.0)));
    /// assert_eq!(outside.relative_to(&crop), None);
    /// ```
    pub fn relative_to(&self, crop: &BoundingBox) -> Option<BoundingBox> {
        if !crop.contains_point(&self.center()) {
            return None;
        }
        let clipped = self.clipped_to(crop);
        Some(BoundingBox::new(
            clipped.x0 - crop.x0,
            clipped.x1 - crop.x0,
            clipped.y0 - crop.y0,
            clipped.y1 - crop.y0,
        ))
    }
}
