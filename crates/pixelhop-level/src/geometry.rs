//! Axis-aligned rectangles and the intersection test.
//!
//! A [`Rect`] is the only collider shape in pixelhop: tiles own one, the
//! player body owns one, and every collision query builds a translated copy
//! as a probe. Coordinates are virtual-resolution pixels with y growing
//! downward.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Rect
// ---------------------------------------------------------------------------

/// Axis-aligned bounding box.
///
/// `x`/`y` (the top-left corner) are freely movable; `width`/`height` are
/// fixed at construction and never negative, so `right >= left` and
/// `bottom >= top` always hold. Deserialization applies the same check as
/// [`Rect::new`] and fails instead of panicking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RectRepr")]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    width: f64,
    height: f64,
}

/// A rectangle size that [`Rect`] refuses.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RectError {
    #[error("rect width must be non-negative and finite, got {0}")]
    Width(f64),
    #[error("rect height must be non-negative and finite, got {0}")]
    Height(f64),
}

/// Wire form of [`Rect`], checked on the way in.
#[derive(Deserialize)]
struct RectRepr {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

impl TryFrom<RectRepr> for Rect {
    type Error = RectError;

    fn try_from(repr: RectRepr) -> Result<Self, Self::Error> {
        Rect::try_new(repr.x, repr.y, repr.width, repr.height)
    }
}

impl Rect {
    /// Create a rectangle with its top-left corner at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `width` or `height` is negative or not finite.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        match Self::try_new(x, y, width, height) {
            Ok(rect) => rect,
            Err(err) => panic!("{err}"),
        }
    }

    /// Fallible [`Rect::new`].
    pub fn try_new(x: f64, y: f64, width: f64, height: f64) -> Result<Self, RectError> {
        if !(width >= 0.0 && width.is_finite()) {
            return Err(RectError::Width(width));
        }
        if !(height >= 0.0 && height.is_finite()) {
            return Err(RectError::Height(height));
        }
        Ok(Self {
            x,
            y,
            width,
            height,
        })
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    /// A copy of this rectangle moved by `(dx, dy)`.
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Move this rectangle by `(dx, dy)` in place.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }

    /// Whether this rectangle overlaps `other`. See [`intersects`].
    pub fn intersects(&self, other: &Rect) -> bool {
        intersects(self, other)
    }
}

// ---------------------------------------------------------------------------
// Intersection
// ---------------------------------------------------------------------------

/// Whether two rectangles overlap.
///
/// Uses strict inequalities on all four edges: rectangles that only share an
/// edge (or a corner) do not intersect. The collision resolver snaps bodies
/// flush against tiles and relies on that contact reading as resolved.
#[inline]
pub fn intersects(a: &Rect, b: &Rect) -> bool {
    a.left() < b.right() && a.right() > b.left() && a.top() < b.bottom() && a.bottom() > b.top()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
