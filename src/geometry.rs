//! Page-space and screen-space geometry
//!
//! Link rectangles and search-hit quads arrive in page coordinates
//! (unscaled, as produced by the renderer). The view multiplies them by the
//! current view scale and offsets them by the bitmap origin when drawing.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in floating point coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct Rect {
    /// Left edge X coordinate
    pub x0: f32,
    /// Top edge Y coordinate
    pub y0: f32,
    /// Right edge X coordinate
    pub x1: f32,
    /// Bottom edge Y coordinate
    pub y1: f32,
}

impl Rect {
    #[must_use]
    pub const fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Inclusive on all four edges, so a tap exactly on a border still hits.
    #[must_use]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x0 && x <= self.x1 && y >= self.y0 && y <= self.y1
    }

    /// Scale by `scale` and then translate by `(dx, dy)`
    #[must_use]
    pub fn transform(&self, scale: f32, dx: f32, dy: f32) -> Self {
        Self {
            x0: dx + self.x0 * scale,
            y0: dy + self.y0 * scale,
            x1: dx + self.x1 * scale,
            y1: dy + self.y1 * scale,
        }
    }

    #[must_use]
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    #[must_use]
    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }
}

impl From<[f32; 4]> for Rect {
    fn from([x0, y0, x1, y1]: [f32; 4]) -> Self {
        Self::new(x0, y0, x1, y1)
    }
}

impl From<Rect> for [f32; 4] {
    fn from(r: Rect) -> Self {
        [r.x0, r.y0, r.x1, r.y1]
    }
}

/// Point in floating point coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 2]", into = "[f32; 2]")]
pub struct PointF {
    pub x: f32,
    pub y: f32,
}

impl PointF {
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn transform(&self, scale: f32, dx: f32, dy: f32) -> Self {
        Self::new(dx + self.x * scale, dy + self.y * scale)
    }
}

impl From<[f32; 2]> for PointF {
    fn from([x, y]: [f32; 2]) -> Self {
        Self::new(x, y)
    }
}

impl From<PointF> for [f32; 2] {
    fn from(p: PointF) -> Self {
        [p.x, p.y]
    }
}

/// Quadrilateral covering a run of text, as reported by a search.
///
/// Corners are named by their position relative to the text baseline, so
/// rotated text still yields a proper quad.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Quad {
    pub ul: PointF,
    pub ur: PointF,
    pub ll: PointF,
    pub lr: PointF,
}

impl Quad {
    #[must_use]
    pub const fn new(ul: PointF, ur: PointF, ll: PointF, lr: PointF) -> Self {
        Self { ul, ur, ll, lr }
    }

    /// Quad spanning an axis-aligned rectangle
    #[must_use]
    pub const fn from_rect(r: Rect) -> Self {
        Self {
            ul: PointF::new(r.x0, r.y0),
            ur: PointF::new(r.x1, r.y0),
            ll: PointF::new(r.x0, r.y1),
            lr: PointF::new(r.x1, r.y1),
        }
    }

    /// Corners in drawing order: ul, ll, lr, ur
    #[must_use]
    pub fn outline(&self) -> [PointF; 4] {
        [self.ul, self.ll, self.lr, self.ur]
    }
}

/// Integer rectangle in screen pixels, `right`/`bottom` exclusive
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IntRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl IntRect {
    #[must_use]
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    #[must_use]
    pub const fn width(&self) -> i32 {
        self.right - self.left
    }

    #[must_use]
    pub const fn height(&self) -> i32 {
        self.bottom - self.top
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.right <= self.left || self.bottom <= self.top
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_contains_is_inclusive() {
        let r = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert!(r.contains(10.0, 20.0));
        assert!(r.contains(30.0, 40.0));
        assert!(r.contains(15.0, 35.0));
        assert!(!r.contains(9.9, 25.0));
        assert!(!r.contains(15.0, 40.1));
    }

    #[test]
    fn rect_transform_scales_then_offsets() {
        let r = Rect::new(1.0, 2.0, 3.0, 4.0).transform(2.0, 10.0, -5.0);
        assert_eq!(r, Rect::new(12.0, -1.0, 16.0, 3.0));
    }

    #[test]
    fn quad_outline_order() {
        let q = Quad::from_rect(Rect::new(0.0, 0.0, 2.0, 1.0));
        let outline = q.outline();
        assert_eq!(outline[0], PointF::new(0.0, 0.0));
        assert_eq!(outline[1], PointF::new(0.0, 1.0));
        assert_eq!(outline[2], PointF::new(2.0, 1.0));
        assert_eq!(outline[3], PointF::new(2.0, 0.0));
    }

    #[test]
    fn rect_deserializes_from_array() {
        let r: Rect = serde_yaml::from_str("[1, 2, 3, 4]").unwrap();
        assert_eq!(r, Rect::new(1.0, 2.0, 3.0, 4.0));
    }
}
