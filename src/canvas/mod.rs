//! Drawing surface abstraction
//!
//! The page view issues a handful of drawing commands per frame: one bitmap
//! blit, translucent rectangles for links, translucent quads for search
//! hits, and a stroked path for the error mark. Any backend able to do
//! those four things can host the view.

mod raster;

pub use raster::{CanvasError, RasterCanvas};

use serde::{Deserialize, Serialize};

use crate::bitmap::PageBitmap;
use crate::geometry::{IntRect, PointF, Rect};

pub trait Canvas {
    /// Move the origin for all subsequent commands
    fn translate(&mut self, dx: f32, dy: f32);
    /// Blit the whole bitmap scaled into `dst`, optionally through a color
    /// filter
    fn draw_bitmap(&mut self, bitmap: &PageBitmap, dst: IntRect, filter: Option<&ColorMatrix>);
    fn draw_rect(&mut self, rect: Rect, paint: &Paint);
    fn draw_path(&mut self, path: &Path, paint: &Paint);
}

/// 8-bit ARGB color
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Argb {
    pub a: u8,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Argb {
    #[must_use]
    pub const fn new(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self { a, r, g, b }
    }

    /// Parse `#AARRGGBB` or `#RRGGBB` (opaque)
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.is_ascii() {
            return None;
        }
        let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        match hex.len() {
            8 => Some(Self::new(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            6 => Some(Self::new(0xff, byte(0)?, byte(2)?, byte(4)?)),
            _ => None,
        }
    }

    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}{:02x}", self.a, self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Argb {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value).ok_or_else(|| format!("invalid color '{value}', expected #AARRGGBB"))
    }
}

impl From<Argb> for String {
    fn from(c: Argb) -> Self {
        c.to_hex()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PaintStyle {
    #[default]
    Fill,
    Stroke,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Paint {
    pub color: Argb,
    pub style: PaintStyle,
    pub stroke_width: f32,
}

impl Paint {
    #[must_use]
    pub const fn fill(color: Argb) -> Self {
        Self {
            color,
            style: PaintStyle::Fill,
            stroke_width: 0.0,
        }
    }

    #[must_use]
    pub const fn stroke(color: Argb, width: f32) -> Self {
        Self {
            color,
            style: PaintStyle::Stroke,
            stroke_width: width,
        }
    }
}

/// Sequence of polylines. Each `move_to` starts a new subpath.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path {
    subpaths: Vec<SubPath>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SubPath {
    pub points: Vec<PointF>,
    pub closed: bool,
}

impl Path {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(&mut self, x: f32, y: f32) {
        self.subpaths.push(SubPath {
            points: vec![PointF::new(x, y)],
            closed: false,
        });
    }

    /// Starts a subpath at the origin when nothing was moved to yet
    pub fn line_to(&mut self, x: f32, y: f32) {
        if self.subpaths.is_empty() {
            self.move_to(0.0, 0.0);
        }
        if let Some(sub) = self.subpaths.last_mut() {
            sub.points.push(PointF::new(x, y));
        }
    }

    pub fn close(&mut self) {
        if let Some(sub) = self.subpaths.last_mut() {
            sub.closed = true;
        }
    }

    /// Drop all segments, keeping the allocation
    pub fn rewind(&mut self) {
        self.subpaths.clear();
    }

    #[must_use]
    pub fn subpaths(&self) -> &[SubPath] {
        &self.subpaths
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subpaths.is_empty()
    }
}

/// 4x5 color transform, rows R, G, B, A; columns R, G, B, A, offset
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorMatrix(pub [f32; 20]);

impl ColorMatrix {
    #[must_use]
    pub const fn identity() -> Self {
        Self([
            1.0, 0.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 0.0, 1.0, 0.0,
        ])
    }

    /// `out = 255 - in` for R, G and B; alpha untouched
    #[must_use]
    pub const fn invert() -> Self {
        Self([
            -1.0, 0.0, 0.0, 0.0, 255.0, //
            0.0, -1.0, 0.0, 0.0, 255.0, //
            0.0, 0.0, -1.0, 0.0, 255.0, //
            0.0, 0.0, 0.0, 1.0, 0.0,
        ])
    }

    #[must_use]
    pub fn apply(&self, rgba: [u8; 4]) -> [u8; 4] {
        let m = &self.0;
        let input = rgba.map(f32::from);
        let mut out = [0u8; 4];
        for (row, value) in out.iter_mut().enumerate() {
            let base = row * 5;
            let v = m[base] * input[0]
                + m[base + 1] * input[1]
                + m[base + 2] * input[2]
                + m[base + 3] * input[3]
                + m[base + 4];
            *value = v.round().clamp(0.0, 255.0) as u8;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invert_flips_rgb_keeps_alpha() {
        let m = ColorMatrix::invert();
        assert_eq!(m.apply([0, 128, 255, 77]), [255, 127, 0, 77]);
        assert_eq!(m.apply([10, 20, 30, 255]), [245, 235, 225, 255]);
    }

    #[test]
    fn identity_is_noop() {
        assert_eq!(ColorMatrix::identity().apply([1, 2, 3, 4]), [1, 2, 3, 4]);
    }

    #[test]
    fn argb_hex_round_trip() {
        let c = Argb::from_hex("#200000ff").unwrap();
        assert_eq!(c, Argb::new(0x20, 0, 0, 0xff));
        assert_eq!(c.to_hex(), "#200000ff");
        assert_eq!(Argb::from_hex("ff5050"), Some(Argb::new(255, 255, 80, 80)));
        assert_eq!(Argb::from_hex("#12345"), None);
        assert_eq!(Argb::from_hex("#zz000000"), None);
    }

    #[test]
    fn path_subpaths() {
        let mut p = Path::new();
        p.move_to(-100.0, -100.0);
        p.line_to(100.0, 100.0);
        p.move_to(100.0, -100.0);
        p.line_to(-100.0, 100.0);
        assert_eq!(p.subpaths().len(), 2);
        assert!(p.subpaths().iter().all(|s| s.points.len() == 2 && !s.closed));

        p.rewind();
        assert!(p.is_empty());
        p.line_to(5.0, 5.0);
        p.close();
        assert_eq!(p.subpaths()[0].points, vec![PointF::new(0.0, 0.0), PointF::new(5.0, 5.0)]);
        assert!(p.subpaths()[0].closed);
    }
}
