//! Software canvas rendering into an RGBA image

use std::num::NonZeroU32;
use std::path::Path as FsPath;

use fast_image_resize as fr;
use image::{Rgba, RgbaImage};
use log::warn;

use super::{Argb, Canvas, ColorMatrix, Paint, PaintStyle, Path};
use crate::bitmap::PageBitmap;
use crate::geometry::{IntRect, PointF, Rect};

#[derive(Debug, thiserror::Error)]
pub enum CanvasError {
    #[error("resize: {0}")]
    Resize(String),

    #[error("image: {0}")]
    Image(#[from] image::ImageError),
}

/// Canvas backed by an in-memory RGBA image
pub struct RasterCanvas {
    target: RgbaImage,
    origin: (f32, f32),
}

impl RasterCanvas {
    #[must_use]
    pub fn new(width: u32, height: u32, background: Argb) -> Self {
        let mut canvas = Self {
            target: RgbaImage::new(width.max(1), height.max(1)),
            origin: (0.0, 0.0),
        };
        canvas.clear(background);
        canvas
    }

    /// Fill with `color` and reset the translation
    pub fn clear(&mut self, color: Argb) {
        let px = Rgba([color.r, color.g, color.b, color.a]);
        for p in self.target.pixels_mut() {
            *p = px;
        }
        self.origin = (0.0, 0.0);
    }

    #[must_use]
    pub fn image(&self) -> &RgbaImage {
        &self.target
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.target.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.target.height()
    }

    pub fn save(&self, path: impl AsRef<FsPath>) -> Result<(), CanvasError> {
        self.target.save(path)?;
        Ok(())
    }

    fn blend(&mut self, x: i32, y: i32, src: [u8; 4]) {
        if x < 0 || y < 0 || x >= self.target.width() as i32 || y >= self.target.height() as i32 {
            return;
        }
        let dst = self.target.get_pixel_mut(x as u32, y as u32);
        let sa = u32::from(src[3]);
        if sa == 255 {
            dst.0 = src;
            return;
        }
        if sa == 0 {
            return;
        }
        let da = u32::from(dst.0[3]);
        let inv = 255 - sa;
        let out_a = sa + da * inv / 255;
        if out_a == 0 {
            dst.0 = [0, 0, 0, 0];
            return;
        }
        for c in 0..3 {
            let s = u32::from(src[c]) * sa;
            let d = u32::from(dst.0[c]) * da * inv / 255;
            dst.0[c] = ((s + d) / out_a).min(255) as u8;
        }
        dst.0[3] = out_a.min(255) as u8;
    }

    fn visible_rows(&self, top: f32, bottom: f32) -> std::ops::Range<i32> {
        let start = (top - 0.5).ceil().max(0.0) as i32;
        let end = ((bottom - 0.5).ceil() as i32).min(self.target.height() as i32);
        start..end.max(start)
    }

    fn fill_span(&mut self, y: i32, x_start: f32, x_end: f32, color: [u8; 4]) {
        let start = (x_start - 0.5).ceil().max(0.0) as i32;
        let end = ((x_end - 0.5).ceil() as i32).min(self.target.width() as i32);
        for x in start..end {
            self.blend(x, y, color);
        }
    }

    /// Even-odd scanline fill of every subpath, each implicitly closed
    fn fill_polygons(&mut self, polygons: &[Vec<PointF>], color: [u8; 4]) {
        let (mut top, mut bottom) = (f32::MAX, f32::MIN);
        for p in polygons.iter().flatten() {
            top = top.min(p.y);
            bottom = bottom.max(p.y);
        }
        if top > bottom {
            return;
        }

        let mut crossings = Vec::new();
        for y in self.visible_rows(top, bottom) {
            let yc = y as f32 + 0.5;
            crossings.clear();
            for poly in polygons {
                if poly.len() < 3 {
                    continue;
                }
                for (i, a) in poly.iter().enumerate() {
                    let b = poly[(i + 1) % poly.len()];
                    if (a.y <= yc && yc < b.y) || (b.y <= yc && yc < a.y) {
                        crossings.push(a.x + (yc - a.y) * (b.x - a.x) / (b.y - a.y));
                    }
                }
            }
            crossings.sort_by(f32::total_cmp);
            for pair in crossings.chunks_exact(2) {
                self.fill_span(y, pair[0], pair[1], color);
            }
        }
    }

    fn stroke_segment(&mut self, a: PointF, b: PointF, width: f32, color: [u8; 4]) {
        let half = (width / 2.0).max(0.5);
        let min_x = (a.x.min(b.x) - half).floor().max(0.0) as i32;
        let max_x = ((a.x.max(b.x) + half).ceil() as i32).min(self.target.width() as i32 - 1);
        let min_y = (a.y.min(b.y) - half).floor().max(0.0) as i32;
        let max_y = ((a.y.max(b.y) + half).ceil() as i32).min(self.target.height() as i32 - 1);

        let (dx, dy) = (b.x - a.x, b.y - a.y);
        let len_sq = dx * dx + dy * dy;
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let (px, py) = (x as f32 + 0.5, y as f32 + 0.5);
                let t = if len_sq == 0.0 {
                    0.0
                } else {
                    (((px - a.x) * dx + (py - a.y) * dy) / len_sq).clamp(0.0, 1.0)
                };
                let (cx, cy) = (a.x + t * dx, a.y + t * dy);
                let dist_sq = (px - cx) * (px - cx) + (py - cy) * (py - cy);
                if dist_sq <= half * half {
                    self.blend(x, y, color);
                }
            }
        }
    }

    fn translated(&self, p: PointF) -> PointF {
        PointF::new(p.x + self.origin.0, p.y + self.origin.1)
    }

    /// Downscale with a convolution filter
    fn resized(bitmap: &PageBitmap, width: u32, height: u32) -> Result<RgbaImage, CanvasError> {
        let src = bitmap.pixels();
        let nz = |v: u32| {
            NonZeroU32::new(v).ok_or_else(|| CanvasError::Resize(format!("zero size {v}")))
        };

        let src_view = fr::Image::from_vec_u8(
            nz(src.width())?,
            nz(src.height())?,
            src.as_raw().clone(),
            fr::PixelType::U8x4,
        )
        .map_err(|e| CanvasError::Resize(e.to_string()))?;
        let mut dst = fr::Image::new(nz(width)?, nz(height)?, fr::PixelType::U8x4);

        let mut resizer = fr::Resizer::new(fr::ResizeAlg::Convolution(fr::FilterType::Bilinear));
        resizer
            .resize(&src_view.view(), &mut dst.view_mut())
            .map_err(|e| CanvasError::Resize(e.to_string()))?;

        RgbaImage::from_raw(width, height, dst.into_vec())
            .ok_or_else(|| CanvasError::Resize("resized buffer has wrong length".to_string()))
    }
}

impl Canvas for RasterCanvas {
    fn translate(&mut self, dx: f32, dy: f32) {
        self.origin.0 += dx;
        self.origin.1 += dy;
    }

    fn draw_bitmap(&mut self, bitmap: &PageBitmap, dst: IntRect, filter: Option<&ColorMatrix>) {
        if dst.is_empty() {
            return;
        }
        let left = dst.left + self.origin.0.round() as i32;
        let top = dst.top + self.origin.1.round() as i32;
        let (w, h) = (dst.width() as u32, dst.height() as u32);

        // Shrinking gets a proper filter; enlarging samples nearest pixels so
        // only the visible part of a deep zoom is ever touched.
        let scaled = if w < bitmap.width() || h < bitmap.height() {
            match Self::resized(bitmap, w, h) {
                Ok(img) => Some(img),
                Err(e) => {
                    warn!("Falling back to nearest sampling: {e}");
                    None
                }
            }
        } else {
            None
        };

        let x_range = left.max(0)..(left + w as i32).min(self.target.width() as i32);
        let y_range = top.max(0)..(top + h as i32).min(self.target.height() as i32);
        let src = bitmap.pixels();
        for y in y_range {
            let dy = (y - top) as u32;
            for x in x_range.clone() {
                let dx = (x - left) as u32;
                let px = match &scaled {
                    Some(img) => img.get_pixel(dx, dy).0,
                    None => {
                        let sx = ((u64::from(dx) * u64::from(src.width())) / u64::from(w)) as u32;
                        let sy = ((u64::from(dy) * u64::from(src.height())) / u64::from(h)) as u32;
                        src.get_pixel(sx.min(src.width() - 1), sy.min(src.height() - 1)).0
                    }
                };
                let px = filter.map_or(px, |m| m.apply(px));
                self.blend(x, y, px);
            }
        }
    }

    fn draw_rect(&mut self, rect: Rect, paint: &Paint) {
        let color = [paint.color.r, paint.color.g, paint.color.b, paint.color.a];
        let r = rect.transform(1.0, self.origin.0, self.origin.1);
        match paint.style {
            PaintStyle::Fill => {
                for y in self.visible_rows(r.y0, r.y1) {
                    self.fill_span(y, r.x0, r.x1, color);
                }
            }
            PaintStyle::Stroke => {
                let corners = [
                    PointF::new(r.x0, r.y0),
                    PointF::new(r.x1, r.y0),
                    PointF::new(r.x1, r.y1),
                    PointF::new(r.x0, r.y1),
                ];
                for i in 0..4 {
                    self.stroke_segment(corners[i], corners[(i + 1) % 4], paint.stroke_width, color);
                }
            }
        }
    }

    fn draw_path(&mut self, path: &Path, paint: &Paint) {
        let color = [paint.color.r, paint.color.g, paint.color.b, paint.color.a];
        match paint.style {
            PaintStyle::Fill => {
                let polygons: Vec<Vec<PointF>> = path
                    .subpaths()
                    .iter()
                    .map(|sub| sub.points.iter().map(|p| self.translated(*p)).collect())
                    .collect();
                self.fill_polygons(&polygons, color);
            }
            PaintStyle::Stroke => {
                for sub in path.subpaths() {
                    let points: Vec<PointF> = sub.points.iter().map(|p| self.translated(*p)).collect();
                    for seg in points.windows(2) {
                        self.stroke_segment(seg[0], seg[1], paint.stroke_width, color);
                    }
                    if sub.closed && points.len() > 2 {
                        let (first, last) = (points[0], points[points.len() - 1]);
                        self.stroke_segment(last, first, paint.stroke_width, color);
                    }
                }
            }
        }
    }
}
