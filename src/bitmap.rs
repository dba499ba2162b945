//! Rasterized page image
//!
//! A `PageBitmap` is handed to the page view by whoever rendered the page
//! and is owned by the view from then on. Replacing or clearing the page
//! drops the previous bitmap before the new one is installed.

use std::path::Path;

use image::{DynamicImage, RgbaImage};
use log::trace;

#[derive(Debug, thiserror::Error)]
pub enum BitmapError {
    #[error("pixel buffer holds {actual} bytes, {width}x{height} RGBA needs {expected}")]
    BufferSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("bitmap must not be empty ({width}x{height})")]
    Empty { width: u32, height: u32 },

    #[error("image: {0}")]
    Image(#[from] image::ImageError),
}

/// RGBA page image at the zoom it was rasterized with
pub struct PageBitmap {
    pixels: RgbaImage,
}

impl PageBitmap {
    /// Wrap a raw RGBA buffer (4 bytes per pixel, row-major)
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, BitmapError> {
        if width == 0 || height == 0 {
            return Err(BitmapError::Empty { width, height });
        }
        let expected = width as usize * height as usize * 4;
        let actual = pixels.len();
        let image = RgbaImage::from_raw(width, height, pixels).ok_or(BitmapError::BufferSize {
            width,
            height,
            expected,
            actual,
        })?;
        Ok(Self { pixels: image })
    }

    pub fn from_image(image: DynamicImage) -> Result<Self, BitmapError> {
        let pixels = image.to_rgba8();
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(BitmapError::Empty {
                width: pixels.width(),
                height: pixels.height(),
            });
        }
        Ok(Self { pixels })
    }

    /// Decode a page image from disk (PNG or JPEG)
    pub fn open(path: impl AsRef<Path>) -> Result<Self, BitmapError> {
        Self::from_image(image::open(path)?)
    }

    /// Solid color bitmap, mostly useful for tests and placeholders
    #[must_use]
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        Self {
            pixels: RgbaImage::from_pixel(width.max(1), height.max(1), image::Rgba(rgba)),
        }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    #[must_use]
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

impl std::fmt::Debug for PageBitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageBitmap")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish_non_exhaustive()
    }
}

impl Drop for PageBitmap {
    fn drop(&mut self) {
        trace!(
            "Releasing page bitmap {}x{}",
            self.pixels.width(),
            self.pixels.height()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rgba_checks_buffer_length() {
        let err = PageBitmap::from_rgba(2, 2, vec![0; 15]).unwrap_err();
        assert!(matches!(
            err,
            BitmapError::BufferSize {
                expected: 16,
                actual: 15,
                ..
            }
        ));
    }

    #[test]
    fn from_rgba_rejects_empty() {
        assert!(matches!(
            PageBitmap::from_rgba(0, 10, Vec::new()),
            Err(BitmapError::Empty { .. })
        ));
    }

    #[test]
    fn filled_reports_dimensions() {
        let bmp = PageBitmap::filled(30, 40, [1, 2, 3, 255]);
        assert_eq!((bmp.width(), bmp.height()), (30, 40));
        assert_eq!(bmp.pixels().get_pixel(5, 5).0, [1, 2, 3, 255]);
    }
}
