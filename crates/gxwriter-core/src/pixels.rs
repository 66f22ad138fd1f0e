//! Pixel buffers handed over by the preview renderer.

use image::{imageops::FilterType, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::error::{EncodeError, EncodeResult};

/// A width × height grid of 32-bit `0xAARRGGBB` samples, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl PixelBuffer {
    /// Wrap raw ARGB samples.
    ///
    /// # Errors
    /// Returns `EncodeError::BufferSize` if `pixels.len() != width * height`.
    pub fn new(width: u32, height: u32, pixels: Vec<u32>) -> EncodeResult<Self> {
        if pixels.len() != width as usize * height as usize {
            return Err(EncodeError::BufferSize {
                width,
                height,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// A buffer filled with a single ARGB color.
    pub fn filled(width: u32, height: u32, argb: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![argb; width as usize * height as usize],
        }
    }

    /// Build a buffer by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> u32) -> Self {
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Convert an RGBA image into ARGB samples.
    pub fn from_rgba_image(image: &RgbaImage) -> Self {
        let pixels = image
            .pixels()
            .map(|Rgba([r, g, b, a])| {
                (*a as u32) << 24 | (*r as u32) << 16 | (*g as u32) << 8 | *b as u32
            })
            .collect();
        Self {
            width: image.width(),
            height: image.height(),
            pixels,
        }
    }

    /// Convert back into an RGBA image.
    pub fn to_rgba_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            let argb = self.pixel(x, y);
            Rgba([
                (argb >> 16 & 0xFF) as u8,
                (argb >> 8 & 0xFF) as u8,
                (argb & 0xFF) as u8,
                (argb >> 24 & 0xFF) as u8,
            ])
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Sample at `(x, y)`. Panics when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> u32 {
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    /// Resample into a new buffer of the given size.
    ///
    /// Shrinking averages every source pixel covered by a target pixel, so
    /// thin lines fade instead of vanishing. Enlarging interpolates with a
    /// triangle filter.
    pub fn scaled(&self, width: u32, height: u32) -> Self {
        if width == self.width && height == self.height {
            return self.clone();
        }
        if width == 0 || height == 0 {
            return Self {
                width,
                height,
                pixels: Vec::new(),
            };
        }
        let source = self.to_rgba_image();
        let resized = if width <= self.width && height <= self.height {
            image::imageops::thumbnail(&source, width, height)
        } else {
            image::imageops::resize(&source, width, height, FilterType::Triangle)
        };
        Self::from_rgba_image(&resized)
    }
}

/// Rectangular region `[start_x, end_x) × [start_y, end_y)` of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub start_x: u32,
    pub start_y: u32,
    pub end_x: u32,
    pub end_y: u32,
}

impl Window {
    pub fn new(start_x: u32, start_y: u32, end_x: u32, end_y: u32) -> Self {
        Self {
            start_x,
            start_y,
            end_x,
            end_y,
        }
    }

    /// Window covering a whole `width × height` buffer.
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Width of the window, zero if inverted.
    pub fn width(&self) -> u32 {
        self.end_x.saturating_sub(self.start_x)
    }

    /// Height of the window, zero if inverted.
    pub fn height(&self) -> u32 {
        self.end_y.saturating_sub(self.start_y)
    }

    /// Clip the end coordinates to the buffer bounds.
    pub fn clamped(&self, width: u32, height: u32) -> Self {
        Self {
            end_x: self.end_x.min(width),
            end_y: self.end_y.min(height),
            ..*self
        }
    }

    /// Scale every coordinate by `factor`, rounding to the nearest integer.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            start_x: scale_dimension(self.start_x, factor),
            start_y: scale_dimension(self.start_y, factor),
            end_x: scale_dimension(self.end_x, factor),
            end_y: scale_dimension(self.end_y, factor),
        }
    }
}

impl Default for Window {
    fn default() -> Self {
        Self::full(60, 60)
    }
}

pub(crate) fn scale_dimension(value: u32, factor: f64) -> u32 {
    (value as f64 * factor).round() as u32
}
