//! In-memory true-color raster handed from the resampler to the encoder.
//!
//! Pixels are stored as 8-bit RGBA, but transparency decisions use a 7-bit
//! alpha where `0` is opaque and `127` fully transparent:
//! `alpha7 = 127 - (a8 >> 1)`. With that mapping, `a8 >= 254` counts as
//! opaque and `a8 <= 1` as fully transparent; everything in between is
//! semitransparent.

use crate::types::Dimensions;
use image::{Rgba, RgbaImage};

/// Fully transparent in the 7-bit alpha convention.
pub const ALPHA_TRANSPARENT: u8 = 127;

/// Opacity class of a single pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opacity {
    Opaque,
    Transparent,
    Partial,
}

impl Opacity {
    pub fn of(pixel: Rgba<u8>) -> Self {
        match alpha7(pixel[3]) {
            0 => Self::Opaque,
            ALPHA_TRANSPARENT => Self::Transparent,
            _ => Self::Partial,
        }
    }
}

/// Convert 8-bit alpha (255 = opaque) to 7-bit alpha (0 = opaque).
pub fn alpha7(a8: u8) -> u8 {
    ALPHA_TRANSPARENT - (a8 >> 1)
}

/// Owned RGBA buffer for one resize operation.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelRaster {
    image: RgbaImage,
}

impl PixelRaster {
    /// A fully transparent raster.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0])),
        }
    }

    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.image.width(), self.image.height())
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Pixels in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = Rgba<u8>> + '_ {
        self.image.pixels().copied()
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn as_image_mut(&mut self) -> &mut RgbaImage {
        &mut self.image
    }
}
