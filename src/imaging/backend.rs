//! Image backend trait and shared error type.
//!
//! The [`ImageBackend`] trait covers the pixel work around the pure
//! resolver: identify, decode, and resample. Encoding lives in
//! [`RasterEncoder`](super::encoder::RasterEncoder) because its palette
//! policy does not depend on the decoder in use.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate.

use super::params::ResizeResult;
use super::raster::PixelRaster;
use crate::types::Dimensions;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImagingError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),
    #[error("Image size {width}x{height} exceeds the maximum of {max_width}x{max_height}")]
    DimensionTooLarge {
        width: u32,
        height: u32,
        max_width: u32,
        max_height: u32,
    },
    #[error("Decoding failed: {0}")]
    DecodeFailure(String),
    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),
    #[error("Encoding failed: {0}")]
    Encode(String),
}

/// Trait for image processing backends.
pub trait ImageBackend: Sync {
    /// Get image dimensions without decoding pixels.
    fn identify(&self, path: &Path) -> Result<Dimensions, ImagingError>;

    /// Decode an image into an RGBA raster.
    fn decode(&self, path: &Path) -> Result<PixelRaster, ImagingError>;

    /// Draw the whole `source` at the placement described by `result` onto a
    /// transparent canvas of `result.canvas_*` size.
    fn resample(&self, source: &PixelRaster, result: &ResizeResult) -> PixelRaster;
}
