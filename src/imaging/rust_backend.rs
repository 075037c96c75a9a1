//! Pure Rust image backend built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::image_dimensions` (header only) |
//! | Decode (GIF, JPEG, PNG) | `image::ImageReader` → RGBA8 |
//! | Resample | `crop_imm` + `imageops::resize` (`Lanczos3`) + `imageops::replace` |
//!
//! Resampling draws the *whole* source at the resolved placement. Only the
//! part of the placement that overlaps the canvas is resized, so heavy zoom
//! never materializes the full scaled source.

use super::backend::{ImageBackend, ImagingError};
use super::params::ResizeResult;
use super::raster::PixelRaster;
use crate::types::Dimensions;
use image::imageops::{self, FilterType};
use image::{ImageFormat, ImageReader};
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

/// Extensions the core accepts, paired with the decoder they need.
const CANDIDATES: &[(&str, ImageFormat)] = &[
    ("gif", ImageFormat::Gif),
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the set of image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Lowercased extension of `path` if it is a supported input, otherwise
/// [`ImagingError::UnsupportedFormat`].
pub fn check_extension(path: &Path) -> Result<String, ImagingError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if supported_input_extensions().contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(ImagingError::UnsupportedFormat(format!(
            "{} (extension {:?})",
            path.display(),
            ext
        )))
    }
}

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Clipped overlap of the placed source with the canvas, in canvas pixels.
fn visible_span(offset: i64, extent: u32, canvas: u32) -> Option<(i64, i64)> {
    let start = offset.max(0);
    let end = (offset + i64::from(extent)).min(i64::from(canvas));
    (end > start).then_some((start, end))
}

/// Map a canvas span back to whole source pixels.
fn source_span(
    (start, end): (i64, i64),
    offset: i64,
    extent: u32,
    source: u32,
) -> (u32, u32) {
    let scale = f64::from(source) / f64::from(extent);
    let from = ((start - offset) as f64 * scale).round() as i64;
    let to = ((end - offset) as f64 * scale).round() as i64;
    let from = from.clamp(0, i64::from(source) - 1);
    let to = to.clamp(from + 1, i64::from(source));
    (from as u32, (to - from) as u32)
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, ImagingError> {
        check_extension(path)?;
        let (width, height) = image::image_dimensions(path).map_err(|e| {
            ImagingError::DecodeFailure(format!("Failed to read dimensions of {}: {e}", path.display()))
        })?;
        Ok(Dimensions::new(width, height))
    }

    fn decode(&self, path: &Path) -> Result<PixelRaster, ImagingError> {
        check_extension(path)?;
        let img = ImageReader::open(path)?.decode().map_err(|e| {
            ImagingError::DecodeFailure(format!("Failed to decode {}: {e}", path.display()))
        })?;
        Ok(PixelRaster::from_image(img.to_rgba8()))
    }

    fn resample(&self, source: &PixelRaster, result: &ResizeResult) -> PixelRaster {
        let mut canvas = PixelRaster::transparent(result.canvas_width, result.canvas_height);
        if result.sample_width == 0 || result.sample_height == 0 {
            return canvas;
        }

        let Some(dx) = visible_span(result.sample_x, result.sample_width, result.canvas_width)
        else {
            return canvas;
        };
        let Some(dy) = visible_span(result.sample_y, result.sample_height, result.canvas_height)
        else {
            return canvas;
        };

        let (sx, sw) = source_span(dx, result.sample_x, result.sample_width, source.width());
        let (sy, sh) = source_span(dy, result.sample_y, result.sample_height, source.height());
        let (dw, dh) = ((dx.1 - dx.0) as u32, (dy.1 - dy.0) as u32);

        debug!(sx, sy, sw, sh, dx = dx.0, dy = dy.0, dw, dh, "resampling");

        let region = imageops::crop_imm(source.as_image(), sx, sy, sw, sh).to_image();
        let scaled = if (sw, sh) == (dw, dh) {
            region
        } else {
            imageops::resize(&region, dw, dh, FilterType::Lanczos3)
        };
        imageops::replace(canvas.as_image_mut(), &scaled, dx.0, dy.0);
        canvas
    }
}
