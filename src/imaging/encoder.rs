//! Serialize rasters to GIF, JPEG or PNG.
//!
//! | Format | Output |
//! |---|---|
//! | PNG | Indexed + `tRNS` when [`is_palette_safe`], RGBA true color otherwise |
//! | GIF | Always indexed (GIF89a, one transparent index); partial alpha is dropped |
//! | JPEG | Baseline RGB at the configured quality; alpha is discarded |
//!
//! GIF *encoding* is a compile-time capability (`gif` cargo feature); GIF
//! decoding is always available. Without the encoder, GIF requests are
//! written as PNG instead, see [`RasterEncoder::effective_format`].

use super::backend::ImagingError;
use super::palette::{PaletteImage, is_palette_safe, to_palette};
use super::params::{OutputFormat, Quality};
use super::raster::PixelRaster;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbImage};
use tracing::{debug, warn};

/// Stateless encoder; holds only encoding parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterEncoder {
    quality: Quality,
}

impl RasterEncoder {
    pub fn new(quality: Quality) -> Self {
        Self { quality }
    }

    /// Whether `format` can be written by this build.
    pub fn supports(&self, format: OutputFormat) -> bool {
        match format {
            OutputFormat::Gif => cfg!(feature = "gif"),
            OutputFormat::Jpeg | OutputFormat::Png => true,
        }
    }

    /// Format actually produced for a requested format.
    pub fn effective_format(&self, requested: OutputFormat) -> OutputFormat {
        if self.supports(requested) {
            requested
        } else {
            OutputFormat::Png
        }
    }

    pub fn encode(
        &self,
        raster: &PixelRaster,
        format: OutputFormat,
    ) -> Result<Vec<u8>, ImagingError> {
        let effective = self.effective_format(format);
        if effective != format {
            warn!(?format, ?effective, "encoder not available, falling back");
        }

        match effective {
            OutputFormat::Gif => encode_gif(raster),
            OutputFormat::Jpeg => encode_jpeg(raster, self.quality),
            OutputFormat::Png => {
                if is_palette_safe(raster) {
                    debug!("writing indexed PNG");
                    encode_indexed_png(&to_palette(raster))
                } else {
                    debug!("writing true color PNG");
                    encode_rgba_png(raster)
                }
            }
        }
    }
}

#[cfg(feature = "gif")]
fn encode_gif(raster: &PixelRaster) -> Result<Vec<u8>, ImagingError> {
    use std::borrow::Cow;

    let too_large = || ImagingError::DimensionTooLarge {
        width: raster.width(),
        height: raster.height(),
        max_width: u32::from(u16::MAX),
        max_height: u32::from(u16::MAX),
    };
    let width = u16::try_from(raster.width()).map_err(|_| too_large())?;
    let height = u16::try_from(raster.height()).map_err(|_| too_large())?;

    if super::palette::is_semitransparent(raster) {
        debug!("GIF has no partial alpha, semitransparent pixels become opaque");
    }
    let indexed = to_palette(raster);

    let mut out = Vec::new();
    {
        let mut encoder = gif::Encoder::new(&mut out, width, height, &indexed.palette_bytes())
            .map_err(|e| ImagingError::Encode(format!("GIF: {e}")))?;
        let frame = gif::Frame {
            width,
            height,
            buffer: Cow::Borrowed(&indexed.indices),
            transparent: indexed.transparent,
            ..gif::Frame::default()
        };
        encoder
            .write_frame(&frame)
            .map_err(|e| ImagingError::Encode(format!("GIF: {e}")))?;
        // Trailer is written when the encoder drops
    }
    Ok(out)
}

#[cfg(not(feature = "gif"))]
fn encode_gif(_raster: &PixelRaster) -> Result<Vec<u8>, ImagingError> {
    Err(ImagingError::UnsupportedFormat("gif".to_string()))
}

fn encode_jpeg(raster: &PixelRaster, quality: Quality) -> Result<Vec<u8>, ImagingError> {
    let source = raster.as_image();
    let rgb = RgbImage::from_fn(raster.width(), raster.height(), |x, y| {
        let p = source.get_pixel(x, y);
        image::Rgb([p[0], p[1], p[2]])
    });

    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality.value())
        .write_image(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
        .map_err(|e| ImagingError::Encode(format!("JPEG: {e}")))?;
    Ok(out)
}

fn encode_rgba_png(raster: &PixelRaster) -> Result<Vec<u8>, ImagingError> {
    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(
            raster.as_image().as_raw(),
            raster.width(),
            raster.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| ImagingError::Encode(format!("PNG: {e}")))?;
    Ok(out)
}

fn encode_indexed_png(indexed: &PaletteImage) -> Result<Vec<u8>, ImagingError> {
    let png_err = |e: png::EncodingError| ImagingError::Encode(format!("PNG: {e}"));

    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, indexed.width, indexed.height);
        encoder.set_color(png::ColorType::Indexed);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_palette(indexed.palette_bytes());
        if let Some(index) = indexed.transparent {
            // tRNS only needs entries up to the transparent index
            let mut trns = vec![255u8; usize::from(index) + 1];
            trns[usize::from(index)] = 0;
            encoder.set_trns(trns);
        }
        let mut writer = encoder.write_header().map_err(png_err)?;
        writer.write_image_data(&indexed.indices).map_err(png_err)?;
        writer.finish().map_err(png_err)?;
    }
    Ok(out)
}
