//! Palette analysis and conversion for true-color rasters.
//!
//! | Step | Function |
//! |---|---|
//! | Bounded color census | [`count_colors`] |
//! | Semitransparency scan | [`is_semitransparent`] |
//! | True color → palette | [`to_palette`] (exact ≤ 256, NeuQuant otherwise) |
//!
//! Palette images carry at most one transparent index. All fully transparent
//! pixels collapse onto it, so RGB values hidden under zero alpha are lost.
//! Semitransparent pixels are treated as opaque here; callers that need
//! partial alpha keep the raster in true color instead.

use super::raster::{Opacity, PixelRaster, alpha7};
use color_quant::NeuQuant;
use image::Rgba;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Largest palette a GIF or indexed PNG can hold.
pub const MAX_PALETTE_COLORS: usize = 256;

/// NeuQuant sampling factor (1 = best, 30 = fastest).
const QUANT_SAMPLE_FACTOR: i32 = 10;

/// Census key shared by every fully transparent pixel.
const TRANSPARENT_KEY: u32 = u32::MAX;

/// Indexed raster ready for GIF or indexed PNG encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteImage {
    pub width: u32,
    pub height: u32,
    pub palette: Vec<[u8; 3]>,
    /// One palette index per pixel, row-major.
    pub indices: Vec<u8>,
    pub transparent: Option<u8>,
}

impl PaletteImage {
    /// Palette flattened to `r, g, b, r, g, b, …` as codecs expect it.
    pub fn palette_bytes(&self) -> Vec<u8> {
        self.palette.iter().flatten().copied().collect()
    }
}

fn census_key(pixel: Rgba<u8>) -> u32 {
    let [r, g, b, a] = pixel.0;
    match Opacity::of(pixel) {
        Opacity::Transparent => TRANSPARENT_KEY,
        _ => u32::from(alpha7(a)) << 24 | u32::from(r) << 16 | u32::from(g) << 8 | u32::from(b),
    }
}

/// Count distinct colors, stopping as soon as more than `max` were seen.
///
/// Colors differ by RGB and 7-bit alpha; all fully transparent pixels count
/// as a single color. The result is therefore exact up to `max` and
/// `max + 1` means "more than `max`".
pub fn count_colors(raster: &PixelRaster, max: usize) -> usize {
    let mut seen = HashSet::new();
    for pixel in raster.pixels() {
        seen.insert(census_key(pixel));
        if seen.len() > max {
            break;
        }
    }
    seen.len()
}

/// Whether any pixel is neither opaque nor fully transparent.
pub fn is_semitransparent(raster: &PixelRaster) -> bool {
    raster
        .pixels()
        .any(|pixel| Opacity::of(pixel) == Opacity::Partial)
}

/// Whether the raster fits a palette without losing colors or alpha.
pub fn is_palette_safe(raster: &PixelRaster) -> bool {
    count_colors(raster, MAX_PALETTE_COLORS) <= MAX_PALETTE_COLORS && !is_semitransparent(raster)
}

/// Convert to a palette image, exactly when the census allows it and by
/// quantization to 255 colors otherwise.
pub fn to_palette(raster: &PixelRaster) -> PaletteImage {
    let colors = count_colors(raster, MAX_PALETTE_COLORS);
    if colors <= MAX_PALETTE_COLORS {
        debug!(colors, "exact palette conversion");
        exact_palette(raster)
    } else {
        debug!("more than {MAX_PALETTE_COLORS} colors, quantizing");
        quantized_palette(raster)
    }
}

fn has_transparency(raster: &PixelRaster) -> bool {
    raster
        .pixels()
        .any(|pixel| Opacity::of(pixel) == Opacity::Transparent)
}

/// Palette of observed colors in first-seen order plus one transparent slot.
///
/// Pixels are visited row-major (`y` outer, `x` inner), the order of
/// [`PixelRaster::pixels`], so palette indices follow that scan. The slot for
/// fully transparent pixels always comes last.
fn exact_palette(raster: &PixelRaster) -> PaletteImage {
    let mut palette: Vec<[u8; 3]> = Vec::new();
    let mut lookup: HashMap<[u8; 3], u8> = HashMap::new();
    let mut any_transparent = false;

    for pixel in raster.pixels() {
        if Opacity::of(pixel) == Opacity::Transparent {
            any_transparent = true;
            continue;
        }
        let rgb = [pixel[0], pixel[1], pixel[2]];
        lookup.entry(rgb).or_insert_with(|| {
            palette.push(rgb);
            (palette.len() - 1) as u8
        });
    }

    let transparent = any_transparent.then(|| {
        palette.push([0, 0, 0]);
        (palette.len() - 1) as u8
    });

    let indices = raster
        .pixels()
        .map(|pixel| match (Opacity::of(pixel), transparent) {
            (Opacity::Transparent, Some(index)) => index,
            _ => lookup[&[pixel[0], pixel[1], pixel[2]]],
        })
        .collect();

    PaletteImage {
        width: raster.width(),
        height: raster.height(),
        palette,
        indices,
        transparent,
    }
}

/// NeuQuant reduction to 255 colors; index 255 is reserved for transparency.
fn quantized_palette(raster: &PixelRaster) -> PaletteImage {
    let samples: Vec<u8> = raster
        .pixels()
        .filter(|&pixel| Opacity::of(pixel) != Opacity::Transparent)
        .flat_map(|pixel| [pixel[0], pixel[1], pixel[2], 255])
        .collect();

    let quant = NeuQuant::new(QUANT_SAMPLE_FACTOR, MAX_PALETTE_COLORS - 1, &samples);
    let mut palette: Vec<[u8; 3]> = quant
        .color_map_rgb()
        .chunks_exact(3)
        .map(|c| [c[0], c[1], c[2]])
        .collect();

    let transparent = has_transparency(raster).then(|| {
        palette.push([0, 0, 0]);
        (palette.len() - 1) as u8
    });

    let indices = raster
        .pixels()
        .map(|pixel| match (Opacity::of(pixel), transparent) {
            (Opacity::Transparent, Some(index)) => index,
            _ => quant.index_of(&[pixel[0], pixel[1], pixel[2], 255]) as u8,
        })
        .collect();

    PaletteImage {
        width: raster.width(),
        height: raster.height(),
        palette,
        indices,
        transparent,
    }
}
