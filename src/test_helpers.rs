//! Shared test utilities for the zoomcrop test suite.
//!
//! Raster builders for the palette/encoder tests and small file fixtures for
//! the operation tests.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let raster = raster_from_fn(4, 4, |x, y| Rgba([x as u8, y as u8, 0, 255]));
//! let tmp = tempfile::TempDir::new().unwrap();
//! let path = write_png(tmp.path(), "source.png", 80, 60);
//! ```

use crate::imaging::PixelRaster;
use image::{Rgba, RgbaImage};
use std::path::{Path, PathBuf};

// =========================================================================
// Raster builders
// =========================================================================

/// Build a raster from a per-pixel function.
pub fn raster_from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> Rgba<u8>) -> PixelRaster {
    PixelRaster::from_image(RgbaImage::from_fn(width, height, f))
}

/// Opaque raster where every pixel has a distinct color (for sizes up to 64x64).
pub fn gradient_raster(width: u32, height: u32) -> PixelRaster {
    raster_from_fn(width, height, |x, y| {
        Rgba([(x * 4) as u8, (y * 4) as u8, ((x + y) * 2) as u8, 255])
    })
}

/// Four opaque quadrants with a fully transparent border column.
pub fn quadrant_raster(width: u32, height: u32) -> PixelRaster {
    raster_from_fn(width, height, |x, y| {
        if x == 0 {
            return Rgba([0, 0, 0, 0]);
        }
        match (x < width / 2, y < height / 2) {
            (true, true) => Rgba([255, 0, 0, 255]),
            (false, true) => Rgba([0, 255, 0, 255]),
            (true, false) => Rgba([0, 0, 255, 255]),
            (false, false) => Rgba([255, 255, 0, 255]),
        }
    })
}

// =========================================================================
// File fixtures
// =========================================================================

/// Write an opaque gradient PNG into `dir` and return its path.
pub fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x * 255 / width.max(1)) as u8, (y * 255 / height.max(1)) as u8, 64, 255])
    });
    img.save(&path).unwrap();
    path
}

/// Assert two rasters agree on RGB for opaque pixels and on binary transparency.
pub fn assert_same_binary_alpha(expected: &PixelRaster, actual: &PixelRaster) {
    assert_eq!(expected.dimensions(), actual.dimensions(), "dimensions mismatch");
    for (i, (e, a)) in expected.pixels().zip(actual.pixels()).enumerate() {
        let e_clear = e[3] == 0;
        let a_clear = a[3] == 0;
        assert_eq!(e_clear, a_clear, "transparency mismatch at pixel {i}: {e:?} vs {a:?}");
        if !e_clear {
            assert_eq!(
                (e[0], e[1], e[2]),
                (a[0], a[1], a[2]),
                "color mismatch at pixel {i}"
            );
        }
    }
}
