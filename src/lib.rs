//! # zoomcrop
//!
//! Important-part aware image resizing. A request names a target size, a
//! resize mode, a rectangle of the source that must stay visible, and a zoom
//! factor deciding how tightly the output frames that rectangle.
//!
//! # Architecture: Resolve, Resample, Encode
//!
//! ```text
//! 1. Resolve   ResizeRequest  →  ResizeResult   (pure geometry, no pixels)
//! 2. Resample  source raster  →  canvas raster  (whole source drawn at the placement)
//! 3. Encode    canvas raster  →  GIF / JPEG / PNG bytes
//! ```
//!
//! The resolver is a pure function, so every geometric property can be unit
//! tested without touching the filesystem or decoding an image.
//! [`imaging::resize_image`] wraps the three steps with the file-level policy:
//! extension whitelist, no-op shortcut, cache lookup, interceptor, size limits.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`types`] | Shared geometry primitives (`Dimensions`, `Rect`) |
//! | [`imaging`] | Resolver, raster, palette reduction, encoder, backend, high-level operation |
//! | [`cache`] | SHA-256 cache keys, sharded cache paths, freshness checks |
//! | [`config`] | `zoomcrop.toml` loading, validation, and merging |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Whole-source placement
//!
//! The resolver never returns a crop rectangle. It returns where the *entire*
//! source lands on the canvas, possibly at negative offsets and larger than
//! the canvas. Cropping, letterboxing and zooming are all the same operation:
//! draw the source at that placement and keep whatever falls on the canvas.
//!
//! ## Lossless palettes when possible
//!
//! PNG output stays indexed whenever the resized image has at most 256
//! colors and no semitransparent pixels, so small graphics do not grow into
//! true color files. GIF is always indexed; colors beyond 256 are quantized
//! with NeuQuant.

pub mod cache;
pub mod config;
pub mod imaging;
pub mod output;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
