//! Image processing: geometry, resampling and encoding.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **Resolve** | [`resolve`], pure `f64` geometry |
//! | **Resample** | `crop_imm` + Lanczos3 `resize` onto a transparent canvas |
//! | **Encode** | `gif` / `png` (indexed), `image` (JPEG, RGBA PNG), `color_quant` |
//!
//! The module is split into:
//! - **Parameters**: Data structures describing a resize request and its result
//! - **Calculations**: The important-part / zoom resolver (unit testable)
//! - **Raster / Palette**: RGBA pixel buffers and palette reduction
//! - **Encoder**: [`RasterEncoder`], format policy per output type
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: [`resize_image`], the cached file-level pipeline

pub mod backend;
mod calculations;
pub mod encoder;
pub mod operations;
pub mod palette;
mod params;
pub mod raster;
pub mod rust_backend;

pub use backend::{ImageBackend, ImagingError};
pub use calculations::{resolve, visible_source_rect};
pub use encoder::RasterEncoder;
pub use operations::{
    ResizeInterceptor, ResizeJob, ResizeOutcome, check_limits, get_dimensions, resize_image,
};
pub use params::{
    HAlign, ImportantPart, OutputFormat, ParseModeError, Quality, ResizeMode, ResizeRequest,
    ResizeResult, VAlign, Zoom,
};
pub use raster::PixelRaster;
pub use rust_backend::{RustBackend, supported_input_extensions};
