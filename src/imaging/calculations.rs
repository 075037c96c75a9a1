//! Pure geometry for resize requests.
//!
//! [`resolve`] turns a [`ResizeRequest`] into a [`ResizeResult`]: the canvas
//! size plus the placement of the *whole* source image on that canvas. A
//! single "draw source into rectangle" resample then realizes any crop and
//! zoom combination.
//!
//! The crop path blends two candidate rectangles over the source:
//!
//! ```text
//! leastZoomed  largest target-aspect rectangle inside the source,
//!              positioned towards the important part        (zoom = 0)
//! mostZoomed   smallest target-aspect rectangle containing
//!              the important part                           (zoom = 1)
//! ```
//!
//! `mostZoomed` falls back to `leastZoomed` when it would be wider, and that
//! fallback happens before the blend. Changing the order changes results for
//! important parts close to the source size.
//!
//! All functions here are pure and testable without any I/O or images.

use super::params::{HAlign, ImportantPart, ResizeMode, ResizeRequest, ResizeResult, VAlign};
use crate::types::{Dimensions, Rect};

/// Which target dimensions remain fixed after mode-specific inference.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Target {
    Both(f64, f64),
    Width(f64),
    Height(f64),
}

/// Compute canvas size and source placement for a resize.
///
/// Never fails for requests that pass [`ResizeRequest::validate`].
///
/// # Examples
/// ```
/// # use zoomcrop::imaging::{resolve, ResizeRequest, ResizeMode};
/// # use zoomcrop::types::Dimensions;
/// let request = ResizeRequest::new(Dimensions::new(800, 600))
///     .with_target(Some(400), Some(400))
///     .with_mode(ResizeMode::Crop);
/// let result = resolve(&request);
/// assert_eq!((result.canvas_width, result.canvas_height), (400, 400));
/// // Centered: a 600x600 window of the source fills the canvas
/// assert_eq!(result.sample_x, -67);
/// assert_eq!(result.sample_width, 533);
/// ```
pub fn resolve(request: &ResizeRequest) -> ResizeResult {
    let source = Rect::full(request.source);

    let (important, zoom) = match request.mode {
        ResizeMode::LegacyAlignment(h, v) => (legacy_important_part(request.source, h, v), 0.0),
        _ => (
            request.effective_important_part().to_rect(),
            request.zoom.factor(),
        ),
    };

    let zoomed = zoom_important_part(source, important, zoom);
    let target = infer_target(request, zoomed);

    let (canvas_w, canvas_h, placement) = match target {
        Target::Both(w, h) => {
            let least = least_zoomed(source, important, w, h);
            let mut most = most_zoomed(source, important, w, h);
            if most.width > least.width {
                most = least;
            }
            let visible = least.lerp(most, zoom);
            (w, h, place_source(source, visible, w, h))
        }
        Target::Width(w) => {
            let h = (zoomed.height * w / zoomed.width).max(1.0);
            (w, h, place_source(source, zoomed, w, h))
        }
        Target::Height(h) => {
            let w = (zoomed.width * h / zoomed.height).max(1.0);
            (w, h, place_source(source, zoomed, w, h))
        }
    };

    ResizeResult {
        canvas_width: canvas_w.round().max(1.0) as u32,
        canvas_height: canvas_h.round().max(1.0) as u32,
        sample_x: placement.x.round() as i64,
        sample_y: placement.y.round() as i64,
        sample_width: placement.width.round().max(0.0) as u32,
        sample_height: placement.height.round().max(0.0) as u32,
    }
}

/// Rewrite a legacy alignment into a 1px-wide/high important part at the
/// requested edge. Centered axes keep the full source extent.
fn legacy_important_part(source: Dimensions, h: HAlign, v: VAlign) -> Rect {
    let mut part = ImportantPart::full(source);
    match h {
        HAlign::Left => part.width = 1,
        HAlign::Right => {
            part.x = source.width.saturating_sub(1);
            part.width = 1;
        }
        HAlign::Center => {}
    }
    match v {
        VAlign::Top => part.height = 1,
        VAlign::Bottom => {
            part.y = source.height.saturating_sub(1);
            part.height = 1;
        }
        VAlign::Center => {}
    }
    part.to_rect()
}

/// Blend between the full source (zoom 0) and the important part (zoom 1).
fn zoom_important_part(source: Rect, important: Rect, zoom: f64) -> Rect {
    Rect {
        x: important.x * zoom,
        y: important.y * zoom,
        width: source.width
            - (source.width - important.width - important.x) * zoom
            - important.x * zoom,
        height: source.height
            - (source.height - important.height - important.y) * zoom
            - important.y * zoom,
    }
}

fn infer_target(request: &ResizeRequest, zoomed: Rect) -> Target {
    let (w, h) = match (request.width(), request.height()) {
        (None, None) => return Target::Width(zoomed.width),
        (Some(w), None) => return Target::Width(f64::from(w)),
        (None, Some(h)) => return Target::Height(f64::from(h)),
        (Some(w), Some(h)) => (f64::from(w), f64::from(h)),
    };

    match request.mode {
        ResizeMode::Proportional => {
            if zoomed.width >= zoomed.height {
                Target::Width(w)
            } else {
                Target::Height(h)
            }
        }
        ResizeMode::Box => {
            if zoomed.height * w / zoomed.width <= h {
                Target::Width(w)
            } else {
                Target::Height(h)
            }
        }
        ResizeMode::Crop | ResizeMode::LegacyAlignment(..) => Target::Both(w, h),
    }
}

/// Largest `w:h` rectangle inside the source, pushed towards the important
/// part proportionally to where the part sits within the source.
fn least_zoomed(source: Rect, important: Rect, w: f64, h: f64) -> Rect {
    let mut rect = source;

    if source.height * w / source.width <= h {
        rect.width = source.height * w / h;
        rect.x = if rect.width > important.width {
            (source.width - rect.width) * important.x / (source.width - important.width)
        } else {
            important.x + (important.width - rect.width) / 2.0
        };
    } else {
        rect.height = source.width * h / w;
        rect.y = if rect.height > important.height {
            (source.height - rect.height) * important.y / (source.height - important.height)
        } else {
            important.y + (important.height - rect.height) / 2.0
        };
    }

    rect
}

/// Smallest `w:h` rectangle containing the important part, grown away from
/// the nearer source edge.
fn most_zoomed(source: Rect, important: Rect, w: f64, h: f64) -> Rect {
    let mut rect = important;

    if important.height * w / important.width <= h {
        rect.height = h * important.width / w;
        if source.height > important.height {
            rect.y -= (rect.height - important.height) * important.y
                / (source.height - important.height);
        }
    } else {
        rect.width = w * important.height / h;
        if source.width > important.width {
            rect.x -= (rect.width - important.width) * important.x
                / (source.width - important.width);
        }
    }

    rect
}

/// Placement of the full source such that `visible` maps onto a `w`x`h` canvas.
fn place_source(source: Rect, visible: Rect, w: f64, h: f64) -> Rect {
    let scale_x = w / visible.width;
    let scale_y = h / visible.height;
    Rect {
        x: -visible.x * scale_x,
        y: -visible.y * scale_y,
        width: source.width * scale_x,
        height: source.height * scale_y,
    }
}

/// Map a resolved placement back to the source rectangle that ends up
/// visible on the canvas (unclipped).
pub fn visible_source_rect(source: Dimensions, result: &ResizeResult) -> Rect {
    let sx = f64::from(source.width) / f64::from(result.sample_width.max(1));
    let sy = f64::from(source.height) / f64::from(result.sample_height.max(1));
    Rect {
        x: -result.sample_x as f64 * sx,
        y: -result.sample_y as f64 * sy,
        width: f64::from(result.canvas_width) * sx,
        height: f64::from(result.canvas_height) * sy,
    }
}
