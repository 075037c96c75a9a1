//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Resize
//!
//! One block per input, in the order given on the command line:
//!
//! ```text
//! 001 photo.jpg
//!     400x300: encoded
//!         Output: assets/images/7/photo-3e1a9cf7.jpg
//! 002 logo.png
//!     original: unchanged
//!         Output: logo.png
//! 003 huge.png
//!     400x300: failed
//!         Error: Image size 5000x100 exceeds the maximum of 3000x3000
//! ```
//!
//! ## Plan
//!
//! ```text
//! Source: 800x600
//!     Mode: crop, zoom 0%
//!     Important: 0,0 800x600
//! Canvas: 400x400
//!     Sample: 533x400 at (-67, 0)
//!     Visible: 600x600 at (100, 0)
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::imaging::{ImagingError, ResizeOutcome, ResizeRequest, ResizeResult, visible_source_rect};
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Human label for the requested target size.
///
/// ```text
/// 400x300    // both sides
/// 400w       // width only
/// 300h       // height only
/// original   // neither
/// ```
fn target_label(width: Option<u32>, height: Option<u32>) -> String {
    match (width, height) {
        (Some(w), Some(h)) => format!("{w}x{h}"),
        (Some(w), None) => format!("{w}w"),
        (None, Some(h)) => format!("{h}h"),
        (None, None) => "original".to_string(),
    }
}

fn outcome_status(outcome: &ResizeOutcome) -> &'static str {
    match outcome {
        ResizeOutcome::Unchanged(_) => "unchanged",
        ResizeOutcome::Cached(_) => "cached",
        ResizeOutcome::Intercepted(_) => "intercepted",
        ResizeOutcome::Written(_) => "encoded",
    }
}

// ============================================================================
// Resize output
// ============================================================================

/// Format the result of resizing one input.
pub fn format_resize_result(
    index: usize,
    source: &Path,
    width: Option<u32>,
    height: Option<u32>,
    result: &Result<ResizeOutcome, ImagingError>,
) -> Vec<String> {
    let target = target_label(width.filter(|&w| w > 0), height.filter(|&h| h > 0));
    let mut lines = vec![format!("{} {}", format_index(index), source.display())];
    match result {
        Ok(outcome) => {
            lines.push(format!("{}{}: {}", indent(1), target, outcome_status(outcome)));
            lines.push(format!("{}Output: {}", indent(2), outcome.path().display()));
        }
        Err(e) => {
            lines.push(format!("{}{}: failed", indent(1), target));
            lines.push(format!("{}Error: {}", indent(2), e));
        }
    }
    lines
}

pub fn print_resize_result(
    index: usize,
    source: &Path,
    width: Option<u32>,
    height: Option<u32>,
    result: &Result<ResizeOutcome, ImagingError>,
) {
    for line in format_resize_result(index, source, width, height, result) {
        println!("{}", line);
    }
}

// ============================================================================
// Plan output
// ============================================================================

/// Format resolved geometry for inspection.
pub fn format_plan(request: &ResizeRequest, result: &ResizeResult) -> Vec<String> {
    let part = request.effective_important_part();
    let visible = visible_source_rect(request.source, result);
    vec![
        format!("Source: {}x{}", request.source.width, request.source.height),
        format!(
            "{}Mode: {}, zoom {}%",
            indent(1),
            request.mode,
            request.zoom.percent()
        ),
        format!(
            "{}Important: {},{} {}x{}",
            indent(1),
            part.x,
            part.y,
            part.width,
            part.height
        ),
        format!("Canvas: {}x{}", result.canvas_width, result.canvas_height),
        format!(
            "{}Sample: {}x{} at ({}, {})",
            indent(1),
            result.sample_width,
            result.sample_height,
            result.sample_x,
            result.sample_y
        ),
        format!(
            "{}Visible: {:.0}x{:.0} at ({:.0}, {:.0})",
            indent(1),
            visible.width,
            visible.height,
            visible.x,
            visible.y
        ),
    ]
}

pub fn print_plan(request: &ResizeRequest, result: &ResizeResult) {
    for line in format_plan(request, result) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::{ImportantPart, Zoom, resolve};
    use crate::types::Dimensions;
    use std::path::PathBuf;

    #[test]
    fn format_index_pads_to_three_digits() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1234), "1234");
    }

    #[test]
    fn indent_levels() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(2), "        ");
    }

    #[test]
    fn target_label_variants() {
        assert_eq!(target_label(Some(400), Some(300)), "400x300");
        assert_eq!(target_label(Some(400), None), "400w");
        assert_eq!(target_label(None, Some(300)), "300h");
        assert_eq!(target_label(None, None), "original");
    }

    #[test]
    fn resize_result_written() {
        let outcome = Ok(ResizeOutcome::Written(PathBuf::from("assets/images/7/photo-3e1a9cf7.jpg")));
        let lines = format_resize_result(1, Path::new("photo.jpg"), Some(400), Some(300), &outcome);
        assert_eq!(
            lines,
            vec![
                "001 photo.jpg",
                "    400x300: encoded",
                "        Output: assets/images/7/photo-3e1a9cf7.jpg",
            ]
        );
    }

    #[test]
    fn resize_result_zero_width_is_not_given() {
        let outcome = Ok(ResizeOutcome::Cached(PathBuf::from("c.png")));
        let lines = format_resize_result(2, Path::new("a.png"), Some(0), Some(50), &outcome);
        assert_eq!(lines[1], "    50h: cached");
    }

    #[test]
    fn resize_result_error() {
        let err = Err(ImagingError::UnsupportedFormat("a.bmp".into()));
        let lines = format_resize_result(3, Path::new("a.bmp"), Some(10), None, &err);
        assert_eq!(lines[1], "    10w: failed");
        assert_eq!(lines[2], "        Error: Unsupported image format: a.bmp");
    }

    #[test]
    fn plan_for_centered_crop() {
        let request =
            ResizeRequest::new(Dimensions::new(800, 600)).with_target(Some(400), Some(400));
        let result = resolve(&request);
        let lines = format_plan(&request, &result);
        assert_eq!(lines[0], "Source: 800x600");
        assert_eq!(lines[1], "    Mode: crop, zoom 0%");
        assert_eq!(lines[2], "    Important: 0,0 800x600");
        assert_eq!(lines[3], "Canvas: 400x400");
        assert_eq!(lines[4], "    Sample: 533x400 at (-67, 0)");
    }

    #[test]
    fn plan_shows_explicit_important_part() {
        let request = ResizeRequest::new(Dimensions::new(800, 600))
            .with_target(Some(200), Some(200))
            .with_zoom(Zoom::from_percent(25))
            .with_important_part(ImportantPart::new(100, 100, 200, 200));
        let lines = format_plan(&request, &resolve(&request));
        assert_eq!(lines[1], "    Mode: crop, zoom 25%");
        assert_eq!(lines[2], "    Important: 100,100 200x200");
    }
}
