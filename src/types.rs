//! Geometry primitives shared by the resolver, the resampler and the CLI.
//!
//! [`Rect`] is floating point. Every intermediate rectangle of the crop
//! computation stays fractional; only the final
//! [`ResizeResult`](crate::imaging::ResizeResult) is rounded.

use serde::{Deserialize, Serialize};

/// Integer pixel size of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Axis-aligned rectangle in (possibly fractional) pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle covering a whole image of the given size.
    pub fn full(dims: Dimensions) -> Self {
        Self::new(0.0, 0.0, f64::from(dims.width), f64::from(dims.height))
    }

    /// Per-field linear blend: `t = 0` yields `self`, `t = 1` yields `other`.
    pub fn lerp(self, other: Rect, t: f64) -> Rect {
        Rect {
            x: other.x * t + self.x * (1.0 - t),
            y: other.y * t + self.y * (1.0 - t),
            width: other.width * t + self.width * (1.0 - t),
            height: other.height * t + self.height * (1.0 - t),
        }
    }

    /// Whether `other` lies inside `self`, with a small tolerance for
    /// floating point noise.
    pub fn contains(self, other: Rect) -> bool {
        const EPS: f64 = 1e-9;
        other.x >= self.x - EPS
            && other.y >= self.y - EPS
            && other.x + other.width <= self.x + self.width + EPS
            && other.y + other.height <= self.y + self.height + EPS
    }
}
