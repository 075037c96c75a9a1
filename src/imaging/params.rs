//! Parameter types for resize operations.
//!
//! These types describe *what* to produce, not *how*. They are the interface
//! between callers (CLI, cache, operations) and the pure
//! [`calculations`](super::calculations) plus the pixel-level
//! [`backend`](super::backend).
//!
//! ## Types
//!
//! - [`Quality`]: JPEG encoding quality, see [`Quality::from_setting`] for the accepted range.
//! - [`ResizeMode`]: `proportional`, `box`, `crop` or one of the nine legacy `h_v` alignments.
//! - [`Zoom`]: interpolation factor in `[0, 1]`, built from a percentage.
//! - [`ImportantPart`]: region of the source that must stay visible.
//! - [`ResizeRequest`] / [`ResizeResult`]: resolver input and output.
//! - [`OutputFormat`]: GIF, JPEG or PNG, derived from a file extension.

use super::backend::ImagingError;
use crate::types::{Dimensions, Rect};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Quality setting for JPEG encoding. The stored value is always 1-100.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u8);

impl Quality {
    /// Clamp `value` into 1-100.
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100) as u8)
    }

    /// Quality from a user setting in 0-100, where `0` selects the default
    /// of 80 and anything else is clamped like [`Quality::new`].
    pub fn from_setting(value: u32) -> Self {
        match value {
            0 => Self::default(),
            q => Self::new(q),
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(80)
    }
}

/// Horizontal anchor of a legacy alignment mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

/// Vertical anchor of a legacy alignment mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VAlign {
    Top,
    Center,
    Bottom,
}

/// How target dimensions are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResizeMode {
    /// Keep the aspect ratio; the longer side of the visible part wins.
    Proportional,
    /// Fit inside the target box without exceeding either side.
    Box,
    /// Fill the target exactly, cropping what does not fit.
    #[default]
    Crop,
    /// Pre-zoom crop anchors (`left_top` … `right_bottom`), rewritten into an
    /// important part before resolution.
    LegacyAlignment(HAlign, VAlign),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown resize mode: {0:?}")]
pub struct ParseModeError(pub String);

impl FromStr for ResizeMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "crop" => return Ok(Self::Crop),
            "proportional" => return Ok(Self::Proportional),
            "box" => return Ok(Self::Box),
            _ => {}
        }

        let (h, v) = s
            .split_once('_')
            .ok_or_else(|| ParseModeError(s.to_string()))?;
        let h = match h {
            "left" => HAlign::Left,
            "center" => HAlign::Center,
            "right" => HAlign::Right,
            _ => return Err(ParseModeError(s.to_string())),
        };
        let v = match v {
            "top" => VAlign::Top,
            "center" => VAlign::Center,
            "bottom" => VAlign::Bottom,
            _ => return Err(ParseModeError(s.to_string())),
        };
        Ok(Self::LegacyAlignment(h, v))
    }
}

impl fmt::Display for ResizeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Proportional => f.write_str("proportional"),
            Self::Box => f.write_str("box"),
            Self::Crop => f.write_str("crop"),
            Self::LegacyAlignment(h, v) => {
                let h = match h {
                    HAlign::Left => "left",
                    HAlign::Center => "center",
                    HAlign::Right => "right",
                };
                let v = match v {
                    VAlign::Top => "top",
                    VAlign::Center => "center",
                    VAlign::Bottom => "bottom",
                };
                write!(f, "{h}_{v}")
            }
        }
    }
}

/// Zoom factor between "show maximal context" (0) and "crop tight to the
/// important part" (1).
///
/// Callers speak percent; the stored factor is always within `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Zoom(f64);

impl Zoom {
    pub const NONE: Zoom = Zoom(0.0);
    pub const FULL: Zoom = Zoom(1.0);

    pub fn from_percent(percent: i64) -> Self {
        Self(percent.clamp(0, 100) as f64 / 100.0)
    }

    pub fn factor(self) -> f64 {
        self.0
    }

    /// Percentage this zoom was built from, as used in cache keys.
    pub fn percent(self) -> u32 {
        (self.0 * 100.0).round() as u32
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0.0
    }
}

/// Region of the source image that has to stay visible when cropping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImportantPart {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl ImportantPart {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn full(source: Dimensions) -> Self {
        Self::new(0, 0, source.width, source.height)
    }

    pub fn to_rect(self) -> Rect {
        Rect::new(
            f64::from(self.x),
            f64::from(self.y),
            f64::from(self.width),
            f64::from(self.height),
        )
    }
}

impl FromStr for ImportantPart {
    type Err = String;

    /// Parses `x,y,width,height`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<u32> = s
            .split(',')
            .map(|p| p.trim().parse::<u32>())
            .collect::<Result<_, _>>()
            .map_err(|e| format!("invalid important part {s:?}: {e}"))?;
        match parts.as_slice() {
            [x, y, w, h] => Ok(Self::new(*x, *y, *w, *h)),
            _ => Err(format!(
                "invalid important part {s:?}: expected x,y,width,height"
            )),
        }
    }
}

/// Everything the resolver needs for one resize.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeRequest {
    pub source: Dimensions,
    pub target_width: Option<u32>,
    pub target_height: Option<u32>,
    pub mode: ResizeMode,
    pub zoom: Zoom,
    /// `None` means the whole source image.
    pub important_part: Option<ImportantPart>,
}

impl ResizeRequest {
    pub fn new(source: Dimensions) -> Self {
        Self {
            source,
            target_width: None,
            target_height: None,
            mode: ResizeMode::default(),
            zoom: Zoom::NONE,
            important_part: None,
        }
    }

    pub fn with_target(mut self, width: Option<u32>, height: Option<u32>) -> Self {
        self.target_width = width;
        self.target_height = height;
        self
    }

    pub fn with_mode(mut self, mode: ResizeMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_zoom(mut self, zoom: Zoom) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn with_important_part(mut self, part: ImportantPart) -> Self {
        self.important_part = Some(part);
        self
    }

    /// Target width with `0` normalized to "not given".
    pub fn width(&self) -> Option<u32> {
        self.target_width.filter(|&w| w > 0)
    }

    /// Target height with `0` normalized to "not given".
    pub fn height(&self) -> Option<u32> {
        self.target_height.filter(|&h| h > 0)
    }

    pub fn effective_important_part(&self) -> ImportantPart {
        self.important_part
            .unwrap_or_else(|| ImportantPart::full(self.source))
    }

    /// True when resizing would reproduce the source unchanged.
    pub fn is_noop(&self) -> bool {
        self.width().is_none_or(|w| w == self.source.width)
            && self.height().is_none_or(|h| h == self.source.height)
            && (self.important_part.is_none() || self.zoom.is_zero())
    }

    /// Check the preconditions of [`resolve`](super::calculations::resolve).
    pub fn validate(&self) -> Result<(), ImagingError> {
        if self.source.is_empty() {
            return Err(ImagingError::DegenerateGeometry(format!(
                "source has zero extent ({}x{})",
                self.source.width, self.source.height
            )));
        }
        if let Some(part) = self.important_part {
            if part.width == 0 || part.height == 0 {
                return Err(ImagingError::DegenerateGeometry(format!(
                    "important part has zero extent ({}x{})",
                    part.width, part.height
                )));
            }
            let right = u64::from(part.x) + u64::from(part.width);
            let bottom = u64::from(part.y) + u64::from(part.height);
            if right > u64::from(self.source.width) || bottom > u64::from(self.source.height) {
                return Err(ImagingError::DegenerateGeometry(format!(
                    "important part {},{},{},{} exceeds source {}x{}",
                    part.x, part.y, part.width, part.height, self.source.width, self.source.height
                )));
            }
        }
        Ok(())
    }
}

/// Resolved geometry for a single resample call.
///
/// `canvas_*` is the output image size. `sample_*` is where the *entire*
/// source image lands in canvas coordinates; it may start at negative
/// offsets and exceed the canvas, which is how cropping is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResizeResult {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub sample_x: i64,
    pub sample_y: i64,
    pub sample_width: u32,
    pub sample_height: u32,
}

/// Encodings the core can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Gif,
    Jpeg,
    Png,
}

impl OutputFormat {
    /// Map a file extension (case-insensitive) to a format.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "gif" => Some(Self::Gif),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Gif => "gif",
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }
}
