//! Position calculation for watermark placement.
//!
//! Corner anchors keep a fixed margin from the image edges. When the
//! watermark is too large to fit, the anchor is clamped to the margin and the
//! watermark overflows past the bottom/right edge instead.
//!
//! # Example
//!
//! ```ignore
//! use raw2jpg::watermark::position::{calculate_position, ImageDimensions, WatermarkDimensions};
//! use raw2jpg::watermark::WatermarkPosition;
//!
//! let image = ImageDimensions { width: 800, height: 600 };
//! let watermark = WatermarkDimensions { width: 100, height: 50 };
//!
//! let pos = calculate_position(WatermarkPosition::BottomRight, &image, &watermark, 16);
//! assert_eq!((pos.x, pos.y), (684, 534)); // 800 - 100 - 16, 600 - 50 - 16
//! ```

use serde::{Deserialize, Serialize};

/// Distance in pixels between a corner-anchored watermark and the image edges.
pub const WATERMARK_MARGIN: u32 = 16;

/// Anchor for the watermark on the base image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WatermarkPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    #[default]
    Center,
}

impl WatermarkPosition {
    /// Parse a client-supplied position.
    ///
    /// Matching is case-insensitive; anything unrecognised means center.
    pub fn from_param(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "top-left" => Self::TopLeft,
            "top-right" => Self::TopRight,
            "bottom-left" => Self::BottomLeft,
            "bottom-right" => Self::BottomRight,
            _ => Self::Center,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TopLeft => "top-left",
            Self::TopRight => "top-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomRight => "bottom-right",
            Self::Center => "center",
        }
    }
}

impl std::fmt::Display for WatermarkPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dimensions of the target image.
#[derive(Debug, Clone, Copy)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

/// Dimensions of the watermark to be placed.
#[derive(Debug, Clone, Copy)]
pub struct WatermarkDimensions {
    pub width: u32,
    pub height: u32,
}

/// Top-left corner of the placed watermark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementPosition {
    pub x: i32,
    pub y: i32,
}

impl PlacementPosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Calculate where the watermark's top-left corner goes.
///
/// Center uses truncating division, so an oversized watermark yields a
/// negative offset and is clipped evenly on both sides.
pub fn calculate_position(
    position: WatermarkPosition,
    image: &ImageDimensions,
    watermark: &WatermarkDimensions,
    margin: u32,
) -> PlacementPosition {
    let img_w = image.width as i32;
    let img_h = image.height as i32;
    let wm_w = watermark.width as i32;
    let wm_h = watermark.height as i32;
    let m = margin as i32;

    let right = (img_w - wm_w - m).max(m);
    let bottom = (img_h - wm_h - m).max(m);

    match position {
        WatermarkPosition::TopLeft => PlacementPosition::new(m, m),
        WatermarkPosition::TopRight => PlacementPosition::new(right, m),
        WatermarkPosition::BottomLeft => PlacementPosition::new(m, bottom),
        WatermarkPosition::BottomRight => PlacementPosition::new(right, bottom),
        WatermarkPosition::Center => PlacementPosition::new((img_w - wm_w) / 2, (img_h - wm_h) / 2),
    }
}
