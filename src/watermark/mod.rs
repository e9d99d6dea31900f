//! Watermark module for compositing an uploaded watermark onto an image.
//!
//! # Features
//!
//! - **Format-agnostic inputs**: any raster format the `image` crate can guess
//! - **Relative scaling**: watermark width as a percentage of the base width,
//!   aspect ratio preserved, Lanczos3 resampling
//! - **Opacity**: integer scaling of the watermark's own alpha
//! - **5 positioning modes**: four corners with a 16px margin, and center
//!
//! # Request Parameters
//!
//! | Field          | Default  | Range / values                                    |
//! |----------------|----------|---------------------------------------------------|
//! | `opacity`      | 30       | clamped to 0-100                                  |
//! | `scalePercent` | 30       | clamped to 1-100                                  |
//! | `position`     | `center` | `top-left`, `top-right`, `bottom-left`, `bottom-right`, `center` |

pub mod compositor;
pub mod error;
pub mod position;
pub mod processor;
pub mod resize;

// Re-export main types for convenience
pub use compositor::{apply_opacity, blend_layer, blend_pixels, clamp_opacity};
pub use error::WatermarkError;
pub use position::{
    calculate_position, ImageDimensions, PlacementPosition, WatermarkDimensions,
    WatermarkPosition, WATERMARK_MARGIN,
};
pub use processor::{CompositeRequest, WatermarkCompositor};
pub use resize::{clamp_scale_percent, resize_rgba, target_dimensions};
