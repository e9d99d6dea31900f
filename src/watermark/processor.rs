//! Watermark processor.
//!
//! Decodes a base image and a watermark, scales the watermark relative to the
//! base, fades it by the requested opacity, anchors it and encodes the result
//! as JPEG.
//!
//! # Example
//!
//! ```ignore
//! use raw2jpg::watermark::{CompositeRequest, WatermarkCompositor, WatermarkPosition};
//!
//! let compositor = WatermarkCompositor::default();
//! let jpeg = compositor.composite(&CompositeRequest {
//!     base: base_bytes,
//!     watermark: logo_bytes,
//!     opacity: 30,
//!     scale_percent: 30,
//!     position: WatermarkPosition::BottomRight,
//! })?;
//! ```

use std::sync::Arc;

use bytes::Bytes;
use image::RgbaImage;
use tracing::debug;

use super::compositor::{apply_opacity, blend_layer, canvas_from, clamp_opacity};
use super::error::WatermarkError;
use super::position::{
    calculate_position, ImageDimensions, WatermarkDimensions, WatermarkPosition, WATERMARK_MARGIN,
};
use super::resize::{clamp_scale_percent, resize_rgba, target_dimensions};
use crate::codec::{
    rgba_to_rgb, ImageCrateDecoder, ImageEncoder, JpegOptions, JpegOutput, MozJpegEncoder,
    RasterDecoder,
};

/// Inputs for one watermark operation.
///
/// `opacity` and `scale_percent` are raw client values and are clamped here.
#[derive(Debug, Clone)]
pub struct CompositeRequest {
    pub base: Bytes,
    pub watermark: Bytes,
    /// Percent, clamped to 0-100
    pub opacity: i64,
    /// Watermark width as a percent of base width, clamped to 1-100
    pub scale_percent: i64,
    pub position: WatermarkPosition,
}

/// Composites watermarks onto images and encodes the result.
#[derive(Clone)]
pub struct WatermarkCompositor {
    decoder: Arc<dyn RasterDecoder>,
    encoder: Arc<dyn ImageEncoder>,
}

impl Default for WatermarkCompositor {
    fn default() -> Self {
        Self::new(Arc::new(ImageCrateDecoder), Arc::new(MozJpegEncoder))
    }
}

impl WatermarkCompositor {
    pub fn new(decoder: Arc<dyn RasterDecoder>, encoder: Arc<dyn ImageEncoder>) -> Self {
        Self { decoder, encoder }
    }

    /// Composite and encode as JPEG (q90, 4:4:4, no ICC profile).
    pub fn composite(&self, request: &CompositeRequest) -> Result<JpegOutput, WatermarkError> {
        let canvas = self.composite_rgba(request)?;
        let (width, height) = canvas.dimensions();

        let jpeg = self
            .encoder
            .encode(
                &rgba_to_rgb(canvas.as_raw()),
                width,
                height,
                &JpegOptions::watermark_export(),
            )
            .map_err(|e| WatermarkError::CompositeError(e.to_string()))?;

        debug!(
            width = width,
            height = height,
            output_bytes = jpeg.len(),
            "Encoded watermarked image"
        );

        Ok(JpegOutput::new(jpeg))
    }

    /// Composite without encoding; the canvas always matches the base size.
    pub fn composite_rgba(&self, request: &CompositeRequest) -> Result<RgbaImage, WatermarkError> {
        let base = self
            .decoder
            .decode(&request.base)
            .map_err(|e| WatermarkError::InvalidBaseImage(e.to_string()))?
            .to_rgba8();
        let watermark = self
            .decoder
            .decode(&request.watermark)
            .map_err(|e| WatermarkError::InvalidWatermarkImage(e.to_string()))?
            .to_rgba8();

        let scale = clamp_scale_percent(request.scale_percent);
        let opacity = clamp_opacity(request.opacity);

        let (target_w, target_h) =
            target_dimensions(base.width(), watermark.width(), watermark.height(), scale);
        let mut layer = resize_rgba(&watermark, target_w, target_h)
            .map_err(|e| WatermarkError::CompositeError(e.to_string()))?;
        apply_opacity(&mut layer, opacity);

        let position = calculate_position(
            request.position,
            &ImageDimensions {
                width: base.width(),
                height: base.height(),
            },
            &WatermarkDimensions {
                width: target_w,
                height: target_h,
            },
            WATERMARK_MARGIN,
        );

        debug!(
            base_width = base.width(),
            base_height = base.height(),
            watermark_width = target_w,
            watermark_height = target_h,
            x = position.x,
            y = position.y,
            opacity = opacity,
            position = %request.position,
            "Compositing watermark"
        );

        let mut canvas = canvas_from(&base);
        blend_layer(&mut canvas, &layer, position);
        Ok(canvas)
    }
}
