//! Watermark scaling.
//!
//! The watermark's width is a percentage of the base width; its height
//! follows from the watermark's own aspect ratio.

use std::num::NonZeroU32;

use fast_image_resize::{FilterType, Image, MulDiv, PixelType, ResizeAlg, Resizer};
use image::RgbaImage;

use crate::codec::CodecError;

pub const MIN_SCALE_PERCENT: i64 = 1;
pub const MAX_SCALE_PERCENT: i64 = 100;

/// Largest resized watermark buffer accepted (RGBA bytes), matching the
/// `image` crate's default decode allocation limit
pub const MAX_RESIZED_BYTES: u64 = 512 * 1024 * 1024;

pub fn clamp_scale_percent(scale_percent: i64) -> u32 {
    scale_percent.clamp(MIN_SCALE_PERCENT, MAX_SCALE_PERCENT) as u32
}

/// Size of the resized watermark, both sides at least 1.
pub fn target_dimensions(
    base_width: u32,
    watermark_width: u32,
    watermark_height: u32,
    scale_percent: u32,
) -> (u32, u32) {
    let width = (base_width as f64 * scale_percent as f64 / 100.0).round().max(1.0);
    let height = if watermark_width == 0 {
        1.0
    } else {
        (width * watermark_height as f64 / watermark_width as f64)
            .round()
            .max(1.0)
    };
    let clamp = |v: f64| v.min(u32::MAX as f64) as u32;
    (clamp(width), clamp(height))
}

/// Resize with a Lanczos3 convolution on alpha-premultiplied pixels.
pub fn resize_rgba(img: &RgbaImage, target_w: u32, target_h: u32) -> Result<RgbaImage, CodecError> {
    if img.dimensions() == (target_w, target_h) {
        return Ok(img.clone());
    }

    let resized_bytes = target_w as u64 * target_h as u64 * 4;
    if resized_bytes > MAX_RESIZED_BYTES {
        return Err(CodecError::resize_failed(format!(
            "Target {}x{} exceeds the {} byte limit",
            target_w, target_h, MAX_RESIZED_BYTES
        )));
    }

    let src_width = NonZeroU32::new(img.width())
        .ok_or_else(|| CodecError::resize_failed("Source width is 0"))?;
    let src_height = NonZeroU32::new(img.height())
        .ok_or_else(|| CodecError::resize_failed("Source height is 0"))?;
    let dst_width =
        NonZeroU32::new(target_w).ok_or_else(|| CodecError::resize_failed("Target width is 0"))?;
    let dst_height =
        NonZeroU32::new(target_h).ok_or_else(|| CodecError::resize_failed("Target height is 0"))?;

    let mut src_image =
        Image::from_vec_u8(src_width, src_height, img.as_raw().clone(), PixelType::U8x4)
            .map_err(|e| {
                CodecError::resize_failed(format!("Failed to create source image: {:?}", e))
            })?;

    let mul_div = MulDiv::default();
    mul_div
        .multiply_alpha_inplace(&mut src_image.view_mut())
        .map_err(|e| CodecError::resize_failed(format!("Premultiply failed: {:?}", e)))?;

    let mut dst_image = Image::new(dst_width, dst_height, PixelType::U8x4);
    let mut resizer = Resizer::new(ResizeAlg::Convolution(FilterType::Lanczos3));
    resizer
        .resize(&src_image.view(), &mut dst_image.view_mut())
        .map_err(|e| CodecError::resize_failed(format!("Resize operation failed: {:?}", e)))?;

    mul_div
        .divide_alpha_inplace(&mut dst_image.view_mut())
        .map_err(|e| CodecError::resize_failed(format!("Unpremultiply failed: {:?}", e)))?;

    RgbaImage::from_raw(target_w, target_h, dst_image.into_vec())
        .ok_or_else(|| CodecError::resize_failed("Failed to create output image buffer"))
}
