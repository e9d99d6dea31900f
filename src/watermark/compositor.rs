//! Watermark compositor for blending a watermark onto an image.
//!
//! # Features
//!
//! - Integer opacity scaling of the watermark's alpha channel
//! - Porter-Duff "over" blending, clipped to the canvas
//! - Exact pass-through where the watermark is fully transparent

use image::{imageops, Rgba, RgbaImage};

use super::position::PlacementPosition;

pub const MIN_OPACITY: i64 = 0;
pub const MAX_OPACITY: i64 = 100;

pub fn clamp_opacity(opacity: i64) -> u8 {
    opacity.clamp(MIN_OPACITY, MAX_OPACITY) as u8
}

/// Scale every alpha value by `opacity` percent, rounding down.
///
/// Existing transparency is kept: a 50% alpha at 50% opacity becomes 25%.
pub fn apply_opacity(watermark: &mut RgbaImage, opacity: u8) {
    let opacity = opacity.min(100) as u32;
    if opacity == 100 {
        return;
    }
    for pixel in watermark.pixels_mut() {
        pixel[3] = (pixel[3] as u32 * opacity / 100) as u8;
    }
}

/// Canvas the size of `base` with every base channel copied over.
pub fn canvas_from(base: &RgbaImage) -> RgbaImage {
    let mut canvas = RgbaImage::new(base.width(), base.height());
    imageops::replace(&mut canvas, base, 0, 0);
    canvas
}

/// Blend `layer` onto `target` with its top-left corner at `position`.
///
/// Parts of the layer outside the target are ignored.
pub fn blend_layer(target: &mut RgbaImage, layer: &RgbaImage, position: PlacementPosition) {
    let target_width = target.width() as i64;
    let target_height = target.height() as i64;
    let x0 = position.x as i64;
    let y0 = position.y as i64;

    let x_start = x0.max(0);
    let y_start = y0.max(0);
    let x_end = (x0 + layer.width() as i64).min(target_width);
    let y_end = (y0 + layer.height() as i64).min(target_height);

    for ty in y_start..y_end {
        for tx in x_start..x_end {
            let wm_pixel = layer.get_pixel((tx - x0) as u32, (ty - y0) as u32);
            let target_pixel = target.get_pixel_mut(tx as u32, ty as u32);
            *target_pixel = blend_pixels(*target_pixel, *wm_pixel);
        }
    }
}

/// Porter-Duff "over": result = fg * a_fg + bg * a_bg * (1 - a_fg), unpremultiplied.
pub fn blend_pixels(background: Rgba<u8>, foreground: Rgba<u8>) -> Rgba<u8> {
    if foreground[3] == 0 {
        return background;
    }
    if foreground[3] == 255 {
        return foreground;
    }

    let fg_alpha = foreground[3] as f32 / 255.0;
    let bg_alpha = background[3] as f32 / 255.0;
    let out_alpha = fg_alpha + bg_alpha * (1.0 - fg_alpha);

    let blend_channel = |fg: u8, bg: u8| -> u8 {
        let result = (fg as f32 * fg_alpha + bg as f32 * bg_alpha * (1.0 - fg_alpha)) / out_alpha;
        result.round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        blend_channel(foreground[0], background[0]),
        blend_channel(foreground[1], background[1]),
        blend_channel(foreground[2], background[2]),
        (out_alpha * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}
