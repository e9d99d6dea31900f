//! JPEG encode capability
//!
//! Provides a trait-based encoder so pipelines stay independent of the
//! concrete JPEG library:
//! - Fixed presets for the two endpoints
//! - Full-resolution chroma and Huffman optimisation control
//! - Optional ICC profile embedding (chunked APP2 markers)

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use super::error::CodecError;

/// APP2 identifier that prefixes every ICC profile chunk.
const ICC_MARKER_ID: &[u8; 12] = b"ICC_PROFILE\0";

/// Maximum profile payload per APP2 segment (65535 - length - id - seq/count).
const MAX_ICC_CHUNK: usize = 65_519;

/// Settings for a single JPEG encode
///
/// Chroma is always kept at full resolution (4:4:4).
#[derive(Debug, Clone, PartialEq)]
pub struct JpegOptions {
    /// Quality value (1-100, where 100 is best quality)
    pub quality: u8,
    /// Build optimal Huffman tables instead of the standard ones
    pub optimize_coding: bool,
    /// ICC profile to embed, if any
    pub icc_profile: Option<Arc<Vec<u8>>>,
}

impl JpegOptions {
    /// Settings used for developed RAW files: q95, optimised, with profile.
    pub fn raw_export(icc_profile: Arc<Vec<u8>>) -> Self {
        Self {
            quality: 95,
            optimize_coding: true,
            icc_profile: Some(icc_profile),
        }
    }

    /// Settings used for watermarked images: q90, optimised, no profile.
    pub fn watermark_export() -> Self {
        Self {
            quality: 90,
            optimize_coding: true,
            icc_profile: None,
        }
    }
}

/// Trait for JPEG encoders
///
/// Implementations take tightly packed RGB8 pixels. The trait is
/// object-safe so pipelines can hold `Arc<dyn ImageEncoder>`.
pub trait ImageEncoder: Send + Sync {
    /// Encode RGB pixel data (3 bytes per pixel) as a complete JPEG stream.
    fn encode(
        &self,
        rgb: &[u8],
        width: u32,
        height: u32,
        options: &JpegOptions,
    ) -> Result<Vec<u8>, CodecError>;
}

/// JPEG encoder backed by mozjpeg
#[derive(Debug, Default, Clone, Copy)]
pub struct MozJpegEncoder;

impl ImageEncoder for MozJpegEncoder {
    fn encode(
        &self,
        rgb: &[u8],
        width: u32,
        height: u32,
        options: &JpegOptions,
    ) -> Result<Vec<u8>, CodecError> {
        if width == 0 || height == 0 {
            return Err(CodecError::encode_failed(
                "jpeg",
                format!("invalid dimensions {}x{}", width, height),
            ));
        }

        let expected = width as usize * height as usize * 3;
        if rgb.len() != expected {
            return Err(CodecError::encode_failed(
                "jpeg",
                format!("expected {} bytes of RGB data, got {}", expected, rgb.len()),
            ));
        }

        let icc_segments = options
            .icc_profile
            .as_deref()
            .map(|profile| icc_app2_segments(profile))
            .unwrap_or_default();

        // libjpeg reports fatal errors by unwinding out of the error handler.
        let result = panic::catch_unwind(AssertUnwindSafe(|| -> std::io::Result<Vec<u8>> {
            let mut comp = mozjpeg::Compress::new(mozjpeg::ColorSpace::JCS_RGB);
            comp.set_size(width as usize, height as usize);
            comp.set_quality(options.quality.clamp(1, 100) as f32);
            comp.set_chroma_sampling_pixel_sizes((1, 1), (1, 1));
            comp.set_optimize_coding(options.optimize_coding);

            let mut started = comp.start_compress(Vec::with_capacity(expected / 4))?;
            for segment in &icc_segments {
                started.write_marker(mozjpeg::Marker::APP(2), segment);
            }
            started.write_scanlines(rgb)?;
            started.finish()
        }));

        match result {
            Ok(Ok(data)) => Ok(data),
            Ok(Err(e)) => Err(CodecError::encode_failed("jpeg", e.to_string())),
            Err(_) => Err(CodecError::encode_failed(
                "jpeg",
                "encoder aborted on invalid input",
            )),
        }
    }
}

/// Split an ICC profile into APP2 payloads (`ICC_PROFILE\0`, seq, count, data).
fn icc_app2_segments(profile: &[u8]) -> Vec<Vec<u8>> {
    if profile.is_empty() {
        return Vec::new();
    }

    let chunks: Vec<&[u8]> = profile.chunks(MAX_ICC_CHUNK).collect();
    let count = chunks.len() as u8;

    chunks
        .into_iter()
        .enumerate()
        .map(|(i, chunk)| {
            let mut segment = Vec::with_capacity(ICC_MARKER_ID.len() + 2 + chunk.len());
            segment.extend_from_slice(ICC_MARKER_ID);
            segment.push(i as u8 + 1);
            segment.push(count);
            segment.extend_from_slice(chunk);
            segment
        })
        .collect()
}

/// Convert RGBA to RGB by discarding alpha channel
pub fn rgba_to_rgb(rgba: &[u8]) -> Vec<u8> {
    let pixel_count = rgba.len() / 4;
    let mut rgb = Vec::with_capacity(pixel_count * 3);

    for chunk in rgba.chunks_exact(4) {
        rgb.extend_from_slice(&chunk[..3]);
    }

    rgb
}
