//! Raster decode capability
//!
//! Format-agnostic decoding of uploaded images. The format is guessed from
//! the content, never from a filename.

use image::io::Reader as ImageReader;
use image::DynamicImage;
use std::io::Cursor;

use super::error::CodecError;

/// Decodes arbitrary raster bytes (PNG, JPEG, WebP, GIF, ...) into pixels.
pub trait RasterDecoder: Send + Sync {
    fn decode(&self, data: &[u8]) -> Result<DynamicImage, CodecError>;
}

/// Decoder backed by the `image` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageCrateDecoder;

impl RasterDecoder for ImageCrateDecoder {
    fn decode(&self, data: &[u8]) -> Result<DynamicImage, CodecError> {
        let img = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| CodecError::decode_failed(e.to_string()))?
            .decode()
            .map_err(|e| CodecError::decode_failed(e.to_string()))?;

        if img.width() == 0 || img.height() == 0 {
            return Err(CodecError::decode_failed(format!(
                "image has empty dimensions {}x{}",
                img.width(),
                img.height()
            )));
        }

        Ok(img)
    }
}
