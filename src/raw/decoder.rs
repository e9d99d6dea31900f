//! RAW decode capability
//!
//! Decoders read from a file path rather than an in-memory buffer, which is
//! why the converter stages uploads into scratch files first.

use std::path::Path;

use super::config::ProcessingConfig;

/// Developed sensor image: tightly packed RGB, 8 bits per channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl DecodedImage {
    /// Wrap an RGB8 buffer, checking that it matches the dimensions.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, String> {
        let expected = width as usize * height as usize * 3;
        if width == 0 || height == 0 || data.len() != expected {
            return Err(format!(
                "developed buffer of {} bytes does not match {}x{} RGB",
                data.len(),
                width,
                height
            ));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }
}

/// Turns a RAW file on disk into RGB pixels using the given settings.
///
/// Errors are plain diagnostics; the converter wraps them.
pub trait RawDecoder: Send + Sync {
    fn decode(&self, path: &Path, config: &ProcessingConfig) -> Result<DecodedImage, String>;
}
