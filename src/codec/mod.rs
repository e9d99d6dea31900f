//! Codec capabilities shared by both pipelines
//!
//! - Raster decoding of uploads (format guessed from content)
//! - JPEG encoding with quality and Huffman control
//! - The canonical sRGB ICC profile embedded into developed RAW files

pub mod decode;
pub mod encoder;
pub mod error;
pub mod icc;

pub use decode::{ImageCrateDecoder, RasterDecoder};
pub use encoder::{rgba_to_rgb, ImageEncoder, JpegOptions, MozJpegEncoder};
pub use error::CodecError;
pub use icc::srgb_icc_profile;

/// Media type of every image this service produces
pub const JPEG_CONTENT_TYPE: &str = "image/jpeg";

/// A finished JPEG ready to be written to a response
#[derive(Debug, Clone)]
pub struct JpegOutput {
    /// The encoded JPEG stream
    pub data: Vec<u8>,
    /// Content-Type header value
    pub content_type: &'static str,
    /// Suggested download name, when the endpoint offers one
    pub filename: Option<String>,
}

impl JpegOutput {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            content_type: JPEG_CONTENT_TYPE,
            filename: None,
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }
}
