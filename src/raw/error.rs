//! RAW conversion error types.

use std::fmt;

use crate::codec::CodecError;

/// Errors that can occur while converting a RAW upload to JPEG.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
    /// The file extension is not a supported RAW format
    UnsupportedFormat { extension: String },

    /// Staging or developing the sensor data failed
    RawDecode(String),

    /// The developed pixels could not be encoded as JPEG
    JpegEncode(CodecError),
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedFormat { extension } => write!(f, "Unsupported format: {}", extension),
            Self::RawDecode(msg) => write!(f, "Error processing RAW: {}", msg),
            Self::JpegEncode(err) => write!(f, "Error encoding JPEG: {}", err),
        }
    }
}

impl std::error::Error for ConvertError {}

impl ConvertError {
    /// Whether the failure was caused by the client's choice of file
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::UnsupportedFormat { .. })
    }
}
