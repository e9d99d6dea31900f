//! Codec error types
//!
//! Failures raised by the raster decode, resample and JPEG encode
//! capabilities. Pipelines translate these into their own taxonomy at the
//! stage boundary, so no codec error ever reaches a client untranslated.

use std::fmt;

/// Errors that can occur inside a codec capability
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Input bytes could not be decoded into a raster image
    DecodeFailed { message: String },
    /// Resampling to the requested dimensions failed
    ResizeFailed { message: String },
    /// The encoder rejected the pixel data or its options
    EncodeFailed { format: String, message: String },
    /// The colour profile could not be generated
    ProfileFailed { message: String },
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::DecodeFailed { message } => {
                write!(f, "Failed to decode image: {}", message)
            }
            CodecError::ResizeFailed { message } => write!(f, "Resize failed: {}", message),
            CodecError::EncodeFailed { format, message } => {
                write!(f, "Failed to encode to {}: {}", format, message)
            }
            CodecError::ProfileFailed { message } => {
                write!(f, "Failed to build color profile: {}", message)
            }
        }
    }
}

impl std::error::Error for CodecError {}

impl CodecError {
    pub fn decode_failed(message: impl Into<String>) -> Self {
        CodecError::DecodeFailed {
            message: message.into(),
        }
    }

    pub fn resize_failed(message: impl Into<String>) -> Self {
        CodecError::ResizeFailed {
            message: message.into(),
        }
    }

    pub fn encode_failed(format: impl Into<String>, message: impl Into<String>) -> Self {
        CodecError::EncodeFailed {
            format: format.into(),
            message: message.into(),
        }
    }

    pub fn profile_failed(message: impl Into<String>) -> Self {
        CodecError::ProfileFailed {
            message: message.into(),
        }
    }
}
