//! Watermark error types.
//!
//! Defines errors that can occur while compositing a watermark.

use std::fmt;

/// Errors that can occur during watermark processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatermarkError {
    /// The base image could not be decoded
    InvalidBaseImage(String),

    /// The watermark image could not be decoded
    InvalidWatermarkImage(String),

    /// Resizing, blending or encoding failed
    CompositeError(String),
}

impl fmt::Display for WatermarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBaseImage(msg) => write!(f, "Invalid base image: {}", msg),
            Self::InvalidWatermarkImage(msg) => write!(f, "Invalid watermark image: {}", msg),
            Self::CompositeError(msg) => write!(f, "Error applying watermark: {}", msg),
        }
    }
}

impl std::error::Error for WatermarkError {}

impl WatermarkError {
    /// Whether the failure was caused by the uploaded content
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidBaseImage(_) | Self::InvalidWatermarkImage(_)
        )
    }
}
