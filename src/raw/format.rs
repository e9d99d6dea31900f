//! Supported RAW container formats
//!
//! Eligibility is decided by the file extension alone; the bytes are not
//! sniffed. Extensions are matched case-insensitively.

use std::path::Path;

use super::error::ConvertError;

/// Extensions accepted by `/convert`, lower-case and without the dot
pub const SUPPORTED_EXTENSIONS: [&str; 6] = ["arw", "cr2", "dng", "nef", "raw", "cr3"];

/// A RAW file name that passed the extension check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFileName {
    stem: String,
    extension: String,
}

impl RawFileName {
    /// Validate `filename` and split it into stem and lower-cased extension.
    ///
    /// Directory components sent by the client are ignored. A name without an
    /// extension (including dot-files such as `.arw`) is rejected.
    pub fn parse(filename: &str) -> Result<Self, ConvertError> {
        let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
        let path = Path::new(base);

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
            let shown = if extension.is_empty() {
                String::new()
            } else {
                format!(".{}", extension)
            };
            return Err(ConvertError::UnsupportedFormat { extension: shown });
        }

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();

        Ok(Self { stem, extension })
    }

    /// File name without its extension, original casing preserved
    pub fn stem(&self) -> &str {
        &self.stem
    }

    /// Lower-cased extension without the dot
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Suffix for scratch files, e.g. `.cr2`
    pub fn suffix(&self) -> String {
        format!(".{}", self.extension)
    }

    /// Suggested download name for the developed image
    pub fn jpeg_name(&self) -> String {
        format!("{}.jpg", self.stem)
    }
}
