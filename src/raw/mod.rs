//! RAW conversion module.
//!
//! Develops camera RAW uploads into sRGB JPEGs with a fixed, deterministic
//! configuration.
//!
//! # Pipeline
//!
//! 1. Validate the upload's extension (`.arw`, `.cr2`, `.cr3`, `.dng`, `.nef`, `.raw`)
//! 2. Stage the bytes in a scratch file that is removed afterwards
//! 3. Develop the sensor data (camera white balance, sRGB, BT.709 gamma, 8-bit)
//! 4. Encode as JPEG q95, 4:4:4, optimised Huffman, with an sRGB ICC profile

pub mod color;
pub mod config;
pub mod converter;
pub mod decoder;
pub mod developer;
pub mod error;
pub mod format;
pub mod gamma;

pub use config::{ColorSpace, Gamma, ProcessingConfig, WhiteBalance};
pub use converter::RawConverter;
pub use decoder::{DecodedImage, RawDecoder};
pub use developer::RawloaderDecoder;
pub use error::ConvertError;
pub use format::{RawFileName, SUPPORTED_EXTENSIONS};
pub use gamma::GammaCurve;
