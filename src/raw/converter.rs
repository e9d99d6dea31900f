//! RAW → JPEG conversion pipeline
//!
//! Uploads are staged in a scratch file because RAW decoders read from disk.
//! The scratch file is owned by a `NamedTempFile` and removed when it drops,
//! on success and on every error path.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::NamedTempFile;
use tracing::{debug, info};

use super::config::ProcessingConfig;
use super::decoder::RawDecoder;
use super::developer::RawloaderDecoder;
use super::error::ConvertError;
use super::format::RawFileName;
use crate::codec::{srgb_icc_profile, ImageEncoder, JpegOptions, JpegOutput, MozJpegEncoder};

const SCRATCH_PREFIX: &str = "raw2jpg-";

/// Converts RAW uploads to sRGB JPEGs.
#[derive(Clone)]
pub struct RawConverter {
    decoder: Arc<dyn RawDecoder>,
    encoder: Arc<dyn ImageEncoder>,
    config: ProcessingConfig,
    scratch_dir: Option<PathBuf>,
}

impl Default for RawConverter {
    fn default() -> Self {
        Self::new(Arc::new(RawloaderDecoder), Arc::new(MozJpegEncoder))
    }
}

impl RawConverter {
    pub fn new(decoder: Arc<dyn RawDecoder>, encoder: Arc<dyn ImageEncoder>) -> Self {
        Self {
            decoder,
            encoder,
            config: ProcessingConfig::FIXED,
            scratch_dir: None,
        }
    }

    /// Stage uploads in `dir` instead of the system temp directory.
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    pub fn with_config(mut self, config: ProcessingConfig) -> Self {
        self.config = config;
        self
    }

    /// Convert an uploaded RAW file.
    ///
    /// The extension is checked before anything touches the disk.
    pub fn convert(&self, data: &[u8], filename: &str) -> Result<JpegOutput, ConvertError> {
        let name = RawFileName::parse(filename)?;

        let decoded = {
            let scratch = self.stage(data, &name.suffix())?;
            debug!(
                path = %scratch.path().display(),
                bytes = data.len(),
                "Staged RAW upload"
            );
            self.decoder
                .decode(scratch.path(), &self.config)
                .map_err(ConvertError::RawDecode)?
        };

        let profile = srgb_icc_profile().map_err(ConvertError::JpegEncode)?;
        let jpeg = self
            .encoder
            .encode(
                &decoded.data,
                decoded.width,
                decoded.height,
                &JpegOptions::raw_export(profile),
            )
            .map_err(ConvertError::JpegEncode)?;

        info!(
            filename = %name.jpeg_name(),
            width = decoded.width,
            height = decoded.height,
            input_bytes = data.len(),
            output_bytes = jpeg.len(),
            "Converted RAW to JPEG"
        );

        Ok(JpegOutput::new(jpeg).with_filename(name.jpeg_name()))
    }

    fn stage(&self, data: &[u8], suffix: &str) -> Result<NamedTempFile, ConvertError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(SCRATCH_PREFIX).suffix(suffix);

        let mut file = match &self.scratch_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(|e| ConvertError::RawDecode(format!("failed to create scratch file: {}", e)))?;

        file.write_all(data)
            .and_then(|_| file.flush())
            .map_err(|e| ConvertError::RawDecode(format!("failed to write scratch file: {}", e)))?;

        Ok(file)
    }

    pub fn scratch_dir(&self) -> Option<&Path> {
        self.scratch_dir.as_deref()
    }
}
