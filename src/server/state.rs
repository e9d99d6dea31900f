// Shared, read-only state handed to every request

use std::sync::Arc;
use std::time::Instant;

use crate::config::{Config, WatermarkDefaults};
use crate::metrics::Metrics;
use crate::raw::RawConverter;
use crate::watermark::WatermarkCompositor;

pub struct ServiceState {
    pub converter: RawConverter,
    pub compositor: WatermarkCompositor,
    /// Values for omitted watermark form fields
    pub watermark_defaults: WatermarkDefaults,
    pub metrics: Metrics,
    pub max_body_bytes: usize,
    pub start_time: Instant,
}

impl ServiceState {
    pub fn new(
        converter: RawConverter,
        compositor: WatermarkCompositor,
        config: &Config,
    ) -> Result<Self, String> {
        let metrics =
            Metrics::new().map_err(|e| format!("Failed to register metrics: {}", e))?;

        Ok(Self {
            converter,
            compositor,
            watermark_defaults: config.watermark.clone(),
            metrics,
            max_body_bytes: config.server.max_body_bytes,
            start_time: Instant::now(),
        })
    }

    /// Production pipelines configured from `config`.
    pub fn from_config(config: &Config) -> Result<Arc<Self>, String> {
        let mut converter = RawConverter::default();
        if let Some(dir) = &config.convert.scratch_dir {
            converter = converter.with_scratch_dir(dir);
        }

        Ok(Arc::new(Self::new(
            converter,
            WatermarkCompositor::default(),
            config,
        )?))
    }
}
