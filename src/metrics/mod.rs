// Prometheus metrics
//
// Provides request metrics for both endpoints:
// - Request counters by endpoint and status code
// - Processing duration histograms
// - Bytes received and produced

use prometheus::{
    Encoder, HistogramOpts, HistogramTimer, HistogramVec, IntCounterVec, Opts, Registry,
    TextEncoder,
};

/// Media type of the text exposition format
pub const METRICS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Direction label values for `raw2jpg_bytes_processed_total`
pub const DIRECTION_IN: &str = "in";
pub const DIRECTION_OUT: &str = "out";

/// Metrics for the conversion service, backed by a private registry
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,

    /// Total requests by endpoint and HTTP status
    pub requests: IntCounterVec,

    /// Pipeline duration histogram (in seconds)
    pub processing_duration: HistogramVec,

    /// Upload and response bytes by endpoint and direction
    pub bytes_processed: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let requests = IntCounterVec::new(
            Opts::new("raw2jpg_requests_total", "Total number of requests by endpoint and status"),
            &["endpoint", "status"],
        )?;

        // RAW development takes seconds; watermarking tens of milliseconds
        let processing_duration = HistogramVec::new(
            HistogramOpts::new(
                "raw2jpg_processing_duration_seconds",
                "Duration of image processing in seconds",
            )
            .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
            &["endpoint"],
        )?;

        let bytes_processed = IntCounterVec::new(
            Opts::new(
                "raw2jpg_bytes_processed_total",
                "Bytes received and produced by endpoint",
            ),
            &["endpoint", "direction"],
        )?;

        registry.register(Box::new(requests.clone()))?;
        registry.register(Box::new(processing_duration.clone()))?;
        registry.register(Box::new(bytes_processed.clone()))?;

        Ok(Self {
            registry,
            requests,
            processing_duration,
            bytes_processed,
        })
    }

    pub fn record_request(&self, endpoint: &str, status: u16) {
        self.requests
            .with_label_values(&[endpoint, &status.to_string()])
            .inc();
    }

    pub fn record_bytes(&self, endpoint: &str, direction: &str, bytes: usize) {
        self.bytes_processed
            .with_label_values(&[endpoint, direction])
            .inc_by(bytes as u64);
    }

    /// Start timing a pipeline run; the duration is recorded when the timer drops.
    pub fn start_timer(&self, endpoint: &str) -> HistogramTimer {
        self.processing_duration
            .with_label_values(&[endpoint])
            .start_timer()
    }

    /// Render every metric in the Prometheus text format.
    pub fn export(&self) -> Result<Vec<u8>, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(buffer)
    }
}
