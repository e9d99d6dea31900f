// Constants module - centralized default values for configuration
//
// Defaults used by the configuration layer and the HTTP handlers.

// =============================================================================
// Server defaults
// =============================================================================

/// Default bind address
pub const DEFAULT_ADDRESS: &str = "0.0.0.0";

/// Default listen port
pub const DEFAULT_PORT: u16 = 8000;

/// Default number of worker threads
pub const DEFAULT_THREADS: usize = 4;

/// Default maximum request body size (256 MB, RAW files are large)
pub const DEFAULT_MAX_BODY_BYTES: usize = 256 * 1024 * 1024;

/// Environment variable that overrides the configured port
pub const PORT_ENV_VAR: &str = "PORT";

// =============================================================================
// Logging defaults
// =============================================================================

/// Default log level directive
pub const DEFAULT_LOG_LEVEL: &str = "info";

// =============================================================================
// Watermark form defaults
// =============================================================================

/// Default watermark opacity in percent
pub const DEFAULT_OPACITY: i64 = 30;

/// Default watermark width as a percent of the base width
pub const DEFAULT_SCALE_PERCENT: i64 = 30;

// =============================================================================
// Endpoints
// =============================================================================

pub const CONVERT_PATH: &str = "/convert";
pub const WATERMARK_PATH: &str = "/watermark";
pub const HEALTH_PATH: &str = "/health";
pub const METRICS_PATH: &str = "/metrics";
