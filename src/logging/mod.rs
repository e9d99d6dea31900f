// Logging module for structured logging using the tracing crate

use std::error::Error;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

use crate::config::{LogFormat, LoggingConfig};

/// Build the level filter: `RUST_LOG` when set, the configured directive otherwise.
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter, Box<dyn Error + Send + Sync>> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => Ok(EnvFilter::try_new(&config.level)?),
    }
}

/// Initialize the tracing subscriber for structured logging
///
/// Emits JSON (one object per line) or plain text to stdout.
///
/// # Errors
///
/// Returns an error if the level directive is invalid or a global subscriber
/// is already installed.
///
/// # Examples
///
/// ```no_run
/// use raw2jpg::config::LoggingConfig;
/// use raw2jpg::logging::init_subscriber;
///
/// init_subscriber(&LoggingConfig::default()).expect("Failed to initialize logging");
/// tracing::info!("Application started");
/// ```
pub fn init_subscriber(config: &LoggingConfig) -> Result<(), Box<dyn Error + Send + Sync>> {
    let filter = build_filter(config)?;

    match config.format {
        LogFormat::Json => Registry::default()
            .with(filter)
            .with(fmt::layer().json().with_current_span(false))
            .try_init()?,
        LogFormat::Text => Registry::default()
            .with(filter)
            .with(fmt::layer().with_target(false))
            .try_init()?,
    }

    Ok(())
}
