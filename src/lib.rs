// raw2jpg library
// RAW → JPEG conversion and watermark compositing behind a Pingora HTTP app

pub mod codec;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod raw;
pub mod server;
pub mod watermark;
