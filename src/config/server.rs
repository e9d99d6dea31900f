//! Server configuration types.
//!
//! Address and port bindings, worker threads and the request body limit.
//! Default values are sourced from `crate::constants`.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_ADDRESS, DEFAULT_MAX_BODY_BYTES, DEFAULT_PORT, DEFAULT_THREADS};

fn default_address() -> String {
    DEFAULT_ADDRESS.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

// Default worker thread count
fn default_threads() -> usize {
    DEFAULT_THREADS
}

fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_address")]
    pub address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Worker threads for the HTTP service
    #[serde(default = "default_threads")]
    pub threads: usize,
    /// Largest accepted request body; larger uploads get 413
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
            threads: default_threads(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl ServerConfig {
    /// Socket address to listen on, e.g. `0.0.0.0:8000`
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}
