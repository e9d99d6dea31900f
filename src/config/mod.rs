// Configuration module

mod server;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use server::ServerConfig;

use crate::constants::{
    DEFAULT_LOG_LEVEL, DEFAULT_OPACITY, DEFAULT_SCALE_PERCENT, PORT_ENV_VAR,
};
use crate::watermark::WatermarkPosition;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub convert: ConvertConfig,
    #[serde(default)]
    pub watermark: WatermarkDefaults,
}

/// Log output format
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Text,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// EnvFilter directive; `RUST_LOG` takes precedence when set
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertConfig {
    /// Directory for RAW scratch files (system temp dir when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scratch_dir: Option<PathBuf>,
}

fn default_opacity() -> i64 {
    DEFAULT_OPACITY
}

fn default_scale_percent() -> i64 {
    DEFAULT_SCALE_PERCENT
}

/// Values used when a watermark request omits a form field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatermarkDefaults {
    #[serde(default = "default_opacity")]
    pub default_opacity: i64,
    #[serde(default = "default_scale_percent")]
    pub default_scale_percent: i64,
    #[serde(default)]
    pub default_position: WatermarkPosition,
}

impl Default for WatermarkDefaults {
    fn default() -> Self {
        Self {
            default_opacity: default_opacity(),
            default_scale_percent: default_scale_percent(),
            default_position: WatermarkPosition::default(),
        }
    }
}

impl Config {
    pub fn from_yaml_with_env(yaml: &str) -> Result<Self, String> {
        // Replace ${VAR_NAME} with environment variable values
        let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").map_err(|e| e.to_string())?;

        // First, check that all referenced environment variables exist
        for caps in re.captures_iter(yaml) {
            let var_name = &caps[1];
            std::env::var(var_name).map_err(|_| {
                format!(
                    "Environment variable '{}' is referenced but not set",
                    var_name
                )
            })?;
        }

        let substituted = re.replace_all(yaml, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_default()
        });

        if substituted.trim().is_empty() {
            return Ok(Config::default());
        }

        serde_yaml::from_str(&substituted).map_err(|e| e.to_string())
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;
        Self::from_yaml_with_env(&yaml)
    }

    /// Load from `path` if it exists (defaults otherwise), apply environment
    /// overrides and validate.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            Self::from_file(path)?
        } else {
            Config::default()
        };
        config.apply_port_override(std::env::var(PORT_ENV_VAR).ok().as_deref())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply a `PORT` value on top of the configured port.
    pub fn apply_port_override(&mut self, port: Option<&str>) -> Result<(), String> {
        if let Some(value) = port {
            self.server.port = value
                .trim()
                .parse()
                .map_err(|_| format!("{} must be a port number, got '{}'", PORT_ENV_VAR, value))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.server.address.trim().is_empty() {
            return Err("server.address cannot be empty".to_string());
        }

        if self.server.port == 0 {
            return Err("server.port must be greater than 0".to_string());
        }

        if self.server.threads == 0 {
            return Err("server.threads must be at least 1".to_string());
        }

        if self.server.max_body_bytes == 0 {
            return Err("server.max_body_bytes must be at least 1".to_string());
        }

        let defaults = &self.watermark;
        if !(0..=100).contains(&defaults.default_opacity) {
            return Err(format!(
                "watermark.default_opacity must be between 0 and 100, got {}",
                defaults.default_opacity
            ));
        }

        if !(1..=100).contains(&defaults.default_scale_percent) {
            return Err(format!(
                "watermark.default_scale_percent must be between 1 and 100, got {}",
                defaults.default_scale_percent
            ));
        }

        if let Some(dir) = &self.convert.scratch_dir {
            if !dir.is_dir() {
                return Err(format!(
                    "convert.scratch_dir '{}' is not an existing directory",
                    dir.display()
                ));
            }
        }

        Ok(())
    }
}
