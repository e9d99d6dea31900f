// Error types module

use thiserror::Error;

use crate::raw::ConvertError;
use crate::watermark::WatermarkError;

/// Service-level error returned by the HTTP handlers
///
/// Wraps the pipeline errors and adds the failures that only exist at the
/// HTTP boundary (reading uploads, form fields, routing).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error(transparent)]
    Convert(#[from] ConvertError),

    #[error(transparent)]
    Watermark(#[from] WatermarkError),

    /// Upload stream could not be read, or a required field is missing
    #[error("Error reading upload: {0}")]
    Read(String),

    /// A form field that must be an integer was not
    #[error("Invalid value for {field}: {value:?} is not an integer")]
    InvalidParameter { field: String, value: String },

    #[error("Request body exceeds the {limit} byte limit")]
    PayloadTooLarge { limit: usize },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Method {method} not allowed for {path}")]
    MethodNotAllowed { method: String, path: String },

    /// Worker task failed to complete
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn to_http_status(&self) -> u16 {
        match self {
            // 400 Bad Request
            ServiceError::Convert(e) if e.is_client_error() => 400,
            ServiceError::Watermark(e) if e.is_client_error() => 400,
            ServiceError::Read(_) | ServiceError::InvalidParameter { .. } => 400,

            ServiceError::NotFound(_) => 404,
            ServiceError::MethodNotAllowed { .. } => 405,
            ServiceError::PayloadTooLarge { .. } => 413,

            // 500 Internal Server Error
            ServiceError::Convert(_) | ServiceError::Watermark(_) | ServiceError::Internal(_) => {
                500
            }
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.to_http_status() < 500
    }

    /// JSON error body: `{"detail": "<message>"}`
    pub fn to_json_body(&self) -> Vec<u8> {
        serde_json::json!({ "detail": self.to_string() })
            .to_string()
            .into_bytes()
    }

    pub fn invalid_parameter(field: impl Into<String>, value: impl Into<String>) -> Self {
        ServiceError::InvalidParameter {
            field: field.into(),
            value: value.into(),
        }
    }
}

impl From<multer::Error> for ServiceError {
    fn from(err: multer::Error) -> Self {
        ServiceError::Read(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ServiceError {
    fn from(err: tokio::task::JoinError) -> Self {
        ServiceError::Internal(err.to_string())
    }
}
