//! Request routing and endpoint handlers
//!
//! Handlers return `EndpointResponse` instead of writing to the session, so
//! routing is testable without a listening socket. The caller writes the
//! response.

use std::time::Instant;

use bytes::Bytes;
use http::Method;
use tracing::{error, info, warn};

use super::multipart::MultipartForm;
use super::state::ServiceState;
use crate::codec::JpegOutput;
use crate::constants::{CONVERT_PATH, HEALTH_PATH, METRICS_PATH, WATERMARK_PATH};
use crate::error::ServiceError;
use crate::metrics::{DIRECTION_IN, DIRECTION_OUT, METRICS_CONTENT_TYPE};
use crate::watermark::{CompositeRequest, WatermarkPosition};

/// Metric label for requests outside the known endpoints
const OTHER_ENDPOINT: &str = "other";

/// Response produced by a handler.
#[derive(Debug, Clone)]
pub struct EndpointResponse {
    /// HTTP status code
    pub status: u16,
    /// Content-Type header value
    pub content_type: &'static str,
    /// Extra headers
    pub headers: Vec<(&'static str, String)>,
    /// Response body
    pub body: Vec<u8>,
}

impl EndpointResponse {
    /// Create a JSON response with the given status and body.
    pub fn json(status: u16, body: String) -> Self {
        Self {
            status,
            content_type: "application/json",
            headers: Vec::new(),
            body: body.into_bytes(),
        }
    }

    /// Create a plain text response (for Prometheus metrics).
    pub fn prometheus(body: Vec<u8>) -> Self {
        Self {
            status: 200,
            content_type: METRICS_CONTENT_TYPE,
            headers: Vec::new(),
            body,
        }
    }

    /// `200` with the JPEG body; offered as a download when it has a name.
    pub fn jpeg(output: JpegOutput) -> Self {
        let headers = output
            .filename
            .as_ref()
            .map(|name| {
                vec![(
                    "Content-Disposition",
                    format!("attachment; filename=\"{}\"", name.replace('"', "")),
                )]
            })
            .unwrap_or_default();

        Self {
            status: 200,
            content_type: output.content_type,
            headers,
            body: output.data,
        }
    }

    /// `{"detail": ...}` body with the error's status.
    pub fn error(err: &ServiceError) -> Self {
        let mut response = Self {
            status: err.to_http_status(),
            content_type: "application/json",
            headers: Vec::new(),
            body: err.to_json_body(),
        };
        if let ServiceError::MethodNotAllowed { path, .. } = err {
            response.headers.push(("Allow", allowed_method(path).to_string()));
        }
        response
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

fn allowed_method(path: &str) -> &'static str {
    match path {
        CONVERT_PATH | WATERMARK_PATH => "POST",
        _ => "GET",
    }
}

/// Metric label for a request path
pub fn endpoint_label(path: &str) -> &'static str {
    match path {
        CONVERT_PATH => "convert",
        WATERMARK_PATH => "watermark",
        HEALTH_PATH => "health",
        METRICS_PATH => "metrics",
        _ => OTHER_ENDPOINT,
    }
}

/// Dispatch a buffered request to its handler and record metrics.
pub async fn route(
    state: &ServiceState,
    method: &Method,
    path: &str,
    content_type: Option<&str>,
    body: Bytes,
) -> EndpointResponse {
    let endpoint = endpoint_label(path);

    let result = match (path, method) {
        (CONVERT_PATH, &Method::POST) => handle_convert(state, content_type, body).await,
        (WATERMARK_PATH, &Method::POST) => handle_watermark(state, content_type, body).await,
        (HEALTH_PATH, &Method::GET) => Ok(handle_health(state.start_time)),
        (METRICS_PATH, &Method::GET) => handle_metrics(state),
        (CONVERT_PATH | WATERMARK_PATH | HEALTH_PATH | METRICS_PATH, _) => {
            Err(ServiceError::MethodNotAllowed {
                method: method.to_string(),
                path: path.to_string(),
            })
        }
        _ => Err(ServiceError::NotFound(path.to_string())),
    };

    let response = match result {
        Ok(response) => response,
        Err(err) => {
            if err.is_client_error() {
                warn!(endpoint = endpoint, status = err.to_http_status(), error = %err, "Request rejected");
            } else {
                error!(endpoint = endpoint, status = err.to_http_status(), error = %err, "Request failed");
            }
            EndpointResponse::error(&err)
        }
    };

    state.metrics.record_request(endpoint, response.status);
    response
}

/// `POST /convert`: multipart field `file` holding the RAW upload.
pub async fn handle_convert(
    state: &ServiceState,
    content_type: Option<&str>,
    body: Bytes,
) -> Result<EndpointResponse, ServiceError> {
    let _timer = state.metrics.start_timer("convert");

    let mut form = MultipartForm::parse(content_type, body).await?;
    let upload = form.take_file("file")?;
    let filename = upload.filename.unwrap_or_default();
    state
        .metrics
        .record_bytes("convert", DIRECTION_IN, upload.data.len());

    let converter = state.converter.clone();
    let data = upload.data;
    let started = Instant::now();
    let output =
        tokio::task::spawn_blocking(move || converter.convert(&data, &filename)).await??;

    info!(
        output_bytes = output.data.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "RAW conversion complete"
    );
    state
        .metrics
        .record_bytes("convert", DIRECTION_OUT, output.data.len());

    Ok(EndpointResponse::jpeg(output))
}

/// `POST /watermark`: file fields `image` and `watermark`, text fields
/// `opacity`, `scalePercent` and `position`.
pub async fn handle_watermark(
    state: &ServiceState,
    content_type: Option<&str>,
    body: Bytes,
) -> Result<EndpointResponse, ServiceError> {
    let _timer = state.metrics.start_timer("watermark");
    let defaults = &state.watermark_defaults;

    let mut form = MultipartForm::parse(content_type, body).await?;
    let base = form.take_file("image")?;
    let watermark = form.take_file("watermark")?;
    let opacity = form.int_field("opacity", defaults.default_opacity)?;
    let scale_percent = form.int_field("scalePercent", defaults.default_scale_percent)?;
    let position = form
        .text("position")
        .map(WatermarkPosition::from_param)
        .unwrap_or(defaults.default_position);

    state.metrics.record_bytes(
        "watermark",
        DIRECTION_IN,
        base.data.len() + watermark.data.len(),
    );

    let request = CompositeRequest {
        base: base.data,
        watermark: watermark.data,
        opacity,
        scale_percent,
        position,
    };
    let compositor = state.compositor.clone();
    let started = Instant::now();
    let output = tokio::task::spawn_blocking(move || compositor.composite(&request)).await??;

    info!(
        opacity = opacity,
        scale_percent = scale_percent,
        position = %position,
        output_bytes = output.data.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Watermark applied"
    );
    state
        .metrics
        .record_bytes("watermark", DIRECTION_OUT, output.data.len());

    Ok(EndpointResponse::jpeg(output))
}

/// Generate response for /health endpoint.
///
/// Returns health status with uptime and version information.
pub fn handle_health(start_time: Instant) -> EndpointResponse {
    let body = serde_json::json!({
        "status": "healthy",
        "uptime_seconds": start_time.elapsed().as_secs(),
        "version": env!("CARGO_PKG_VERSION")
    })
    .to_string();

    EndpointResponse::json(200, body)
}

/// Generate response for /metrics endpoint.
pub fn handle_metrics(state: &ServiceState) -> Result<EndpointResponse, ServiceError> {
    state
        .metrics
        .export()
        .map(EndpointResponse::prometheus)
        .map_err(|e| ServiceError::Internal(format!("Failed to encode metrics: {}", e)))
}
