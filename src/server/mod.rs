// Server module - Pingora HTTP app hosting both pipelines

pub mod multipart;
pub mod routes;
pub mod state;

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use http::{header, Response, StatusCode};
use pingora_core::apps::http_app::{HttpServer, ServeHttp};
use pingora_core::protocols::http::ServerSession;
use pingora_core::services::listening::Service;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::error::ServiceError;

pub use multipart::{MultipartForm, UploadedFile};
pub use routes::{route, EndpointResponse};
pub use state::ServiceState;

pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// HTTP application serving `/convert`, `/watermark`, `/health` and `/metrics`
pub struct Raw2JpgApp {
    state: Arc<ServiceState>,
}

impl Raw2JpgApp {
    pub fn new(state: Arc<ServiceState>) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &ServiceState {
        &self.state
    }
}

/// Build the listening service for `config`.
pub fn http_service(
    config: &ServerConfig,
    state: Arc<ServiceState>,
) -> Service<HttpServer<Raw2JpgApp>> {
    let mut service = Service::new(
        "raw2jpg HTTP".to_string(),
        HttpServer::new_app(Raw2JpgApp::new(state)),
    );
    service.add_tcp(&config.listen_addr());
    service.threads = Some(config.threads);
    service
}

/// Buffer the request body, failing once it grows past `limit` bytes.
async fn read_body(session: &mut ServerSession, limit: usize) -> Result<Bytes, ServiceError> {
    let mut body = BytesMut::new();
    while let Some(chunk) = session
        .read_request_body()
        .await
        .map_err(|e| ServiceError::Read(e.to_string()))?
    {
        if body.len() + chunk.len() > limit {
            return Err(ServiceError::PayloadTooLarge { limit });
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body.freeze())
}

/// Convert a handler response into the wire response.
pub fn into_http_response(response: EndpointResponse, request_id: &str) -> Response<Vec<u8>> {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut builder = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, response.content_type)
        .header(header::CONTENT_LENGTH, response.body.len())
        .header(REQUEST_ID_HEADER, request_id);

    for (name, value) in &response.headers {
        builder = builder.header(*name, value.as_str());
    }

    builder.body(response.body).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to build response");
        let mut fallback = Response::new(Vec::new());
        *fallback.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        fallback
    })
}

#[async_trait]
impl ServeHttp for Raw2JpgApp {
    async fn response(&self, session: &mut ServerSession) -> Response<Vec<u8>> {
        let request_id = Uuid::new_v4().to_string();
        let started = Instant::now();

        let (method, path, content_type) = {
            let req = session.req_header();
            (
                req.method.clone(),
                req.uri.path().to_string(),
                req.headers
                    .get(header::CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string),
            )
        };

        let span = info_span!(
            "request",
            request_id = %request_id,
            method = %method,
            path = %path
        );

        let state = &self.state;
        let response = async {
            match read_body(session, state.max_body_bytes).await {
                Ok(body) => route(state, &method, &path, content_type.as_deref(), body).await,
                Err(err) => {
                    warn!(error = %err, "Failed to read request body");
                    state
                        .metrics
                        .record_request(routes::endpoint_label(&path), err.to_http_status());
                    EndpointResponse::error(&err)
                }
            }
        }
        .instrument(span.clone())
        .await;

        span.in_scope(|| {
            info!(
                status = response.status,
                bytes = response.body.len(),
                duration_ms = started.elapsed().as_millis() as u64,
                "Request completed"
            );
        });

        into_http_response(response, &request_id)
    }
}
