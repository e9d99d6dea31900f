// Health, metrics and request-shape errors

use bytes::Bytes;
use http::Method;
use raw2jpg::server::route;

use super::support::*;

#[tokio::test]
async fn test_health_endpoint() {
    let scratch = tempfile::tempdir().unwrap();
    let state = test_state(scratch.path());

    let response = route(&state, &Method::GET, "/health", None, Bytes::new()).await;
    assert_eq!(response.status, 200);
    let json: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn test_metrics_reflect_traffic() {
    let scratch = tempfile::tempdir().unwrap();
    let state = test_state(scratch.path());

    let body = multipart_body(&[Part::File {
        name: "file",
        filename: "shot.nef",
        data: b"sensor",
    }]);
    assert_eq!(post(&state, "/convert", body).await.status, 200);

    let body = multipart_body(&[Part::File {
        name: "file",
        filename: "notes.txt",
        data: b"hello",
    }]);
    assert_eq!(post(&state, "/convert", body).await.status, 400);

    let response = route(&state, &Method::GET, "/metrics", None, Bytes::new()).await;
    assert_eq!(response.status, 200);
    assert!(response.content_type.starts_with("text/plain"));

    let text = String::from_utf8(response.body).unwrap();
    assert!(text.contains("raw2jpg_requests_total{endpoint=\"convert\",status=\"200\"} 1"));
    assert!(text.contains("raw2jpg_requests_total{endpoint=\"convert\",status=\"400\"} 1"));
    assert!(text.contains("raw2jpg_processing_duration_seconds"));
    assert!(text.contains("raw2jpg_bytes_processed_total"));
}

#[tokio::test]
async fn test_unknown_path_is_404() {
    let scratch = tempfile::tempdir().unwrap();
    let state = test_state(scratch.path());

    let response = post(&state, "/upload", Bytes::new()).await;
    assert_eq!(response.status, 404);
    assert_eq!(response.content_type, "application/json");
}

#[tokio::test]
async fn test_wrong_method_is_405_with_allow() {
    let scratch = tempfile::tempdir().unwrap();
    let state = test_state(scratch.path());

    let response = route(&state, &Method::GET, "/convert", None, Bytes::new()).await;
    assert_eq!(response.status, 405);
    assert_eq!(response.header("Allow"), Some("POST"));

    let response = route(&state, &Method::DELETE, "/health", None, Bytes::new()).await;
    assert_eq!(response.status, 405);
    assert_eq!(response.header("Allow"), Some("GET"));
}

#[tokio::test]
async fn test_non_multipart_body_is_400() {
    let scratch = tempfile::tempdir().unwrap();
    let state = test_state(scratch.path());

    let response = route(
        &state,
        &Method::POST,
        "/watermark",
        Some("application/json"),
        Bytes::from_static(b"{\"image\": 1}"),
    )
    .await;
    assert_eq!(response.status, 400);
    assert!(detail(&response).starts_with("Error reading upload"));
}
