// POST /watermark through the routing layer

use image::{GenericImageView, Rgba, RgbaImage};
use rstest::rstest;

use super::support::*;

fn watermark_body(base: &[u8], watermark: &[u8], fields: &[(&str, &str)]) -> bytes::Bytes {
    let mut parts = vec![
        Part::File {
            name: "image",
            filename: "base.png",
            data: base,
        },
        Part::File {
            name: "watermark",
            filename: "logo.png",
            data: watermark,
        },
    ];
    for (name, value) in fields {
        parts.push(Part::Text {
            name: *name,
            value: *value,
        });
    }
    multipart_body(&parts)
}

fn solid(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    png(&RgbaImage::from_pixel(width, height, Rgba(color)))
}

#[tokio::test]
async fn test_watermark_defaults() {
    let scratch = tempfile::tempdir().unwrap();
    let state = test_state(scratch.path());

    let body = watermark_body(
        &solid(200, 100, [0, 0, 0, 255]),
        &solid(50, 50, [255, 255, 255, 255]),
        &[],
    );
    let response = post(&state, "/watermark", body).await;

    assert_eq!(response.status, 200);
    assert_eq!(response.content_type, "image/jpeg");
    assert!(response.header("Content-Disposition").is_none());
    assert!(!contains(&response.body, b"ICC_PROFILE\0"));

    let img = decode_jpeg(&response.body);
    assert_eq!(img.dimensions(), (200, 100));

    // 30% scale → 60x60 watermark centred at (70, 20) with 30% opacity
    let inside = img.get_pixel(100, 50);
    assert!((60..=100).contains(&inside[0]), "centre pixel {:?}", inside);
    let outside = img.get_pixel(5, 5);
    assert!(outside[0] < 10, "corner pixel {:?}", outside);
}

#[tokio::test]
async fn test_watermark_top_left_placement() {
    let scratch = tempfile::tempdir().unwrap();
    let state = test_state(scratch.path());

    let body = watermark_body(
        &solid(800, 600, [0, 0, 0, 255]),
        &solid(400, 200, [255, 255, 255, 255]),
        &[("opacity", "100"), ("scalePercent", "50"), ("position", "top-left")],
    );
    let response = post(&state, "/watermark", body).await;
    assert_eq!(response.status, 200);

    let img = decode_jpeg(&response.body);
    assert_eq!(img.dimensions(), (800, 600));
    // Watermark spans (16,16)..(416,216)
    assert!(img.get_pixel(200, 100)[0] > 240);
    assert!(img.get_pixel(8, 8)[0] < 15);
    assert!(img.get_pixel(500, 300)[0] < 15);
}

#[tokio::test]
async fn test_zero_opacity_matches_base() {
    let scratch = tempfile::tempdir().unwrap();
    let state = test_state(scratch.path());

    let base = solid(64, 64, [40, 80, 120, 255]);
    let body = watermark_body(
        &base,
        &solid(64, 64, [255, 0, 0, 255]),
        &[("opacity", "0"), ("scalePercent", "100")],
    );
    let response = post(&state, "/watermark", body).await;
    assert_eq!(response.status, 200);

    let img = decode_jpeg(&response.body).to_rgb8();
    for p in img.pixels() {
        assert!((p[0] as i32 - 40).abs() <= 3, "{:?}", p);
        assert!((p[2] as i32 - 120).abs() <= 3, "{:?}", p);
    }
}

#[rstest]
#[case("-40", "0")]
#[case("250", "500")]
#[case("100", "1")]
#[tokio::test]
async fn test_out_of_range_values_are_clamped(#[case] opacity: &str, #[case] scale: &str) {
    let scratch = tempfile::tempdir().unwrap();
    let state = test_state(scratch.path());

    let body = watermark_body(
        &solid(120, 80, [10, 10, 10, 255]),
        &solid(30, 10, [200, 200, 200, 255]),
        &[("opacity", opacity), ("scalePercent", scale), ("position", "bottom-right")],
    );
    let response = post(&state, "/watermark", body).await;
    assert_eq!(response.status, 200);
    assert_eq!(decode_jpeg(&response.body).dimensions(), (120, 80));
}

#[tokio::test]
async fn test_unknown_position_falls_back_to_center() {
    let scratch = tempfile::tempdir().unwrap();
    let state = test_state(scratch.path());

    let body = watermark_body(
        &solid(100, 100, [0, 0, 0, 255]),
        &solid(20, 20, [255, 255, 255, 255]),
        &[("opacity", "100"), ("scalePercent", "20"), ("position", "upper-middle")],
    );
    let response = post(&state, "/watermark", body).await;
    assert_eq!(response.status, 200);

    let img = decode_jpeg(&response.body);
    // 20x20 centred at (40, 40)
    assert!(img.get_pixel(50, 50)[0] > 240);
    assert!(img.get_pixel(20, 20)[0] < 15);
}

#[tokio::test]
async fn test_non_integer_opacity_is_400() {
    let scratch = tempfile::tempdir().unwrap();
    let state = test_state(scratch.path());

    let body = watermark_body(
        &solid(10, 10, [0, 0, 0, 255]),
        &solid(5, 5, [0, 0, 0, 255]),
        &[("opacity", "half")],
    );
    let response = post(&state, "/watermark", body).await;
    assert_eq!(response.status, 400);
    assert!(detail(&response).contains("opacity"));
}

#[tokio::test]
async fn test_invalid_images_have_distinct_messages() {
    let scratch = tempfile::tempdir().unwrap();
    let state = test_state(scratch.path());
    let good = solid(10, 10, [0, 0, 0, 255]);

    let response = post(&state, "/watermark", watermark_body(b"garbage", &good, &[])).await;
    assert_eq!(response.status, 400);
    let base_message = detail(&response);
    assert!(base_message.starts_with("Invalid base image"));

    let response = post(&state, "/watermark", watermark_body(&good, b"garbage", &[])).await;
    assert_eq!(response.status, 400);
    let watermark_message = detail(&response);
    assert!(watermark_message.starts_with("Invalid watermark image"));

    assert_ne!(base_message, watermark_message);
}

#[tokio::test]
async fn test_missing_watermark_field_is_400() {
    let scratch = tempfile::tempdir().unwrap();
    let state = test_state(scratch.path());
    let body = multipart_body(&[Part::File {
        name: "image",
        filename: "a.png",
        data: &solid(4, 4, [0, 0, 0, 255]),
    }]);
    let response = post(&state, "/watermark", body).await;
    assert_eq!(response.status, 400);
    assert_eq!(
        detail(&response),
        "Error reading upload: missing file field 'watermark'"
    );
}

#[tokio::test]
async fn test_configured_defaults_apply() {
    let scratch = tempfile::tempdir().unwrap();
    let mut config = raw2jpg::config::Config::default();
    config.watermark.default_opacity = 100;
    config.watermark.default_scale_percent = 50;
    config.watermark.default_position = raw2jpg::watermark::WatermarkPosition::TopLeft;
    let state = state_with(&config, scratch.path());

    let body = watermark_body(
        &solid(200, 200, [0, 0, 0, 255]),
        &solid(10, 10, [255, 255, 255, 255]),
        &[],
    );
    let response = post(&state, "/watermark", body).await;
    let img = decode_jpeg(&response.body);
    // 100x100 opaque watermark at (16, 16)
    assert!(img.get_pixel(60, 60)[0] > 240);
    assert!(img.get_pixel(150, 150)[0] < 15);
}

#[tokio::test]
async fn test_oversized_resize_is_500_not_abort() {
    let scratch = tempfile::tempdir().unwrap();
    let state = test_state(scratch.path());

    let body = watermark_body(
        &solid(10_000, 1, [0, 0, 0, 255]),
        &solid(1, 10_000, [255, 255, 255, 255]),
        &[("scalePercent", "100")],
    );
    let response = post(&state, "/watermark", body).await;
    assert_eq!(response.status, 500);
    assert!(detail(&response).starts_with("Error applying watermark: Resize failed"));

    // The service keeps answering afterwards
    let body = watermark_body(
        &solid(20, 20, [0, 0, 0, 255]),
        &solid(4, 4, [255, 255, 255, 255]),
        &[],
    );
    assert_eq!(post(&state, "/watermark", body).await.status, 200);
}
