// POST /convert through the routing layer with a stub RAW decoder

use rstest::rstest;

use super::support::*;

fn raw_upload(filename: &str, data: &[u8]) -> bytes::Bytes {
    multipart_body(&[Part::File {
        name: "file",
        filename,
        data,
    }])
}

#[tokio::test]
async fn test_convert_returns_jpeg_with_icc_profile() {
    let scratch = tempfile::tempdir().unwrap();
    let state = test_state(scratch.path());

    let response = post(&state, "/convert", raw_upload("IMG_0042.CR2", b"sensor")).await;

    assert_eq!(response.status, 200);
    assert_eq!(response.content_type, "image/jpeg");
    assert_eq!(
        response.header("Content-Disposition"),
        Some("attachment; filename=\"IMG_0042.jpg\"")
    );
    assert_eq!(&response.body[..2], &[0xFF, 0xD8]);
    assert!(contains(&response.body, b"ICC_PROFILE\0"));

    let img = decode_jpeg(&response.body);
    assert_eq!((img.width(), img.height()), (48, 32));
}

#[rstest]
#[case("photo.arw")]
#[case("photo.CR2")]
#[case("photo.Dng")]
#[case("photo.nef")]
#[case("photo.RAW")]
#[case("photo.cr3")]
#[tokio::test]
async fn test_supported_extensions(#[case] filename: &str) {
    let scratch = tempfile::tempdir().unwrap();
    let state = test_state(scratch.path());
    let response = post(&state, "/convert", raw_upload(filename, b"x")).await;
    assert_eq!(response.status, 200);
}

#[rstest]
#[case("notes.txt", "Unsupported format: .txt")]
#[case("image.png", "Unsupported format: .png")]
#[case("README", "Unsupported format: ")]
#[tokio::test]
async fn test_unsupported_extensions_rejected(#[case] filename: &str, #[case] message: &str) {
    let scratch = tempfile::tempdir().unwrap();
    let state = test_state(scratch.path());
    let response = post(&state, "/convert", raw_upload(filename, b"x")).await;
    assert_eq!(response.status, 400);
    assert_eq!(detail(&response), message);
    assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_decode_failure_is_500_and_cleans_scratch() {
    let scratch = tempfile::tempdir().unwrap();
    let state = test_state(scratch.path());

    let response = post(&state, "/convert", raw_upload("bad.nef", CORRUPT_RAW)).await;

    assert_eq!(response.status, 500);
    assert_eq!(
        detail(&response),
        "Error processing RAW: unrecognised sensor data"
    );
    assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_same_upload_gives_identical_output() {
    let scratch = tempfile::tempdir().unwrap();
    let state = test_state(scratch.path());

    let first = post(&state, "/convert", raw_upload("a.dng", b"same bytes")).await;
    let second = post(&state, "/convert", raw_upload("a.dng", b"same bytes")).await;

    assert_eq!(first.status, 200);
    assert_eq!(first.body, second.body);
}

#[tokio::test]
async fn test_directory_components_stripped_from_download_name() {
    let scratch = tempfile::tempdir().unwrap();
    let state = test_state(scratch.path());
    let response = post(&state, "/convert", raw_upload("../../shots/DSC_1.ARW", b"x")).await;
    assert_eq!(
        response.header("Content-Disposition"),
        Some("attachment; filename=\"DSC_1.jpg\"")
    );
}

#[tokio::test]
async fn test_missing_file_field_is_400() {
    let scratch = tempfile::tempdir().unwrap();
    let state = test_state(scratch.path());
    let body = multipart_body(&[Part::File {
        name: "upload",
        filename: "a.cr2",
        data: b"x",
    }]);
    let response = post(&state, "/convert", body).await;
    assert_eq!(response.status, 400);
    assert_eq!(detail(&response), "Error reading upload: missing file field 'file'");
}

#[tokio::test]
async fn test_real_decoder_rejects_garbage_with_500() {
    let scratch = tempfile::tempdir().unwrap();
    let config = raw2jpg::config::Config::default();
    let converter = raw2jpg::raw::RawConverter::default().with_scratch_dir(scratch.path());
    let state = raw2jpg::server::ServiceState::new(
        converter,
        raw2jpg::watermark::WatermarkCompositor::default(),
        &config,
    )
    .unwrap();

    let response = post(&state, "/convert", raw_upload("shot.cr2", b"not a raw file")).await;
    assert_eq!(response.status, 500);
    assert!(detail(&response).starts_with("Error processing RAW: "));
    assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
}
