// Shared helpers: multipart bodies, fixture images, service state

use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use http::Method;
use image::{DynamicImage, ImageFormat, RgbaImage};
use raw2jpg::codec::MozJpegEncoder;
use raw2jpg::config::Config;
use raw2jpg::raw::{DecodedImage, ProcessingConfig, RawConverter, RawDecoder};
use raw2jpg::server::{route, EndpointResponse, ServiceState};
use raw2jpg::watermark::WatermarkCompositor;

pub const BOUNDARY: &str = "raw2jpg-test-boundary";

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={}", BOUNDARY)
}

/// One part of a multipart body
pub enum Part<'a> {
    File {
        name: &'a str,
        filename: &'a str,
        data: &'a [u8],
    },
    Text {
        name: &'a str,
        value: &'a str,
    },
}

pub fn multipart_body(parts: &[Part<'_>]) -> Bytes {
    let mut out = Vec::new();
    for part in parts {
        out.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::File {
                name,
                filename,
                data,
            } => {
                out.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n",
                        name, filename
                    )
                    .as_bytes(),
                );
                out.extend_from_slice(data);
            }
            Part::Text { name, value } => {
                out.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name)
                        .as_bytes(),
                );
                out.extend_from_slice(value.as_bytes());
            }
        }
        out.extend_from_slice(b"\r\n");
    }
    out.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    Bytes::from(out)
}

pub fn png(img: &RgbaImage) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img.clone())
        .write_to(&mut buffer, ImageFormat::Png)
        .unwrap();
    buffer.into_inner()
}

pub fn decode_jpeg(data: &[u8]) -> DynamicImage {
    image::load_from_memory_with_format(data, ImageFormat::Jpeg).unwrap()
}

pub fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

/// Develops any file into a fixed-size gradient, failing on a magic payload
pub struct StubRawDecoder;

pub const CORRUPT_RAW: &[u8] = b"corrupt";

impl RawDecoder for StubRawDecoder {
    fn decode(&self, path: &Path, _config: &ProcessingConfig) -> Result<DecodedImage, String> {
        let bytes = std::fs::read(path).map_err(|e| e.to_string())?;
        if bytes == CORRUPT_RAW {
            return Err("unrecognised sensor data".to_string());
        }
        let (width, height) = (48u32, 32u32);
        let data = (0..width * height)
            .flat_map(|i| {
                let x = (i % width) as u8;
                let y = (i / width) as u8;
                [x * 5, y * 7, bytes.len() as u8]
            })
            .collect();
        DecodedImage::new(width, height, data)
    }
}

pub fn state_with(config: &Config, scratch: &Path) -> ServiceState {
    let converter = RawConverter::new(Arc::new(StubRawDecoder), Arc::new(MozJpegEncoder))
        .with_scratch_dir(scratch);
    ServiceState::new(converter, WatermarkCompositor::default(), config).unwrap()
}

pub fn test_state(scratch: &Path) -> ServiceState {
    state_with(&Config::default(), scratch)
}

pub async fn post(state: &ServiceState, path: &str, body: Bytes) -> EndpointResponse {
    route(
        state,
        &Method::POST,
        path,
        Some(&multipart_content_type()),
        body,
    )
    .await
}

pub fn detail(response: &EndpointResponse) -> String {
    let json: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
    json["detail"].as_str().unwrap().to_string()
}
