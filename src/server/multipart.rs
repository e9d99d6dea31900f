//! multipart/form-data parsing for the upload endpoints
//!
//! The body is already buffered (and size-limited) by the HTTP layer, so the
//! form is parsed from a single in-memory chunk.

use std::collections::HashMap;
use std::convert::Infallible;

use bytes::Bytes;
use futures::stream;
use multer::Multipart;

use crate::error::ServiceError;

/// A file part of the form
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Client-supplied file name, if any
    pub filename: Option<String>,
    pub data: Bytes,
}

/// Parsed form: file parts and text parts by field name.
///
/// When a field name repeats, the first occurrence wins.
#[derive(Debug, Default)]
pub struct MultipartForm {
    files: HashMap<String, UploadedFile>,
    fields: HashMap<String, String>,
}

impl MultipartForm {
    pub async fn parse(content_type: Option<&str>, body: Bytes) -> Result<Self, ServiceError> {
        let content_type = content_type
            .ok_or_else(|| ServiceError::Read("expected a multipart/form-data body".to_string()))?;
        let boundary = multer::parse_boundary(content_type)?;

        let mut multipart = Multipart::new(
            stream::once(async move { Ok::<Bytes, Infallible>(body) }),
            boundary,
        );

        let mut form = MultipartForm::default();
        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if field.file_name().is_some() {
                let filename = field.file_name().map(str::to_string);
                let data = field.bytes().await?;
                form.files
                    .entry(name)
                    .or_insert(UploadedFile { filename, data });
            } else {
                let value = field.text().await?;
                form.fields.entry(name).or_insert(value);
            }
        }

        Ok(form)
    }

    /// Remove a required file part from the form.
    pub fn take_file(&mut self, name: &str) -> Result<UploadedFile, ServiceError> {
        self.files
            .remove(name)
            .ok_or_else(|| ServiceError::Read(format!("missing file field '{}'", name)))
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Integer text field, `default` when absent.
    pub fn int_field(&self, name: &str, default: i64) -> Result<i64, ServiceError> {
        match self.text(name) {
            None => Ok(default),
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ServiceError::invalid_parameter(name, value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDARY: &str = "X-RAW2JPG-BOUNDARY";

    fn content_type() -> String {
        format!("multipart/form-data; boundary={}", BOUNDARY)
    }

    fn body(parts: &[(&str, Option<&str>, &[u8])]) -> Bytes {
        let mut out = Vec::new();
        for (name, filename, data) in parts {
            out.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            match filename {
                Some(f) => out.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                        name, f
                    )
                    .as_bytes(),
                ),
                None => out.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                ),
            }
            out.extend_from_slice(data);
            out.extend_from_slice(b"\r\n");
        }
        out.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        Bytes::from(out)
    }

    #[tokio::test]
    async fn test_parse_files_and_fields() {
        let body = body(&[
            ("file", Some("IMG_1.CR2"), b"\x00\x01binary"),
            ("opacity", None, b"45"),
        ]);
        let mut form = MultipartForm::parse(Some(&content_type()), body)
            .await
            .unwrap();

        assert_eq!(form.text("opacity"), Some("45"));
        assert_eq!(form.int_field("opacity", 30).unwrap(), 45);
        assert_eq!(form.int_field("scalePercent", 30).unwrap(), 30);

        let file = form.take_file("file").unwrap();
        assert_eq!(file.filename.as_deref(), Some("IMG_1.CR2"));
        assert_eq!(&file.data[..], b"\x00\x01binary");
        assert!(form.take_file("file").is_err());
    }

    #[tokio::test]
    async fn test_missing_file_is_read_error() {
        let body = body(&[("opacity", None, b"10")]);
        let mut form = MultipartForm::parse(Some(&content_type()), body)
            .await
            .unwrap();
        let err = form.take_file("file").unwrap_err();
        assert_eq!(err, ServiceError::Read("missing file field 'file'".to_string()));
    }

    #[tokio::test]
    async fn test_non_integer_field() {
        let body = body(&[("opacity", None, b"high")]);
        let form = MultipartForm::parse(Some(&content_type()), body)
            .await
            .unwrap();
        let err = form.int_field("opacity", 30).unwrap_err();
        assert_eq!(err.to_http_status(), 400);
        assert!(matches!(err, ServiceError::InvalidParameter { .. }));
    }

    #[tokio::test]
    async fn test_negative_and_large_integers_survive_parsing() {
        let body = body(&[("opacity", None, b"-20"), ("scalePercent", None, b" 500 ")]);
        let form = MultipartForm::parse(Some(&content_type()), body)
            .await
            .unwrap();
        assert_eq!(form.int_field("opacity", 30).unwrap(), -20);
        assert_eq!(form.int_field("scalePercent", 30).unwrap(), 500);
    }

    #[tokio::test]
    async fn test_rejects_non_multipart() {
        let err = MultipartForm::parse(Some("application/json"), Bytes::from_static(b"{}"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Read(_)));

        let err = MultipartForm::parse(None, Bytes::new()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Read(_)));
    }

    #[tokio::test]
    async fn test_truncated_body_is_read_error() {
        let full = body(&[("file", Some("a.nef"), b"data")]);
        let truncated = full.slice(..full.len() - 10);
        let result = MultipartForm::parse(Some(&content_type()), truncated).await;
        assert!(matches!(result, Err(ServiceError::Read(_))));
    }
}
