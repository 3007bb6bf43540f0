//! Image preparation for analysis requests
//!
//! Turns a user upload into the request-ready [`ImagePayload`] (bytes plus
//! declared media type). The payload is passed through unchanged: no decoding,
//! resizing or re-encoding happens on the way to the model.

pub mod mime;
pub mod preview;

pub use preview::{inspect, Preview};

use crate::{Error, Result};
use base64::Engine as _;
use std::path::Path;

/// A raw upload as handed over by a front-end.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
    pub media_type: String,
}

impl Upload {
    pub fn new(bytes: Vec<u8>, media_type: impl Into<String>) -> Self {
        Self {
            file_name: None,
            bytes,
            media_type: media_type.into(),
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// `data:` URI used by the web preview.
    pub fn to_data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.media_type,
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }

    /// Reads an image from disk, enforcing the extension allow-list.
    pub async fn from_path(path: &Path) -> Result<Self> {
        let media_type = mime::media_type_for_path(path).ok_or_else(|| {
            Error::UnsupportedMediaType(format!(
                "{} (supported formats: {})",
                path.display(),
                mime::ALLOWED_EXTENSIONS.join(", ")
            ))
        })?;

        let bytes = tokio::fs::read(path).await?;
        let upload = Self::new(bytes, media_type);

        Ok(match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => upload.with_file_name(name),
            None => upload,
        })
    }
}

/// Request-ready image. Immutable once prepared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    bytes: Vec<u8>,
    media_type: String,
}

impl ImagePayload {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }
}

/// Prepares an upload for analysis.
///
/// An absent or empty upload is a [`Error::MissingInput`]. The declared media
/// type is kept as-is even when it is outside the supported set; the remote
/// service gets to reject it.
pub fn prepare(upload: Option<Upload>) -> Result<ImagePayload> {
    let upload = upload.ok_or_else(|| Error::MissingInput("No file uploaded".to_string()))?;

    if upload.bytes.is_empty() {
        return Err(Error::MissingInput("Uploaded file is empty".to_string()));
    }

    if !mime::is_supported(&upload.media_type) {
        tracing::warn!(
            "Declared media type {} is not in the supported set, passing it through",
            upload.media_type
        );
    }

    if let Some(sniffed) = mime::sniff_media_type(&upload.bytes) {
        if !sniffed.eq_ignore_ascii_case(&upload.media_type) {
            tracing::warn!(
                "Declared media type {} does not match content ({})",
                upload.media_type,
                sniffed
            );
        }
    }

    Ok(ImagePayload {
        bytes: upload.bytes,
        media_type: upload.media_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PNG_HEADER: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_prepare_keeps_bytes_and_media_type() {
        let payload = prepare(Some(Upload::new(PNG_HEADER.to_vec(), "image/png"))).unwrap();
        assert_eq!(payload.bytes(), &PNG_HEADER[..]);
        assert_eq!(payload.media_type(), "image/png");
        assert_eq!(payload.len(), PNG_HEADER.len());
    }

    #[test]
    fn test_prepare_without_upload_is_missing_input() {
        let err = prepare(None).unwrap_err();
        assert!(matches!(err, Error::MissingInput(_)));
    }

    #[test]
    fn test_prepare_empty_upload_is_missing_input() {
        let err = prepare(Some(Upload::new(Vec::new(), "image/png"))).unwrap_err();
        assert!(matches!(err, Error::MissingInput(_)));
    }

    #[test]
    fn test_prepare_passes_unsupported_type_through() {
        let payload = prepare(Some(Upload::new(b"GIF89a".to_vec(), "image/gif"))).unwrap();
        assert_eq!(payload.media_type(), "image/gif");
        assert_eq!(payload.bytes(), b"GIF89a");
    }

    #[test]
    fn test_prepare_keeps_mismatched_declared_type() {
        let payload = prepare(Some(Upload::new(PNG_HEADER.to_vec(), "image/jpeg"))).unwrap();
        assert_eq!(payload.media_type(), "image/jpeg");
    }

    #[test]
    fn test_data_uri() {
        let upload = Upload::new(vec![1, 2, 3], "image/png");
        assert_eq!(upload.to_data_uri(), "data:image/png;base64,AQID");
    }

    #[tokio::test]
    async fn test_upload_from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.PNG");
        std::fs::write(&path, PNG_HEADER).unwrap();

        let upload = Upload::from_path(&path).await.unwrap();
        assert_eq!(upload.media_type, "image/png");
        assert_eq!(upload.bytes, PNG_HEADER.to_vec());
        assert_eq!(upload.file_name.as_deref(), Some("photo.PNG"));
    }

    #[tokio::test]
    async fn test_upload_from_path_rejects_disallowed_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anim.gif");
        std::fs::write(&path, b"GIF89a").unwrap();

        let err = Upload::from_path(&path).await.unwrap_err();
        assert!(matches!(err, Error::UnsupportedMediaType(_)));
    }

    #[tokio::test]
    async fn test_upload_from_missing_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Upload::from_path(&dir.path().join("nope.jpg"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
