//! Conversions between files, in-memory blobs, base64 payloads and data URLs.

use crate::error::ReveError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::fs;

/// MIME type assumed when the caller does not name one.
pub const DEFAULT_MIME_TYPE: &str = "image/png";

/// Raw bytes tagged with a MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl Blob {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    pub fn to_data_url(&self) -> String {
        base64_to_data_url(&self.to_base64(), &self.mime_type)
    }
}

/// Returns the payload of a `data:<mime>;base64,<payload>` string, or the input unchanged
/// when it carries no data-URL prefix.
pub fn strip_data_url_prefix(value: &str) -> &str {
    if value.starts_with("data:") {
        if let Some((_, payload)) = value.split_once(',') {
            return payload;
        }
    }
    value
}

/// Base64-encodes a blob.
pub fn blob_to_base64(blob: &Blob) -> String {
    blob.to_base64()
}

/// Reads a file fully into memory and returns the base64 encoding of its raw bytes.
///
/// The content is never inspected: a file whose text happens to start with `data:`
/// is encoded like any other file.
pub async fn file_to_base64<P: AsRef<Path>>(path: P) -> Result<String, ReveError> {
    Ok(STANDARD.encode(fs::read(path.as_ref()).await?))
}

/// Reads a file into a [`Blob`], guessing the MIME type from its extension.
pub async fn file_to_blob<P: AsRef<Path>>(path: P) -> Result<Blob, ReveError> {
    let path = path.as_ref();
    let bytes = fs::read(path).await?;
    let mime_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .to_string();
    Ok(Blob::new(bytes, mime_type))
}

/// Decodes a base64 payload into a [`Blob`] of the given MIME type.
pub fn base64_to_blob(base64: &str, mime_type: &str) -> Result<Blob, ReveError> {
    let bytes = STANDARD.decode(base64)?;
    Ok(Blob::new(bytes, mime_type))
}

/// Builds a `data:` URL. The payload is not validated.
pub fn base64_to_data_url(base64: &str, mime_type: &str) -> String {
    format!("data:{};base64,{}", mime_type, base64)
}

/// Decodes a base64 image and saves it to `destination`.
///
/// The bytes are written to a temporary file next to the destination and moved into
/// place only once fully written. If anything fails the temporary file is removed.
pub fn download_base64_image<P: AsRef<Path>>(
    base64: &str,
    destination: P,
    mime_type: &str,
) -> Result<PathBuf, ReveError> {
    let blob = base64_to_blob(base64, mime_type)?;
    let destination = destination.as_ref();
    let dir = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir)?;

    let mut staging = NamedTempFile::new_in(&dir)?;
    staging.write_all(&blob.bytes)?;
    staging.flush()?;
    staging.persist(destination).map_err(|e| e.error)?;

    tracing::debug!(
        path = %destination.display(),
        bytes = blob.bytes.len(),
        mime_type,
        "saved image"
    );
    Ok(destination.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_url_is_plain_concatenation() {
        assert_eq!(
            base64_to_data_url("aGVsbG8=", "image/jpeg"),
            "data:image/jpeg;base64,aGVsbG8="
        );
        assert_eq!(base64_to_data_url("", DEFAULT_MIME_TYPE), "data:image/png;base64,");
    }

    #[test]
    fn blob_round_trips_base64() {
        for payload in ["", "aGVsbG8=", "iVBORw0KGgoAAAANSUhEUg==", "/w=="] {
            let blob = base64_to_blob(payload, DEFAULT_MIME_TYPE).unwrap();
            assert_eq!(blob.mime_type, "image/png");
            assert_eq!(blob.to_base64(), payload);
            assert_eq!(
                strip_data_url_prefix(&base64_to_data_url(&blob_to_base64(&blob), "image/png")),
                payload
            );
        }
    }

    #[test]
    fn malformed_base64_is_an_error() {
        let err = base64_to_blob("not base64!!", DEFAULT_MIME_TYPE).unwrap_err();
        assert!(matches!(err, ReveError::InvalidBase64(_)));
    }

    #[test]
    fn strip_prefix_leaves_plain_payloads_alone() {
        assert_eq!(strip_data_url_prefix("aGVsbG8="), "aGVsbG8=");
        assert_eq!(strip_data_url_prefix("data:image/png;base64,aGVsbG8="), "aGVsbG8=");
    }

    #[tokio::test]
    async fn file_to_base64_encodes_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pixel.png");
        std::fs::write(&path, b"hello").unwrap();
        assert_eq!(file_to_base64(&path).await.unwrap(), "aGVsbG8=");

        let blob = file_to_blob(&path).await.unwrap();
        assert_eq!(blob.mime_type, "image/png");
        assert_eq!(blob.bytes, b"hello");
    }

    #[tokio::test]
    async fn file_to_base64_encodes_text_that_looks_like_a_data_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"data:,hello world").unwrap();
        assert_eq!(
            file_to_base64(&path).await.unwrap(),
            STANDARD.encode(b"data:,hello world")
        );
    }

    #[tokio::test]
    async fn missing_file_propagates_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = file_to_base64(dir.path().join("nope.png")).await.unwrap_err();
        assert!(matches!(err, ReveError::IoError(_)));
    }

    #[test]
    fn download_writes_decoded_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out").join("image.png");
        let written = download_base64_image("aGVsbG8=", &target, "image/png").unwrap();
        assert_eq!(written, target);
        assert_eq!(std::fs::read(&target).unwrap(), b"hello");
        assert_eq!(std::fs::read_dir(target.parent().unwrap()).unwrap().count(), 1);
    }

    #[test]
    fn download_with_bad_payload_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("image.png");
        assert!(download_base64_image("%%%", &target, "image/png").is_err());
        assert!(!target.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
