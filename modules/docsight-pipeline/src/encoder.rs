use std::borrow::Cow;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use docsight_common::{EncodedPayload, FileBody, UploadedFile};
use tokio::io::AsyncReadExt;

use crate::error::EncodingError;

/// Read the upload and encode it as base64 without any data-URL prefix.
///
/// Path-backed uploads are read up to one byte past the declared size, so a
/// file that grew after it was measured is never buffered in full.
pub async fn encode(file: &UploadedFile) -> Result<EncodedPayload, EncodingError> {
    let bytes = read_body(file).await?;

    let declared = file.size();
    let read = bytes.len() as u64;
    if read > declared {
        return Err(EncodingError::Oversized { declared });
    }
    if read < declared {
        return Err(EncodingError::Truncated { declared, read });
    }

    Ok(EncodedPayload {
        content: encode_bytes(&bytes),
        media_type: file.media_type().to_string(),
    })
}

pub fn encode_bytes(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode base64 content, accepting a `data:<type>;base64,` prefix.
pub fn decode(content: &str) -> Result<Vec<u8>, EncodingError> {
    STANDARD
        .decode(strip_data_url_prefix(content))
        .map_err(|e| EncodingError::InvalidBase64(e.to_string()))
}

/// Drop the `data:...,` metadata in front of a data URL. Plain base64 is
/// returned unchanged.
pub fn strip_data_url_prefix(content: &str) -> &str {
    if content.starts_with("data:") {
        if let Some((_, rest)) = content.split_once(',') {
            return rest;
        }
    }
    content
}

async fn read_body(file: &UploadedFile) -> Result<Cow<'_, [u8]>, EncodingError> {
    match file.body() {
        FileBody::Bytes(bytes) => Ok(Cow::Borrowed(bytes.as_slice())),
        FileBody::Path(path) => read_bounded(path, file.size())
            .await
            .map(Cow::Owned)
            .map_err(|source| EncodingError::Io {
                path: path.clone(),
                source,
            }),
    }
}

async fn read_bounded(path: &Path, declared: u64) -> std::io::Result<Vec<u8>> {
    let handle = tokio::fs::File::open(path).await?;
    let mut bytes = Vec::new();
    handle
        .take(declared.saturating_add(1))
        .read_to_end(&mut bytes)
        .await?;
    Ok(bytes)
}
